use crate::table::ChainedTable;
use serde::Serialize;
use std::collections::HashSet;

pub type DocId = u32;

pub const DEFAULT_INDEX_BUCKETS: usize = 10_000;

/// Set of documents containing one term. Kept sorted ascending and free of
/// duplicates; the order is a storage detail, not something callers may
/// depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostingList(Vec<DocId>);

impl PostingList {
    pub fn new() -> Self { Self::default() }

    /// Returns false if `doc_id` was already a member.
    pub fn insert(&mut self, doc_id: DocId) -> bool {
        match self.0.binary_search(&doc_id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, doc_id);
                true
            }
        }
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.0.binary_search(&doc_id).is_ok()
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn as_slice(&self) -> &[DocId] { &self.0 }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ { self.0.iter().copied() }

    pub fn into_vec(self) -> Vec<DocId> { self.0 }
}

impl FromIterator<DocId> for PostingList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        let mut docs: Vec<DocId> = iter.into_iter().collect();
        docs.sort_unstable();
        docs.dedup();
        Self(docs)
    }
}

impl IntoIterator for PostingList {
    type Item = DocId;
    type IntoIter = std::vec::IntoIter<DocId>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

/// Documents present in both `a` and `b`, each once. Inputs may hold
/// duplicates and be in any order.
pub fn intersect(a: &[DocId], b: &[DocId]) -> PostingList {
    let other: HashSet<DocId> = b.iter().copied().collect();
    a.iter().copied().filter(|d| other.contains(d)).collect()
}

/// Documents present in `a` but not in `b`, each once.
pub fn difference(a: &[DocId], b: &[DocId]) -> PostingList {
    let other: HashSet<DocId> = b.iter().copied().collect();
    a.iter().copied().filter(|d| !other.contains(d)).collect()
}

/// Borrowed view of one term and its postings.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'a> {
    pub term: &'a str,
    pub postings: &'a PostingList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub terms: usize,
    pub postings: usize,
    pub buckets: usize,
    pub longest_chain: usize,
}

/// Term -> posting list map. Keys are stored exactly as given; normalizing
/// them is the caller's job.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    table: ChainedTable<PostingList>,
    buckets: usize,
}

impl Default for InvertedIndex {
    fn default() -> Self { Self::new() }
}

impl InvertedIndex {
    pub fn new() -> Self { Self::with_buckets(DEFAULT_INDEX_BUCKETS) }

    pub fn with_buckets(buckets: usize) -> Self {
        Self { table: ChainedTable::with_buckets(buckets), buckets: buckets.max(1) }
    }

    /// Reset to empty. Safe to call at any point, including after [`teardown`](Self::teardown).
    pub fn init(&mut self) {
        self.table.reset(self.buckets);
        tracing::debug!(buckets = self.buckets, "inverted index initialized");
    }

    /// Add `doc_id` to the postings of `term`, creating the entry if needed.
    /// Returns false when the pair was already indexed.
    pub fn insert(&mut self, term: &str, doc_id: DocId) -> bool {
        if !self.table.is_allocated() {
            tracing::warn!("insert into a torn-down index; reinitializing");
            self.init();
        }
        match self.table.get_or_insert_with(term, PostingList::new) {
            Some((postings, _)) => postings.insert(doc_id),
            None => false,
        }
    }

    /// Independent copy of the postings for `term`, or `None` if the term was
    /// never inserted.
    pub fn lookup(&self, term: &str) -> Option<PostingList> {
        self.table.get(term).cloned()
    }

    /// Borrowing variant of [`lookup`](Self::lookup).
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.table.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.table.get(term).is_some()
    }

    /// Release all storage. Query only after a fresh [`init`](Self::init).
    pub fn teardown(&mut self) {
        self.table.release();
        tracing::debug!("inverted index released");
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.len() == 0 }

    /// All entries, in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry<'_>> {
        self.table.iter().map(|(term, postings)| IndexEntry { term, postings })
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            terms: self.table.len(),
            postings: self.table.iter().map(|(_, p)| p.len()).sum(),
            buckets: self.table.bucket_count(),
            longest_chain: self.table.longest_chain(),
        }
    }
}
