//! Fixed-size string-keyed hash table with separate chaining.
//!
//! Both the inverted index and the frequency table sit on this. The bucket
//! count is fixed when the table is allocated; there is no rehashing.

/// Polynomial rolling hash: `h = h * 31 + code point`, wrapping at 32 bits.
pub fn term_hash(term: &str) -> u32 {
    term.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

#[derive(Debug, Clone)]
pub(crate) struct ChainedTable<V> {
    buckets: Vec<Vec<(String, V)>>,
    len: usize,
}

impl<V> ChainedTable<V> {
    pub(crate) fn with_buckets(buckets: usize) -> Self {
        let mut table = Self { buckets: Vec::new(), len: 0 };
        table.reset(buckets);
        table
    }

    /// Drop every entry and reallocate `buckets` empty chains.
    pub(crate) fn reset(&mut self, buckets: usize) {
        let buckets = buckets.max(1);
        self.buckets = Vec::with_capacity(buckets);
        self.buckets.resize_with(buckets, Vec::new);
        self.len = 0;
    }

    /// Free all storage, including the bucket array itself.
    pub(crate) fn release(&mut self) {
        self.buckets = Vec::new();
        self.len = 0;
    }

    pub(crate) fn is_allocated(&self) -> bool {
        !self.buckets.is_empty()
    }

    fn slot(&self, key: &str) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        Some(term_hash(key) as usize % self.buckets.len())
    }

    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        let chain = &self.buckets[self.slot(key)?];
        chain.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Value for `key`, inserting `make()` first if the key is new. The
    /// boolean is true when an insertion happened. `None` on a released
    /// table; callers re-`reset` first.
    pub(crate) fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> Option<(&mut V, bool)> {
        let slot = self.slot(key)?;
        let chain = &mut self.buckets[slot];
        Some(match chain.iter().position(|(k, _)| k == key) {
            Some(pos) => (&mut chain[pos].1, false),
            None => {
                chain.push((key.to_string(), make()));
                self.len += 1;
                let last = chain.len() - 1;
                (&mut chain[last].1, true)
            }
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }
}
