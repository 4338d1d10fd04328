//! Boolean AND / NOT queries over an [`InvertedIndex`].
//!
//! Terms are implicitly ANDed. A term is negated by a preceding `NOT` or a
//! leading `-`. Evaluation is a single left-to-right fold with no reordering.

use crate::index::{difference, intersect, DocId, InvertedIndex, PostingList};
use crate::stemmer::normalize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClause {
    pub term: String,
    pub negated: bool,
}

/// Split a query on whitespace into signed terms. A trailing `NOT` with
/// nothing after it is dropped.
pub fn parse_query(query: &str) -> Vec<QueryClause> {
    let mut clauses = Vec::new();
    let mut tokens = query.split_whitespace();
    while let Some(token) = tokens.next() {
        let clause = if token == "NOT" {
            match tokens.next() {
                Some(next) => QueryClause { term: next.to_string(), negated: true },
                None => break,
            }
        } else if token.len() > 1 && token.starts_with('-') {
            QueryClause { term: token[1..].to_string(), negated: true }
        } else {
            QueryClause { term: token.to_string(), negated: false }
        };
        clauses.push(clause);
    }
    clauses
}

/// Stem a raw query term. Returns `None` when nothing indexable is left.
fn query_stem(term: &str) -> Option<String> {
    if !term.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let stem = normalize(&term.to_ascii_lowercase());
    (!stem.is_empty()).then_some(stem)
}

fn postings<'a>(index: &'a InvertedIndex, stem: &str) -> &'a [DocId] {
    index.postings(stem).map(PostingList::as_slice).unwrap_or(&[])
}

/// Evaluate `query` against `index`.
///
/// The first positive term seeds the result with a copy of its postings.
/// Negated terms seen before that are held back and subtracted from the seed.
/// Later positive terms intersect, later negated terms subtract. As soon as
/// the running result is empty the remaining terms are not looked at.
pub fn evaluate(index: &InvertedIndex, query: &str) -> PostingList {
    let mut running: Option<PostingList> = None;
    let mut held_back: Vec<String> = Vec::new();

    for clause in parse_query(query) {
        let Some(stem) = query_stem(&clause.term) else {
            continue;
        };
        let next = match (running.take(), clause.negated) {
            (None, true) => {
                held_back.push(stem);
                continue;
            }
            (None, false) => {
                let mut seed = index.lookup(&stem).unwrap_or_default();
                for excluded in held_back.drain(..) {
                    seed = difference(seed.as_slice(), postings(index, &excluded));
                }
                seed
            }
            (Some(acc), false) => intersect(acc.as_slice(), postings(index, &stem)),
            (Some(acc), true) => difference(acc.as_slice(), postings(index, &stem)),
        };
        if next.is_empty() {
            tracing::trace!(term = %stem, "result emptied; stopping early");
            return next;
        }
        running = Some(next);
    }

    let result = running.unwrap_or_default();
    tracing::debug!(query, hits = result.len(), "boolean query evaluated");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(term: &str, negated: bool) -> QueryClause {
        QueryClause { term: term.into(), negated }
    }

    fn pets() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        for d in [1, 2, 3] {
            idx.insert("cat", d);
        }
        idx.insert("dog", 2);
        idx
    }

    fn ids(p: PostingList) -> Vec<DocId> { p.into_vec() }

    #[test]
    fn parse_signed_terms() {
        assert_eq!(
            parse_query("cat NOT dog -bird  fish"),
            vec![clause("cat", false), clause("dog", true), clause("bird", true), clause("fish", false)]
        );
    }

    #[test]
    fn parse_tolerates_stray_operators() {
        assert_eq!(parse_query("cat NOT"), vec![clause("cat", false)]);
        assert_eq!(parse_query("- cat"), vec![clause("-", false), clause("cat", false)]);
        assert!(parse_query("   ").is_empty());
    }

    #[test]
    fn not_and_minus_exclude() {
        let idx = pets();
        assert_eq!(ids(evaluate(&idx, "cat NOT dog")), vec![1, 3]);
        assert_eq!(ids(evaluate(&idx, "cat -dog")), vec![1, 3]);
        assert_eq!(ids(evaluate(&idx, "cat dog")), vec![2]);
    }

    #[test]
    fn leading_negation_applies_to_first_positive_term() {
        let idx = pets();
        assert_eq!(ids(evaluate(&idx, "-dog cat")), vec![1, 3]);
        assert_eq!(ids(evaluate(&idx, "NOT dog cat")), vec![1, 3]);
        assert!(evaluate(&idx, "-dog").is_empty());
    }

    #[test]
    fn query_terms_are_stemmed() {
        let idx = pets();
        assert_eq!(ids(evaluate(&idx, "cats")), vec![1, 2, 3]);
        assert_eq!(ids(evaluate(&idx, "Cats -Dogs")), vec![1, 3]);
    }

    #[test]
    fn unknown_first_term_short_circuits() {
        let idx = pets();
        assert!(evaluate(&idx, "unicorn cat").is_empty());
        assert!(evaluate(&idx, "cat unicorn").is_empty());
    }

    #[test]
    fn empty_and_unrecognized_queries_are_empty() {
        let idx = pets();
        assert!(evaluate(&idx, "").is_empty());
        assert!(evaluate(&idx, "NOT").is_empty());
        assert_eq!(ids(evaluate(&idx, "- cat")), vec![1, 2, 3]);
    }

    #[test]
    fn result_is_detached_from_the_index() {
        let mut idx = pets();
        let before = evaluate(&idx, "cat");
        idx.insert("cat", 4);
        assert_eq!(ids(before), vec![1, 2, 3]);
    }
}
