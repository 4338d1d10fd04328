//! Feeds document text into an index (and optionally a frequency table).

use crate::index::{DocId, InvertedIndex};
use crate::stemmer::normalize;
use crate::tokenizer::tokenize;
use crate::zipf::FrequencyTable;

/// Tokenize and stem `text`, inserting every non-empty stem under `doc_id`.
/// Returns the number of stems indexed.
pub fn index_document(index: &mut InvertedIndex, text: &str, doc_id: DocId) -> usize {
    index_stems(index, None, text, doc_id)
}

/// As [`index_document`], also counting each stem occurrence in `freq`.
pub fn index_document_with_zipf(
    index: &mut InvertedIndex,
    freq: &mut FrequencyTable,
    text: &str,
    doc_id: DocId,
) -> usize {
    index_stems(index, Some(freq), text, doc_id)
}

fn index_stems(
    index: &mut InvertedIndex,
    mut freq: Option<&mut FrequencyTable>,
    text: &str,
    doc_id: DocId,
) -> usize {
    let mut indexed = 0;
    for token in tokenize(text) {
        let stem = normalize(&token);
        if stem.is_empty() {
            continue;
        }
        index.insert(&stem, doc_id);
        if let Some(freq) = freq.as_deref_mut() {
            freq.record(&stem);
        }
        indexed += 1;
    }
    tracing::debug!(doc_id, stems = indexed, "document indexed");
    indexed
}
