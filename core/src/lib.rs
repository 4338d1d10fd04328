pub mod builder;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod export;
pub mod index;
pub mod query;
pub mod stemmer;
mod table;
pub mod tokenizer;
pub mod zipf;

pub use config::EngineConfig;
pub use corpus::{DocMeta, Document};
pub use engine::{SearchEngine, SharedEngine};
pub use error::{Error, Result};
pub use index::{difference, intersect, DocId, IndexEntry, IndexStats, InvertedIndex, PostingList};
pub use table::term_hash;
pub use zipf::{FrequencyTable, TermFrequency, ZipfReport, ZipfRow};
