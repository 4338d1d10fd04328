use crate::builder;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::export;
use crate::index::{DocId, IndexStats, InvertedIndex, PostingList};
use crate::query;
use crate::zipf::{FrequencyTable, ZipfReport};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Engine shared between threads: many concurrent searches, one writer.
pub type SharedEngine = Arc<RwLock<SearchEngine>>;

/// One inverted index plus one frequency table. Each instance is independent.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: EngineConfig,
    index: InvertedIndex,
    frequencies: FrequencyTable,
}

impl Default for SearchEngine {
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            index: InvertedIndex::with_buckets(config.index_buckets),
            frequencies: FrequencyTable::with_buckets(config.frequency_buckets),
        }
    }

    pub fn into_shared(self) -> SharedEngine { Arc::new(RwLock::new(self)) }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Empty both tables.
    pub fn init(&mut self) {
        self.index.init();
        self.frequencies.init();
        tracing::info!(
            index_buckets = self.config.index_buckets,
            frequency_buckets = self.config.frequency_buckets,
            "search engine initialized"
        );
    }

    /// Release all storage. Call [`init`](Self::init) before reuse.
    pub fn teardown(&mut self) {
        self.index.teardown();
        self.frequencies.teardown();
        tracing::info!("search engine torn down");
    }

    pub fn build_index_for_document(&mut self, text: &str, doc_id: DocId) -> usize {
        builder::index_document(&mut self.index, text, doc_id)
    }

    pub fn build_index_for_document_with_zipf(&mut self, text: &str, doc_id: DocId) -> usize {
        builder::index_document_with_zipf(&mut self.index, &mut self.frequencies, text, doc_id)
    }

    /// Matching document ids, ascending.
    pub fn boolean_search(&self, query: &str) -> Vec<DocId> {
        self.evaluate(query).into_vec()
    }

    pub fn evaluate(&self, query: &str) -> PostingList {
        query::evaluate(&self.index, query)
    }

    pub fn analyze_zipf(&self) -> ZipfReport {
        self.frequencies.report()
    }

    pub fn export_zipf_csv<P: AsRef<Path>>(&self, report: &ZipfReport, path: P) -> Result<()> {
        export::export_csv(report, path)
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn frequencies(&self) -> &FrequencyTable { &self.frequencies }

    pub fn stats(&self) -> IndexStats { self.index.stats() }
}
