//! Term frequency counting and rank-frequency (Zipf) reports.

use crate::table::ChainedTable;
use serde::Serialize;
use std::io::{self, Write};

pub const DEFAULT_FREQUENCY_BUCKETS: usize = 1_000;

pub const CSV_HEADER: &str = "rank,freq,zipf_approx";

/// Occurrence counts per term, on the same chained hashing as the index.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    table: ChainedTable<u64>,
    buckets: usize,
}

impl Default for FrequencyTable {
    fn default() -> Self { Self::new() }
}

impl FrequencyTable {
    pub fn new() -> Self { Self::with_buckets(DEFAULT_FREQUENCY_BUCKETS) }

    pub fn with_buckets(buckets: usize) -> Self {
        Self { table: ChainedTable::with_buckets(buckets), buckets: buckets.max(1) }
    }

    /// Drop all counts.
    pub fn init(&mut self) {
        self.table.reset(self.buckets);
        tracing::debug!(buckets = self.buckets, "frequency table initialized");
    }

    /// Count one occurrence of `term`. Empty terms are ignored.
    pub fn record(&mut self, term: &str) {
        if term.is_empty() {
            return;
        }
        if !self.table.is_allocated() {
            tracing::warn!("record into a torn-down frequency table; reinitializing");
            self.init();
        }
        if let Some((count, _)) = self.table.get_or_insert_with(term, || 0) {
            *count += 1;
        }
    }

    pub fn count(&self, term: &str) -> Option<u64> {
        self.table.get(term).copied()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.len() == 0 }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.table.iter().map(|(_, n)| *n).sum()
    }

    pub fn bucket_count(&self) -> usize { self.table.bucket_count() }

    pub fn teardown(&mut self) {
        self.table.release();
    }

    /// Snapshot of every entry, most frequent first. Equal counts are ordered
    /// by term so repeated reports over the same table agree.
    pub fn report(&self) -> ZipfReport {
        let mut entries: Vec<TermFrequency> = self
            .table
            .iter()
            .map(|(term, &frequency)| TermFrequency { term: term.to_string(), frequency })
            .collect();
        entries.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.term.cmp(&b.term)));
        ZipfReport { entries }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermFrequency {
    pub term: String,
    pub frequency: u64,
}

/// One CSV line: 1-based rank, observed count, and `max_frequency / rank`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZipfRow {
    pub rank: usize,
    pub frequency: u64,
    pub fitted: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ZipfReport {
    entries: Vec<TermFrequency>,
}

impl ZipfReport {
    pub fn entries(&self) -> &[TermFrequency] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn max_frequency(&self) -> Option<u64> {
        self.entries.first().map(|e| e.frequency)
    }

    pub fn rows(&self) -> impl Iterator<Item = ZipfRow> + '_ {
        let max = self.max_frequency().unwrap_or(0) as f64;
        self.entries.iter().enumerate().map(move |(i, e)| {
            let rank = i + 1;
            ZipfRow { rank, frequency: e.frequency, fitted: max / rank as f64 }
        })
    }

    /// Header line followed by one `rank,freq,zipf_approx` line per entry.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{CSV_HEADER}")?;
        for row in self.rows() {
            writeln!(out, "{},{},{}", row.rank, row.frequency, row.fitted)?;
        }
        out.flush()
    }
}
