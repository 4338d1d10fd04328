use crate::error::{Error, Result};
use crate::zipf::ZipfReport;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Open `path` for writing, truncating any existing file.
pub fn open_for_write(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).map_err(|e| Error::io(path, e))?;
    Ok(BufWriter::new(f))
}

/// Write `report` as CSV to `path`. Nothing is written if the file cannot be
/// opened.
pub fn export_csv<P: AsRef<Path>>(report: &ZipfReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let out = open_for_write(path)?;
    report.write_csv(out).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), rows = report.len(), "zipf report exported");
    Ok(())
}
