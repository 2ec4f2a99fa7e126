use std::path::PathBuf;

/// Every failure the crawl can hit, with one propagation policy per
/// kind: `FileNotFound` is recovered at the site of the missing file,
/// `Parse` aborts the crawl, `CacheIo` always propagates.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// A dependency path does not exist on disk, e.g. an import into
    /// an output directory that hasn't been built.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The parser could not produce an analyzable result for a file.
    #[error("could not parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Reading or writing the persisted cache failed.
    #[error("cache I/O failed for {path}: {message}")]
    CacheIo { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
