use std::path::PathBuf;

use thiserror::Error;

/// Faults that end the analyzer process.
///
/// Front-end faults are not in here: those are recovered from inside a
/// request and never abort it.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("input file '{}' does not exist", .0.display())]
    InputMissing(PathBuf),
    #[error("input file '{}' is not a regular file", .0.display())]
    InputNotRegular(PathBuf),
    #[error("failed to read buffer file '{}': {source}", path.display())]
    BufferRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read request: {0}")]
    RequestRead(#[source] std::io::Error),
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
