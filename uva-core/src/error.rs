use std::path::PathBuf;

use thiserror::Error;

use crate::span::SourcePosition;

/// Faults raised by the front end (lexer, preprocessor, parser).
///
/// None of these are fatal to an analysis request: every front-end entry
/// point hands back whatever it produced before the fault inside a
/// [`Recovered`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("lex error at {}:{position}: {message}", file.display())]
    LexError {
        file: PathBuf,
        position: SourcePosition,
        message: String,
    },
    #[error("parse error at {}:{position}: {message}", file.display())]
    ParseError {
        file: PathBuf,
        position: SourcePosition,
        message: String,
    },
    #[error("parse error: unexpected end of input, {0}")]
    UnexpectedEof(String),
    #[error("failed to include {}: {source}", path.display())]
    IncludeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("include cycle detected at {}", .0.display())]
    IncludeCycle(PathBuf),
    #[error("includes nested deeper than {limit} levels at {}", path.display())]
    IncludeTooDeep { path: PathBuf, limit: usize },
    #[error("directive at {}:{position}: {message}", file.display())]
    DirectiveError {
        file: PathBuf,
        position: SourcePosition,
        message: String,
    },
}

/// A front-end artifact together with the faults hit while producing it.
///
/// An empty `faults` list means the artifact is complete. Otherwise `value`
/// holds the partial artifact built before (or around) the faults, and the
/// caller decides whether to proceed with it.
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    pub faults: Vec<CoreError>,
}

impl<T> Recovered<T> {
    pub fn complete(value: T) -> Self {
        Self {
            value,
            faults: Vec::new(),
        }
    }

    pub fn partial(value: T, fault: CoreError) -> Self {
        Self {
            value,
            faults: vec![fault],
        }
    }

    pub fn is_complete(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<CoreError>) {
        (self.value, self.faults)
    }
}
