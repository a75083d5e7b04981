//! File access for a single analysis request.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::AnalyzerError;

/// One analysis request: the file being analyzed and the buffer holding the
/// content to analyze (an editor's unsaved snapshot, or the file itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub input_path: PathBuf,
    pub buffer_path: PathBuf,
}

impl Request {
    pub fn new(input_path: impl Into<PathBuf>, buffer_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            buffer_path: buffer_path.into(),
        }
    }

    /// A request whose buffer is the input file itself.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path)
    }
}

/// The loaded inputs of a request.
///
/// `primary` is the absolute identity of the analyzed file; tokens lexed from
/// the buffer carry it as their origin. `buffer` holds the raw bytes offsets
/// in those tokens were computed against; it is never re-encoded.
#[derive(Debug)]
pub struct SourceFiles {
    primary: PathBuf,
    buffer: Vec<u8>,
}

impl SourceFiles {
    pub fn new(primary: impl Into<PathBuf>, buffer: impl Into<Vec<u8>>) -> Self {
        Self {
            primary: primary.into(),
            buffer: buffer.into(),
        }
    }

    /// Resolve, validate and read the inputs of `request`.
    pub fn open(request: &Request) -> Result<Self, AnalyzerError> {
        let primary = std::path::absolute(&request.input_path)
            .map_err(|_| AnalyzerError::InputMissing(request.input_path.clone()))?;
        let buffer_path =
            std::path::absolute(&request.buffer_path).map_err(|source| AnalyzerError::BufferRead {
                path: request.buffer_path.clone(),
                source,
            })?;

        let metadata =
            fs::metadata(&primary).map_err(|_| AnalyzerError::InputMissing(primary.clone()))?;
        if !metadata.is_file() {
            return Err(AnalyzerError::InputNotRegular(primary));
        }

        let buffer = fs::read(&buffer_path).map_err(|source| AnalyzerError::BufferRead {
            path: buffer_path,
            source,
        })?;

        Ok(Self { primary, buffer })
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The raw byte at `offset` in the file `origin` as it stood during this
    /// request.
    ///
    /// The primary file is answered from the loaded buffer; any other origin
    /// is opened just for this lookup.
    pub fn byte_at(&self, origin: &Path, offset: usize) -> io::Result<u8> {
        if origin == self.primary {
            return self.buffer.get(offset).copied().ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "offset past end of buffer")
            });
        }

        let mut file = File::open(origin)?;
        file.seek(SeekFrom::Start(offset as u64))?;
        let mut byte = [0u8; 1];
        file.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_buffer_but_keeps_input_identity() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("main.uva");
        let buffer = dir.path().join("main.uva.snapshot");
        fs::write(&input, "saved").expect("write input");
        fs::write(&buffer, "unsaved edit").expect("write buffer");

        let files = SourceFiles::open(&Request::new(&input, &buffer)).expect("open");
        assert_eq!(files.primary_path(), input.as_path());
        assert_eq!(files.buffer(), b"unsaved edit");
    }

    #[test]
    fn buffer_bytes_are_kept_verbatim() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("main.uva");
        fs::write(&input, b"// \xff\n\"x\"").expect("write input");

        let files = SourceFiles::open(&Request::single(&input)).expect("open");
        assert_eq!(files.buffer().len(), 8);
        assert_eq!(files.byte_at(&input, 5).expect("quote byte"), b'"');
    }

    #[test]
    fn rejects_missing_input() {
        let dir = tempdir().expect("tempdir");
        let err = SourceFiles::open(&Request::single(dir.path().join("nope.uva"))).unwrap_err();
        assert!(matches!(err, AnalyzerError::InputMissing(_)));
        assert!(err.to_string().ends_with("does not exist"));
    }

    #[test]
    fn rejects_directory_input() {
        let dir = tempdir().expect("tempdir");
        let err = SourceFiles::open(&Request::single(dir.path())).unwrap_err();
        assert!(matches!(err, AnalyzerError::InputNotRegular(_)));
    }

    #[test]
    fn rejects_empty_input_path() {
        let err = SourceFiles::open(&Request::single("")).unwrap_err();
        assert!(matches!(err, AnalyzerError::InputMissing(_)));
    }

    #[test]
    fn unreadable_buffer_is_fatal() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("main.uva");
        fs::write(&input, "x").expect("write input");
        let err =
            SourceFiles::open(&Request::new(&input, dir.path().join("gone.tmp"))).unwrap_err();
        assert!(matches!(err, AnalyzerError::BufferRead { .. }));
    }

    #[test]
    fn byte_lookup_uses_buffer_for_primary_and_disk_for_others() {
        let dir = tempdir().expect("tempdir");
        let other = dir.path().join("other.uva");
        fs::write(&other, "let a = \"x\"").expect("write other");

        let primary = dir.path().join("main.uva");
        let files = SourceFiles::new(&primary, "'y'");
        assert_eq!(files.byte_at(&primary, 0).expect("primary byte"), b'\'');
        assert_eq!(files.byte_at(&other, 8).expect("other byte"), b'"');
        assert!(files.byte_at(&primary, 10).is_err());
        assert!(files.byte_at(&other, 100).is_err());
        assert!(files.byte_at(&dir.path().join("missing.uva"), 0).is_err());
    }
}
