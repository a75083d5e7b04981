//! Static analysis backend for Uva sources.
//!
//! One request (an input file plus the buffer holding its current content)
//! yields one [`Report`]: style-lint findings and a cross-reference of
//! top-level class declarations, serialized as JSON for editors and build
//! pipelines. The flow for a request is:
//!
//!   source files -> token stream -> { lint, resolve } -> report
//!
//! Nothing survives between requests.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Inputs: file access and the token stream
// ---------------------------------------------------------------------

pub mod source;
pub mod tokens;

// ---------------------------------------------------------------------
// Analysis passes
// ---------------------------------------------------------------------

pub mod lint;
pub mod resolve;

// ---------------------------------------------------------------------
// Output and orchestration
// ---------------------------------------------------------------------

pub mod driver;
pub mod report;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use driver::{AnalyzerOptions, analyze, run_request, serve};
pub use error::AnalyzerError;
pub use report::Report;
pub use source::{Request, SourceFiles};
