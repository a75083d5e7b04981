//! Token-level lint rules.
//!
//! The engine walks the token stream once and asks every registered rule
//! about each token, so findings come out in token order regardless of how
//! many rules are installed.

use std::path::PathBuf;

use tracing::trace;
use uva_core::{SourcePosition, Token};

use crate::source::SourceFiles;
use crate::tokens::TokenStream;

/// A single lint diagnostic.
///
/// `length` is the byte span of the diagnostic starting at
/// `position.offset` in `origin_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub rule_id: &'static str,
    pub message: &'static str,
    pub origin_file: PathBuf,
    pub position: SourcePosition,
    pub length: usize,
}

/// A rule evaluated against one token at a time.
///
/// Rules never fail: anything that keeps a rule from deciding about a token
/// means no finding for that token.
pub trait LintRule {
    fn id(&self) -> &'static str;

    fn check(&self, token: &Token, files: &SourceFiles) -> Option<LintFinding>;
}

/// Double-quoted string literals without interpolation should use single
/// quotes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringDefaultSingleQuotes;

impl StringDefaultSingleQuotes {
    pub const ID: &'static str = "string-default-single-quotes";
    pub const MESSAGE: &'static str =
        "String literal without interpolation should use single quotes.";
    pub const INTERPOLATION_MARKER: &'static str = "${";
}

impl LintRule for StringDefaultSingleQuotes {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn check(&self, token: &Token, files: &SourceFiles) -> Option<LintFinding> {
        if !token.is_string_literal() {
            return None;
        }

        // The token text excludes the quotes, so the quote style has to be
        // read back from the file the token came from.
        let quote = match files.byte_at(&token.origin_file, token.position.offset) {
            Ok(byte) => byte,
            Err(err) => {
                trace!(
                    file = %token.origin_file.display(),
                    offset = token.position.offset,
                    %err,
                    "skipping string literal, quote lookup failed"
                );
                return None;
            }
        };

        if quote != b'"' || token.text.contains(Self::INTERPOLATION_MARKER) {
            return None;
        }

        Some(LintFinding {
            rule_id: Self::ID,
            message: Self::MESSAGE,
            origin_file: token.origin_file.clone(),
            position: token.position,
            length: token.length,
        })
    }
}

/// The set of rules run over each request.
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
}

impl Linter {
    pub fn new(rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { rules }
    }

    pub fn run(&self, tokens: &TokenStream, files: &SourceFiles) -> Vec<LintFinding> {
        tokens
            .iter()
            .flat_map(|token| {
                self.rules.iter().filter_map(move |rule| {
                    let finding = rule.check(token, files)?;
                    trace!(rule = rule.id(), offset = finding.position.offset, "finding");
                    Some(finding)
                })
            })
            .collect()
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(vec![Box::new(StringDefaultSingleQuotes)])
    }
}
