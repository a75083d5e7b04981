//! Directive expansion over a token stream.
//!
//! The only directive is `#include 'path'`, which splices the tokens of
//! another file in place of the directive. Spliced tokens keep the included
//! file as their `origin_file`, so downstream passes can find the bytes they
//! were read from.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{CoreError, Recovered};
use crate::lexer::{Token, TokenCategory, tokenize};

/// Deepest chain of nested includes followed before giving up.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// Expand every directive in `tokens`.
///
/// Faults never abort expansion: the offending directive is dropped, the
/// fault is recorded, and the remaining tokens are still processed.
pub fn preprocess(primary: &Path, tokens: Vec<Token>) -> Recovered<Vec<Token>> {
    let mut preprocessor = Preprocessor {
        stack: vec![normalize(primary)],
        faults: Vec::new(),
    };
    let value = preprocessor.expand(tokens);
    Recovered {
        value,
        faults: preprocessor.faults,
    }
}

struct Preprocessor {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    faults: Vec<CoreError>,
}

impl Preprocessor {
    fn expand(&mut self, tokens: Vec<Token>) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut tokens = tokens.into_iter().peekable();

        while let Some(token) = tokens.next() {
            if token.category != TokenCategory::Directive {
                output.push(token);
                continue;
            }

            match token.text.as_str() {
                "include" => match tokens.next_if(Token::is_string_literal) {
                    Some(operand) => self.include(&token, &operand.text, &mut output),
                    None => self
                        .faults
                        .push(directive_error(&token, "#include expects a quoted path")),
                },
                other => {
                    let message = format!("unknown directive '#{other}'");
                    self.faults.push(directive_error(&token, message));
                }
            }
        }

        output
    }

    fn include(&mut self, directive: &Token, target: &str, output: &mut Vec<Token>) {
        let base = directive.origin_file.parent().unwrap_or(Path::new(""));
        let path = normalize(&base.join(target));

        if self.stack.contains(&path) {
            self.faults.push(CoreError::IncludeCycle(path));
            return;
        }
        if self.stack.len() > MAX_INCLUDE_DEPTH {
            self.faults.push(CoreError::IncludeTooDeep {
                path,
                limit: MAX_INCLUDE_DEPTH,
            });
            return;
        }

        let source = match fs::read(&path) {
            Ok(source) => source,
            Err(source) => {
                self.faults.push(CoreError::IncludeIo { path, source });
                return;
            }
        };

        debug!(path = %path.display(), depth = self.stack.len(), "expanding include");
        let (tokens, faults) = tokenize(&path, &source).into_parts();
        self.faults.extend(faults);

        self.stack.push(path);
        let expanded = self.expand(tokens);
        self.stack.pop();
        output.extend(expanded);
    }
}

fn directive_error(token: &Token, message: impl Into<String>) -> CoreError {
    CoreError::DirectiveError {
        file: token.origin_file.clone(),
        position: token.position,
        message: message.into(),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
