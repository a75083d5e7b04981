//! The preprocessed token stream shared by the lint and resolver passes.

use std::ops::Index;
use std::slice;

use uva_core::{Recovered, Token, preprocess, tokenize};

use crate::source::SourceFiles;

/// Ordered, indexable view over the tokens of one request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Lex the buffer as the primary file, then expand its directives.
    ///
    /// A lex fault still lets preprocessing run over the tokens produced
    /// before it; faults from both stages are collected.
    pub fn load(files: &SourceFiles) -> Recovered<Self> {
        let primary = files.primary_path();
        let (tokens, mut faults) = tokenize(primary, files.buffer()).into_parts();
        let (tokens, preprocess_faults) = preprocess(primary, tokens).into_parts();
        faults.extend(preprocess_faults);
        Recovered {
            value: Self { tokens },
            faults,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
