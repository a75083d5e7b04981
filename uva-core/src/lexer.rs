//! Lexer for the Uva language.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Recovered};
use crate::span::SourcePosition;

/// Broad lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Identifier,
    Keyword,
    Literal,
    Operator,
    Delimiter,
    /// `#name`, consumed by the preprocessor.
    Directive,
}

/// Finer classification inside a category.
///
/// Only literals carry a meaningful subkind; every other token is `Plain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Plain,
}

/// A single lexical unit.
///
/// `origin_file` is the file the text was physically read from. After
/// preprocessing it can differ from the file named in the analysis request.
///
/// For string literals `position` points at the opening quote and `text`
/// holds the raw characters between the quotes, escapes left undecoded.
/// Invalid UTF-8 inside `text` is replaced, so `length` is the only exact
/// measure of the token's extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub origin_file: PathBuf,
    pub position: SourcePosition,
    pub category: TokenCategory,
    pub kind: TokenKind,
    pub text: String,
    /// Byte length of the token in its origin file, quotes included.
    pub length: usize,
}

impl Token {
    pub fn is(&self, category: TokenCategory, text: &str) -> bool {
        self.category == category && self.text == text
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenCategory::Keyword, keyword)
    }

    pub fn is_string_literal(&self) -> bool {
        self.category == TokenCategory::Literal && self.kind == TokenKind::String
    }
}

/// Lex the raw bytes of `source`, tagging every token with `origin`.
///
/// Offsets are byte offsets into `source` even when it is not valid UTF-8.
/// Invalid bytes are tolerated inside comments and string literals.
///
/// Lexing stops at the first malformed construct; the tokens produced up to
/// that point are returned alongside the fault.
pub fn tokenize(origin: &Path, source: impl AsRef<[u8]>) -> Recovered<Vec<Token>> {
    let mut lexer = Lexer {
        origin,
        bytes: source.as_ref(),
        index: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
    };
    match lexer.run() {
        Ok(()) => Recovered::complete(lexer.tokens),
        Err(fault) => Recovered::partial(lexer.tokens, fault),
    }
}

struct Lexer<'src> {
    origin: &'src Path,
    bytes: &'src [u8],
    index: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn run(&mut self) -> Result<(), CoreError> {
        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) {
                self.consume_char();
                continue;
            }

            let start = self.position();
            match ch {
                b'/' if self.peek_next() == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_next() == Some(b'*') => self.skip_block_comment(start)?,
                b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b';' | b':' => {
                    self.consume_char();
                    self.push_token(TokenCategory::Delimiter, TokenKind::Plain, start);
                }
                b'=' | b'!' | b'<' | b'>' => {
                    // Optional trailing '=' for ==, !=, <=, >=
                    self.consume_char();
                    if self.peek_char() == Some(b'=') {
                        self.consume_char();
                    }
                    self.push_token(TokenCategory::Operator, TokenKind::Plain, start);
                }
                b'&' | b'|' => {
                    if self.peek_next() != Some(ch) {
                        return Err(self.unexpected_char(start));
                    }
                    self.consume_char();
                    self.consume_char();
                    self.push_token(TokenCategory::Operator, TokenKind::Plain, start);
                }
                b'+' | b'-' | b'*' | b'/' | b'%' | b'.' => {
                    self.consume_char();
                    self.push_token(TokenCategory::Operator, TokenKind::Plain, start);
                }
                b'\'' | b'"' => self.lex_string(ch, start)?,
                b'#' => self.lex_directive(start)?,
                b'0'..=b'9' => self.lex_number(start),
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(start),
                _ => return Err(self.unexpected_char(start)),
            }
        }
        Ok(())
    }

    fn push_token(&mut self, category: TokenCategory, kind: TokenKind, start: SourcePosition) {
        let bytes = self.bytes;
        self.push_text(category, kind, start, &bytes[start.offset..self.index]);
    }

    fn push_text(
        &mut self,
        category: TokenCategory,
        kind: TokenKind,
        start: SourcePosition,
        text: &[u8],
    ) {
        self.tokens.push(Token {
            origin_file: self.origin.to_path_buf(),
            position: start,
            category,
            kind,
            text: String::from_utf8_lossy(text).into_owned(),
            length: self.index - start.offset,
        });
    }

    fn error(&self, position: SourcePosition, message: impl Into<String>) -> CoreError {
        CoreError::LexError {
            file: self.origin.to_path_buf(),
            position,
            message: message.into(),
        }
    }

    fn unexpected_char(&self, start: SourcePosition) -> CoreError {
        let rest = &self.bytes[start.offset..];
        // A char is at most four bytes long
        let ch = String::from_utf8_lossy(&rest[..rest.len().min(4)])
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.error(start, format!("unexpected character {ch:?}"))
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == b'\n' {
                break;
            }
            self.consume_char();
        }
    }

    fn skip_block_comment(&mut self, start: SourcePosition) -> Result<(), CoreError> {
        self.consume_char(); // '/'
        self.consume_char(); // '*'
        while let Some(ch) = self.peek_char() {
            if ch == b'*' && self.peek_next() == Some(b'/') {
                self.consume_char();
                self.consume_char();
                return Ok(());
            }
            self.consume_char();
        }
        Err(self.error(start, "unterminated block comment"))
    }

    fn lex_string(&mut self, quote: u8, start: SourcePosition) -> Result<(), CoreError> {
        // Consume the opening quote
        self.consume_char();

        let content_start = self.index;
        while let Some(ch) = self.peek_char() {
            match ch {
                _ if ch == quote => {
                    let content_end = self.index;
                    self.consume_char(); // closing quote
                    let bytes = self.bytes;
                    let text = &bytes[content_start..content_end];
                    self.push_text(TokenCategory::Literal, TokenKind::String, start, text);
                    return Ok(());
                }
                b'\\' => {
                    // Skip over escape sequence: backslash + next char (if any)
                    self.consume_char();
                    if self.peek_char().is_some() {
                        self.consume_char();
                    }
                }
                _ => self.consume_char(),
            }
        }

        Err(self.error(start, "unterminated string literal"))
    }

    fn lex_directive(&mut self, start: SourcePosition) -> Result<(), CoreError> {
        self.consume_char(); // '#'
        let name_start = self.index;
        if !self.peek_char().is_some_and(is_ident_start) {
            return Err(self.error(start, "expected directive name after '#'"));
        }
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }
        let bytes = self.bytes;
        let name = &bytes[name_start..self.index];
        self.push_text(TokenCategory::Directive, TokenKind::Plain, start, name);
        Ok(())
    }

    fn lex_number(&mut self, start: SourcePosition) {
        // digits [ '.' digits ]?
        while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
            self.consume_char();
        }

        let mut kind = TokenKind::Integer;
        if self.peek_char() == Some(b'.') && self.peek_next().is_some_and(|ch| ch.is_ascii_digit())
        {
            kind = TokenKind::Float;
            self.consume_char(); // '.'
            while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
                self.consume_char();
            }
        }

        self.push_token(TokenCategory::Literal, kind, start);
    }

    fn lex_ident_or_keyword(&mut self, start: SourcePosition) {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }

        let bytes = self.bytes;
        let text = String::from_utf8_lossy(&bytes[start.offset..self.index]);
        let (category, kind) = match &*text {
            "true" | "false" => (TokenCategory::Literal, TokenKind::Boolean),
            "null" => (TokenCategory::Literal, TokenKind::Null),
            _ if KEYWORDS.contains(&&*text) => (TokenCategory::Keyword, TokenKind::Plain),
            _ => (TokenCategory::Identifier, TokenKind::Plain),
        };
        self.push_token(category, kind, start);
    }

    fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.index)
    }

    fn peek_char(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };
        self.index += 1;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if !is_utf8_continuation(ch) {
            self.column += 1;
        }
    }
}

pub const KEYWORDS: &[&str] = &[
    "class", "extends", "end", "function", "let", "var", "const", "if", "else", "while",
    "return", "and", "or", "not", "self",
];

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

fn is_utf8_continuation(ch: u8) -> bool {
    ch & 0xC0 == 0x80
}
