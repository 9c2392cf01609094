use std::collections::VecDeque;

use crate::ast::Document;
use crate::lexer::{Lexer, Position, Token, TokenKind};
use crate::ModfileError;

mod document;
mod value;

/// Tokens the grammar may need to see before committing to a production.
const MAX_LOOKAHEAD: usize = 3;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, ModfileError> {
        let mut parser = Self {
            lexer: Lexer::new(input),
            lookahead: VecDeque::with_capacity(MAX_LOOKAHEAD),
        };
        parser.fill(1)?;
        Ok(parser)
    }

    fn fill(&mut self, count: usize) -> Result<(), ModfileError> {
        while self.lookahead.len() < count {
            match self.lexer.next_token()? {
                Some(tok) => self.lookahead.push_back(tok),
                None => break,
            }
        }
        Ok(())
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.lookahead.front()
    }

    /// Look `n` tokens past the current one (`n < 3`).
    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>, ModfileError> {
        debug_assert!(n < MAX_LOOKAHEAD);
        self.fill(n + 1)?;
        Ok(self.lookahead.get(n))
    }

    pub(crate) fn bump(&mut self) -> Result<Token, ModfileError> {
        let curr = self.lookahead.pop_front().ok_or_else(|| ModfileError::ParseError {
            position: self.lexer.current_position(),
            expected: "more input".into(),
            found: "end of input".into(),
            hint: None,
            code: Some(201),
        })?;
        self.fill(1)?;
        Ok(curr)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ModfileError> {
        match self.peek() {
            Some(tok) if tok.is(kind) => self.bump(),
            _ => Err(self.unexpected(expected, None)),
        }
    }

    /// Build a parse error describing the current token.
    pub(crate) fn unexpected(&self, expected: &str, hint: Option<&str>) -> ModfileError {
        let (position, found) = match self.peek() {
            Some(tok) => (tok.position, tok.describe()),
            None => (self.lexer.current_position(), "end of input".to_string()),
        };
        ModfileError::ParseError {
            position,
            expected: expected.to_string(),
            found,
            hint: hint.map(str::to_string),
            code: Some(202),
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.peek().map_or_else(|| self.lexer.current_position(), |t| t.position)
    }

    /// Parse the full input into a canonicalized document.
    pub fn parse_document(&mut self) -> Result<Document, ModfileError> {
        document::parse_document(self)
    }
}

/// Parse manifest text into a canonicalized [`Document`].
pub fn parse(text: &str) -> Result<Document, ModfileError> {
    tracing::trace!(len = text.len(), "parsing manifest");
    let mut parser = Parser::new(text)?;
    let doc = parser.parse_document()?;
    tracing::debug!(entries = doc.entry_count(), statements = doc.statements().len(), "parsed manifest");
    Ok(doc)
}
