// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::Chars;

use crate::ModfileError;

mod scanner;
mod tokenizer;

/// Location of a token in the source text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `mod` at the start of a line
    Keyword,
    /// `forge` at the start of a line
    ForgeKeyword,
    String,
    Symbol,
    Comment,
    Punctuation,
    Assign,
    Whitespace,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword 'mod'",
            TokenKind::ForgeKeyword => "keyword 'forge'",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Comment => "comment",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Assign => "'=>'",
            TokenKind::Whitespace => "whitespace",
        };
        f.write_str(name)
    }
}

/// A lexed token. For strings `text` holds the contents between the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == 1 && self.text.starts_with(ch)
    }

    /// Short human readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::String => format!("string '{}'", self.text),
            TokenKind::Keyword | TokenKind::ForgeKeyword | TokenKind::Assign => self.kind.to_string(),
            _ => format!("{} `{}`", self.kind, self.text),
        }
    }
}

/// Single-pass tokenizer. Not restartable: create a new lexer to lex again.
pub struct Lexer<'a> {
    input: Chars<'a>,
    peek: Option<char>,
    line: usize,
    column: usize,
    offset: usize,
    at_line_start: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input: input.chars(),
            peek: None,
            line: 1,
            column: 0,
            offset: 0,
            at_line_start: true,
            finished: false,
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    /// Position of the next unread character.
    pub fn current_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
            offset: self.offset,
        }
    }

    /// Next token including whitespace runs. `Ok(None)` marks the end of input.
    pub fn next_raw(&mut self) -> Result<Option<Token>, ModfileError> {
        if self.finished {
            return Ok(None);
        }
        match tokenizer::next_raw_token(self) {
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
            ok => ok,
        }
    }

    /// Next significant token; whitespace is elided.
    pub fn next_token(&mut self) -> Result<Option<Token>, ModfileError> {
        loop {
            match self.next_raw()? {
                Some(t) if t.is(TokenKind::Whitespace) => continue,
                other => return Ok(other),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ModfileError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_raw().transpose()
    }
}

/// Lex the whole input, dropping whitespace tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ModfileError> {
    Lexer::new(input)
        .filter(|t| !matches!(t, Ok(t) if t.is(TokenKind::Whitespace)))
        .collect()
}
