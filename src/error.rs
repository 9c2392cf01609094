// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use crate::lexer::Position;

/// The main error type for manifest lexing, parsing and editing.
#[derive(Debug, Clone, PartialEq)]
pub enum ModfileError {
    /// Raised by the lexer for unterminated strings and illegal characters.
    LexError {
        position: Position,
        reason: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised by the parser when the token stream does not match the grammar.
    ParseError {
        position: Position,
        expected: String,
        found: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    DuplicateEntry {
        name: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    NotFound {
        name: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for malformed mutation input, such as a property with a non-symbol key.
    InvalidInput {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    SemVerParse {
        input: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    ConfigError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

impl ModfileError {
    pub fn code(&self) -> Option<u32> {
        match self {
            ModfileError::LexError { code, .. }
            | ModfileError::ParseError { code, .. }
            | ModfileError::DuplicateEntry { code, .. }
            | ModfileError::NotFound { code, .. }
            | ModfileError::InvalidInput { code, .. }
            | ModfileError::SemVerParse { code, .. }
            | ModfileError::FileError { code, .. }
            | ModfileError::ConfigError { code, .. } => *code,
        }
    }

    /// Lex and parse errors abort a whole parse; everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModfileError::LexError { .. } | ModfileError::ParseError { .. })
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        ModfileError::NotFound {
            name: name.into(),
            hint: Some("Check the entry name, names are case-sensitive".into()),
            code: Some(402),
        }
    }

    pub(crate) fn duplicate_entry(name: impl Into<String>) -> Self {
        ModfileError::DuplicateEntry {
            name: name.into(),
            hint: Some("Edit the existing entry instead of adding it again".into()),
            code: Some(401),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>, hint: Option<&str>) -> Self {
        ModfileError::InvalidInput {
            message: message.into(),
            hint: hint.map(str::to_string),
            code: Some(403),
        }
    }
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl fmt::Display for ModfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModfileError::LexError { position, reason, hint, code } =>
                write!(f, "[MODFILE] Lex Error at {}:{}: {}{}",
                    position.line, position.column, reason, suffix(hint, code)
                ),
            ModfileError::ParseError { position, expected, found, hint, code } =>
                write!(f, "[MODFILE] Parse Error at {}:{}: expected {}, found {}{}",
                    position.line, position.column, expected, found, suffix(hint, code)
                ),
            ModfileError::DuplicateEntry { name, hint, code } =>
                write!(f, "[MODFILE] Duplicate Entry '{}'{}", name, suffix(hint, code)),
            ModfileError::NotFound { name, hint, code } =>
                write!(f, "[MODFILE] Not Found '{}'{}", name, suffix(hint, code)),
            ModfileError::InvalidInput { message, hint, code } =>
                write!(f, "[MODFILE] Invalid Input: {}{}", message, suffix(hint, code)),
            ModfileError::SemVerParse { input, hint, code } =>
                write!(f, "[MODFILE] Could not parse '{}' as a semantic version{}", input, suffix(hint, code)),
            ModfileError::FileError { message, path, hint, code } =>
                write!(f, "[MODFILE] File Error '{}': {}{}", path, message, suffix(hint, code)),
            ModfileError::ConfigError { message, hint, code } =>
                write!(f, "[MODFILE] Config Error: {}{}", message, suffix(hint, code)),
        }
    }
}

impl std::error::Error for ModfileError {}
