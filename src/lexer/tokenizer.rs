use super::*;
use super::scanner::{at_word, bump, is_blank, is_word_char, peek_second};

pub(super) fn next_raw_token(lexer: &mut Lexer) -> Result<Option<Token>, ModfileError> {
    let start = lexer.current_position();

    let Some(ch) = lexer.peek else {
        return Ok(None);
    };

    if is_blank(ch) {
        return Ok(Some(tokenize_whitespace(lexer, start)));
    }

    let line_start = lexer.at_line_start;
    lexer.at_line_start = false;

    let token = match ch {
        'm' if line_start && at_word(lexer, "mod") => tokenize_keyword(lexer, start, "mod", TokenKind::Keyword),
        'f' if line_start && at_word(lexer, "forge") => tokenize_keyword(lexer, start, "forge", TokenKind::ForgeKeyword),
        '\'' => tokenize_string(lexer, start)?,
        '#' => tokenize_comment(lexer, start),
        ':' if peek_second(lexer).is_some_and(is_word_char) => tokenize_symbol(lexer, start),
        '=' if peek_second(lexer) == Some('>') => {
            bump(lexer);
            bump(lexer);
            token(TokenKind::Assign, "=>", start)
        }
        ',' | '@' | ':' | '.' => {
            bump(lexer);
            token(TokenKind::Punctuation, &ch.to_string(), start)
        }
        other => return Err(unexpected_char(lexer, other, start)),
    };

    Ok(Some(token))
}

fn token(kind: TokenKind, text: &str, position: Position) -> Token {
    Token {
        kind,
        text: text.to_string(),
        position,
    }
}

fn tokenize_whitespace(lexer: &mut Lexer, start: Position) -> Token {
    let mut text = String::new();
    while let Some(c) = lexer.peek {
        if !is_blank(c) {
            break;
        }
        text.push(c);
        bump(lexer);
    }
    Token {
        kind: TokenKind::Whitespace,
        text,
        position: start,
    }
}

fn tokenize_keyword(lexer: &mut Lexer, start: Position, word: &str, kind: TokenKind) -> Token {
    for _ in word.chars() {
        bump(lexer);
    }
    token(kind, word, start)
}

fn tokenize_string(lexer: &mut Lexer, start: Position) -> Result<Token, ModfileError> {
    bump(lexer); // opening quote
    let mut content = String::new();

    loop {
        match bump(lexer) {
            Some('\'') => break,
            Some('\\') => {
                // An escaped quote stays part of the raw contents
                content.push('\\');
                if let Some(next) = bump(lexer) {
                    content.push(next);
                }
            }
            Some(c) => content.push(c),
            None => {
                return Err(ModfileError::LexError {
                    position: start,
                    reason: "Unterminated string".into(),
                    hint: Some("String literal not closed, add a closing '".into()),
                    code: Some(101),
                });
            }
        }
    }

    Ok(Token {
        kind: TokenKind::String,
        text: content,
        position: start,
    })
}

fn tokenize_comment(lexer: &mut Lexer, start: Position) -> Token {
    let mut text = String::new();
    while let Some(c) = lexer.peek {
        if c == '\n' {
            break;
        }
        text.push(c);
        bump(lexer);
    }
    if text.ends_with('\r') {
        text.pop();
    }
    Token {
        kind: TokenKind::Comment,
        text,
        position: start,
    }
}

fn tokenize_symbol(lexer: &mut Lexer, start: Position) -> Token {
    let mut text = String::new();
    if let Some(colon) = bump(lexer) {
        text.push(colon);
    }
    while let Some(c) = lexer.peek {
        if !is_word_char(c) {
            break;
        }
        text.push(c);
        bump(lexer);
    }
    Token {
        kind: TokenKind::Symbol,
        text,
        position: start,
    }
}

fn unexpected_char(lexer: &mut Lexer, ch: char, start: Position) -> ModfileError {
    bump(lexer);
    ModfileError::LexError {
        position: start,
        reason: format!("Unexpected character '{}'", ch),
        hint: Some("Only mod/forge statements, quoted strings, symbols and comments are allowed".into()),
        code: Some(102),
    }
}
