use super::*;

/// Advance the character iterator and update line/column/offset tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = lexer.peek;
    if let Some(c) = curr {
        lexer.offset += c.len_utf8();
        if c == '\n' {
            lexer.line += 1;
            lexer.column = 0;
            lexer.at_line_start = true;
        } else {
            lexer.column += 1;
        }
    }
    lexer.peek = lexer.input.next();
    curr
}

/// Look at the character after the current one without consuming anything
pub(super) fn peek_second(lexer: &Lexer) -> Option<char> {
    lexer.input.clone().next()
}

/// True when the unread input starts with `word` and the word is not the
/// prefix of a longer identifier.
pub(super) fn at_word(lexer: &Lexer, word: &str) -> bool {
    let mut rest = std::iter::once(lexer.peek)
        .flatten()
        .chain(lexer.input.clone());
    for expected in word.chars() {
        if rest.next() != Some(expected) {
            return false;
        }
    }
    !matches!(rest.next(), Some(c) if is_word_char(c))
}

pub(super) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(super) fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
