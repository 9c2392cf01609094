use super::*;
use crate::ast::{Property, Value};

pub(super) fn at_value(parser: &Parser) -> bool {
    parser
        .peek()
        .is_some_and(|t| t.is(TokenKind::String) || t.is(TokenKind::Symbol))
}

pub(super) fn parse_value(parser: &mut Parser) -> Result<Value, ModfileError> {
    match parser.peek().map(|t| t.kind) {
        Some(TokenKind::String) => Ok(Value::QuotedString(parser.bump()?.text)),
        Some(TokenKind::Symbol) => Ok(Value::Symbol(parser.bump()?.text)),
        _ => Err(parser.unexpected("quoted string or symbol", None)),
    }
}

/// `Value (=> Value)? ,?`
pub(super) fn parse_property(parser: &mut Parser) -> Result<Property, ModfileError> {
    let keyed = parser
        .peek_nth(1)?
        .is_some_and(|t| t.is(TokenKind::Assign));

    let key = parse_value(parser)?;
    let value = if keyed {
        parser.bump()?; // consume =>
        Some(parse_value(parser)?)
    } else {
        None
    };

    if parser.peek().is_some_and(|t| t.is_punct(',')) {
        parser.bump()?;
    }

    Ok(Property { key, value })
}
