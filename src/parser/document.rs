use super::*;
use crate::ast::{Comment, Entry, Preamble, Statement};

pub(super) fn parse_document(parser: &mut Parser) -> Result<Document, ModfileError> {
    let mut doc = Document::new();

    // Comments may sit above the forge line
    while let Some(tok) = parser.peek() {
        if !tok.is(TokenKind::Comment) {
            break;
        }
        let comment = parse_comment(parser)?;
        doc.statements.push(Statement::Comment(comment));
    }

    if parser.peek().is_some_and(|t| t.is(TokenKind::ForgeKeyword)) {
        doc.preamble = Some(parse_preamble(parser)?);
    }

    while let Some(tok) = parser.peek() {
        match tok.kind {
            TokenKind::Keyword => {
                let entry = parse_entry(parser)?;
                let id = doc.push_entry(entry);
                doc.statements.push(Statement::Entry(id));
            }
            TokenKind::Comment => {
                let comment = parse_comment(parser)?;
                doc.statements.push(Statement::Comment(comment));
            }
            TokenKind::ForgeKeyword => {
                return Err(parser.unexpected(
                    "'mod' or a comment",
                    Some("Only one forge line is allowed and it must precede every mod"),
                ));
            }
            _ => {
                return Err(parser.unexpected(
                    "'mod' or a comment",
                    Some("Properties must follow a mod declaration"),
                ));
            }
        }
    }

    doc.canonicalize();
    Ok(doc)
}

fn parse_comment(parser: &mut Parser) -> Result<Comment, ModfileError> {
    let tok = parser.bump()?;
    Ok(Comment {
        text: tok.text,
        position: Some(tok.position),
    })
}

fn parse_preamble(parser: &mut Parser) -> Result<Preamble, ModfileError> {
    let keyword = parser.bump()?;
    let url = parser.expect(TokenKind::String, "quoted forge URL")?;
    Ok(Preamble {
        url: url.text,
        position: Some(keyword.position),
    })
}

fn parse_entry(parser: &mut Parser) -> Result<Entry, ModfileError> {
    let keyword = parser.bump()?;

    let name_position = parser.position();
    let name = parser.expect(TokenKind::String, "quoted module name")?;
    if name.text.trim().is_empty() {
        return Err(ModfileError::ParseError {
            position: name_position,
            expected: "non-empty module name".into(),
            found: "''".into(),
            hint: None,
            code: Some(203),
        });
    }

    if parser.peek().is_some_and(|t| t.is_punct(',')) {
        parser.bump()?;
    }

    let mut properties = Vec::new();
    while value::at_value(parser) {
        properties.push(value::parse_property(parser)?);
    }

    Ok(Entry {
        name: name.text,
        properties,
        position: Some(keyword.position),
    })
}
