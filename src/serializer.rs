// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use crate::ast::{Comment, Document, Entry, Preamble, Property, Statement, Value};

const INDENT: &str = "  ";

/// Text form of a document node, as it appears in a manifest.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Value {
    fn render(&self) -> String {
        match self {
            Value::QuotedString(s) => format!("'{}'", s),
            Value::Symbol(s) => s.clone(),
        }
    }
}

impl Render for Property {
    fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{} => {}", self.key.render(), value.render()),
            None => self.key.render(),
        }
    }
}

impl Render for Entry {
    fn render(&self) -> String {
        let mut out = format!("mod '{}'", self.name);
        if self.properties.is_empty() {
            return out;
        }
        out.push(',');
        let last = self.properties.len() - 1;
        for (i, prop) in self.properties.iter().enumerate() {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(&prop.render());
            if i < last {
                out.push(',');
            }
        }
        out
    }
}

impl Render for Comment {
    fn render(&self) -> String {
        self.text.clone()
    }
}

impl Render for Preamble {
    fn render(&self) -> String {
        format!("forge '{}'", self.url)
    }
}

impl Document {
    pub(crate) fn render_statement(&self, stmt: &Statement) -> String {
        match stmt {
            Statement::Entry(id) => self.entry(*id).render(),
            Statement::Comment(c) => c.render(),
        }
    }

    fn render_body(&self) -> String {
        let body = self.body();
        let mut lines = Vec::with_capacity(body.len() * 2);
        for (i, stmt) in body.iter().enumerate() {
            lines.push(self.render_statement(stmt));
            // blank line between an entry and whatever follows it
            if stmt.entry_id().is_some() && i + 1 < body.len() {
                lines.push(String::new());
            }
        }
        lines.join("\n")
    }
}

impl Render for Document {
    fn render(&self) -> String {
        let header: Vec<String> = self.top_block_comments().map(Render::render).collect();
        let bottom: Vec<String> = self.bottom_block_comments().map(Render::render).collect();

        let sections = [
            header.join("\n"),
            self.preamble.as_ref().map(Render::render).unwrap_or_default(),
            self.render_body(),
            bottom.join("\n"),
        ];
        let mut out = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a document back to manifest text.
pub fn serialize(doc: &Document) -> String {
    let text = doc.render();
    tracing::trace!(len = text.len(), "serialized manifest");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Checksum;
    use crate::parser::parse;

    const MESSY: &str = "\
# Managed by ops
forge   'https://forgeapi.puppet.com'
mod 'b',   '1.0.0'
# @team: web
mod 'a',
    :git => 'https://x/a.git',
        :tag => 'v1.0.0',
# end
";

    const CANONICAL: &str = "\
# Managed by ops

forge 'https://forgeapi.puppet.com'

# @team: web
mod 'a',
  :git => 'https://x/a.git',
  :tag => 'v1.0.0'

mod 'b',
  '1.0.0'

# end
";

    #[test]
    fn test_serializes_canonical_layout() {
        let doc = parse(MESSY).expect("Failed to parse");
        assert_eq!(serialize(&doc), CANONICAL);
    }

    #[test]
    fn test_last_property_has_no_trailing_comma() {
        let with_comma = parse("mod 'a', :git => 'g', :branch => :main,\nmod 'b'\n").expect("Failed to parse");
        let text = serialize(&with_comma);
        assert!(text.contains("mod 'a',\n  :git => 'g',\n  :branch => :main\n\nmod 'b'"), "{text}");

        let without = parse("mod 'a', :git => 'g', :branch => :main\nmod 'b'\n").expect("Failed to parse");
        assert_eq!(serialize(&without), text);
    }

    #[test]
    fn test_canonical_text_is_a_fixed_point() {
        let doc = parse(CANONICAL).expect("Failed to parse");
        assert_eq!(doc.to_string(), CANONICAL);
    }

    #[test]
    fn test_round_trip_keeps_checksum() {
        let inputs = [
            MESSY,
            "mod 'a'\nmod 'b'\n",
            "# @maintainer: x\nmod 'zeta'\nmod 'alpha'\n",
            "# only a comment\n",
            "forge 'https://f'\n",
            "mod 'x', :latest\n# one\n\n# two\n",
            "# top\n\nmod 'k', :git => 'g', :branch => :main\n# mid\nmod 'c'\n# tail\n",
        ];
        for input in inputs {
            let doc = parse(input).expect("Failed to parse");
            let again = parse(&serialize(&doc)).expect("Failed to reparse");
            assert_eq!(again.checksum(), doc.checksum(), "{input}");
            assert_eq!(again.entry_names(), doc.entry_names());
            assert_eq!(serialize(&again), serialize(&doc));
        }
    }

    #[test]
    fn test_round_trip_after_mutations() {
        let mut doc = parse("forge 'https://f'\n\nmod 'b', '1.0.0'\n").expect("Failed to parse");
        doc.add_metadata("top", "owner", "platform").expect("top");
        doc.add_entry("a", &[":git=>https://x/a.git", ":ref=>main"]).expect("add");
        doc.add_metadata("a", "note", "pinned").expect("entry");
        doc.add_metadata("bottom", "eof", "").expect("bottom");

        let text = serialize(&doc);
        assert_eq!(
            text,
            "# @owner: platform\n\nforge 'https://f'\n\n# @note: pinned\nmod 'a',\n  :git => 'https://x/a.git',\n  :ref => 'main'\n\nmod 'b',\n  '1.0.0'\n\n# @eof:\n"
        );
        let again = parse(&text).expect("Failed to reparse");
        assert_eq!(again.checksum(), doc.checksum());
        assert_eq!(again.top_block_comments().count(), 1);
        assert_eq!(again.bottom_block_comments().count(), 1);
    }

    #[test]
    fn test_empty_document_renders_empty() {
        assert_eq!(serialize(&Document::new()), "");
        assert_eq!(serialize(&parse("\n\n").expect("Failed to parse")), "");
    }

    #[test]
    fn test_value_and_property_rendering() {
        assert_eq!(Value::QuotedString("1.0.0".into()).render(), "'1.0.0'");
        assert_eq!(Value::Symbol(":latest".into()).render(), ":latest");
        let prop = Property::keyed(Value::Symbol(":tag".into()), Value::QuotedString("v1".into()));
        assert_eq!(prop.render(), ":tag => 'v1'");
        assert_eq!(Entry::new("solo", vec![]).render(), "mod 'solo'");
    }
}
