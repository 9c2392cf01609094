// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;

use crate::lexer::Position;
use crate::metadata::Metadata;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    QuotedString(String), // rendered as 'text'
    Symbol(String),       // includes the leading ':'
}

impl Value {
    /// Build a value from user input: a leading `:` makes a symbol, anything
    /// else is a string with optional surrounding quotes removed.
    pub fn infer(input: &str) -> Value {
        let trimmed = input.trim();
        if trimmed.starts_with(':') {
            Value::Symbol(trimmed.to_string())
        } else {
            let unquoted = trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(trimmed);
            Value::QuotedString(unquoted.to_string())
        }
    }

    /// The text without quotes.
    pub fn text(&self) -> &str {
        match self {
            Value::QuotedString(s) | Value::Symbol(s) => s,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: Value,
    pub value: Option<Value>, // None for a bare property
}

impl Property {
    pub fn keyed(key: Value, value: Value) -> Self {
        Property { key, value: Some(value) }
    }

    pub fn bare(value: Value) -> Self {
        Property { key: value, value: None }
    }

    pub fn is_bare(&self) -> bool {
        self.value.is_none()
    }

    pub fn value_text(&self) -> Option<&str> {
        self.value.as_ref().map(Value::text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub properties: Vec<Property>,
    pub position: Option<Position>, // None when created through the mutation API
}

impl Entry {
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Entry {
            name: name.into(),
            properties,
            position: None,
        }
    }

    /// Keyed property lookup by key text, e.g. `:git`.
    pub fn get_property(&self, key: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| !p.is_bare() && p.key.text() == key)
    }

    pub fn get_property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .find(|p| !p.is_bare() && p.key.text() == key)
    }

    pub fn bare_property(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.is_bare())
    }

    pub fn bare_property_mut(&mut self) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.is_bare())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String, // includes the leading '#'
    pub position: Option<Position>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment {
            text: text.into(),
            position: None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    pub url: String,
    pub position: Option<Position>,
}

/// Index into a document's entry arena. Stable for the life of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Entry(EntryId),
    Comment(Comment),
}

impl Statement {
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Statement::Comment(c) => Some(c),
            Statement::Entry(_) => None,
        }
    }

    pub fn entry_id(&self) -> Option<EntryId> {
        match self {
            Statement::Entry(id) => Some(*id),
            Statement::Comment(_) => None,
        }
    }
}

/// Caches rebuilt by every canonicalization.
#[derive(Debug, Clone, Default)]
pub(crate) struct Derived {
    pub metadata: Metadata,
    pub entry_metadata: IndexMap<String, Metadata>,
    pub top_block: Option<usize>, // None until the first canonicalization
    pub bottom_block: usize,
    pub version_map: IndexMap<String, String>,
}

/// A parsed manifest. Statements reference entries by [`EntryId`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub preamble: Option<Preamble>,
    pub(crate) entries: Vec<Entry>,
    pub(crate) statements: Vec<Statement>,
    pub(crate) derived: Derived,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns `None` for an id that belongs to another document.
    pub fn entry_by_id(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    pub(crate) fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    /// Entries in statement (canonical) order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.statements
            .iter()
            .filter_map(|s| s.entry_id())
            .map(|id| &self.entries[id.0])
    }

    pub fn entry_names(&self) -> Vec<&str> {
        self.entries().map(|e| e.name.as_str()).collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.preamble.is_none()
    }

    /// Linear lookup in statement order; the first match wins for hand-edited duplicates.
    pub fn find_entry(&self, name: &str) -> Option<EntryId> {
        self.statements
            .iter()
            .filter_map(|s| s.entry_id())
            .find(|id| self.entries[id.0].name == name)
    }

    pub fn get_entry(&self, name: &str) -> Option<&Entry> {
        self.find_entry(name).map(|id| &self.entries[id.0])
    }

    pub fn top_block_comments(&self) -> impl Iterator<Item = &Comment> + '_ {
        let end = self.top_block_len();
        self.statements[..end].iter().filter_map(Statement::as_comment)
    }

    pub fn bottom_block_comments(&self) -> impl Iterator<Item = &Comment> + '_ {
        let start = self.body_end().max(self.top_block_len());
        self.statements[start..].iter().filter_map(Statement::as_comment)
    }

    /// Statements between the header and bottom blocks.
    pub fn body(&self) -> &[Statement] {
        let start = self.top_block_len();
        let end = self.body_end().max(start);
        &self.statements[start..end]
    }

    pub fn metadata(&self) -> &Metadata {
        &self.derived.metadata
    }

    pub fn entry_metadata(&self) -> &IndexMap<String, Metadata> {
        &self.derived.entry_metadata
    }

    pub fn version_map(&self) -> &IndexMap<String, String> {
        &self.derived.version_map
    }

    pub(crate) fn top_block_len(&self) -> usize {
        self.derived.top_block.unwrap_or(0).min(self.statements.len())
    }

    pub(crate) fn body_end(&self) -> usize {
        self.statements.len().saturating_sub(self.derived.bottom_block)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.0]
    }

    pub(crate) fn push_entry(&mut self, entry: Entry) -> EntryId {
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }
}
