// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;

use crate::ast::{Document, Statement};
use crate::naming::normalize_identity;
use crate::serializer::Render;

/// Identity shared by every comment statement when comments are compared.
pub const COMMENT_IDENTITY: &str = "metadata";

/// Content hash of a node's rendered text, for equality checks.
pub trait Checksum {
    fn checksum(&self) -> blake3::Hash;
}

impl<T: Render + ?Sized> Checksum for T {
    fn checksum(&self) -> blake3::Hash {
        blake3::hash(self.render().as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffItem {
    pub identity: String,
    pub text: String,
}

/// An identity present in both documents with different renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changed {
    pub identity: String,
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub only_in_a: Vec<DiffItem>,
    pub only_in_b: Vec<DiffItem>,
    pub changed: Vec<Changed>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty() && self.changed.is_empty()
    }
}

struct Indexed {
    hash: blake3::Hash,
    text: String,
}

/// Identity -> rendering. Later statements overwrite earlier ones with the
/// same identity but keep the first-seen position.
fn index(doc: &Document, include_comments: bool) -> IndexMap<String, Indexed> {
    let mut map = IndexMap::new();
    for stmt in doc.statements() {
        let identity = match stmt {
            Statement::Entry(id) => normalize_identity(&doc.entry(*id).name),
            Statement::Comment(_) if include_comments => COMMENT_IDENTITY.to_string(),
            Statement::Comment(_) => continue,
        };
        let text = doc.render_statement(stmt);
        let hash = blake3::hash(text.as_bytes());
        map.insert(identity, Indexed { hash, text });
    }
    map
}

/// Compare two documents by identity, ignoring statement order.
pub fn diff(a: &Document, b: &Document, include_comments: bool) -> DiffResult {
    let index_a = index(a, include_comments);
    let index_b = index(b, include_comments);
    let mut result = DiffResult::default();

    for (identity, left) in &index_a {
        match index_b.get(identity) {
            None => result.only_in_a.push(DiffItem {
                identity: identity.clone(),
                text: left.text.clone(),
            }),
            Some(right) if right.hash != left.hash => result.changed.push(Changed {
                identity: identity.clone(),
                a: left.text.clone(),
                b: right.text.clone(),
            }),
            Some(_) => {}
        }
    }
    for (identity, right) in &index_b {
        if !index_a.contains_key(identity) {
            result.only_in_b.push(DiffItem {
                identity: identity.clone(),
                text: right.text.clone(),
            });
        }
    }

    tracing::debug!(
        only_in_a = result.only_in_a.len(),
        only_in_b = result.only_in_b.len(),
        changed = result.changed.len(),
        "compared documents"
    );
    result
}
