// Author: Dustin Pilgrim
// License: MIT

//! Entry names come in two spellings: the slug `org-module` and the ref
//! `org/module`. Comparisons across documents use the slug.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ModfileError;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)-(\w+)$").expect("slug pattern is valid"));
static REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)$").expect("ref pattern is valid"));

pub fn is_module_slug(name: &str) -> bool {
    SLUG_RE.is_match(name)
}

pub fn is_module_ref(name: &str) -> bool {
    REF_RE.is_match(name)
}

/// `org/module` -> `org-module`
pub fn ref_to_slug(name: &str) -> Result<String, ModfileError> {
    split_pair(name, '/').map(|(org, module)| format!("{org}-{module}"))
}

/// `org-module` -> `org/module`
pub fn slug_to_ref(name: &str) -> Result<String, ModfileError> {
    split_pair(name, '-').map(|(org, module)| format!("{org}/{module}"))
}

fn split_pair(name: &str, sep: char) -> Result<(&str, &str), ModfileError> {
    let mut parts = name.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(org), Some(module), None) if !org.is_empty() && !module.is_empty() => Ok((org, module)),
        _ => Err(ModfileError::invalid_input(
            format!("'{name}' is not of the form org{sep}module"),
            None,
        )),
    }
}

/// Identity used to match entries across documents. Refs become slugs; a ref
/// that cannot be converted keeps its raw name.
pub fn normalize_identity(name: &str) -> String {
    if !name.contains('/') {
        return name.to_string();
    }
    match ref_to_slug(name) {
        Ok(slug) => slug,
        Err(err) => {
            tracing::warn!(name, error = %err, "could not normalize entry name, using it as is");
            name.to_string()
        }
    }
}
