// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Comment;

static META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\s?@(?P<tag>[\w-]+):\s*(?P<data>.*)$").expect("metadata pattern is valid")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w-]+$").expect("tag pattern is valid"));

/// A `# @tag: data` pair found in a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaPair {
    pub tag: String,
    pub data: String,
}

impl MetaPair {
    pub fn new(tag: impl Into<String>, data: impl Into<String>) -> Self {
        MetaPair {
            tag: tag.into(),
            data: data.into(),
        }
    }

    /// Extract a pair from comment text; plain prose comments yield `None`.
    pub fn from_text(text: &str) -> Option<MetaPair> {
        let caps = META_RE.captures(text.trim_end())?;
        Some(MetaPair {
            tag: caps["tag"].to_string(),
            data: caps["data"].trim().to_string(),
        })
    }

    /// Render as comment text.
    pub fn to_comment_text(&self) -> String {
        if self.data.is_empty() {
            format!("# @{}:", self.tag)
        } else {
            format!("# @{}: {}", self.tag, self.data)
        }
    }
}

impl fmt::Display for MetaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_comment_text())
    }
}

pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

impl Comment {
    pub fn meta_pair(&self) -> Option<MetaPair> {
        MetaPair::from_text(&self.text)
    }
}

/// An ordered collection of metadata pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub pairs: Vec<MetaPair>,
}

impl Metadata {
    pub fn from_comments<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Self {
        Metadata {
            pairs: comments.into_iter().filter_map(Comment::meta_pair).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sorted list of every tag, duplicates included.
    pub fn all_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .pairs
            .iter()
            .map(|p| p.tag.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort_unstable();
        tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.pairs.iter().any(|p| p.tag == tag)
    }

    pub fn search_by_tag(&self, tag: &str) -> Vec<&MetaPair> {
        self.pairs.iter().filter(|p| p.tag == tag).collect()
    }

    pub fn search_by_data(&self, data: &str) -> Vec<&MetaPair> {
        self.pairs.iter().filter(|p| p.data == data).collect()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.pairs.iter().map(MetaPair::to_comment_text).collect();
        f.write_str(&lines.join("\n"))
    }
}
