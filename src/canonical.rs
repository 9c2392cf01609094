// Author: Dustin Pilgrim
// License: MIT

//! Canonical ordering of a document.
//!
//! Entries are sorted by name (byte-wise). Comments keep their meaning while
//! entries move around:
//! - the header block stays pinned to the top of the file,
//! - comments directly above an entry travel with that entry,
//! - comments below the last entry collect at the bottom.
//!
//! Every run rebuilds the derived caches from scratch.

use indexmap::IndexMap;

use crate::ast::{Comment, Document, EntryId, Statement};
use crate::metadata::Metadata;

impl Document {
    /// Reorder statements and rebuild every derived cache. Idempotent.
    pub fn canonicalize(&mut self) {
        let statements = std::mem::take(&mut self.statements);
        let header_len = match self.derived.top_block {
            Some(len) => len.min(statements.len()),
            None => self.detect_header(&statements),
        };

        let mut iter = statements.into_iter();
        let header: Vec<Statement> = iter.by_ref().take(header_len).collect();

        let mut attached: Vec<(EntryId, Vec<Comment>)> = Vec::new();
        let mut pending: Vec<Comment> = Vec::new();
        for stmt in iter {
            match stmt {
                Statement::Comment(c) => pending.push(c),
                Statement::Entry(id) => attached.push((id, std::mem::take(&mut pending))),
            }
        }
        let orphans = pending;

        let mut entry_metadata = IndexMap::new();
        for (id, comments) in &attached {
            if !comments.is_empty() {
                entry_metadata.insert(self.entry(*id).name.clone(), Metadata::from_comments(comments));
            }
        }

        // Stable: hand-edited duplicates keep their input order
        attached.sort_by(|(a, _), (b, _)| {
            self.entry(*a).name.as_bytes().cmp(self.entry(*b).name.as_bytes())
        });

        let mut rebuilt = Vec::with_capacity(header.len() + attached.len() + orphans.len());
        rebuilt.extend(header);
        for (id, comments) in attached {
            rebuilt.extend(comments.into_iter().map(Statement::Comment));
            rebuilt.push(Statement::Entry(id));
        }
        let bottom_len = orphans.len();
        rebuilt.extend(orphans.into_iter().map(Statement::Comment));
        self.statements = rebuilt;

        self.derived.top_block = Some(header_len);
        self.derived.bottom_block = bottom_len;
        self.derived.entry_metadata = entry_metadata;
        self.derived.metadata = Metadata::from_comments(
            self.statements.iter().filter_map(Statement::as_comment),
        );
        self.rebuild_version_map();

        tracing::debug!(
            header = header_len,
            entries = self.derived.version_map.len(),
            bottom = bottom_len,
            "canonicalized document"
        );
    }

    /// First-run header detection from source positions.
    ///
    /// The header is the leading run of comments on lines 1, 2, 3... plus any
    /// comment written above the forge line. A line run that is directly
    /// followed by an entry belongs to that entry instead.
    fn detect_header(&self, statements: &[Statement]) -> usize {
        let preamble_offset = self.preamble.as_ref().and_then(|p| p.position).map(|p| p.offset);

        let mut before_preamble = 0;
        if let Some(offset) = preamble_offset {
            before_preamble = statements
                .iter()
                .take_while(|s| {
                    s.as_comment()
                        .and_then(|c| c.position)
                        .is_some_and(|p| p.offset < offset)
                })
                .count();
        }

        let mut run = 0;
        let mut last_line = 0;
        for stmt in statements {
            match stmt.as_comment().and_then(Comment::line) {
                Some(line) if line == last_line + 1 => {
                    run += 1;
                    last_line = line;
                }
                _ => break,
            }
        }

        if run > before_preamble {
            let followed_by_entry = statements.get(run).and_then(|s| match s {
                Statement::Entry(id) => self.entry(*id).position.map(|p| p.line),
                Statement::Comment(_) => None,
            });
            if followed_by_entry == Some(last_line + 1) {
                run = 0;
            }
        }

        run.max(before_preamble)
    }

    fn rebuild_version_map(&mut self) {
        let map: IndexMap<String, String> = self
            .entries()
            .map(|e| (e.name.clone(), e.resolve_value("version")))
            .collect();
        self.derived.version_map = map;
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    fn comments_above<'a>(doc: &'a crate::Document, name: &str) -> Vec<&'a str> {
        let stmts = doc.statements();
        let idx = stmts
            .iter()
            .position(|s| s.entry_id().is_some_and(|id| doc.entry(id).name == name))
            .expect("entry present");
        let mut above: Vec<&str> = stmts[..idx]
            .iter()
            .rev()
            .map_while(|s| s.as_comment().map(|c| c.text.as_str()))
            .collect();
        above.reverse();
        above
    }

    #[test]
    fn test_already_sorted_document_keeps_order() {
        let doc = parse("mod 'a'\nmod 'b'\n").expect("Failed to parse");
        assert_eq!(doc.entry_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_comment_directly_above_first_line_entry_moves_with_it() {
        let doc = parse("# @maintainer: x\nmod 'zeta'\nmod 'alpha'\n").expect("Failed to parse");

        assert_eq!(doc.entry_names(), vec!["alpha", "zeta"]);
        assert_eq!(comments_above(&doc, "zeta"), vec!["# @maintainer: x"]);
        assert!(comments_above(&doc, "alpha").is_empty());
        assert_eq!(doc.top_block_comments().count(), 0);
        assert_eq!(doc.entry_metadata()["zeta"].pairs[0].data, "x");
    }

    #[test]
    fn test_header_block_stays_on_top() {
        let input = "# Managed by ops\n# do not edit\n\nforge 'https://forge.example.com'\n\n# web tier\nmod 'zeta'\nmod 'alpha'\n";
        let doc = parse(input).expect("Failed to parse");

        let header: Vec<&str> = doc.top_block_comments().map(|c| c.text.as_str()).collect();
        assert_eq!(header, vec!["# Managed by ops", "# do not edit"]);
        assert_eq!(doc.entry_names(), vec!["alpha", "zeta"]);
        assert_eq!(comments_above(&doc, "zeta"), vec!["# web tier"]);
    }

    #[test]
    fn test_header_separated_by_blank_line_without_forge() {
        let doc = parse("# top\n\nmod 'b'\nmod 'a'\n").expect("Failed to parse");
        assert_eq!(doc.top_block_comments().count(), 1);
        assert!(comments_above(&doc, "b").is_empty());
    }

    #[test]
    fn test_comments_above_forge_are_header() {
        let doc = parse("\n# late start\nforge 'x'\nmod 'a'\n").expect("Failed to parse");
        assert_eq!(doc.top_block_comments().count(), 1);
        assert!(comments_above(&doc, "a").is_empty());
    }

    #[test]
    fn test_orphans_collect_at_bottom_in_order() {
        let input = "mod 'b'\n# trailing one\nmod 'a'\n# trailing two\n# trailing three\n";
        let doc = parse(input).expect("Failed to parse");

        assert_eq!(doc.entry_names(), vec!["a", "b"]);
        assert_eq!(comments_above(&doc, "a"), vec!["# trailing one"]);
        let bottom: Vec<&str> = doc.bottom_block_comments().map(|c| c.text.as_str()).collect();
        assert_eq!(bottom, vec!["# trailing two", "# trailing three"]);
    }

    #[test]
    fn test_multi_comment_blocks_travel_together() {
        let input = "mod 'm'\n# @team: web\n# second line\nmod 'c'\n\n# for z\nmod 'z'\nmod 'a'\n";
        let doc = parse(input).expect("Failed to parse");

        assert_eq!(doc.entry_names(), vec!["a", "c", "m", "z"]);
        assert_eq!(comments_above(&doc, "c"), vec!["# @team: web", "# second line"]);
        assert_eq!(comments_above(&doc, "z"), vec!["# for z"]);
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let input = "# head\n\nmod 'q'\n# x\nmod 'b'\n# y\nmod 'k'\n# tail\n";
        let mut doc = parse(input).expect("Failed to parse");
        let first = doc.statements().to_vec();
        let first_header = doc.top_block_comments().count();

        doc.canonicalize();
        assert_eq!(doc.statements(), first.as_slice());
        assert_eq!(doc.top_block_comments().count(), first_header);
    }

    #[test]
    fn test_sort_is_ordinal() {
        let doc = parse("mod 'b'\nmod 'B'\nmod 'a'\nmod '_z'\n").expect("Failed to parse");
        assert_eq!(doc.entry_names(), vec!["B", "_z", "a", "b"]);
    }

    #[test]
    fn test_version_map() {
        let input = "mod 'b', '1.2.3'\nmod 'a',\n  :git => 'https://example.com/a.git',\n  :tag => 'v2.0.0'\nmod 'c', :latest\n";
        let doc = parse(input).expect("Failed to parse");
        let map = doc.version_map();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(map["a"], "v2.0.0");
        assert_eq!(map["b"], "1.2.3");
        assert_eq!(map["c"], ":latest");
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("").expect("Failed to parse");
        assert!(doc.statements().is_empty());
        assert_eq!(doc.top_block_comments().count(), 0);
        assert_eq!(doc.bottom_block_comments().count(), 0);
    }

    #[test]
    fn test_document_metadata_covers_all_comments() {
        let input = "# @owner: platform\n\nmod 'a'\n# @team: web\nmod 'b'\n# @eol: 2030\n";
        let doc = parse(input).expect("Failed to parse");
        assert_eq!(doc.metadata().all_tags(), vec!["eol", "owner", "team"]);
    }
}
