// Author: Dustin Pilgrim
// License: MIT

//! Structural edits. Every operation validates its input before touching the
//! document and re-canonicalizes afterwards, so a failed call changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Comment, Document, Entry, EntryId, Property, Statement, Value};
use crate::metadata::{is_valid_tag, MetaPair, Metadata};
use crate::semver::{is_semver, BumpLevel, SemVer};
use crate::ModfileError;

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:\w+$").expect("symbol pattern is valid"));

/// Property key that replaces every property with a single bare one.
pub const BARE_KEY: &str = "bare";

/// Outcome of [`Document::add_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    pub added: Vec<String>,
    pub skipped: Vec<String>, // already declared
}

impl Entry {
    /// Resolve a logical value such as `version` or `branch` from whichever
    /// property carries it. Returns an empty string when nothing does.
    pub fn resolve_value(&self, logical_name: &str) -> String {
        let resolved = match logical_name {
            "version" => self
                .bare_property()
                .map(|p| p.key.text())
                .or_else(|| self.keyed_text(":tag"))
                .or_else(|| self.keyed_text(":ref").filter(|r| is_semver(r))),
            "branch" => self
                .keyed_text(":branch")
                .or_else(|| self.keyed_text(":default_branch"))
                .or_else(|| self.keyed_text(":ref").filter(|r| !is_semver(r))),
            other => self
                .keyed_text(&format!(":{other}"))
                .or_else(|| self.keyed_text(other)),
        };
        resolved.unwrap_or_default().to_string()
    }

    /// Overwrite or append a keyed property; [`BARE_KEY`] installs a lone bare property.
    pub fn set_property(&mut self, key: &str, value: Value) {
        if key == BARE_KEY {
            self.properties = vec![Property::bare(value)];
            return;
        }
        match self.get_property_mut(key) {
            Some(prop) => prop.value = Some(value),
            None => self
                .properties
                .push(Property::keyed(Value::Symbol(key.to_string()), value)),
        }
    }

    fn keyed_text(&self, key: &str) -> Option<&str> {
        self.get_property(key).and_then(Property::value_text)
    }

    /// Index of the property holding the version: `:tag`, `:ref`, then the bare one.
    fn version_carrier(&self) -> Option<usize> {
        let keyed = |key: &str| {
            self.properties
                .iter()
                .position(|p| !p.is_bare() && p.key.text() == key)
        };
        keyed(":tag")
            .or_else(|| keyed(":ref"))
            .or_else(|| self.properties.iter().position(Property::is_bare))
    }
}

impl Document {
    /// Binary search over a sorted copy of the entry names.
    pub fn has_entry(&self, name: &str) -> bool {
        let mut names = self.entry_names();
        names.sort_unstable();
        names.binary_search(&name).is_ok()
    }

    /// Add a new entry. Properties are either `:key=>value` assignments or
    /// bare values such as `'1.2.3'` or `:latest`.
    pub fn add_entry<S: AsRef<str>>(&mut self, name: &str, properties: &[S]) -> Result<EntryId, ModfileError> {
        if self.has_entry(name) {
            return Err(ModfileError::duplicate_entry(name));
        }
        validate_name(name)?;
        let properties = properties
            .iter()
            .map(|p| parse_property_input(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let at = self.body_end();
        let id = self.push_entry(Entry::new(name, properties));
        self.statements.insert(at, Statement::Entry(id));
        self.canonicalize();

        tracing::debug!(entry = name, "added entry");
        Ok(id)
    }

    pub fn get_property(&self, entry: &str, key: &str) -> Result<Option<&Property>, ModfileError> {
        let found = self.get_entry(entry).ok_or_else(|| ModfileError::not_found(entry))?;
        Ok(found.get_property(key))
    }

    /// Overwrite the property `key` of `entry`, appending it when absent.
    /// The value becomes a symbol when it starts with `:`.
    pub fn edit_property(&mut self, entry: &str, key: &str, value: &str) -> Result<(), ModfileError> {
        let id = self.find_entry(entry).ok_or_else(|| ModfileError::not_found(entry))?;
        if key != BARE_KEY && !SYMBOL_RE.is_match(key) {
            return Err(ModfileError::invalid_input(
                format!("Property key '{key}' is not a symbol"),
                Some("Keys start with ':', e.g. :git"),
            ));
        }
        let value = value_from_input(value)?;

        self.entry_mut(id).set_property(key, value);
        self.canonicalize();

        tracing::debug!(entry, key, "edited property");
        Ok(())
    }

    pub fn resolve_value(&self, entry: &str, logical_name: &str) -> Result<String, ModfileError> {
        self.get_entry(entry)
            .map(|e| e.resolve_value(logical_name))
            .ok_or_else(|| ModfileError::not_found(entry))
    }

    /// Rename in place. Attached comments follow the entry to its new position.
    pub fn rename_entry(&mut self, old: &str, new: &str) -> Result<(), ModfileError> {
        let id = self.find_entry(old).ok_or_else(|| ModfileError::not_found(old))?;
        if old == new {
            return Ok(());
        }
        if self.has_entry(new) {
            return Err(ModfileError::duplicate_entry(new));
        }
        validate_name(new)?;

        self.entry_mut(id).name = new.to_string();
        self.canonicalize();

        tracing::debug!(from = old, to = new, "renamed entry");
        Ok(())
    }

    /// Insert `# @tag: data` into the header (`"top"`), the bottom block
    /// (`"bottom"`) or directly above the named entry. A missing entry is a no-op.
    pub fn add_metadata(&mut self, target: &str, tag: &str, data: &str) -> Result<(), ModfileError> {
        if !is_valid_tag(tag) {
            return Err(ModfileError::invalid_input(
                format!("Invalid metadata tag '{tag}'"),
                Some("Tags may contain letters, digits, '_' and '-'"),
            ));
        }
        validate_single_line(data)?;
        let comment = Comment::new(MetaPair::new(tag, data.trim()).to_comment_text());

        match target {
            "top" => {
                let at = self.top_block_len();
                self.statements.insert(at, Statement::Comment(comment));
                self.derived.top_block = Some(at + 1);
            }
            "bottom" => self.statements.push(Statement::Comment(comment)),
            name => {
                let at = self.find_entry(name).and_then(|id| {
                    self.statements
                        .iter()
                        .position(|s| s.entry_id() == Some(id))
                });
                match at {
                    Some(at) => self.statements.insert(at, Statement::Comment(comment)),
                    None => {
                        tracing::debug!(entry = name, tag, "metadata target not found, skipping");
                        return Ok(());
                    }
                }
            }
        }

        self.canonicalize();
        Ok(())
    }

    /// Bump the entry's version in place and return the new version.
    pub fn bump_version(&mut self, entry: &str, level: BumpLevel) -> Result<SemVer, ModfileError> {
        let id = self.find_entry(entry).ok_or_else(|| ModfileError::not_found(entry))?;
        let target = self.entry(id);
        let index = target.version_carrier().ok_or_else(|| ModfileError::NotFound {
            name: format!("version of '{entry}'"),
            hint: Some("Declare a version, :tag or :ref first".into()),
            code: Some(402),
        })?;

        let prop = &target.properties[index];
        let current = if prop.is_bare() {
            prop.key.text()
        } else {
            prop.value_text().unwrap_or_default()
        };
        let bumped = SemVer::parse(current)?.bump(level);
        let rendered = Value::QuotedString(bumped.to_string());

        let prop = &mut self.entry_mut(id).properties[index];
        if prop.is_bare() {
            prop.key = rendered;
        } else {
            prop.value = Some(rendered);
        }
        self.canonicalize();

        tracing::debug!(entry, version = %bumped, "bumped version");
        Ok(bumped)
    }

    /// One-level dependency expansion: declare each `(name, version)` that is
    /// not already present and tag it with `# @autodep`.
    pub fn add_dependencies<N: AsRef<str>, V: AsRef<str>>(
        &mut self,
        parent: &str,
        deps: &[(N, V)],
    ) -> Result<DependencyReport, ModfileError> {
        let note = format!("Added as dependency of {parent}");
        validate_single_line(&note)?;
        for (name, version) in deps {
            validate_name(name.as_ref())?;
            parse_property_input(version.as_ref())?;
        }

        let mut report = DependencyReport::default();
        for (name, version) in deps {
            let name = name.as_ref();
            match self.add_entry(name, &[version.as_ref()]) {
                Ok(_) => {
                    self.add_metadata(name, "autodep", &note)?;
                    report.added.push(name.to_string());
                }
                Err(ModfileError::DuplicateEntry { .. }) => {
                    tracing::warn!(dependency = name, parent, "dependency already declared, skipping");
                    report.skipped.push(name.to_string());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }

    /// Names of entries whose attached comments carry `tag`.
    pub fn entries_with_tag(&self, tag: &str) -> Vec<&str> {
        self.derived
            .entry_metadata
            .iter()
            .filter(|(_, meta)| meta.has_tag(tag))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Names of entries with a metadata pair whose data equals `data`.
    pub fn entries_with_data(&self, data: &str) -> Vec<&str> {
        self.derived
            .entry_metadata
            .iter()
            .filter(|(_, meta)| !meta.search_by_data(data).is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn metadata_for_entry(&self, name: &str) -> Option<&Metadata> {
        self.derived.entry_metadata.get(name)
    }
}

/// Parse one `add_entry` property argument.
fn parse_property_input(input: &str) -> Result<Property, ModfileError> {
    match input.split_once("=>") {
        Some((key, value)) => {
            let key = key.trim();
            if !SYMBOL_RE.is_match(key) {
                return Err(ModfileError::invalid_input(
                    format!("Property key '{key}' is not a symbol"),
                    Some("Write assignments as :key=>value"),
                ));
            }
            Ok(Property::keyed(Value::Symbol(key.to_string()), value_from_input(value)?))
        }
        None => Ok(Property::bare(value_from_input(input)?)),
    }
}

/// Infer a value from user input and make sure it can be written back out.
fn value_from_input(input: &str) -> Result<Value, ModfileError> {
    if input.trim().is_empty() {
        return Err(ModfileError::invalid_input("Empty property value", None));
    }
    match Value::infer(input) {
        Value::Symbol(s) if !SYMBOL_RE.is_match(&s) => Err(ModfileError::invalid_input(
            format!("'{s}' is not a valid symbol"),
            Some("Symbols are ':' followed by letters, digits or '_'"),
        )),
        Value::QuotedString(s) => {
            validate_quotable(&s)?;
            Ok(Value::QuotedString(s))
        }
        symbol => Ok(symbol),
    }
}

fn validate_name(name: &str) -> Result<(), ModfileError> {
    if name.trim().is_empty() {
        return Err(ModfileError::invalid_input("Entry name is empty", None));
    }
    validate_quotable(name)
}

fn validate_quotable(text: &str) -> Result<(), ModfileError> {
    if text.contains('\'') || text.contains('\n') || text.ends_with('\\') {
        return Err(ModfileError::invalid_input(
            format!("'{text}' cannot be written as a quoted string"),
            Some("Remove single quotes, newlines and trailing backslashes"),
        ));
    }
    Ok(())
}

fn validate_single_line(text: &str) -> Result<(), ModfileError> {
    if text.contains('\n') || text.contains('\r') {
        return Err(ModfileError::invalid_input("Metadata must fit on one line", None));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Checksum;
    use crate::parser::parse;

    const MANIFEST: &str = "\
forge 'https://forgeapi.puppet.com'

mod 'puppetlabs-stdlib', '9.4.1'

# @team: web
mod 'puppetlabs-apache',
  :git => 'https://github.com/puppetlabs/puppetlabs-apache.git',
  :tag => 'v11.1.0'

mod 'site-profile',
  :git => 'https://git.example.com/profile.git',
  :ref => 'main'
";

    fn doc() -> Document {
        parse(MANIFEST).expect("Failed to parse")
    }

    #[test]
    fn test_add_entry_inserts_alphabetically() {
        let mut doc = parse("mod 'zeta'\nmod 'alpha'\n").expect("Failed to parse");
        doc.add_entry("org-mod", &[":git=>https://example.com/org/mod.git"])
            .expect("add");

        assert_eq!(doc.entry_names(), vec!["alpha", "org-mod", "zeta"]);
        let prop = doc.get_property("org-mod", ":git").expect("entry").expect("property");
        assert_eq!(prop.key, Value::Symbol(":git".into()));
        assert_eq!(prop.value, Some(Value::QuotedString("https://example.com/org/mod.git".into())));
    }

    #[test]
    fn test_add_entry_bare_and_symbol_values() {
        let mut doc = doc();
        doc.add_entry("a-latest", &[":latest"]).expect("add");
        doc.add_entry("b-pinned", &["'4.0.0'"]).expect("add");
        doc.add_entry("c-mixed", &[":git => https://x/c.git", ":branch=>:default"]).expect("add");

        assert_eq!(doc.version_map()["a-latest"], ":latest");
        assert_eq!(doc.version_map()["b-pinned"], "4.0.0");
        let c = doc.get_entry("c-mixed").expect("entry");
        assert_eq!(c.get_property(":branch").and_then(|p| p.value.clone()), Some(Value::Symbol(":default".into())));
        assert_eq!(c.resolve_value("git"), "https://x/c.git");
    }

    #[test]
    fn test_add_duplicate_leaves_document_unchanged() {
        let mut doc = doc();
        let before = doc.checksum();

        let err = doc.add_entry("puppetlabs-stdlib", &["1.0.0"]).unwrap_err();
        assert!(matches!(err, ModfileError::DuplicateEntry { code: Some(401), .. }));
        assert_eq!(doc.checksum(), before);
    }

    #[test]
    fn test_add_entry_rejects_malformed_input_without_changes() {
        let mut doc = doc();
        let before = doc.checksum();

        for props in [vec!["git=>https://x"], vec!["=>x"], vec![":git=>"], vec![":bad key"], vec!["it's"]] {
            let err = doc.add_entry("new-entry", props.as_slice()).unwrap_err();
            assert!(matches!(err, ModfileError::InvalidInput { .. }), "{props:?}");
        }
        assert!(doc.add_entry("", &[] as &[&str]).is_err());
        assert_eq!(doc.checksum(), before);
        assert!(!doc.has_entry("new-entry"));
    }

    #[test]
    fn test_add_entry_lands_above_bottom_comments() {
        let mut doc = parse("mod 'b'\n# trailing\n").expect("Failed to parse");
        doc.add_entry("c", &["1.0.0"]).expect("add");

        assert_eq!(doc.entry_names(), vec!["b", "c"]);
        let bottom: Vec<&str> = doc.bottom_block_comments().map(|c| c.text.as_str()).collect();
        assert_eq!(bottom, vec!["# trailing"]);
        assert!(doc.metadata_for_entry("c").is_none());
    }

    #[test]
    fn test_add_entry_on_new_document() {
        let mut doc = Document::new();
        doc.add_entry("b", &["1.0.0"]).expect("add");
        doc.add_entry("a", &[] as &[&str]).expect("add");
        assert_eq!(doc.entry_names(), vec!["a", "b"]);
        assert!(doc.has_entry("a"));
        assert!(!doc.has_entry("c"));
    }

    #[test]
    fn test_edit_property_overwrites_or_appends() {
        let mut doc = doc();
        doc.edit_property("puppetlabs-apache", ":tag", "v12.0.0").expect("edit");
        doc.edit_property("puppetlabs-apache", ":branch", ":main").expect("edit");

        let apache = doc.get_entry("puppetlabs-apache").expect("entry");
        assert_eq!(apache.properties.len(), 3);
        assert_eq!(apache.get_property(":tag").and_then(|p| p.value_text()), Some("v12.0.0"));
        assert_eq!(apache.properties[2].value, Some(Value::Symbol(":main".into())));
        assert_eq!(doc.version_map()["puppetlabs-apache"], "v12.0.0");
    }

    #[test]
    fn test_edit_property_bare_replaces_everything() {
        let mut doc = doc();
        doc.edit_property("site-profile", "bare", "2.0.0").expect("edit");

        let profile = doc.get_entry("site-profile").expect("entry");
        assert_eq!(profile.properties, vec![Property::bare(Value::QuotedString("2.0.0".into()))]);
    }

    #[test]
    fn test_edit_property_errors() {
        let mut doc = doc();
        assert!(matches!(
            doc.edit_property("missing", ":tag", "1.0.0"),
            Err(ModfileError::NotFound { .. })
        ));
        assert!(matches!(
            doc.edit_property("site-profile", "tag", "1.0.0"),
            Err(ModfileError::InvalidInput { .. })
        ));
        assert!(matches!(doc.get_property("missing", ":git"), Err(ModfileError::NotFound { .. })));
        assert_eq!(doc.get_property("site-profile", ":tag").expect("entry"), None);
    }

    #[test]
    fn test_resolve_version_and_branch() {
        let input = "\
mod 'bare', '1.0.0'
mod 'tagged', :tag => 'v2.0.0', :ref => '3.0.0'
mod 'semver-ref', :ref => '4.0.0'
mod 'branch-ref', :ref => 'feature-x'
mod 'branchy', :branch => 'dev', :default_branch => 'main'
mod 'default-only', :default_branch => 'main'
mod 'huge-ref', :ref => '99999999999999999999.0.0'
";
        let doc = parse(input).expect("Failed to parse");
        let resolve = |name: &str, key: &str| doc.resolve_value(name, key).expect("entry");

        assert_eq!(resolve("bare", "version"), "1.0.0");
        assert_eq!(resolve("tagged", "version"), "v2.0.0");
        assert_eq!(resolve("semver-ref", "version"), "4.0.0");
        assert_eq!(resolve("branch-ref", "version"), "");
        assert_eq!(resolve("branch-ref", "branch"), "feature-x");
        assert_eq!(resolve("semver-ref", "branch"), "");
        assert_eq!(resolve("branchy", "branch"), "dev");
        assert_eq!(resolve("default-only", "branch"), "main");
        assert_eq!(resolve("bare", "git"), "");
        assert_eq!(resolve("huge-ref", "version"), "");
        assert_eq!(resolve("huge-ref", "branch"), "99999999999999999999.0.0");
        assert!(doc.resolve_value("nope", "version").is_err());
    }

    #[test]
    fn test_rename_moves_entry_with_comments() {
        let mut doc = doc();
        doc.rename_entry("puppetlabs-apache", "zz-apache").expect("rename");

        assert_eq!(doc.entry_names(), vec!["puppetlabs-stdlib", "site-profile", "zz-apache"]);
        let stmts = doc.statements();
        let last = stmts.len() - 1;
        assert_eq!(stmts[last - 1].as_comment().map(|c| c.text.as_str()), Some("# @team: web"));
        assert_eq!(doc.entries_with_tag("team"), vec!["zz-apache"]);
    }

    #[test]
    fn test_rename_errors() {
        let mut doc = doc();
        assert!(matches!(doc.rename_entry("missing", "x"), Err(ModfileError::NotFound { .. })));
        assert!(matches!(
            doc.rename_entry("site-profile", "puppetlabs-stdlib"),
            Err(ModfileError::DuplicateEntry { .. })
        ));
        assert!(doc.rename_entry("site-profile", "site-profile").is_ok());
    }

    #[test]
    fn test_add_metadata_targets() {
        let mut doc = doc();
        doc.add_metadata("top", "managed-by", "modfile").expect("top");
        doc.add_metadata("bottom", "eof", "").expect("bottom");
        doc.add_metadata("site-profile", "owner", "platform").expect("entry");

        let header: Vec<&str> = doc.top_block_comments().map(|c| c.text.as_str()).collect();
        assert_eq!(header, vec!["# @managed-by: modfile"]);
        let bottom: Vec<&str> = doc.bottom_block_comments().map(|c| c.text.as_str()).collect();
        assert_eq!(bottom, vec!["# @eof:"]);
        assert_eq!(doc.entries_with_data("platform"), vec!["site-profile"]);

        doc.add_entry("aaa", &["1.0.0"]).expect("add");
        doc.canonicalize();
        assert_eq!(doc.top_block_comments().count(), 1);
        assert_eq!(doc.metadata_for_entry("site-profile").map(|m| m.to_string()), Some("# @owner: platform".into()));
    }

    #[test]
    fn test_add_metadata_missing_entry_is_noop() {
        let mut doc = doc();
        let before = doc.checksum();
        doc.add_metadata("missing", "owner", "x").expect("no-op");
        assert_eq!(doc.checksum(), before);

        assert!(matches!(doc.add_metadata("top", "bad tag", "x"), Err(ModfileError::InvalidInput { .. })));
        assert!(doc.add_metadata("top", "ok", "two\nlines").is_err());
        assert_eq!(doc.checksum(), before);
    }

    #[test]
    fn test_bump_version_carriers() {
        let mut doc = doc();
        let tag = doc.bump_version("puppetlabs-apache", BumpLevel::Minor).expect("bump");
        assert_eq!(tag.to_string(), "v11.2.0");
        assert_eq!(doc.version_map()["puppetlabs-apache"], "v11.2.0");

        let bare = doc.bump_version("puppetlabs-stdlib", BumpLevel::Major).expect("bump");
        assert_eq!(bare.to_string(), "10.0.0");
        assert_eq!(doc.version_map()["puppetlabs-stdlib"], "10.0.0");
    }

    #[test]
    fn test_bump_version_errors_leave_document_unchanged() {
        let mut doc = parse("mod 'a', :latest\nmod 'b'\n").expect("Failed to parse");
        let before = doc.checksum();

        assert!(matches!(doc.bump_version("a", BumpLevel::Patch), Err(ModfileError::SemVerParse { .. })));
        assert!(matches!(doc.bump_version("b", BumpLevel::Patch), Err(ModfileError::NotFound { .. })));
        assert!(matches!(doc.bump_version("c", BumpLevel::Patch), Err(ModfileError::NotFound { .. })));
        assert_eq!(doc.checksum(), before);
    }

    #[test]
    fn test_add_dependencies_tags_and_skips() {
        let mut doc = doc();
        let report = doc
            .add_dependencies(
                "puppetlabs-apache",
                &[("puppetlabs-stdlib", "9.0.0"), ("puppetlabs-concat", "7.4.0")],
            )
            .expect("deps");

        assert_eq!(report.added, vec!["puppetlabs-concat"]);
        assert_eq!(report.skipped, vec!["puppetlabs-stdlib"]);
        assert_eq!(doc.version_map()["puppetlabs-stdlib"], "9.4.1");
        assert_eq!(doc.version_map()["puppetlabs-concat"], "7.4.0");
        assert_eq!(doc.entries_with_tag("autodep"), vec!["puppetlabs-concat"]);
        assert_eq!(
            doc.metadata_for_entry("puppetlabs-concat").map(|m| m.pairs[0].data.as_str()),
            Some("Added as dependency of puppetlabs-apache")
        );
    }

    #[test]
    fn test_add_dependencies_validates_everything_first() {
        let mut doc = doc();
        let before = doc.checksum();
        let result = doc.add_dependencies("x", &[("good-one", "1.0.0"), ("bad'name", "1.0.0")]);
        assert!(result.is_err());
        assert_eq!(doc.checksum(), before);

        let mut small = parse("mod 'p'\n").expect("Failed to parse");
        let before = small.checksum();
        let result = small.add_dependencies("p", &[("good-dep", "1.0.0"), ("bad-dep", "x=>y")]);
        assert!(matches!(result, Err(ModfileError::InvalidInput { .. })));
        assert_eq!(small.entry_names(), vec!["p"]);
        assert_eq!(small.checksum(), before);
    }
}
