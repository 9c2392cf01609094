// Author: Dustin Pilgrim
// License: MIT

//! Comment-preserving editor for Puppetfile-style module manifests.
//!
//! ```
//! use modfile::{parse, serialize};
//!
//! # fn main() -> Result<(), modfile::ModfileError> {
//! let mut doc = parse("# @maintainer: ops\nmod 'zeta'\nmod 'alpha'\n")?;
//! doc.add_entry("org-mod", &[":git=>https://example.com/org/mod.git"])?;
//! assert_eq!(doc.entry_names(), vec!["alpha", "org-mod", "zeta"]);
//! assert!(serialize(&doc).contains("# @maintainer: ops\nmod 'zeta'"));
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod canonical;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod file;
pub mod lexer;
pub mod metadata;
pub mod mutation;
pub mod naming;
pub mod parser;
pub mod semver;
pub mod serializer;

pub use ast::{Comment, Document, Entry, EntryId, Preamble, Property, Statement, Value};
pub use config::Settings;
pub use diff::{diff, Checksum, DiffResult};
pub use error::ModfileError;
pub use metadata::{MetaPair, Metadata};
pub use mutation::DependencyReport;
pub use parser::parse;
pub use semver::{BumpLevel, SemVer};
pub use serializer::{serialize, Render};
