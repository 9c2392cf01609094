// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::Path;

use crate::ast::Document;
use crate::parser;
use crate::serializer::serialize;
use crate::ModfileError;

fn file_error(path: &Path, message: String, hint: &str, code: u32) -> ModfileError {
    ModfileError::FileError {
        message,
        path: path.to_string_lossy().to_string(),
        hint: Some(hint.into()),
        code: Some(code),
    }
}

/// Read and parse a manifest file.
pub fn read_document(path: impl AsRef<Path>) -> Result<Document, ModfileError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        file_error(path, format!("Failed to read file: {}", e), "Check that the file exists and is readable", 301)
    })?;
    tracing::debug!(path = %path.display(), "read manifest");
    parser::parse(&content)
}

/// Create or truncate `path` and write the serialized document.
pub fn write_new(path: impl AsRef<Path>, doc: &Document) -> Result<(), ModfileError> {
    let path = path.as_ref();
    fs::write(path, serialize(doc)).map_err(|e| {
        file_error(path, format!("Failed to write file: {}", e), "Check that the directory exists and is writable", 302)
    })?;
    tracing::debug!(path = %path.display(), "wrote manifest");
    Ok(())
}

/// Overwrite an existing manifest. If the write fails the previous contents
/// are put back before the error is returned.
pub fn write_in_place(path: impl AsRef<Path>, doc: &Document) -> Result<(), ModfileError> {
    let path = path.as_ref();
    let original = fs::read(path).map_err(|e| {
        file_error(path, format!("Failed to read file before overwriting: {}", e), "Use write_new for files that do not exist yet", 301)
    })?;

    if let Err(e) = fs::write(path, serialize(doc)) {
        tracing::warn!(path = %path.display(), error = %e, "write failed, restoring original contents");
        if let Err(restore) = fs::write(path, &original) {
            return Err(file_error(
                path,
                format!("Failed to write file: {}; restoring the original also failed: {}", e, restore),
                "The file may be truncated, recover it from version control",
                303,
            ));
        }
        return Err(file_error(path, format!("Failed to write file: {}", e), "The original contents were restored", 302));
    }

    tracing::debug!(path = %path.display(), "overwrote manifest");
    Ok(())
}
