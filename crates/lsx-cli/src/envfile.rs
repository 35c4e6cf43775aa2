//! Persisting rotated tokens into the project's .env file
//!
//! Updates values in place and preserves every unrelated line, so user
//! comments and other settings survive token rotation.

use crate::error::Result;
use std::path::Path;

/// Set or replace `KEY=value` pairs in the .env file at `path`
///
/// Existing assignments for the given keys are rewritten where they stand;
/// missing keys are appended. The file is created when absent.
pub fn upsert(path: &Path, pairs: &[(&str, &str)]) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err.into()),
    };

    let mut lines: Vec<String> = existing.lines().map(str::to_string).collect();
    for (key, value) in pairs {
        let assignment = format!("{key}={value}");
        match lines.iter_mut().find(|line| is_assignment_of(line, key)) {
            Some(line) => *line = assignment,
            None => lines.push(assignment),
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)?;
    Ok(())
}

fn is_assignment_of(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix(key)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}
