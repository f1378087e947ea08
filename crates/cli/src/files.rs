//! Source-list and type-file loading.

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use toks_core::KeywordTable;

/// Read a list of source files, one per line. `-` reads stdin. Lines
/// are trimmed, backslashes normalised, and `#` lines skipped.
pub fn read_source_list(source_list: &str) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = if source_list == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(source_list)
            .with_context(|| format!("cannot open file list {source_list}"))?;
        Box::new(BufReader::new(file))
    };

    let mut files = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read error in {source_list}"))?;
        let name = line.trim().replace('\\', "/");
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        log::debug!("{:3}] {}", lineno + 1, name);
        files.push(name);
    }
    Ok(files)
}

/// Load extra type names into the keyword table, one identifier per
/// line. Returns how many were added.
pub fn load_type_file(path: impl AsRef<Path>, table: &mut KeywordTable) -> Result<usize> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot open type file {}", path.display()))?;
    let before = table.extra_len();
    for line in content.lines() {
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        table.add_type(name);
    }
    Ok(table.extra_len() - before)
}
