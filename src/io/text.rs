//! Bulk load/extract for the flat `<key>,<value>` text format.
//!
//! `load` reads a text file line by line and inserts each pair into an
//! already-open engine; malformed lines and duplicate keys are skipped with
//! a diagnostic rather than aborting the batch. `extract` writes an
//! engine's full in-order traversal back out in the same format.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::btree::Engine;
use crate::error::{IndexError, Result};

/// Load `<key>,<value>` pairs from `path` into `engine`, one `insert` per
/// valid line. Diagnostics for skipped lines are written to `diagnostics`.
/// Returns the number of pairs successfully inserted.
pub fn load(engine: &mut Engine, path: impl AsRef<Path>, diagnostics: &mut dyn Write) -> Result<usize> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut loaded = 0;

    for (line_number, line) in reader.lines().enumerate() {
        let line_number = line_number + 1;
        let line = line?;
        let trimmed = line.trim();
        let parts: Vec<&str> = trimmed.split(',').collect();

        if parts.len() != 2 {
            let _ = writeln!(diagnostics, "skipping invalid line {line_number}: {trimmed}");
            continue;
        }

        let key: u64 = match parts[0].trim().parse() {
            Ok(k) => k,
            Err(_) => {
                let _ = writeln!(diagnostics, "skipping invalid line {line_number}: {trimmed}");
                continue;
            }
        };
        let value: u64 = match parts[1].trim().parse() {
            Ok(v) => v,
            Err(_) => {
                let _ = writeln!(diagnostics, "skipping invalid line {line_number}: {trimmed}");
                continue;
            }
        };

        match engine.insert(key, value) {
            Ok(()) => loaded += 1,
            Err(IndexError::InvalidInput(msg)) => {
                let _ = writeln!(diagnostics, "skipping line {line_number}: {msg}");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(loaded)
}

/// Write every `(key, value)` pair in `engine`, in ascending key order, to
/// `path` as `<key>,<value>` lines. Returns the number of pairs written.
pub fn extract(engine: &mut Engine, path: impl AsRef<Path>) -> Result<usize> {
    let pairs = engine.traverse()?;
    let mut file = File::create(path.as_ref())?;
    for (key, value) in &pairs {
        writeln!(file, "{key},{value}")?;
    }
    Ok(pairs.len())
}
