//! Output filename sanitation and batch-wide deduplication.

use std::collections::HashSet;

/// Longest base name we keep; beyond this, spreadsheet cells are being
/// abused as prose.
const MAX_BASE_LEN: usize = 200;

/// Reduce a raw cell value to a safe filename base: keep
/// `[A-Za-z0-9_.-]`, replace everything else with `_`, collapse runs of
/// underscores, and cap the length.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(ch);
        if out.len() >= MAX_BASE_LEN {
            break;
        }
    }
    out
}

/// Produce a name unique within the batch by appending `_1`, `_2`, …
/// to the base until unused, then record it in `used`.
///
/// Callers must invoke this serially (the orchestrator does its name
/// bookkeeping on the dispatch loop) so duplicate detection never races
/// with concurrent renders.
pub fn unique_name(base: &str, ext: &str, used: &mut HashSet<String>) -> String {
    let mut name = format!("{base}{ext}");
    let mut counter = 1;
    while used.contains(&name) {
        name = format!("{base}_{counter}{ext}");
        counter += 1;
    }
    used.insert(name.clone());
    name
}
