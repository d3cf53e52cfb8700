//! Lexical path handling
//!
//! Every path stored in the tree goes through [`normalize`], so two spellings
//! of the same location always map to the same key. Nothing here touches the
//! tree; symlinks are resolved by the filesystem facade.

use std::path::Path;

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";

/// Lexically cleans a path: collapses repeated separators, drops `.`
/// elements and resolves `..` against the preceding element. `..` above the
/// root stays at the root. The empty path cleans to `.`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{ROOT}{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Cleans a path and anchors it at the root; the form used for tree keys.
pub fn normalize(path: &str) -> String {
    if is_abs(path) {
        clean(path)
    } else {
        clean(&format!("{ROOT}{path}"))
    }
}

/// A path is absolute if the host says so or if it starts with `/`.
pub fn is_abs(path: &str) -> bool {
    Path::new(path).is_absolute() || path.starts_with(SEPARATOR)
}

/// Joins the non-empty elements with `/` and cleans the result.
pub fn join<S: AsRef<str>>(elems: &[S]) -> String {
    let parts: Vec<&str> = elems
        .iter()
        .map(AsRef::as_ref)
        .filter(|e| !e.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join("/"))
}

/// Everything but the last element, cleaned.
pub fn dir(path: &str) -> String {
    match path.rfind(SEPARATOR) {
        Some(idx) => clean(&path[..=idx]),
        None => ".".to_string(),
    }
}

/// The last element; `/` for the root and `.` for the empty path.
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return ROOT.to_string();
    }
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => trimmed[idx + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Component-wise prefix test on normalized paths: `/a` covers `/a` and
/// `/a/x` but not `/ab`.
pub fn has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == ROOT {
        return path.starts_with(SEPARATOR);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Moves `path` from under `from` to the same relative place under `to`.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if !has_prefix(path, from) {
        return None;
    }
    let rel = path[from.len()..].trim_start_matches(SEPARATOR);
    Some(join(&[to, rel]))
}

/// Number of elements below the root; parents sort before their children.
pub fn depth(path: &str) -> usize {
    path.split(SEPARATOR).filter(|p| !p.is_empty()).count()
}
