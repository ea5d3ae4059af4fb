//! Project-relative POSIX path handling.
//!
//! Fingerprints identify files by forward-slash paths relative to the project
//! root, independent of the host's separator convention or drive letters.

use std::path::{Component, Path};

/// Error produced when a path cannot be expressed relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path resolves to a location outside the project root.
    #[error("'{path}' escapes the project root")]
    EscapesRoot {
        /// The offending path as given.
        path: String,
    },

    /// The path is empty.
    #[error("empty path")]
    Empty,
}

/// Rewrites every backslash to a forward slash.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Converts a host path to a POSIX string, lossily for non-UTF-8 names.
pub fn path_to_posix(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(&part.to_string_lossy());
            }
            Component::ParentDir => {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str("..");
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Returns `true` if a POSIX-form path is absolute (`/x`, `C:/x`, `//server/x`).
fn is_absolute_posix(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Strips a leading drive letter (`C:`) so roots compare on the remaining path.
fn strip_drive(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    }
}

/// Lexically resolves `.` and `..` segments, returning the segment list.
///
/// Returns `None` if a `..` would climb above the starting point.
fn resolve_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}

/// Normalizes `locator` into a forward-slash path relative to `root`.
///
/// Backslashes become forward slashes, absolute paths under `root` are made
/// relative, and `.`/`..` segments are resolved lexically. A relative `root`
/// is resolved against the working directory before absolute locators are
/// compared with it. The project root itself normalizes to `"."`. Drive
/// letters compare case-insensitively.
pub fn normalize_relative(root: &Path, locator: &str) -> Result<String, PathError> {
    if locator.is_empty() {
        return Err(PathError::Empty);
    }
    let escapes = || PathError::EscapesRoot {
        path: locator.to_string(),
    };

    let posix = to_posix(locator);
    let relative = if is_absolute_posix(&posix) {
        let mut root_posix = to_posix(&root.to_string_lossy());
        if !is_absolute_posix(&root_posix) {
            let absolute = std::path::absolute(root).map_err(|_| escapes())?;
            root_posix = to_posix(&absolute.to_string_lossy());
        }
        let root_segments = resolve_segments(strip_drive(&root_posix)).ok_or_else(escapes)?;
        let path_segments = resolve_segments(strip_drive(&posix)).ok_or_else(escapes)?;
        let same_drive = drive_letter(&root_posix) == drive_letter(&posix);
        if !same_drive
            || path_segments.len() < root_segments.len()
            || path_segments[..root_segments.len()] != root_segments[..]
        {
            return Err(escapes());
        }
        path_segments[root_segments.len()..].join("/")
    } else {
        resolve_segments(&posix).ok_or_else(escapes)?.join("/")
    };

    if relative.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(relative)
    }
}

fn drive_letter(path: &str) -> Option<char> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(bytes[0].to_ascii_lowercase() as char)
    } else {
        None
    }
}
