//! Path normalization for extracted include directories
//!
//! Include paths recorded in build artifacts are frequently relative to the
//! compiler's working directory and riddled with `..` segments. IntelliSense
//! wants clean absolute paths, so everything funnels through [`absolutize`]
//! before it reaches the editor config.
//!
//! Normalization is purely lexical: it never touches the filesystem, so the
//! result is deterministic regardless of which directories currently exist
//! or where the tool is invoked from.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base` (the recorded working directory) and
/// normalize the result.
///
/// Absolute paths ignore `base` but are still normalized.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexically normalize a path: resolve `.` and `..` segments and collapse
/// redundant separators, without consulting the filesystem.
///
/// A `..` at the root stays at the root. Leading `..` segments of a relative
/// path are preserved. On Windows the result is additionally simplified so
/// no `\\?\` extended-length prefix leaks into the editor config.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    dunce::simplified(&out).to_path_buf()
}
