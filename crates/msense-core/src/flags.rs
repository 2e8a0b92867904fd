//! Compile-flag model and compiler command-line scanning

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::paths::absolutize;
use crate::toolchain::ToolchainKind;

/// Include paths and preprocessor defines recovered from build artifacts.
///
/// Both lists are deduplicated on insert and keep first-seen order, so the
/// result is deterministic for a given artifact no matter how many
/// translation units repeat the same flags.
#[derive(Debug, Clone, Default)]
pub struct CompileFlags {
    include_paths: Vec<PathBuf>,
    defines: Vec<String>,
    seen_includes: HashSet<PathBuf>,
    seen_defines: HashSet<String>,
}

impl CompileFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an include path. Returns true if it was not seen before.
    ///
    /// The caller is expected to pass an already absolutized path; see
    /// [`scan_compiler_args`].
    pub fn add_include(&mut self, path: PathBuf) -> bool {
        if self.seen_includes.contains(&path) {
            return false;
        }
        self.seen_includes.insert(path.clone());
        self.include_paths.push(path);
        true
    }

    /// Record a `NAME` or `NAME=VALUE` define. Returns true if it was not
    /// seen before.
    pub fn add_define(&mut self, define: String) -> bool {
        if self.seen_defines.contains(&define) {
            return false;
        }
        self.seen_defines.insert(define.clone());
        self.defines.push(define);
        true
    }

    /// Record a user-supplied define, overriding an extracted define of the
    /// same macro name in place.
    ///
    /// A name collision with a different value logs a warning and replaces
    /// the old define at its original position.
    pub fn override_define(&mut self, define: String) {
        if self.seen_defines.contains(&define) {
            return;
        }
        let name = define_name(&define);
        if let Some(pos) = self
            .defines
            .iter()
            .position(|existing| define_name(existing) == name)
        {
            let old = std::mem::replace(&mut self.defines[pos], define.clone());
            tracing::warn!(
                "Macro {} will be overridden. Old: {:?}, New: {:?}",
                name,
                old,
                define
            );
            self.seen_defines.remove(&old);
            self.seen_defines.insert(define);
        } else {
            self.add_define(define);
        }
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn defines(&self) -> &[String] {
        &self.defines
    }

    pub fn is_empty(&self) -> bool {
        self.include_paths.is_empty() && self.defines.is_empty()
    }
}

impl PartialEq for CompileFlags {
    fn eq(&self, other: &Self) -> bool {
        self.include_paths == other.include_paths && self.defines == other.defines
    }
}

impl Eq for CompileFlags {}

/// Macro name of a `NAME` or `NAME=VALUE` define.
fn define_name(define: &str) -> &str {
    define.split_once('=').map_or(define, |(name, _)| name)
}

/// Trim a raw define value and reject tokens that cannot name a macro.
pub fn sanitize_define(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('=') {
        return None;
    }
    Some(trimmed.to_string())
}

/// Walk compiler arguments and accumulate include paths and defines.
///
/// Handles both the separate (`-I`, `path`) and concatenated (`-Ipath`)
/// token forms for every flag in the toolchain's dialect. Relative include
/// paths are resolved against `working_dir`, the directory the compiler was
/// invoked from.
pub fn scan_compiler_args(
    args: &[String],
    working_dir: &Path,
    toolchain: ToolchainKind,
    flags: &mut CompileFlags,
) {
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if let Some(value) = take_flag_value(arg, &mut iter, toolchain.include_flags()) {
            if !value.is_empty() {
                flags.add_include(absolutize(Path::new(&value), working_dir));
            }
            continue;
        }
        if let Some(value) = take_flag_value(arg, &mut iter, toolchain.define_flags()) {
            if let Some(define) = sanitize_define(&value) {
                flags.add_define(define);
            }
        }
    }
}

/// Match `arg` against a flag set and return its value.
///
/// `arg` equal to a flag consumes the next token (a trailing flag with no
/// value yields nothing); `arg` starting with a flag yields the joined rest.
fn take_flag_value<'a, I>(
    arg: &str,
    iter: &mut std::iter::Peekable<I>,
    flag_names: &[&str],
) -> Option<String>
where
    I: Iterator<Item = &'a String>,
{
    for flag in flag_names {
        if arg == *flag {
            return iter.next().cloned();
        }
        if let Some(rest) = arg.strip_prefix(flag) {
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

/// Split a recorded command string into argument tokens.
///
/// Build artifacts quote arguments shell-style: double quotes with `\"`
/// and `\\` escapes, single quotes taken literally, and bare backslash
/// escaping the next character. This is how both the CMake Ninja generator
/// and compile database `command` strings encode arguments, so a plain
/// whitespace split would tear quoted defines apart.
pub fn split_command_line(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                for nc in chars.by_ref() {
                    if nc == '\'' {
                        break;
                    }
                    current.push(nc);
                }
            }
            '"' => {
                in_token = true;
                while let Some(nc) = chars.next() {
                    match nc {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&esc) if esc == '"' || esc == '\\' => {
                                current.push(esc);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        _ => current.push(nc),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(nc) = chars.next() {
                    current.push(nc);
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_handles_separate_and_joined_forms() {
        let mut flags = CompileFlags::new();
        let argv = args(&[
            "arm-none-eabi-gcc",
            "-I",
            "../inc",
            "-Imbed-os/platform",
            "-isystem",
            "/opt/gcc/include",
            "-DFOO",
            "-DBAR=1",
            "-c",
            "main.c",
        ]);
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::GccArm,
            &mut flags,
        );

        assert_eq!(
            flags.include_paths(),
            &[
                PathBuf::from("/proj/inc"),
                PathBuf::from("/proj/build/mbed-os/platform"),
                PathBuf::from("/opt/gcc/include"),
            ]
        );
        assert_eq!(flags.defines(), &["FOO".to_string(), "BAR=1".to_string()]);
    }

    #[test]
    fn test_scan_dedups_in_first_seen_order() {
        let mut flags = CompileFlags::new();
        let argv = args(&["-DFOO", "-DBAR=1", "-DFOO", "-I../inc", "-I../inc"]);
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::GccArm,
            &mut flags,
        );

        assert_eq!(flags.defines(), &["FOO".to_string(), "BAR=1".to_string()]);
        assert_eq!(flags.include_paths(), &[PathBuf::from("/proj/inc")]);
    }

    #[test]
    fn test_scan_ignores_trailing_flag_without_value() {
        let mut flags = CompileFlags::new();
        let argv = args(&["-DFOO", "-I"]);
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::GccArm,
            &mut flags,
        );

        assert!(flags.include_paths().is_empty());
        assert_eq!(flags.defines(), &["FOO".to_string()]);
    }

    #[test]
    fn test_scan_arm_dialect_accepts_j_flag() {
        let mut flags = CompileFlags::new();
        let argv = args(&["-J/opt/armclang/include", "-Jrel/include"]);
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::Arm,
            &mut flags,
        );
        assert_eq!(
            flags.include_paths(),
            &[
                PathBuf::from("/opt/armclang/include"),
                PathBuf::from("/proj/build/rel/include"),
            ]
        );

        let mut gcc_flags = CompileFlags::new();
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::GccArm,
            &mut gcc_flags,
        );
        assert!(gcc_flags.include_paths().is_empty());
    }

    #[test]
    fn test_scan_skips_empty_and_malformed_defines() {
        let mut flags = CompileFlags::new();
        let argv = args(&["-D", "  ", "-D=1", "-DOK"]);
        scan_compiler_args(
            &argv,
            Path::new("/proj/build"),
            ToolchainKind::GccArm,
            &mut flags,
        );
        assert_eq!(flags.defines(), &["OK".to_string()]);
    }

    #[test]
    fn test_override_define_replaces_in_place() {
        let mut flags = CompileFlags::new();
        flags.add_define("FOO=1".to_string());
        flags.add_define("BAR".to_string());

        flags.override_define("FOO=2".to_string());
        assert_eq!(flags.defines(), &["FOO=2".to_string(), "BAR".to_string()]);

        flags.override_define("BAZ=3".to_string());
        assert_eq!(
            flags.defines(),
            &["FOO=2".to_string(), "BAR".to_string(), "BAZ=3".to_string()]
        );

        // exact duplicate is a no-op
        flags.override_define("FOO=2".to_string());
        assert_eq!(flags.defines().len(), 3);
    }

    #[test]
    fn test_compile_flags_equality_ignores_bookkeeping() {
        let mut a = CompileFlags::new();
        a.add_define("FOO".to_string());
        a.add_define("FOO".to_string());

        let mut b = CompileFlags::new();
        b.add_define("FOO".to_string());

        assert_eq!(a, b);
    }

    #[test]
    fn test_split_command_line_plain() {
        assert_eq!(
            split_command_line("gcc -I/inc -DFOO -c main.c"),
            args(&["gcc", "-I/inc", "-DFOO", "-c", "main.c"])
        );
        assert!(split_command_line("   ").is_empty());
    }

    #[test]
    fn test_split_command_line_double_quotes() {
        assert_eq!(
            split_command_line(r#"gcc "-I/path with spaces/inc" -c main.c"#),
            args(&["gcc", "-I/path with spaces/inc", "-c", "main.c"])
        );
        assert_eq!(
            split_command_line(r#"-DNAME=\"quoted\""#),
            args(&[r#"-DNAME="quoted""#])
        );
    }

    #[test]
    fn test_split_command_line_single_quotes_are_literal() {
        assert_eq!(
            split_command_line(r#"gcc '-DMSG="hello world"' -c main.c"#),
            args(&["gcc", r#"-DMSG="hello world""#, "-c", "main.c"])
        );
    }

    #[test]
    fn test_split_command_line_escaped_quote_inside_double_quotes() {
        assert_eq!(
            split_command_line(r#""-DVERSION=\"1.2.3\"""#),
            args(&[r#"-DVERSION="1.2.3""#])
        );
    }

    #[test]
    fn test_sanitize_define() {
        assert_eq!(sanitize_define(" FOO "), Some("FOO".to_string()));
        assert_eq!(sanitize_define("FOO=1"), Some("FOO=1".to_string()));
        assert_eq!(sanitize_define(""), None);
        assert_eq!(sanitize_define("   "), None);
        assert_eq!(sanitize_define("=1"), None);
    }
}
