//! build.ninja scanning
//!
//! The CMake Ninja generator attaches the preprocessor flags of every build
//! statement as indented `DEFINES = ...` and `INCLUDES = ...` variable
//! assignments. Each value is a shell-quoted command-line fragment; paths in
//! it are relative to the build directory, not to any source file.

use std::path::Path;

use msense_core::prelude::*;

use crate::read_artifact;

/// Raw `DEFINES`/`INCLUDES` values collected from a ninja build file, in
/// file order and unsplit.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NinjaFlagLines {
    pub defines: Vec<String>,
    pub includes: Vec<String>,
}

/// Collect the flag-bearing variable assignments of a ninja build file.
pub fn scan_build_file(path: &Path) -> Result<NinjaFlagLines> {
    let content = read_artifact(path)?;
    let lines = scan_content(&content);
    debug!(
        "Found {} DEFINES and {} INCLUDES lines in {}",
        lines.defines.len(),
        lines.includes.len(),
        path.display()
    );
    Ok(lines)
}

fn scan_content(content: &str) -> NinjaFlagLines {
    let mut lines = NinjaFlagLines::default();
    for line in content.lines() {
        if let Some(value) = var_assignment(line, "DEFINES") {
            if !value.is_empty() {
                lines.defines.push(value.to_string());
            }
        } else if let Some(value) = var_assignment(line, "INCLUDES") {
            if !value.is_empty() {
                lines.includes.push(value.to_string());
            }
        }
    }
    lines
}

/// Match a ninja variable assignment line `  <name> = <value>`.
fn var_assignment<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(name)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
# CMake generated file
cflags = -O2

build CMakeFiles/app.dir/main.cpp.obj: CXX_COMPILER__app /proj/main.cpp
  DEFINES = -DDEVICE_SERIAL=1 -DMBED_DEBUG
  DEP_FILE = CMakeFiles/app.dir/main.cpp.obj.d
  FLAGS = -mcpu=cortex-m0plus -Os
  INCLUDES = -I../inc -isystem /opt/gcc/include

build CMakeFiles/app.dir/util.c.obj: C_COMPILER__app /proj/util.c
  DEFINES = -DDEVICE_SERIAL=1
  INCLUDES = -I../inc
";

    #[test]
    fn test_scan_content_collects_flag_variables() {
        let lines = scan_content(SAMPLE);
        assert_eq!(
            lines.defines,
            vec!["-DDEVICE_SERIAL=1 -DMBED_DEBUG", "-DDEVICE_SERIAL=1"]
        );
        assert_eq!(
            lines.includes,
            vec!["-I../inc -isystem /opt/gcc/include", "-I../inc"]
        );
    }

    #[test]
    fn test_scan_content_ignores_other_variables() {
        let lines = scan_content("  FLAGS = -O2\n  DEP_FILE = x.d\n  DEFINES_EXTRA = -DX\n");
        assert_eq!(lines, NinjaFlagLines::default());
    }

    #[test]
    fn test_scan_content_skips_empty_values() {
        let lines = scan_content("  DEFINES = \n  INCLUDES =\n");
        assert_eq!(lines, NinjaFlagLines::default());
    }

    #[test]
    fn test_var_assignment_requires_equals_sign() {
        assert_eq!(var_assignment("  DEFINES = -DA", "DEFINES"), Some("-DA"));
        assert_eq!(var_assignment("DEFINES=-DA", "DEFINES"), Some("-DA"));
        assert_eq!(var_assignment("  DEFINES -DA", "DEFINES"), None);
        assert_eq!(var_assignment("  DEFINESX = -DA", "DEFINES"), None);
    }

    #[test]
    fn test_scan_build_file_reads_from_disk() {
        let temp = TempDir::new().unwrap();
        let ninja = temp.path().join("build.ninja");
        fs::write(&ninja, SAMPLE).unwrap();

        let lines = scan_build_file(&ninja).unwrap();
        assert_eq!(lines.defines.len(), 2);
        assert_eq!(lines.includes.len(), 2);
    }

    #[test]
    fn test_scan_build_file_missing_fails_as_extraction_error() {
        let temp = TempDir::new().unwrap();
        let err = scan_build_file(&temp.path().join("build.ninja")).unwrap_err();
        assert!(matches!(err, Error::FlagExtraction { .. }));
    }
}
