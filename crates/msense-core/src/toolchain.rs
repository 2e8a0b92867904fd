//! Supported Mbed toolchains and their compile-flag dialects

use serde::{Deserialize, Serialize};

/// Toolchain that produced the build artifacts.
///
/// The kind decides which command-line flags carry include directories:
/// the GCC family uses `-I`/`-isystem`/`-iquote`, while ARM Compiler
/// additionally accepts `-J` for system include directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolchainKind {
    /// GNU Arm Embedded (`arm-none-eabi-gcc`/`g++`)
    #[default]
    GccArm,
    /// ARM Compiler 6 (`armclang`) or legacy ARM Compiler 5 (`armcc`)
    Arm,
}

impl ToolchainKind {
    /// Directory name used by `mbed-tools configure` under
    /// `cmake_build/<TARGET>/<profile>/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ToolchainKind::GccArm => "GCC_ARM",
            ToolchainKind::Arm => "ARM",
        }
    }

    /// Command-line flags that introduce an include directory, joined or
    /// as a separate token.
    pub fn include_flags(&self) -> &'static [&'static str] {
        match self {
            ToolchainKind::GccArm => &["-I", "-isystem", "-iquote"],
            ToolchainKind::Arm => &["-I", "-isystem", "-J"],
        }
    }

    /// Command-line flags that introduce a preprocessor define.
    pub fn define_flags(&self) -> &'static [&'static str] {
        &["-D"]
    }

    /// Guess the toolchain from a compiler executable path, e.g. the
    /// `CMAKE_C_COMPILER` cache entry.
    pub fn from_compiler(program: &str) -> Option<Self> {
        let file = std::path::Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())?;
        if file.contains("armclang") || file.contains("armcc") {
            Some(ToolchainKind::Arm)
        } else if file.contains("gcc") || file.contains("g++") {
            Some(ToolchainKind::GccArm)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl std::str::FromStr for ToolchainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GCC_ARM" => Ok(ToolchainKind::GccArm),
            "ARM" => Ok(ToolchainKind::Arm),
            other => Err(format!(
                "unknown toolchain {other:?}, expected GCC_ARM or ARM"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_dir_name_round_trips_through_from_str() {
        for kind in [ToolchainKind::GccArm, ToolchainKind::Arm] {
            assert_eq!(ToolchainKind::from_str(kind.dir_name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            ToolchainKind::from_str("gcc_arm").unwrap(),
            ToolchainKind::GccArm
        );
        assert_eq!(ToolchainKind::from_str("arm").unwrap(), ToolchainKind::Arm);
        assert!(ToolchainKind::from_str("IAR").is_err());
    }

    #[test]
    fn test_from_compiler() {
        assert_eq!(
            ToolchainKind::from_compiler("/opt/gcc/bin/arm-none-eabi-gcc"),
            Some(ToolchainKind::GccArm)
        );
        assert_eq!(
            ToolchainKind::from_compiler("/usr/bin/arm-none-eabi-g++.exe"),
            Some(ToolchainKind::GccArm)
        );
        assert_eq!(
            ToolchainKind::from_compiler("C:/Keil/ARM/ARMCLANG/bin/armclang.exe"),
            Some(ToolchainKind::Arm)
        );
        assert_eq!(ToolchainKind::from_compiler("cl.exe"), None);
        assert_eq!(ToolchainKind::from_compiler(""), None);
    }

    #[test]
    fn test_include_flag_dialects() {
        assert!(ToolchainKind::GccArm.include_flags().contains(&"-iquote"));
        assert!(!ToolchainKind::GccArm.include_flags().contains(&"-J"));
        assert!(ToolchainKind::Arm.include_flags().contains(&"-J"));
    }
}
