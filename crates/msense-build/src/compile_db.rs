//! compile_commands.json parsing
//!
//! The compile database records one entry per translation unit with the
//! exact compiler invocation and the directory it ran from. Either the
//! `arguments` array or the `command` string form may be present.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use msense_core::prelude::*;
use msense_core::split_command_line;

use crate::read_artifact;

/// File extensions of translation units whose flags feed IntelliSense.
/// Assembler entries carry a diverging define set and are skipped.
const C_CPP_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

/// A single entry of compile_commands.json
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compiler invocation
    pub directory: PathBuf,

    /// The source file being compiled
    pub file: PathBuf,

    /// The full command line as one string
    #[serde(default)]
    pub command: Option<String>,

    /// The command line as an argument array
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// The invocation as argument tokens, whichever form the entry uses.
    pub fn args(&self) -> Vec<String> {
        if let Some(args) = &self.arguments {
            args.clone()
        } else if let Some(command) = &self.command {
            split_command_line(command)
        } else {
            Vec::new()
        }
    }

    /// Whether this entry compiles a C or C++ translation unit.
    pub fn is_c_cpp_unit(&self) -> bool {
        self.file
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                C_CPP_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

/// Load and parse a compile database.
///
/// Anything that is not a JSON array of entry objects fails with
/// [`Error::FlagExtraction`] carrying the parser message.
pub fn load_compile_db(path: &Path) -> Result<Vec<CompileCommand>> {
    let content = read_artifact(path)?;
    let commands: Vec<CompileCommand> = serde_json::from_str(&content)
        .map_err(|e| Error::flag_extraction(path, e.to_string()))?;
    debug!(
        "Loaded {} compile commands from {}",
        commands.len(),
        path.display()
    );
    Ok(commands)
}
