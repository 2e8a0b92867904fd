//! c_cpp_properties.json document handling
//!
//! The file is held as a generic JSON tree so every key and entry this tool
//! does not manage survives a rewrite byte-for-byte (key order included,
//! via serde_json's `preserve_order`). Only the `includePath` and `defines`
//! fields of the matched configuration entry are ever replaced.

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use msense_core::prelude::*;
use msense_core::CompileFlags;

pub const VSCODE_DIR: &str = ".vscode";
pub const PROPERTIES_FILE: &str = "c_cpp_properties.json";

/// Entry name updated when none is given on the command line
pub const DEFAULT_ENTRY: &str = "Mbed";

/// Entry created by `msense generate`, inheriting from [`DEFAULT_ENTRY`]
pub const GENERATED_ENTRY: &str = "MbedGenerated";

/// VSCode writes this file with 4-space indentation
const JSON_INDENT: &[u8] = b"    ";

/// Conventional location: `<program>/.vscode/c_cpp_properties.json`
pub fn default_properties_path(program_dir: &Path) -> PathBuf {
    program_dir.join(VSCODE_DIR).join(PROPERTIES_FILE)
}

/// A loaded, schema-checked c_cpp_properties.json
#[derive(Debug, Clone)]
pub struct PropertiesDoc {
    path: PathBuf,
    root: Value,
}

impl PropertiesDoc {
    /// Load and validate the document.
    ///
    /// Distinguishes the three failure modes callers act on differently:
    /// [`Error::ConfigNotFound`] (file missing), [`Error::ConfigMalformed`]
    /// (not JSON, carrying the parser's line/column message), and
    /// [`Error::ConfigSchema`] (JSON, but not a `configurations` array of
    /// named objects). `//` and `/* */` comments are tolerated, as VSCode
    /// itself accepts them in this file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let cleaned = strip_json_comments(&content);
        let root: Value = serde_json::from_str(&cleaned)
            .map_err(|e| Error::config_malformed(path, e.to_string()))?;

        let doc = Self {
            path: path.to_path_buf(),
            root,
        };
        doc.check_schema()?;
        debug!(
            "Loaded {} with entries {:?}",
            path.display(),
            doc.entry_names()
        );
        Ok(doc)
    }

    fn check_schema(&self) -> Result<()> {
        let Some(root) = self.root.as_object() else {
            return Err(Error::config_schema(&self.path, "root is not an object"));
        };
        let Some(configurations) = root.get("configurations") else {
            return Err(Error::config_schema(
                &self.path,
                "missing \"configurations\" key",
            ));
        };
        let Some(entries) = configurations.as_array() else {
            return Err(Error::config_schema(
                &self.path,
                "\"configurations\" is not an array",
            ));
        };
        for (index, entry) in entries.iter().enumerate() {
            let Some(entry) = entry.as_object() else {
                return Err(Error::config_schema(
                    &self.path,
                    format!("configurations[{index}] is not an object"),
                ));
            };
            if !entry.get("name").is_some_and(Value::is_string) {
                return Err(Error::config_schema(
                    &self.path,
                    format!("configurations[{index}] has no \"name\" string"),
                ));
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> &[Value] {
        self.root
            .get("configurations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn entries_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root
            .get_mut("configurations")
            .and_then(Value::as_array_mut)
    }

    /// First entry whose `name` matches. Duplicate names resolve to the
    /// first occurrence.
    fn entry_index(&self, name: &str) -> Option<usize> {
        self.entries()
            .iter()
            .position(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entry_index(name).is_some()
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    /// Replace `includePath` and `defines` of the named entry wholesale.
    ///
    /// These two fields are tool-owned for the managed entry; everything
    /// else in it stays as the user wrote it. Never creates an entry.
    pub fn apply_flags(&mut self, entry_name: &str, flags: &CompileFlags) -> Result<()> {
        let path = self.path.clone();
        let Some(index) = self.entry_index(entry_name) else {
            return Err(Error::entry_not_found(entry_name, path));
        };

        let include_path = Value::Array(
            flags
                .include_paths()
                .iter()
                .map(|p| Value::String(p.to_string_lossy().into_owned()))
                .collect(),
        );
        let defines = Value::Array(
            flags
                .defines()
                .iter()
                .map(|d| Value::String(d.clone()))
                .collect(),
        );

        let entry = self
            .entries_mut()
            .and_then(|entries| entries.get_mut(index))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::config_schema(&path, "configuration entry is not an object"))?;
        entry.insert("includePath".to_string(), include_path);
        entry.insert("defines".to_string(), defines);

        debug!("Replaced includePath and defines of entry {entry_name:?}");
        Ok(())
    }

    /// Clone the base entry under a new name.
    ///
    /// A fresh clone is inserted right after the base; an entry already
    /// bearing the new name is refreshed in place instead, keeping its
    /// position. Fails with [`Error::EntryNotFound`] if the base is absent.
    pub fn clone_entry(&mut self, base_name: &str, new_name: &str) -> Result<()> {
        let path = self.path.clone();
        let Some(base_index) = self.entry_index(base_name) else {
            return Err(Error::entry_not_found(base_name, path));
        };

        let mut clone = self.entries()[base_index].clone();
        if let Some(entry) = clone.as_object_mut() {
            entry.insert("name".to_string(), Value::String(new_name.to_string()));
        }

        let existing = self.entry_index(new_name);
        let Some(entries) = self.entries_mut() else {
            return Err(Error::config_schema(&path, "\"configurations\" is not an array"));
        };
        match existing {
            Some(index) if index != base_index => {
                entries[index] = clone;
                debug!("Refreshed entry {new_name:?} from {base_name:?}");
            }
            Some(_) => {} // cloning an entry onto itself
            None => {
                entries.insert(base_index + 1, clone);
                debug!("Created entry {new_name:?} after {base_name:?}");
            }
        }
        Ok(())
    }

    /// Write the document back to its original path.
    ///
    /// The rendered bytes go to a temp file in the same directory first and
    /// are renamed over the original, so a failed run never leaves a
    /// half-written config behind. External edits made between [`load`] and
    /// this call are overwritten; there is no file locking.
    ///
    /// [`load`]: PropertiesDoc::load
    pub fn save(&self) -> Result<()> {
        let rendered = self.render()?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(PROPERTIES_FILE);
        let temp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        // Atomic write: write to temp, then rename
        std::fs::write(&temp_path, &rendered)?;
        std::fs::rename(&temp_path, &self.path)?;

        info!("Saved {}", self.path.display());
        Ok(())
    }

    /// Pretty-print with VSCode's 4-space indentation and a trailing newline.
    fn render(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.root
            .serialize(&mut serializer)
            .map_err(|e| Error::config_malformed(&self.path, e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Strip comments from JSON (JSONC support)
///
/// VSCode uses JSONC which allows // and /* */ comments
fn strip_json_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    // Line comment - skip until newline
                    chars.next();
                    while let Some(&nc) = chars.peek() {
                        if nc == '\n' {
                            break;
                        }
                        chars.next();
                    }
                    continue;
                }
                Some('*') => {
                    // Block comment - skip until */
                    chars.next();
                    while let Some(nc) = chars.next() {
                        if nc == '*' {
                            if let Some(&'/') = chars.peek() {
                                chars.next();
                                break;
                            }
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        result.push(c);
    }

    result
}
