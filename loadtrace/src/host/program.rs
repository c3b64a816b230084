//! Module programs
//!
//! A module's body is a list of directives executed top to bottom. Source
//! files spell them one per line:
//!
//! ```text
//! # comment
//! import json.decoder
//! alloc 65536
//! sleep 5
//! raise configuration missing
//! ```
//!
//! Precompiled images store the same list as JSON:
//! `{"instructions": [{"op": "import", "module": "json.decoder"}]}`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::{Module, Runtime};
use crate::domain::{LoadError, ModuleName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Instruction {
    /// Load another module (no-op if already loaded)
    Import { module: ModuleName },
    /// Allocate and retain touched memory
    Alloc { bytes: usize },
    /// Spend wall time
    Sleep { millis: u64 },
    /// Fail the current load
    Raise { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Parse the text form of a module
    ///
    /// # Errors
    /// Returns [`LoadError::Syntax`] with the 1-based line of the first bad
    /// directive.
    pub fn parse(text: &str, file: &Path) -> Result<Self, LoadError> {
        let mut instructions = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (directive, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let arg = arg.trim();
            let syntax = |message: String| LoadError::Syntax {
                file: file.to_path_buf(),
                line: idx + 1,
                message,
            };

            let instruction = match directive {
                "import" => {
                    let module = ModuleName::parse(arg).map_err(|e| syntax(e.to_string()))?;
                    Instruction::Import { module }
                }
                "alloc" => {
                    let bytes =
                        arg.parse().map_err(|_| syntax(format!("invalid byte count '{arg}'")))?;
                    Instruction::Alloc { bytes }
                }
                "sleep" => {
                    let millis =
                        arg.parse().map_err(|_| syntax(format!("invalid duration '{arg}'")))?;
                    Instruction::Sleep { millis }
                }
                "raise" => {
                    let message = if arg.is_empty() { "raised".to_string() } else { arg.to_string() };
                    Instruction::Raise { message }
                }
                other => return Err(syntax(format!("unknown directive '{other}'"))),
            };

            instructions.push(instruction);
        }

        Ok(Self { instructions })
    }

    /// Decode a precompiled image
    ///
    /// # Errors
    /// Returns [`LoadError::Corrupt`] if the image is not a valid program.
    pub fn from_image(bytes: &[u8], file: &Path) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes)
            .map_err(|source| LoadError::Corrupt { file: file.to_path_buf(), source })
    }

    /// Encode this program as a precompiled image
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_image(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Run the program as the body of `module`
    ///
    /// # Errors
    /// Stops at the first failing directive and returns its error unchanged,
    /// including failures of nested imports.
    pub fn execute(&self, module: &Module, runtime: &Runtime) -> Result<(), LoadError> {
        for instruction in &self.instructions {
            match instruction {
                Instruction::Import { module: name } => {
                    runtime.import(name)?;
                }
                Instruction::Alloc { bytes } => {
                    let mut block = Vec::new();
                    block.try_reserve_exact(*bytes).map_err(|e| LoadError::Raised {
                        module: module.name().clone(),
                        message: format!("cannot allocate {bytes} bytes: {e}"),
                    })?;
                    block.resize(*bytes, 1u8);
                    module.retain(block);
                }
                Instruction::Sleep { millis } => std::thread::sleep(Duration::from_millis(*millis)),
                Instruction::Raise { message } => {
                    return Err(LoadError::Raised {
                        module: module.name().clone(),
                        message: message.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
