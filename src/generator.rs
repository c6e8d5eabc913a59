//! Artifact generation: the functions file and the aliases file.
//!
//! Output is a pure function of the shell family and the ordered selection, so the same
//! selection always produces byte-identical files. Artifacts are regenerated in full on
//! every run and written by complete overwrite.

use std::path::{Path, PathBuf};

use crate::defaults;
use crate::platform::ShellFamily;
use crate::templates::{self, AliasGroup, BuiltinKey, FunctionKey};

const FUNCTIONS_HEADER: &str = "\
# Shell functions generated by sfm.
# Re-run sfm to change this file; manual edits are overwritten.
";

const ALIASES_HEADER: &str = "\
# Shell aliases generated by sfm.
# Re-run sfm to change this file; manual edits are overwritten.
";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("no template registered for {0}")]
    MissingTemplate(BuiltinKey),

    #[error("custom function name must not be empty")]
    EmptyCustomName,

    #[error("custom function '{0}' has an empty command")]
    EmptyCustomCommand(String),
}

/// A user-defined function wrapping a single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFunction {
    pub name: String,
    pub description: String,
    pub command: String,
}

impl CustomFunction {
    /// Only the name and the command are checked, and only for emptiness. Broken shell
    /// syntax in the command surfaces in the post-write syntax check.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<Self, GenerateError> {
        let name = name.into().trim().to_string();
        let command = command.into().trim().to_string();
        if name.is_empty() {
            return Err(GenerateError::EmptyCustomName);
        }
        if command.is_empty() {
            return Err(GenerateError::EmptyCustomCommand(name));
        }
        Ok(Self {
            name,
            description: single_line(&description.into()),
            command,
        })
    }

    fn render(&self, family: ShellFamily) -> String {
        match family {
            ShellFamily::PosixLike => {
                let mut out = String::new();
                if !self.description.is_empty() {
                    out.push_str(&format!("# {}\n", self.description));
                }
                out.push_str(&format!("{}() {{\n    {}\n}}\n", self.name, self.command));
                out
            }
            ShellFamily::StructuredScript => {
                let mut out = format!("function {}", self.name);
                if !self.description.is_empty() {
                    out.push_str(&format!(
                        " --description '{}'",
                        fish_single_quote(&self.description)
                    ));
                }
                out.push_str(&format!("\n    {}\nend\n", self.command));
                out
            }
        }
    }
}

/// One entry of the functions file, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionFeature {
    Builtin(FunctionKey),
    Custom(CustomFunction),
}

impl FunctionFeature {
    pub fn name(&self) -> &str {
        match self {
            FunctionFeature::Builtin(key) => key.as_str(),
            FunctionFeature::Custom(custom) => &custom.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub content: String,
}

/// Fixed artifact locations for a family under the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub functions: PathBuf,
    pub aliases: PathBuf,
}

impl ArtifactPaths {
    pub fn new(state_dir: &Path, family: ShellFamily) -> Self {
        let ext = family.extension();
        Self {
            functions: state_dir.join(format!("{}.{}", defaults::FUNCTIONS_STEM, ext)),
            aliases: state_dir.join(format!("{}.{}", defaults::ALIASES_STEM, ext)),
        }
    }
}

pub fn render_functions(
    family: ShellFamily,
    features: &[FunctionFeature],
    path: &Path,
) -> Result<GeneratedArtifact, GenerateError> {
    let mut content = FUNCTIONS_HEADER.to_string();
    for feature in features {
        content.push('\n');
        match feature {
            FunctionFeature::Builtin(key) => {
                content.push_str(builtin_body(BuiltinKey::Function(*key), family)?);
            }
            FunctionFeature::Custom(custom) => content.push_str(&custom.render(family)),
        }
    }

    Ok(GeneratedArtifact {
        path: path.to_path_buf(),
        content,
    })
}

pub fn render_aliases(
    family: ShellFamily,
    groups: &[AliasGroup],
    path: &Path,
) -> Result<GeneratedArtifact, GenerateError> {
    let mut content = ALIASES_HEADER.to_string();
    for group in groups {
        content.push('\n');
        content.push_str(builtin_body(BuiltinKey::Aliases(*group), family)?);
    }

    Ok(GeneratedArtifact {
        path: path.to_path_buf(),
        content,
    })
}

fn builtin_body(key: BuiltinKey, family: ShellFamily) -> Result<&'static str, GenerateError> {
    templates::lookup(key)
        .map(|t| t.body(family))
        .ok_or(GenerateError::MissingTemplate(key))
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fish_single_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
