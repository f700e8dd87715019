//! Drive whole-program translation: file discovery, bootstrap emission,
//! and the single `.asm` output file a run produces.

use std::path::{Path, PathBuf};

use n2t_core::ToolError;

use crate::codegen::{CodeGenError, CodeWriter};
use crate::parser;

#[derive(Debug)]
pub enum TranslateError {
    Tool(ToolError),
    CodeGen(CodeGenError),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Tool(e) => write!(f, "{}", e),
            TranslateError::CodeGen(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<ToolError> for TranslateError {
    fn from(e: ToolError) -> Self {
        TranslateError::Tool(e)
    }
}

impl From<CodeGenError> for TranslateError {
    fn from(e: CodeGenError) -> Self {
        TranslateError::CodeGen(e)
    }
}

impl From<std::io::Error> for TranslateError {
    fn from(e: std::io::Error) -> Self {
        TranslateError::Tool(ToolError::Io(e))
    }
}

/// Translate the `.vm` sources named by `(path, text)` pairs into one
/// assembly program. `bootstrap` controls whether the `SP=256` /
/// `call Sys.init 0` prelude is emitted — callers pass `true` only for
/// directory (multi-file) input.
pub fn translate(files: &[(PathBuf, String)], bootstrap: bool) -> Result<String, TranslateError> {
    let mut writer = CodeWriter::new();
    let mut lines = Vec::new();

    if bootstrap {
        lines.extend(writer.write_bootstrap());
    }

    for (path, text) in files {
        let static_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        writer.set_file(&static_name);

        let commands = parser::parse(text, path)?;
        for cmd in &commands {
            lines.extend(writer.write_command(cmd)?);
        }
    }

    Ok(lines.join("\n") + "\n")
}

/// Resolve `input` (a file or a directory) to its `.vm` sources, translate
/// them, and write the single resulting `.asm` file.
pub fn translate_path(input: &Path) -> Result<PathBuf, TranslateError> {
    let is_dir = input.is_dir();
    let vm_files = n2t_core::files_with_extension(input, "vm")?;

    let mut files = Vec::with_capacity(vm_files.len());
    for path in vm_files {
        let text = std::fs::read_to_string(&path)?;
        files.push((path, text));
    }

    let asm = translate(&files, is_dir)?;

    let output = if is_dir {
        let name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("out");
        input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}.asm", name))
    } else {
        input.with_extension("asm")
    };
    std::fs::write(&output, asm)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_omits_bootstrap() {
        let files = vec![(
            PathBuf::from("Main.vm"),
            "push constant 7\npush constant 8\nadd\n".to_string(),
        )];
        let asm = translate(&files, false).unwrap();
        assert!(!asm.contains("Sys.init"));
    }

    #[test]
    fn directory_input_emits_bootstrap_once() {
        let files = vec![(
            PathBuf::from("Main.vm"),
            "function Sys.init 0\npush constant 1\nreturn\n".to_string(),
        )];
        let asm = translate(&files, true).unwrap();
        assert_eq!(asm.matches("Sys.init").count(), 2); // call site + function decl
    }

    #[test]
    fn call_labels_stay_monotonic_across_files() {
        let files = vec![
            (
                PathBuf::from("A.vm"),
                "function A.f 0\ncall B.g 0\nreturn\n".to_string(),
            ),
            (
                PathBuf::from("B.vm"),
                "function B.g 0\ncall A.f 0\nreturn\n".to_string(),
            ),
        ];
        let asm = translate(&files, false).unwrap();
        assert!(asm.contains("B.g$ret.0"));
        assert!(asm.contains("A.f$ret.1"));
    }
}
