//! Drive whole-program compilation: file discovery and the one `.vm` file
//! per `.jack` source a run produces.

use std::path::{Path, PathBuf};

use n2t_core::ToolError;

use crate::codegen;
use crate::lexer;
use crate::parser;

#[derive(Debug)]
pub enum CompileError {
    Tool(ToolError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Tool(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ToolError> for CompileError {
    fn from(e: ToolError) -> Self {
        CompileError::Tool(e)
    }
}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Tool(ToolError::Io(e))
    }
}

/// Compile one `.jack` source file's text into VM command text.
pub fn compile_file(text: &str, file: &Path) -> Result<String, CompileError> {
    let tokens = lexer::tokenize(text, file)?;
    let class = parser::parse(&tokens, file)?;
    let lines = codegen::compile_class(&class)?;
    Ok(lines.join("\n") + "\n")
}

/// Resolve `input` (a file or a directory) to its `.jack` sources, compile
/// each independently, and write one `.vm` file per source alongside it.
pub fn compile_path(input: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let jack_files = n2t_core::files_with_extension(input, "jack")?;

    let mut outputs = Vec::with_capacity(jack_files.len());
    for path in jack_files {
        let text = std::fs::read_to_string(&path)?;
        let vm_text = compile_file(&text, &path)?;
        let output = path.with_extension("vm");
        std::fs::write(&output, vm_text)?;
        outputs.push(output);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn compile_file_lowers_a_tiny_class() {
        let vm = compile_file(
            "class A { function int f() { return 2+3*4; } }",
            Path::new("A.jack"),
        )
        .unwrap();
        assert_eq!(
            vm,
            "function A.f 0\n\
             push constant 2\n\
             push constant 3\n\
             add\n\
             push constant 4\n\
             call Math.multiply 2\n\
             return\n"
        );
    }

    #[test]
    fn compile_path_writes_one_vm_file_per_jack_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Main.jack");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "class Main {{ function void main() {{ return; }} }}").unwrap();

        let outputs = compile_path(dir.path()).unwrap();
        assert_eq!(outputs, vec![dir.path().join("Main.vm")]);
        let written = std::fs::read_to_string(&outputs[0]).unwrap();
        assert!(written.contains("function Main.main 0"));
    }
}
