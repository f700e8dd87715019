//! Parse `.vm` text into [`Command`] values.
//!
//! Classification is by the first whitespace-separated token on the line,
//! never by substring containment — a line like `push argument 0` and one
//! like `pop argument 0` must not be confused by a classifier that merely
//! checks whether the line contains the word `"push"`.

use std::path::Path;

use n2t_core::{SourceLocation, ToolError};

use crate::command::{ArithOp, Command, Segment};

pub fn parse(text: &str, file: &Path) -> Result<Vec<Command>, ToolError> {
    let mut commands = Vec::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let at = SourceLocation::new(file.to_path_buf(), line_no);
        commands.push(parse_line(line, at)?);
    }

    Ok(commands)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_line(line: &str, at: SourceLocation) -> Result<Command, ToolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let head = tokens[0];

    if let Some(op) = ArithOp::parse(head) {
        return Ok(Command::Arithmetic { op, at });
    }

    match head {
        "push" | "pop" => {
            let (segment, index) = parse_memory_args(&tokens, &at)?;
            if head == "push" {
                Ok(Command::Push { segment, index, at })
            } else {
                Ok(Command::Pop { segment, index, at })
            }
        }
        "label" => Ok(Command::Label {
            name: require_arg(&tokens, 1, &at)?.to_string(),
            at,
        }),
        "goto" => Ok(Command::Goto {
            name: require_arg(&tokens, 1, &at)?.to_string(),
            at,
        }),
        "if-goto" => Ok(Command::IfGoto {
            name: require_arg(&tokens, 1, &at)?.to_string(),
            at,
        }),
        "function" => Ok(Command::Function {
            name: require_arg(&tokens, 1, &at)?.to_string(),
            n_locals: require_u16(&tokens, 2, &at)?,
            at,
        }),
        "call" => Ok(Command::Call {
            name: require_arg(&tokens, 1, &at)?.to_string(),
            n_args: require_u16(&tokens, 2, &at)?,
            at,
        }),
        "return" => Ok(Command::Return { at }),
        other => Err(ToolError::Syntax {
            at,
            message: format!("unrecognized VM command: '{}'", other),
        }),
    }
}

fn parse_memory_args(
    tokens: &[&str],
    at: &SourceLocation,
) -> Result<(Segment, u16), ToolError> {
    let seg_str = require_arg(tokens, 1, at)?;
    let segment = Segment::parse(seg_str).ok_or_else(|| ToolError::Syntax {
        at: at.clone(),
        message: format!("unknown segment: '{}'", seg_str),
    })?;
    let index = require_u16(tokens, 2, at)?;
    Ok((segment, index))
}

fn require_arg<'a>(
    tokens: &[&'a str],
    idx: usize,
    at: &SourceLocation,
) -> Result<&'a str, ToolError> {
    tokens.get(idx).copied().ok_or_else(|| ToolError::Syntax {
        at: at.clone(),
        message: "missing argument".to_string(),
    })
}

fn require_u16(tokens: &[&str], idx: usize, at: &SourceLocation) -> Result<u16, ToolError> {
    let text = require_arg(tokens, idx, at)?;
    text.parse().map_err(|_| ToolError::Syntax {
        at: at.clone(),
        message: format!("expected a non-negative integer, got '{}'", text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_str(s: &str) -> Vec<Command> {
        parse(s, &PathBuf::from("t.vm")).unwrap()
    }

    #[test]
    fn classifies_by_first_token_not_substring() {
        // A naive `line.contains("push")` classifier would also match this.
        let commands = parse_str("pop local 0 // pushes nothing\n");
        assert!(matches!(
            commands[0],
            Command::Pop {
                segment: Segment::Local,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn parses_arithmetic_and_stack_ops() {
        let commands = parse_str("push constant 7\nadd\n");
        assert!(matches!(
            commands[0],
            Command::Push {
                segment: Segment::Constant,
                index: 7,
                ..
            }
        ));
        assert!(matches!(
            commands[1],
            Command::Arithmetic {
                op: ArithOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn parses_function_and_call() {
        let commands = parse_str("function Foo.bar 2\ncall Foo.bar 2\nreturn\n");
        assert!(matches!(&commands[0], Command::Function { name, n_locals: 2, .. } if name == "Foo.bar"));
        assert!(matches!(&commands[1], Command::Call { name, n_args: 2, .. } if name == "Foo.bar"));
        assert!(matches!(commands[2], Command::Return { .. }));
    }

    #[test]
    fn rejects_unknown_command() {
        let err = parse("frobnicate\n", &PathBuf::from("t.vm")).unwrap_err();
        assert!(matches!(err, ToolError::Syntax { .. }));
    }
}
