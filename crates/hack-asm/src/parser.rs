//! Turn assembly source text into a stream of [`Instruction`] values.

use std::path::Path;

use n2t_core::{SourceLocation, ToolError};

use crate::instruction::{AValue, Comp, Dest, Instruction, Jump};

/// Parse every non-blank, non-comment line of `text` into an [`Instruction`].
/// Labels, A-instructions, and C-instructions are recognized by their
/// leading character, matching the reference grammar.
pub fn parse(text: &str, file: &Path) -> Result<Vec<Instruction>, ToolError> {
    let mut instructions = Vec::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let at = SourceLocation::new(file.to_path_buf(), line_no);
        instructions.push(parse_line(line, at)?);
    }

    Ok(instructions)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_line(line: &str, at: SourceLocation) -> Result<Instruction, ToolError> {
    if let Some(rest) = line.strip_prefix('@') {
        let value = if let Ok(n) = rest.parse::<u16>() {
            AValue::Literal(n)
        } else {
            if !is_valid_symbol(rest) {
                return Err(ToolError::Syntax {
                    at,
                    message: format!("invalid A-instruction operand: '{}'", rest),
                });
            }
            AValue::Symbol(rest.to_string())
        };
        return Ok(Instruction::A { value, at });
    }

    if let Some(rest) = line.strip_prefix('(') {
        let name = rest.strip_suffix(')').ok_or_else(|| ToolError::Syntax {
            at: at.clone(),
            message: format!("unterminated label declaration: '{}'", line),
        })?;
        if !is_valid_symbol(name) {
            return Err(ToolError::Syntax {
                at,
                message: format!("invalid label name: '{}'", name),
            });
        }
        return Ok(Instruction::Label {
            name: name.to_string(),
            at,
        });
    }

    parse_c_instruction(line, at)
}

fn parse_c_instruction(line: &str, at: SourceLocation) -> Result<Instruction, ToolError> {
    let (dest_str, rest) = match line.split_once('=') {
        Some((d, r)) => (d, r),
        None => ("", line),
    };
    let (comp_str, jump_str) = match rest.split_once(';') {
        Some((c, j)) => (c, j),
        None => (rest, ""),
    };

    let dest = Dest::parse(dest_str).ok_or_else(|| ToolError::Syntax {
        at: at.clone(),
        message: format!("invalid dest mnemonic: '{}'", dest_str),
    })?;
    let comp = Comp::parse(comp_str).ok_or_else(|| ToolError::Syntax {
        at: at.clone(),
        message: format!("invalid comp mnemonic: '{}'", comp_str),
    })?;
    let jump = Jump::parse(jump_str).ok_or_else(|| ToolError::Syntax {
        at: at.clone(),
        message: format!("invalid jump mnemonic: '{}'", jump_str),
    })?;

    Ok(Instruction::C {
        dest,
        comp,
        jump,
        at,
    })
}

fn is_valid_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | '.' | ':' | '$') => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '$'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_str(s: &str) -> Vec<Instruction> {
        parse(s, &PathBuf::from("test.asm")).unwrap()
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let instructions = parse_str("// a comment\n\n@16\n");
        assert_eq!(instructions.len(), 1);
    }

    #[test]
    fn parses_a_instruction_literal_and_symbol() {
        let instructions = parse_str("@16\n@LOOP\n");
        assert!(matches!(
            instructions[0],
            Instruction::A {
                value: AValue::Literal(16),
                ..
            }
        ));
        assert!(matches!(
            &instructions[1],
            Instruction::A { value: AValue::Symbol(s), .. } if s == "LOOP"
        ));
    }

    #[test]
    fn parses_label() {
        let instructions = parse_str("(LOOP)\n");
        assert!(matches!(&instructions[0], Instruction::Label { name, .. } if name == "LOOP"));
    }

    #[test]
    fn parses_full_c_instruction() {
        let instructions = parse_str("D=D+1;JGT\n");
        match &instructions[0] {
            Instruction::C {
                dest, comp, jump, ..
            } => {
                assert_eq!(*dest, Dest::parse("D").unwrap());
                assert_eq!(*comp, Comp::DPlus1);
                assert_eq!(*jump, Jump::JGT);
            }
            other => panic!("expected C-instruction, got {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_comp() {
        let err = parse("D=Q\n", &PathBuf::from("t.asm")).unwrap_err();
        assert!(matches!(err, ToolError::Syntax { .. }));
    }

    #[test]
    fn parses_the_shift_comps() {
        let instructions = parse_str("M=M<<\nM=M>>\n");
        match &instructions[0] {
            Instruction::C { comp, .. } => assert_eq!(*comp, Comp::MShl),
            other => panic!("expected C-instruction, got {:?}", other),
        }
        match &instructions[1] {
            Instruction::C { comp, .. } => assert_eq!(*comp, Comp::MShr),
            other => panic!("expected C-instruction, got {:?}", other),
        }
    }
}
