//! Emit Hack assembly for each VM command.
//!
//! [`CodeWriter`] carries the state that must persist across commands: the
//! current file's static-segment/label namespace, a comparison-label
//! counter that resets per file, and a call-site counter that stays
//! monotonic across an entire translator invocation.

use n2t_core::SourceLocation;

use crate::command::{ArithOp, Command, Segment};

#[derive(Debug)]
pub enum CodeGenError {
    Logic { at: SourceLocation, message: String },
}

impl std::fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeGenError::Logic { at, message } => write!(f, "{}: {}", at, message),
        }
    }
}

impl std::error::Error for CodeGenError {}

pub struct CodeWriter {
    static_name: String,
    cmp_counter: u32,
    call_counter: u32,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            static_name: String::new(),
            cmp_counter: 0,
            call_counter: 0,
        }
    }

    /// Switch to a new translation unit: the label/static namespace changes
    /// and the comparison counter resets, but the call counter does not.
    pub fn set_file(&mut self, static_name: &str) {
        self.static_name = static_name.to_string();
        self.cmp_counter = 0;
    }

    /// The `SP=256` / `call Sys.init 0` prelude emitted once for
    /// multi-file (directory) translation runs.
    pub fn write_bootstrap(&mut self) -> Vec<String> {
        let mut lines = vec!["@256".to_string(), "D=A".to_string(), "@SP".to_string(), "M=D".to_string()];
        lines.extend(self.write_call("Sys.init", 0));
        lines
    }

    pub fn write_command(&mut self, cmd: &Command) -> Result<Vec<String>, CodeGenError> {
        Ok(match cmd {
            Command::Arithmetic { op, .. } => self.write_arithmetic(*op),
            Command::Push { segment, index, at } => self.write_push(*segment, *index, at)?,
            Command::Pop { segment, index, at } => self.write_pop(*segment, *index, at)?,
            Command::Label { name, .. } => vec![format!("({}.{})", self.static_name, name)],
            Command::Goto { name, .. } => {
                vec![format!("@{}.{}", self.static_name, name), "0;JMP".to_string()]
            }
            Command::IfGoto { name, .. } => vec![
                "@SP".to_string(),
                "AM=M-1".to_string(),
                "D=M".to_string(),
                format!("@{}.{}", self.static_name, name),
                "D;JNE".to_string(),
            ],
            Command::Function { name, n_locals, .. } => self.write_function(name, *n_locals),
            Command::Call { name, n_args, .. } => self.write_call(name, *n_args),
            Command::Return { .. } => self.write_return(),
        })
    }

    fn write_arithmetic(&mut self, op: ArithOp) -> Vec<String> {
        match op {
            ArithOp::Add => binary_op("M=M+D"),
            ArithOp::Sub => binary_op("M=M-D"),
            ArithOp::And => binary_op("M=M&D"),
            ArithOp::Or => binary_op("M=M|D"),
            ArithOp::Neg => unary_op("M=-M"),
            ArithOp::Not => unary_op("M=!M"),
            ArithOp::Shl => unary_op("M=M<<"),
            ArithOp::Shr => unary_op("M=M>>"),
            ArithOp::Eq => self.write_eq(),
            ArithOp::Gt => self.write_comparison("JGE", "JGT"),
            ArithOp::Lt => self.write_comparison("JLT", "JLT"),
        }
    }

    fn next_cmp_base(&mut self) -> String {
        let n = self.cmp_counter;
        self.cmp_counter += 1;
        format!("{}$CMP{}", self.static_name, n)
    }

    /// `eq` never needs the sign-aware branch: `x - y` cannot overflow in a
    /// way that changes whether the result is zero.
    fn write_eq(&mut self) -> Vec<String> {
        let base = self.next_cmp_base();
        lines(&[
            "@SP", "AM=M-1", "D=M", "A=A-1", "D=M-D",
        ])
        .into_iter()
        .chain(lines(&[&format!("@{}_TRUE", base), "D;JEQ", "@SP", "A=M-1", "M=0", &format!("@{}_END", base), "0;JMP", &format!("({}_TRUE)", base), "@SP", "A=M-1", "M=-1", &format!("({}_END)", base)]))
        .collect()
    }

    /// Sign-aware `gt`/`lt`: opposite-signed operands can never make a
    /// naive subtraction overflow, so their result is read off the sign of
    /// `x` directly; same-signed operands fall back to subtraction.
    /// `opposite_jump` is the condition on `x` that means "true" when the
    /// signs differ; `same_jump` is the condition on `x - y` that means
    /// "true" when the signs agree.
    fn write_comparison(&mut self, opposite_jump: &str, same_jump: &str) -> Vec<String> {
        let base = self.next_cmp_base();
        let mut out = lines(&[
            "@SP", "AM=M-1", "D=M", "@R13", "M=D", // R13 = y
            "@SP", "A=M-1", "D=M", "@R14", "M=D", // R14 = x
        ]);
        out.extend(lines(&[
            "@R14", "D=M",
        ]));
        out.push(format!("@{}_XNEG", base));
        out.push("D;JLT".to_string());
        out.extend(lines(&["@R13", "D=M"]));
        out.push(format!("@{}_OPP", base));
        out.push("D;JLT".to_string());
        out.push(format!("@{}_SAME", base));
        out.push("0;JMP".to_string());
        out.push(format!("({}_XNEG)", base));
        out.extend(lines(&["@R13", "D=M"]));
        out.push(format!("@{}_SAME", base));
        out.push("D;JLT".to_string());
        out.push(format!("@{}_OPP", base));
        out.push("0;JMP".to_string());
        out.push(format!("({}_OPP)", base));
        out.extend(lines(&["@R14", "D=M"]));
        out.push(format!("@{}_TRUE", base));
        out.push(format!("D;{}", opposite_jump));
        out.push(format!("@{}_FALSE", base));
        out.push("0;JMP".to_string());
        out.push(format!("({}_SAME)", base));
        out.extend(lines(&["@R14", "D=M", "@R13", "D=D-M"]));
        out.push(format!("@{}_TRUE", base));
        out.push(format!("D;{}", same_jump));
        out.push(format!("@{}_FALSE", base));
        out.push("0;JMP".to_string());
        out.push(format!("({}_FALSE)", base));
        out.extend(lines(&["@SP", "A=M-1", "M=0"]));
        out.push(format!("@{}_END", base));
        out.push("0;JMP".to_string());
        out.push(format!("({}_TRUE)", base));
        out.extend(lines(&["@SP", "A=M-1", "M=-1"]));
        out.push(format!("({}_END)", base));
        out
    }

    fn write_push(
        &self,
        segment: Segment,
        index: u16,
        at: &SourceLocation,
    ) -> Result<Vec<String>, CodeGenError> {
        let load_d = match segment {
            Segment::Constant => lines(&[&format!("@{}", index), "D=A"]),
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = base_register(segment);
                lines(&[&format!("@{}", index), "D=A", &format!("@{}", base), "A=D+A", "D=M"])
            }
            Segment::Pointer | Segment::Temp => {
                let addr = direct_address(segment, index, at)?;
                lines(&[&format!("@{}", addr), "D=M"])
            }
            Segment::Static => lines(&[&format!("@{}.{}", self.static_name, index), "D=M"]),
        };
        Ok(load_d.into_iter().chain(push_d()).collect())
    }

    fn write_pop(
        &self,
        segment: Segment,
        index: u16,
        at: &SourceLocation,
    ) -> Result<Vec<String>, CodeGenError> {
        if segment == Segment::Constant {
            return Err(CodeGenError::Logic {
                at: at.clone(),
                message: "cannot pop into the constant segment".to_string(),
            });
        }

        let store = match segment {
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = base_register(segment);
                let mut out = lines(&[
                    &format!("@{}", index),
                    "D=A",
                    &format!("@{}", base),
                    "D=D+A",
                    "@R13",
                    "M=D",
                ]);
                out.extend(pop_to_d());
                out.extend(lines(&["@R13", "A=M", "M=D"]));
                out
            }
            Segment::Pointer | Segment::Temp => {
                let addr = direct_address(segment, index, at)?;
                let mut out = pop_to_d();
                out.push(format!("@{}", addr));
                out.push("M=D".to_string());
                out
            }
            Segment::Static => {
                let mut out = pop_to_d();
                out.push(format!("@{}.{}", self.static_name, index));
                out.push("M=D".to_string());
                out
            }
            Segment::Constant => unreachable!(),
        };
        Ok(store)
    }

    fn write_function(&mut self, name: &str, n_locals: u16) -> Vec<String> {
        let mut out = vec![format!("({})", name)];
        for _ in 0..n_locals {
            out.extend(lines(&["@SP", "A=M", "M=0", "@SP", "M=M+1"]));
        }
        out
    }

    fn write_call(&mut self, name: &str, n_args: u16) -> Vec<String> {
        let n = self.call_counter;
        self.call_counter += 1;
        let ret_label = format!("{}$ret.{}", name, n);

        let mut out = lines(&[&format!("@{}", ret_label), "D=A"]);
        out.extend(push_d());
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            out.extend(lines(&[&format!("@{}", reg), "D=M"]));
            out.extend(push_d());
        }
        out.extend(lines(&[
            "@SP",
            "D=M",
            &format!("@{}", n_args as u32 + 5),
            "D=D-A",
            "@ARG",
            "M=D",
            "@SP",
            "D=M",
            "@LCL",
            "M=D",
            &format!("@{}", name),
            "0;JMP",
            &format!("({})", ret_label),
        ]));
        out
    }

    fn write_return(&mut self) -> Vec<String> {
        lines(&[
            "@LCL", "D=M", "@R13", "M=D", // R13 = endFrame
            "@5", "D=D-A", "A=D", "D=M", "@R14", "M=D", // R14 = retAddr
            "@SP", "AM=M-1", "D=M", "@ARG", "A=M", "M=D", // *ARG = pop()
            "@ARG", "D=M+1", "@SP", "M=D", // SP = ARG+1
            "@R13", "AM=M-1", "D=M", "@THAT", "M=D",
            "@R13", "AM=M-1", "D=M", "@THIS", "M=D",
            "@R13", "AM=M-1", "D=M", "@ARG", "M=D",
            "@R13", "AM=M-1", "D=M", "@LCL", "M=D",
            "@R14", "A=M", "0;JMP",
        ])
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn base_register(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!(),
    }
}

fn direct_address(
    segment: Segment,
    index: u16,
    at: &SourceLocation,
) -> Result<u16, CodeGenError> {
    match segment {
        Segment::Pointer if index <= 1 => Ok(3 + index),
        Segment::Temp if index <= 7 => Ok(5 + index),
        Segment::Pointer | Segment::Temp => Err(CodeGenError::Logic {
            at: at.clone(),
            message: format!("index {} out of range for {:?}", index, segment),
        }),
        _ => unreachable!(),
    }
}

fn binary_op(compute: &str) -> Vec<String> {
    lines(&["@SP", "AM=M-1", "D=M", "A=A-1", compute])
}

fn unary_op(compute: &str) -> Vec<String> {
    lines(&["@SP", "A=M-1", compute])
}

fn push_d() -> Vec<String> {
    lines(&["@SP", "A=M", "M=D", "@SP", "M=M+1"])
}

fn pop_to_d() -> Vec<String> {
    lines(&["@SP", "AM=M-1", "D=M"])
}

fn lines(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}
