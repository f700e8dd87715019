//! Lower a parsed class into VM command text.
//!
//! If/while label counters are class-scoped, not subroutine-scoped, per
//! the two monotonic per-class counters the label-generation rule calls
//! for — they are fields on [`Codegen`], which is constructed once per
//! class and threaded through every subroutine in it.

use n2t_core::{SourceLocation, ToolError};

use crate::ast::*;
use crate::symbol_table::{Kind, SymbolTable};
use crate::vm_writer as vm;

pub struct Codegen {
    class_name: String,
    symbols: SymbolTable,
    if_counter: u32,
    while_counter: u32,
}

pub fn compile_class(class: &ClassDecl) -> Result<Vec<String>, ToolError> {
    let mut codegen = Codegen {
        class_name: class.name.clone(),
        symbols: SymbolTable::new(),
        if_counter: 0,
        while_counter: 0,
    };

    for var_dec in &class.var_decs {
        let kind = match var_dec.kind {
            ClassVarKind::Static => Kind::Static,
            ClassVarKind::Field => Kind::Field,
        };
        for name in &var_dec.names {
            codegen.symbols.define(name, &var_dec.type_name, kind);
        }
    }

    let mut lines = Vec::new();
    for sub in &class.subroutines {
        lines.extend(codegen.compile_subroutine(sub)?);
    }
    Ok(lines)
}

impl Codegen {
    fn compile_subroutine(&mut self, sub: &SubroutineDec) -> Result<Vec<String>, ToolError> {
        self.symbols.start_subroutine();

        if sub.kind == SubroutineKind::Method {
            self.symbols.define("this", &self.class_name.clone(), Kind::Arg);
        }
        for param in &sub.params {
            self.symbols.define(&param.name, &param.type_name, Kind::Arg);
        }
        for var_dec in &sub.var_decs {
            for name in &var_dec.names {
                self.symbols.define(name, &var_dec.type_name, Kind::Var);
            }
        }

        let n_locals = self.symbols.var_count(Kind::Var);
        let qualified_name = format!("{}.{}", self.class_name, sub.name);

        let mut lines = vec![vm::function(&qualified_name, n_locals)];
        match sub.kind {
            SubroutineKind::Constructor => {
                let field_count = self.symbols.var_count(Kind::Field);
                lines.push(vm::push("constant", field_count));
                lines.push(vm::call("Memory.alloc", 1));
                lines.push(vm::pop("pointer", 0));
            }
            SubroutineKind::Method => {
                lines.push(vm::push("argument", 0));
                lines.push(vm::pop("pointer", 0));
            }
            SubroutineKind::Function => {}
        }

        for statement in &sub.body {
            lines.extend(self.compile_statement(statement)?);
        }

        Ok(lines)
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<Vec<String>, ToolError> {
        match statement {
            Statement::Let { name, index, value } => self.compile_let(name, index, value),
            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => self.compile_if(cond, then_branch, else_branch.as_deref()),
            Statement::While { cond, body } => self.compile_while(cond, body),
            Statement::Do(call) => {
                let mut lines = self.compile_call(call)?;
                lines.push(vm::pop("temp", 0));
                Ok(lines)
            }
            Statement::Return(value) => self.compile_return(value),
        }
    }

    fn compile_let(
        &mut self,
        name: &str,
        index: &Option<Expression>,
        value: &Expression,
    ) -> Result<Vec<String>, ToolError> {
        let mut lines = Vec::new();
        match index {
            None => {
                let entry = self.resolve(name)?;
                lines.extend(self.compile_expression(value)?);
                lines.push(vm::pop(entry.0, entry.1));
            }
            Some(index_expr) => {
                let entry = self.resolve(name)?;
                lines.push(vm::push(entry.0, entry.1));
                lines.extend(self.compile_expression(index_expr)?);
                lines.push(vm::arithmetic("add"));
                lines.extend(self.compile_expression(value)?);
                lines.push(vm::pop("temp", 0));
                lines.push(vm::pop("pointer", 1));
                lines.push(vm::push("temp", 0));
                lines.push(vm::pop("that", 0));
            }
        }
        Ok(lines)
    }

    fn compile_if(
        &mut self,
        cond: &Expression,
        then_branch: &[Statement],
        else_branch: Option<&[Statement]>,
    ) -> Result<Vec<String>, ToolError> {
        let i = self.if_counter;
        self.if_counter += 1;
        let true_label = format!("IF_TRUE{}", i);
        let false_label = format!("IF_FALSE{}", i);
        let end_label = format!("IF_END{}", i);

        let mut lines = self.compile_expression(cond)?;
        lines.push(vm::if_goto(&true_label));
        lines.push(vm::goto(&false_label));
        lines.push(vm::label(&true_label));
        for s in then_branch {
            lines.extend(self.compile_statement(s)?);
        }
        if let Some(else_branch) = else_branch {
            lines.push(vm::goto(&end_label));
            lines.push(vm::label(&false_label));
            for s in else_branch {
                lines.extend(self.compile_statement(s)?);
            }
            lines.push(vm::label(&end_label));
        } else {
            lines.push(vm::label(&false_label));
        }
        Ok(lines)
    }

    fn compile_while(
        &mut self,
        cond: &Expression,
        body: &[Statement],
    ) -> Result<Vec<String>, ToolError> {
        let j = self.while_counter;
        self.while_counter += 1;
        let exp_label = format!("WHILE_EXP{}", j);
        let end_label = format!("WHILE_END{}", j);

        let mut lines = vec![vm::label(&exp_label)];
        lines.extend(self.compile_expression(cond)?);
        lines.push(vm::arithmetic("not"));
        lines.push(vm::if_goto(&end_label));
        for s in body {
            lines.extend(self.compile_statement(s)?);
        }
        lines.push(vm::goto(&exp_label));
        lines.push(vm::label(&end_label));
        Ok(lines)
    }

    fn compile_return(&mut self, value: &Option<Expression>) -> Result<Vec<String>, ToolError> {
        let mut lines = match value {
            Some(e) => self.compile_expression(e)?,
            None => vec![vm::push("constant", 0)],
        };
        lines.push(vm::vm_return());
        Ok(lines)
    }

    fn compile_expression(&mut self, expr: &Expression) -> Result<Vec<String>, ToolError> {
        let mut lines = self.compile_term(&expr.head)?;
        for (op, term) in &expr.rest {
            lines.extend(self.compile_term(term)?);
            lines.push(self.compile_binary_op(*op));
        }
        Ok(lines)
    }

    fn compile_binary_op(&self, op: char) -> String {
        match op {
            '+' => vm::arithmetic("add"),
            '-' => vm::arithmetic("sub"),
            '*' => vm::call("Math.multiply", 2),
            '/' => vm::call("Math.divide", 2),
            '&' => vm::arithmetic("and"),
            '|' => vm::arithmetic("or"),
            '<' => vm::arithmetic("lt"),
            '>' => vm::arithmetic("gt"),
            '=' => vm::arithmetic("eq"),
            other => unreachable!("parser only emits recognized binary operators, got '{}'", other),
        }
    }

    fn compile_term(&mut self, term: &Term) -> Result<Vec<String>, ToolError> {
        Ok(match term {
            Term::IntConst(n) => vec![vm::push("constant", *n as u16)],
            Term::StringConst(s) => self.compile_string_const(s),
            Term::KeywordConst(k) => self.compile_keyword_const(*k),
            Term::Var(name) => {
                let (segment, index) = self.resolve(name)?;
                vec![vm::push(segment, index)]
            }
            Term::ArrayAccess(name, index_expr) => {
                let (segment, index) = self.resolve(name)?;
                let mut lines = vec![vm::push(segment, index)];
                lines.extend(self.compile_expression(index_expr)?);
                lines.push(vm::arithmetic("add"));
                lines.push(vm::pop("pointer", 1));
                lines.push(vm::push("that", 0));
                lines
            }
            Term::Call(call) => self.compile_call(call)?,
            Term::Paren(e) => self.compile_expression(e)?,
            Term::Unary(op, inner) => {
                let mut lines = self.compile_term(inner)?;
                lines.push(match op {
                    '-' => vm::arithmetic("neg"),
                    '~' => vm::arithmetic("not"),
                    '^' => vm::arithmetic("shr"),
                    '#' => vm::arithmetic("shl"),
                    other => unreachable!("parser only emits recognized unary operators, got '{}'", other),
                });
                lines
            }
        })
    }

    fn compile_string_const(&self, s: &str) -> Vec<String> {
        let mut lines = vec![
            vm::push("constant", s.chars().count() as u16),
            vm::call("String.new", 1),
        ];
        for c in s.chars() {
            lines.push(vm::push("constant", c as u16));
            lines.push(vm::call("String.appendChar", 2));
        }
        lines
    }

    fn compile_keyword_const(&self, k: KeywordConstant) -> Vec<String> {
        match k {
            KeywordConstant::True => vec![vm::push("constant", 0), vm::arithmetic("not")],
            KeywordConstant::False | KeywordConstant::Null => vec![vm::push("constant", 0)],
            KeywordConstant::This => vec![vm::push("pointer", 0)],
        }
    }

    /// Three-way dispatch: a bare call is an implicit method call on
    /// `this`; a call through a known variable is a method call on that
    /// variable's type; anything else is a static/function call.
    fn compile_call(&mut self, call: &SubroutineCall) -> Result<Vec<String>, ToolError> {
        match &call.receiver {
            None => {
                let mut lines = vec![vm::push("pointer", 0)];
                for arg in &call.args {
                    lines.extend(self.compile_expression(arg)?);
                }
                lines.push(vm::call(
                    &format!("{}.{}", self.class_name, call.name),
                    call.args.len() as u16 + 1,
                ));
                Ok(lines)
            }
            Some(receiver) => {
                if let Some(entry) = self.symbols.lookup(receiver) {
                    let segment = entry.kind.segment_name();
                    let index = entry.index;
                    let type_name = entry.type_name.clone();
                    let mut lines = vec![vm::push(segment, index)];
                    for arg in &call.args {
                        lines.extend(self.compile_expression(arg)?);
                    }
                    lines.push(vm::call(
                        &format!("{}.{}", type_name, call.name),
                        call.args.len() as u16 + 1,
                    ));
                    Ok(lines)
                } else {
                    let mut lines = Vec::new();
                    for arg in &call.args {
                        lines.extend(self.compile_expression(arg)?);
                    }
                    lines.push(vm::call(
                        &format!("{}.{}", receiver, call.name),
                        call.args.len() as u16,
                    ));
                    Ok(lines)
                }
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<(&'static str, u16), ToolError> {
        self.symbols
            .lookup(name)
            .map(|entry| (entry.kind.segment_name(), entry.index))
            .ok_or_else(|| ToolError::Semantic {
                at: SourceLocation::new(".", 0),
                message: format!("undefined variable '{}'", name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};
    use std::path::PathBuf;

    fn compile(src: &str) -> Vec<String> {
        let tokens = lexer::tokenize(src, &PathBuf::from("t.jack")).unwrap();
        let class = parser::parse(&tokens, &PathBuf::from("t.jack")).unwrap();
        compile_class(&class).unwrap()
    }

    #[test]
    fn scenario_5_arithmetic_precedence_free_evaluation() {
        // The grammar has no operator precedence: `2+3*4` evaluates
        // strictly left to right, as `(2+3)*4`, not `2+(3*4)`.
        let lines = compile("class A { function int f() { return 2+3*4; } }");
        assert_eq!(
            lines,
            vec![
                "function A.f 0",
                "push constant 2",
                "push constant 3",
                "add",
                "push constant 4",
                "call Math.multiply 2",
                "return",
            ]
        );
    }

    #[test]
    fn void_return_pushes_constant_zero() {
        let lines = compile("class A { function void f() { return; } }");
        assert_eq!(lines, vec!["function A.f 0", "push constant 0", "return"]);
    }

    #[test]
    fn constructor_allocates_and_sets_this() {
        let lines = compile(
            "class P { field int x; constructor P new(int v) { let x = v; return this; } }",
        );
        assert_eq!(lines[0], "function P.new 0");
        assert_eq!(lines[1], "push constant 1");
        assert_eq!(lines[2], "call Memory.alloc 1");
        assert_eq!(lines[3], "pop pointer 0");
    }

    #[test]
    fn method_call_through_known_variable_dispatches_on_its_type() {
        let lines = compile(
            "class Main { function void f() { var P p; do p.get(); return; } }",
        );
        assert!(lines.contains(&"call P.get 1".to_string()));
    }

    #[test]
    fn bare_call_is_implicit_method_call_on_this() {
        let lines = compile("class A { method void f() { do g(); return; } }");
        assert!(lines.contains(&"push pointer 0".to_string()));
        assert!(lines.contains(&"call A.g 1".to_string()));
    }

    #[test]
    fn array_write_evaluates_rhs_before_storing_through_that() {
        let lines = compile(
            "class A { function void f() { var Array a; let a[0] = a[1]; return; } }",
        );
        // The RHS array read must fully resolve (through `pointer 1`/`that`)
        // before the LHS address overwrites `pointer 1` again.
        let temp_pop = lines.iter().position(|l| l == "pop temp 0").unwrap();
        let pointer_pop = lines.iter().position(|l| l == "pop pointer 1").unwrap();
        assert!(temp_pop < pointer_pop);
    }

    #[test]
    fn if_and_while_counters_are_shared_across_subroutines_in_a_class() {
        let lines = compile(
            "class A { \
                function void f() { if (true) { } return; } \
                function void g() { if (true) { } return; } \
             }",
        );
        assert!(lines.contains(&"label IF_TRUE0".to_string()));
        assert!(lines.contains(&"label IF_TRUE1".to_string()));
    }
}
