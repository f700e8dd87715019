//! Recursive-descent parser with one-token lookahead, building the AST in
//! [`crate::ast`].

use std::path::Path;

use n2t_core::{SourceLocation, ToolError};

use crate::ast::*;
use crate::token::{Keyword, Token, TokenKind};

pub fn parse(tokens: &[Token], file: &Path) -> Result<ClassDecl, ToolError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        file,
    };
    parser.parse_class()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    file: &'a Path,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn at(&self) -> SourceLocation {
        self.tokens
            .get(self.pos)
            .map(|t| t.at.clone())
            .or_else(|| self.tokens.last().map(|t| t.at.clone()))
            .unwrap_or_else(|| SourceLocation::new(self.file.to_path_buf(), 0))
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        self.pos += 1;
        kind
    }

    fn error(&self, message: impl Into<String>) -> ToolError {
        ToolError::Syntax {
            at: self.at(),
            message: message.into(),
        }
    }

    fn expect_symbol(&mut self, c: char) -> Result<(), ToolError> {
        match self.peek() {
            Some(TokenKind::Symbol(s)) if *s == c => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(format!("expected '{}'", c))),
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ToolError> {
        match self.peek() {
            Some(TokenKind::Keyword(k)) if *k == kw => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(format!("expected '{}'", kw.text()))),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ToolError> {
        match self.peek().cloned() {
            Some(TokenKind::Identifier(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    fn at_symbol(&self, c: char) -> bool {
        matches!(self.peek(), Some(TokenKind::Symbol(s)) if *s == c)
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), Some(TokenKind::Keyword(k)) if *k == kw)
    }

    fn parse_type(&mut self) -> Result<String, ToolError> {
        match self.peek().cloned() {
            Some(TokenKind::Keyword(Keyword::Int)) => {
                self.advance();
                Ok("int".to_string())
            }
            Some(TokenKind::Keyword(Keyword::Char)) => {
                self.advance();
                Ok("char".to_string())
            }
            Some(TokenKind::Keyword(Keyword::Boolean)) => {
                self.advance();
                Ok("boolean".to_string())
            }
            Some(TokenKind::Identifier(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected a type")),
        }
    }

    fn parse_class(&mut self) -> Result<ClassDecl, ToolError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.at_keyword(Keyword::Static) || self.at_keyword(Keyword::Field) {
            var_decs.push(self.parse_class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while self.at_keyword(Keyword::Constructor)
            || self.at_keyword(Keyword::Function)
            || self.at_keyword(Keyword::Method)
        {
            subroutines.push(self.parse_subroutine_dec()?);
        }

        self.expect_symbol('}')?;
        Ok(ClassDecl {
            name,
            var_decs,
            subroutines,
        })
    }

    fn parse_class_var_dec(&mut self) -> Result<ClassVarDec, ToolError> {
        let kind = match self.advance() {
            TokenKind::Keyword(Keyword::Static) => ClassVarKind::Static,
            TokenKind::Keyword(Keyword::Field) => ClassVarKind::Field,
            _ => unreachable!("caller already checked"),
        };
        let type_name = self.parse_type()?;
        let mut names = vec![self.expect_identifier()?];
        while self.at_symbol(',') {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        self.expect_symbol(';')?;
        Ok(ClassVarDec {
            kind,
            type_name,
            names,
        })
    }

    fn parse_subroutine_dec(&mut self) -> Result<SubroutineDec, ToolError> {
        let kind = match self.advance() {
            TokenKind::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(Keyword::Function) => SubroutineKind::Function,
            TokenKind::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => unreachable!("caller already checked"),
        };

        let return_type = if self.at_keyword(Keyword::Void) {
            self.advance();
            None
        } else {
            Some(self.parse_type()?)
        };

        let name = self.expect_identifier()?;
        self.expect_symbol('(')?;
        let params = self.parse_param_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let mut var_decs = Vec::new();
        while self.at_keyword(Keyword::Var) {
            var_decs.push(self.parse_var_dec()?);
        }
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            params,
            var_decs,
            body,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, ToolError> {
        let mut params = Vec::new();
        if self.at_symbol(')') {
            return Ok(params);
        }
        loop {
            let type_name = self.parse_type()?;
            let name = self.expect_identifier()?;
            params.push(Param { type_name, name });
            if self.at_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    fn parse_var_dec(&mut self) -> Result<VarDec, ToolError> {
        self.expect_keyword(Keyword::Var)?;
        let type_name = self.parse_type()?;
        let mut names = vec![self.expect_identifier()?];
        while self.at_symbol(',') {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        self.expect_symbol(';')?;
        Ok(VarDec { type_name, names })
    }

    fn parse_statements(&mut self) -> Result<Vec<Statement>, ToolError> {
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(TokenKind::Keyword(Keyword::Let)) => statements.push(self.parse_let()?),
                Some(TokenKind::Keyword(Keyword::If)) => statements.push(self.parse_if()?),
                Some(TokenKind::Keyword(Keyword::While)) => statements.push(self.parse_while()?),
                Some(TokenKind::Keyword(Keyword::Do)) => statements.push(self.parse_do()?),
                Some(TokenKind::Keyword(Keyword::Return)) => {
                    statements.push(self.parse_return()?)
                }
                _ => break,
            }
        }
        Ok(statements)
    }

    fn parse_let(&mut self) -> Result<Statement, ToolError> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let index = if self.at_symbol('[') {
            self.advance();
            let e = self.parse_expression()?;
            self.expect_symbol(']')?;
            Some(e)
        } else {
            None
        };
        self.expect_symbol('=')?;
        let value = self.parse_expression()?;
        self.expect_symbol(';')?;
        Ok(Statement::Let { name, index, value })
    }

    fn parse_if(&mut self) -> Result<Statement, ToolError> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        let cond = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let then_branch = self.parse_statements()?;
        self.expect_symbol('}')?;

        let else_branch = if self.at_keyword(Keyword::Else) {
            self.advance();
            self.expect_symbol('{')?;
            let stmts = self.parse_statements()?;
            self.expect_symbol('}')?;
            Some(stmts)
        } else {
            None
        };

        Ok(Statement::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, ToolError> {
        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        let cond = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;
        Ok(Statement::While { cond, body })
    }

    fn parse_do(&mut self) -> Result<Statement, ToolError> {
        self.expect_keyword(Keyword::Do)?;
        let call = self.parse_subroutine_call()?;
        self.expect_symbol(';')?;
        Ok(Statement::Do(call))
    }

    fn parse_return(&mut self) -> Result<Statement, ToolError> {
        self.expect_keyword(Keyword::Return)?;
        let value = if self.at_symbol(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_symbol(';')?;
        Ok(Statement::Return(value))
    }

    /// Parses `ID '(' expList ')'` or `ID '.' ID '(' expList ')'`. The
    /// leading identifier is consumed here, not by the caller.
    fn parse_subroutine_call(&mut self) -> Result<SubroutineCall, ToolError> {
        let first = self.expect_identifier()?;
        if self.at_symbol('.') {
            self.advance();
            let name = self.expect_identifier()?;
            self.expect_symbol('(')?;
            let args = self.parse_expression_list()?;
            self.expect_symbol(')')?;
            Ok(SubroutineCall {
                receiver: Some(first),
                name,
                args,
            })
        } else {
            self.expect_symbol('(')?;
            let args = self.parse_expression_list()?;
            self.expect_symbol(')')?;
            Ok(SubroutineCall {
                receiver: None,
                name: first,
                args,
            })
        }
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, ToolError> {
        let mut args = Vec::new();
        if self.at_symbol(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.at_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }

    fn parse_expression(&mut self) -> Result<Expression, ToolError> {
        let head = self.parse_term()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek_binary_op() {
            self.advance();
            let term = self.parse_term()?;
            rest.push((op, term));
        }
        Ok(Expression { head, rest })
    }

    fn peek_binary_op(&self) -> Option<char> {
        match self.peek() {
            Some(TokenKind::Symbol(c)) if "+-*/&|<>=".contains(*c) => Some(*c),
            _ => None,
        }
    }

    /// Disambiguates an identifier by the token immediately after it: `[`
    /// means array access, `(` or `.` means a subroutine call, anything
    /// else means a plain variable reference.
    fn parse_term(&mut self) -> Result<Term, ToolError> {
        match self.peek().cloned() {
            Some(TokenKind::IntConst(n)) => {
                self.advance();
                Ok(Term::IntConst(n))
            }
            Some(TokenKind::StringConst(s)) => {
                self.advance();
                Ok(Term::StringConst(s))
            }
            Some(TokenKind::Keyword(Keyword::True)) => {
                self.advance();
                Ok(Term::KeywordConst(KeywordConstant::True))
            }
            Some(TokenKind::Keyword(Keyword::False)) => {
                self.advance();
                Ok(Term::KeywordConst(KeywordConstant::False))
            }
            Some(TokenKind::Keyword(Keyword::Null)) => {
                self.advance();
                Ok(Term::KeywordConst(KeywordConstant::Null))
            }
            Some(TokenKind::Keyword(Keyword::This)) => {
                self.advance();
                Ok(Term::KeywordConst(KeywordConstant::This))
            }
            Some(TokenKind::Symbol('(')) => {
                self.advance();
                let e = self.parse_expression()?;
                self.expect_symbol(')')?;
                Ok(Term::Paren(Box::new(e)))
            }
            Some(TokenKind::Symbol(c)) if "-~^#".contains(c) => {
                self.advance();
                let term = self.parse_term()?;
                Ok(Term::Unary(c, Box::new(term)))
            }
            Some(TokenKind::Identifier(_)) => {
                match self.peek_at(1) {
                    Some(TokenKind::Symbol('[')) => {
                        let name = self.expect_identifier()?;
                        self.advance(); // '['
                        let index = self.parse_expression()?;
                        self.expect_symbol(']')?;
                        Ok(Term::ArrayAccess(name, Box::new(index)))
                    }
                    Some(TokenKind::Symbol('(')) | Some(TokenKind::Symbol('.')) => {
                        Ok(Term::Call(self.parse_subroutine_call()?))
                    }
                    _ => Ok(Term::Var(self.expect_identifier()?)),
                }
            }
            _ => Err(self.error("expected a term")),
        }
    }
}
