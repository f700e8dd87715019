//! Character-cursor tokenizer.
//!
//! Unlike a whitespace-pre-split scanner, this reads one character at a
//! time so that symbols immediately adjacent to identifiers (`x+1`,
//! `a[i]`) tokenize correctly without relying on surrounding whitespace.

use std::path::Path;

use n2t_core::{SourceLocation, ToolError};

use crate::token::{Keyword, Token, TokenKind, SYMBOL_CHARS};

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    file: &'a Path,
}

pub fn tokenize(text: &str, file: &Path) -> Result<Vec<Token>, ToolError> {
    let mut lexer = Lexer {
        chars: text.chars().collect(),
        pos: 0,
        line: 0,
        file,
    };
    lexer.run()
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<Vec<Token>, ToolError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let Some(c) = self.peek() else { break };
            let at = self.loc();

            let kind = if c == '"' {
                self.read_string(&at)?
            } else if c.is_ascii_digit() {
                self.read_int()
            } else if is_identifier_start(c) {
                self.read_identifier()
            } else if SYMBOL_CHARS.contains(&c) {
                self.advance();
                TokenKind::Symbol(c)
            } else {
                return Err(ToolError::Lexical {
                    at,
                    message: format!("illegal character '{}'", c),
                });
            };

            tokens.push(Token { kind, at });
        }
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ToolError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let at = self.loc();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => {
                                return Err(ToolError::Lexical {
                                    at,
                                    message: "unterminated block comment".to_string(),
                                });
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn read_string(&mut self, at: &SourceLocation) -> Result<TokenKind, ToolError> {
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(ToolError::Lexical {
                        at: at.clone(),
                        message: "unterminated string literal".to_string(),
                    });
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
        Ok(TokenKind::StringConst(s))
    }

    fn read_int(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            s.push(c);
            self.advance();
        }
        // The numeric-range check belongs downstream, not to the lexer;
        // a run too long for u32 saturates rather than failing here.
        TokenKind::IntConst(s.parse().unwrap_or(u32::MAX))
    }

    fn read_identifier(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_continue(c) {
                break;
            }
            s.push(c);
            self.advance();
        }
        match Keyword::parse(&s) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(s),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.chars.get(self.pos) == Some(&'\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.file.to_path_buf(), self.line)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
