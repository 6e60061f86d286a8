//! Tokenizer for ChocoPy-style source text.
//!
//! The grammar is indentation-sensitive like Python: blocks are opened
//! and closed by `Indent`/`Dedent` tokens synthesized from the leading
//! whitespace of each logical line. Blank lines and `#`-comments never
//! produce a logical line. Newlines and indentation changes inside an
//! open `(`/`[` are suppressed so a call or list literal can span
//! multiple physical lines.

use crate::cursor::Cursor;
use choco_util::{Span, Symbol};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    StringLiteral(String),
    Identifier(Symbol),
    True,
    False,
    None,

    Def,
    Class,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Return,
    Pass,
    Global,
    Nonlocal,
    And,
    Or,
    Not,
    Is,

    Colon,
    Comma,
    Dot,
    Arrow,
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,

    Plus,
    Minus,
    Star,
    DoubleSlash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,

    Newline,
    Indent,
    Dedent,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line} col {col}")]
    UnexpectedChar { ch: char, line: u32, col: u32 },

    #[error("unterminated string literal starting at line {line} col {col}")]
    UnterminatedString { line: u32, col: u32 },

    #[error("inconsistent indentation at line {line}")]
    InconsistentIndent { line: u32 },
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    indent_stack: Vec<usize>,
    paren_depth: i32,
    at_line_start: bool,
    pending: Vec<Token>,
}

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "def" => TokenKind::Def,
        "class" => TokenKind::Class,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "return" => TokenKind::Return,
        "pass" => TokenKind::Pass,
        "global" => TokenKind::Global,
        "nonlocal" => TokenKind::Nonlocal,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "is" => TokenKind::Is,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        _ => return std::option::Option::None,
    })
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            indent_stack: vec![0],
            paren_depth: 0,
            at_line_start: true,
            pending: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(tok) = self.pending.pop() {
            return Ok(tok);
        }

        if self.at_line_start && self.paren_depth == 0 {
            if let Some(tok) = self.handle_line_start()? {
                return Ok(tok);
            }
        }

        self.skip_intra_line_whitespace_and_comments();

        let line = self.cursor.line();
        let col = self.cursor.column();
        let start = self.cursor.position();

        if self.cursor.is_at_end() {
            return Ok(self.finish_at_eof(line, col));
        }

        let c = self.cursor.current_char();

        if c == '\n' {
            self.cursor.advance();
            self.at_line_start = true;
            if self.paren_depth > 0 {
                return self.next_token();
            }
            return Ok(Token {
                kind: TokenKind::Newline,
                span: Span::new(start, self.cursor.position(), line, col),
            });
        }

        if c.is_ascii_digit() {
            return Ok(self.lex_number(start, line, col));
        }

        if c == '"' {
            return self.lex_string(start, line, col);
        }

        if c.is_alphabetic() || c == '_' {
            return Ok(self.lex_identifier_or_keyword(start, line, col));
        }

        self.lex_operator(start, line, col)
    }

    fn finish_at_eof(&mut self, line: u32, col: u32) -> Token {
        if !self.indent_stack.is_empty() && self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            return Token {
                kind: TokenKind::Dedent,
                span: Span::point(line, col),
            };
        }
        Token {
            kind: TokenKind::Eof,
            span: Span::point(line, col),
        }
    }

    /// Consumes leading whitespace of a fresh logical line and emits the
    /// Indent/Dedent tokens implied by the change in depth. Returns
    /// `None` for blank or comment-only lines, which produce no tokens
    /// of their own and fall through to the next physical line.
    fn handle_line_start(&mut self) -> Result<Option<Token>, LexError> {
        let mut indent = 0usize;
        loop {
            match self.cursor.current_char() {
                ' ' => {
                    indent += 1;
                    self.cursor.advance();
                }
                '\t' => {
                    indent += 8 - (indent % 8);
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        match self.cursor.current_char() {
            '\n' => {
                self.cursor.advance();
                return Ok(None);
            }
            '#' => {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                return Ok(None);
            }
            '\0' if self.cursor.is_at_end() => {
                self.at_line_start = false;
                return Ok(None);
            }
            _ => {}
        }

        self.at_line_start = false;
        let line = self.cursor.line();
        let col = self.cursor.column();
        let current = *self.indent_stack.last().unwrap();

        if indent > current {
            self.indent_stack.push(indent);
            return Ok(Some(Token {
                kind: TokenKind::Indent,
                span: Span::point(line, col),
            }));
        }

        if indent < current {
            let mut dedents = 0;
            while *self.indent_stack.last().unwrap() > indent {
                self.indent_stack.pop();
                dedents += 1;
            }
            if *self.indent_stack.last().unwrap() != indent {
                return Err(LexError::InconsistentIndent { line });
            }
            for _ in 0..dedents - 1 {
                self.pending.push(Token {
                    kind: TokenKind::Dedent,
                    span: Span::point(line, col),
                });
            }
            return Ok(Some(Token {
                kind: TokenKind::Dedent,
                span: Span::point(line, col),
            }));
        }

        Ok(None)
    }

    fn skip_intra_line_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => self.cursor.advance(),
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, start: usize, line: u32, col: u32) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let value: i64 = text.parse().unwrap_or(0);
        Token {
            kind: TokenKind::Integer(value),
            span: Span::new(start, self.cursor.position(), line, col),
        }
    }

    fn lex_string(&mut self, start: usize, line: u32, col: u32) -> Result<Token, LexError> {
        self.cursor.advance();
        let mut value = String::new();
        loop {
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\0' if self.cursor.is_at_end() => {
                    return Err(LexError::UnterminatedString { line, col });
                }
                '\\' => {
                    self.cursor.advance();
                    let escaped = self.cursor.current_char();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '"' => '"',
                        '\\' => '\\',
                        other => other,
                    });
                    self.cursor.advance();
                }
                ch => {
                    value.push(ch);
                    self.cursor.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::StringLiteral(value),
            span: Span::new(start, self.cursor.position(), line, col),
        })
    }

    fn lex_identifier_or_keyword(&mut self, start: usize, line: u32, col: u32) -> Token {
        while self.cursor.current_char().is_alphanumeric() || self.cursor.current_char() == '_' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Identifier(Symbol::intern(text)));
        Token {
            kind,
            span: Span::new(start, self.cursor.position(), line, col),
        }
    }

    fn lex_operator(&mut self, start: usize, line: u32, col: u32) -> Result<Token, LexError> {
        let c = self.cursor.current_char();
        self.cursor.advance();

        let kind = match c {
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '(' => {
                self.paren_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.paren_depth -= 1;
                TokenKind::RParen
            }
            '[' => {
                self.paren_depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.paren_depth -= 1;
                TokenKind::RBracket
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '%' => TokenKind::Percent,
            '/' => {
                if self.cursor.match_char('/') {
                    TokenKind::DoubleSlash
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: c,
                        line,
                        col,
                    });
                }
            }
            '-' => {
                if self.cursor.match_char('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '=' => {
                if self.cursor.match_char('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.cursor.match_char('=') {
                    TokenKind::NotEq
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: c,
                        line,
                        col,
                    });
                }
            }
            '<' => {
                if self.cursor.match_char('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.cursor.match_char('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            other => return Err(LexError::UnexpectedChar { ch: other, line, col }),
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.cursor.position(), line, col),
        })
    }
}
