//! Recursive-descent parser from a token stream to a [`Program`].
//!
//! The grammar mirrors ChocoPy: a program is a run of declarations
//! (`class`/`def`/typed variable bindings) followed by a run of
//! statements, and the same declarations-then-statements shape recurs
//! inside every function and class body.

use crate::ast::*;
use crate::lexer::{Lexer, Token, TokenKind};
use choco_util::Span;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found {found:?} at line {line} col {col}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        line: u32,
        col: u32,
    },

    #[error("lexical error: {0}")]
    Lex(#[from] crate::lexer::LexError),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            let span = self.peek_span();
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.peek().clone(),
                line: span.line,
                col: span.column,
            })
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Ident::new(name, span))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: other,
                line: span.line,
                col: span.column,
            }),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();
        self.skip_blank_newlines();

        while self.starts_declaration() {
            program.declarations.push(self.parse_declaration()?);
            self.skip_blank_newlines();
        }

        while !matches!(self.peek(), TokenKind::Eof) {
            program.statements.push(self.parse_stmt()?);
            self.skip_blank_newlines();
        }

        Ok(program)
    }

    fn skip_blank_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn starts_declaration(&self) -> bool {
        match self.peek() {
            TokenKind::Def | TokenKind::Class | TokenKind::Global | TokenKind::Nonlocal => true,
            TokenKind::Identifier(_) => matches!(self.peek_at(1), TokenKind::Colon),
            _ => false,
        }
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        match self.peek() {
            TokenKind::Class => self.parse_class_def().map(Declaration::Class),
            TokenKind::Def => self.parse_func_def().map(Declaration::Func),
            TokenKind::Global => self.parse_global_decl().map(Declaration::Global),
            TokenKind::Nonlocal => self.parse_nonlocal_decl().map(Declaration::NonLocal),
            _ => self.parse_var_def().map(Declaration::Var),
        }
    }

    fn parse_global_decl(&mut self) -> Result<GlobalDecl, ParseError> {
        let start = self.peek_span();
        self.advance();
        let identifier = self.expect_ident()?;
        self.expect(&TokenKind::Newline, "newline")?;
        Ok(GlobalDecl {
            identifier,
            location: start,
            error_msg: None,
        })
    }

    fn parse_nonlocal_decl(&mut self) -> Result<NonLocalDecl, ParseError> {
        let start = self.peek_span();
        self.advance();
        let identifier = self.expect_ident()?;
        self.expect(&TokenKind::Newline, "newline")?;
        Ok(NonLocalDecl {
            identifier,
            location: start,
            error_msg: None,
        })
    }

    fn parse_var_def(&mut self) -> Result<VarDef, ParseError> {
        let typed_var = self.parse_typed_var()?;
        self.expect(&TokenKind::Assign, "'='")?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::Newline, "newline")?;
        let location = typed_var.location;
        Ok(VarDef {
            var: typed_var,
            value,
            location,
            error_msg: None,
        })
    }

    fn parse_typed_var(&mut self) -> Result<TypedVar, ParseError> {
        let identifier = self.expect_ident()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let type_annotation = self.parse_type_annotation()?;
        let location = identifier.location;
        Ok(TypedVar {
            identifier,
            type_annotation,
            location,
        })
    }

    fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, ParseError> {
        if matches!(self.peek(), TokenKind::LBracket) {
            let span = self.peek_span();
            self.advance();
            let inner = self.parse_type_annotation()?;
            self.expect(&TokenKind::RBracket, "']'")?;
            return Ok(TypeAnnotation::List(Box::new(inner), span));
        }
        let identifier = self.expect_ident()?;
        Ok(TypeAnnotation::Class(identifier))
    }

    fn parse_class_def(&mut self) -> Result<ClassDef, ParseError> {
        let start = self.peek_span();
        self.advance();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let superclass = self.expect_ident()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::Colon, "':'")?;
        self.expect(&TokenKind::Newline, "newline")?;
        self.expect(&TokenKind::Indent, "indented block")?;

        let mut declarations = Vec::new();
        while self.starts_declaration() {
            declarations.push(self.parse_declaration()?);
            self.skip_blank_newlines();
        }
        if matches!(self.peek(), TokenKind::Pass) {
            self.advance();
            self.expect(&TokenKind::Newline, "newline")?;
        }
        self.expect(&TokenKind::Dedent, "end of class body")?;

        Ok(ClassDef {
            name,
            superclass,
            declarations,
            location: start,
            error_msg: None,
        })
    }

    fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        let start = self.peek_span();
        self.advance();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            params.push(self.parse_typed_var()?);
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                params.push(self.parse_typed_var()?);
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;

        let return_type = if matches!(self.peek(), TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type_annotation()?)
        } else {
            std::option::Option::None
        };

        self.expect(&TokenKind::Colon, "':'")?;
        self.expect(&TokenKind::Newline, "newline")?;
        self.expect(&TokenKind::Indent, "indented block")?;

        let mut declarations = Vec::new();
        while self.starts_declaration() {
            declarations.push(self.parse_declaration()?);
            self.skip_blank_newlines();
        }

        let mut statements = Vec::new();
        while !matches!(self.peek(), TokenKind::Dedent) {
            statements.push(self.parse_stmt()?);
            self.skip_blank_newlines();
        }
        self.expect(&TokenKind::Dedent, "end of function body")?;

        Ok(FuncDef {
            name,
            params,
            return_type,
            declarations,
            statements,
            location: start,
            error_msg: None,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::Colon, "':'")?;
        self.expect(&TokenKind::Newline, "newline")?;
        self.expect(&TokenKind::Indent, "indented block")?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::Dedent) {
            stmts.push(self.parse_stmt()?);
            self.skip_blank_newlines();
        }
        self.expect(&TokenKind::Dedent, "end of block")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.peek_span();
        match self.peek() {
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => {
                self.advance();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::new(StmtKind::While { cond, body }, start))
            }
            TokenKind::For => {
                self.advance();
                let identifier = self.expect_ident()?;
                self.expect(&TokenKind::In, "'in'")?;
                let iterable = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::new(
                    StmtKind::For {
                        identifier,
                        iterable,
                        body,
                    },
                    start,
                ))
            }
            TokenKind::Pass => {
                self.advance();
                self.expect(&TokenKind::Newline, "newline")?;
                Ok(Stmt::new(StmtKind::Pass, start))
            }
            TokenKind::Return => {
                self.advance();
                let value = if matches!(self.peek(), TokenKind::Newline) {
                    std::option::Option::None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Newline, "newline")?;
                Ok(Stmt::new(StmtKind::Return(value), start))
            }
            _ => self.parse_expr_or_assign_stmt(start),
        }
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.peek_span();
        self.advance();
        let cond = self.parse_expr()?;
        let then_body = self.parse_block()?;

        let else_body = match self.peek() {
            TokenKind::Elif => {
                // Desugar `elif` into a single-statement else-branch
                // holding a nested `If`, the same shape `IfStmt`
                // definite-return analysis (§4.4) expects.
                vec![self.parse_if_stmt()?]
            }
            TokenKind::Else => {
                self.advance();
                self.parse_block()?
            }
            _ => Vec::new(),
        };

        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
            start,
        ))
    }

    fn parse_expr_or_assign_stmt(&mut self, start: Span) -> Result<Stmt, ParseError> {
        let first = self.parse_expr()?;
        if matches!(self.peek(), TokenKind::Assign) {
            let mut targets = vec![first];
            let mut value;
            loop {
                self.advance();
                let next = self.parse_expr()?;
                if matches!(self.peek(), TokenKind::Assign) {
                    targets.push(next);
                    continue;
                }
                value = next;
                break;
            }
            self.expect(&TokenKind::Newline, "newline")?;
            return Ok(Stmt::new(StmtKind::Assign { targets, value }, start));
        }
        self.expect(&TokenKind::Newline, "newline")?;
        Ok(Stmt::new(StmtKind::Expr(first), start))
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_or_expr()?;
        if matches!(self.peek(), TokenKind::If) {
            let start = value.location;
            self.advance();
            let cond = self.parse_or_expr()?;
            self.expect(&TokenKind::Else, "'else'")?;
            let else_branch = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(value),
                    else_branch: Box::new(else_branch),
                },
                start,
            ));
        }
        Ok(value)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_expr()?;
        while matches!(self.peek(), TokenKind::Or) {
            let start = left.location;
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not_expr()?;
        while matches!(self.peek(), TokenKind::And) {
            let start = left.location;
            self.advance();
            let right = self.parse_not_expr()?;
            left = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), TokenKind::Not) {
            let start = self.peek_span();
            self.advance();
            let operand = self.parse_not_expr()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                start,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_arith()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Is => BinaryOp::Is,
                _ => break,
            };
            let start = left.location;
            self.advance();
            let right = self.parse_arith()?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let start = left.location;
            self.advance();
            let right = self.parse_term()?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::DoubleSlash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let start = left.location;
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), TokenKind::Minus) {
            let start = self.peek_span();
            self.advance();
            let operand = self.parse_factor()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                start,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident()?;
                    if matches!(self.peek(), TokenKind::LParen) {
                        self.advance();
                        let args = self.parse_args()?;
                        self.expect(&TokenKind::RParen, "')'")?;
                        let start = expr.location;
                        expr = Expr::new(
                            ExprKind::MethodCall {
                                object: Box::new(expr),
                                method: member,
                                args,
                            },
                            start,
                        );
                    } else {
                        let start = expr.location;
                        expr = Expr::new(
                            ExprKind::Member {
                                object: Box::new(expr),
                                member,
                            },
                            start,
                        );
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    let start = expr.location;
                    expr = Expr::new(
                        ExprKind::Index {
                            list: Box::new(expr),
                            index: Box::new(index),
                        },
                        start,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        match self.peek().clone() {
            TokenKind::Integer(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::IntegerLiteral(v), start))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLiteral(s), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::BooleanLiteral(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::BooleanLiteral(false), start))
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::new(ExprKind::NoneLiteral, start))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !matches!(self.peek(), TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    while matches!(self.peek(), TokenKind::Comma) {
                        self.advance();
                        elements.push(self.parse_expr()?);
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(Expr::new(ExprKind::List(elements), start))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if matches!(self.peek(), TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    return Ok(Expr::new(
                        ExprKind::Call {
                            func: Ident::new(name, start),
                            args,
                        },
                        start,
                    ));
                }
                Ok(Expr::new(ExprKind::Identifier(name), start))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: other,
                line: start.line,
                col: start.column,
            }),
        }
    }
}
