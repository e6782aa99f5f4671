//! Recursive descent parser creating a [Program] from a token sequence.
//!
//! Expressions are parsed by precedence climbing, one function per precedence level. All binary
//! operators are left associative, including comparisons, so `a < b < c` is `(a < b) < c`.

use fnc_ast::expr::{BinaryOp, Expr, ExprKind};
use fnc_ast::statements::{AssignStmt, DeclareStmt, FunctionDef, IfStmt, Stmt, StmtKind};
use fnc_ast::Program;
use fnc_tokens::spanned::{Span, Spanned};
use fnc_tokens::token::{Keyword, Punct, Token, TokenKind};
use tracing::trace;

pub use error::*;

mod error;

/// Parses a complete token sequence into a [Program].
///
/// Fails on the first unmet expectation, no partial program is returned.
pub fn parse(tokens: Vec<Token>) -> SyntaxResult<Program> {
    SyntacticParser::new(tokens).parse_program()
}

/// Creates the syntax tree from a token sequence.
///
/// # Examples
/// ```
/// # use fnc_parsing::lexer::tokenize;
/// # use fnc_parsing::parser::SyntacticParser;
/// let tokens = tokenize("var x = 1;").unwrap();
/// let program = SyntacticParser::new(tokens).parse_program().unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
#[derive(Debug)]
pub struct SyntacticParser {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
    last_span: Span,
}

impl SyntacticParser {
    /// Creates a new parser over some tokens. A missing trailing [TokenKind::Eof] is implied.
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_span = tokens
            .last()
            .map(|token| {
                let span = token.span();
                // columns count chars, the length is in bytes
                let width = token.lexeme().chars().count();
                Span::new(span.offset() + span.len(), 0, span.line(), span.col() + width)
            })
            .unwrap_or_default();
        Self {
            tokens,
            position: 0,
            eof: Token::new(eof_span, TokenKind::Eof),
            last_span: Span::default(),
        }
    }

    /// `program := statement* EOF`
    pub fn parse_program(&mut self) -> SyntaxResult<Program> {
        let mut statements = vec![];
        while !self.peek().is_eof() {
            statements.push(self.statement()?);
        }
        Ok(Program::new(statements))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.position += 1;
        }
        trace!("consumed {token:?}");
        self.last_span = token.span();
        token
    }

    fn consume_punct(&mut self, punct: Punct) -> Option<Token> {
        match self.peek().kind() {
            TokenKind::Punct(found) if *found == punct => Some(self.advance()),
            _ => None,
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> Option<Token> {
        match self.peek().kind() {
            TokenKind::Keyword(found) if *found == keyword => Some(self.advance()),
            _ => None,
        }
    }

    fn consume_identifier(&mut self) -> Option<(String, Span)> {
        match self.peek().kind() {
            TokenKind::Identifier(id) => {
                let id = id.clone();
                let span = self.advance().span();
                Some((id, span))
            }
            _ => None,
        }
    }

    fn consume_integer(&mut self) -> Option<(i32, Span)> {
        match self.peek().kind() {
            &TokenKind::Integer(value) => {
                let span = self.advance().span();
                Some((value, span))
            }
            _ => None,
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> SyntaxResult<Token> {
        self.consume_punct(punct)
            .ok_or_else(|| self.expected(format!("`{}`", punct.as_str())))
    }

    fn expect_identifier(&mut self) -> SyntaxResult<(String, Span)> {
        self.consume_identifier()
            .ok_or_else(|| self.expected("identifier"))
    }

    fn expected(&self, expected: impl AsRef<str>) -> SyntaxError {
        let found = self.peek().clone();
        let span = found.span();
        SyntaxError::new(ErrorKind::expected_token(expected, found), span)
    }

    /// A span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.join(self.last_span)
    }

    fn statement(&mut self) -> SyntaxResult<Stmt> {
        let start = self.peek().span();
        trace!("parsing statement at {start}");
        if self.consume_keyword(Keyword::Fnc).is_some() {
            return self.function_def(start);
        }
        if self.consume_keyword(Keyword::Return).is_some() {
            let value = self.expr()?;
            self.expect_punct(Punct::SemiColon)?;
            return Ok(Stmt::new(self.span_from(start), StmtKind::Return(value)));
        }
        if self.consume_keyword(Keyword::If).is_some() {
            return self.if_stmt(start);
        }
        if self.consume_keyword(Keyword::For).is_some() {
            let body = self.statement()?;
            return Ok(Stmt::new(
                self.span_from(start),
                StmtKind::For(Box::new(body)),
            ));
        }
        if self.consume_keyword(Keyword::Break).is_some() {
            self.expect_punct(Punct::SemiColon)?;
            return Ok(Stmt::new(self.span_from(start), StmtKind::Break));
        }
        if self.consume_punct(Punct::LCurly).is_some() {
            return self.block(start);
        }
        if self.consume_keyword(Keyword::Var).is_some() {
            let (name, _) = self.expect_identifier()?;
            self.expect_punct(Punct::Assign)?;
            let init = self.expr()?;
            self.expect_punct(Punct::SemiColon)?;
            return Ok(Stmt::new(
                self.span_from(start),
                StmtKind::Declare(DeclareStmt { name, init }),
            ));
        }
        let kind = self.assign()?;
        self.expect_punct(Punct::SemiColon)?;
        Ok(Stmt::new(self.span_from(start), kind))
    }

    /// `"fnc" IDENT "(" [IDENT ("," IDENT)*] ")" statement`, after `fnc`
    fn function_def(&mut self, start: Span) -> SyntaxResult<Stmt> {
        let (name, _) = self.expect_identifier()?;
        trace!("parsing function {name:?}");
        self.expect_punct(Punct::LParen)?;
        let mut params = vec![];
        if self.consume_punct(Punct::RParen).is_none() {
            loop {
                let (param, _) = self.expect_identifier()?;
                params.push(param);
                if self.consume_punct(Punct::Comma).is_none() {
                    break;
                }
            }
            self.expect_punct(Punct::RParen)?;
        }
        let body = self.statement()?;
        Ok(Stmt::new(
            self.span_from(start),
            StmtKind::Function(FunctionDef {
                name,
                params,
                body: Box::new(body),
            }),
        ))
    }

    /// `"if" "(" expr ")" statement ("else" statement)?`, after `if`
    fn if_stmt(&mut self, start: Span) -> SyntaxResult<Stmt> {
        self.expect_punct(Punct::LParen)?;
        let cond = self.expr()?;
        self.expect_punct(Punct::RParen)?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.consume_keyword(Keyword::Else).is_some() {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::new(
            self.span_from(start),
            StmtKind::If(IfStmt {
                cond,
                then_branch,
                else_branch,
            }),
        ))
    }

    /// `"{" statement* "}"`, after `{`
    fn block(&mut self, start: Span) -> SyntaxResult<Stmt> {
        let mut statements = vec![];
        while self.consume_punct(Punct::RCurly).is_none() {
            if self.peek().is_eof() {
                return Err(self.expected("`}`"));
            }
            statements.push(self.statement()?);
        }
        Ok(Stmt::new(self.span_from(start), StmtKind::Block(statements)))
    }

    /// `assign := expr ("=" expr)?`
    fn assign(&mut self) -> SyntaxResult<StmtKind> {
        let target = self.expr()?;
        if self.consume_punct(Punct::Assign).is_none() {
            return Ok(StmtKind::Expr(target));
        }
        let value = self.expr()?;
        let target_span = target.span();
        match target.kind {
            ExprKind::Var(name) => Ok(StmtKind::Assign(AssignStmt {
                target: name,
                target_span,
                value,
            })),
            _ => Err(SyntaxError::new(
                ErrorKind::InvalidAssignmentTarget(target.to_string()),
                target_span,
            )),
        }
    }

    pub fn expr(&mut self) -> SyntaxResult<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> SyntaxResult<Expr> {
        let mut node = self.relational()?;
        loop {
            if self.consume_punct(Punct::Eq).is_some() {
                let rhs = self.relational()?;
                node = Expr::binary(BinaryOp::Eq, node, rhs);
            } else if self.consume_punct(Punct::Neq).is_some() {
                let rhs = self.relational()?;
                node = Expr::binary(BinaryOp::Ne, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    /// `>` and `>=` reuse `<` and `<=` with swapped operands
    fn relational(&mut self) -> SyntaxResult<Expr> {
        let mut node = self.additive()?;
        loop {
            if self.consume_punct(Punct::Lt).is_some() {
                let rhs = self.additive()?;
                node = Expr::binary(BinaryOp::Lt, node, rhs);
            } else if self.consume_punct(Punct::Lte).is_some() {
                let rhs = self.additive()?;
                node = Expr::binary(BinaryOp::Le, node, rhs);
            } else if self.consume_punct(Punct::Gt).is_some() {
                let rhs = self.additive()?;
                node = Expr::binary(BinaryOp::Lt, rhs, node);
            } else if self.consume_punct(Punct::Gte).is_some() {
                let rhs = self.additive()?;
                node = Expr::binary(BinaryOp::Le, rhs, node);
            } else {
                return Ok(node);
            }
        }
    }

    fn additive(&mut self) -> SyntaxResult<Expr> {
        let mut node = self.multiplicative()?;
        loop {
            if self.consume_punct(Punct::Plus).is_some() {
                let rhs = self.multiplicative()?;
                node = Expr::binary(BinaryOp::Add, node, rhs);
            } else if self.consume_punct(Punct::Minus).is_some() {
                let rhs = self.multiplicative()?;
                node = Expr::binary(BinaryOp::Sub, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    fn multiplicative(&mut self) -> SyntaxResult<Expr> {
        let mut node = self.unary()?;
        loop {
            if self.consume_punct(Punct::Star).is_some() {
                let rhs = self.unary()?;
                node = Expr::binary(BinaryOp::Mul, node, rhs);
            } else if self.consume_punct(Punct::Slash).is_some() {
                let rhs = self.unary()?;
                node = Expr::binary(BinaryOp::Div, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    /// `unary := ("+"|"-")? primary`, where `-p` becomes `0 - p`
    fn unary(&mut self) -> SyntaxResult<Expr> {
        if self.consume_punct(Punct::Plus).is_some() {
            return self.primary();
        }
        if let Some(minus) = self.consume_punct(Punct::Minus) {
            let zero = Expr::integer(minus.span(), 0);
            let operand = self.primary()?;
            return Ok(Expr::binary(BinaryOp::Sub, zero, operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> SyntaxResult<Expr> {
        if self.consume_punct(Punct::LParen).is_some() {
            let node = self.expr()?;
            self.expect_punct(Punct::RParen)?;
            return Ok(node);
        }
        if let Some((name, start)) = self.consume_identifier() {
            if self.consume_punct(Punct::LParen).is_none() {
                return Ok(Expr::var(start, name));
            }
            let args = self.call_args()?;
            return Ok(Expr::call(self.span_from(start), name, args));
        }
        if let Some((value, span)) = self.consume_integer() {
            return Ok(Expr::integer(span, value));
        }
        Err(self.expected("expression"))
    }

    /// `[expr ("," expr)*] ")"`, after `(`
    fn call_args(&mut self) -> SyntaxResult<Vec<Expr>> {
        let mut args = vec![];
        if self.consume_punct(Punct::RParen).is_some() {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.consume_punct(Punct::Comma).is_none() {
                break;
            }
        }
        self.expect_punct(Punct::RParen)?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use test_log::test;

    fn parse_str(source: &str) -> SyntaxResult<Program> {
        parse(tokenize(source).expect("could not lex"))
    }

    fn parse_expr(source: &str) -> Expr {
        let mut parser = SyntacticParser::new(tokenize(source).expect("could not lex"));
        let expr = parser.expr().expect("could not parse expression");
        assert!(parser.peek().is_eof(), "trailing tokens after {source:?}");
        expr
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse_expr("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
        assert_eq!(parse_expr("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
        assert_eq!(parse_expr("1 - 2 - 3").to_string(), "((1 - 2) - 3)");
        assert_eq!(parse_expr("8 / 4 / 2").to_string(), "((8 / 4) / 2)");
        assert_eq!(
            parse_expr("a + 1 < b == c").to_string(),
            "(((a + 1) < b) == c)"
        );
    }

    #[test]
    fn test_comparison_chaining() {
        assert_eq!(parse_expr("a < b < c").to_string(), "((a < b) < c)");
        assert_eq!(parse_expr("a == b != c").to_string(), "((a == b) != c)");
    }

    #[test]
    fn test_greater_swaps_operands() {
        assert_eq!(parse_expr("a > b").to_string(), "(b < a)");
        assert_eq!(parse_expr("a >= b").to_string(), "(b <= a)");
        assert_eq!(parse_expr("a > b > c").to_string(), "(c < (b < a))");
    }

    #[test]
    fn test_unary() {
        assert_eq!(parse_expr("-x").to_string(), "(0 - x)");
        assert_eq!(parse_expr("+x").to_string(), "x");
        assert_eq!(parse_expr("2 * -(1 + y)").to_string(), "(2 * (0 - (1 + y)))");
    }

    #[test]
    fn test_call() {
        assert_eq!(parse_expr("f()").to_string(), "f()");
        assert_eq!(
            parse_expr("add(1, g(x), y * 2)").to_string(),
            "add(1, g(x), (y * 2))"
        );
    }

    #[test]
    fn test_function_definition() {
        let program = parse_str("fnc add(a, b) { return a + b; }").unwrap();
        let [stmt] = &program.statements[..] else {
            panic!("expected one statement");
        };
        let StmtKind::Function(def) = &stmt.kind else {
            panic!("expected function, got {stmt:?}");
        };
        assert_eq!(def.name, "add");
        assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(&def.body.kind, StmtKind::Block(body) if body.len() == 1));
    }

    #[test]
    fn test_function_without_params_and_plain_body() {
        let program = parse_str("fnc one() return 1;").unwrap();
        let StmtKind::Function(def) = &program.statements[0].kind else {
            panic!("expected function");
        };
        assert!(def.params.is_empty());
        assert!(matches!(def.body.kind, StmtKind::Return(_)));
    }

    #[test]
    fn test_if_else() {
        let program = parse_str("if (x < 1) y = 1; else { y = 2; }").unwrap();
        let StmtKind::If(if_stmt) = &program.statements[0].kind else {
            panic!("expected if");
        };
        assert_eq!(if_stmt.cond.to_string(), "(x < 1)");
        assert!(matches!(if_stmt.then_branch.kind, StmtKind::Assign(_)));
        assert!(matches!(
            if_stmt.else_branch.as_deref().map(|s| &s.kind),
            Some(StmtKind::Block(_))
        ));
    }

    #[test]
    fn test_dangling_else_binds_innermost() {
        let program = parse_str("if (a) if (b) x = 1; else x = 2;").unwrap();
        let StmtKind::If(outer) = &program.statements[0].kind else {
            panic!("expected if");
        };
        assert!(outer.else_branch.is_none());
        let StmtKind::If(inner) = &outer.then_branch.kind else {
            panic!("expected nested if");
        };
        assert!(inner.else_branch.is_some());
    }

    #[test]
    fn test_for_and_break() {
        let program = parse_str("for { break; }").unwrap();
        let StmtKind::For(body) = &program.statements[0].kind else {
            panic!("expected for");
        };
        let StmtKind::Block(body) = &body.kind else {
            panic!("expected block body");
        };
        assert_eq!(body[0].kind, StmtKind::Break);
    }

    #[test]
    fn test_empty_block() {
        let program = parse_str("{ }").unwrap();
        assert_eq!(program.statements[0].kind, StmtKind::Block(vec![]));
    }

    #[test]
    fn test_declare_and_assign() {
        let program = parse_str("var x = 1; x = x + 1;").unwrap();
        assert!(matches!(
            &program.statements[0].kind,
            StmtKind::Declare(DeclareStmt { name, .. }) if name == "x"
        ));
        assert!(matches!(
            &program.statements[1].kind,
            StmtKind::Assign(AssignStmt { target, .. }) if target == "x"
        ));
    }

    #[test]
    fn test_statement_span() {
        let program = parse_str("var x = 1;\n  x = 2;").unwrap();
        assert_eq!(program.statements[1].span(), Span::new(13, 6, 2, 3));
    }

    #[test]
    fn test_missing_initializer() {
        let err = parse_str("var x = ;").unwrap_err();
        match err.kind {
            ErrorKind::ExpectedToken { expected, found } => {
                assert_eq!(expected, "expression");
                assert_eq!(found.kind(), &TokenKind::Punct(Punct::SemiColon));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.span, Span::new(8, 1, 1, 9));
    }

    #[test]
    fn test_implied_eof_after_non_ascii_identifier() {
        let tokens = vec![Token::new(
            Span::new(2, 7, 1, 3),
            TokenKind::Identifier("größe".to_string()),
        )];
        let err = parse(tokens).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ExpectedToken { ref found, .. } if found.is_eof()));
        assert_eq!(err.span, Span::new(9, 0, 1, 8));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_str("printValue(1)").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::ExpectedToken { ref expected, ref found } if expected == "`;`" && found.is_eof()
        ));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_str("{ var x = 1;").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::ExpectedToken { ref expected, .. } if expected == "`}`"
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse_str("1 + x = 2;").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::InvalidAssignmentTarget("(1 + x)".to_string())
        );
    }

    #[test]
    fn test_chained_assignment_is_rejected() {
        assert!(parse_str("a = b = 1;").is_err());
    }

    #[test]
    fn test_keyword_is_not_an_identifier() {
        let err = parse_str("var if = 1;").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::ExpectedToken { ref expected, .. } if expected == "identifier"
        ));
    }
}
