//! Recursive-descent parser with an operator-precedence core for expressions.
//!
//! Expressions are parsed by locating, at each level of recursion, the
//! single loosest-binding operator among the tokens at the current
//! nesting level and splitting there — not by a Pratt loop. This mirrors
//! how the source language's reference implementation resolves precedence:
//! a flat ordinal table from tightest to loosest, where ties between two
//! occurrences of the same operator favor the leftmost (giving `a+b+c` the
//! grouping `a+(b+c)`).

use std::collections::VecDeque;

use td12_lex::{Token, TokenKind};
use td12_util::{Diagnostic, ErrorCategory, Span, Symbol};

use crate::ast::*;

type PResult<T> = Result<T, Diagnostic>;

fn err(kind: &'static str, message: impl Into<String>, span: Span) -> Diagnostic {
    Diagnostic::new(ErrorCategory::Syntax, kind, message, span)
}

fn eof_err(kind: &'static str, message: impl Into<String>, span: Span) -> Diagnostic {
    err(kind, message, span)
}

/// A mutable queue of tokens, popped from the front — the Rust analogue of
/// the reference parser's `list.pop(0)` style.
struct TokenList {
    tokens: VecDeque<Token>,
}

impl TokenList {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens: tokens.into() }
    }

    fn pop(&mut self, eof_span: &Span) -> PResult<Token> {
        self.tokens.pop_front().ok_or_else(|| {
            eof_err(
                "UnexpectedEndOfTokenStream",
                "unexpected end of token stream",
                eof_span.clone(),
            )
        })
    }

    fn front(&self) -> Option<&Token> {
        self.tokens.front()
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn into_vec(self) -> Vec<Token> {
        self.tokens.into()
    }
}

fn expect_identifier(tok: &Token) -> PResult<()> {
    if tok.kind == TokenKind::Identifier {
        Ok(())
    } else {
        Err(err(
            "ExpectedIdentifier",
            format!("expected an identifier but found '{}'", tok.lexeme),
            tok.span.clone(),
        ))
    }
}

fn expect_keyword(tok: &Token, word: &str) -> PResult<()> {
    if tok.is_keyword(word) {
        Ok(())
    } else {
        Err(err(
            "ExpectedKeyword",
            format!("expected '{word}' but found '{}'", tok.lexeme),
            tok.span.clone(),
        ))
    }
}

fn expect_punct(tok: &Token, p: &str) -> PResult<()> {
    if tok.is_punct(p) {
        Ok(())
    } else {
        Err(err(
            "ExpectedPunctuation",
            format!("expected '{p}' but found '{}'", tok.lexeme),
            tok.span.clone(),
        ))
    }
}

fn expect_punct_one_of(tok: &Token, options: &[&str]) -> PResult<()> {
    if tok.kind == TokenKind::Punctuation && options.contains(&tok.lexeme.as_str()) {
        Ok(())
    } else {
        Err(err(
            "UnexpectedToken",
            format!(
                "expected one of {:?} but found '{}'",
                options, tok.lexeme
            ),
            tok.span.clone(),
        ))
    }
}

fn expect_literal(tok: &Token) -> PResult<()> {
    match tok.kind {
        TokenKind::NumberLiteral | TokenKind::CharLiteral | TokenKind::StringLiteral => Ok(()),
        _ => Err(err(
            "ExpectedLiteral",
            format!("expected a literal but found '{}'", tok.lexeme),
            tok.span.clone(),
        )),
    }
}

fn literal_to_expr(tok: &Token) -> Expr {
    match tok.kind {
        TokenKind::NumberLiteral => Expr::NumberLiteral {
            text: tok.lexeme.clone(),
            span: tok.span.clone(),
        },
        TokenKind::CharLiteral => Expr::CharLiteral {
            text: tok.lexeme.clone(),
            span: tok.span.clone(),
        },
        TokenKind::StringLiteral => Expr::StringLiteral {
            text: tok.lexeme.clone(),
            span: tok.span.clone(),
        },
        _ => unreachable!("expect_literal must be called first"),
    }
}

/// Pops an opening delimiter, scans (honoring nesting) for its matching
/// closer, and returns `(open, inner_tokens, close)`.
fn get_nested_group(
    tokens: &mut TokenList,
    encloses: (&str, &str),
    eof_span: &Span,
) -> PResult<(Token, Vec<Token>, Token)> {
    let open = tokens.pop(eof_span)?;
    expect_punct(&open, encloses.0)?;
    let mut depth = 0usize;
    let mut inner = Vec::new();
    loop {
        let tok = tokens.pop(&open.span)?;
        if tok.is_punct(encloses.0) {
            depth += 1;
            inner.push(tok);
        } else if tok.is_punct(encloses.1) {
            if depth == 0 {
                return Ok((open, inner, tok));
            }
            depth -= 1;
            inner.push(tok);
        } else {
            inner.push(tok);
        }
    }
}

/// Consumes tokens (honoring `(`/`)` nesting) up to and including the first
/// top-level punctuation token whose lexeme is in `symbols`.
fn get_to_symbol(
    tokens: &mut TokenList,
    symbols: &[&str],
    eof_span: &Span,
) -> PResult<(Vec<Token>, Token)> {
    let mut depth = 0i32;
    let mut out = Vec::new();
    loop {
        let tok = tokens.pop(eof_span)?;
        if tok.is_punct("(") {
            depth += 1;
            out.push(tok);
        } else if tok.is_punct(")") && depth > 0 {
            depth -= 1;
            out.push(tok);
        } else if depth == 0 && tok.kind == TokenKind::Punctuation && symbols.contains(&tok.lexeme.as_str()) {
            return Ok((out, tok));
        } else {
            out.push(tok);
        }
    }
}

fn data_type_sa(tokens: &mut TokenList, eof_span: &Span) -> PResult<(bool, DataType)> {
    let pointer = if tokens.front().map(|t| t.is_punct("@")).unwrap_or(false) {
        tokens.pop(eof_span)?;
        true
    } else {
        false
    };
    let tok = tokens.pop(eof_span)?;
    if tok.kind == TokenKind::Keyword {
        let builtin = match tok.lexeme.as_str() {
            "unsigned" => BuiltInType::Unsigned,
            "int" => BuiltInType::Int,
            "fixed" => BuiltInType::Fixed,
            "float" => BuiltInType::Float,
            _ => {
                return Err(err(
                    "UnexpectedKeyword",
                    format!("'{}' is not a data type", tok.lexeme),
                    tok.span.clone(),
                ))
            }
        };
        Ok((pointer, DataType::BuiltIn(builtin)))
    } else {
        expect_identifier(&tok)?;
        Ok((pointer, DataType::Named(Symbol::intern(&tok.lexeme), tok.span)))
    }
}

fn optional_literal_default(tokens: &mut TokenList, eof_span: &Span) -> PResult<(Option<Expr>, Token)> {
    let sep = tokens.pop(eof_span)?;
    expect_punct_one_of(&sep, &[",", "=", ")", "}"])?;
    if sep.is_punct("=") {
        let lit = tokens.pop(eof_span)?;
        expect_literal(&lit)?;
        let expr = literal_to_expr(&lit);
        let end = tokens.pop(eof_span)?;
        Ok((Some(expr), end))
    } else {
        Ok((None, sep))
    }
}

// ---------------------------------------------------------------------
// Expression precedence table
// ---------------------------------------------------------------------

/// Returns the operator's position in the flat tightest(0) -> loosest(40)
/// ordinal table. Where a lexeme is shared by more than one operator (e.g.
/// `--` as both prefix and postfix, `-` as both negate and subtraction),
/// the higher (looser) rank wins, matching how the reference parser's
/// reversed table scan always meets the higher-index entry first.
fn operator_rank(value: &str) -> Option<i32> {
    Some(match value {
        "@" => 0,
        "$" => 1,
        "~" => 2,
        "++" => 6,
        "--" => 5,
        "!" => 8,
        "." => 9,
        "-" => 18,
        ">>" => 10,
        "<<" => 11,
        "^" => 12,
        "|" => 13,
        "&" => 14,
        "%" => 15,
        "/" => 16,
        "*" => 17,
        "+" => 19,
        ">=" => 20,
        ">" => 21,
        "<=" => 22,
        "<" => 23,
        "!=" => 24,
        "==" => 25,
        "^^" => 26,
        "||" => 27,
        "&&" => 28,
        "?" => 29,
        ">>=" => 30,
        "<<=" => 31,
        "^=" => 32,
        "|=" => 33,
        "&=" => 34,
        "%=" => 35,
        "/=" => 36,
        "*=" => 37,
        "-=" => 38,
        "+=" => 39,
        "=" => 40,
        _ => return None,
    })
}

fn prefix_op(value: &str) -> Option<UnaryOp> {
    Some(match value {
        "@" => UnaryOp::AddressOf,
        "$" => UnaryOp::Dereference,
        "~" => UnaryOp::BitwiseNot,
        "++" => UnaryOp::PreIncrement,
        "--" => UnaryOp::PreDecrement,
        "-" => UnaryOp::Negate,
        "!" => UnaryOp::BooleanNot,
        _ => return None,
    })
}

fn postfix_op(value: &str) -> Option<UnaryOp> {
    Some(match value {
        "++" => UnaryOp::PostIncrement,
        "--" => UnaryOp::PostDecrement,
        _ => return None,
    })
}

fn binary_op(value: &str) -> Option<BinaryOp> {
    Some(match value {
        "+" => BinaryOp::Addition,
        "-" => BinaryOp::Subtraction,
        "*" => BinaryOp::Multiplication,
        "/" => BinaryOp::Division,
        "%" => BinaryOp::Modulus,
        "&" => BinaryOp::BitwiseAnd,
        "|" => BinaryOp::BitwiseOr,
        "^" => BinaryOp::BitwiseXor,
        "<<" => BinaryOp::LeftShift,
        ">>" => BinaryOp::RightShift,
        "." => BinaryOp::MemberOf,
        "=" => BinaryOp::Assignment,
        "+=" => BinaryOp::AdditionAssignment,
        "-=" => BinaryOp::SubtractionAssignment,
        "*=" => BinaryOp::MultiplicationAssignment,
        "/=" => BinaryOp::DivisionAssignment,
        "%=" => BinaryOp::ModulusAssignment,
        "&=" => BinaryOp::BitwiseAndAssignment,
        "|=" => BinaryOp::BitwiseOrAssignment,
        "^=" => BinaryOp::BitwiseXorAssignment,
        "<<=" => BinaryOp::LeftShiftAssignment,
        ">>=" => BinaryOp::RightShiftAssignment,
        "&&" => BinaryOp::BooleanAnd,
        "||" => BinaryOp::BooleanOr,
        "^^" => BinaryOp::BooleanXor,
        "==" => BinaryOp::Equal,
        "!=" => BinaryOp::NotEqual,
        "<" => BinaryOp::LessThan,
        "<=" => BinaryOp::LessOrEqual,
        ">" => BinaryOp::GreaterThan,
        ">=" => BinaryOp::GreaterOrEqual,
        _ => return None,
    })
}

fn builtin_const(value: &str) -> Option<BuiltInConst> {
    Some(match value {
        "True" => BuiltInConst::True,
        "False" => BuiltInConst::False,
        "None" => BuiltInConst::None,
        _ => return None,
    })
}

/// Parses a fully-bounded expression out of an owned token slice (no
/// trailing tokens left over — the caller is responsible for slicing out
/// exactly the tokens that belong to the expression).
pub fn expression_sa(tokens: &[Token]) -> PResult<Expr> {
    if tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected an expression",
            Span::new("<expr>", 0, 0, 0),
        ));
    }
    if tokens.len() == 1 {
        let tok = &tokens[0];
        if let Some(c) = builtin_const(&tok.lexeme) {
            if tok.kind == TokenKind::Keyword {
                return Ok(Expr::BuiltInConst { value: c, span: tok.span.clone() });
            }
        }
        if tok.kind == TokenKind::Identifier {
            return Ok(Expr::Identifier {
                name: Symbol::intern(&tok.lexeme),
                span: tok.span.clone(),
            });
        }
        expect_literal(tok)?;
        return Ok(literal_to_expr(tok));
    }
    if tokens[0].is_punct("(") && tokens[tokens.len() - 1].is_punct(")") {
        let inner = &tokens[1..tokens.len() - 1];
        if inner.is_empty() {
            let span = tokens[0].span.union(&tokens[tokens.len() - 1].span);
            return Err(err(
                "UnexpectedEndOfTokenStream",
                "expected an expression between '(' and ')'",
                span,
            ));
        }
        return expression_sa(inner);
    }

    let mut max_operator: Option<usize> = None;
    let mut max_rank = -1i32;
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.is_punct("(") {
            depth += 1;
        } else if tok.is_punct(")") {
            if depth == 0 {
                return Err(err(
                    "UnexpectedPunctuation",
                    "unmatched closing parenthesis",
                    tok.span.clone(),
                ));
            }
            depth -= 1;
        } else if depth == 0 && tok.kind == TokenKind::Punctuation {
            if let Some(rank) = operator_rank(&tok.lexeme) {
                if rank > max_rank {
                    max_rank = rank;
                    max_operator = Some(i);
                }
            }
        }
    }

    let Some(idx) = max_operator else {
        return parse_call(tokens);
    };

    let op_tok = &tokens[idx];
    if idx == tokens.len() - 1 {
        if let Some(op) = postfix_op(&op_tok.lexeme) {
            if tokens[..idx].is_empty() {
                return Err(err(
                    "UnexpectedEndOfTokenStream",
                    format!("expected an expression before '{}'", op_tok.lexeme),
                    op_tok.span.clone(),
                ));
            }
            let operand = expression_sa(&tokens[..idx])?;
            let span = operand.span().union(&op_tok.span);
            return Ok(Expr::Unary { op, operand: Box::new(operand), span });
        }
    }
    if idx == 0 {
        if let Some(op) = prefix_op(&op_tok.lexeme) {
            if tokens[idx + 1..].is_empty() {
                return Err(err(
                    "UnexpectedEndOfTokenStream",
                    format!("expected an expression after '{}'", op_tok.lexeme),
                    op_tok.span.clone(),
                ));
            }
            let operand = expression_sa(&tokens[idx + 1..])?;
            let span = op_tok.span.union(operand.span());
            return Ok(Expr::Unary { op, operand: Box::new(operand), span });
        }
    }
    if let Some(op) = binary_op(&op_tok.lexeme) {
        if tokens[..idx].is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                format!("expected an expression before '{}'", op_tok.lexeme),
                op_tok.span.clone(),
            ));
        }
        if tokens[idx + 1..].is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                format!("expected an expression after '{}'", op_tok.lexeme),
                op_tok.span.clone(),
            ));
        }
        let lhs = expression_sa(&tokens[..idx])?;
        let rhs = expression_sa(&tokens[idx + 1..])?;
        let span = lhs.span().union(rhs.span());
        return Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span });
    }
    if op_tok.lexeme == "?" {
        if tokens[..idx].is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                "expected a condition before '?'",
                op_tok.span.clone(),
            ));
        }
        let condition = expression_sa(&tokens[..idx])?;
        let rest = &tokens[idx..];
        let mut rest_list = TokenList::new(rest.to_vec());
        let (_q, true_tokens, _colon) =
            get_nested_group(&mut rest_list, ("?", ":"), &op_tok.span)?;
        if true_tokens.is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                "expected an expression between '?' and ':'",
                op_tok.span.clone(),
            ));
        }
        let if_true = expression_sa(&true_tokens)?;
        let remaining = rest_list.into_vec();
        if remaining.is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                "expected an expression after ':'",
                op_tok.span.clone(),
            ));
        }
        let if_false = expression_sa(&remaining)?;
        let span = condition.span().union(if_false.span());
        return Ok(Expr::Ternary {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            span,
        });
    }

    Err(err(
        "UnexpectedToken",
        format!("'{}' cannot appear here", op_tok.lexeme),
        op_tok.span.clone(),
    ))
}

fn parse_call(tokens: &[Token]) -> PResult<Expr> {
    let first = &tokens[0];
    expect_identifier(first)?;
    let callee = Symbol::intern(&first.lexeme);
    let mut list = TokenList::new(tokens[1..].to_vec());
    let open = list.pop(&first.span)?;
    expect_punct(&open, "(")?;
    let mut args = Vec::new();
    let mut last_span = open.span.clone();
    while !list.is_empty() {
        let (arg_tokens, last_tok) = get_to_symbol(&mut list, &[",", ")"], &open.span)?;
        last_span = last_tok.span.clone();
        if !arg_tokens.is_empty() {
            let (name, value_tokens) = if arg_tokens.len() > 1 && arg_tokens[1].is_punct("=") {
                expect_identifier(&arg_tokens[0])?;
                (Some((Symbol::intern(&arg_tokens[0].lexeme), arg_tokens[0].span.clone())), &arg_tokens[2..])
            } else {
                (None, &arg_tokens[..])
            };
            if value_tokens.is_empty() {
                return Err(err(
                    "UnexpectedEndOfTokenStream",
                    "expected an expression",
                    last_tok.span.clone(),
                ));
            }
            let value = expression_sa(value_tokens)?;
            let span = match &name {
                Some((_, ns)) => ns.union(value.span()),
                None => value.span().clone(),
            };
            args.push(FunctionArgument { name: name.map(|(n, _)| n), value, span });
        }
    }
    let span = first.span.union(&last_span);
    Ok(Expr::Call { callee, callee_span: first.span.clone(), args, span })
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn else_block_sa(tokens: &mut TokenList) -> PResult<Option<ElseBlock>> {
    let is_else = tokens.front().map(|t| t.is_keyword("else")).unwrap_or(false);
    if !is_else {
        return Ok(None);
    }
    let else_tok = tokens.pop(&Span::new("<else>", 0, 0, 0))?;
    if tokens.front().map(|t| t.is_punct("{")).unwrap_or(false) {
        let (_open, inner, close) = get_nested_group(tokens, ("{", "}"), &else_tok.span)?;
        let span = else_tok.span.union(&close.span);
        Ok(Some(ElseBlock { code: code_block_sa(inner)?, span }))
    } else {
        let stmt = statement_sa(tokens, &else_tok.span)?;
        let span = else_tok.span.union(stmt.span());
        Ok(Some(ElseBlock { code: vec![stmt], span }))
    }
}

fn body_sa(tokens: &mut TokenList, eof_span: &Span) -> PResult<Vec<Stmt>> {
    if tokens.front().map(|t| t.is_punct("{")).unwrap_or(false) {
        let (_o, inner, _c) = get_nested_group(tokens, ("{", "}"), eof_span)?;
        code_block_sa(inner)
    } else {
        Ok(vec![statement_sa(tokens, eof_span)?])
    }
}

fn if_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<IfBlock> {
    let (_o, cond_tokens, close) = get_nested_group(tokens, ("(", ")"), &stoken.span)?;
    if cond_tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected a condition expression",
            close.span,
        ));
    }
    let condition = expression_sa(&cond_tokens)?;
    let code = body_sa(tokens, &close.span)?;
    let else_block = else_block_sa(tokens)?;
    let span = match &else_block {
        Some(e) => stoken.span.union(&e.span),
        None => stoken.span.union(code.last().map(|s| s.span()).unwrap_or(&close.span)),
    };
    Ok(IfBlock { condition, code, else_block, span })
}

fn while_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<WhileBlock> {
    let (_o, cond_tokens, close) = get_nested_group(tokens, ("(", ")"), &stoken.span)?;
    if cond_tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected a condition expression",
            close.span,
        ));
    }
    let condition = expression_sa(&cond_tokens)?;
    let code = body_sa(tokens, &close.span)?;
    let else_block = else_block_sa(tokens)?;
    let span = match &else_block {
        Some(e) => stoken.span.union(&e.span),
        None => stoken.span.union(code.last().map(|s| s.span()).unwrap_or(&close.span)),
    };
    Ok(WhileBlock { condition, code, else_block, span })
}

fn do_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<DoBlock> {
    let first_code = body_sa(tokens, &stoken.span)?;
    let while_tok = tokens.pop(&stoken.span)?;
    expect_keyword(&while_tok, "while")?;
    let (_o, cond_tokens, close) = get_nested_group(tokens, ("(", ")"), &while_tok.span)?;
    if cond_tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected a condition expression",
            close.span,
        ));
    }
    let condition = expression_sa(&cond_tokens)?;
    let mut last_span = close.span.clone();
    let second_code = if tokens.front().map(|t| t.is_punct("{")).unwrap_or(false) {
        let (_o, inner, c) = get_nested_group(tokens, ("{", "}"), &close.span)?;
        last_span = c.span;
        Some(code_block_sa(inner)?)
    } else if !tokens.front().map(|t| t.is_keyword("else")).unwrap_or(false) {
        let stmt = statement_sa(tokens, &close.span)?;
        last_span = stmt.span().clone();
        if matches!(stmt, Stmt::Expr(Expr::NoOp { .. })) {
            None
        } else {
            Some(vec![stmt])
        }
    } else {
        None
    };
    let else_block = else_block_sa(tokens)?;
    let span = match &else_block {
        Some(e) => stoken.span.union(&e.span),
        None => stoken.span.union(&last_span),
    };
    Ok(DoBlock { first_code, condition, second_code, else_block, span })
}

fn for_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<ForBlock> {
    let (_o, three, close) = get_nested_group(tokens, ("(", ")"), &stoken.span)?;
    let mut three_list = TokenList::new(three);
    let (pre_tokens, semi1) = get_to_symbol(&mut three_list, &[";"], &close.span)?;
    let pre_statement = if pre_tokens.len() >= 2
        && pre_tokens[0].kind == TokenKind::Identifier
        && pre_tokens[1].is_punct(":")
    {
        let mut pre_list = TokenList::new(pre_tokens);
        let id_tok = pre_list.pop(&semi1.span)?;
        let colon = pre_list.pop(&semi1.span)?;
        expect_punct(&colon, ":")?;
        let (_ptr, data_type) = data_type_sa(&mut pre_list, &semi1.span)?;
        let pointer = _ptr;
        let remaining = pre_list.into_vec();
        let (assignment, span) = if remaining.is_empty() {
            (None, id_tok.span.clone())
        } else {
            let eq = &remaining[0];
            if !eq.is_punct("=") {
                return Err(err(
                    "ExpectedPunctuation",
                    "expected '=' in for-loop pre-definition",
                    eq.span.clone(),
                ));
            }
            if remaining[1..].is_empty() {
                return Err(err(
                    "UnexpectedEndOfTokenStream",
                    "expected an expression",
                    semi1.span.clone(),
                ));
            }
            let expr = expression_sa(&remaining[1..])?;
            let span = id_tok.span.union(expr.span());
            (Some(expr), span)
        };
        ForPreStatement::Decl {
            identifier: Symbol::intern(&id_tok.lexeme),
            identifier_span: id_tok.span.clone(),
            data_type,
            pointer,
            assignment,
            span,
        }
    } else {
        if pre_tokens.is_empty() {
            return Err(err(
                "UnexpectedEndOfTokenStream",
                "expected an expression",
                semi1.span.clone(),
            ));
        }
        ForPreStatement::Expr(expression_sa(&pre_tokens)?)
    };
    let (cond_tokens, semi2) = get_to_symbol(&mut three_list, &[";"], &semi1.span)?;
    if cond_tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected a condition expression",
            semi2.span.clone(),
        ));
    }
    let condition = expression_sa(&cond_tokens)?;
    let post_tokens = three_list.into_vec();
    if post_tokens.is_empty() {
        return Err(err(
            "UnexpectedEndOfTokenStream",
            "expected a post-loop expression",
            close.span.clone(),
        ));
    }
    let post_statement = expression_sa(&post_tokens)?;
    let code = body_sa(tokens, &close.span)?;
    let else_block = else_block_sa(tokens)?;
    let span = match &else_block {
        Some(e) => stoken.span.union(&e.span),
        None => stoken.span.union(code.last().map(|s| s.span()).unwrap_or(&close.span)),
    };
    Ok(ForBlock { pre_statement, condition, code, post_statement, else_block, span })
}

fn let_statement_sa(tokens: &mut TokenList, first: &Token) -> PResult<LetStatement> {
    let is_static = first.is_keyword("static");
    let let_tok = if is_static {
        let t = tokens.pop(&first.span)?;
        expect_keyword(&t, "let")?;
        t
    } else {
        first.clone()
    };
    let id_tok = tokens.pop(&let_tok.span)?;
    expect_identifier(&id_tok)?;
    let colon = tokens.pop(&id_tok.span)?;
    expect_punct(&colon, ":")?;
    let (pointer, data_type) = data_type_sa(tokens, &colon.span)?;
    let sep = tokens.pop(&colon.span)?;
    expect_punct_one_of(&sep, &["=", ";"])?;
    let (assignment, end_span) = if sep.is_punct("=") {
        let lit = tokens.pop(&sep.span)?;
        expect_literal(&lit)?;
        let expr = literal_to_expr(&lit);
        let semi = tokens.pop(&lit.span)?;
        expect_punct(&semi, ";")?;
        (Some(expr), semi.span)
    } else {
        (None, sep.span)
    };
    let span = first.span.union(&end_span);
    Ok(LetStatement {
        identifier: Symbol::intern(&id_tok.lexeme),
        identifier_span: id_tok.span,
        data_type,
        pointer,
        is_static,
        assignment,
        span,
    })
}

pub fn statement_sa(tokens: &mut TokenList, eof_span: &Span) -> PResult<Stmt> {
    let tok = tokens.pop(eof_span)?;
    if tok.kind == TokenKind::Keyword {
        return match tok.lexeme.as_str() {
            "let" | "static" => Ok(Stmt::Let(let_statement_sa(tokens, &tok)?)),
            "break" | "continue" => {
                let semi = tokens.pop(&tok.span)?;
                expect_punct(&semi, ";")?;
                let kw = if tok.lexeme == "break" { LoopKeyword::Break } else { LoopKeyword::Continue };
                Ok(Stmt::Loop(kw, tok.span.union(&semi.span)))
            }
            "if" => Ok(Stmt::If(if_block_sa(tokens, &tok)?)),
            "do" => Ok(Stmt::Do(do_block_sa(tokens, &tok)?)),
            "while" => Ok(Stmt::While(while_block_sa(tokens, &tok)?)),
            "for" => Ok(Stmt::For(for_block_sa(tokens, &tok)?)),
            "True" | "False" | "None" => {
                let (rest, semi) = get_to_symbol(tokens, &[";"], &tok.span)?;
                let mut expr_tokens = vec![tok];
                expr_tokens.extend(rest);
                let expr = expression_sa(&expr_tokens)?;
                let _ = semi;
                Ok(Stmt::Expr(expr))
            }
            _ => Err(err(
                "UnexpectedKeyword",
                format!("'{}' cannot start a statement", tok.lexeme),
                tok.span,
            )),
        };
    }
    if tok.is_punct(";") {
        return Ok(Stmt::Expr(Expr::NoOp { span: tok.span }));
    }
    let (rest, _semi) = get_to_symbol(tokens, &[";"], &tok.span)?;
    let mut expr_tokens = vec![tok];
    expr_tokens.extend(rest);
    Ok(Stmt::Expr(expression_sa(&expr_tokens)?))
}

fn code_block_sa(tokens: Vec<Token>) -> PResult<Vec<Stmt>> {
    let mut list = TokenList::new(tokens);
    let mut out = Vec::new();
    let tail = Span::new("<block>", 0, 0, 0);
    while !list.is_empty() {
        out.push(statement_sa(&mut list, &tail)?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------
// Top-level items
// ---------------------------------------------------------------------

fn struct_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<StructBlock> {
    let id_tok = tokens.pop(&stoken.span)?;
    expect_identifier(&id_tok)?;
    let open = tokens.pop(&id_tok.span)?;
    expect_punct(&open, "{")?;
    let mut members = Vec::new();
    let mut last = open.clone();
    loop {
        if tokens.front().map(|t| t.is_punct("}")).unwrap_or(false) {
            last = tokens.pop(&open.span)?;
            break;
        }
        let mut tok = tokens.pop(&open.span)?;
        let is_static = tok.is_keyword("static");
        let static_tok = tok.clone();
        if is_static {
            tok = tokens.pop(&open.span)?;
        }
        expect_identifier(&tok)?;
        let member_id = tok.clone();
        let colon = tokens.pop(&tok.span)?;
        expect_punct(&colon, ":")?;
        let (pointer, data_type) = data_type_sa(tokens, &colon.span)?;
        let (default, end_tok) = optional_literal_default(tokens, &colon.span)?;
        let start_span = if is_static { static_tok.span.clone() } else { member_id.span.clone() };
        let end_span = default.as_ref().map(|d| d.span().clone()).unwrap_or_else(|| match &data_type {
            DataType::BuiltIn(_) => end_tok.span.clone(),
            DataType::Named(_, s) => s.clone(),
        });
        members.push(StructureMember {
            identifier: Symbol::intern(&member_id.lexeme),
            identifier_span: member_id.span,
            data_type,
            pointer,
            is_static,
            default,
            span: start_span.union(&end_span),
        });
        if end_tok.is_punct("}") {
            last = end_tok;
            break;
        }
    }
    let span = stoken.span.union(&last.span);
    Ok(StructBlock {
        identifier: Symbol::intern(&id_tok.lexeme),
        identifier_span: id_tok.span,
        members,
        span,
    })
}

fn enum_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<EnumBlock> {
    let id_tok = tokens.pop(&stoken.span)?;
    expect_identifier(&id_tok)?;
    let open = tokens.pop(&id_tok.span)?;
    expect_punct(&open, "{")?;
    let mut members = Vec::new();
    let mut last = open.clone();
    loop {
        if tokens.front().map(|t| t.is_punct("}")).unwrap_or(false) {
            last = tokens.pop(&open.span)?;
            break;
        }
        let member_id = tokens.pop(&open.span)?;
        expect_identifier(&member_id)?;
        let sep = tokens.pop(&member_id.span)?;
        expect_punct_one_of(&sep, &[",", "=", "}"])?;
        let (value, end_tok, value_span) = if sep.is_punct("=") {
            let lit = tokens.pop(&sep.span)?;
            if lit.kind != TokenKind::NumberLiteral {
                return Err(err(
                    "ExpectedLiteral",
                    "expected a number literal",
                    lit.span.clone(),
                ));
            }
            let value: i32 = parse_number_literal(&lit.lexeme);
            let end = tokens.pop(&lit.span)?;
            expect_punct_one_of(&end, &[",", "}"])?;
            (Some(value), end.clone(), Some(lit.span))
        } else {
            (None, sep.clone(), None)
        };
        let span = match value_span {
            Some(vs) => member_id.span.union(&vs),
            None => member_id.span.clone(),
        };
        members.push(EnumMember {
            identifier: Symbol::intern(&member_id.lexeme),
            identifier_span: member_id.span,
            value,
            span,
        });
        if end_tok.is_punct("}") {
            last = end_tok;
            break;
        }
    }
    let span = stoken.span.union(&last.span);
    Ok(EnumBlock {
        identifier: Symbol::intern(&id_tok.lexeme),
        identifier_span: id_tok.span,
        members,
        span,
    })
}

fn parse_number_literal(text: &str) -> i32 {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(rest) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
        i32::from_str_radix(rest, 2).unwrap_or(0)
    } else if let Some(rest) = cleaned.strip_prefix("0o").or(cleaned.strip_prefix("0O")) {
        i32::from_str_radix(rest, 8).unwrap_or(0)
    } else if let Some(rest) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X")) {
        i32::from_str_radix(rest, 16).unwrap_or(0)
    } else {
        cleaned.parse::<f64>().map(|f| f as i32).unwrap_or(0)
    }
}

fn function_block_sa(tokens: &mut TokenList, stoken: &Token) -> PResult<FunctionBlock> {
    let id_tok = tokens.pop(&stoken.span)?;
    expect_identifier(&id_tok)?;
    let mut tok = tokens.pop(&id_tok.span)?;
    expect_punct(&tok, "(")?;
    let mut params = Vec::new();
    while !tok.is_punct(")") {
        tok = tokens.pop(&id_tok.span)?;
        if tok.kind == TokenKind::Punctuation {
            expect_punct(&tok, ")")?;
            continue;
        }
        expect_identifier(&tok)?;
        let member_id = tok.clone();
        let colon = tokens.pop(&tok.span)?;
        expect_punct(&colon, ":")?;
        let (pointer, data_type) = data_type_sa(tokens, &colon.span)?;
        let (default, end_tok) = optional_literal_default(tokens, &colon.span)?;
        let end_span = default.as_ref().map(|d| d.span().clone()).unwrap_or_else(|| match &data_type {
            DataType::BuiltIn(_) => end_tok.span.clone(),
            DataType::Named(_, s) => s.clone(),
        });
        params.push(FunctionParameter {
            identifier: Symbol::intern(&member_id.lexeme),
            identifier_span: member_id.span.clone(),
            data_type,
            pointer,
            default,
            span: member_id.span.union(&end_span),
        });
        tok = end_tok;
    }
    let arrow = tokens.pop(&tok.span)?;
    expect_punct(&arrow, "->")?;
    let (return_type_pointer, return_type) = data_type_sa(tokens, &arrow.span)?;
    let (_open, inner, close) = get_nested_group(tokens, ("{", "}"), &arrow.span)?;
    let code = code_block_sa(inner)?;
    let span = stoken.span.union(&close.span);
    Ok(FunctionBlock {
        identifier: Symbol::intern(&id_tok.lexeme),
        identifier_span: id_tok.span,
        params,
        return_type_pointer,
        return_type: Some(return_type),
        code,
        span,
    })
}

/// Parses a complete token stream into a [`File`].
pub fn file_sa(tokens: Vec<Token>) -> PResult<File> {
    let mut list = TokenList::new(tokens);
    let eof_span = Span::new("<eof>", 0, 0, 0);
    let mut items = Vec::new();
    while !list.is_empty() {
        let tok = list.pop(&eof_span)?;
        match tok.kind {
            TokenKind::Directive => items.push(Item::Directive(tok.lexeme.clone(), tok.span)),
            TokenKind::Keyword if tok.lexeme == "struct" => {
                items.push(Item::Struct(struct_block_sa(&mut list, &tok)?))
            }
            TokenKind::Keyword if tok.lexeme == "enum" => {
                items.push(Item::Enum(enum_block_sa(&mut list, &tok)?))
            }
            TokenKind::Keyword if tok.lexeme == "fn" => {
                items.push(Item::Function(function_block_sa(&mut list, &tok)?))
            }
            _ => {
                return Err(err(
                    "UnexpectedToken",
                    format!("expected 'struct', 'enum', or 'fn' but found '{}'", tok.lexeme),
                    tok.span,
                ))
            }
        }
    }
    Ok(File { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use td12_lex::tokenize;

    fn parse(src: &str) -> File {
        let tokens = tokenize(src, "t.td12").expect("lex");
        file_sa(tokens).expect("parse")
    }

    #[test]
    fn assignment_is_loosest_and_right_associative_over_additive() {
        let file = parse("fn f() -> int { a = b + c * d; }");
        let Item::Function(f) = &file.items[0] else { panic!() };
        let Stmt::Expr(Expr::Binary { op, rhs, .. }) = &f.code[0] else { panic!() };
        assert_eq!(*op, BinaryOp::Assignment);
        let Expr::Binary { op: op2, rhs: rhs2, .. } = rhs.as_ref() else { panic!() };
        assert_eq!(*op2, BinaryOp::Addition);
        let Expr::Binary { op: op3, .. } = rhs2.as_ref() else { panic!() };
        assert_eq!(*op3, BinaryOp::Multiplication);
    }

    #[test]
    fn parentheses_override_precedence() {
        let file = parse("fn f() -> int { x = (a + b) * c; }");
        let Item::Function(f) = &file.items[0] else { panic!() };
        let Stmt::Expr(Expr::Binary { rhs, .. }) = &f.code[0] else { panic!() };
        let Expr::Binary { op, .. } = rhs.as_ref() else { panic!() };
        assert_eq!(*op, BinaryOp::Multiplication);
    }

    #[test]
    fn while_true_loop_parses() {
        let file = parse("fn main() -> int { while (True) { break; } }");
        let Item::Function(f) = &file.items[0] else { panic!() };
        assert!(matches!(&f.code[0], Stmt::While(_)));
    }

    #[test]
    fn struct_and_enum_blocks_parse() {
        let file = parse("struct P { x: int, y: int = 3 }\nenum E { A, B = 3, C }");
        assert_eq!(file.items.len(), 2);
    }

    #[test]
    fn function_call_with_keyword_argument() {
        let file = parse("fn f() -> int { g(1, y = 2); }");
        let Item::Function(f) = &file.items[0] else { panic!() };
        let Stmt::Expr(Expr::Call { args, .. }) = &f.code[0] else { panic!() };
        assert_eq!(args.len(), 2);
        assert!(args[1].name.is_some());
    }
}
