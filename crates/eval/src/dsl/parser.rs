use super::ast::{BinOp, BoolOp, CompareOp, Expr};
use super::lexer::{lex, Token};

/// Whole-valued literals lex as integers so `2 == 2.0`-style mismatches
/// between `serde_json::Number`'s int and float representations don't
/// make an otherwise-true membership or equality check fail.
fn number_literal(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::json!(n as i64)
    } else {
        serde_json::json!(n)
    }
}

pub fn parse(input: &str) -> Result<Expr, String> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect(&Token::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected {expected:?}, found {:?}", self.peek()))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_and()?];
        while *self.peek() == Token::Or {
            self.advance();
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::BoolOp(BoolOp::Or, terms) })
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_not()?];
        while *self.peek() == Token::And {
            self.advance();
            terms.push(self.parse_not()?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::BoolOp(BoolOp::And, terms) })
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if *self.peek() == Token::Not {
            self.advance();
            return Ok(Expr::UnaryNot(Box::new(self.parse_not()?)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, String> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Token::Eq => Some(CompareOp::Eq),
            Token::NotEq => Some(CompareOp::NotEq),
            Token::Gt => Some(CompareOp::Gt),
            Token::GtE => Some(CompareOp::GtE),
            Token::Lt => Some(CompareOp::Lt),
            Token::LtE => Some(CompareOp::LtE),
            Token::In => Some(CompareOp::In),
            Token::Not => Some(CompareOp::NotIn),
            _ => None,
        };
        let Some(op) = op else { return Ok(left) };
        if matches!(op, CompareOp::NotIn) {
            self.advance();
            self.expect(&Token::In)?;
        } else {
            self.advance();
        }
        let right = self.parse_additive()?;
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_postfix()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_postfix()?;
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let Token::Ident(field) = self.advance() else { return Err("expected field name after '.'".into()) };
                    expr = Expr::Subscript(Box::new(expr), Box::new(Expr::Const(serde_json::json!(field))));
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_or()?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Subscript(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Const(number_literal(n))),
            Token::String(s) => Ok(Expr::Const(serde_json::json!(s))),
            Token::True => Ok(Expr::Const(serde_json::json!(true))),
            Token::False => Ok(Expr::Const(serde_json::json!(false))),
            Token::Null => Ok(Expr::Const(serde_json::Value::Null)),
            Token::Ident(name) => Ok(Expr::Name(name)),
            Token::Minus => {
                let inner = self.parse_postfix()?;
                Ok(Expr::BinOp(BinOp::Sub, Box::new(Expr::Const(serde_json::json!(0.0))), Box::new(inner)))
            }
            Token::LParen => {
                let expr = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparison_and_boolean_combination() {
        assert!(parse("task[\"id\"] == \"t1\" and steps > 0").is_ok());
    }

    #[test]
    fn rejects_call_syntax_as_unexpected_tokens() {
        assert!(parse("len(task)").is_err());
    }

    #[test]
    fn dot_access_desugars_to_subscript() {
        let expr = parse("task.id == \"t1\"").unwrap();
        match expr {
            Expr::Compare(_, left, _) => assert!(matches!(*left, Expr::Subscript(_, _))),
            other => panic!("expected compare, got {other:?}"),
        }
    }
}
