//! 停止条件表达式
//!
//! 受限语法的整数/布尔表达式解析与求值，唯一的变量是 `counter`。
//!
//! 语法（优先级由低到高）:
//! ```text
//! or      := and ( "||" and )*
//! and     := cmp ( "&&" cmp )*
//! cmp     := add ( ("<" | "<=" | ">" | ">=" | "==" | "!=") add )*
//! add     := mul ( ("+" | "-") mul )*
//! mul     := unary ( ("*" | "/" | "%") unary )*
//! unary   := ("-" | "!") unary | primary
//! primary := INTEGER | "counter" | "true" | "false" | "(" or ")"
//! ```
//! `===` / `!==` 作为 `==` / `!=` 的别名接受。

use thiserror::Error;

/// 括号与一元运算符的最大嵌套层数
pub const MAX_DEPTH: usize = 64;

/// 表达式的最大 token 数（求值与释放都按树深递归）
pub const MAX_TOKENS: usize = 256;

/// 表达式错误（解析或求值）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("integer literal out of range: {0}")]
    LiteralOutOfRange(String),

    #[error("unknown identifier '{0}' (only 'counter' is allowed)")]
    UnknownIdentifier(String),

    #[error("unexpected token '{token}' at position {pos}")]
    UnexpectedToken { token: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("expression longer than {limit} tokens")]
    TooLong { limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
    Int(i64),
    Bool(bool),
    Counter,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
        }
    }

    fn as_int(self) -> Result<i64, ConditionError> {
        match self {
            Value::Int(v) => Ok(v),
            other => Err(ConditionError::TypeMismatch {
                expected: "integer",
                found: other.type_name(),
            }),
        }
    }

    fn as_bool(self) -> Result<bool, ConditionError> {
        match self {
            Value::Bool(v) => Ok(v),
            other => Err(ConditionError::TypeMismatch {
                expected: "boolean",
                found: other.type_name(),
            }),
        }
    }
}

/// 已解析的停止条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCondition {
    source: String,
    expr: Expr,
}

impl StopCondition {
    /// 解析停止条件
    pub fn parse(source: &str) -> Result<Self, ConditionError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(ConditionError::UnexpectedToken {
                token: token.kind.to_string(),
                pos: token.pos,
            });
        }
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// 以给定 counter 求值，结果必须为布尔值
    pub fn evaluate(&self, counter: u32) -> Result<bool, ConditionError> {
        eval(&self.expr, i64::from(counter))?.as_bool()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl std::fmt::Display for StopCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn eval(expr: &Expr, counter: i64) -> Result<Value, ConditionError> {
    match expr {
        Expr::Int(v) => Ok(Value::Int(*v)),
        Expr::Bool(v) => Ok(Value::Bool(*v)),
        Expr::Counter => Ok(Value::Int(counter)),
        Expr::Unary(op, operand) => {
            let value = eval(operand, counter)?;
            match op {
                UnaryOp::Neg => value
                    .as_int()?
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or(ConditionError::Overflow),
                UnaryOp::Not => Ok(Value::Bool(!value.as_bool()?)),
            }
        }
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            if !eval(lhs, counter)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(rhs, counter)?.as_bool()?))
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            if eval(lhs, counter)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(rhs, counter)?.as_bool()?))
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, counter)?;
            let rhs = eval(rhs, counter)?;
            eval_binary(*op, lhs, rhs)
        }
    }
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ConditionError> {
    // 布尔值只允许相等比较
    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        return match op {
            BinaryOp::Eq => Ok(Value::Bool(a == b)),
            BinaryOp::Ne => Ok(Value::Bool(a != b)),
            _ => Err(ConditionError::TypeMismatch {
                expected: "integer",
                found: "boolean",
            }),
        };
    }

    let a = lhs.as_int()?;
    let b = rhs.as_int()?;
    let value = match op {
        BinaryOp::Add => Value::Int(a.checked_add(b).ok_or(ConditionError::Overflow)?),
        BinaryOp::Sub => Value::Int(a.checked_sub(b).ok_or(ConditionError::Overflow)?),
        BinaryOp::Mul => Value::Int(a.checked_mul(b).ok_or(ConditionError::Overflow)?),
        BinaryOp::Div => {
            if b == 0 {
                return Err(ConditionError::DivisionByZero);
            }
            Value::Int(a.checked_div(b).ok_or(ConditionError::Overflow)?)
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(ConditionError::DivisionByZero);
            }
            Value::Int(a.checked_rem(b).ok_or(ConditionError::Overflow)?)
        }
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators are short-circuited"),
    };
    Ok(value)
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Int(i64),
    Ident(String),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Int(v) => return write!(f, "{}", v),
            TokenKind::Ident(name) => return write!(f, "{}", name),
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Not => "!",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::Eq => "==",
            TokenKind::Ne => "!=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ConditionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if tokens.len() > MAX_TOKENS {
            return Err(ConditionError::TooLong { limit: MAX_TOKENS });
        }
        let ch = chars[i];
        let pos = i;

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<i64>()
                .map_err(|_| ConditionError::LiteralOutOfRange(literal.clone()))?;
            tokens.push(Token {
                kind: TokenKind::Int(value),
                pos,
            });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            tokens.push(Token {
                kind: TokenKind::Ident(ident),
                pos,
            });
            continue;
        }

        let next = chars.get(i + 1).copied();
        let next2 = chars.get(i + 2).copied();
        let (kind, width) = match (ch, next) {
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('<', Some('=')) => (TokenKind::Le, 2),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', Some('=')) => (TokenKind::Ge, 2),
            ('>', _) => (TokenKind::Gt, 1),
            ('=', Some('=')) if next2 == Some('=') => (TokenKind::Eq, 3),
            ('=', Some('=')) => (TokenKind::Eq, 2),
            ('!', Some('=')) if next2 == Some('=') => (TokenKind::Ne, 3),
            ('!', Some('=')) => (TokenKind::Ne, 2),
            ('!', _) => (TokenKind::Not, 1),
            ('&', Some('&')) => (TokenKind::And, 2),
            ('|', Some('|')) => (TokenKind::Or, 2),
            _ => return Err(ConditionError::UnexpectedChar { ch, pos }),
        };
        tokens.push(Token { kind, pos });
        i += width;
    }

    if tokens.len() > MAX_TOKENS {
        return Err(ConditionError::TooLong { limit: MAX_TOKENS });
    }
    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// 进入一层嵌套后解析，超过 MAX_DEPTH 时报错而不是继续递归
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ConditionError>,
    ) -> Result<T, ConditionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ConditionError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// 当前 token 匹配映射时消费并返回对应运算符
    fn eat_op(&mut self, map: impl Fn(&TokenKind) -> Option<BinaryOp>) -> Option<BinaryOp> {
        let op = self.peek().and_then(|t| map(&t.kind))?;
        self.pos += 1;
        Some(op)
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_and()?;
        while let Some(op) = self.eat_op(|k| matches!(k, TokenKind::Or).then_some(BinaryOp::Or)) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_cmp()?;
        while let Some(op) = self.eat_op(|k| matches!(k, TokenKind::And).then_some(BinaryOp::And)) {
            let rhs = self.parse_cmp()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_add()?;
        while let Some(op) = self.eat_op(|k| match k {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Ge => Some(BinaryOp::Ge),
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::Ne => Some(BinaryOp::Ne),
            _ => None,
        }) {
            let rhs = self.parse_add()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_mul()?;
        while let Some(op) = self.eat_op(|k| match k {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.eat_op(|k| match k {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        }) {
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionError> {
        let kind = self.peek().map(|t| t.kind.clone());
        match kind {
            Some(TokenKind::Minus) => {
                self.pos += 1;
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)))
            }
            Some(TokenKind::Not) => {
                self.pos += 1;
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ConditionError> {
        let token = self.next().ok_or(ConditionError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Int(v) => Ok(Expr::Int(v)),
            TokenKind::Ident(name) => match name.as_str() {
                "counter" => Ok(Expr::Counter),
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                _ => Err(ConditionError::UnknownIdentifier(name)),
            },
            TokenKind::LParen => {
                let inner = self.nested(Self::parse_or)?;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ConditionError::UnexpectedToken {
                        token: other.kind.to_string(),
                        pos: other.pos,
                    }),
                    None => Err(ConditionError::UnexpectedEnd),
                }
            }
            other => Err(ConditionError::UnexpectedToken {
                token: other.to_string(),
                pos: token.pos,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holds(source: &str, counter: u32) -> bool {
        StopCondition::parse(source).unwrap().evaluate(counter).unwrap()
    }

    #[test]
    fn test_simple_comparisons() {
        assert!(holds("counter < 4", 3));
        assert!(!holds("counter < 4", 4));
        assert!(holds("counter <= 4", 4));
        assert!(holds("counter == 1", 1));
        assert!(holds("counter != 2", 1));
        assert!(holds("counter >= 1", 1));
        assert!(!holds("counter > 1", 1));
    }

    #[test]
    fn test_logical_and_arithmetic() {
        assert!(holds("counter < 10 && counter % 2 == 1", 3));
        assert!(!holds("counter < 10 && counter % 2 == 1", 4));
        assert!(holds("counter * 2 + 1 <= 7 || false", 3));
        assert!(holds("!(counter > 5)", 5));
        assert!(holds("-counter < 0", 1));
        assert!(holds("(counter - 1) / 2 < 3", 6));
    }

    #[test]
    fn test_strict_equality_aliases() {
        assert!(holds("counter === 3", 3));
        assert!(holds("counter !== 3", 4));
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 == 7
        assert!(holds("1 + counter * 3 == 7", 2));
        // && 优先于 ||
        assert!(holds("true || false && false", 1));
    }

    #[test]
    fn test_rejects_unknown_identifiers() {
        let err = StopCondition::parse("process.exit() == 0").unwrap_err();
        assert!(matches!(err, ConditionError::UnexpectedChar { ch: '.', .. }));

        let err = StopCondition::parse("count < 3").unwrap_err();
        assert_eq!(err, ConditionError::UnknownIdentifier("count".to_string()));
    }

    #[test]
    fn test_rejects_malformed_syntax() {
        assert_eq!(
            StopCondition::parse("counter <").unwrap_err(),
            ConditionError::UnexpectedEnd
        );
        assert!(matches!(
            StopCondition::parse("counter = 3").unwrap_err(),
            ConditionError::UnexpectedChar { ch: '=', .. }
        ));
        assert!(matches!(
            StopCondition::parse("(counter < 3").unwrap_err(),
            ConditionError::UnexpectedEnd
        ));
        assert!(matches!(
            StopCondition::parse("counter < 3 4").unwrap_err(),
            ConditionError::UnexpectedToken { .. }
        ));
        assert!(StopCondition::parse("").is_err());
    }

    #[test]
    fn test_evaluation_errors() {
        let non_bool = StopCondition::parse("counter + 1").unwrap();
        assert!(matches!(
            non_bool.evaluate(1).unwrap_err(),
            ConditionError::TypeMismatch { expected: "boolean", .. }
        ));

        let div_zero = StopCondition::parse("10 / (counter - 1) > 0").unwrap();
        assert_eq!(div_zero.evaluate(1).unwrap_err(), ConditionError::DivisionByZero);
        assert!(div_zero.evaluate(2).unwrap());

        let overflow = StopCondition::parse("counter * 9223372036854775807 > 0").unwrap();
        assert_eq!(overflow.evaluate(2).unwrap_err(), ConditionError::Overflow);

        let bool_order = StopCondition::parse("true < false").unwrap();
        assert!(bool_order.evaluate(1).is_err());
    }

    #[test]
    fn test_literal_out_of_range() {
        assert!(matches!(
            StopCondition::parse("counter < 99999999999999999999").unwrap_err(),
            ConditionError::LiteralOutOfRange(_)
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!("{}counter < 3{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(
            StopCondition::parse(&parens).unwrap_err(),
            ConditionError::TooDeep { limit: MAX_DEPTH }
        );

        let nots = format!("{}true", "!".repeat(200));
        assert_eq!(
            StopCondition::parse(&nots).unwrap_err(),
            ConditionError::TooDeep { limit: MAX_DEPTH }
        );

        let ok = format!("{}counter < 3{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(StopCondition::parse(&ok).unwrap().evaluate(1).unwrap());
    }

    #[test]
    fn test_huge_expressions_are_rejected() {
        let parens = format!("{}counter < 3{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(
            StopCondition::parse(&parens).unwrap_err(),
            ConditionError::TooLong { limit: MAX_TOKENS }
        );

        // 左结合长链不递归解析，但求值与释放会按树深递归
        let chain = format!("counter{} < 3", " + 1".repeat(100_000));
        assert_eq!(
            StopCondition::parse(&chain).unwrap_err(),
            ConditionError::TooLong { limit: MAX_TOKENS }
        );
    }
}
