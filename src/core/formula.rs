//! Formula evaluation for parametric part dimensions
//!
//! Part sizes are written as small arithmetic expressions over the cabinet's
//! dimensions, e.g. `width / 2 - 3` or `(left_width - depth) + 18`. Formulas
//! are tokenized and parsed into a restricted expression tree: numeric
//! literals, variables, unary `+`/`-`, the four binary operators and
//! parentheses. Nothing else is accepted. Identifiers are matched as whole
//! tokens (`left_width` never matches `width`).
//!
//! [`evaluate`] is fail-soft: any problem yields `0.0` and a logged warning, so
//! one bad formula does not abort a price calculation. Use [`try_evaluate`] or
//! [`Formula`] when the caller wants the typed error.

use std::collections::{BTreeSet, HashMap};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Variable values available to a formula
pub type Bindings = HashMap<String, f64>;

/// Parenthesis/unary nesting allowed before a formula is rejected
const MAX_DEPTH: usize = 64;

/// Errors produced while parsing or evaluating a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("formula is nested too deeply")]
    TooDeep,

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn eval(&self, bindings: &Bindings) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Var(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| FormulaError::UnknownVariable(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(bindings)?),
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(bindings)?;
                let b = rhs.eval(bindings)?;
                match op {
                    BinOp::Add => Ok(a + b),
                    BinOp::Sub => Ok(a - b),
                    BinOp::Mul => Ok(a * b),
                    BinOp::Div => {
                        if b == 0.0 {
                            Err(FormulaError::DivisionByZero)
                        } else {
                            Ok(a / b)
                        }
                    }
                }
            }
        }
    }

    fn collect_vars<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Var(name) => {
                out.insert(name.as_str());
            }
            Expr::Neg(inner) => inner.collect_vars(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

/// Tokenizer over the formula text
struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, FormulaError> {
        let mut tokens = Vec::new();

        while let Some(&(pos, ch)) = self.chars.peek() {
            let token = match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '*' => self.single(Token::Star),
                '/' => self.single(Token::Slash),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                c if c.is_ascii_digit() || c == '.' => self.number(pos)?,
                c if c.is_ascii_alphabetic() || c == '_' => self.ident(pos),
                other => return Err(FormulaError::UnexpectedChar { ch: other, pos }),
            };
            tokens.push((token, pos));
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        &self.input[start..end]
    }

    fn number(&mut self, start: usize) -> Result<Token, FormulaError> {
        let text = self.take_while(start, |c| c.is_ascii_digit() || c == '.');
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| FormulaError::InvalidNumber {
                text: text.to_string(),
                pos: start,
            })
    }

    fn ident(&mut self, start: usize) -> Token {
        let text = self.take_while(start, |c| c.is_ascii_alphanumeric() || c == '_');
        Token::Ident(text.to_string())
    }
}

/// Recursive-descent parser producing an [`Expr`]
struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn parse(tokens: Vec<(Token, usize)>) -> Result<Expr, FormulaError> {
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;

        match parser.tokens.get(parser.pos) {
            Some((token, pos)) => Err(FormulaError::UnexpectedToken {
                found: token.describe(),
                pos: *pos,
            }),
            None => Ok(expr),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        self.descend()?;
        let inner = self.factor()?;
        self.depth -= 1;
        Ok(inner)
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // factor := ('+' | '-') factor | number | ident | '(' expr ')'
    fn factor(&mut self) -> Result<Expr, FormulaError> {
        let (token, pos) = self.next().ok_or(FormulaError::UnexpectedEnd)?;
        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Ident(name) => Ok(Expr::Var(name)),
            Token::Plus => self.unary(),
            Token::Minus => Ok(Expr::Neg(Box::new(self.unary()?))),
            Token::LParen => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, pos)) => Err(FormulaError::UnexpectedToken {
                        found: other.describe(),
                        pos,
                    }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.describe(),
                pos,
            }),
        }
    }
}

/// A parsed formula, reusable across bindings
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse formula text
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = Lexer::new(source).tokenize()?;
        let expr = Parser::parse(tokens)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Evaluate against the given bindings
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, FormulaError> {
        let value = self.expr.eval(bindings)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }

    /// Variable names referenced by the formula
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut vars = BTreeSet::new();
        self.expr.collect_vars(&mut vars);
        vars
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// Parse and evaluate a formula, returning the typed error on failure
pub fn try_evaluate(formula: &str, bindings: &Bindings) -> Result<f64, FormulaError> {
    Formula::parse(formula)?.eval(bindings)
}

/// Parse and evaluate a formula, returning `0.0` on any failure
pub fn evaluate(formula: &str, bindings: &Bindings) -> f64 {
    match try_evaluate(formula, bindings) {
        Ok(value) => value,
        Err(FormulaError::Empty) => {
            log::debug!("Empty formula evaluates to 0");
            0.0
        }
        Err(e) => {
            log::warn!("Formula '{}' evaluates to 0: {}", formula, e);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_literals_and_precedence() {
        let b = Bindings::new();
        assert_eq!(evaluate("1 + 2 * 3", &b), 7.0);
        assert_eq!(evaluate("(1 + 2) * 3", &b), 9.0);
        assert_eq!(evaluate("10 - 4 - 3", &b), 3.0);
        assert_eq!(evaluate("24 / 4 / 2", &b), 3.0);
        assert_eq!(evaluate("0.5 * 4", &b), 2.0);
        assert_eq!(evaluate(".5 + 1.", &b), 1.5);
    }

    #[test]
    fn test_unary_minus() {
        let b = bindings(&[("width", 600.0)]);
        assert_eq!(evaluate("-width + 700", &b), 100.0);
        assert_eq!(evaluate("2 * -(3 + 1)", &b), -8.0);
        assert_eq!(evaluate("+5", &b), 5.0);
    }

    #[test]
    fn test_variables() {
        let b = bindings(&[("width", 600.0), ("height", 720.0), ("depth", 560.0)]);
        assert_eq!(evaluate("width / 2 - 3", &b), 297.0);
        assert_eq!(evaluate("height - 4", &b), 716.0);
        assert_eq!(evaluate("depth", &b), 560.0);
    }

    #[test]
    fn test_overlapping_names_are_whole_tokens() {
        let b = bindings(&[("width", 600.0), ("left_width", 900.0)]);
        assert_eq!(evaluate("left_width - width", &b), 300.0);
        assert_eq!(evaluate("width", &b), 600.0);
    }

    #[test]
    fn test_invalid_formulas_return_zero() {
        let b = bindings(&[("width", 600.0)]);
        assert_eq!(evaluate("", &b), 0.0);
        assert_eq!(evaluate("   ", &b), 0.0);
        assert_eq!(evaluate("width +", &b), 0.0);
        assert_eq!(evaluate("(width", &b), 0.0);
        assert_eq!(evaluate("width)", &b), 0.0);
        assert_eq!(evaluate("width % 2", &b), 0.0);
        assert_eq!(evaluate("height", &b), 0.0);
        assert_eq!(evaluate("width / 0", &b), 0.0);
        assert_eq!(evaluate("1.2.3", &b), 0.0);
        assert_eq!(evaluate("max(width, 2)", &b), 0.0);
    }

    #[test]
    fn test_typed_errors() {
        let b = bindings(&[("width", 600.0)]);
        assert_eq!(try_evaluate("", &b), Err(FormulaError::Empty));
        assert_eq!(
            try_evaluate("depth", &b),
            Err(FormulaError::UnknownVariable("depth".to_string()))
        );
        assert_eq!(try_evaluate("width / (1 - 1)", &b), Err(FormulaError::DivisionByZero));
        assert_eq!(
            try_evaluate("width; drop", &b),
            Err(FormulaError::UnexpectedChar { ch: ';', pos: 5 })
        );
        assert_eq!(try_evaluate("2 *", &b), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(
            try_evaluate("2 3", &b),
            Err(FormulaError::UnexpectedToken { pos: 2, .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(Formula::parse(&deep), Err(FormulaError::TooDeep));

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(try_evaluate(&ok, &Bindings::new()), Ok(1.0));
    }

    #[test]
    fn test_deterministic() {
        let b = bindings(&[("width", 600.0), ("qty", 3.0)]);
        let f = "(width - 36) / 2 * qty";
        let first = evaluate(f, &b);
        for _ in 0..10 {
            assert_eq!(evaluate(f, &b), first);
        }
    }

    #[test]
    fn test_formula_variables() {
        let f = Formula::parse("left_width - depth + 18 - depth").unwrap();
        let vars: Vec<&str> = f.variables().into_iter().collect();
        assert_eq!(vars, vec!["depth", "left_width"]);
        assert_eq!(f.source(), "left_width - depth + 18 - depth");
    }
}
