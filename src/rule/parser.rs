//! Rule string parser
//!
//! Grammar:
//!
//! ```text
//! full_rule  := expression [ ("AND" | "OR") expression ]
//! expression := "(" expression ")"
//!             | "(" expression TOKEN expression ")"
//!             | operand
//! operand    := FIELD COMPARATOR LITERAL
//! LITERAL    := WORD | "'" WORD "'" | "'" "'"
//! ```
//!
//! Only one logical join is recognized at the top level; deeper nesting
//! needs parentheses. Tokens after that join are left unconsumed.

use crate::error::{Result, RuleError};
use crate::rule::ast::{Comparator, Literal, LogicalOp, Node};
use std::fmt;
use tracing::debug;

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<Node> {
    parse_with_leftover(rule).map(|outcome| outcome.node)
}

/// A parsed tree together with any top-level tokens the grammar did not consume
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub node: Node,
    pub leftover: Vec<String>,
}

/// Parse a rule string, returning the unconsumed trailing tokens alongside the tree
pub fn parse_with_leftover(rule: &str) -> Result<ParseOutcome> {
    let tokens = tokenize(rule)?;
    if tokens.is_empty() {
        return Err(RuleError::Syntax("Rule string is invalid or empty".to_string()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_full_rule()?;
    let leftover: Vec<String> = parser.remaining().iter().map(Token::to_string).collect();

    if !leftover.is_empty() {
        debug!(rule, ?leftover, "ignoring trailing tokens after top-level rule");
    }

    Ok(ParseOutcome { node, leftover })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quote,
    OpenParen,
    CloseParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => f.write_str(word),
            Token::Quote => f.write_str("'"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
        }
    }
}

fn tokenize(rule: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut paren_depth: i32 = 0;

    for c in rule.chars() {
        let token = match c {
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            '\'' => Some(Token::Quote),
            c if c.is_whitespace() => None,
            _ => {
                current.push(c);
                continue;
            }
        };

        if !current.is_empty() {
            tokens.push(Token::Word(std::mem::take(&mut current)));
        }

        match token {
            Some(Token::OpenParen) => paren_depth += 1,
            Some(Token::CloseParen) => {
                paren_depth -= 1;
                if paren_depth < 0 {
                    return Err(RuleError::Syntax(
                        "Mismatched parentheses in rule string".to_string(),
                    ));
                }
            }
            _ => {}
        }

        if let Some(token) = token {
            tokens.push(token);
        }
    }

    if !current.is_empty() {
        tokens.push(Token::Word(current));
    }

    if paren_depth != 0 {
        return Err(RuleError::Syntax(
            "Mismatched parentheses in rule string".to_string(),
        ));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
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

    fn remaining(&self) -> &[Token] {
        &self.tokens[self.pos..]
    }

    fn parse_full_rule(&mut self) -> Result<Node> {
        let left = self.parse_expression()?;

        let op = match self.peek() {
            Some(Token::Word(word)) if word == "AND" || word == "OR" => LogicalOp::from_symbol(word),
            _ => return Ok(left),
        };
        self.pos += 1;

        let right = self.parse_expression()?;
        Ok(Node::operator(op, left, right))
    }

    fn parse_expression(&mut self) -> Result<Node> {
        match self.peek() {
            None => Err(RuleError::Syntax("Empty expression in rule string".to_string())),
            Some(Token::OpenParen) => {
                self.pos += 1;
                self.parse_group()
            }
            Some(_) => self.parse_operand(),
        }
    }

    /// Body of a parenthesized expression, after the opening paren
    fn parse_group(&mut self) -> Result<Node> {
        let left = self.parse_expression()?;

        let op = match self.next() {
            None => return Err(RuleError::Syntax("Missing operator in rule string".to_string())),
            Some(Token::CloseParen) => return Ok(left),
            // Any token joins the two sides; unknown ones fail at evaluation
            Some(token) => LogicalOp::from_symbol(&token.to_string()),
        };

        let right = self.parse_expression()?;

        match self.next() {
            Some(Token::CloseParen) => Ok(Node::operator(op, left, right)),
            _ => Err(RuleError::Syntax(
                "Mismatched parentheses in rule string".to_string(),
            )),
        }
    }

    fn parse_operand(&mut self) -> Result<Node> {
        if self.remaining().len() < 3 {
            return Err(RuleError::Syntax("Incomplete operand in rule string".to_string()));
        }

        let (Some(field), Some(comparator), Some(literal)) = (self.next(), self.next(), self.next())
        else {
            return Err(RuleError::Syntax("Incomplete operand in rule string".to_string()));
        };

        let literal = match literal {
            Token::Quote => self.parse_quoted_literal()?,
            token => normalize_literal(&token.to_string()),
        };

        Ok(Node::comparison(
            field.to_string(),
            Comparator::from_symbol(&comparator.to_string()),
            literal,
        ))
    }

    /// Quoted literal after its opening quote. Only a single word may be
    /// quoted; the tokenizer has already split anything with spaces.
    fn parse_quoted_literal(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Quote) => Ok(String::new()),
            Some(Token::Word(word)) => match self.next() {
                Some(Token::Quote) => Ok(word),
                _ => Err(RuleError::Syntax(format!(
                    "Unterminated quoted literal '{}' in rule string",
                    word
                ))),
            },
            _ => Err(RuleError::Syntax(
                "Unterminated quoted literal in rule string".to_string(),
            )),
        }
    }
}

/// Canonical text of an unquoted literal: `007` becomes `7`, `1.50` becomes `1.5`
fn normalize_literal(text: &str) -> String {
    Literal::from_text(text).to_string()
}
