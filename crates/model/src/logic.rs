//! Boolean logic over dependee slots.
//!
//! A formula combines slot references with the usual gates:
//!
//! ```text
//! [0] AND ([1] OR NOT [2])
//! ```
//!
//! Keywords are case-insensitive. Precedence, tightest first: NOT, AND,
//! XOR, OR. XOR is n-ary exactly-one-true. When a dependency declares no
//! formula, the default logic is the AND of every bound dependee slot; a
//! single dependee collapses to a bare slot reference.

use crate::error::{ModelError, Result};
use crate::scope::Scope;
use std::collections::{BTreeMap, BTreeSet};
use variant_address::VariantAddress;

/// Compiled logic expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicExpr {
    /// Activation state of one dependee slot.
    Slot(u32),
    Not(Box<LogicExpr>),
    And(Vec<LogicExpr>),
    Or(Vec<LogicExpr>),
    /// True when exactly one operand is true.
    Xor(Vec<LogicExpr>),
}

impl LogicExpr {
    /// Parse a formula into an expression tree.
    pub fn parse(formula: &str) -> Result<Self> {
        let tokens = tokenize(formula)?;
        let mut parser = Parser { tokens, cursor: 0 };
        let expr = parser.parse_or()?;
        if let Some((offset, token)) = parser.peek() {
            return Err(ModelError::Formula(format!(
                "unexpected trailing {} at offset {offset}",
                token.describe()
            )));
        }
        Ok(expr)
    }

    /// The default logic over `slots`: AND of all of them, or a bare slot
    /// reference when there is exactly one. `None` when `slots` is empty.
    pub fn default_over(slots: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut refs: Vec<LogicExpr> = slots.into_iter().map(LogicExpr::Slot).collect();
        match refs.len() {
            0 => None,
            1 => Some(refs.swap_remove(0)),
            _ => Some(LogicExpr::And(refs)),
        }
    }

    /// Every slot the expression references.
    pub fn slots(&self) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        self.collect_slots(&mut out);
        out
    }

    fn collect_slots(&self, out: &mut BTreeSet<u32>) {
        match self {
            LogicExpr::Slot(slot) => {
                out.insert(*slot);
            }
            LogicExpr::Not(inner) => inner.collect_slots(out),
            LogicExpr::And(operands) | LogicExpr::Or(operands) | LogicExpr::Xor(operands) => {
                for operand in operands {
                    operand.collect_slots(out);
                }
            }
        }
    }

    /// Evaluate against the live scope state.
    ///
    /// A slot reference with no bound dependee reads as inactive; the
    /// compiler rejects such references up front, so this only matters for
    /// hand-built trees.
    pub fn evaluate(&self, scope: Scope<'_>, dependees: &BTreeMap<u32, VariantAddress>) -> bool {
        match self {
            LogicExpr::Slot(slot) => dependees
                .get(slot)
                .is_some_and(|address| scope.is_active(address)),
            LogicExpr::Not(inner) => !inner.evaluate(scope, dependees),
            LogicExpr::And(operands) => operands
                .iter()
                .all(|operand| operand.evaluate(scope, dependees)),
            LogicExpr::Or(operands) => operands
                .iter()
                .any(|operand| operand.evaluate(scope, dependees)),
            LogicExpr::Xor(operands) => {
                operands
                    .iter()
                    .filter(|operand| operand.evaluate(scope, dependees))
                    .count()
                    == 1
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Slot(u32),
    And,
    Or,
    Xor,
    Not,
    Open,
    Close,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Slot(slot) => format!("slot reference '[{slot}]'"),
            Token::And => "keyword 'AND'".to_string(),
            Token::Or => "keyword 'OR'".to_string(),
            Token::Xor => "keyword 'XOR'".to_string(),
            Token::Not => "keyword 'NOT'".to_string(),
            Token::Open => "token '('".to_string(),
            Token::Close => "token ')'".to_string(),
        }
    }
}

fn tokenize(formula: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = formula.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push((offset, Token::Open)),
            ')' => tokens.push((offset, Token::Close)),
            '[' => {
                let mut digits = String::new();
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == ']' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                if !closed {
                    return Err(ModelError::Formula(format!(
                        "unterminated slot reference at offset {offset}"
                    )));
                }
                let slot: u32 = digits.parse().map_err(|_| {
                    ModelError::Formula(format!(
                        "invalid slot reference '[{digits}]' at offset {offset}"
                    ))
                })?;
                tokens.push((offset, Token::Slot(slot)));
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(d);
                    chars.next();
                }
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "xor" => Token::Xor,
                    "not" => Token::Not,
                    _ => {
                        return Err(ModelError::Formula(format!(
                            "unknown keyword '{word}' at offset {offset}"
                        )))
                    }
                };
                tokens.push((offset, token));
            }
            other => {
                return Err(ModelError::Formula(format!(
                    "unexpected character '{other}' at offset {offset}"
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.cursor)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if matches!(self.peek(), Some((_, t)) if t == token) {
            self.cursor += 1;
            return true;
        }
        false
    }

    fn parse_or(&mut self) -> Result<LogicExpr> {
        let mut operands = vec![self.parse_xor()?];
        while self.eat(&Token::Or) {
            operands.push(self.parse_xor()?);
        }
        Ok(fold(LogicExpr::Or, operands))
    }

    fn parse_xor(&mut self) -> Result<LogicExpr> {
        let mut operands = vec![self.parse_and()?];
        while self.eat(&Token::Xor) {
            operands.push(self.parse_and()?);
        }
        Ok(fold(LogicExpr::Xor, operands))
    }

    fn parse_and(&mut self) -> Result<LogicExpr> {
        let mut operands = vec![self.parse_unary()?];
        while self.eat(&Token::And) {
            operands.push(self.parse_unary()?);
        }
        Ok(fold(LogicExpr::And, operands))
    }

    fn parse_unary(&mut self) -> Result<LogicExpr> {
        if self.eat(&Token::Not) {
            return Ok(LogicExpr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<LogicExpr> {
        match self.peek().cloned() {
            Some((_, Token::Slot(slot))) => {
                self.cursor += 1;
                Ok(LogicExpr::Slot(slot))
            }
            Some((open_offset, Token::Open)) => {
                self.cursor += 1;
                let inner = self.parse_or()?;
                if !self.eat(&Token::Close) {
                    return Err(ModelError::Formula(format!(
                        "unclosed '(' at offset {open_offset}"
                    )));
                }
                Ok(inner)
            }
            Some((offset, token)) => Err(ModelError::Formula(format!(
                "unexpected {} at offset {offset}",
                token.describe()
            ))),
            None => Err(ModelError::Formula("unexpected end of formula".to_string())),
        }
    }
}

fn fold(gate: fn(Vec<LogicExpr>) -> LogicExpr, mut operands: Vec<LogicExpr>) -> LogicExpr {
    if operands.len() == 1 {
        operands.swap_remove(0)
    } else {
        gate(operands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use crate::testkit::FixtureRegistry;
    use pretty_assertions::assert_eq;

    fn slot(n: u32) -> LogicExpr {
        LogicExpr::Slot(n)
    }

    #[test]
    fn test_precedence_not_binds_tighter_than_and_than_or() {
        let expr = LogicExpr::parse("NOT [0] AND [1] OR [2]").expect("parse");
        assert_eq!(
            expr,
            LogicExpr::Or(vec![
                LogicExpr::And(vec![LogicExpr::Not(Box::new(slot(0))), slot(1)]),
                slot(2),
            ])
        );
    }

    #[test]
    fn test_xor_sits_between_and_and_or() {
        let expr = LogicExpr::parse("[0] XOR [1] AND [2] OR [3]").expect("parse");
        assert_eq!(
            expr,
            LogicExpr::Or(vec![
                LogicExpr::Xor(vec![slot(0), LogicExpr::And(vec![slot(1), slot(2)])]),
                slot(3),
            ])
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = LogicExpr::parse("[0] AND ([1] OR [2])").expect("parse");
        assert_eq!(
            expr,
            LogicExpr::And(vec![slot(0), LogicExpr::Or(vec![slot(1), slot(2)])])
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            LogicExpr::parse("[0] and not [1]").expect("parse"),
            LogicExpr::parse("[0] AND NOT [1]").expect("parse")
        );
    }

    #[test]
    fn test_malformed_formulas_name_the_offending_token() {
        let err = LogicExpr::parse("[0] AND").unwrap_err();
        assert!(err.to_string().contains("unexpected end of formula"), "{err}");

        let err = LogicExpr::parse("[0] [1]").unwrap_err();
        assert!(err.to_string().contains("slot reference '[1]'"), "{err}");

        let err = LogicExpr::parse("([0] OR [1]").unwrap_err();
        assert!(err.to_string().contains("unclosed '('"), "{err}");

        let err = LogicExpr::parse("[0] NAND [1]").unwrap_err();
        assert!(err.to_string().contains("unknown keyword 'NAND'"), "{err}");

        let err = LogicExpr::parse("[x]").unwrap_err();
        assert!(err.to_string().contains("invalid slot reference '[x]'"), "{err}");

        let err = LogicExpr::parse("[0").unwrap_err();
        assert!(err.to_string().contains("unterminated slot reference"), "{err}");
    }

    #[test]
    fn test_slot_collection_walks_the_whole_tree() {
        let expr = LogicExpr::parse("NOT ([3] OR [1]) AND [0] XOR [3]").expect("parse");
        assert_eq!(expr.slots(), BTreeSet::from([0, 1, 3]));
    }

    #[test]
    fn test_default_logic_shapes() {
        assert_eq!(LogicExpr::default_over([]), None);
        assert_eq!(LogicExpr::default_over([4]), Some(slot(4)));
        assert_eq!(
            LogicExpr::default_over([0, 2]),
            Some(LogicExpr::And(vec![slot(0), slot(2)]))
        );
    }

    #[test]
    fn test_evaluation_reads_live_slot_state() {
        let registry = FixtureRegistry::new("geo");
        registry.add_variant("a/on", true);
        registry.add_variant("b/on", false);
        let scope = Scope::local(&registry);
        let dependees = BTreeMap::from([
            (0, VariantAddress::local_variant("a/on")),
            (1, VariantAddress::local_variant("b/on")),
        ]);

        let and = LogicExpr::parse("[0] AND [1]").expect("parse");
        let or = LogicExpr::parse("[0] OR [1]").expect("parse");
        let xor = LogicExpr::parse("[0] XOR [1]").expect("parse");
        let not = LogicExpr::parse("NOT [1]").expect("parse");
        assert!(!and.evaluate(scope, &dependees));
        assert!(or.evaluate(scope, &dependees));
        assert!(xor.evaluate(scope, &dependees));
        assert!(not.evaluate(scope, &dependees));

        registry.set_variant_active("b/on", true);
        assert!(and.evaluate(scope, &dependees));
        assert!(!xor.evaluate(scope, &dependees));
        assert!(!not.evaluate(scope, &dependees));
    }
}
