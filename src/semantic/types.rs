//! Data types and operator typing rules
//!
//! Conso has no implicit conversions between declared types. The only mixing
//! allowed is `nt`/`dbl` arithmetic and comparison, which widens to `dbl`.

use crate::lexer::TokenKind;
use std::fmt;

/// The type of a symbol or of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Double,
    Bool,
    Char,
    Str,
    Void,
    /// An instance of the named struct type
    Struct(String),
}

impl DataType {
    /// Map a type keyword (`nt`, `dbl`, ..., `vd`) to its type.
    pub fn from_keyword(kind: TokenKind) -> Option<DataType> {
        match kind {
            TokenKind::Int => Some(DataType::Int),
            TokenKind::Double => Some(DataType::Double),
            TokenKind::Bool => Some(DataType::Bool),
            TokenKind::Char => Some(DataType::Char),
            TokenKind::Str => Some(DataType::Str),
            TokenKind::Void => Some(DataType::Void),
            _ => None,
        }
    }

    /// Type of a literal token. `nll` has no type.
    pub fn of_literal(kind: TokenKind) -> Option<DataType> {
        match kind {
            TokenKind::IntLit | TokenKind::NegIntLit => Some(DataType::Int),
            TokenKind::DoubleLit | TokenKind::NegDoubleLit => Some(DataType::Double),
            TokenKind::StringLit => Some(DataType::Str),
            TokenKind::CharLit => Some(DataType::Char),
            TokenKind::BoolLit => Some(DataType::Bool),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Double)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataType::Void | DataType::Struct(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "nt"),
            DataType::Double => write!(f, "dbl"),
            DataType::Bool => write!(f, "bln"),
            DataType::Char => write!(f, "chr"),
            DataType::Str => write!(f, "strng"),
            DataType::Void => write!(f, "vd"),
            DataType::Struct(name) => write!(f, "{name}"),
        }
    }
}

/// Binary operators that may appear inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_kind(kind: TokenKind) -> Option<BinaryOperator> {
        Some(match kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Mod,
            TokenKind::Concat => BinaryOperator::Concat,
            TokenKind::EqEq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::AndAnd => BinaryOperator::And,
            TokenKind::OrOr => BinaryOperator::Or,
            _ => return None,
        })
    }

    /// The arithmetic operator behind a shortcut assignment (`+=` -> `+`).
    pub fn from_compound(kind: TokenKind) -> Option<BinaryOperator> {
        Some(match kind {
            TokenKind::PlusAssign => BinaryOperator::Add,
            TokenKind::MinusAssign => BinaryOperator::Sub,
            TokenKind::StarAssign => BinaryOperator::Mul,
            TokenKind::SlashAssign => BinaryOperator::Div,
            TokenKind::PercentAssign => BinaryOperator::Mod,
            _ => return None,
        })
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq | BinaryOperator::NotEq => 3,
            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::LtEq | BinaryOperator::GtEq => 4,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Concat => 5,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Concat => "`",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    pub fn is_division(self) -> bool {
        matches!(self, BinaryOperator::Div | BinaryOperator::Mod)
    }

    /// Result type of `left op right`, or `None` when the operands do not fit.
    pub fn result_type(self, left: &DataType, right: &DataType) -> Option<DataType> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => {
                if !left.is_numeric() || !right.is_numeric() {
                    return None;
                }
                if *left == DataType::Double || *right == DataType::Double {
                    Some(DataType::Double)
                } else {
                    Some(DataType::Int)
                }
            }
            BinaryOperator::Concat => {
                (*left == DataType::Str && *right == DataType::Str).then_some(DataType::Str)
            }
            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::LtEq | BinaryOperator::GtEq => {
                (left.is_numeric() && right.is_numeric()).then_some(DataType::Bool)
            }
            BinaryOperator::Eq | BinaryOperator::NotEq => {
                let comparable = (left.is_numeric() && right.is_numeric())
                    || (left == right && left.is_primitive());
                comparable.then_some(DataType::Bool)
            }
            BinaryOperator::And | BinaryOperator::Or => {
                (*left == DataType::Bool && *right == DataType::Bool).then_some(DataType::Bool)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_widens_to_double() {
        let op = BinaryOperator::Add;
        assert_eq!(op.result_type(&DataType::Int, &DataType::Int), Some(DataType::Int));
        assert_eq!(
            op.result_type(&DataType::Int, &DataType::Double),
            Some(DataType::Double)
        );
        assert_eq!(op.result_type(&DataType::Int, &DataType::Str), None);
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(
            BinaryOperator::Lt.result_type(&DataType::Double, &DataType::Int),
            Some(DataType::Bool)
        );
        assert_eq!(BinaryOperator::Lt.result_type(&DataType::Char, &DataType::Char), None);
        assert_eq!(
            BinaryOperator::Eq.result_type(&DataType::Char, &DataType::Char),
            Some(DataType::Bool)
        );
        assert_eq!(BinaryOperator::Eq.result_type(&DataType::Str, &DataType::Int), None);
        assert_eq!(BinaryOperator::And.result_type(&DataType::Int, &DataType::Bool), None);
    }

    #[test]
    fn test_concat_only_strings() {
        assert_eq!(
            BinaryOperator::Concat.result_type(&DataType::Str, &DataType::Str),
            Some(DataType::Str)
        );
        assert_eq!(BinaryOperator::Concat.result_type(&DataType::Str, &DataType::Char), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Add.precedence() > BinaryOperator::Lt.precedence());
        assert!(BinaryOperator::Eq.precedence() > BinaryOperator::And.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
    }

    #[test]
    fn test_display_uses_keywords() {
        assert_eq!(DataType::Str.to_string(), "strng");
        assert_eq!(DataType::Struct("Point".into()).to_string(), "Point");
        assert_eq!(DataType::from_keyword(TokenKind::Void), Some(DataType::Void));
        assert_eq!(DataType::of_literal(TokenKind::NegDoubleLit), Some(DataType::Double));
        assert_eq!(DataType::of_literal(TokenKind::Null), None);
    }
}
