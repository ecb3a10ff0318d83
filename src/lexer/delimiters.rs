//! Legal follow characters per token kind.
//!
//! After the scanner recognizes a token it peeks at the next character and
//! asks [`is_legal_follow`] whether that character may appear directly after
//! the token. Whitespace, end of input and a comment marker are always legal.

use super::token::TokenKind;

/// Characters that close an operand context.
fn is_closer(c: char) -> bool {
    matches!(c, ';' | ',' | ')' | ']' | '}' | ':')
}

/// First characters of any binary, relational, logical or assignment operator.
fn is_operator_start(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '`'
    )
}

/// First characters of anything that can begin an operand.
fn is_operand_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '(' | '~' | '"' | '\'' | '!' | '+' | '-')
}

/// What may follow a complete operand (identifier, literal, closing bracket).
fn after_operand(c: char) -> bool {
    is_closer(c) || is_operator_start(c)
}

/// Returns `true` when `next` may directly follow a token of `kind`.
pub fn is_legal_follow(kind: TokenKind, next: Option<char>) -> bool {
    let c = match next {
        None => return true,
        Some(c) if c.is_whitespace() || c == '#' => return true,
        Some(c) => c,
    };

    use TokenKind::*;
    match kind {
        Int | Double | Str | Bool | Char | Void | Const | Function | Struct | DefStruct => false,
        If | ElseIf | While | Switch | For | Print | Input | Main => c == '(',
        Else | Do => c == '{',
        Case => c.is_ascii_digit() || c == '~' || c == '\'',
        Default => c == ':',
        Break | Continue | End => c == ';',
        Return => c.is_ascii_digit() || matches!(c, ';' | '(' | '"' | '\'' | '~' | '!'),

        IntLit | NegIntLit | DoubleLit | NegDoubleLit | StringLit | CharLit | BoolLit
        | Null => after_operand(c),
        Identifier => after_operand(c) || matches!(c, '(' | '[' | '.' | '{'),
        Increment | Decrement => after_operand(c) || c.is_ascii_alphabetic(),

        Assign | Comma => is_operand_start(c) || c == '{',
        Plus | Minus | Star | Slash | Percent | Power | Concat | PlusAssign | MinusAssign
        | StarAssign | SlashAssign | PercentAssign | EqEq | NotEq | Lt | Gt | LtEq | GtEq
        | AndAnd | OrOr | Not => is_operand_start(c),

        LParen => is_operand_start(c) || c == ')',
        RParen => after_operand(c) || c == '{',
        LBracket => c.is_ascii_alphanumeric() || matches!(c, '~' | '(' | '+' | '-'),
        RBracket => after_operand(c) || c == '[',
        Dot => c.is_ascii_alphabetic(),

        LBrace | RBrace | Semicolon | Colon | Eof => true,
    }
}
