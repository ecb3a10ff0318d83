//! Scanner for Conso source text
//!
//! Converts raw source text into a flat [`Token`] sequence. The scanner never
//! aborts: every problem is recorded as a [`LexError`] and scanning resumes
//! after the offending lexeme. Tokens whose position coincides with a recorded
//! error are removed before the sequence is returned, so the parser and the
//! analyzer only ever see clean tokens. The sequence always ends with one
//! [`TokenKind::Eof`] sentinel.

use super::delimiters::is_legal_follow;
use super::token::{keyword, SourceLocation, Token, TokenKind};
use log::debug;
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Default identifier length limit.
pub const MAX_IDENTIFIER_LEN: usize = 16;
const MAX_INTEGER_DIGITS: usize = 16;
const MAX_FRACTION_DIGITS: usize = 8;

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("Illegal character: '{0}'")]
    IllegalCharacter(char),

    #[error("Invalid delimiter '{found}' after '{after}'")]
    InvalidDelimiter { found: char, after: String },

    #[error("Identifier '{0}' must start with a letter")]
    IdentifierStart(String),

    #[error("Identifier '{name}' exceeds maximum length of {limit} characters")]
    IdentifierTooLong { name: String, limit: usize },

    #[error("Invalid identifier starting with a number: '{0}'")]
    IdentifierStartsWithDigit(String),

    #[error("Integer exceeds maximum length of 16 digits")]
    IntegerTooLong,

    #[error("Double's whole number part exceeds 16 digits")]
    WholePartTooLong,

    #[error("Double's decimal part must be between 1 and 8 digits")]
    FractionLength,

    #[error("Missing digits after decimal point")]
    MissingFraction,

    #[error("Invalid number format: multiple decimal points")]
    MultipleDecimalPoints,

    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Invalid escape sequence '\\{escape}' in {context} literal")]
    InvalidEscape { escape: char, context: &'static str },

    #[error("Empty character literal")]
    EmptyCharacter,

    #[error("Character literal must contain exactly one character")]
    CharacterTooLong,

    #[error("Unterminated character literal")]
    UnterminatedCharacter,
}

/// A lexical diagnostic at a source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexical Error at line {}, column {}: {kind}", .location.line, .location.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

impl LexError {
    pub fn new(kind: LexErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Everything the scanner produced for one source text.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scan `source` with the default identifier limit.
pub fn tokenize(source: &str) -> LexOutput {
    Lexer::new(source).tokenize()
}

/// Character-level scanner over one source text.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    max_identifier_len: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            max_identifier_len: MAX_IDENTIFIER_LEN,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_max_identifier_len(mut self, limit: usize) -> Self {
        self.max_identifier_len = limit;
        self
    }

    /// Tokenize the entire input.
    pub fn tokenize(mut self) -> LexOutput {
        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            if self.peek() == Some('#') {
                self.skip_comment();
                continue;
            }

            let produced_before = self.tokens.len();
            self.next_token();

            // Only the last token of a group (e.g. `++ +`) is checked.
            if self.tokens.len() > produced_before {
                self.check_delimiter();
            }
        }

        let eof = Token::eof(self.current_location());
        let mut tokens = self.tokens;
        let errors = self.errors;

        let error_positions: FxHashSet<SourceLocation> =
            errors.iter().map(|e| e.location).collect();
        tokens.retain(|t| !error_positions.contains(&t.location));
        tokens.push(eof);

        debug!(
            "scanned {} tokens with {} lexical errors",
            tokens.len(),
            errors.len()
        );

        LexOutput { tokens, errors }
    }

    /// Scan one lexeme starting at the current character.
    fn next_token(&mut self) {
        let loc = self.current_location();
        let Some(ch) = self.peek() else {
            return;
        };

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => self.number_literal(loc, false),
            '~' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                self.number_literal(loc, true);
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(loc),
            '+' => self.sign_run('+', TokenKind::Plus, TokenKind::Increment, TokenKind::PlusAssign),
            '-' => self.sign_run('-', TokenKind::Minus, TokenKind::Decrement, TokenKind::MinusAssign),
            '*' => {
                self.advance();
                if self.match_char('*') {
                    self.push(TokenKind::Power, "**", loc);
                } else if self.match_char('=') {
                    self.push(TokenKind::StarAssign, "*=", loc);
                } else {
                    self.push(TokenKind::Star, "*", loc);
                }
            }
            '/' => self.one_or_two(loc, TokenKind::Slash, '=', TokenKind::SlashAssign),
            '%' => self.one_or_two(loc, TokenKind::Percent, '=', TokenKind::PercentAssign),
            '=' => self.one_or_two(loc, TokenKind::Assign, '=', TokenKind::EqEq),
            '!' => self.one_or_two(loc, TokenKind::Not, '=', TokenKind::NotEq),
            '<' => self.one_or_two(loc, TokenKind::Lt, '=', TokenKind::LtEq),
            '>' => self.one_or_two(loc, TokenKind::Gt, '=', TokenKind::GtEq),
            '&' | '|' => {
                self.advance();
                if self.match_char(ch) {
                    let kind = if ch == '&' {
                        TokenKind::AndAnd
                    } else {
                        TokenKind::OrOr
                    };
                    self.push(kind, kind.as_str(), loc);
                } else {
                    self.error(LexErrorKind::IllegalCharacter(ch), loc);
                }
            }
            '(' | ')' | '{' | '}' | '[' | ']' | ';' | ',' | ':' | '.' | '`' => {
                self.advance();
                let kind = match ch {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    '.' => TokenKind::Dot,
                    _ => TokenKind::Concat,
                };
                self.push(kind, ch.to_string(), loc);
            }
            _ => {
                self.advance();
                self.error(LexErrorKind::IllegalCharacter(ch), loc);
            }
        }
    }

    /// `c` or `c` followed by `second`.
    fn one_or_two(&mut self, loc: SourceLocation, single: TokenKind, second: char, double: TokenKind) {
        self.advance();
        if self.match_char(second) {
            self.push(double, double.as_str(), loc);
        } else {
            self.push(single, single.as_str(), loc);
        }
    }

    /// Runs of `+` or `-`: a single sign may pair with `=`, longer runs split
    /// into increments with at most one trailing single sign.
    fn sign_run(&mut self, sign: char, single: TokenKind, pair: TokenKind, assign: TokenKind) {
        let mut run = Vec::new();
        while self.peek() == Some(sign) {
            run.push(self.current_location());
            self.advance();
        }

        if run.len() == 1 {
            if self.match_char('=') {
                self.push(assign, assign.as_str(), run[0]);
            } else {
                self.push(single, single.as_str(), run[0]);
            }
            return;
        }

        let groups: Vec<usize> = match run.len() {
            3 => vec![2, 1],
            5 => vec![2, 1, 2],
            n => {
                let mut g = vec![2; n / 2];
                if n % 2 == 1 {
                    g.push(1);
                }
                g
            }
        };

        let mut offset = 0;
        for width in groups {
            let kind = if width == 2 { pair } else { single };
            self.push(kind, kind.as_str(), run[offset]);
            offset += width;
        }
    }

    fn identifier_or_keyword(&mut self, loc: SourceLocation) {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if word.starts_with('_') {
            self.error(LexErrorKind::IdentifierStart(word), loc);
            return;
        }

        if let Some(kind) = keyword(&word) {
            self.push(kind, word, loc);
            return;
        }

        if word.chars().count() > self.max_identifier_len {
            self.error(
                LexErrorKind::IdentifierTooLong {
                    name: word,
                    limit: self.max_identifier_len,
                },
                loc,
            );
            return;
        }

        self.push(TokenKind::Identifier, word, loc);
    }

    /// Maximal-munch numeric literal. The `~` marker, if any, is already consumed.
    fn number_literal(&mut self, loc: SourceLocation, negative: bool) {
        let mut whole = String::new();
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
            whole.push(ch);
            self.advance();
        }

        let mut fraction = None;
        if self.peek() == Some('.') {
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
                digits.push(ch);
                self.advance();
            }
            fraction = Some(digits);

            if self.peek() == Some('.') {
                self.skip_number_tail();
                self.error(LexErrorKind::MultipleDecimalPoints, loc);
                return;
            }
        }

        if self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
            let mut run = String::new();
            if negative {
                run.push('~');
            }
            run.push_str(&whole);
            if let Some(digits) = &fraction {
                run.push('.');
                run.push_str(digits);
            }
            while let Some(ch) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
                run.push(ch);
                self.advance();
            }
            self.error(LexErrorKind::IdentifierStartsWithDigit(run), loc);
            return;
        }

        let result = match fraction {
            None => normalize_integer(&whole, negative),
            Some(digits) => normalize_double(&whole, &digits, negative),
        };
        match result {
            Ok((kind, lexeme)) => self.push(kind, lexeme, loc),
            Err(kind) => self.error(kind, loc),
        }
    }

    fn skip_number_tail(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_') {
            self.advance();
        }
    }

    fn string_literal(&mut self, loc: SourceLocation) {
        self.advance(); // opening quote
        let mut body = String::new();
        let mut bad_escape = None;

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error(LexErrorKind::UnterminatedString, loc);
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(esc @ ('"' | '\\' | 'n' | 't' | 'r')) => {
                            body.push('\\');
                            body.push(esc);
                            self.advance();
                        }
                        Some('\n') | None => {}
                        Some(other) => {
                            bad_escape.get_or_insert(other);
                            self.advance();
                        }
                    }
                }
                Some(ch) => {
                    body.push(ch);
                    self.advance();
                }
            }
        }

        match bad_escape {
            Some(escape) => self.error(
                LexErrorKind::InvalidEscape {
                    escape,
                    context: "string",
                },
                loc,
            ),
            None => self.push(TokenKind::StringLit, body, loc),
        }
    }

    fn char_literal(&mut self, loc: SourceLocation) {
        self.advance(); // opening quote
        let value = match self.peek() {
            None | Some('\n') => {
                self.error(LexErrorKind::UnterminatedCharacter, loc);
                return;
            }
            Some('\'') => {
                self.advance();
                self.error(LexErrorKind::EmptyCharacter, loc);
                return;
            }
            Some('\\') => {
                self.advance();
                match self.peek() {
                    Some(esc @ ('\'' | '\\' | 'n' | 't' | 'r')) => {
                        self.advance();
                        format!("\\{esc}")
                    }
                    Some(other) if other != '\n' => {
                        self.advance();
                        self.skip_to_closing_quote();
                        self.error(
                            LexErrorKind::InvalidEscape {
                                escape: other,
                                context: "character",
                            },
                            loc,
                        );
                        return;
                    }
                    _ => {
                        self.error(LexErrorKind::UnterminatedCharacter, loc);
                        return;
                    }
                }
            }
            Some(ch) => {
                self.advance();
                ch.to_string()
            }
        };

        if self.match_char('\'') {
            self.push(TokenKind::CharLit, value, loc);
        } else if self.skip_to_closing_quote() {
            self.error(LexErrorKind::CharacterTooLong, loc);
        } else {
            self.error(LexErrorKind::UnterminatedCharacter, loc);
        }
    }

    /// Consume through the next `'` on the current line. Returns `false` (and
    /// consumes nothing) when there is none.
    fn skip_to_closing_quote(&mut self) -> bool {
        let rest = &self.input[self.position..];
        let Some(offset) = rest.iter().take_while(|c| **c != '\n').position(|c| *c == '\'') else {
            return false;
        };
        for _ in 0..=offset {
            self.advance();
        }
        true
    }

    fn check_delimiter(&mut self) {
        let Some(last) = self.tokens.last() else {
            return;
        };
        let next = self.peek();
        if is_legal_follow(last.kind, next) {
            return;
        }
        if let Some(found) = next {
            let after = last.lexeme.clone();
            let loc = self.current_location();
            self.error(LexErrorKind::InvalidDelimiter { found, after }, loc);
        }
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, loc: SourceLocation) {
        self.tokens.push(Token::new(kind, lexeme, loc));
    }

    fn error(&mut self, kind: LexErrorKind, loc: SourceLocation) {
        self.errors.push(LexError::new(kind, loc));
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Skip a `#` comment up to (not including) the newline.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Strip leading zeros; negative zero collapses to the plain literal.
fn normalize_integer(digits: &str, negative: bool) -> Result<(TokenKind, String), LexErrorKind> {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.len() > MAX_INTEGER_DIGITS {
        return Err(LexErrorKind::IntegerTooLong);
    }
    if trimmed.is_empty() {
        return Ok((TokenKind::IntLit, "0".to_string()));
    }
    if negative {
        Ok((TokenKind::NegIntLit, format!("-{trimmed}")))
    } else {
        Ok((TokenKind::IntLit, trimmed.to_string()))
    }
}

/// Normalize `whole.fraction`: no leading zeros in the whole part, no trailing
/// zeros in the fraction, and at least two fractional digits.
fn normalize_double(
    whole: &str,
    fraction: &str,
    negative: bool,
) -> Result<(TokenKind, String), LexErrorKind> {
    if fraction.is_empty() {
        return Err(LexErrorKind::MissingFraction);
    }

    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        w => w,
    };
    if whole.len() > MAX_INTEGER_DIGITS {
        return Err(LexErrorKind::WholePartTooLong);
    }

    let significant = fraction.trim_end_matches('0');
    if significant.len() > MAX_FRACTION_DIGITS {
        return Err(LexErrorKind::FractionLength);
    }
    let fraction = format!("{significant:0<2}");

    let is_zero = whole == "0" && significant.is_empty();
    if negative && !is_zero {
        Ok((TokenKind::NegDoubleLit, format!("-{whole}.{fraction}")))
    } else {
        Ok((TokenKind::DoubleLit, format!("{whole}.{fraction}")))
    }
}
