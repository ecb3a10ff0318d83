//! Token kinds, tokens and the reserved-word table.

use std::fmt;

/// A 1-based line/column position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Terminal classes produced by the scanner.
///
/// The surface spelling of each kind (see [`TokenKind::as_str`]) is what the
/// grammar table and every diagnostic use, so `TokenKind::Int` prints as `nt`
/// and `TokenKind::NegIntLit` as `~ntlit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Type keywords
    Int,
    Double,
    Str,
    Bool,
    Char,
    Void,

    // Control keywords
    If,
    Else,
    ElseIf,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,

    // Declaration keywords
    Function,
    Const,
    Struct,
    DefStruct,

    // Entry point, body terminator and I/O
    Main,
    End,
    Print,
    Input,
    Null,

    Identifier,

    // Literals
    IntLit,
    NegIntLit,
    DoubleLit,
    NegDoubleLit,
    StringLit,
    CharLit,
    BoolLit,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Concat,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,

    // Increment/Decrement
    Increment,
    Decrement,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical
    AndAnd,
    OrOr,
    Not,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,

    Eof,
}

impl TokenKind {
    /// Surface spelling used by the grammar and in diagnostics.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Int => "nt",
            Double => "dbl",
            Str => "strng",
            Bool => "bln",
            Char => "chr",
            Void => "vd",
            If => "f",
            Else => "ls",
            ElseIf => "lsf",
            Switch => "swtch",
            Case => "cs",
            Default => "dflt",
            For => "fr",
            While => "whl",
            Do => "d",
            Break => "brk",
            Continue => "cntn",
            Return => "rtrn",
            Function => "fnctn",
            Const => "cnst",
            Struct => "strct",
            DefStruct => "dfstrct",
            Main => "mn",
            End => "end",
            Print => "prnt",
            Input => "npt",
            Null => "nll",
            Identifier => "id",
            IntLit => "ntlit",
            NegIntLit => "~ntlit",
            DoubleLit => "dbllit",
            NegDoubleLit => "~dbllit",
            StringLit => "strnglit",
            CharLit => "chrlit",
            BoolLit => "blnlit",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Power => "**",
            Concat => "`",
            Assign => "=",
            PlusAssign => "+=",
            MinusAssign => "-=",
            StarAssign => "*=",
            SlashAssign => "/=",
            PercentAssign => "%=",
            Increment => "++",
            Decrement => "--",
            EqEq => "==",
            NotEq => "!=",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            AndAnd => "&&",
            OrOr => "||",
            Not => "!",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Colon => ":",
            Dot => ".",
            Eof => "EOF",
        }
    }

    /// True for the five primitive type keywords.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Double
                | TokenKind::Str
                | TokenKind::Bool
                | TokenKind::Char
        )
    }

    pub fn is_keyword(self) -> bool {
        self != TokenKind::BoolLit && KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved words, looked up case-sensitively.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("npt", TokenKind::Input),
    ("prnt", TokenKind::Print),
    ("nt", TokenKind::Int),
    ("dbl", TokenKind::Double),
    ("strng", TokenKind::Str),
    ("bln", TokenKind::Bool),
    ("chr", TokenKind::Char),
    ("f", TokenKind::If),
    ("ls", TokenKind::Else),
    ("lsf", TokenKind::ElseIf),
    ("swtch", TokenKind::Switch),
    ("fr", TokenKind::For),
    ("whl", TokenKind::While),
    ("d", TokenKind::Do),
    ("mn", TokenKind::Main),
    ("cs", TokenKind::Case),
    ("dflt", TokenKind::Default),
    ("brk", TokenKind::Break),
    ("cnst", TokenKind::Const),
    ("tr", TokenKind::BoolLit),
    ("fls", TokenKind::BoolLit),
    ("fnctn", TokenKind::Function),
    ("rtrn", TokenKind::Return),
    ("end", TokenKind::End),
    ("nll", TokenKind::Null),
    ("cntn", TokenKind::Continue),
    ("strct", TokenKind::Struct),
    ("dfstrct", TokenKind::DefStruct),
    ("vd", TokenKind::Void),
];

/// Resolve a scanned word to its reserved kind, if it is one.
pub fn keyword(word: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == word)
        .map(|(_, kind)| *kind)
}

/// A scanned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "EOF", location)
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<20} {}:{}",
            self.kind.as_str(),
            self.lexeme,
            self.location.line,
            self.location.column
        )
    }
}
