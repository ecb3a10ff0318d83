//! The LL(1) production table for Conso
//!
//! Nonterminals are named with angle brackets (`<statement>`), terminals are
//! [`TokenKind`]s. The table maps `(nonterminal, lookahead)` to one ordered
//! right-hand side; an empty right-hand side is the empty production. It is
//! built once on first use and shared read-only afterwards.

use crate::lexer::TokenKind;
use log::debug;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

/// Start symbol of every parse.
pub const START_SYMBOL: &str = "<program>";

/// One symbol on a right-hand side or on the parse stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarSymbol {
    Terminal(TokenKind),
    NonTerminal(&'static str),
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSymbol::Terminal(kind) => f.write_str(kind.as_str()),
            GrammarSymbol::NonTerminal(name) => f.write_str(name),
        }
    }
}

/// Right-hand side builder: string literals are nonterminals, identifiers
/// name [`TokenKind`] variants.
macro_rules! rhs {
    (@one $t:ident) => { GrammarSymbol::Terminal(TokenKind::$t) };
    (@one $nt:literal) => { GrammarSymbol::NonTerminal($nt) };
    () => { Vec::<GrammarSymbol>::new() };
    ($($sym:tt)+) => { vec![$(rhs!(@one $sym)),+] };
}

/// Lookahead set builder.
macro_rules! on {
    ($($t:ident)+) => { &[$(TokenKind::$t),+] };
}

type Row = FxHashMap<TokenKind, Vec<GrammarSymbol>>;

/// The production table.
#[derive(Debug)]
pub struct Grammar {
    table: FxHashMap<&'static str, Row>,
}

impl Grammar {
    /// The shared table, built on first use.
    pub fn get() -> &'static Grammar {
        static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
        GRAMMAR.get_or_init(|| {
            let grammar = build();
            debug!(
                "LL(1) table built: {} nonterminals, {} entries",
                grammar.nonterminal_count(),
                grammar.entry_count()
            );
            grammar
        })
    }

    /// The production for `(nonterminal, lookahead)`, if any. An empty slice is
    /// the empty production.
    pub fn production(&self, nonterminal: &str, lookahead: TokenKind) -> Option<&[GrammarSymbol]> {
        self.table
            .get(nonterminal)
            .and_then(|row| row.get(&lookahead))
            .map(Vec::as_slice)
    }

    /// Every lookahead with an entry for `nonterminal`, sorted by spelling.
    pub fn expected(&self, nonterminal: &str) -> Vec<TokenKind> {
        let mut kinds: Vec<TokenKind> = self
            .table
            .get(nonterminal)
            .map(|row| row.keys().copied().collect())
            .unwrap_or_default();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn nonterminal_count(&self) -> usize {
        self.table.len()
    }

    /// Number of distinct `(nonterminal, lookahead)` entries.
    pub fn entry_count(&self) -> usize {
        self.table.values().map(|row| row.len()).sum()
    }
}

struct Builder {
    table: FxHashMap<&'static str, Row>,
}

impl Builder {
    /// Register `rhs` for every lookahead in `set`. A later entry for the same
    /// pair replaces the earlier one.
    fn add(&mut self, set: &[TokenKind], lhs: &'static str, rhs: Vec<GrammarSymbol>) {
        let row = self.table.entry(lhs).or_default();
        for kind in set {
            row.insert(*kind, rhs.clone());
        }
    }
}

fn build() -> Grammar {
    let mut g = Builder {
        table: FxHashMap::default(),
    };

    program(&mut g);
    expressions(&mut g);
    arrays(&mut g);
    constants(&mut g);
    structs_and_functions(&mut g);
    statements(&mut g);

    Grammar { table: g.table }
}

/// Terminals that may begin a full expression.
const EXPRESSION_START: &[TokenKind] = &[
    TokenKind::LParen,
    TokenKind::DoubleLit,
    TokenKind::NegDoubleLit,
    TokenKind::IntLit,
    TokenKind::NegIntLit,
    TokenKind::Increment,
    TokenKind::Decrement,
    TokenKind::Identifier,
    TokenKind::CharLit,
    TokenKind::Not,
    TokenKind::StringLit,
    TokenKind::BoolLit,
];

/// Terminals that may begin a statement (besides declarations).
const STATEMENT_START: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::Increment,
    TokenKind::Decrement,
    TokenKind::Print,
    TokenKind::If,
    TokenKind::Switch,
    TokenKind::For,
    TokenKind::Do,
    TokenKind::While,
    TokenKind::Return,
    TokenKind::Break,
    TokenKind::Continue,
];

const DATA_TYPES: &[TokenKind] = &[
    TokenKind::Int,
    TokenKind::Double,
    TokenKind::Bool,
    TokenKind::Char,
    TokenKind::Str,
];

const OPERAND_FOLLOW: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Percent,
    TokenKind::Comma,
    TokenKind::Semicolon,
    TokenKind::RParen,
    TokenKind::RBracket,
    TokenKind::AndAnd,
    TokenKind::OrOr,
    TokenKind::EqEq,
    TokenKind::NotEq,
    TokenKind::LtEq,
    TokenKind::GtEq,
    TokenKind::Lt,
    TokenKind::Gt,
];

fn with(base: &[TokenKind], extra: &[TokenKind]) -> Vec<TokenKind> {
    base.iter().chain(extra).copied().collect()
}

fn program(g: &mut Builder) {
    g.add(
        on![Int Double Bool Char Str Const DefStruct Struct Function Main],
        "<program>",
        rhs!["<global_declaration>" "<function_definition>" Main LParen RParen LBrace
             "<declaration>" "<statement>" End Semicolon RBrace],
    );

    g.add(on![Struct], "<global_declaration>", rhs!["<strct_declaration>" "<global_declaration>"]);
    g.add(DATA_TYPES, "<global_declaration>", rhs!["<var_dec>" Semicolon "<global_declaration>"]);
    g.add(on![Const], "<global_declaration>", rhs!["<cnst_dec>" Semicolon "<global_declaration>"]);
    g.add(
        on![DefStruct],
        "<global_declaration>",
        rhs![DefStruct Identifier Identifier "<strct_init_next>" Semicolon "<global_declaration>"],
    );
    g.add(on![Function Main], "<global_declaration>", rhs![]);

    g.add(on![Const], "<declaration>", rhs!["<cnst_dec>" Semicolon "<declaration>"]);
    g.add(
        on![DefStruct],
        "<declaration>",
        rhs![DefStruct Identifier Identifier "<strct_init_next>" Semicolon "<declaration>"],
    );
    g.add(DATA_TYPES, "<declaration>", rhs!["<var_dec>" Semicolon "<declaration>"]);
    g.add(&with(STATEMENT_START, on![End]), "<declaration>", rhs![]);

    g.add(on![Int], "<var_dec>", rhs![Int Identifier "<nt_value>" "<nt_value_next>"]);
    g.add(on![Double], "<var_dec>", rhs![Double Identifier "<dbl_value>" "<dbl_value_next>"]);
    g.add(on![Bool], "<var_dec>", rhs![Bool Identifier "<bln_value>" "<bln_value_next>"]);
    g.add(on![Char], "<var_dec>", rhs![Char Identifier "<chr_value>" "<chr_value_next>"]);
    g.add(on![Str], "<var_dec>", rhs![Str Identifier "<str_value>" "<str_value_next>"]);

    g.add(on![Assign], "<nt_value>", rhs![Assign "<arithmetic_nt>"]);
    g.add(on![LBracket], "<nt_value>", rhs!["<nt_array_dec>"]);
    g.add(on![Comma Semicolon], "<nt_value>", rhs![]);
    g.add(on![Comma], "<nt_value_next>", rhs![Comma Identifier "<nt_value>" "<nt_value_next>"]);
    g.add(on![Semicolon], "<nt_value_next>", rhs![]);

    g.add(on![Assign], "<dbl_value>", rhs![Assign "<arithmetic>"]);
    g.add(on![LBracket], "<dbl_value>", rhs!["<dbl_array_dec>"]);
    g.add(on![Comma Semicolon], "<dbl_value>", rhs![]);
    g.add(on![Comma], "<dbl_value_next>", rhs![Comma Identifier "<dbl_value>" "<dbl_value_next>"]);
    g.add(on![Semicolon], "<dbl_value_next>", rhs![]);

    g.add(on![Assign], "<bln_value>", rhs![Assign "<equals_bln_val>"]);
    g.add(on![LBracket], "<bln_value>", rhs!["<bln_array_dec>"]);
    g.add(on![Comma Semicolon], "<bln_value>", rhs![]);
    g.add(EXPRESSION_START, "<equals_bln_val>", rhs!["<rel_arith_logic_expr>"]);
    g.add(on![Comma], "<bln_value_next>", rhs![Comma Identifier "<bln_value>" "<bln_value_next>"]);
    g.add(on![Semicolon], "<bln_value_next>", rhs![]);

    g.add(on![Assign], "<chr_value>", rhs![Assign "<equals_chr_val>"]);
    g.add(on![LBracket], "<chr_value>", rhs!["<chr_array_dec>"]);
    g.add(on![Comma Semicolon], "<chr_value>", rhs![]);
    g.add(on![Identifier], "<equals_chr_val>", rhs!["<entities>"]);
    g.add(on![CharLit], "<equals_chr_val>", rhs![CharLit]);
    g.add(on![Comma], "<chr_value_next>", rhs![Comma Identifier "<chr_value>" "<chr_value_next>"]);
    g.add(on![Semicolon], "<chr_value_next>", rhs![]);

    g.add(on![Assign], "<str_value>", rhs![Assign "<equals_str_val>"]);
    g.add(on![LBracket], "<str_value>", rhs!["<str_array_dec>"]);
    g.add(on![Comma Semicolon], "<str_value>", rhs![]);
    g.add(on![Identifier], "<equals_str_val>", rhs!["<entities>"]);
    g.add(on![StringLit], "<equals_str_val>", rhs!["<strng_concat>"]);
    g.add(on![Comma], "<str_value_next>", rhs![Comma Identifier "<str_value>" "<str_value_next>"]);
    g.add(on![Semicolon], "<str_value_next>", rhs![]);
}

fn expressions(g: &mut Builder) {
    // Integer-only arithmetic (initializers, indices, for-loop bounds).
    g.add(
        on![IntLit NegIntLit LParen Increment Decrement Identifier],
        "<arithmetic_nt>",
        rhs!["<nt_math_val>" "<arithmetic_nt_next>"],
    );
    g.add(on![LParen], "<nt_math_val>", rhs![LParen "<arithmetic_nt>" RParen]);
    g.add(on![IntLit NegIntLit], "<nt_math_val>", rhs!["<ntliterals>"]);
    g.add(on![Increment Decrement Identifier], "<nt_math_val>", rhs!["<unary_entities>"]);
    g.add(on![IntLit], "<ntliterals>", rhs![IntLit]);
    g.add(on![NegIntLit], "<ntliterals>", rhs![NegIntLit]);
    g.add(on![DoubleLit], "<dblliterals>", rhs![DoubleLit]);
    g.add(on![NegDoubleLit], "<dblliterals>", rhs![NegDoubleLit]);
    g.add(
        on![Plus Minus Star Slash Percent],
        "<arithmetic_nt_next>",
        rhs!["<arithmetic_operator>" "<nt_math_val>" "<arithmetic_nt_next>"],
    );
    g.add(on![Comma RParen RBracket Semicolon], "<arithmetic_nt_next>", rhs![]);

    g.add(on![Identifier], "<unary_entities>", rhs![Identifier "<unary_next>"]);
    g.add(on![Increment Decrement], "<unary_entities>", rhs!["<unary_inc/dec>" Identifier]);
    g.add(on![Increment Decrement], "<unary_next>", rhs!["<unary_inc/dec>"]);
    g.add(on![LBracket Dot LParen], "<unary_next>", rhs!["<id_entity_next>"]);
    g.add(OPERAND_FOLLOW, "<unary_next>", rhs![]);
    g.add(on![Increment], "<unary_inc/dec>", rhs![Increment]);
    g.add(on![Decrement], "<unary_inc/dec>", rhs![Decrement]);

    g.add(on![Plus], "<arithmetic_operator>", rhs![Plus]);
    g.add(on![Minus], "<arithmetic_operator>", rhs![Minus]);
    g.add(on![Star], "<arithmetic_operator>", rhs![Star]);
    g.add(on![Slash], "<arithmetic_operator>", rhs![Slash]);
    g.add(on![Percent], "<arithmetic_operator>", rhs![Percent]);
    g.add(on![AndAnd], "<logical_operator>", rhs![AndAnd]);
    g.add(on![OrOr], "<logical_operator>", rhs![OrOr]);
    g.add(on![EqEq], "<relational_operator>", rhs![EqEq]);
    g.add(on![NotEq], "<relational_operator>", rhs![NotEq]);
    g.add(on![LtEq], "<relational_operator>", rhs![LtEq]);
    g.add(on![GtEq], "<relational_operator>", rhs![GtEq]);
    g.add(on![Lt], "<relational_operator>", rhs![Lt]);
    g.add(on![Gt], "<relational_operator>", rhs![Gt]);

    // Identifier suffixes: calls, indexing, member access.
    g.add(on![Identifier], "<entities>", rhs![Identifier "<id_entity_next>"]);
    g.add(on![LParen], "<id_entity_next>", rhs!["<function_call>"]);
    g.add(on![LBracket Dot], "<id_entity_next>", rhs!["<id_next>"]);
    g.add(OPERAND_FOLLOW, "<id_entity_next>", rhs![]);
    g.add(on![Identifier], "<id_build>", rhs![Identifier "<id_next>"]);
    g.add(on![LBracket], "<id_next>", rhs!["<array_access>"]);
    g.add(on![Dot], "<id_next>", rhs!["<strct_elem_access>"]);
    let id_next_null = with(
        OPERAND_FOLLOW,
        on![Assign PlusAssign MinusAssign StarAssign SlashAssign],
    );
    g.add(&id_next_null, "<id_next>", rhs![]);
    g.add(on![LBracket], "<array_access>", rhs![LBracket "<index>" RBracket "<index_next>"]);
    g.add(
        on![IntLit NegIntLit LParen Increment Decrement Identifier],
        "<index>",
        rhs!["<arithmetic_nt>"],
    );
    g.add(on![LBracket], "<index_next>", rhs![LBracket "<index>" RBracket]);
    g.add(&id_next_null, "<index_next>", rhs![]);
    g.add(on![Dot], "<strct_elem_access>", rhs![Dot Identifier]);

    g.add(on![LParen], "<function_call>", rhs![LParen "<arguments>" RParen]);
    g.add(EXPRESSION_START, "<arguments>", rhs!["<args_value>" "<args_next>"]);
    g.add(on![RParen], "<arguments>", rhs![]);
    g.add(EXPRESSION_START, "<args_value>", rhs!["<expression>"]);
    g.add(on![Comma], "<args_next>", rhs![Comma "<args_value>" "<args_next>"]);
    g.add(on![RParen], "<args_next>", rhs![]);

    // General expressions: operands joined by any binary operator.
    g.add(EXPRESSION_START, "<expression>", rhs!["<rel_arith_logic_expr>"]);
    g.add(EXPRESSION_START, "<rel_arith_logic_expr>", rhs!["<operands>" "<operand_next>"]);
    g.add(on![LParen], "<operands>", rhs![LParen "<rel_arith_logic_expr>" RParen]);
    g.add(
        on![DoubleLit NegDoubleLit IntLit NegIntLit Increment Decrement Identifier],
        "<operands>",
        rhs!["<math_value>"],
    );
    g.add(on![CharLit], "<operands>", rhs![CharLit]);
    g.add(on![Not], "<operands>", rhs![Not "<operands>"]);
    g.add(on![StringLit], "<operands>", rhs!["<strng_concat>"]);
    g.add(on![BoolLit], "<operands>", rhs![BoolLit]);
    g.add(
        on![Plus Minus Star Slash Percent],
        "<operand_next>",
        rhs!["<arithmetic_operator>" "<rel_arith_logic_expr>"],
    );
    g.add(
        on![EqEq NotEq LtEq GtEq Lt Gt],
        "<operand_next>",
        rhs!["<relational_operator>" "<rel_arith_logic_expr>"],
    );
    g.add(on![AndAnd OrOr], "<operand_next>", rhs!["<logical_operator>" "<rel_arith_logic_expr>"]);
    g.add(on![Comma Semicolon RParen], "<operand_next>", rhs![]);

    // Double arithmetic (no parentheses, as in declarations).
    g.add(
        on![DoubleLit NegDoubleLit IntLit NegIntLit Increment Decrement Identifier],
        "<arithmetic>",
        rhs!["<math_value>" "<arithmetic_next>"],
    );
    g.add(on![DoubleLit NegDoubleLit], "<math_value>", rhs!["<dblliterals>"]);
    g.add(on![IntLit NegIntLit], "<math_value>", rhs!["<ntliterals>"]);
    g.add(on![Increment Decrement Identifier], "<math_value>", rhs!["<unary_entities>"]);
    g.add(on![Plus Minus Star Slash Percent], "<arithmetic_next>", rhs!["<arithmetic_operator>" "<arithmetic>"]);
    g.add(on![Comma Semicolon RParen], "<arithmetic_next>", rhs![]);

    // String concatenation with the backtick operator.
    g.add(on![StringLit], "<strng_concat>", rhs!["<strng_concat_val>" "<strng_concat_next>"]);
    g.add(on![StringLit], "<strng_concat_val>", rhs![StringLit]);
    g.add(on![Concat], "<strng_concat_next>", rhs![Concat "<strng_concat_val>" "<strng_concat_next>"]);
    g.add(
        on![EqEq NotEq LtEq GtEq Lt Gt AndAnd OrOr Plus Minus Star Slash Percent Comma Semicolon RParen],
        "<strng_concat_next>",
        rhs![],
    );
}

fn arrays(g: &mut Builder) {
    g.add(on![IntLit], "<array_size>", rhs![IntLit]);
    g.add(on![Identifier], "<array_size>", rhs![Identifier]);

    // nt
    g.add(on![LBracket], "<nt_array_dec>", rhs![LBracket "<array_size>" RBracket "<nt_array_initializer>"]);
    g.add(on![Assign], "<nt_array_initializer>", rhs![Assign LBrace "<nt_array_elem>" RBrace]);
    g.add(on![LBracket], "<nt_array_initializer>", rhs![LBracket "<array_size>" RBracket "<nt_2d_init>"]);
    g.add(on![Comma Semicolon], "<nt_array_initializer>", rhs![]);
    g.add(on![IntLit NegIntLit], "<nt_array_elem>", rhs!["<nt_array_elem_val>" "<nt_array_init_next>"]);
    g.add(on![IntLit NegIntLit], "<nt_array_elem_val>", rhs!["<ntliterals>"]);
    g.add(on![Comma], "<nt_array_init_next>", rhs![Comma "<nt_array_elem_val>" "<nt_array_init_next>"]);
    g.add(on![RBrace], "<nt_array_init_next>", rhs![]);
    g.add(on![Assign], "<nt_2d_init>", rhs![Assign LBrace "<nt_array2d_elem>" RBrace]);
    g.add(on![Comma Semicolon], "<nt_2d_init>", rhs![]);
    g.add(on![LBrace], "<nt_array2d_elem>", rhs![LBrace "<nt_array_elem>" RBrace "<nt_array_elem_next>"]);
    g.add(on![Comma], "<nt_array_elem_next>", rhs![Comma "<nt_array2d_elem>"]);
    g.add(on![RBrace], "<nt_array_elem_next>", rhs![]);

    // dbl
    g.add(on![LBracket], "<dbl_array_dec>", rhs![LBracket "<array_size>" RBracket "<dbl_array_initializer>"]);
    g.add(on![Assign], "<dbl_array_initializer>", rhs![Assign LBrace "<dbl_array_elem>" RBrace]);
    g.add(on![LBracket], "<dbl_array_initializer>", rhs![LBracket "<array_size>" RBracket "<dbl_2d_init>"]);
    g.add(on![Comma Semicolon], "<dbl_array_initializer>", rhs![]);
    g.add(on![DoubleLit NegDoubleLit], "<dbl_array_elem>", rhs!["<dbl_array_elem_val>" "<dbl_array_init_next>"]);
    g.add(on![DoubleLit NegDoubleLit], "<dbl_array_elem_val>", rhs!["<dblliterals>"]);
    g.add(on![Comma], "<dbl_array_init_next>", rhs![Comma "<dbl_array_elem_val>" "<dbl_array_init_next>"]);
    g.add(on![RBrace], "<dbl_array_init_next>", rhs![]);
    g.add(on![Assign], "<dbl_2d_init>", rhs![Assign LBrace "<dbl_array2d_elem>" RBrace]);
    g.add(on![Comma Semicolon], "<dbl_2d_init>", rhs![]);
    g.add(on![LBrace], "<dbl_array2d_elem>", rhs![LBrace "<dbl_array_elem>" RBrace "<dbl_array_elem_next>"]);
    g.add(on![Comma], "<dbl_array_elem_next>", rhs![Comma "<dbl_array2d_elem>"]);
    g.add(on![RBrace], "<dbl_array_elem_next>", rhs![]);

    // bln
    g.add(on![LBracket], "<bln_array_dec>", rhs![LBracket "<array_size>" RBracket "<bln_array_initializer>"]);
    g.add(on![Assign], "<bln_array_initializer>", rhs![Assign LBrace "<bln_array_elem>" RBrace]);
    g.add(on![LBracket], "<bln_array_initializer>", rhs![LBracket "<array_size>" RBracket "<bln_2d_init>"]);
    g.add(on![Comma Semicolon], "<bln_array_initializer>", rhs![]);
    g.add(on![BoolLit], "<bln_array_elem>", rhs!["<bln_array_elem_val>" "<bln_array_init_next>"]);
    g.add(on![BoolLit], "<bln_array_elem_val>", rhs![BoolLit]);
    g.add(on![Comma], "<bln_array_init_next>", rhs![Comma "<bln_array_elem_val>" "<bln_array_init_next>"]);
    g.add(on![RBrace], "<bln_array_init_next>", rhs![]);
    g.add(on![Assign], "<bln_2d_init>", rhs![Assign LBrace "<bln_array2d_elem>" RBrace]);
    g.add(on![Comma Semicolon], "<bln_2d_init>", rhs![]);
    g.add(on![LBrace], "<bln_array2d_elem>", rhs![LBrace "<bln_array_elem>" RBrace "<bln_array_elem_next>"]);
    g.add(on![Comma], "<bln_array_elem_next>", rhs![Comma "<bln_array2d_elem>"]);
    g.add(on![RBrace], "<bln_array_elem_next>", rhs![]);

    // chr
    g.add(on![LBracket], "<chr_array_dec>", rhs![LBracket "<array_size>" RBracket "<chr_array_initializer>"]);
    g.add(on![Assign], "<chr_array_initializer>", rhs![Assign LBrace "<chr_array_elem>" RBrace]);
    g.add(on![LBracket], "<chr_array_initializer>", rhs![LBracket "<array_size>" RBracket "<chr_2d_init>"]);
    g.add(on![Comma Semicolon], "<chr_array_initializer>", rhs![]);
    g.add(on![CharLit], "<chr_array_elem>", rhs!["<chr_array_elem_val>" "<chr_array_init_next>"]);
    g.add(on![CharLit], "<chr_array_elem_val>", rhs![CharLit]);
    g.add(on![Comma], "<chr_array_init_next>", rhs![Comma "<chr_array_elem_val>" "<chr_array_init_next>"]);
    g.add(on![RBrace], "<chr_array_init_next>", rhs![]);
    g.add(on![Assign], "<chr_2d_init>", rhs![Assign LBrace "<chr_array2d_elem>" RBrace]);
    g.add(on![Comma Semicolon], "<chr_2d_init>", rhs![]);
    g.add(on![LBrace], "<chr_array2d_elem>", rhs![LBrace "<chr_array_elem>" RBrace "<chr_array_elem_next>"]);
    g.add(on![Comma], "<chr_array_elem_next>", rhs![Comma "<chr_array2d_elem>"]);
    g.add(on![RBrace], "<chr_array_elem_next>", rhs![]);

    // strng
    g.add(on![LBracket], "<str_array_dec>", rhs![LBracket "<array_size>" RBracket "<str_array_initializer>"]);
    g.add(on![Assign], "<str_array_initializer>", rhs![Assign LBrace "<str_array_elem>" RBrace]);
    g.add(on![LBracket], "<str_array_initializer>", rhs![LBracket "<array_size>" RBracket "<str_2d_init>"]);
    g.add(on![Comma Semicolon], "<str_array_initializer>", rhs![]);
    g.add(on![StringLit], "<str_array_elem>", rhs!["<str_array_elem_val>" "<str_array_init_next>"]);
    g.add(on![StringLit], "<str_array_elem_val>", rhs![StringLit]);
    g.add(on![Comma], "<str_array_init_next>", rhs![Comma "<str_array_elem_val>" "<str_array_init_next>"]);
    g.add(on![RBrace], "<str_array_init_next>", rhs![]);
    g.add(on![Assign], "<str_2d_init>", rhs![Assign LBrace "<str_array2d_elem>" RBrace]);
    g.add(on![Comma Semicolon], "<str_2d_init>", rhs![]);
    g.add(on![LBrace], "<str_array2d_elem>", rhs![LBrace "<str_array_elem>" RBrace "<str_array_elem_next>"]);
    g.add(on![Comma], "<str_array_elem_next>", rhs![Comma "<str_array2d_elem>"]);
    g.add(on![RBrace], "<str_array_elem_next>", rhs![]);
}

fn constants(g: &mut Builder) {
    g.add(on![Const], "<cnst_dec>", rhs![Const "<cnst_dec_data_type>"]);
    g.add(on![Int], "<cnst_dec_data_type>", rhs![Int Identifier "<nt_cnst_initializer>"]);
    g.add(on![Double], "<cnst_dec_data_type>", rhs![Double Identifier "<dbl_cnst_initializer>"]);
    g.add(on![Bool], "<cnst_dec_data_type>", rhs![Bool Identifier "<bln_cnst_initializer>"]);
    g.add(on![Char], "<cnst_dec_data_type>", rhs![Char Identifier "<chr_cnst_initializer>"]);
    g.add(on![Str], "<cnst_dec_data_type>", rhs![Str Identifier "<str_cnst_initializer>"]);
    g.add(on![IntLit NegIntLit], "<cnst_array_size>", rhs!["<ntliterals>"]);

    g.add(on![Assign], "<nt_cnst_initializer>", rhs![Assign "<nt_cnst_init_val>"]);
    g.add(on![LBracket], "<nt_cnst_initializer>", rhs!["<cnst_nt_array_dec>"]);
    g.add(on![IntLit NegIntLit], "<nt_cnst_init_val>", rhs!["<ntliterals>" "<nt_cnst_next>"]);
    g.add(on![Comma], "<nt_cnst_next>", rhs![Comma Identifier "<nt_cnst_initializer>"]);
    g.add(on![Semicolon], "<nt_cnst_next>", rhs![]);
    g.add(on![LBracket], "<cnst_nt_array_dec>", rhs![LBracket "<cnst_array_size>" RBracket "<cnst_nt_array_initializer>"]);
    g.add(on![Assign], "<cnst_nt_array_initializer>", rhs![Assign LBrace "<nt_array_elem>" RBrace]);
    g.add(on![LBracket], "<cnst_nt_array_initializer>", rhs![LBracket "<array_size>" RBracket "<nt_2d_init>"]);

    g.add(on![Assign], "<dbl_cnst_initializer>", rhs![Assign "<dbl_cnst_init_val>"]);
    g.add(on![LBracket], "<dbl_cnst_initializer>", rhs!["<cnst_dbl_array_dec>"]);
    g.add(on![DoubleLit NegDoubleLit], "<dbl_cnst_init_val>", rhs!["<dblliterals>" "<dbl_cnst_next>"]);
    g.add(on![Comma], "<dbl_cnst_next>", rhs![Comma Identifier "<dbl_cnst_initializer>"]);
    g.add(on![Semicolon], "<dbl_cnst_next>", rhs![]);
    g.add(on![LBracket], "<cnst_dbl_array_dec>", rhs![LBracket "<cnst_array_size>" RBracket "<cnst_dbl_array_initializer>"]);
    g.add(on![Assign], "<cnst_dbl_array_initializer>", rhs![Assign LBrace "<dbl_array_elem>" RBrace]);
    g.add(on![LBracket], "<cnst_dbl_array_initializer>", rhs![LBracket "<array_size>" RBracket "<dbl_2d_init>"]);

    g.add(on![Assign], "<bln_cnst_initializer>", rhs![Assign "<bln_cnst_init_val>"]);
    g.add(on![LBracket], "<bln_cnst_initializer>", rhs!["<cnst_bln_array_dec>"]);
    g.add(on![BoolLit], "<bln_cnst_init_val>", rhs![BoolLit "<bln_cnst_next>"]);
    g.add(on![Comma], "<bln_cnst_next>", rhs![Comma Identifier "<bln_cnst_initializer>"]);
    g.add(on![Semicolon], "<bln_cnst_next>", rhs![]);
    g.add(on![LBracket], "<cnst_bln_array_dec>", rhs![LBracket "<cnst_array_size>" RBracket "<cnst_bln_array_initializer>"]);
    g.add(on![Assign], "<cnst_bln_array_initializer>", rhs![Assign LBrace "<bln_array_elem>" RBrace]);
    g.add(on![LBracket], "<cnst_bln_array_initializer>", rhs![LBracket "<array_size>" RBracket "<bln_2d_init>"]);

    g.add(on![Assign], "<chr_cnst_initializer>", rhs![Assign "<chr_cnst_init_val>"]);
    g.add(on![LBracket], "<chr_cnst_initializer>", rhs!["<cnst_chr_array_dec>"]);
    g.add(on![CharLit], "<chr_cnst_init_val>", rhs![CharLit "<chr_cnst_next>"]);
    g.add(on![Comma], "<chr_cnst_next>", rhs![Comma Identifier "<chr_cnst_initializer>"]);
    g.add(on![Semicolon], "<chr_cnst_next>", rhs![]);
    g.add(on![LBracket], "<cnst_chr_array_dec>", rhs![LBracket "<cnst_array_size>" RBracket "<cnst_chr_array_initializer>"]);
    g.add(on![Assign], "<cnst_chr_array_initializer>", rhs![Assign LBrace "<chr_array_elem>" RBrace]);
    g.add(on![LBracket], "<cnst_chr_array_initializer>", rhs![LBracket "<array_size>" RBracket "<chr_2d_init>"]);

    g.add(on![Assign], "<str_cnst_initializer>", rhs![Assign "<str_cnst_init_val>"]);
    g.add(on![LBracket], "<str_cnst_initializer>", rhs!["<cnst_str_array_dec>"]);
    g.add(on![StringLit], "<str_cnst_init_val>", rhs![StringLit "<str_cnst_next>"]);
    g.add(on![Comma], "<str_cnst_next>", rhs![Comma Identifier "<str_cnst_initializer>"]);
    g.add(on![Semicolon], "<str_cnst_next>", rhs![]);
    g.add(on![LBracket], "<cnst_str_array_dec>", rhs![LBracket "<cnst_array_size>" RBracket "<cnst_str_array_initializer>"]);
    g.add(on![Assign], "<cnst_str_array_initializer>", rhs![Assign LBrace "<str_array_elem>" RBrace]);
    g.add(on![LBracket], "<cnst_str_array_initializer>", rhs![LBracket "<array_size>" RBracket "<str_2d_init>"]);
}

fn structs_and_functions(g: &mut Builder) {
    g.add(on![Comma], "<strct_init_next>", rhs![Comma Identifier "<strct_init_next>"]);
    g.add(on![Semicolon], "<strct_init_next>", rhs![]);
    g.add(on![Struct], "<strct_declaration>", rhs![Struct Identifier LBrace "<strct_body>" RBrace Semicolon]);
    g.add(DATA_TYPES, "<strct_body>", rhs!["<strct_var_dec>" Semicolon "<var_dec_next>"]);
    g.add(on![Int], "<strct_var_dec>", rhs![Int Identifier]);
    g.add(on![Double], "<strct_var_dec>", rhs![Double Identifier]);
    g.add(on![Bool], "<strct_var_dec>", rhs![Bool Identifier]);
    g.add(on![Char], "<strct_var_dec>", rhs![Char Identifier]);
    g.add(on![Str], "<strct_var_dec>", rhs![Str Identifier]);
    g.add(DATA_TYPES, "<var_dec_next>", rhs!["<strct_body>"]);
    g.add(on![RBrace], "<var_dec_next>", rhs![]);

    g.add(
        on![Function],
        "<function_definition>",
        rhs![Function "<func_type>" Identifier LParen "<parameter>" RParen LBrace
             "<func_var_dec>" "<statement>" RBrace "<function_definition>"],
    );
    g.add(on![Main], "<function_definition>", rhs![]);
    g.add(on![Void], "<func_type>", rhs![Void]);
    g.add(DATA_TYPES, "<func_type>", rhs!["<data_type>"]);
    g.add(on![Int], "<data_type>", rhs![Int]);
    g.add(on![Double], "<data_type>", rhs![Double]);
    g.add(on![Bool], "<data_type>", rhs![Bool]);
    g.add(on![Char], "<data_type>", rhs![Char]);
    g.add(on![Str], "<data_type>", rhs![Str]);
    g.add(DATA_TYPES, "<parameter>", rhs!["<data_type>" Identifier "<parameter_next>"]);
    g.add(on![RParen], "<parameter>", rhs![]);
    g.add(on![Comma], "<parameter_next>", rhs![Comma "<parameter>"]);
    g.add(on![RParen], "<parameter_next>", rhs![]);
    g.add(DATA_TYPES, "<func_var_dec>", rhs!["<var_dec>" Semicolon "<func_var_dec>"]);
    g.add(&with(STATEMENT_START, on![RBrace]), "<func_var_dec>", rhs![]);
}

fn statements(g: &mut Builder) {
    g.add(on![Identifier], "<statement>", rhs!["<id_build_statements>" "<statement>"]);
    g.add(on![Print], "<statement>", rhs!["<output_statement>" "<statement>"]);
    g.add(on![For], "<statement>", rhs!["<fr_statement>" "<statement>"]);
    g.add(on![Do], "<statement>", rhs!["<d-whl_statement>" "<statement>"]);
    g.add(on![While], "<statement>", rhs!["<whl_statement>" "<statement>"]);
    g.add(on![Return], "<statement>", rhs!["<rtrn_statement>" "<statement>"]);
    g.add(on![Increment Decrement], "<statement>", rhs!["<unary_pre_statement>" "<statement>"]);
    g.add(on![If Switch], "<statement>", rhs!["<conditional_statement>" "<statement>"]);
    g.add(on![Break Continue], "<statement>", rhs!["<control_statements>" "<statement>"]);
    g.add(on![End RBrace ElseIf Else Case Default], "<statement>", rhs![]);

    // Statements that start with an identifier.
    g.add(on![Identifier], "<id_build_statements>", rhs![Identifier "<id_build_statement_next>"]);
    g.add(on![LParen], "<id_build_statement_next>", rhs!["<function_call>" Semicolon]);
    g.add(on![LBracket Dot], "<id_build_statement_next>", rhs!["<id_next>" "<assignment_statement>"]);
    g.add(
        on![PlusAssign MinusAssign StarAssign SlashAssign Assign],
        "<id_build_statement_next>",
        rhs!["<assignment_statement>"],
    );
    g.add(on![Increment Decrement], "<id_build_statement_next>", rhs!["<unary_inc/dec>" Semicolon]);
    g.add(on![Assign], "<assignment_statement>", rhs![Assign "<assignment_value_input>"]);
    g.add(
        on![PlusAssign MinusAssign StarAssign SlashAssign],
        "<assignment_statement>",
        rhs!["<assign_operator>" "<assignment_value>"],
    );
    g.add(on![PlusAssign], "<assign_operator>", rhs![PlusAssign]);
    g.add(on![MinusAssign], "<assign_operator>", rhs![MinusAssign]);
    g.add(on![StarAssign], "<assign_operator>", rhs![StarAssign]);
    g.add(on![SlashAssign], "<assign_operator>", rhs![SlashAssign]);
    g.add(EXPRESSION_START, "<assignment_value>", rhs!["<expression>" Semicolon]);
    g.add(EXPRESSION_START, "<assignment_value_input>", rhs!["<assignment_value>"]);
    g.add(on![Input], "<assignment_value_input>", rhs!["<input_statement_value>"]);
    g.add(on![Input], "<input_statement_value>", rhs![Input LParen StringLit RParen Semicolon]);
    g.add(on![Increment Decrement], "<unary_pre_statement>", rhs!["<unary_inc/dec>" Identifier Semicolon]);

    g.add(
        on![Print],
        "<output_statement>",
        rhs![Print LParen "<output_value>" "<output_next>" RParen Semicolon],
    );
    g.add(EXPRESSION_START, "<output_value>", rhs!["<expression>"]);
    g.add(on![Comma], "<output_next>", rhs![Comma "<output_value>" "<output_next>"]);
    g.add(on![RParen], "<output_next>", rhs![]);

    g.add(
        on![If],
        "<conditional_statement>",
        rhs![If LParen "<condition>" RParen LBrace "<statement>" "<lsf_statement>" "<ls_statement>"
             RBrace "<lsf_statement>" "<ls_statement>"],
    );
    g.add(
        on![Switch],
        "<conditional_statement>",
        rhs![Switch LParen Identifier RParen LBrace "<swtch_body>" RBrace],
    );
    g.add(EXPRESSION_START, "<condition>", rhs!["<rel_arith_logic_expr>"]);
    g.add(
        on![ElseIf],
        "<lsf_statement>",
        rhs![ElseIf LParen "<condition>" RParen LBrace "<statement>" RBrace "<lsf_statement>"],
    );
    g.add(
        &with(STATEMENT_START, on![Else RBrace End Case Default]),
        "<lsf_statement>",
        rhs![],
    );
    g.add(on![Else], "<ls_statement>", rhs![Else LBrace "<statement>" RBrace]);
    g.add(&with(STATEMENT_START, on![RBrace End Case Default]), "<ls_statement>", rhs![]);

    g.add(on![Case], "<swtch_body>", rhs!["<cs>" "<dflt>"]);
    g.add(on![Case], "<cs>", rhs![Case "<swtch_value>" Colon "<statement>" "<cs_next>"]);
    g.add(on![Default RBrace], "<cs>", rhs![]);
    g.add(on![CharLit], "<swtch_value>", rhs![CharLit]);
    g.add(on![IntLit NegIntLit], "<swtch_value>", rhs!["<ntliterals>"]);
    g.add(on![Case], "<cs_next>", rhs!["<cs>" "<cs_next>"]);
    g.add(on![Default RBrace], "<cs_next>", rhs![]);
    g.add(on![Default], "<dflt>", rhs![Default Colon "<statement>"]);
    g.add(on![RBrace], "<dflt>", rhs![]);

    g.add(
        on![For],
        "<fr_statement>",
        rhs![For LParen "<initialization>" Semicolon "<fr_condi>" Semicolon "<inc/dec>" RParen
             LBrace "<statement>" RBrace],
    );
    g.add(on![Identifier], "<initialization>", rhs!["<id_build>" Assign "<arithmetic_nt>"]);
    g.add(EXPRESSION_START, "<fr_condi>", rhs!["<condition>"]);
    g.add(on![Identifier], "<inc/dec>", rhs![Identifier "<inc/dec_next>"]);
    g.add(on![Increment Decrement], "<inc/dec>", rhs!["<fr_unary>"]);
    g.add(
        on![PlusAssign MinusAssign StarAssign SlashAssign],
        "<inc/dec_next>",
        rhs!["<assign_operator>" "<inc/dec_value>"],
    );
    g.add(on![Increment Decrement], "<inc/dec_next>", rhs!["<unary_inc/dec>"]);
    g.add(on![Increment Decrement], "<fr_unary>", rhs!["<unary_inc/dec>" Identifier]);
    g.add(on![Identifier], "<inc/dec_value>", rhs!["<id_build>"]);
    g.add(on![IntLit NegIntLit], "<inc/dec_value>", rhs!["<ntliterals>"]);

    g.add(
        on![Do],
        "<d-whl_statement>",
        rhs![Do LBrace "<statement>" RBrace While LParen "<condition>" RParen Semicolon],
    );
    g.add(
        on![While],
        "<whl_statement>",
        rhs![While LParen "<condition>" RParen LBrace "<statement>" RBrace],
    );

    g.add(on![Return], "<rtrn_statement>", rhs![Return "<rtrn_value>" Semicolon]);
    g.add(EXPRESSION_START, "<rtrn_value>", rhs!["<expression>"]);
    g.add(on![Semicolon], "<rtrn_value>", rhs![]);

    g.add(on![Break], "<control_statements>", rhs![Break Semicolon]);
    g.add(on![Continue], "<control_statements>", rhs![Continue Semicolon]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use GrammarSymbol::{NonTerminal, Terminal};

    #[test]
    fn test_program_production() {
        let grammar = Grammar::get();
        let rule = grammar.production(START_SYMBOL, TokenKind::Main).unwrap();
        assert_eq!(rule[0], NonTerminal("<global_declaration>"));
        assert_eq!(rule[2], Terminal(TokenKind::Main));
        assert_eq!(rule.last(), Some(&Terminal(TokenKind::RBrace)));
    }

    #[test]
    fn test_empty_productions() {
        let grammar = Grammar::get();
        assert_eq!(grammar.production("<statement>", TokenKind::End), Some(&[][..]));
        assert_eq!(grammar.production("<rtrn_value>", TokenKind::Semicolon), Some(&[][..]));
        assert_eq!(grammar.production("<func_var_dec>", TokenKind::Continue), Some(&[][..]));
        assert_eq!(grammar.production("<lsf_statement>", TokenKind::Case), Some(&[][..]));
    }

    #[test]
    fn test_index_accepts_negative_and_parenthesized() {
        let grammar = Grammar::get();
        assert!(grammar.production("<index>", TokenKind::NegIntLit).is_some());
        assert!(grammar.production("<index>", TokenKind::LParen).is_some());
    }

    #[test]
    fn test_missing_entry() {
        let grammar = Grammar::get();
        assert!(grammar.production("<program>", TokenKind::Identifier).is_none());
        assert!(grammar.production("<no_such_rule>", TokenKind::Main).is_none());
    }

    #[test]
    fn test_expected_is_sorted() {
        let expected = Grammar::get().expected("<data_type>");
        let spelled: Vec<&str> = expected.iter().map(|k| k.as_str()).collect();
        assert_eq!(spelled, vec!["bln", "chr", "dbl", "nt", "strng"]);
    }

    #[test]
    fn test_every_nonterminal_on_a_rhs_has_a_row() {
        let grammar = Grammar::get();
        for row in grammar.table.values() {
            for rule in row.values() {
                for symbol in rule {
                    if let NonTerminal(name) = symbol {
                        assert!(grammar.is_nonterminal(name), "no productions for {name}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_row_has_an_entry() {
        let grammar = Grammar::get();
        assert!(grammar.nonterminal_count() > 0);
        assert!(grammar.table.values().all(|row| !row.is_empty()));
        assert!(grammar.entry_count() >= grammar.nonterminal_count());
        assert_eq!(grammar.expected("<data_type>").len(), 5);
    }
}
