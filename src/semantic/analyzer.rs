//! Two-pass analyzer driver
//!
//! Pass 1 walks the top level and records every function, the entry point and
//! every struct type, so calls may precede their callee. Pass 2 walks the
//! program in textual order: function bodies in their own scopes, everything
//! else in the global scope.
//!
//! The analyzer works on the token sequence directly with an index cursor.
//! Statement, declaration and expression rules live in sibling modules as
//! further `impl` blocks on [`Analyzer`].

use super::errors::{SemanticError, SemanticErrorKind, SemanticResult};
use super::scope::{ScopeArena, ScopeId, SymbolTable};
use super::symbol::{BodyRange, FunctionInfo, Parameter, Symbol, SymbolKind};
use super::types::DataType;
use crate::lexer::{SourceLocation, Token, TokenKind};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

/// Default ceiling on iterations of any single scan loop.
pub const DEFAULT_SCAN_LIMIT: usize = 1_000_000;

/// Default ceiling on nested blocks and sub-expressions.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Fixed message reported for a program with no semantic errors.
pub const SEMANTIC_OK_MESSAGE: &str = "Semantic analysis completed successfully.";

/// Verdict of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub accepted: bool,
    pub errors: Vec<SemanticError>,
    pub symbols: SymbolTable,
}

impl Analysis {
    /// One line per error, or the success message.
    pub fn messages(&self) -> Vec<String> {
        if self.errors.is_empty() {
            vec![SEMANTIC_OK_MESSAGE.to_string()]
        } else {
            self.errors.iter().map(|e| e.to_string()).collect()
        }
    }
}

/// Analyze `tokens` with the default limits.
pub fn analyze(tokens: &[Token]) -> Analysis {
    Analyzer::new(tokens).analyze()
}

/// What kind of construct encloses the statement being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockKind {
    Loop,
    Switch,
    Case,
}

/// The function whose body is being analyzed.
#[derive(Debug, Clone)]
pub(super) struct FunctionContext {
    pub name: String,
    pub return_type: DataType,
    pub is_entry_point: bool,
    pub saw_return: bool,
}

/// How a statement ended; switch cases must end in `brk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Stmt {
    Break,
    Other,
}

fn sentinel() -> &'static Token {
    static EOF: OnceLock<Token> = OnceLock::new();
    EOF.get_or_init(|| Token::eof(SourceLocation::new(1, 1)))
}

pub struct Analyzer<'t> {
    tokens: &'t [Token],
    last: &'t Token,
    pub(super) position: usize,
    pub(super) scopes: ScopeArena,
    pub(super) current: ScopeId,
    pub(super) blocks: Vec<BlockKind>,
    pub(super) block_depth: usize,
    pub(super) function: Option<FunctionContext>,
    /// Function scopes by name
    functions: FxHashMap<String, ScopeId>,
    /// Token index of each `fnctn`/`mn` keyword -> declared name
    declarations: FxHashMap<usize, String>,
    scan_limit: usize,
    /// Open blocks and sub-expressions along the current path
    depth: usize,
    max_nesting: usize,
}

impl<'t> Analyzer<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Analyzer {
            tokens,
            last: tokens.last().unwrap_or_else(|| sentinel()),
            position: 0,
            scopes: ScopeArena::new(),
            current: ScopeId::GLOBAL,
            blocks: Vec::new(),
            block_depth: 0,
            function: None,
            functions: FxHashMap::default(),
            declarations: FxHashMap::default(),
            scan_limit: DEFAULT_SCAN_LIMIT,
            depth: 0,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    pub fn with_max_nesting(mut self, limit: usize) -> Self {
        self.max_nesting = limit;
        self
    }

    /// Run both passes and stop at the first error.
    pub fn analyze(mut self) -> Analysis {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run()));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "analyzer panicked".to_string());
                Err(self.error(SemanticErrorKind::Internal { message }))
            }
        };

        let errors = match result {
            Ok(()) => Vec::new(),
            Err(err) => {
                debug!("semantic analysis failed: {err}");
                vec![err]
            }
        };
        Analysis {
            accepted: errors.is_empty(),
            errors,
            symbols: SymbolTable::new(self.scopes, self.functions),
        }
    }

    fn run(&mut self) -> SemanticResult<()> {
        if self.tokens.is_empty() {
            return Err(self.error(SemanticErrorKind::UnexpectedEnd));
        }
        self.collect_declarations()?;
        debug!(
            "declaration pass done: {} function(s), {} global symbol(s)",
            self.functions.len(),
            self.scopes.get(ScopeId::GLOBAL).map_or(0, |s| s.len())
        );
        self.analyze_program()
    }

    // ---------------------------------------------------------------------
    // Pass 1: declarations
    // ---------------------------------------------------------------------

    fn collect_declarations(&mut self) -> SemanticResult<()> {
        self.position = 0;
        let mut iterations = 0;
        while !self.at_end() {
            self.tick(&mut iterations)?;
            match self.peek_kind() {
                TokenKind::Function => self.collect_function()?,
                TokenKind::Main => self.collect_entry_point()?,
                TokenKind::Struct => self.collect_struct()?,
                TokenKind::LBrace => self.position = self.matching_close(self.position)? + 1,
                _ => self.position += 1,
            }
        }
        if !self.functions.contains_key("mn") {
            return Err(self.error(SemanticErrorKind::MissingEntryPoint));
        }
        self.position = 0;
        Ok(())
    }

    fn collect_function(&mut self) -> SemanticResult<()> {
        let keyword = self.position;
        self.advance();
        let type_token = self.advance();
        let return_type = match DataType::from_keyword(type_token.kind) {
            Some(ty) => ty,
            None => {
                return Err(self.error_at(
                    SemanticErrorKind::InvalidReturnType {
                        found: type_token.lexeme.clone(),
                    },
                    type_token,
                ))
            }
        };
        let name = self.expect(TokenKind::Identifier, "a function name")?;
        if self.scopes.declared_here(ScopeId::GLOBAL, &name.lexeme) {
            return Err(self.error_at(
                SemanticErrorKind::Redeclaration {
                    what: "Function",
                    name: name.lexeme.clone(),
                },
                name,
            ));
        }

        let scope = self.scopes.push(ScopeId::GLOBAL, format!("function {}", name.lexeme));
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parameters(scope)?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.body_range()?;

        let info = FunctionInfo {
            return_type,
            params,
            scope,
            body,
            has_return: false,
            is_entry_point: false,
        };
        self.register_function(keyword, name, info)
    }

    fn collect_entry_point(&mut self) -> SemanticResult<()> {
        let keyword = self.position;
        let name = self.advance();
        if self.functions.contains_key("mn") {
            return Err(self.error_at(SemanticErrorKind::DuplicateEntryPoint, name));
        }
        let scope = self.scopes.push(ScopeId::GLOBAL, "entry point mn");
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.body_range()?;

        let info = FunctionInfo {
            return_type: DataType::Void,
            params: Vec::new(),
            scope,
            body,
            has_return: false,
            is_entry_point: true,
        };
        self.register_function(keyword, name, info)
    }

    fn parameters(&mut self, scope: ScopeId) -> SemanticResult<Vec<Parameter>> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let type_token = self.advance();
            let data_type = match DataType::from_keyword(type_token.kind) {
                Some(ty) if ty.is_primitive() => ty,
                _ => {
                    return Err(self.error_at(
                        SemanticErrorKind::ExpectedToken {
                            expected: "a parameter type".to_string(),
                            found: type_token.lexeme.clone(),
                        },
                        type_token,
                    ))
                }
            };
            let name = self.expect(TokenKind::Identifier, "a parameter name")?;
            let symbol =
                Symbol::variable(name.lexeme.clone(), data_type.clone(), name.location).initialized(true);
            if self.scopes.insert(scope, symbol).is_err() {
                return Err(self.error_at(
                    SemanticErrorKind::Redeclaration {
                        what: "Parameter",
                        name: name.lexeme.clone(),
                    },
                    name,
                ));
            }
            params.push(Parameter {
                name: name.lexeme.clone(),
                data_type,
                location: name.location,
            });
            if !self.check(TokenKind::Comma) {
                return Ok(params);
            }
            self.advance();
        }
    }

    /// Consume `{ ... }` and return the token range between the braces.
    fn body_range(&mut self) -> SemanticResult<BodyRange> {
        if !self.check(TokenKind::LBrace) {
            self.expect(TokenKind::LBrace, "'{'")?;
        }
        let open = self.position;
        let close = self.matching_close(open)?;
        self.position = close + 1;
        Ok(BodyRange {
            start: open + 1,
            end: close,
        })
    }

    fn register_function(
        &mut self,
        keyword: usize,
        name: &Token,
        info: FunctionInfo,
    ) -> SemanticResult<()> {
        debug!(
            "declared function '{}' returning '{}' with {} parameter(s)",
            name.lexeme,
            info.return_type,
            info.params.len()
        );
        self.functions.insert(name.lexeme.clone(), info.scope);
        self.declarations.insert(keyword, name.lexeme.clone());
        let symbol = Symbol::function(name.lexeme.clone(), info, name.location);
        self.insert_global(symbol, name)
    }

    /// Insert a name already checked free in the global scope.
    fn insert_global(&mut self, symbol: Symbol, name: &Token) -> SemanticResult<()> {
        self.scopes.insert(ScopeId::GLOBAL, symbol).map_err(|symbol| {
            self.error_at(
                SemanticErrorKind::Internal {
                    message: format!("global '{}' was declared twice", symbol.name),
                },
                name,
            )
        })
    }

    fn collect_struct(&mut self) -> SemanticResult<()> {
        self.advance();
        let name = self.expect(TokenKind::Identifier, "a struct name")?;
        if self.scopes.declared_here(ScopeId::GLOBAL, &name.lexeme) {
            return Err(self.error_at(
                SemanticErrorKind::Redeclaration {
                    what: "Struct",
                    name: name.lexeme.clone(),
                },
                name,
            ));
        }
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut members = FxHashMap::default();
        let mut iterations = 0;
        while !self.check(TokenKind::RBrace) {
            self.tick(&mut iterations)?;
            let type_token = self.advance();
            let data_type = match DataType::from_keyword(type_token.kind) {
                Some(ty) if ty.is_primitive() => ty,
                _ => {
                    return Err(self.error_at(
                        SemanticErrorKind::ExpectedToken {
                            expected: "a member type".to_string(),
                            found: type_token.lexeme.clone(),
                        },
                        type_token,
                    ))
                }
            };
            let member = self.expect(TokenKind::Identifier, "a member name")?;
            if members.contains_key(&member.lexeme) {
                return Err(self.error_at(
                    SemanticErrorKind::DuplicateMember {
                        structure: name.lexeme.clone(),
                        member: member.lexeme.clone(),
                    },
                    member,
                ));
            }
            members.insert(
                member.lexeme.clone(),
                Symbol::variable(member.lexeme.clone(), data_type, member.location),
            );
            self.expect(TokenKind::Semicolon, "';'")?;
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        self.expect(TokenKind::Semicolon, "';'")?;

        debug!("declared struct '{}' with {} member(s)", name.lexeme, members.len());
        let symbol = Symbol::struct_type(name.lexeme.clone(), members, name.location);
        self.insert_global(symbol, name)
    }

    // ---------------------------------------------------------------------
    // Pass 2: bodies and global statements
    // ---------------------------------------------------------------------

    fn analyze_program(&mut self) -> SemanticResult<()> {
        self.position = 0;
        let mut iterations = 0;
        while !self.at_end() {
            self.tick(&mut iterations)?;
            match self.peek_kind() {
                TokenKind::Function | TokenKind::Main => {
                    let Some(name) = self.declarations.get(&self.position).cloned() else {
                        return Err(self.error(SemanticErrorKind::Internal {
                            message: "function body was not recorded".to_string(),
                        }));
                    };
                    self.analyze_function(&name)?;
                }
                TokenKind::Struct => self.skip_struct()?,
                _ => {
                    self.statement()?;
                }
            }
        }
        Ok(())
    }

    fn analyze_function(&mut self, name: &str) -> SemanticResult<()> {
        let Some(info) = self
            .scopes
            .lookup(ScopeId::GLOBAL, name)
            .and_then(Symbol::function_info)
            .cloned()
        else {
            return Err(self.error(SemanticErrorKind::Internal {
                message: format!("no signature for '{name}'"),
            }));
        };
        debug!("analyzing body of '{name}'");

        self.current = info.scope;
        self.function = Some(FunctionContext {
            name: name.to_string(),
            return_type: info.return_type.clone(),
            is_entry_point: info.is_entry_point,
            saw_return: false,
        });
        self.position = info.body.start;
        self.statements_until(&[TokenKind::RBrace])?;
        if self.position != info.body.end {
            return Err(self.error(SemanticErrorKind::Internal {
                message: format!("body of '{name}' ended early"),
            }));
        }
        self.position = info.body.end + 1;
        self.current = ScopeId::GLOBAL;

        let saw_return = self.function.take().is_some_and(|ctx| ctx.saw_return);
        if let Some(SymbolKind::Function(info)) = self
            .scopes
            .lookup_mut(ScopeId::GLOBAL, name)
            .map(|symbol| &mut symbol.kind)
        {
            info.has_return = saw_return;
        }
        if !info.is_entry_point && info.return_type != DataType::Void && !saw_return {
            let location = self
                .scopes
                .lookup(ScopeId::GLOBAL, name)
                .map_or(self.peek().location, |s| s.location);
            return Err(SemanticError::new(
                SemanticErrorKind::MissingReturn {
                    function: name.to_string(),
                    expected: info.return_type,
                },
                location,
            ));
        }
        Ok(())
    }

    fn skip_struct(&mut self) -> SemanticResult<()> {
        let mut iterations = 0;
        while !self.check(TokenKind::LBrace) {
            self.tick(&mut iterations)?;
            if self.at_end() {
                return Err(self.error(SemanticErrorKind::UnexpectedEnd));
            }
            self.advance();
        }
        self.position = self.matching_close(self.position)? + 1;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Blocks and contexts
    // ---------------------------------------------------------------------

    /// Analyze statements until one of `stop` is next. The stop token is not
    /// consumed. Returns how the last statement ended, if there was one.
    pub(super) fn statements_until(&mut self, stop: &[TokenKind]) -> SemanticResult<Option<Stmt>> {
        let mut last = None;
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let kind = self.peek_kind();
            if stop.contains(&kind) {
                return Ok(last);
            }
            if kind == TokenKind::Eof {
                return Err(self.error(SemanticErrorKind::UnexpectedEnd));
            }
            last = Some(self.statement()?);
        }
    }

    /// `{ statements }` in a fresh scope.
    pub(super) fn block(&mut self, label: &str) -> SemanticResult<Option<Stmt>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let last = self.in_scope(label, |this| this.statements_until(&[TokenKind::RBrace]))?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(last)
    }

    pub(super) fn in_scope<T>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        self.nested(|this| {
            let parent = this.current;
            let scope = this.scopes.push(parent, label);
            trace!("enter scope {scope} ({label})");
            this.current = scope;
            this.block_depth += 1;
            let result = body(this);
            this.block_depth -= 1;
            this.current = parent;
            this.scopes.release(scope);
            trace!("leave scope {scope} ({label})");
            result
        })
    }

    /// Run `body` one nesting level deeper, failing past `max_nesting`.
    pub(super) fn nested<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        if self.depth >= self.max_nesting {
            return Err(self.error(SemanticErrorKind::NestingLimit {
                limit: self.max_nesting,
            }));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    pub(super) fn in_context<T>(
        &mut self,
        kind: BlockKind,
        body: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        self.blocks.push(kind);
        let result = body(self);
        self.blocks.pop();
        result
    }

    // ---------------------------------------------------------------------
    // Symbols
    // ---------------------------------------------------------------------

    /// Cloned symbol visible from the current scope.
    pub(super) fn resolve(&self, name: &str) -> Option<Symbol> {
        self.scopes.lookup(self.current, name).cloned()
    }

    pub(super) fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes.lookup_mut(self.current, name)
    }

    /// Insert into the current scope, reporting a clash at `token`.
    pub(super) fn declare(&mut self, symbol: Symbol, token: &Token) -> SemanticResult<()> {
        trace!("declare {symbol} in {}", self.current);
        self.scopes.insert(self.current, symbol).map_err(|symbol| {
            self.error_at(
                SemanticErrorKind::Redeclaration {
                    what: "Variable",
                    name: symbol.name,
                },
                token,
            )
        })
    }

    // ---------------------------------------------------------------------
    // Cursor
    // ---------------------------------------------------------------------

    pub(super) fn peek(&self) -> &'t Token {
        self.token_at(self.position)
    }

    pub(super) fn token_at(&self, index: usize) -> &'t Token {
        self.tokens.get(index).unwrap_or(self.last)
    }

    pub(super) fn peek_kind(&self) -> TokenKind {
        self.kind_at(self.position)
    }

    /// Kind at `index`; past the end reads as EOF.
    pub(super) fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens.get(index).map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(super) fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    pub(super) fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> SemanticResult<&'t Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = self.peek();
        let kind = if found.kind == TokenKind::Eof {
            SemanticErrorKind::UnexpectedEnd
        } else {
            SemanticErrorKind::ExpectedToken {
                expected: what.to_string(),
                found: found.lexeme.clone(),
            }
        };
        Err(self.error(kind))
    }

    /// Index of the bracket that closes the one at `open`.
    pub(super) fn matching_close(&self, open: usize) -> SemanticResult<usize> {
        let open_kind = self.kind_at(open);
        let (close_kind, delimiter) = match open_kind {
            TokenKind::LParen => (TokenKind::RParen, "("),
            TokenKind::LBracket => (TokenKind::RBracket, "["),
            TokenKind::LBrace => (TokenKind::RBrace, "{"),
            _ => {
                return Err(self.error(SemanticErrorKind::Internal {
                    message: format!("no bracket at token {open}"),
                }))
            }
        };
        let mut depth = 0usize;
        let mut iterations = 0;
        let mut index = open;
        loop {
            self.tick(&mut iterations)?;
            match self.kind_at(index) {
                TokenKind::Eof => {
                    return Err(self.error_at(
                        SemanticErrorKind::Unclosed { delimiter },
                        self.token_at(open),
                    ))
                }
                kind if kind == open_kind => depth += 1,
                kind if kind == close_kind => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(index);
                    }
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// Index just past the expression starting at the cursor: the first
    /// top-level token in `terminators`, a `;`, an unmatched closer or EOF.
    pub(super) fn expression_end(&self, terminators: &[TokenKind]) -> SemanticResult<usize> {
        let mut depth = 0usize;
        let mut iterations = 0;
        let mut index = self.position;
        loop {
            self.tick(&mut iterations)?;
            match self.kind_at(index) {
                TokenKind::Eof | TokenKind::Semicolon => return Ok(index),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return Ok(index);
                    }
                    depth -= 1;
                }
                kind if depth == 0 && terminators.contains(&kind) => return Ok(index),
                _ => {}
            }
            index += 1;
        }
    }

    pub(super) fn tick(&self, iterations: &mut usize) -> SemanticResult<()> {
        *iterations += 1;
        if *iterations > self.scan_limit {
            return Err(self.error(SemanticErrorKind::ScanLimit {
                limit: self.scan_limit,
            }));
        }
        Ok(())
    }

    pub(super) fn error(&self, kind: SemanticErrorKind) -> SemanticError {
        SemanticError::new(kind, self.peek().location)
    }

    pub(super) fn error_at(&self, kind: SemanticErrorKind, token: &Token) -> SemanticError {
        SemanticError::new(kind, token.location)
    }
}
