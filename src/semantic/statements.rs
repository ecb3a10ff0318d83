//! Statement rules: assignments, calls, control flow and jumps

use super::analyzer::{Analyzer, BlockKind, Stmt};
use super::errors::{SemanticErrorKind, SemanticResult};
use super::symbol::{Symbol, SymbolKind};
use super::types::{BinaryOperator, DataType};
use crate::lexer::{Token, TokenKind};
use log::warn;
use rustc_hash::FxHashSet;

/// Where an assignment lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Place {
    Variable,
    Element,
    Member(String),
}

/// A resolved assignment target: `x`, `a[i]` or `s.m`.
#[derive(Debug, Clone)]
pub(super) struct Target<'t> {
    pub name: String,
    pub data_type: DataType,
    pub place: Place,
    pub initialized: bool,
    pub token: &'t Token,
}

impl<'t> Analyzer<'t> {
    pub(super) fn statement(&mut self) -> SemanticResult<Stmt> {
        let token = self.peek();
        match token.kind {
            kind if kind.is_primitive_type() => self.variable_declaration()?,
            TokenKind::Const => self.constant_declaration()?,
            TokenKind::DefStruct => self.struct_instance_declaration()?,
            TokenKind::Identifier => self.identifier_statement()?,
            TokenKind::Increment | TokenKind::Decrement => self.prefix_update_statement()?,
            TokenKind::Print => self.print_statement()?,
            TokenKind::If => self.if_statement()?,
            TokenKind::Switch => self.switch_statement()?,
            TokenKind::For => self.for_statement()?,
            TokenKind::While => self.while_statement()?,
            TokenKind::Do => self.do_while_statement()?,
            TokenKind::Return => self.return_statement()?,
            TokenKind::Break => return self.break_statement(),
            TokenKind::Continue => self.continue_statement()?,
            TokenKind::End => self.end_statement()?,
            TokenKind::Struct => return Err(self.error(SemanticErrorKind::StructOutsideGlobal)),
            TokenKind::Function | TokenKind::Main => {
                return Err(self.error(SemanticErrorKind::FunctionOutsideGlobal))
            }
            TokenKind::Else => {
                return Err(self.error(SemanticErrorKind::ConditionalWithoutIf { keyword: "ls" }))
            }
            TokenKind::ElseIf => {
                return Err(self.error(SemanticErrorKind::ConditionalWithoutIf { keyword: "lsf" }))
            }
            TokenKind::Case => {
                return Err(self.error(SemanticErrorKind::CaseOutsideSwitch { keyword: "cs" }))
            }
            TokenKind::Default => {
                return Err(self.error(SemanticErrorKind::CaseOutsideSwitch { keyword: "dflt" }))
            }
            TokenKind::Eof => return Err(self.error(SemanticErrorKind::UnexpectedEnd)),
            _ => {
                return Err(self.error(SemanticErrorKind::UnexpectedToken {
                    found: token.lexeme.clone(),
                    context: "statement",
                }))
            }
        }
        Ok(Stmt::Other)
    }

    // ---------------------------------------------------------------------
    // Assignments and calls
    // ---------------------------------------------------------------------

    fn identifier_statement(&mut self) -> SemanticResult<()> {
        if self.kind_at(self.position + 1) == TokenKind::LParen {
            // Void calls are fine as statements.
            self.call_type()?;
        } else {
            let target = self.assignment_target()?;
            self.assignment_tail(&target, &[])?;
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn prefix_update_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        let target = self.assignment_target()?;
        self.require_int_target(&target)?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    /// Resolve `x`, `a[i][j]` or `s.m` for writing. The cursor is left on the
    /// assignment operator.
    pub(super) fn assignment_target(&mut self) -> SemanticResult<Target<'t>> {
        let token = self.expect(TokenKind::Identifier, "an identifier")?;
        let Some(symbol) = self.resolve(&token.lexeme) else {
            return Err(self.error_at(
                SemanticErrorKind::UndefinedVariable {
                    name: token.lexeme.clone(),
                },
                token,
            ));
        };
        if matches!(symbol.kind, SymbolKind::Function(_) | SymbolKind::StructType { .. }) {
            return Err(self.error_at(
                SemanticErrorKind::NotAVariable {
                    name: symbol.name,
                },
                token,
            ));
        }
        if symbol.is_constant() {
            return Err(self.error_at(
                SemanticErrorKind::ConstantReassignment { name: symbol.name },
                token,
            ));
        }

        match self.peek_kind() {
            TokenKind::LBracket => {
                let data_type = self.element_type(&symbol, token)?;
                Ok(Target {
                    name: symbol.name,
                    data_type,
                    place: Place::Element,
                    initialized: symbol.initialized,
                    token,
                })
            }
            TokenKind::Dot => {
                let (member, data_type, initialized) = self.member(&symbol, token)?;
                Ok(Target {
                    name: symbol.name,
                    data_type,
                    place: Place::Member(member),
                    initialized,
                    token,
                })
            }
            _ => {
                if symbol.is_array() {
                    return Err(self.error_at(
                        SemanticErrorKind::ArrayWithoutIndex { name: symbol.name },
                        token,
                    ));
                }
                Ok(Target {
                    name: symbol.name,
                    data_type: symbol.data_type,
                    place: Place::Variable,
                    initialized: symbol.initialized,
                    token,
                })
            }
        }
    }

    /// The operator and value after a target. Expressions stop at `;` or at
    /// any of `terminators`.
    pub(super) fn assignment_tail(
        &mut self,
        target: &Target<'t>,
        terminators: &[TokenKind],
    ) -> SemanticResult<()> {
        let operator = self.peek();
        match operator.kind {
            TokenKind::Assign => {
                self.advance();
                if self.check(TokenKind::Input) {
                    self.input_value(&target.data_type)?;
                } else {
                    let value = self.value_type(terminators)?;
                    if value != target.data_type {
                        return Err(self.error_at(
                            SemanticErrorKind::AssignMismatch {
                                target: target.data_type.clone(),
                                value,
                            },
                            operator,
                        ));
                    }
                }
                self.mark_initialized(target);
            }
            kind @ (TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign) => {
                self.advance();
                let Some(op) = BinaryOperator::from_compound(kind) else {
                    return Err(self.error(SemanticErrorKind::Internal {
                        message: format!("no operator behind '{}'", kind.as_str()),
                    }));
                };
                if !target.data_type.is_numeric() {
                    return Err(self.error_at(
                        SemanticErrorKind::CompoundRequiresNumeric {
                            operator: kind.as_str(),
                            found: target.data_type.clone(),
                        },
                        operator,
                    ));
                }
                if op.is_division() && self.zero_literal_next() {
                    return Err(self.error(SemanticErrorKind::DivisionByZero));
                }
                if !target.initialized {
                    self.warn_uninitialized(&target.name, target.token);
                }
                let value = self.value_type(terminators)?;
                let result = op.result_type(&target.data_type, &value);
                if value != target.data_type || result.as_ref() != Some(&target.data_type) {
                    return Err(self.error_at(
                        SemanticErrorKind::AssignMismatch {
                            target: target.data_type.clone(),
                            value,
                        },
                        operator,
                    ));
                }
            }
            TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                self.require_int_target(target)?;
            }
            _ => {
                return Err(self.error(SemanticErrorKind::ExpectedToken {
                    expected: "an assignment operator".to_string(),
                    found: operator.lexeme.clone(),
                }))
            }
        }
        Ok(())
    }

    /// Type of the expression from the cursor to its end.
    fn value_type(&mut self, terminators: &[TokenKind]) -> SemanticResult<DataType> {
        let end = self.expression_end(terminators)?;
        self.expression_type(end)
    }

    fn require_int_target(&self, target: &Target<'t>) -> SemanticResult<()> {
        if target.data_type != DataType::Int {
            return Err(self.error_at(
                SemanticErrorKind::IncDecRequiresInt {
                    found: target.data_type.clone(),
                },
                target.token,
            ));
        }
        Ok(())
    }

    /// `npt("prompt")` assigned to a `target` of primitive type.
    pub(super) fn input_value(&mut self, target: &DataType) -> SemanticResult<()> {
        let input = self.advance();
        if !target.is_primitive() {
            return Err(self.error_at(
                SemanticErrorKind::InputTarget {
                    found: target.clone(),
                },
                input,
            ));
        }
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::StringLit, "a prompt string")?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(())
    }

    fn mark_initialized(&mut self, target: &Target<'t>) {
        let Some(symbol) = self.resolve_mut(&target.name) else {
            return;
        };
        match (&target.place, &mut symbol.kind) {
            (
                Place::Member(member),
                SymbolKind::StructInstance {
                    initialized_members,
                    ..
                },
            ) => {
                initialized_members.insert(member.clone());
            }
            _ => symbol.initialized = true,
        }
    }

    pub(super) fn warn_uninitialized(&self, name: &str, token: &Token) {
        warn!(
            "{}: '{name}' may be used before it is initialized",
            token.location
        );
    }

    fn print_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        let open = self.position;
        self.expect(TokenKind::LParen, "'('")?;
        let close = self.matching_close(open)?;
        self.argument_types(close)?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Conditionals
    // ---------------------------------------------------------------------

    /// `( expr )` whose type must be `bln` or `nt`.
    fn condition(&mut self, construct: &'static str) -> SemanticResult<()> {
        let open = self.position;
        self.expect(TokenKind::LParen, "'('")?;
        let close = self.matching_close(open)?;
        let found = self.expression_type(close)?;
        self.expect(TokenKind::RParen, "')'")?;
        if !matches!(found, DataType::Bool | DataType::Int) {
            return Err(self.error_at(
                SemanticErrorKind::ConditionType { construct, found },
                self.token_at(open),
            ));
        }
        Ok(())
    }

    fn if_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        self.condition("f")?;
        self.block("if block")?;
        let mut iterations = 0;
        while self.check(TokenKind::ElseIf) {
            self.tick(&mut iterations)?;
            self.advance();
            self.condition("lsf")?;
            self.block("else-if block")?;
        }
        if self.check(TokenKind::Else) {
            self.advance();
            self.block("else block")?;
        }
        Ok(())
    }

    fn switch_statement(&mut self) -> SemanticResult<()> {
        let keyword = self.advance();
        if self.blocks.contains(&BlockKind::Switch) {
            return Err(self.error_at(SemanticErrorKind::NestedSwitch, keyword));
        }
        let open = self.position;
        self.expect(TokenKind::LParen, "'('")?;
        let close = self.matching_close(open)?;
        let selector = self.expression_type(close)?;
        self.expect(TokenKind::RParen, "')'")?;
        if !matches!(selector, DataType::Int | DataType::Char) {
            return Err(self.error_at(
                SemanticErrorKind::SwitchSelectorType { found: selector },
                self.token_at(open),
            ));
        }

        self.expect(TokenKind::LBrace, "'{'")?;
        self.in_context(BlockKind::Switch, |this| this.switch_body(&selector))?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(())
    }

    fn switch_body(&mut self, selector: &DataType) -> SemanticResult<()> {
        let mut labels = FxHashSet::default();
        let mut seen_default = false;
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let token = self.peek();
            match token.kind {
                TokenKind::RBrace => return Ok(()),
                TokenKind::Case => {
                    self.advance();
                    let label = self.advance();
                    let fits = match selector {
                        DataType::Int => {
                            matches!(label.kind, TokenKind::IntLit | TokenKind::NegIntLit)
                        }
                        _ => label.kind == TokenKind::CharLit,
                    };
                    if !fits {
                        return Err(self.error_at(
                            SemanticErrorKind::CaseLabelType {
                                expected: selector.clone(),
                                found: DataType::of_literal(label.kind)
                                    .map_or_else(|| label.lexeme.clone(), |ty| ty.to_string()),
                            },
                            label,
                        ));
                    }
                    if !labels.insert(label.lexeme.clone()) {
                        return Err(self.error_at(
                            SemanticErrorKind::DuplicateCaseLabel {
                                label: label.lexeme.clone(),
                            },
                            label,
                        ));
                    }
                    self.expect(TokenKind::Colon, "':'")?;
                    if self.case_body()? != Some(Stmt::Break) {
                        return Err(self.error_at(
                            SemanticErrorKind::MissingBreak {
                                block: format!("case '{}'", label.lexeme),
                            },
                            token,
                        ));
                    }
                }
                TokenKind::Default => {
                    if seen_default {
                        return Err(self.error_at(SemanticErrorKind::MultipleDefaults, token));
                    }
                    seen_default = true;
                    self.advance();
                    self.expect(TokenKind::Colon, "':'")?;
                    if self.case_body()? != Some(Stmt::Break) {
                        return Err(self.error_at(
                            SemanticErrorKind::MissingBreak {
                                block: "default case".to_string(),
                            },
                            token,
                        ));
                    }
                }
                TokenKind::Eof => return Err(self.error(SemanticErrorKind::UnexpectedEnd)),
                _ => {
                    return Err(self.error(SemanticErrorKind::UnexpectedToken {
                        found: token.lexeme.clone(),
                        context: "switch body",
                    }))
                }
            }
        }
    }

    fn case_body(&mut self) -> SemanticResult<Option<Stmt>> {
        self.in_scope("case block", |this| {
            this.in_context(BlockKind::Case, |this| {
                this.statements_until(&[TokenKind::Case, TokenKind::Default, TokenKind::RBrace])
            })
        })
    }

    // ---------------------------------------------------------------------
    // Loops
    // ---------------------------------------------------------------------

    fn while_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        self.condition("whl")?;
        self.in_context(BlockKind::Loop, |this| this.block("while block"))?;
        Ok(())
    }

    fn do_while_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        self.in_context(BlockKind::Loop, |this| this.block("do block"))?;
        self.expect(TokenKind::While, "'whl'")?;
        self.condition("d-whl")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    /// `fr ( i = e ; cond ; update ) { ... }`
    fn for_statement(&mut self) -> SemanticResult<()> {
        self.advance();
        let open = self.position;
        self.expect(TokenKind::LParen, "'('")?;
        let close = self.matching_close(open)?;

        let target = self.assignment_target()?;
        if target.data_type != DataType::Int {
            return Err(self.error_at(
                SemanticErrorKind::ForVariableType {
                    clause: "initialization",
                    found: target.data_type,
                },
                target.token,
            ));
        }
        let assign = self.expect(TokenKind::Assign, "'='")?;
        let value = self.value_type(&[])?;
        if value != DataType::Int {
            return Err(self.error_at(
                SemanticErrorKind::AssignMismatch {
                    target: DataType::Int,
                    value,
                },
                assign,
            ));
        }
        self.mark_initialized(&target);
        self.expect(TokenKind::Semicolon, "';'")?;

        let condition = self.value_type(&[])?;
        if condition != DataType::Bool {
            return Err(self.error(SemanticErrorKind::ForConditionType { found: condition }));
        }
        self.expect(TokenKind::Semicolon, "';'")?;

        self.for_update()?;
        if self.position != close {
            let token = self.peek();
            return Err(self.error(SemanticErrorKind::UnexpectedToken {
                found: token.lexeme.clone(),
                context: "for loop header",
            }));
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.in_context(BlockKind::Loop, |this| this.block("for block"))?;
        Ok(())
    }

    fn for_update(&mut self) -> SemanticResult<()> {
        match self.peek_kind() {
            TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                let target = self.assignment_target()?;
                self.require_for_variable(&target)
            }
            TokenKind::Identifier => {
                let target = self.assignment_target()?;
                self.require_for_variable(&target)?;
                match self.peek_kind() {
                    TokenKind::Increment
                    | TokenKind::Decrement
                    | TokenKind::PlusAssign
                    | TokenKind::MinusAssign
                    | TokenKind::StarAssign
                    | TokenKind::SlashAssign
                    | TokenKind::PercentAssign => {
                        self.assignment_tail(&target, &[TokenKind::RParen])
                    }
                    _ => Err(self.error(SemanticErrorKind::ForUpdate)),
                }
            }
            _ => Err(self.error(SemanticErrorKind::ForUpdate)),
        }
    }

    fn require_for_variable(&self, target: &Target<'t>) -> SemanticResult<()> {
        if target.data_type != DataType::Int {
            return Err(self.error_at(
                SemanticErrorKind::ForVariableType {
                    clause: "update",
                    found: target.data_type.clone(),
                },
                target.token,
            ));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Jumps
    // ---------------------------------------------------------------------

    /// Nearest enclosing loop or case; a bare switch never encloses a statement.
    fn innermost_jump_target(&self) -> Option<BlockKind> {
        self.blocks
            .iter()
            .rev()
            .copied()
            .find(|kind| matches!(kind, BlockKind::Loop | BlockKind::Case))
    }

    fn break_statement(&mut self) -> SemanticResult<Stmt> {
        let keyword = self.advance();
        if self.innermost_jump_target().is_none() {
            return Err(self.error_at(SemanticErrorKind::BreakOutsideLoop, keyword));
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Break)
    }

    fn continue_statement(&mut self) -> SemanticResult<()> {
        let keyword = self.advance();
        match self.innermost_jump_target() {
            Some(BlockKind::Loop) => {}
            Some(_) => return Err(self.error_at(SemanticErrorKind::ContinueInSwitch, keyword)),
            None => return Err(self.error_at(SemanticErrorKind::ContinueOutsideLoop, keyword)),
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn return_statement(&mut self) -> SemanticResult<()> {
        let keyword = self.advance();
        let Some(context) = self.function.clone() else {
            return Err(self.error_at(SemanticErrorKind::ReturnOutsideFunction, keyword));
        };

        if context.is_entry_point {
            let zero = self.peek();
            let bare = self.check(TokenKind::Semicolon);
            let returns_zero = zero.kind == TokenKind::IntLit
                && zero.lexeme == "0"
                && self.kind_at(self.position + 1) == TokenKind::Semicolon;
            if !bare && !returns_zero {
                return Err(self.error_at(SemanticErrorKind::EntryPointReturn, keyword));
            }
            if returns_zero {
                self.advance();
            }
        } else if context.return_type == DataType::Void {
            if !self.check(TokenKind::Semicolon) {
                return Err(self.error_at(
                    SemanticErrorKind::VoidReturnsValue {
                        function: context.name,
                    },
                    keyword,
                ));
            }
        } else {
            if self.check(TokenKind::Semicolon) {
                return Err(self.error_at(
                    SemanticErrorKind::MissingReturnValue {
                        function: context.name,
                        expected: context.return_type,
                    },
                    keyword,
                ));
            }
            let found = self.value_type(&[])?;
            if found != context.return_type {
                return Err(self.error_at(
                    SemanticErrorKind::ReturnTypeMismatch {
                        expected: context.return_type,
                        found,
                    },
                    keyword,
                ));
            }
        }

        if let Some(context) = self.function.as_mut() {
            context.saw_return = true;
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    /// `end ;` must be the last statement at the top level of `mn`.
    fn end_statement(&mut self) -> SemanticResult<()> {
        let keyword = self.advance();
        let in_entry_point = self.function.as_ref().is_some_and(|ctx| ctx.is_entry_point);
        if !in_entry_point || self.block_depth > 0 {
            return Err(self.error_at(SemanticErrorKind::MisplacedEnd, keyword));
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        if !self.check(TokenKind::RBrace) {
            return Err(self.error_at(SemanticErrorKind::MisplacedEnd, keyword));
        }
        Ok(())
    }
}

/// Symbols that may stand alone as an expression operand.
pub(super) fn is_value(symbol: &Symbol) -> bool {
    matches!(
        symbol.kind,
        SymbolKind::Variable | SymbolKind::Constant | SymbolKind::StructInstance { .. }
    )
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;
    use crate::semantic::analyzer::{analyze, Analysis};
    use crate::semantic::errors::SemanticErrorKind;
    use crate::semantic::types::DataType;

    fn program(source: &str) -> Analysis {
        let out = tokenize(source);
        assert!(out.is_clean(), "lexical errors: {:?}", out.errors);
        analyze(&out.tokens)
    }

    fn in_main(body: &str) -> Analysis {
        program(&format!("mn() {{ {body} end; }}"))
    }

    fn first_error(body: &str) -> SemanticErrorKind {
        let analysis = in_main(body);
        assert!(!analysis.accepted, "expected an error for: {body}");
        analysis.errors[0].kind.clone()
    }

    #[test]
    fn test_assignment_requires_exact_type() {
        assert!(in_main("dbl dv; dv = 1.50;").accepted);
        assert_eq!(
            first_error("dbl dv; dv = 1;"),
            SemanticErrorKind::AssignMismatch {
                target: DataType::Double,
                value: DataType::Int
            }
        );
    }

    #[test]
    fn test_compound_assignment_rules() {
        assert!(in_main("dbl dv = 1.00; dv += 2.00;").accepted);
        assert_eq!(
            first_error("dbl dv = 1.00; dv += 2;"),
            SemanticErrorKind::AssignMismatch {
                target: DataType::Double,
                value: DataType::Int
            }
        );
        assert_eq!(
            first_error("nt n = 1; n += 2.50;"),
            SemanticErrorKind::AssignMismatch {
                target: DataType::Int,
                value: DataType::Double
            }
        );
        assert_eq!(
            first_error("bln b = tr; b += 1;"),
            SemanticErrorKind::CompoundRequiresNumeric {
                operator: "+=",
                found: DataType::Bool
            }
        );
        assert_eq!(first_error("nt n = 4; n /= 0;"), SemanticErrorKind::DivisionByZero);
    }

    #[test]
    fn test_constant_reassignment() {
        assert_eq!(
            first_error("cnst nt k = 1; k = 2;"),
            SemanticErrorKind::ConstantReassignment { name: "k".into() }
        );
        assert_eq!(
            first_error("cnst nt k = 1; k++;"),
            SemanticErrorKind::ConstantReassignment { name: "k".into() }
        );
    }

    #[test]
    fn test_increment_requires_int() {
        assert!(in_main("nt i = 0; i++; ++i;").accepted);
        assert_eq!(
            first_error("dbl dv = 0.50; dv++;"),
            SemanticErrorKind::IncDecRequiresInt {
                found: DataType::Double
            }
        );
    }

    #[test]
    fn test_input_assignment() {
        assert!(in_main("strng s; s = npt(\"name: \");").accepted);
        assert!(in_main("nt n = npt(\"n: \");").accepted);
    }

    #[test]
    fn test_condition_types() {
        assert!(in_main("nt n = 1; f (n) { n = 2; } lsf (n > 1) { n = 3; } ls { n = 4; }").accepted);
        assert_eq!(
            first_error("strng s = \"x\"; f (s) { s = \"y\"; }"),
            SemanticErrorKind::ConditionType {
                construct: "f",
                found: DataType::Str
            }
        );
        assert_eq!(
            first_error("nt n = 0; ls { n = 1; }"),
            SemanticErrorKind::ConditionalWithoutIf { keyword: "ls" }
        );
    }

    #[test]
    fn test_block_scopes_are_released() {
        assert_eq!(
            first_error("f (tr) { nt inner = 1; } inner = 2;"),
            SemanticErrorKind::UndefinedVariable {
                name: "inner".into()
            }
        );
        assert!(in_main("nt x = 1; f (tr) { dbl x = 2.00; x = 3.00; } x = 4;").accepted);
    }

    #[test]
    fn test_loops() {
        assert!(in_main("nt i; fr (i = 0; i < 3; i++) { prnt(i); }").accepted);
        assert!(in_main("nt i = 0; whl (i < 3) { i += 1; }").accepted);
        assert!(in_main("nt i = 0; d { i++; } whl (i < 3);").accepted);
        assert_eq!(
            first_error("nt i; fr (i = 0; i; i++) { }"),
            SemanticErrorKind::ForConditionType {
                found: DataType::Int
            }
        );
        assert_eq!(
            first_error("dbl dv; fr (dv = 0; tr; dv++) { }"),
            SemanticErrorKind::ForVariableType {
                clause: "initialization",
                found: DataType::Double
            }
        );
    }

    #[test]
    fn test_break_and_continue_contexts() {
        assert_eq!(first_error("brk;"), SemanticErrorKind::BreakOutsideLoop);
        assert_eq!(first_error("cntn;"), SemanticErrorKind::ContinueOutsideLoop);
        assert!(in_main("whl (tr) { f (tr) { brk; } cntn; }").accepted);
        assert_eq!(
            first_error("nt n = 1; whl (tr) { swtch (n) { cs 1: cntn; brk; } }"),
            SemanticErrorKind::ContinueInSwitch
        );
    }

    #[test]
    fn test_switch_rules() {
        assert!(in_main("nt n = 1; swtch (n) { cs 1: prnt(\"one\"); brk; dflt: brk; }").accepted);
        assert!(in_main("chr c = 'a'; swtch (c) { cs 'a': brk; cs 'b': brk; }").accepted);
        assert_eq!(
            first_error("nt n = 1; swtch (n) { cs 1: brk; cs 1: brk; }"),
            SemanticErrorKind::DuplicateCaseLabel { label: "1".into() }
        );
        assert_eq!(
            first_error("nt n = 1; swtch (n) { cs 'a': brk; }"),
            SemanticErrorKind::CaseLabelType {
                expected: DataType::Int,
                found: "chr".into()
            }
        );
        assert_eq!(
            first_error("nt n = 1; swtch (n) { cs 1: n = 2; }"),
            SemanticErrorKind::MissingBreak {
                block: "case '1'".into()
            }
        );
        assert_eq!(
            first_error("nt n = 1; swtch (n) { dflt: brk; dflt: brk; }"),
            SemanticErrorKind::MultipleDefaults
        );
        assert_eq!(
            first_error("dbl dv = 1.00; swtch (dv) { dflt: brk; }"),
            SemanticErrorKind::SwitchSelectorType {
                found: DataType::Double
            }
        );
        assert_eq!(
            first_error("nt n = 1; swtch (n) { cs 1: swtch (n) { dflt: brk; } brk; }"),
            SemanticErrorKind::NestedSwitch
        );
    }

    #[test]
    fn test_return_rules() {
        assert!(program("fnctn nt g(nt a) { rtrn a + 1; } mn() { end; }").accepted);
        assert_eq!(
            program("fnctn vd g() { rtrn 1; } mn() { end; }").errors[0].kind,
            SemanticErrorKind::VoidReturnsValue { function: "g".into() }
        );
        assert_eq!(
            program("fnctn nt g() { rtrn 1.50; } mn() { end; }").errors[0].kind,
            SemanticErrorKind::ReturnTypeMismatch {
                expected: DataType::Int,
                found: DataType::Double
            }
        );
        assert!(in_main("rtrn 0;").accepted);
        assert_eq!(first_error("rtrn 1;"), SemanticErrorKind::EntryPointReturn);
        assert_eq!(
            program("rtrn; mn() { end; }").errors[0].kind,
            SemanticErrorKind::ReturnOutsideFunction
        );
    }

    #[test]
    fn test_end_placement() {
        assert_eq!(
            program("fnctn vd g() { end; } mn() { end; }").errors[0].kind,
            SemanticErrorKind::MisplacedEnd
        );
        assert_eq!(first_error("f (tr) { end; }"), SemanticErrorKind::MisplacedEnd);
        assert_eq!(
            program("mn() { end; nt x; }").errors[0].kind,
            SemanticErrorKind::MisplacedEnd
        );
    }

    #[test]
    fn test_struct_declaration_only_global() {
        assert_eq!(
            first_error("strct P { nt x; };"),
            SemanticErrorKind::StructOutsideGlobal
        );
    }

    #[test]
    fn test_struct_member_assignment() {
        let analysis = program("strct P { nt x; dbl y; }; mn() { dfstrct P p; p.x = 1; p.y = 2.00; end; }");
        assert!(analysis.accepted, "{:?}", analysis.messages());
        assert_eq!(
            program("strct P { nt x; }; mn() { dfstrct P p; p.x = 1.50; end; }").errors[0].kind,
            SemanticErrorKind::AssignMismatch {
                target: DataType::Int,
                value: DataType::Double
            }
        );
    }
}
