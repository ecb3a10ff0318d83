//! Expression typing
//!
//! Precedence climbing over a token range `[position, end)`. Operands are
//! literals, variables, array elements, struct members, calls, parenthesised
//! expressions and the unary `!`, `++`, `--` forms. Each operand and operator
//! is checked as soon as it is seen.

use super::analyzer::Analyzer;
use super::errors::{SemanticErrorKind, SemanticResult};
use super::statements::is_value;
use super::symbol::{ArraySize, Builtin, Symbol, SymbolKind};
use super::types::{BinaryOperator, DataType};
use crate::lexer::{Token, TokenKind};

/// Precedence floor that admits every binary operator.
const LOWEST_PRECEDENCE: u8 = 0;

impl<'t> Analyzer<'t> {
    /// Type of the expression ending just before token `end`. The cursor is
    /// left on `end`.
    pub(super) fn expression_type(&mut self, end: usize) -> SemanticResult<DataType> {
        if self.position >= end {
            return Err(self.error(SemanticErrorKind::IncompleteExpression));
        }
        let data_type = self.nested(|this| this.binary(end, LOWEST_PRECEDENCE))?;
        if self.position < end {
            let token = self.peek();
            return Err(match token.kind {
                TokenKind::RParen => self.error(SemanticErrorKind::UnexpectedClosingParenthesis),
                _ => self.error(SemanticErrorKind::UnexpectedToken {
                    found: token.lexeme.clone(),
                    context: "expression",
                }),
            });
        }
        Ok(data_type)
    }

    fn binary(&mut self, end: usize, min_precedence: u8) -> SemanticResult<DataType> {
        let mut left = self.operand(end)?;
        let mut iterations = 0;
        while self.position < end {
            self.tick(&mut iterations)?;
            let token = self.peek();
            let Some(op) = BinaryOperator::from_kind(token.kind) else {
                break;
            };
            if op.precedence() < min_precedence {
                break;
            }
            self.advance();
            if self.position >= end {
                return Err(self.error_at(
                    SemanticErrorKind::MissingRightOperand {
                        operator: op.symbol(),
                    },
                    token,
                ));
            }
            if op.is_division() && self.zero_literal_next() {
                return Err(self.error(SemanticErrorKind::DivisionByZero));
            }
            let right = self.binary(end, op.precedence() + 1)?;
            left = match op.result_type(&left, &right) {
                Some(result) => result,
                None => {
                    return Err(self.error_at(
                        SemanticErrorKind::OperatorMismatch {
                            operator: op.symbol(),
                            left,
                            right,
                        },
                        token,
                    ))
                }
            };
        }
        Ok(left)
    }

    /// The next token is a literal zero (`0` or `0.00` after normalization).
    pub(super) fn zero_literal_next(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::IntLit => token.lexeme == "0",
            TokenKind::DoubleLit => token.lexeme.parse::<f64>().is_ok_and(|v| v == 0.0),
            _ => false,
        }
    }

    fn operand(&mut self, end: usize) -> SemanticResult<DataType> {
        if self.position >= end {
            return Err(self.error(SemanticErrorKind::IncompleteExpression));
        }
        let token = self.peek();
        if let Some(literal) = DataType::of_literal(token.kind) {
            self.advance();
            return Ok(literal);
        }
        match token.kind {
            TokenKind::LParen => {
                let close = self.matching_close(self.position)?;
                if close >= end {
                    return Err(self.error(SemanticErrorKind::Unclosed { delimiter: "(" }));
                }
                self.advance();
                let inner = self.expression_type(close)?;
                self.advance();
                Ok(inner)
            }
            TokenKind::Not => {
                self.advance();
                let found = self.nested(|this| this.operand(end))?;
                if found != DataType::Bool {
                    return Err(self.error_at(SemanticErrorKind::NotRequiresBool { found }, token));
                }
                Ok(DataType::Bool)
            }
            TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                let target = self.assignment_target()?;
                if target.data_type != DataType::Int {
                    return Err(self.error_at(
                        SemanticErrorKind::IncDecRequiresInt {
                            found: target.data_type,
                        },
                        target.token,
                    ));
                }
                Ok(DataType::Int)
            }
            TokenKind::Identifier => self.identifier_operand(end),
            TokenKind::RParen => Err(self.error(SemanticErrorKind::UnexpectedClosingParenthesis)),
            TokenKind::Input => Err(self.error(SemanticErrorKind::InputInExpression)),
            _ => Err(self.error(SemanticErrorKind::UnexpectedToken {
                found: token.lexeme.clone(),
                context: "expression",
            })),
        }
    }

    fn identifier_operand(&mut self, end: usize) -> SemanticResult<DataType> {
        let token = self.peek();
        let next = if self.position + 1 < end {
            self.kind_at(self.position + 1)
        } else {
            TokenKind::Eof
        };

        if next == TokenKind::LParen {
            let returns = self.call_type()?;
            if returns == DataType::Void {
                return Err(self.error_at(
                    SemanticErrorKind::VoidInExpression {
                        name: token.lexeme.clone(),
                    },
                    token,
                ));
            }
            return Ok(returns);
        }

        let symbol = match self.resolve(&token.lexeme) {
            Some(symbol) if is_value(&symbol) => symbol,
            Some(Symbol {
                kind: SymbolKind::Function(_),
                name,
                ..
            }) => {
                return Err(
                    self.error_at(SemanticErrorKind::FunctionWithoutCall { name }, token)
                )
            }
            Some(symbol) => {
                return Err(self.error_at(
                    SemanticErrorKind::StructTypeAsValue { name: symbol.name },
                    token,
                ))
            }
            None if Builtin::lookup(&token.lexeme).is_some() => {
                return Err(self.error_at(
                    SemanticErrorKind::FunctionWithoutCall {
                        name: token.lexeme.clone(),
                    },
                    token,
                ))
            }
            None => {
                return Err(self.error_at(
                    SemanticErrorKind::UndefinedVariable {
                        name: token.lexeme.clone(),
                    },
                    token,
                ))
            }
        };
        self.advance();

        match next {
            TokenKind::LBracket => self.element_type(&symbol, token),
            TokenKind::Dot => {
                let (member, data_type, initialized) = self.member(&symbol, token)?;
                if !initialized {
                    self.warn_uninitialized(&format!("{}.{member}", symbol.name), token);
                }
                Ok(data_type)
            }
            TokenKind::Increment | TokenKind::Decrement => {
                if symbol.is_constant() {
                    return Err(self.error_at(
                        SemanticErrorKind::ConstantReassignment { name: symbol.name },
                        token,
                    ));
                }
                if symbol.is_array() || symbol.data_type != DataType::Int {
                    return Err(self.error_at(
                        SemanticErrorKind::IncDecRequiresInt {
                            found: symbol.data_type,
                        },
                        token,
                    ));
                }
                self.advance();
                Ok(DataType::Int)
            }
            _ => {
                if symbol.is_array() {
                    return Err(self.error_at(
                        SemanticErrorKind::ArrayWithoutIndex { name: symbol.name },
                        token,
                    ));
                }
                if !symbol.initialized {
                    self.warn_uninitialized(&symbol.name, token);
                }
                Ok(symbol.data_type)
            }
        }
    }

    /// `[i]` or `[i][j]` after an array name; returns the element type.
    pub(super) fn element_type(&mut self, symbol: &Symbol, name: &Token) -> SemanticResult<DataType> {
        let Some(shape) = symbol.array.as_ref() else {
            return Err(self.error_at(
                SemanticErrorKind::NotAnArray {
                    name: symbol.name.clone(),
                },
                name,
            ));
        };
        let wrong_count = SemanticErrorKind::WrongIndexCount {
            name: symbol.name.clone(),
            dimensions: shape.dimensions.len(),
        };

        for size in &shape.dimensions {
            if !self.check(TokenKind::LBracket) {
                return Err(self.error_at(wrong_count, name));
            }
            let close = self.matching_close(self.position)?;
            self.advance();
            let index = self.peek();
            if close == self.position + 1 {
                self.check_literal_index(index, size)?;
            }
            let found = self.expression_type(close)?;
            if found != DataType::Int {
                return Err(self.error_at(SemanticErrorKind::IndexType { found }, index));
            }
            self.advance();
        }
        if self.check(TokenKind::LBracket) {
            return Err(self.error_at(wrong_count, name));
        }
        Ok(symbol.data_type.clone())
    }

    fn check_literal_index(&self, index: &Token, size: &ArraySize) -> SemanticResult<()> {
        if !matches!(index.kind, TokenKind::IntLit | TokenKind::NegIntLit) {
            return Ok(());
        }
        let ArraySize::Literal(size) = *size else {
            return Ok(());
        };
        let Ok(value) = index.lexeme.parse::<i64>() else {
            return Ok(());
        };
        let in_bounds = usize::try_from(value).is_ok_and(|v| v < size);
        if !in_bounds {
            return Err(self.error_at(
                SemanticErrorKind::IndexOutOfBounds { index: value, size },
                index,
            ));
        }
        Ok(())
    }

    /// `.member` after a struct instance; returns the member name, its type
    /// and whether it has been assigned.
    pub(super) fn member(
        &mut self,
        symbol: &Symbol,
        name: &Token,
    ) -> SemanticResult<(String, DataType, bool)> {
        let SymbolKind::StructInstance {
            struct_name,
            initialized_members,
        } = &symbol.kind
        else {
            return Err(self.error_at(
                SemanticErrorKind::NotAStructInstance {
                    name: symbol.name.clone(),
                },
                name,
            ));
        };
        self.expect(TokenKind::Dot, "'.'")?;
        let member = self.expect(TokenKind::Identifier, "a member name")?;

        let Some(Symbol {
            kind: SymbolKind::StructType { members },
            ..
        }) = self.resolve(struct_name)
        else {
            return Err(self.error_at(
                SemanticErrorKind::UndefinedStruct {
                    name: struct_name.clone(),
                },
                name,
            ));
        };
        let Some(field) = members.get(&member.lexeme) else {
            return Err(self.error_at(
                SemanticErrorKind::NoSuchMember {
                    structure: struct_name.clone(),
                    member: member.lexeme.clone(),
                },
                member,
            ));
        };
        Ok((
            member.lexeme.clone(),
            field.data_type.clone(),
            initialized_members.contains(&member.lexeme),
        ))
    }

    /// `name(args)`: checks the arguments and returns the callee's return type.
    pub(super) fn call_type(&mut self) -> SemanticResult<DataType> {
        let name = self.expect(TokenKind::Identifier, "a function name")?;
        let callee = self.resolve(&name.lexeme);

        let signature = match (&callee, Builtin::lookup(&name.lexeme)) {
            (Some(symbol), _) => match symbol.function_info() {
                Some(info) => Some(info.clone()),
                None => {
                    return Err(self.error_at(
                        SemanticErrorKind::NotAFunction {
                            name: name.lexeme.clone(),
                        },
                        name,
                    ))
                }
            },
            (None, Some(_)) => None,
            (None, None) => {
                return Err(self.error_at(
                    SemanticErrorKind::UndefinedFunction {
                        name: name.lexeme.clone(),
                    },
                    name,
                ))
            }
        };

        let open = self.position;
        let close = self.matching_close(open)?;
        self.advance();

        let Some(info) = signature else {
            // Only built-ins reach here.
            let builtin = Builtin::lookup(&name.lexeme).ok_or_else(|| {
                self.error(SemanticErrorKind::Internal {
                    message: format!("'{}' is not a built-in", name.lexeme),
                })
            })?;
            return self.builtin_call(builtin, name, close);
        };

        let arguments = self.argument_types(close)?;
        self.expect(TokenKind::RParen, "')'")?;
        if arguments.len() != info.params.len() {
            return Err(self.error_at(
                SemanticErrorKind::ArgumentCount {
                    function: name.lexeme.clone(),
                    expected: info.params.len(),
                    found: arguments.len(),
                },
                name,
            ));
        }
        for (index, ((found, at), param)) in arguments.into_iter().zip(&info.params).enumerate() {
            if found != param.data_type {
                return Err(self.error_at(
                    SemanticErrorKind::ArgumentType {
                        index: index + 1,
                        expected: param.data_type.clone(),
                        found,
                    },
                    at,
                ));
            }
        }
        Ok(info.return_type)
    }

    fn builtin_call(
        &mut self,
        builtin: Builtin,
        name: &'t Token,
        close: usize,
    ) -> SemanticResult<DataType> {
        // `len(arr)` takes a whole array, which is not an expression.
        let whole_array = builtin == Builtin::Len
            && close == self.position + 1
            && self.peek().kind == TokenKind::Identifier
            && self.resolve(&self.peek().lexeme).is_some_and(|s| s.is_array());

        let arguments = if whole_array {
            let token = self.advance();
            vec![(DataType::Int, token)]
        } else {
            self.argument_types(close)?
        };
        self.expect(TokenKind::RParen, "')'")?;

        if arguments.len() != builtin.arity() {
            return Err(self.error_at(
                SemanticErrorKind::ArgumentCount {
                    function: builtin.name().to_string(),
                    expected: builtin.arity(),
                    found: arguments.len(),
                },
                name,
            ));
        }
        if builtin == Builtin::Len && !whole_array {
            if let Some((found, at)) = arguments.into_iter().next() {
                if found != DataType::Str {
                    return Err(self.error_at(
                        SemanticErrorKind::ArgumentType {
                            index: 1,
                            expected: DataType::Str,
                            found,
                        },
                        at,
                    ));
                }
            }
        }
        Ok(builtin.return_type())
    }

    /// Type each comma-separated argument up to the `)` at `close`.
    pub(super) fn argument_types(
        &mut self,
        close: usize,
    ) -> SemanticResult<Vec<(DataType, &'t Token)>> {
        let mut arguments = Vec::new();
        if self.position == close {
            return Ok(arguments);
        }
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let start = self.peek();
            let end = self.expression_end(&[TokenKind::Comma])?.min(close);
            let found = self.expression_type(end)?;
            arguments.push((found, start));
            if self.position == close {
                return Ok(arguments);
            }
            self.expect(TokenKind::Comma, "',' or ')'")?;
        }
    }
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
    fn test_precedence_types_mixed_expression() {
        assert!(in_main("bln b = 1 + 2 * 3 > 4 && !fls;").accepted);
        assert!(in_main("dbl dv = (1 + 2) * 1.50;").accepted);
        assert!(in_main("strng s = \"a\" ` \"b\";").accepted);
    }

    #[test]
    fn test_operator_mismatch() {
        assert_eq!(
            first_error("nt x = 1 + \"a\";"),
            SemanticErrorKind::OperatorMismatch {
                operator: "+",
                left: DataType::Int,
                right: DataType::Str
            }
        );
        assert_eq!(
            first_error("bln b = !1;"),
            SemanticErrorKind::NotRequiresBool {
                found: DataType::Int
            }
        );
    }

    #[test]
    fn test_division_by_literal_zero() {
        assert_eq!(first_error("nt x = 4 / 0;"), SemanticErrorKind::DivisionByZero);
        assert_eq!(first_error("dbl dv = 4.00 % 0.00;"), SemanticErrorKind::DivisionByZero);
        assert!(in_main("nt z = 0; nt x = 4 / z;").accepted);
    }

    #[test]
    fn test_undefined_and_misused_names() {
        assert_eq!(
            first_error("nt x = y;"),
            SemanticErrorKind::UndefinedVariable { name: "y".into() }
        );
        assert_eq!(
            first_error("nt x = g(1);"),
            SemanticErrorKind::UndefinedFunction { name: "g".into() }
        );
        assert_eq!(
            first_error("nt a[2]; nt x = a;"),
            SemanticErrorKind::ArrayWithoutIndex { name: "a".into() }
        );
        assert_eq!(
            first_error("nt v = 1; nt x = v(2);"),
            SemanticErrorKind::NotAFunction { name: "v".into() }
        );
    }

    #[test]
    fn test_calls_check_arity_and_types() {
        let header = "fnctn nt add(nt a, nt b) { rtrn a + b; } fnctn vd show() { } ";
        assert!(program(&format!("{header}mn() {{ nt r = add(1, 2); show(); end; }}")).accepted);
        assert_eq!(
            program(&format!("{header}mn() {{ nt r = add(1); end; }}")).errors[0].kind,
            SemanticErrorKind::ArgumentCount {
                function: "add".into(),
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            program(&format!("{header}mn() {{ nt r = add(1, 2.50); end; }}")).errors[0].kind,
            SemanticErrorKind::ArgumentType {
                index: 2,
                expected: DataType::Int,
                found: DataType::Double
            }
        );
        assert_eq!(
            program(&format!("{header}mn() {{ nt r = show(); end; }}")).errors[0].kind,
            SemanticErrorKind::VoidInExpression { name: "show".into() }
        );
        assert_eq!(
            program(&format!("{header}mn() {{ nt r = add; end; }}")).errors[0].kind,
            SemanticErrorKind::FunctionWithoutCall { name: "add".into() }
        );
    }

    #[test]
    fn test_nested_call_arguments() {
        let source = "fnctn nt add(nt a, nt b) { rtrn a + b; } mn() { nt r = add(add(1, 2), (3)); end; }";
        assert!(program(source).accepted);
    }

    #[test]
    fn test_builtins() {
        assert!(in_main("nt n = len(\"abc\");").accepted);
        assert!(in_main("nt a[3]; nt n = len(a);").accepted);
        assert!(in_main("strng s = scan();").accepted);
        assert_eq!(
            first_error("nt n = len(1);"),
            SemanticErrorKind::ArgumentType {
                index: 1,
                expected: DataType::Str,
                found: DataType::Int
            }
        );
    }

    #[test]
    fn test_array_indexing() {
        assert!(in_main("nt a[3] = {1, 2, 3}; nt x = a[2];").accepted);
        assert!(in_main("nt g[2][2] = {{1, 2}, {3, 4}}; nt x = g[1][0];").accepted);
        assert_eq!(
            first_error("nt a[3]; nt x = a[3];"),
            SemanticErrorKind::IndexOutOfBounds { index: 3, size: 3 }
        );
        assert_eq!(
            first_error("nt a[3]; nt x = a[~1];"),
            SemanticErrorKind::IndexOutOfBounds { index: -1, size: 3 }
        );
        assert_eq!(
            first_error("nt a[3]; nt x = a[1.50];"),
            SemanticErrorKind::IndexType {
                found: DataType::Double
            }
        );
        assert_eq!(
            first_error("nt g[2][2]; nt x = g[1];"),
            SemanticErrorKind::WrongIndexCount {
                name: "g".into(),
                dimensions: 2
            }
        );
    }

    #[test]
    fn test_struct_members() {
        let header = "strct P { nt x; }; ";
        assert!(program(&format!("{header}mn() {{ dfstrct P p; p.x = 1; nt v = p.x; end; }}")).accepted);
        assert_eq!(
            program(&format!("{header}mn() {{ dfstrct P p; nt v = p.z; end; }}")).errors[0].kind,
            SemanticErrorKind::NoSuchMember {
                structure: "P".into(),
                member: "z".into()
            }
        );
        assert_eq!(
            program(&format!("{header}mn() {{ nt v = P; end; }}")).errors[0].kind,
            SemanticErrorKind::StructTypeAsValue { name: "P".into() }
        );
    }

    #[test]
    fn test_input_outside_assignment() {
        assert_eq!(
            first_error("prnt(npt(\"x\"));"),
            SemanticErrorKind::InputInExpression
        );
    }
}
