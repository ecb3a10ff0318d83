//! Variable, constant, array and struct-instance declarations

use super::analyzer::Analyzer;
use super::errors::{SemanticError, SemanticErrorKind, SemanticResult};
use super::symbol::{ArrayShape, ArraySize, Symbol, SymbolKind};
use super::types::DataType;
use crate::lexer::{Token, TokenKind};

/// At most `[rows][columns]`.
const MAX_DIMENSIONS: usize = 2;

impl<'t> Analyzer<'t> {
    /// `T name [= expr] {, name [= expr]} ;` with the cursor on the type.
    pub(super) fn variable_declaration(&mut self) -> SemanticResult<()> {
        let type_token = self.advance();
        let data_type = self.declared_type(type_token)?;
        self.declarator_list(&data_type, false)
    }

    /// `cnst T name = expr {, ...} ;` with the cursor on `cnst`.
    pub(super) fn constant_declaration(&mut self) -> SemanticResult<()> {
        self.advance();
        let type_token = self.advance();
        let data_type = self.declared_type(type_token)?;
        self.declarator_list(&data_type, true)
    }

    /// `dfstrct S a, b ;` with the cursor on `dfstrct`.
    pub(super) fn struct_instance_declaration(&mut self) -> SemanticResult<()> {
        self.advance();
        let type_name = self.expect(TokenKind::Identifier, "a struct type name")?;
        match self.resolve(&type_name.lexeme) {
            Some(Symbol {
                kind: SymbolKind::StructType { .. },
                ..
            }) => {}
            _ => {
                return Err(self.error_at(
                    SemanticErrorKind::UndefinedStruct {
                        name: type_name.lexeme.clone(),
                    },
                    type_name,
                ))
            }
        }

        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let name = self.expect(TokenKind::Identifier, "an identifier")?;
            let symbol =
                Symbol::struct_instance(name.lexeme.clone(), type_name.lexeme.clone(), name.location);
            self.declare(symbol, name)?;
            if !self.declaration_continues()? {
                return Ok(());
            }
        }
    }

    fn declared_type(&self, token: &Token) -> SemanticResult<DataType> {
        match DataType::from_keyword(token.kind) {
            Some(ty) if ty.is_primitive() => Ok(ty),
            _ => Err(self.error_at(
                SemanticErrorKind::ExpectedToken {
                    expected: "a data type".to_string(),
                    found: token.lexeme.clone(),
                },
                token,
            )),
        }
    }

    /// Consume `,` (more to come) or `;` (done).
    fn declaration_continues(&mut self) -> SemanticResult<bool> {
        match self.peek_kind() {
            TokenKind::Comma => {
                self.advance();
                Ok(true)
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(false)
            }
            _ => {
                self.expect(TokenKind::Semicolon, "',' or ';'")?;
                Ok(false)
            }
        }
    }

    fn declarator_list(&mut self, data_type: &DataType, constant: bool) -> SemanticResult<()> {
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            let name = self.expect(TokenKind::Identifier, "an identifier")?;
            if self.scopes.declared_here(self.current, &name.lexeme) {
                return Err(self.error_at(
                    SemanticErrorKind::Redeclaration {
                        what: "Variable",
                        name: name.lexeme.clone(),
                    },
                    name,
                ));
            }

            let mut symbol = if constant {
                Symbol::constant(name.lexeme.clone(), data_type.clone(), name.location)
            } else {
                Symbol::variable(name.lexeme.clone(), data_type.clone(), name.location)
            };

            if self.check(TokenKind::LBracket) {
                let shape = self.array_shape(name)?;
                let initialized = if self.check(TokenKind::Assign) {
                    self.advance();
                    self.array_initializer(data_type, &shape, constant)?;
                    true
                } else {
                    false
                };
                if constant && !initialized {
                    return Err(self.constant_without_initializer(name));
                }
                symbol = symbol.with_array(shape).initialized(initialized);
            } else if self.check(TokenKind::Assign) {
                let assign = self.advance();
                self.initializer(data_type, assign)?;
                symbol = symbol.initialized(true);
            } else if constant {
                return Err(self.constant_without_initializer(name));
            }

            // The initializer is checked before the name becomes visible.
            self.declare(symbol, name)?;
            if !self.declaration_continues()? {
                return Ok(());
            }
        }
    }

    fn constant_without_initializer(&self, name: &Token) -> SemanticError {
        self.error_at(
            SemanticErrorKind::ConstantWithoutInitializer {
                name: name.lexeme.clone(),
            },
            name,
        )
    }

    fn initializer(&mut self, data_type: &DataType, assign: &Token) -> SemanticResult<()> {
        if self.check(TokenKind::Input) {
            return self.input_value(data_type);
        }
        let end = self.expression_end(&[TokenKind::Comma])?;
        let value = self.expression_type(end)?;
        if value != *data_type {
            return Err(self.error_at(
                SemanticErrorKind::AssignMismatch {
                    target: data_type.clone(),
                    value,
                },
                assign,
            ));
        }
        Ok(())
    }

    fn array_shape(&mut self, name: &Token) -> SemanticResult<ArrayShape> {
        let mut dimensions = Vec::new();
        while self.check(TokenKind::LBracket) {
            if dimensions.len() == MAX_DIMENSIONS {
                return Err(self.error(SemanticErrorKind::TooManyDimensions {
                    name: name.lexeme.clone(),
                }));
            }
            self.advance();
            dimensions.push(self.array_size()?);
            self.expect(TokenKind::RBracket, "']'")?;
        }
        Ok(ArrayShape { dimensions })
    }

    fn array_size(&mut self) -> SemanticResult<ArraySize> {
        let token = self.advance();
        match token.kind {
            TokenKind::IntLit => {
                let size: usize = token.lexeme.parse().map_err(|_| {
                    self.error_at(
                        SemanticErrorKind::ArraySizeInvalid {
                            found: token.lexeme.clone(),
                        },
                        token,
                    )
                })?;
                if size == 0 {
                    return Err(self.error_at(
                        SemanticErrorKind::ArraySizeNotPositive {
                            size: token.lexeme.clone(),
                        },
                        token,
                    ));
                }
                Ok(ArraySize::Literal(size))
            }
            TokenKind::NegIntLit => Err(self.error_at(
                SemanticErrorKind::ArraySizeNotPositive {
                    size: token.lexeme.clone(),
                },
                token,
            )),
            TokenKind::Identifier => {
                let Some(symbol) = self.resolve(&token.lexeme) else {
                    return Err(self.error_at(
                        SemanticErrorKind::UndefinedVariable {
                            name: token.lexeme.clone(),
                        },
                        token,
                    ));
                };
                let scalar = matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Constant)
                    && !symbol.is_array();
                if !scalar || symbol.data_type != DataType::Int {
                    return Err(self.error_at(
                        SemanticErrorKind::ArraySizeType {
                            name: symbol.name,
                            found: symbol.data_type,
                        },
                        token,
                    ));
                }
                if !symbol.initialized {
                    return Err(self.error_at(
                        SemanticErrorKind::ArraySizeUninitialized { name: symbol.name },
                        token,
                    ));
                }
                Ok(ArraySize::Variable(symbol.name))
            }
            _ => Err(self.error_at(
                SemanticErrorKind::ArraySizeInvalid {
                    found: token.lexeme.clone(),
                },
                token,
            )),
        }
    }

    fn array_initializer(
        &mut self,
        data_type: &DataType,
        shape: &ArrayShape,
        constant: bool,
    ) -> SemanticResult<()> {
        match shape.dimensions.as_slice() {
            [size] => {
                let open = self.peek();
                let count = self.initializer_row(data_type)?;
                self.check_count(count, size, constant, open, |count, size| {
                    SemanticErrorKind::TooManyElements { count, size }
                })
            }
            [rows, columns] => {
                let open = self.expect(TokenKind::LBrace, "'{'")?;
                let mut count = 0;
                let mut iterations = 0;
                while !self.check(TokenKind::RBrace) {
                    self.tick(&mut iterations)?;
                    let row_open = self.peek();
                    let row_len = self.initializer_row(data_type)?;
                    count += 1;
                    let row = count;
                    self.check_count(row_len, columns, constant, row_open, |count, size| {
                        SemanticErrorKind::RowTooLong { row, count, size }
                    })?;
                    if !self.check(TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                self.check_count(count, rows, constant, open, |count, rows| {
                    SemanticErrorKind::TooManyRows { count, rows }
                })
            }
            _ => Err(self.error(SemanticErrorKind::Internal {
                message: "array without dimensions".to_string(),
            })),
        }
    }

    /// Element count against a declared size. Variable sizes are not checked.
    fn check_count(
        &self,
        count: usize,
        size: &ArraySize,
        constant: bool,
        at: &Token,
        too_many: impl FnOnce(usize, usize) -> SemanticErrorKind,
    ) -> SemanticResult<()> {
        let ArraySize::Literal(size) = *size else {
            return Ok(());
        };
        if count > size {
            return Err(self.error_at(too_many(count, size), at));
        }
        if constant && count < size {
            return Err(self.error_at(
                SemanticErrorKind::IncompleteConstantArray { count, size },
                at,
            ));
        }
        Ok(())
    }

    /// `{ e, e, ... }`; returns the element count.
    fn initializer_row(&mut self, data_type: &DataType) -> SemanticResult<usize> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut count = 0;
        let mut iterations = 0;
        if !self.check(TokenKind::RBrace) {
            loop {
                self.tick(&mut iterations)?;
                self.array_element(data_type)?;
                count += 1;
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(count)
    }

    fn array_element(&mut self, data_type: &DataType) -> SemanticResult<()> {
        let token = self.advance();
        if let Some(found) = DataType::of_literal(token.kind) {
            if found != *data_type {
                return Err(self.error_at(
                    SemanticErrorKind::ArrayElementType {
                        expected: data_type.clone(),
                        found: found.to_string(),
                    },
                    token,
                ));
            }
            return Ok(());
        }

        if token.kind != TokenKind::Identifier {
            return Err(self.error_at(
                SemanticErrorKind::ArrayElementType {
                    expected: data_type.clone(),
                    found: token.lexeme.clone(),
                },
                token,
            ));
        }
        let Some(symbol) = self.resolve(&token.lexeme) else {
            return Err(self.error_at(
                SemanticErrorKind::UndefinedVariable {
                    name: token.lexeme.clone(),
                },
                token,
            ));
        };
        let scalar = matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Constant)
            && !symbol.is_array();
        if !scalar || symbol.data_type != *data_type {
            return Err(self.error_at(
                SemanticErrorKind::ArrayElementType {
                    expected: data_type.clone(),
                    found: symbol.data_type.to_string(),
                },
                token,
            ));
        }
        if !symbol.initialized {
            return Err(self.error_at(
                SemanticErrorKind::ArrayElementUninitialized { name: symbol.name },
                token,
            ));
        }
        Ok(())
    }
}
