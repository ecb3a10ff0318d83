//! Semantic error types
//!
//! [`SemanticError`] pairs a [`SemanticErrorKind`] with the source position of
//! the token that violated the rule. Analysis is fail-fast: the first error
//! ends the run.

use super::types::DataType;
use crate::lexer::SourceLocation;
use thiserror::Error;

/// Every rule the analyzer can report as violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    // Declarations
    /// A name declared twice in the same scope
    #[error("{what} '{name}' already declared")]
    Redeclaration { what: &'static str, name: String },

    /// Two members of one struct share a name
    #[error("Duplicate member '{member}' in struct '{structure}'")]
    DuplicateMember { structure: String, member: String },

    #[error("Entry point 'mn' already declared")]
    DuplicateEntryPoint,

    #[error("Missing entry point 'mn'")]
    MissingEntryPoint,

    #[error("Expected return type or 'vd', got '{found}'")]
    InvalidReturnType { found: String },

    /// `cnst` without `=`
    #[error("Constant '{name}' must be initialized")]
    ConstantWithoutInitializer { name: String },

    #[error("Struct declarations are only allowed at global scope")]
    StructOutsideGlobal,

    #[error("Functions can only be declared at global scope")]
    FunctionOutsideGlobal,

    // References
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("Undefined struct type '{name}'")]
    UndefinedStruct { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    #[error("'{name}' is not a variable")]
    NotAVariable { name: String },

    #[error("Variable '{name}' is not an array")]
    NotAnArray { name: String },

    #[error("Variable '{name}' is not a struct instance")]
    NotAStructInstance { name: String },

    #[error("Struct '{structure}' has no member '{member}'")]
    NoSuchMember { structure: String, member: String },

    #[error("Function '{name}' used without parentheses")]
    FunctionWithoutCall { name: String },

    #[error("Struct type '{name}' cannot be used as a value")]
    StructTypeAsValue { name: String },

    #[error("Array '{name}' used without an index")]
    ArrayWithoutIndex { name: String },

    /// Wrong number of `[...]` suffixes for the array's dimensionality
    #[error("Array '{name}' has {dimensions} dimension(s)")]
    WrongIndexCount { name: String, dimensions: usize },

    #[error("Function '{function}' expects {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument {index} type mismatch: expected '{expected}', got '{found}'")]
    ArgumentType {
        index: usize,
        expected: DataType,
        found: DataType,
    },

    // Types
    #[error("Type mismatch: Cannot assign '{value}' to '{target}'")]
    AssignMismatch { target: DataType, value: DataType },

    #[error("Type mismatch: Cannot apply '{operator}' to '{left}' and '{right}'")]
    OperatorMismatch {
        operator: &'static str,
        left: DataType,
        right: DataType,
    },

    #[error("Type mismatch: Cannot apply '!' to non-boolean type '{found}'")]
    NotRequiresBool { found: DataType },

    #[error("Void function '{name}' cannot be used in an expression")]
    VoidInExpression { name: String },

    #[error("Condition in '{construct}' statement must be of type 'bln' or 'nt', got '{found}'")]
    ConditionType {
        construct: &'static str,
        found: DataType,
    },

    #[error("For loop condition must be of type 'bln', got '{found}'")]
    ForConditionType { found: DataType },

    #[error("Variable in for loop {clause} must be of type 'nt', got '{found}'")]
    ForVariableType {
        clause: &'static str,
        found: DataType,
    },

    #[error("Expected increment, decrement or compound assignment in for loop update")]
    ForUpdate,

    #[error("Cannot reassign constant '{name}'")]
    ConstantReassignment { name: String },

    #[error("Increment/decrement operators can only be applied to 'nt' variables, not '{found}'")]
    IncDecRequiresInt { found: DataType },

    #[error("Shortcut assignment operator '{operator}' can only be applied to numeric types, not '{found}'")]
    CompoundRequiresNumeric {
        operator: &'static str,
        found: DataType,
    },

    #[error("Input can only be assigned to a primitive target, not '{found}'")]
    InputTarget { found: DataType },

    #[error("'npt' can only be used as the value of an assignment")]
    InputInExpression,

    #[error("Division by zero")]
    DivisionByZero,

    // Arrays
    #[error("Array size must be an integer literal or variable, got '{found}'")]
    ArraySizeInvalid { found: String },

    #[error("Array size variable '{name}' must be of type 'nt', got '{found}'")]
    ArraySizeType { name: String, found: DataType },

    #[error("Uninitialized variable '{name}' used as array size")]
    ArraySizeUninitialized { name: String },

    #[error("Array size must be positive, got {size}")]
    ArraySizeNotPositive { size: String },

    #[error("Array '{name}' may have at most 2 dimensions")]
    TooManyDimensions { name: String },

    #[error("Type mismatch: Array element must be '{expected}', got '{found}'")]
    ArrayElementType { expected: DataType, found: String },

    #[error("Uninitialized variable '{name}' used as array element")]
    ArrayElementUninitialized { name: String },

    #[error("Array initialization has {count} elements, but array size is {size}")]
    TooManyElements { count: usize, size: usize },

    #[error("Row {row} has {count} elements, but array column size is {size}")]
    RowTooLong { row: usize, count: usize, size: usize },

    #[error("Array initialization has {count} rows, but array row size is {rows}")]
    TooManyRows { count: usize, rows: usize },

    #[error("Constant array must initialize all {size} elements, but only {count} provided")]
    IncompleteConstantArray { count: usize, size: usize },

    #[error("Array index must be of type 'nt', got '{found}'")]
    IndexType { found: DataType },

    #[error("Array index {index} out of bounds (size {size})")]
    IndexOutOfBounds { index: i64, size: usize },

    // Control flow
    #[error("'{keyword}' without a matching 'f'")]
    ConditionalWithoutIf { keyword: &'static str },

    #[error("Switch expression must be of type 'nt' or 'chr', got '{found}'")]
    SwitchSelectorType { found: DataType },

    #[error("Case label must be of type '{expected}', got '{found}'")]
    CaseLabelType { expected: DataType, found: String },

    #[error("Duplicate case label '{label}'")]
    DuplicateCaseLabel { label: String },

    #[error("Missing 'brk' statement at end of {block}")]
    MissingBreak { block: String },

    #[error("Multiple default cases are not allowed")]
    MultipleDefaults,

    #[error("Nested switch statements are not allowed")]
    NestedSwitch,

    #[error("'{keyword}' outside of a 'swtch' body")]
    CaseOutsideSwitch { keyword: &'static str },

    #[error("'brk' statement outside of a loop or switch")]
    BreakOutsideLoop,

    #[error("'cntn' statement outside of a loop")]
    ContinueOutsideLoop,

    #[error("'cntn' cannot be used directly inside a 'swtch'")]
    ContinueInSwitch,

    #[error("'rtrn' statement outside of a function body")]
    ReturnOutsideFunction,

    #[error("Void function '{function}' cannot return a value")]
    VoidReturnsValue { function: String },

    #[error("Function '{function}' with return type '{expected}' must return a value")]
    MissingReturnValue { function: String, expected: DataType },

    #[error("Return type mismatch: expected '{expected}', got '{found}'")]
    ReturnTypeMismatch { expected: DataType, found: DataType },

    #[error("Function '{function}' with return type '{expected}' must have a return statement")]
    MissingReturn { function: String, expected: DataType },

    #[error("'mn' may only return 0 or nothing")]
    EntryPointReturn,

    #[error("'end' is only allowed as the last statement of 'mn'")]
    MisplacedEnd,

    // Structure
    #[error("Expected {expected}, got '{found}'")]
    ExpectedToken { expected: String, found: String },

    #[error("Unexpected token '{found}' in {context}")]
    UnexpectedToken {
        found: String,
        context: &'static str,
    },

    #[error("Unexpected closing parenthesis")]
    UnexpectedClosingParenthesis,

    #[error("Unclosed '{delimiter}'")]
    Unclosed { delimiter: &'static str },

    #[error("Incomplete expression: expecting operand")]
    IncompleteExpression,

    #[error("Incomplete expression: missing right operand for '{operator}'")]
    MissingRightOperand { operator: &'static str },

    #[error("Unexpected end of input")]
    UnexpectedEnd,

    // Internal
    /// A scan loop ran past its iteration ceiling
    #[error("Internal error: scan limit of {limit} iterations exceeded")]
    ScanLimit { limit: usize },

    /// Blocks or expressions nested past the configured depth
    #[error("Internal error: nesting deeper than {limit} levels")]
    NestingLimit { limit: usize },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// A semantic diagnostic at a source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Semantic Error at line {}, column {}: {kind}", .location.line, .location.column)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub location: SourceLocation,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

pub type SemanticResult<T> = Result<T, SemanticError>;
