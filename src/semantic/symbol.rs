//! Symbol records
//!
//! One [`Symbol`] per declared name. The [`SymbolKind`] carries what differs
//! between variables, constants, functions, struct types and struct instances.

use super::scope::ScopeId;
use super::types::DataType;
use crate::lexer::SourceLocation;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// One array dimension: a literal size or the name of an `nt` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySize {
    Literal(usize),
    Variable(String),
}

impl fmt::Display for ArraySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArraySize::Literal(n) => write!(f, "{n}"),
            ArraySize::Variable(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayShape {
    pub dimensions: Vec<ArraySize>,
}

impl fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dim in &self.dimensions {
            write!(f, "[{dim}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
    pub location: SourceLocation,
}

/// Token indices of a function body: `start` is just past `{`, `end` is the `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRange {
    pub start: usize,
    pub end: usize,
}

/// Signature and bookkeeping for a function or the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub return_type: DataType,
    pub params: Vec<Parameter>,
    pub scope: ScopeId,
    pub body: BodyRange,
    pub has_return: bool,
    pub is_entry_point: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function(FunctionInfo),
    StructType {
        members: FxHashMap<String, Symbol>,
    },
    StructInstance {
        struct_name: String,
        initialized_members: FxHashSet<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub data_type: DataType,
    pub initialized: bool,
    pub array: Option<ArrayShape>,
    pub location: SourceLocation,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, data_type: DataType, location: SourceLocation) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Variable,
            data_type,
            initialized: false,
            array: None,
            location,
        }
    }

    pub fn constant(name: impl Into<String>, data_type: DataType, location: SourceLocation) -> Self {
        Symbol {
            kind: SymbolKind::Constant,
            initialized: true,
            ..Symbol::variable(name, data_type, location)
        }
    }

    pub fn function(name: impl Into<String>, info: FunctionInfo, location: SourceLocation) -> Self {
        Symbol {
            data_type: info.return_type.clone(),
            kind: SymbolKind::Function(info),
            initialized: true,
            ..Symbol::variable(name, DataType::Void, location)
        }
    }

    pub fn struct_type(
        name: impl Into<String>,
        members: FxHashMap<String, Symbol>,
        location: SourceLocation,
    ) -> Self {
        let name = name.into();
        Symbol {
            data_type: DataType::Struct(name.clone()),
            kind: SymbolKind::StructType { members },
            initialized: true,
            ..Symbol::variable(name, DataType::Void, location)
        }
    }

    pub fn struct_instance(
        name: impl Into<String>,
        struct_name: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        let struct_name = struct_name.into();
        Symbol {
            data_type: DataType::Struct(struct_name.clone()),
            kind: SymbolKind::StructInstance {
                struct_name,
                initialized_members: FxHashSet::default(),
            },
            initialized: true,
            ..Symbol::variable(name, DataType::Void, location)
        }
    }

    pub fn with_array(mut self, shape: ArrayShape) -> Self {
        self.array = Some(shape);
        self
    }

    pub fn initialized(mut self, initialized: bool) -> Self {
        self.initialized = initialized;
        self
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, SymbolKind::Constant)
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    pub fn function_info(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    /// Label used in the symbol dump.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Function(_) => "function",
            SymbolKind::StructType { .. } => "struct",
            SymbolKind::StructInstance { .. } => "struct instance",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind_name(), self.name, self.data_type)?;
        if let Some(shape) = &self.array {
            write!(f, "{shape}")?;
        }
        match &self.kind {
            SymbolKind::Function(info) => {
                let params: Vec<String> = info
                    .params
                    .iter()
                    .map(|p| format!("{} {}", p.data_type, p.name))
                    .collect();
                write!(f, " ({})", params.join(", "))?;
            }
            SymbolKind::StructType { members } => {
                let mut members: Vec<&Symbol> = members.values().collect();
                members.sort_by_key(|m| m.location);
                let members: Vec<String> = members
                    .iter()
                    .map(|m| format!("{} {}", m.data_type, m.name))
                    .collect();
                write!(f, " {{ {} }}", members.join("; "))?;
            }
            SymbolKind::Variable if !self.initialized => write!(f, " (uninitialized)")?,
            _ => {}
        }
        write!(f, " @ {}", self.location)
    }
}

/// Functions every program may call without declaring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `len(x)`: length of a string or array
    Len,
    /// `scan()`: read a line of input
    Scan,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "scan" => Some(Builtin::Scan),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Scan => "scan",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Len => 1,
            Builtin::Scan => 0,
        }
    }

    pub fn return_type(self) -> DataType {
        match self {
            Builtin::Len => DataType::Int,
            Builtin::Scan => DataType::Str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let loc = SourceLocation::new(1, 1);
        let v = Symbol::variable("x", DataType::Int, loc);
        assert!(!v.initialized);
        assert!(!v.is_constant());

        let c = Symbol::constant("k", DataType::Double, loc);
        assert!(c.initialized);
        assert!(c.is_constant());

        let s = Symbol::struct_instance("p", "Point", loc);
        assert_eq!(s.data_type, DataType::Struct("Point".into()));
    }

    #[test]
    fn test_display_array_symbol() {
        let loc = SourceLocation::new(2, 5);
        let arr = Symbol::variable("grid", DataType::Int, loc)
            .with_array(ArrayShape {
                dimensions: vec![ArraySize::Literal(2), ArraySize::Variable("n".into())],
            })
            .initialized(true);
        assert_eq!(arr.to_string(), "variable grid: nt[2][n] @ line 2, column 5");
    }

    #[test]
    fn test_builtins() {
        assert_eq!(Builtin::lookup("len"), Some(Builtin::Len));
        assert_eq!(Builtin::lookup("prnt"), None);
        assert_eq!(Builtin::Scan.arity(), 0);
        assert_eq!(Builtin::Len.return_type(), DataType::Int);
    }
}
