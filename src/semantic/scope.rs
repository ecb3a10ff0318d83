//! Scope arena
//!
//! Scopes live in a flat vector and refer to their parent by index, so lookups
//! walk a chain of [`ScopeId`]s instead of following references:
//! - [`ScopeArena`]: the scopes themselves
//! - [`SymbolTable`]: the arena as handed back to callers after analysis
//!
//! # Lifetimes
//!
//! The global scope is always id 0. Function scopes are created during the
//! declaration pass and persist. Block scopes are pushed on entry to a block
//! and released on exit; release truncates the arena, so block scopes must be
//! released in LIFO order.

use super::symbol::{FunctionInfo, Symbol};
use rustc_hash::FxHashMap;
use std::fmt;

/// Index of a scope in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub label: String,
    pub parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
    /// Declaration order, for stable dumps
    order: Vec<String>,
}

impl Scope {
    fn new(label: impl Into<String>, parent: Option<ScopeId>) -> Self {
        Scope {
            label: label.into(),
            parent,
            symbols: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![Scope::new("global", None)],
        }
    }

    pub fn push(&mut self, parent: ScopeId, label: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(label, Some(parent)));
        id
    }

    /// Drop `id` and every scope created after it.
    pub fn release(&mut self, id: ScopeId) {
        if id != ScopeId::GLOBAL {
            self.scopes.truncate(id.0);
        }
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Find `name` in `from` or the nearest enclosing scope that declares it.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scopes.get(id.0)?;
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    pub fn lookup_mut(&mut self, from: ScopeId, name: &str) -> Option<&mut Symbol> {
        let mut current = Some(from);
        let mut owner = None;
        while let Some(id) = current {
            let scope = self.scopes.get(id.0)?;
            if scope.symbols.contains_key(name) {
                owner = Some(id);
                break;
            }
            current = scope.parent;
        }
        self.scopes.get_mut(owner?.0)?.symbols.get_mut(name)
    }

    pub fn declared_here(&self, id: ScopeId, name: &str) -> bool {
        self.scopes.get(id.0).is_some_and(|scope| scope.contains(name))
    }

    /// Add `symbol` to scope `id`. Returns the symbol back if the name is taken.
    pub fn insert(&mut self, id: ScopeId, symbol: Symbol) -> Result<(), Symbol> {
        let Some(scope) = self.scopes.get_mut(id.0) else {
            return Err(symbol);
        };
        if scope.symbols.contains_key(&symbol.name) {
            return Err(symbol);
        }
        scope.order.push(symbol.name.clone());
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Human-readable dump of every live scope.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, scope) in self.scopes.iter().enumerate() {
            match scope.parent {
                Some(parent) => {
                    out.push_str(&format!("scope #{index} {} (parent {parent})\n", scope.label))
                }
                None => out.push_str(&format!("scope #{index} {}\n", scope.label)),
            }
            for symbol in scope.symbols() {
                out.push_str(&format!("  {symbol}\n"));
            }
        }
        out
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// The scopes that survive analysis: global plus one per function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    arena: ScopeArena,
    functions: FxHashMap<String, ScopeId>,
}

impl SymbolTable {
    pub(crate) fn new(arena: ScopeArena, functions: FxHashMap<String, ScopeId>) -> Self {
        SymbolTable { arena, functions }
    }

    pub fn global(&self) -> Option<&Scope> {
        self.arena.get(ScopeId::GLOBAL)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.arena.get(id)
    }

    /// Scope holding a function's parameters and top-level locals.
    pub fn function_scope(&self, name: &str) -> Option<&Scope> {
        self.functions.get(name).and_then(|id| self.arena.get(*id))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.lookup_global(name).and_then(Symbol::function_info)
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Symbol> {
        self.arena.lookup(ScopeId::GLOBAL, name)
    }

    /// Resolve `name` as seen from inside function `function`.
    pub fn lookup_in_function(&self, function: &str, name: &str) -> Option<&Symbol> {
        let id = self.functions.get(function)?;
        self.arena.lookup(*id, name)
    }

    pub fn dump(&self) -> String {
        self.arena.render()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::SourceLocation;
    use crate::semantic::types::DataType;

    fn var(name: &str) -> Symbol {
        Symbol::variable(name, DataType::Int, SourceLocation::new(1, 1))
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut arena = ScopeArena::new();
        arena.insert(ScopeId::GLOBAL, var("g")).unwrap();
        let f = arena.push(ScopeId::GLOBAL, "function f");
        arena.insert(f, var("x")).unwrap();
        let block = arena.push(f, "block");

        assert!(arena.lookup(block, "g").is_some());
        assert!(arena.lookup(block, "x").is_some());
        assert!(arena.lookup(ScopeId::GLOBAL, "x").is_none());
        assert!(!arena.declared_here(block, "x"));
    }

    #[test]
    fn test_shadowing_and_duplicates() {
        let mut arena = ScopeArena::new();
        arena.insert(ScopeId::GLOBAL, var("x")).unwrap();
        let block = arena.push(ScopeId::GLOBAL, "block");
        let inner = Symbol::variable("x", DataType::Bool, SourceLocation::new(3, 1));
        arena.insert(block, inner).unwrap();
        assert_eq!(arena.lookup(block, "x").unwrap().data_type, DataType::Bool);

        assert!(arena.insert(block, var("x")).is_err());
    }

    #[test]
    fn test_release_truncates() {
        let mut arena = ScopeArena::new();
        let f = arena.push(ScopeId::GLOBAL, "function f");
        let block = arena.push(f, "block");
        arena.push(block, "inner");
        arena.release(block);
        assert_eq!(arena.len(), 2);
        assert!(arena.get(f).is_some());

        arena.release(ScopeId::GLOBAL);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_lookup_mut_updates_owner() {
        let mut arena = ScopeArena::new();
        arena.insert(ScopeId::GLOBAL, var("g")).unwrap();
        let block = arena.push(ScopeId::GLOBAL, "block");
        arena.lookup_mut(block, "g").unwrap().initialized = true;
        assert!(arena.lookup(ScopeId::GLOBAL, "g").unwrap().initialized);
    }

    #[test]
    fn test_render_lists_scopes_in_order() {
        let mut arena = ScopeArena::new();
        arena.insert(ScopeId::GLOBAL, var("b")).unwrap();
        arena.insert(ScopeId::GLOBAL, var("a")).unwrap();
        arena.push(ScopeId::GLOBAL, "function f");
        let dump = arena.render();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "scope #0 global");
        assert!(lines[1].contains("variable b"));
        assert!(lines[2].contains("variable a"));
        assert_eq!(lines[3], "scope #1 function f (parent #0)");
    }
}
