//! The lexical scope stack: a non-empty ordered sequence of
//! name -> symbol-type frames. Frame 0 is the global frame; the top
//! frame is the innermost scope. Class bodies never push a frame here
//! — class members live in the [`crate::types::ClassRegistry`] instead.

use crate::types::{FuncType, SymbolType};
use choco_ast::ValueType;
use choco_util::symbol::{ID_INPUT, ID_LEN, ID_PRINT, TY_OBJECT};
use choco_util::Symbol;
use rustc_hash::FxHashMap;

pub struct Environment {
    frames: Vec<FxHashMap<Symbol, SymbolType>>,
}

impl Environment {
    pub fn new() -> Self {
        let mut global = FxHashMap::default();
        global.insert(
            ID_PRINT,
            SymbolType::Func(FuncType::new(vec![ValueType::Class(TY_OBJECT)], ValueType::none())),
        );
        global.insert(ID_INPUT, SymbolType::Func(FuncType::new(Vec::new(), ValueType::str())));
        global.insert(
            ID_LEN,
            SymbolType::Func(FuncType::new(vec![ValueType::Class(TY_OBJECT)], ValueType::int())),
        );
        Self { frames: vec![global] }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Never pops frame 0.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn add_type(&mut self, name: Symbol, t: SymbolType) {
        self.frames.last_mut().expect("frame 0 always present").insert(name, t);
    }

    pub fn defined_in_current(&self, name: Symbol) -> bool {
        self.frames.last().expect("frame 0 always present").contains_key(&name)
    }

    pub fn lookup_current(&self, name: Symbol) -> Option<&SymbolType> {
        self.frames.last().and_then(|f| f.get(&name))
    }

    /// Scan top -> bottom, first hit wins.
    pub fn lookup_any(&self, name: Symbol) -> Option<&SymbolType> {
        self.frames.iter().rev().find_map(|f| f.get(&name))
    }

    /// Scan frames `[1 .. top-1]`, top -> bottom — skips both global
    /// and the current scope.
    pub fn lookup_nonlocal(&self, name: Symbol) -> Option<&SymbolType> {
        if self.frames.len() < 3 {
            return None;
        }
        self.frames[1..self.frames.len() - 1].iter().rev().find_map(|f| f.get(&name))
    }

    pub fn lookup_global(&self, name: Symbol) -> Option<&SymbolType> {
        self.frames[0].get(&name)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_seeded_in_global_frame() {
        let env = Environment::new();
        assert!(env.lookup_global(ID_PRINT).is_some());
        assert!(env.lookup_global(ID_INPUT).is_some());
        assert!(env.lookup_global(ID_LEN).is_some());
    }

    #[test]
    fn test_current_scope_shadows_global() {
        let mut env = Environment::new();
        env.enter_scope();
        env.add_type(Symbol::intern("x"), SymbolType::Value(ValueType::int()));
        assert!(env.defined_in_current(Symbol::intern("x")));
        assert!(env.lookup_current(Symbol::intern("x")).is_some());
    }

    #[test]
    fn test_lookup_any_scans_top_to_bottom() {
        let mut env = Environment::new();
        env.enter_scope();
        env.add_type(Symbol::intern("x"), SymbolType::Value(ValueType::int()));
        env.enter_scope();
        assert!(env.lookup_any(Symbol::intern("x")).is_some());
        assert!(env.lookup_any(ID_PRINT).is_some());
    }

    #[test]
    fn test_lookup_nonlocal_skips_current_and_global() {
        let mut env = Environment::new();
        env.enter_scope();
        env.add_type(Symbol::intern("x"), SymbolType::Value(ValueType::int()));
        env.enter_scope();
        env.add_type(Symbol::intern("y"), SymbolType::Value(ValueType::bool()));
        assert!(env.lookup_nonlocal(Symbol::intern("x")).is_some());
        assert!(env.lookup_nonlocal(Symbol::intern("y")).is_none());
        assert!(env.lookup_nonlocal(ID_PRINT).is_none());
    }

    #[test]
    fn test_exit_scope_never_pops_global() {
        let mut env = Environment::new();
        env.exit_scope();
        env.exit_scope();
        assert_eq!(env.depth(), 1);
        assert!(env.lookup_global(ID_PRINT).is_some());
    }
}
