//! The value-type lattice and the class registry it is defined over.
//!
//! `ValueType` itself lives in `choco-ast` since it is part of the node
//! contract the parser and checker both agree on; this module adds the
//! symbol-type wrapper (value types plus function types) and the
//! subtype/assignability/join operations that only the checker needs.

use choco_ast::ValueType;
use choco_util::symbol::{SENTINEL_EMPTY_TYPE, SENTINEL_NONE_TYPE, TY_BOOL, TY_INT, TY_OBJECT, TY_STR};
use choco_util::Symbol;
use rustc_hash::FxHashMap;

/// `FuncType(params, return)`. Two are equal iff params and return match
/// element-wise; two are *method-equal* iff they agree everywhere except
/// parameter index 0 (the receiver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub return_type: ValueType,
}

impl FuncType {
    pub fn new(params: Vec<ValueType>, return_type: ValueType) -> Self {
        Self { params, return_type }
    }

    pub fn method_equals(&self, other: &FuncType) -> bool {
        if self.params.is_empty() || other.params.is_empty() {
            return false;
        }
        self.return_type == other.return_type && self.params[1..] == other.params[1..]
    }
}

/// A symbol type: what a name in the scope stack or class registry can
/// be bound to. Only `Value` variants ever populate `inferredType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolType {
    Value(ValueType),
    Func(FuncType),
}

impl SymbolType {
    pub fn as_value(&self) -> Option<&ValueType> {
        match self {
            SymbolType::Value(v) => Some(v),
            SymbolType::Func(_) => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            SymbolType::Func(f) => Some(f),
            SymbolType::Value(_) => None,
        }
    }
}

/// A single class registry entry: either an attribute's value type or a
/// method's function type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberType {
    Attr(ValueType),
    Method(FuncType),
}

impl MemberType {
    pub fn as_attr(&self) -> Option<&ValueType> {
        match self {
            MemberType::Attr(v) => Some(v),
            MemberType::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&FuncType> {
        match self {
            MemberType::Method(f) => Some(f),
            MemberType::Attr(_) => None,
        }
    }
}

/// The class hierarchy (`super`) plus each class's member table. Seeded
/// with the four built-in value classes and the two sentinel classes,
/// all rooted at `object`.
pub struct ClassRegistry {
    super_of: FxHashMap<Symbol, Symbol>,
    members: FxHashMap<Symbol, indexmap::IndexMap<Symbol, MemberType>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            super_of: FxHashMap::default(),
            members: FxHashMap::default(),
        };

        registry.members.insert(TY_OBJECT, indexmap::IndexMap::new());
        registry.declare_builtin(TY_INT, ValueType::int());
        registry.declare_builtin(TY_BOOL, ValueType::bool());
        registry.declare_builtin(TY_STR, ValueType::str());
        registry.super_of.insert(SENTINEL_NONE_TYPE, TY_OBJECT);
        registry.super_of.insert(SENTINEL_EMPTY_TYPE, TY_OBJECT);

        registry.members.get_mut(&TY_OBJECT).unwrap().insert(
            choco_util::symbol::ID_INIT,
            MemberType::Method(FuncType::new(Vec::new(), ValueType::object())),
        );

        registry
    }

    fn declare_builtin(&mut self, name: Symbol, value_type: ValueType) {
        self.super_of.insert(name, TY_OBJECT);
        let mut members = indexmap::IndexMap::new();
        members.insert(
            choco_util::symbol::ID_INIT,
            MemberType::Method(FuncType::new(Vec::new(), value_type)),
        );
        self.members.insert(name, members);
    }

    pub fn class_exists(&self, name: Symbol) -> bool {
        self.members.contains_key(&name)
    }

    pub fn super_of(&self, name: Symbol) -> Option<Symbol> {
        self.super_of.get(&name).copied()
    }

    /// Registers an empty entry for `name` with superclass `superclass`.
    /// Phase A of the declaration pass calls this only after validating
    /// the superclass.
    pub fn declare_class(&mut self, name: Symbol, superclass: Symbol) {
        self.super_of.insert(name, superclass);
        self.members.entry(name).or_insert_with(indexmap::IndexMap::new);
    }

    pub fn insert_member(&mut self, class: Symbol, name: Symbol, member: MemberType) {
        self.members.entry(class).or_insert_with(indexmap::IndexMap::new).insert(name, member);
    }

    /// Own-class lookup only, ignoring ancestors.
    pub fn own_member(&self, class: Symbol, name: Symbol) -> Option<&MemberType> {
        self.members.get(&class)?.get(&name)
    }

    pub fn get_method(&self, class: Symbol, name: Symbol) -> Option<&FuncType> {
        let mut current = Some(class);
        while let Some(c) = current {
            if let Some(m) = self.own_member(c, name) {
                return m.as_method();
            }
            current = self.super_of(c);
        }
        None
    }

    pub fn get_attr(&self, class: Symbol, name: Symbol) -> Option<&ValueType> {
        let mut current = Some(class);
        while let Some(c) = current {
            if let Some(m) = self.own_member(c, name) {
                return m.as_attr();
            }
            current = self.super_of(c);
        }
        None
    }

    pub fn get_attr_or_method(&self, class: Symbol, name: Symbol) -> Option<&MemberType> {
        let mut current = Some(class);
        while let Some(c) = current {
            if let Some(m) = self.own_member(c, name) {
                return Some(m);
            }
            current = self.super_of(c);
        }
        None
    }

    /// `isSubClass(a, b)`: walk `super` from `a`, true iff `b` is
    /// reached (reflexive). Terminates because the hierarchy is
    /// required to be acyclic.
    pub fn is_sub_class(&self, a: Symbol, b: Symbol) -> bool {
        let mut current = Some(a);
        while let Some(c) = current {
            if c == b {
                return true;
            }
            current = self.super_of(c);
        }
        false
    }

    /// `isSubtype(a, b)`.
    pub fn is_subtype(&self, a: &ValueType, b: &ValueType) -> bool {
        if *b == ValueType::object() {
            return true;
        }
        match (a, b) {
            (ValueType::Class(ca), ValueType::Class(cb)) => self.is_sub_class(*ca, *cb),
            _ => a == b,
        }
    }

    /// `canAssign(a, b)`: may a value of type `a` flow into a hole of
    /// type `b`?
    pub fn can_assign(&self, a: &ValueType, b: &ValueType) -> bool {
        if self.is_subtype(a, b) {
            return true;
        }
        if *a == ValueType::none() {
            return !matches!(b, ValueType::Class(name) if *name == TY_INT || *name == TY_BOOL || *name == TY_STR);
        }
        if *a == ValueType::empty() {
            return matches!(b, ValueType::List(_));
        }
        if let (ValueType::List(ea), ValueType::List(eb)) = (a, b) {
            if **ea == ValueType::none() {
                return self.can_assign(ea, eb);
            }
        }
        false
    }

    fn root_path(&self, class: Symbol) -> Vec<Symbol> {
        let mut path = vec![class];
        let mut current = class;
        while let Some(s) = self.super_of(current) {
            path.push(s);
            current = s;
        }
        path
    }

    /// `join(a, b)`: least upper bound under `canAssign`. The
    /// asymmetric-list guard runs before the ancestor walk so a bare
    /// class never gets compared against a list's root path.
    pub fn join(&self, a: &ValueType, b: &ValueType) -> ValueType {
        if self.can_assign(a, b) {
            return b.clone();
        }
        if self.can_assign(b, a) {
            return a.clone();
        }
        match (a, b) {
            (ValueType::List(ea), ValueType::List(eb)) => ValueType::list(self.join(ea, eb)),
            (ValueType::List(_), _) | (_, ValueType::List(_)) => ValueType::object(),
            (ValueType::Class(ca), ValueType::Class(cb)) => {
                let mut pa = self.root_path(*ca);
                let mut pb = self.root_path(*cb);
                pa.reverse();
                pb.reverse();
                let mut result = TY_OBJECT;
                for (x, y) in pa.iter().zip(pb.iter()) {
                    if x == y {
                        result = *x;
                    } else {
                        break;
                    }
                }
                ValueType::Class(result)
            }
        }
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn test_builtin_hierarchy_seeded() {
        let reg = ClassRegistry::new();
        assert!(reg.class_exists(TY_INT));
        assert!(reg.is_sub_class(TY_INT, TY_OBJECT));
        assert!(reg.is_sub_class(TY_OBJECT, TY_OBJECT));
        assert!(!reg.is_sub_class(TY_OBJECT, TY_INT));
    }

    #[test]
    fn test_user_class_hierarchy() {
        let mut reg = ClassRegistry::new();
        let a = sym("A");
        let b = sym("B");
        reg.declare_class(a, TY_OBJECT);
        reg.declare_class(b, a);
        assert!(reg.is_sub_class(b, a));
        assert!(reg.is_sub_class(b, TY_OBJECT));
        assert!(!reg.is_sub_class(a, b));
    }

    #[test]
    fn test_is_subtype_object_top() {
        let reg = ClassRegistry::new();
        assert!(reg.is_subtype(&ValueType::int(), &ValueType::object()));
        assert!(!reg.is_subtype(&ValueType::object(), &ValueType::int()));
    }

    #[test]
    fn test_can_assign_none_to_nullable() {
        let reg = ClassRegistry::new();
        assert!(reg.can_assign(&ValueType::none(), &ValueType::list(ValueType::int())));
        assert!(!reg.can_assign(&ValueType::none(), &ValueType::int()));
        assert!(!reg.can_assign(&ValueType::none(), &ValueType::bool()));
        assert!(!reg.can_assign(&ValueType::none(), &ValueType::str()));
    }

    #[test]
    fn test_can_assign_empty_to_list() {
        let reg = ClassRegistry::new();
        assert!(reg.can_assign(&ValueType::empty(), &ValueType::list(ValueType::int())));
        assert!(!reg.can_assign(&ValueType::empty(), &ValueType::int()));
    }

    #[test]
    fn test_can_assign_nested_none_list() {
        let reg = ClassRegistry::new();
        let a = ValueType::list(ValueType::none());
        let b = ValueType::list(ValueType::list(ValueType::int()));
        assert!(reg.can_assign(&a, &b));
    }

    #[test]
    fn test_join_common_ancestor() {
        let mut reg = ClassRegistry::new();
        let a = sym("A");
        let b = sym("B");
        let c = sym("C");
        reg.declare_class(a, TY_OBJECT);
        reg.declare_class(b, a);
        reg.declare_class(c, a);
        let joined = reg.join(&ValueType::Class(b), &ValueType::Class(c));
        assert_eq!(joined, ValueType::Class(a));
    }

    #[test]
    fn test_join_list_asymmetry_falls_back_to_object() {
        let reg = ClassRegistry::new();
        let joined = reg.join(&ValueType::list(ValueType::int()), &ValueType::int());
        assert_eq!(joined, ValueType::object());
    }

    #[test]
    fn test_join_is_commutative() {
        let mut reg = ClassRegistry::new();
        let a = sym("A");
        let b = sym("B");
        reg.declare_class(a, TY_OBJECT);
        reg.declare_class(b, TY_OBJECT);
        assert_eq!(
            reg.join(&ValueType::Class(a), &ValueType::Class(b)),
            reg.join(&ValueType::Class(b), &ValueType::Class(a))
        );
    }

    #[test]
    fn test_method_equals_ignores_receiver() {
        let a = FuncType::new(vec![ValueType::object(), ValueType::int()], ValueType::bool());
        let b = FuncType::new(vec![ValueType::Class(Symbol::intern("Sub")), ValueType::int()], ValueType::bool());
        assert!(a.method_equals(&b));
    }

    #[test]
    fn test_method_equals_rejects_return_mismatch() {
        let a = FuncType::new(vec![ValueType::object()], ValueType::bool());
        let b = FuncType::new(vec![ValueType::object()], ValueType::int());
        assert!(!a.method_equals(&b));
    }

    #[test]
    fn test_get_method_walks_superclass_chain() {
        let mut reg = ClassRegistry::new();
        let a = sym("A");
        let b = sym("B");
        reg.declare_class(a, TY_OBJECT);
        reg.insert_member(
            a,
            sym("greet"),
            MemberType::Method(FuncType::new(vec![ValueType::Class(a)], ValueType::str())),
        );
        reg.declare_class(b, a);
        assert!(reg.get_method(b, sym("greet")).is_some());
        assert!(reg.get_attr(b, sym("greet")).is_none());
    }
}
