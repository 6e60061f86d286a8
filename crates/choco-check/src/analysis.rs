//! The checker: a two-phase declaration pass followed by a recursive
//! judgement walker, wired together in [`Checker`].
//!
//! Phase A of the declaration pass registers every name a scope
//! introduces (classes into the [`crate::types::ClassRegistry`],
//! everything else into the [`crate::scope::Environment`]) before any
//! body is visited, so mutual and forward references between top-level
//! declarations resolve correctly. Phase B then visits each body in
//! turn, skipping any declaration whose identifier already carries an
//! `error_msg` from phase A. A class's own member table is filled by a
//! second, class-local registration pass before its method bodies are
//! checked.
//!
//! The walker itself never aborts: on a type error it records at most
//! one diagnostic per AST node and falls back to `object`, then keeps
//! going so a single run surfaces every independent mistake.

use crate::scope::Environment;
use crate::types::{ClassRegistry, FuncType, MemberType, SymbolType};
use choco_ast::{
    ClassDef, Declaration, ErrorEntry, Expr, ExprKind, FuncDef, GlobalDecl, Ident, NonLocalDecl,
    Program, Stmt, StmtKind, TypeAnnotation, ValueType, VarDef,
};
use choco_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, Handler};
use choco_util::symbol::{ID_INIT, KW_SELF, TY_BOOL, TY_INT, TY_STR};
use choco_util::Span;

/// Any node that carries the shared `error_msg` diagnostic slot.
trait HasErrorSlot {
    fn location(&self) -> Span;
    fn error_msg_ref(&self) -> &Option<String>;
    fn error_msg_mut(&mut self) -> &mut Option<String>;
}

macro_rules! impl_has_error_slot {
    ($ty:ty) => {
        impl HasErrorSlot for $ty {
            fn location(&self) -> Span {
                self.location
            }
            fn error_msg_ref(&self) -> &Option<String> {
                &self.error_msg
            }
            fn error_msg_mut(&mut self) -> &mut Option<String> {
                &mut self.error_msg
            }
        }
    };
}

impl_has_error_slot!(Ident);
impl_has_error_slot!(Expr);
impl_has_error_slot!(Stmt);
impl_has_error_slot!(VarDef);
impl_has_error_slot!(ClassDef);
impl_has_error_slot!(FuncDef);
impl_has_error_slot!(GlobalDecl);
impl_has_error_slot!(NonLocalDecl);

fn is_str_like_builtin(t: &ValueType) -> bool {
    matches!(t, ValueType::Class(c) if *c == TY_INT || *c == TY_BOOL || *c == TY_STR)
}

/// Walks a declared tree, filling in types and recording diagnostics.
/// Owns the class registry and scope stack for the duration of a single
/// program; `handler` is the ambient diagnostics sink shared with the
/// rest of the toolchain.
pub struct Checker<'a> {
    env: Environment,
    classes: ClassRegistry,
    current_class: Option<choco_util::Symbol>,
    exp_return_type: Option<ValueType>,
    errors: Vec<ErrorEntry>,
    handler: &'a Handler,
}

impl<'a> Checker<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            env: Environment::new(),
            classes: ClassRegistry::new(),
            current_class: None,
            exp_return_type: None,
            errors: Vec::new(),
            handler,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Runs the declaration pass and the judgement walker over the
    /// whole program, then drains the collected diagnostics into
    /// `program.errors`.
    pub fn check_program(&mut self, program: &mut Program) {
        self.declare_and_visit(&mut program.declarations);
        for stmt in program.statements.iter_mut() {
            self.check_stmt(stmt);
        }
        program.errors.append(&mut self.errors);
    }

    fn emit<T: HasErrorSlot>(&mut self, node: &mut T, code: DiagnosticCode, message: impl Into<String>) {
        if node.error_msg_ref().is_some() {
            return;
        }
        let span = node.location();
        let message = message.into();
        let full = format!("Semantic Error: {}. Line {} Col {}", message, span.line, span.column);
        *node.error_msg_mut() = Some(full.clone());
        self.errors.push(ErrorEntry { location: span, message: full });
        DiagnosticBuilder::error(message).code(code).span(span).emit(self.handler);
    }

    fn resolve_type_annotation(&mut self, ann: &mut TypeAnnotation) -> ValueType {
        match ann {
            TypeAnnotation::Class(ident) => {
                if self.classes.class_exists(ident.name) {
                    ValueType::Class(ident.name)
                } else {
                    let name = ident.name.as_str().to_string();
                    self.emit(ident, DiagnosticCode::E_UNKNOWN_SUPERCLASS, format!("Unknown class: {name}"));
                    ValueType::object()
                }
            }
            TypeAnnotation::List(inner, _) => ValueType::list(self.resolve_type_annotation(inner)),
        }
    }

    // ============================= Declaration pass =============================

    /// Phase A (register names) followed by phase B (visit bodies) over
    /// one scope's declaration list. Used for both the program's
    /// top-level scope and a function body's nested scope; `GlobalDecl`
    /// and `NonLocalDecl` only make sense inside a function and are
    /// rejected elsewhere by checking `exp_return_type`.
    fn declare_and_visit(&mut self, decls: &mut Vec<Declaration>) {
        for decl in decls.iter_mut() {
            match decl {
                Declaration::Class(c) => self.declare_class(c),
                Declaration::Func(f) => self.declare_func(f),
                Declaration::Var(v) => self.declare_var(v),
                Declaration::Global(g) => self.declare_global(g),
                Declaration::NonLocal(n) => self.declare_nonlocal(n),
            }
        }

        for decl in decls.iter_mut() {
            if decl.identifier().error_msg.is_some() {
                continue;
            }
            match decl {
                Declaration::Class(c) => self.check_class_def(c),
                Declaration::Func(f) => self.check_func_def(f),
                Declaration::Var(v) => self.check_var_def(v),
                Declaration::Global(_) | Declaration::NonLocal(_) => {}
            }
        }
    }

    fn name_already_bound(&self, name: choco_util::Symbol) -> bool {
        self.env.defined_in_current(name) || self.classes.class_exists(name)
    }

    fn declare_class(&mut self, c: &mut ClassDef) {
        let name = c.name.name;
        if self.name_already_bound(name) {
            let name_str = name.as_str().to_string();
            self.emit(&mut c.name, DiagnosticCode::E_DUPLICATE_IDENTIFIER, format!("Duplicate declaration of identifier: {name_str}"));
            return;
        }

        let super_name = c.superclass.name;
        let super_str = super_name.as_str().to_string();
        let mut ok = true;
        if !self.classes.class_exists(super_name) {
            self.emit(&mut c.superclass, DiagnosticCode::E_UNKNOWN_SUPERCLASS, format!("Unknown superclass: {super_str}"));
            ok = false;
        }
        if super_name == TY_INT || super_name == TY_BOOL || super_name == TY_STR || super_name == name {
            self.emit(&mut c.superclass, DiagnosticCode::E_ILLEGAL_SUPERCLASS, format!("Illegal superclass: {super_str}"));
            ok = false;
        }
        if ok {
            self.classes.declare_class(name, super_name);
        }
    }

    fn declare_func(&mut self, f: &mut FuncDef) {
        let name = f.name.name;
        if self.name_already_bound(name) {
            let name_str = name.as_str().to_string();
            self.emit(&mut f.name, DiagnosticCode::E_DUPLICATE_IDENTIFIER, format!("Duplicate declaration of identifier: {name_str}"));
            return;
        }
        let params: Vec<ValueType> = f
            .params
            .iter_mut()
            .map(|p| self.resolve_type_annotation(&mut p.type_annotation))
            .collect();
        let ret = f
            .return_type
            .as_mut()
            .map(|t| self.resolve_type_annotation(t))
            .unwrap_or_else(ValueType::none);
        self.env.add_type(name, SymbolType::Func(FuncType::new(params, ret)));
    }

    fn declare_var(&mut self, v: &mut VarDef) {
        let name = v.var.identifier.name;
        if self.name_already_bound(name) {
            let name_str = name.as_str().to_string();
            self.emit(&mut v.var.identifier, DiagnosticCode::E_DUPLICATE_IDENTIFIER, format!("Duplicate declaration of identifier: {name_str}"));
            return;
        }
        let t = self.resolve_type_annotation(&mut v.var.type_annotation);
        self.env.add_type(name, SymbolType::Value(t));
    }

    fn declare_global(&mut self, g: &mut GlobalDecl) {
        if self.exp_return_type.is_none() {
            self.emit(g, DiagnosticCode::E_SCOPE_DECL_OUTSIDE_FUNCTION, "Global declaration outside of a function");
            return;
        }
        let name = g.identifier.name;
        let found = self.env.lookup_global(name).and_then(|st| st.as_value()).cloned();
        match found {
            Some(t) => self.env.add_type(name, SymbolType::Value(t)),
            None => {
                let name_str = name.as_str().to_string();
                self.emit(&mut g.identifier, DiagnosticCode::E_UNKNOWN_GLOBAL, format!("Unknown global variable: {name_str}"));
            }
        }
    }

    fn declare_nonlocal(&mut self, n: &mut NonLocalDecl) {
        if self.exp_return_type.is_none() {
            self.emit(n, DiagnosticCode::E_SCOPE_DECL_OUTSIDE_FUNCTION, "Nonlocal declaration outside of a function");
            return;
        }
        let name = n.identifier.name;
        let found = self.env.lookup_nonlocal(name).and_then(|st| st.as_value()).cloned();
        match found {
            Some(t) => self.env.add_type(name, SymbolType::Value(t)),
            None => {
                let name_str = name.as_str().to_string();
                self.emit(&mut n.identifier, DiagnosticCode::E_UNKNOWN_NONLOCAL, format!("Unknown nonlocal variable: {name_str}"));
            }
        }
    }

    fn check_var_def(&mut self, v: &mut VarDef) {
        let annot = self.resolve_type_annotation(&mut v.var.type_annotation);
        self.check_expr(&mut v.value);
        let value_type = v.value.inferred_type.clone().unwrap_or_else(ValueType::object);
        if !self.classes.can_assign(&value_type, &annot) {
            self.emit(v, DiagnosticCode::E_ANNOTATION_MISMATCH, format!("Expected {annot}, got {value_type}"));
        }
    }

    fn check_func_def(&mut self, f: &mut FuncDef) {
        let saved_return = self.exp_return_type.take();
        let saved_class = self.current_class;

        let param_types: Vec<ValueType> = f
            .params
            .iter_mut()
            .map(|p| self.resolve_type_annotation(&mut p.type_annotation))
            .collect();
        let return_type = f
            .return_type
            .as_mut()
            .map(|t| self.resolve_type_annotation(t))
            .unwrap_or_else(ValueType::none);
        self.exp_return_type = Some(return_type.clone());

        self.env.enter_scope();
        for i in 0..f.params.len() {
            let t = param_types[i].clone();
            let name = f.params[i].identifier.name;
            if self.env.defined_in_current(name) {
                let name_str = name.as_str().to_string();
                self.emit(&mut f.params[i].identifier, DiagnosticCode::E_DUPLICATE_IDENTIFIER, format!("Duplicate parameter name: {name_str}"));
                continue;
            }
            self.env.add_type(name, SymbolType::Value(t));
        }

        self.declare_and_visit(&mut f.declarations);

        let mut has_return = false;
        for stmt in f.statements.iter_mut() {
            self.check_stmt(stmt);
            if stmt.is_return {
                has_return = true;
            }
        }

        if !has_return && !self.classes.can_assign(&ValueType::none(), &return_type) {
            let msg = format!("Expected return statement of type {return_type}");
            match f.statements.last_mut() {
                Some(last) => self.emit(last, DiagnosticCode::E_MISSING_RETURN, msg),
                None => self.emit(f, DiagnosticCode::E_MISSING_RETURN, msg),
            }
        }

        self.env.exit_scope();
        self.exp_return_type = saved_return;
        self.current_class = saved_class;
    }

    // ============================= Class bodies =============================

    fn check_class_def(&mut self, c: &mut ClassDef) {
        let class_name = c.name.name;
        let saved_class = self.current_class.replace(class_name);

        for decl in c.declarations.iter_mut() {
            match decl {
                Declaration::Func(f) => self.register_method(class_name, f),
                Declaration::Var(v) => self.register_attr(class_name, v),
                _ => {}
            }
        }

        for decl in c.declarations.iter_mut() {
            if decl.identifier().error_msg.is_some() {
                continue;
            }
            match decl {
                Declaration::Func(f) => self.check_func_def(f),
                Declaration::Var(v) => self.check_var_def(v),
                _ => {}
            }
        }

        self.current_class = saved_class;
    }

    fn register_method(&mut self, class: choco_util::Symbol, f: &mut FuncDef) {
        let name = f.name.name;
        if self.classes.own_member(class, name).is_some() {
            let name_str = name.as_str().to_string();
            self.emit(&mut f.name, DiagnosticCode::E_DUPLICATE_IDENTIFIER, format!("Duplicate declaration of identifier: {name_str}"));
            return;
        }

        let param_types: Vec<ValueType> = f
            .params
            .iter_mut()
            .map(|p| self.resolve_type_annotation(&mut p.type_annotation))
            .collect();
        let return_type = f
            .return_type
            .as_mut()
            .map(|t| self.resolve_type_annotation(t))
            .unwrap_or_else(ValueType::none);
        let func_type = FuncType::new(param_types.clone(), return_type);

        let self_ok = !param_types.is_empty()
            && f.params[0].identifier.name == KW_SELF
            && matches!(&param_types[0], ValueType::Class(c) if *c == class);
        if !self_ok {
            let name_str = name.as_str().to_string();
            self.emit(&mut f.name, DiagnosticCode::E_METHOD_MISSING_SELF, format!("Missing self argument in method: {name_str}"));
            return;
        }

        if name != ID_INIT {
            if let Some(inherited) = self.classes.get_attr_or_method(class, name) {
                match inherited {
                    MemberType::Method(inherited_func) if inherited_func.method_equals(&func_type) => {}
                    MemberType::Method(_) => {
                        let name_str = name.as_str().to_string();
                        self.emit(&mut f.name, DiagnosticCode::E_METHOD_SIGNATURE_MISMATCH, format!("Redefined method doesn't match superclass signature: {name_str}"));
                        return;
                    }
                    MemberType::Attr(_) => {
                        let name_str = name.as_str().to_string();
                        self.emit(&mut f.name, DiagnosticCode::E_CLASS_SHADOWS_NAME, format!("Method name shadows attribute: {name_str}"));
                        return;
                    }
                }
            }
        }

        self.classes.insert_member(class, name, MemberType::Method(func_type));
    }

    fn register_attr(&mut self, class: choco_util::Symbol, v: &mut VarDef) {
        let name = v.var.identifier.name;
        if self.classes.get_attr_or_method(class, name).is_some() {
            let name_str = name.as_str().to_string();
            self.emit(&mut v.var.identifier, DiagnosticCode::E_ATTRIBUTE_REDEFINED, format!("Cannot redefine attribute: {name_str}"));
            return;
        }
        let t = self.resolve_type_annotation(&mut v.var.type_annotation);
        self.classes.insert_member(class, name, MemberType::Attr(t));
    }

    // ============================= Expressions =============================

    fn check_expr(&mut self, e: &mut Expr) {
        let (ty, err) = match &mut e.kind {
            ExprKind::IntegerLiteral(_) => (ValueType::int(), None),
            ExprKind::BooleanLiteral(_) => (ValueType::bool(), None),
            ExprKind::StringLiteral(_) => (ValueType::str(), None),
            ExprKind::NoneLiteral => (ValueType::none(), None),

            ExprKind::Identifier(name) => {
                let name = *name;
                let found = if self.exp_return_type.is_some() {
                    self.env.lookup_any(name)
                } else {
                    self.env.lookup_global(name)
                }
                .and_then(|st| st.as_value())
                .cloned();
                match found {
                    Some(t) => (t, None),
                    None => (ValueType::object(), Some((DiagnosticCode::E_UNKNOWN_IDENTIFIER, format!("Unknown identifier: {}", name.as_str())))),
                }
            }

            ExprKind::List(elements) => {
                if elements.is_empty() {
                    (ValueType::empty(), None)
                } else {
                    for el in elements.iter_mut() {
                        self.check_expr(el);
                    }
                    let mut acc = elements[0].inferred_type.clone().unwrap_or_else(ValueType::object);
                    for el in &elements[1..] {
                        let t = el.inferred_type.clone().unwrap_or_else(ValueType::object);
                        acc = self.classes.join(&acc, &t);
                    }
                    (ValueType::list(acc), None)
                }
            }

            ExprKind::Index { list, index } => {
                self.check_expr(list);
                self.check_expr(index);
                let idx_t = index.inferred_type.clone().unwrap_or_else(ValueType::object);
                let mut err = None;
                if idx_t != ValueType::int() {
                    err = Some((DiagnosticCode::E_NOT_INDEXABLE, "Expected int index".to_string()));
                }
                let list_t = list.inferred_type.clone().unwrap_or_else(ValueType::object);
                let ty = match &list_t {
                    ValueType::Class(c) if *c == TY_STR => ValueType::str(),
                    ValueType::List(elem) => (**elem).clone(),
                    _ => {
                        if err.is_none() {
                            err = Some((DiagnosticCode::E_NOT_INDEXABLE, format!("Cannot index into type {list_t}")));
                        }
                        ValueType::object()
                    }
                };
                (ty, err)
            }

            ExprKind::Unary { op, operand } => {
                self.check_expr(operand);
                let t = operand.inferred_type.clone().unwrap_or_else(ValueType::object);
                use choco_ast::UnaryOp;
                match op {
                    UnaryOp::Neg if t == ValueType::int() => (ValueType::int(), None),
                    UnaryOp::Neg => (ValueType::object(), Some((DiagnosticCode::E_OPERATOR_TYPE_MISMATCH, format!("Cannot use operator - on type {t}")))),
                    UnaryOp::Not if t == ValueType::bool() => (ValueType::bool(), None),
                    UnaryOp::Not => (ValueType::object(), Some((DiagnosticCode::E_OPERATOR_TYPE_MISMATCH, format!("Cannot use operator not on type {t}")))),
                }
            }

            ExprKind::Binary { op, left, right } => {
                self.check_expr(left);
                self.check_expr(right);
                let l = left.inferred_type.clone().unwrap_or_else(ValueType::object);
                let r = right.inferred_type.clone().unwrap_or_else(ValueType::object);
                self.check_binary(*op, &l, &r)
            }

            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_expr(cond);
                self.check_expr(then_branch);
                self.check_expr(else_branch);
                let cond_t = cond.inferred_type.clone().unwrap_or_else(ValueType::object);
                let err = if cond_t != ValueType::bool() {
                    Some((DiagnosticCode::E_NON_BOOL_CONDITION, format!("Expected {}, got {}", ValueType::bool(), cond_t)))
                } else {
                    None
                };
                let then_t = then_branch.inferred_type.clone().unwrap_or_else(ValueType::object);
                let else_t = else_branch.inferred_type.clone().unwrap_or_else(ValueType::object);
                (self.classes.join(&then_t, &else_t), err)
            }

            ExprKind::Call { func, args } => {
                for a in args.iter_mut() {
                    self.check_expr(a);
                }
                self.check_call(func, args)
            }

            ExprKind::Member { object, member } => {
                self.check_expr(object);
                let obj_t = object.inferred_type.clone().unwrap_or_else(ValueType::object);
                self.check_member_access(&obj_t, member)
            }

            ExprKind::MethodCall { object, method, args } => {
                self.check_expr(object);
                for a in args.iter_mut() {
                    self.check_expr(a);
                }
                let obj_t = object.inferred_type.clone().unwrap_or_else(ValueType::object);
                self.check_method_call(&obj_t, method, args)
            }
        };

        if let Some((code, msg)) = err {
            self.emit(e, code, msg);
        }
        e.inferred_type = Some(ty);
    }

    fn check_binary(&mut self, op: choco_ast::BinaryOp, l: &ValueType, r: &ValueType) -> (ValueType, Option<(DiagnosticCode, String)>) {
        use choco_ast::BinaryOp::*;
        let fail = |op: choco_ast::BinaryOp| {
            Some((DiagnosticCode::E_OPERATOR_TYPE_MISMATCH, format!("Cannot use operator {} on types {} and {}", op.as_str(), l, r)))
        };
        match op {
            Add => {
                if let (ValueType::List(le), ValueType::List(re)) = (l, r) {
                    return (ValueType::list(self.classes.join(le, re)), None);
                }
                if l == r && (*l == ValueType::int() || *l == ValueType::str()) {
                    return (l.clone(), None);
                }
                (ValueType::object(), fail(op))
            }
            Sub | Mul | Div | Mod => {
                if *l == ValueType::int() && *r == ValueType::int() {
                    (ValueType::int(), None)
                } else {
                    (ValueType::object(), fail(op))
                }
            }
            Lt | Le | Gt | Ge => {
                if *l == ValueType::int() && *r == ValueType::int() {
                    (ValueType::bool(), None)
                } else {
                    (ValueType::object(), fail(op))
                }
            }
            Eq | Ne => {
                if l == r && is_str_like_builtin(l) {
                    (ValueType::bool(), None)
                } else {
                    (ValueType::object(), fail(op))
                }
            }
            Is => {
                if !is_str_like_builtin(l) && !is_str_like_builtin(r) {
                    (ValueType::bool(), None)
                } else {
                    (ValueType::object(), fail(op))
                }
            }
            And | Or => {
                if *l == ValueType::bool() && *r == ValueType::bool() {
                    (ValueType::bool(), None)
                } else {
                    (ValueType::object(), fail(op))
                }
            }
        }
    }

    fn check_member_access(&mut self, obj_t: &ValueType, member: &Ident) -> (ValueType, Option<(DiagnosticCode, String)>) {
        match obj_t {
            ValueType::Class(c) if !is_str_like_builtin(obj_t) => match self.classes.get_attr(*c, member.name) {
                Some(t) => (t.clone(), None),
                None => (
                    ValueType::object(),
                    Some((DiagnosticCode::E_UNKNOWN_MEMBER, format!("Attribute {} doesn't exist for class {}", member.name.as_str(), c.as_str()))),
                ),
            },
            _ => (ValueType::object(), Some((DiagnosticCode::E_UNKNOWN_MEMBER, format!("Cannot access member of type {obj_t}")))),
        }
    }

    fn check_method_call(&mut self, obj_t: &ValueType, method: &Ident, args: &[Expr]) -> (ValueType, Option<(DiagnosticCode, String)>) {
        let class = match obj_t {
            ValueType::Class(c) if !is_str_like_builtin(obj_t) => *c,
            _ => return (ValueType::object(), Some((DiagnosticCode::E_UNKNOWN_MEMBER, format!("Cannot access member of type {obj_t}")))),
        };
        let func = match self.classes.get_method(class, method.name) {
            Some(f) => f.clone(),
            None => {
                return (
                    ValueType::object(),
                    Some((DiagnosticCode::E_UNKNOWN_MEMBER, format!("Method {} doesn't exist for class {}", method.name.as_str(), class.as_str()))),
                )
            }
        };
        if func.params.len() != args.len() + 1 {
            return (
                ValueType::object(),
                Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {} arguments, got {}", func.params.len() - 1, args.len()))),
            );
        }
        for (i, a) in args.iter().enumerate() {
            let a_t = a.inferred_type.clone().unwrap_or_else(ValueType::object);
            if !self.classes.can_assign(&a_t, &func.params[i + 1]) {
                return (ValueType::object(), Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {}, got {}", func.params[i + 1], a_t))));
            }
        }
        (func.return_type, None)
    }

    fn check_call(&mut self, func: &Ident, args: &[Expr]) -> (ValueType, Option<(DiagnosticCode, String)>) {
        if self.classes.class_exists(func.name) {
            let init = self.classes.get_method(func.name, ID_INIT).cloned();
            let Some(init) = init else {
                return (ValueType::Class(func.name), None);
            };
            let expected = init.params.len().saturating_sub(1);
            if expected != args.len() {
                return (
                    ValueType::object(),
                    Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {} arguments, got {}", expected, args.len()))),
                );
            }
            for (i, a) in args.iter().enumerate() {
                let a_t = a.inferred_type.clone().unwrap_or_else(ValueType::object);
                if !self.classes.can_assign(&a_t, &init.params[i + 1]) {
                    return (ValueType::object(), Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {}, got {}", init.params[i + 1], a_t))));
                }
            }
            return (ValueType::Class(func.name), None);
        }

        let found = if self.exp_return_type.is_some() {
            self.env.lookup_any(func.name)
        } else {
            self.env.lookup_global(func.name)
        }
        .and_then(|st| st.as_func())
        .cloned();

        match found {
            Some(f) => {
                if f.params.len() != args.len() {
                    return (
                        ValueType::object(),
                        Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {} arguments, got {}", f.params.len(), args.len()))),
                    );
                }
                for (i, a) in args.iter().enumerate() {
                    let a_t = a.inferred_type.clone().unwrap_or_else(ValueType::object);
                    if !self.classes.can_assign(&a_t, &f.params[i]) {
                        return (ValueType::object(), Some((DiagnosticCode::E_ARGUMENT_MISMATCH, format!("Expected {}, got {}", f.params[i], a_t))));
                    }
                }
                (f.return_type, None)
            }
            None => (ValueType::object(), Some((DiagnosticCode::E_UNKNOWN_IDENTIFIER, format!("Not a function: {}", func.name.as_str())))),
        }
    }

    // ============================= Statements =============================

    fn check_stmt(&mut self, s: &mut Stmt) {
        let (is_return, err) = match &mut s.kind {
            StmtKind::Expr(e) => {
                self.check_expr(e);
                (false, None)
            }
            StmtKind::Pass => (false, None),

            StmtKind::Assign { targets, value } => {
                self.check_expr(value);
                let err = self.check_assign(targets, value);
                (false, err)
            }

            StmtKind::If { cond, then_body, else_body } => {
                self.check_expr(cond);
                let cond_t = cond.inferred_type.clone().unwrap_or_else(ValueType::object);
                let err = if cond_t != ValueType::bool() {
                    Some((DiagnosticCode::E_NON_BOOL_CONDITION, format!("Expected {}, got {}", ValueType::bool(), cond_t)))
                } else {
                    None
                };
                for st in then_body.iter_mut() {
                    self.check_stmt(st);
                }
                for st in else_body.iter_mut() {
                    self.check_stmt(st);
                }
                let is_ret = !then_body.is_empty()
                    && !else_body.is_empty()
                    && then_body.iter().any(|s| s.is_return)
                    && else_body.iter().any(|s| s.is_return);
                (is_ret, err)
            }

            StmtKind::While { cond, body } => {
                self.check_expr(cond);
                let cond_t = cond.inferred_type.clone().unwrap_or_else(ValueType::object);
                let err = if cond_t != ValueType::bool() {
                    Some((DiagnosticCode::E_NON_BOOL_CONDITION, format!("Expected {}, got {}", ValueType::bool(), cond_t)))
                } else {
                    None
                };
                for st in body.iter_mut() {
                    self.check_stmt(st);
                }
                let is_ret = body.iter().any(|s| s.is_return);
                (is_ret, err)
            }

            StmtKind::For { identifier, iterable, body } => {
                self.check_expr(iterable);
                let iter_t = iterable.inferred_type.clone().unwrap_or_else(ValueType::object);
                let id_t = if self.exp_return_type.is_some() {
                    self.env.lookup_any(identifier.name)
                } else {
                    self.env.lookup_global(identifier.name)
                }
                .and_then(|st| st.as_value())
                .cloned()
                .unwrap_or_else(ValueType::object);
                let err = match &iter_t {
                    ValueType::List(elem) => {
                        if !self.classes.can_assign(elem, &id_t) {
                            Some((DiagnosticCode::E_ANNOTATION_MISMATCH, format!("Expected {id_t}, got {elem}")))
                        } else {
                            None
                        }
                    }
                    ValueType::Class(c) if *c == TY_STR => {
                        if !self.classes.can_assign(&ValueType::str(), &id_t) {
                            Some((DiagnosticCode::E_ANNOTATION_MISMATCH, format!("Expected {id_t}, got {}", ValueType::str())))
                        } else {
                            None
                        }
                    }
                    _ => Some((DiagnosticCode::E_NON_ITERABLE, format!("Expected iterable, got {iter_t}"))),
                };
                for st in body.iter_mut() {
                    self.check_stmt(st);
                }
                let is_ret = body.iter().any(|s| s.is_return);
                (is_ret, err)
            }

            StmtKind::Return(value) => {
                let err = if self.exp_return_type.is_none() {
                    Some((DiagnosticCode::E_RETURN_TYPE_MISMATCH, "Return statement outside of function definition".to_string()))
                } else {
                    let expected = self.exp_return_type.clone().unwrap();
                    match value {
                        Some(v) => {
                            self.check_expr(v);
                            let v_t = v.inferred_type.clone().unwrap_or_else(ValueType::object);
                            if !self.classes.can_assign(&v_t, &expected) {
                                Some((DiagnosticCode::E_RETURN_TYPE_MISMATCH, format!("Expected {expected}, got {v_t}")))
                            } else {
                                None
                            }
                        }
                        None => {
                            if !self.classes.can_assign(&ValueType::none(), &expected) {
                                Some((DiagnosticCode::E_RETURN_TYPE_MISMATCH, format!("Expected {expected}, got {}", ValueType::none())))
                            } else {
                                None
                            }
                        }
                    }
                };
                (true, err)
            }
        };

        if let Some((code, msg)) = err {
            self.emit(s, code, msg);
        }
        s.is_return = is_return;
    }

    fn check_assign(&mut self, targets: &mut [Expr], value: &mut Expr) -> Option<(DiagnosticCode, String)> {
        let value_t = value.inferred_type.clone().unwrap_or_else(ValueType::object);

        if targets.len() > 1 && value_t == ValueType::list(ValueType::none()) {
            return Some((DiagnosticCode::E_MULTI_ASSIGN_EMPTY_LIST, "Multiple assignment of [<None>] is forbidden".to_string()));
        }

        let mut first_error = None;
        for target in targets.iter_mut() {
            let target_t = match &mut target.kind {
                ExprKind::Identifier(name) => {
                    let name = *name;
                    if !self.env.defined_in_current(name) {
                        if first_error.is_none() {
                            first_error = Some((DiagnosticCode::E_ASSIGN_OUTSIDE_SCOPE, "Identifier not defined in current scope".to_string()));
                        }
                        continue;
                    }
                    self.env.lookup_current(name).and_then(|st| st.as_value()).cloned().unwrap_or_else(ValueType::object)
                }
                ExprKind::Index { list, index } => {
                    self.check_expr(list);
                    self.check_expr(index);
                    let list_t = list.inferred_type.clone().unwrap_or_else(ValueType::object);
                    if list_t == ValueType::str() {
                        if first_error.is_none() {
                            first_error = Some((DiagnosticCode::E_ASSIGN_TO_STR_INDEX, "Cannot assign to index of string".to_string()));
                        }
                        continue;
                    }
                    match &list_t {
                        ValueType::List(elem) => (**elem).clone(),
                        _ => ValueType::object(),
                    }
                }
                ExprKind::Member { object, member } => {
                    self.check_expr(object);
                    let obj_t = object.inferred_type.clone().unwrap_or_else(ValueType::object);
                    let (t, _) = self.check_member_access(&obj_t, member);
                    t
                }
                _ => {
                    self.check_expr(target);
                    target.inferred_type.clone().unwrap_or_else(ValueType::object)
                }
            };
            if first_error.is_none() && !self.classes.can_assign(&value_t, &target_t) {
                first_error = Some((DiagnosticCode::E_ANNOTATION_MISMATCH, format!("Expected {target_t}, got {value_t}")));
            }
        }
        first_error
    }
}
