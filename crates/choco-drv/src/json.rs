//! The stable JSON AST dump described by the external-interfaces
//! contract: every node becomes an object with `kind`, `location`, and
//! its kind-specific children, plus `inferredType`/`errorMsg` where the
//! checker has populated them.

use choco_ast::{
    ClassDef, Declaration, ErrorEntry, Expr, ExprKind, FuncDef, GlobalDecl, Ident, NonLocalDecl,
    Program, Stmt, StmtKind, TypeAnnotation, ValueType, VarDef,
};
use choco_util::Span;
use serde_json::{json, Value};

fn location(span: Span) -> Value {
    json!([span.line, span.column])
}

fn ident(id: &Ident) -> Value {
    let mut obj = json!({
        "kind": "Ident",
        "location": location(id.location),
        "name": id.name.as_str(),
    });
    if let Some(msg) = &id.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn type_annotation(ann: &TypeAnnotation) -> Value {
    match ann {
        TypeAnnotation::Class(id) => json!({
            "kind": "ClassType",
            "location": location(ann.location()),
            "name": id.name.as_str(),
        }),
        TypeAnnotation::List(elem, _) => json!({
            "kind": "ListType",
            "location": location(ann.location()),
            "element": type_annotation(elem),
        }),
    }
}

fn value_type(t: &ValueType) -> Value {
    json!(t.to_string())
}

fn expr(e: &Expr) -> Value {
    let mut children = match &e.kind {
        ExprKind::IntegerLiteral(v) => json!({"kind": "IntegerLiteral", "value": v}),
        ExprKind::BooleanLiteral(v) => json!({"kind": "BooleanLiteral", "value": v}),
        ExprKind::StringLiteral(v) => json!({"kind": "StringLiteral", "value": v}),
        ExprKind::NoneLiteral => json!({"kind": "NoneLiteral"}),
        ExprKind::Identifier(sym) => json!({"kind": "Identifier", "name": sym.as_str()}),
        ExprKind::List(elements) => {
            json!({"kind": "List", "elements": elements.iter().map(expr).collect::<Vec<_>>()})
        }
        ExprKind::Index { list, index } => {
            json!({"kind": "Index", "list": expr(list), "index": expr(index)})
        }
        ExprKind::Unary { op, operand } => {
            json!({"kind": "Unary", "op": format!("{op:?}"), "operand": expr(operand)})
        }
        ExprKind::Binary { op, left, right } => json!({
            "kind": "Binary",
            "op": op.as_str(),
            "left": expr(left),
            "right": expr(right),
        }),
        ExprKind::If { cond, then_branch, else_branch } => json!({
            "kind": "If",
            "cond": expr(cond),
            "thenBranch": expr(then_branch),
            "elseBranch": expr(else_branch),
        }),
        ExprKind::Call { func, args } => json!({
            "kind": "Call",
            "func": ident(func),
            "args": args.iter().map(expr).collect::<Vec<_>>(),
        }),
        ExprKind::Member { object, member } => json!({
            "kind": "Member",
            "object": expr(object),
            "member": ident(member),
        }),
        ExprKind::MethodCall { object, method, args } => json!({
            "kind": "MethodCall",
            "object": expr(object),
            "method": ident(method),
            "args": args.iter().map(expr).collect::<Vec<_>>(),
        }),
    };
    children["location"] = location(e.location);
    if let Some(t) = &e.inferred_type {
        children["inferredType"] = value_type(t);
    }
    if let Some(msg) = &e.error_msg {
        children["errorMsg"] = json!(msg);
    }
    children
}

fn stmt(s: &Stmt) -> Value {
    let mut children = match &s.kind {
        StmtKind::Expr(e) => json!({"kind": "ExprStmt", "expr": expr(e)}),
        StmtKind::Assign { targets, value } => json!({
            "kind": "Assign",
            "targets": targets.iter().map(expr).collect::<Vec<_>>(),
            "value": expr(value),
        }),
        StmtKind::If { cond, then_body, else_body } => json!({
            "kind": "If",
            "cond": expr(cond),
            "thenBody": then_body.iter().map(stmt).collect::<Vec<_>>(),
            "elseBody": else_body.iter().map(stmt).collect::<Vec<_>>(),
        }),
        StmtKind::While { cond, body } => json!({
            "kind": "While",
            "cond": expr(cond),
            "body": body.iter().map(stmt).collect::<Vec<_>>(),
        }),
        StmtKind::For { identifier, iterable, body } => json!({
            "kind": "For",
            "identifier": ident(identifier),
            "iterable": expr(iterable),
            "body": body.iter().map(stmt).collect::<Vec<_>>(),
        }),
        StmtKind::Return(value) => json!({
            "kind": "Return",
            "value": value.as_ref().map(expr),
        }),
        StmtKind::Pass => json!({"kind": "Pass"}),
    };
    children["location"] = location(s.location);
    children["isReturn"] = json!(s.is_return);
    if let Some(msg) = &s.error_msg {
        children["errorMsg"] = json!(msg);
    }
    children
}

fn var_def(v: &VarDef) -> Value {
    let mut obj = json!({
        "kind": "VarDef",
        "location": location(v.location),
        "identifier": ident(&v.var.identifier),
        "type": type_annotation(&v.var.type_annotation),
        "value": expr(&v.value),
    });
    if let Some(msg) = &v.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn global_decl(g: &GlobalDecl) -> Value {
    let mut obj = json!({
        "kind": "GlobalDecl",
        "location": location(g.location),
        "identifier": ident(&g.identifier),
    });
    if let Some(msg) = &g.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn nonlocal_decl(n: &NonLocalDecl) -> Value {
    let mut obj = json!({
        "kind": "NonLocalDecl",
        "location": location(n.location),
        "identifier": ident(&n.identifier),
    });
    if let Some(msg) = &n.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn func_def(f: &FuncDef) -> Value {
    let mut obj = json!({
        "kind": "FuncDef",
        "location": location(f.location),
        "name": ident(&f.name),
        "params": f.params.iter().map(|p| json!({
            "kind": "TypedVar",
            "location": location(p.location),
            "identifier": ident(&p.identifier),
            "type": type_annotation(&p.type_annotation),
        })).collect::<Vec<_>>(),
        "returnType": f.return_type.as_ref().map(type_annotation),
        "declarations": f.declarations.iter().map(declaration).collect::<Vec<_>>(),
        "statements": f.statements.iter().map(stmt).collect::<Vec<_>>(),
    });
    if let Some(msg) = &f.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn class_def(c: &ClassDef) -> Value {
    let mut obj = json!({
        "kind": "ClassDef",
        "location": location(c.location),
        "name": ident(&c.name),
        "superclass": ident(&c.superclass),
        "declarations": c.declarations.iter().map(declaration).collect::<Vec<_>>(),
    });
    if let Some(msg) = &c.error_msg {
        obj["errorMsg"] = json!(msg);
    }
    obj
}

fn declaration(d: &Declaration) -> Value {
    match d {
        Declaration::Class(c) => class_def(c),
        Declaration::Func(f) => func_def(f),
        Declaration::Var(v) => var_def(v),
        Declaration::Global(g) => global_decl(g),
        Declaration::NonLocal(n) => nonlocal_decl(n),
    }
}

fn error_entry(e: &ErrorEntry) -> Value {
    json!({
        "location": location(e.location),
        "message": e.message,
    })
}

/// Serializes the whole program the way the external-interfaces
/// contract describes: declarations and statements in source order,
/// plus the accumulated `errors` collector.
pub fn program_to_json(program: &Program) -> Value {
    json!({
        "kind": "Program",
        "declarations": program.declarations.iter().map(declaration).collect::<Vec<_>>(),
        "statements": program.statements.iter().map(stmt).collect::<Vec<_>>(),
        "errors": program.errors.iter().map(error_entry).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use choco_ast::parse_program;
    use choco_check::check_program;

    #[test]
    fn test_well_typed_program_has_no_error_entries() {
        let mut program = parse_program("x:int = 1\nprint(x)\n").unwrap();
        check_program(&mut program);
        let value = program_to_json(&program);
        assert_eq!(value["errors"].as_array().unwrap().len(), 0);
        assert_eq!(value["declarations"][0]["kind"], "VarDef");
        assert_eq!(value["declarations"][0]["value"]["inferredType"], "int");
    }

    #[test]
    fn test_type_error_is_anchored_in_the_dump() {
        let mut program = parse_program("x:int = True\n").unwrap();
        check_program(&mut program);
        let value = program_to_json(&program);
        assert_eq!(value["errors"].as_array().unwrap().len(), 1);
        assert!(value["declarations"][0]["errorMsg"].is_string());
    }
}
