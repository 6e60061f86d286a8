//! End-to-end scenario tests and the checker-level testable properties:
//! determinism, idempotence, the no-orphan-annotation invariant, and
//! error anchoring. Lattice laws are covered directly against
//! [`crate::types::ClassRegistry`] in `types.rs`.

#[cfg(test)]
mod tests {
    use crate::check_program;
    use choco_ast::{parse_program, Declaration, ExprKind, StmtKind, ValueType};

    fn errors_of(source: &str) -> Vec<String> {
        let mut program = parse_program(source).unwrap();
        check_program(&mut program).into_iter().map(|e| e.message).collect()
    }

    // ==================== END-TO-END SCENARIOS ====================

    /// EDGE CASE: annotation/value mismatch on the second of two declarations
    #[test]
    fn test_scenario_annotation_mismatch_on_second_decl() {
        let mut program = parse_program("x:int = 3\ny:int = \"a\"\n").unwrap();
        let errors = check_program(&mut program);
        assert_eq!(errors.len(), 1);

        match &program.declarations[1] {
            Declaration::Var(v) => {
                assert_eq!(v.value.inferred_type, Some(ValueType::str()));
                assert!(v.error_msg.is_some());
            }
            _ => panic!("expected var def"),
        }
    }

    /// EDGE CASE: well-typed function call produces no errors
    #[test]
    fn test_scenario_well_typed_call_has_no_errors() {
        let mut program = parse_program("def f(a:int)->int:\n    return a\nf(1)\n").unwrap();
        let errors = check_program(&mut program);
        assert!(errors.is_empty());

        match &program.statements[0].kind {
            StmtKind::Expr(e) => assert_eq!(e.inferred_type, Some(ValueType::int())),
            _ => panic!("expected call statement"),
        }
    }

    /// EDGE CASE: a subclass may not redefine an inherited attribute
    #[test]
    fn test_scenario_attribute_redefinition_is_rejected() {
        let errors = errors_of("class A(object):\n    x:int = 0\nclass B(A):\n    x:int = 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot redefine attribute: x"));
    }

    /// EDGE CASE: `None` may flow into any list-typed hole
    #[test]
    fn test_scenario_none_assignable_to_list_type() {
        let errors = errors_of("a:[int] = None\n");
        assert!(errors.is_empty());
    }

    /// EDGE CASE: `[]` and `[None]` widen through `<Empty>`/`<None>` covariance
    #[test]
    fn test_scenario_empty_list_and_nested_none_list_are_assignable() {
        let errors = errors_of("a:[int] = []\nb:[[int]] = [None]\n");
        assert!(errors.is_empty());
    }

    /// EDGE CASE: an `if` with no `else` never satisfies definite-return
    #[test]
    fn test_scenario_missing_return_on_incomplete_if() {
        let errors = errors_of("def f()->int:\n    if True:\n        return 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Expected return statement of type int"));
    }

    /// EDGE CASE: `int`/`bool`/`str` cannot be subclassed
    #[test]
    fn test_scenario_illegal_superclass_is_rejected() {
        let errors = errors_of("class A(int):\n    pass\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Illegal superclass: int"));
    }

    /// EDGE CASE: `nonlocal` in a top-level function has no enclosing scope to bind to
    #[test]
    fn test_scenario_nonlocal_at_top_level_function_is_unknown() {
        let errors = errors_of("def f():\n    nonlocal x\n    x = 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unknown nonlocal variable: x"));
    }

    // ==================== TESTABLE PROPERTIES ====================

    /// EDGE CASE: idempotence — running twice never doubles the diagnostic count
    #[test]
    fn test_property_idempotent_error_count() {
        let source = "x:int = True\n";
        let mut program = parse_program(source).unwrap();
        let first = check_program(&mut program).len();
        let second = check_program(&mut program).len();
        assert_eq!(first, second);
    }

    /// EDGE CASE: no-orphan-annotation — every expression gets a type after a clean pass
    #[test]
    fn test_property_no_orphan_annotation_on_success() {
        let mut program = parse_program("x:int = 1 + 2\nprint(x)\n").unwrap();
        let errors = check_program(&mut program);
        assert!(errors.is_empty());

        match &program.declarations[0] {
            Declaration::Var(v) => assert!(v.value.inferred_type.is_some()),
            _ => panic!("expected var def"),
        }
        match &program.statements[0].kind {
            StmtKind::Expr(e) => match &e.kind {
                ExprKind::Call { args, .. } => assert!(args[0].inferred_type.is_some()),
                _ => panic!("expected call"),
            },
            _ => panic!("expected expr statement"),
        }
    }

    /// EDGE CASE: error anchoring — every collected error matches a node carrying the same text
    #[test]
    fn test_property_errors_are_anchored_on_erroring_node() {
        let mut program = parse_program("x:int = True\n").unwrap();
        let errors = check_program(&mut program);
        assert_eq!(errors.len(), 1);

        match &program.declarations[0] {
            Declaration::Var(v) => assert_eq!(v.error_msg.as_deref(), Some(errors[0].message.as_str())),
            _ => panic!("expected var def"),
        }
    }
}
