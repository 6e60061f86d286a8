//! Semantic analysis for a small statically-typed, Python-like language.
//!
//! A program is a nominal type system over a fixed lattice of classes
//! rooted at `object`, with `int`, `bool`, and `str` as non-subclassable
//! leaves and two internal sentinels (`<None>` and `<Empty>`) that exist
//! only to make `None` and `[]` literals assignable without being
//! classes a user could ever name. [`types::ClassRegistry`] owns that
//! lattice and the per-class member table; [`scope::Environment`] owns
//! the lexical scope stack layered on top of it. [`analysis::Checker`]
//! ties the two together: a two-phase declaration pass binds every name
//! before any body is visited, and a recursive judgement walker then
//! assigns a type to every expression and a pass/fail diagnosis to
//! every statement.
//!
//! The walker is deliberately non-aborting. A single call to
//! [`check_program`] visits the whole tree exactly once, annotates each
//! node's `inferred_type` (or `is_return`, for statements), and records
//! at most one diagnostic per offending node — so a single run reports
//! every independent mistake in a program rather than stopping at the
//! first.
//!
//! ```
//! use choco_ast::parse_program;
//! use choco_check::check_program;
//!
//! let mut program = parse_program("x:int = 1\nprint(x)\n").unwrap();
//! let errors = check_program(&mut program);
//! assert!(errors.is_empty());
//! ```

pub mod analysis;
pub mod scope;
pub mod types;

#[cfg(test)]
mod edge_cases;

pub use analysis::Checker;
pub use scope::Environment;
pub use types::{ClassRegistry, FuncType, MemberType, SymbolType};

use choco_ast::{ErrorEntry, Program};
use choco_util::diagnostic::Handler;

/// Runs the full declaration pass and judgement walker over `program`,
/// mutating its nodes in place (`inferred_type`, `is_return`,
/// `error_msg`) and returning the diagnostics collected along the way.
/// `program.errors` is also extended with the same entries, matching
/// the externally-visible error collector described by the AST
/// contract.
pub fn check_program(program: &mut Program) -> Vec<ErrorEntry> {
    let handler = Handler::new();
    let mut checker = Checker::new(&handler);
    checker.check_program(program);
    program.errors.clone()
}

/// Like [`check_program`] but lets the caller supply (and later inspect)
/// their own [`Handler`], e.g. to share one handler across lexing,
/// parsing, and checking in the driver.
pub fn check_program_with_handler(program: &mut Program, handler: &Handler) -> Vec<ErrorEntry> {
    let mut checker = Checker::new(handler);
    checker.check_program(program);
    program.errors.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use choco_ast::parse_program;

    #[test]
    fn test_well_typed_program_has_no_errors() {
        let mut program = parse_program("x:int = 1\nprint(x)\n").unwrap();
        let errors = check_program(&mut program);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut program = parse_program("x:int = True\n").unwrap();
        let errors = check_program(&mut program);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Semantic Error:"));
    }

    #[test]
    fn test_checker_is_deterministic() {
        let source = "class A(object):\n    x:int = 0\n    def f(self)->int:\n        return self.x\na:A = None\n";
        let mut p1 = parse_program(source).unwrap();
        let mut p2 = parse_program(source).unwrap();
        let e1 = check_program(&mut p1);
        let e2 = check_program(&mut p2);
        let msgs1: Vec<_> = e1.iter().map(|e| e.message.clone()).collect();
        let msgs2: Vec<_> = e2.iter().map(|e| e.message.clone()).collect();
        assert_eq!(msgs1, msgs2);
    }
}
