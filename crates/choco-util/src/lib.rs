//! choco-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate provides fundamental utilities and types shared by every phase
//! of the chococ pipeline (parsing, checking, and whatever sits downstream of
//! the checker). These utilities are designed to be zero-cost abstractions
//! that improve code clarity, type safety, and performance without runtime
//! overhead.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. ZERO-COST ABSTRACTIONS
//!    All utilities compile down to efficient code with no runtime penalty
//!    compared to hand-written implementations.
//!
//! 2. TYPE SAFETY
//!    Leverage Rust's type system to prevent bugs at compile time.
//!    Examples: Typed indices prevent mixing different ID spaces.
//!
//! 3. PERFORMANCE
//!    Optimize for the common case while maintaining correctness.
//!    Examples: Efficient string interning, lock-free data structures.
//!
//! 4. ERGONOMICS
//!    APIs should be intuitive and easy to use correctly.
//!    Examples: Builder patterns, type inference-friendly interfaces.
//!
//! ============================================================================
//! STRING INTERNING (SYMBOL)
//! ============================================================================
//!
//! String interning is a technique for storing only one copy of each distinct
//! string value, which must be immutable. All occurrences of the same string
//! point to the same memory location, enabling fast equality comparisons and
//! reducing memory usage. Identifiers (variable names, class names, method
//! names) are exactly the kind of repeated, immutable string this pays off
//! for, so the checker and parser both traffic in [`Symbol`] rather than
//! `String`.
//!
//! ============================================================================
//! TYPED INDEX PATTERN
//! ============================================================================
//!
//! A compiler juggles several index spaces at once (class ids, expression
//! ids, scope ids). Using raw `usize`/`u32` for all of them is error-prone:
//! nothing stops a `ClassId` from being used where a `ScopeId` was expected.
//! [`Idx`] + [`IndexVec`] (and the [`define_idx!`] macro) give each space its
//! own newtype at zero runtime cost.

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

// Re-export commonly used hash-map/set types built on rustc-hash's FxHasher,
// which trades cryptographic strength for speed -- the right trade for
// compiler-internal maps keyed by interned symbols and small integers.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;

/// Macro to define index types easily.
///
/// # Examples
///
/// ```
/// choco_util::define_idx!(ExprId);
///
/// let mut exprs: choco_util::IndexVec<ExprId, i32> = choco_util::IndexVec::new();
/// let id = exprs.push(42);
/// assert_eq!(exprs[id], 42);
/// ```
#[macro_export]
macro_rules! define_idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize);
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}
