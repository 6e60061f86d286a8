//! Diagnostic codes for categorizing checker errors and warnings.
//!
//! This module provides the [`DiagnosticCode`] type for uniquely identifying
//! diagnostic messages, enabling users to look up documentation and suppress
//! specific warnings.
//!
//! # Examples
//!
//! ```
//! use choco_util::diagnostic::DiagnosticCode;
//!
//! let code = DiagnosticCode::E0001;
//! assert_eq!(code.prefix(), "E");
//! assert_eq!(code.number(), 1);
//! assert_eq!(code.as_str(), "E0001");
//! ```

/// A unique code identifying a diagnostic message
///
/// Diagnostic codes follow the format `{prefix}{number}` where:
/// - `prefix` is typically "E" for errors or "W" for warnings
/// - `number` is a 4-digit number (padded with zeros)
///
/// This allows users to reference specific diagnostics in documentation
/// and suppression attributes.
///
/// # Examples
///
/// ```
/// use choco_util::diagnostic::DiagnosticCode;
///
/// let code = DiagnosticCode::new("E", 1);
/// assert_eq!(code.as_str(), "E0001");
///
/// let warning = DiagnosticCode::W0001;
/// assert_eq!(warning.prefix(), "W");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// The prefix (e.g., "E" for error, "W" for warning)
    pub prefix: &'static str,
    /// The numeric identifier
    pub number: u32,
}

impl DiagnosticCode {
    /// Create a new diagnostic code
    ///
    /// # Arguments
    ///
    /// * `prefix` - The code prefix (typically "E" or "W")
    /// * `number` - The numeric identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use choco_util::diagnostic::DiagnosticCode;
    ///
    /// let code = DiagnosticCode::new("E", 1001);
    /// assert_eq!(code.prefix(), "E");
    /// assert_eq!(code.number(), 1001);
    /// ```
    #[inline]
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    /// Get the prefix (e.g., "E" for error, "W" for warning)
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Get the numeric identifier
    #[inline]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Get the full code string (e.g., "E0001", "W0001")
    ///
    /// # Examples
    ///
    /// ```
    /// use choco_util::diagnostic::DiagnosticCode;
    ///
    /// assert_eq!(DiagnosticCode::E0001.as_str(), "E0001");
    /// ```
    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // =========================================================================
    // DECLARATION ERRORS (E1xxx) - duplicate/shadowed/ill-formed declarations
    // =========================================================================

    /// E1001: A name is declared twice in the same scope
    pub const E_DUPLICATE_IDENTIFIER: Self = Self::new("E", 1001);
    /// E1002: A class declaration shadows a variable or function name
    pub const E_CLASS_SHADOWS_NAME: Self = Self::new("E", 1002);
    /// E1003: Superclass name does not resolve to a declared class
    pub const E_UNKNOWN_SUPERCLASS: Self = Self::new("E", 1003);
    /// E1004: Superclass is one of the special/reserved classes and cannot be extended
    pub const E_ILLEGAL_SUPERCLASS: Self = Self::new("E", 1004);
    /// E1005: An attribute is redefined with a different or repeated declaration
    pub const E_ATTRIBUTE_REDEFINED: Self = Self::new("E", 1005);
    /// E1006: A method is missing its mandatory `self` first parameter
    pub const E_METHOD_MISSING_SELF: Self = Self::new("E", 1006);
    /// E1007: An overriding method's signature does not match its ancestor's
    pub const E_METHOD_SIGNATURE_MISMATCH: Self = Self::new("E", 1007);

    // =========================================================================
    // SCOPE ERRORS (E2xxx) - identifier resolution
    // =========================================================================

    /// E2001: Identifier does not resolve in any enclosing scope
    pub const E_UNKNOWN_IDENTIFIER: Self = Self::new("E", 2001);
    /// E2002: `global` declaration names an identifier not bound at module scope
    pub const E_UNKNOWN_GLOBAL: Self = Self::new("E", 2002);
    /// E2003: `nonlocal` declaration names an identifier not bound in an enclosing function
    pub const E_UNKNOWN_NONLOCAL: Self = Self::new("E", 2003);
    /// E2004: `nonlocal`/`global` declaration appears outside of a function body
    pub const E_SCOPE_DECL_OUTSIDE_FUNCTION: Self = Self::new("E", 2004);
    /// E2005: Assignment target resolves to an identifier outside the current scope
    pub const E_ASSIGN_OUTSIDE_SCOPE: Self = Self::new("E", 2005);

    // =========================================================================
    // TYPE ERRORS (E3xxx) - judgement walker failures
    // =========================================================================

    /// E3001: Operand types are not valid for the given operator
    pub const E_OPERATOR_TYPE_MISMATCH: Self = Self::new("E", 3001);
    /// E3002: Call argument count or argument types do not match the callee
    pub const E_ARGUMENT_MISMATCH: Self = Self::new("E", 3002);
    /// E3003: Declared annotation and assigned value type are incompatible
    pub const E_ANNOTATION_MISMATCH: Self = Self::new("E", 3003);
    /// E3004: Returned value type is incompatible with the function's declared return type
    pub const E_RETURN_TYPE_MISMATCH: Self = Self::new("E", 3004);
    /// E3005: `for` loop iterates over a non-iterable expression
    pub const E_NON_ITERABLE: Self = Self::new("E", 3005);
    /// E3006: Condition expression is not of type `bool`
    pub const E_NON_BOOL_CONDITION: Self = Self::new("E", 3006);
    /// E3007: Index expression applied to a non-indexable type
    pub const E_NOT_INDEXABLE: Self = Self::new("E", 3007);
    /// E3008: Attribute or method is not a member of the receiver's class
    pub const E_UNKNOWN_MEMBER: Self = Self::new("E", 3008);

    // =========================================================================
    // STRUCTURAL ERRORS (E4xxx) - statement/program-shape violations
    // =========================================================================

    /// E4001: A variable of type `[<None>]` is assigned more than once
    pub const E_MULTI_ASSIGN_EMPTY_LIST: Self = Self::new("E", 4001);
    /// E4002: Assignment to an index of a `str` value (strings are immutable)
    pub const E_ASSIGN_TO_STR_INDEX: Self = Self::new("E", 4002);
    /// E4003: Function with a non-`<None>` return type has a path with no `return`
    pub const E_MISSING_RETURN: Self = Self::new("E", 4003);

    // =========================================================================
    // WARNINGS (W0xxx)
    // =========================================================================

    /// W0001: Declared local variable is never read
    pub const W_UNUSED_VARIABLE: Self = Self::new("W", 1);
    /// W0002: Declared function or method is never called
    pub const W_UNUSED_FUNCTION: Self = Self::new("W", 2);
    /// W0003: Statements after an unconditional `return` are unreachable
    pub const W_DEAD_CODE: Self = Self::new("W", 3);
}

impl std::fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiagnosticCode({})", self.as_str())
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Standalone constant exports for convenience
pub const E_DUPLICATE_IDENTIFIER: DiagnosticCode = DiagnosticCode::E_DUPLICATE_IDENTIFIER;
pub const E_CLASS_SHADOWS_NAME: DiagnosticCode = DiagnosticCode::E_CLASS_SHADOWS_NAME;
pub const E_UNKNOWN_SUPERCLASS: DiagnosticCode = DiagnosticCode::E_UNKNOWN_SUPERCLASS;
pub const E_ILLEGAL_SUPERCLASS: DiagnosticCode = DiagnosticCode::E_ILLEGAL_SUPERCLASS;
pub const E_ATTRIBUTE_REDEFINED: DiagnosticCode = DiagnosticCode::E_ATTRIBUTE_REDEFINED;
pub const E_METHOD_MISSING_SELF: DiagnosticCode = DiagnosticCode::E_METHOD_MISSING_SELF;
pub const E_METHOD_SIGNATURE_MISMATCH: DiagnosticCode = DiagnosticCode::E_METHOD_SIGNATURE_MISMATCH;
pub const E_UNKNOWN_IDENTIFIER: DiagnosticCode = DiagnosticCode::E_UNKNOWN_IDENTIFIER;
pub const E_UNKNOWN_GLOBAL: DiagnosticCode = DiagnosticCode::E_UNKNOWN_GLOBAL;
pub const E_UNKNOWN_NONLOCAL: DiagnosticCode = DiagnosticCode::E_UNKNOWN_NONLOCAL;
pub const E_SCOPE_DECL_OUTSIDE_FUNCTION: DiagnosticCode = DiagnosticCode::E_SCOPE_DECL_OUTSIDE_FUNCTION;
pub const E_ASSIGN_OUTSIDE_SCOPE: DiagnosticCode = DiagnosticCode::E_ASSIGN_OUTSIDE_SCOPE;
pub const E_OPERATOR_TYPE_MISMATCH: DiagnosticCode = DiagnosticCode::E_OPERATOR_TYPE_MISMATCH;
pub const E_ARGUMENT_MISMATCH: DiagnosticCode = DiagnosticCode::E_ARGUMENT_MISMATCH;
pub const E_ANNOTATION_MISMATCH: DiagnosticCode = DiagnosticCode::E_ANNOTATION_MISMATCH;
pub const E_RETURN_TYPE_MISMATCH: DiagnosticCode = DiagnosticCode::E_RETURN_TYPE_MISMATCH;
pub const E_NON_ITERABLE: DiagnosticCode = DiagnosticCode::E_NON_ITERABLE;
pub const E_NON_BOOL_CONDITION: DiagnosticCode = DiagnosticCode::E_NON_BOOL_CONDITION;
pub const E_NOT_INDEXABLE: DiagnosticCode = DiagnosticCode::E_NOT_INDEXABLE;
pub const E_UNKNOWN_MEMBER: DiagnosticCode = DiagnosticCode::E_UNKNOWN_MEMBER;
pub const E_MULTI_ASSIGN_EMPTY_LIST: DiagnosticCode = DiagnosticCode::E_MULTI_ASSIGN_EMPTY_LIST;
pub const E_ASSIGN_TO_STR_INDEX: DiagnosticCode = DiagnosticCode::E_ASSIGN_TO_STR_INDEX;
pub const E_MISSING_RETURN: DiagnosticCode = DiagnosticCode::E_MISSING_RETURN;
pub const W_UNUSED_VARIABLE: DiagnosticCode = DiagnosticCode::W_UNUSED_VARIABLE;
pub const W_UNUSED_FUNCTION: DiagnosticCode = DiagnosticCode::W_UNUSED_FUNCTION;
pub const W_DEAD_CODE: DiagnosticCode = DiagnosticCode::W_DEAD_CODE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_code() {
        let code = DiagnosticCode::new("E", 1001);
        assert_eq!(code.prefix(), "E");
        assert_eq!(code.number(), 1001);
    }

    #[test]
    fn test_as_str() {
        let code = DiagnosticCode::new("E", 1);
        assert_eq!(code.as_str(), "E0001");

        let code = DiagnosticCode::new("W", 1);
        assert_eq!(code.as_str(), "W0001");

        let code = DiagnosticCode::new("E", 1001);
        assert_eq!(code.as_str(), "E1001");
    }

    #[test]
    fn test_display() {
        let code = DiagnosticCode::new("E", 1001);
        assert_eq!(format!("{}", code), "E1001");
    }

    #[test]
    fn test_debug() {
        let code = DiagnosticCode::new("E", 1001);
        assert_eq!(format!("{:?}", code), "DiagnosticCode(E1001)");
    }

    #[test]
    fn test_declaration_codes() {
        assert_eq!(DiagnosticCode::E_DUPLICATE_IDENTIFIER.as_str(), "E1001");
        assert_eq!(DiagnosticCode::E_UNKNOWN_SUPERCLASS.as_str(), "E1003");
        assert_eq!(DiagnosticCode::E_METHOD_SIGNATURE_MISMATCH.as_str(), "E1007");
    }

    #[test]
    fn test_scope_codes() {
        assert_eq!(DiagnosticCode::E_UNKNOWN_IDENTIFIER.as_str(), "E2001");
        assert_eq!(DiagnosticCode::E_SCOPE_DECL_OUTSIDE_FUNCTION.as_str(), "E2004");
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(DiagnosticCode::E_OPERATOR_TYPE_MISMATCH.as_str(), "E3001");
        assert_eq!(DiagnosticCode::E_MISSING_RETURN.as_str(), "E4003");
    }

    #[test]
    fn test_warning_codes() {
        assert_eq!(DiagnosticCode::W_UNUSED_VARIABLE.prefix(), "W");
        assert_eq!(DiagnosticCode::W_UNUSED_VARIABLE.number(), 1);
    }

    #[test]
    fn test_code_equality() {
        let code1 = DiagnosticCode::new("E", 1001);
        let code2 = DiagnosticCode::new("E", 1001);
        let code3 = DiagnosticCode::new("E", 1002);

        assert_eq!(code1, code2);
        assert_ne!(code1, code3);
    }

    #[test]
    fn test_const_codes() {
        const CODE: DiagnosticCode = DiagnosticCode::E_DUPLICATE_IDENTIFIER;
        assert_eq!(CODE.prefix(), "E");
        assert_eq!(CODE.number(), 1001);
    }
}
