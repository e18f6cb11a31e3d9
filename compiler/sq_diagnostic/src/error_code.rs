//! Error codes for all engine diagnostics.
//!
//! The first digit indicates the phase that produced the error.

use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Compile errors
/// - E4xxx: Module resolution errors
/// - E5xxx: Serialization errors
/// - E6xxx: Runtime errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Invalid character in source
    E0001,
    /// Unterminated string literal
    E0002,
    /// Invalid escape sequence
    E0003,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Unknown unit suffix on a number
    E1002,
    /// Import after the first statement
    E1003,

    // Compile Errors (E2xxx)
    /// Name is not defined
    E2001,
    /// Export inside a block
    E2002,
    /// Wrong number of arguments to a known function
    E2003,
    /// Decorator is not defined
    E2004,
    /// Unit-type annotations contradict each other
    E2005,

    // Resolution Errors (E4xxx)
    /// Cyclic import
    E4001,
    /// Module not found
    E4002,
    /// Linker failure
    E4003,
    /// Imported module failed
    E4004,

    // Serialization Errors (E5xxx)
    /// Malformed bundle
    E5001,

    // Runtime Errors (E6xxx)
    /// Wrong number of arguments
    E6001,
    /// Symbol not found
    E6002,
    /// Value is not a function
    E6003,
    /// Index or key not found
    E6004,
    /// Argument outside parameter domain
    E6005,
    /// Distribution error
    E6006,
    /// Type mismatch
    E6007,
    /// Call depth exceeded
    E6008,
    /// Other runtime error
    E6099,

    // Internal Errors (E9xxx)
    /// Internal engine error
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6099 => "E6099",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a runtime error code.
    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E1001.to_string(), "E1001");
        assert_eq!(ErrorCode::E6008.as_str(), "E6008");
    }

    #[test]
    fn test_is_runtime_error() {
        assert!(ErrorCode::E6001.is_runtime_error());
        assert!(!ErrorCode::E2001.is_runtime_error());
    }
}
