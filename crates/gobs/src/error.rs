use thiserror::Error;

/// Failures the compiler itself can raise.
///
/// Every variant is a programming error: either the input was not linted,
/// or compilation reached a reserved extension point. Conditions that need
/// runtime values at hand (wrong subject type, out-of-range component,
/// unmatched switch) are compiled into `TypeCheck` and `_FAIL`
/// instructions and resolved by the VM instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared but not yet lowered construct was reached.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// A procedure call names neither a primitive nor a declared procedure.
    #[error("undefined procedure: {0}")]
    UndefinedProcedure(String),

    /// A function call names no primitive, declared function, or field.
    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    /// The symbol table has no entry for a constructor the AST uses.
    #[error("unknown constructor: {0}")]
    UnknownConstructor(String),

    /// A number literal's text does not parse as an integer.
    #[error("malformed number literal: {0}")]
    MalformedNumber(String),
}

pub type Result<T> = std::result::Result<T, Error>;
