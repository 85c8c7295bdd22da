// src/errors.rs
//! Type algebra errors (T0xxx). Codes in the T09xx range indicate an engine
//! defect rather than a problem with the program being compiled.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TypeAlgebraError>;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum TypeAlgebraError {
    #[error("Type argument mismatch for {path}; got: {instantiation}")]
    #[diagnostic(code(T0001))]
    TypeArgumentCountMismatch {
        path: String,
        instantiation: String,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("Multiplicity argument mismatch for {path}; got: {instantiation}")]
    #[diagnostic(code(T0002))]
    MultiplicityArgumentCountMismatch {
        path: String,
        instantiation: String,
        #[label("wrong number of multiplicity arguments")]
        span: SourceSpan,
    },

    #[error(
        "Diamond inheritance error! '{first}' is not compatible with '{second}' going from '{from_type}' to '{to_type}'"
    )]
    #[diagnostic(code(T0003))]
    DiamondInheritanceConflict {
        first: String,
        second: String,
        from_type: String,
        to_type: String,
        #[label("conflicting bindings for the same type parameter")]
        span: SourceSpan,
    },

    #[error("Type graph too deep while resolving '{type_expr}'")]
    #[diagnostic(
        code(T0004),
        help("deeply nested generics exceeded the engine's recursion limit")
    )]
    TypeGraphTooDeep {
        type_expr: String,
        #[label("recursion limit reached here")]
        span: SourceSpan,
    },

    #[error("Could not resolve function generic type: {type_expr}")]
    #[diagnostic(code(T0005))]
    UnresolvedFunctionType {
        type_expr: String,
        #[label("not resolvable to a Function instantiation")]
        span: SourceSpan,
    },

    /// Engine defect: a set-algebra operation was applied to operands it can
    /// never resolve (e.g. union/difference over non-tabular types), or the
    /// operation dispatcher was handed a non-operation node.
    #[error("Unresolvable type operation: {detail}")]
    #[diagnostic(code(T0901))]
    UnresolvableOperation { detail: String },

    /// Engine defect: a subset accessor was called on the wrong node kind.
    #[error("Can only perform this action on a {expected} operation")]
    #[diagnostic(code(T0902))]
    NotAnOperation { expected: &'static str },
}
