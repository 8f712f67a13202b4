//! Centralised error hierarchy for the **symfold** engine.
//!
//! All subsystems (scanner, parser, folder, evaluator, CLI) must convert
//! their internal failure modes into one of the variants defined here.  This
//! enables a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FoldError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Malformed input-vector text (`name = value, ...`).
    #[error("Input vector error: {0}")]
    Vector(String),

    /// An identifier resolvable by neither the fold-time bindings nor the
    /// input vector at evaluation time.  Fatal for the run: no partial
    /// verdict list is produced.
    #[error("Unresolved identifier '{name}'")]
    Unresolved { name: String },

    /// Concrete evaluation failure (bad operands, bad index, ...).
    #[error("Evaluation error: {0}")]
    Eval(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF-8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl FoldError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        FoldError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        FoldError::Parse { message, line }
    }

    /// Helper constructor for the **evaluator**.
    pub fn eval<S: Into<String>>(msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Eval error: msg={}", message);

        FoldError::Eval(message)
    }

    /// Helper constructor for unresolved identifiers.
    pub fn unresolved<S: Into<String>>(name: S) -> Self {
        let name: String = name.into();

        info!("Creating Unresolved error: name={}", name);

        FoldError::Unresolved { name }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, FoldError>;
