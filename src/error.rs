//! Centralised error hierarchy for the **Fave interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; the session decides where
//! each error kind is surfaced and how it affects the exit code.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FaveError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, located at a concrete token.
    #[error("[line {line}] Error {location}: {message}")]
    Parse {
        message: String,
        line: usize,

        /// `at 'lexeme'`, or `at end` when the offending token is EOF.
        location: String,
    },

    /// Static‑analysis failure (scope misuse, `this`/`super`/`return` abuse).
    #[error("[line {line}] Error {location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error.  Formatted exactly as the run loop prints it.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl FaveError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        FaveError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.  Location is derived from the
    /// offending token per the diagnostic format.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        FaveError::Parse {
            message,
            line: token.line,
            location: Self::location(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        FaveError::Resolve {
            message,
            line: token.line,
            location: Self::location(token),
        }
    }

    /// Helper constructor for the **evaluator**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", line, message);

        FaveError::Runtime { message, line }
    }

    fn location(token: &Token) -> String {
        if matches!(token.token_type, TokenType::EOF) {
            "at end".to_owned()
        } else {
            format!("at '{}'", token.lexeme)
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, FaveError>;
