// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions.
//!
//! Each error says what went wrong, why it may have happened, and what the
//! user can try next.

use lumity_core::{ReadError, WriteError};
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for display
#[derive(Debug)]
pub struct LumityError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LumityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for LumityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for LumityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl LumityError {
    /// A log could not be decoded
    pub fn read_failed(path: &Path, error: ReadError) -> Self {
        let file = path.display();
        let base = LumityError::new(format!("cannot read {}: {}", file, error));
        let err = match &error {
            ReadError::Truncated { pending, position } => {
                let start = position.saturating_sub(*pending);
                base.with_context(format!(
                    "the log ends inside a transaction that starts at byte {}",
                    start
                ))
                .with_context("a writer may have stopped mid-append")
                .with_suggestion(format!(
                    "Everything before byte {} is intact; drop the partial transaction with: truncate -s {} {}",
                    start, start, file
                ))
            }
            ReadError::TruncatedBackward { .. } => base
                .with_context("the first bytes of the log are missing")
                .with_suggestion(format!("Read from the start instead: lumity dump {}", file)),
            e if e.is_corruption() => {
                let at = e
                    .position()
                    .map(|p| format!(" at byte {}", p))
                    .unwrap_or_default();
                base.with_context(format!("the log is damaged{}", at))
                    .with_suggestion(format!(
                        "Transactions after the damage may still read backward: lumity dump {} --backward",
                        file
                    ))
                    .with_suggestion(format!("Check block signatures: lumity verify {}", file))
            }
            _ => base,
        };
        err.with_source(error)
    }

    /// A transaction was refused before anything was written
    pub fn write_refused(path: &Path, error: WriteError) -> Self {
        LumityError::new(format!("nothing written to {}: {}", path.display(), error))
            .with_suggestion(format!(
                "List the definitions and fields the log knows: lumity schema {}",
                path.display()
            ))
            .with_source(error)
    }

    /// A definition or field name did not resolve
    pub fn unknown_name(kind: &str, name: &str, path: Option<&Path>) -> Self {
        let schema_command = match path {
            Some(path) => format!("lumity schema {}", path.display()),
            None => "lumity schema".to_string(),
        };
        LumityError::new(format!("unknown {} '{}'", kind, name))
            .with_context("names are matched exactly, or use the numeric id")
            .with_suggestion(format!("List known names: {}", schema_command))
    }

    /// Blocks whose signature, offset or count did not match
    pub fn verification_failed(path: &Path, failures: u64) -> Self {
        LumityError::new(format!(
            "{} block(s) in {} failed verification",
            failures,
            path.display()
        ))
        .with_context("bytes inside those blocks were changed after they were signed")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
