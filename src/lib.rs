//! Assembler for a ten-bit-word instruction set.
//!
//! The main function provided by this crate is [`assemble`], which accepts
//! a macro-preprocessed source string and runs both assembly passes over
//! it, producing an [`AssemblerState`] ready to be serialized by the
//! [`writer`] module. [`preprocess`] runs the macro expansion stage on its
//! own, for callers (such as the `asm10` binary) that need to write out the
//! expanded `.am` text before assembling it.
//!
//! # Source Language
//!
//! A source file is a sequence of statements, one per line. A statement is
//! either a directive (`.data`, `.mat`, `.string`, `.entry`, `.extern`) or
//! an instruction, optionally preceded by a `label:`.
//!
//! Instructions operate on up to two operands, each one of:
//!
//! Syntax      | Kind        | Example
//! ------------|-------------|--------
//! `#<int>`    | `Immediate` | `#-7`
//! `name`      | `Symbol`    | `LOOP`
//! `name[rX][rY]` | `Matrix` | `M[r1][r2]`
//! `rN`        | `Register`  | `r3`
//!
//! Source files may additionally contain `mcro`/`mcroend` blocks, which are
//! expanded by [`preprocess`] before either pass runs.
//!
//! Diagnostics are collected rather than raised eagerly: both passes keep
//! processing past a bad line so a single run reports every error in a
//! file, not just the first.

pub mod catalog;
pub mod error;
pub mod lexer;
pub mod pass1;
pub mod pass2;
pub mod preprocessor;
pub mod tables;
pub mod writer;

pub use error::{AssembleError, Diagnostic, Result};
pub use preprocessor::{preprocess, PreprocessOutput};
pub use tables::AssemblerState;

/// Runs both assembly passes over already-preprocessed `text`, returning
/// the finished [`AssemblerState`] or the diagnostics collected along the
/// way. Does not run the macro preprocessor; callers that have raw source
/// (with `mcro` blocks still present) should run [`preprocess`] first and
/// pass its `text` field here.
pub fn assemble(text: &str) -> Result<AssemblerState> {
    let mut state = AssemblerState::new();
    let mut diagnostics = Vec::new();

    pass1::run(text, &mut state, &mut diagnostics);
    pass2::run(&mut state, &mut diagnostics);

    if diagnostics.is_empty() {
        Ok(state)
    } else {
        Err(AssembleError::new(diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_runs_both_passes() {
        let state = assemble("L: stop\n.entry L").unwrap();
        assert_eq!(state.entries.iter().next().unwrap().address, 100);
    }

    #[test]
    fn assemble_reports_unresolved_symbols() {
        let err = assemble("jmp missing").unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
    }

    #[test]
    fn preprocess_then_assemble() {
        let mut diags = Vec::new();
        let pre = preprocess("mcro m\nstop\nmcroend\nm", &mut diags);
        assert!(diags.is_empty());
        let state = assemble(&pre.text).unwrap();
        assert_eq!(state.code.len(), 1);
    }
}
