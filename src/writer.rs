//! Serializes the object, entry, and external-use files in base-4 text
//! form to any `impl std::io::Write`.

use std::io::{self, Write};

use crate::catalog::IC_START;
use crate::lexer::{binary_to_base4, decimal_to_base4};
use crate::lexer::decimal_to_binary;
use crate::tables::{AssemblerState, Payload};

/// Writes the object file: a header line with the final code/data
/// segment sizes, then one `<address>b4\t<word>b4` line per code word
/// (in address order) followed by one per data word.
pub fn write_object(state: &AssemblerState, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "\t{} {}",
        decimal_to_base4(state.ic - IC_START),
        decimal_to_base4(state.dc)
    )?;

    for word in &state.code {
        let value = match word.payload {
            Payload::Resolved(v) => v,
            Payload::Unresolved(_) => unreachable!("object file written only after the second pass resolves every word"),
        };
        writeln!(out, "{}\t{}", decimal_to_base4(word.address), binary_to_base4(&decimal_to_binary(value as i32, 10)))?;
    }

    for word in &state.data {
        writeln!(out, "{}\t{}", decimal_to_base4(word.address), binary_to_base4(&decimal_to_binary(word.value as i32, 10)))?;
    }

    Ok(())
}

/// Writes the entry file. Returns `true` if anything was written, so the
/// caller can decide whether to keep the file or discard it.
pub fn write_entries(state: &AssemblerState, out: &mut dyn Write) -> io::Result<bool> {
    if state.entries.is_empty() {
        return Ok(false);
    }
    for entry in state.entries.iter() {
        writeln!(out, "{}\t{}", entry.name, decimal_to_base4(entry.address))?;
    }
    Ok(true)
}

/// Writes the external-use file. Returns `true` if anything was written.
pub fn write_externals(state: &AssemblerState, out: &mut dyn Write) -> io::Result<bool> {
    if state.externals.is_empty() {
        return Ok(false);
    }
    for use_ in state.externals.iter() {
        writeln!(out, "{}\t{}", use_.name, decimal_to_base4(use_.address))?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::preprocess;

    fn assemble(source: &str) -> AssemblerState {
        let mut state = AssemblerState::new();
        let mut diags = Vec::new();
        let pre = preprocess(source, &mut diags);
        crate::pass1::run(&pre.text, &mut state, &mut diags);
        crate::pass2::run(&mut state, &mut diags);
        assert!(diags.is_empty(), "{:?}", diags);
        state
    }

    #[test]
    fn object_header_and_stop_word() {
        let state = assemble("stop");
        let mut buf = Vec::new();
        write_object(&state, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "\tb a\nbcba\tddaaa\n");
    }

    #[test]
    fn entries_file_empty_when_no_entries() {
        let state = assemble("stop");
        let mut buf = Vec::new();
        let wrote = write_entries(&state, &mut buf).unwrap();
        assert!(!wrote);
        assert!(buf.is_empty());
    }

    #[test]
    fn entries_file_has_one_line_per_entry() {
        let state = assemble("L: stop\n.entry L");
        let mut buf = Vec::new();
        let wrote = write_entries(&state, &mut buf).unwrap();
        assert!(wrote);
        assert_eq!(String::from_utf8(buf).unwrap(), "L\tbcba\n");
    }

    #[test]
    fn externals_file_has_one_line_per_use() {
        let state = assemble(".extern E\njmp E");
        let mut buf = Vec::new();
        let wrote = write_externals(&state, &mut buf).unwrap();
        assert!(wrote);
        assert_eq!(String::from_utf8(buf).unwrap(), "E\tbcbb\n");
    }
}
