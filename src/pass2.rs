//! Second pass: address fixups and placeholder resolution.

use crate::error::Diagnostic;
use crate::lexer::decimal_to_binary;
use crate::tables::{AssemblerState, ExternalUse, Payload, SymbolKind};

/// Runs the second pass over `state`, rewriting every `Unresolved`
/// code-word payload to `Resolved`, shifting data addresses by the final
/// instruction counter, and resolving entry addresses. Diagnostics are
/// collected into `diagnostics`; processing continues past a bad
/// reference to the end of the table.
pub fn run(state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    let ic_final = state.ic;

    for word in state.data.iter_mut() {
        word.address += ic_final;
    }
    state.symbols.shift_data_symbols(ic_final);

    for entry in state.entries.iter_mut() {
        match state.symbols.find(&entry.name) {
            None => {
                diagnostics.push(Diagnostic::error(entry.source_line, format!("entry references an unknown symbol ({})", entry.name)));
            }
            Some(sym) if sym.kind == SymbolKind::External => {
                diagnostics.push(Diagnostic::error(
                    entry.source_line,
                    format!("entry may not reference an external symbol ({})", entry.name),
                ));
            }
            Some(sym) => {
                entry.address = sym.address;
            }
        }
    }

    let mut new_uses = Vec::new();
    for word in state.code.iter_mut() {
        let name = match &word.payload {
            Payload::Unresolved(name) => name.clone(),
            Payload::Resolved(_) => continue,
        };

        match state.symbols.find(&name) {
            None => {
                diagnostics.push(Diagnostic::error(word.source_line, format!("unresolved symbol reference ({})", name)));
            }
            Some(sym) if sym.kind == SymbolKind::External => {
                new_uses.push(ExternalUse { name: name.clone(), address: word.address });
                let bits = decimal_to_binary(1, 10);
                word.payload = Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap());
            }
            Some(sym) => {
                let bits = format!("{}{}", decimal_to_binary(sym.address as i32, 8), decimal_to_binary(0b10, 2));
                word.payload = Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap());
            }
        }
    }
    for use_ in new_uses {
        state.externals.push(use_);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::preprocess;

    fn assemble_state(source: &str) -> (AssemblerState, Vec<Diagnostic>) {
        let mut state = AssemblerState::new();
        let mut diags = Vec::new();
        let pre = preprocess(source, &mut diags);
        crate::pass1::run(&pre.text, &mut state, &mut diags);
        run(&mut state, &mut diags);
        (state, diags)
    }

    #[test]
    fn data_addresses_shift_by_final_ic() {
        let (state, diags) = assemble_state("X: .data 1,-1\nmov X, r0");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.data[0].address, state.ic);
        let x = state.symbols.find("X").unwrap();
        assert_eq!(x.address, state.ic);
    }

    #[test]
    fn external_use_recorded_and_tagged() {
        let (state, diags) = assemble_state(".extern E\njmp E");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.externals.iter().count(), 1);
        let use_ = state.externals.iter().next().unwrap();
        assert_eq!(use_.name, "E");
        assert_eq!(use_.address, 101);
    }

    #[test]
    fn missing_symbol_reference_is_an_error() {
        let (_, diags) = assemble_state("jmp missing");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn entry_referencing_external_is_an_error() {
        let (_, diags) = assemble_state(".extern E\n.entry E\njmp E");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn entry_resolves_to_symbol_address() {
        let (state, diags) = assemble_state("L: stop\n.entry L");
        assert!(diags.is_empty(), "{:?}", diags);
        let entry = state.entries.iter().next().unwrap();
        assert_eq!(entry.address, 100);
    }
}
