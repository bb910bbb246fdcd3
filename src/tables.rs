//! Ordered containers for the per-file assembler state: macros, symbols,
//! entries, external-uses, and the code/data word lists.

use crate::catalog::OperandType;

#[derive(Clone, Debug)]
pub struct Macro {
    pub name: String,
    pub body: Vec<String>,
}

#[derive(Default, Debug)]
pub struct MacroTable {
    macros: Vec<Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        MacroTable::default()
    }

    pub fn push(&mut self, name: String) {
        self.macros.push(Macro { name, body: Vec::new() });
    }

    pub fn append_line(&mut self, line: String) {
        self.macros
            .last_mut()
            .expect("append_line called with no open macro")
            .body
            .push(line);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.iter().any(|m| m.name == name)
    }

    pub fn find_exact(&self, name: &str) -> Option<&Macro> {
        self.macros.iter().find(|m| m.name == name)
    }

    /// Looks up a macro whose name matches the first `probe.len()` bytes,
    /// mirroring the original prefix-length lookup: a macro whose name is
    /// *longer* than the probe and agrees on its leading bytes still
    /// matches. This preserves a quirk of the original implementation
    /// rather than requiring exact-length equality.
    pub fn find_by_prefix(&self, probe: &str) -> Option<&Macro> {
        self.macros.iter().find(|m| {
            m.name.len() >= probe.len() && m.name.as_bytes()[..probe.len()] == *probe.as_bytes()
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Code,
    Data,
    External,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub address: u32,
}

#[derive(Default, Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.iter().any(|s| s.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Adds `ic_final` to the address of every `Data`-kind symbol. Run
    /// once at the start of the second pass.
    pub fn shift_data_symbols(&mut self, ic_final: u32) {
        for s in self.symbols.iter_mut() {
            if s.kind == SymbolKind::Data {
                s.address += ic_final;
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub address: u32,
    pub source_line: u32,
}

#[derive(Default, Debug)]
pub struct EntryTable {
    entries: Vec<Entry>,
}

impl EntryTable {
    pub fn new() -> Self {
        EntryTable::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ExternalUse {
    pub name: String,
    pub address: u32,
}

#[derive(Default, Debug)]
pub struct ExternalUseTable {
    uses: Vec<ExternalUse>,
}

impl ExternalUseTable {
    pub fn new() -> Self {
        ExternalUseTable::default()
    }

    pub fn push(&mut self, use_: ExternalUse) {
        self.uses.push(use_);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalUse> {
        self.uses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }
}

/// Either a symbol name awaiting resolution, or a finished 10-bit value.
/// Replaces the original's convention of sniffing a string's first
/// character to tell the two cases apart.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Payload {
    Unresolved(String),
    Resolved(u16),
}

#[derive(Clone, Debug)]
pub struct CodeWord {
    pub address: u32,
    pub payload: Payload,
    pub source_line: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct DataWord {
    pub address: u32,
    pub value: u16,
}

#[derive(Default, Debug)]
pub struct AssemblerState {
    pub macros: MacroTable,
    pub symbols: SymbolTable,
    pub entries: EntryTable,
    pub externals: ExternalUseTable,
    pub code: Vec<CodeWord>,
    pub data: Vec<DataWord>,
    pub ic: u32,
    pub dc: u32,
}

impl AssemblerState {
    pub fn new() -> Self {
        AssemblerState {
            ic: crate::catalog::IC_START,
            ..Default::default()
        }
    }
}

/// Pairs an `OperandType`'s wire tag with its originating word, purely to
/// make the relationship between the two explicit at call sites that
/// assert on it (see `pass1`'s debug assertions).
pub fn operand_tag(t: OperandType) -> u8 {
    use num::traits::ToPrimitive;
    t.to_u8().expect("OperandType always fits in u8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_prefix_lookup_matches_longer_name() {
        let mut table = MacroTable::new();
        table.push("foobar".to_string());
        assert!(table.find_by_prefix("foo").is_some());
    }

    #[test]
    fn macro_prefix_lookup_rejects_shorter_name() {
        let mut table = MacroTable::new();
        table.push("fo".to_string());
        assert!(table.find_by_prefix("foo").is_none());
    }

    #[test]
    fn macro_exact_lookup() {
        let mut table = MacroTable::new();
        table.push("greet".to_string());
        table.append_line("prn #1".to_string());
        assert_eq!(table.find_exact("greet").unwrap().body.len(), 1);
        assert!(table.find_exact("nope").is_none());
    }

    #[test]
    fn shift_data_symbols_only_affects_data_kind() {
        let mut t = SymbolTable::new();
        t.push(Symbol { name: "d".into(), kind: SymbolKind::Data, address: 3 });
        t.push(Symbol { name: "c".into(), kind: SymbolKind::Code, address: 5 });
        t.shift_data_symbols(100);
        assert_eq!(t.find("d").unwrap().address, 103);
        assert_eq!(t.find("c").unwrap().address, 5);
    }
}
