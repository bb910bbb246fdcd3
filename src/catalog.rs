//! The sixteen-opcode instruction catalog and the operand-type tag enum.

use num_derive::{FromPrimitive, ToPrimitive};

/// Kind of an operand, as determined by its surface syntax. The
/// discriminant values double as the 2-bit wire tag written into the
/// first instruction word, so they must never be reordered.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum OperandType {
    Immediate = 0,
    Symbol = 1,
    Matrix = 2,
    Register = 3,
}

pub const MIN_REGISTER: u8 = 0;
pub const MAX_REGISTER: u8 = 7;
pub const MAX_SYMBOL_LENGTH: usize = 30;
pub const MAX_POSITIVE_DATA_VALUE: i32 = 511;
pub const MIN_NEGATIVE_DATA_VALUE: i32 = -512;
pub const IC_START: u32 = 100;
pub const LINE_MAX_LENGTH: usize = 80;

/// Number of operands a command takes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arity {
    Zero,
    One,
    Two,
}

/// One row of the command catalog: a mnemonic, its opcode number, and
/// the operand types each position accepts.
pub struct Command {
    pub name: &'static str,
    pub opcode: u8,
    pub arity: Arity,
    pub source_types: &'static [OperandType],
    pub dest_types: &'static [OperandType],
}

use OperandType::*;

const ALL: &[OperandType] = &[Immediate, Symbol, Matrix, Register];
const NO_IMMEDIATE: &[OperandType] = &[Symbol, Matrix, Register];
const SYM_OR_MAT: &[OperandType] = &[Symbol, Matrix];
const NONE: &[OperandType] = &[];

pub static CATALOG: &[Command] = &[
    Command { name: "mov", opcode: 0, arity: Arity::Two, source_types: ALL, dest_types: NO_IMMEDIATE },
    Command { name: "cmp", opcode: 1, arity: Arity::Two, source_types: ALL, dest_types: ALL },
    Command { name: "add", opcode: 2, arity: Arity::Two, source_types: ALL, dest_types: NO_IMMEDIATE },
    Command { name: "sub", opcode: 3, arity: Arity::Two, source_types: ALL, dest_types: NO_IMMEDIATE },
    Command { name: "lea", opcode: 4, arity: Arity::Two, source_types: SYM_OR_MAT, dest_types: NO_IMMEDIATE },
    Command { name: "clr", opcode: 5, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "not", opcode: 6, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "inc", opcode: 7, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "dec", opcode: 8, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "jmp", opcode: 9, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "bne", opcode: 10, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "jsr", opcode: 11, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "red", opcode: 12, arity: Arity::One, source_types: NONE, dest_types: NO_IMMEDIATE },
    Command { name: "prn", opcode: 13, arity: Arity::One, source_types: NONE, dest_types: ALL },
    Command { name: "rts", opcode: 14, arity: Arity::Zero, source_types: NONE, dest_types: NONE },
    Command { name: "stop", opcode: 15, arity: Arity::Zero, source_types: NONE, dest_types: NONE },
];

pub fn find_command(name: &str) -> Option<&'static Command> {
    CATALOG.iter().find(|c| c.name == name)
}

/// Directive names recognized after a leading `.`.
pub const DIRECTIVE_NAMES: &[&str] = &["entry", "extern", "data", "mat", "string"];

pub const MACRO_START_KEYWORD: &str = "mcro";
pub const MACRO_END_KEYWORD: &str = "mcroend";

#[cfg(test)]
mod tests {
    use super::*;
    use num::traits::{FromPrimitive, ToPrimitive};

    #[test]
    fn operand_type_discriminants() {
        assert_eq!(Immediate.to_u8(), Some(0));
        assert_eq!(Symbol.to_u8(), Some(1));
        assert_eq!(Matrix.to_u8(), Some(2));
        assert_eq!(Register.to_u8(), Some(3));
        assert_eq!(OperandType::from_u8(3), Some(Register));
    }

    #[test]
    fn catalog_has_sixteen_entries() {
        assert_eq!(CATALOG.len(), 16);
    }

    #[test]
    fn find_command_by_name() {
        let stop = find_command("stop").unwrap();
        assert_eq!(stop.opcode, 15);
        assert_eq!(find_command("nope"), None);
    }

    #[test]
    fn one_operand_commands_have_empty_source_set() {
        let jmp = find_command("jmp").unwrap();
        assert!(jmp.source_types.is_empty());
        assert_eq!(jmp.arity, Arity::One);
    }
}
