//! First pass: statement parsing, operand classification, word emission,
//! and population of the symbol/entry/external tables.

use crate::catalog::{self, Arity, Command, OperandType, MAX_POSITIVE_DATA_VALUE, MAX_SYMBOL_LENGTH, MIN_NEGATIVE_DATA_VALUE};
use crate::error::Diagnostic;
use crate::lexer::{decimal_to_binary, Cursor};
use crate::tables::{AssemblerState, CodeWord, DataWord, Entry, Payload, Symbol, SymbolKind};
use matches::debug_assert_matches;

/// Runs the first pass over `text` (the macro-expanded source),
/// mutating `state` in place. Errors are collected into `diagnostics`;
/// processing continues past a bad line to the end of the file.
pub fn run(text: &str, state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = (idx + 1) as u32;
        process_line(raw_line, line_number, state, diagnostics);
    }
}

fn process_line(raw_line: &str, line_number: u32, state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    let mut cursor = Cursor::new(raw_line);
    cursor.skip_whitespace();

    if cursor.is_empty() {
        return;
    }
    if cursor.rest().starts_with(';') {
        return;
    }

    let mut label: Option<&str> = None;
    let first_word = match copy_next_command_or_symbol(&mut cursor) {
        Some(w) => w,
        None => {
            diagnostics.push(Diagnostic::error(line_number, "command or symbol must start with a letter"));
            return;
        }
    };

    let mut head = first_word;
    if head.ends_with(':') {
        let candidate = &head[..head.len() - 1];
        if candidate.chars().count() > MAX_SYMBOL_LENGTH {
            diagnostics.push(Diagnostic::error(
                line_number,
                format!("symbol length should not be more than {}", MAX_SYMBOL_LENGTH),
            ));
            return;
        }
        if state.symbols.contains(candidate) {
            diagnostics.push(Diagnostic::error(line_number, format!("symbol already defined ({})", candidate)));
            return;
        }
        if state.macros.find_by_prefix(candidate).is_some() {
            diagnostics.push(Diagnostic::error(
                line_number,
                format!("symbol name and macro name may not collide ({})", candidate),
            ));
            return;
        }
        label = Some(candidate);

        cursor.skip_whitespace();
        head = match copy_next_command_or_symbol(&mut cursor) {
            Some(w) => w,
            None => {
                diagnostics.push(Diagnostic::error(line_number, "expected a command after the label"));
                return;
            }
        };
    }

    cursor.skip_whitespace();

    if let Some(directive) = head.strip_prefix('.') {
        process_directive(directive, label, &mut cursor, line_number, state, diagnostics);
        return;
    }

    process_instruction(head, label, &mut cursor, line_number, state, diagnostics);
}

/// Mirrors `coppy_next_command_or_symbol`: the leading word, optionally
/// prefixed with `.`, continuing through alphanumerics, optionally
/// ending in `:`.
fn copy_next_command_or_symbol<'a>(cursor: &mut Cursor<'a>) -> Option<&'a str> {
    cursor.skip_whitespace();
    let rest = cursor.rest();
    let mut iter = rest.char_indices();
    let mut end = 0;

    let first = iter.next();
    let (mut idx, mut c) = match first {
        Some((i, c)) => (i, c),
        None => return None,
    };

    if c == '.' {
        match iter.next() {
            Some((i2, c2)) => {
                idx = i2;
                c = c2;
            }
            None => return None,
        }
    }

    if !c.is_alphabetic() {
        return None;
    }

    end = idx + c.len_utf8();
    for ch in rest[end..].chars() {
        if ch.is_alphanumeric() {
            end += ch.len_utf8();
        } else {
            break;
        }
    }

    if rest[end..].starts_with(':') {
        end += 1;
    }

    if end == 0 {
        return None;
    }

    let word = &rest[..end];
    *cursor = Cursor::new(&rest[end..]);
    Some(word)
}

fn process_directive(
    directive: &str,
    label: Option<&str>,
    cursor: &mut Cursor,
    line_number: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match directive {
        "entry" => {
            cursor.skip_whitespace();
            let name = match cursor.get_symbol(MAX_SYMBOL_LENGTH) {
                Ok(n) => n,
                Err(_) => {
                    diagnostics.push(Diagnostic::error(line_number, "invalid entry symbol name"));
                    return;
                }
            };
            if state.entries.contains(name) {
                diagnostics.push(Diagnostic::error(line_number, format!("duplicate entry ({})", name)));
                return;
            }
            state.entries.push(Entry { name: name.to_string(), address: 0, source_line: line_number });
        }
        "extern" => {
            cursor.skip_whitespace();
            let name = match cursor.get_symbol(MAX_SYMBOL_LENGTH) {
                Ok(n) => n,
                Err(_) => {
                    diagnostics.push(Diagnostic::error(line_number, "invalid extern symbol name"));
                    return;
                }
            };
            if state.symbols.contains(name) {
                diagnostics.push(Diagnostic::error(line_number, format!("symbol already declared ({})", name)));
                return;
            }
            state.symbols.push(Symbol { name: name.to_string(), kind: SymbolKind::External, address: 0 });
        }
        "data" => {
            if let Some(label) = label {
                if state.symbols.contains(label) {
                    diagnostics.push(Diagnostic::error(line_number, format!("symbol already defined ({})", label)));
                    return;
                }
                state.symbols.push(Symbol { name: label.to_string(), kind: SymbolKind::Data, address: state.dc });
            }
            process_data(cursor, line_number, state, diagnostics);
        }
        "mat" => {
            if let Some(label) = label {
                if state.symbols.contains(label) {
                    diagnostics.push(Diagnostic::error(line_number, format!("symbol already defined ({})", label)));
                    return;
                }
                state.symbols.push(Symbol { name: label.to_string(), kind: SymbolKind::Data, address: state.dc });
            }
            process_mat(cursor, line_number, state, diagnostics);
        }
        "string" => {
            if let Some(label) = label {
                if state.symbols.contains(label) {
                    diagnostics.push(Diagnostic::error(line_number, format!("symbol already defined ({})", label)));
                    return;
                }
                state.symbols.push(Symbol { name: label.to_string(), kind: SymbolKind::Data, address: state.dc });
            }
            process_string(cursor, line_number, state, diagnostics);
        }
        other => {
            diagnostics.push(Diagnostic::error(line_number, format!("unknown directive ({})", other)));
        }
    }
}

fn process_data(cursor: &mut Cursor, line_number: u32, state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    cursor.skip_whitespace();
    if cursor.is_empty() {
        diagnostics.push(Diagnostic::error(line_number, "expected at least one value after .data"));
        return;
    }

    loop {
        cursor.skip_whitespace();
        let value = match parse_ranged_number(cursor, line_number, diagnostics) {
            Some(v) => v,
            None => return,
        };
        state.data.push(DataWord { address: state.dc, value: (value as u16) & 0x3ff });
        state.dc += 1;

        cursor.skip_whitespace();
        match cursor.peek() {
            Some(',') => {
                let rest = &cursor.rest()[1..];
                *cursor = Cursor::new(rest);
            }
            Some(';') | None => break,
            Some(_) => {
                diagnostics.push(Diagnostic::error(line_number, "expected a comma between .data values"));
                return;
            }
        }
    }
}

fn parse_ranged_number(cursor: &mut Cursor, line_number: u32, diagnostics: &mut Vec<Diagnostic>) -> Option<i32> {
    let text = match cursor.copy_number() {
        Some(t) => t,
        None => {
            diagnostics.push(Diagnostic::error(line_number, "expected a number after ','"));
            return None;
        }
    };
    match text.parse::<i32>() {
        Ok(v) if v >= MIN_NEGATIVE_DATA_VALUE && v <= MAX_POSITIVE_DATA_VALUE => Some(v),
        Ok(_) => {
            diagnostics.push(Diagnostic::error(
                line_number,
                format!("value out of range [{}, {}]", MIN_NEGATIVE_DATA_VALUE, MAX_POSITIVE_DATA_VALUE),
            ));
            None
        }
        Err(_) => {
            diagnostics.push(Diagnostic::error(line_number, "malformed number"));
            None
        }
    }
}

fn process_mat(cursor: &mut Cursor, line_number: u32, state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    cursor.skip_whitespace();
    let cell_count = match parse_mat_dims(cursor) {
        Some(n) => n,
        None => {
            diagnostics.push(Diagnostic::error(line_number, "invalid matrix size syntax"));
            return;
        }
    };

    cursor.skip_whitespace();
    let mut actual = 0u32;
    if !cursor.is_empty() && !cursor.rest().starts_with(';') {
        loop {
            cursor.skip_whitespace();
            let value = match parse_ranged_number(cursor, line_number, diagnostics) {
                Some(v) => v,
                None => break,
            };
            actual += 1;
            if actual > cell_count {
                diagnostics.push(Diagnostic::error(line_number, format!("too many values for a {}-cell matrix", cell_count)));
                break;
            }
            state.data.push(DataWord { address: state.dc, value: (value as u16) & 0x3ff });
            state.dc += 1;

            cursor.skip_whitespace();
            match cursor.peek() {
                Some(',') => {
                    let rest = &cursor.rest()[1..];
                    *cursor = Cursor::new(rest);
                }
                Some(';') | None => break,
                Some(_) => {
                    diagnostics.push(Diagnostic::error(line_number, "expected a comma between matrix values"));
                    break;
                }
            }
        }
    }

    for _ in actual..cell_count {
        state.data.push(DataWord { address: state.dc, value: 0 });
        state.dc += 1;
    }
}

/// Parses `[rows][cols]` with decimal (not register-prefixed) sizes, as
/// used by the `.mat` directive itself.
fn parse_mat_dims(cursor: &mut Cursor) -> Option<u32> {
    if cursor.peek() != Some('[') {
        return None;
    }
    *cursor = Cursor::new(&cursor.rest()[1..]);
    cursor.skip_whitespace();
    let rows = cursor.copy_number()?.parse::<u32>().ok()?;
    cursor.skip_whitespace();
    if cursor.peek() != Some(']') {
        return None;
    }
    *cursor = Cursor::new(&cursor.rest()[1..]);
    cursor.skip_whitespace();
    if cursor.peek() != Some('[') {
        return None;
    }
    *cursor = Cursor::new(&cursor.rest()[1..]);
    cursor.skip_whitespace();
    let cols = cursor.copy_number()?.parse::<u32>().ok()?;
    cursor.skip_whitespace();
    if cursor.peek() != Some(']') {
        return None;
    }
    *cursor = Cursor::new(&cursor.rest()[1..]);
    Some(rows * cols)
}

fn process_string(cursor: &mut Cursor, line_number: u32, state: &mut AssemblerState, diagnostics: &mut Vec<Diagnostic>) {
    cursor.skip_whitespace();
    if cursor.peek() != Some('"') {
        diagnostics.push(Diagnostic::error(line_number, "expected a quoted string"));
        return;
    }
    let rest = &cursor.rest()[1..];
    let end = match rest.find('"') {
        Some(i) => i,
        None => {
            diagnostics.push(Diagnostic::error(line_number, "unterminated string"));
            return;
        }
    };

    for ch in rest[..end].chars() {
        state.data.push(DataWord { address: state.dc, value: (ch as u32 as u16) & 0x3ff });
        state.dc += 1;
    }
    state.data.push(DataWord { address: state.dc, value: 0 });
    state.dc += 1;

    *cursor = Cursor::new(&rest[end + 1..]);
}

fn process_instruction(
    mnemonic: &str,
    label: Option<&str>,
    cursor: &mut Cursor,
    line_number: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let command = match catalog::find_command(mnemonic) {
        Some(c) => c,
        None => {
            diagnostics.push(Diagnostic::error(line_number, format!("unknown command ({})", mnemonic)));
            return;
        }
    };

    if let Some(label) = label {
        if state.symbols.contains(label) {
            diagnostics.push(Diagnostic::error(line_number, format!("symbol already defined ({})", label)));
            return;
        }
        state.symbols.push(Symbol { name: label.to_string(), kind: SymbolKind::Code, address: state.ic });
    }

    cursor.skip_whitespace();
    let first_operand = next_operand_token(cursor);

    cursor.skip_whitespace();
    let second_operand = match cursor.peek() {
        Some(',') => {
            let rest = &cursor.rest()[1..];
            *cursor = Cursor::new(rest);
            cursor.skip_whitespace();
            match next_operand_token(cursor) {
                Some(t) => Some(t),
                None => {
                    diagnostics.push(Diagnostic::error(line_number, "expected a second operand"));
                    return;
                }
            }
        }
        Some(c) if c != ';' => {
            diagnostics.push(Diagnostic::error(line_number, "expected a comma between operands"));
            return;
        }
        _ => None,
    };

    let operand_count = first_operand.is_some() as u8 + second_operand.is_some() as u8;
    let expected = match command.arity {
        Arity::Zero => 0,
        Arity::One => 1,
        Arity::Two => 2,
    };
    if operand_count != expected {
        diagnostics.push(Diagnostic::error(
            line_number,
            format!("unexpected number of operands (expected {}, found {})", expected, operand_count),
        ));
        return;
    }

    let command_address = state.ic;
    state.ic += 1;

    let mut src_tag = 0u8;
    let mut dst_tag = 0u8;
    let mut emitted = Vec::new();

    match (first_operand, second_operand) {
        (None, None) => {}
        (Some(dest_tok), None) => {
            let dest_type = match classify_operand(dest_tok, line_number, diagnostics) {
                Some(t) => t,
                None => return,
            };
            if !command.dest_types.contains(&dest_type) {
                diagnostics.push(Diagnostic::error(line_number, "operand type not allowed in destination position"));
                return;
            }
            dst_tag = crate::tables::operand_tag(dest_type);
            emit_operand(dest_tok, dest_type, line_number, state, diagnostics, &mut emitted);
        }
        (Some(src_tok), Some(dst_tok)) => {
            let src_type = match classify_operand(src_tok, line_number, diagnostics) {
                Some(t) => t,
                None => return,
            };
            let dst_type = match classify_operand(dst_tok, line_number, diagnostics) {
                Some(t) => t,
                None => return,
            };
            if !command.source_types.contains(&src_type) {
                diagnostics.push(Diagnostic::error(line_number, "operand type not allowed in source position"));
                return;
            }
            if !command.dest_types.contains(&dst_type) {
                diagnostics.push(Diagnostic::error(line_number, "operand type not allowed in destination position"));
                return;
            }
            src_tag = crate::tables::operand_tag(src_type);
            dst_tag = crate::tables::operand_tag(dst_type);

            if src_type == OperandType::Register && dst_type == OperandType::Register {
                let src_reg = register_number(src_tok).unwrap();
                let dst_reg = register_number(dst_tok).unwrap();
                let bits = format!(
                    "{}{}{}",
                    decimal_to_binary(src_reg as i32, 4),
                    decimal_to_binary(dst_reg as i32, 4),
                    decimal_to_binary(0, 2)
                );
                emitted.push(CodeWord {
                    address: state.ic,
                    payload: Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap()),
                    source_line: line_number,
                });
                state.ic += 1;
            } else {
                emit_operand(src_tok, src_type, line_number, state, diagnostics, &mut emitted);
                emit_operand(dst_tok, dst_type, line_number, state, diagnostics, &mut emitted);
            }
        }
        (None, Some(_)) => {
            diagnostics.push(Diagnostic::error(line_number, "unexpected leading comma before first operand"));
            return;
        }
    }

    cursor.skip_whitespace();
    if !cursor.is_empty() && !cursor.rest().starts_with(';') {
        diagnostics.push(Diagnostic::error(line_number, "unexpected trailing content after instruction"));
        return;
    }

    let header_bits = format!(
        "{}{}{}{}",
        decimal_to_binary(command.opcode as i32, 4),
        decimal_to_binary(src_tag as i32, 2),
        decimal_to_binary(dst_tag as i32, 2),
        decimal_to_binary(0, 2)
    );
    let header_value = u16::from_str_radix(&header_bits, 2).unwrap();
    state.code.push(CodeWord {
        address: command_address,
        payload: Payload::Resolved(header_value),
        source_line: line_number,
    });
    state.code.extend(emitted);
}

/// Emits the word(s) for one operand of a non-register-pair instruction.
fn emit_operand(
    token: &str,
    operand_type: OperandType,
    line_number: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
    out: &mut Vec<CodeWord>,
) {
    match operand_type {
        OperandType::Immediate => {
            debug_assert_matches!(token.chars().next(), Some('#'));
            let digits = &token[1..];
            let value: i32 = digits.parse().unwrap_or_else(|_| {
                diagnostics.push(Diagnostic::error(line_number, format!("malformed immediate value ({})", token)));
                0
            });
            let bits = format!("{}{}", decimal_to_binary(value, 8), decimal_to_binary(0, 2));
            out.push(CodeWord {
                address: state.ic,
                payload: Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap()),
                source_line: line_number,
            });
            state.ic += 1;
        }
        OperandType::Symbol => {
            out.push(CodeWord { address: state.ic, payload: Payload::Unresolved(token.to_string()), source_line: line_number });
            state.ic += 1;
        }
        OperandType::Matrix => {
            debug_assert!(token.contains('['));
            let bracket = token.find('[').unwrap();
            let base = &token[..bracket];
            out.push(CodeWord { address: state.ic, payload: Payload::Unresolved(base.to_string()), source_line: line_number });
            state.ic += 1;

            let (row_reg, col_reg) = match parse_mat_index_registers(&token[bracket..]) {
                Some(pair) => pair,
                None => {
                    diagnostics.push(Diagnostic::error(line_number, "invalid matrix index syntax"));
                    return;
                }
            };
            let bits = format!(
                "{}{}{}",
                decimal_to_binary(row_reg as i32, 4),
                decimal_to_binary(col_reg as i32, 4),
                decimal_to_binary(0, 2)
            );
            out.push(CodeWord {
                address: state.ic,
                payload: Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap()),
                source_line: line_number,
            });
            state.ic += 1;
        }
        OperandType::Register => {
            let reg = register_number(token).unwrap();
            let bits = format!("{}{}{}", decimal_to_binary(reg as i32, 4), decimal_to_binary(0, 4), decimal_to_binary(0, 2));
            out.push(CodeWord {
                address: state.ic,
                payload: Payload::Resolved(u16::from_str_radix(&bits, 2).unwrap()),
                source_line: line_number,
            });
            state.ic += 1;
        }
    }
}

fn parse_mat_index_registers(brackets: &str) -> Option<(u8, u8)> {
    let mut c = Cursor::new(brackets);
    if c.peek() != Some('[') {
        return None;
    }
    c = Cursor::new(&c.rest()[1..]);
    if c.peek() != Some('r') {
        return None;
    }
    c = Cursor::new(&c.rest()[1..]);
    let r1 = c.peek().filter(|ch| ch.is_ascii_digit())?;
    c = Cursor::new(&c.rest()[1..]);
    if c.peek() != Some(']') {
        return None;
    }
    c = Cursor::new(&c.rest()[1..]);
    if c.peek() != Some('[') {
        return None;
    }
    c = Cursor::new(&c.rest()[1..]);
    if c.peek() != Some('r') {
        return None;
    }
    c = Cursor::new(&c.rest()[1..]);
    let r2 = c.peek().filter(|ch| ch.is_ascii_digit())?;
    c = Cursor::new(&c.rest()[1..]);
    if c.peek() != Some(']') {
        return None;
    }

    let r1 = r1.to_digit(10)? as u8;
    let r2 = r2.to_digit(10)? as u8;
    if r1 > catalog::MAX_REGISTER || r2 > catalog::MAX_REGISTER {
        return None;
    }
    Some((r1, r2))
}

fn register_number(token: &str) -> Option<u8> {
    let digits = &token[1..];
    digits.parse::<u8>().ok().filter(|&n| n <= catalog::MAX_REGISTER)
}

/// Mirrors `get_next_command_operand`: reads one operand token,
/// including an optional `#`/sign prefix and an optional `[..][..]`
/// matrix suffix. Returns `None` (cursor unchanged) if there is nothing
/// to read.
fn next_operand_token<'a>(cursor: &mut Cursor<'a>) -> Option<&'a str> {
    cursor.skip_whitespace();
    let rest = cursor.rest();
    if rest.is_empty() {
        return None;
    }

    let mut end = 0;
    let mut chars = rest.char_indices().peekable();

    if let Some(&(_, '#')) = chars.peek() {
        chars.next();
        end = 1;
        if let Some(&(_, c)) = chars.peek() {
            if c == '+' || c == '-' {
                chars.next();
                end += 1;
            }
        }
    }

    while let Some(&(i, c)) = chars.peek() {
        if c.is_alphanumeric() {
            end = i + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }

    let mut mat_end = end;
    let after_word = &rest[end..];
    let ws_skip = after_word
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or_else(|| after_word.len());
    if after_word[ws_skip..].starts_with('[') {
        let mut depth_pos = end + ws_skip;
        // first bracket pair
        if let Some(close) = rest[depth_pos..].find(']') {
            depth_pos += close + 1;
            // second bracket pair, if present
            let gap = &rest[depth_pos..];
            let gap_skip = gap.find(|c: char| c != ' ' && c != '\t').unwrap_or_else(|| gap.len());
            if gap[gap_skip..].starts_with('[') {
                if let Some(close2) = rest[depth_pos + gap_skip..].find(']') {
                    depth_pos += gap_skip + close2 + 1;
                }
            }
            mat_end = depth_pos;
        }
    }
    if mat_end > end {
        end = mat_end;
    }

    if end == 0 || (end == 1 && rest.starts_with('#')) {
        return None;
    }

    let token = &rest[..end];
    *cursor = Cursor::new(&rest[end..]);
    Some(token)
}

/// Classifies an already-extracted operand token per the surface-syntax
/// rules in the component design (leading `#` → immediate, `r<0-7>` →
/// register, `name[..][..] ` → matrix, else → symbol).
fn classify_operand(token: &str, line_number: u32, diagnostics: &mut Vec<Diagnostic>) -> Option<OperandType> {
    if token.starts_with('#') {
        return Some(OperandType::Immediate);
    }

    if token.len() == 2 && token.starts_with('r') {
        let digit = token.as_bytes()[1];
        if digit.is_ascii_digit() {
            let n = digit - b'0';
            return if n <= catalog::MAX_REGISTER {
                Some(OperandType::Register)
            } else {
                diagnostics.push(Diagnostic::error(line_number, format!("invalid register number ({})", token)));
                None
            };
        }
    }

    if token.contains('[') {
        return Some(OperandType::Matrix);
    }

    Some(OperandType::Symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_text(text: &str) -> (AssemblerState, Vec<Diagnostic>) {
        let mut state = AssemblerState::new();
        let mut diags = Vec::new();
        run(text, &mut state, &mut diags);
        (state, diags)
    }

    #[test]
    fn stop_only_program() {
        let (state, diags) = run_text("stop");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.code.len(), 1);
        assert_eq!(state.ic, 101);
        match &state.code[0].payload {
            Payload::Resolved(v) => assert_eq!(*v, 0b1111000000),
            _ => panic!("expected resolved payload"),
        }
    }

    #[test]
    fn register_pair_shares_one_word() {
        let (state, diags) = run_text("mov r3, r5");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.code.len(), 2);
        assert_eq!(state.ic, 102);
        match &state.code[1].payload {
            Payload::Resolved(v) => assert_eq!(*v, 0b0011010100),
            _ => panic!("expected resolved payload"),
        }
    }

    #[test]
    fn data_directive_with_label() {
        let (state, diags) = run_text("X: .data 1,-1\nmov X, r0");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.data.len(), 2);
        assert_eq!(state.data[0].value & 0x3ff, 1);
        assert_eq!(state.symbols.find("X").unwrap().kind, SymbolKind::Data);
        assert_eq!(state.code.len(), 3);
        match &state.code[1].payload {
            Payload::Unresolved(name) => assert_eq!(name, "X"),
            _ => panic!("expected unresolved payload"),
        }
    }

    #[test]
    fn extern_then_jump() {
        let (state, diags) = run_text(".extern E\njmp E");
        assert!(diags.is_empty(), "{:?}", diags);
        assert!(state.symbols.find("E").is_some());
        assert_eq!(state.code.len(), 2);
    }

    #[test]
    fn data_out_of_range_is_rejected() {
        let (_, diags) = run_text(".data 512");
        assert_eq!(diags.len(), 1);
        let (_, diags) = run_text(".data -513");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn data_boundary_values_accepted() {
        let (_, diags) = run_text(".data -512, 0, 511");
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn register_out_of_range_is_rejected() {
        let (_, diags) = run_text("clr r8");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn register_boundary_accepted() {
        let (_, diags) = run_text("clr r7");
        assert!(diags.is_empty(), "{:?}", diags);
        let (_, diags) = run_text("clr r0");
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn symbol_length_boundary() {
        let ok = "a".repeat(30);
        let (_, diags) = run_text(&format!("{}: stop", ok));
        assert!(diags.is_empty(), "{:?}", diags);

        let too_long = "a".repeat(31);
        let (_, diags) = run_text(&format!("{}: stop", too_long));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn mat_directive_pads_missing_cells_with_zero() {
        let (state, diags) = run_text("M: .mat [2][2] 1,2,3");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.data.len(), 4);
        assert_eq!(state.data[3].value, 0);
    }

    #[test]
    fn data_trailing_comma_is_rejected() {
        let (_, diags) = run_text(".data 1,");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn data_leading_comma_is_rejected() {
        let (_, diags) = run_text(".data ,1");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn mat_trailing_comma_still_pads_to_declared_cell_count() {
        let (state, diags) = run_text("M: .mat [2][2] 1,2,");
        assert_eq!(diags.len(), 1);
        assert_eq!(state.data.len(), 4);
        assert_eq!(state.data[2].value, 0);
        assert_eq!(state.data[3].value, 0);
    }

    #[test]
    fn leading_comma_before_single_operand_is_reported_not_a_panic() {
        let (_, diags) = run_text("clr ,r3");
        assert_eq!(diags.len(), 1);
        let (_, diags) = run_text("jmp ,x");
        assert_eq!(diags.len(), 1);
        let (_, diags) = run_text("prn ,#5");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn string_directive_emits_codepoints_and_terminator() {
        let (state, diags) = run_text(r#".string "AB""#);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.data.len(), 3);
        assert_eq!(state.data[0].value, 65);
        assert_eq!(state.data[1].value, 66);
        assert_eq!(state.data[2].value, 0);
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let (state, diags) = run_text("\n   \n; a comment\nstop");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(state.code.len(), 1);
    }
}
