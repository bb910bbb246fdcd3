//! Macro preprocessing: expands `mcro`/`mcroend` blocks into their call
//! sites, producing a flat preprocessed text stream.

use crate::catalog::{self, LINE_MAX_LENGTH};
use crate::error::Diagnostic;
use crate::lexer::Cursor;
use crate::tables::MacroTable;

pub struct PreprocessOutput {
    pub text: String,
    pub macros: MacroTable,
}

/// Runs the macro preprocessor over `source`, returning the expanded
/// text and the macro table. Errors are collected into `diagnostics` and
/// processing continues to the end of the input; the returned text may
/// be a partial/best-effort result when diagnostics is non-empty.
pub fn preprocess(source: &str, diagnostics: &mut Vec<Diagnostic>) -> PreprocessOutput {
    let mut macros = MacroTable::new();
    let mut output = String::new();
    let mut inside_macro = false;
    let mut current_macro_name: Option<String> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = (idx + 1) as u32;
        let line = raw_line.trim_end_matches('\r');

        if line.len() > LINE_MAX_LENGTH {
            diagnostics.push(Diagnostic::error(
                line_number,
                format!("line length should not be more than {}", LINE_MAX_LENGTH),
            ));
            continue;
        }

        let mut cursor = Cursor::new(line);
        cursor.skip_whitespace();

        if cursor.rest().starts_with(catalog::MACRO_END_KEYWORD) {
            let mut after = Cursor::new(&cursor.rest()[catalog::MACRO_END_KEYWORD.len()..]);
            after.skip_whitespace();
            if !after.is_empty() {
                diagnostics.push(Diagnostic::error(
                    line_number,
                    "macro end should not contain trailing text",
                ));
                continue;
            }
            if !inside_macro {
                diagnostics.push(Diagnostic::error(line_number, "mcroend without matching mcro"));
                continue;
            }
            inside_macro = false;
            current_macro_name = None;
            continue;
        }

        if cursor.rest().starts_with(catalog::MACRO_START_KEYWORD) {
            let mut after = Cursor::new(&cursor.rest()[catalog::MACRO_START_KEYWORD.len()..]);
            after.skip_whitespace();

            if after.is_empty() {
                diagnostics.push(Diagnostic::error(line_number, "macro definition missing a name"));
                continue;
            }

            let name = match after.get_macro_name() {
                Ok(n) => n.to_string(),
                Err(_) => {
                    diagnostics.push(Diagnostic::error(
                        line_number,
                        "macro name must start with a letter and contain only letters, digits, or underscores",
                    ));
                    continue;
                }
            };

            if macros.find_by_prefix(&name).is_some() {
                diagnostics.push(Diagnostic::error(
                    line_number,
                    format!("found multiple macros with the same name ({})", name),
                ));
                continue;
            }

            if !validate_macro_name(&name) {
                diagnostics.push(Diagnostic::error(
                    line_number,
                    format!("macro name must not be a command or directive name ({})", name),
                ));
                continue;
            }

            after.skip_whitespace();
            if !after.is_empty() {
                diagnostics.push(Diagnostic::error(line_number, "macro definition has trailing text"));
                continue;
            }

            macros.push(name.clone());
            current_macro_name = Some(name);
            inside_macro = true;
            continue;
        }

        if inside_macro {
            let _ = &current_macro_name;
            macros.append_line(line.to_string());
            continue;
        }

        cursor.skip_whitespace();
        let probe_len = cursor.word_len_until_whitespace();
        let probe = &cursor.rest()[..probe_len];

        if !probe.is_empty() {
            if let Some(found) = macros.find_by_prefix(probe) {
                for body_line in found.body.clone() {
                    output.push_str(&body_line);
                    output.push('\n');
                }
                continue;
            }
        }

        output.push_str(line);
        output.push('\n');
    }

    PreprocessOutput { text: output, macros }
}

fn validate_macro_name(name: &str) -> bool {
    if catalog::find_command(name).is_some() {
        return false;
    }
    let stripped = name.strip_prefix('.').unwrap_or(name);
    if catalog::DIRECTIVE_NAMES.contains(&stripped) || stripped == catalog::MACRO_START_KEYWORD {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_macro_invocation() {
        let source = "mcro greet\nprn #1\nmcroend\ngreet\nstop";
        let mut diags = Vec::new();
        let out = preprocess(source, &mut diags);
        assert!(diags.is_empty());
        assert_eq!(out.text, "prn #1\nstop\n");
    }

    #[test]
    fn passes_through_non_macro_lines_unchanged() {
        let source = "mov r1, r2\nstop";
        let mut diags = Vec::new();
        let out = preprocess(source, &mut diags);
        assert!(diags.is_empty());
        assert_eq!(out.text, "mov r1, r2\nstop\n");
    }

    #[test]
    fn rejects_macro_named_like_a_command() {
        let source = "mcro mov\nstop\nmcroend";
        let mut diags = Vec::new();
        preprocess(source, &mut diags);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn rejects_overlong_line() {
        let long_line = "a".repeat(90);
        let mut diags = Vec::new();
        preprocess(&long_line, &mut diags);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn macro_name_allows_underscore() {
        let source = "mcro my_macro\nstop\nmcroend\nmy_macro";
        let mut diags = Vec::new();
        let out = preprocess(source, &mut diags);
        assert!(diags.is_empty());
        assert_eq!(out.text, "stop\n");
    }
}
