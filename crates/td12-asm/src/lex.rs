//! Line-oriented lexer: blank lines and `;`-comments are dropped, a line
//! ending in `:` is a label, a line starting with `.` is a memory-location
//! directive, everything else is a mnemonic plus space-separated operands.

use crate::error::{AsmError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Label(String),
    MemoryLocation(u32),
    Instruction { mnemonic: String, operands: Vec<String> },
}

/// One parsed line paired with its 1-based source line number, used for
/// diagnostics throughout layout and linking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedLine {
    pub line: usize,
    pub item: Line,
}

fn parse_int(text: &str) -> Option<u32> {
    let cleaned = text.replace('_', "");
    if let Some(rest) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X")) {
        u32::from_str_radix(rest, 16).ok()
    } else if let Some(rest) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
        u32::from_str_radix(rest, 2).ok()
    } else if let Some(rest) = cleaned.strip_prefix("0o").or(cleaned.strip_prefix("0O")) {
        u32::from_str_radix(rest, 8).ok()
    } else {
        cleaned.parse::<u32>().ok()
    }
}

pub fn parse_immediate_int(text: &str) -> Option<u32> {
    parse_int(text)
}

/// Tokenizes the whole source into [`LocatedLine`]s, skipping blank and
/// comment lines entirely.
pub fn lex(source: &str) -> Result<Vec<LocatedLine>> {
    let mut out = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        if let Some(label) = trimmed.strip_suffix(':') {
            out.push(LocatedLine { line, item: Line::Label(label.to_string()) });
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('.') {
            let value = parse_int(rest)
                .ok_or_else(|| AsmError::InvalidDirective { line, text: trimmed.to_string() })?;
            out.push(LocatedLine { line, item: Line::MemoryLocation(value) });
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let mnemonic = parts.next().unwrap().to_ascii_uppercase();
        let operands: Vec<String> = parts.map(|s| s.to_string()).collect();
        out.push(LocatedLine { line, item: Line::Instruction { mnemonic, operands } });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_dropped() {
        let lines = lex("\n; a comment\n\nNOP\n").unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn label_lines_end_in_colon() {
        let lines = lex("start:\nNOP\n").unwrap();
        assert_eq!(lines[0].item, Line::Label("start".to_string()));
    }

    #[test]
    fn directive_parses_hex_address() {
        let lines = lex(".0x100\n").unwrap();
        assert_eq!(lines[0].item, Line::MemoryLocation(0x100));
    }

    #[test]
    fn instruction_mnemonics_are_case_insensitive() {
        let lines = lex("ldi 5\n").unwrap();
        let Line::Instruction { mnemonic, operands } = &lines[0].item else { panic!() };
        assert_eq!(mnemonic, "LDI");
        assert_eq!(operands, &["5"]);
    }
}
