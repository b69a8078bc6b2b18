//! td12-asm - assembler/linker for the td12dk instruction set.
//!
//! Lexes line-oriented assembly source, lays out labels and instructions
//! against a ROM address cursor, resolves deferred label immediates, and
//! packs the result into the wire byte format.
//!
//! Unlike the rest of the toolchain, a failed assembly pass can carry more
//! than one error: [`assemble`] returns every error detected during
//! layout/linking, in detection order, rather than stopping at the first.

pub mod encode;
pub mod error;
pub mod lex;
pub mod link;
pub mod pack;

use std::collections::HashMap;

pub use error::AsmError;

/// An assembled program: the full `0x700`-word ROM image and its label
/// table, ready for byte-packing or a labels listing.
pub struct Program {
    pub words: Vec<u32>,
    pub labels: HashMap<String, u32>,
}

/// Assembles `source` into a complete, linked [`Program`]. On failure,
/// returns every error detected during the pass, in detection order; the
/// caller must not treat any ROM image as usable output in that case.
pub fn assemble(source: &str) -> Result<Program, Vec<AsmError>> {
    let lines = lex::lex(source).map_err(|e| vec![e])?;
    let outcome = link::link(&lines);
    if !outcome.is_ok() {
        return Err(outcome.errors);
    }
    Ok(Program { words: outcome.words, labels: outcome.labels })
}

impl Program {
    /// Packs the ROM image into its `0xA80`-byte wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        pack::pack(&self.words)
    }

    /// Renders the packed image as a plain hex dump.
    pub fn hex_str(&self) -> String {
        pack::hex_dump(&self.to_bytes())
    }

    /// Renders the label table as `0xADDR, name` lines, sorted by address
    /// for deterministic output.
    pub fn labels_listing(&self) -> String {
        let mut entries: Vec<(&String, &u32)> = self.labels.iter().collect();
        entries.sort_by_key(|(name, addr)| (**addr, (*name).clone()));
        entries
            .into_iter()
            .map(|(name, addr)| format!("{addr:#05x}, {name}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembled_program_has_full_rom_size() {
        let program = assemble("nop\n").unwrap();
        assert_eq!(program.words.len(), link::ROM_WORDS);
        assert_eq!(program.to_bytes().len(), pack::ROM_BYTES);
    }

    #[test]
    fn labels_listing_is_sorted_by_address() {
        let program = assemble("b:\nnop\na:\nnop\n").unwrap();
        let listing = program.labels_listing();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "0x000, b");
        assert_eq!(lines[1], "0x001, a");
    }

    #[test]
    fn propagates_an_undefined_label_error() {
        let errors = assemble("ldi :nowhere\n").unwrap_err();
        assert!(matches!(errors[0], AsmError::UndefinedLabel { .. }));
    }

    #[test]
    fn accumulates_every_error_in_one_pass() {
        let errors = assemble("foo\nldi :missing\n").unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
