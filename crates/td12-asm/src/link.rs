//! Two-phase layout and linking: walk the parsed lines once to assign every
//! label and instruction an address, then emit one word per ROM address,
//! resolving deferred `:label` immediates along the way.
//!
//! Unlike the other pipeline stages, the assembler accumulates every error
//! found during a pass instead of stopping at the first one: a single run
//! can report several unrelated problems at once. The caller sees all of
//! them via [`LinkOutcome::errors`]; a non-empty list means the ROM image
//! must not be treated as usable output, even though one was produced.

use std::collections::HashMap;

use crate::encode::{encode, encode_immediate, Encoded};
use crate::error::AsmError;
use crate::lex::{Line, LocatedLine};

pub const ROM_WORDS: usize = 0x700;

pub struct LinkOutcome {
    pub words: Vec<u32>,
    pub labels: HashMap<String, u32>,
    pub errors: Vec<AsmError>,
}

impl LinkOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct PendingInstruction {
    mnemonic: String,
    operands: Vec<String>,
    line: usize,
}

/// Lays out addresses for every label and instruction, then emits a full
/// `0x700`-word ROM image, resolving every deferred immediate. Every error
/// encountered along the way is recorded rather than aborting the pass.
pub fn link(lines: &[LocatedLine]) -> LinkOutcome {
    let mut cursor: u32 = 0;
    let mut labels: HashMap<String, u32> = HashMap::new();
    let mut label_sites: HashMap<String, usize> = HashMap::new();
    let mut by_address: HashMap<u32, PendingInstruction> = HashMap::new();
    let mut errors = Vec::new();

    for located in lines {
        match &located.item {
            Line::MemoryLocation(addr) => cursor = *addr,
            Line::Label(name) => {
                if let Some(&first_line) = label_sites.get(name) {
                    errors.push(AsmError::DuplicateLabel {
                        name: name.clone(),
                        first_line,
                        line: located.line,
                    });
                } else {
                    labels.insert(name.clone(), cursor);
                    label_sites.insert(name.clone(), located.line);
                }
            }
            Line::Instruction { mnemonic, operands } => {
                by_address.insert(
                    cursor,
                    PendingInstruction {
                        mnemonic: mnemonic.clone(),
                        operands: operands.clone(),
                        line: located.line,
                    },
                );
                cursor += 1;
            }
        }
    }

    if cursor as usize > ROM_WORDS {
        errors.push(AsmError::ProgramTooLarge { used: cursor as usize, capacity: ROM_WORDS });
    }

    let mut words = Vec::with_capacity(ROM_WORDS);
    for addr in 0..ROM_WORDS as u32 {
        let Some(pending) = by_address.get(&addr) else {
            words.push(0x000);
            continue;
        };
        match encode(&pending.mnemonic, &pending.operands, pending.line) {
            Ok(Encoded::Word(w)) => words.push(w),
            Ok(Encoded::DeferredImmediate { opcode_fields, label }) => {
                match labels.get(&label).copied() {
                    Some(target) => words.push(encode_immediate(opcode_fields.1, target)),
                    None => {
                        errors.push(AsmError::UndefinedLabel { name: label.clone(), line: pending.line });
                        words.push(0x000);
                    }
                }
            }
            Err(e) => {
                errors.push(e);
                words.push(0x000);
            }
        }
    }

    LinkOutcome { words, labels, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::lex;

    #[test]
    fn known_program_layout() {
        let lines = lex("ldi 5\nldi :L\nL:\n").unwrap();
        let linked = link(&lines);
        assert!(linked.is_ok());
        assert_eq!(linked.words[0], 0x080 | 5);
        assert_eq!(linked.words[1], 0x080 | 2);
        assert_eq!(linked.labels["L"], 2);
    }

    #[test]
    fn gaps_are_filled_with_nop() {
        let lines = lex(".0x5\nnop\n").unwrap();
        let linked = link(&lines);
        assert!(linked.is_ok());
        assert_eq!(linked.words[0], 0x000);
        assert_eq!(linked.words[5], 0x000);
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let lines = lex("a:\nnop\na:\n").unwrap();
        let linked = link(&lines);
        assert!(matches!(linked.errors[0], AsmError::DuplicateLabel { .. }));
    }

    #[test]
    fn undefined_labels_are_rejected() {
        let lines = lex("ldi :missing\n").unwrap();
        let linked = link(&lines);
        assert!(matches!(linked.errors[0], AsmError::UndefinedLabel { .. }));
    }

    #[test]
    fn multiple_unrelated_errors_are_all_reported_in_one_pass() {
        let lines = lex("foo\nldi :missing\nbar baz\n").unwrap();
        let linked = link(&lines);
        assert_eq!(linked.errors.len(), 3);
    }
}
