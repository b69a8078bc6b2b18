//! Instruction encoding: register lookup and mnemonic-to-field-pattern
//! conversion. Each instruction word is four 3-bit fields written MSB first.

use crate::error::{AsmError, Result};
use crate::lex::parse_immediate_int;

/// One of the eight machine registers, usable as a numeric field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reg(pub u32);

pub fn parse_register(text: &str, line: usize) -> Result<Reg> {
    let upper = text.to_ascii_uppercase();
    let index = match upper.as_str() {
        "ZR" => 0,
        "PC" => 1,
        "SP" => 2,
        "MP" => 3,
        "D0" => 4,
        "D1" => 5,
        "D2" => 6,
        "D3" => 7,
        _ => match text.parse::<u32>() {
            Ok(n) if n <= 7 => n,
            _ => return Err(AsmError::InvalidRegister { line, text: text.to_string() }),
        },
    };
    Ok(Reg(index))
}

fn field(f0: u32, f1: u32, f2: u32, f3: u32) -> u32 {
    ((f0 & 0x7) << 9) | ((f1 & 0x7) << 6) | ((f2 & 0x7) << 3) | (f3 & 0x7)
}

fn require_operands(mnemonic: &str, operands: &[String], expected: usize, line: usize) -> Result<()> {
    if operands.len() != expected {
        return Err(AsmError::WrongOperandCount {
            line,
            mnemonic: mnemonic.to_string(),
            expected,
            got: operands.len(),
        });
    }
    Ok(())
}

/// A fully resolved 12-bit instruction word, or one still waiting on a label.
pub enum Encoded {
    Word(u32),
    DeferredImmediate { opcode_fields: (u32, u32), label: String },
}

/// Encodes one instruction line. Immediates of the form `:label` are
/// returned as [`Encoded::DeferredImmediate`] for the linker to resolve
/// once every label's address is known.
pub fn encode(mnemonic: &str, operands: &[String], line: usize) -> Result<Encoded> {
    let k = match mnemonic {
        "NOP" => Some(0),
        "HLT" => Some(1),
        "BNZ" => Some(2),
        "BNA" => Some(3),
        "BNP" => Some(4),
        "BNN" => Some(5),
        _ => None,
    };
    if let Some(k) = k {
        require_operands(mnemonic, operands, 0, line)?;
        return Ok(Encoded::Word(field(0, 0, 0, k)));
    }

    let reg34 = match mnemonic {
        "LOD" => Some(4),
        "STR" => Some(5),
        "POP" => Some(6),
        "PSH" => Some(7),
        _ => None,
    };
    if let Some(f2) = reg34 {
        require_operands(mnemonic, operands, 1, line)?;
        let reg = parse_register(&operands[0], line)?;
        return Ok(Encoded::Word(field(0, 0, f2, reg.0)));
    }

    let imm_variant = match mnemonic {
        "LIU" => Some(1),
        "LDI" => Some(2),
        "LIL" => Some(3),
        _ => None,
    };
    if let Some(f1) = imm_variant {
        require_operands(mnemonic, operands, 1, line)?;
        let operand = &operands[0];
        if let Some(label) = operand.strip_prefix(':') {
            return Ok(Encoded::DeferredImmediate {
                opcode_fields: (0, f1),
                label: label.to_string(),
            });
        }
        let value = parse_immediate_int(operand)
            .ok_or_else(|| AsmError::InvalidImmediate { line, text: operand.clone() })?;
        return Ok(Encoded::Word(encode_immediate(f1, value)));
    }

    let shift_variant = match mnemonic {
        "LSH" => Some(4),
        "RSH" => Some(5),
        "INC" => Some(6),
        "DEC" => Some(7),
        _ => None,
    };
    if let Some(f1) = shift_variant {
        require_operands(mnemonic, operands, 2, line)?;
        let reg_d = parse_register(&operands[0], line)?;
        let reg_a = parse_register(&operands[1], line)?;
        return Ok(Encoded::Word(field(0, f1, reg_a.0, reg_d.0)));
    }

    let alu_variant = match mnemonic {
        "AND" => Some(1),
        "OR" => Some(2),
        "SUB" => Some(3),
        "XOR" => Some(4),
        "NOR" => Some(5),
        "NAD" => Some(6),
        "ADD" => Some(7),
        _ => None,
    };
    if let Some(f0) = alu_variant {
        require_operands(mnemonic, operands, 3, line)?;
        let reg_d = parse_register(&operands[0], line)?;
        let reg_a = parse_register(&operands[1], line)?;
        let reg_b = parse_register(&operands[2], line)?;
        return Ok(Encoded::Word(field(f0, reg_b.0, reg_a.0, reg_d.0)));
    }

    Err(AsmError::InvalidInstruction { line, text: mnemonic.to_string() })
}

/// Encodes an already-resolved 6-bit immediate value for LIU/LDI/LIL.
pub fn encode_immediate(f1: u32, value: u32) -> u32 {
    let imm6 = value & 0x3f;
    field(0, f1, (imm6 >> 3) & 0x7, imm6 & 0x7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_encodes_to_zero() {
        let Encoded::Word(w) = encode("NOP", &[], 1).unwrap() else { panic!() };
        assert_eq!(w, 0x000);
    }

    #[test]
    fn hlt_encodes_to_one() {
        let Encoded::Word(w) = encode("HLT", &[], 1).unwrap() else { panic!() };
        assert_eq!(w, 0x001);
    }

    #[test]
    fn add_encodes_three_registers() {
        let operands = vec!["D0".to_string(), "D1".to_string(), "D2".to_string()];
        let Encoded::Word(w) = encode("ADD", &operands, 1).unwrap() else { panic!() };
        assert_eq!(w, field(7, 6, 5, 4));
    }

    #[test]
    fn ldi_with_label_is_deferred() {
        let operands = vec![":start".to_string()];
        match encode("LDI", &operands, 1).unwrap() {
            Encoded::DeferredImmediate { label, .. } => assert_eq!(label, "start"),
            Encoded::Word(_) => panic!("expected deferred immediate"),
        }
    }

    #[test]
    fn ldi_with_bare_integer_encodes_immediately() {
        let operands = vec!["5".to_string()];
        let Encoded::Word(w) = encode("LDI", &operands, 1).unwrap() else { panic!() };
        assert_eq!(w, 0x080 | 5);
    }

    #[test]
    fn wrong_operand_count_is_an_error() {
        let err = encode("ADD", &["D0".to_string()], 1).unwrap_err();
        assert!(matches!(err, AsmError::WrongOperandCount { .. }));
    }

    #[test]
    fn unknown_mnemonic_is_an_error() {
        let err = encode("FOO", &[], 1).unwrap_err();
        assert!(matches!(err, AsmError::InvalidInstruction { .. }));
    }
}
