//! Per-function codegen state: register occupancy, frame/global address
//! maps, and the loop label counter.

use std::collections::HashMap;

use td12_util::{Diagnostic, ErrorCategory, Span, Symbol};

/// First RAM address; globals are laid out starting here.
pub const RAM_START: u32 = 0x800;
/// Last valid RAM address.
pub const RAM_END: u32 = 0xfff;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    D0,
    D1,
    D2,
    D3,
}

impl Register {
    pub const ALL: [Register; 4] = [Register::D0, Register::D1, Register::D2, Register::D3];

    pub fn name(self) -> &'static str {
        match self {
            Register::D0 => "D0",
            Register::D1 => "D1",
            Register::D2 => "D2",
            Register::D3 => "D3",
        }
    }

    fn index(self) -> usize {
        match self {
            Register::D0 => 0,
            Register::D1 => 1,
            Register::D2 => 2,
            Register::D3 => 3,
        }
    }

    fn from_index(i: usize) -> Register {
        Register::ALL[i % 4]
    }
}

/// Emits the shortest immediate-load sequence for `value`: a single `ldi`
/// for values under 64, otherwise `liu` (high 6 bits) then `lil` (low 6 bits).
pub fn load_immediate(value: u32) -> String {
    if value >= 64 {
        format!("liu {}\nlil {}\n", value / 64, value % 64)
    } else {
        format!("ldi {value}\n")
    }
}

/// Holds the global/local address maps and the four-register allocator for
/// the function currently being generated.
pub struct State {
    memory: HashMap<Symbol, u32>,
    local: HashMap<Symbol, u32>,
    registers: [Option<Symbol>; 4],
    rotation: usize,
    loop_index: u64,
}

impl State {
    pub fn new() -> Self {
        Self { memory: HashMap::new(), local: HashMap::new(), registers: [None; 4], rotation: 0, loop_index: 0 }
    }

    pub fn set_globals(&mut self, memory: HashMap<Symbol, u32>) {
        self.memory = memory;
    }

    /// Resets the register file and installs a fresh local frame layout for
    /// the function about to be generated.
    pub fn enter_function(&mut self, local: HashMap<Symbol, u32>) {
        self.local = local;
        self.registers = [None; 4];
    }

    pub fn loop_label(&mut self) -> String {
        let id = self.loop_index;
        self.loop_index += 1;
        format!("`loop{id}")
    }

    fn register_rotation(&mut self) -> Register {
        for (i, slot) in self.registers.iter().enumerate() {
            if slot.is_none() {
                self.rotation = (i + 1) % 4;
                return Register::from_index(i);
            }
        }
        let reg = Register::from_index(self.rotation);
        self.rotation = (self.rotation + 1) % 4;
        reg
    }

    pub fn get_register(&self, symbol: Symbol) -> Option<Register> {
        self.registers.iter().position(|s| *s == Some(symbol)).map(Register::from_index)
    }

    /// The frame offset assigned to a local; panics if `symbol` was not
    /// part of the layout passed to [`State::enter_function`].
    pub fn frame_offset(&self, symbol: Symbol) -> u32 {
        *self.local.get(&symbol).expect("symbol missing from frame layout")
    }

    fn address_of(&self, symbol: Symbol) -> Option<(bool, u32)> {
        if let Some(&off) = self.local.get(&symbol) {
            return Some((true, off));
        }
        self.memory.get(&symbol).map(|&a| (false, a))
    }

    fn unresolved(symbol: Symbol, span: &Span) -> Diagnostic {
        Diagnostic::new(
            ErrorCategory::CodeGeneration,
            "UnresolvedMemory",
            format!("no memory location recorded for '{}'", symbol.as_str()),
            span.clone(),
        )
    }

    /// Spills whatever symbol currently occupies `reg` back to its home
    /// slot (local frame or global), then frees the register.
    pub fn store_register(&mut self, reg: Register, out: &mut String) {
        if let Some(symbol) = self.registers[reg.index()] {
            if let Some((is_local, addr)) = self.address_of(symbol) {
                out.push_str(&load_immediate(addr));
                if is_local {
                    out.push_str("add MP SP MP\n");
                }
                out.push_str(&format!("str {}\n", reg.name()));
            }
        }
        self.registers[reg.index()] = None;
    }

    /// Loads `symbol` from memory into `reg` (or the next rotation register
    /// if unspecified), spilling the previous occupant first if needed.
    pub fn load_symbol(
        &mut self,
        symbol: Symbol,
        reg: Option<Register>,
        span: &Span,
        out: &mut String,
    ) -> Result<Register, Diagnostic> {
        let (is_local, addr) = self.address_of(symbol).ok_or_else(|| Self::unresolved(symbol, span))?;
        let reg = reg.unwrap_or_else(|| self.register_rotation());
        if self.registers[reg.index()].is_some() {
            self.store_register(reg, out);
        }
        self.registers[reg.index()] = Some(symbol);
        out.push_str(&load_immediate(addr));
        if is_local {
            out.push_str("add MP SP MP\n");
        }
        out.push_str(&format!("lod {}\n", reg.name()));
        Ok(reg)
    }

    /// Returns the register already holding `symbol`, loading it if it
    /// isn't resident.
    pub fn get_symbol(&mut self, symbol: Symbol, span: &Span, out: &mut String) -> Result<Register, Diagnostic> {
        match self.get_register(symbol) {
            Some(reg) => Ok(reg),
            None => self.load_symbol(symbol, None, span, out),
        }
    }

    /// Loads an immediate value into the next rotation register, as a
    /// non-symbol operand (a literal or built-in constant).
    pub fn load_immediate_into_rotation(&mut self, value: u32, out: &mut String) -> Register {
        let reg = self.register_rotation();
        if self.registers[reg.index()].is_some() {
            self.store_register(reg, out);
        }
        out.push_str(&load_immediate(value));
        out.push_str(&format!("or {} MP ZR\n", reg.name()));
        reg
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
