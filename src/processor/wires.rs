//! Control wires of the processor.
//!
//! Every wire carries a raw signal produced by the decoder or the ALU, and
//! every wire except [`Wire::Ground`] passes through a gate that the
//! configuration can cut. Only the gated ("effective") signal drives the
//! execution.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use num_enum::IntoPrimitive;

/// Number of wires, including the grounded one
pub const WIRE_COUNT: usize = 11;
/// Number of wires with a configurable gate
pub const GATE_COUNT: usize = 10;

/// Configuration character that cuts a gate
const CUT: char = '0';

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(IntoPrimitive)]
pub enum Wire {
    /// Keeps the processor running
    Run = 0,
    /// Latches the ALU result into AX and the result flags
    LatchAx = 1,
    /// Latches into SI
    LatchSi = 2,
    /// Clears the value before it is latched into SI
    ClearSi = 3,
    /// The operand address itself is the second ALU input
    Immediate = 4,
    /// Writes the ALU result back to memory
    WriteBack = 5,
    /// Lets the opcode select the ALU function
    AluSelect = 6,
    /// Replaces IP with the operand address
    Jump = 7,
    /// Last latched result was greater than zero
    Positive = 8,
    /// Last latched result was zero
    Zero = 9,
    /// Always low
    Ground = 10,
}

impl Wire {
    pub const ALL: [Wire; WIRE_COUNT] = [
        Wire::Run,
        Wire::LatchAx,
        Wire::LatchSi,
        Wire::ClearSi,
        Wire::Immediate,
        Wire::WriteBack,
        Wire::AluSelect,
        Wire::Jump,
        Wire::Positive,
        Wire::Zero,
        Wire::Ground,
    ];

    fn index(self) -> usize {
        u8::from(self) as usize
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.index())
    }
}

/// Gate positions of the control wires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireConfig {
    gates: [bool; GATE_COUNT],
}

impl Default for WireConfig {
    /// All gates enabled
    fn default() -> Self {
        Self {
            gates: [true; GATE_COUNT],
        }
    }
}

impl WireConfig {
    /// Whether the gate of `wire` lets the signal through
    pub fn gate(&self, wire: Wire) -> bool {
        match wire {
            Wire::Ground => false,
            wire => self.gates[wire.index()],
        }
    }

    pub fn set_gate(&mut self, wire: Wire, enabled: bool) {
        if wire != Wire::Ground {
            self.gates[wire.index()] = enabled;
        }
    }
}

impl FromStr for WireConfig {
    type Err = Infallible;

    /// Reads one character per gate: `'0'` cuts the wire, anything else
    /// leaves it connected. Missing positions stay connected and characters
    /// past the last gate are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = WireConfig::default();
        for (gate, bit) in config.gates.iter_mut().zip(s.chars()) {
            *gate = bit != CUT;
        }
        Ok(config)
    }
}

impl fmt::Display for WireConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gate in &self.gates {
            f.write_str(if *gate { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Raw wire signals together with their gates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlWires {
    raw: [bool; WIRE_COUNT],
    config: WireConfig,
}

impl ControlWires {
    pub fn new(config: WireConfig) -> Self {
        Self {
            raw: [false; WIRE_COUNT],
            config,
        }
    }

    /// The signal as produced, before the gate
    pub fn raw(&self, wire: Wire) -> bool {
        self.raw[wire.index()]
    }

    /// Drives a raw signal. The ground wire cannot be raised.
    pub fn set(&mut self, wire: Wire, value: bool) {
        if wire != Wire::Ground {
            self.raw[wire.index()] = value;
        }
    }

    /// The signal after the gate
    pub fn effective(&self, wire: Wire) -> bool {
        match wire {
            Wire::Ground => false,
            wire => self.raw(wire) && self.config.gate(wire),
        }
    }
}
