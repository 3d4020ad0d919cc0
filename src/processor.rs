use std::convert::TryFrom;
use std::io::{self, Write};

use crate::memory::{Memory, Word};
use color_eyre::eyre::{Result, WrapErr};
use log::*;

pub mod alu;
pub mod decode;
pub mod registers;
pub mod wires;

use alu::AluOp;
use decode::{decode, Decoded, Instruction, INSTRUCTION_SIZE};
use registers::Registers;
use wires::{ControlWires, Wire, WireConfig};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// The run wire dropped. `cycles` includes the halting fetch.
    Halted { cycles: u64 },
    /// The cycle budget ran out before the processor halted
    BudgetExhausted { cycles: u64 },
}

/// Emulates the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    pub registers: Registers,
    pub wires: ControlWires,
    /// Number of fetches so far
    pub cycles: u64,
    /// Termination flag. Set once the run wire drops
    pub halted: bool,
}

impl Default for Processor {
    /// Initializes a new CPU with every wire connected
    fn default() -> Self {
        Self::new(WireConfig::default())
    }
}

impl Processor {
    /// Initializes a new CPU, starting at address zero
    pub fn new(config: WireConfig) -> Self {
        Self {
            registers: Registers::default(),
            wires: ControlWires::new(config),
            cycles: 0,
            halted: false,
        }
    }

    /// Executes a decoded instruction against `operand`
    pub fn execute_instruction(
        &mut self,
        decoded: Decoded,
        operand: Word,
        memory: &mut Memory,
    ) -> Result<()> {
        let wires = self.wires;
        let ip = self.registers.ip;

        let first = self.registers.ax.value();
        let second = if wires.effective(Wire::Immediate) {
            operand
        } else {
            memory.read_word(operand)
        };

        let selector = decoded.selector(&wires);
        let op = AluOp::try_from(selector).wrap_err_with(|| {
            format!(
                "ALU selector 0x{:X} is not wired (opcode 0x{:02X} at 0x{:04X})",
                selector, decoded.opcode, ip
            )
        })?;
        let result = op.apply(
            first,
            second,
            wires.effective(Wire::Positive),
            wires.effective(Wire::Zero),
        );

        trace!(
            "{:04X}: {:02X} {} {:04X} {:04X} -> {:04X}",
            ip,
            decoded.opcode,
            op,
            first,
            second,
            result
        );

        if wires.effective(Wire::WriteBack) {
            memory.write_word(operand, result);
            debug!("[{:04X}] <- {:04X}", operand, result);
        }

        if wires.effective(Wire::LatchAx) {
            self.registers.ax.set(result);
            self.wires.set(Wire::Positive, result > 0);
            self.wires.set(Wire::Zero, result == 0);
            debug!("AX <- {:04X}", result);
        }

        if wires.effective(Wire::LatchSi) {
            let value = if wires.effective(Wire::ClearSi) {
                0
            } else {
                result
            };
            self.registers.si.set(value);
        }

        self.registers.ip = if wires.effective(Wire::Jump) {
            debug!("JUMP {:04X} -> {:04X}", ip, operand);
            operand
        } else {
            ip.wrapping_add(INSTRUCTION_SIZE)
        };

        Ok(())
    }

    /// Runs one fetch, decode, check and (unless halting) execute cycle
    pub fn execute(&mut self, memory: &mut Memory) -> Result<()> {
        let instruction = Instruction::fetch(memory, self.registers.ip);
        let operand = instruction.operand_address(self.registers.si);
        self.cycles += 1;

        let decoded = decode(instruction.opcode, &mut self.wires);

        if !self.wires.effective(Wire::Run) {
            self.halted = true;
            debug!(
                "HALT at {:04X} (opcode 0x{:02X})",
                self.registers.ip, instruction.opcode
            );
            return Ok(());
        }

        self.execute_instruction(decoded, operand, memory)
    }

    /// Run program until the processor halts. Never returns for a program
    /// that does not halt.
    pub fn execute_until_halt(&mut self, memory: &mut Memory) -> Result<RunOutcome> {
        self.run_with_budget(memory, None)
    }

    /// Run program until the processor halts or `max_cycles` fetches have
    /// been made. The budget is checked before every fetch.
    pub fn run_with_budget(
        &mut self,
        memory: &mut Memory,
        max_cycles: Option<u64>,
    ) -> Result<RunOutcome> {
        while !self.halted {
            if let Some(max) = max_cycles {
                if self.cycles >= max {
                    warn!(
                        "Cycle budget of {} exhausted at {:04X}",
                        max, self.registers.ip
                    );
                    return Ok(RunOutcome::BudgetExhausted {
                        cycles: self.cycles,
                    });
                }
            }

            self.execute(memory)?;
        }

        info!(
            "Program terminated after {} cycles. AX: 0x{:04X}",
            self.cycles,
            self.registers.ax.value()
        );

        Ok(RunOutcome::Halted {
            cycles: self.cycles,
        })
    }

    /// Prints the registers followed by the whole memory
    pub fn dump<W: Write>(&self, memory: &Memory, out: &mut W) -> io::Result<()> {
        self.registers.dump(out)?;
        memory.dump(out)
    }
}
