//! # Assembly Code Generation
//!
//! Lowers normalized IR to RISC-V style assembly text, allocating
//! registers on the fly. For each instruction the result is resolved
//! first, then the operands left to right. Emission stops at the first
//! `RET`, which moves its value into the return register.
//!
//! | IR | Assembly |
//! |----|----------|
//! | `MOV d, imm` | `li rd, imm` |
//! | `MOV d, v` | `mv rd, rs` |
//! | `ADD d, v, imm` | `addi rd, rs, imm` (12-bit `imm`) |
//! | `ADD d, v, w` | `add rd, rs1, rs2` |
//! | `SUB d, v, w` | `sub rd, rs1, rs2` |
//! | `MUL d, v, w` | `mul rd, rs1, rs2` |
//! | `RET v` | `mv a0, rs` |

use super::ir::{BinaryOp, Instruction, IrValue, IrVariable};
use super::normalize::ADDI_IMMEDIATE_RANGE;
use super::regalloc::RegisterAllocator;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::debug;

// =============================================================================
// Assembly listing
// =============================================================================

/// One assembly instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsmLine {
    /// Mnemonic (`li`, `mv`, `addi`, ...)
    pub op: String,
    /// Register names and immediates
    pub operands: Vec<String>,
    /// IR instruction this line came from
    pub comment: Option<String>,
}

impl AsmLine {
    pub fn new(op: &str, operands: Vec<String>) -> Self {
        Self {
            op: op.to_string(),
            operands,
            comment: None,
        }
    }

    /// The instruction without its comment
    pub fn text(&self) -> String {
        format!("{} {}", self.op, self.operands.join(", "))
    }
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())?;
        if let Some(comment) = &self.comment {
            write!(f, "\t\t# {}", comment)?;
        }
        Ok(())
    }
}

/// Generated assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyProgram {
    pub lines: Vec<AsmLine>,
}

impl AssemblyProgram {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Instruction texts without comments
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(AsmLine::text).collect()
    }

    /// Full listing: `.text` header, one indented instruction per line
    pub fn render(&self) -> String {
        let mut out = String::from(".text\n");
        for line in &self.lines {
            out.push('\t');
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}

// =============================================================================
// Code generator
// =============================================================================

/// Assembly emitter
#[derive(Debug, Clone)]
pub struct AsmCodegen {
    return_register: String,
    emit_comments: bool,
}

impl AsmCodegen {
    pub fn new(return_register: impl Into<String>, emit_comments: bool) -> Self {
        Self {
            return_register: return_register.into(),
            emit_comments,
        }
    }

    /// Emit assembly for normalized IR, consuming the allocator
    pub fn generate(
        &self,
        instructions: &[Instruction],
        mut allocator: RegisterAllocator,
    ) -> Result<AssemblyProgram> {
        let mut program = AssemblyProgram::default();

        for instr in instructions {
            let mut line = self.gen_instruction(instr, &mut allocator)?;
            if self.emit_comments {
                line.comment = Some(instr.to_string());
            }
            program.lines.push(line);
            if instr.is_return() {
                break;
            }
        }

        debug!(lines = program.len(), "generated assembly");
        Ok(program)
    }

    fn gen_instruction(
        &self,
        instr: &Instruction,
        alloc: &mut RegisterAllocator,
    ) -> Result<AsmLine> {
        let rd = match instr.result() {
            Some(dest) => Some(alloc.resolve(dest)?),
            None => None,
        };

        let line = match (instr, rd) {
            (Instruction::Move { src, .. }, Some(rd)) => match src {
                IrValue::Immediate(imm) => AsmLine::new("li", vec![rd, imm.to_string()]),
                IrValue::Variable(var) => AsmLine::new("mv", vec![rd, alloc.resolve(var)?]),
            },
            (Instruction::Add { lhs, rhs, .. }, Some(rd)) => {
                let rs1 = alloc.resolve(expect_variable(lhs, instr)?)?;
                match rhs {
                    IrValue::Immediate(imm) if ADDI_IMMEDIATE_RANGE.contains(imm) => {
                        AsmLine::new("addi", vec![rd, rs1, imm.to_string()])
                    }
                    IrValue::Immediate(_) => {
                        return Err(Error::invariant(format!(
                            "addi immediate out of range in {}",
                            instr
                        )))
                    }
                    IrValue::Variable(var) => AsmLine::new("add", vec![rd, rs1, alloc.resolve(var)?]),
                }
            }
            (Instruction::Sub { lhs, rhs, .. }, Some(rd))
            | (Instruction::Mul { lhs, rhs, .. }, Some(rd)) => {
                let op = match instr.as_binary() {
                    Some((BinaryOp::Sub, ..)) => "sub",
                    _ => "mul",
                };
                let rs1 = alloc.resolve(expect_variable(lhs, instr)?)?;
                let rs2 = alloc.resolve(expect_variable(rhs, instr)?)?;
                AsmLine::new(op, vec![rd, rs1, rs2])
            }
            (Instruction::Return { value }, None) => match value {
                IrValue::Immediate(imm) => {
                    AsmLine::new("li", vec![self.return_register.clone(), imm.to_string()])
                }
                IrValue::Variable(var) => AsmLine::new(
                    "mv",
                    vec![self.return_register.clone(), alloc.resolve(var)?],
                ),
            },
            _ => {
                return Err(Error::invariant(format!(
                    "malformed instruction {}",
                    instr
                )))
            }
        };
        Ok(line)
    }
}

/// Operand that normalization guarantees to be a variable
fn expect_variable<'i>(value: &'i IrValue, instr: &Instruction) -> Result<&'i IrVariable> {
    value.as_variable().ok_or_else(|| {
        Error::invariant(format!("unnormalized immediate operand in {}", instr))
    })
}
