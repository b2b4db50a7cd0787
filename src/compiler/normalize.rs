//! # IR Normalization
//!
//! Rewrites the builder's IR into the shape the assembly backend accepts:
//!
//! - `ADD` has at most one immediate, on the right, and it fits the
//!   12-bit signed field of `addi`
//! - `SUB` and `MUL` have no immediate operands
//! - nothing follows the first `RET`
//!
//! Immediate-only arithmetic is folded into a `MOV` with wrapping
//! two's-complement semantics. Immediates that cannot stay in place are
//! materialized into fresh temporaries numbered after every temporary the
//! input already uses.

use super::ir::{BinaryOp, Instruction, IrProgram, IrValue, IrVariable};
use std::ops::RangeInclusive;
use tracing::debug;

/// Immediates `addi` can encode
pub const ADDI_IMMEDIATE_RANGE: RangeInclusive<i64> = -2048..=2047;

/// Normalization pass
#[derive(Debug, Default)]
pub struct Normalizer {
    next_temp: u32,
    folded: usize,
    materialized: usize,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folded instructions in the last run
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Number of temporaries introduced in the last run
    pub fn materialized(&self) -> usize {
        self.materialized
    }

    /// Normalize `program`
    pub fn normalize(&mut self, program: &IrProgram) -> IrProgram {
        self.next_temp = program.next_temp;
        self.folded = 0;
        self.materialized = 0;

        let mut out = Vec::with_capacity(program.len());
        for instr in &program.instructions {
            match instr.as_binary() {
                Some((op, dest, lhs, rhs)) => self.rewrite(op, dest, lhs, rhs, &mut out),
                None => out.push(instr.clone()),
            }
            if instr.is_return() {
                break;
            }
        }

        debug!(
            input = program.len(),
            output = out.len(),
            folded = self.folded,
            materialized = self.materialized,
            "normalized IR"
        );

        IrProgram {
            instructions: out,
            next_temp: self.next_temp,
        }
    }

    fn rewrite(
        &mut self,
        op: BinaryOp,
        dest: &IrVariable,
        lhs: &IrValue,
        rhs: &IrValue,
        out: &mut Vec<Instruction>,
    ) {
        let dest = dest.clone();
        match (op, lhs, rhs) {
            (_, IrValue::Immediate(a), IrValue::Immediate(b)) => {
                self.folded += 1;
                out.push(Instruction::mov(dest, op.apply(*a, *b)));
            }
            (BinaryOp::Add, IrValue::Immediate(_), IrValue::Variable(_)) => {
                self.rewrite_add(dest, rhs, lhs, out);
            }
            (BinaryOp::Add, _, _) => self.rewrite_add(dest, lhs, rhs, out),
            (BinaryOp::Sub | BinaryOp::Mul, _, _) => {
                let lhs = self.materialize(lhs, out);
                let rhs = self.materialize(rhs, out);
                out.push(Instruction::binary(op, dest, lhs, rhs));
            }
        }
    }

    fn rewrite_add(
        &mut self,
        dest: IrVariable,
        lhs: &IrValue,
        rhs: &IrValue,
        out: &mut Vec<Instruction>,
    ) {
        let rhs = match rhs {
            IrValue::Immediate(imm) if !ADDI_IMMEDIATE_RANGE.contains(imm) => {
                self.materialize(rhs, out)
            }
            _ => rhs.clone(),
        };
        out.push(Instruction::binary(BinaryOp::Add, dest, lhs.clone(), rhs));
    }

    /// Variable operand for `value`, moving an immediate into a new temporary
    fn materialize(&mut self, value: &IrValue, out: &mut Vec<Instruction>) -> IrValue {
        match value {
            IrValue::Immediate(imm) => {
                let temp = IrVariable::Temp(self.next_temp);
                self.next_temp += 1;
                self.materialized += 1;
                out.push(Instruction::mov(temp.clone(), *imm));
                temp.into()
            }
            IrValue::Variable(_) => value.clone(),
        }
    }
}

/// Convenience wrapper for a single pass
pub fn normalize(program: &IrProgram) -> IrProgram {
    Normalizer::new().normalize(program)
}
