//! IR program container and reference evaluator

use super::instruction::{Instruction, IrValue, IrVariable};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Straight-line IR program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrProgram {
    /// All instructions in program order
    pub instructions: Vec<Instruction>,
    /// First temporary number not used by any instruction
    pub next_temp: u32,
}

impl IrProgram {
    /// Create a new empty IR program
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            next_temp: 0,
        }
    }

    /// Wrap an instruction list, reserving every temporary it mentions
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        let next_temp = instructions
            .iter()
            .flat_map(Instruction::variables)
            .filter_map(|var| match var {
                IrVariable::Temp(id) => Some(id + 1),
                IrVariable::Named(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            instructions,
            next_temp,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Execute up to the first Return
    ///
    /// `inputs` seeds named variables. Reading a variable that was never
    /// written or seeded is an error. Returns `None` for programs without
    /// a Return.
    pub fn evaluate(&self, inputs: &HashMap<String, i64>) -> Result<Option<i64>> {
        let mut env: HashMap<IrVariable, i64> = inputs
            .iter()
            .map(|(name, value)| (IrVariable::named(name.as_str()), *value))
            .collect();

        for instr in &self.instructions {
            match instr {
                Instruction::Move { dest, src } => {
                    let value = read(&env, src)?;
                    env.insert(dest.clone(), value);
                }
                Instruction::Return { value } => return read(&env, value).map(Some),
                other => {
                    if let Some((op, dest, lhs, rhs)) = other.as_binary() {
                        let value = op.apply(read(&env, lhs)?, read(&env, rhs)?);
                        env.insert(dest.clone(), value);
                    }
                }
            }
        }
        Ok(None)
    }
}

fn read(env: &HashMap<IrVariable, i64>, value: &IrValue) -> Result<i64> {
    match value {
        IrValue::Immediate(imm) => Ok(*imm),
        IrValue::Variable(var) => env
            .get(var)
            .copied()
            .ok_or_else(|| Error::invariant(format!("read of unset variable {}", var))),
    }
}

impl Default for IrProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}
