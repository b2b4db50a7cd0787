//! # Register Allocation
//!
//! Greedy, usage-counted allocation over a fixed ordered register set.
//! Every variable occurrence in the normalized program is counted once up
//! front; each resolution consumes one count. A register whose variable
//! has no remaining uses can be handed to another variable.
//!
//! There is no spilling: when every register holds a live variable the
//! allocation fails with [`Error::RegisterExhausted`].

use super::ir::{Instruction, IrVariable};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Remaining references per variable
pub type UsageCounts = HashMap<IrVariable, usize>;

/// Count every variable occurrence, results and operands alike
pub fn usage_counts(instructions: &[Instruction]) -> UsageCounts {
    let mut counts = UsageCounts::new();
    for var in instructions.iter().flat_map(Instruction::variables) {
        *counts.entry(var.clone()).or_insert(0) += 1;
    }
    counts
}

/// Maps IR variables onto physical registers
#[derive(Debug, Clone)]
pub struct RegisterAllocator {
    /// Physical registers in preference order
    registers: Vec<String>,
    /// Occupant of each register, parallel to `registers`
    bindings: Vec<Option<IrVariable>>,
    usage: UsageCounts,
}

impl RegisterAllocator {
    /// Allocator over `registers` with precomputed usage counts
    pub fn new(registers: Vec<String>, usage: UsageCounts) -> Result<Self> {
        if registers.is_empty() {
            return Err(Error::config("register set is empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = registers.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(Error::config(format!("register {} listed twice", dup)));
        }
        Ok(Self {
            bindings: vec![None; registers.len()],
            registers,
            usage,
        })
    }

    /// Allocator with usage counted over `instructions`
    pub fn for_instructions(registers: Vec<String>, instructions: &[Instruction]) -> Result<Self> {
        Self::new(registers, usage_counts(instructions))
    }

    pub fn capacity(&self) -> usize {
        self.registers.len()
    }

    /// Remaining uses of `var`
    pub fn usage(&self, var: &IrVariable) -> Option<usize> {
        self.usage.get(var).copied()
    }

    /// Register currently holding `var`
    pub fn register_of(&self, var: &IrVariable) -> Option<&str> {
        self.slot_of(var).map(|slot| self.registers[slot].as_str())
    }

    /// Register for one use of `var`
    pub fn resolve(&mut self, var: &IrVariable) -> Result<String> {
        if matches!(var, IrVariable::Named(name) if name.is_empty()) {
            return Err(Error::invariant("placeholder variable reached the allocator"));
        }
        match self.usage.get(var) {
            Some(count) if *count > 0 => {}
            _ => {
                return Err(Error::invariant(format!(
                    "usage counter for {} is already exhausted",
                    var
                )))
            }
        }

        let slot = match self.slot_of(var) {
            Some(slot) => slot,
            None => {
                let slot = self.free_slot().or_else(|| self.dead_slot()).ok_or_else(|| {
                    Error::RegisterExhausted {
                        variable: var.to_string(),
                        capacity: self.registers.len(),
                    }
                })?;
                if let Some(evicted) = self.bindings[slot].replace(var.clone()) {
                    trace!(register = %self.registers[slot], evicted = %evicted, var = %var, "evict");
                } else {
                    trace!(register = %self.registers[slot], var = %var, "bind");
                }
                slot
            }
        };

        if let Some(count) = self.usage.get_mut(var) {
            *count -= 1;
        }
        Ok(self.registers[slot].clone())
    }

    fn slot_of(&self, var: &IrVariable) -> Option<usize> {
        self.bindings
            .iter()
            .position(|bound| bound.as_ref() == Some(var))
    }

    fn free_slot(&self) -> Option<usize> {
        self.bindings.iter().position(Option::is_none)
    }

    /// First register whose variable has no remaining uses
    fn dead_slot(&self) -> Option<usize> {
        self.bindings.iter().position(|bound| {
            bound
                .as_ref()
                .map_or(false, |var| self.usage.get(var).copied().unwrap_or(0) == 0)
        })
    }
}
