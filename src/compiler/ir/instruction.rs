//! IR instruction definitions

use serde::Serialize;
use std::fmt;

/// Storage location in the IR
///
/// Named variables compare by name. Temporaries compare by number, and a
/// numbering source never hands out the same number twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IrVariable {
    /// Source-level variable
    Named(String),
    /// Compiler temporary
    Temp(u32),
}

impl IrVariable {
    /// Variable for a source identifier
    pub fn named(name: impl Into<String>) -> Self {
        IrVariable::Named(name.into())
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, IrVariable::Temp(_))
    }
}

impl fmt::Display for IrVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrVariable::Named(name) => write!(f, "{}", name),
            IrVariable::Temp(id) => write!(f, "${}", id),
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum IrValue {
    /// Variable reference
    Variable(IrVariable),
    /// Signed integer constant
    Immediate(i64),
}

impl IrValue {
    pub fn as_variable(&self) -> Option<&IrVariable> {
        match self {
            IrValue::Variable(var) => Some(var),
            IrValue::Immediate(_) => None,
        }
    }

    pub fn as_immediate(&self) -> Option<i64> {
        match self {
            IrValue::Immediate(value) => Some(*value),
            IrValue::Variable(_) => None,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, IrValue::Immediate(_))
    }
}

impl From<IrVariable> for IrValue {
    fn from(var: IrVariable) -> Self {
        IrValue::Variable(var)
    }
}

impl From<i64> for IrValue {
    fn from(value: i64) -> Self {
        IrValue::Immediate(value)
    }
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Variable(var) => write!(f, "{}", var),
            IrValue::Immediate(value) => write!(f, "{}", value),
        }
    }
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    /// Wrapping two's-complement application
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            BinaryOp::Mul => lhs.wrapping_mul(rhs),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
        }
    }
}

/// IR instruction (three-address code)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    /// Copy: dest = src
    Move { dest: IrVariable, src: IrValue },
    /// Addition: dest = lhs + rhs
    Add {
        dest: IrVariable,
        lhs: IrValue,
        rhs: IrValue,
    },
    /// Subtraction: dest = lhs - rhs
    Sub {
        dest: IrVariable,
        lhs: IrValue,
        rhs: IrValue,
    },
    /// Multiplication: dest = lhs * rhs
    Mul {
        dest: IrVariable,
        lhs: IrValue,
        rhs: IrValue,
    },
    /// Return value from program
    Return { value: IrValue },
}

impl Instruction {
    pub fn mov(dest: IrVariable, src: impl Into<IrValue>) -> Self {
        Instruction::Move {
            dest,
            src: src.into(),
        }
    }

    /// Arithmetic instruction for `op`
    pub fn binary(op: BinaryOp, dest: IrVariable, lhs: impl Into<IrValue>, rhs: impl Into<IrValue>) -> Self {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        match op {
            BinaryOp::Add => Instruction::Add { dest, lhs, rhs },
            BinaryOp::Sub => Instruction::Sub { dest, lhs, rhs },
            BinaryOp::Mul => Instruction::Mul { dest, lhs, rhs },
        }
    }

    pub fn ret(value: impl Into<IrValue>) -> Self {
        Instruction::Return {
            value: value.into(),
        }
    }

    /// Operator and operands of an arithmetic instruction
    pub fn as_binary(&self) -> Option<(BinaryOp, &IrVariable, &IrValue, &IrValue)> {
        match self {
            Instruction::Add { dest, lhs, rhs } => Some((BinaryOp::Add, dest, lhs, rhs)),
            Instruction::Sub { dest, lhs, rhs } => Some((BinaryOp::Sub, dest, lhs, rhs)),
            Instruction::Mul { dest, lhs, rhs } => Some((BinaryOp::Mul, dest, lhs, rhs)),
            _ => None,
        }
    }

    /// Destination, absent for Return
    pub fn result(&self) -> Option<&IrVariable> {
        match self {
            Instruction::Move { dest, .. }
            | Instruction::Add { dest, .. }
            | Instruction::Sub { dest, .. }
            | Instruction::Mul { dest, .. } => Some(dest),
            Instruction::Return { .. } => None,
        }
    }

    /// Source operands in textual order
    pub fn operands(&self) -> Vec<&IrValue> {
        match self {
            Instruction::Move { src, .. } => vec![src],
            Instruction::Add { lhs, rhs, .. }
            | Instruction::Sub { lhs, rhs, .. }
            | Instruction::Mul { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::Return { value } => vec![value],
        }
    }

    /// Every variable occurrence: result first, then operands
    pub fn variables(&self) -> impl Iterator<Item = &IrVariable> {
        self.result()
            .into_iter()
            .chain(self.operands().into_iter().filter_map(IrValue::as_variable))
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::Return { .. })
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Move { .. } => "MOV",
            Instruction::Return { .. } => "RET",
            other => other
                .as_binary()
                .map(|(op, ..)| op.mnemonic())
                .unwrap_or("???"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        let mut separator = " ";
        if let Some(dest) = self.result() {
            write!(f, "{}{}", separator, dest)?;
            separator = ", ";
        }
        for operand in self.operands() {
            write!(f, "{}{}", separator, operand)?;
            separator = ", ";
        }
        Ok(())
    }
}
