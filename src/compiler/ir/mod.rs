//! # Intermediate Representation (IR)
//!
//! Three-address code produced by the IR builder and consumed by the
//! normalizer and assembly backend.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── instruction.rs  # IrVariable, IrValue, Instruction
//! ├── program.rs      # IrProgram and the reference evaluator
//! └── generator.rs    # IrBuilder (parse observer)
//! ```
//!
//! ## Key Types
//!
//! - [`IrVariable`] - named variable or compiler temporary (`$n`)
//! - [`IrValue`] - variable or immediate operand
//! - [`Instruction`] - `MOV`, `ADD`, `SUB`, `MUL`, `RET`
//! - [`IrProgram`] - instruction list plus the temporary counter

mod generator;
mod instruction;
mod program;

pub use generator::IrBuilder;
pub use instruction::{BinaryOp, Instruction, IrValue, IrVariable};
pub use program::IrProgram;
