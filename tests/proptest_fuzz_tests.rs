//! Property-based tests for the scanner, normalizer and register allocator
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. Scanning and compiling never panic on arbitrary input
//! 2. Normalization preserves program semantics and shape guarantees
//! 3. Usage counters only ever count down during allocation

use std::collections::HashMap;

use proptest::prelude::*;
use tacc::compiler::{
    normalize, usage_counts, BinaryOp, ADDI_IMMEDIATE_RANGE, Instruction, IrProgram, IrValue, IrVariable,
    RegisterAllocator, UsageCounts,
};
use tacc::{CompileOptions, Compiler, Error, Scanner, SymbolTable};

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate random strings that might break the scanner
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,200}").unwrap()
}

/// Generate token soup from the language's own vocabulary
fn statement_like_string() -> impl Strategy<Value = String> {
    prop::collection::vec(source_token(), 0..40).prop_map(|tokens| tokens.join(" "))
}

fn source_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("int".to_string()),
        Just("return".to_string()),
        Just("=".to_string()),
        Just(";".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        (0i64..1000).prop_map(|n| n.to_string()),
        "[a-c]".prop_map(|s| s),
    ]
}

#[derive(Debug, Clone)]
enum Operand {
    Imm(i64),
    Var(usize),
}

fn operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (-50i64..50).prop_map(Operand::Imm),
        (-10_000i64..10_000).prop_map(Operand::Imm),
        (0usize..64).prop_map(Operand::Var),
    ]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![Just(BinaryOp::Add), Just(BinaryOp::Sub), Just(BinaryOp::Mul)]
}

/// Straight-line program over inputs `x` and `y`: each step writes a new
/// temporary from earlier values, the last temporary is returned
fn straight_line_program() -> impl Strategy<Value = IrProgram> {
    prop::collection::vec((binary_op(), operand(), operand()), 1..16).prop_map(|steps| {
        let mut instructions = Vec::new();
        let mut available = vec![IrVariable::named("x"), IrVariable::named("y")];
        for (i, (op, lhs, rhs)) in steps.into_iter().enumerate() {
            let pick = |operand: Operand| -> IrValue {
                match operand {
                    Operand::Imm(v) => IrValue::Immediate(v),
                    Operand::Var(n) => IrValue::Variable(available[n % available.len()].clone()),
                }
            };
            let dest = IrVariable::Temp(i as u32);
            instructions.push(Instruction::binary(op, dest.clone(), pick(lhs), pick(rhs)));
            available.push(dest);
        }
        let last = available.last().cloned().unwrap_or_else(|| IrVariable::named("x"));
        instructions.push(Instruction::ret(last));
        IrProgram::from_instructions(instructions)
    })
}

fn inputs(x: i64, y: i64) -> HashMap<String, i64> {
    HashMap::from([("x".to_string(), x), ("y".to_string(), y)])
}

fn registers(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("r{}", i)).collect()
}

// =============================================================================
// SCANNER / PIPELINE FUZZING
// =============================================================================

proptest! {
    #[test]
    fn scanner_never_panics(source in arbitrary_source_string()) {
        let mut symbols = SymbolTable::new();
        if let Ok(tokens) = Scanner::new(&source).scan_tokens(&mut symbols) {
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(tacc::TokenKind::Eof));
        }
    }

    #[test]
    fn compile_never_panics(source in statement_like_string()) {
        let compiler = Compiler::new(CompileOptions::default()).unwrap();
        match compiler.compile(&source) {
            Ok(result) => prop_assert!(result.assembly.len() <= result.normalized.len()),
            Err(err) => {
                let expected_error = err.is_parse_error()
                    || matches!(err, Error::RegisterExhausted { .. });
                prop_assert!(expected_error)
            }
        }
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

proptest! {
    #[test]
    fn immediate_pairs_fold_exactly(a in any::<i64>(), b in any::<i64>(), op in binary_op()) {
        let program = IrProgram::from_instructions(vec![
            Instruction::binary(op, IrVariable::Temp(0), a, b),
        ]);
        let out = normalize(&program);
        prop_assert_eq!(out.instructions, vec![Instruction::mov(IrVariable::Temp(0), op.apply(a, b))]);
    }

    #[test]
    fn normalization_preserves_semantics(
        program in straight_line_program(),
        x in -100i64..100,
        y in -100i64..100,
    ) {
        let env = inputs(x, y);
        let expected = program.evaluate(&env).unwrap();
        let actual = normalize(&program).evaluate(&env).unwrap();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn normalized_shape(program in straight_line_program()) {
        let out = normalize(&program);
        for instr in &out.instructions {
            match instr {
                Instruction::Add { lhs, rhs, .. } => {
                    prop_assert!(!lhs.is_immediate());
                    if let IrValue::Immediate(imm) = rhs {
                        prop_assert!(ADDI_IMMEDIATE_RANGE.contains(imm));
                    }
                }
                Instruction::Sub { lhs, rhs, .. } | Instruction::Mul { lhs, rhs, .. } => {
                    prop_assert!(!lhs.is_immediate());
                    prop_assert!(!rhs.is_immediate());
                }
                _ => {}
            }
        }
        prop_assert!(out.next_temp >= program.next_temp);
        let returns = out.instructions.iter().filter(|i| i.is_return()).count();
        prop_assert_eq!(returns, 1);
        prop_assert!(out.instructions.last().map_or(false, |i| i.is_return()));
    }
}

// =============================================================================
// REGISTER ALLOCATION
// =============================================================================

proptest! {
    #[test]
    fn usage_counters_only_count_down(program in straight_line_program()) {
        let out = normalize(&program);
        let mut alloc = RegisterAllocator::for_instructions(registers(128), &out.instructions).unwrap();
        for instr in &out.instructions {
            for var in instr.variables() {
                let before = alloc.usage(var).unwrap();
                alloc.resolve(var).unwrap();
                let after = alloc.usage(var).unwrap();
                prop_assert_eq!(after + 1, before);
            }
        }
        for var in usage_counts(&out.instructions).keys() {
            prop_assert_eq!(alloc.usage(var), Some(0));
        }
    }

    #[test]
    fn repeated_resolution_is_stable(uses in 2usize..6) {
        let var = IrVariable::named("v");
        let usage: UsageCounts = HashMap::from([(var.clone(), uses)]);
        let mut alloc = RegisterAllocator::new(registers(3), usage).unwrap();
        let first = alloc.resolve(&var).unwrap();
        for _ in 1..uses {
            prop_assert_eq!(&alloc.resolve(&var).unwrap(), &first);
        }
    }

    #[test]
    fn one_more_live_variable_than_registers_exhausts(n in 1usize..8) {
        let vars: Vec<IrVariable> = (0..=n as u32).map(IrVariable::Temp).collect();
        let usage: UsageCounts = vars.iter().map(|v| (v.clone(), 2)).collect();
        let mut alloc = RegisterAllocator::new(registers(n), usage).unwrap();
        for var in &vars[..n] {
            alloc.resolve(var).unwrap();
        }
        let is_exhausted = matches!(
            alloc.resolve(&vars[n]),
            Err(Error::RegisterExhausted { capacity, .. }) if capacity == n
        );
        prop_assert!(is_exhausted);
    }
}
