//! IR Builder - synthesizes three-address code from parser events
//!
//! Runs as a parse observer. Each shift pushes the token's IR value (an
//! immediate for literals, a named variable for identifiers, nothing for
//! punctuation and keywords) and each reduction pops its body and pushes
//! the value of the head, emitting instructions as arithmetic and
//! statements are recognized.

use super::instruction::{BinaryOp, Instruction, IrValue, IrVariable};
use super::program::IrProgram;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenCategory};
use crate::parser::{prod, ActionObserver, Production, SemanticValue, StateId, ValueStack};
use tracing::trace;

/// IR builder with a private value stack
#[derive(Debug, Default)]
pub struct IrBuilder {
    stack: ValueStack<IrValue>,
    instructions: Vec<Instruction>,
    /// Next temporary number
    next_temp: u32,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instructions emitted so far
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Values currently on the builder's stack
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Finish and hand over the program
    pub fn into_program(self) -> IrProgram {
        IrProgram {
            instructions: self.instructions,
            next_temp: self.next_temp,
        }
    }

    fn fresh_temp(&mut self) -> IrVariable {
        let temp = IrVariable::Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    fn emit(&mut self, instr: Instruction) {
        trace!(instr = %instr, "emit");
        self.instructions.push(instr);
    }

    /// Pop a value that must carry an IR payload
    fn pop_value(&mut self) -> Result<IrValue> {
        let value = self.stack.pop()?;
        value.payload.ok_or_else(|| {
            Error::invariant(format!("{:?} carries no IR value", value.symbol))
        })
    }

    fn binary(&mut self, op: BinaryOp, production: &Production) -> Result<()> {
        let rhs = self.pop_value()?;
        self.stack.discard(1)?;
        let lhs = self.pop_value()?;
        let dest = self.fresh_temp();
        self.emit(Instruction::binary(op, dest.clone(), lhs, rhs));
        self.stack
            .push(SemanticValue::non_terminal(production.head, Some(dest.into())));
        Ok(())
    }
}

impl ActionObserver for IrBuilder {
    fn on_shift(&mut self, _state: StateId, token: &Token) -> Result<()> {
        let payload = match token.kind.category() {
            TokenCategory::IntegerLiteral => {
                let value = token.lexeme.parse::<i64>().map_err(|_| Error::InvalidInteger {
                    text: token.lexeme.clone(),
                    line: token.line,
                })?;
                Some(IrValue::Immediate(value))
            }
            TokenCategory::Identifier => Some(IrVariable::named(token.lexeme.as_str()).into()),
            TokenCategory::Keyword | TokenCategory::Punctuation | TokenCategory::EndOfInput => None,
        };
        self.stack.push(SemanticValue::token(token.clone(), payload));
        Ok(())
    }

    fn on_reduce(&mut self, _state: StateId, production: &Production) -> Result<()> {
        let head = production.head;
        match production.index {
            prod::ASSIGN => {
                let value = self.pop_value()?;
                self.stack.discard(1)?;
                let target = match self.pop_value()? {
                    IrValue::Variable(var) => var,
                    IrValue::Immediate(imm) => {
                        return Err(Error::invariant(format!(
                            "assignment target is the immediate {}",
                            imm
                        )))
                    }
                };
                self.emit(Instruction::mov(target, value));
                self.stack.push(SemanticValue::non_terminal(head, None));
            }
            prod::RETURN => {
                let value = self.pop_value()?;
                self.stack.discard(1)?;
                self.emit(Instruction::ret(value));
                self.stack.push(SemanticValue::non_terminal(head, None));
            }
            prod::ADD => self.binary(BinaryOp::Add, production)?,
            prod::SUB => self.binary(BinaryOp::Sub, production)?,
            prod::MUL => self.binary(BinaryOp::Mul, production)?,
            prod::EXPR_TERM | prod::TERM_FACTOR | prod::FACTOR_ID | prod::FACTOR_INT => {
                let value = self.pop_value()?;
                self.stack
                    .push(SemanticValue::non_terminal(head, Some(value)));
            }
            prod::PAREN => {
                self.stack.discard(1)?;
                let value = self.pop_value()?;
                self.stack.discard(1)?;
                self.stack
                    .push(SemanticValue::non_terminal(head, Some(value)));
            }
            prod::PROGRAM | prod::LIST_MORE | prod::LIST_LAST | prod::DECLARE | prod::INT_TYPE => {
                self.stack.discard(production.len())?;
                self.stack.push(SemanticValue::non_terminal(head, None));
            }
            index => return Err(Error::UnknownProduction { index }),
        }
        Ok(())
    }

    fn on_accept(&mut self, _state: StateId) -> Result<()> {
        self.stack.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::parser::Grammar;

    fn id(name: &str) -> Token {
        Token::simple(TokenKind::Identifier, name)
    }

    fn int(text: &str) -> Token {
        Token::simple(TokenKind::IntConst, text)
    }

    fn punct(kind: TokenKind, text: &str) -> Token {
        Token::simple(kind, text)
    }

    #[test]
    fn test_assignment_of_product() {
        let grammar = Grammar::reference();
        let p = |i| grammar.production(i).unwrap();
        let mut builder = IrBuilder::new();

        // a = 2 * 3
        builder.on_shift(0, &id("a")).unwrap();
        builder.on_shift(0, &punct(TokenKind::Assign, "=")).unwrap();
        builder.on_shift(0, &int("2")).unwrap();
        builder.on_reduce(0, p(prod::FACTOR_INT)).unwrap();
        builder.on_reduce(0, p(prod::TERM_FACTOR)).unwrap();
        builder.on_shift(0, &punct(TokenKind::Star, "*")).unwrap();
        builder.on_shift(0, &int("3")).unwrap();
        builder.on_reduce(0, p(prod::FACTOR_INT)).unwrap();
        builder.on_reduce(0, p(prod::MUL)).unwrap();
        builder.on_reduce(0, p(prod::EXPR_TERM)).unwrap();
        builder.on_reduce(0, p(prod::ASSIGN)).unwrap();
        assert_eq!(builder.stack_depth(), 1);

        let program = builder.into_program();
        let rendered: Vec<String> = program.instructions.iter().map(|i| i.to_string()).collect();
        assert_eq!(rendered, vec!["MUL $0, 2, 3", "MOV a, $0"]);
        assert_eq!(program.next_temp, 1);
    }

    #[test]
    fn test_reading_placeholder_is_fatal() {
        let grammar = Grammar::reference();
        let mut builder = IrBuilder::new();
        builder.on_shift(0, &punct(TokenKind::Return, "return")).unwrap();
        let err = builder
            .on_reduce(0, grammar.production(prod::FACTOR_ID).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::IrInvariant(_)));
    }

    #[test]
    fn test_immediate_assignment_target_is_fatal() {
        let grammar = Grammar::reference();
        let mut builder = IrBuilder::new();
        builder.on_shift(0, &int("1")).unwrap();
        builder.on_shift(0, &punct(TokenKind::Assign, "=")).unwrap();
        builder.on_shift(0, &int("2")).unwrap();
        let err = builder
            .on_reduce(0, grammar.production(prod::ASSIGN).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::IrInvariant(_)));
    }

    #[test]
    fn test_unknown_production() {
        let grammar = Grammar::reference();
        let mut builder = IrBuilder::new();
        let err = builder
            .on_reduce(0, grammar.production(prod::START).unwrap())
            .unwrap_err();
        assert_eq!(err, Error::UnknownProduction { index: 0 });
    }

    #[test]
    fn test_accept_drains_stack() {
        let mut builder = IrBuilder::new();
        builder.on_shift(0, &int("5")).unwrap();
        builder.on_accept(0).unwrap();
        assert_eq!(builder.stack_depth(), 0);
        assert!(builder.instructions().is_empty());
    }
}
