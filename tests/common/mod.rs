//! Program strategies shared by the property tests.

#![allow(dead_code)]

use assembunny::syntax::{
	instruction::{Instruction, Operand, Program},
	name::Name,
};
use proptest::prelude::*;

pub fn names() -> Vec<Name> {
	["a", "b", "c"].into_iter().map(|n| Name::new(n).unwrap()).collect()
}

pub fn register() -> impl Strategy<Value = Name> {
	(0usize..3).prop_map(|i| names()[i].clone())
}

pub fn operand() -> impl Strategy<Value = Operand> {
	prop_oneof![
		(-8i32..8).prop_map(Operand::Literal),
		register().prop_map(Operand::Register),
	]
}

pub fn instruction() -> impl Strategy<Value = Instruction> {
	prop_oneof![
		(register(), any::<i32>()).prop_map(|(name, value)| Instruction::Def { name, value }),
		(operand(), register()).prop_map(|(from, to)| Instruction::Cpy { from, to }),
		register().prop_map(|register| Instruction::Inc { register }),
		register().prop_map(|register| Instruction::Dec { register }),
		(register(), operand()).prop_map(|(register, amount)| Instruction::Inct { register, amount }),
		(register(), operand()).prop_map(|(register, amount)| Instruction::Dect { register, amount }),
		(operand(), operand(), register()).prop_map(|(lhs, rhs, result)| Instruction::Mul { lhs, rhs, result }),
		(operand(), operand(), register()).prop_map(|(lhs, rhs, result)| Instruction::Div { lhs, rhs, result }),
		(operand(), operand()).prop_map(|(condition, offset)| Instruction::Jnz { condition, offset }),
		operand().prop_map(|value| Instruction::Outn { value }),
		(32i32..127).prop_map(|value| Instruction::Outc {
			value: Operand::Literal(value)
		}),
	]
}

/// Programs that define every register before the body.
pub fn defined_program() -> impl Strategy<Value = Program> {
	(any::<[i8; 3]>(), prop::collection::vec(instruction(), 0..24)).prop_map(|(values, body)| {
		names()
			.into_iter()
			.zip(values)
			.map(|(name, value)| Instruction::Def {
				name,
				value: value.into(),
			})
			.chain(body)
			.collect()
	})
}

/// Programs with definitions anywhere, preceded by a few of them so that a useful
/// share passes code generation.
pub fn loose_program() -> impl Strategy<Value = Program> {
	(
		prop::collection::vec((register(), -4i32..4), 0..3),
		prop::collection::vec(instruction(), 0..16),
	)
		.prop_map(|(head, body)| {
			head.into_iter()
				.map(|(name, value)| Instruction::Def { name, value })
				.chain(body)
				.collect()
		})
}
