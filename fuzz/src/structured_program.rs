use std::ops::Deref;

use arbitrary::{Arbitrary, Result, Unstructured};
use assembunny::syntax::{
	instruction::{Instruction, Operand, Program},
	name::Name,
};

#[derive(Arbitrary)]
enum Shape {
	Def(i32),
	Cpy,
	Inc,
	Dec,
	Inct,
	Dect,
	Mul,
	Div,
	Jnz,
	Outn,
	Outc,
}

struct Builder<'u, 'd> {
	u: &'u mut Unstructured<'d>,
	names: Vec<Name>,
}

impl Builder<'_, '_> {
	fn register(&mut self) -> Result<Name> {
		let index = self.u.choose_index(self.names.len())?;

		Ok(self.names[index].clone())
	}

	fn value(&mut self) -> Result<Operand> {
		if self.u.arbitrary()? {
			self.register().map(Operand::Register)
		} else {
			// Small literals keep jumps inside the program more often.
			let value: i8 = self.u.arbitrary()?;

			Ok(Operand::Literal(value.into()))
		}
	}

	fn instruction(&mut self, shape: Shape) -> Result<Instruction> {
		let instruction = match shape {
			Shape::Def(value) => Instruction::Def {
				name: self.register()?,
				value,
			},
			Shape::Cpy => Instruction::Cpy {
				from: self.value()?,
				to: self.register()?,
			},
			Shape::Inc => Instruction::Inc {
				register: self.register()?,
			},
			Shape::Dec => Instruction::Dec {
				register: self.register()?,
			},
			Shape::Inct => Instruction::Inct {
				register: self.register()?,
				amount: self.value()?,
			},
			Shape::Dect => Instruction::Dect {
				register: self.register()?,
				amount: self.value()?,
			},
			Shape::Mul => Instruction::Mul {
				lhs: self.value()?,
				rhs: self.value()?,
				result: self.register()?,
			},
			Shape::Div => Instruction::Div {
				lhs: self.value()?,
				rhs: self.value()?,
				result: self.register()?,
			},
			Shape::Jnz => Instruction::Jnz {
				condition: self.value()?,
				offset: self.value()?,
			},
			Shape::Outn => Instruction::Outn { value: self.value()? },
			Shape::Outc => Instruction::Outc { value: self.value()? },
		};

		Ok(instruction)
	}
}

/// A program whose registers are all defined up front, so it always passes the
/// static checks of code generation.
#[derive(Debug)]
pub struct StructuredProgram {
	program: Program,
}

impl Arbitrary<'_> for StructuredProgram {
	fn arbitrary(u: &mut Unstructured) -> Result<Self> {
		let count = u.int_in_range(1..=4)?;
		let names: Vec<_> = (0..count)
			.map(|i| Name::new(&format!("r{i}")).expect("generated names are valid"))
			.collect();

		let mut instructions = Vec::new();

		for name in &names {
			instructions.push(Instruction::Def {
				name: name.clone(),
				value: u.arbitrary()?,
			});
		}

		let len = u.arbitrary_len::<Shape>()?;
		let mut builder = Builder { u, names };

		for _ in 0..len {
			let shape = Shape::arbitrary(builder.u)?;

			instructions.push(builder.instruction(shape)?);
		}

		Ok(Self {
			program: Program::new(instructions),
		})
	}
}

impl Deref for StructuredProgram {
	type Target = Program;

	fn deref(&self) -> &Self::Target {
		&self.program
	}
}
