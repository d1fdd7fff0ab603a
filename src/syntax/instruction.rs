use std::fmt::{Display, Formatter, Result};

use super::name::Name;

/// Either an integer literal or a reference to a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
	Literal(i32),
	Register(Name),
}

impl Operand {
	#[must_use]
	pub const fn as_register(&self) -> Option<&Name> {
		match self {
			Self::Literal(_) => None,
			Self::Register(name) => Some(name),
		}
	}
}

impl From<i32> for Operand {
	fn from(value: i32) -> Self {
		Self::Literal(value)
	}
}

impl From<Name> for Operand {
	fn from(name: Name) -> Self {
		Self::Register(name)
	}
}

impl Display for Operand {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		match self {
			Self::Literal(value) => write!(f, "{value}"),
			Self::Register(name) => write!(f, "{name}"),
		}
	}
}

/// What each operand slot of an opcode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
	/// A register name that must not be read as a literal.
	Register,
	/// An integer literal only.
	Literal,
	/// Anything resolvable: a literal or a register.
	Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
	Def,
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

impl Opcode {
	pub const ALL: [Self; 11] = [
		Self::Def,
		Self::Cpy,
		Self::Inc,
		Self::Dec,
		Self::Inct,
		Self::Dect,
		Self::Mul,
		Self::Div,
		Self::Jnz,
		Self::Outn,
		Self::Outc,
	];

	#[must_use]
	pub const fn mnemonic(self) -> &'static str {
		match self {
			Self::Def => "def",
			Self::Cpy => "cpy",
			Self::Inc => "inc",
			Self::Dec => "dec",
			Self::Inct => "inct",
			Self::Dect => "dect",
			Self::Mul => "mul",
			Self::Div => "div",
			Self::Jnz => "jnz",
			Self::Outn => "outn",
			Self::Outc => "outc",
		}
	}

	/// Looks up a mnemonic, ignoring ASCII case.
	#[must_use]
	pub fn from_mnemonic(text: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|opcode| opcode.mnemonic().eq_ignore_ascii_case(text))
	}

	#[must_use]
	pub const fn slots(self) -> &'static [Slot] {
		match self {
			Self::Def => &[Slot::Register, Slot::Literal],
			Self::Cpy => &[Slot::Value, Slot::Register],
			Self::Inc | Self::Dec => &[Slot::Register],
			Self::Inct | Self::Dect => &[Slot::Register, Slot::Value],
			Self::Mul | Self::Div => &[Slot::Value, Slot::Value, Slot::Register],
			Self::Jnz => &[Slot::Value, Slot::Value],
			Self::Outn | Self::Outc => &[Slot::Value],
		}
	}

	/// Stable number used by the binary format.
	#[must_use]
	pub const fn number(self) -> u8 {
		self as u8
	}

	#[must_use]
	pub fn from_number(number: u8) -> Option<Self> {
		Self::ALL.get(usize::from(number)).copied()
	}
}

impl Display for Opcode {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		f.write_str(self.mnemonic())
	}
}

/// One parsed program line. Operand arity is fixed by the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
	Def { name: Name, value: i32 },
	Cpy { from: Operand, to: Name },
	Inc { register: Name },
	Dec { register: Name },
	Inct { register: Name, amount: Operand },
	Dect { register: Name, amount: Operand },
	Mul { lhs: Operand, rhs: Operand, result: Name },
	Div { lhs: Operand, rhs: Operand, result: Name },
	Jnz { condition: Operand, offset: Operand },
	Outn { value: Operand },
	Outc { value: Operand },
}

impl Instruction {
	#[must_use]
	pub const fn opcode(&self) -> Opcode {
		match self {
			Self::Def { .. } => Opcode::Def,
			Self::Cpy { .. } => Opcode::Cpy,
			Self::Inc { .. } => Opcode::Inc,
			Self::Dec { .. } => Opcode::Dec,
			Self::Inct { .. } => Opcode::Inct,
			Self::Dect { .. } => Opcode::Dect,
			Self::Mul { .. } => Opcode::Mul,
			Self::Div { .. } => Opcode::Div,
			Self::Jnz { .. } => Opcode::Jnz,
			Self::Outn { .. } => Opcode::Outn,
			Self::Outc { .. } => Opcode::Outc,
		}
	}

	/// Rebuilds an instruction from operands in source order, or `None` if they do
	/// not fit the opcode's slots.
	#[must_use]
	pub fn from_operands(opcode: Opcode, operands: &[Operand]) -> Option<Self> {
		use Operand::{Literal, Register};

		let instruction = match (opcode, operands) {
			(Opcode::Def, [Register(name), Literal(value)]) => Self::Def {
				name: name.clone(),
				value: *value,
			},
			(Opcode::Cpy, [from, Register(to)]) => Self::Cpy {
				from: from.clone(),
				to: to.clone(),
			},
			(Opcode::Inc, [Register(register)]) => Self::Inc {
				register: register.clone(),
			},
			(Opcode::Dec, [Register(register)]) => Self::Dec {
				register: register.clone(),
			},
			(Opcode::Inct, [Register(register), amount]) => Self::Inct {
				register: register.clone(),
				amount: amount.clone(),
			},
			(Opcode::Dect, [Register(register), amount]) => Self::Dect {
				register: register.clone(),
				amount: amount.clone(),
			},
			(Opcode::Mul, [lhs, rhs, Register(result)]) => Self::Mul {
				lhs: lhs.clone(),
				rhs: rhs.clone(),
				result: result.clone(),
			},
			(Opcode::Div, [lhs, rhs, Register(result)]) => Self::Div {
				lhs: lhs.clone(),
				rhs: rhs.clone(),
				result: result.clone(),
			},
			(Opcode::Jnz, [condition, offset]) => Self::Jnz {
				condition: condition.clone(),
				offset: offset.clone(),
			},
			(Opcode::Outn, [value]) => Self::Outn {
				value: value.clone(),
			},
			(Opcode::Outc, [value]) => Self::Outc {
				value: value.clone(),
			},
			_ => return None,
		};

		Some(instruction)
	}

	/// Operands in source order. The name introduced by `DEF` is reported as a
	/// register operand even though it is a declaration, not a use.
	#[must_use]
	pub fn operands(&self) -> Vec<Operand> {
		let register = |name: &Name| Operand::Register(name.clone());

		match self {
			Self::Def { name, value } => vec![register(name), Operand::Literal(*value)],
			Self::Cpy { from, to } => vec![from.clone(), register(to)],
			Self::Inc { register: name } | Self::Dec { register: name } => vec![register(name)],
			Self::Inct {
				register: name,
				amount,
			}
			| Self::Dect {
				register: name,
				amount,
			} => vec![register(name), amount.clone()],
			Self::Mul { lhs, rhs, result } | Self::Div { lhs, rhs, result } => {
				vec![lhs.clone(), rhs.clone(), register(result)]
			}
			Self::Jnz { condition, offset } => vec![condition.clone(), offset.clone()],
			Self::Outn { value } | Self::Outc { value } => vec![value.clone()],
		}
	}

	/// Registers this instruction reads or writes, excluding the one `DEF` declares.
	#[must_use]
	pub fn uses(&self) -> Vec<&Name> {
		let operand = Operand::as_register;

		match self {
			Self::Def { .. } => Vec::new(),
			Self::Cpy { from, to } => operand(from).into_iter().chain([to]).collect(),
			Self::Inc { register } | Self::Dec { register } => vec![register],
			Self::Inct { register, amount } | Self::Dect { register, amount } => {
				[register].into_iter().chain(operand(amount)).collect()
			}
			Self::Mul { lhs, rhs, result } | Self::Div { lhs, rhs, result } => operand(lhs)
				.into_iter()
				.chain(operand(rhs))
				.chain([result])
				.collect(),
			Self::Jnz { condition, offset } => {
				operand(condition).into_iter().chain(operand(offset)).collect()
			}
			Self::Outn { value } | Self::Outc { value } => operand(value).into_iter().collect(),
		}
	}
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		write!(f, "{}", self.opcode())?;

		self.operands()
			.iter()
			.try_for_each(|operand| write!(f, " {operand}"))
	}
}

/// An ordered, immutable instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
	instructions: Box<[Instruction]>,
}

impl Program {
	#[must_use]
	pub fn new(instructions: Vec<Instruction>) -> Self {
		Self {
			instructions: instructions.into(),
		}
	}

	#[must_use]
	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}
}

impl FromIterator<Instruction> for Program {
	fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

impl Display for Program {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		self.instructions
			.iter()
			.try_for_each(|instruction| writeln!(f, "{instruction}"))
	}
}
