use super::{
	instruction::{Instruction, Opcode, Operand, Program},
	name::{Name, NameError},
};

/// Mnemonics of the self-modifying toggle family, recognised only to be refused.
static UNSUPPORTED: &[&str] = &["tgl"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("unknown keyword `{0}`")]
	UnknownOpcode(String),

	#[error("keyword `{0}` is not supported")]
	Unsupported(String),

	#[error("`{opcode}` expects {expected} operands, found {found}")]
	Arity {
		opcode: Opcode,
		expected: usize,
		found: usize,
	},

	#[error("`{opcode}` expects a register for operand {position}, found `{found}`")]
	ExpectedRegister {
		opcode: Opcode,
		position: usize,
		found: String,
	},

	#[error("`{opcode}` expects a literal for operand {position}, found `{found}`")]
	ExpectedLiteral {
		opcode: Opcode,
		position: usize,
		found: String,
	},

	#[error("`{0}` is neither a 32-bit integer nor a register name")]
	InvalidLiteral(String),

	#[error("`{token}` is not a valid register name: {reason}")]
	InvalidName { token: String, reason: NameError },
}

/// A parse error located at a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {error}")]
pub struct SourceError {
	pub line: usize,
	pub error: ParseError,
}

fn parse_name(token: &str) -> Result<Name, ParseError> {
	Name::new(token).map_err(|reason| ParseError::InvalidName {
		token: token.to_owned(),
		reason,
	})
}

// Anything that reads as an integer is a literal; everything else must be a name.
fn parse_value(token: &str) -> Result<Operand, ParseError> {
	if let Ok(value) = token.parse() {
		return Ok(Operand::Literal(value));
	}

	let looks_numeric = token
		.trim_start_matches(['-', '+'])
		.starts_with(|c: char| c.is_ascii_digit());

	if looks_numeric {
		return Err(ParseError::InvalidLiteral(token.to_owned()));
	}

	parse_name(token).map(Operand::Register)
}

/// Operand tokens of one line, consumed in slot order.
struct Operands<'a> {
	opcode: Opcode,
	tokens: std::vec::IntoIter<&'a str>,
	position: usize,
	expected: usize,
}

impl<'a> Operands<'a> {
	fn new(opcode: Opcode, tokens: Vec<&'a str>) -> Result<Self, ParseError> {
		let expected = opcode.slots().len();

		if tokens.len() != expected {
			return Err(ParseError::Arity {
				opcode,
				expected,
				found: tokens.len(),
			});
		}

		Ok(Self {
			opcode,
			tokens: tokens.into_iter(),
			position: 0,
			expected,
		})
	}

	fn token(&mut self) -> Result<&'a str, ParseError> {
		self.position += 1;

		self.tokens.next().ok_or(ParseError::Arity {
			opcode: self.opcode,
			expected: self.expected,
			found: self.position - 1,
		})
	}

	fn value(&mut self) -> Result<Operand, ParseError> {
		self.token().and_then(parse_value)
	}

	fn register(&mut self) -> Result<Name, ParseError> {
		let token = self.token()?;

		match parse_value(token)? {
			Operand::Register(name) => Ok(name),
			Operand::Literal(_) => Err(ParseError::ExpectedRegister {
				opcode: self.opcode,
				position: self.position,
				found: token.to_owned(),
			}),
		}
	}

	fn literal(&mut self) -> Result<i32, ParseError> {
		let token = self.token()?;

		match parse_value(token)? {
			Operand::Literal(value) => Ok(value),
			Operand::Register(_) => Err(ParseError::ExpectedLiteral {
				opcode: self.opcode,
				position: self.position,
				found: token.to_owned(),
			}),
		}
	}
}

fn assemble(mut operands: Operands) -> Result<Instruction, ParseError> {
	let instruction = match operands.opcode {
		Opcode::Def => Instruction::Def {
			name: operands.register()?,
			value: operands.literal()?,
		},
		Opcode::Cpy => Instruction::Cpy {
			from: operands.value()?,
			to: operands.register()?,
		},
		Opcode::Inc => Instruction::Inc {
			register: operands.register()?,
		},
		Opcode::Dec => Instruction::Dec {
			register: operands.register()?,
		},
		Opcode::Inct => Instruction::Inct {
			register: operands.register()?,
			amount: operands.value()?,
		},
		Opcode::Dect => Instruction::Dect {
			register: operands.register()?,
			amount: operands.value()?,
		},
		Opcode::Mul => Instruction::Mul {
			lhs: operands.value()?,
			rhs: operands.value()?,
			result: operands.register()?,
		},
		Opcode::Div => Instruction::Div {
			lhs: operands.value()?,
			rhs: operands.value()?,
			result: operands.register()?,
		},
		Opcode::Jnz => Instruction::Jnz {
			condition: operands.value()?,
			offset: operands.value()?,
		},
		Opcode::Outn => Instruction::Outn {
			value: operands.value()?,
		},
		Opcode::Outc => Instruction::Outc {
			value: operands.value()?,
		},
	};

	Ok(instruction)
}

/// Parses one whitespace-delimited line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns a `ParseError` describing the first problem found in the line.
pub fn parse_line(line: &str) -> Result<Option<Instruction>, ParseError> {
	let mut tokens = line.split_whitespace();
	let Some(keyword) = tokens.next() else {
		return Ok(None);
	};

	if UNSUPPORTED.iter().any(|name| name.eq_ignore_ascii_case(keyword)) {
		return Err(ParseError::Unsupported(keyword.to_owned()));
	}

	let opcode = Opcode::from_mnemonic(keyword)
		.ok_or_else(|| ParseError::UnknownOpcode(keyword.to_owned()))?;

	let operands = Operands::new(opcode, tokens.collect())?;

	assemble(operands).map(Some)
}

/// Parses a whole source text, one instruction per non-blank line.
///
/// # Errors
///
/// Returns the first line that fails to parse.
pub fn parse_program(source: &str) -> Result<Program, SourceError> {
	source
		.lines()
		.enumerate()
		.filter_map(|(i, line)| match parse_line(line) {
			Ok(instruction) => instruction.map(Ok),
			Err(error) => Some(Err(SourceError { line: i + 1, error })),
		})
		.collect::<Result<Vec<_>, _>>()
		.map(Program::new)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{parse_line, parse_program, ParseError, SourceError};
	use crate::syntax::{
		instruction::{Instruction, Opcode, Operand},
		name::{Name, NameError},
	};

	fn name(text: &str) -> Name {
		Name::new(text).unwrap()
	}

	#[test]
	fn parses_every_shape() {
		let cases = [
			(
				"DEF a -3",
				Instruction::Def {
					name: name("a"),
					value: -3,
				},
			),
			(
				"cpy a b",
				Instruction::Cpy {
					from: name("a").into(),
					to: name("b"),
				},
			),
			(
				"  Mul 2 a b ",
				Instruction::Mul {
					lhs: Operand::Literal(2),
					rhs: name("a").into(),
					result: name("b"),
				},
			),
			(
				"jnz 1 off",
				Instruction::Jnz {
					condition: Operand::Literal(1),
					offset: name("off").into(),
				},
			),
			(
				"outc 65",
				Instruction::Outc {
					value: Operand::Literal(65),
				},
			),
		];

		for (line, expected) in cases {
			assert_eq!(parse_line(line), Ok(Some(expected)), "{line}");
		}
	}

	#[test]
	fn blank_lines_are_skipped() {
		assert_eq!(parse_line("   \t"), Ok(None));

		let program = parse_program("def a 1\n\noutn a\n").unwrap();

		assert_eq!(program.len(), 2);
	}

	#[test]
	fn rejects_malformed_lines() {
		assert_eq!(
			parse_line("inc"),
			Err(ParseError::Arity {
				opcode: Opcode::Inc,
				expected: 1,
				found: 0
			})
		);
		assert_eq!(
			parse_line("inc 4"),
			Err(ParseError::ExpectedRegister {
				opcode: Opcode::Inc,
				position: 1,
				found: "4".into()
			})
		);
		assert_eq!(
			parse_line("def a b"),
			Err(ParseError::ExpectedLiteral {
				opcode: Opcode::Def,
				position: 2,
				found: "b".into()
			})
		);
		assert_eq!(
			parse_line("outn 99999999999"),
			Err(ParseError::InvalidLiteral("99999999999".into()))
		);
		assert_eq!(
			parse_line("def 1x 0"),
			Err(ParseError::InvalidLiteral("1x".into()))
		);
		assert_eq!(
			parse_line("def a$ 0"),
			Err(ParseError::InvalidName {
				token: "a$".into(),
				reason: NameError::ForbiddenCharacter('$')
			})
		);
		assert_eq!(parse_line("out 1"), Err(ParseError::UnknownOpcode("out".into())));
		assert_eq!(parse_line("TGL a"), Err(ParseError::Unsupported("TGL".into())));
	}

	#[test]
	fn reports_source_lines() {
		let error = parse_program("def a 0\n\nbogus a\n").unwrap_err();

		assert_eq!(
			error,
			SourceError {
				line: 3,
				error: ParseError::UnknownOpcode("bogus".into())
			}
		);
	}
}
