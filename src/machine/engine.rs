use std::io::{self, Write};

use crate::{
	error::{ErrorKind, Fault},
	syntax::instruction::{Instruction, Program},
};

use super::registers::{Redefinition, Registers};

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
	/// Maximum number of instructions to execute, unbounded if `None`.
	pub step_limit: Option<u64>,
	pub redefinition: Redefinition,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Fault(#[from] Fault),

	#[error("failed to write output")]
	Io(#[from] io::Error),
}

/// How execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
	/// The counter left the program.
	Halted,
	Failed(Fault),
	/// The step limit ran out before the program halted.
	Exhausted { steps: u64 },
}

impl Status {
	#[must_use]
	pub const fn is_halted(&self) -> bool {
		matches!(self, Self::Halted)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
	pub status: Status,
	pub output: String,
	pub steps: u64,
}

/// Where control goes after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Next,
	/// Absolute target, possibly outside the program.
	Jump(i64),
}

/// The character `OUTC` prints, if `value` is a Unicode scalar value.
#[must_use]
pub fn char_of(value: i32) -> Option<char> {
	u32::try_from(value).ok().and_then(char::from_u32)
}

/// Applies a single instruction at `index`. The interactive shell calls this
/// directly; `Machine` calls it for every step.
///
/// # Errors
///
/// Returns the fault raised by the instruction, located at `index`, or an output error.
pub fn execute(
	registers: &mut Registers,
	index: usize,
	instruction: &Instruction,
	redefinition: Redefinition,
	out: &mut dyn Write,
) -> Result<Flow, Error> {
	let fault = |kind| Fault::new(index, kind);

	match instruction {
		Instruction::Def { name, value } => registers
			.define(name, *value, redefinition)
			.map_err(fault)?,
		Instruction::Cpy { from, to } => {
			let value = registers.resolve(from).map_err(fault)?;

			registers.set(to, value).map_err(fault)?;
		}
		Instruction::Inc { register } => registers
			.update(register, |v| v.wrapping_add(1))
			.map_err(fault)?,
		Instruction::Dec { register } => registers
			.update(register, |v| v.wrapping_sub(1))
			.map_err(fault)?,
		Instruction::Inct { register, amount } => {
			let amount = registers.resolve(amount).map_err(fault)?;

			registers
				.update(register, |v| v.wrapping_add(amount))
				.map_err(fault)?;
		}
		Instruction::Dect { register, amount } => {
			let amount = registers.resolve(amount).map_err(fault)?;

			registers
				.update(register, |v| v.wrapping_sub(amount))
				.map_err(fault)?;
		}
		Instruction::Mul { lhs, rhs, result } => {
			let lhs = registers.resolve(lhs).map_err(fault)?;
			let rhs = registers.resolve(rhs).map_err(fault)?;

			registers.set(result, lhs.wrapping_mul(rhs)).map_err(fault)?;
		}
		Instruction::Div { lhs, rhs, result } => {
			let lhs = registers.resolve(lhs).map_err(fault)?;
			let rhs = registers.resolve(rhs).map_err(fault)?;

			if rhs == 0 {
				return Err(fault(ErrorKind::DivisionByZero).into());
			}

			registers.set(result, lhs.wrapping_div(rhs)).map_err(fault)?;
		}
		Instruction::Jnz { condition, offset } => {
			let condition = registers.resolve(condition).map_err(fault)?;
			let offset = registers.resolve(offset).map_err(fault)?;

			if condition != 0 {
				// i64 holds any index plus any offset.
				let target = index as i64 + i64::from(offset);

				return Ok(Flow::Jump(target));
			}
		}
		Instruction::Outn { value } => {
			let value = registers.resolve(value).map_err(fault)?;

			writeln!(out, "{value}")?;
		}
		Instruction::Outc { value } => {
			let value = registers.resolve(value).map_err(fault)?;

			let c = char_of(value).ok_or_else(|| fault(ErrorKind::InvalidCodePoint(value)))?;

			write!(out, "{c}")?;
		}
	}

	Ok(Flow::Next)
}

/// Interpreter state for one run of one program.
pub struct Machine<'p> {
	program: &'p Program,
	config: Config,

	registers: Registers,
	counter: usize,
	steps: u64,
}

impl<'p> Machine<'p> {
	#[must_use]
	pub fn new(program: &'p Program, config: Config) -> Self {
		Self {
			program,
			config,
			registers: Registers::new(),
			counter: 0,
			steps: 0,
		}
	}

	#[must_use]
	pub const fn counter(&self) -> usize {
		self.counter
	}

	#[must_use]
	pub const fn steps(&self) -> u64 {
		self.steps
	}

	#[must_use]
	pub const fn registers(&self) -> &Registers {
		&self.registers
	}

	#[must_use]
	pub fn is_halted(&self) -> bool {
		self.counter >= self.program.len()
	}

	/// Executes the instruction under the counter. Returns `false` once halted.
	///
	/// # Errors
	///
	/// Returns the instruction's fault or an output error. Effects already applied
	/// by earlier steps are kept.
	pub fn step(&mut self, out: &mut dyn Write) -> Result<bool, Error> {
		let Some(instruction) = self.program.instructions().get(self.counter) else {
			return Ok(false);
		};

		log::trace!("{:>4}: {instruction}", self.counter);

		let flow = execute(
			&mut self.registers,
			self.counter,
			instruction,
			self.config.redefinition,
			out,
		)?;

		self.steps += 1;
		self.counter = match flow {
			Flow::Next => self.counter + 1,
			Flow::Jump(target) => usize::try_from(target)
				.ok()
				.filter(|&target| target < self.program.len())
				.unwrap_or(self.program.len()),
		};

		Ok(!self.is_halted())
	}

	/// Runs until the program halts, faults or exhausts its step limit.
	///
	/// # Errors
	///
	/// Returns an error only if writing to `out` fails.
	pub fn run_with(&mut self, out: &mut dyn Write) -> io::Result<Status> {
		while !self.is_halted() {
			if self.config.step_limit.is_some_and(|limit| self.steps >= limit) {
				log::debug!("step limit reached after {} steps", self.steps);

				return Ok(Status::Exhausted { steps: self.steps });
			}

			match self.step(out) {
				Ok(_) => {}
				Err(Error::Fault(fault)) => {
					log::debug!("failed after {} steps: {fault}", self.steps);

					return Ok(Status::Failed(fault));
				}
				Err(Error::Io(error)) => return Err(error),
			}
		}

		log::debug!("halted after {} steps", self.steps);

		Ok(Status::Halted)
	}
}

/// Runs `program` from a fresh state and collects its output.
#[must_use]
pub fn run(program: &Program, config: Config) -> Execution {
	let mut machine = Machine::new(program, config);
	let mut output = Vec::new();

	let status = machine
		.run_with(&mut output)
		.expect("writing to a vector never fails");

	Execution {
		status,
		output: String::from_utf8_lossy(&output).into_owned(),
		steps: machine.steps(),
	}
}
