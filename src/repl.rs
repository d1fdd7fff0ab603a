//! Line-at-a-time shell over a live register environment.

use std::io::{self, BufRead, Write};

use crate::{
	machine::{
		engine::{self, Error},
		registers::{Redefinition, Registers},
	},
	syntax::{instruction::Instruction, parser::parse_line},
};

static HELP: &str = "\
Enter one instruction per line, or a command:
  :help  show this message
  :reg   list registers and their values
  :raw   toggle echoing each parsed instruction
  :exit  leave the shell
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
	Continue,
	Exit,
}

pub struct Repl {
	registers: Registers,
	redefinition: Redefinition,
	counter: usize,
	raw: bool,
}

impl Repl {
	#[must_use]
	pub fn new(redefinition: Redefinition) -> Self {
		Self {
			registers: Registers::new(),
			redefinition,
			counter: 0,
			raw: false,
		}
	}

	#[must_use]
	pub const fn registers(&self) -> &Registers {
		&self.registers
	}

	/// Number of instructions applied successfully so far.
	#[must_use]
	pub const fn counter(&self) -> usize {
		self.counter
	}

	fn command(&mut self, name: &str, out: &mut dyn Write) -> io::Result<Control> {
		match name {
			":help" => write!(out, "{HELP}")?,
			":reg" => {
				for (name, value) in self.registers.iter() {
					writeln!(out, "{name} => {value}")?;
				}
			}
			":raw" => {
				self.raw = !self.raw;

				writeln!(out, "raw echo {}", if self.raw { "on" } else { "off" })?;
			}
			":exit" => return Ok(Control::Exit),
			other => writeln!(out, "unknown command `{other}`, try :help")?,
		}

		Ok(Control::Continue)
	}

	fn apply(&mut self, instruction: &Instruction, out: &mut dyn Write) -> io::Result<()> {
		if matches!(instruction, Instruction::Jnz { .. }) {
			return writeln!(out, "error: jnz is not available in the shell");
		}

		if self.raw {
			writeln!(out, "{instruction:?}")?;
		}

		let result = engine::execute(
			&mut self.registers,
			self.counter,
			instruction,
			self.redefinition,
			out,
		);

		match result {
			Ok(_) => {
				self.counter += 1;

				Ok(())
			}
			Err(Error::Fault(fault)) => writeln!(out, "error: {}", fault.kind),
			Err(Error::Io(error)) => Err(error),
		}
	}

	/// Handles one line of input.
	///
	/// # Errors
	///
	/// Returns an error only if writing to `out` fails.
	pub fn eval(&mut self, line: &str, out: &mut dyn Write) -> io::Result<Control> {
		let trimmed = line.trim();

		if trimmed.starts_with(':') {
			let name = trimmed.split_whitespace().next().unwrap_or(trimmed);

			return self.command(name, out);
		}

		match parse_line(trimmed) {
			Ok(Some(instruction)) => self.apply(&instruction, out)?,
			Ok(None) => {}
			Err(error) => writeln!(out, "error: {error}")?,
		}

		Ok(Control::Continue)
	}
}

/// Runs the shell until `:exit` or end of input.
///
/// # Errors
///
/// Returns an error if reading `input` or writing `out` fails.
pub fn run(input: &mut dyn BufRead, out: &mut dyn Write, redefinition: Redefinition) -> io::Result<()> {
	let mut repl = Repl::new(redefinition);
	let mut line = String::new();

	writeln!(out, "Assembunny+ shell. Type :help for commands.")?;

	loop {
		write!(out, "{}::> ", repl.counter())?;
		out.flush()?;

		line.clear();

		if input.read_line(&mut line)? == 0 || repl.eval(&line, out)? == Control::Exit {
			break;
		}
	}

	writeln!(out)
}
