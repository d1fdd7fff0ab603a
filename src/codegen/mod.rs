use std::io::{self, Write};

use crate::{error::Fault, machine::registers::Redefinition, syntax::instruction::Program};

use self::{indent::Indent, plan::Plan};

pub mod c99;
pub mod indent;
pub mod lua53;
pub mod plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	C,
	Lua,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
	pub indent: Indent,
	pub redefinition: Redefinition,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Fault(#[from] Fault),

	#[error("failed to write generated code")]
	Io(#[from] io::Error),
}

fn write_planned(
	writer: &mut dyn Write,
	program: &Program,
	plan: &Plan,
	target: Target,
	options: Options,
) -> io::Result<()> {
	match target {
		Target::C => c99::write(writer, program, plan, options.indent),
		Target::Lua => lua53::write(writer, program, plan, options.indent),
	}
}

/// Translates `program` for `target` into `writer`.
///
/// # Errors
///
/// Returns a `Fault` if the program uses a register before defining it (or
/// redefines one when that is rejected), or an I/O error if the writer fails.
pub fn write(writer: &mut dyn Write, program: &Program, target: Target, options: Options) -> Result<(), Error> {
	let plan = Plan::new(program, options.redefinition)?;

	write_planned(writer, program, &plan, target, options)?;

	Ok(())
}

/// Translates `program` for `target` into a string. The result depends only on
/// the program and the options.
///
/// # Errors
///
/// Returns a `Fault` under the same conditions as [`write`].
pub fn generate(program: &Program, target: Target, options: Options) -> Result<String, Fault> {
	let plan = Plan::new(program, options.redefinition)?;
	let mut buffer = Vec::new();

	write_planned(&mut buffer, program, &plan, target, options)
		.expect("writing to a vector never fails");

	log::debug!("generated {} bytes of {target:?}", buffer.len());

	Ok(String::from_utf8_lossy(&buffer).into_owned())
}
