use std::{
	fmt::{Display, Formatter},
	io::{Result, Write},
};

use crate::{
	error::status,
	syntax::{
		instruction::{Instruction, Operand, Program},
		name::Name,
	},
};

use super::{
	indent::{Indent, Tab},
	plan::{Jump, Plan},
};

fn helpers(tab: Tab) -> String {
	let one = tab.add();
	let two = one.add();

	format!(
		"local function wrap(value)
{one}return ((value + 0x80000000) & 0xFFFFFFFF) - 0x80000000
end

local function div(lhs, rhs)
{one}if rhs == 0 then
{two}os.exit({division})
{one}end

{one}local quotient = lhs // rhs

{one}if quotient < 0 and quotient * rhs ~= lhs then
{two}quotient = quotient + 1
{one}end

{one}return wrap(quotient)
end

local function outc(value)
{one}if value < 0 or value > 0x10FFFF or (value >= 0xD800 and value <= 0xDFFF) then
{two}os.exit({code_point})
{one}end

{one}io.write(utf8.char(value))
end
",
		division = status::DIVISION_BY_ZERO,
		code_point = status::INVALID_CODE_POINT,
	)
}

struct Reg<'a>(&'a Name);

impl Display for Reg<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "r_{}", self.0)
	}
}

/// Set once the guarded `DEF` of a register has run.
struct Flag<'a>(&'a Name);

impl Display for Flag<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "d_{}", self.0)
	}
}

struct Value<'a>(&'a Operand);

impl Display for Value<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.0 {
			Operand::Literal(value) => write!(f, "{value}"),
			Operand::Register(name) => write!(f, "{}", Reg(name)),
		}
	}
}

fn write_jump(
	w: &mut dyn Write,
	tab: Tab,
	index: usize,
	jump: Jump,
	condition: &Operand,
	offset: &Operand,
) -> Result<()> {
	writeln!(w, "if {} ~= 0 then", Value(condition))?;

	match jump {
		Jump::Line(target) => writeln!(w, "{}goto line_{target}", tab.add())?,
		Jump::Halt => writeln!(w, "{}goto halt", tab.add())?,
		Jump::Computed => {
			writeln!(w, "{}target = {index} + {}", tab.add(), Value(offset))?;
			writeln!(w, "{}goto dispatch", tab.add())?;
		}
	}

	writeln!(w, "{tab}end")
}

fn write_insn(w: &mut dyn Write, tab: Tab, plan: &Plan, index: usize, insn: &Instruction) -> Result<()> {
	match insn {
		Instruction::Def { name, value } => {
			if plan.is_guarded(index) {
				writeln!(w, "if {} then", Flag(name))?;
				writeln!(w, "{}os.exit({})", tab.add(), status::FAILURE)?;
				writeln!(w, "{tab}end")?;
				writeln!(w, "{tab}{} = true", Flag(name))?;
				write!(w, "{tab}")?;
			}

			writeln!(w, "{} = {value}", Reg(name))
		}
		Instruction::Cpy { from, to } => writeln!(w, "{} = {}", Reg(to), Value(from)),
		Instruction::Inc { register } => writeln!(w, "{0} = wrap({0} + 1)", Reg(register)),
		Instruction::Dec { register } => writeln!(w, "{0} = wrap({0} - 1)", Reg(register)),
		Instruction::Inct { register, amount } => {
			writeln!(w, "{0} = wrap({0} + {1})", Reg(register), Value(amount))
		}
		Instruction::Dect { register, amount } => {
			writeln!(w, "{0} = wrap({0} - {1})", Reg(register), Value(amount))
		}
		Instruction::Mul { lhs, rhs, result } => {
			writeln!(w, "{} = wrap({} * {})", Reg(result), Value(lhs), Value(rhs))
		}
		Instruction::Div { lhs, rhs, result } => {
			writeln!(w, "{} = div({}, {})", Reg(result), Value(lhs), Value(rhs))
		}
		Instruction::Jnz { condition, offset } => {
			write_jump(w, tab, index, plan.jump(index, offset), condition, offset)
		}
		Instruction::Outn { value } => {
			writeln!(w, "io.write(string.format(\"%d\\n\", {}))", Value(value))
		}
		Instruction::Outc { value } => writeln!(w, "outc({})", Value(value)),
	}
}

// An `if` chain rather than a table of closures, since `goto` cannot leave a function.
fn write_dispatch(w: &mut dyn Write, tab: Tab, len: usize) -> Result<()> {
	writeln!(w, "{tab}goto halt")?;
	writeln!(w, "::dispatch::")?;

	for index in 0..len {
		let keyword = if index == 0 { "if" } else { "elseif" };

		writeln!(w, "{tab}{keyword} target == {index} then")?;
		writeln!(w, "{}goto line_{index}", tab.add())?;
	}

	if len != 0 {
		writeln!(w, "{tab}end")?;
	}

	Ok(())
}

/// Writes a Lua 5.3 chunk equivalent to `program`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write(writer: &mut dyn Write, program: &Program, plan: &Plan, indent: Indent) -> Result<()> {
	let tab = Tab::new(indent, 0);

	writeln!(writer, "{}", helpers(tab))?;

	for (name, value) in plan.registers() {
		writeln!(writer, "local {} = {value}", Reg(name))?;
	}

	for name in plan.guards() {
		writeln!(writer, "local {} = false", Flag(name))?;
	}

	if plan.needs_dispatch() {
		writeln!(writer, "local target = 0")?;
	}

	for (index, insn) in program.instructions().iter().enumerate() {
		if plan.is_labelled(index) {
			writeln!(writer, "::line_{index}::")?;
		}

		write_insn(writer, tab, plan, index, insn)?;
	}

	if plan.needs_dispatch() {
		write_dispatch(writer, tab, program.len())?;
	}

	if plan.needs_halt() {
		writeln!(writer, "::halt::")?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::{
		codegen::{indent::Indent, plan::Plan},
		machine::registers::Redefinition,
		syntax::parser::parse_program,
	};

	fn generate(source: &str, indent: Indent) -> String {
		generate_with(source, indent, Redefinition::Reset)
	}

	fn generate_with(source: &str, indent: Indent, redefinition: Redefinition) -> String {
		let program = parse_program(source).unwrap();
		let plan = Plan::new(&program, redefinition).unwrap();
		let mut buffer = Vec::new();

		super::write(&mut buffer, &program, &plan, indent).unwrap();

		String::from_utf8(buffer).unwrap()
	}

	#[test]
	fn declares_registers_as_locals() {
		let code = generate("def a 5\ndef b 0\nmul a a b\noutn b", Indent::Tabs);

		assert!(code.contains("local r_a = 5\nlocal r_b = 0\nr_a = 5\nr_b = 0\nr_b = wrap(r_a * r_a)\n"));
		assert!(code.contains("io.write(string.format(\"%d\\n\", r_b))\n"));
		assert!(!code.contains("::halt::"));
	}

	#[test]
	fn computed_jumps_use_guarded_chain() {
		let code = generate("def a 1\ndef off 1\njnz a off\noutc 65\noutc 66", Indent::Spaces(2));

		assert!(code.contains("if r_a ~= 0 then\n  target = 2 + r_off\n  goto dispatch\nend\n"));
		assert!(code.contains("goto halt\n::dispatch::\nif target == 0 then\n  goto line_0\nelseif target == 1 then\n"));
		assert!(code.contains("elseif target == 4 then\n  goto line_4\nend\n::halt::\n"));
	}

	#[test]
	fn negative_operands_do_not_form_comments() {
		let code = generate("def a 0\ndect a -5", Indent::Tabs);

		assert!(code.contains("r_a = wrap(r_a - -5)"));
	}

	#[test]
	fn rejected_redefinition_is_checked_at_run_time() {
		let code = generate_with("outc 62\ndef a 1\njnz a -1", Indent::Tabs, Redefinition::Reject);

		assert!(code.contains("local d_a = false\n"));
		assert!(code.contains("::line_1::\nif d_a then\n\tos.exit(1)\nend\nd_a = true\nr_a = 1\n"));
	}
}
