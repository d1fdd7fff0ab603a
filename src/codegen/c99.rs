use std::io::{Result, Write};

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

static HEADERS: &[&str] = &["inttypes.h", "stdint.h", "stdio.h", "stdlib.h"];

static WRAP: &str = "static int32_t asmb_wrap(int64_t value) {
	return (int32_t)(uint32_t)(uint64_t)value;
}
";

fn div_helper() -> String {
	format!(
		"static int32_t asmb_div(int32_t lhs, int32_t rhs) {{
	if (rhs == 0) {{
		exit({});
	}}

	if (lhs == INT32_MIN && rhs == -1) {{
		return INT32_MIN;
	}}

	return lhs / rhs;
}}
",
		status::DIVISION_BY_ZERO
	)
}

fn outc_helper() -> String {
	format!(
		"static void asmb_outc(int32_t value) {{
	if (value < 0 || value > 0x10FFFF || (value >= 0xD800 && value <= 0xDFFF)) {{
		exit({});
	}}

	if (value < 0x80) {{
		putchar(value);
	}} else if (value < 0x800) {{
		putchar(0xC0 | (value >> 6));
		putchar(0x80 | (value & 0x3F));
	}} else if (value < 0x10000) {{
		putchar(0xE0 | (value >> 12));
		putchar(0x80 | ((value >> 6) & 0x3F));
		putchar(0x80 | (value & 0x3F));
	}} else {{
		putchar(0xF0 | (value >> 18));
		putchar(0x80 | ((value >> 12) & 0x3F));
		putchar(0x80 | ((value >> 6) & 0x3F));
		putchar(0x80 | (value & 0x3F));
	}}
}}
",
		status::INVALID_CODE_POINT
	)
}

struct Reg<'a>(&'a Name);

impl std::fmt::Display for Reg<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "r_{}", self.0)
	}
}

/// Set once the guarded `DEF` of a register has run.
struct Flag<'a>(&'a Name);

impl std::fmt::Display for Flag<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "d_{}", self.0)
	}
}

struct Value<'a>(&'a Operand);

impl std::fmt::Display for Value<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.0 {
			// `-2147483648` is a negated `long` in C, not an `int32_t` literal.
			Operand::Literal(i32::MIN) => f.write_str("INT32_MIN"),
			Operand::Literal(value) => write!(f, "{value}"),
			Operand::Register(name) => write!(f, "{}", Reg(name)),
		}
	}
}

fn write_jump(w: &mut dyn Write, tab: Tab, index: usize, jump: Jump, condition: &Operand, offset: &Operand) -> Result<()> {
	let condition = Value(condition);

	match jump {
		Jump::Line(target) => writeln!(w, "if ({condition} != 0) goto asmb_line_{target};"),
		Jump::Halt => writeln!(w, "if ({condition} != 0) goto asmb_halt;"),
		Jump::Computed => {
			writeln!(w, "if ({condition} != 0) {{")?;
			writeln!(w, "{}asmb_target = (int64_t){index} + {};", tab.add(), Value(offset))?;
			writeln!(w, "{}goto asmb_dispatch;", tab.add())?;
			writeln!(w, "{tab}}}")
		}
	}
}

fn write_insn(w: &mut dyn Write, tab: Tab, plan: &Plan, index: usize, insn: &Instruction) -> Result<()> {
	match insn {
		Instruction::Def { name, value } => {
			if plan.is_guarded(index) {
				writeln!(w, "if ({}) exit({});", Flag(name), status::FAILURE)?;
				writeln!(w, "{tab}{} = 1;", Flag(name))?;
				write!(w, "{tab}")?;
			}

			writeln!(w, "{} = {};", Reg(name), Value(&Operand::Literal(*value)))
		}
		Instruction::Cpy { from, to } => writeln!(w, "{} = {};", Reg(to), Value(from)),
		Instruction::Inc { register } => {
			writeln!(w, "{0} = asmb_wrap((int64_t){0} + 1);", Reg(register))
		}
		Instruction::Dec { register } => {
			writeln!(w, "{0} = asmb_wrap((int64_t){0} - 1);", Reg(register))
		}
		Instruction::Inct { register, amount } => {
			writeln!(w, "{0} = asmb_wrap((int64_t){0} + {1});", Reg(register), Value(amount))
		}
		Instruction::Dect { register, amount } => {
			writeln!(w, "{0} = asmb_wrap((int64_t){0} - {1});", Reg(register), Value(amount))
		}
		Instruction::Mul { lhs, rhs, result } => writeln!(
			w,
			"{} = asmb_wrap((int64_t){} * {});",
			Reg(result),
			Value(lhs),
			Value(rhs)
		),
		Instruction::Div { lhs, rhs, result } => writeln!(
			w,
			"{} = asmb_div({}, {});",
			Reg(result),
			Value(lhs),
			Value(rhs)
		),
		Instruction::Jnz { condition, offset } => {
			write_jump(w, tab, index, plan.jump(index, offset), condition, offset)
		}
		Instruction::Outn { value } => {
			writeln!(w, "printf(\"%\" PRId32 \"\\n\", {});", Value(value))
		}
		Instruction::Outc { value } => writeln!(w, "asmb_outc({});", Value(value)),
	}
}

fn write_dispatch(w: &mut dyn Write, tab: Tab, len: usize) -> Result<()> {
	writeln!(w, "{tab}goto asmb_halt;")?;
	writeln!(w, "asmb_dispatch:")?;
	writeln!(w, "{tab}switch (asmb_target) {{")?;

	for index in 0..len {
		writeln!(w, "{tab}case {index}: goto asmb_line_{index};")?;
	}

	writeln!(w, "{tab}default: break;")?;
	writeln!(w, "{tab}}}")
}

fn write_entry(w: &mut dyn Write, tab: Tab, program: &Program, plan: &Plan) -> Result<()> {
	for (name, value) in plan.registers() {
		writeln!(w, "{tab}int32_t {} = {};", Reg(name), Value(&Operand::Literal(value)))?;
	}

	for name in plan.guards() {
		writeln!(w, "{tab}int {} = 0;", Flag(name))?;
	}

	if plan.needs_dispatch() {
		writeln!(w, "{tab}int64_t asmb_target = 0;")?;
	}

	for (index, insn) in program.instructions().iter().enumerate() {
		if plan.is_labelled(index) {
			writeln!(w, "asmb_line_{index}:")?;
		}

		write!(w, "{tab}")?;
		write_insn(w, tab, plan, index, insn)?;
	}

	if plan.needs_dispatch() {
		write_dispatch(w, tab, program.len())?;
	}

	if plan.needs_halt() {
		writeln!(w, "asmb_halt:")?;
	}

	writeln!(w, "{tab}return 0;")
}

/// Writes a C99 translation unit equivalent to `program`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write(writer: &mut dyn Write, program: &Program, plan: &Plan, indent: Indent) -> Result<()> {
	let uses = |f: fn(&Instruction) -> bool| program.instructions().iter().any(f);
	let wraps = |insn: &Instruction| {
		matches!(
			insn,
			Instruction::Inc { .. }
				| Instruction::Dec { .. }
				| Instruction::Inct { .. }
				| Instruction::Dect { .. }
				| Instruction::Mul { .. }
		)
	};

	for header in HEADERS {
		writeln!(writer, "#include <{header}>")?;
	}

	writeln!(writer)?;

	if uses(wraps) {
		writeln!(writer, "{WRAP}")?;
	}

	if uses(|insn| matches!(insn, Instruction::Div { .. })) {
		writeln!(writer, "{}", div_helper())?;
	}

	if uses(|insn| matches!(insn, Instruction::Outc { .. })) {
		writeln!(writer, "{}", outc_helper())?;
	}

	writeln!(writer, "int main(void) {{")?;

	write_entry(writer, Tab::new(indent, 1), program, plan)?;

	writeln!(writer, "}}")
}
