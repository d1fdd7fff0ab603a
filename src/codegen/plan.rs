use std::collections::HashSet;

use crate::{
	error::{ErrorKind, Fault},
	machine::registers::{Redefinition, Registers},
	syntax::{
		instruction::{Instruction, Operand, Program},
		name::Name,
	},
};

/// Where a `JNZ` transfers control when its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
	/// A statically known instruction index.
	Line(usize),
	/// A statically known target outside the program.
	Halt,
	/// The offset is a register, so the target is only known at run time.
	Computed,
}

impl Jump {
	/// Whether taking this jump may bring control back to `index` or earlier.
	const fn may_reach(self, index: usize) -> bool {
		match self {
			Self::Line(target) => target <= index,
			Self::Halt => false,
			Self::Computed => true,
		}
	}
}

/// Static facts about a program that every backend needs.
#[derive(Debug)]
pub struct Plan {
	len: usize,
	registers: Registers,
	guarded: Vec<bool>,
	guards: Vec<Name>,
	labelled: Vec<bool>,
	halts: bool,
	computed: bool,
}

fn static_target(index: usize, offset: i32, len: usize) -> Jump {
	let target = index as i64 + i64::from(offset);

	usize::try_from(target)
		.ok()
		.filter(|&target| target < len)
		.map_or(Jump::Halt, Jump::Line)
}

fn jump_of(index: usize, offset: &Operand, len: usize) -> Jump {
	match offset {
		Operand::Literal(offset) => static_target(index, *offset, len),
		Operand::Register(_) => Jump::Computed,
	}
}

impl Plan {
	/// Checks that every register is certainly defined before it is used and
	/// resolves every jump that can be resolved statically.
	///
	/// Control runs straight through the program until the first `JNZ`, so only the
	/// definitions before it are known to have run by the time anything after them
	/// executes. A register defined later can be assigned but never read.
	///
	/// # Errors
	///
	/// Returns `UndeclaredRegister` for a use not preceded by such a definition, and
	/// `DuplicateDefinition` for a second `DEF` when redefinition is rejected.
	pub fn new(program: &Program, redefinition: Redefinition) -> Result<Self, Fault> {
		let len = program.len();
		let mut registers = Registers::new();
		let mut declared: HashSet<&Name> = HashSet::new();
		let mut jumps = Vec::new();
		let mut labelled = vec![false; len];
		let mut halts = false;
		let mut computed = false;

		for (index, instruction) in program.instructions().iter().enumerate() {
			let fault = |kind| Fault::new(index, kind);

			if let Some(name) = instruction.uses().into_iter().find(|name| !declared.contains(name)) {
				return Err(fault(ErrorKind::UndeclaredRegister(name.clone())));
			}

			match instruction {
				Instruction::Def { name, value } => {
					// Later definitions are plain assignments; keep the first value.
					if !registers.contains(name.as_str()) || redefinition == Redefinition::Reject {
						registers.define(name, *value, redefinition).map_err(fault)?;
					}

					if jumps.is_empty() {
						declared.insert(name);
					}
				}
				Instruction::Jnz { offset, .. } => {
					let jump = jump_of(index, offset, len);

					match jump {
						Jump::Line(target) => labelled[target] = true,
						Jump::Halt => halts = true,
						Jump::Computed => computed = true,
					}

					jumps.push((index, jump));
				}
				_ => {}
			}
		}

		// A computed jump may land anywhere.
		if computed {
			labelled.fill(true);
		}

		// With redefinition rejected, a `DEF` that control can come back to must
		// fail when it runs again.
		let mut guarded = vec![false; len];
		let mut guards = Vec::new();

		if redefinition == Redefinition::Reject {
			for (index, instruction) in program.instructions().iter().enumerate() {
				let Instruction::Def { name, .. } = instruction else {
					continue;
				};

				if jumps.iter().any(|&(from, jump)| from > index && jump.may_reach(index)) {
					guarded[index] = true;
					guards.push(name.clone());
				}
			}
		}

		log::debug!(
			"planned {len} instructions, {} registers, {} guarded, computed dispatch: {computed}",
			registers.len(),
			guards.len()
		);

		Ok(Self {
			len,
			registers,
			guarded,
			guards,
			labelled,
			halts,
			computed,
		})
	}

	/// Registers with their first declared value, in declaration order.
	pub fn registers(&self) -> impl Iterator<Item = (&Name, i32)> + '_ {
		self.registers.iter()
	}

	/// Where the `JNZ` at `index` with the given offset goes.
	#[must_use]
	pub fn jump(&self, index: usize, offset: &Operand) -> Jump {
		jump_of(index, offset, self.len)
	}

	/// Registers whose definition must be checked at run time, in program order.
	#[must_use]
	pub fn guards(&self) -> &[Name] {
		&self.guards
	}

	/// Whether the `DEF` at `index` must fail when it runs a second time.
	#[must_use]
	pub fn is_guarded(&self, index: usize) -> bool {
		self.guarded.get(index).copied().unwrap_or(false)
	}

	/// Whether some jump may target the instruction at `index`.
	#[must_use]
	pub fn is_labelled(&self, index: usize) -> bool {
		self.labelled.get(index).copied().unwrap_or(false)
	}

	/// Whether the halt label is the target of some jump.
	#[must_use]
	pub const fn needs_halt(&self) -> bool {
		self.halts || self.computed
	}

	/// Whether a run-time dispatch over every instruction index is required.
	#[must_use]
	pub const fn needs_dispatch(&self) -> bool {
		self.computed
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{Jump, Plan};
	use crate::{
		error::{ErrorKind, Fault},
		machine::registers::Redefinition,
		syntax::{
			instruction::{Instruction, Program},
			name::Name,
			parser::parse_program,
		},
	};

	fn plan(source: &str, redefinition: Redefinition) -> Result<Plan, Fault> {
		Plan::new(&parse_program(source).unwrap(), redefinition)
	}

	fn jumps(program: &Program, plan: &Plan) -> Vec<Jump> {
		program
			.instructions()
			.iter()
			.enumerate()
			.filter_map(|(index, instruction)| match instruction {
				Instruction::Jnz { offset, .. } => Some(plan.jump(index, offset)),
				_ => None,
			})
			.collect()
	}

	fn undeclared(index: usize, name: &str) -> Fault {
		Fault::new(index, ErrorKind::UndeclaredRegister(Name::new(name).unwrap()))
	}

	#[test]
	fn resolves_static_jumps() {
		let program = parse_program("def a 3\ndec a\njnz a -1\njnz a 5\njnz 0 -9").unwrap();
		let plan = Plan::new(&program, Redefinition::Reset).unwrap();

		assert_eq!(jumps(&program, &plan), [Jump::Line(1), Jump::Halt, Jump::Halt]);
		assert!(plan.is_labelled(1));
		assert!(!plan.is_labelled(0));
		assert!(plan.needs_halt());
		assert!(!plan.needs_dispatch());
	}

	#[test]
	fn computed_jumps_label_everything() {
		let program = parse_program("def a 1\ndef off 2\njnz a off\noutc 65\noutc 66").unwrap();
		let plan = Plan::new(&program, Redefinition::Reset).unwrap();

		assert_eq!(jumps(&program, &plan), [Jump::Computed]);
		assert!((0..5).all(|index| plan.is_labelled(index)));
		assert!(plan.needs_dispatch());
	}

	#[test]
	fn use_before_definition_fails() {
		let error = plan("def a 1\ncpy a b\ndef b 0", Redefinition::Reset).unwrap_err();

		assert_eq!(error, undeclared(1, "b"));
	}

	#[test]
	fn definitions_after_a_jump_do_not_declare() {
		let skipped = plan("jnz 1 2\ndef a 5\noutn a", Redefinition::Reset).unwrap_err();
		let looped = plan("def n 3\njnz n 2\ndef m 1\ndec n\ncpy m n", Redefinition::Reset).unwrap_err();

		assert_eq!(skipped, undeclared(2, "a"));
		assert_eq!(looped, undeclared(4, "m"));
	}

	#[test]
	fn definitions_after_a_jump_may_assign() {
		let plan = plan("def a 1\njnz a 2\ndef a 7\ndef b 0\noutn a", Redefinition::Reset).unwrap();
		let registers: Vec<_> = plan.registers().map(|(name, value)| (name.as_str(), value)).collect();

		assert_eq!(registers, [("a", 1), ("b", 0)]);
	}

	#[test]
	fn keeps_first_definition_value() {
		let plan = plan("def a 1\ndef b 2\ndef a 9", Redefinition::Reset).unwrap();
		let registers: Vec<_> = plan.registers().map(|(name, value)| (name.as_str(), value)).collect();

		assert_eq!(registers, [("a", 1), ("b", 2)]);
	}

	#[test]
	fn rejected_redefinition_fails() {
		let error = plan("def a 1\ndef a 2", Redefinition::Reject).unwrap_err();

		assert_eq!(error, Fault::new(1, ErrorKind::DuplicateDefinition(Name::new("a").unwrap())));
	}

	#[test]
	fn reentered_definitions_are_guarded_when_rejected() {
		let source = "def a 1\noutn a\ndef b 2\njnz 1 -2\njnz b 2";
		let rejecting = plan(source, Redefinition::Reject).unwrap();
		let resetting = plan(source, Redefinition::Reset).unwrap();

		assert!(rejecting.is_guarded(2));
		assert!(!rejecting.is_guarded(0));
		assert_eq!(rejecting.guards(), [Name::new("b").unwrap()]);
		assert!(!resetting.is_guarded(2));
		assert!(resetting.guards().is_empty());
	}

	#[test]
	fn computed_jumps_guard_every_earlier_definition() {
		let plan = plan("def a 1\ndef b 2\njnz a b\ndef c 3", Redefinition::Reject).unwrap();

		assert!(plan.is_guarded(0));
		assert!(plan.is_guarded(1));
		assert!(!plan.is_guarded(3));
	}
}
