use assembunny::{
	codegen::{generate, Options, Target},
	error::{ErrorKind, Fault},
	machine::{
		engine::{run, Config, Status},
		registers::Redefinition,
	},
	syntax::{instruction::Program, name::Name, parser::parse_program},
};
use pretty_assertions::assert_eq;

fn program(lines: &[&str]) -> Program {
	parse_program(&lines.join("\n")).unwrap()
}

fn name(text: &str) -> Name {
	Name::new(text).unwrap()
}

#[test]
fn increments_then_prints() {
	let execution = run(&program(&["DEF a 0", "INC a", "INC a", "OUTN a"]), Config::default());

	assert_eq!(execution.status, Status::Halted);
	assert_eq!(execution.output, "2\n");
}

#[test]
fn multiplies_into_destination() {
	let execution = run(&program(&["DEF a 5", "DEF b 0", "MUL a a b", "OUTN b"]), Config::default());

	assert_eq!(execution.status, Status::Halted);
	assert_eq!(execution.output, "25\n");
}

#[test]
fn division_by_zero_fails_at_its_index() {
	let execution = run(&program(&["DEF a 3", "DEF b 0", "DIV a b b"]), Config::default());

	assert_eq!(execution.status, Status::Failed(Fault::new(2, ErrorKind::DivisionByZero)));
	assert_eq!(execution.output, "");
}

#[test]
fn backward_jump_needs_a_step_limit() {
	let config = Config {
		step_limit: Some(1_000),
		..Config::default()
	};
	let execution = run(&program(&["DEF a 2", "DEF b -2", "JNZ a b", "OUTN a"]), config);

	assert_eq!(execution.status, Status::Exhausted { steps: 1_000 });
	assert_eq!(execution.output, "");
}

#[test]
fn computed_jump_is_relative_to_itself() {
	let skip = program(&["DEF a 1", "DEF off 2", "JNZ a off", "OUTC 65", "OUTC 66"]);
	let next = program(&["DEF a 1", "DEF off 1", "JNZ a off", "OUTC 65", "OUTC 66"]);

	assert_eq!(run(&skip, Config::default()).output, "B");
	assert_eq!(run(&next, Config::default()).output, "AB");

	assert!(generate(&skip, Target::C, Options::default())
		.unwrap()
		.contains("asmb_target = (int64_t)2 + r_off;"));
	assert!(generate(&skip, Target::Lua, Options::default())
		.unwrap()
		.contains("target = 2 + r_off"));
}

#[test]
fn skipped_definition_fails_everywhere() {
	let source = program(&["JNZ 1 2", "DEF a 5", "OUTN a"]);
	let expected = Fault::new(2, ErrorKind::UndeclaredRegister(name("a")));
	let execution = run(&source, Config::default());

	assert_eq!(execution.status, Status::Failed(expected.clone()));
	assert_eq!(execution.output, "");

	for target in [Target::C, Target::Lua] {
		assert_eq!(generate(&source, target, Options::default()), Err(expected.clone()));
	}
}

#[test]
fn reentered_definition_fails_when_rejected() {
	let source = program(&["DEF a 1", "OUTN a", "JNZ 1 -2"]);
	let execution = run(
		&source,
		Config {
			redefinition: Redefinition::Reject,
			..Config::default()
		},
	);
	let options = Options {
		redefinition: Redefinition::Reject,
		..Options::default()
	};

	assert_eq!(
		execution.status,
		Status::Failed(Fault::new(0, ErrorKind::DuplicateDefinition(name("a"))))
	);
	assert_eq!(execution.output, "1\n");
	assert!(generate(&source, Target::C, options)
		.unwrap()
		.contains("if (d_a) exit(1);"));
	assert!(generate(&source, Target::Lua, options)
		.unwrap()
		.contains("if d_a then"));
}

#[test]
fn undeclared_register_fails_everywhere() {
	let source = program(&["DEF a 1", "OUTN a", "INCT a b"]);
	let expected = Fault::new(2, ErrorKind::UndeclaredRegister(name("b")));

	assert_eq!(run(&source, Config::default()).status, Status::Failed(expected.clone()));

	for target in [Target::C, Target::Lua] {
		assert_eq!(generate(&source, target, Options::default()), Err(expected.clone()));
	}
}

#[test]
fn redeclaration_resets_or_fails() {
	let source = program(&["DEF a 1", "INC a", "DEF a 10", "OUTN a"]);
	let reject = Redefinition::Reject;

	assert_eq!(run(&source, Config::default()).output, "10\n");

	let rejected = run(
		&source,
		Config {
			redefinition: reject,
			..Config::default()
		},
	);
	let expected = Fault::new(2, ErrorKind::DuplicateDefinition(name("a")));

	assert_eq!(rejected.status, Status::Failed(expected.clone()));
	assert_eq!(rejected.output, "");
	assert_eq!(
		generate(
			&source,
			Target::C,
			Options {
				redefinition: reject,
				..Options::default()
			}
		),
		Err(expected)
	);
	assert!(generate(&source, Target::C, Options::default())
		.unwrap()
		.contains("\tr_a = 10;\n"));
}

#[test]
fn countdown_loop_prints_each_value() {
	let source = program(&["def n 3", "outn n", "dec n", "jnz n -2", "outc 33"]);

	assert_eq!(run(&source, Config::default()).output, "3\n2\n1\n!");
}
