#![no_main]

use assembunny::{
	bytecode,
	machine::engine::{run, Config},
};
use assembunny_fuzz::structured_program::StructuredProgram;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|program: StructuredProgram| {
	let config = Config {
		step_limit: Some(10_000),
		..Config::default()
	};

	let direct = run(&program, config);
	let decoded = bytecode::decode(&bytecode::encode(&program)).expect("encoded programs decode");

	assert_eq!(run(&decoded, config), direct);
});
