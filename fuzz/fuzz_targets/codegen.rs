#![no_main]

use assembunny::codegen::{generate, Options, Target};
use assembunny_fuzz::structured_program::StructuredProgram;
use libfuzzer_sys::{fuzz_target, Corpus};

fuzz_target!(|program: StructuredProgram| -> Corpus {
	for target in [Target::C, Target::Lua] {
		let Ok(first) = generate(&program, target, Options::default()) else {
			return Corpus::Reject;
		};
		let second = generate(&program, target, Options::default()).expect("generation is deterministic");

		assert_eq!(first, second);
	}

	Corpus::Keep
});
