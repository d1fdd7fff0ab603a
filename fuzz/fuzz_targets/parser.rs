#![no_main]

use assembunny::syntax::parser::parse_program;
use assembunny_fuzz::source_text::SourceText;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: SourceText| {
	if let Ok(program) = parse_program(&source) {
		let reparsed = parse_program(&program.to_string()).expect("printed programs parse");

		assert_eq!(program, reparsed);
	}
});
