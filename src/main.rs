use std::{
	fs::File,
	io::{BufWriter, Read, Write},
	process::ExitCode,
};

use argh::FromArgs;
use assembunny::{
	bytecode,
	codegen::{self, indent::Indent, Options, Target},
	error::status,
	machine::{
		engine::{Config, Machine, Status},
		registers::Redefinition,
	},
	repl,
	syntax::{instruction::Program, parser::parse_program},
};

/// An interpreter, bytecode converter and C/Lua compiler for Assembunny+.
#[derive(FromArgs)]
struct Arguments {
	/// what to do with the program,
	/// one of: `run`, `c`, `lua`, `bytecode`, `repl`
	#[argh(positional)]
	command: String,

	/// the input file to read
	/// if not specified, stdin is used
	#[argh(option, short = 'i')]
	input: Option<String>,

	/// the output file to write to
	/// if not specified, stdout is used
	#[argh(option, short = 'o')]
	output: Option<String>,

	/// whether the input is bytecode rather than source text
	#[argh(switch, short = 'b')]
	bytecode: bool,

	/// stop `run` after this many instructions
	#[argh(option)]
	step_limit: Option<u64>,

	/// whether a second `def` of a register is an error instead of an assignment
	#[argh(switch)]
	reject_redefinition: bool,

	/// indent generated code with this many spaces instead of tabs
	#[argh(option)]
	spaces: Option<u8>,
}

impl Arguments {
	fn redefinition(&self) -> Redefinition {
		if self.reject_redefinition {
			Redefinition::Reject
		} else {
			Redefinition::Reset
		}
	}

	fn indent(&self) -> Indent {
		self.spaces.map_or(Indent::Tabs, Indent::Spaces)
	}
}

fn load_input(name: Option<&str>) -> Vec<u8> {
	let mut buffer = Vec::new();

	if let Some(name) = name {
		buffer = std::fs::read(name).expect("failed to read input file");
	} else {
		std::io::stdin()
			.lock()
			.read_to_end(&mut buffer)
			.expect("failed to read stdin");
	}

	buffer
}

fn load_output(name: Option<&str>) -> Box<dyn Write> {
	if let Some(name) = name {
		let file = File::create(name).expect("failed to open output file");

		Box::new(BufWriter::new(file))
	} else {
		Box::new(std::io::stdout().lock())
	}
}

fn load_program(arguments: &Arguments) -> Result<Program, String> {
	let input = load_input(arguments.input.as_deref());

	if arguments.bytecode {
		bytecode::decode(&input).map_err(|error| error.to_string())
	} else {
		let source = String::from_utf8(input).map_err(|_| "input is not UTF-8".to_owned())?;

		parse_program(&source).map_err(|error| error.to_string())
	}
}

fn run_program(program: &Program, arguments: &Arguments, output: &mut dyn Write) -> ExitCode {
	let config = Config {
		step_limit: arguments.step_limit,
		redefinition: arguments.redefinition(),
	};
	let mut machine = Machine::new(program, config);
	let status = machine.run_with(output).expect("failed to write output");

	let code = match status {
		Status::Halted => 0,
		Status::Failed(fault) => {
			log::error!("{fault}");

			fault.kind.exit_status()
		}
		Status::Exhausted { steps } => {
			log::error!("step limit exhausted after {steps} steps");

			status::STEP_LIMIT
		}
	};

	exit_code(code)
}

fn generate(program: &Program, arguments: &Arguments, target: Target, output: &mut dyn Write) -> ExitCode {
	let options = Options {
		indent: arguments.indent(),
		redefinition: arguments.redefinition(),
	};

	match codegen::write(output, program, target, options) {
		Ok(()) => ExitCode::SUCCESS,
		Err(codegen::Error::Fault(fault)) => {
			log::error!("{fault}");

			exit_code(status::FAILURE)
		}
		Err(codegen::Error::Io(error)) => panic!("failed to write output: {error}"),
	}
}

fn exit_code(code: i32) -> ExitCode {
	u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let arguments = argh::from_env::<Arguments>();

	if arguments.command == "repl" {
		let stdin = std::io::stdin();
		let mut input = stdin.lock();
		let output = &mut load_output(arguments.output.as_deref());

		repl::run(&mut input, output, arguments.redefinition()).expect("failed to run shell");

		return ExitCode::SUCCESS;
	}

	let program = match load_program(&arguments) {
		Ok(program) => program,
		Err(error) => {
			log::error!("{error}");

			return ExitCode::FAILURE;
		}
	};

	log::info!("loaded {} instructions", program.len());

	let output = &mut load_output(arguments.output.as_deref());

	let code = match arguments.command.as_str() {
		"run" => run_program(&program, &arguments, output),
		"c" => generate(&program, &arguments, Target::C, output),
		"lua" => generate(&program, &arguments, Target::Lua, output),
		"bytecode" => {
			output
				.write_all(&bytecode::encode(&program))
				.expect("failed to write output");

			ExitCode::SUCCESS
		}
		command => panic!("unsupported command `{command}`"),
	};

	output.flush().expect("failed to flush output");

	code
}
