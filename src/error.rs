use crate::syntax::name::Name;

/// Process status shared by the binary and by generated programs.
pub mod status {
	pub const FAILURE: i32 = 1;
	pub const STEP_LIMIT: i32 = 2;
	pub const DIVISION_BY_ZERO: i32 = 3;
	pub const INVALID_CODE_POINT: i32 = 4;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
	#[error("register `{0}` is not declared")]
	UndeclaredRegister(Name),

	#[error("register `{0}` is already declared")]
	DuplicateDefinition(Name),

	#[error("division by zero")]
	DivisionByZero,

	#[error("{0} is not a character code point")]
	InvalidCodePoint(i32),
}

impl ErrorKind {
	#[must_use]
	pub const fn exit_status(&self) -> i32 {
		match self {
			Self::DivisionByZero => status::DIVISION_BY_ZERO,
			Self::InvalidCodePoint(_) => status::INVALID_CODE_POINT,
			Self::UndeclaredRegister(_) | Self::DuplicateDefinition(_) => status::FAILURE,
		}
	}
}

/// An error raised by the instruction at `index`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("instruction {index}: {kind}")]
pub struct Fault {
	pub index: usize,
	pub kind: ErrorKind,
}

impl Fault {
	#[must_use]
	pub const fn new(index: usize, kind: ErrorKind) -> Self {
		Self { index, kind }
	}
}
