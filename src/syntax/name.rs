use std::{
	borrow::Borrow,
	fmt::{Display, Formatter},
};

/// Reasons a token cannot name a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
	#[error("register name is empty")]
	Empty,

	#[error("forbidden character `{0}` in register name")]
	ForbiddenCharacter(char),

	#[error("register name starts with a digit")]
	LeadingDigit,

	// Leading `__` is left to the toolchain.
	#[error("register name starts with two underscores")]
	ReservedPrefix,
}

/// A validated, case-sensitive register name made of ASCII letters, digits and
/// underscores, not starting with a digit or with `__`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Box<str>);

impl Name {
	/// # Errors
	///
	/// Returns the first rule the candidate breaks.
	pub fn new(candidate: &str) -> Result<Self, NameError> {
		let first = candidate.chars().next().ok_or(NameError::Empty)?;

		if let Some(c) = candidate
			.chars()
			.find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
		{
			return Err(NameError::ForbiddenCharacter(c));
		}

		if first.is_ascii_digit() {
			return Err(NameError::LeadingDigit);
		}

		if candidate.starts_with("__") {
			return Err(NameError::ReservedPrefix);
		}

		Ok(Self(candidate.into()))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Name {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl Display for Name {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
