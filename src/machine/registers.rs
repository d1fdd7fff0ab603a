use std::collections::HashMap;

use crate::{
	error::ErrorKind,
	syntax::{instruction::Operand, name::Name},
};

/// What a second `DEF` of an already declared register does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Redefinition {
	/// Assign the new value as if by `CPY`.
	#[default]
	Reset,
	/// Fail with `DuplicateDefinition`.
	Reject,
}

/// Named integer cells, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registers {
	lookup: HashMap<Name, usize>,
	names: Vec<Name>,
	values: Vec<i32>,
}

impl Registers {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.values.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.lookup.contains_key(name)
	}

	/// # Errors
	///
	/// Returns `DuplicateDefinition` if `name` exists and the policy is `Reject`.
	pub fn define(&mut self, name: &Name, value: i32, policy: Redefinition) -> Result<(), ErrorKind> {
		match (self.lookup.get(name), policy) {
			(Some(_), Redefinition::Reject) => Err(ErrorKind::DuplicateDefinition(name.clone())),
			(Some(&index), Redefinition::Reset) => {
				self.values[index] = value;

				Ok(())
			}
			(None, _) => {
				self.lookup.insert(name.clone(), self.values.len());
				self.names.push(name.clone());
				self.values.push(value);

				Ok(())
			}
		}
	}

	fn slot(&self, name: &Name) -> Result<usize, ErrorKind> {
		self.lookup
			.get(name)
			.copied()
			.ok_or_else(|| ErrorKind::UndeclaredRegister(name.clone()))
	}

	/// # Errors
	///
	/// Returns `UndeclaredRegister` if `name` was never defined.
	pub fn get(&self, name: &Name) -> Result<i32, ErrorKind> {
		self.slot(name).map(|index| self.values[index])
	}

	/// # Errors
	///
	/// Returns `UndeclaredRegister` if `name` was never defined.
	pub fn set(&mut self, name: &Name, value: i32) -> Result<(), ErrorKind> {
		let index = self.slot(name)?;

		self.values[index] = value;

		Ok(())
	}

	/// Applies `f` to the current value in place.
	///
	/// # Errors
	///
	/// Returns `UndeclaredRegister` if `name` was never defined.
	pub fn update<F>(&mut self, name: &Name, f: F) -> Result<(), ErrorKind>
	where
		F: FnOnce(i32) -> i32,
	{
		let index = self.slot(name)?;

		self.values[index] = f(self.values[index]);

		Ok(())
	}

	/// # Errors
	///
	/// Returns `UndeclaredRegister` if the operand names an unknown register.
	pub fn resolve(&self, operand: &Operand) -> Result<i32, ErrorKind> {
		match operand {
			Operand::Literal(value) => Ok(*value),
			Operand::Register(name) => self.get(name),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Name, i32)> + '_ {
		self.names.iter().zip(self.values.iter().copied())
	}
}
