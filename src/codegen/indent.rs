use std::fmt::{Display, Formatter, Result};

/// Characters used for one level of indentation in generated code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Indent {
	#[default]
	Tabs,
	Spaces(u8),
}

#[derive(Clone, Copy)]
pub struct Tab {
	indent: Indent,
	len: usize,
}

impl Tab {
	pub const fn new(indent: Indent, len: usize) -> Self {
		Self { indent, len }
	}

	pub const fn add(self) -> Self {
		Self::new(self.indent, self.len + 1)
	}
}

impl Display for Tab {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		let unit = match self.indent {
			Indent::Tabs => 1,
			Indent::Spaces(count) => usize::from(count),
		};
		let c = match self.indent {
			Indent::Tabs => '\t',
			Indent::Spaces(_) => ' ',
		};

		std::iter::repeat_with(|| write!(f, "{c}"))
			.take(self.len * unit)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::{Indent, Tab};

	#[test]
	fn renders_levels() {
		assert_eq!(Tab::new(Indent::Tabs, 0).to_string(), "");
		assert_eq!(Tab::new(Indent::Tabs, 1).add().to_string(), "\t\t");
		assert_eq!(Tab::new(Indent::Spaces(4), 1).add().to_string(), "        ");
	}
}
