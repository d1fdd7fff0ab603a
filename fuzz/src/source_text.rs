use std::ops::Deref;

use arbitrary::{Arbitrary, Result, Unstructured};

#[derive(Arbitrary)]
enum Token {
	Keyword(u8),
	Name(u8),
	Integer(i32),
	Space,
	Newline,
}

static KEYWORDS: &[&str] = &[
	"def", "CPY", "inc", "Dec", "inct", "dect", "mul", "div", "jnz", "outn", "outc", "tgl", "out",
];

static NAMES: &[&str] = &["a", "b", "_c", "d1", "__x", "9z", "a-b"];

/// Source-like text built from keywords, names, integers and whitespace.
#[derive(Debug)]
pub struct SourceText {
	content: String,
}

impl Arbitrary<'_> for SourceText {
	fn arbitrary(u: &mut Unstructured) -> Result<Self> {
		let len = u.arbitrary_len::<Token>()?;
		let mut content = String::new();

		for _ in 0..len {
			match Token::arbitrary(u)? {
				Token::Keyword(i) => content.push_str(KEYWORDS[usize::from(i) % KEYWORDS.len()]),
				Token::Name(i) => content.push_str(NAMES[usize::from(i) % NAMES.len()]),
				Token::Integer(value) => content.push_str(&value.to_string()),
				Token::Space => content.push(' '),
				Token::Newline => content.push('\n'),
			}
		}

		Ok(Self { content })
	}
}

impl Deref for SourceText {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.content
	}
}
