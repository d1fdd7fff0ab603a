//! Binary program format.
//!
//! A file starts with a 32-byte header: the register count as a big-endian `u32`
//! followed by 28 reserved zero bytes. The rest is a sequence of 5-byte blobs, each
//! a kind byte and a big-endian `i32`. Every instruction starts with a keyword blob
//! holding the opcode number; its operands follow as register or literal blobs.
//! Register names are not stored: registers are numbered by first appearance and
//! come back as `r0`, `r1`, ...

use std::collections::HashMap;

use crate::syntax::{
	instruction::{Instruction, Opcode, Operand, Program},
	name::Name,
};

pub const HEADER_LEN: usize = 32;
pub const BLOB_LEN: usize = 5;

const KEYWORD: u8 = 0;
const REGISTER: u8 = 1;
const LITERAL: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BytecodeError {
	#[error("header is {0} bytes, expected {HEADER_LEN}")]
	TruncatedHeader(usize),

	#[error("blob at byte {0} is truncated")]
	TruncatedBlob(usize),

	#[error("blob at byte {offset} has unknown kind {kind}")]
	UnknownKind { offset: usize, kind: u8 },

	#[error("blob at byte {offset} has unknown opcode {number}")]
	UnknownOpcode { offset: usize, number: i32 },

	#[error("first blob is not a keyword")]
	MissingKeyword,

	#[error("blob at byte {offset} refers to register {index} of {count}")]
	RegisterOutOfRange { offset: usize, index: i32, count: u32 },

	#[error("operands of instruction {index} do not fit `{opcode}`")]
	Operands { index: usize, opcode: Opcode },
}

fn push_blob(buffer: &mut Vec<u8>, kind: u8, data: i32) {
	buffer.push(kind);
	buffer.extend_from_slice(&data.to_be_bytes());
}

/// Serializes `program`. Every program can be encoded, valid or not.
#[must_use]
pub fn encode(program: &Program) -> Vec<u8> {
	let mut numbers: HashMap<Name, i32> = HashMap::new();
	let mut body = Vec::new();

	for instruction in program.instructions() {
		push_blob(&mut body, KEYWORD, instruction.opcode().number().into());

		for operand in instruction.operands() {
			match operand {
				Operand::Literal(value) => push_blob(&mut body, LITERAL, value),
				Operand::Register(name) => {
					let next = i32::try_from(numbers.len()).unwrap_or(i32::MAX);
					let number = *numbers.entry(name).or_insert(next);

					push_blob(&mut body, REGISTER, number);
				}
			}
		}
	}

	let count = u32::try_from(numbers.len()).unwrap_or(u32::MAX);
	let mut buffer = Vec::with_capacity(HEADER_LEN + body.len());

	buffer.extend_from_slice(&count.to_be_bytes());
	buffer.resize(HEADER_LEN, 0);
	buffer.append(&mut body);

	buffer
}

#[derive(Clone, Copy)]
struct Blob {
	offset: usize,
	kind: u8,
	data: i32,
}

fn read_blobs(body: &[u8]) -> Result<Vec<Blob>, BytecodeError> {
	body.chunks(BLOB_LEN)
		.enumerate()
		.map(|(i, chunk)| {
			let offset = HEADER_LEN + i * BLOB_LEN;
			let &[kind, a, b, c, d] = chunk else {
				return Err(BytecodeError::TruncatedBlob(offset));
			};

			Ok(Blob {
				offset,
				kind,
				data: i32::from_be_bytes([a, b, c, d]),
			})
		})
		.collect()
}

fn register_name(index: i32) -> Name {
	Name::new(&format!("r{index}")).expect("`r` followed by digits is a valid name")
}

fn decode_operand(blob: Blob, count: u32) -> Result<Operand, BytecodeError> {
	match blob.kind {
		LITERAL => Ok(Operand::Literal(blob.data)),
		REGISTER => {
			let in_range = u32::try_from(blob.data).is_ok_and(|index| index < count);

			if !in_range {
				return Err(BytecodeError::RegisterOutOfRange {
					offset: blob.offset,
					index: blob.data,
					count,
				});
			}

			Ok(Operand::Register(register_name(blob.data)))
		}
		kind => Err(BytecodeError::UnknownKind {
			offset: blob.offset,
			kind,
		}),
	}
}

/// Deserializes a program produced by [`encode`].
///
/// # Errors
///
/// Returns a `BytecodeError` describing the first malformed part of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Program, BytecodeError> {
	if bytes.len() < HEADER_LEN {
		return Err(BytecodeError::TruncatedHeader(bytes.len()));
	}

	let (header, body) = bytes.split_at(HEADER_LEN);
	let count = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);

	let mut lines: Vec<(Opcode, Vec<Operand>)> = Vec::new();

	for blob in read_blobs(body)? {
		if blob.kind == KEYWORD {
			let opcode = u8::try_from(blob.data)
				.ok()
				.and_then(Opcode::from_number)
				.ok_or(BytecodeError::UnknownOpcode {
					offset: blob.offset,
					number: blob.data,
				})?;

			lines.push((opcode, Vec::new()));
		} else {
			let operand = decode_operand(blob, count)?;

			lines
				.last_mut()
				.ok_or(BytecodeError::MissingKeyword)?
				.1
				.push(operand);
		}
	}

	lines
		.into_iter()
		.enumerate()
		.map(|(index, (opcode, operands))| {
			Instruction::from_operands(opcode, &operands)
				.ok_or(BytecodeError::Operands { index, opcode })
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{decode, encode, BytecodeError, HEADER_LEN};
	use crate::syntax::{instruction::Opcode, parser::parse_program};

	#[test]
	fn lays_out_header_and_blobs() {
		let bytes = encode(&parse_program("def a 7\noutn a").unwrap());

		assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
		assert!(bytes[4..HEADER_LEN].iter().all(|&byte| byte == 0));
		assert_eq!(
			&bytes[HEADER_LEN..],
			&[
				0, 0, 0, 0, 0, // def
				1, 0, 0, 0, 0, // r0
				2, 0, 0, 0, 7, // 7
				0, 0, 0, 0, 9, // outn
				1, 0, 0, 0, 0, // r0
			]
		);
	}

	#[test]
	fn decoding_renames_registers() {
		let program = parse_program("def x 2\ndef y -1\nmul x y x\njnz x y\noutn x").unwrap();
		let decoded = decode(&encode(&program)).unwrap();

		assert_eq!(
			decoded.to_string(),
			"def r0 2\ndef r1 -1\nmul r0 r1 r0\njnz r0 r1\noutn r0\n"
		);
	}

	#[test]
	fn rejects_malformed_input() {
		let header = {
			let mut header = vec![0; HEADER_LEN];
			header[3] = 1;
			header
		};
		let with = |blobs: &[u8]| [header.as_slice(), blobs].concat();

		assert_eq!(decode(&[0; 10]), Err(BytecodeError::TruncatedHeader(10)));
		assert_eq!(decode(&with(&[0, 0, 0])), Err(BytecodeError::TruncatedBlob(32)));
		assert_eq!(decode(&with(&[2, 0, 0, 0, 1])), Err(BytecodeError::MissingKeyword));
		assert_eq!(
			decode(&with(&[0, 0, 0, 0, 42])),
			Err(BytecodeError::UnknownOpcode {
				offset: 32,
				number: 42
			})
		);
		assert_eq!(
			decode(&with(&[0, 0, 0, 0, 2, 7, 0, 0, 0, 0])),
			Err(BytecodeError::UnknownKind { offset: 37, kind: 7 })
		);
		assert_eq!(
			decode(&with(&[0, 0, 0, 0, 2, 1, 0, 0, 0, 3])),
			Err(BytecodeError::RegisterOutOfRange {
				offset: 37,
				index: 3,
				count: 1
			})
		);
		assert_eq!(
			decode(&with(&[0, 0, 0, 0, 2, 2, 0, 0, 0, 3])),
			Err(BytecodeError::Operands {
				index: 0,
				opcode: Opcode::Inc
			})
		);
	}
}
