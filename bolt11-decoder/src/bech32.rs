// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Bech32 primitives used by the BOLT 11 decoder: the 5-bit symbol type, symbol/byte
//! repacking and the bech32 checksum.
//!
//! BOLT 11 data parts routinely exceed the 90 character limit of BIP 173, so the checksum is
//! computed here directly rather than through a length-limited bech32 codec.

use core::fmt;

use ::bech32::Fe32;

#[allow(unused_imports)]
use crate::prelude::*;

/// An unsigned 5-bit value, in the range 0 - 31, the basic data block in Bech32 encoding.
/// Internally a byte is stored, but value is always in the 0--31 range.
/// The `u5` name is analogous to the `u8`, `u16` etc. base types.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[allow(non_camel_case_types)]
pub struct u5(u8);

/// Potential errors while turning text into bech32 symbols.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Bech32Error {
	/// A character outside the bech32 alphabet.
	InvalidCharacter(char),
}

impl u5 {
	/// Create from a u8 value, without check, the input should be in the 0 - 31 range.
	/// Higher bits are nulled.
	pub fn from_u8(n: u8) -> Self {
		Self(n % Self::INNER_COUNT)
	}

	/// Access as u8. The value is guaranteed to be in the 0 - 31 range,
	/// but once it is in an `u8`, there is no way to enforce that.
	#[inline]
	pub fn as_u8(&self) -> u8 {
		self.0
	}

	const INNER_MAX: u8 = 31;
	const INNER_COUNT: u8 = 32;

	/// The zero value (character 'q')
	pub const ZERO: u5 = u5(0);

	/// The maximum allowed numerical value, 31 (character 'l')
	pub const MAX: u5 = u5(Self::INNER_MAX);

	/// Decode from a bech32 character of either case.
	pub fn try_from_char(c: char) -> Result<u5, Bech32Error> {
		CharConverter::from_char(c).ok_or(Bech32Error::InvalidCharacter(c))
	}

	/// Convert to Bech32 character, lowercase.
	pub fn to_char(&self) -> char {
		CharConverter::to_char(self)
	}

	/// Packs a u5 slice into bytes, most significant bit first.
	///
	/// If the total number of bits is not a multiple of 8, the trailing bits are dropped. Use
	/// this for fields of a known byte length, where the trailing bits are padding.
	pub fn pack_to_bytes(unpacked: &[u5]) -> Vec<u8> {
		unpacked.iter().copied().pack_to_bytes().collect()
	}

	/// Packs a u5 slice into bytes, most significant bit first.
	///
	/// If the total number of bits is not a multiple of 8, the trailing bits are left-shifted
	/// into one final byte which is emitted as well.
	pub fn pack_to_bytes_with_overflow(unpacked: &[u5]) -> Vec<u8> {
		unpacked.iter().copied().pack_to_bytes_with_overflow().collect()
	}

	/// Utility to unpack u5 elements from a u8 slice.
	/// If the total number of bits is not a multiple of 5, they are right-padded with 0 bits.
	pub fn unpack_from_bytes(packed: &[u8]) -> Vec<u5> {
		packed.iter().copied().unpack_from_bytes().collect()
	}
}

impl From<u5> for u8 {
	fn from(v: u5) -> u8 {
		v.0
	}
}

impl From<Fe32> for u5 {
	fn from(fe: Fe32) -> u5 {
		u5(fe.to_u8())
	}
}

impl From<u5> for Fe32 {
	fn from(v: u5) -> Fe32 {
		Fe32::try_from(v.0).expect("u5 values are always below 32")
	}
}

impl fmt::Display for u5 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_char())
	}
}

/// Maps every character of `s` to its bech32 value.
///
/// Both cases are accepted. The first character outside the alphabet is reported as
/// [`Bech32Error::InvalidCharacter`].
pub fn bech32_to_u5s(s: &str) -> Result<Vec<u5>, Bech32Error> {
	s.chars().map(u5::try_from_char).collect()
}

/// Folds a big-endian digit sequence in the given base into an integer, returning `None` on
/// overflow.
///
/// With bech32 symbols and a base of 32 this reads the timestamp and the tagged field lengths,
/// with decimal digits and a base of 10 it reads the invoice amount.
pub(crate) fn parse_int_be<U>(digits: &[U], base: u64) -> Option<u64>
	where U: Into<u8> + Copy
{
	digits.iter().fold(Some(0u64), |acc, d|
		acc
			.and_then(|x| x.checked_mul(base))
			.and_then(|x| x.checked_add(u64::from(Into::<u8>::into(*d))))
	)
}

/// Iterator adaptor that packs `u5` elements to bytes.
///
/// Depending on how it was created, trailing bits which do not fill a byte are either dropped
/// or emitted left-aligned in one last byte.
#[derive(Clone, PartialEq, Eq)]
pub struct U5Packer<I: Iterator<Item = u5>> {
	remain_bits: usize,
	remain_u8: u8,
	include_overflow: bool,
	iter: I,
}

impl<I> U5Packer<I>
where
	I: Iterator<Item = u5>,
{
	fn new(iter: I, include_overflow: bool) -> Self {
		Self { remain_bits: 0, remain_u8: 0, include_overflow, iter }
	}
}

impl<I> Iterator for U5Packer<I>
where
	I: Iterator<Item = u5>,
{
	type Item = u8;

	/// Retrieve the next packed byte
	fn next(&mut self) -> Option<u8> {
		let mut next_out: Option<u8> = None;
		// We may need to read two inputs to produce an output
		while next_out.is_none() {
			let curr_in = match self.iter.next() {
				Some(curr_in) => curr_in,
				None => {
					if self.include_overflow && self.remain_bits > 0 {
						// remain_u8 already holds the leftover bits at the top of the byte
						self.remain_bits = 0;
						return Some(self.remain_u8);
					}
					return None;
				},
			};
			if self.remain_bits >= 3 {
				// we have a new full byte -- 3 or 4 remain bits, plus 5 new ones
				next_out = Some(self.remain_u8 | (curr_in.0 >> (self.remain_bits - 3)));
				let to_remain_shift = (8 + 3) - self.remain_bits;
				self.remain_u8 = if to_remain_shift < 8 { curr_in.0 << to_remain_shift } else { 0 };
				self.remain_bits -= 3; // added 5, removed 8
			} else {
				// only 0, 1, or 2 remain bits, plus 5 new ones
				self.remain_u8 |= curr_in.0 << (3 - self.remain_bits);
				self.remain_bits += 5;
			}
		}
		next_out
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		let packed_len = |unpacked: usize| {
			let bits = self.remain_bits + unpacked * 5;
			if self.include_overflow { (bits + 7) / 8 } else { bits / 8 }
		};

		let (unpacked_min, unpacked_max) = self.iter.size_hint();
		(packed_len(unpacked_min), unpacked_max.map(packed_len))
	}
}

/// Extension trait for field element iterators.
pub trait PackU5IterExt: Sized + Iterator<Item = u5> {
	/// Adapts the `u5` iterator to output packed bytes, dropping trailing bits which do not
	/// fill a whole byte.
	#[inline]
	fn pack_to_bytes(self) -> U5Packer<Self> {
		U5Packer::new(self, false)
	}

	/// Adapts the `u5` iterator to output packed bytes, emitting trailing bits which do not
	/// fill a whole byte as one final zero-padded byte.
	#[inline]
	fn pack_to_bytes_with_overflow(self) -> U5Packer<Self> {
		U5Packer::new(self, true)
	}
}

impl<I> PackU5IterExt for I where I: Iterator<Item = u5> {}

/// Iterator adaptor that unpacks `u5` elements from a stream of packed bytes.
///
/// If the total number of bits is not a multiple of 5, they are right-padded with 0 bits.
#[derive(Clone, PartialEq, Eq)]
pub struct U5Unpacker<I: Iterator<Item = u8>> {
	remain_bits: usize,
	remain_u8: u8,
	iter: I,
}

impl<I> U5Unpacker<I>
where
	I: Iterator<Item = u8>,
{
	fn new(iter: I) -> Self {
		Self { remain_bits: 0, remain_u8: 0, iter }
	}
}

impl<I> Iterator for U5Unpacker<I>
where
	I: Iterator<Item = u8>,
{
	type Item = u5;

	#[inline]
	fn next(&mut self) -> Option<u5> {
		let next_out = if self.remain_bits >= 5 {
			// We have enough remained bits for an output, no need to read the input
			let next_out = self.remain_u8;
			self.remain_u8 <<= 5;
			self.remain_bits -= 5;
			next_out
		} else if let Some(curr_in) = self.iter.next() {
			// we have at least one u5 to output (maybe two)
			let next_out = self.remain_u8 | (curr_in >> self.remain_bits);
			let to_remain_shift = 5 - self.remain_bits;
			self.remain_u8 = curr_in << to_remain_shift;
			self.remain_bits += 3; // added 8, removed 5
			next_out
		} else if self.remain_bits > 0 {
			// No more inputs, output remaining
			self.remain_bits = 0;
			self.remain_u8
		} else {
			return None;
		};
		// Isolate the 5 left bits
		Some(u5(next_out >> 3))
	}
}

/// Extension trait for byte iterators which provides an adaptor to 5-bit elements.
pub trait UnpackU5IterExt: Sized + Iterator<Item = u8> {
	/// Adapts the u8 iterator to output unpacked u5 elements.
	///
	/// If the total number of bits is not a multiple of 5, they are right-padded with 0 bits.
	#[inline]
	fn unpack_from_bytes(self) -> U5Unpacker<Self> {
		U5Unpacker::new(self)
	}
}

impl<I> UnpackU5IterExt for I where I: Iterator<Item = u8> {}

impl fmt::Display for Bech32Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Bech32Error::InvalidCharacter(c) => write!(f, "Invalid character ({})", c),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Bech32Error {}

/// Trait for parsing/converting a base32 slice.
pub trait FromBase32: Sized {
	/// The associated error which can be returned from parsing (e.g. because of bad padding).
	type Err;

	/// Convert a base32 slice to `Self`.
	fn from_base32(b32: &[u5]) -> Result<Self, Self::Err>;
}

impl FromBase32 for Vec<u8> {
	type Err = Bech32Error;

	/// Packs the symbols into bytes, dropping trailing padding bits.
	fn from_base32(data: &[u5]) -> Result<Self, Self::Err> {
		Ok(data.iter().copied().pack_to_bytes().collect::<Self>())
	}
}

/// Generator coefficients of the bech32 BCH code.
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Residue a valid bech32 (not bech32m) string leaves in [`polymod`].
const BECH32_CONST: u32 = 1;

/// Runs the bech32 BCH checksum over a stream of 5-bit values.
fn polymod<I: Iterator<Item = u5>>(values: I) -> u32 {
	let mut chk: u32 = 1;
	for v in values {
		let top = chk >> 25;
		chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(v.0);
		for (i, g) in GENERATOR.iter().enumerate() {
			if (top >> i) & 1 == 1 {
				chk ^= g;
			}
		}
	}
	chk
}

/// Expands the human readable part into the values it contributes to the checksum: the high
/// bits of every character, a zero separator, then the low five bits of every character.
pub fn hrp_expand(hrp: &str) -> Vec<u5> {
	let bytes = hrp.as_bytes();
	let mut expanded = Vec::with_capacity(bytes.len() * 2 + 1);
	expanded.extend(bytes.iter().map(|b| u5::from_u8(b >> 5)));
	expanded.push(u5::ZERO);
	expanded.extend(bytes.iter().map(|b| u5::from_u8(b & 0x1f)));
	expanded
}

/// Checks the bech32 checksum of `data`, whose last six symbols are the checksum itself.
pub fn verify_checksum(hrp: &str, data: &[u5]) -> bool {
	polymod(hrp_expand(hrp).into_iter().chain(data.iter().copied())) == BECH32_CONST
}

/// Computes the six checksum symbols to append to `data`.
pub fn create_checksum(hrp: &str, data: &[u5]) -> [u5; 6] {
	let residue = polymod(
		hrp_expand(hrp).into_iter()
			.chain(data.iter().copied())
			.chain(core::iter::repeat(u5::ZERO).take(6))
	) ^ BECH32_CONST;

	let mut checksum = [u5::ZERO; 6];
	for (i, symbol) in checksum.iter_mut().enumerate() {
		*symbol = u5::from_u8(((residue >> (5 * (5 - i))) & 0x1f) as u8);
	}
	checksum
}

/// Bech32 character encoding/decoding logic (lookup tables).
struct CharConverter {}

impl CharConverter {
	/// Encode a u5 value to char.
	fn to_char(a: &u5) -> char {
		Self::CHARS_LOWER[(a.as_u8() % 32) as usize]
	}

	/// Decode a character to a u5 value.
	fn from_char(c: char) -> Option<u5> {
		let cascii = u32::from(c);
		if cascii <= 127 {
			let idx = Self::CHARS_INV[cascii as usize];
			if (0..32).contains(&idx) {
				return Some(u5::from_u8(idx as u8));
			}
		}
		None
	}

	/// Mapping from numeric value to bech32 character.
	#[rustfmt::skip]
	const CHARS_LOWER: [char; 32] = [
		'q', 'p', 'z', 'r', 'y', '9', 'x', '8', //  +0
		'g', 'f', '2', 't', 'v', 'd', 'w', '0', //  +8
		's', '3', 'j', 'n', '5', '4', 'k', 'h', // +16
		'c', 'e', '6', 'm', 'u', 'a', '7', 'l', // +24
	];

	/// Mapping from bech32 character (either case) to numeric value.
	///
	/// E.g., 'z' is `CHARS_LOWER[2]` and is ASCII value `122` so `CHARS_INV[122] == 2`
	#[rustfmt::skip]
	const CHARS_INV: [i8; 128] = [
		-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
		-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
		-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
		15, -1, 10, 17, 21, 20, 26, 30,  7,  5, -1, -1, -1, -1, -1, -1,
		-1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
		 1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
		-1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
		 1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
	];
}
