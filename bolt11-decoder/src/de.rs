// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#[cfg(feature = "std")]
use std::error;

use core::fmt::{self, Display, Formatter};
use core::ops::Deref;
use core::str::{self, FromStr};

use bitcoin::hashes::{sha256, Hash};

use crate::bech32::{bech32_to_u5s, parse_int_be, u5, verify_checksum, FromBase32, PackU5IterExt};
use crate::config::DecoderConfig;
use crate::logger::{IgnoringLogger, Logger};
use crate::prelude::*;
use crate::{
	constants, Amount, Bolt11ParseError, Currency, DecodedInvoice, Description, ExpiryTime,
	Fallback, HumanReadablePart, InvoiceData, InvoiceFeatures, InvoiceSignature, MalformedReason,
	MinFinalCltvExpiryDelta, PayeePubKey, PaymentSecret, PrivateRoute, RouteHintHop, RoutingFees,
	Sha256, SiPrefix, Tag, UnknownTag, CHECKSUM_LEN, PICO_BTC_PER_BTC, SIGNATURE_LEN, TIMESTAMP_LEN,
};

/// Number of bytes a single hop of an `r` field takes.
const ROUTE_HOP_LEN: usize = 51;

/// Highest `f` field version: 0 to 16 are witness versions, 17 is P2PKH and 18 is P2SH.
const MAX_FALLBACK_VERSION: u8 = 18;

/// Decodes a BOLT 11 payment request.
///
/// Mixed case is accepted and no limit is put on the request length. Use
/// [`decode_with_config`] to change either or to receive diagnostics.
///
/// ```
/// use bolt11_decoder::{decode, Bolt11ParseError, MalformedReason};
///
/// assert_eq!(
/// 	decode("lnbc2500u"),
/// 	Err(Bolt11ParseError::MalformedRequest(MalformedReason::MissingSeparator))
/// );
/// ```
pub fn decode(request: &str) -> Result<DecodedInvoice, Bolt11ParseError> {
	decode_with_config(request, &DecoderConfig::default(), &IgnoringLogger)
}

/// Decodes a BOLT 11 payment request applying the checks enabled in `config`.
///
/// Tagged fields which are skipped and tagged fields with an unknown tag code are reported to
/// `logger`. Errors are only ever returned, never logged.
pub fn decode_with_config<L: Deref>(
	request: &str, config: &DecoderConfig, logger: L,
) -> Result<DecodedInvoice, Bolt11ParseError>
where
	L::Target: Logger,
{
	if let Some(max) = config.max_request_length {
		if request.len() > max {
			return Err(Bolt11ParseError::RequestTooLong { length: request.len(), max });
		}
	}

	if config.reject_mixed_case
		&& request.chars().any(|c| c.is_ascii_lowercase())
		&& request.chars().any(|c| c.is_ascii_uppercase())
	{
		return Err(Bolt11ParseError::MixedCase);
	}

	let request = request.to_ascii_lowercase();

	let separator = request.rfind('1').ok_or(MalformedReason::MissingSeparator)?;
	let hrp = &request[..separator];
	let data = bech32_to_u5s(&request[separator + 1..])?;

	if data.len() < CHECKSUM_LEN {
		return Err(MalformedReason::TooShortDataPart.into());
	}

	if !hrp.is_ascii() || !verify_checksum(hrp, &data) {
		return Err(Bolt11ParseError::ChecksumError);
	}

	let (data, checksum) = data.split_at(data.len() - CHECKSUM_LEN);

	let human_readable_part = hrp.parse::<HumanReadablePart>()?;
	let data = parse_data_part(hrp, data, &logger)?;

	log_trace!(logger, "Decoded {} payment request with {} tagged fields",
		human_readable_part.currency, data.tags.len());

	Ok(DecodedInvoice {
		human_readable_part,
		data,
		checksum: checksum.iter().map(u5::to_char).collect(),
	})
}

/// ```
/// use bolt11_decoder::{Amount, DecodedInvoice};
///
/// let invoice = "lnbc1pvjluezsp5zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygspp5qqqsyqcyq5\
/// rqwzqfqqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypqdpl2pkx2ctnv5sxxmmwwd5kgetjypeh2ursdae8g6twvus8g6rf\
/// wvs8qun0dfjkxaq9qrsgq357wnc5r2ueh7ck6q93dj32dlqnls087fxdwk8qakdyafkq3yap9us6v52vjjsrvywa6rt52\
/// cm9r9zqt8r2t7mlcwspyetp5h2tztugp9lfyql";
///
/// let parsed = invoice.parse::<DecodedInvoice>().unwrap();
/// assert_eq!(parsed.amount(), Amount::Unspecified);
/// assert_eq!(parsed, bolt11_decoder::decode(invoice).unwrap());
/// ```
impl FromStr for DecodedInvoice {
	type Err = Bolt11ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		decode(s)
	}
}

/// Parses the full network prefix, `ln` included.
impl FromStr for Currency {
	type Err = Bolt11ParseError;

	fn from_str(prefix: &str) -> Result<Self, Bolt11ParseError> {
		Currency::ALL.iter()
			.find(|currency| currency.prefix() == prefix)
			.copied()
			.ok_or(MalformedReason::UnknownPrefix.into())
	}
}

impl FromStr for SiPrefix {
	type Err = Bolt11ParseError;

	fn from_str(currency_prefix: &str) -> Result<Self, Bolt11ParseError> {
		use crate::SiPrefix::*;
		match currency_prefix {
			"m" => Ok(Milli),
			"u" => Ok(Micro),
			"n" => Ok(Nano),
			"p" => Ok(Pico),
			_ => {
				let c = currency_prefix.chars().next().unwrap_or(' ');
				Err(MalformedReason::UnknownSiPrefix(c).into())
			},
		}
	}
}

/// Parses the amount following the network prefix: empty for no amount, otherwise a decimal
/// number optionally followed by one of the multipliers `m`, `u`, `n` or `p`.
impl FromStr for Amount {
	type Err = Bolt11ParseError;

	fn from_str(amount: &str) -> Result<Self, Bolt11ParseError> {
		let (last_idx, last) = match amount.char_indices().last() {
			Some(last) => last,
			None => return Ok(Amount::Unspecified),
		};

		let (digits, multiplier) = if last.is_ascii_digit() {
			(amount, PICO_BTC_PER_BTC)
		} else {
			let si_prefix = amount[last_idx..].parse::<SiPrefix>()?;
			(&amount[..last_idx], si_prefix.multiplier())
		};

		if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
			return Err(MalformedReason::InvalidAmount.into());
		}
		if digits.len() > 1 && digits.starts_with('0') {
			return Err(MalformedReason::LeadingZeroAmount.into());
		}

		let digits: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
		let amount_pico_btc = parse_int_be(&digits[..], 10)
			.and_then(|amount| amount.checked_mul(multiplier))
			.ok_or(MalformedReason::IntegerOverflow)?;

		// 1 millisatoshi is 10 picobitcoin
		if amount_pico_btc % 10 != 0 {
			return Err(MalformedReason::ImpreciseAmount.into());
		}

		Ok(Amount::MilliSatoshis(amount_pico_btc / 10))
	}
}

/// Selects the longest network prefix the human readable part starts with.
fn split_prefix(hrp: &str) -> Result<(Currency, &str), Bolt11ParseError> {
	Currency::ALL.iter()
		.filter(|currency| hrp.starts_with(currency.prefix()))
		.max_by_key(|currency| currency.prefix().len())
		.map(|currency| (*currency, &hrp[currency.prefix().len()..]))
		.ok_or(MalformedReason::UnknownPrefix.into())
}

impl FromStr for HumanReadablePart {
	type Err = Bolt11ParseError;

	fn from_str(hrp: &str) -> Result<Self, Bolt11ParseError> {
		let (currency, amount) = split_prefix(hrp)?;
		Ok(HumanReadablePart { currency, amount: amount.parse()? })
	}
}

/// Splits the data part (checksum removed) into timestamp, tagged fields and signature.
fn parse_data_part<L: Deref>(hrp: &str, data: &[u5], logger: &L) -> Result<InvoiceData, Bolt11ParseError>
where
	L::Target: Logger,
{
	if data.len() < TIMESTAMP_LEN + SIGNATURE_LEN {
		return Err(MalformedReason::TooShortDataPart.into());
	}

	let (signed, signature) = data.split_at(data.len() - SIGNATURE_LEN);

	let timestamp = parse_int_be(&signed[0..TIMESTAMP_LEN], 32)
		.expect("7*5bit < 64bit, no overflow possible");
	let tags = parse_tagged_parts(&signed[TIMESTAMP_LEN..], logger)?;
	let signature = InvoiceSignature::from_base32(signature)?;

	let mut signing_data = Vec::from(hrp.as_bytes());
	signing_data.extend(signed.iter().copied().pack_to_bytes_with_overflow());

	Ok(InvoiceData { timestamp, tags, signature, signing_data })
}

fn parse_tagged_parts<L: Deref>(data: &[u5], logger: &L) -> Result<Vec<Tag>, Bolt11ParseError>
where
	L::Target: Logger,
{
	let mut parts = Vec::<Tag>::new();
	let mut data = data;

	while !data.is_empty() {
		if data.len() < 3 {
			return Err(MalformedReason::UnexpectedEndOfTaggedFields.into());
		}

		// Ignore tag at data[0], it will be handled in the Tag parser and
		// parse the length to find the end of the tagged field's data
		let len = parse_int_be(&data[1..3], 32).expect("can't overflow") as usize;
		let last_element = 3 + len;

		if data.len() < last_element {
			return Err(MalformedReason::UnexpectedEndOfTaggedFields.into());
		}

		// Get the tagged field's data slice
		let field = &data[0..last_element];

		// Set data slice to remaining data
		data = &data[last_element..];

		match Tag::from_base32(field) {
			Ok(Tag::Unknown(unknown)) => {
				log_debug!(logger, "Keeping tagged field with unknown tag '{}' and data length {} uninterpreted",
					unknown.tag, unknown.data.len());
				parts.push(Tag::Unknown(unknown));
			},
			Ok(field) => {
				parts.push(field);
			},
			Err(Bolt11ParseError::Skip) => {
				log_trace!(logger, "Skipping tagged field '{}' with data length {}", field[0], len);
			},
			Err(e) => {
				return Err(e);
			},
		}
	}
	Ok(parts)
}

impl FromBase32 for Tag {
	type Err = Bolt11ParseError;

	fn from_base32(field: &[u5]) -> Result<Tag, Bolt11ParseError> {
		if field.len() < 3 {
			return Err(MalformedReason::UnexpectedEndOfTaggedFields.into());
		}

		let tag = field[0];
		let field_data = &field[3..];

		match tag.as_u8() {
			constants::TAG_PAYMENT_HASH =>
				Ok(Tag::PaymentHash(Sha256::from_base32(field_data)?)),
			constants::TAG_DESCRIPTION =>
				Ok(Tag::Description(Description::from_base32(field_data)?)),
			constants::TAG_PAYEE_PUB_KEY =>
				Ok(Tag::PayeePubKey(PayeePubKey::from_base32(field_data)?)),
			constants::TAG_DESCRIPTION_HASH =>
				Ok(Tag::DescriptionHash(Sha256::from_base32(field_data)?)),
			constants::TAG_EXPIRY_TIME =>
				Ok(Tag::ExpiryTime(ExpiryTime::from_base32(field_data)?)),
			constants::TAG_MIN_FINAL_CLTV_EXPIRY_DELTA =>
				Ok(Tag::MinFinalCltvExpiryDelta(MinFinalCltvExpiryDelta::from_base32(field_data)?)),
			constants::TAG_FALLBACK =>
				Ok(Tag::Fallback(Fallback::from_base32(field_data)?)),
			constants::TAG_PRIVATE_ROUTE =>
				Ok(Tag::PrivateRoute(PrivateRoute::from_base32(field_data)?)),
			constants::TAG_PAYMENT_SECRET =>
				Ok(Tag::PaymentSecret(PaymentSecret::from_base32(field_data)?)),
			constants::TAG_PAYMENT_METADATA =>
				Ok(Tag::PaymentMetadata(Vec::<u8>::from_base32(field_data)?)),
			constants::TAG_FEATURES =>
				Ok(Tag::Features(InvoiceFeatures::from_base32(field_data)?)),
			_ => {
				// "A reader MUST skip over unknown fields", they are kept uninterpreted
				Ok(Tag::Unknown(UnknownTag { tag, data: field_data.to_vec() }))
			}
		}
	}
}

/// Packs exactly `N` bytes out of a field whose length was checked by the caller.
fn fixed_bytes<const N: usize>(field_data: &[u5]) -> [u8; N] {
	let mut bytes = [0u8; N];
	for (dst, src) in bytes.iter_mut().zip(field_data.iter().copied().pack_to_bytes()) {
		*dst = src;
	}
	bytes
}

impl FromBase32 for Sha256 {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<Sha256, Bolt11ParseError> {
		if field_data.len() != 52 {
			// "A reader MUST skip over […] a p, [or] h […] field that does not have data_length 52 […]."
			Err(Bolt11ParseError::Skip)
		} else {
			Ok(Sha256(sha256::Hash::from_byte_array(fixed_bytes(field_data))))
		}
	}
}

impl FromBase32 for Description {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<Description, Bolt11ParseError> {
		let bytes = Vec::<u8>::from_base32(field_data)?;
		let description = str::from_utf8(&bytes)
			.map_err(MalformedReason::InvalidDescription)?;
		Ok(Description(String::from(description)))
	}
}

impl FromBase32 for PayeePubKey {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<PayeePubKey, Bolt11ParseError> {
		if field_data.len() != 53 {
			// "A reader MUST skip over […] a n […] field that does not have data_length 53 […]."
			Err(Bolt11ParseError::Skip)
		} else {
			Ok(PayeePubKey(fixed_bytes(field_data)))
		}
	}
}

impl FromBase32 for ExpiryTime {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<ExpiryTime, Bolt11ParseError> {
		match parse_int_be(field_data, 32)
			.map(ExpiryTime::from_seconds)
		{
			Some(t) => Ok(t),
			None => Err(MalformedReason::IntegerOverflow.into()),
		}
	}
}

impl FromBase32 for MinFinalCltvExpiryDelta {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<MinFinalCltvExpiryDelta, Bolt11ParseError> {
		let expiry = parse_int_be(field_data, 32);
		if let Some(expiry) = expiry {
			Ok(MinFinalCltvExpiryDelta(expiry))
		} else {
			Err(MalformedReason::IntegerOverflow.into())
		}
	}
}

impl FromBase32 for Fallback {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<Fallback, Bolt11ParseError> {
		let (version, program) = match field_data.split_first() {
			Some((version, program)) => (version.as_u8(), program),
			// Without a version there is nothing to interpret
			None => return Err(Bolt11ParseError::Skip),
		};

		if version > MAX_FALLBACK_VERSION {
			// "A reader MUST skip over […] f fields that use an unknown version"
			return Err(Bolt11ParseError::Skip);
		}

		Ok(Fallback { version, program: Vec::<u8>::from_base32(program)? })
	}
}

impl FromBase32 for PrivateRoute {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<PrivateRoute, Bolt11ParseError> {
		let bytes = Vec::<u8>::from_base32(field_data)?;

		if bytes.is_empty() || bytes.len() % ROUTE_HOP_LEN != 0 {
			return Err(Bolt11ParseError::Skip);
		}

		let route_hops = bytes.chunks_exact(ROUTE_HOP_LEN).map(|hop_bytes| {
			let mut src_node_id = [0u8; 33];
			src_node_id.copy_from_slice(&hop_bytes[0..33]);

			RouteHintHop {
				src_node_id,
				short_channel_id: u64::from_be_bytes(hop_bytes[33..41].try_into().expect("slice too big?")),
				fees: RoutingFees {
					base_msat: u32::from_be_bytes(hop_bytes[41..45].try_into().expect("slice too big?")),
					proportional_millionths: u32::from_be_bytes(hop_bytes[45..49].try_into().expect("slice too big?")),
				},
				cltv_expiry_delta: u16::from_be_bytes(hop_bytes[49..51].try_into().expect("slice too big?")),
			}
		}).collect();

		Ok(PrivateRoute(route_hops))
	}
}

impl FromBase32 for PaymentSecret {
	type Err = Bolt11ParseError;

	fn from_base32(field_data: &[u5]) -> Result<PaymentSecret, Bolt11ParseError> {
		if field_data.len() != 52 {
			// "A reader MUST skip over […] a s field that does not have data_length 52 […]."
			Err(Bolt11ParseError::Skip)
		} else {
			Ok(PaymentSecret(fixed_bytes(field_data)))
		}
	}
}

impl FromBase32 for InvoiceFeatures {
	type Err = Bolt11ParseError;

	/// Reads the big-endian 5-bit groups of a `9` field into little-endian flag bytes, so that
	/// the last bit of the field becomes feature bit 0.
	fn from_base32(field_data: &[u5]) -> Result<InvoiceFeatures, Bolt11ParseError> {
		let mut flags = vec![0u8; (field_data.len() * 5 + 7) / 8];
		for (group_idx, group) in field_data.iter().rev().enumerate() {
			for bit in 0..5 {
				if group.as_u8() & (1 << bit) != 0 {
					let feature_bit = group_idx * 5 + bit;
					flags[feature_bit / 8] |= 1 << (feature_bit % 8);
				}
			}
		}
		Ok(InvoiceFeatures::from_le_bytes(flags))
	}
}

impl FromBase32 for InvoiceSignature {
	type Err = Bolt11ParseError;

	fn from_base32(signature: &[u5]) -> Result<Self, Self::Err> {
		if signature.len() != SIGNATURE_LEN {
			return Err(MalformedReason::TooShortDataPart.into());
		}
		let recoverable_signature_bytes = Vec::<u8>::from_base32(signature)?;
		let recovery_flag = recoverable_signature_bytes[64];
		if recovery_flag > 3 {
			return Err(MalformedReason::InvalidRecoveryFlag(recovery_flag).into());
		}

		Ok(InvoiceSignature {
			r: recoverable_signature_bytes[0..32].try_into().expect("slice too big?"),
			s: recoverable_signature_bytes[32..64].try_into().expect("slice too big?"),
			recovery_flag,
		})
	}
}

impl Display for Bolt11ParseError {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match *self {
			Bolt11ParseError::MalformedRequest(ref reason) => {
				write!(f, "malformed payment request: {}", reason)
			},
			Bolt11ParseError::ChecksumError => f.write_str("invalid bech32 checksum"),
			Bolt11ParseError::InvalidCharacter(c) => {
				write!(f, "invalid bech32 character {:?} in data part", c)
			},
			Bolt11ParseError::MixedCase => f.write_str("payment request mixes upper and lower case"),
			Bolt11ParseError::RequestTooLong { length, max } => {
				write!(f, "payment request is {} bytes long, at most {} are accepted", length, max)
			},
			Bolt11ParseError::Skip => {
				f.write_str("the tagged field has to be skipped because of an unexpected, but allowed property")
			},
		}
	}
}

impl Display for MalformedReason {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match *self {
			MalformedReason::MissingSeparator => f.write_str("missing '1' separator"),
			MalformedReason::UnknownPrefix => f.write_str("unknown prefix"),
			MalformedReason::LeadingZeroAmount => f.write_str("amount has a leading zero"),
			MalformedReason::InvalidAmount => f.write_str("amount is not a decimal number"),
			MalformedReason::UnknownSiPrefix(c) => write!(f, "unknown SI prefix {:?}", c),
			MalformedReason::ImpreciseAmount => {
				f.write_str("amount is not a whole number of millisatoshis")
			},
			MalformedReason::IntegerOverflow => {
				f.write_str("parsed integer doesn't fit into receiving type")
			},
			MalformedReason::TooShortDataPart => {
				f.write_str("data part too short (should be at least 111 bech32 chars long)")
			},
			MalformedReason::UnexpectedEndOfTaggedFields => {
				f.write_str("tagged fields part ended unexpectedly")
			},
			MalformedReason::InvalidDescription(ref e) => {
				write!(f, "Description is not a valid utf-8 string: {}", e)
			},
			MalformedReason::InvalidRecoveryFlag(flag) => {
				write!(f, "recovery id {} is out of range (should be in [0,3])", flag)
			},
		}
	}
}

#[cfg(feature = "std")]
impl error::Error for Bolt11ParseError {}

#[cfg(feature = "std")]
impl error::Error for MalformedReason {}
