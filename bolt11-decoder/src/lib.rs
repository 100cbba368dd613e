// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(missing_docs)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! This crate decodes [lightning BOLT11](https://github.com/lightning/bolts/blob/master/11-payment-encoding.md)
//! payment requests into their human readable part, their typed tagged fields and their raw
//! signature.
//!
//!   * For decoding use [`decode`] or `str::parse::<DecodedInvoice>(&self)`
//!   * For stricter input checks and diagnostics use [`decode_with_config`]
//!   * For the JSON representation enable the `serde` feature
//!
//! ```
//! use bolt11_decoder::{decode, Amount, Currency};
//!
//! let invoice = decode(
//! 	"lnbc2500u1pvjluezsp5zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygspp5qqqsyqcyq5rqwzqf\
//! 	qqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypqdq5xysxxatsyp3k7enxv4jsxqzpu9qrsgquk0rl77nj30yxdy8j9vdx85\
//! 	fkpmdla2087ne0xh8nhedh8w27kyke0lp53ut353s06fv3qfegext0eh0ymjpf39tuven09sam30g4vgpfna3rh"
//! ).unwrap();
//!
//! assert_eq!(invoice.currency(), Currency::Bitcoin);
//! assert_eq!(invoice.amount(), Amount::MilliSatoshis(250_000_000));
//! assert_eq!(invoice.description().unwrap().as_inner(), "1 cup coffee");
//! assert_eq!(invoice.expiry_time().as_secs(), 60);
//! ```
//!
//! Decoding checks the format and the checksum only. The signature is extracted but not
//! verified.

extern crate alloc;
extern crate bitcoin;
#[cfg(any(test, feature = "std"))]
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

#[cfg(feature = "std")]
use std::time::SystemTime;

use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::PublicKey;

use core::fmt::{self, Display, Formatter};
use core::str::Utf8Error;
use core::time::Duration;

#[macro_use]
mod macro_logger;

pub mod bech32;
pub mod config;
pub mod logger;

mod de;
#[cfg(feature = "serde")]
mod ser;
#[cfg(test)]
mod test_utils;

pub use crate::bech32::u5;
pub use crate::config::DecoderConfig;
pub use crate::de::{decode, decode_with_config};

#[allow(unused_imports)]
mod prelude {
	pub use alloc::{string::String, vec, vec::Vec};

	pub use alloc::borrow::ToOwned;
	pub use alloc::format;
	pub use alloc::string::ToString;
}

use crate::prelude::*;

/// Default expiry time as defined by [BOLT 11].
///
/// [BOLT 11]: https://github.com/lightning/bolts/blob/master/11-payment-encoding.md
pub const DEFAULT_EXPIRY_TIME: u64 = 3600;

/// Default minimum final CLTV expiry as defined by [BOLT 11].
///
/// [BOLT 11]: https://github.com/lightning/bolts/blob/master/11-payment-encoding.md
pub const DEFAULT_MIN_FINAL_CLTV_EXPIRY_DELTA: u64 = 18;

/// Number of bech32 symbols making up the timestamp at the start of the data part.
pub const TIMESTAMP_LEN: usize = 7;

/// Number of bech32 symbols making up the recoverable signature at the end of the data part.
pub const SIGNATURE_LEN: usize = 104;

/// Number of bech32 symbols making up the checksum at the end of a payment request.
pub const CHECKSUM_LEN: usize = 6;

/// Tag constants as specified in BOLT11
#[allow(missing_docs)]
pub mod constants {
	pub const TAG_PAYMENT_HASH: u8 = 1;
	pub const TAG_DESCRIPTION: u8 = 13;
	pub const TAG_PAYEE_PUB_KEY: u8 = 19;
	pub const TAG_DESCRIPTION_HASH: u8 = 23;
	pub const TAG_EXPIRY_TIME: u8 = 6;
	pub const TAG_MIN_FINAL_CLTV_EXPIRY_DELTA: u8 = 24;
	pub const TAG_FALLBACK: u8 = 9;
	pub const TAG_PRIVATE_ROUTE: u8 = 3;
	pub const TAG_PAYMENT_SECRET: u8 = 16;
	pub const TAG_PAYMENT_METADATA: u8 = 27;
	pub const TAG_FEATURES: u8 = 5;
}

/// Represents a decoded BOLT11 payment request.
///
/// All fields are exactly as found in the request, nothing is checked beyond what is needed to
/// decode it. Use [`DecodedInvoice::check_semantics`] to check which fields are present.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct DecodedInvoice {
	/// The network prefix and the amount
	pub human_readable_part: HumanReadablePart,

	/// Timestamp, tagged fields and signature
	pub data: InvoiceData,

	/// The six checksum characters the request ends with, lowercase
	pub checksum: String,
}

/// Data of the [`DecodedInvoice`] that is encoded in the human readable part.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct HumanReadablePart {
	/// The network the request is valid on
	pub currency: Currency,

	/// The amount requested, if any
	pub amount: Amount,
}

/// Data of the [`DecodedInvoice`] that is encoded in the data part.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct InvoiceData {
	/// Creation time of the request in seconds since the unix epoch
	pub timestamp: u64,

	/// Tagged fields in the order they appear in the request, minus any skipped ones
	pub tags: Vec<Tag>,

	/// The signature over [`InvoiceData::signing_data`]
	pub signature: InvoiceSignature,

	/// The bytes a signature commits to: the human readable part as ASCII followed by the data
	/// part up to the signature, packed to bytes with its last partial byte zero padded.
	pub signing_data: Vec<u8>,
}

/// Enum representing the crypto currencies (or networks) supported by this library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Currency {
	/// Bitcoin mainnet
	Bitcoin,

	/// Bitcoin testnet
	BitcoinTestnet,

	/// Bitcoin regtest
	Regtest,

	/// Bitcoin simnet
	Simnet,

	/// Bitcoin signet
	Signet,
}

impl Currency {
	/// All currencies, in no particular order.
	pub const ALL: [Currency; 5] =
		[Currency::Bitcoin, Currency::BitcoinTestnet, Currency::Regtest, Currency::Simnet, Currency::Signet];

	/// The human readable part prefix of payment requests on this network, including the
	/// leading `ln`.
	pub fn prefix(&self) -> &'static str {
		match self {
			Currency::Bitcoin => "lnbc",
			Currency::BitcoinTestnet => "lntb",
			Currency::Regtest => "lnbcrt",
			Currency::Simnet => "lnsb",
			Currency::Signet => "lntbs",
		}
	}
}

impl Display for Currency {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.prefix())
	}
}

/// SI prefixes for the human readable part
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum SiPrefix {
	/// 10^-3
	Milli,
	/// 10^-6
	Micro,
	/// 10^-9
	Nano,
	/// 10^-12
	Pico,
}

impl SiPrefix {
	/// Returns the multiplier to go from a BTC value to picoBTC implied by this SiPrefix.
	/// This is effectively 10^12 * the prefix multiplier
	pub fn multiplier(&self) -> u64 {
		match *self {
			SiPrefix::Milli => 1_000_000_000,
			SiPrefix::Micro => 1_000_000,
			SiPrefix::Nano => 1_000,
			SiPrefix::Pico => 1,
		}
	}

	/// The character representing this prefix in a payment request.
	pub fn as_char(&self) -> char {
		match *self {
			SiPrefix::Milli => 'm',
			SiPrefix::Micro => 'u',
			SiPrefix::Nano => 'n',
			SiPrefix::Pico => 'p',
		}
	}
}

/// Multiplier from a whole bitcoin amount to picoBTC.
pub const PICO_BTC_PER_BTC: u64 = 1_000_000_000_000;

/// The amount a payment request asks for.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Amount {
	/// No digits followed the network prefix, the payer chooses the amount.
	Unspecified,
	/// An exact amount in millisatoshis.
	MilliSatoshis(u64),
}

impl Amount {
	/// The amount in millisatoshis, if one was specified.
	pub fn milli_satoshis(&self) -> Option<u64> {
		match *self {
			Amount::Unspecified => None,
			Amount::MilliSatoshis(msat) => Some(msat),
		}
	}
}

/// A decoded tagged field of the data part.
///
/// The variants carry the field's payload already interpreted according to its tag code. Fields
/// with a code this library does not know are kept as [`Tag::Unknown`].
#[allow(missing_docs)]
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Tag {
	PaymentHash(Sha256),
	Description(Description),
	PayeePubKey(PayeePubKey),
	DescriptionHash(Sha256),
	ExpiryTime(ExpiryTime),
	MinFinalCltvExpiryDelta(MinFinalCltvExpiryDelta),
	Fallback(Fallback),
	PrivateRoute(PrivateRoute),
	PaymentSecret(PaymentSecret),
	PaymentMetadata(Vec<u8>),
	Features(InvoiceFeatures),
	Unknown(UnknownTag),
}

impl Tag {
	/// Returns the tag code of the field.
	pub fn tag(&self) -> u5 {
		let tag = match *self {
			Tag::PaymentHash(_) => constants::TAG_PAYMENT_HASH,
			Tag::Description(_) => constants::TAG_DESCRIPTION,
			Tag::PayeePubKey(_) => constants::TAG_PAYEE_PUB_KEY,
			Tag::DescriptionHash(_) => constants::TAG_DESCRIPTION_HASH,
			Tag::ExpiryTime(_) => constants::TAG_EXPIRY_TIME,
			Tag::MinFinalCltvExpiryDelta(_) => constants::TAG_MIN_FINAL_CLTV_EXPIRY_DELTA,
			Tag::Fallback(_) => constants::TAG_FALLBACK,
			Tag::PrivateRoute(_) => constants::TAG_PRIVATE_ROUTE,
			Tag::PaymentSecret(_) => constants::TAG_PAYMENT_SECRET,
			Tag::PaymentMetadata(_) => constants::TAG_PAYMENT_METADATA,
			Tag::Features(_) => constants::TAG_FEATURES,
			Tag::Unknown(ref unknown) => return unknown.tag,
		};

		u5::from_u8(tag)
	}

	/// Returns the name the field is known by in BOLT 11, `unknown` for unknown fields.
	pub fn name(&self) -> &'static str {
		match *self {
			Tag::PaymentHash(_) => "payment_hash",
			Tag::Description(_) => "description",
			Tag::PayeePubKey(_) => "payee_public_key",
			Tag::DescriptionHash(_) => "description_hash",
			Tag::ExpiryTime(_) => "expiry",
			Tag::MinFinalCltvExpiryDelta(_) => "min_final_cltv_expiry",
			Tag::Fallback(_) => "fallback_address",
			Tag::PrivateRoute(_) => "routing_information",
			Tag::PaymentSecret(_) => "payment_secret",
			Tag::PaymentMetadata(_) => "metadata",
			Tag::Features(_) => "feature_bits",
			Tag::Unknown(_) => "unknown",
		}
	}
}

/// SHA-256 hash
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Sha256(pub sha256::Hash);

impl Sha256 {
	/// Returns true if this is the hash of the given description.
	pub fn matches_description(&self, description: &str) -> bool {
		sha256::Hash::hash(description.as_bytes()) == self.0
	}
}

/// Description string
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Description(String);

impl Description {
	/// Returns the description as a string slice.
	pub fn as_inner(&self) -> &str {
		&self.0
	}

	/// Returns the underlying description string.
	pub fn into_inner(self) -> String {
		self.0
	}
}

impl Display for Description {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Payee public key, the 33 byte compressed encoding exactly as found in the request.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct PayeePubKey(pub [u8; 33]);

impl PayeePubKey {
	/// Parses the key bytes as a secp256k1 public key.
	pub fn public_key(&self) -> Result<PublicKey, bitcoin::secp256k1::Error> {
		PublicKey::from_slice(&self.0)
	}
}

/// Positive duration that defines when (relatively to the timestamp) in the future the invoice
/// expires
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ExpiryTime(Duration);

impl ExpiryTime {
	/// Construct an `ExpiryTime` from seconds.
	pub fn from_seconds(seconds: u64) -> ExpiryTime {
		ExpiryTime(Duration::from_secs(seconds))
	}

	/// Returns the expiry time in seconds
	pub fn as_seconds(&self) -> u64 {
		self.0.as_secs()
	}

	/// Returns a reference to the underlying [`Duration`] (=expiry time)
	pub fn as_duration(&self) -> &Duration {
		&self.0
	}
}

/// `min_final_cltv_expiry_delta` to use for the last HTLC in the route
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct MinFinalCltvExpiryDelta(pub u64);

/// Fallback on-chain address, kept as the raw version and program.
///
/// Versions 0 to 16 are segwit witness versions with `program` the witness program, 17 is a
/// P2PKH and 18 a P2SH address with `program` the 20 byte hash.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Fallback {
	/// The version symbol, 0 to 18
	pub version: u8,
	/// The payload after the version symbol, packed to bytes
	pub program: Vec<u8>,
}

/// Fees for routing via a given channel or a node
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct RoutingFees {
	/// Flat routing fee in millisatoshis.
	pub base_msat: u32,
	/// Liquidity-based routing fee in millionths of a routed amount.
	/// In other words, 10000 is 1%.
	pub proportional_millionths: u32,
}

/// A channel descriptor for a hop along a payment path.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct RouteHintHop {
	/// The node_id of the non-target end of the route, as the 33 bytes found in the request
	pub src_node_id: [u8; 33],
	/// The short_channel_id of this channel
	pub short_channel_id: u64,
	/// The fees which must be paid to use this channel
	pub fees: RoutingFees,
	/// The difference in CLTV values between this node and the next node.
	pub cltv_expiry_delta: u16,
}

impl RouteHintHop {
	/// Parses the node id bytes as a secp256k1 public key.
	pub fn public_key(&self) -> Result<PublicKey, bitcoin::secp256k1::Error> {
		PublicKey::from_slice(&self.src_node_id)
	}

	/// The short channel id in its `block x transaction x output` notation.
	pub fn short_channel_id_string(&self) -> String {
		let block = self.short_channel_id >> 40;
		let tx_index = (self.short_channel_id >> 16) & 0xff_ffff;
		let output_index = self.short_channel_id & 0xffff;
		format!("{}x{}x{}", block, tx_index, output_index)
	}
}

/// Private routing information
///
/// # Invariants
/// The route has at least one hop.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct PrivateRoute(Vec<RouteHintHop>);

impl PrivateRoute {
	/// Returns the hops of the route, in the order they are to be taken.
	pub fn hops(&self) -> &[RouteHintHop] {
		&self.0
	}

	/// Returns the underlying hops.
	pub fn into_inner(self) -> Vec<RouteHintHop> {
		self.0
	}
}

/// 32-byte payment secret
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct PaymentSecret(pub [u8; 32]);

/// Feature bits advertised in the `9` field, indexed as in BOLT 9.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct InvoiceFeatures {
	/// Little-endian flag bytes, bit `n` lives in byte `n / 8`. No trailing zero bytes.
	flags: Vec<u8>,
}

impl InvoiceFeatures {
	/// Builds features from little-endian flag bytes.
	pub fn from_le_bytes(mut flags: Vec<u8>) -> Self {
		while flags.last() == Some(&0) {
			flags.pop();
		}
		InvoiceFeatures { flags }
	}

	/// Returns the little-endian flag bytes.
	pub fn le_flags(&self) -> &[u8] {
		&self.flags
	}

	/// Returns true if bit `bit` is set.
	pub fn is_set(&self, bit: usize) -> bool {
		self.flags.get(bit / 8).map_or(false, |byte| byte & (1 << (bit % 8)) != 0)
	}

	/// Iterates over the indices of all set bits, lowest first.
	pub fn set_bits(&self) -> impl Iterator<Item = usize> + '_ {
		(0..self.flags.len() * 8).filter(move |bit| self.is_set(*bit))
	}

	fn supports_pair(&self, even_bit: usize) -> bool {
		self.is_set(even_bit) || self.is_set(even_bit + 1)
	}

	/// `var_onion_optin`, bits 8/9
	pub fn supports_variable_length_onion(&self) -> bool {
		self.supports_pair(8)
	}

	/// `payment_secret`, bits 14/15
	pub fn supports_payment_secret(&self) -> bool {
		self.supports_pair(14)
	}

	/// `payment_secret` as a required feature, bit 14
	pub fn requires_payment_secret(&self) -> bool {
		self.is_set(14)
	}

	/// `basic_mpp`, bits 16/17
	pub fn supports_basic_mpp(&self) -> bool {
		self.supports_pair(16)
	}
}

/// A tagged field whose code this library does not interpret, kept as found.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct UnknownTag {
	/// The tag code
	pub tag: u5,
	/// The field payload; its length is the field's data length
	pub data: Vec<u5>,
}

/// Recoverable signature over the signing data of a request.
///
/// The signature is only extracted, never verified.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct InvoiceSignature {
	/// The `r` value of the signature
	pub r: [u8; 32],
	/// The `s` value of the signature
	pub s: [u8; 32],
	/// The recovery id, 0 to 3
	pub recovery_flag: u8,
}

/// Finds the first element of an enum stream of a given variant and extracts one member of the
/// variant. If no element was found `None` gets returned.
///
/// The following example would extract the first B.
///
/// ```ignore
/// enum Enum {
/// 	A(u8),
/// 	B(u16)
/// }
///
/// let elements = vec![Enum::A(1), Enum::A(2), Enum::B(3), Enum::A(4)];
///
/// assert_eq!(find_extract!(elements.iter(), Enum::B(x), x), Some(3u16));
/// ```
macro_rules! find_extract {
	($iter:expr, $enm:pat, $enm_var:ident) => {
		find_all_extract!($iter, $enm, $enm_var).next()
	};
}

/// Finds the all elements of an enum stream of a given variant and extracts one member of the
/// variant through an iterator.
///
/// The following example would extract all A.
///
/// ```ignore
/// enum Enum {
/// 	A(u8),
/// 	B(u16)
/// }
///
/// let elements = vec![Enum::A(1), Enum::A(2), Enum::B(3), Enum::A(4)];
///
/// assert_eq!(
/// 	find_all_extract!(elements.iter(), Enum::A(x), x).collect::<Vec<u8>>(),
/// 	vec![1u8, 2u8, 4u8]
/// );
/// ```
macro_rules! find_all_extract {
	($iter:expr, $enm:pat, $enm_var:ident) => {
		$iter.filter_map(|tf| match *tf {
			$enm => Some($enm_var),
			_ => None,
		})
	};
}

impl DecodedInvoice {
	/// Returns the network the request is for.
	pub fn currency(&self) -> Currency {
		self.human_readable_part.currency
	}

	/// Returns the amount the request asks for.
	pub fn amount(&self) -> Amount {
		self.human_readable_part.amount
	}

	/// Returns the amount in millisatoshis, if one was specified.
	pub fn amount_milli_satoshis(&self) -> Option<u64> {
		self.human_readable_part.amount.milli_satoshis()
	}

	/// Returns the creation time as a duration since the unix epoch.
	pub fn duration_since_epoch(&self) -> Duration {
		Duration::from_secs(self.data.timestamp)
	}

	/// Returns all tagged fields which were decoded, in request order.
	pub fn tags(&self) -> &[Tag] {
		&self.data.tags
	}

	/// Returns the recoverable signature.
	pub fn signature(&self) -> &InvoiceSignature {
		&self.data.signature
	}

	/// Returns the bytes the signature commits to.
	pub fn signing_data(&self) -> &[u8] {
		&self.data.signing_data
	}

	/// Returns the first payment hash, if any.
	pub fn payment_hash(&self) -> Option<&Sha256> {
		find_extract!(self.data.tags.iter(), Tag::PaymentHash(ref x), x)
	}

	/// Returns the first description, if any.
	pub fn description(&self) -> Option<&Description> {
		find_extract!(self.data.tags.iter(), Tag::Description(ref x), x)
	}

	/// Returns the first description hash, if any.
	pub fn description_hash(&self) -> Option<&Sha256> {
		find_extract!(self.data.tags.iter(), Tag::DescriptionHash(ref x), x)
	}

	/// Returns the payee public key, if one was included.
	pub fn payee_pub_key(&self) -> Option<&PayeePubKey> {
		find_extract!(self.data.tags.iter(), Tag::PayeePubKey(ref x), x)
	}

	/// Returns the payment secret, if any.
	pub fn payment_secret(&self) -> Option<&PaymentSecret> {
		find_extract!(self.data.tags.iter(), Tag::PaymentSecret(ref x), x)
	}

	/// Returns the payment metadata, if any.
	pub fn payment_metadata(&self) -> Option<&Vec<u8>> {
		find_extract!(self.data.tags.iter(), Tag::PaymentMetadata(ref x), x)
	}

	/// Returns the advertised features, if any.
	pub fn features(&self) -> Option<&InvoiceFeatures> {
		find_extract!(self.data.tags.iter(), Tag::Features(ref x), x)
	}

	/// Returns the invoice's expiry time, if present, otherwise [`DEFAULT_EXPIRY_TIME`].
	pub fn expiry_time(&self) -> Duration {
		find_extract!(self.data.tags.iter(), Tag::ExpiryTime(ref x), x)
			.map(|x| x.0)
			.unwrap_or(Duration::from_secs(DEFAULT_EXPIRY_TIME))
	}

	/// Returns the invoice's `min_final_cltv_expiry_delta` time, if present, otherwise
	/// [`DEFAULT_MIN_FINAL_CLTV_EXPIRY_DELTA`].
	pub fn min_final_cltv_expiry_delta(&self) -> u64 {
		find_extract!(self.data.tags.iter(), Tag::MinFinalCltvExpiryDelta(ref x), x)
			.map(|x| x.0)
			.unwrap_or(DEFAULT_MIN_FINAL_CLTV_EXPIRY_DELTA)
	}

	/// Returns all fallback addresses, in request order.
	pub fn fallbacks(&self) -> Vec<&Fallback> {
		find_all_extract!(self.data.tags.iter(), Tag::Fallback(ref x), x).collect()
	}

	/// Returns all private routes, in request order.
	pub fn private_routes(&self) -> Vec<&PrivateRoute> {
		find_all_extract!(self.data.tags.iter(), Tag::PrivateRoute(ref x), x).collect()
	}

	/// Returns all fields with a tag code this library does not interpret.
	pub fn unknown_tags(&self) -> Vec<&UnknownTag> {
		find_all_extract!(self.data.tags.iter(), Tag::Unknown(ref x), x).collect()
	}

	/// Returns whether the expiry time would pass at the given point in time.
	/// `at_time` is the timestamp as a duration since the Unix epoch.
	pub fn would_expire(&self, at_time: Duration) -> bool {
		self.duration_since_epoch()
			.checked_add(self.expiry_time())
			.unwrap_or_else(|| Duration::new(u64::MAX, 1_000_000_000 - 1))
			< at_time
	}

	/// Returns whether the invoice has expired.
	#[cfg(feature = "std")]
	pub fn is_expired(&self) -> bool {
		match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
			Ok(now) => self.would_expire(now),
			Err(_) => false,
		}
	}

	/// Checks the fields a payable request needs, as BOLT 11 requires them:
	///
	/// * exactly one payment hash,
	/// * exactly one of description and description hash,
	/// * at most one payment secret.
	///
	/// Decoding never applies this check.
	pub fn check_semantics(&self) -> Result<(), Bolt11SemanticError> {
		let tags = &self.data.tags;

		let payment_hash_cnt = tags.iter().filter(|&tf| match *tf {
			Tag::PaymentHash(_) => true,
			_ => false,
		}).count();
		if payment_hash_cnt < 1 {
			return Err(Bolt11SemanticError::NoPaymentHash);
		} else if payment_hash_cnt > 1 {
			return Err(Bolt11SemanticError::MultiplePaymentHashes);
		}

		let description_cnt = tags.iter().filter(|&tf| match *tf {
			Tag::Description(_) | Tag::DescriptionHash(_) => true,
			_ => false,
		}).count();
		if description_cnt < 1 {
			return Err(Bolt11SemanticError::NoDescription);
		} else if description_cnt > 1 {
			return Err(Bolt11SemanticError::MultipleDescriptions);
		}

		let payment_secret_cnt = tags.iter().filter(|&tf| match *tf {
			Tag::PaymentSecret(_) => true,
			_ => false,
		}).count();
		if payment_secret_cnt > 1 {
			return Err(Bolt11SemanticError::MultiplePaymentSecrets);
		}

		Ok(())
	}
}

/// Errors that indicate what is wrong with the payment request. They have some granularity for
/// debug reasons, but should generally result in an "invalid BOLT11 invoice" message for the user.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Bolt11ParseError {
	/// The request does not follow the BOLT 11 layout.
	MalformedRequest(MalformedReason),
	/// The bech32 checksum does not match.
	ChecksumError,
	/// A character outside the bech32 alphabet was found in the data part.
	InvalidCharacter(char),
	/// The request mixes upper and lower case letters. Only reported when
	/// [`DecoderConfig::reject_mixed_case`] is set.
	MixedCase,
	/// The request is longer than [`DecoderConfig::max_request_length`].
	RequestTooLong {
		/// Length of the request in bytes
		length: usize,
		/// The configured maximum
		max: usize,
	},
	/// Not an error, but used internally to signal that a part of the invoice should be ignored
	/// according to BOLT11
	Skip,
}

/// The specific way in which a payment request is malformed.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum MalformedReason {
	/// No `1` separates the human readable part from the data part.
	MissingSeparator,
	/// The human readable part does not start with a known network prefix.
	UnknownPrefix,
	/// The amount has a leading zero.
	LeadingZeroAmount,
	/// The amount is not a decimal number.
	InvalidAmount,
	/// The amount ends in an unknown multiplier.
	UnknownSiPrefix(char),
	/// A pico amount which is not a whole number of millisatoshis.
	ImpreciseAmount,
	/// A number does not fit in 64 bits.
	IntegerOverflow,
	/// The data part is too short to hold a timestamp and a signature.
	TooShortDataPart,
	/// A tagged field claims more data than there is left.
	UnexpectedEndOfTaggedFields,
	/// The description is not valid UTF-8.
	InvalidDescription(Utf8Error),
	/// The signature recovery flag is not in the range 0 to 3.
	InvalidRecoveryFlag(u8),
}

impl From<MalformedReason> for Bolt11ParseError {
	fn from(reason: MalformedReason) -> Self {
		Bolt11ParseError::MalformedRequest(reason)
	}
}

impl From<crate::bech32::Bech32Error> for Bolt11ParseError {
	fn from(e: crate::bech32::Bech32Error) -> Self {
		match e {
			crate::bech32::Bech32Error::InvalidCharacter(c) => Bolt11ParseError::InvalidCharacter(c),
		}
	}
}

/// Errors that may occur when checking which fields a [`DecodedInvoice`] carries, see
/// [`DecodedInvoice::check_semantics`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Bolt11SemanticError {
	/// The invoice is missing the mandatory payment hash
	NoPaymentHash,

	/// The invoice has multiple payment hashes which isn't allowed
	MultiplePaymentHashes,

	/// No description or description hash are part of the invoice
	NoDescription,

	/// The invoice contains multiple descriptions and/or description hashes which isn't allowed
	MultipleDescriptions,

	/// The invoice contains multiple payment secrets
	MultiplePaymentSecrets,
}

impl Display for Bolt11SemanticError {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Bolt11SemanticError::NoPaymentHash => f.write_str("The invoice is missing the mandatory payment hash"),
			Bolt11SemanticError::MultiplePaymentHashes => f.write_str("The invoice has multiple payment hashes which isn't allowed"),
			Bolt11SemanticError::NoDescription => f.write_str("No description or description hash are part of the invoice"),
			Bolt11SemanticError::MultipleDescriptions => f.write_str("The invoice contains multiple descriptions and/or description hashes which isn't allowed"),
			Bolt11SemanticError::MultiplePaymentSecrets => f.write_str("The invoice contains multiple payment secrets"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Bolt11SemanticError {}

#[cfg(test)]
mod test {
	use super::*;
	use bitcoin::hex::FromHex;

	fn invoice_with_tags(tags: Vec<Tag>) -> DecodedInvoice {
		DecodedInvoice {
			human_readable_part: HumanReadablePart {
				currency: Currency::Bitcoin,
				amount: Amount::Unspecified,
			},
			data: InvoiceData {
				timestamp: 1496314658,
				tags,
				signature: InvoiceSignature { r: [0; 32], s: [0; 32], recovery_flag: 0 },
				signing_data: Vec::new(),
			},
			checksum: "qqqqqq".to_owned(),
		}
	}

	fn payment_hash() -> Tag {
		Tag::PaymentHash(Sha256(sha256::Hash::from_byte_array([21; 32])))
	}

	fn description(text: &str) -> Tag {
		Tag::Description(Description(text.to_owned()))
	}

	#[test]
	fn test_currency_prefixes() {
		assert_eq!(Currency::Bitcoin.prefix(), "lnbc");
		assert_eq!(Currency::BitcoinTestnet.prefix(), "lntb");
		assert_eq!(Currency::Regtest.prefix(), "lnbcrt");
		assert_eq!(Currency::Simnet.prefix(), "lnsb");
		assert_eq!(Currency::Signet.prefix(), "lntbs");
		assert_eq!(Currency::Signet.to_string(), "lntbs");
	}

	#[test]
	fn test_tag_codes() {
		assert_eq!(payment_hash().tag().to_char(), 'p');
		assert_eq!(description("").tag().to_char(), 'd');
		assert_eq!(Tag::ExpiryTime(ExpiryTime::from_seconds(1)).tag().to_char(), 'x');
		assert_eq!(Tag::MinFinalCltvExpiryDelta(MinFinalCltvExpiryDelta(1)).tag().to_char(), 'c');
		assert_eq!(Tag::PaymentSecret(PaymentSecret([0; 32])).tag().to_char(), 's');
		assert_eq!(Tag::Features(InvoiceFeatures::default()).tag().to_char(), '9');
		assert_eq!(Tag::PaymentMetadata(vec![]).tag().to_char(), 'm');
		let unknown = Tag::Unknown(UnknownTag { tag: u5::from_u8(10), data: vec![] });
		assert_eq!(unknown.tag().to_char(), '2');
		assert_eq!(unknown.name(), "unknown");
	}

	#[test]
	fn test_features() {
		let features = InvoiceFeatures::from_le_bytes(vec![0x00, 0x41, 0x02, 0x00, 0x00]);
		assert_eq!(features.le_flags(), &[0x00, 0x41, 0x02]);
		assert!(features.supports_variable_length_onion());
		assert!(features.supports_payment_secret());
		assert!(features.requires_payment_secret());
		assert!(features.supports_basic_mpp());
		assert!(!features.is_set(9));
		assert!(!features.is_set(100));
		assert_eq!(features.set_bits().collect::<Vec<_>>(), vec![8, 14, 17]);

		let empty = InvoiceFeatures::default();
		assert!(!empty.supports_payment_secret());
		assert_eq!(empty.set_bits().count(), 0);
	}

	#[test]
	fn test_description_hash_matches() {
		let hash = Sha256(sha256::Hash::from_byte_array(<[u8; 32]>::from_hex(
			"3925b6f67e2c340036ed12093dd44e0368df1b6ea26c53dbe4811f58fd5db8c1"
		).unwrap()));
		assert!(hash.matches_description(
			"One piece of chocolate cake, one icecream cone, one pickle, one slice of swiss cheese, \
			one slice of salami, one lollypop, one piece of cherry pie, one sausage, one cupcake, \
			and one slice of watermelon"
		));
		assert!(!hash.matches_description("One piece of chocolate cake"));
	}

	#[test]
	fn test_short_channel_id_string() {
		let hop = RouteHintHop {
			src_node_id: [2; 33],
			short_channel_id: 0x08fe4e000cf00001,
			fees: RoutingFees { base_msat: 1000, proportional_millionths: 2500 },
			cltv_expiry_delta: 40,
		};
		assert_eq!(hop.short_channel_id_string(), "589390x3312x1");
	}

	#[test]
	fn test_payee_pub_key_parsing() {
		let valid = PayeePubKey(<[u8; 33]>::from_hex(
			"03e7156ae33b0a208d0744199163177e909e80176e55d97a2f221ede0f934dd9ad"
		).unwrap());
		assert!(valid.public_key().is_ok());
		assert!(PayeePubKey([0xff; 33]).public_key().is_err());
	}

	#[test]
	fn test_expiry_defaults() {
		let invoice = invoice_with_tags(vec![payment_hash(), description("coffee")]);
		assert_eq!(invoice.expiry_time(), Duration::from_secs(DEFAULT_EXPIRY_TIME));
		assert_eq!(invoice.min_final_cltv_expiry_delta(), DEFAULT_MIN_FINAL_CLTV_EXPIRY_DELTA);
		assert!(!invoice.would_expire(Duration::from_secs(1496314658 + 3600)));
		assert!(invoice.would_expire(Duration::from_secs(1496314658 + 3601)));

		let invoice = invoice_with_tags(vec![
			Tag::ExpiryTime(ExpiryTime::from_seconds(60)),
			Tag::MinFinalCltvExpiryDelta(MinFinalCltvExpiryDelta(144)),
		]);
		assert_eq!(invoice.expiry_time(), Duration::from_secs(60));
		assert_eq!(invoice.min_final_cltv_expiry_delta(), 144);
		assert!(invoice.would_expire(Duration::from_secs(1496314658 + 61)));
	}

	#[test]
	fn test_expiry_saturates() {
		let mut invoice = invoice_with_tags(vec![Tag::ExpiryTime(ExpiryTime::from_seconds(u64::MAX))]);
		invoice.data.timestamp = u64::MAX;
		assert!(!invoice.would_expire(Duration::from_secs(u64::MAX)));
		#[cfg(feature = "std")]
		assert!(!invoice.is_expired());
	}

	#[test]
	fn test_check_semantics() {
		assert_eq!(invoice_with_tags(vec![payment_hash(), description("coffee")]).check_semantics(), Ok(()));
		assert_eq!(
			invoice_with_tags(vec![description("coffee")]).check_semantics(),
			Err(Bolt11SemanticError::NoPaymentHash)
		);
		assert_eq!(
			invoice_with_tags(vec![payment_hash(), payment_hash(), description("coffee")]).check_semantics(),
			Err(Bolt11SemanticError::MultiplePaymentHashes)
		);
		assert_eq!(
			invoice_with_tags(vec![payment_hash()]).check_semantics(),
			Err(Bolt11SemanticError::NoDescription)
		);
		let hash = Tag::DescriptionHash(Sha256(sha256::Hash::hash(b"coffee")));
		assert_eq!(
			invoice_with_tags(vec![payment_hash(), description("coffee"), hash]).check_semantics(),
			Err(Bolt11SemanticError::MultipleDescriptions)
		);
		let secret = Tag::PaymentSecret(PaymentSecret([7; 32]));
		assert_eq!(
			invoice_with_tags(vec![payment_hash(), description("coffee"), secret.clone(), secret]).check_semantics(),
			Err(Bolt11SemanticError::MultiplePaymentSecrets)
		);
	}

	#[test]
	fn test_accessors_pick_first_and_collect_all() {
		let route = |byte| Tag::PrivateRoute(PrivateRoute(vec![RouteHintHop {
			src_node_id: [byte; 33],
			short_channel_id: 1,
			fees: RoutingFees { base_msat: 0, proportional_millionths: 0 },
			cltv_expiry_delta: 9,
		}]));
		let invoice = invoice_with_tags(vec![
			description("first"),
			route(2),
			description("second"),
			route(3),
			Tag::Fallback(Fallback { version: 17, program: vec![0; 20] }),
		]);

		assert_eq!(invoice.description().unwrap().as_inner(), "first");
		assert_eq!(invoice.private_routes().len(), 2);
		assert_eq!(invoice.private_routes()[1].hops()[0].src_node_id, [3; 33]);
		assert_eq!(invoice.fallbacks()[0].version, 17);
		assert!(invoice.payment_hash().is_none());
		assert!(invoice.unknown_tags().is_empty());
		assert_eq!(invoice.amount_milli_satoshis(), None);
		assert_eq!(invoice.duration_since_epoch(), Duration::from_secs(1496314658));
	}
}
