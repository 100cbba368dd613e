// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! JSON-friendly serialization of decoded payment requests.
//!
//! Field names are camelCase, byte strings are lower-case hex. Only serialization is supported.

use bitcoin::hashes::Hash;
use bitcoin::hex::DisplayHex;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::prelude::*;
use crate::{
	Amount, DecodedInvoice, Description, Fallback, HumanReadablePart, InvoiceData,
	InvoiceFeatures, InvoiceSignature, PrivateRoute, RouteHintHop, Sha256, Tag, UnknownTag,
};

/// Serializes a byte slice as lower-case hex.
struct Hex<'a>(&'a [u8]);

impl<'a> Serialize for Hex<'a> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		serializer.collect_str(&self.0.as_hex())
	}
}

impl Serialize for DecodedInvoice {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("DecodedInvoice", 3)?;
		s.serialize_field("humanReadablePart", &self.human_readable_part)?;
		s.serialize_field("data", &self.data)?;
		s.serialize_field("checksum", &self.checksum)?;
		s.end()
	}
}

impl Serialize for HumanReadablePart {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("HumanReadablePart", 2)?;
		s.serialize_field("prefix", self.currency.prefix())?;
		s.serialize_field("amount", &self.amount)?;
		s.end()
	}
}

impl Serialize for Amount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		match *self {
			Amount::MilliSatoshis(msat) => serializer.serialize_u64(msat),
			Amount::Unspecified => serializer.serialize_str("unspecified"),
		}
	}
}

impl Serialize for InvoiceData {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("InvoiceData", 4)?;
		s.serialize_field("timeStamp", &self.timestamp)?;
		s.serialize_field("tags", &self.tags)?;
		s.serialize_field("signature", &self.signature)?;
		s.serialize_field("signingData", &Hex(&self.signing_data))?;
		s.end()
	}
}

impl Serialize for InvoiceSignature {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("InvoiceSignature", 3)?;
		s.serialize_field("r", &Hex(&self.r))?;
		s.serialize_field("s", &Hex(&self.s))?;
		s.serialize_field("recoveryFlag", &self.recovery_flag)?;
		s.end()
	}
}

/// The `value` half of a serialized tag.
struct TagValue<'a>(&'a Tag);

impl<'a> Serialize for TagValue<'a> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		match *self.0 {
			Tag::PaymentHash(ref hash) | Tag::DescriptionHash(ref hash) => hash.serialize(serializer),
			Tag::Description(ref description) => description.serialize(serializer),
			Tag::PayeePubKey(ref pub_key) => Hex(&pub_key.0).serialize(serializer),
			Tag::ExpiryTime(ref expiry) => serializer.serialize_u64(expiry.as_seconds()),
			Tag::MinFinalCltvExpiryDelta(ref delta) => serializer.serialize_u64(delta.0),
			Tag::Fallback(ref fallback) => fallback.serialize(serializer),
			Tag::PrivateRoute(ref route) => route.serialize(serializer),
			Tag::PaymentSecret(ref secret) => Hex(&secret.0).serialize(serializer),
			Tag::PaymentMetadata(ref metadata) => Hex(metadata).serialize(serializer),
			Tag::Features(ref features) => features.serialize(serializer),
			Tag::Unknown(ref unknown) => unknown.serialize(serializer),
		}
	}
}

impl Serialize for Tag {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("Tag", 2)?;
		s.serialize_field("type", self.name())?;
		s.serialize_field("value", &TagValue(self))?;
		s.end()
	}
}

impl Serialize for Sha256 {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		Hex(&self.0.to_byte_array()).serialize(serializer)
	}
}

impl Serialize for Description {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		serializer.serialize_str(self.as_inner())
	}
}

impl Serialize for Fallback {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("Fallback", 2)?;
		s.serialize_field("version", &self.version)?;
		s.serialize_field("fallbackAddress", &Hex(&self.program))?;
		s.end()
	}
}

impl Serialize for PrivateRoute {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		serializer.collect_seq(self.hops())
	}
}

impl Serialize for RouteHintHop {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut s = serializer.serialize_struct("RouteHintHop", 5)?;
		s.serialize_field("publicKey", &Hex(&self.src_node_id))?;
		s.serialize_field("shortChannelId", &Hex(&self.short_channel_id.to_be_bytes()))?;
		s.serialize_field("feeBaseMsat", &self.fees.base_msat)?;
		s.serialize_field("feeProportionalMillionths", &self.fees.proportional_millionths)?;
		s.serialize_field("cltvExpiryDelta", &self.cltv_expiry_delta)?;
		s.end()
	}
}

impl Serialize for InvoiceFeatures {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let mut seq = serializer.serialize_seq(None)?;
		for bit in self.set_bits() {
			seq.serialize_element(&bit)?;
		}
		seq.end()
	}
}

impl Serialize for UnknownTag {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		let data: String = self.data.iter().map(|symbol| symbol.to_char()).collect();

		let mut s = serializer.serialize_struct("UnknownTag", 3)?;
		s.serialize_field("tagCode", &self.tag.as_u8())?;
		s.serialize_field("length", &self.data.len())?;
		s.serialize_field("data", &data)?;
		s.end()
	}
}
