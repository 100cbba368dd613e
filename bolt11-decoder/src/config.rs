// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Various user-configurable decoding limits and checks.

/// Options which control how strictly a payment request is checked before decoding.
///
/// Default::default() provides the lenient behavior every payment request in the wild relies
/// on: any case mix is accepted and the input length is unbounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
	/// Rejects requests which mix upper and lower case letters with
	/// [`Bolt11ParseError::MixedCase`].
	///
	/// Bech32 forbids mixed case, but requests are commonly lowercased before decoding anyway, so
	/// the check is opt-in.
	///
	/// Default value: `false`
	///
	/// [`Bolt11ParseError::MixedCase`]: crate::Bolt11ParseError::MixedCase
	pub reject_mixed_case: bool,
	/// The maximum number of bytes a request may be long. Longer requests fail with
	/// [`Bolt11ParseError::RequestTooLong`] before any other work is done.
	///
	/// `None` accepts requests of any length. Note that BOLT 11 itself places no limit on the
	/// length of a request.
	///
	/// Default value: `None`
	///
	/// [`Bolt11ParseError::RequestTooLong`]: crate::Bolt11ParseError::RequestTooLong
	pub max_request_length: Option<usize>,
}

impl Default for DecoderConfig {
	fn default() -> Self {
		DecoderConfig {
			reject_mixed_case: false,
			max_request_length: None,
		}
	}
}

impl DecoderConfig {
	/// A configuration which enforces the bech32 rules on letter case and limits requests to
	/// `max_request_length` bytes.
	pub fn strict(max_request_length: usize) -> Self {
		DecoderConfig {
			reject_mixed_case: true,
			max_request_length: Some(max_request_length),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_lenient() {
		let config = DecoderConfig::default();
		assert!(!config.reject_mixed_case);
		assert_eq!(config.max_request_length, None);
	}

	#[test]
	fn strict_config() {
		let config = DecoderConfig::strict(2048);
		assert!(config.reject_mixed_case);
		assert_eq!(config.max_request_length, Some(2048));
	}
}
