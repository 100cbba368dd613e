// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#![cfg_attr(feature = "libfuzzer_fuzz", no_main)]

extern crate bolt11_decoder;

use bolt11_decoder::{decode, DecodedInvoice};

#[inline]
fn do_test(data: &[u8]) {
	let request = match std::str::from_utf8(data) {
		Ok(request) => request,
		Err(_) => return,
	};

	let first = decode(request);
	// Decoding is a pure function of its input
	assert_eq!(first, decode(request));

	if let Ok(invoice) = first {
		// Whatever decodes also parses, and the parts stay consistent with each other
		assert_eq!(request.parse::<DecodedInvoice>().as_ref(), Ok(&invoice));
		assert_eq!(invoice.checksum.len(), 6);
		assert!(invoice.signature().recovery_flag <= 3);
		assert!(invoice.signing_data().len() >= invoice.human_readable_part.currency.prefix().len());
		invoice.amount_milli_satoshis();
		invoice.expiry_time();
		let _ = invoice.check_semantics();
	}
}

#[cfg(feature = "afl")]
#[macro_use] extern crate afl;
#[cfg(feature = "afl")]
fn main() {
	fuzz!(|data| {
		do_test(&data);
	});
}

#[cfg(feature = "honggfuzz")]
#[macro_use] extern crate honggfuzz;
#[cfg(feature = "honggfuzz")]
fn main() {
	loop {
		fuzz!(|data| {
			do_test(data);
		});
	}
}

#[cfg(feature = "libfuzzer_fuzz")]
#[macro_use] extern crate libfuzzer_sys;
#[cfg(feature = "libfuzzer_fuzz")]
fuzz_target!(|data: &[u8]| {
	do_test(data);
});
