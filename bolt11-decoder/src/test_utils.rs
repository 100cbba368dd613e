// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use crate::bech32::{create_checksum, u5};
use crate::logger::{Level, Logger, Record};

use std::collections::HashMap;
use std::sync::Mutex;

pub struct TestLogger {
	level: Level,
	pub lines: Mutex<HashMap<(String, String), usize>>,
}

impl TestLogger {
	pub fn new() -> TestLogger {
		TestLogger {
			level: Level::Trace,
			lines: Mutex::new(HashMap::new()),
		}
	}
	pub fn enable(&mut self, level: Level) {
		self.level = level;
	}
	pub fn assert_log(&self, module: &str, line: String, count: usize) {
		let log_entries = self.lines.lock().unwrap();
		assert_eq!(log_entries.get(&(module.to_string(), line)), Some(&count));
	}

	/// Search for the number of occurrence of the logged lines which
	/// 1. belongs to the specified module and
	/// 2. contains `line` in it.
	/// And asserts if the number of occurrences is the same with the given `count`
	pub fn assert_log_contains(&self, module: &str, line: &str, count: usize) {
		let log_entries = self.lines.lock().unwrap();
		let l: usize = log_entries.iter().filter(|&(&(ref m, ref l), _c)| {
			m == module && l.contains(line)
		}).map(|(_, c)| { c }).sum();
		assert_eq!(l, count)
	}

	/// Total number of logged lines at or above the enabled level.
	pub fn total(&self) -> usize {
		self.lines.lock().unwrap().values().sum()
	}
}

impl Logger for TestLogger {
	fn log(&self, record: Record) {
		if record.level < self.level {
			return;
		}
		*self.lines.lock().unwrap().entry((record.module_path.to_string(), format!("{}", record.args))).or_insert(0) += 1;
		println!("{:<5} [{} : {}, {}] {}", record.level.to_string(), record.module_path, record.file, record.line, record.args);
	}
}

/// Maps a string of bech32 characters to symbols.
pub fn from_bech32(chars: &str) -> Vec<u5> {
	chars.chars().map(|c| u5::try_from_char(c).unwrap()).collect()
}

/// Assembles payment requests from hand-picked parts, with a valid checksum but no meaningful
/// signature, so tests can decode fields a real encoder would never produce.
pub struct RequestBuilder {
	hrp: String,
	timestamp: u64,
	tagged: Vec<u5>,
	signature: [u8; 65],
}

impl RequestBuilder {
	pub fn new(hrp: &str) -> Self {
		let mut signature = [0x11; 65];
		signature[64] = 0;
		RequestBuilder { hrp: hrp.to_owned(), timestamp: 1496314658, tagged: Vec::new(), signature }
	}

	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = timestamp;
		self
	}

	/// Appends a field with `data` as its payload, the data length taken from `data`.
	pub fn raw_field(mut self, tag: char, data: Vec<u5>) -> Self {
		assert!(data.len() < 1024);
		self.tagged.push(u5::try_from_char(tag).unwrap());
		self.tagged.push(u5::from_u8((data.len() >> 5) as u8));
		self.tagged.push(u5::from_u8((data.len() & 0x1f) as u8));
		self.tagged.extend(data);
		self
	}

	/// Appends a field carrying `bytes`, zero padded to whole symbols.
	pub fn field(self, tag: char, bytes: &[u8]) -> Self {
		self.raw_field(tag, u5::unpack_from_bytes(bytes))
	}

	/// Appends symbols to the tagged field stream without any framing.
	pub fn raw_symbols(mut self, symbols: &[u5]) -> Self {
		self.tagged.extend_from_slice(symbols);
		self
	}

	pub fn recovery_flag(mut self, flag: u8) -> Self {
		self.signature[64] = flag;
		self
	}

	/// The data part without its checksum.
	pub fn data_part(&self) -> Vec<u5> {
		let mut data: Vec<u5> = (0..7)
			.map(|i| u5::from_u8(((self.timestamp >> (5 * (6 - i))) & 0x1f) as u8))
			.collect();
		data.extend_from_slice(&self.tagged);
		data.extend(u5::unpack_from_bytes(&self.signature));
		data
	}

	pub fn build(&self) -> String {
		let data = self.data_part();
		let checksum = create_checksum(&self.hrp, &data);

		let mut request = self.hrp.clone();
		request.push('1');
		request.extend(data.iter().chain(checksum.iter()).map(u5::to_char));
		request
	}
}
