//! Conversion between internal identifiers and wire names.
//!
//! A single formatter is shared process-wide. Codecs capture the current one when
//! they are constructed, so swapping it affects codecs created afterwards.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Pure transform between identifiers and wire names.
///
/// `decode(encode(x)) == x` should hold for identifiers in canonical snake case, where
/// every run of digits is its own underscore-separated word (`isbn_10`, not `isbn10`).
/// Codecs first match a wire name against the encoded names of the declared properties,
/// so other identifiers still resolve as long as their encodings are distinct.
pub trait PropertyNameFormatter: fmt::Debug + Send + Sync {
	/// Identifier (or type name) to wire name.
	fn encode(&self, identifier: &str) -> String;

	/// Wire name to identifier.
	fn decode(&self, wire_name: &str) -> String;
}

/// Splits `snake_case`, `kebab-case`, `camelCase` and `PascalCase` into lowercase words.
///
/// Runs of capitals are kept together as an acronym, so `XMLParser` yields `xml`, `parser`.
/// Runs of digits are words of their own, so `isbn10` yields `isbn`, `10`.
fn split_words(input: &str) -> Vec<String> {
	let chars: Vec<char> = input.chars().collect();
	let mut words = Vec::new();
	let mut current = String::new();

	for (position, &c) in chars.iter().enumerate() {
		if c == '_' || c == '-' {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			continue;
		}
		if !current.is_empty() {
			let previous = chars[position - 1];
			let next_is_lower = chars
				.get(position + 1)
				.is_some_and(|next| next.is_lowercase());
			let boundary = if c.is_ascii_digit() {
				!previous.is_ascii_digit()
			} else if c.is_uppercase() {
				previous.is_lowercase()
					|| previous.is_ascii_digit()
					|| (previous.is_uppercase() && next_is_lower)
			} else {
				previous.is_ascii_digit()
			};
			if boundary {
				words.push(std::mem::take(&mut current));
			}
		}
		current.extend(c.to_lowercase());
	}
	if !current.is_empty() {
		words.push(current);
	}
	words
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// `publish_date` ⇄ `publishDate`. Type names start lowercase: `Book` ⇒ `book`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseFormatter;

impl PropertyNameFormatter for CamelCaseFormatter {
	fn encode(&self, identifier: &str) -> String {
		let words = split_words(identifier);
		let mut encoded = String::with_capacity(identifier.len());
		for (position, word) in words.iter().enumerate() {
			if position == 0 {
				encoded.push_str(word);
			} else {
				encoded.push_str(&capitalize(word));
			}
		}
		encoded
	}

	fn decode(&self, wire_name: &str) -> String {
		split_words(wire_name).join("_")
	}
}

/// `publish_date` ⇄ `publish-date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KebabCaseFormatter;

impl PropertyNameFormatter for KebabCaseFormatter {
	fn encode(&self, identifier: &str) -> String {
		split_words(identifier).join("-")
	}

	fn decode(&self, wire_name: &str) -> String {
		split_words(wire_name).join("_")
	}
}

/// `publish_date` ⇄ `publish_date`. Type names become snake case: `SchemaVersion` ⇒ `schema_version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseFormatter;

impl PropertyNameFormatter for SnakeCaseFormatter {
	fn encode(&self, identifier: &str) -> String {
		split_words(identifier).join("_")
	}

	fn decode(&self, wire_name: &str) -> String {
		split_words(wire_name).join("_")
	}
}

static FORMATTER: Lazy<RwLock<Arc<dyn PropertyNameFormatter>>> =
	Lazy::new(|| RwLock::new(Arc::new(CamelCaseFormatter)));

/// Returns the process-wide formatter. Defaults to [`CamelCaseFormatter`].
pub fn current_formatter() -> Arc<dyn PropertyNameFormatter> {
	FORMATTER.read().clone()
}

/// Replaces the process-wide formatter.
///
/// # Examples
///
/// ```
/// use objmap_core::formatter::{self, CamelCaseFormatter, KebabCaseFormatter};
///
/// formatter::set_formatter(KebabCaseFormatter);
/// assert_eq!(formatter::current_formatter().encode("publish_date"), "publish-date");
/// formatter::set_formatter(CamelCaseFormatter);
/// ```
pub fn set_formatter<F: PropertyNameFormatter + 'static>(formatter: F) {
	tracing::debug!(formatter = ?formatter, "Replacing property name formatter");
	*FORMATTER.write() = Arc::new(formatter);
}
