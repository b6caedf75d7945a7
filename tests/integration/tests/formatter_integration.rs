//! Property name formatters applied by both codecs.
//!
//! The process-wide formatter is shared, so every test that swaps it runs serially
//! and restores camelCase before returning.

use objmap::prelude::*;
use objmap::{
	CamelCaseFormatter, JsonCodec, KebabCaseFormatter, PropertyNameFormatter, SnakeCaseFormatter,
	XmlCodec, set_formatter,
};
use objmap_integration_tests::{Book, BookEdition, dune, install_registry, registry};
use rstest::rstest;
use serial_test::serial;

/// Restores the default formatter when dropped.
struct FormatterGuard;

impl FormatterGuard {
	fn set<F: PropertyNameFormatter + 'static>(formatter: F) -> Self {
		set_formatter(formatter);
		FormatterGuard
	}
}

impl Drop for FormatterGuard {
	fn drop(&mut self) {
		set_formatter(CamelCaseFormatter);
	}
}

/// `publish_date` ⇄ `PUBLISH_DATE`.
#[derive(Debug)]
struct ScreamingFormatter;

impl PropertyNameFormatter for ScreamingFormatter {
	fn encode(&self, identifier: &str) -> String {
		identifier.to_uppercase()
	}

	fn decode(&self, wire_name: &str) -> String {
		wire_name.to_lowercase()
	}
}

#[rstest]
#[serial(formatter)]
fn test_default_is_camel_case() {
	install_registry();
	let json = dune().as_json().unwrap();
	assert!(json.contains("\"publishDate\":\"1965-08-01\""));
}

#[rstest]
#[serial(formatter)]
fn test_kebab_case_applies_to_both_formats() {
	install_registry();
	let _guard = FormatterGuard::set(KebabCaseFormatter);
	let book = dune();

	let json = book.as_json().unwrap();
	assert!(json.contains("\"publish-date\":\"1965-08-01\""));
	assert!(json.contains("\"type\":1"));
	assert_eq!(Book::from_json(&json).unwrap(), book);

	let xml = book.as_xml().unwrap();
	assert!(xml.contains("<publish-date>1965-08-01</publish-date>"));
	assert_eq!(Book::from_xml(&xml).unwrap(), book);
}

#[rstest]
#[serial(formatter)]
fn test_formatter_names_root_element() {
	install_registry();
	let edition = BookEdition {
		number: 2,
		name: "Second".to_string(),
	};
	{
		let _guard = FormatterGuard::set(SnakeCaseFormatter);
		assert_eq!(edition.as_xml().unwrap(), r#"<book_edition number="2">Second</book_edition>"#);
	}
	assert_eq!(edition.as_xml().unwrap(), r#"<bookEdition number="2">Second</bookEdition>"#);
}

#[rstest]
#[serial(formatter)]
fn test_codec_keeps_formatter_captured_at_construction() {
	let registry = registry();
	let codec = JsonCodec::new(&registry);
	let _guard = FormatterGuard::set(SnakeCaseFormatter);

	let captured = codec.encode(&dune()).unwrap();
	assert!(captured.get("publishDate").is_some());

	let fresh = JsonCodec::new(&registry).encode(&dune()).unwrap();
	assert!(fresh.get("publish_date").is_some());
}

#[rstest]
fn test_per_codec_formatter() {
	let registry = registry();
	let codec = XmlCodec::new(&registry).with_formatter(ScreamingFormatter);
	let xml = codec.to_string(&dune()).unwrap();
	assert!(xml.starts_with(r#"<BOOK ISBN="978-0-441-17271-9"><TITLE>Dune</TITLE>"#));
	assert!(xml.contains("<type>1</type>"));
	assert_eq!(codec.from_str::<Book>(&xml).unwrap(), dune());
}
