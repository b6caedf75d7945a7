//! JSON integration tests over the shared book model.

use assert_json_diff::assert_json_eq;
use objmap::json::JsonConfig;
use objmap::prelude::*;
use objmap::{JsonCodec, JsonError};
use objmap_integration_tests::{
	Book, BookEdition, BookType, Pallet, PalletState, Publisher, dune, install_registry, pallet,
	registry,
};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn book() -> Book {
	install_registry();
	dune()
}

fn dune_json() -> serde_json::Value {
	json!({
		"title": "Dune",
		"isbn": "978-0-441-17271-9",
		"edition": { "number": 1, "name": "First Edition" },
		"publishDate": "1965-08-01",
		"authors": ["Frank Herbert"],
		"publisher": { "name": "Chilton Books" },
		"chapters": [
			{ "number": 1, "title": "Arrakis" },
			{ "number": 2, "title": "Muad'Dib" }
		],
		"type": 1,
		"rating": 9.5
	})
}

#[rstest]
fn test_book_encodes_to_expected_json(book: Book) {
	let encoded: serde_json::Value = serde_json::from_str(&book.as_json().unwrap()).unwrap();
	assert_json_eq!(encoded, dune_json());
}

#[rstest]
fn test_keys_follow_declaration_order(book: Book) {
	let text = book.as_json().unwrap();
	let positions: Vec<usize> = ["\"title\"", "\"isbn\"", "\"edition\"", "\"publishDate\"", "\"type\""]
		.iter()
		.map(|key| text.find(key).unwrap())
		.collect();
	let mut sorted = positions.clone();
	sorted.sort_unstable();
	assert_eq!(positions, sorted);
}

#[rstest]
fn test_book_round_trip(book: Book) {
	let text = book.as_json().unwrap();
	assert_eq!(Book::from_json(&text).unwrap(), book);
}

#[rstest]
fn test_absent_optional_is_omitted(mut book: Book) {
	book.publisher = None;
	let encoded = JsonCodec::global().unwrap().encode(&book).unwrap();
	assert!(encoded.get("publisher").is_none());
	assert_eq!(Book::from_json(&encoded.to_string()).unwrap().publisher, None);
}

#[rstest]
fn test_null_input_reads_as_absent(book: Book) {
	let mut input = dune_json();
	input["publisher"] = serde_json::Value::Null;
	let decoded: Book = JsonCodec::global().unwrap().decode(&input).unwrap();
	assert_eq!(decoded.publisher, None);
	assert_eq!(decoded.title, book.title);
}

#[rstest]
fn test_enum_written_as_value(mut book: Book) {
	book.book_type = BookType::NonFiction;
	let encoded = JsonCodec::global().unwrap().encode(&book).unwrap();
	assert_eq!(encoded["type"], json!(2));
	assert_eq!(Book::from_json(&encoded.to_string()).unwrap().book_type, BookType::NonFiction);
}

#[rstest]
fn test_unknown_enum_value_fails_construction() {
	install_registry();
	let mut input = dune_json();
	input["type"] = json!(9);
	let error = JsonCodec::global().unwrap().decode::<Book>(&input).unwrap_err();
	assert!(matches!(
		error,
		JsonError::Mapping(MappingError::Construction {
			source: ConstructionError::InvalidEnumValue { ref field, .. },
			..
		}) if field == "book_type"
	));
}

#[rstest]
fn test_unknown_key_passed_to_constructor() {
	install_registry();
	let mut input = dune_json();
	input["subtitle"] = json!("Book One");
	// Book ignores leftover fields, so pass-through decodes cleanly.
	assert!(JsonCodec::global().unwrap().decode::<Book>(&input).is_ok());
}

#[rstest]
fn test_unknown_key_rejected_when_configured() {
	let registry = registry();
	let codec = JsonCodec::new(&registry)
		.with_config(JsonConfig::builder().unknown_keys(UnknownFieldPolicy::Reject).build());
	let mut input = dune_json();
	input["subtitle"] = json!("Book One");
	let error = codec.decode::<Book>(&input).unwrap_err();
	assert!(matches!(error, JsonError::UnknownKey { ref key, .. } if key == "subtitle"));
}

#[rstest]
fn test_missing_required_property() {
	install_registry();
	let mut input = dune_json();
	input.as_object_mut().unwrap().remove("title");
	let error = Book::from_json(&input.to_string()).unwrap_err();
	assert!(matches!(
		error,
		JsonError::Mapping(MappingError::Construction {
			source: ConstructionError::MissingField(ref field),
			..
		}) if field == "title"
	));
}

#[rstest]
fn test_invalid_date_text() {
	install_registry();
	let mut input = dune_json();
	input["publishDate"] = json!("first of august");
	let error = Book::from_json(&input.to_string()).unwrap_err();
	assert!(matches!(error, JsonError::Mapping(MappingError::Scalar(_))));
}

#[rstest]
fn test_malformed_json() {
	install_registry();
	assert!(matches!(
		Book::from_json("{\"title\": "),
		Err(JsonError::Syntax(_))
	));
}

#[rstest]
fn test_nested_object_decodes_standalone() {
	install_registry();
	let publisher = Publisher::from_json(r#"{"name":"Ace","address":"New York"}"#).unwrap();
	assert_eq!(
		publisher,
		Publisher {
			name: "Ace".to_string(),
			address: Some("New York".to_string()),
		}
	);
}

#[rstest]
fn test_pretty_output(book: Book) {
	let registry = registry();
	let codec = JsonCodec::new(&registry).with_config(JsonConfig::builder().pretty(true).build());
	let text = codec.to_string(&book).unwrap();
	assert!(text.starts_with("{\n  \"title\": \"Dune\""));
	assert_eq!(codec.from_str::<Book>(&text).unwrap(), book);
}

#[rstest]
fn test_sentinel_custom_name_in_json() {
	let registry = Registry::builder()
		.register::<BookEdition>()
		.register_custom_name(PropertyId::of::<BookEdition>("name"), Format::Json, ".")
		.build();
	let codec = JsonCodec::new(&registry);
	let edition = BookEdition {
		number: 2,
		name: "Second".to_string(),
	};

	let encoded = codec.encode(&edition).unwrap();
	assert_eq!(encoded, json!({ "number": 2, ".": "Second" }));
	assert_eq!(codec.decode::<BookEdition>(&encoded).unwrap(), edition);
}

#[rstest]
fn test_xml_text_content_keeps_json_name() {
	let registry = registry();
	let edition = BookEdition {
		number: 2,
		name: "Second".to_string(),
	};
	let encoded = JsonCodec::new(&registry).encode(&edition).unwrap();
	assert_eq!(encoded, json!({ "number": 2, "name": "Second" }));
}

#[rstest]
fn test_serde_model_encodes_in_declaration_order() {
	install_registry();
	assert_eq!(
		pallet().as_json().unwrap(),
		r#"{"id":7,"zone":"B2","cartons":[{"sku":"A-1","quantity":3},{"sku":"C-9","quantity":12}],"state":"Staged"}"#
	);
}

#[rstest]
fn test_serde_model_round_trip() {
	install_registry();
	let mut shipped = pallet();
	shipped.zone = None;
	shipped.state = PalletState::Shipped;
	let text = shipped.as_json().unwrap();
	assert!(!text.contains("zone"));
	assert_eq!(Pallet::from_json(&text).unwrap(), shipped);
}

#[rstest]
fn test_serde_model_reports_constructor_errors() {
	install_registry();
	let error = Pallet::from_json(r#"{"id":7,"cartons":[],"state":"Lost"}"#).unwrap_err();
	assert!(matches!(
		error,
		JsonError::Mapping(MappingError::Construction {
			source: ConstructionError::Custom(ref message),
			..
		}) if message.contains("Lost")
	));

	let error = Pallet::from_json(r#"{"cartons":[],"state":"Staged"}"#).unwrap_err();
	assert!(matches!(
		error,
		JsonError::Mapping(MappingError::Construction {
			source: ConstructionError::MissingField(ref field),
			..
		}) if field == "id"
	));
}

