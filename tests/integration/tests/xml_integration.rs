//! XML integration tests over the shared book model.

use objmap::prelude::*;
use objmap::{Element, XmlCodec, XmlConfig, XmlError};
use objmap_integration_tests::{
	Book, BookEdition, Pallet, Publisher, dune, install_registry, pallet, registry,
};
use rstest::{fixture, rstest};

const DUNE_XML: &str = concat!(
	r#"<book isbn="978-0-441-17271-9">"#,
	"<title>Dune</title>",
	r#"<edition number="1">First Edition</edition>"#,
	"<publishDate>1965-08-01</publishDate>",
	"<author>Frank Herbert</author>",
	"<publisher><name>Chilton Books</name></publisher>",
	"<chapters>",
	"<chapter><number>1</number><title>Arrakis</title></chapter>",
	"<chapter><number>2</number><title>Muad'Dib</title></chapter>",
	"</chapters>",
	"<type>1</type>",
	"<rating>9.5</rating>",
	"</book>"
);

#[fixture]
fn book() -> Book {
	install_registry();
	dune()
}

#[rstest]
fn test_book_encodes_to_expected_xml(book: Book) {
	assert_eq!(book.as_xml().unwrap(), DUNE_XML);
}

#[rstest]
fn test_book_decodes_from_xml(book: Book) {
	assert_eq!(Book::from_xml(DUNE_XML).unwrap(), book);
}

#[rstest]
fn test_decode_tolerates_whitespace(book: Book) {
	let indented = r#"<?xml version="1.0" encoding="UTF-8"?>
<book isbn="978-0-441-17271-9">
	<title>Dune</title>
	<edition number="1">First Edition</edition>
	<publishDate>1965-08-01</publishDate>
	<author>Frank Herbert</author>
	<publisher>
		<name>Chilton Books</name>
	</publisher>
	<chapters>
		<chapter><number>1</number><title>Arrakis</title></chapter>
		<chapter><number>2</number><title>Muad'Dib</title></chapter>
	</chapters>
	<type>1</type>
	<rating>9.5</rating>
</book>
"#;
	assert_eq!(Book::from_xml(indented).unwrap(), book);
}

#[rstest]
fn test_attribute_and_text_content(book: Book) {
	let element = book.as_xml_element().unwrap();
	assert_eq!(element.attribute("isbn"), Some("978-0-441-17271-9"));
	assert!(element.children_named("isbn").next().is_none());

	let edition = element.children_named("edition").next().unwrap();
	assert_eq!(edition.attribute("number"), Some("1"));
	assert_eq!(edition.text(), Some("First Edition"));
	assert!(edition.children().is_empty());
}

#[rstest]
fn test_flat_string_collection(mut book: Book) {
	book.authors = vec!["Frank Herbert".to_string(), "Brian Herbert".to_string()];
	let element = book.as_xml_element().unwrap();
	let authors: Vec<_> = element
		.children_named("author")
		.map(|author| author.text().unwrap_or_default())
		.collect();
	assert_eq!(authors, vec!["Frank Herbert", "Brian Herbert"]);
	assert_eq!(Book::from_xml_element(&element).unwrap(), book);
}

#[rstest]
fn test_absent_optional_is_omitted(mut book: Book) {
	book.publisher = None;
	let element = book.as_xml_element().unwrap();
	assert!(element.children_named("publisher").next().is_none());
	assert_eq!(Book::from_xml_element(&element).unwrap(), book);
}

#[rstest]
fn test_optional_child_decodes(book: Book) {
	let publisher = Publisher::from_xml("<publisher><name>Ace</name><address>New York</address></publisher>").unwrap();
	assert_eq!(publisher.address.as_deref(), Some("New York"));
	assert_eq!(book.publisher.unwrap().address, None);
}

#[rstest]
fn test_text_content_only_element() {
	install_registry();
	let edition = BookEdition::from_xml(r#"<edition number="3">Anniversary &amp; Collector's</edition>"#).unwrap();
	assert_eq!(
		edition,
		BookEdition {
			number: 3,
			name: "Anniversary & Collector's".to_string(),
		}
	);
}

#[rstest]
fn test_unknown_element_is_rejected() {
	install_registry();
	let error = Publisher::from_xml("<publisher><name>Ace</name><founded>1952</founded></publisher>").unwrap_err();
	assert!(matches!(
		error,
		XmlError::UnmappedElement { ref element, ref type_name }
			if element == "founded" && type_name.ends_with("Publisher")
	));
}

#[rstest]
fn test_unknown_element_passed_through_when_configured() {
	let registry = registry();
	let codec = XmlCodec::new(&registry).with_config(
		XmlConfig::builder()
			.unknown_elements(UnknownFieldPolicy::PassThrough)
			.build(),
	);
	// Publisher ignores leftover fields.
	let publisher: Publisher = codec
		.from_str("<publisher><name>Ace</name><founded>1952</founded></publisher>")
		.unwrap();
	assert_eq!(publisher.name, "Ace");
}

#[rstest]
fn test_invalid_attribute_value() {
	install_registry();
	let error = BookEdition::from_xml(r#"<edition number="one">First</edition>"#).unwrap_err();
	assert!(matches!(
		error,
		XmlError::Mapping(MappingError::InvalidValue { ref property, .. }) if property == "number"
	));
}

#[rstest]
fn test_malformed_document() {
	install_registry();
	assert!(matches!(
		Book::from_xml("<book><title>Dune</book>"),
		Err(XmlError::Syntax { .. })
	));
	assert!(matches!(Book::from_xml("   "), Err(XmlError::EmptyDocument)));
}

#[rstest]
fn test_namespaced_round_trip(book: Book) {
	let registry = registry();
	let writer = XmlCodec::new(&registry).with_config(XmlConfig::builder().namespace("urn:library").build());
	let xml = writer.to_string(&book).unwrap();
	assert!(xml.starts_with(r#"<book xmlns="urn:library" isbn="978-0-441-17271-9"><title>Dune</title>"#));

	let element = Element::parse(&xml).unwrap();
	assert_eq!(element.tag(), "{urn:library}book");
	assert_eq!(XmlCodec::new(&registry).decode::<Book>(&element).unwrap(), book);
}

#[rstest]
fn test_prefixed_document_decodes() {
	install_registry();
	let xml = r#"<lib:publisher xmlns:lib="urn:library"><lib:name>Ace</lib:name></lib:publisher>"#;
	let publisher = Publisher::from_xml(xml).unwrap();
	assert_eq!(publisher.name, "Ace");
}

#[rstest]
fn test_configured_default_namespace() {
	let registry = registry();
	let codec = XmlCodec::new(&registry)
		.with_config(XmlConfig::builder().default_namespace("urn:other").build());
	let xml = r#"<publisher xmlns:a="urn:library" xmlns="urn:other"><name>Ace</name></publisher>"#;
	let publisher: Publisher = codec.from_str(xml).unwrap();
	assert_eq!(publisher.name, "Ace");
}

#[rstest]
fn test_padded_string_round_trip() {
	install_registry();
	let publisher = Publisher {
		name: "  padded  ".to_string(),
		address: Some("\tNew York\n".to_string()),
	};
	let xml = publisher.as_xml().unwrap();
	assert_eq!(
		xml,
		"<publisher><name>  padded  </name><address>\tNew York\n</address></publisher>"
	);
	assert_eq!(Publisher::from_xml(&xml).unwrap(), publisher);
}

#[rstest]
fn test_empty_text_content_round_trip() {
	install_registry();
	let edition = BookEdition {
		number: 1,
		name: String::new(),
	};
	let xml = edition.as_xml().unwrap();
	assert_eq!(xml, r#"<bookEdition number="1" />"#);
	assert_eq!(BookEdition::from_xml(&xml).unwrap(), edition);
}

#[rstest]
fn test_text_content_is_trimmed() {
	install_registry();
	let edition = BookEdition::from_xml("<bookEdition number=\"4\">\n\tFourth\n</bookEdition>").unwrap();
	assert_eq!(edition.name, "Fourth");
}

#[rstest]
fn test_empty_child_element_reads_as_empty_string() {
	install_registry();
	let publisher = Publisher::from_xml("<publisher><name /><address></address></publisher>").unwrap();
	assert_eq!(
		publisher,
		Publisher {
			name: String::new(),
			address: Some(String::new()),
		}
	);
}

#[rstest]
fn test_serde_model_round_trip() {
	install_registry();
	let xml = pallet().as_xml().unwrap();
	assert_eq!(
		xml,
		concat!(
			r#"<pallet id="7"><zone>B2</zone><cartons>"#,
			"<carton><sku>A-1</sku><quantity>3</quantity></carton>",
			"<carton><sku>C-9</sku><quantity>12</quantity></carton>",
			"</cartons><state>Staged</state></pallet>"
		)
	);
	assert_eq!(Pallet::from_xml(&xml).unwrap(), pallet());
}

