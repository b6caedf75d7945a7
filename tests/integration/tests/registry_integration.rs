//! Registry behavior observed through both codecs.

use objmap::prelude::*;
use objmap::{JsonCodec, JsonError, XmlCodec, XmlError};
use objmap_integration_tests::{Book, Chapter, Publisher, StorageBox, install_registry, registry};
use rstest::rstest;
use serde_json::json;

struct Unregistered;

impl Serializable for Unregistered {
	fn declare(_: &mut ClassDeclaration) {}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new())
	}

	fn from_fields(_: Fields) -> Result<Self, ConstructionError> {
		Ok(Unregistered)
	}
}

#[rstest]
fn test_global_registry_installs_once() {
	install_registry();
	let global = objmap::registry::global().unwrap();
	assert!(global.is_registered::<Book>());
	assert!(registry().install().is_err());
}

#[rstest]
fn test_unregistered_type_fails_in_both_formats() {
	install_registry();
	assert!(matches!(
		Unregistered.as_json(),
		Err(JsonError::Mapping(MappingError::UnregisteredType { .. }))
	));
	assert!(matches!(
		Unregistered.as_xml(),
		Err(XmlError::Mapping(MappingError::UnregisteredType { .. }))
	));
}

#[rstest]
fn test_repeated_registration_is_idempotent() {
	let registry = Registry::builder()
		.register::<Chapter>()
		.register::<Chapter>()
		.register::<Publisher>()
		.register::<Chapter>()
		.build();
	assert_eq!(registry.len(), 2);
	assert_eq!(registry.lookup_type::<Chapter>().unwrap().properties().len(), 2);
}

#[rstest]
fn test_metadata_lookup() {
	let registry = registry();
	let class = registry.lookup_type::<Book>().unwrap();
	assert!(class.supports(Format::Json) && class.supports(Format::Xml));

	let book_type = registry.lookup_property(TypeRef::of::<Book>(), "book_type").unwrap();
	assert_eq!(book_type.custom_name(Format::Json), Some("type"));
	assert!(!book_type.is_collection());

	let chapters = registry.lookup_property(TypeRef::of::<Book>(), "chapters").unwrap();
	assert!(chapters.is_collection());
	assert_eq!(chapters.xml_array_config().map(|config| config.child_name.as_str()), Some("chapter"));

	assert!(matches!(
		registry.lookup_property(TypeRef::of::<Book>(), "subtitle"),
		Err(MappingError::UnknownProperty { ref property, .. }) if property == "subtitle"
	));
}

#[rstest]
fn test_format_restricted_registration() {
	let registry = Registry::builder()
		.register_with_formats::<StorageBox>(FormatSet::JSON)
		.build();
	let item = StorageBox {
		id: 1,
		label: "a".to_string(),
	};

	assert_eq!(JsonCodec::new(&registry).encode(&item).unwrap(), json!({ "id": 1, "label": "a" }));
	assert!(matches!(
		XmlCodec::new(&registry).encode(&item),
		Err(XmlError::Mapping(MappingError::FormatNotEnabled { format: Format::Xml, .. }))
	));
}

#[rstest]
fn test_overrides_by_property_path() {
	let path = format!("{}.label", std::any::type_name::<StorageBox>());
	let registry = Registry::builder()
		.register::<StorageBox>()
		.register_custom_name(path.as_str(), Format::Json, "tag")
		.register_xml_attribute(path.as_str())
		.build();
	let item = StorageBox {
		id: 1,
		label: "a".to_string(),
	};

	let json = JsonCodec::new(&registry).encode(&item).unwrap();
	assert_eq!(json, json!({ "id": 1, "tag": "a" }));
	assert_eq!(JsonCodec::new(&registry).decode::<StorageBox>(&json).unwrap(), item);

	let xml = XmlCodec::new(&registry).to_string(&item).unwrap();
	assert_eq!(xml, r#"<box label="a"><id>1</id></box>"#);
	assert_eq!(XmlCodec::new(&registry).from_str::<StorageBox>(&xml).unwrap(), item);
}

#[rstest]
fn test_override_on_missing_property_is_skipped() {
	let registry = Registry::builder()
		.register::<StorageBox>()
		.register_xml_attribute(PropertyId::of::<StorageBox>("weight"))
		.build();
	assert!(registry.is_registered::<StorageBox>());
	assert!(matches!(
		registry.lookup_property(TypeRef::of::<StorageBox>(), "weight"),
		Err(MappingError::UnknownProperty { .. })
	));
}
