//! Flat and nested XML array layouts.

use objmap::prelude::*;
use objmap::{Element, XmlCodec, XmlError};
use objmap_integration_tests::{Shelf, StorageBox, Warehouse, install_registry, registry, warehouse};
use rstest::{fixture, rstest};

const WAREHOUSE_XML: &str = "<warehouse><boxes><box><id>1</id><label>a</label></box><box><id>2</id><label>b</label></box></boxes></warehouse>";

#[fixture]
fn stock() -> Warehouse {
	install_registry();
	warehouse()
}

#[rstest]
fn test_nested_layout_encodes_wrapper(stock: Warehouse) {
	assert_eq!(stock.as_xml().unwrap(), WAREHOUSE_XML);
}

#[rstest]
fn test_nested_layout_decodes(stock: Warehouse) {
	assert_eq!(Warehouse::from_xml(WAREHOUSE_XML).unwrap(), stock);
}

#[rstest]
fn test_nested_layout_structure(stock: Warehouse) {
	let element = stock.as_xml_element().unwrap();
	assert_eq!(element.children().len(), 1);
	let wrapper = &element.children()[0];
	assert_eq!(wrapper.tag(), "boxes");
	assert_eq!(wrapper.children_named("box").count(), 2);
}

#[rstest]
fn test_flat_layout_repeats_wire_name(stock: Warehouse) {
	let shelf = Shelf { boxes: stock.boxes };
	let element = shelf.as_xml_element().unwrap();
	assert_eq!(element.tag(), "shelf");
	assert_eq!(element.children().len(), 2);
	assert!(element.children().iter().all(|child| child.tag() == "boxes"));
	assert_eq!(element.children()[1].children()[1].text(), Some("b"));
	assert_eq!(Shelf::from_xml_element(&element).unwrap(), shelf);
}

#[rstest]
fn test_empty_nested_collection(mut stock: Warehouse) {
	stock.boxes.clear();
	let xml = stock.as_xml().unwrap();
	assert_eq!(xml, "<warehouse><boxes /></warehouse>");
	assert_eq!(Warehouse::from_xml(&xml).unwrap(), stock);
	assert!(Warehouse::from_xml("<warehouse />").unwrap().boxes.is_empty());
}

#[rstest]
#[case("<warehouse><boxes><crate><id>1</id><label>a</label></crate></boxes></warehouse>", "crate")]
#[case("<warehouse><boxes><box><id>1</id><label>a</label></box><boxes /></boxes></warehouse>", "boxes")]
fn test_nested_layout_rejects_foreign_children(#[case] xml: &str, #[case] found_tag: &str) {
	install_registry();
	let error = Warehouse::from_xml(xml).unwrap_err();
	assert!(matches!(
		error,
		XmlError::MalformedArrayStructure { ref wrapper, ref expected, ref found }
			if wrapper == "boxes" && expected == "box" && found == found_tag
	));
}

#[rstest]
fn test_flat_items_mixed_with_other_children() {
	let registry = registry();
	let xml = "<shelf><boxes><id>7</id><label>x</label></boxes><boxes><id>8</id><label>y</label></boxes></shelf>";
	let shelf: Shelf = XmlCodec::new(&registry).from_str(xml).unwrap();
	assert_eq!(
		shelf.boxes,
		vec![
			StorageBox {
				id: 7,
				label: "x".to_string(),
			},
			StorageBox {
				id: 8,
				label: "y".to_string(),
			},
		]
	);
}

#[rstest]
fn test_class_name_used_as_root_tag() {
	install_registry();
	let element = StorageBox {
		id: 3,
		label: "c".to_string(),
	}
	.as_xml_element()
	.unwrap();
	assert_eq!(element.tag(), "box");
}

#[rstest]
fn test_layout_override_at_registration() {
	let registry = Registry::builder()
		.register::<StorageBox>()
		.register::<Shelf>()
		.register_xml_array_config(PropertyId::of::<Shelf>("boxes"), XmlArrayPlacement::Nested, "item")
		.build();
	let codec = XmlCodec::new(&registry);
	let shelf = Shelf {
		boxes: vec![StorageBox {
			id: 1,
			label: "a".to_string(),
		}],
	};
	let element: Element = codec.encode(&shelf).unwrap();
	assert_eq!(
		element.to_string(),
		"<shelf><boxes><item><id>1</id><label>a</label></item></boxes></shelf>"
	);
	assert_eq!(codec.decode::<Shelf>(&element).unwrap(), shelf);
}

#[rstest]
#[case(XmlArrayPlacement::Nested, 1, 3)]
#[case(XmlArrayPlacement::Flat, 3, 0)]
fn test_layout_counts(#[case] placement: XmlArrayPlacement, #[case] top_level: usize, #[case] wrapped: usize) {
	let registry = Registry::builder()
		.register::<StorageBox>()
		.register::<Shelf>()
		.register_xml_array_config(PropertyId::of::<Shelf>("boxes"), placement, "item")
		.build();
	let shelf = Shelf {
		boxes: (1..=3)
			.map(|id| StorageBox {
				id,
				label: format!("box-{id}"),
			})
			.collect(),
	};
	let element = XmlCodec::new(&registry).encode(&shelf).unwrap();

	assert_eq!(element.children().len(), top_level);
	let items_in_wrapper: usize = element
		.children_named("boxes")
		.map(|wrapper| wrapper.children_named("item").count())
		.sum();
	assert_eq!(items_in_wrapper, wrapped);
	assert_eq!(XmlCodec::new(&registry).decode::<Shelf>(&element).unwrap(), shelf);
}
