//! Model types shared by the integration tests.

use chrono::NaiveDate;
use objmap::prelude::*;
use objmap::Iso8601Date;
use serde::{Deserialize, Serialize};

/// Kind of book, written as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookType {
	Fiction,
	NonFiction,
}

impl EnumValue for BookType {
	fn to_value(&self) -> Value {
		match self {
			BookType::Fiction => Value::Int(1),
			BookType::NonFiction => Value::Int(2),
		}
	}

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Int(1) => Some(BookType::Fiction),
			Value::Int(2) => Some(BookType::NonFiction),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
	pub number: i64,
	pub title: String,
}

impl Serializable for Chapter {
	fn declare(class: &mut ClassDeclaration) {
		class.property("number", DeclaredType::int());
		class.property("title", DeclaredType::string());
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new()
			.with("number", self.number)
			.with("title", &self.title))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			number: fields.take("number")?,
			title: fields.take("title")?,
		})
	}
}

/// Edition number as an XML attribute, edition name as the element text.
#[derive(Debug, Clone, PartialEq)]
pub struct BookEdition {
	pub number: i64,
	pub name: String,
}

impl Serializable for BookEdition {
	fn declare(class: &mut ClassDeclaration) {
		class.property("number", DeclaredType::int()).xml_attribute();
		class.property("name", DeclaredType::string()).xml_text();
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new()
			.with("number", self.number)
			.with("name", &self.name))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			number: fields.take("number")?,
			name: fields.take("name")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Publisher {
	pub name: String,
	pub address: Option<String>,
}

impl Serializable for Publisher {
	fn declare(class: &mut ClassDeclaration) {
		class.property("name", DeclaredType::string());
		class.property("address", DeclaredType::string().optional());
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new()
			.with("name", &self.name)
			.with("address", self.address.clone()))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			name: fields.take("name")?,
			address: fields.take_opt("address")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
	pub title: String,
	pub isbn: String,
	pub edition: BookEdition,
	pub publish_date: NaiveDate,
	pub authors: Vec<String>,
	pub publisher: Option<Publisher>,
	pub chapters: Vec<Chapter>,
	pub book_type: BookType,
	pub rating: f64,
}

impl Serializable for Book {
	fn declare(class: &mut ClassDeclaration) {
		class.property("title", DeclaredType::string());
		class.property("isbn", DeclaredType::string()).xml_attribute();
		class.property("edition", DeclaredType::object::<BookEdition>());
		class.property("publish_date", DeclaredType::custom(Iso8601Date));
		class
			.property("authors", DeclaredType::list(DeclaredType::string()))
			.xml_name("author");
		class.property("publisher", DeclaredType::object::<Publisher>().optional());
		class
			.property("chapters", DeclaredType::list(DeclaredType::object::<Chapter>()))
			.xml_array(XmlArrayPlacement::Nested, "chapter");
		class
			.property("book_type", DeclaredType::enumeration(ScalarKind::Int))
			.json_name("type")
			.xml_name("type");
		class.property("rating", DeclaredType::float());
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new()
			.with("title", &self.title)
			.with("isbn", &self.isbn)
			.with("edition", Value::object(&self.edition)?)
			.with("publish_date", Value::custom(self.publish_date))
			.with("authors", self.authors.clone())
			.with("publisher", self.publisher.as_ref().map(Value::object).transpose()?)
			.with("chapters", Value::objects(&self.chapters)?)
			.with("book_type", Value::enumeration(&self.book_type))
			.with("rating", self.rating))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			title: fields.take("title")?,
			isbn: fields.take("isbn")?,
			edition: fields.take_object("edition")?,
			publish_date: fields.take_custom("publish_date")?,
			authors: fields.take_or_default("authors")?,
			publisher: fields.take_object_opt("publisher")?,
			chapters: fields.take_objects("chapters")?,
			book_type: fields.take_enum("book_type")?,
			rating: fields.take("rating")?,
		})
	}
}

/// A box, written as `<box>` in XML.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageBox {
	pub id: i64,
	pub label: String,
}

impl Serializable for StorageBox {
	fn declare(class: &mut ClassDeclaration) {
		class.name("box");
		class.property("id", DeclaredType::int());
		class.property("label", DeclaredType::string());
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new().with("id", self.id).with("label", &self.label))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			id: fields.take("id")?,
			label: fields.take("label")?,
		})
	}
}

/// Boxes wrapped in a `<boxes>` element, one `<box>` per item.
#[derive(Debug, Clone, PartialEq)]
pub struct Warehouse {
	pub boxes: Vec<StorageBox>,
}

impl Serializable for Warehouse {
	fn declare(class: &mut ClassDeclaration) {
		class
			.property("boxes", DeclaredType::list(DeclaredType::object::<StorageBox>()))
			.xml_array(XmlArrayPlacement::Nested, "box");
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new().with("boxes", Value::objects(&self.boxes)?))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			boxes: fields.take_objects("boxes")?,
		})
	}
}

/// Boxes written flat, each as a `<boxes>` sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
	pub boxes: Vec<StorageBox>,
}

impl Serializable for Shelf {
	fn declare(class: &mut ClassDeclaration) {
		class.property("boxes", DeclaredType::list(DeclaredType::object::<StorageBox>()));
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		Ok(Fields::new().with("boxes", Value::objects(&self.boxes)?))
	}

	fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
		Ok(Self {
			boxes: fields.take_objects("boxes")?,
		})
	}
}

/// Loading state of a pallet, written as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PalletState {
	Staged,
	Shipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carton {
	pub sku: String,
	pub quantity: u32,
}

impl SerdeSerializable for Carton {
	fn declare(class: &mut ClassDeclaration) {
		class.property("sku", DeclaredType::string());
		class.property("quantity", DeclaredType::int());
	}
}

/// Mapped entirely through its serde derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pallet {
	pub id: i64,
	pub zone: Option<String>,
	pub cartons: Vec<Carton>,
	pub state: PalletState,
}

impl SerdeSerializable for Pallet {
	fn declare(class: &mut ClassDeclaration) {
		class.property("id", DeclaredType::int()).xml_attribute();
		class.property("zone", DeclaredType::string().optional());
		class
			.property("cartons", DeclaredType::list(DeclaredType::object::<Carton>()))
			.xml_array(XmlArrayPlacement::Nested, "carton");
		class.property("state", DeclaredType::enumeration(ScalarKind::Str));
	}
}
