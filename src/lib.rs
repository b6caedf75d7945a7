//! # objmap
//!
//! Metadata-driven mapping of object graphs to and from JSON and XML.
//!
//! Types describe their properties once, through [`Serializable::declare`], and a
//! [`Registry`] built from those declarations drives both codecs. Wire names, XML
//! attributes, text content, array layouts and custom scalar codecs are all metadata,
//! so the same type can be read and written in either format without per-format code.
//!
//! ## Core Concepts
//!
//! - **Declarations**: each type lists its properties with a [`DeclaredType`]
//! - **Registry**: immutable metadata built once by a [`RegistryBuilder`], optionally installed globally
//! - **Name formatters**: map identifiers to wire names, camelCase by default
//! - **Custom scalar codecs**: convert domain values such as dates to and from text
//!
//! ## Feature Flags
//!
//! - `json` (default) - JSON codec, re-exported as [`json`]
//! - `xml` (default) - XML codec, re-exported as [`xml`]
//! - `full` - All codecs
//!
//! ## Quick Example
//!
//! ```rust
//! use objmap::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Chapter {
//!     number: i64,
//!     title: String,
//! }
//!
//! impl Serializable for Chapter {
//!     fn declare(class: &mut ClassDeclaration) {
//!         class.property("number", DeclaredType::int()).xml_attribute();
//!         class.property("title", DeclaredType::string());
//!     }
//!
//!     fn to_fields(&self) -> Result<Fields, ConstructionError> {
//!         Ok(Fields::new().with("number", self.number).with("title", &self.title))
//!     }
//!
//!     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
//!         Ok(Self { number: fields.take("number")?, title: fields.take("title")? })
//!     }
//! }
//!
//! let registry = Registry::builder().register::<Chapter>().build();
//! let chapter = Chapter { number: 1, title: "Beginnings".to_string() };
//!
//! let json = JsonCodec::new(&registry).to_string(&chapter).unwrap();
//! assert_eq!(json, r#"{"number":1,"title":"Beginnings"}"#);
//!
//! let xml = XmlCodec::new(&registry).to_string(&chapter).unwrap();
//! assert_eq!(xml, r#"<chapter number="1"><title>Beginnings</title></chapter>"#);
//! ```

#![warn(missing_docs)]

pub use objmap_core::*;

/// JSON codec
#[cfg(feature = "json")]
pub use objmap_json as json;

#[cfg(feature = "json")]
pub use objmap_json::{JsonCodec, JsonConfig, JsonError, JsonResult, JsonSerializable};

/// XML codec
#[cfg(feature = "xml")]
pub use objmap_xml as xml;

#[cfg(feature = "xml")]
pub use objmap_xml::{Element, XmlCodec, XmlConfig, XmlError, XmlResult, XmlSerializable};

/// Re-exports of the types needed to declare and map a type.
pub mod prelude {
	pub use crate::{
		ClassDeclaration, ConstructionError, DeclaredType, EnumValue, Fields, Format, FormatSet,
		MappingError, PropertyId, Registry, ScalarCodec, ScalarError, ScalarKind, SerdeSerializable,
		Serializable, TypeRef, UnknownFieldPolicy, Value, XmlArrayPlacement,
	};

	#[cfg(feature = "json")]
	pub use crate::{JsonCodec, JsonSerializable};

	#[cfg(feature = "xml")]
	pub use crate::{XmlCodec, XmlSerializable};
}
