//! # objmap-core
//!
//! Metadata registry and value model shared by the objmap codecs.
//!
//! ## Overview
//!
//! Types describe themselves through [`Serializable`]: a declaration of their properties
//! and mapping rules, a reader producing [`Fields`], and a constructor consuming them.
//! A [`RegistryBuilder`] collects those declarations together with any overrides and
//! freezes them into an immutable [`Registry`] that the JSON and XML codecs consult.
//!
//! ## Features
//!
//! - **Explicit metadata**: every property is declared with its type, wire names,
//!   attribute placement, array layout and custom scalar codec
//! - **Pre-resolved dispatch**: each property carries a [`PropertyKind`] tag computed
//!   once at build time
//! - **Pluggable naming**: camelCase, kebab-case and snake_case [`formatter`]s
//! - **Date codecs**: [`Iso8601Date`], [`XsdDate`] and [`XsdDateTime`]
//! - **serde bridge**: [`SerdeSerializable`] reads and builds `serde` types through [`ser`] and [`de`]
//!
//! ## Example
//!
//! ```
//! use objmap_core::{ClassDeclaration, ConstructionError, DeclaredType, Fields, Registry, Serializable};
//!
//! struct Label {
//!     text: String,
//! }
//!
//! impl Serializable for Label {
//!     fn declare(class: &mut ClassDeclaration) {
//!         class.property("text", DeclaredType::string()).xml_text();
//!     }
//!
//!     fn to_fields(&self) -> Result<Fields, ConstructionError> {
//!         Ok(Fields::new().with("text", &self.text))
//!     }
//!
//!     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
//!         Ok(Self { text: fields.take("text")? })
//!     }
//! }
//!
//! let registry = Registry::builder().register::<Label>().build();
//! assert!(registry.is_registered::<Label>());
//! ```

#![warn(missing_docs)]

pub mod de;
pub mod declaration;
pub mod error;
pub mod formatter;
pub mod helpers;
pub mod metadata;
pub mod registry;
pub mod scalar;
pub mod ser;
pub mod value;

pub use declaration::{
	ClassDeclaration, PropertyDeclaration, SerdeSerializable, Serializable, read_fields,
};
pub use error::{ConstructionError, MappingError, MappingResult, ScalarError};
pub use formatter::{
	CamelCaseFormatter, KebabCaseFormatter, PropertyNameFormatter, SnakeCaseFormatter,
	current_formatter, set_formatter,
};
pub use helpers::{Iso8601Date, XsdDate, XsdDateTime};
pub use metadata::{
	ClassMetadata, DeclaredType, Format, FormatSet, ItemKind, PropertyKind, PropertyMetadata,
	ScalarKind, TEXT_CONTENT, TypeRef, UnknownFieldPolicy, XmlArrayConfig, XmlArrayPlacement,
};
pub use registry::{PropertyId, Registry, RegistryBuilder};
pub use scalar::{CodecRef, DynScalarCodec, ScalarCodec, codec_ref};
pub use value::{CustomValue, EnumValue, Fields, FromValue, Value, ValueTypeError};
