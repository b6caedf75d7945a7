//! Declarative per-type registration.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ConstructionError, MappingError, MappingResult};
use crate::metadata::{
	DeclaredType, Format, FormatSet, PropertyMetadata, TEXT_CONTENT, TypeRef, XmlArrayConfig,
	XmlArrayPlacement,
};
use crate::scalar::{ScalarCodec, codec_ref};
use crate::value::Fields;

/// A type that can be mapped to and from documents.
///
/// `declare` lists the properties and their rules, `to_fields` reads the current
/// values, and `from_fields` is the canonical constructor used on decode.
///
/// Types that already implement `serde::Serialize` and `serde::Deserialize` can implement
/// [`SerdeSerializable`] instead and get `to_fields` and `from_fields` for free.
///
/// # Examples
///
/// ```
/// use objmap_core::{ClassDeclaration, ConstructionError, DeclaredType, Fields, Serializable};
///
/// #[derive(Debug, PartialEq)]
/// struct Crate {
///     id: i64,
///     label: String,
/// }
///
/// impl Serializable for Crate {
///     fn declare(class: &mut ClassDeclaration) {
///         class.property("id", DeclaredType::int()).xml_attribute();
///         class.property("label", DeclaredType::string());
///     }
///
///     fn to_fields(&self) -> Result<Fields, ConstructionError> {
///         Ok(Fields::new().with("id", self.id).with("label", &self.label))
///     }
///
///     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
///         Ok(Self {
///             id: fields.take("id")?,
///             label: fields.take("label")?,
///         })
///     }
/// }
/// ```
pub trait Serializable: Sized + 'static {
	/// Declares the type's properties and mapping rules.
	fn declare(class: &mut ClassDeclaration);

	/// Reads the property values of this instance.
	fn to_fields(&self) -> Result<Fields, ConstructionError>;

	/// Builds a new instance from resolved property values.
	fn from_fields(fields: Fields) -> Result<Self, ConstructionError>;
}

/// Reads an object's fields, naming the type when the reader fails.
pub fn read_fields<T: Serializable>(object: &T) -> MappingResult<Fields> {
	object.to_fields().map_err(|source| MappingError::Read {
		type_name: std::any::type_name::<T>().to_string(),
		source,
	})
}

/// A `serde` type mapped through its own `Serialize` and `Deserialize` impls.
///
/// Only the declaration is written by hand. Property identifiers are the serialized
/// field names, so a `#[serde(rename)]` renames the identifier as well. Properties with a
/// custom scalar codec need a hand-written [`Serializable`] impl, since
/// [`Value::Custom`](crate::Value::Custom) does not pass through `serde`.
///
/// # Examples
///
/// ```
/// use objmap_core::{ClassDeclaration, DeclaredType, SerdeSerializable, Serializable, Value};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Pallet {
///     id: i64,
///     zone: Option<String>,
/// }
///
/// impl SerdeSerializable for Pallet {
///     fn declare(class: &mut ClassDeclaration) {
///         class.property("id", DeclaredType::int()).xml_attribute();
///         class.property("zone", DeclaredType::string().optional());
///     }
/// }
///
/// let pallet = Pallet { id: 3, zone: None };
/// let fields = pallet.to_fields().unwrap();
/// assert_eq!(fields.get("id"), Some(&Value::Int(3)));
/// assert_eq!(Pallet::from_fields(fields).unwrap(), pallet);
/// ```
pub trait SerdeSerializable: Serialize + DeserializeOwned + 'static {
	/// Declares the type's properties and mapping rules.
	fn declare(class: &mut ClassDeclaration);
}

impl<T: SerdeSerializable> Serializable for T {
	fn declare(class: &mut ClassDeclaration) {
		<T as SerdeSerializable>::declare(class);
	}

	fn to_fields(&self) -> Result<Fields, ConstructionError> {
		crate::ser::to_fields(self)
	}

	fn from_fields(fields: Fields) -> Result<Self, ConstructionError> {
		crate::de::from_fields(fields)
	}
}

/// Collects the rules of one type while [`Serializable::declare`] runs.
#[derive(Debug)]
pub struct ClassDeclaration {
	type_ref: TypeRef,
	name: Option<String>,
	formats: FormatSet,
	properties: Vec<PropertyDeclaration>,
	json_key_removals: Vec<String>,
}

impl ClassDeclaration {
	pub(crate) fn new(type_ref: TypeRef) -> Self {
		Self {
			type_ref,
			name: None,
			formats: FormatSet::ALL,
			properties: Vec::new(),
			json_key_removals: Vec::new(),
		}
	}

	/// Declares a class-level wire name, used as the default XML root tag.
	pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
		self.name = Some(name.into());
		self
	}

	/// Restricts the formats the type supports.
	pub fn formats(&mut self, formats: FormatSet) -> &mut Self {
		self.formats = formats;
		self
	}

	/// Lists JSON keys that are dropped from decoder input before any other handling.
	///
	/// Keys are compared verbatim against the input, before name decoding. Use this for
	/// keys a producer emits that the type has no property for, such as `$schema`.
	pub fn json_key_removals<I, K>(&mut self, keys: I) -> &mut Self
	where
		I: IntoIterator<Item = K>,
		K: Into<String>,
	{
		self.json_key_removals.extend(keys.into_iter().map(Into::into));
		self
	}

	/// Declares a property and returns it for further configuration.
	///
	/// Declaring the same identifier twice replaces the earlier declaration.
	pub fn property(&mut self, name: impl Into<String>, declared: DeclaredType) -> &mut PropertyDeclaration {
		let name = name.into();
		let declaration = PropertyDeclaration {
			metadata: PropertyMetadata::new(name.clone(), declared),
		};
		let position = match self
			.properties
			.iter()
			.position(|existing| existing.metadata.name() == name)
		{
			Some(position) => {
				warn!(
					type_name = self.type_ref.path(),
					property = %name,
					"Property declared twice, keeping the last declaration"
				);
				self.properties[position] = declaration;
				position
			}
			None => {
				self.properties.push(declaration);
				self.properties.len() - 1
			}
		};
		&mut self.properties[position]
	}

	pub(crate) fn type_ref(&self) -> TypeRef {
		self.type_ref
	}

	pub(crate) fn set_formats(&mut self, formats: FormatSet) {
		self.formats = formats;
	}

	pub(crate) fn property_mut(&mut self, name: &str) -> Option<&mut PropertyMetadata> {
		self.properties
			.iter_mut()
			.find(|property| property.metadata.name() == name)
			.map(|property| &mut property.metadata)
	}

	pub(crate) fn take_json_key_removals(&mut self) -> Vec<String> {
		std::mem::take(&mut self.json_key_removals)
	}

	pub(crate) fn into_parts(self) -> (TypeRef, Option<String>, FormatSet, Vec<PropertyMetadata>) {
		let properties = self
			.properties
			.into_iter()
			.map(|property| property.metadata)
			.collect();
		(self.type_ref, self.name, self.formats, properties)
	}
}

/// Inline rules for one property.
#[derive(Debug)]
pub struct PropertyDeclaration {
	metadata: PropertyMetadata,
}

impl PropertyDeclaration {
	/// Wire name override for `format`.
	pub fn name_for(&mut self, format: Format, wire_name: impl Into<String>) -> &mut Self {
		self.metadata.set_custom_name(format, wire_name.into());
		self
	}

	/// JSON wire name override.
	pub fn json_name(&mut self, wire_name: impl Into<String>) -> &mut Self {
		self.name_for(Format::Json, wire_name)
	}

	/// XML wire name override.
	pub fn xml_name(&mut self, wire_name: impl Into<String>) -> &mut Self {
		self.name_for(Format::Xml, wire_name)
	}

	/// Maps the property to the parent element's text content in XML.
	pub fn xml_text(&mut self) -> &mut Self {
		self.xml_name(TEXT_CONTENT)
	}

	/// Renders the property as an XML attribute.
	pub fn xml_attribute(&mut self) -> &mut Self {
		self.metadata.set_xml_attribute(true);
		self
	}

	/// XML layout for a collection property.
	pub fn xml_array(&mut self, placement: XmlArrayPlacement, child_name: impl Into<String>) -> &mut Self {
		self.metadata
			.set_xml_array_config(XmlArrayConfig::new(placement, child_name));
		self
	}

	/// Custom scalar codec for the value, or for each item of a collection.
	pub fn codec<C: ScalarCodec>(&mut self, codec: C) -> &mut Self {
		self.metadata.set_codec(codec_ref(codec));
		self
	}
}
