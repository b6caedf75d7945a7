//! Per-type and per-property mapping rules.
//!
//! Metadata is produced by [`RegistryBuilder::build`](crate::registry::RegistryBuilder::build)
//! and never changes afterwards. Every property carries a [`PropertyKind`] tag resolved once
//! at build time, so codecs dispatch with a single `match` instead of probing values.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formatter::PropertyNameFormatter;
use crate::scalar::{CodecRef, ScalarCodec};

/// Custom XML name that maps a property to the text content of its parent element.
pub const TEXT_CONTENT: &str = ".";

/// Document format a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
	/// JSON documents.
	Json,
	/// XML documents.
	Xml,
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Format::Json => f.write_str("JSON"),
			Format::Xml => f.write_str("XML"),
		}
	}
}

/// Set of formats a type is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSet {
	/// JSON enabled.
	pub json: bool,
	/// XML enabled.
	pub xml: bool,
}

impl FormatSet {
	/// Both formats.
	pub const ALL: FormatSet = FormatSet {
		json: true,
		xml: true,
	};
	/// JSON only.
	pub const JSON: FormatSet = FormatSet {
		json: true,
		xml: false,
	};
	/// XML only.
	pub const XML: FormatSet = FormatSet {
		json: false,
		xml: true,
	};

	/// Returns true if `format` is enabled.
	pub fn contains(&self, format: Format) -> bool {
		match format {
			Format::Json => self.json,
			Format::Xml => self.xml,
		}
	}
}

impl Default for FormatSet {
	fn default() -> Self {
		Self::ALL
	}
}

impl From<Format> for FormatSet {
	fn from(format: Format) -> Self {
		match format {
			Format::Json => Self::JSON,
			Format::Xml => Self::XML,
		}
	}
}

/// Placement of collection items in XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XmlArrayPlacement {
	/// Items are direct siblings under the parent element.
	#[default]
	Flat,
	/// Items are wrapped in one element named after the property.
	Nested,
}

/// XML layout of a collection property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlArrayConfig {
	/// Flat or nested placement.
	pub placement: XmlArrayPlacement,
	/// Tag of each item element.
	pub child_name: String,
}

impl XmlArrayConfig {
	/// Creates a layout.
	pub fn new(placement: XmlArrayPlacement, child_name: impl Into<String>) -> Self {
		Self {
			placement,
			child_name: child_name.into(),
		}
	}

	/// Items as siblings named `child_name`.
	pub fn flat(child_name: impl Into<String>) -> Self {
		Self::new(XmlArrayPlacement::Flat, child_name)
	}

	/// Items named `child_name` inside a wrapper element.
	pub fn nested(child_name: impl Into<String>) -> Self {
		Self::new(XmlArrayPlacement::Nested, child_name)
	}
}

/// Primitive value shape, used to coerce XML text on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
	/// `true` / `false`.
	Bool,
	/// Signed integer.
	Int,
	/// Floating point.
	Float,
	/// Text.
	Str,
	/// Unknown shape: all-digit text becomes an integer, anything else stays text.
	Untyped,
}

/// Handling of input keys or elements that match no declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
	/// Hand the value to the constructor under the decoded identifier.
	PassThrough,
	/// Drop the value.
	Ignore,
	/// Fail the decode.
	Reject,
}

/// Identity of a registered Rust type.
#[derive(Clone, Copy)]
pub struct TypeRef {
	id: TypeId,
	path: &'static str,
	name: &'static str,
}

impl TypeRef {
	/// Identity of `T`.
	pub fn of<T: 'static>() -> Self {
		let path = type_name::<T>();
		Self {
			id: TypeId::of::<T>(),
			path,
			name: short_name(path),
		}
	}

	/// Runtime type id.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully-qualified type name, e.g. `shop::model::Box`.
	pub fn path(&self) -> &'static str {
		self.path
	}

	/// Last path segment without generic arguments, e.g. `Box`.
	pub fn name(&self) -> &'static str {
		self.name
	}
}

fn short_name(path: &'static str) -> &'static str {
	let base = path.split('<').next().unwrap_or(path);
	base.rsplit("::").next().unwrap_or(base)
}

impl PartialEq for TypeRef {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path)
	}
}

/// Kind of a single collection item.
#[derive(Debug, Clone)]
pub enum ItemKind {
	/// Plain scalar.
	Primitive(ScalarKind),
	/// Enum rendered as its underlying scalar.
	Enum(ScalarKind),
	/// Nested registered type.
	Object(TypeRef),
	/// Domain scalar handled by a custom codec.
	Custom(CodecRef),
}

/// Dispatch tag of a property.
#[derive(Debug, Clone)]
pub enum PropertyKind {
	/// Plain scalar.
	Primitive(ScalarKind),
	/// Enum rendered as its underlying scalar.
	Enum(ScalarKind),
	/// Nested registered type.
	Object(TypeRef),
	/// Domain scalar handled by a custom codec.
	Custom(CodecRef),
	/// Ordered collection with an explicit item kind.
	Collection(ItemKind),
}

impl PropertyKind {
	/// Kind of each element: the item kind of a collection, else the property's own kind.
	pub fn element_kind(&self) -> ItemKind {
		self.clone().into_item()
	}

	fn into_item(self) -> ItemKind {
		match self {
			PropertyKind::Primitive(kind) => ItemKind::Primitive(kind),
			PropertyKind::Enum(kind) => ItemKind::Enum(kind),
			PropertyKind::Object(type_ref) => ItemKind::Object(type_ref),
			PropertyKind::Custom(codec) => ItemKind::Custom(codec),
			// Collections of collections are not representable; keep the innermost item.
			PropertyKind::Collection(item) => item,
		}
	}
}

/// Declared semantic type of a property.
///
/// # Examples
///
/// ```
/// use objmap_core::{DeclaredType, PropertyKind, ScalarKind};
///
/// let tags = DeclaredType::list(DeclaredType::string()).optional();
/// assert!(tags.is_optional());
/// assert!(matches!(tags.kind(), PropertyKind::Collection(_)));
/// ```
#[derive(Debug, Clone)]
pub struct DeclaredType {
	kind: PropertyKind,
	optional: bool,
}

impl DeclaredType {
	fn primitive(kind: ScalarKind) -> Self {
		Self {
			kind: PropertyKind::Primitive(kind),
			optional: false,
		}
	}

	/// Text.
	pub fn string() -> Self {
		Self::primitive(ScalarKind::Str)
	}

	/// Integer.
	pub fn int() -> Self {
		Self::primitive(ScalarKind::Int)
	}

	/// Floating point number.
	pub fn float() -> Self {
		Self::primitive(ScalarKind::Float)
	}

	/// Boolean.
	pub fn boolean() -> Self {
		Self::primitive(ScalarKind::Bool)
	}

	/// Scalar of unknown shape.
	pub fn untyped() -> Self {
		Self::primitive(ScalarKind::Untyped)
	}

	/// Enum whose underlying values have shape `kind`.
	pub fn enumeration(kind: ScalarKind) -> Self {
		Self {
			kind: PropertyKind::Enum(kind),
			optional: false,
		}
	}

	/// Nested registered type.
	pub fn object<T: 'static>() -> Self {
		Self {
			kind: PropertyKind::Object(TypeRef::of::<T>()),
			optional: false,
		}
	}

	/// Domain scalar converted by `codec`.
	pub fn custom<C: ScalarCodec>(codec: C) -> Self {
		Self {
			kind: PropertyKind::Custom(crate::scalar::codec_ref(codec)),
			optional: false,
		}
	}

	/// Ordered collection of `item`.
	pub fn list(item: DeclaredType) -> Self {
		Self {
			kind: PropertyKind::Collection(item.kind.into_item()),
			optional: false,
		}
	}

	/// Marks the property as optional.
	pub fn optional(mut self) -> Self {
		self.optional = true;
		self
	}

	/// Declared kind, before any codec override.
	pub fn kind(&self) -> &PropertyKind {
		&self.kind
	}

	/// Returns true if the property may be absent.
	pub fn is_optional(&self) -> bool {
		self.optional
	}
}

/// Mapping rules for one property.
#[derive(Debug, Clone)]
pub struct PropertyMetadata {
	name: String,
	declared: DeclaredType,
	kind: PropertyKind,
	custom_names: HashMap<Format, String>,
	codec: Option<CodecRef>,
	is_xml_attribute: bool,
	xml_array_config: Option<XmlArrayConfig>,
}

impl PropertyMetadata {
	pub(crate) fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
		let kind = declared.kind.clone();
		Self {
			name: name.into(),
			declared,
			kind,
			custom_names: HashMap::new(),
			codec: None,
			is_xml_attribute: false,
			xml_array_config: None,
		}
	}

	pub(crate) fn set_custom_name(&mut self, format: Format, wire_name: String) {
		self.custom_names.insert(format, wire_name);
	}

	pub(crate) fn set_xml_attribute(&mut self, flag: bool) {
		self.is_xml_attribute = flag;
	}

	pub(crate) fn set_xml_array_config(&mut self, config: XmlArrayConfig) {
		self.xml_array_config = Some(config);
	}

	pub(crate) fn set_codec(&mut self, codec: CodecRef) {
		self.codec = Some(codec);
	}

	/// Recomputes the dispatch tag after overrides were applied.
	///
	/// A codec on a scalar makes the property custom. A codec on a collection applies
	/// to every item.
	pub(crate) fn resolve(&mut self) {
		self.kind = match (&self.codec, &self.declared.kind) {
			(Some(codec), PropertyKind::Collection(_)) => {
				PropertyKind::Collection(ItemKind::Custom(codec.clone()))
			}
			(Some(codec), _) => PropertyKind::Custom(codec.clone()),
			(None, kind) => kind.clone(),
		};
	}

	/// Internal identifier.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared type.
	pub fn declared_type(&self) -> &DeclaredType {
		&self.declared
	}

	/// Resolved dispatch tag.
	pub fn kind(&self) -> &PropertyKind {
		&self.kind
	}

	/// Returns true if the property may be absent.
	pub fn is_optional(&self) -> bool {
		self.declared.optional
	}

	/// Returns true for collection properties.
	pub fn is_collection(&self) -> bool {
		matches!(self.kind, PropertyKind::Collection(_))
	}

	/// Override wire name for `format`, if any.
	pub fn custom_name(&self, format: Format) -> Option<&str> {
		self.custom_names.get(&format).map(String::as_str)
	}

	/// Custom scalar codec, if any.
	pub fn scalar_codec(&self) -> Option<&CodecRef> {
		self.codec.as_ref()
	}

	/// Returns true if the property is an XML attribute.
	pub fn is_xml_attribute(&self) -> bool {
		self.is_xml_attribute
	}

	/// Explicit XML array layout, if any.
	pub fn xml_array_config(&self) -> Option<&XmlArrayConfig> {
		self.xml_array_config.as_ref()
	}

	/// Returns true if the property maps to the parent element's text content.
	pub fn is_text_content(&self) -> bool {
		self.custom_name(Format::Xml) == Some(TEXT_CONTENT)
	}

	/// Wire name in `format`: the custom name if set, else the formatted identifier.
	pub fn wire_name(&self, format: Format, formatter: &dyn PropertyNameFormatter) -> String {
		match self.custom_name(format) {
			Some(name) => name.to_string(),
			None => formatter.encode(&self.name),
		}
	}

	/// Effective XML array layout.
	///
	/// Collections without an explicit config are flat, each item named after the
	/// property's own wire name.
	pub fn xml_array_layout(&self, formatter: &dyn PropertyNameFormatter) -> XmlArrayConfig {
		self.xml_array_config
			.clone()
			.unwrap_or_else(|| XmlArrayConfig::flat(self.wire_name(Format::Xml, formatter)))
	}
}

/// Mapping rules for one registered type.
#[derive(Debug, Clone)]
pub struct ClassMetadata {
	type_ref: TypeRef,
	custom_name: Option<String>,
	formats: FormatSet,
	properties: Vec<PropertyMetadata>,
	index: HashMap<String, usize>,
	json_key_removals: Vec<String>,
}

impl ClassMetadata {
	pub(crate) fn new(
		type_ref: TypeRef,
		custom_name: Option<String>,
		formats: FormatSet,
		properties: Vec<PropertyMetadata>,
	) -> Self {
		let index = properties
			.iter()
			.enumerate()
			.map(|(position, property)| (property.name.clone(), position))
			.collect();
		Self {
			type_ref,
			custom_name,
			formats,
			properties,
			index,
			json_key_removals: Vec::new(),
		}
	}

	pub(crate) fn with_json_key_removals(mut self, keys: Vec<String>) -> Self {
		self.json_key_removals = keys;
		self
	}

	/// Identity of the type.
	pub fn type_ref(&self) -> TypeRef {
		self.type_ref
	}

	/// Fully-qualified type name.
	pub fn type_name(&self) -> &'static str {
		self.type_ref.path()
	}

	/// Class-level wire name, if any.
	pub fn custom_name(&self) -> Option<&str> {
		self.custom_name.as_deref()
	}

	/// Formats the type was registered for.
	pub fn formats(&self) -> FormatSet {
		self.formats
	}

	/// Returns true if `format` is enabled for this type.
	pub fn supports(&self, format: Format) -> bool {
		self.formats.contains(format)
	}

	/// Properties in declaration order.
	pub fn properties(&self) -> &[PropertyMetadata] {
		&self.properties
	}

	/// Property by internal identifier.
	pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
		self.index
			.get(name)
			.and_then(|position| self.properties.get(*position))
	}

	/// Property whose custom name in `format` is exactly `wire_name`.
	pub fn property_by_custom_name(&self, format: Format, wire_name: &str) -> Option<&PropertyMetadata> {
		self.properties
			.iter()
			.find(|property| property.custom_name(format) == Some(wire_name))
	}

	/// Internal identifier for a wire name.
	///
	/// A recorded custom name wins, then a declared property whose formatted name equals
	/// `wire_name`. Otherwise the wire name is decoded through `formatter`, so the
	/// returned identifier need not name a declared property.
	pub fn identifier_for(
		&self,
		format: Format,
		wire_name: &str,
		formatter: &dyn PropertyNameFormatter,
	) -> String {
		if let Some(property) = self.property_by_custom_name(format, wire_name) {
			return property.name.clone();
		}
		self.properties
			.iter()
			.find(|property| {
				property.custom_name(format).is_none() && formatter.encode(&property.name) == wire_name
			})
			.map(|property| property.name.clone())
			.unwrap_or_else(|| formatter.decode(wire_name))
	}

	/// JSON keys dropped from decoder input.
	pub fn json_key_removals(&self) -> &[String] {
		&self.json_key_removals
	}

	/// Returns true if the JSON key `key` is dropped on decode.
	pub fn removes_json_key(&self, key: &str) -> bool {
		self.json_key_removals.iter().any(|removed| removed == key)
	}

	/// Property that receives the element's text content, if any.
	pub fn text_property(&self) -> Option<&PropertyMetadata> {
		self.properties.iter().find(|property| property.is_text_content())
	}

	/// Collection property laid out flat whose item tag is `tag`.
	pub fn flat_array_property(
		&self,
		tag: &str,
		formatter: &dyn PropertyNameFormatter,
	) -> Option<&PropertyMetadata> {
		self.properties.iter().find(|property| {
			if !property.is_collection() {
				return false;
			}
			let layout = property.xml_array_layout(formatter);
			layout.placement == XmlArrayPlacement::Flat && layout.child_name == tag
		})
	}

	/// Default XML root tag: the class custom name, else the formatted short type name.
	pub fn xml_root_name(&self, formatter: &dyn PropertyNameFormatter) -> String {
		match &self.custom_name {
			Some(name) => name.clone(),
			None => formatter.encode(self.type_ref.name()),
		}
	}
}
