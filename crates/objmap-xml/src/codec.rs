//! Metadata-driven XML encoding and decoding.

use std::any::type_name;
use std::sync::Arc;

use objmap_core::{
	ClassMetadata, Fields, Format, ItemKind, MappingError, PropertyKind, PropertyMetadata,
	PropertyNameFormatter, Registry, ScalarKind, Serializable, TypeRef, UnknownFieldPolicy, Value,
	XmlArrayPlacement, current_formatter, read_fields, registry,
};
use tracing::trace;

use crate::config::XmlConfig;
use crate::element::{Element, split_clark};
use crate::error::{XmlError, XmlResult};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// XML codec bound to a registry.
///
/// Encoding produces an [`Element`] tree:
///
/// - properties flagged as XML attributes become attributes of the element
/// - the text-content property becomes the element's own text
/// - collections are written flat or nested per their array layout
/// - nested objects become child elements named after the property
/// - everything else becomes a child element holding the value as text
///
/// # Examples
///
/// ```
/// use objmap_core::{ClassDeclaration, ConstructionError, DeclaredType, Fields, Registry, Serializable};
/// use objmap_xml::XmlCodec;
///
/// #[derive(Debug, PartialEq)]
/// struct Edition {
///     number: i64,
///     name: String,
/// }
///
/// impl Serializable for Edition {
///     fn declare(class: &mut ClassDeclaration) {
///         class.property("number", DeclaredType::int()).xml_attribute();
///         class.property("name", DeclaredType::string()).xml_text();
///     }
///
///     fn to_fields(&self) -> Result<Fields, ConstructionError> {
///         Ok(Fields::new().with("number", self.number).with("name", &self.name))
///     }
///
///     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
///         Ok(Self { number: fields.take("number")?, name: fields.take("name")? })
///     }
/// }
///
/// let registry = Registry::builder().register::<Edition>().build();
/// let codec = XmlCodec::new(&registry);
///
/// let edition = Edition { number: 2, name: "Second Edition".to_string() };
/// let xml = codec.to_string(&edition).unwrap();
/// assert_eq!(xml, r#"<edition number="2">Second Edition</edition>"#);
/// assert_eq!(codec.from_str::<Edition>(&xml).unwrap(), edition);
/// ```
#[derive(Debug, Clone)]
pub struct XmlCodec<'r> {
	registry: &'r Registry,
	formatter: Arc<dyn PropertyNameFormatter>,
	config: XmlConfig,
}

impl<'r> XmlCodec<'r> {
	/// Creates a codec using the current process-wide formatter.
	pub fn new(registry: &'r Registry) -> Self {
		Self {
			registry,
			formatter: current_formatter(),
			config: XmlConfig::default(),
		}
	}

	/// Replaces the name formatter for this codec only.
	pub fn with_formatter<F: PropertyNameFormatter + 'static>(mut self, formatter: F) -> Self {
		self.formatter = Arc::new(formatter);
		self
	}

	/// Replaces the configuration.
	pub fn with_config(mut self, config: XmlConfig) -> Self {
		self.config = config;
		self
	}

	/// Current configuration.
	pub fn config(&self) -> &XmlConfig {
		&self.config
	}

	/// Encodes an object as an element named after its class.
	///
	/// The root tag is the class custom name if declared, else the formatted type name.
	pub fn encode<T: Serializable>(&self, object: &T) -> XmlResult<Element> {
		let class = self.class(TypeRef::of::<T>())?;
		let element_name = class.xml_root_name(self.formatter.as_ref());
		self.encode_as(object, &element_name)
	}

	/// Encodes an object as an element named `element_name`.
	pub fn encode_as<T: Serializable>(&self, object: &T, element_name: &str) -> XmlResult<Element> {
		let fields = read_fields(object)?;
		let mut element = self.encode_fields(TypeRef::of::<T>(), &fields, element_name)?;
		if let Some(namespace) = &self.config.namespace {
			element.declare_namespace(None, namespace.as_str());
		}
		Ok(element)
	}

	/// Encodes an object as XML text, with a declaration when configured.
	pub fn to_string<T: Serializable>(&self, object: &T) -> XmlResult<String> {
		let element = self.encode(object)?;
		if self.config.xml_declaration {
			Ok(format!("{XML_DECLARATION}\n{element}"))
		} else {
			Ok(element.to_string())
		}
	}

	/// Decodes an element into a new `T`.
	///
	/// Tags are compared after stripping the configured default namespace, or, when none
	/// is configured, the first namespace declared in the document.
	///
	/// # Errors
	///
	/// Fails on unmapped child elements (unless configured otherwise), malformed
	/// nested arrays, values that do not parse as their declared kind, and constructor
	/// failures.
	pub fn decode<T: Serializable>(&self, element: &Element) -> XmlResult<T> {
		let namespace = self
			.config
			.default_namespace
			.as_deref()
			.or_else(|| element.first_namespace());
		self.decode_root(element, namespace)
	}

	/// Decodes an element, stripping `namespace` from every tag.
	pub fn decode_with_namespace<T: Serializable>(&self, element: &Element, namespace: &str) -> XmlResult<T> {
		self.decode_root(element, Some(namespace))
	}

	/// Parses XML text and decodes its root element into a new `T`.
	pub fn from_str<T: Serializable>(&self, text: &str) -> XmlResult<T> {
		let element = Element::parse(text)?;
		self.decode(&element)
	}

	fn decode_root<T: Serializable>(&self, element: &Element, namespace: Option<&str>) -> XmlResult<T> {
		let fields = self.decode_fields(TypeRef::of::<T>(), element, namespace)?;
		T::from_fields(fields).map_err(|source| {
			MappingError::Construction {
				type_name: type_name::<T>().to_string(),
				source,
			}
			.into()
		})
	}

	fn class(&self, type_ref: TypeRef) -> XmlResult<&'r ClassMetadata> {
		let class = self.registry.lookup(type_ref)?;
		if !class.supports(Format::Xml) {
			return Err(MappingError::FormatNotEnabled {
				type_name: class.type_name().to_string(),
				format: Format::Xml,
			}
			.into());
		}
		Ok(class)
	}

	fn qualify(&self, name: &str) -> String {
		match &self.config.namespace {
			Some(namespace) => format!("{{{namespace}}}{name}"),
			None => name.to_string(),
		}
	}

	fn encode_fields(&self, type_ref: TypeRef, fields: &Fields, element_name: &str) -> XmlResult<Element> {
		let class = self.class(type_ref)?;
		let formatter = self.formatter.as_ref();
		let mut element = Element::new(self.qualify(element_name));

		let present = class.properties().iter().filter_map(|property| {
			fields
				.get(property.name())
				.filter(|value| !value.is_null())
				.map(|value| (property, value))
		});
		let (attributes, children): (Vec<_>, Vec<_>) =
			present.partition(|(property, _)| property.is_xml_attribute());

		for (property, value) in attributes {
			let text = self.scalar_text(class, property, &property.kind().element_kind(), value)?;
			element.set_attribute(property.wire_name(Format::Xml, formatter), text);
		}

		for (property, value) in children {
			if property.is_text_content() {
				let text = self.scalar_text(class, property, &property.kind().element_kind(), value)?;
				element.set_text(text);
				continue;
			}
			let wire_name = property.wire_name(Format::Xml, formatter);
			trace!(
				type_name = class.type_name(),
				property = property.name(),
				element = %wire_name,
				"Encoding XML property"
			);
			match (property.kind(), value) {
				(PropertyKind::Collection(item), Value::List(items)) => {
					let layout = property.xml_array_layout(formatter);
					let encoded = items
						.iter()
						.map(|entry| self.encode_item(class, property, item, &layout.child_name, entry))
						.collect::<XmlResult<Vec<_>>>()?;
					match layout.placement {
						XmlArrayPlacement::Nested => {
							let mut wrapper = Element::new(self.qualify(&wire_name));
							for child in encoded {
								wrapper.push_child(child);
							}
							element.push_child(wrapper);
						}
						XmlArrayPlacement::Flat => {
							for child in encoded {
								element.push_child(child);
							}
						}
					}
				}
				(PropertyKind::Collection(_), other) => {
					return Err(mismatch(class, property, "list", other));
				}
				(kind, value) => {
					let child = self.encode_item(class, property, &kind.element_kind(), &wire_name, value)?;
					element.push_child(child);
				}
			}
		}
		Ok(element)
	}

	fn encode_item(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		tag: &str,
		value: &Value,
	) -> XmlResult<Element> {
		match (item, value) {
			(ItemKind::Object(target), Value::Object(fields)) => self.encode_fields(*target, fields, tag),
			(ItemKind::Object(_), other) => Err(mismatch(class, property, "object", other)),
			(item, value) => {
				let text = self.scalar_text(class, property, item, value)?;
				Ok(Element::new(self.qualify(tag)).with_text(text))
			}
		}
	}

	fn scalar_text(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		value: &Value,
	) -> XmlResult<String> {
		match item {
			ItemKind::Custom(codec) => Ok(codec.serialize_value(value).map_err(MappingError::from)?),
			_ => match value {
				Value::Bool(flag) => Ok(flag.to_string()),
				Value::Int(number) => Ok(number.to_string()),
				Value::Float(number) => Ok(number.to_string()),
				Value::Text(text) => Ok(text.clone()),
				other => Err(mismatch(class, property, "a scalar", other)),
			},
		}
	}

	fn decode_fields(&self, type_ref: TypeRef, element: &Element, namespace: Option<&str>) -> XmlResult<Fields> {
		let class = self.class(type_ref)?;
		let formatter = self.formatter.as_ref();
		let mut fields = Fields::new();

		for (name, raw) in element.attributes() {
			let local = strip_namespace(name, namespace);
			let identifier = class.identifier_for(Format::Xml, local, formatter);
			match class.property(&identifier) {
				Some(property) if property.is_xml_attribute() => {
					let value = self.decode_text(class, property, &property.kind().element_kind(), raw)?;
					fields.insert(identifier, value);
				}
				_ => trace!(type_name = class.type_name(), attribute = %name, "Ignoring XML attribute"),
			}
		}

		if let Some(property) = class.text_property() {
			let text = element.text().map(str::trim).unwrap_or_default();
			let item = property.kind().element_kind();
			if !text.is_empty() {
				let value = self.decode_text(class, property, &item, text)?;
				fields.insert(property.name(), value);
			} else if !property.is_optional() && matches!(item, ItemKind::Primitive(ScalarKind::Str)) {
				// An empty string is written as a self-closing element.
				fields.insert(property.name(), Value::Text(String::new()));
			}
		}

		for child in element.children() {
			let local = strip_namespace(child.tag(), namespace);
			let identifier = class.identifier_for(Format::Xml, local, formatter);
			let property = class
				.property(&identifier)
				.filter(|property| !property.is_xml_attribute() && !property.is_text_content());

			if let Some(property) = property {
				if let PropertyKind::Collection(item) = property.kind() {
					let layout = property.xml_array_layout(formatter);
					if layout.placement == XmlArrayPlacement::Nested {
						let mut items = Vec::with_capacity(child.children().len());
						for entry in child.children() {
							let found = strip_namespace(entry.tag(), namespace);
							if found != layout.child_name {
								return Err(XmlError::MalformedArrayStructure {
									wrapper: local.to_string(),
									expected: layout.child_name.clone(),
									found: found.to_string(),
								});
							}
							items.push(self.decode_item(class, property, item, entry, namespace)?);
						}
						fields.insert(identifier, Value::List(items));
						continue;
					}
				}
			}

			if let Some(flat) = class.flat_array_property(local, formatter) {
				let item = flat.kind().element_kind();
				let value = self.decode_item(class, flat, &item, child, namespace)?;
				match fields.get_mut(flat.name()) {
					Some(Value::List(items)) => items.push(value),
					_ => fields.insert(flat.name(), Value::List(vec![value])),
				}
				continue;
			}

			match property {
				Some(property) if !property.is_collection() => {
					let value = self.decode_item(class, property, &property.kind().element_kind(), child, namespace)?;
					fields.insert(identifier, value);
				}
				_ => self.unknown_element(class, &mut fields, identifier, local, child)?,
			}
		}
		Ok(fields)
	}

	fn unknown_element(
		&self,
		class: &ClassMetadata,
		fields: &mut Fields,
		identifier: String,
		local: &str,
		child: &Element,
	) -> XmlResult<()> {
		match self.config.unknown_elements {
			UnknownFieldPolicy::Reject => Err(XmlError::UnmappedElement {
				element: local.to_string(),
				type_name: class.type_name().to_string(),
			}),
			UnknownFieldPolicy::Ignore => {
				trace!(type_name = class.type_name(), element = %local, "Ignoring unmapped XML element");
				Ok(())
			}
			UnknownFieldPolicy::PassThrough => {
				trace!(type_name = class.type_name(), element = %local, "Passing unmapped XML element to constructor");
				let text = child.text().unwrap_or_default();
				fields.insert(identifier, untyped(text));
				Ok(())
			}
		}
	}

	fn decode_item(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		element: &Element,
		namespace: Option<&str>,
	) -> XmlResult<Value> {
		match item {
			ItemKind::Object(target) => Ok(Value::Object(self.decode_fields(*target, element, namespace)?)),
			item => self.decode_text(class, property, item, element.text().unwrap_or_default()),
		}
	}

	fn decode_text(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		text: &str,
	) -> XmlResult<Value> {
		match item {
			ItemKind::Custom(codec) => Ok(codec.deserialize_value(text).map_err(MappingError::from)?),
			ItemKind::Object(_) => Err(MappingError::invalid_value(
				class.type_name(),
				property.name(),
				"a nested object cannot be read from text",
			)
			.into()),
			ItemKind::Enum(kind) | ItemKind::Primitive(kind) => coerce(*kind, text).ok_or_else(|| {
				MappingError::invalid_value(
					class.type_name(),
					property.name(),
					format!("'{text}' is not a valid {}", kind_label(*kind)),
				)
				.into()
			}),
		}
	}
}

impl XmlCodec<'static> {
	/// Creates a codec bound to the process-wide registry.
	///
	/// # Errors
	///
	/// Returns [`MappingError::RegistryNotInstalled`] if no registry was installed.
	pub fn global() -> XmlResult<Self> {
		Ok(Self::new(registry::global()?))
	}
}

fn strip_namespace<'a>(name: &'a str, namespace: Option<&str>) -> &'a str {
	match (split_clark(name), namespace) {
		(Some((uri, local)), Some(namespace)) if uri == namespace => local,
		_ => name,
	}
}

fn coerce(kind: ScalarKind, text: &str) -> Option<Value> {
	match kind {
		ScalarKind::Str => Some(Value::Text(text.to_string())),
		ScalarKind::Int => text.trim().parse().ok().map(Value::Int),
		ScalarKind::Float => text.trim().parse().ok().map(Value::Float),
		ScalarKind::Bool => match text.trim() {
			"true" | "1" => Some(Value::Bool(true)),
			"false" | "0" => Some(Value::Bool(false)),
			_ => None,
		},
		ScalarKind::Untyped => Some(untyped(text)),
	}
}

/// All-digit text becomes an integer, anything else stays text as written.
fn untyped(text: &str) -> Value {
	let digits = text.trim();
	if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) {
		if let Ok(number) = digits.parse() {
			return Value::Int(number);
		}
	}
	Value::Text(text.to_string())
}

fn kind_label(kind: ScalarKind) -> &'static str {
	match kind {
		ScalarKind::Bool => "boolean",
		ScalarKind::Int => "integer",
		ScalarKind::Float => "number",
		ScalarKind::Str | ScalarKind::Untyped => "string",
	}
}

fn mismatch(class: &ClassMetadata, property: &PropertyMetadata, expected: &str, found: &Value) -> XmlError {
	MappingError::invalid_value(
		class.type_name(),
		property.name(),
		format!("expected {expected}, found {}", found.kind_name()),
	)
	.into()
}
