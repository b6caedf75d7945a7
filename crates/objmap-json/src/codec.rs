//! Metadata-driven JSON encoding and decoding.

use std::any::type_name;
use std::sync::Arc;

use objmap_core::{
	ClassMetadata, Fields, Format, ItemKind, MappingError, PropertyKind, PropertyMetadata,
	PropertyNameFormatter, Registry, Serializable, TypeRef, UnknownFieldPolicy, Value,
	current_formatter, read_fields, registry,
};
use serde_json::{Map, Number, Value as JsonValue};
use tracing::trace;

use crate::config::JsonConfig;
use crate::error::{JsonError, JsonResult};

/// JSON codec bound to a registry.
///
/// # Examples
///
/// ```
/// use objmap_core::{ClassDeclaration, ConstructionError, DeclaredType, Fields, Registry, Serializable};
/// use objmap_json::JsonCodec;
/// use serde_json::json;
///
/// #[derive(Debug, PartialEq)]
/// struct Tag {
///     display_name: String,
/// }
///
/// impl Serializable for Tag {
///     fn declare(class: &mut ClassDeclaration) {
///         class.property("display_name", DeclaredType::string());
///     }
///
///     fn to_fields(&self) -> Result<Fields, ConstructionError> {
///         Ok(Fields::new().with("display_name", &self.display_name))
///     }
///
///     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
///         Ok(Self { display_name: fields.take("display_name")? })
///     }
/// }
///
/// let registry = Registry::builder().register::<Tag>().build();
/// let codec = JsonCodec::new(&registry);
///
/// let tag = Tag { display_name: "fiction".to_string() };
/// assert_eq!(codec.encode(&tag).unwrap(), json!({ "displayName": "fiction" }));
/// assert_eq!(codec.from_str::<Tag>(r#"{"displayName":"fiction"}"#).unwrap(), tag);
/// ```
#[derive(Debug, Clone)]
pub struct JsonCodec<'r> {
	registry: &'r Registry,
	formatter: Arc<dyn PropertyNameFormatter>,
	config: JsonConfig,
}

impl<'r> JsonCodec<'r> {
	/// Creates a codec using the current process-wide formatter.
	pub fn new(registry: &'r Registry) -> Self {
		Self {
			registry,
			formatter: current_formatter(),
			config: JsonConfig::default(),
		}
	}

	/// Replaces the name formatter for this codec only.
	pub fn with_formatter<F: PropertyNameFormatter + 'static>(mut self, formatter: F) -> Self {
		self.formatter = Arc::new(formatter);
		self
	}

	/// Replaces the configuration.
	pub fn with_config(mut self, config: JsonConfig) -> Self {
		self.config = config;
		self
	}

	/// Current configuration.
	pub fn config(&self) -> &JsonConfig {
		&self.config
	}

	/// Encodes an object into a JSON value.
	///
	/// Absent and null properties are omitted. Keys appear in declaration order.
	///
	/// # Errors
	///
	/// Fails if the type is unregistered, not enabled for JSON, or a value does not
	/// match its declared kind.
	pub fn encode<T: Serializable>(&self, object: &T) -> JsonResult<JsonValue> {
		self.encode_fields(TypeRef::of::<T>(), &read_fields(object)?)
	}

	/// Encodes an object into JSON text, indented when `pretty` is configured.
	pub fn to_string<T: Serializable>(&self, object: &T) -> JsonResult<String> {
		let value = self.encode(object)?;
		let text = if self.config.pretty {
			serde_json::to_string_pretty(&value)?
		} else {
			serde_json::to_string(&value)?
		};
		Ok(text)
	}

	/// Decodes a JSON object into a new `T`.
	///
	/// # Errors
	///
	/// Fails if the input is not an object, a value cannot be converted, or the
	/// constructor rejects the resolved fields.
	pub fn decode<T: Serializable>(&self, value: &JsonValue) -> JsonResult<T> {
		let fields = self.decode_fields(TypeRef::of::<T>(), value)?;
		T::from_fields(fields).map_err(|source| {
			MappingError::Construction {
				type_name: type_name::<T>().to_string(),
				source,
			}
			.into()
		})
	}

	/// Parses JSON text and decodes it into a new `T`.
	pub fn from_str<T: Serializable>(&self, text: &str) -> JsonResult<T> {
		let value: JsonValue = serde_json::from_str(text)?;
		self.decode(&value)
	}

	fn class(&self, type_ref: TypeRef) -> JsonResult<&'r ClassMetadata> {
		let class = self.registry.lookup(type_ref)?;
		if !class.supports(Format::Json) {
			return Err(MappingError::FormatNotEnabled {
				type_name: class.type_name().to_string(),
				format: Format::Json,
			}
			.into());
		}
		Ok(class)
	}

	fn encode_fields(&self, type_ref: TypeRef, fields: &Fields) -> JsonResult<JsonValue> {
		let class = self.class(type_ref)?;
		let mut object = Map::new();
		for property in class.properties() {
			let value = match fields.get(property.name()) {
				Some(value) if !value.is_null() => value,
				_ => continue,
			};
			let wire_name = property.wire_name(Format::Json, self.formatter.as_ref());
			trace!(
				type_name = class.type_name(),
				property = property.name(),
				key = %wire_name,
				"Encoding JSON property"
			);
			let encoded = self.encode_property(class, property, value)?;
			object.insert(wire_name, encoded);
		}
		Ok(JsonValue::Object(object))
	}

	fn encode_property(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		value: &Value,
	) -> JsonResult<JsonValue> {
		match (property.kind(), value) {
			(PropertyKind::Collection(item), Value::List(items)) => items
				.iter()
				.map(|entry| self.encode_item(class, property, item, entry))
				.collect::<JsonResult<Vec<_>>>()
				.map(JsonValue::Array),
			(PropertyKind::Collection(_), other) => Err(mismatch(class, property, "list", other)),
			(kind, value) => self.encode_item(class, property, &kind.element_kind(), value),
		}
	}

	fn encode_item(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		value: &Value,
	) -> JsonResult<JsonValue> {
		match item {
			ItemKind::Custom(codec) => {
				let text = codec.serialize_value(value).map_err(MappingError::from)?;
				Ok(JsonValue::String(text))
			}
			ItemKind::Object(target) => match value {
				Value::Object(fields) => self.encode_fields(*target, fields),
				other => Err(mismatch(class, property, "object", other)),
			},
			ItemKind::Enum(_) | ItemKind::Primitive(_) => primitive_to_json(value)
				.map_err(|message| MappingError::invalid_value(class.type_name(), property.name(), message).into()),
		}
	}

	fn decode_fields(&self, type_ref: TypeRef, value: &JsonValue) -> JsonResult<Fields> {
		let class = self.class(type_ref)?;
		let object = value.as_object().ok_or_else(|| JsonError::NotAnObject {
			type_name: class.type_name().to_string(),
			found: json_kind(value),
		})?;

		let mut fields = Fields::new();
		for (key, raw) in object {
			if class.removes_json_key(key) {
				trace!(type_name = class.type_name(), key = %key, "Dropping removed key");
				continue;
			}
			let identifier = class.identifier_for(Format::Json, key, self.formatter.as_ref());
			match class.property(&identifier) {
				Some(property) => {
					let decoded = self.decode_property(class, property, raw)?;
					fields.insert(identifier, decoded);
				}
				None => match self.config.unknown_keys {
					UnknownFieldPolicy::PassThrough => {
						trace!(type_name = class.type_name(), key = %key, "Passing unknown key to constructor");
						fields.insert(identifier, json_to_value(raw));
					}
					UnknownFieldPolicy::Ignore => {
						trace!(type_name = class.type_name(), key = %key, "Ignoring unknown key");
					}
					UnknownFieldPolicy::Reject => {
						return Err(JsonError::UnknownKey {
							key: key.clone(),
							type_name: class.type_name().to_string(),
						});
					}
				},
			}
		}
		Ok(fields)
	}

	fn decode_property(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		raw: &JsonValue,
	) -> JsonResult<Value> {
		match (property.kind(), raw) {
			(_, JsonValue::Null) => Ok(Value::Null),
			(PropertyKind::Collection(item), JsonValue::Array(items)) => items
				.iter()
				.map(|entry| self.decode_item(class, property, item, entry))
				.collect::<JsonResult<Vec<_>>>()
				.map(Value::List),
			(PropertyKind::Collection(_), other) => Err(MappingError::invalid_value(
				class.type_name(),
				property.name(),
				format!("expected an array, found {}", json_kind(other)),
			)
			.into()),
			(kind, raw) => self.decode_item(class, property, &kind.element_kind(), raw),
		}
	}

	fn decode_item(
		&self,
		class: &ClassMetadata,
		property: &PropertyMetadata,
		item: &ItemKind,
		raw: &JsonValue,
	) -> JsonResult<Value> {
		match item {
			ItemKind::Custom(codec) => {
				let decoded = match raw {
					JsonValue::String(text) => codec.deserialize_value(text),
					other => codec.deserialize_value(&other.to_string()),
				};
				Ok(decoded.map_err(MappingError::from)?)
			}
			ItemKind::Object(target) => {
				let fields = self.decode_fields(*target, raw).map_err(|error| match error {
					JsonError::NotAnObject { found, .. } => MappingError::invalid_value(
						class.type_name(),
						property.name(),
						format!("expected an object, found {found}"),
					)
					.into(),
					other => other,
				})?;
				Ok(Value::Object(fields))
			}
			ItemKind::Enum(_) | ItemKind::Primitive(_) => Ok(json_to_value(raw)),
		}
	}
}

impl JsonCodec<'static> {
	/// Creates a codec bound to the process-wide registry.
	///
	/// # Errors
	///
	/// Returns [`MappingError::RegistryNotInstalled`] if no registry was installed.
	pub fn global() -> JsonResult<Self> {
		Ok(Self::new(registry::global()?))
	}
}

fn mismatch(
	class: &ClassMetadata,
	property: &PropertyMetadata,
	expected: &str,
	found: &Value,
) -> JsonError {
	MappingError::invalid_value(
		class.type_name(),
		property.name(),
		format!("expected {expected}, found {}", found.kind_name()),
	)
	.into()
}

fn primitive_to_json(value: &Value) -> Result<JsonValue, String> {
	match value {
		Value::Null => Ok(JsonValue::Null),
		Value::Bool(flag) => Ok(JsonValue::Bool(*flag)),
		Value::Int(number) => Ok(JsonValue::from(*number)),
		Value::Float(number) => Number::from_f64(*number)
			.map(JsonValue::Number)
			.ok_or_else(|| format!("{number} cannot be represented in JSON")),
		Value::Text(text) => Ok(JsonValue::String(text.clone())),
		Value::List(items) => items
			.iter()
			.map(primitive_to_json)
			.collect::<Result<Vec<_>, _>>()
			.map(JsonValue::Array),
		Value::Object(_) | Value::Custom(_) => Err(format!(
			"{} value needs an object or custom scalar declaration",
			value.kind_name()
		)),
	}
}

fn json_to_value(raw: &JsonValue) -> Value {
	match raw {
		JsonValue::Null => Value::Null,
		JsonValue::Bool(flag) => Value::Bool(*flag),
		JsonValue::Number(number) => match number.as_i64() {
			Some(integer) => Value::Int(integer),
			None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
		},
		JsonValue::String(text) => Value::Text(text.clone()),
		JsonValue::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
		JsonValue::Object(entries) => Value::Object(
			entries
				.iter()
				.map(|(key, value)| (key.clone(), json_to_value(value)))
				.collect(),
		),
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "boolean",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}
