//! Deserialization of `serde` types from [`Value`].
//!
//! The inverse of [`ser`](crate::ser). Null entries of an object are treated as absent, so a
//! required field holding null fails with [`ConstructionError::MissingField`] and an
//! `Option` field reads as `None`. [`Value::Custom`] cannot be read this way; types with
//! custom scalar properties take them with [`Fields::take_custom`] in a hand-written
//! [`Serializable::from_fields`](crate::Serializable::from_fields).

use serde::de::value::StringDeserializer;
use serde::de::{
	self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
	VariantAccess, Visitor,
};

use crate::error::ConstructionError;
use crate::value::{Fields, Value};

/// Deserializes a `serde` value from a [`Value`].
///
/// # Examples
///
/// ```
/// use objmap_core::{Value, de};
///
/// let numbers: Vec<u16> = de::from_value(Value::list([3, 4])).unwrap();
/// assert_eq!(numbers, vec![3, 4]);
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ConstructionError> {
	T::deserialize(value)
}

/// Deserializes a struct or map from [`Fields`].
pub fn from_fields<T: DeserializeOwned>(fields: Fields) -> Result<T, ConstructionError> {
	T::deserialize(Value::Object(fields))
}

impl<'de> de::Deserializer<'de> for Value {
	type Error = ConstructionError;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConstructionError> {
		match self {
			Value::Null => visitor.visit_unit(),
			Value::Bool(flag) => visitor.visit_bool(flag),
			Value::Int(number) => visitor.visit_i64(number),
			Value::Float(number) => visitor.visit_f64(number),
			Value::Text(text) => visitor.visit_string(text),
			Value::List(items) => visitor.visit_seq(SeqDeserializer {
				items: items.into_iter(),
			}),
			Value::Object(fields) => visitor.visit_map(MapDeserializer::new(fields)),
			Value::Custom(custom) => Err(ConstructionError::custom(format!(
				"custom scalar of type '{}' cannot be deserialized through serde",
				custom.type_name()
			))),
		}
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConstructionError> {
		match self {
			Value::Null => visitor.visit_none(),
			other => visitor.visit_some(other),
		}
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, ConstructionError> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, ConstructionError> {
		match self {
			Value::Text(variant) => visitor.visit_enum(EnumDeserializer {
				variant,
				value: None,
			}),
			Value::Object(fields) if fields.len() == 1 => {
				let mut entries = fields.into_iter();
				match entries.next() {
					Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
						variant,
						value: Some(value),
					}),
					None => Err(ConstructionError::custom("enum object has no variant")),
				}
			}
			other => Err(ConstructionError::custom(format!(
				"expected an enum variant name or a single-entry object, found {}",
				other.kind_name()
			))),
		}
	}

	serde::forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
		bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
		identifier ignored_any
	}
}

impl<'de> IntoDeserializer<'de, ConstructionError> for Value {
	type Deserializer = Self;

	fn into_deserializer(self) -> Self {
		self
	}
}

struct SeqDeserializer {
	items: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
	type Error = ConstructionError;

	fn next_element_seed<T: DeserializeSeed<'de>>(
		&mut self,
		seed: T,
	) -> Result<Option<T::Value>, ConstructionError> {
		self.items
			.next()
			.map(|item| seed.deserialize(item))
			.transpose()
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.items.len())
	}
}

struct MapDeserializer {
	entries: std::vec::IntoIter<(String, Value)>,
	value: Option<Value>,
}

impl MapDeserializer {
	fn new(fields: Fields) -> Self {
		let entries: Vec<_> = fields
			.into_iter()
			.filter(|(_, value)| !value.is_null())
			.collect();
		Self {
			entries: entries.into_iter(),
			value: None,
		}
	}
}

impl<'de> MapAccess<'de> for MapDeserializer {
	type Error = ConstructionError;

	fn next_key_seed<K: DeserializeSeed<'de>>(
		&mut self,
		seed: K,
	) -> Result<Option<K::Value>, ConstructionError> {
		match self.entries.next() {
			Some((key, value)) => {
				self.value = Some(value);
				let key: StringDeserializer<ConstructionError> = key.into_deserializer();
				seed.deserialize(key).map(Some)
			}
			None => Ok(None),
		}
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(
		&mut self,
		seed: V,
	) -> Result<V::Value, ConstructionError> {
		let value = self
			.value
			.take()
			.ok_or_else(|| ConstructionError::custom("map value requested before its key"))?;
		seed.deserialize(value)
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.entries.len())
	}
}

struct EnumDeserializer {
	variant: String,
	value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
	type Error = ConstructionError;
	type Variant = VariantDeserializer;

	fn variant_seed<V: DeserializeSeed<'de>>(
		self,
		seed: V,
	) -> Result<(V::Value, VariantDeserializer), ConstructionError> {
		let variant: StringDeserializer<ConstructionError> = self.variant.into_deserializer();
		let tag = seed.deserialize(variant)?;
		Ok((tag, VariantDeserializer { value: self.value }))
	}
}

struct VariantDeserializer {
	value: Option<Value>,
}

impl VariantDeserializer {
	fn payload(self) -> Result<Value, ConstructionError> {
		self.value
			.ok_or_else(|| ConstructionError::custom("enum variant has no payload"))
	}
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
	type Error = ConstructionError;

	fn unit_variant(self) -> Result<(), ConstructionError> {
		match self.value {
			None | Some(Value::Null) => Ok(()),
			Some(other) => Err(ConstructionError::custom(format!(
				"unit variant carries a {} payload",
				other.kind_name()
			))),
		}
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(
		self,
		seed: T,
	) -> Result<T::Value, ConstructionError> {
		seed.deserialize(self.payload()?)
	}

	fn tuple_variant<V: Visitor<'de>>(
		self,
		_len: usize,
		visitor: V,
	) -> Result<V::Value, ConstructionError> {
		de::Deserializer::deserialize_seq(self.payload()?, visitor)
	}

	fn struct_variant<V: Visitor<'de>>(
		self,
		_fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, ConstructionError> {
		de::Deserializer::deserialize_map(self.payload()?, visitor)
	}
}
