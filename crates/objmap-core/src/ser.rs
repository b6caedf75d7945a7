//! Serialization of `serde` types into [`Value`].
//!
//! Structs and maps become [`Value::Object`], sequences and tuples become [`Value::List`],
//! unit variants become their name as text and data-carrying variants become a one-entry
//! object keyed by the variant name. `None` and unit values become [`Value::Null`], which
//! the codecs never write.

use serde::ser::{self, Serialize};

use crate::error::ConstructionError;
use crate::value::{Fields, Value};

/// Serializes any `serde` value into a [`Value`].
///
/// # Examples
///
/// ```
/// use objmap_core::{Value, ser};
///
/// let value = ser::to_value(&vec![1u8, 2]).unwrap();
/// assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2)]));
/// ```
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value, ConstructionError> {
	value.serialize(ValueSerializer)
}

/// Serializes a struct or map into [`Fields`].
pub fn to_fields<T: ?Sized + Serialize>(value: &T) -> Result<Fields, ConstructionError> {
	match to_value(value)? {
		Value::Object(fields) => Ok(fields),
		other => Err(ConstructionError::custom(format!(
			"expected a struct or map, found {}",
			other.kind_name()
		))),
	}
}

/// `serde::Serializer` producing [`Value`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	type SerializeSeq = SeqSerializer;
	type SerializeTuple = SeqSerializer;
	type SerializeTupleStruct = SeqSerializer;
	type SerializeTupleVariant = VariantSeqSerializer;
	type SerializeMap = MapSerializer;
	type SerializeStruct = MapSerializer;
	type SerializeStructVariant = VariantMapSerializer;

	fn serialize_bool(self, v: bool) -> Result<Value, ConstructionError> {
		Ok(Value::Bool(v))
	}

	fn serialize_i8(self, v: i8) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_i16(self, v: i16) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_i32(self, v: i32) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_i64(self, v: i64) -> Result<Value, ConstructionError> {
		Ok(Value::Int(v))
	}

	fn serialize_i128(self, v: i128) -> Result<Value, ConstructionError> {
		i64::try_from(v).map(Value::Int).map_err(|_| out_of_range(v))
	}

	fn serialize_u8(self, v: u8) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_u16(self, v: u16) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_u32(self, v: u32) -> Result<Value, ConstructionError> {
		Ok(Value::Int(i64::from(v)))
	}

	fn serialize_u64(self, v: u64) -> Result<Value, ConstructionError> {
		i64::try_from(v).map(Value::Int).map_err(|_| out_of_range(v))
	}

	fn serialize_u128(self, v: u128) -> Result<Value, ConstructionError> {
		i64::try_from(v).map(Value::Int).map_err(|_| out_of_range(v))
	}

	fn serialize_f32(self, v: f32) -> Result<Value, ConstructionError> {
		Ok(Value::Float(f64::from(v)))
	}

	fn serialize_f64(self, v: f64) -> Result<Value, ConstructionError> {
		Ok(Value::Float(v))
	}

	fn serialize_char(self, v: char) -> Result<Value, ConstructionError> {
		Ok(Value::Text(v.to_string()))
	}

	fn serialize_str(self, v: &str) -> Result<Value, ConstructionError> {
		Ok(Value::Text(v.to_string()))
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<Value, ConstructionError> {
		Ok(Value::List(v.iter().map(|byte| Value::Int(i64::from(*byte))).collect()))
	}

	fn serialize_none(self) -> Result<Value, ConstructionError> {
		Ok(Value::Null)
	}

	fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, ConstructionError> {
		value.serialize(self)
	}

	fn serialize_unit(self) -> Result<Value, ConstructionError> {
		Ok(Value::Null)
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, ConstructionError> {
		Ok(Value::Null)
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<Value, ConstructionError> {
		Ok(Value::Text(variant.to_string()))
	}

	fn serialize_newtype_struct<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<Value, ConstructionError> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<Value, ConstructionError> {
		Ok(Value::Object(Fields::new().with(variant, to_value(value)?)))
	}

	fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer, ConstructionError> {
		Ok(SeqSerializer {
			items: Vec::with_capacity(len.unwrap_or_default()),
		})
	}

	fn serialize_tuple(self, len: usize) -> Result<SeqSerializer, ConstructionError> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		len: usize,
	) -> Result<SeqSerializer, ConstructionError> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		len: usize,
	) -> Result<VariantSeqSerializer, ConstructionError> {
		Ok(VariantSeqSerializer {
			variant,
			items: Vec::with_capacity(len),
		})
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer, ConstructionError> {
		Ok(MapSerializer::default())
	}

	fn serialize_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<MapSerializer, ConstructionError> {
		Ok(MapSerializer::default())
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<VariantMapSerializer, ConstructionError> {
		Ok(VariantMapSerializer {
			variant,
			fields: Fields::new(),
		})
	}
}

fn out_of_range(value: impl std::fmt::Display) -> ConstructionError {
	ConstructionError::custom(format!("integer {value} does not fit in 64 signed bits"))
}

#[doc(hidden)]
#[derive(Debug)]
pub struct SeqSerializer {
	items: Vec<Value>,
}

impl ser::SerializeSeq for SeqSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ConstructionError> {
		self.items.push(to_value(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, ConstructionError> {
		Ok(Value::List(self.items))
	}
}

impl ser::SerializeTuple for SeqSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ConstructionError> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, ConstructionError> {
		ser::SerializeSeq::end(self)
	}
}

impl ser::SerializeTupleStruct for SeqSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ConstructionError> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, ConstructionError> {
		ser::SerializeSeq::end(self)
	}
}

#[doc(hidden)]
#[derive(Debug)]
pub struct VariantSeqSerializer {
	variant: &'static str,
	items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ConstructionError> {
		self.items.push(to_value(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, ConstructionError> {
		Ok(Value::Object(
			Fields::new().with(self.variant, Value::List(self.items)),
		))
	}
}

#[doc(hidden)]
#[derive(Debug, Default)]
pub struct MapSerializer {
	fields: Fields,
	key: Option<String>,
}

impl ser::SerializeMap for MapSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ConstructionError> {
		let key = match to_value(key)? {
			Value::Text(text) => text,
			Value::Int(number) => number.to_string(),
			Value::Bool(flag) => flag.to_string(),
			other => {
				return Err(ConstructionError::custom(format!(
					"map keys must be text, numbers or booleans, found {}",
					other.kind_name()
				)));
			}
		};
		self.key = Some(key);
		Ok(())
	}

	fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ConstructionError> {
		let key = self
			.key
			.take()
			.ok_or_else(|| ConstructionError::custom("map value serialized before its key"))?;
		self.fields.insert(key, to_value(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, ConstructionError> {
		Ok(Value::Object(self.fields))
	}
}

impl ser::SerializeStruct for MapSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_field<T: ?Sized + Serialize>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), ConstructionError> {
		self.fields.insert(key, to_value(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, ConstructionError> {
		Ok(Value::Object(self.fields))
	}
}

#[doc(hidden)]
#[derive(Debug)]
pub struct VariantMapSerializer {
	variant: &'static str,
	fields: Fields,
}

impl ser::SerializeStructVariant for VariantMapSerializer {
	type Ok = Value;
	type Error = ConstructionError;

	fn serialize_field<T: ?Sized + Serialize>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), ConstructionError> {
		self.fields.insert(key, to_value(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, ConstructionError> {
		Ok(Value::Object(
			Fields::new().with(self.variant, Value::Object(self.fields)),
		))
	}
}
