//! Format-neutral property values.
//!
//! [`Serializable::to_fields`](crate::Serializable::to_fields) reads an object into [`Fields`],
//! the codecs translate [`Fields`] to and from documents, and
//! [`Serializable::from_fields`](crate::Serializable::from_fields) builds a fresh instance
//! from them. [`Fields`] plays the role of the keyword arguments handed to a constructor.

use std::any::{Any, type_name};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::declaration::Serializable;
use crate::error::ConstructionError;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// No value. Never written to a document.
	#[default]
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Floating point number.
	Float(f64),
	/// Text.
	Text(String),
	/// Ordered collection.
	List(Vec<Value>),
	/// Nested registered object.
	Object(Fields),
	/// Domain scalar handled by a custom scalar codec.
	Custom(CustomValue),
}

impl Value {
	/// Reads a registered object into a nested value.
	pub fn object<T: Serializable>(object: &T) -> Result<Self, ConstructionError> {
		object.to_fields().map(Value::Object)
	}

	/// Reads a collection of registered objects.
	pub fn objects<'a, T, I>(objects: I) -> Result<Self, ConstructionError>
	where
		T: Serializable + 'a,
		I: IntoIterator<Item = &'a T>,
	{
		objects
			.into_iter()
			.map(Value::object)
			.collect::<Result<_, _>>()
			.map(Value::List)
	}

	/// Wraps a domain scalar for a custom scalar codec.
	pub fn custom<T>(value: T) -> Self
	where
		T: Any + Send + Sync + PartialEq + fmt::Debug,
	{
		Value::Custom(CustomValue::new(value))
	}

	/// Builds a list from anything convertible into values.
	pub fn list<I, V>(items: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Value::List(items.into_iter().map(Into::into).collect())
	}

	/// Reads an enum member as its underlying value.
	pub fn enumeration<E: EnumValue>(member: &E) -> Self {
		member.to_value()
	}

	/// Returns true for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns the text content, if this is [`Value::Text`].
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Short name of the variant, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "integer",
			Value::Float(_) => "float",
			Value::Text(_) => "text",
			Value::List(_) => "list",
			Value::Object(_) => "object",
			Value::Custom(_) => "custom scalar",
		}
	}
}

macro_rules! impl_from_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Value::Int(i64::from(value))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Value::Float(f64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(value.to_string())
	}
}

impl From<&String> for Value {
	fn from(value: &String) -> Self {
		Value::Text(value.clone())
	}
}

impl From<Fields> for Value {
	fn from(value: Fields) -> Self {
		Value::Object(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Value::Null)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(value: Vec<T>) -> Self {
		Value::list(value)
	}
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
	fn from(value: BTreeSet<T>) -> Self {
		Value::list(value)
	}
}

/// Type-erased domain scalar carried through [`Value::Custom`].
#[derive(Clone)]
pub struct CustomValue {
	inner: Arc<dyn Any + Send + Sync>,
	type_name: &'static str,
	eq: fn(&dyn Any, &dyn Any) -> bool,
	debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl CustomValue {
	/// Wraps a value.
	pub fn new<T>(value: T) -> Self
	where
		T: Any + Send + Sync + PartialEq + fmt::Debug,
	{
		Self {
			inner: Arc::new(value),
			type_name: type_name::<T>(),
			eq: eq_as::<T>,
			debug: debug_as::<T>,
		}
	}

	/// Name of the wrapped type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Borrows the wrapped value if it is a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}
}

fn eq_as<T: Any + PartialEq>(left: &dyn Any, right: &dyn Any) -> bool {
	match (left.downcast_ref::<T>(), right.downcast_ref::<T>()) {
		(Some(left), Some(right)) => left == right,
		_ => false,
	}
}

fn debug_as<T: Any + fmt::Debug>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match value.downcast_ref::<T>() {
		Some(value) => fmt::Debug::fmt(value, f),
		None => f.write_str("<unknown>"),
	}
}

impl PartialEq for CustomValue {
	fn eq(&self, other: &Self) -> bool {
		(self.eq)(self.inner.as_ref(), other.inner.as_ref())
	}
}

impl fmt::Debug for CustomValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(self.debug)(self.inner.as_ref(), f)
	}
}

/// An enum rendered on the wire as its underlying scalar value.
///
/// # Examples
///
/// ```
/// use objmap_core::{EnumValue, Value};
///
/// #[derive(Debug, PartialEq)]
/// enum Cover {
///     Hard,
///     Soft,
/// }
///
/// impl EnumValue for Cover {
///     fn to_value(&self) -> Value {
///         match self {
///             Cover::Hard => Value::from("hard"),
///             Cover::Soft => Value::from("soft"),
///         }
///     }
///
///     fn from_value(value: &Value) -> Option<Self> {
///         match value.as_str()? {
///             "hard" => Some(Cover::Hard),
///             "soft" => Some(Cover::Soft),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Cover::from_value(&Cover::Soft.to_value()), Some(Cover::Soft));
/// ```
pub trait EnumValue: Sized {
	/// Underlying value of this member.
	fn to_value(&self) -> Value;

	/// Member for a raw value, or `None` when nothing matches.
	fn from_value(value: &Value) -> Option<Self>;
}

/// Mismatch between a [`Value`] variant and the requested Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueTypeError {
	/// Name of the expected kind.
	pub expected: &'static str,
	/// Name of the kind that was found.
	pub found: &'static str,
}

impl ValueTypeError {
	fn new(expected: &'static str, found: &Value) -> Self {
		Self {
			expected,
			found: found.kind_name(),
		}
	}
}

/// Conversion from a [`Value`] into a plain Rust type.
pub trait FromValue: Sized {
	/// Converts the value, failing on a kind mismatch.
	fn from_value(value: Value) -> Result<Self, ValueTypeError>;
}

impl FromValue for Value {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		Ok(value)
	}
}

impl FromValue for bool {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Bool(flag) => Ok(flag),
			other => Err(ValueTypeError::new("bool", &other)),
		}
	}
}

macro_rules! impl_from_value_int {
	($($ty:ty),*) => {
		$(
			impl FromValue for $ty {
				fn from_value(value: Value) -> Result<Self, ValueTypeError> {
					match value {
						Value::Int(number) => <$ty>::try_from(number)
							.map_err(|_| ValueTypeError::new(stringify!($ty), &Value::Int(number))),
						other => Err(ValueTypeError::new(stringify!($ty), &other)),
					}
				}
			}
		)*
	};
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Float(number) => Ok(number),
			Value::Int(number) => Ok(number as f64),
			other => Err(ValueTypeError::new("float", &other)),
		}
	}
}

impl FromValue for f32 {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		f64::from_value(value).map(|number| number as f32)
	}
}

impl FromValue for String {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Text(text) => Ok(text),
			other => Err(ValueTypeError::new("text", &other)),
		}
	}
}

impl<T: FromValue> FromValue for Option<T> {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Null => Ok(None),
			other => T::from_value(other).map(Some),
		}
	}
}

impl<T: FromValue> FromValue for Vec<T> {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::List(items) => items.into_iter().map(T::from_value).collect(),
			other => Err(ValueTypeError::new("list", &other)),
		}
	}
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		Vec::<T>::from_value(value).map(|items| items.into_iter().collect())
	}
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
	fn from_value(value: Value) -> Result<Self, ValueTypeError> {
		Vec::<T>::from_value(value).map(|items| items.into_iter().collect())
	}
}

/// Property identifier to value map for one object.
///
/// Entries are kept in identifier order so that two decodes of the same document
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
	entries: BTreeMap<String, Value>,
}

impl Fields {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a value and returns the map, for building in expression position.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts or replaces a value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.entries.insert(name.into(), value.into());
	}

	/// Borrows the value for `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.get(name)
	}

	/// Mutable access used by codecs that accumulate list items.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.entries.get_mut(name)
	}

	/// Removes and returns the value for `name`.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.entries.remove(name)
	}

	/// Returns true when `name` is present, even if its value is null.
	pub fn contains_key(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the map has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over entries in identifier order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Iterates over identifiers.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	fn take_present(&mut self, name: &str) -> Option<Value> {
		self.entries.remove(name).filter(|value| !value.is_null())
	}

	/// Takes a required value.
	pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, ConstructionError> {
		let value = self
			.take_present(name)
			.ok_or_else(|| ConstructionError::MissingField(name.to_string()))?;
		convert(name, value)
	}

	/// Takes an optional value; absent and null both yield `None`.
	pub fn take_opt<T: FromValue>(&mut self, name: &str) -> Result<Option<T>, ConstructionError> {
		self.take_present(name)
			.map(|value| convert(name, value))
			.transpose()
	}

	/// Takes a value, falling back to `T::default()` when absent.
	pub fn take_or_default<T: FromValue + Default>(
		&mut self,
		name: &str,
	) -> Result<T, ConstructionError> {
		Ok(self.take_opt(name)?.unwrap_or_default())
	}

	/// Takes a required nested object.
	pub fn take_object<T: Serializable>(&mut self, name: &str) -> Result<T, ConstructionError> {
		self.take_object_opt(name)?
			.ok_or_else(|| ConstructionError::MissingField(name.to_string()))
	}

	/// Takes an optional nested object.
	pub fn take_object_opt<T: Serializable>(
		&mut self,
		name: &str,
	) -> Result<Option<T>, ConstructionError> {
		self.take_present(name)
			.map(|value| build_object(name, value))
			.transpose()
	}

	/// Takes a collection of nested objects; absent yields an empty vector.
	pub fn take_objects<T: Serializable>(&mut self, name: &str) -> Result<Vec<T>, ConstructionError> {
		match self.take_present(name) {
			None => Ok(Vec::new()),
			Some(Value::List(items)) => items
				.into_iter()
				.map(|item| build_object(name, item))
				.collect(),
			Some(other) => Err(invalid_type(name, "list", &other)),
		}
	}

	/// Takes a required custom scalar.
	pub fn take_custom<T: Any + Clone>(&mut self, name: &str) -> Result<T, ConstructionError> {
		self.take_custom_opt(name)?
			.ok_or_else(|| ConstructionError::MissingField(name.to_string()))
	}

	/// Takes an optional custom scalar.
	pub fn take_custom_opt<T: Any + Clone>(
		&mut self,
		name: &str,
	) -> Result<Option<T>, ConstructionError> {
		self.take_present(name)
			.map(|value| downcast_custom(name, value))
			.transpose()
	}

	/// Takes a collection of custom scalars; absent yields an empty vector.
	pub fn take_customs<T: Any + Clone>(&mut self, name: &str) -> Result<Vec<T>, ConstructionError> {
		match self.take_present(name) {
			None => Ok(Vec::new()),
			Some(Value::List(items)) => items
				.into_iter()
				.map(|item| downcast_custom(name, item))
				.collect(),
			Some(other) => Err(invalid_type(name, "list", &other)),
		}
	}

	/// Takes a required enum member.
	pub fn take_enum<E: EnumValue>(&mut self, name: &str) -> Result<E, ConstructionError> {
		self.take_enum_opt(name)?
			.ok_or_else(|| ConstructionError::MissingField(name.to_string()))
	}

	/// Takes an optional enum member.
	pub fn take_enum_opt<E: EnumValue>(
		&mut self,
		name: &str,
	) -> Result<Option<E>, ConstructionError> {
		self.take_present(name)
			.map(|value| member_of(name, &value))
			.transpose()
	}

	/// Takes a collection of enum members; absent yields an empty vector.
	pub fn take_enums<E: EnumValue>(&mut self, name: &str) -> Result<Vec<E>, ConstructionError> {
		match self.take_present(name) {
			None => Ok(Vec::new()),
			Some(Value::List(items)) => items.iter().map(|item| member_of(name, item)).collect(),
			Some(other) => Err(invalid_type(name, "list", &other)),
		}
	}

	/// Fails if any entry was not taken by the constructor.
	///
	/// Null entries are ignored. Constructors call this last to opt into
	/// strict handling of unknown input keys.
	pub fn deny_unknown(self) -> Result<(), ConstructionError> {
		match self.entries.into_iter().find(|(_, value)| !value.is_null()) {
			Some((name, _)) => Err(ConstructionError::UnexpectedField(name)),
			None => Ok(()),
		}
	}
}

impl FromIterator<(String, Value)> for Fields {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

impl IntoIterator for Fields {
	type Item = (String, Value);
	type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

fn invalid_type(name: &str, expected: &'static str, found: &Value) -> ConstructionError {
	ConstructionError::InvalidType {
		field: name.to_string(),
		expected,
		found: found.kind_name(),
	}
}

fn convert<T: FromValue>(name: &str, value: Value) -> Result<T, ConstructionError> {
	T::from_value(value).map_err(|error| ConstructionError::InvalidType {
		field: name.to_string(),
		expected: error.expected,
		found: error.found,
	})
}

fn build_object<T: Serializable>(name: &str, value: Value) -> Result<T, ConstructionError> {
	match value {
		Value::Object(fields) => {
			T::from_fields(fields).map_err(|error| ConstructionError::nested(name, error))
		}
		other => Err(invalid_type(name, "object", &other)),
	}
}

fn downcast_custom<T: Any + Clone>(name: &str, value: Value) -> Result<T, ConstructionError> {
	match &value {
		Value::Custom(custom) => custom
			.downcast_ref::<T>()
			.cloned()
			.ok_or_else(|| invalid_type(name, type_name::<T>(), &value)),
		other => Err(invalid_type(name, type_name::<T>(), other)),
	}
}

fn member_of<E: EnumValue>(name: &str, value: &Value) -> Result<E, ConstructionError> {
	E::from_value(value).ok_or_else(|| ConstructionError::InvalidEnumValue {
		field: name.to_string(),
		value: render(value),
	})
}

fn render(value: &Value) -> String {
	match value {
		Value::Text(text) => format!("\"{text}\""),
		Value::Int(number) => number.to_string(),
		Value::Float(number) => number.to_string(),
		Value::Bool(flag) => flag.to_string(),
		other => other.kind_name().to_string(),
	}
}
