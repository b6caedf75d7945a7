//! Custom scalar codecs for domain values that are not plain primitives.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::ScalarError;
use crate::value::Value;

/// Converts a domain scalar to and from its text form.
///
/// # Examples
///
/// ```
/// use objmap_core::{ScalarCodec, ScalarError};
///
/// #[derive(Debug)]
/// struct Percent;
///
/// impl ScalarCodec for Percent {
///     type Value = u8;
///
///     fn serialize(&self, value: &u8) -> Result<String, ScalarError> {
///         Ok(format!("{value}%"))
///     }
///
///     fn deserialize(&self, text: &str) -> Result<u8, ScalarError> {
///         text.trim_end_matches('%')
///             .parse()
///             .map_err(|e| ScalarError::with_source(format!("invalid percentage '{text}'"), e))
///     }
/// }
///
/// assert_eq!(Percent.serialize(&40).unwrap(), "40%");
/// assert_eq!(Percent.deserialize("40%").unwrap(), 40);
/// ```
pub trait ScalarCodec: fmt::Debug + Send + Sync + 'static {
	/// Domain type handled by this codec.
	type Value: Any + Clone + PartialEq + fmt::Debug + Send + Sync;

	/// Renders a value as text.
	fn serialize(&self, value: &Self::Value) -> Result<String, ScalarError>;

	/// Parses text into a value.
	fn deserialize(&self, text: &str) -> Result<Self::Value, ScalarError>;
}

/// Object-safe form of [`ScalarCodec`] operating on [`Value::Custom`].
pub trait DynScalarCodec: fmt::Debug + Send + Sync {
	/// Name of the codec type, for diagnostics.
	fn name(&self) -> &'static str;

	/// Renders a [`Value::Custom`] holding the codec's domain type.
	fn serialize_value(&self, value: &Value) -> Result<String, ScalarError>;

	/// Parses text into a [`Value::Custom`].
	fn deserialize_value(&self, text: &str) -> Result<Value, ScalarError>;
}

impl<C: ScalarCodec> DynScalarCodec for C {
	fn name(&self) -> &'static str {
		type_name::<C>()
	}

	fn serialize_value(&self, value: &Value) -> Result<String, ScalarError> {
		let scalar = match value {
			Value::Custom(custom) => custom.downcast_ref::<C::Value>(),
			_ => None,
		};
		match scalar {
			Some(scalar) => self.serialize(scalar),
			None => Err(ScalarError::new(format!(
				"{} cannot serialize a {} value, expected {}",
				type_name::<C>(),
				describe(value),
				type_name::<C::Value>()
			))),
		}
	}

	fn deserialize_value(&self, text: &str) -> Result<Value, ScalarError> {
		self.deserialize(text).map(Value::custom)
	}
}

fn describe(value: &Value) -> &'static str {
	match value {
		Value::Custom(custom) => custom.type_name(),
		other => other.kind_name(),
	}
}

/// Shared handle to a type-erased codec, as stored in property metadata.
pub type CodecRef = Arc<dyn DynScalarCodec>;

/// Erases `codec` into a [`CodecRef`].
pub fn codec_ref<C: ScalarCodec>(codec: C) -> CodecRef {
	Arc::new(codec)
}
