//! Error types shared by the registry and both codecs.
//!
//! Codec crates wrap [`MappingError`] in their own error enums and add the
//! failures that only make sense for their document format.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::metadata::Format;

/// Errors raised while resolving metadata or mapping values.
#[derive(Debug, Error)]
pub enum MappingError {
	/// A codec was invoked against a type with no registry entry.
	#[error("Type '{type_name}' is not registered")]
	UnregisteredType {
		/// Fully-qualified name of the type.
		type_name: String,
	},

	/// A property lookup named an identifier the type does not declare.
	#[error("Type '{type_name}' has no property '{property}'")]
	UnknownProperty {
		/// Fully-qualified name of the type.
		type_name: String,
		/// Identifier that was looked up.
		property: String,
	},

	/// The type was registered without the requested format.
	#[error("Type '{type_name}' is not registered for {format}")]
	FormatNotEnabled {
		/// Fully-qualified name of the type.
		type_name: String,
		/// Format that was requested.
		format: Format,
	},

	/// A process-wide entry point was used before a registry was installed.
	#[error("No registry has been installed")]
	RegistryNotInstalled,

	/// A property value could not be rendered or parsed for its declared type.
	#[error("Invalid value for property '{property}' of '{type_name}': {message}")]
	InvalidValue {
		/// Fully-qualified name of the owning type.
		type_name: String,
		/// Property identifier.
		property: String,
		/// Description of the problem.
		message: String,
	},

	/// The target type's constructor rejected the resolved fields.
	#[error("Failed to construct '{type_name}': {source}")]
	Construction {
		/// Fully-qualified name of the type being constructed.
		type_name: String,
		/// Error returned by the constructor.
		#[source]
		source: ConstructionError,
	},

	/// Reading the source object's fields failed.
	#[error("Failed to read '{type_name}': {source}")]
	Read {
		/// Fully-qualified name of the type being read.
		type_name: String,
		/// Error returned by the reader.
		#[source]
		source: ConstructionError,
	},

	/// A custom scalar codec failed. Passed through untouched.
	#[error(transparent)]
	Scalar(#[from] ScalarError),
}

impl MappingError {
	/// Creates an [`MappingError::InvalidValue`].
	pub fn invalid_value(
		type_name: impl Into<String>,
		property: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self::InvalidValue {
			type_name: type_name.into(),
			property: property.into(),
			message: message.into(),
		}
	}
}

/// Errors produced while converting an instance to or from [`Fields`](crate::value::Fields).
///
/// Also the error type of the `serde` bridge in [`ser`](crate::ser) and [`de`](crate::de).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
	/// A required field had no value.
	#[error("missing required field '{0}'")]
	MissingField(String),

	/// A field was supplied that the constructor does not accept.
	#[error("unexpected field '{0}'")]
	UnexpectedField(String),

	/// A field value had the wrong shape.
	#[error("field '{field}' expected {expected}, found {found}")]
	InvalidType {
		/// Field identifier.
		field: String,
		/// Expected value kind.
		expected: &'static str,
		/// Actual value kind.
		found: &'static str,
	},

	/// A raw value did not match any member of an enum.
	#[error("field '{field}' has no enum member for value {value}")]
	InvalidEnumValue {
		/// Field identifier.
		field: String,
		/// Rendered raw value.
		value: String,
	},

	/// Construction of a nested object failed.
	#[error("in field '{field}': {source}")]
	Nested {
		/// Field holding the nested object.
		field: String,
		/// Error from the nested constructor.
		source: Box<ConstructionError>,
	},

	/// Any other constructor-specific failure.
	#[error("{0}")]
	Custom(String),
}

impl ConstructionError {
	/// Creates a [`ConstructionError::Custom`] error.
	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom(message.into())
	}

	pub(crate) fn nested(field: &str, source: ConstructionError) -> Self {
		Self::Nested {
			field: field.to_string(),
			source: Box::new(source),
		}
	}
}

impl serde::ser::Error for ConstructionError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string())
	}
}

impl serde::de::Error for ConstructionError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string())
	}

	fn missing_field(field: &'static str) -> Self {
		Self::MissingField(field.to_string())
	}

	fn unknown_field(field: &str, _expected: &'static [&'static str]) -> Self {
		Self::UnexpectedField(field.to_string())
	}
}

/// Error returned by a custom scalar codec.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScalarError {
	message: String,
	#[source]
	source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ScalarError {
	/// Creates an error with a message only.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			source: None,
		}
	}

	/// Creates an error that wraps an underlying cause.
	pub fn with_source(
		message: impl Into<String>,
		source: impl StdError + Send + Sync + 'static,
	) -> Self {
		Self {
			message: message.into(),
			source: Some(Box::new(source)),
		}
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Result type alias for registry and mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;
