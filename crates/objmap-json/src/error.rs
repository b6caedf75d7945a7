//! JSON codec errors.

use objmap_core::MappingError;
use thiserror::Error;

/// Errors raised by [`JsonCodec`](crate::JsonCodec).
#[derive(Debug, Error)]
pub enum JsonError {
	/// Registry lookup, value conversion, construction or custom codec failure.
	#[error(transparent)]
	Mapping(#[from] MappingError),

	/// The input text is not valid JSON, or output could not be written.
	#[error("Invalid JSON: {0}")]
	Syntax(#[from] serde_json::Error),

	/// A registered type was decoded from something other than a JSON object.
	#[error("Expected a JSON object for '{type_name}', found {found}")]
	NotAnObject {
		/// Fully-qualified name of the target type.
		type_name: String,
		/// Kind of JSON value that was found.
		found: &'static str,
	},

	/// A key matched no property and the codec is configured to reject it.
	#[error("Unknown key '{key}' for '{type_name}'")]
	UnknownKey {
		/// Key as it appeared in the input.
		key: String,
		/// Fully-qualified name of the target type.
		type_name: String,
	},
}

/// Result type alias for JSON codec operations.
pub type JsonResult<T> = Result<T, JsonError>;
