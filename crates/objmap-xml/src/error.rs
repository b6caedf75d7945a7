//! XML codec errors.

use objmap_core::MappingError;
use thiserror::Error;

/// Errors raised while parsing XML or mapping it to registered types.
#[derive(Debug, Error)]
pub enum XmlError {
	/// Registry lookup, value conversion, construction or custom codec failure.
	#[error(transparent)]
	Mapping(#[from] MappingError),

	/// A child element resolved to no property of the target type.
	#[error("Element '{element}' is not mapped to any property of '{type_name}'")]
	UnmappedElement {
		/// Local name of the offending element.
		element: String,
		/// Fully-qualified name of the target type.
		type_name: String,
	},

	/// A nested array wrapper contained an element with the wrong tag.
	#[error("Unexpected element '{found}' in nested array '{wrapper}', expected '{expected}'")]
	MalformedArrayStructure {
		/// Tag of the wrapper element.
		wrapper: String,
		/// Declared item tag.
		expected: String,
		/// Tag that was found.
		found: String,
	},

	/// The document is not well-formed.
	#[error("Malformed XML at byte {position}: {message}")]
	Syntax {
		/// Byte offset reported by the reader.
		position: u64,
		/// Reader error description.
		message: String,
	},

	/// The document has no root element.
	#[error("XML document has no root element")]
	EmptyDocument,

	/// A tag or attribute used a prefix with no `xmlns` declaration in scope.
	#[error("Namespace prefix '{prefix}' is not declared")]
	UnboundPrefix {
		/// The undeclared prefix.
		prefix: String,
	},
}

/// Result type alias for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;
