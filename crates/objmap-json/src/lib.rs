//! # objmap-json
//!
//! JSON codec for types registered in an objmap [`Registry`](objmap_core::Registry).
//!
//! ## Overview
//!
//! [`JsonCodec`] walks an object's declared properties and produces a
//! [`serde_json::Value`], and rebuilds objects from JSON through their
//! [`Serializable::from_fields`](objmap_core::Serializable::from_fields) constructor.
//!
//! - Wire names come from custom JSON names, else the name formatter
//! - Absent and null properties are omitted
//! - Enums are written as their underlying value, custom scalars as their text form
//! - Unknown input keys are handed to the constructor by default, see [`JsonConfig`]

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;

pub use codec::JsonCodec;
pub use config::{JsonConfig, JsonConfigBuilder};
pub use error::{JsonError, JsonResult};

use objmap_core::Serializable;

/// JSON entry points on every [`Serializable`] type, using the process-wide registry.
pub trait JsonSerializable: Serializable {
	/// Encodes `self` as JSON text.
	///
	/// # Errors
	///
	/// Fails if no registry is installed or the encode fails.
	fn as_json(&self) -> JsonResult<String> {
		JsonCodec::global()?.to_string(self)
	}

	/// Decodes an instance from JSON text.
	fn from_json(text: &str) -> JsonResult<Self> {
		JsonCodec::global()?.from_str(text)
	}
}

impl<T: Serializable> JsonSerializable for T {}
