//! # objmap-xml
//!
//! XML codec for types registered in an objmap [`Registry`](objmap_core::Registry).
//!
//! ## Overview
//!
//! [`XmlCodec`] maps objects to an [`Element`] tree and back. [`Element`] is a small
//! owned document model with namespace-aware parsing and writing on top of `quick-xml`.
//!
//! - Properties flagged as attributes are written as XML attributes
//! - A property named `"."` in XML receives the element's text content
//! - Collections are written flat (repeated siblings) unless declared nested
//! - Text is coerced back to each property's declared scalar kind on decode
//! - Unmapped child elements are rejected by default, see [`XmlConfig`]

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod element;
pub mod error;

pub use codec::XmlCodec;
pub use config::{XmlConfig, XmlConfigBuilder};
pub use element::Element;
pub use error::{XmlError, XmlResult};

use objmap_core::Serializable;

/// XML entry points on every [`Serializable`] type, using the process-wide registry.
pub trait XmlSerializable: Serializable {
	/// Encodes `self` as XML text rooted at the class's element name.
	///
	/// # Errors
	///
	/// Fails if no registry is installed or the encode fails.
	fn as_xml(&self) -> XmlResult<String> {
		XmlCodec::global()?.to_string(self)
	}

	/// Encodes `self` as an element tree.
	fn as_xml_element(&self) -> XmlResult<Element> {
		XmlCodec::global()?.encode(self)
	}

	/// Decodes an instance from XML text.
	fn from_xml(text: &str) -> XmlResult<Self> {
		XmlCodec::global()?.from_str(text)
	}

	/// Decodes an instance from an element tree.
	fn from_xml_element(element: &Element) -> XmlResult<Self> {
		XmlCodec::global()?.decode(element)
	}
}

impl<T: Serializable> XmlSerializable for T {}
