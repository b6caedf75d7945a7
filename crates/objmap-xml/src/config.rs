//! XML codec configuration.

use objmap_core::UnknownFieldPolicy;
use serde::{Deserialize, Serialize};

/// XML codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
	/// Handling of child elements that match no property (default: reject)
	pub unknown_elements: UnknownFieldPolicy,
	/// Namespace stripped from tags on decode (default: inferred from the document)
	pub default_namespace: Option<String>,
	/// Namespace of encoded elements, declared on the root (default: none)
	pub namespace: Option<String>,
	/// Prepend an XML declaration in `to_string` (default: false)
	pub xml_declaration: bool,
}

impl Default for XmlConfig {
	fn default() -> Self {
		Self {
			unknown_elements: UnknownFieldPolicy::Reject,
			default_namespace: None,
			namespace: None,
			xml_declaration: false,
		}
	}
}

impl XmlConfig {
	/// Creates a configuration with default settings
	///
	/// # Examples
	///
	/// ```
	/// use objmap_core::UnknownFieldPolicy;
	/// use objmap_xml::XmlConfig;
	///
	/// let config = XmlConfig::new();
	/// assert_eq!(config.unknown_elements, UnknownFieldPolicy::Reject);
	/// assert!(config.namespace.is_none());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder for fluent configuration
	///
	/// # Examples
	///
	/// ```
	/// use objmap_xml::XmlConfig;
	///
	/// let config = XmlConfig::builder()
	///     .namespace("urn:books")
	///     .xml_declaration(true)
	///     .build();
	///
	/// assert_eq!(config.namespace.as_deref(), Some("urn:books"));
	/// assert!(config.xml_declaration);
	/// ```
	pub fn builder() -> XmlConfigBuilder {
		XmlConfigBuilder::default()
	}
}

/// Builder for XmlConfig
#[derive(Debug, Default)]
pub struct XmlConfigBuilder {
	unknown_elements: Option<UnknownFieldPolicy>,
	default_namespace: Option<String>,
	namespace: Option<String>,
	xml_declaration: Option<bool>,
}

impl XmlConfigBuilder {
	/// Set the unknown element policy
	pub fn unknown_elements(mut self, policy: UnknownFieldPolicy) -> Self {
		self.unknown_elements = Some(policy);
		self
	}

	/// Set the namespace stripped from tags on decode
	pub fn default_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.default_namespace = Some(namespace.into());
		self
	}

	/// Set the namespace of encoded elements
	pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}

	/// Set whether to write an XML declaration
	pub fn xml_declaration(mut self, declaration: bool) -> Self {
		self.xml_declaration = Some(declaration);
		self
	}

	/// Build the configuration
	pub fn build(self) -> XmlConfig {
		let default = XmlConfig::default();
		XmlConfig {
			unknown_elements: self.unknown_elements.unwrap_or(default.unknown_elements),
			default_namespace: self.default_namespace.or(default.default_namespace),
			namespace: self.namespace.or(default.namespace),
			xml_declaration: self.xml_declaration.unwrap_or(default.xml_declaration),
		}
	}
}
