//! JSON codec configuration.

use objmap_core::UnknownFieldPolicy;
use serde::{Deserialize, Serialize};

/// JSON codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
	/// Handling of input keys that match no property (default: pass through)
	pub unknown_keys: UnknownFieldPolicy,
	/// Indent output of `to_string` (default: false)
	pub pretty: bool,
}

impl Default for JsonConfig {
	fn default() -> Self {
		Self {
			unknown_keys: UnknownFieldPolicy::PassThrough,
			pretty: false,
		}
	}
}

impl JsonConfig {
	/// Creates a configuration with default settings
	///
	/// # Examples
	///
	/// ```
	/// use objmap_core::UnknownFieldPolicy;
	/// use objmap_json::JsonConfig;
	///
	/// let config = JsonConfig::new();
	/// assert_eq!(config.unknown_keys, UnknownFieldPolicy::PassThrough);
	/// assert!(!config.pretty);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder for fluent configuration
	///
	/// # Examples
	///
	/// ```
	/// use objmap_core::UnknownFieldPolicy;
	/// use objmap_json::JsonConfig;
	///
	/// let config = JsonConfig::builder()
	///     .unknown_keys(UnknownFieldPolicy::Reject)
	///     .pretty(true)
	///     .build();
	///
	/// assert_eq!(config.unknown_keys, UnknownFieldPolicy::Reject);
	/// assert!(config.pretty);
	/// ```
	pub fn builder() -> JsonConfigBuilder {
		JsonConfigBuilder::default()
	}
}

/// Builder for JsonConfig
#[derive(Debug, Default)]
pub struct JsonConfigBuilder {
	unknown_keys: Option<UnknownFieldPolicy>,
	pretty: Option<bool>,
}

impl JsonConfigBuilder {
	/// Set the unknown key policy
	pub fn unknown_keys(mut self, policy: UnknownFieldPolicy) -> Self {
		self.unknown_keys = Some(policy);
		self
	}

	/// Set whether to indent output
	pub fn pretty(mut self, pretty: bool) -> Self {
		self.pretty = Some(pretty);
		self
	}

	/// Build the configuration
	pub fn build(self) -> JsonConfig {
		let default = JsonConfig::default();
		JsonConfig {
			unknown_keys: self.unknown_keys.unwrap_or(default.unknown_keys),
			pretty: self.pretty.unwrap_or(default.pretty),
		}
	}
}
