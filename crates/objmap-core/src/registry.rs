//! Metadata registry.
//!
//! Registration happens on a [`RegistryBuilder`]. [`RegistryBuilder::build`] resolves
//! every property once and freezes the result into a [`Registry`], which is cheap to
//! clone and safe to share between threads. A registry can be installed once as the
//! process-wide instance used by the `as_json` / `as_xml` style entry points.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::declaration::{ClassDeclaration, Serializable};
use crate::error::{MappingError, MappingResult};
use crate::metadata::{
	ClassMetadata, Format, FormatSet, ItemKind, PropertyKind, PropertyMetadata, TypeRef,
	XmlArrayConfig, XmlArrayPlacement,
};
use crate::scalar::{CodecRef, ScalarCodec, codec_ref};

/// Fully-qualified property identifier: a type path plus a property name.
///
/// # Examples
///
/// ```
/// use objmap_core::PropertyId;
///
/// struct Book;
///
/// let id = PropertyId::of::<Book>("publish_date");
/// assert!(id.to_string().ends_with("Book.publish_date"));
///
/// let parsed = PropertyId::from("shop::Book.title");
/// assert_eq!(parsed.type_path(), "shop::Book");
/// assert_eq!(parsed.property(), "title");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyId {
	type_path: String,
	property: String,
}

impl PropertyId {
	/// Identifier of `property` on `T`.
	pub fn of<T: 'static>(property: impl Into<String>) -> Self {
		Self::new(TypeRef::of::<T>().path(), property)
	}

	/// Identifier from an explicit type path.
	pub fn new(type_path: impl Into<String>, property: impl Into<String>) -> Self {
		Self {
			type_path: type_path.into(),
			property: property.into(),
		}
	}

	/// Fully-qualified type name.
	pub fn type_path(&self) -> &str {
		&self.type_path
	}

	/// Property identifier.
	pub fn property(&self) -> &str {
		&self.property
	}
}

impl From<&str> for PropertyId {
	/// Parses `path::to::Type.property`, splitting at the last `.`.
	fn from(value: &str) -> Self {
		match value.rsplit_once('.') {
			Some((type_path, property)) => Self::new(type_path, property),
			None => Self::new("", value),
		}
	}
}

impl fmt::Display for PropertyId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.type_path, self.property)
	}
}

#[derive(Debug)]
enum Override {
	CustomName(Format, String),
	XmlAttribute,
	XmlArray(XmlArrayConfig),
	Codec(CodecRef),
}

/// Collects registrations and overrides before freezing them into a [`Registry`].
///
/// # Examples
///
/// ```
/// use objmap_core::{
///     ClassDeclaration, ConstructionError, DeclaredType, Fields, Format, PropertyId,
///     Registry, Serializable,
/// };
///
/// struct Tag {
///     name: String,
/// }
///
/// impl Serializable for Tag {
///     fn declare(class: &mut ClassDeclaration) {
///         class.property("name", DeclaredType::string());
///     }
///
///     fn to_fields(&self) -> Result<Fields, ConstructionError> {
///         Ok(Fields::new().with("name", &self.name))
///     }
///
///     fn from_fields(mut fields: Fields) -> Result<Self, ConstructionError> {
///         Ok(Self { name: fields.take("name")? })
///     }
/// }
///
/// let registry = Registry::builder()
///     .register_custom_name(PropertyId::of::<Tag>("name"), Format::Json, "label")
///     .register::<Tag>()
///     .build();
///
/// let property = registry.lookup_type::<Tag>().unwrap().property("name").unwrap();
/// assert_eq!(property.custom_name(Format::Json), Some("label"));
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	classes: Vec<ClassDeclaration>,
	overrides: Vec<(PropertyId, Override)>,
}

impl RegistryBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `T` for the formats it declares (both by default).
	///
	/// Registering a type twice is a no-op.
	pub fn register<T: Serializable>(mut self) -> Self {
		self.add::<T>(None);
		self
	}

	/// Registers `T` for an explicit set of formats.
	pub fn register_with_formats<T: Serializable>(mut self, formats: FormatSet) -> Self {
		self.add::<T>(Some(formats));
		self
	}

	fn add<T: Serializable>(&mut self, formats: Option<FormatSet>) {
		let type_ref = TypeRef::of::<T>();
		if self.classes.iter().any(|class| class.type_ref() == type_ref) {
			debug!(type_name = type_ref.path(), "Type already registered, ignoring");
			return;
		}
		let mut class = ClassDeclaration::new(type_ref);
		T::declare(&mut class);
		if let Some(formats) = formats {
			class.set_formats(formats);
		}
		debug!(type_name = type_ref.path(), "Registered type");
		self.classes.push(class);
	}

	/// Overrides the wire name of a property in one format.
	pub fn register_custom_name(
		mut self,
		property: impl Into<PropertyId>,
		format: Format,
		wire_name: impl Into<String>,
	) -> Self {
		self.overrides
			.push((property.into(), Override::CustomName(format, wire_name.into())));
		self
	}

	/// Renders a property as an XML attribute.
	pub fn register_xml_attribute(mut self, property: impl Into<PropertyId>) -> Self {
		self.overrides.push((property.into(), Override::XmlAttribute));
		self
	}

	/// Sets the XML layout of a collection property.
	pub fn register_xml_array_config(
		mut self,
		property: impl Into<PropertyId>,
		placement: XmlArrayPlacement,
		child_name: impl Into<String>,
	) -> Self {
		self.overrides.push((
			property.into(),
			Override::XmlArray(XmlArrayConfig::new(placement, child_name)),
		));
		self
	}

	/// Attaches a custom scalar codec to a property.
	pub fn register_custom_scalar_codec<C: ScalarCodec>(
		mut self,
		property: impl Into<PropertyId>,
		codec: C,
	) -> Self {
		self.overrides
			.push((property.into(), Override::Codec(codec_ref(codec))));
		self
	}

	/// Applies overrides, resolves dispatch tags and freezes the registry.
	///
	/// Overrides take precedence over inline declarations. Overrides naming an
	/// undeclared property, and array layouts on non-collections, are logged and skipped.
	pub fn build(mut self) -> Registry {
		for (id, rule) in std::mem::take(&mut self.overrides) {
			let Some(property) = self.property_mut(&id) else {
				warn!(property = %id, "Override names an undeclared property, skipping");
				continue;
			};
			apply_override(&id, property, rule);
		}

		let registered: Vec<TypeId> = self
			.classes
			.iter()
			.map(|class| class.type_ref().id())
			.collect();

		let mut classes = HashMap::with_capacity(self.classes.len());
		for mut class in self.classes {
			let json_key_removals = class.take_json_key_removals();
			let (type_ref, name, formats, mut properties) = class.into_parts();
			for property in &mut properties {
				property.resolve();
				warn_on_unregistered_reference(type_ref, property, &registered);
			}
			if properties.iter().filter(|p| p.is_text_content()).count() > 1 {
				warn!(
					type_name = type_ref.path(),
					"More than one property maps to XML text content, only the first is used"
				);
			}
			let metadata = ClassMetadata::new(type_ref, name, formats, properties)
				.with_json_key_removals(json_key_removals);
			classes.insert(type_ref.id(), Arc::new(metadata));
		}

		debug!(types = classes.len(), "Registry built");
		Registry {
			inner: Arc::new(RegistryInner { classes }),
		}
	}

	fn property_mut(&mut self, id: &PropertyId) -> Option<&mut PropertyMetadata> {
		self.classes
			.iter_mut()
			.find(|class| class.type_ref().path() == id.type_path())
			.and_then(|class| class.property_mut(id.property()))
	}
}

fn apply_override(id: &PropertyId, property: &mut PropertyMetadata, rule: Override) {
	match rule {
		Override::CustomName(format, wire_name) => property.set_custom_name(format, wire_name),
		Override::XmlAttribute => property.set_xml_attribute(true),
		Override::XmlArray(config) => {
			if matches!(property.declared_type().kind(), PropertyKind::Collection(_)) {
				property.set_xml_array_config(config);
			} else {
				warn!(property = %id, "XML array config on a non-collection property, skipping");
			}
		}
		Override::Codec(codec) => property.set_codec(codec),
	}
}

fn warn_on_unregistered_reference(owner: TypeRef, property: &PropertyMetadata, registered: &[TypeId]) {
	let target = match property.kind() {
		PropertyKind::Object(target) | PropertyKind::Collection(ItemKind::Object(target)) => target,
		_ => return,
	};
	if !registered.contains(&target.id()) {
		warn!(
			type_name = owner.path(),
			property = property.name(),
			target = target.path(),
			"Property refers to a type that is not registered"
		);
	}
}

#[derive(Debug)]
struct RegistryInner {
	classes: HashMap<TypeId, Arc<ClassMetadata>>,
}

/// Immutable lookup structure produced by [`RegistryBuilder::build`].
#[derive(Debug, Clone)]
pub struct Registry {
	inner: Arc<RegistryInner>,
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

impl Registry {
	/// Starts a new registration phase.
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// Metadata for the type identified by `type_ref`.
	///
	/// # Errors
	///
	/// Returns [`MappingError::UnregisteredType`] if the type was never registered.
	pub fn lookup(&self, type_ref: TypeRef) -> MappingResult<&ClassMetadata> {
		self.inner
			.classes
			.get(&type_ref.id())
			.map(|class| class.as_ref())
			.ok_or_else(|| MappingError::UnregisteredType {
				type_name: type_ref.path().to_string(),
			})
	}

	/// Metadata for `T`.
	pub fn lookup_type<T: 'static>(&self) -> MappingResult<&ClassMetadata> {
		self.lookup(TypeRef::of::<T>())
	}

	/// Metadata for one property of the type identified by `type_ref`.
	///
	/// # Errors
	///
	/// Returns [`MappingError::UnregisteredType`] or [`MappingError::UnknownProperty`].
	pub fn lookup_property(&self, type_ref: TypeRef, property: &str) -> MappingResult<&PropertyMetadata> {
		let class = self.lookup(type_ref)?;
		class
			.property(property)
			.ok_or_else(|| MappingError::UnknownProperty {
				type_name: class.type_name().to_string(),
				property: property.to_string(),
			})
	}

	/// Returns true if `T` is registered.
	pub fn is_registered<T: 'static>(&self) -> bool {
		self.inner.classes.contains_key(&TypeId::of::<T>())
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		self.inner.classes.len()
	}

	/// Returns true if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.inner.classes.is_empty()
	}

	/// Installs this registry as the process-wide instance.
	///
	/// Only the first call succeeds; later calls return the rejected registry.
	pub fn install(self) -> Result<(), Registry> {
		GLOBAL.set(self)?;
		debug!("Installed process-wide registry");
		Ok(())
	}
}

/// The process-wide registry.
///
/// # Errors
///
/// Returns [`MappingError::RegistryNotInstalled`] before [`Registry::install`] was called.
pub fn global() -> MappingResult<&'static Registry> {
	GLOBAL.get().ok_or(MappingError::RegistryNotInstalled)
}
