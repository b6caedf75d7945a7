//! In-memory XML element tree.
//!
//! Tags and attribute names of namespaced nodes are stored in Clark notation,
//! `{uri}local`. Parsing resolves prefixes through the `xmlns` declarations in scope,
//! and writing picks or declares prefixes again, so the tree itself never depends on
//! which prefixes a document happened to use.

use std::fmt;

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{XmlError, XmlResult};

type Bindings = Vec<(Option<String>, String)>;

/// One XML element with its attributes, direct text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	tag: String,
	attributes: Vec<(String, String)>,
	text: Option<String>,
	children: Vec<Element>,
	namespaces: Bindings,
}

impl Element {
	/// Creates an element with no content.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			..Self::default()
		}
	}

	/// Tag, in Clark notation when namespaced.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Tag without its `{namespace}` part.
	pub fn local_name(&self) -> &str {
		split_clark(&self.tag).map_or(self.tag.as_str(), |(_, local)| local)
	}

	/// Namespace of the tag, if any.
	pub fn namespace(&self) -> Option<&str> {
		split_clark(&self.tag).map(|(uri, _)| uri)
	}

	/// Attributes in document order.
	pub fn attributes(&self) -> &[(String, String)] {
		&self.attributes
	}

	/// Value of the attribute `name`.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Sets or replaces an attribute.
	pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.attributes.iter_mut().find(|(key, _)| *key == name) {
			Some(entry) => entry.1 = value,
			None => self.attributes.push((name, value)),
		}
	}

	/// Adds an attribute and returns the element.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Direct text content, exactly as written in the document.
	///
	/// Only text before the first child element is kept. Whitespace-only text in an
	/// element that has children is treated as indentation and dropped.
	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	/// Replaces the direct text content.
	pub fn set_text(&mut self, text: impl Into<String>) {
		self.text = Some(text.into());
	}

	/// Sets the text and returns the element.
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.set_text(text);
		self
	}

	/// Child elements in document order.
	pub fn children(&self) -> &[Element] {
		&self.children
	}

	/// Appends a child element.
	pub fn push_child(&mut self, child: Element) {
		self.children.push(child);
	}

	/// Appends a child and returns the element.
	pub fn with_child(mut self, child: Element) -> Self {
		self.push_child(child);
		self
	}

	/// Children whose local name is `name`.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
		self.children
			.iter()
			.filter(move |child| child.local_name() == name)
	}

	/// Declares a namespace on this element. `None` is the default namespace.
	pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: impl Into<String>) {
		self.namespaces.push((prefix.map(str::to_string), uri.into()));
	}

	/// Namespace declarations made on this element.
	pub fn namespaces(&self) -> &[(Option<String>, String)] {
		&self.namespaces
	}

	/// URI of the first namespace declared anywhere in the tree, in document order.
	pub fn first_namespace(&self) -> Option<&str> {
		self.namespaces
			.first()
			.map(|(_, uri)| uri.as_str())
			.or_else(|| self.children.iter().find_map(Element::first_namespace))
	}

	/// Parses a document and returns its root element.
	///
	/// # Errors
	///
	/// Returns [`XmlError::Syntax`] for malformed input, [`XmlError::EmptyDocument`] when
	/// there is no root element, and [`XmlError::UnboundPrefix`] for undeclared prefixes.
	///
	/// # Examples
	///
	/// ```
	/// use objmap_xml::Element;
	///
	/// let root = Element::parse(r#"<b:book xmlns:b="urn:books" id="7"><b:title>Dune</b:title></b:book>"#).unwrap();
	/// assert_eq!(root.tag(), "{urn:books}book");
	/// assert_eq!(root.attribute("id"), Some("7"));
	/// assert_eq!(root.children()[0].text(), Some("Dune"));
	/// ```
	pub fn parse(text: &str) -> XmlResult<Element> {
		let mut reader = Reader::from_str(text);
		let mut scopes: Vec<Bindings> = Vec::new();
		let mut stack: Vec<Open> = Vec::new();
		let mut root = None;

		loop {
			let position = reader.buffer_position() as u64;
			match reader.read_event() {
				Ok(Event::Start(e)) => {
					let element = open(&e, &mut scopes, position)?;
					stack.push(Open::new(element));
				}
				Ok(Event::Empty(e)) => {
					let element = open(&e, &mut scopes, position)?;
					scopes.pop();
					attach(element, &mut stack, &mut root, position)?;
				}
				Ok(Event::End(_)) => {
					if let Some(Open { mut element, text, .. }) = stack.pop() {
						scopes.pop();
						if !text.is_empty() {
							element.text = Some(text);
						}
						attach(element, &mut stack, &mut root, position)?;
					}
				}
				Ok(Event::Text(e)) => {
					if let Some(buffer) = stack.last_mut().and_then(Open::leading_text) {
						let content = e.xml_content().map_err(|err| syntax(position, err))?;
						buffer.push_str(&content);
					}
				}
				Ok(Event::CData(e)) => {
					if let Some(buffer) = stack.last_mut().and_then(Open::leading_text) {
						buffer.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()));
					}
				}
				Ok(Event::GeneralRef(e)) => {
					if let Some(buffer) = stack.last_mut().and_then(Open::leading_text) {
						match e.resolve_char_ref().map_err(|err| syntax(position, err))? {
							Some(ch) => buffer.push(ch),
							None => {
								let name = e.decode().map_err(|err| syntax(position, err))?;
								let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
									syntax(position, format!("unknown entity '&{name};'"))
								})?;
								buffer.push_str(resolved);
							}
						}
					}
				}
				Ok(Event::Eof) => break,
				Ok(_) => {}
				Err(err) => return Err(syntax(reader.buffer_position() as u64, err)),
			}
		}

		if let Some(open) = stack.last() {
			return Err(syntax(
				reader.buffer_position() as u64,
				format!("element '{}' is not closed", open.element.tag),
			));
		}
		root.ok_or(XmlError::EmptyDocument)
	}

	fn write(&self, f: &mut fmt::Formatter<'_>, scopes: &mut Vec<Bindings>) -> fmt::Result {
		let mut declared = self.namespaces.clone();
		let outer: &[Bindings] = scopes;
		let name = written_name(&self.tag, false, outer, &mut declared);
		let mut attributes = Vec::with_capacity(self.attributes.len());
		for (key, value) in &self.attributes {
			attributes.push((written_name(key, true, outer, &mut declared), value.as_str()));
		}

		write!(f, "<{name}")?;
		for (prefix, uri) in &declared {
			match prefix {
				Some(prefix) => write!(f, " xmlns:{prefix}=\"{}\"", escape(uri.as_str()))?,
				None => write!(f, " xmlns=\"{}\"", escape(uri.as_str()))?,
			}
		}
		for (key, value) in &attributes {
			write!(f, " {key}=\"{}\"", escape(*value))?;
		}

		let text = self.text.as_deref().unwrap_or_default();
		if text.is_empty() && self.children.is_empty() {
			return f.write_str(" />");
		}
		write!(f, ">{}", partial_escape(text))?;
		scopes.push(declared);
		for child in &self.children {
			child.write(f, scopes)?;
		}
		scopes.pop();
		write!(f, "</{name}>")
	}
}

impl fmt::Display for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.write(f, &mut Vec::new())
	}
}

fn syntax(position: u64, error: impl fmt::Display) -> XmlError {
	XmlError::Syntax {
		position,
		message: error.to_string(),
	}
}

/// Splits `{uri}local` into its parts.
pub(crate) fn split_clark(name: &str) -> Option<(&str, &str)> {
	name.strip_prefix('{')?.split_once('}')
}

fn open(start: &BytesStart<'_>, scopes: &mut Vec<Bindings>, position: u64) -> XmlResult<Element> {
	let mut declared = Bindings::new();
	let mut raw_attributes = Vec::new();
	for attribute in start.attributes() {
		let attribute = attribute.map_err(|err| syntax(position, err))?;
		let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
		let raw = String::from_utf8_lossy(&attribute.value);
		let value = unescape(&raw).map_err(|err| syntax(position, err))?.into_owned();
		if key == "xmlns" {
			declared.push((None, value));
		} else if let Some(prefix) = key.strip_prefix("xmlns:") {
			declared.push((Some(prefix.to_string()), value));
		} else {
			raw_attributes.push((key, value));
		}
	}
	scopes.push(declared.clone());

	let scopes: &[Bindings] = scopes;
	let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
	let tag = resolve(&name, false, scopes)?;
	let attributes = raw_attributes
		.into_iter()
		.map(|(key, value)| Ok((resolve(&key, true, scopes)?, value)))
		.collect::<XmlResult<Vec<_>>>()?;

	Ok(Element {
		tag,
		attributes,
		text: None,
		children: Vec::new(),
		namespaces: declared,
	})
}

/// Element being read, with the text that precedes its first child.
struct Open {
	element: Element,
	text: String,
	has_children: bool,
}

impl Open {
	fn new(element: Element) -> Self {
		Self {
			element,
			text: String::new(),
			has_children: false,
		}
	}

	/// Buffer for text that still belongs to the element. Text after the first child
	/// is tail text and is dropped.
	fn leading_text(&mut self) -> Option<&mut String> {
		(!self.has_children).then_some(&mut self.text)
	}
}

fn attach(
	element: Element,
	stack: &mut [Open],
	root: &mut Option<Element>,
	position: u64,
) -> XmlResult<()> {
	match stack.last_mut() {
		Some(parent) => {
			// Whitespace before the first child is indentation.
			if !parent.has_children && parent.text.trim().is_empty() {
				parent.text.clear();
			}
			parent.has_children = true;
			parent.element.children.push(element);
		}
		None if root.is_some() => {
			return Err(syntax(position, "document has more than one root element"));
		}
		None => *root = Some(element),
	}
	Ok(())
}

fn lookup<'a>(prefix: Option<&str>, scopes: &'a [Bindings], declared: &'a [(Option<String>, String)]) -> Option<&'a str> {
	declared
		.iter()
		.chain(scopes.iter().rev().flatten())
		.find(|(bound, _)| bound.as_deref() == prefix)
		.map(|(_, uri)| uri.as_str())
}

/// Resolves a prefixed or unprefixed name read from a document into Clark notation.
fn resolve(name: &str, is_attribute: bool, scopes: &[Bindings]) -> XmlResult<String> {
	match name.split_once(':') {
		Some(("xml", _)) => Ok(name.to_string()),
		Some((prefix, local)) => match lookup(Some(prefix), scopes, &[]) {
			Some(uri) => Ok(format!("{{{uri}}}{local}")),
			None => Err(XmlError::UnboundPrefix {
				prefix: prefix.to_string(),
			}),
		},
		// Unprefixed attributes are never in the default namespace.
		None if is_attribute => Ok(name.to_string()),
		None => match lookup(None, scopes, &[]) {
			Some(uri) if !uri.is_empty() => Ok(format!("{{{uri}}}{name}")),
			_ => Ok(name.to_string()),
		},
	}
}

/// Chooses the written form of a Clark-notation name, declaring a namespace on the
/// current element when none in scope fits.
fn written_name(name: &str, is_attribute: bool, scopes: &[Bindings], declared: &mut Bindings) -> String {
	let Some((uri, local)) = split_clark(name) else {
		let default_is_set = lookup(None, scopes, declared).is_some_and(|uri| !uri.is_empty());
		if !is_attribute && default_is_set {
			declared.push((None, String::new()));
		}
		return name.to_string();
	};

	let view: &[(Option<String>, String)] = declared;
	if !is_attribute && lookup(None, scopes, view) == Some(uri) {
		return local.to_string();
	}
	let bound_prefix = view
		.iter()
		.chain(scopes.iter().rev().flatten())
		.filter_map(|(prefix, bound)| prefix.as_deref().filter(|_| bound == uri))
		.find(|prefix| lookup(Some(*prefix), scopes, view) == Some(uri))
		.map(str::to_string);
	if let Some(prefix) = bound_prefix {
		return format!("{prefix}:{local}");
	}
	if is_attribute {
		let prefix = format!("ns{}", declared.len());
		declared.push((Some(prefix.clone()), uri.to_string()));
		format!("{prefix}:{local}")
	} else {
		declared.push((None, uri.to_string()));
		local.to_string()
	}
}
