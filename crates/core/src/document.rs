//! Owned, mutable XML tree for descriptor files.
//!
//! Descriptors are read with `xml-rs` into a small node tree and written back
//! with its event writer. Everything the transforms do not touch (comments,
//! processing instructions, CDATA, whitespace, namespaces, the declaration,
//! a doctype, a UTF-8 BOM and CRLF line endings) is carried through unchanged.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use xml::attribute::{Attribute, OwnedAttribute};
use xml::name::OwnedName;
use xml::namespace::Namespace;
use xml::reader::{ParserConfig, XmlEvent};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent as XmlWriteEvent};

use crate::error::{RelinkError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors from turning bytes into a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error(transparent)]
  Xml(#[from] xml::reader::Error),
  #[error("document has no root element")]
  NoRoot,
}

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  Element(Element),
  Text(String),
  Whitespace(String),
  CData(String),
  Comment(String),
  ProcessingInstruction { name: String, data: Option<String> },
  /// Raw `<!DOCTYPE ...>` text; only appears in the prolog.
  Doctype(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
  pub name: OwnedName,
  pub attributes: Vec<OwnedAttribute>,
  /// Namespace mappings in scope where the element was read.
  namespace: Namespace,
  pub children: Vec<Node>,
}

impl Element {
  /// A new element without namespace; it inherits the default namespace of
  /// wherever it is inserted.
  pub fn new(local_name: &str) -> Self {
    Self {
      name: OwnedName::local(local_name),
      attributes: Vec::new(),
      namespace: Namespace::empty(),
      children: Vec::new(),
    }
  }

  pub fn is(&self, local_name: &str) -> bool {
    self.name.local_name == local_name
  }

  /// Value of an attribute by local name.
  pub fn attribute(&self, local_name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|a| a.name.local_name == local_name)
      .map(|a| a.value.as_str())
  }

  pub fn set_attribute(&mut self, local_name: &str, value: impl Into<String>) {
    let value = value.into();
    match self.attributes.iter_mut().find(|a| a.name.local_name == local_name) {
      Some(existing) => existing.value = value,
      None => self.attributes.push(OwnedAttribute::new(OwnedName::local(local_name), value)),
    }
  }

  pub fn with_attribute(mut self, local_name: &str, value: impl Into<String>) -> Self {
    self.set_attribute(local_name, value);
    self
  }

  /// Concatenated text of all descendants.
  pub fn text(&self) -> String {
    let mut out = String::new();
    self.collect_text(&mut out);
    out
  }

  fn collect_text(&self, out: &mut String) {
    for child in &self.children {
      match child {
        Node::Text(s) | Node::Whitespace(s) | Node::CData(s) => out.push_str(s),
        Node::Element(e) => e.collect_text(out),
        Node::Comment(_) | Node::ProcessingInstruction { .. } | Node::Doctype(_) => {}
      }
    }
  }

  /// Replace all children with a single text node.
  pub fn set_text(&mut self, value: impl Into<String>) {
    self.children = vec![Node::Text(value.into())];
  }

  pub fn push(&mut self, node: Node) {
    self.children.push(node);
  }

  /// Direct child elements.
  pub fn elements(&self) -> impl Iterator<Item = &Element> {
    self.children.iter().filter_map(|n| match n {
      Node::Element(e) => Some(e),
      _ => None,
    })
  }

  /// First direct child element with the given local name.
  pub fn child(&self, local_name: &str) -> Option<&Element> {
    self.elements().find(|e| e.is(local_name))
  }

  /// First descendant (document order, excluding self) with the given name.
  pub fn find_descendant(&self, local_name: &str) -> Option<&Element> {
    for child in self.elements() {
      if child.is(local_name) {
        return Some(child);
      }
      if let Some(found) = child.find_descendant(local_name) {
        return Some(found);
      }
    }
    None
  }

  /// Call `f` on this element and every descendant element, parents first.
  pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
    f(self);
    for child in &mut self.children {
      if let Node::Element(e) = child {
        e.visit_mut(f);
      }
    }
  }

  /// Whitespace immediately before the child at `index`, if any.
  pub fn leading_whitespace(&self, index: usize) -> Option<&str> {
    match index.checked_sub(1).and_then(|i| self.children.get(i)) {
      Some(Node::Whitespace(s)) => Some(s),
      Some(Node::Text(s)) if s.trim().is_empty() => Some(s),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
  Lf,
  CrLf,
}

/// A parsed descriptor file.
#[derive(Debug, Clone)]
pub struct Document {
  /// Raw `<?xml ...?>` text when the source had one.
  declaration: Option<String>,
  bom: bool,
  line_ending: LineEnding,
  trailing_newline: bool,
  prolog: Vec<Node>,
  pub root: Element,
  epilog: Vec<Node>,
}

impl Document {
  /// Read and parse a descriptor from disk.
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path).map_err(|e| RelinkError::io(path, e))?;
    Self::parse(&bytes).map_err(|source| RelinkError::MalformedDocument {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Parse a document from raw bytes.
  pub fn parse(bytes: &[u8]) -> std::result::Result<Self, ParseError> {
    let bom = bytes.starts_with(UTF8_BOM);
    let body = if bom { &bytes[UTF8_BOM.len()..] } else { bytes };

    let reader = ParserConfig::new()
      .trim_whitespace(false)
      .whitespace_to_characters(false)
      .cdata_to_characters(false)
      .ignore_comments(false)
      .coalesce_characters(true)
      .create_reader(body);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();

    for event in reader {
      let node = match event? {
        XmlEvent::StartElement {
          name,
          attributes,
          namespace,
        } => {
          stack.push(Element {
            name,
            attributes,
            namespace,
            children: Vec::new(),
          });
          continue;
        }
        XmlEvent::EndElement { .. } => match stack.pop() {
          Some(done) => Node::Element(done),
          None => continue,
        },
        XmlEvent::Characters(s) => Node::Text(s),
        XmlEvent::Whitespace(s) => Node::Whitespace(s),
        XmlEvent::CData(s) => Node::CData(s),
        XmlEvent::Comment(s) => Node::Comment(s),
        XmlEvent::ProcessingInstruction { name, data } => Node::ProcessingInstruction { name, data },
        XmlEvent::Doctype { syntax } => Node::Doctype(syntax),
        XmlEvent::EndDocument => break,
        _ => continue,
      };

      match (stack.last_mut(), node) {
        (Some(parent), node) => parent.children.push(node),
        (None, Node::Element(done)) => root = Some(done),
        // whitespace between top-level nodes is regenerated on write
        (None, Node::Whitespace(_)) => {}
        (None, node) if root.is_none() => prolog.push(node),
        (None, node) => epilog.push(node),
      }
    }

    Ok(Self {
      declaration: raw_declaration(body),
      bom,
      line_ending: if body.windows(2).any(|w| w == b"\r\n") {
        LineEnding::CrLf
      } else {
        LineEnding::Lf
      },
      trailing_newline: body.ends_with(b"\n"),
      prolog,
      root: root.ok_or(ParseError::NoRoot)?,
      epilog,
    })
  }

  /// Serialize back to bytes in the source's encoding conventions.
  pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, xml::writer::Error> {
    let mut out: Vec<u8> = Vec::new();
    if let Some(decl) = &self.declaration {
      out.extend_from_slice(decl.as_bytes());
      out.push(b'\n');
    }

    {
      // values are escaped by `escape_text`/`escape_attribute`
      let mut config = EmitterConfig::new();
      config.perform_escaping = false;
      let mut writer = config
        .write_document_declaration(false)
        .perform_indent(false)
        .autopad_comments(false)
        .create_writer(&mut out);

      for node in &self.prolog {
        write_node(&mut writer, node)?;
        writer.inner_mut().write_all(b"\n")?;
      }
      write_element(&mut writer, &self.root)?;
      for node in &self.epilog {
        writer.inner_mut().write_all(b"\n")?;
        write_node(&mut writer, node)?;
      }
    }

    if self.trailing_newline {
      out.push(b'\n');
    }

    let mut bytes = Vec::with_capacity(out.len() + 3);
    if self.bom {
      bytes.extend_from_slice(UTF8_BOM);
    }
    match self.line_ending {
      LineEnding::Lf => bytes.extend_from_slice(&out),
      LineEnding::CrLf => {
        let mut prev = 0u8;
        for b in out {
          if b == b'\n' && prev != b'\r' {
            bytes.push(b'\r');
          }
          bytes.push(b);
          prev = b;
        }
      }
    }
    Ok(bytes)
  }

  /// Write the document back to `path`, replacing its contents.
  pub fn save(&self, path: &Path) -> Result<()> {
    let bytes = self.to_bytes()?;
    std::fs::write(path, bytes).map_err(|e| RelinkError::io(path, e))
  }
}

/// The XML declaration exactly as written, if the body starts with one.
fn raw_declaration(body: &[u8]) -> Option<String> {
  let text = std::str::from_utf8(body).ok()?;
  let trimmed = text.trim_start();
  if !trimmed.starts_with("<?xml") || !trimmed[5..].starts_with(|c: char| c.is_whitespace()) {
    return None;
  }
  let end = trimmed.find("?>")?;
  Some(trimmed[..end + 2].to_string())
}

fn write_element<W: Write>(writer: &mut EventWriter<W>, element: &Element) -> std::result::Result<(), xml::writer::Error> {
  let values: Vec<String> = element.attributes.iter().map(|a| escape_attribute(&a.value)).collect();
  let attributes: Vec<Attribute<'_>> = element
    .attributes
    .iter()
    .zip(&values)
    .map(|(a, v)| Attribute::new(a.name.borrow(), v))
    .collect();

  writer.write(XmlWriteEvent::StartElement {
    name: element.name.borrow(),
    attributes: Cow::Owned(attributes),
    namespace: Cow::Borrowed(&element.namespace),
  })?;
  for child in &element.children {
    write_node(writer, child)?;
  }
  writer.write(XmlWriteEvent::end_element())
}

fn write_node<W: Write>(writer: &mut EventWriter<W>, node: &Node) -> std::result::Result<(), xml::writer::Error> {
  match node {
    Node::Element(e) => write_element(writer, e),
    Node::Text(s) => writer.write(XmlWriteEvent::Characters(&escape_text(s))),
    Node::Whitespace(s) => writer.write(XmlWriteEvent::Characters(s)),
    Node::CData(s) => writer.write(XmlWriteEvent::CData(s)),
    Node::Comment(s) => writer.write(XmlWriteEvent::Comment(s)),
    Node::ProcessingInstruction { name, data } => writer.write(XmlWriteEvent::ProcessingInstruction {
      name,
      data: data.as_deref(),
    }),
    Node::Doctype(syntax) => Ok(writer.inner_mut().write_all(syntax.as_bytes())?),
  }
}

/// Escape character data. Quotes are left alone so MSBuild conditions read
/// the same after a rewrite.
fn escape_text(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('"', "&quot;")
    .replace('\n', "&#xA;")
    .replace('\r', "&#xD;")
    .replace('\t', "&#x9;")
}
