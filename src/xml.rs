//! In-memory element tree of a whole document
//!
//! SpreadsheetML is small enough to be parsed at once; the loader and the
//! worksheet enumerator both walk the same tree.

use quick_xml::{
    events::{BytesStart, Event},
    Reader as XmlReader,
};

use crate::errors::Error;
use crate::utils::unescape_entity_to_buffer;

/// `ss` namespace, mandatory on the root `Workbook` element
pub const NS_SPREADSHEET: &str = "urn:schemas-microsoft-com:office:spreadsheet";
/// `o` namespace (document properties)
pub const NS_OFFICE: &str = "urn:schemas-microsoft-com:office:office";
/// `x` namespace (worksheet options)
pub const NS_EXCEL: &str = "urn:schemas-microsoft-com:office:excel";
/// `c` namespace
pub const NS_COMPONENT: &str = "urn:schemas-microsoft-com:office:component:spreadsheet";
/// `s` namespace
pub const NS_SCHEMA: &str = "uuid:BDC6E3F0-6DA3-11d1-A2A3-00AA00C14882";
/// `dt` namespace (custom property types)
pub const NS_DATA_TYPE: &str = "uuid:C2F41010-65B3-11d1-A29F-00AA00C14882";
/// `rs` namespace
pub const NS_RECORDSET: &str = "urn:schemas-microsoft-com:rowset";
/// `z` namespace
pub const NS_ROWSET: &str = "#RowsetSchema";

/// An attribute, split into its optional prefix and its local name
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attr {
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attr {
    fn is_namespace_decl(&self) -> bool {
        self.prefix.as_deref() == Some("xmlns") || (self.prefix.is_none() && self.name == "xmlns")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Element {
    /// local name, without prefix
    pub name: String,
    pub attributes: Vec<Attr>,
    pub children: Vec<Node>,
}

impl Element {
    /// Value of the attribute with this local name, whatever its prefix
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| !a.is_namespace_decl() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Namespaces declared on this element
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|a| a.is_namespace_decl())
            .map(|a| a.value.as_str())
    }

    /// Non namespace attributes
    pub fn plain_attrs(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter().filter(|a| !a.is_namespace_decl())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text of all descendants, markup stripped
    pub fn text(&self) -> String {
        let mut s = String::new();
        self.push_text(&mut s);
        s
    }

    fn push_text(&self, s: &mut String) {
        for c in &self.children {
            match c {
                Node::Text(t) => s.push_str(t),
                Node::Element(e) => e.push_text(s),
            }
        }
    }

    fn push_child(&mut self, node: Node) {
        if let Node::Text(t) = &node {
            if let Some(Node::Text(prev)) = self.children.last_mut() {
                prev.push_str(t);
                return;
            }
        }
        self.children.push(node);
    }
}

/// Parses a whole, already decoded, document
pub(crate) fn parse(text: &str) -> Result<Element, Error> {
    let mut xml = XmlReader::from_str(text);
    let config = xml.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(start_element(&xml, e)?),
            Event::End(_) => {
                let element = stack.pop().ok_or(Error::XmlEof("Workbook"))?;
                match stack.last_mut() {
                    Some(parent) => parent.push_child(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    let t = xml.decoder().decode(t)?;
                    current.push_child(Node::Text(t.into_owned()));
                }
            }
            Event::CData(ref t) => {
                if let Some(current) = stack.last_mut() {
                    let t = xml.decoder().decode(t)?;
                    current.push_child(Node::Text(t.into_owned()));
                }
            }
            Event::GeneralRef(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let mut s = String::new();
                    unescape_entity_to_buffer(e, &mut s)?;
                    current.push_child(Node::Text(s));
                }
            }
            Event::DocType(ref d) => {
                let d = xml.decoder().decode(d)?;
                if d.contains("<!ENTITY") {
                    return Err(Error::InvalidFormat(
                        "entity declarations are not allowed".to_string(),
                    ));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }
    if let Some(open) = stack.first() {
        return Err(Error::InvalidFormat(format!(
            "unexpected end of document inside '{}'",
            open.name
        )));
    }
    root.ok_or_else(|| Error::InvalidFormat("empty document".to_string()))
}

/// Checks the root is a `Workbook` declaring the spreadsheet namespace
pub(crate) fn check_workbook(root: &Element) -> Result<(), Error> {
    if root.name != "Workbook" {
        return Err(Error::InvalidFormat(format!(
            "root element is '{}', expecting 'Workbook'",
            root.name
        )));
    }
    if !root.namespaces().any(|ns| ns == NS_SPREADSHEET) {
        return Err(Error::InvalidFormat(
            "spreadsheet namespace not declared".to_string(),
        ));
    }
    Ok(())
}

fn start_element(xml: &XmlReader<&[u8]>, e: &BytesStart<'_>) -> Result<Element, Error> {
    let name = xml.decoder().decode(e.local_name().as_ref())?.into_owned();
    let mut attributes = Vec::new();
    for a in e.attributes() {
        let a = a?;
        let key = xml.decoder().decode(a.key.as_ref())?;
        let (prefix, local) = match key.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, key.into_owned()),
        };
        let value = a.decode_and_unescape_value(xml.decoder())?.into_owned();
        attributes.push(Attr {
            prefix,
            name: local,
            value,
        });
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}
