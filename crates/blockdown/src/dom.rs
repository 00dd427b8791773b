//! Owned document tree consumed by the converter.
//!
//! The upstream document assembler hands us rendered HTML. We parse it once with
//! `tl` and copy it into a small owned tree so the converter can recurse over
//! plain Rust values without carrying parser lifetimes around. The tree is never
//! mutated during conversion.

use std::collections::BTreeMap;

use crate::error::{ConversionError, Result};

/// Element kinds the converter dispatches on.
///
/// Anything not listed lands in [`Tag::Other`] and is handled by the fallback
/// converter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Synthetic root holding the top-level nodes of a parsed document.
    Fragment,
    /// `<html>`, transparent.
    Html,
    /// `<head>`, dropped with its content.
    Head,
    /// `<body>`, transparent.
    Body,
    /// `<div>`; page containers carry the `page` class.
    Div,
    /// `<p>`, possibly continued on the next page.
    P,
    /// `<span>`; kept as HTML when it has an `id`.
    Span,
    /// `<table>`.
    Table,
    /// `<thead>`.
    Thead,
    /// `<tbody>`.
    Tbody,
    /// `<tfoot>`.
    Tfoot,
    /// `<tr>`.
    Tr,
    /// `<td>`.
    Td,
    /// `<th>`.
    Th,
    /// `<ul>`.
    Ul,
    /// `<ol>`.
    Ol,
    /// `<li>`.
    Li,
    /// `<a>`.
    A,
    /// `<br>`.
    Br,
    /// `<math>`; `display="block"` marks display math.
    Math,
    /// `<b>`.
    B,
    /// `<strong>`.
    Strong,
    /// `<i>`.
    I,
    /// `<em>`.
    Em,
    /// `<u>`, rendered as its text.
    U,
    /// `h1` through `h6`, holding the level.
    Heading(u8),
    /// `<pre>`.
    Pre,
    /// `<code>`.
    Code,
    /// `<kbd>`.
    Kbd,
    /// `<samp>`.
    Samp,
    /// `<sub>`.
    Sub,
    /// `<sup>`.
    Sup,
    /// `<img>`.
    Img,
    /// `<hr>`.
    Hr,
    /// `<blockquote>`.
    Blockquote,
    /// `<script>`, dropped.
    Script,
    /// `<style>`, dropped.
    Style,
    /// Any other element, keeping its lowercase name.
    Other(String),
}

impl Tag {
    /// Map a tag name (any case) to its kind.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "div" => Self::Div,
            "p" => Self::P,
            "span" => Self::Span,
            "table" => Self::Table,
            "thead" => Self::Thead,
            "tbody" => Self::Tbody,
            "tfoot" => Self::Tfoot,
            "tr" => Self::Tr,
            "td" => Self::Td,
            "th" => Self::Th,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "a" => Self::A,
            "br" => Self::Br,
            "math" => Self::Math,
            "b" => Self::B,
            "strong" => Self::Strong,
            "i" => Self::I,
            "em" => Self::Em,
            "u" => Self::U,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "pre" => Self::Pre,
            "code" => Self::Code,
            "kbd" => Self::Kbd,
            "samp" => Self::Samp,
            "sub" => Self::Sub,
            "sup" => Self::Sup,
            "img" => Self::Img,
            "hr" => Self::Hr,
            "blockquote" => Self::Blockquote,
            "script" => Self::Script,
            "style" => Self::Style,
            _ => Self::Other(lower),
        }
    }

    /// Lowercase HTML name of the tag. The fragment root has an empty name.
    pub fn name(&self) -> &str {
        match self {
            Self::Fragment => "",
            Self::Html => "html",
            Self::Head => "head",
            Self::Body => "body",
            Self::Div => "div",
            Self::P => "p",
            Self::Span => "span",
            Self::Table => "table",
            Self::Thead => "thead",
            Self::Tbody => "tbody",
            Self::Tfoot => "tfoot",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Th => "th",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::A => "a",
            Self::Br => "br",
            Self::Math => "math",
            Self::B => "b",
            Self::Strong => "strong",
            Self::I => "i",
            Self::Em => "em",
            Self::U => "u",
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(4) => "h4",
            Self::Heading(5) => "h5",
            Self::Heading(_) => "h6",
            Self::Pre => "pre",
            Self::Code => "code",
            Self::Kbd => "kbd",
            Self::Samp => "samp",
            Self::Sub => "sub",
            Self::Sup => "sup",
            Self::Img => "img",
            Self::Hr => "hr",
            Self::Blockquote => "blockquote",
            Self::Script => "script",
            Self::Style => "style",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Is this a list container (`ul`/`ol`)?
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::Ul | Self::Ol)
    }

    /// Block containers whose leading and trailing whitespace-only text is dropped.
    pub const fn trims_inner_whitespace(&self) -> bool {
        matches!(
            self,
            Self::P
                | Self::Div
                | Self::Blockquote
                | Self::Ul
                | Self::Ol
                | Self::Li
                | Self::Table
                | Self::Thead
                | Self::Tbody
                | Self::Tfoot
                | Self::Tr
                | Self::Td
                | Self::Th
                | Self::Heading(_)
                | Self::Html
                | Self::Body
                | Self::Fragment
        )
    }

    /// Block elements; whitespace-only text next to them is dropped.
    pub const fn is_block(&self) -> bool {
        self.trims_inner_whitespace() || matches!(self, Self::Pre | Self::Hr | Self::Head)
    }

    /// Void elements serialize without a closing tag.
    const fn is_void(&self) -> bool {
        matches!(self, Self::Br | Self::Hr | Self::Img)
    }
}

/// A child of a [`Node`]: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Nested element.
    Element(Node),
    /// Character data with entities already decoded.
    Text(String),
}

impl Child {
    /// The element, if this child is one.
    pub const fn as_element(&self) -> Option<&Node> {
        match self {
            Self::Element(node) => Some(node),
            Self::Text(_) => None,
        }
    }
}

/// An element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Element kind.
    pub tag: Tag,
    /// Attributes with lowercase keys.
    pub attributes: BTreeMap<String, String>,
    /// Ordered children.
    pub children: Vec<Child>,
}

impl Node {
    /// Create an element with no attributes or children.
    pub const fn element(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: append an element child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    /// Builder: append a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Attribute value by (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whitespace-separated class names, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Does the element carry `class_name` among its classes?
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|class| class == class_name)
    }

    /// Iterate over element children only.
    pub fn element_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Child::as_element)
    }

    /// Concatenated raw text of every descendant text run.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(node) => node.collect_text(out),
            }
        }
    }

    /// Collect descendants matching `wanted`, in document order, without
    /// descending into elements for which `stop` returns true.
    ///
    /// A matching element is still descended into, so `<tr>` elements nested
    /// through wrappers are all found.
    pub fn descendants_where<'a>(
        &'a self,
        wanted: &dyn Fn(&Tag) -> bool,
        stop: &dyn Fn(&Tag) -> bool,
    ) -> Vec<&'a Self> {
        let mut found = Vec::new();
        self.collect_descendants(wanted, stop, &mut found);
        found
    }

    fn collect_descendants<'a>(
        &'a self,
        wanted: &dyn Fn(&Tag) -> bool,
        stop: &dyn Fn(&Tag) -> bool,
        found: &mut Vec<&'a Self>,
    ) {
        for child in self.element_children() {
            if wanted(&child.tag) {
                found.push(child);
            }
            if !stop(&child.tag) {
                child.collect_descendants(wanted, stop, found);
            }
        }
    }

    /// Serialize the element back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        if self.tag == Tag::Fragment {
            self.write_children_html(out);
            return;
        }

        let name = self.tag.name();
        out.push('<');
        out.push_str(name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }

        if self.tag.is_void() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        self.write_children_html(out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn write_children_html(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(&html_escape::encode_text(text)),
                Child::Element(node) => node.write_html(out),
            }
        }
    }
}

/// Parse an HTML string into an owned tree rooted at a [`Tag::Fragment`] node.
///
/// Comments are dropped and entities in text and attribute values are decoded.
pub fn parse_document(html: &str) -> Result<Node> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|_| ConversionError::ParseError("Failed to parse HTML".to_string()))?;
    let parser = dom.parser();

    let mut root = Node::element(Tag::Fragment);
    for handle in dom.children() {
        if let Some(child) = build_child(*handle, parser) {
            root.children.push(child);
        }
    }
    Ok(root)
}

fn build_child(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Child> {
    match handle.get(parser)? {
        tl::Node::Raw(bytes) => {
            let raw = bytes.as_utf8_str();
            if raw.is_empty() {
                return None;
            }
            Some(Child::Text(
                html_escape::decode_html_entities(&raw).into_owned(),
            ))
        }
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str();
            let mut node = Node::element(Tag::from_name(&name));

            for (key, value) in tag.attributes().iter() {
                let value = value
                    .map(|v| html_escape::decode_html_entities(&v).into_owned())
                    .unwrap_or_default();
                node.attributes.insert(key.to_ascii_lowercase(), value);
            }

            for child_handle in tag.children().top().iter() {
                if let Some(child) = build_child(*child_handle, parser) {
                    node.children.push(child);
                }
            }
            Some(Child::Element(node))
        }
        tl::Node::Comment(_) => None,
    }
}
