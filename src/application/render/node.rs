//! Presentation nodes: a small element tree the renderer emits and the
//! serializer turns into HTML.

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use serde::Serialize;

/// Elements that never carry children or a closing tag.
const VOID_TAGS: [&str; 2] = ["hr", "img"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text { text: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Visible text with all markup removed.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text { .. } => None,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text { text } => {
                encode_text_to_string(text, out);
            }
            Node::Element(element) => element.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: &'static str,
    /// Reconciliation key for list-based consumers; never serialized to HTML.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            key: None,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: &str) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            encode_double_quoted_attribute_to_string(value, out);
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_attributes_are_escaped() {
        let node: Node = Element::new("a")
            .attr("href", "https://e.com/?a=1&b=\"2\"")
            .child(Node::text("<b> & co"))
            .into();

        assert_eq!(
            node.to_html(),
            "<a href=\"https://e.com/?a=1&amp;b=&quot;2&quot;\">&lt;b&gt; &amp; co</a>"
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let hr: Node = Element::new("hr").class("my-8").into();
        assert_eq!(hr.to_html(), "<hr class=\"my-8\">");
    }

    #[test]
    fn keys_are_not_serialized() {
        let node: Node = Element::new("span").key("0").child(Node::text("x")).into();
        assert_eq!(node.to_html(), "<span>x</span>");
    }

    #[test]
    fn text_content_flattens_markup() {
        let node: Node = Element::new("p")
            .child(Element::new("strong").child(Node::text("a")))
            .child(Node::text("b"))
            .into();
        assert_eq!(node.text_content(), "ab");
    }
}
