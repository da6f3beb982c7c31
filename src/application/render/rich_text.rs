//! Inline formatting composition for rich text spans.

use crate::domain::blocks::{Annotations, RichTextSpan};

use super::node::{Element, Node};

const INLINE_CODE_CLASS: &str = "bg-gray-100 px-1 rounded text-sm";
const LINK_CLASS: &str = "text-blue-600 hover:underline";

/// One annotation wrapper. Layers are applied in table order, each enclosing
/// the result of the previous one.
struct AnnotationLayer {
    is_set: fn(&Annotations) -> bool,
    tag: &'static str,
    key_prefix: &'static str,
    class: Option<&'static str>,
}

impl AnnotationLayer {
    fn wrap(&self, inner: Node, index: usize) -> Node {
        let element = Element::new(self.tag).key(format!("{}{index}", self.key_prefix));
        let element = match self.class {
            Some(class) => element.class(class),
            None => element,
        };
        element.child(inner).into()
    }
}

fn is_bold(annotations: &Annotations) -> bool {
    annotations.bold
}

fn is_italic(annotations: &Annotations) -> bool {
    annotations.italic
}

fn is_strikethrough(annotations: &Annotations) -> bool {
    annotations.strikethrough
}

fn is_underline(annotations: &Annotations) -> bool {
    annotations.underline
}

fn is_code(annotations: &Annotations) -> bool {
    annotations.code
}

/// Fixed annotation order: bold, italic, strikethrough, underline, code.
const ANNOTATION_LAYERS: [AnnotationLayer; 5] = [
    AnnotationLayer {
        is_set: is_bold,
        tag: "strong",
        key_prefix: "b",
        class: None,
    },
    AnnotationLayer {
        is_set: is_italic,
        tag: "em",
        key_prefix: "i",
        class: None,
    },
    AnnotationLayer {
        is_set: is_strikethrough,
        tag: "del",
        key_prefix: "s",
        class: None,
    },
    AnnotationLayer {
        is_set: is_underline,
        tag: "u",
        key_prefix: "u",
        class: None,
    },
    AnnotationLayer {
        is_set: is_code,
        tag: "code",
        key_prefix: "c",
        class: Some(INLINE_CODE_CLASS),
    },
];

/// Compose one span: fold the annotation layers over its text, then wrap
/// the result in a link when the span carries an `href`. A span with no
/// annotations and no link yields its bare text.
pub fn compose_span(span: &RichTextSpan, index: usize) -> Node {
    let annotated = ANNOTATION_LAYERS
        .iter()
        .filter(|layer| (layer.is_set)(&span.annotations))
        .fold(Node::text(span.plain_text.as_str()), |inner, layer| {
            layer.wrap(inner, index)
        });

    match span.href.as_deref() {
        Some(href) => Element::new("a")
            .key(format!("a{index}"))
            .attr("href", href)
            .class(LINK_CLASS)
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .child(annotated)
            .into(),
        None => annotated,
    }
}

/// Render a span sequence into `<span>` nodes keyed by position. An empty
/// sequence produces no nodes.
pub fn render_rich_text(spans: &[RichTextSpan]) -> Vec<Node> {
    spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            Element::new("span")
                .key(index.to_string())
                .child(compose_span(span, index))
                .into()
        })
        .collect()
}
