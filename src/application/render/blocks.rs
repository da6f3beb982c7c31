//! Block dispatch: one presentation rule per known block kind.

use serde::Serialize;

use crate::domain::blocks::{BlockKind, CodePayload, ContentBlock, ImagePayload, TextPayload};

use super::node::{Element, Node};
use super::rich_text::render_rich_text;

const PARAGRAPH_CLASS: &str = "mb-4";
const HEADING_1_CLASS: &str = "text-3xl font-bold mt-8 mb-4";
const HEADING_2_CLASS: &str = "text-2xl font-bold mt-6 mb-3";
const HEADING_3_CLASS: &str = "text-xl font-bold mt-4 mb-2";
const BULLETED_ITEM_CLASS: &str = "ml-4 list-disc";
const NUMBERED_ITEM_CLASS: &str = "ml-4 list-decimal";
const QUOTE_CLASS: &str = "border-l-4 border-gray-300 pl-4 italic my-4";
const CODE_PRE_CLASS: &str = "bg-gray-100 p-4 rounded overflow-x-auto my-4";
const CODE_CLASS: &str = "text-sm";
const DIVIDER_CLASS: &str = "my-8 border-gray-200";
const FIGURE_CLASS: &str = "my-6";
const IMAGE_CLASS: &str = "rounded-lg w-full";
const FIGCAPTION_CLASS: &str = "text-center text-sm text-gray-500 mt-2";

/// A presentation node paired with the id of the block it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    pub key: String,
    pub node: Node,
}

/// Render blocks in order. Unsupported kinds are dropped; nothing else is
/// reordered or filtered.
pub fn render_blocks(blocks: &[ContentBlock]) -> Vec<RenderedBlock> {
    blocks.iter().filter_map(render_block).collect()
}

/// Render a single block, or `None` for kinds without a presentation rule.
pub fn render_block(block: &ContentBlock) -> Option<RenderedBlock> {
    let node = match &block.kind {
        BlockKind::Paragraph(text) => text_block("p", PARAGRAPH_CLASS, text),
        BlockKind::Heading1(text) => text_block("h1", HEADING_1_CLASS, text),
        BlockKind::Heading2(text) => text_block("h2", HEADING_2_CLASS, text),
        BlockKind::Heading3(text) => text_block("h3", HEADING_3_CLASS, text),
        // List items are emitted without an enclosing <ul>/<ol>; Notion returns
        // consecutive items as siblings with no group block.
        BlockKind::BulletedListItem(text) => text_block("li", BULLETED_ITEM_CLASS, text),
        BlockKind::NumberedListItem(text) => text_block("li", NUMBERED_ITEM_CLASS, text),
        BlockKind::Quote(text) => text_block("blockquote", QUOTE_CLASS, text),
        BlockKind::Code(code) => code_block(code),
        BlockKind::Divider => Element::new("hr").class(DIVIDER_CLASS),
        BlockKind::Image(image) => image_block(image),
        BlockKind::Unsupported { .. } => return None,
    };

    Some(RenderedBlock {
        key: block.id.clone(),
        node: node.key(block.id.as_str()).into(),
    })
}

fn text_block(tag: &'static str, class: &str, text: &TextPayload) -> Element {
    Element::new(tag)
        .class(class)
        .children(render_rich_text(&text.rich_text))
}

fn code_block(code: &CodePayload) -> Element {
    Element::new("pre")
        .class(CODE_PRE_CLASS)
        .child(Element::new("code").class(CODE_CLASS).child(Node::text(code.source())))
}

fn image_block(image: &ImagePayload) -> Element {
    let caption = image.caption_text();
    let figure = Element::new("figure").class(FIGURE_CLASS).child(
        Element::new("img")
            .attr("src", image.source.url())
            .attr("alt", caption)
            .class(IMAGE_CLASS),
    );

    if caption.is_empty() {
        figure
    } else {
        figure.child(
            Element::new("figcaption")
                .class(FIGCAPTION_CLASS)
                .child(Node::text(caption)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocks::{Annotations, FileSource, RichTextSpan};

    fn paragraph(id: &str, text: &str) -> ContentBlock {
        ContentBlock::new(
            id,
            BlockKind::Paragraph(TextPayload::new(vec![RichTextSpan::plain(text)])),
        )
    }

    fn unsupported(id: &str, kind: &str) -> ContentBlock {
        ContentBlock::new(
            id,
            BlockKind::Unsupported {
                kind: kind.to_string(),
            },
        )
    }

    fn html(block: &RenderedBlock) -> String {
        block.node.to_html()
    }

    #[test]
    fn empty_input_renders_empty_output() {
        assert_eq!(render_blocks(&[]), Vec::new());
    }

    #[test]
    fn unsupported_blocks_are_dropped_without_stopping() {
        let blocks = vec![
            paragraph("a", "first"),
            unsupported("t", "toggle"),
            paragraph("b", "second"),
            unsupported("c", "callout"),
        ];

        let rendered = render_blocks(&blocks);

        let keys: Vec<_> = rendered.iter().map(|block| block.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(rendered.len() <= blocks.len());
    }

    #[test]
    fn block_id_is_reused_as_node_key() {
        let rendered = render_blocks(&[paragraph("block-42", "x")]);

        let element = rendered[0].node.as_element().expect("element");
        assert_eq!(element.key.as_deref(), Some("block-42"));
        assert_eq!(rendered[0].key, "block-42");
    }

    #[test]
    fn headings_map_to_distinct_weights() {
        let text = TextPayload::new(vec![RichTextSpan::plain("T")]);
        let blocks = vec![
            ContentBlock::new("1", BlockKind::Heading1(text.clone())),
            ContentBlock::new("2", BlockKind::Heading2(text.clone())),
            ContentBlock::new("3", BlockKind::Heading3(text)),
        ];

        let rendered: Vec<_> = render_blocks(&blocks).iter().map(html).collect();

        assert_eq!(
            rendered,
            vec![
                "<h1 class=\"text-3xl font-bold mt-8 mb-4\"><span>T</span></h1>",
                "<h2 class=\"text-2xl font-bold mt-6 mb-3\"><span>T</span></h2>",
                "<h3 class=\"text-xl font-bold mt-4 mb-2\"><span>T</span></h3>",
            ]
        );
    }

    #[test]
    fn list_items_render_without_a_container() {
        let text = TextPayload::new(vec![RichTextSpan::plain("item")]);
        let blocks = vec![
            ContentBlock::new("1", BlockKind::BulletedListItem(text.clone())),
            ContentBlock::new("2", BlockKind::NumberedListItem(text)),
        ];

        let rendered: Vec<_> = render_blocks(&blocks).iter().map(html).collect();

        assert_eq!(
            rendered,
            vec![
                "<li class=\"ml-4 list-disc\"><span>item</span></li>",
                "<li class=\"ml-4 list-decimal\"><span>item</span></li>",
            ]
        );
    }

    #[test]
    fn empty_rich_text_yields_empty_container() {
        let rendered = render_blocks(&[ContentBlock::new(
            "q",
            BlockKind::Quote(TextPayload::default()),
        )]);

        assert_eq!(
            html(&rendered[0]),
            "<blockquote class=\"border-l-4 border-gray-300 pl-4 italic my-4\"></blockquote>"
        );
    }

    #[test]
    fn code_concatenates_literal_text() {
        let bold = Annotations {
            bold: true,
            ..Annotations::default()
        };
        let code = CodePayload {
            rich_text: vec![
                RichTextSpan::plain("let x = ").with_annotations(bold),
                RichTextSpan::plain("1 < 2;").with_href("https://ignored"),
            ],
            language: Some("rust".to_string()),
        };

        let rendered = render_blocks(&[ContentBlock::new("c", BlockKind::Code(code))]);

        assert_eq!(
            html(&rendered[0]),
            "<pre class=\"bg-gray-100 p-4 rounded overflow-x-auto my-4\"><code class=\"text-sm\">let x = 1 &lt; 2;</code></pre>"
        );
    }

    #[test]
    fn divider_is_content_free() {
        let rendered = render_blocks(&[ContentBlock::new("d", BlockKind::Divider)]);
        assert_eq!(html(&rendered[0]), "<hr class=\"my-8 border-gray-200\">");
    }

    #[test]
    fn external_image_with_caption() {
        let image = ImagePayload {
            caption: vec![RichTextSpan::plain("Cat"), RichTextSpan::plain("ignored")],
            source: FileSource::external("https://x/y.png"),
        };

        let rendered = render_blocks(&[ContentBlock::new("i", BlockKind::Image(image))]);

        assert_eq!(
            html(&rendered[0]),
            "<figure class=\"my-6\"><img src=\"https://x/y.png\" alt=\"Cat\" class=\"rounded-lg w-full\">\
             <figcaption class=\"text-center text-sm text-gray-500 mt-2\">Cat</figcaption></figure>"
        );
    }

    #[test]
    fn hosted_image_without_caption_omits_figcaption() {
        let image = ImagePayload {
            caption: Vec::new(),
            source: FileSource::hosted("https://s3/z.png"),
        };

        let rendered = render_blocks(&[ContentBlock::new("i", BlockKind::Image(image))]);

        let figure = rendered[0].node.as_element().expect("figure");
        assert_eq!(figure.children.len(), 1);
        let img = figure.children[0].as_element().expect("img");
        assert_eq!(img.attr_value("src"), Some("https://s3/z.png"));
        assert_eq!(img.attr_value("alt"), Some(""));
        assert!(!html(&rendered[0]).contains("figcaption"));
    }

    #[test]
    fn keyed_node_tree_serializes_for_list_consumers() {
        let bold = Annotations {
            bold: true,
            ..Annotations::default()
        };
        let block = ContentBlock::new(
            "p1",
            BlockKind::Paragraph(TextPayload::new(vec![
                RichTextSpan::plain("hi").with_annotations(bold),
            ])),
        );

        let rendered = render_blocks(&[block]);
        let json = serde_json::to_string_pretty(&rendered[0]).expect("serialize");

        insta::assert_snapshot!(json, @r#"
        {
          "key": "p1",
          "node": {
            "node": "element",
            "tag": "p",
            "key": "p1",
            "attrs": [
              [
                "class",
                "mb-4"
              ]
            ],
            "children": [
              {
                "node": "element",
                "tag": "span",
                "key": "0",
                "attrs": [],
                "children": [
                  {
                    "node": "element",
                    "tag": "strong",
                    "key": "b0",
                    "attrs": [],
                    "children": [
                      {
                        "node": "text",
                        "text": "hi"
                      }
                    ]
                  }
                ]
              }
            ]
          }
        }
        "#);
    }
}
