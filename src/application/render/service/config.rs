use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;

/// Sanitizer for rendered post bodies. Link targets come straight from the
/// content source, so anything outside the allowed URL schemes is stripped.
pub(crate) fn build_body_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "blockquote",
        "code",
        "del",
        "div",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "hr",
        "img",
        "li",
        "p",
        "pre",
        "span",
        "strong",
        "u",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "lang", "title"]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("img", &["alt", "src"]);
    builder.link_rel(Some("noopener noreferrer"));

    builder
}
