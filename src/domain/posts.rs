//! Post metadata read from the properties of a Notion database row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::blocks::{FileSource, RichTextSpan};

pub const TITLE_PROPERTY: &str = "Title";
pub const SLUG_PROPERTY: &str = "Slug";
pub const SUMMARY_PROPERTY: &str = "Summary";
pub const DATE_PROPERTY: &str = "Date";
pub const TAGS_PROPERTY: &str = "Tags";
pub const PUBLISHED_PROPERTY: &str = "Published";
pub const COVER_PROPERTY: &str = "Cover";

/// A Notion page object as returned by a database query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl PageObject {
    fn property(&self, name: &str) -> Option<PropertyValue> {
        self.properties
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PropertyValue {
    Title {
        title: Vec<RichTextSpan>,
    },
    RichText {
        rich_text: Vec<RichTextSpan>,
    },
    Date {
        date: Option<DateRange>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Files {
        files: Vec<Value>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct DateRange {
    start: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

/// Listing metadata for one blog post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    /// ISO date as authored in Notion; empty when unset.
    pub date: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub cover: Option<String>,
}

impl Post {
    /// Extract post metadata. Missing properties, or properties of an
    /// unexpected type, fall back to empty values.
    pub fn from_page(page: &PageObject) -> Self {
        Self {
            id: page.id.clone(),
            title: title_text(page.property(TITLE_PROPERTY)),
            slug: rich_text(page.property(SLUG_PROPERTY)),
            summary: rich_text(page.property(SUMMARY_PROPERTY)),
            date: date_start(page.property(DATE_PROPERTY)),
            tags: multi_select(page.property(TAGS_PROPERTY)),
            published: checkbox(page.property(PUBLISHED_PROPERTY)),
            cover: file_url(page.property(COVER_PROPERTY)),
        }
    }
}

fn first_plain_text(spans: Vec<RichTextSpan>) -> String {
    spans
        .into_iter()
        .next()
        .map(|span| span.plain_text)
        .unwrap_or_default()
}

fn title_text(property: Option<PropertyValue>) -> String {
    match property {
        Some(PropertyValue::Title { title }) => first_plain_text(title),
        _ => String::new(),
    }
}

fn rich_text(property: Option<PropertyValue>) -> String {
    match property {
        Some(PropertyValue::RichText { rich_text }) => first_plain_text(rich_text),
        _ => String::new(),
    }
}

fn date_start(property: Option<PropertyValue>) -> String {
    match property {
        Some(PropertyValue::Date {
            date: Some(DateRange { start: Some(start) }),
        }) => start,
        _ => String::new(),
    }
}

fn multi_select(property: Option<PropertyValue>) -> Vec<String> {
    match property {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.into_iter().map(|option| option.name).collect()
        }
        _ => Vec::new(),
    }
}

fn checkbox(property: Option<PropertyValue>) -> bool {
    matches!(property, Some(PropertyValue::Checkbox { checkbox: true }))
}

fn file_url(property: Option<PropertyValue>) -> Option<String> {
    let Some(PropertyValue::Files { files }) = property else {
        return None;
    };
    let first = files.into_iter().next()?;
    serde_json::from_value::<FileSource>(first)
        .ok()
        .map(|source| source.url().to_string())
}
