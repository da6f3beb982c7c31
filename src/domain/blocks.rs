//! Content blocks as delivered by the Notion blocks API.
//!
//! The set of block kinds is owned by Notion and grows over time. Known kinds
//! decode into typed payloads; everything else, including known kinds whose
//! payload no longer matches the expected shape, collapses into
//! [`BlockKind::Unsupported`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::DomainError;

/// One unit of authored document structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBlock")]
pub struct ContentBlock {
    /// Notion block id, reused as the presentation key.
    pub id: String,
    pub kind: BlockKind,
}

impl ContentBlock {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph(TextPayload),
    Heading1(TextPayload),
    Heading2(TextPayload),
    Heading3(TextPayload),
    BulletedListItem(TextPayload),
    NumberedListItem(TextPayload),
    Quote(TextPayload),
    Code(CodePayload),
    Divider,
    Image(ImagePayload),
    /// Any block type this renderer does not know how to present.
    Unsupported { kind: String },
}

impl BlockKind {
    /// The Notion `type` tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::Heading3(_) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::Quote(_) => "quote",
            BlockKind::Code(_) => "code",
            BlockKind::Divider => "divider",
            BlockKind::Image(_) => "image",
            BlockKind::Unsupported { kind } => kind.as_str(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, BlockKind::Unsupported { .. })
    }
}

/// Payload shared by every text-bearing block kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rich_text: Vec<RichTextSpan>,
}

impl TextPayload {
    pub fn new(rich_text: Vec<RichTextSpan>) -> Self {
        Self { rich_text }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CodePayload {
    /// Literal source text; span formatting is ignored.
    pub fn source(&self) -> String {
        self.rich_text
            .iter()
            .map(|span| span.plain_text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: Vec<RichTextSpan>,
    #[serde(flatten)]
    pub source: FileSource,
}

impl ImagePayload {
    /// Caption text taken from the first caption span. Empty when absent.
    pub fn caption_text(&self) -> &str {
        self.caption
            .first()
            .map(|span| span.plain_text.as_str())
            .unwrap_or_default()
    }
}

/// Location of a file attached to a block or page property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    /// A file hosted outside Notion.
    External { external: ExternalFile },
    /// A Notion-hosted file behind a signed, expiring URL.
    File { file: HostedFile },
}

impl FileSource {
    pub fn external(url: impl Into<String>) -> Self {
        Self::External {
            external: ExternalFile { url: url.into() },
        }
    }

    pub fn hosted(url: impl Into<String>) -> Self {
        Self::File {
            file: HostedFile {
                url: url.into(),
                expiry_time: None,
            },
        }
    }

    /// Resolve either shape to the URL a browser should load.
    pub fn url(&self) -> &str {
        match self {
            FileSource::External { external } => external.url.as_str(),
            FileSource::File { file } => file.url.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

/// One run of text sharing a single set of annotations and an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    pub plain_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichTextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Inline formatting flags. Notion also sends a `color`, which is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

impl Annotations {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Notion sends `null` for some absent values; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl From<RawBlock> for ContentBlock {
    fn from(raw: RawBlock) -> Self {
        let RawBlock {
            id,
            kind,
            mut fields,
        } = raw;
        let payload = fields.remove(&kind);
        let kind = decode_kind(&id, kind, payload);
        ContentBlock { id, kind }
    }
}

fn decode_kind(id: &str, kind: String, payload: Option<Value>) -> BlockKind {
    let decoded = match kind.as_str() {
        "paragraph" => Some(text_payload(payload).map(BlockKind::Paragraph)),
        "heading_1" => Some(text_payload(payload).map(BlockKind::Heading1)),
        "heading_2" => Some(text_payload(payload).map(BlockKind::Heading2)),
        "heading_3" => Some(text_payload(payload).map(BlockKind::Heading3)),
        "bulleted_list_item" => Some(text_payload(payload).map(BlockKind::BulletedListItem)),
        "numbered_list_item" => Some(text_payload(payload).map(BlockKind::NumberedListItem)),
        "quote" => Some(text_payload(payload).map(BlockKind::Quote)),
        "code" => Some(payload_as::<CodePayload>(payload).map(BlockKind::Code)),
        "divider" => Some(Ok(BlockKind::Divider)),
        "image" => Some(payload_as::<ImagePayload>(payload).map(BlockKind::Image)),
        _ => None,
    };

    match decoded {
        Some(Ok(block_kind)) => block_kind,
        Some(Err(err)) => {
            warn!(
                target = "domain::blocks",
                block_id = id,
                kind = kind.as_str(),
                error = %err,
                "block payload did not match its kind; treating as unsupported"
            );
            BlockKind::Unsupported { kind }
        }
        None => {
            debug!(
                target = "domain::blocks",
                block_id = id,
                kind = kind.as_str(),
                "unsupported block kind"
            );
            BlockKind::Unsupported { kind }
        }
    }
}

fn text_payload(payload: Option<Value>) -> Result<TextPayload, DomainError> {
    payload_as(payload)
}

fn payload_as<T>(payload: Option<Value>) -> Result<T, DomainError>
where
    T: for<'de> Deserialize<'de>,
{
    let value = payload.ok_or_else(|| DomainError::decode("payload object missing"))?;
    serde_json::from_value(value).map_err(|err| DomainError::decode(err.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlockDocument {
    List { results: Vec<ContentBlock> },
    Blocks(Vec<ContentBlock>),
}

/// Parse a block dump: either a bare JSON array of block objects or a Notion
/// `list` response carrying them under `results`.
pub fn parse_blocks(json: &str) -> Result<Vec<ContentBlock>, DomainError> {
    let document: BlockDocument =
        serde_json::from_str(json).map_err(|err| DomainError::decode(err.to_string()))?;
    Ok(match document {
        BlockDocument::List { results } => results,
        BlockDocument::Blocks(blocks) => blocks,
    })
}
