//! Block-document model
//!
//!     The block editor saves content as an ordered sequence of typed blocks plus
//!     metadata. This module is a typed mirror of that save format. Its JSON
//!     encoding is the editor's own, so documents pass through unchanged:
//!
//!         {"time": 1700000000000, "version": "2.29.0", "blocks": [
//!             {"type": "header", "data": {"text": "Title", "level": 2}},
//!             {"type": "paragraph", "data": {"text": "Some <b>bold</b> text"}}
//!         ]}
//!
//!     Text fields hold inline-markup (see [`crate::common::inline`]), never raw
//!     markdown.
//!
//!     Reading is lenient (see [`lenient`]). A block whose type is unknown, or whose
//!     data cannot be shaped into the typed payload, is kept as
//!     [`BlockData::Unknown`] with its raw JSON, so nothing is dropped on the way
//!     through.

pub mod lenient;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Save-format version written when the caller does not supply one.
pub const EDITOR_VERSION: &str = "2.29.0";

fn default_version() -> String {
    EDITOR_VERSION.to_string()
}

/// The top-level editable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Save timestamp. Opaque to the converter; kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(default = "default_version", deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document {
            time: None,
            version: default_version(),
            blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Vec::new())
    }
}

/// One unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    /// Editor-assigned block id, preserved through JSON.
    pub id: Option<String>,
    pub data: BlockData,
}

impl Block {
    pub fn new(data: BlockData) -> Self {
        Block { id: None, data }
    }

    /// The block's `type` tag as written in the save format.
    pub fn kind(&self) -> &str {
        self.data.kind()
    }
}

impl From<BlockData> for Block {
    fn from(data: BlockData) -> Self {
        Block::new(data)
    }
}

/// Typed block payloads, discriminated by the save format's `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    Paragraph(ParagraphData),
    Header(HeaderData),
    List(ListData),
    Code(CodeData),
    Quote(QuoteData),
    Delimiter,
    Table(TableData),
    Checklist(ChecklistData),
    Image(ImageData),
    Embed(EmbedData),
    LinkTool(LinkToolData),
    Raw(RawData),
    Warning(WarningData),
    Unknown { kind: String, data: Value },
}

impl BlockData {
    pub fn kind(&self) -> &str {
        match self {
            BlockData::Paragraph(_) => "paragraph",
            BlockData::Header(_) => "header",
            BlockData::List(_) => "list",
            BlockData::Code(_) => "code",
            BlockData::Quote(_) => "quote",
            BlockData::Delimiter => "delimiter",
            BlockData::Table(_) => "table",
            BlockData::Checklist(_) => "checklist",
            BlockData::Image(_) => "image",
            BlockData::Embed(_) => "embed",
            BlockData::LinkTool(_) => "linkTool",
            BlockData::Raw(_) => "raw",
            BlockData::Warning(_) => "warning",
            BlockData::Unknown { kind, .. } => kind.as_str(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        BlockData::Paragraph(ParagraphData { text: text.into() })
    }

    pub fn header(text: impl Into<String>, level: i64) -> Self {
        BlockData::Header(HeaderData {
            text: text.into(),
            level,
        })
    }

    /// Shape a raw `type` + `data` pair into a typed payload.
    fn from_parts(kind: &str, data: Value) -> Self {
        // Missing data reads as an empty object so absent fields take defaults.
        let data = if data.is_null() {
            Value::Object(Default::default())
        } else {
            data
        };

        let typed = match kind {
            "paragraph" => shape(&data).map(BlockData::Paragraph),
            "header" => shape(&data).map(BlockData::Header),
            "list" => shape(&data).map(BlockData::List),
            "code" => shape(&data).map(BlockData::Code),
            "quote" => shape(&data).map(BlockData::Quote),
            "delimiter" => Some(BlockData::Delimiter),
            "table" => shape(&data).map(BlockData::Table),
            "checklist" => shape(&data).map(BlockData::Checklist),
            "image" => shape(&data).map(BlockData::Image),
            "embed" => shape(&data).map(BlockData::Embed),
            "linkTool" => shape(&data).map(BlockData::LinkTool),
            "raw" => shape(&data).map(BlockData::Raw),
            "warning" => shape(&data).map(BlockData::Warning),
            _ => None,
        };

        typed.unwrap_or_else(|| {
            log::debug!("keeping block of type '{kind}' as unknown");
            BlockData::Unknown {
                kind: kind.to_string(),
                data,
            }
        })
    }

    fn data_value(&self) -> Value {
        let value = match self {
            BlockData::Paragraph(d) => serde_json::to_value(d),
            BlockData::Header(d) => serde_json::to_value(d),
            BlockData::List(d) => serde_json::to_value(d),
            BlockData::Code(d) => serde_json::to_value(d),
            BlockData::Quote(d) => serde_json::to_value(d),
            BlockData::Delimiter => Ok(Value::Object(Default::default())),
            BlockData::Table(d) => serde_json::to_value(d),
            BlockData::Checklist(d) => serde_json::to_value(d),
            BlockData::Image(d) => serde_json::to_value(d),
            BlockData::Embed(d) => serde_json::to_value(d),
            BlockData::LinkTool(d) => serde_json::to_value(d),
            BlockData::Raw(d) => serde_json::to_value(d),
            BlockData::Warning(d) => serde_json::to_value(d),
            BlockData::Unknown { data, .. } => Ok(data.clone()),
        };
        value.unwrap_or_default()
    }
}

fn shape<T: DeserializeOwned>(data: &Value) -> Option<T> {
    serde_json::from_value(data.clone()).ok()
}

/// Wire shape of a block: `{"id"?, "type", "data"}`.
#[derive(Serialize, Deserialize)]
struct RawBlock {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Block {
            id: raw.id,
            data: BlockData::from_parts(&raw.kind, raw.data),
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        RawBlock {
            id: block.id,
            kind: block.data.kind().to_string(),
            data: block.data.data_value(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    /// Stored as given; rendering clamps it into 1..=6.
    #[serde(default = "default_level", deserialize_with = "lenient::level")]
    pub level: i64,
}

fn default_level() -> i64 {
    1
}

/// List rendering style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
    Checklist,
}

impl ListStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStyle::Ordered => "ordered",
            ListStyle::Unordered => "unordered",
            ListStyle::Checklist => "checklist",
        }
    }
}

impl Serialize for ListStyle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ListStyle {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient::string(deserializer)?;
        Ok(match raw.as_str() {
            "ordered" => ListStyle::Ordered,
            "checklist" => ListStyle::Checklist,
            _ => ListStyle::Unordered,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub style: ListStyle,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

/// A list entry. Nested entries are owned by value; depth is data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawListItem")]
pub struct ListItem {
    pub content: String,
    pub meta: ListItemMeta,
    pub items: Vec<ListItem>,
    /// Style override for this item's children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ListStyle>,
}

impl ListItem {
    pub fn new(content: impl Into<String>) -> Self {
        ListItem {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_items(mut self, items: Vec<ListItem>) -> Self {
        self.items = items;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItemMeta {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_truthy"
    )]
    pub checked: Option<bool>,
}

/// List items are bare strings in the 1.x save format and objects in 2.x.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawListItem {
    Text(String),
    Full {
        #[serde(default, deserialize_with = "lenient::string")]
        content: String,
        #[serde(default)]
        meta: Option<ListItemMeta>,
        #[serde(default)]
        items: Vec<ListItem>,
        #[serde(default)]
        style: Option<ListStyle>,
    },
    Other(Value),
}

impl From<RawListItem> for ListItem {
    fn from(raw: RawListItem) -> Self {
        match raw {
            RawListItem::Text(content) => ListItem::new(content),
            RawListItem::Full {
                content,
                meta,
                items,
                style,
            } => ListItem {
                content,
                meta: meta.unwrap_or_default(),
                items,
                style,
            },
            RawListItem::Other(value) => ListItem::new(lenient::value_to_string(&value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(rename = "withHeadings", default, deserialize_with = "lenient::truthy")]
    pub with_headings: bool,
    #[serde(default, deserialize_with = "lenient::rows")]
    pub content: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistData {
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        ChecklistItem {
            text: text.into(),
            checked,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    /// Uploader-style payloads keep the address under `file.url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<ImageFile>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub caption: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub alt: Option<String>,
}

impl ImageData {
    /// `file.url` wins over `url`, matching the uploader plugin.
    pub fn source_url(&self) -> &str {
        match &self.file {
            Some(file) if !file.url.is_empty() => &file.url,
            _ => &self.url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkToolData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LinkMeta>,
    /// Older payloads put these beside `link` instead of under `meta`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub description: Option<String>,
}

impl LinkToolData {
    pub fn title(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .or(self.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.description.as_deref())
            .or(self.description.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMeta {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningData {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
}
