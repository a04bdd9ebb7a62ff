//! JSON encoding of block sequences.
//!
//! Every variant has a hand-written field mapping. Values are written as
//! `{"_type": <tag>, ...fields}`; optional fields are omitted at their zero
//! value. Unknown tags decode into [`Block::Custom`] and get their `_type`
//! back when re-encoded.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::block::{
    Block, BlockContent, CodeContent, CustomContent, DECORATORS, EMBED_KINDS, EmbedContent,
    LinkData, ListItem, ListKind, MarkData, MarkDef, SpanContent, TYPE_BLOCK, TYPE_CODE, TYPE_LINK,
    TYPE_SPAN,
};
use crate::error::{CodecError, DecodeError, UnsupportedContentError};

const TYPE_FIELD: &str = "_type";
const KEY_FIELD: &str = "_key";

/// Tags whose layout is fixed and cannot be claimed by passthrough content.
const RESERVED_TAGS: &[&str] = &[TYPE_BLOCK, TYPE_SPAN, TYPE_CODE];

/// Encodes a block sequence as a JSON string.
pub fn encode(blocks: &[Block]) -> Result<String, CodecError> {
    check_all(blocks)?;
    Ok(serde_json::to_string(blocks)?)
}

/// Encodes a block sequence as a JSON array value.
pub fn encode_value(blocks: &[Block]) -> Result<Value, CodecError> {
    check_all(blocks)?;
    Ok(serde_json::to_value(blocks)?)
}

/// Decodes a JSON array of blocks. Fails as a whole if any element fails.
pub fn decode(input: &str) -> Result<Vec<Block>, CodecError> {
    let value: Value = serde_json::from_str(input)?;
    Ok(decode_value(value)?)
}

/// Decodes an already-parsed JSON array of blocks.
pub fn decode_value(value: Value) -> Result<Vec<Block>, DecodeError> {
    let Value::Array(items) = value else {
        return Err(DecodeError::expected("?", "body", "an array of blocks"));
    };
    items.into_iter().map(decode_block).collect()
}

/// Decodes a single block value, dispatching on its `_type`.
pub fn decode_block(value: Value) -> Result<Block, DecodeError> {
    let Value::Object(mut map) = value else {
        return Err(DecodeError::expected("?", TYPE_FIELD, "an object"));
    };
    let tag = match map.remove(TYPE_FIELD) {
        Some(Value::String(tag)) => tag,
        Some(_) => return Err(DecodeError::expected("?", TYPE_FIELD, "a string")),
        None => return Err(DecodeError::missing("?", TYPE_FIELD)),
    };

    let fields = Fields {
        tag: &tag,
        map: &map,
    };
    let block = match tag.as_str() {
        TYPE_BLOCK => Block::Text(decode_block_content(&fields)?),
        TYPE_SPAN => Block::Span(decode_span(&fields)?),
        TYPE_CODE => Block::Code(CodeContent {
            language: fields
                .opt_str("language")?
                .filter(|language| !language.is_empty())
                .map(str::to_string),
            code: fields.str("code")?.to_string(),
        }),
        kind if EMBED_KINDS.contains(&kind) => Block::Embed(EmbedContent {
            kind: tag.clone(),
            url: fields.str("url")?.to_string(),
        }),
        _ => Block::Custom(CustomContent { kind: tag, fields: map }),
    };
    Ok(block)
}

/// Checks that a block has a field mapping for the tag it claims.
///
/// Each tag decodes to exactly one variant, so a block is only encodable when
/// its variant is the one its tag decodes to: embeds must use a kind from
/// [`EMBED_KINDS`], and passthrough blocks must use any other non-empty tag.
pub fn check_encodable(block: &Block) -> Result<(), UnsupportedContentError> {
    let supported = match block {
        Block::Embed(EmbedContent { kind, .. }) => EMBED_KINDS.contains(&kind.as_str()),
        Block::Custom(CustomContent { kind, .. }) => {
            !kind.is_empty()
                && !RESERVED_TAGS.contains(&kind.as_str())
                && !EMBED_KINDS.contains(&kind.as_str())
        }
        _ => true,
    };
    if supported {
        Ok(())
    } else {
        Err(UnsupportedContentError {
            tag: block.type_name().to_string(),
        })
    }
}

fn check_all(blocks: &[Block]) -> Result<(), UnsupportedContentError> {
    blocks.iter().try_for_each(check_encodable)
}

fn decode_block_content(fields: &Fields<'_>) -> Result<BlockContent, DecodeError> {
    let style = fields.str("style")?.to_string();

    let children = fields
        .opt_array("children")?
        .iter()
        .map(|child| match child {
            Value::Object(map) if map.get(TYPE_FIELD).and_then(Value::as_str) == Some(TYPE_SPAN) => {
                decode_span(&Fields { tag: TYPE_SPAN, map })
            }
            _ => Err(DecodeError::expected(TYPE_BLOCK, "children", "a list of spans")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mark_defs = fields
        .opt_array("markDefs")?
        .iter()
        .map(decode_mark_def)
        .collect::<Result<Vec<_>, _>>()?;

    let dangling = children.iter().flat_map(|span| &span.marks).any(|mark| {
        !DECORATORS.contains(&mark.as_str()) && !mark_defs.iter().any(|def| def.key == *mark)
    });
    if dangling {
        return Err(DecodeError::expected(
            TYPE_BLOCK,
            "marks",
            "decorators or keys of the block's markDefs",
        ));
    }

    let list_item = match (fields.opt_str("listItem")?, fields.opt_u32("level")?) {
        (None, None) => None,
        (Some(kind), Some(level)) => {
            let kind = ListKind::from_name(kind).ok_or_else(|| {
                DecodeError::expected(TYPE_BLOCK, "listItem", "`bullet` or `number`")
            })?;
            if level == 0 {
                return Err(DecodeError::expected(TYPE_BLOCK, "level", "at least 1"));
            }
            Some(ListItem { kind, level })
        }
        (Some(_), None) => return Err(DecodeError::missing(TYPE_BLOCK, "level")),
        (None, Some(_)) => return Err(DecodeError::missing(TYPE_BLOCK, "listItem")),
    };

    Ok(BlockContent {
        style,
        children,
        mark_defs,
        list_item,
    })
}

fn decode_span(fields: &Fields<'_>) -> Result<SpanContent, DecodeError> {
    let text = fields.str("text")?.to_string();
    let marks = fields
        .opt_array("marks")?
        .iter()
        .map(|mark| {
            mark.as_str()
                .map(str::to_string)
                .ok_or_else(|| DecodeError::expected(TYPE_SPAN, "marks", "a list of strings"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpanContent { text, marks })
}

fn decode_mark_def(value: &Value) -> Result<MarkDef, DecodeError> {
    let Value::Object(map) = value else {
        return Err(DecodeError::expected(TYPE_BLOCK, "markDefs", "a list of objects"));
    };
    let kind = match map.get(TYPE_FIELD) {
        Some(Value::String(kind)) => kind.as_str(),
        Some(_) => return Err(DecodeError::expected("markDef", TYPE_FIELD, "a string")),
        None => return Err(DecodeError::missing("markDef", TYPE_FIELD)),
    };
    let fields = Fields { tag: kind, map };
    let key = fields.str(KEY_FIELD)?.to_string();

    let data = if kind == TYPE_LINK {
        MarkData::Link(LinkData {
            href: fields.str("href")?.to_string(),
        })
    } else {
        let mut rest = map.clone();
        rest.remove(TYPE_FIELD);
        rest.remove(KEY_FIELD);
        MarkData::Other {
            kind: kind.to_string(),
            fields: rest,
        }
    };
    Ok(MarkDef { key, data })
}

/// Typed field access over a JSON object, reporting failures against `tag`.
struct Fields<'a> {
    tag: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Present and not `null`.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    fn str(&self, field: &str) -> Result<&'a str, DecodeError> {
        self.opt_str(field)?
            .ok_or_else(|| DecodeError::missing(self.tag, field))
    }

    fn opt_str(&self, field: &str) -> Result<Option<&'a str>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(DecodeError::expected(self.tag, field, "a string")),
        }
    }

    fn opt_array(&self, field: &str) -> Result<&'a [Value], DecodeError> {
        match self.get(field) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(DecodeError::expected(self.tag, field, "an array")),
        }
    }

    fn opt_u32(&self, field: &str) -> Result<Option<u32>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| DecodeError::expected(self.tag, field, "a positive integer")),
        }
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        check_encodable(self).map_err(ser::Error::custom)?;

        match self {
            Block::Text(content) => content.serialize(serializer),
            Block::Span(span) => span.serialize(serializer),
            Block::Code(code) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(TYPE_FIELD, TYPE_CODE)?;
                if let Some(language) = code.language.as_deref().filter(|l| !l.is_empty()) {
                    map.serialize_entry("language", language)?;
                }
                map.serialize_entry("code", &code.code)?;
                map.end()
            }
            Block::Embed(embed) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE_FIELD, &embed.kind)?;
                map.serialize_entry("url", &embed.url)?;
                map.end()
            }
            Block::Custom(custom) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(TYPE_FIELD, &custom.kind)?;
                for (name, value) in custom.fields.iter().filter(|(name, _)| *name != TYPE_FIELD) {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for BlockContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_FIELD, TYPE_BLOCK)?;
        map.serialize_entry("style", &self.style)?;
        map.serialize_entry("children", &self.children)?;
        map.serialize_entry("markDefs", &self.mark_defs)?;
        if let Some(item) = &self.list_item {
            map.serialize_entry("listItem", item.kind.as_str())?;
            map.serialize_entry("level", &item.level)?;
        }
        map.end()
    }
}

impl Serialize for SpanContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_FIELD, TYPE_SPAN)?;
        map.serialize_entry("text", &self.text)?;
        if !self.marks.is_empty() {
            map.serialize_entry("marks", &self.marks)?;
        }
        map.end()
    }
}

impl Serialize for MarkDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_FIELD, self.type_name())?;
        map.serialize_entry(KEY_FIELD, &self.key)?;
        match &self.data {
            MarkData::Link(link) => map.serialize_entry("href", &link.href)?,
            MarkData::Other { fields, .. } => {
                for (name, value) in fields
                    .iter()
                    .filter(|(name, _)| *name != TYPE_FIELD && *name != KEY_FIELD)
                {
                    map.serialize_entry(name, value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_block(value).map_err(de::Error::custom)
    }
}
