use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub filename: String,
}

/// A stored journal entry as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learning {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "deserialize_attachments", skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, deserialize_with = "deserialize_custom_properties", skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<String>,
}

/// Client-supplied content for create and update. Any `id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "deserialize_attachments")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, deserialize_with = "deserialize_custom_properties")]
    pub custom_properties: Option<String>,
}

impl LearningDraft {
    pub fn into_learning(self, id: i64) -> Learning {
        Learning {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
            tags: self.tags,
            attachments: self.attachments,
            custom_properties: self.custom_properties,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LearningRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Option<String>,
    pub attachments: Option<Json<Vec<Attachment>>>,
    pub custom_properties: Option<String>,
}

impl From<LearningRow> for Learning {
    fn from(row: LearningRow) -> Self {
        Learning {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            date: row.date,
            tags: row.tags,
            attachments: row.attachments.map(|Json(list)| list),
            custom_properties: row.custom_properties,
        }
    }
}

/// `"YYYY-MM-DD"`; `null` and `""` are both absent.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttachmentsWire {
    List(Vec<Attachment>),
    Encoded(String),
}

/// Accepts an array or a string holding a JSON-encoded array.
fn deserialize_attachments<'de, D>(deserializer: D) -> Result<Option<Vec<Attachment>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<AttachmentsWire>::deserialize(deserializer)? {
        None => Ok(None),
        Some(AttachmentsWire::List(list)) => Ok(Some(list)),
        Some(AttachmentsWire::Encoded(s)) if s.trim().is_empty() => Ok(None),
        Some(AttachmentsWire::Encoded(s)) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid attachments: {}", e))),
    }
}

/// Opaque string; a JSON object or array is kept as its serialized text.
fn deserialize_custom_properties<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
