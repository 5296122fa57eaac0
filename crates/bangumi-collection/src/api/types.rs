//! Bangumi API v0 request and response types.
//!
//! The response types mirror the JSON returned by
//! `GET /v0/users/{username}/collections`; they are flattened into
//! [`Subject`] before leaving the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shared::{CollectionType, PageResult, Subject, SubjectType};

/// Fixed page size of the collections endpoint
pub const PAGE_SIZE: u32 = 50;

/// Description of one page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub user_id: String,
    pub subject_type: SubjectType,
    pub collection_type: CollectionType,
    pub offset: u32,
    pub limit: u32,
}

impl PageQuery {
    /// Build a query, clamping `limit` into `[1, PAGE_SIZE]` and `offset` to `>= 0`
    pub fn new(
        user_id: impl Into<String>,
        subject_type: SubjectType,
        collection_type: CollectionType,
        limit: i64,
        offset: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            subject_type,
            collection_type,
            limit: limit.clamp(1, PAGE_SIZE as i64) as u32,
            offset: offset.clamp(0, u32::MAX as i64) as u32,
        }
    }

    /// Single-item request used to learn the total count
    pub fn probe(user_id: impl Into<String>, subject_type: SubjectType, collection_type: CollectionType) -> Self {
        Self::new(user_id, subject_type, collection_type, 1, 0)
    }

    /// Full page starting at `offset`
    pub fn page(&self, offset: u32) -> Self {
        Self {
            user_id: self.user_id.clone(),
            subject_type: self.subject_type,
            collection_type: self.collection_type,
            offset,
            limit: PAGE_SIZE,
        }
    }
}

/// Decode an explicit `null` as the type's default value
///
/// Combined with `#[serde(default)]` this treats missing and `null` fields alike.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paged collections response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<UserCollection>,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub offset: u32,
}

impl CollectionsResponse {
    pub fn into_page(self) -> PageResult {
        PageResult {
            data: self.data.into_iter().map(UserCollection::into_subject).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// One collection entry of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserCollection {
    pub updated_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: SlimSubject,
    #[serde(deserialize_with = "null_as_default")]
    pub subject_id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub vol_status: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub ep_status: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub subject_type: u8,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub collection_type: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub rate: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub private: bool,
}

impl UserCollection {
    /// Flatten into the normalized subject record
    pub fn into_subject(self) -> Subject {
        Subject {
            id: self.subject.id,
            name: self.subject.name,
            name_cn: self.subject.name_cn,
            rate: self.rate,
            vol_status: self.vol_status,
            ep_status: self.ep_status,
            tags: self.tags,
            private: self.private,
        }
    }
}

/// Subject summary embedded in a collection entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlimSubject {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub subject_type: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name_cn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_summary: String,
    pub date: Option<String>,
    pub images: Option<SubjectImages>,
    #[serde(deserialize_with = "null_as_default")]
    pub volumes: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub eps: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub collection_total: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub rank: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<SubjectTag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectImages {
    #[serde(deserialize_with = "null_as_default")]
    pub large: String,
    #[serde(deserialize_with = "null_as_default")]
    pub common: String,
    #[serde(deserialize_with = "null_as_default")]
    pub medium: String,
    #[serde(deserialize_with = "null_as_default")]
    pub small: String,
    #[serde(deserialize_with = "null_as_default")]
    pub grid: String,
}

/// Community tag attached to a subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectTag {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_cont: u32,
}
