//! Data models for the project.
//!
//! This module defines the domain types shared by the library and the CLI:
//! subject and collection enumerations (with their stable wire codes) and
//! the normalized subject record produced from collection pages.

use serde::{Deserialize, Serialize};

/// Subject type of a collection entry
///
/// The integer codes are part of the remote API contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Book,
    Anime,
    Game,
    Music,
    Real,
}

impl SubjectType {
    /// Wire code sent as the `subject_type` query parameter
    pub fn code(self) -> u8 {
        match self {
            SubjectType::Book => 1,
            SubjectType::Anime => 2,
            SubjectType::Game => 3,
            SubjectType::Music => 4,
            SubjectType::Real => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SubjectType::Book),
            2 => Some(SubjectType::Anime),
            3 => Some(SubjectType::Game),
            4 => Some(SubjectType::Music),
            6 => Some(SubjectType::Real),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Book => "book",
            SubjectType::Anime => "anime",
            SubjectType::Game => "game",
            SubjectType::Music => "music",
            SubjectType::Real => "real",
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubjectType {
    type Err = anyhow::Error;

    /// Accepts either the name (`anime`) or the wire code (`2`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| anyhow::anyhow!("Invalid subject type code: {}", code));
        }
        match s.as_str() {
            "book" => Ok(SubjectType::Book),
            "anime" => Ok(SubjectType::Anime),
            "game" => Ok(SubjectType::Game),
            "music" => Ok(SubjectType::Music),
            "real" => Ok(SubjectType::Real),
            _ => Err(anyhow::anyhow!("Invalid subject type: {}", s)),
        }
    }
}

/// The user's relationship to a subject
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Wish,
    Done,
    Doing,
    OnHold,
    Dropped,
}

impl CollectionType {
    /// Every collection type, in wire-code order
    pub const ALL: [CollectionType; 5] = [
        CollectionType::Wish,
        CollectionType::Done,
        CollectionType::Doing,
        CollectionType::OnHold,
        CollectionType::Dropped,
    ];

    /// Wire code sent as the `type` query parameter
    pub fn code(self) -> u8 {
        match self {
            CollectionType::Wish => 1,
            CollectionType::Done => 2,
            CollectionType::Doing => 3,
            CollectionType::OnHold => 4,
            CollectionType::Dropped => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Wish => "wish",
            CollectionType::Done => "done",
            CollectionType::Doing => "doing",
            CollectionType::OnHold => "on_hold",
            CollectionType::Dropped => "dropped",
        }
    }
}

impl std::fmt::Display for CollectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CollectionType {
    type Err = anyhow::Error;

    /// Accepts either the name (`on_hold`) or the wire code (`4`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| anyhow::anyhow!("Invalid collection type code: {}", code));
        }
        match s.as_str() {
            "wish" => Ok(CollectionType::Wish),
            "done" => Ok(CollectionType::Done),
            "doing" => Ok(CollectionType::Doing),
            "on_hold" | "onhold" => Ok(CollectionType::OnHold),
            "dropped" => Ok(CollectionType::Dropped),
            _ => Err(anyhow::anyhow!("Invalid collection type: {}", s)),
        }
    }
}

/// Normalized collection entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: u64,
    pub name: String,
    pub name_cn: String,

    // The user's own collection state
    pub rate: u8,          // 0 = unrated, otherwise 1-10
    pub vol_status: u32,
    pub ep_status: u32,
    pub tags: Vec<String>,
    pub private: bool,
}

impl Subject {
    /// Localized name when present, otherwise the original name
    pub fn display_name(&self) -> &str {
        if self.name_cn.is_empty() {
            &self.name
        } else {
            &self.name_cn
        }
    }
}

/// One page of a user's collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageResult {
    pub data: Vec<Subject>,
    pub total: u32,  // Server-reported count at query time
    pub limit: u32,
    pub offset: u32,
}
