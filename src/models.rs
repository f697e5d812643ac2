use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identity::{generate_avatar_url, generate_name, AnonymousIdentity, Seed};

// Backend ids are opaque strings (document ids)
pub type Id = String;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Coin flip between male and female.
pub fn random_gender() -> Gender {
    if rand::thread_rng().gen_bool(0.5) { Gender::Male } else { Gender::Female }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    General,
    Love,
    Career,
    Family,
    Friendship,
    Secret,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Love,
        Category::Career,
        Category::Family,
        Category::Friendship,
        Category::Secret,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Love => "Love",
            Category::Career => "Career",
            Category::Family => "Family",
            Category::Friendship => "Friendship",
            Category::Secret => "Secret",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Love => "💕",
            Category::Career => "💼",
            Category::Family => "👨‍👩‍👧",
            Category::Friendship => "🤝",
            Category::Secret => "🤫",
            Category::General => "💭",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Feed filter; `All` maps to the backend's `"all"` sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub gender: String,
    pub anonymous_name: String,
    pub avatar_seed: Seed,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    pub id: Id,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    pub likes: i64,
    pub gender: String,
    pub anonymous_name: String,
    pub avatar_seed: Seed,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    // null from the backend when a confession has no comments yet
    #[serde(default, deserialize_with = "de_null_vec")]
    pub comments: Vec<Comment>,
}

/// What a view shows for a post's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub name: String,
    pub avatar_url: String,
}

impl DisplayIdentity {
    /// The stored name wins; the derived one fills in when the backend sent an empty string.
    fn resolve(stored_name: &str, gender: &str, seed: Seed) -> Self {
        let name = if stored_name.trim().is_empty() { generate_name(seed) } else { stored_name.to_string() };
        Self { name, avatar_url: generate_avatar_url(gender, seed) }
    }
}

impl Confession {
    pub fn identity(&self) -> DisplayIdentity {
        DisplayIdentity::resolve(&self.anonymous_name, &self.gender, self.avatar_seed)
    }

    pub fn category(&self) -> Option<Category> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    pub fn comments_count(&self) -> usize {
        self.comments.len()
    }
}

impl Comment {
    pub fn identity(&self) -> DisplayIdentity {
        DisplayIdentity::resolve(&self.anonymous_name, &self.gender, self.avatar_seed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarlyAccess {
    pub id: Id,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConfession {
    pub content: String,
    pub category: Category,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub content: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEarlyAccess {
    pub email: String,
    pub name: String,
}

/// Author fields attached to every anonymous post.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorFields {
    pub gender: Gender,
    pub anonymous_name: String,
    pub avatar_seed: Seed,
}

impl AuthorFields {
    pub fn new(gender: Gender, identity: AnonymousIdentity) -> Self {
        Self { gender, anonymous_name: identity.name, avatar_seed: identity.avatar_seed }
    }
}

fn de_null_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps (taken as UTC).
fn de_timestamp<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}
