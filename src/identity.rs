//! Anonymous display identities.
//!
//! A post stores only its numeric seed; the name and avatar are rebuilt from it on every
//! read. The name is a two-dimensional decomposition of the seed over the adjective and
//! noun vocabularies, so seeds congruent modulo `ADJECTIVES.len() * NOUNS.len()` share a name.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Gender;

/// Seeds are drawn from `[0, SEED_SPACE)`.
pub const SEED_SPACE: u32 = 1_000_000;

pub const AVATAR_SERVICE: &str = "https://avatar.iran.liara.run/public";

pub const ADJECTIVES: [&str; 40] = [
    "Cosmic", "Velvet", "Neon", "Shadow", "Mystic", "Electric", "Luna", "Phoenix",
    "Stellar", "Crimson", "Azure", "Golden", "Silver", "Midnight", "Dawn", "Ember",
    "Frost", "Thunder", "Whisper", "Echo", "Quantum", "Diamond", "Sapphire", "Ruby",
    "Onyx", "Pearl", "Jade", "Crystal", "Storm", "Blaze", "Spirit", "Dream",
    "Twilight", "Starlight", "Moonlight", "Nebula", "Galaxy", "Comet", "Aurora", "Zenith",
];

pub const NOUNS: [&str; 40] = [
    "Wanderer", "Dreamer", "Knight", "Sage", "Rebel", "Ninja", "Phantom", "Rogue",
    "Warrior", "Mage", "Hunter", "Seeker", "Guardian", "Voyager", "Nomad", "Explorer",
    "Artist", "Poet", "Dancer", "Singer", "Writer", "Thinker", "Visionary", "Legend",
    "Hero", "Champion", "Enigma", "Oracle", "Mystic", "Prophet", "Sentinel", "Keeper",
    "Rider", "Pilot", "Captain", "Admiral", "Ranger", "Scout", "Spy", "Agent",
];

/// Numeric seed behind an anonymous identity.
///
/// Any `u32` is accepted. Values read back from the backend arrive as signed integers and go
/// through [`Seed::from_wire`], which folds negatives into `[0, SEED_SPACE)` with a euclidean
/// remainder. In-range values pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Seed(u32);

impl Seed {
    pub const fn new(value: u32) -> Self {
        Seed(value)
    }

    pub fn from_wire(raw: i64) -> Self {
        if (0..=u32::MAX as i64).contains(&raw) {
            Seed(raw as u32)
        } else {
            Seed(raw.rem_euclid(SEED_SPACE as i64) as u32)
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn to_wire(self) -> i64 {
        self.0 as i64
    }
}

impl From<i64> for Seed {
    fn from(raw: i64) -> Self {
        Seed::from_wire(raw)
    }
}

impl From<Seed> for i64 {
    fn from(seed: Seed) -> Self {
        seed.to_wire()
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Splits a seed into `(seed mod a, floor(seed / a) mod n)`.
pub fn decompose(seed: Seed, a: usize, n: usize) -> (usize, usize) {
    let s = seed.0 as usize;
    (s % a, (s / a) % n)
}

/// Positions of the adjective and noun selected by a seed.
pub fn name_indices(seed: Seed) -> (usize, usize) {
    decompose(seed, ADJECTIVES.len(), NOUNS.len())
}

pub fn generate_seed() -> Seed {
    generate_seed_with(&mut rand::thread_rng())
}

pub fn generate_seed_with<R: Rng + ?Sized>(rng: &mut R) -> Seed {
    Seed(rng.gen_range(0..SEED_SPACE))
}

pub fn generate_name(seed: Seed) -> String {
    let (adj, noun) = name_indices(seed);
    format!("{} {}", ADJECTIVES[adj], NOUNS[noun])
}

/// `"female"` selects the girl bucket, every other category the boy bucket.
pub fn avatar_bucket(gender: &str) -> &'static str {
    if gender == "female" {
        "girl"
    } else {
        "boy"
    }
}

/// Builds the avatar URL. Nothing is fetched.
pub fn generate_avatar_url(gender: &str, seed: Seed) -> String {
    format!("{AVATAR_SERVICE}/{}?username={seed}", avatar_bucket(gender))
}

/// Name plus the seed that is persisted with the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousIdentity {
    pub name: String,
    pub avatar_seed: Seed,
}

impl AnonymousIdentity {
    pub fn from_seed(seed: Seed) -> Self {
        Self { name: generate_name(seed), avatar_seed: seed }
    }

    pub fn avatar_url(&self, gender: Gender) -> String {
        generate_avatar_url(gender.as_str(), self.avatar_seed)
    }
}

/// Mints the identity for one anonymous post. The gender only matters for the avatar, which
/// callers derive from the seed when rendering.
pub fn generate_identity(_gender: Gender) -> AnonymousIdentity {
    AnonymousIdentity::from_seed(generate_seed())
}
