use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of title a player is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Movie,
    Episode,
}

/// Raw reference to a title, as reported by a player adapter.
///
/// Two references describe the same title when [`ItemRef::matches`] says so,
/// which is looser than `==`: a reference carrying an external id and one
/// carrying only a title can still be the same episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,

    /// Title as shown by the player (series title for episodes)
    pub title: String,

    /// Season number (episodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,

    /// Episode number (episodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,

    /// External identifiers keyed by provider ("anilist", "imdb", ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ids: BTreeMap<String, String>,
}

impl ItemRef {
    pub fn movie(title: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Movie,
            title: title.into(),
            season: None,
            number: None,
            ids: BTreeMap::new(),
        }
    }

    pub fn episode(title: impl Into<String>, season: Option<u32>, number: u32) -> Self {
        Self {
            kind: ItemKind::Episode,
            title: title.into(),
            season,
            number: Some(number),
            ids: BTreeMap::new(),
        }
    }

    /// Attach an external identifier
    pub fn with_id(mut self, provider: impl Into<String>, id: impl Into<String>) -> Self {
        self.ids.insert(provider.into(), id.into());
        self
    }

    /// Identity comparison.
    ///
    /// Shared external ids decide when present: any conflicting id means a
    /// different title, any agreeing id means the same one. Without shared
    /// ids, falls back to normalized title plus season/episode numbers.
    pub fn matches(&self, other: &ItemRef) -> bool {
        if self.kind != other.kind {
            return false;
        }

        let mut shared = false;
        for (provider, id) in &self.ids {
            if let Some(other_id) = other.ids.get(provider) {
                if other_id != id {
                    return false;
                }
                shared = true;
            }
        }

        if shared {
            return true;
        }

        normalize_title(&self.title) == normalize_title(&other.title)
            && self.season == other.season
            && self.number == other.number
    }
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.season, self.number) {
            (ItemKind::Episode, Some(season), Some(number)) => {
                write!(f, "{} S{:02}E{:02}", self.title, season, number)
            }
            (ItemKind::Episode, None, Some(number)) => write!(f, "{} #{}", self.title, number),
            _ => write!(f, "{}", self.title),
        }
    }
}

/// Resolved metadata for a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// The reference this metadata was resolved from
    pub reference: ItemRef,

    /// Display title from the metadata source (optional)
    #[serde(default)]
    pub title: Option<String>,

    /// Runtime in milliseconds (optional until resolved)
    #[serde(default)]
    pub duration: Option<u64>,

    /// Last successful metadata fetch
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(reference: ItemRef, duration: Option<u64>) -> Self {
        Self {
            reference,
            title: None,
            duration,
            fetched_at: None,
        }
    }

    /// Runtime usable for progress math (a zero runtime counts as unknown)
    pub fn known_duration(&self) -> Option<u64> {
        self.duration.filter(|d| *d > 0)
    }

    pub fn matches(&self, reference: &ItemRef) -> bool {
        self.reference.matches(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_external_id_wins_over_title() {
        let a = ItemRef::episode("Steins;Gate", Some(1), 4).with_id("anilist", "9253");
        let b = ItemRef::episode("Steins Gate (TV)", Some(1), 4).with_id("anilist", "9253");
        assert!(a.matches(&b));
    }

    #[test]
    fn test_conflicting_external_id_never_matches() {
        let a = ItemRef::movie("Akira").with_id("imdb", "tt0094625");
        let b = ItemRef::movie("Akira").with_id("imdb", "tt0000001");
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_title_fallback_ignores_case_and_punctuation() {
        let a = ItemRef::episode("Cowboy Bebop", Some(1), 5);
        let b = ItemRef::episode("cowboy-bebop", Some(1), 5);
        let c = ItemRef::episode("Cowboy Bebop", Some(1), 6);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_kind_mismatch() {
        let a = ItemRef::movie("Perfect Blue");
        let b = ItemRef {
            kind: ItemKind::Episode,
            ..a.clone()
        };
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_zero_duration_is_unknown() {
        let item = Item::new(ItemRef::movie("Paprika"), Some(0));
        assert_eq!(item.known_duration(), None);
    }

    #[test]
    fn test_display() {
        let r = ItemRef::episode("Mushishi", Some(1), 3);
        assert_eq!(r.to_string(), "Mushishi S01E03");
    }
}
