// src/integrations/metadata/refresh.rs

use chrono::{DateTime, Duration, Utc};

use crate::domain::Item;

/// Decides when metadata for a session learned about from elsewhere is
/// worth fetching again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
}

impl RefreshPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Refresh when the duration is missing, the last fetch is unknown, or
    /// the last fetch is older than the interval
    pub fn needs_refresh(&self, item: &Item, now: DateTime<Utc>) -> bool {
        if item.known_duration().is_none() {
            return true;
        }
        match item.fetched_at {
            None => true,
            Some(fetched_at) => now - fetched_at > self.interval,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemRef;

    fn item(duration: Option<u64>, fetched_at: Option<DateTime<Utc>>) -> Item {
        Item {
            fetched_at,
            ..Item::new(ItemRef::movie("Porco Rosso"), duration)
        }
    }

    #[test]
    fn test_missing_duration_needs_refresh() {
        let now = Utc::now();
        assert!(RefreshPolicy::default().needs_refresh(&item(None, Some(now)), now));
    }

    #[test]
    fn test_unknown_fetch_time_needs_refresh() {
        let now = Utc::now();
        assert!(RefreshPolicy::default().needs_refresh(&item(Some(94_000), None), now));
    }

    #[test]
    fn test_fresh_metadata_is_kept() {
        let now = Utc::now();
        let fetched = now - Duration::days(6);
        assert!(!RefreshPolicy::default().needs_refresh(&item(Some(94_000), Some(fetched)), now));
    }

    #[test]
    fn test_stale_metadata_needs_refresh() {
        let now = Utc::now();
        let fetched = now - Duration::days(8);
        assert!(RefreshPolicy::default().needs_refresh(&item(Some(94_000), Some(fetched)), now));
    }
}
