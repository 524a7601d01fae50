use chrono::Utc;

/// Observed ids further ahead of the clock than this are not timestamps from
/// this generator and cannot collide with what it produces.
const MAX_AHEAD_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Timestamp-based ids for new experience/education entries.
/// Ids are strictly increasing, so never repeat within a session even when two
/// entries are added in the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct EntryIdGenerator {
    last: i64,
}

impl EntryIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure future ids stay above any timestamp-like id already in use.
    pub fn observe<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) {
        let horizon = Utc::now().timestamp_millis().saturating_add(MAX_AHEAD_MS);
        for id in existing {
            if let Ok(n) = id.parse::<i64>() {
                if n <= horizon {
                    self.last = self.last.max(n);
                }
            }
        }
    }

    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last {
            now
        } else {
            self.last.saturating_add(1)
        };
        self.last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_in_a_tight_loop() {
        let mut ids = EntryIdGenerator::new();
        let generated: Vec<String> = (0..1000).map(|_| ids.next_id()).collect();
        let unique: HashSet<&String> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
    }

    #[test]
    fn test_ids_stay_above_observed() {
        let mut ids = EntryIdGenerator::new();
        let far_future = (Utc::now().timestamp_millis() + 1_000_000).to_string();
        ids.observe([far_future.as_str(), "not-a-number"]);
        let next: i64 = ids.next_id().parse().unwrap();
        assert!(next > far_future.parse::<i64>().unwrap());
    }

    #[test]
    fn test_ids_near_i64_max_are_ignored() {
        let mut ids = EntryIdGenerator::new();
        ids.observe([i64::MAX.to_string().as_str(), "9223372036854775806"]);
        let first: i64 = ids.next_id().parse().unwrap();
        let second: i64 = ids.next_id().parse().unwrap();
        assert!(first < i64::MAX);
        assert!(second > first);
    }
}
