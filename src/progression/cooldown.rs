use crate::config::CooldownSettings;
use crate::errors::ProgressionError;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use schema::OwnerId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Timestamps of an owner's recent trainer battles, oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrainerCooldownRecord {
    pub owner: OwnerId,
    pub timestamps: VecDeque<DateTime<Utc>>,
}

impl TrainerCooldownRecord {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            timestamps: VecDeque::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownDecision {
    pub allowed: bool,
    /// Set only on denial: time until the oldest timestamp leaves the window.
    pub retry_after: Option<Duration>,
}

impl CooldownDecision {
    pub fn into_result(self) -> Result<(), ProgressionError> {
        match self.retry_after {
            Some(retry_after) if !self.allowed => Err(ProgressionError::CooldownActive { retry_after }),
            _ => Ok(()),
        }
    }
}

/// Sliding-window rate limit for repeatable actions.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    window: Duration,
    max_uses: usize,
}

impl CooldownTracker {
    pub fn new(settings: &CooldownSettings) -> Self {
        Self {
            window: settings.window(),
            max_uses: settings.max_uses,
        }
    }

    /// Drop every timestamp at or before `now - window`.
    pub fn prune(&self, record: &mut TrainerCooldownRecord, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        while record.timestamps.front().is_some_and(|t| *t <= cutoff) {
            record.timestamps.pop_front();
        }
    }

    /// Allow and record the action if fewer than `max_uses` remain in the
    /// window; otherwise report how long until the oldest one expires.
    pub fn try_consume(
        &self,
        record: &mut TrainerCooldownRecord,
        now: DateTime<Utc>,
    ) -> CooldownDecision {
        self.prune(record, now);

        if record.timestamps.len() < self.max_uses {
            record.timestamps.push_back(now);
            return CooldownDecision {
                allowed: true,
                retry_after: None,
            };
        }

        let retry_after = record
            .timestamps
            .front()
            .map(|oldest| *oldest + self.window - now)
            .unwrap_or_else(Duration::zero);
        debug!(
            "{} is on trainer cooldown for another {}s",
            record.owner,
            retry_after.num_seconds()
        );
        CooldownDecision {
            allowed: false,
            retry_after: Some(retry_after),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn tracker() -> CooldownTracker {
        CooldownTracker::new(&CooldownSettings::default())
    }

    #[test]
    fn test_window_fills_then_reopens() {
        let tracker = tracker();
        let mut record = TrainerCooldownRecord::new(OwnerId(7));

        for minute in [0, 10, 20] {
            assert!(tracker.try_consume(&mut record, at(minute)).allowed);
        }

        let denied = tracker.try_consume(&mut record, at(30));
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Some(Duration::minutes(30)));
        assert_eq!(record.timestamps.len(), 3);

        let reopened = tracker.try_consume(&mut record, at(61));
        assert!(reopened.allowed);
        assert_eq!(reopened.retry_after, None);
        assert_eq!(record.timestamps, VecDeque::from(vec![at(10), at(20), at(61)]));
    }

    #[test]
    fn test_denial_converts_to_cooldown_error() {
        let tracker = tracker();
        let mut record = TrainerCooldownRecord::new(OwnerId(7));
        for minute in [0, 1, 2] {
            tracker.try_consume(&mut record, at(minute));
        }
        let result = tracker.try_consume(&mut record, at(5)).into_result();
        assert_eq!(
            result,
            Err(ProgressionError::CooldownActive {
                retry_after: Duration::minutes(55)
            })
        );
    }

    #[test]
    fn test_prune_drops_expired_entries() {
        let tracker = tracker();
        let mut record = TrainerCooldownRecord::new(OwnerId(7));
        record.timestamps.extend([at(0), at(30), at(59)]);
        tracker.prune(&mut record, at(90));
        assert_eq!(record.timestamps, VecDeque::from(vec![at(59)]));
    }

    #[test]
    fn test_custom_window() {
        let tracker = CooldownTracker::new(&CooldownSettings {
            window_minutes: 5,
            max_uses: 1,
        });
        let mut record = TrainerCooldownRecord::new(OwnerId(1));
        assert!(tracker.try_consume(&mut record, at(0)).allowed);
        assert_eq!(
            tracker.try_consume(&mut record, at(2)).retry_after,
            Some(Duration::minutes(3))
        );
        assert!(tracker.try_consume(&mut record, at(5)).allowed);
    }
}
