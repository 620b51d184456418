use crate::errors::{ProgressionError, ProgressionResult};
use chrono::{DateTime, Utc};
use log::info;
use schema::{Gym, OwnerId};
use serde::{Deserialize, Serialize};

/// Gyms an owner has defeated, in the order they were defeated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GymBadgeRecord {
    pub owner: OwnerId,
    pub badges: Vec<(Gym, DateTime<Utc>)>,
}

impl GymBadgeRecord {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            badges: Vec::new(),
        }
    }

    pub fn has_badge(&self, gym: Gym) -> bool {
        self.badges.iter().any(|(earned, _)| *earned == gym)
    }

    pub fn badge_count(&self) -> usize {
        self.badges.len()
    }

    pub fn is_complete(&self) -> bool {
        Gym::ALL.iter().all(|gym| self.has_badge(*gym))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GymVictory {
    /// A new badge was issued.
    BadgeEarned(Gym),
    /// The league was already complete; rewards only.
    Rematch(Gym),
}

pub struct GymProgressTracker;

impl GymProgressTracker {
    /// The first gym in league order without a badge, or `None` once all
    /// eight are held.
    pub fn next_gym(record: &GymBadgeRecord) -> Option<Gym> {
        Gym::ALL.into_iter().find(|gym| !record.has_badge(*gym))
    }

    /// Whether `gym` may be fought right now.
    pub fn check_challenge(record: &GymBadgeRecord, gym: Gym) -> ProgressionResult<()> {
        match Self::next_gym(record) {
            None => Ok(()),
            Some(expected) if expected == gym => Ok(()),
            expected => Err(ProgressionError::OutOfOrder {
                expected,
                attempted: gym,
            }),
        }
    }

    pub fn record_victory(
        record: &mut GymBadgeRecord,
        gym: Gym,
        now: DateTime<Utc>,
    ) -> ProgressionResult<GymVictory> {
        Self::check_challenge(record, gym)?;

        if record.is_complete() {
            info!("{} won a rematch against {}", record.owner, gym);
            return Ok(GymVictory::Rematch(gym));
        }

        record.badges.push((gym, now));
        info!(
            "{} earned the {} ({}/{})",
            record.owner,
            gym.badge(),
            record.badge_count(),
            Gym::ALL.len()
        );
        Ok(GymVictory::BadgeEarned(gym))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_gyms_must_be_beaten_in_order() {
        let mut record = GymBadgeRecord::new(OwnerId(1));
        assert_eq!(GymProgressTracker::next_gym(&record), Some(Gym::Pewter));

        GymProgressTracker::record_victory(&mut record, Gym::Pewter, now()).unwrap();
        GymProgressTracker::record_victory(&mut record, Gym::Cerulean, now()).unwrap();
        assert_eq!(GymProgressTracker::next_gym(&record), Some(Gym::Vermilion));

        let skipped = GymProgressTracker::record_victory(&mut record, Gym::Celadon, now());
        assert_eq!(
            skipped,
            Err(ProgressionError::OutOfOrder {
                expected: Some(Gym::Vermilion),
                attempted: Gym::Celadon,
            })
        );
        assert_eq!(record.badge_count(), 2);

        let repeat = GymProgressTracker::record_victory(&mut record, Gym::Pewter, now());
        assert!(matches!(repeat, Err(ProgressionError::OutOfOrder { .. })));
    }

    #[test]
    fn test_completed_league_allows_rematches_without_new_badges() {
        let mut record = GymBadgeRecord::new(OwnerId(1));
        for gym in Gym::ALL {
            assert_eq!(
                GymProgressTracker::record_victory(&mut record, gym, now()),
                Ok(GymVictory::BadgeEarned(gym))
            );
        }
        assert!(record.is_complete());
        assert_eq!(GymProgressTracker::next_gym(&record), None);

        for gym in [Gym::Saffron, Gym::Pewter] {
            assert_eq!(
                GymProgressTracker::record_victory(&mut record, gym, now()),
                Ok(GymVictory::Rematch(gym))
            );
        }
        assert_eq!(record.badge_count(), 8);
        let order: Vec<Gym> = record.badges.iter().map(|(gym, _)| *gym).collect();
        assert_eq!(order, Gym::ALL.to_vec());
    }
}
