//! Content unlocks: permanent topics, transient behaviors, and the growth figure.
//!
//! Topics and behaviors differ in one important way. A topic, once its
//! threshold is crossed, is written to the [`ChatRecord`] and stays unlocked for
//! the life of the chat. Behaviors are recomputed from current affection every
//! turn and re-lock if affection falls.

use core::fmt;

use crate::ledger::ChatRecord;
use crate::stage::Stage;

/// Upper bound of the growth level.
pub const MAX_GROWTH_LEVEL: u8 = 100;

/// Growth points per significant event.
pub const GROWTH_PER_EVENT: u32 = 2;

/// Conversation topics the character will open up about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Topic {
    /// Family and upbringing.
    FamilyBackground,
    /// Former partners.
    PastRelationships,
    /// Ambitions.
    DreamsAndGoals,
    /// Fears and insecurities.
    FearsAndInsecurities,
    /// Deep feelings.
    DeepFeelings,
}

impl Topic {
    /// All topics, lowest threshold first.
    pub const ALL: [Topic; 5] = [
        Topic::FamilyBackground,
        Topic::PastRelationships,
        Topic::DreamsAndGoals,
        Topic::FearsAndInsecurities,
        Topic::DeepFeelings,
    ];

    /// Affection at which this topic unlocks.
    pub const fn threshold(self) -> i32 {
        match self {
            Topic::FamilyBackground => 50,
            Topic::PastRelationships => 100,
            Topic::DreamsAndGoals => 120,
            Topic::FearsAndInsecurities => 150,
            Topic::DeepFeelings => 200,
        }
    }

    /// Stable snake_case identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::FamilyBackground => "family_background",
            Topic::PastRelationships => "past_relationships",
            Topic::DreamsAndGoals => "dreams_and_goals",
            Topic::FearsAndInsecurities => "fears_and_insecurities",
            Topic::DeepFeelings => "deep_feelings",
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Topic::FamilyBackground => "family background",
            Topic::PastRelationships => "past relationships",
            Topic::DreamsAndGoals => "dreams and goals",
            Topic::FearsAndInsecurities => "fears and insecurities",
            Topic::DeepFeelings => "deep feelings",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviors the character may show at the current affection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Behavior {
    /// Playful flirting.
    FlirtyBanter,
    /// Casual physical contact.
    ComfortableTouch,
    /// Affectionate nicknames.
    PetNames,
    /// Explicit sexual content.
    SexualContent,
    /// Deep emotional intimacy.
    DeepIntimacy,
    /// Declaring romantic feelings.
    RomanticConfession,
}

impl Behavior {
    /// All behaviors, lowest threshold first.
    pub const ALL: [Behavior; 6] = [
        Behavior::FlirtyBanter,
        Behavior::ComfortableTouch,
        Behavior::PetNames,
        Behavior::SexualContent,
        Behavior::DeepIntimacy,
        Behavior::RomanticConfession,
    ];

    /// Affection at which this behavior unlocks.
    pub const fn threshold(self) -> i32 {
        match self {
            Behavior::FlirtyBanter => 125,
            Behavior::ComfortableTouch => 150,
            Behavior::PetNames => 175,
            Behavior::SexualContent => 176,
            Behavior::DeepIntimacy => 200,
            Behavior::RomanticConfession => 225,
        }
    }

    /// `true` if `affection` clears this behavior's threshold.
    pub const fn is_unlocked_at(self, affection: i32) -> bool {
        affection >= self.threshold()
    }

    /// Stable snake_case identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Behavior::FlirtyBanter => "flirty_banter",
            Behavior::ComfortableTouch => "comfortable_touch",
            Behavior::PetNames => "pet_names",
            Behavior::SexualContent => "sexual_content",
            Behavior::DeepIntimacy => "deep_intimacy",
            Behavior::RomanticConfession => "romantic_confession",
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Behavior::FlirtyBanter => "flirty banter",
            Behavior::ComfortableTouch => "comfortable touch",
            Behavior::PetNames => "pet names",
            Behavior::SexualContent => "sexual content",
            Behavior::DeepIntimacy => "deep intimacy",
            Behavior::RomanticConfession => "romantic confession",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviors unlocked at `affection`, in threshold order.
pub fn unlocked_behaviors(affection: i32) -> Vec<Behavior> {
    Behavior::ALL
        .iter()
        .copied()
        .filter(|b| b.is_unlocked_at(affection))
        .collect()
}

/// Growth level implied by an event count and a stage, before the monotone guard.
pub fn growth_for(event_count: usize, stage: Stage) -> u8 {
    let events = u32::try_from(event_count).unwrap_or(u32::MAX);
    let raw = events
        .saturating_mul(GROWTH_PER_EVENT)
        .saturating_add(stage.growth_bonus() as u32);
    raw.min(MAX_GROWTH_LEVEL as u32) as u8
}

/// What changed in the unlock bookkeeping this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockReport {
    /// Topics unlocked for the first time this turn.
    pub newly_unlocked_topics: Vec<Topic>,
    /// All permanently unlocked topics, in threshold order.
    pub topics: Vec<Topic>,
    /// Behaviors unlocked at current affection.
    pub behaviors: Vec<Behavior>,
    /// Growth level after this turn.
    pub growth_level: u8,
}

/// Derives unlocks from ledger state and writes the permanent ones to the chat record.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnlockTracker;

impl UnlockTracker {
    /// Construct a tracker.
    pub fn new() -> Self {
        Self
    }

    /// Update `record` for a ledger at `affection` / `stage`.
    ///
    /// Never removes a topic and never lowers the growth level.
    pub fn update(&self, affection: i32, stage: Stage, record: &mut ChatRecord) -> UnlockReport {
        let newly_unlocked_topics: Vec<Topic> = Topic::ALL
            .iter()
            .copied()
            .filter(|t| affection >= t.threshold())
            .filter(|t| record.unlock_topic(*t))
            .collect();

        let growth = growth_for(record.events().len(), stage);
        record.raise_growth_level(growth);

        UnlockReport {
            newly_unlocked_topics,
            topics: record.topics_in_order(),
            behaviors: unlocked_behaviors(affection),
            growth_level: record.growth_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_ascending() {
        for pair in Topic::ALL.windows(2) {
            assert!(pair[0].threshold() < pair[1].threshold());
        }
        for pair in Behavior::ALL.windows(2) {
            assert!(pair[0].threshold() < pair[1].threshold());
        }
        assert_eq!(Topic::ALL[0].threshold(), 50);
        assert_eq!(Topic::ALL[4].threshold(), 200);
    }

    #[test]
    fn test_behaviors_relock() {
        assert!(unlocked_behaviors(124).is_empty());
        assert_eq!(unlocked_behaviors(150), vec![Behavior::FlirtyBanter, Behavior::ComfortableTouch]);
        assert_eq!(unlocked_behaviors(250).len(), Behavior::ALL.len());
        assert_eq!(unlocked_behaviors(130), vec![Behavior::FlirtyBanter]);
    }

    #[test]
    fn test_topics_never_relock() {
        let tracker = UnlockTracker::new();
        let mut record = ChatRecord::new();

        let first = tracker.update(150, Stage::CloseFriends, &mut record);
        assert_eq!(first.newly_unlocked_topics.len(), 4);

        let later = tracker.update(80, Stage::Friends, &mut record);
        assert!(later.newly_unlocked_topics.is_empty());
        assert!(later.topics.contains(&Topic::PastRelationships));
        assert!(later.topics.contains(&Topic::DreamsAndGoals));
        assert!(!later.topics.contains(&Topic::DeepFeelings));
    }

    #[test]
    fn test_growth_formula() {
        assert_eq!(growth_for(0, Stage::Strangers), 0);
        assert_eq!(growth_for(3, Stage::Friends), 16);
        assert_eq!(growth_for(80, Stage::Romance), MAX_GROWTH_LEVEL);
    }

    #[test]
    fn test_growth_never_decreases() {
        let tracker = UnlockTracker::new();
        let mut record = ChatRecord::new();
        let high = tracker.update(220, Stage::Romance, &mut record);
        assert_eq!(high.growth_level, 30);
        let low = tracker.update(10, Stage::Strangers, &mut record);
        assert_eq!(low.growth_level, 30);
    }

    #[test]
    fn test_labels_are_spaced() {
        assert_eq!(Behavior::SexualContent.label(), "sexual content");
        assert_eq!(Topic::FearsAndInsecurities.label(), "fears and insecurities");
    }
}
