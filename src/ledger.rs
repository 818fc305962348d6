/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The authoritative progression state and the chat-wide record.
//!
//! - [`ProgressionLedger`]: per-branch state. Affection, derived stage, presets, counters.
//! - [`ChatRecord`]: shared across every branch of one chat. Unlocked topics, the
//!   significant-event log, growth level and peak affection.
//!
//! # Invariants
//!
//! - `stage == Stage::from_affection(affection)` after every mutation.
//! - `affection ∈ [0, MAX_AFFECTION]` after every mutation.
//! - Unlocked topics and growth level never decrease.
//! - `peak_affection >= affection` once [`ChatRecord::observe_affection`] has run.
//! - The event log is append-only and chronological.

use hashbrown::HashSet;

use crate::stage::{clamp_affection, Archetype, Pacing, Stage, MAX_AFFECTION};
use crate::unlock::{Topic, MAX_GROWTH_LEVEL};

// ─── Milestone flags ────────────────────────────────────────────────────────

/// One-way relationship milestones. A flag, once set, stays set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MilestoneFlags {
    /// The user has paid a compliment.
    #[cfg_attr(feature = "serde", serde(alias = "firstCompliment"))]
    pub first_compliment: bool,
    /// The user has opened up emotionally.
    #[cfg_attr(feature = "serde", serde(alias = "sharedVulnerability"))]
    pub shared_vulnerability: bool,
    /// The user has been rude.
    #[cfg_attr(feature = "serde", serde(alias = "hadArgument"))]
    pub had_argument: bool,
    /// Romantic intent expressed after romantic confession unlocked.
    #[cfg_attr(feature = "serde", serde(alias = "confessedFeelings"))]
    pub confessed_feelings: bool,
    /// The character has described touch once it was permitted.
    #[cfg_attr(feature = "serde", serde(alias = "firstPhysicalContact"))]
    pub first_physical_contact: bool,
}

impl MilestoneFlags {
    /// Set every flag that is set in `other`.
    pub fn merge(&mut self, other: MilestoneFlags) {
        self.first_compliment |= other.first_compliment;
        self.shared_vulnerability |= other.shared_vulnerability;
        self.had_argument |= other.had_argument;
        self.confessed_feelings |= other.confessed_feelings;
        self.first_physical_contact |= other.first_physical_contact;
    }
}

// ─── Progression ledger ─────────────────────────────────────────────────────

/// Outcome of [`ProgressionLedger::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTransition {
    /// Affection before the delta.
    pub previous_affection: i32,
    /// Affection after clamping.
    pub affection: i32,
    /// Stage before the delta.
    pub previous_stage: Stage,
    /// Stage after the delta.
    pub stage: Stage,
}

impl StageTransition {
    /// `true` if the stage changed.
    pub fn changed(&self) -> bool {
        self.previous_stage != self.stage
    }

    /// Effective change after clamping.
    pub fn applied_delta(&self) -> i32 {
        self.affection - self.previous_affection
    }
}

/// Per-branch progression state.
///
/// Fields are private so that `stage` can only ever be derived from `affection`.
/// Hooks take a ledger by value and hand back the new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressionLedger {
    affection: i32,
    stage: Stage,
    archetype: Archetype,
    pacing: Pacing,
    interaction_count: u64,
    messages_this_session: u32,
    last_interaction_ms: i64,
    session_start_ms: i64,
    flags: MilestoneFlags,
}

impl ProgressionLedger {
    /// A fresh ledger at zero affection with the default presets, session starting at `now_ms`.
    pub fn new(now_ms: i64) -> Self {
        Self {
            affection: 0,
            stage: Stage::Strangers,
            archetype: Archetype::default(),
            pacing: Pacing::default(),
            interaction_count: 0,
            messages_this_session: 0,
            last_interaction_ms: now_ms,
            session_start_ms: now_ms,
            flags: MilestoneFlags::default(),
        }
    }

    /// Assemble a ledger from already-validated parts. Affection is clamped and
    /// the stage derived from it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        affection: i64,
        archetype: Archetype,
        pacing: Pacing,
        interaction_count: u64,
        messages_this_session: u32,
        last_interaction_ms: i64,
        session_start_ms: i64,
        flags: MilestoneFlags,
    ) -> Self {
        let affection = clamp_affection(affection);
        Self {
            affection,
            stage: Stage::from_affection(affection),
            archetype,
            pacing,
            interaction_count,
            messages_this_session,
            last_interaction_ms,
            session_start_ms,
            flags,
        }
    }

    /// Builder: set the archetype.
    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = archetype;
        self
    }

    /// Builder: set the pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Builder: set affection (clamped; stage follows).
    pub fn with_affection(mut self, affection: i32) -> Self {
        self.set_affection(affection);
        self
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// Current affection in `[0, MAX_AFFECTION]`.
    pub fn affection(&self) -> i32 {
        self.affection
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Character archetype.
    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Pacing preset.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Total scored turns on this branch.
    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    /// Scored turns in the current session.
    pub fn messages_this_session(&self) -> u32 {
        self.messages_this_session
    }

    /// Unix milliseconds of the last scored turn.
    pub fn last_interaction_ms(&self) -> i64 {
        self.last_interaction_ms
    }

    /// Unix milliseconds at which the session started.
    pub fn session_start_ms(&self) -> i64 {
        self.session_start_ms
    }

    /// Milliseconds between the session start and `now_ms` (never negative).
    pub fn session_elapsed_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.session_start_ms).max(0)
    }

    /// Milestone flags.
    pub fn flags(&self) -> MilestoneFlags {
        self.flags
    }

    // ── Mutation ───────────────────────────────────────────────────────────

    /// Change the archetype. Affection and stage are unaffected.
    pub fn set_archetype(&mut self, archetype: Archetype) {
        self.archetype = archetype;
    }

    /// Change the pacing. Affection and stage are unaffected.
    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    /// Set any milestone flags raised this turn.
    pub fn raise_flags(&mut self, flags: MilestoneFlags) {
        self.flags.merge(flags);
    }

    fn set_affection(&mut self, affection: i32) {
        self.affection = clamp_affection(affection as i64);
        self.stage = Stage::from_affection(self.affection);
    }

    /// Apply a scored delta at `now_ms`.
    ///
    /// Clamps affection, re-derives the stage, and appends a
    /// `stage_change_to_<stage>` event to `record` if the stage moved.
    /// Also updates `record`'s peak affection.
    pub fn apply(&mut self, delta: i32, now_ms: i64, record: &mut ChatRecord) -> StageTransition {
        let previous_affection = self.affection;
        let previous_stage = self.stage;

        self.set_affection(previous_affection.saturating_add(delta));

        let transition = StageTransition {
            previous_affection,
            affection: self.affection,
            previous_stage,
            stage: self.stage,
        };

        if transition.changed() {
            record.push_event(SignificantEvent::stage_change(self.stage, now_ms, self.affection));
        }
        record.observe_affection(self.affection);
        transition
    }

    /// Count one scored turn at `now_ms`. Called once per user turn, regardless of delta.
    pub fn record_turn(&mut self, now_ms: i64) {
        self.interaction_count = self.interaction_count.saturating_add(1);
        self.messages_this_session = self.messages_this_session.saturating_add(1);
        self.last_interaction_ms = now_ms;
    }

    /// A copy of this ledger with `bonus` added to affection (clamped; stage follows).
    ///
    /// Counters and timestamps are untouched. Used for the generated-turn bonus.
    pub fn with_bonus(&self, bonus: i32) -> Self {
        let mut copy = self.clone();
        copy.set_affection(self.affection.saturating_add(bonus));
        copy
    }
}

// ─── Chat record ────────────────────────────────────────────────────────────

/// Prefix of the event name written on every stage change.
pub const STAGE_CHANGE_EVENT_PREFIX: &str = "stage_change_to_";

/// One entry of the significant-event audit log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignificantEvent {
    /// Event name, e.g. `stage_change_to_friends`.
    pub event: String,
    /// Unix milliseconds.
    #[cfg_attr(feature = "serde", serde(alias = "timestamp"))]
    pub timestamp_ms: i64,
    /// Affection when the event was recorded.
    #[cfg_attr(feature = "serde", serde(alias = "affectionAtTime"))]
    pub affection_at_time: i32,
}

impl SignificantEvent {
    /// Stage-change event for reaching `stage`.
    pub fn stage_change(stage: Stage, timestamp_ms: i64, affection: i32) -> Self {
        Self {
            event: format!("{STAGE_CHANGE_EVENT_PREFIX}{}", stage.as_str()),
            timestamp_ms,
            affection_at_time: affection,
        }
    }
}

/// State shared by every branch of one chat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChatRecord {
    #[cfg_attr(feature = "serde", serde(alias = "permanentlyUnlockedTopics"))]
    unlocked_topics: HashSet<Topic>,
    #[cfg_attr(feature = "serde", serde(alias = "significantEvents"))]
    significant_events: Vec<SignificantEvent>,
    #[cfg_attr(feature = "serde", serde(alias = "characterGrowthLevel"))]
    growth_level: u8,
    #[cfg_attr(feature = "serde", serde(alias = "peakAffection"))]
    peak_affection: i32,
}

impl ChatRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `topic` has been unlocked.
    pub fn is_topic_unlocked(&self, topic: Topic) -> bool {
        self.unlocked_topics.contains(&topic)
    }

    /// Unlocked topics in threshold order.
    pub fn topics_in_order(&self) -> Vec<Topic> {
        Topic::ALL
            .iter()
            .copied()
            .filter(|t| self.unlocked_topics.contains(t))
            .collect()
    }

    /// Number of unlocked topics.
    pub fn topic_count(&self) -> usize {
        self.unlocked_topics.len()
    }

    /// The event log, oldest first.
    pub fn events(&self) -> &[SignificantEvent] {
        &self.significant_events
    }

    /// Growth level in `[0, MAX_GROWTH_LEVEL]`.
    pub fn growth_level(&self) -> u8 {
        self.growth_level
    }

    /// Highest affection ever observed.
    pub fn peak_affection(&self) -> i32 {
        self.peak_affection
    }

    /// Unlock `topic`. Returns `true` if it was not unlocked before.
    pub fn unlock_topic(&mut self, topic: Topic) -> bool {
        self.unlocked_topics.insert(topic)
    }

    /// Append an event to the log.
    pub fn push_event(&mut self, event: SignificantEvent) {
        self.significant_events.push(event);
    }

    /// Raise the growth level to `level` if higher. Never lowers it.
    pub fn raise_growth_level(&mut self, level: u8) {
        let level = level.min(MAX_GROWTH_LEVEL);
        if level > self.growth_level {
            self.growth_level = level;
        }
    }

    /// Fold `affection` into the running peak.
    pub fn observe_affection(&mut self, affection: i32) {
        let affection = clamp_affection(affection as i64);
        if affection > self.peak_affection {
            self.peak_affection = affection;
        }
    }

    /// Bring a restored record back into range: growth ≤ 100, peak ∈ [0, 250].
    pub fn repaired(mut self) -> Self {
        self.growth_level = self.growth_level.min(MAX_GROWTH_LEVEL);
        self.peak_affection = self.peak_affection.clamp(0, MAX_AFFECTION);
        self
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
