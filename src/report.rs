//! Progress summary for the status command.
//!
//! The data behind a progress panel, rendered as plain text. Drawing it is the
//! host's business.

use core::fmt;

use crate::ledger::{ChatRecord, ProgressionLedger};
use crate::stage::{combined_multiplier, Archetype, Pacing, Stage, MAX_AFFECTION};
use crate::unlock::{unlocked_behaviors, Behavior, Topic};

/// Snapshot of progression for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    /// Current affection.
    pub affection: i32,
    /// Current stage.
    pub stage: Stage,
    /// Percent of the way from this stage's threshold to the next one, rounded.
    pub stage_progress: u8,
    /// Percent of the full affection scale, rounded.
    pub overall_progress: u8,
    /// Character archetype.
    pub archetype: Archetype,
    /// Pacing preset.
    pub pacing: Pacing,
    /// Archetype × pacing.
    pub multiplier: f64,
    /// Behaviors unlocked at current affection.
    pub behaviors: Vec<Behavior>,
    /// Permanently unlocked topics.
    pub topics: Vec<Topic>,
    /// Character growth level.
    pub growth_level: u8,
}

impl ProgressReport {
    /// Build a report from a ledger and its chat record.
    pub fn new(ledger: &ProgressionLedger, record: &ChatRecord) -> Self {
        let affection = ledger.affection();
        let stage = ledger.stage();
        Self {
            affection,
            stage,
            stage_progress: stage_progress(affection, stage),
            overall_progress: percent(affection, MAX_AFFECTION),
            archetype: ledger.archetype(),
            pacing: ledger.pacing(),
            multiplier: combined_multiplier(ledger.archetype(), ledger.pacing()),
            behaviors: unlocked_behaviors(affection),
            topics: record.topics_in_order(),
            growth_level: record.growth_level(),
        }
    }

    /// One-line summary used when the progress UI is turned off.
    pub fn short_line(&self) -> String {
        format!("Stage: {} ({}/{MAX_AFFECTION})", self.stage.label(), self.affection)
    }
}

/// Percent through `stage` at `affection`, in `[0, 100]`.
pub fn stage_progress(affection: i32, stage: Stage) -> u8 {
    let floor = stage.threshold();
    percent(affection - floor, stage.ceiling() - floor)
}

fn percent(part: i32, whole: i32) -> u8 {
    if whole <= 0 {
        return 100;
    }
    let p = (f64::from(part) / f64::from(whole) * 100.0).round();
    p.clamp(0.0, 100.0) as u8
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relationship Progress")?;
        writeln!(f, "Stage: {}", self.stage.label())?;
        writeln!(
            f,
            "Affection: {}/{MAX_AFFECTION} ({}%)",
            self.affection, self.overall_progress
        )?;
        writeln!(f, "Stage progress: {}%", self.stage_progress)?;
        writeln!(
            f,
            "Personality: {} | Pacing: {} | Speed: {:.2}x",
            self.archetype, self.pacing, self.multiplier
        )?;
        writeln!(f, "Growth: {}/100", self.growth_level)?;
        if !self.behaviors.is_empty() {
            let labels: Vec<&str> = self.behaviors.iter().map(|b| b.label()).collect();
            writeln!(f, "Unlocked: {}", labels.join(", "))?;
        }
        if !self.topics.is_empty() {
            let labels: Vec<&str> = self.topics.iter().map(|t| t.label()).collect();
            writeln!(f, "Topics: {}", labels.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_progress_bounds() {
        assert_eq!(stage_progress(0, Stage::Strangers), 0);
        assert_eq!(stage_progress(71, Stage::Friends), 0);
        assert_eq!(stage_progress(88, Stage::Friends), 49);
        assert_eq!(stage_progress(250, Stage::Romance), 100);
    }

    #[test]
    fn test_report_fields() {
        let ledger = ProgressionLedger::new(0)
            .with_archetype(Archetype::Confident)
            .with_pacing(Pacing::Fast)
            .with_affection(130);
        let r = ProgressReport::new(&ledger, &ChatRecord::new());
        assert_eq!(r.stage, Stage::GoodFriends);
        assert_eq!(r.overall_progress, 52);
        assert!((r.multiplier - 1.5).abs() < 1e-9);
        assert_eq!(r.behaviors, vec![Behavior::FlirtyBanter]);
        assert!(r.topics.is_empty());
    }

    #[test]
    fn test_display_mentions_speed_and_unlocks() {
        let ledger = ProgressionLedger::new(0)
            .with_archetype(Archetype::Tsundere)
            .with_pacing(Pacing::Glacial)
            .with_affection(130);
        let text = ProgressReport::new(&ledger, &ChatRecord::new()).to_string();
        assert!(text.contains("Speed: 0.40x"), "got: {text}");
        assert!(text.contains("Unlocked: flirty banter"));
        assert!(!text.contains("Topics:"));
    }

    #[test]
    fn test_short_line() {
        let r = ProgressReport::new(&ProgressionLedger::new(0), &ChatRecord::new());
        assert_eq!(r.short_line(), format!("Stage: {} (0/250)", Stage::Strangers.label()));
    }
}
