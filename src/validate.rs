/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! State repair for restored ledgers and chat records.
//!
//! Repair is total: any [`LedgerSnapshot`], however damaged, yields a ledger
//! that satisfies every ledger invariant. Fields that were present and valid
//! are carried over untouched.

use core::fmt;

use crate::ledger::{ChatRecord, ProgressionLedger};
use crate::score::round_half_up;
use crate::snapshot::LedgerSnapshot;
use crate::stage::{Archetype, Pacing, Stage, MAX_AFFECTION};

/// One correction applied during repair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Repair {
    /// Affection was missing or not a finite number; reset to 0.
    AffectionMissing,
    /// Affection was outside `[0, MAX_AFFECTION]` or fractional.
    AffectionNormalized {
        /// Value after repair.
        to: i32,
    },
    /// Stored stage did not match the stage derived from affection.
    StageRecomputed {
        /// Stored value.
        from: String,
        /// Derived stage.
        to: Stage,
    },
    /// Archetype missing or unrecognised.
    ArchetypeReset {
        /// Stored value, if any.
        from: Option<String>,
    },
    /// Pacing missing or unrecognised.
    PacingReset {
        /// Stored value, if any.
        from: Option<String>,
    },
    /// A counter was missing or negative.
    CounterReset(&'static str),
    /// A timestamp was missing; set to the restore time.
    TimestampFilled(&'static str),
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::AffectionMissing => f.write_str("affection missing, reset to 0"),
            Repair::AffectionNormalized { to } => write!(f, "affection normalized to {to}"),
            Repair::StageRecomputed { from, to } => write!(f, "stage '{from}' recomputed as {to}"),
            Repair::ArchetypeReset { from } => {
                write!(f, "archetype {from:?} reset to {}", Archetype::default())
            }
            Repair::PacingReset { from } => write!(f, "pacing {from:?} reset to {}", Pacing::default()),
            Repair::CounterReset(name) => write!(f, "{name} reset to 0"),
            Repair::TimestampFilled(name) => write!(f, "{name} set to restore time"),
        }
    }
}

/// A repaired ledger and the corrections that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repaired {
    /// The consistent ledger.
    pub ledger: ProgressionLedger,
    /// Corrections applied, in field order. Empty if the snapshot was already valid.
    pub repairs: Vec<Repair>,
}

/// Turns untrusted persisted state into consistent state.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateValidator;

impl StateValidator {
    /// Construct a validator.
    pub fn new() -> Self {
        Self
    }

    /// Repair `snapshot` into a ledger. Missing timestamps are filled with `now_ms`.
    pub fn repair(&self, snapshot: &LedgerSnapshot, now_ms: i64) -> Repaired {
        let mut repairs = Vec::new();

        let affection = match snapshot.affection {
            Some(raw) if raw.is_finite() => {
                let clamped = round_half_up(raw.clamp(0.0, f64::from(MAX_AFFECTION)));
                if f64::from(clamped) != raw {
                    repairs.push(Repair::AffectionNormalized { to: clamped });
                }
                clamped
            }
            _ => {
                repairs.push(Repair::AffectionMissing);
                0
            }
        };

        let derived = Stage::from_affection(affection);
        if let Some(stored) = &snapshot.stage {
            if stored.parse::<Stage>().ok() != Some(derived) {
                repairs.push(Repair::StageRecomputed { from: stored.clone(), to: derived });
            }
        }

        let archetype = match snapshot.archetype.as_deref().map(str::parse::<Archetype>) {
            Some(Ok(a)) => a,
            _ => {
                repairs.push(Repair::ArchetypeReset { from: snapshot.archetype.clone() });
                Archetype::default()
            }
        };

        let pacing = match snapshot.pacing.as_deref().map(str::parse::<Pacing>) {
            Some(Ok(p)) => p,
            _ => {
                repairs.push(Repair::PacingReset { from: snapshot.pacing.clone() });
                Pacing::default()
            }
        };

        let interaction_count =
            repair_counter(snapshot.interaction_count, "interaction_count", &mut repairs);
        let messages_this_session =
            repair_counter(snapshot.messages_this_session, "messages_this_session", &mut repairs);

        let last_interaction_ms =
            repair_timestamp(snapshot.last_interaction_ms, "last_interaction_ms", now_ms, &mut repairs);
        let session_start_ms =
            repair_timestamp(snapshot.session_start_ms, "session_start_ms", now_ms, &mut repairs);

        let ledger = ProgressionLedger::from_parts(
            i64::from(affection),
            archetype,
            pacing,
            interaction_count,
            u32::try_from(messages_this_session).unwrap_or(u32::MAX),
            last_interaction_ms,
            session_start_ms,
            snapshot.flags.unwrap_or_default(),
        );

        Repaired { ledger, repairs }
    }

    /// Repair a restored chat record: growth into `[0, 100]`, peak into `[0, 250]`.
    pub fn repair_chat_record(&self, record: ChatRecord) -> ChatRecord {
        record.repaired()
    }
}

fn repair_counter(value: Option<i64>, name: &'static str, repairs: &mut Vec<Repair>) -> u64 {
    match value {
        Some(v) if v >= 0 => v as u64,
        _ => {
            repairs.push(Repair::CounterReset(name));
            0
        }
    }
}

fn repair_timestamp(
    value: Option<i64>,
    name: &'static str,
    now_ms: i64,
    repairs: &mut Vec<Repair>,
) -> i64 {
    value.unwrap_or_else(|| {
        repairs.push(Repair::TimestampFilled(name));
        now_ms
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MilestoneFlags;

    fn full_snapshot() -> LedgerSnapshot {
        LedgerSnapshot {
            affection: Some(90.0),
            stage: Some("friends".into()),
            archetype: Some("shy".into()),
            pacing: Some("moderate".into()),
            interaction_count: Some(40),
            messages_this_session: Some(6),
            last_interaction_ms: Some(5_000),
            session_start_ms: Some(1_000),
            flags: Some(MilestoneFlags { first_compliment: true, ..MilestoneFlags::default() }),
        }
    }

    #[test]
    fn test_valid_snapshot_needs_no_repairs() {
        let r = StateValidator::new().repair(&full_snapshot(), 9_999);
        assert!(r.repairs.is_empty(), "unexpected repairs: {:?}", r.repairs);
        assert_eq!(r.ledger.affection(), 90);
        assert_eq!(r.ledger.archetype(), Archetype::Shy);
        assert_eq!(r.ledger.pacing(), Pacing::Moderate);
        assert!(r.ledger.flags().first_compliment);
    }

    #[test]
    fn test_empty_archetype_resets_only_archetype() {
        let mut s = full_snapshot();
        s.archetype = Some(String::new());
        let r = StateValidator::new().repair(&s, 9_999);
        assert_eq!(r.ledger.archetype(), Archetype::Guarded);
        assert_eq!(r.repairs, vec![Repair::ArchetypeReset { from: Some(String::new()) }]);
        assert_eq!(r.ledger.affection(), 90);
        assert_eq!(r.ledger.pacing(), Pacing::Moderate);
        assert_eq!(r.ledger.interaction_count(), 40);
        assert_eq!(r.ledger.last_interaction_ms(), 5_000);
    }

    #[test]
    fn test_affection_clamped_and_stage_recomputed() {
        let mut s = full_snapshot();
        s.affection = Some(999.0);
        let r = StateValidator::new().repair(&s, 0);
        assert_eq!(r.ledger.affection(), MAX_AFFECTION);
        assert_eq!(r.ledger.stage(), Stage::Romance);
        assert!(r.repairs.contains(&Repair::AffectionNormalized { to: MAX_AFFECTION }));
        assert!(r.repairs.contains(&Repair::StageRecomputed {
            from: "friends".into(),
            to: Stage::Romance
        }));
    }

    #[test]
    fn test_negative_and_nan_affection() {
        let mut s = full_snapshot();
        s.affection = Some(-20.0);
        assert_eq!(StateValidator::new().repair(&s, 0).ledger.affection(), 0);
        s.affection = Some(f64::NAN);
        let r = StateValidator::new().repair(&s, 0);
        assert_eq!(r.ledger.affection(), 0);
        assert!(r.repairs.contains(&Repair::AffectionMissing));
    }

    #[test]
    fn test_empty_snapshot_becomes_fresh_ledger() {
        let r = StateValidator::new().repair(&LedgerSnapshot::new(), 1_234);
        assert_eq!(r.ledger, ProgressionLedger::new(1_234));
    }

    #[test]
    fn test_negative_counters_reset() {
        let mut s = full_snapshot();
        s.interaction_count = Some(-3);
        let r = StateValidator::new().repair(&s, 0);
        assert_eq!(r.ledger.interaction_count(), 0);
        assert_eq!(r.repairs, vec![Repair::CounterReset("interaction_count")]);
    }

    #[test]
    fn test_chat_record_repair_clamps() {
        let r = StateValidator::new().repair_chat_record(ChatRecord::new());
        assert_eq!(r.growth_level(), 0);
        assert_eq!(r.peak_affection(), 0);
    }
}
