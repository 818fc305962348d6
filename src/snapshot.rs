//! Portable, untrusted form of a [`ProgressionLedger`] for persistence and branch restore.
//!
//! Hosts hand back whatever they stored, possibly written by an older build or
//! edited by hand. Every field is therefore optional and the preset names are
//! kept as raw strings; [`StateValidator`](crate::validate::StateValidator)
//! turns a snapshot back into a consistent ledger and never fails.
//!
//! With the `serde` feature the snapshot is JSON-ready. Field names are
//! snake_case, and the camelCase names used by older hosts are accepted as
//! aliases on input:
//!
//! ```json
//! {
//!   "affection": 42,
//!   "characterArchetype": "shy",
//!   "pacingSpeed": "moderate",
//!   "relationshipStage": "acquaintances",
//!   "interactionCount": 12,
//!   "messagesThisSession": 3,
//!   "lastInteractionTime": 1700000000000,
//!   "sessionStartTime": 1699999000000
//! }
//! ```
//!
//! A field holding the wrong JSON type (`"affection": "abc"`, an archetype
//! given as a number) reads as missing instead of failing the whole snapshot,
//! so the validator can repair it like any other absent value.

use crate::ledger::{MilestoneFlags, ProgressionLedger};

/// A persisted ledger. Every field may be missing or out of range.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LedgerSnapshot {
    /// Affection. Fractional values round half-up; out-of-range values clamp.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::field"))]
    pub affection: Option<f64>,
    /// Stage name. Informational only: the stage is always re-derived from affection.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "relationshipStage", deserialize_with = "lenient::field")
    )]
    pub stage: Option<String>,
    /// Archetype name.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "characterArchetype", deserialize_with = "lenient::field")
    )]
    pub archetype: Option<String>,
    /// Pacing name.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "pacingSpeed", deserialize_with = "lenient::field")
    )]
    pub pacing: Option<String>,
    /// Total scored turns. Negative values reset to 0.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "interactionCount", deserialize_with = "lenient::field")
    )]
    pub interaction_count: Option<i64>,
    /// Scored turns this session. Negative values reset to 0.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "messagesThisSession", deserialize_with = "lenient::field")
    )]
    pub messages_this_session: Option<i64>,
    /// Unix milliseconds of the last scored turn.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "lastInteractionTime", deserialize_with = "lenient::field")
    )]
    pub last_interaction_ms: Option<i64>,
    /// Unix milliseconds of the session start.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "sessionStartTime", deserialize_with = "lenient::field")
    )]
    pub session_start_ms: Option<i64>,
    /// Milestone flags.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::field"))]
    pub flags: Option<MilestoneFlags>,
}

#[cfg(feature = "serde")]
mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Other(IgnoredAny),
    }

    /// `Some` when the value has the expected type, `None` for anything else.
    pub(super) fn field<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(match Field::<T>::deserialize(de)? {
            Field::Value(v) => Some(v),
            Field::Other(_) => None,
        })
    }
}

impl LedgerSnapshot {
    /// An empty snapshot. Restores to a fresh default ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every field of `ledger`.
    pub fn from_ledger(ledger: &ProgressionLedger) -> Self {
        Self {
            affection: Some(f64::from(ledger.affection())),
            stage: Some(ledger.stage().as_str().to_string()),
            archetype: Some(ledger.archetype().as_str().to_string()),
            pacing: Some(ledger.pacing().as_str().to_string()),
            interaction_count: Some(i64::try_from(ledger.interaction_count()).unwrap_or(i64::MAX)),
            messages_this_session: Some(i64::from(ledger.messages_this_session())),
            last_interaction_ms: Some(ledger.last_interaction_ms()),
            session_start_ms: Some(ledger.session_start_ms()),
            flags: Some(ledger.flags()),
        }
    }
}

impl ProgressionLedger {
    /// Capture this ledger for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::from_ledger(self)
    }
}

impl From<&ProgressionLedger> for LedgerSnapshot {
    fn from(ledger: &ProgressionLedger) -> Self {
        Self::from_ledger(ledger)
    }
}
