/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Generated-side consistency enforcement and emotional-moment detection.
//!
//! The generator sometimes runs ahead of the relationship. When it does, the
//! enforcer names the reasons and builds a corrective directive for the next
//! turn; under [`ConsistencyPolicy::RewriteExplicit`] it also masks explicit
//! keywords in the returned text.
//!
//! Emotional moments are the opposite case: the generator expressed something
//! the relationship has earned. The first one found becomes a notice and the
//! ledger copy handed back to the host gets [`EMOTIONAL_MOMENT_BONUS`].

use core::fmt;

use crate::analysis::Signals;
use crate::config::ConsistencyPolicy;
use crate::lexicon::{mask_keywords, Category};
use crate::unlock::Behavior;

/// Replacement for masked explicit keywords.
pub const REDACTION_MASK: &str = "...";

/// Affection added to the generated-turn ledger copy when any emotional moment is detected.
pub const EMOTIONAL_MOMENT_BONUS: i32 = 2;

const CORRECTION_PREFIX: &str =
    "Your previous response was too forward for the current relationship stage. Reasons: ";

// ─── Issues ─────────────────────────────────────────────────────────────────

/// Something the generated text should not yet contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsistencyIssue {
    /// Explicit content before `sexual_content` unlocks.
    SexualContentTooEarly,
    /// Romantic language or flirtation before `flirty_banter` unlocks.
    FlirtationTooEarly,
    /// Touch description before `comfortable_touch` unlocks.
    TouchTooEarly,
}

impl ConsistencyIssue {
    /// Stable tag, listed in the corrective directive.
    pub const fn as_str(self) -> &'static str {
        match self {
            ConsistencyIssue::SexualContentTooEarly => "sexual_content_too_early",
            ConsistencyIssue::FlirtationTooEarly => "flirtation_too_early",
            ConsistencyIssue::TouchTooEarly => "touch_too_early",
        }
    }

    /// The behavior whose threshold gates this issue.
    pub const fn gate(self) -> Behavior {
        match self {
            ConsistencyIssue::SexualContentTooEarly => Behavior::SexualContent,
            ConsistencyIssue::FlirtationTooEarly => Behavior::FlirtyBanter,
            ConsistencyIssue::TouchTooEarly => Behavior::ComfortableTouch,
        }
    }
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Emotional moments ──────────────────────────────────────────────────────

/// An earned emotional beat in generated text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionalMoment {
    /// The character showed vulnerability. Always allowed.
    SharedVulnerability,
    /// Romantic language once `flirty_banter` is unlocked.
    RomanticFeelings,
    /// Touch once `comfortable_touch` is unlocked.
    PhysicalAffection,
}

impl EmotionalMoment {
    /// Notice text, without brackets.
    pub const fn description(self) -> &'static str {
        match self {
            EmotionalMoment::SharedVulnerability => "Character shared something vulnerable",
            EmotionalMoment::RomanticFeelings => "Romantic feelings acknowledged",
            EmotionalMoment::PhysicalAffection => "Physical affection expressed",
        }
    }

    /// Notice as shown to the user: `[description]`.
    pub fn notice(self) -> String {
        format!("[{}]", self.description())
    }
}

/// Emotional moments in generated-mode `signals` at `affection`, in fixed order.
pub fn detect_emotional_moments(signals: &Signals, affection: i32) -> Vec<EmotionalMoment> {
    let mut moments = Vec::new();
    if signals.vulnerability {
        moments.push(EmotionalMoment::SharedVulnerability);
    }
    if signals.romantic_language() && Behavior::FlirtyBanter.is_unlocked_at(affection) {
        moments.push(EmotionalMoment::RomanticFeelings);
    }
    if signals.touch && Behavior::ComfortableTouch.is_unlocked_at(affection) {
        moments.push(EmotionalMoment::PhysicalAffection);
    }
    moments
}

// ─── Enforcer ───────────────────────────────────────────────────────────────

/// Result of checking one generated message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Issues in fixed order: sexual, flirtation, touch.
    pub issues: Vec<ConsistencyIssue>,
    /// Masked text, when the policy rewrites and there was something to flag.
    pub rewritten: Option<String>,
    /// Corrective directive for the next generation.
    pub correction: Option<String>,
    /// Emotional moments detected, in fixed order.
    pub moments: Vec<EmotionalMoment>,
}

impl ConsistencyReport {
    /// `true` if no issue was found.
    pub fn is_appropriate(&self) -> bool {
        self.issues.is_empty()
    }

    /// Notice for the first emotional moment, if any.
    pub fn notice(&self) -> Option<String> {
        self.moments.first().map(|m| m.notice())
    }

    /// Affection bonus earned by this message.
    pub fn bonus(&self) -> i32 {
        if self.moments.is_empty() {
            0
        } else {
            EMOTIONAL_MOMENT_BONUS
        }
    }
}

/// Checks generated text against current unlocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsistencyEnforcer {
    policy: ConsistencyPolicy,
}

impl ConsistencyEnforcer {
    /// Enforcer with the given policy.
    pub fn new(policy: ConsistencyPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// Issues raised by generated-mode `signals` at `affection`.
    pub fn issues(&self, signals: &Signals, affection: i32) -> Vec<ConsistencyIssue> {
        let flagged = [
            (signals.sexual, ConsistencyIssue::SexualContentTooEarly),
            (signals.romantic_language(), ConsistencyIssue::FlirtationTooEarly),
            (signals.touch, ConsistencyIssue::TouchTooEarly),
        ];
        flagged
            .iter()
            .filter(|(on, issue)| *on && !issue.gate().is_unlocked_at(affection))
            .map(|&(_, issue)| issue)
            .collect()
    }

    /// Full check of `text` with its generated-mode `signals`.
    pub fn enforce(&self, text: &str, signals: &Signals, affection: i32) -> ConsistencyReport {
        let issues = self.issues(signals, affection);
        let moments = detect_emotional_moments(signals, affection);

        if issues.is_empty() {
            return ConsistencyReport { moments, ..ConsistencyReport::default() };
        }

        let rewritten = match self.policy {
            ConsistencyPolicy::RewriteExplicit => Some(redact_explicit(text)),
            ConsistencyPolicy::DeferToNextTurn => None,
        };

        ConsistencyReport {
            correction: Some(correction_directive(&issues)),
            issues,
            rewritten,
            moments,
        }
    }
}

/// Mask every explicit keyword in `text`, longest match first.
pub fn redact_explicit(text: &str) -> String {
    mask_keywords(text, Category::Sexual.keywords(), REDACTION_MASK)
}

/// The corrective directive naming `issues`.
pub fn correction_directive(issues: &[ConsistencyIssue]) -> String {
    let reasons: Vec<&str> = issues.iter().map(|i| i.as_str()).collect();
    format!("{CORRECTION_PREFIX}{}", reasons.join(", "))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
