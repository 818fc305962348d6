/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! User-side boundary enforcement.
//!
//! A user message that reaches for content the relationship has not unlocked is
//! not an error. It produces a deflection notice for the user and a redirect
//! instruction for the generator, and the turn proceeds.
//!
//! The check runs against affection *after* the turn's delta has been applied.

use core::fmt;

use crate::analysis::Signals;
use crate::unlock::Behavior;

/// Notice shown to the user when a boundary is crossed.
pub const DEFLECTION_NOTICE: &str =
    "[The character gently redirects the conversation, not ready for that yet]";

/// Instruction appended to the directive when a boundary is crossed.
pub const REDIRECT_DIRECTIVE: &str =
    "User is moving too fast. Politely deflect or redirect the conversation.";

/// A user-side boundary violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Explicit content before `sexual_content` unlocks.
    SexualContentTooEarly,
    /// Romantic intent before `flirty_banter` unlocks.
    RomanticIntentTooEarly,
}

impl Violation {
    /// Stable tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Violation::SexualContentTooEarly => "sexual_content_too_early",
            Violation::RomanticIntentTooEarly => "romantic_intent_too_early",
        }
    }

    /// Affection below which this violation fires.
    pub const fn threshold(self) -> i32 {
        match self {
            Violation::SexualContentTooEarly => Behavior::SexualContent.threshold(),
            Violation::RomanticIntentTooEarly => Behavior::FlirtyBanter.threshold(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a boundary check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryReport {
    /// Violations in fixed order: sexual first, then romantic.
    pub violations: Vec<Violation>,
}

impl BoundaryReport {
    /// `true` if anything was flagged.
    pub fn is_violated(&self) -> bool {
        !self.violations.is_empty()
    }

    /// The deflection notice, if any violation fired.
    pub fn notice(&self) -> Option<&'static str> {
        self.is_violated().then_some(DEFLECTION_NOTICE)
    }

    /// The redirect instruction, if any violation fired.
    pub fn redirect(&self) -> Option<&'static str> {
        self.is_violated().then_some(REDIRECT_DIRECTIVE)
    }
}

/// Flags user content that outruns the current unlocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryEnforcer;

impl BoundaryEnforcer {
    /// Construct an enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Check user-mode `signals` against `affection`.
    pub fn check(&self, signals: &Signals, affection: i32) -> BoundaryReport {
        let mut violations = Vec::new();
        if signals.sexual && affection < Violation::SexualContentTooEarly.threshold() {
            violations.push(Violation::SexualContentTooEarly);
        }
        if signals.romantic && affection < Violation::RomanticIntentTooEarly.threshold() {
            violations.push(Violation::RomanticIntentTooEarly);
        }
        BoundaryReport { violations }
    }
}
