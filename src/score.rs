/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Affection-delta computation.
//!
//! A turn's raw delta is the sum of independent contributions, each gated by one
//! signal. The raw delta is then scaled by the pacing and archetype multipliers
//! and rounded. Clamping is the ledger's job, not the calculator's.
//!
//! # Invariants
//!
//! - The base gain is always applied.
//! - Positive contributions stack.
//! - Regression doubles the rudeness and boundary-pushing penalties; the
//!   disengagement penalty is doubled only when `regress_disengagement` is set.
//! - Presets modulate the delta, never which contributions apply.

use crate::analysis::Signals;
use crate::stage::{Archetype, Pacing};
use crate::unlock::Behavior;

// ─── Gains ──────────────────────────────────────────────────────────────────

/// Applied to every scored message.
pub const BASE_MESSAGE_GAIN: i32 = 2;
/// Compliment present.
pub const COMPLIMENT_GAIN: i32 = 5;
/// User asked about the character.
pub const ASKS_ABOUT_SUBJECT_GAIN: i32 = 3;
/// User referred back to earlier conversation.
pub const REMEMBERS_HISTORY_GAIN: i32 = 5;
/// User opened up emotionally.
pub const VULNERABILITY_GAIN: i32 = 10;
/// User made the character laugh.
pub const HUMOR_GAIN: i32 = 5;
/// Long, considered message.
pub const THOUGHTFUL_GAIN: i32 = 3;
/// Session bonus per full five minutes elapsed.
pub const SESSION_BONUS_PER_FIVE_MINUTES: i32 = 2;
/// Ceiling of the session bonus.
pub const SESSION_BONUS_CAP: i32 = 10;

// ─── Losses ─────────────────────────────────────────────────────────────────

/// Insult present.
pub const RUDENESS_PENALTY: i32 = -10;
/// Explicit content before it is unlocked.
pub const BOUNDARY_PUSHING_PENALTY: i32 = -15;
/// Short reply late in a session.
pub const DISENGAGEMENT_PENALTY: i32 = -1;
/// Factor applied to penalties under the regression policy.
pub const REGRESSION_MULTIPLIER: i32 = 2;
/// The disengagement penalty only applies once the session has more messages than this.
pub const DISENGAGEMENT_GRACE_MESSAGES: u32 = 3;

const FIVE_MINUTES_MS: i64 = 5 * 60 * 1000;

/// One gated term of the raw delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contribution {
    /// [`BASE_MESSAGE_GAIN`].
    Base,
    /// [`COMPLIMENT_GAIN`].
    Compliment,
    /// [`ASKS_ABOUT_SUBJECT_GAIN`].
    AsksAboutSubject,
    /// [`REMEMBERS_HISTORY_GAIN`].
    RemembersHistory,
    /// [`VULNERABILITY_GAIN`].
    Vulnerability,
    /// [`HUMOR_GAIN`].
    Humor,
    /// [`THOUGHTFUL_GAIN`].
    Thoughtful,
    /// Elapsed-session bonus.
    SessionDuration,
    /// [`RUDENESS_PENALTY`], possibly doubled.
    Rudeness,
    /// [`BOUNDARY_PUSHING_PENALTY`], possibly doubled.
    BoundaryPushing,
    /// [`DISENGAGEMENT_PENALTY`].
    Disengagement,
}

/// Ledger-side inputs to scoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreContext {
    /// Affection before this turn.
    pub affection: i32,
    /// Messages already scored in this session.
    pub messages_this_session: u32,
    /// Milliseconds since the branch's session started.
    pub session_elapsed_ms: i64,
    /// Character archetype.
    pub archetype: Archetype,
    /// Pacing preset.
    pub pacing: Pacing,
}

/// Penalty doubling switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RegressionPolicy {
    /// Double rudeness and boundary-pushing penalties.
    pub enabled: bool,
    /// Also double the disengagement penalty (only when `enabled`).
    pub include_disengagement: bool,
}

/// Result of scoring one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreBreakdown {
    /// Every non-zero term that went into `raw`.
    pub contributions: Vec<(Contribution, i32)>,
    /// Sum of the contributions.
    pub raw: i32,
    /// Pacing × archetype.
    pub multiplier: f64,
    /// `raw × multiplier` rounded half-up, not yet clamped.
    pub delta: i32,
}

impl ScoreBreakdown {
    /// Value of one contribution, 0 if it did not apply.
    pub fn contribution(&self, which: Contribution) -> i32 {
        self.contributions
            .iter()
            .find(|(c, _)| *c == which)
            .map_or(0, |(_, v)| *v)
    }
}

/// Half-up rounding: exact halves round toward positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// `raw × pacing × archetype`, rounded half-up on the exact rational.
///
/// The presets are held as integer hundredths and tenths, so products such as
/// `10 × 1.5 × 0.7 = 10.5` land on the half exactly instead of just below it.
pub fn scale_delta(raw: i32, archetype: Archetype, pacing: Pacing) -> i32 {
    const DEN: i64 = 100 * 10;
    let num = i64::from(raw) * pacing.percent() * archetype.tenths();
    let rounded = (2 * num + DEN).div_euclid(2 * DEN);
    rounded.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Session bonus for `elapsed_ms` since the session started.
pub fn session_bonus(elapsed_ms: i64) -> i32 {
    let periods = (elapsed_ms.max(0) / FIVE_MINUTES_MS).min(i32::MAX as i64) as i32;
    periods
        .saturating_mul(SESSION_BONUS_PER_FIVE_MINUTES)
        .min(SESSION_BONUS_CAP)
}

/// Turns analysis signals into a signed affection delta.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreCalculator {
    regression: RegressionPolicy,
}

impl ScoreCalculator {
    /// Calculator with the given regression policy.
    pub fn new(regression: RegressionPolicy) -> Self {
        Self { regression }
    }

    /// Score one user turn.
    pub fn score(&self, signals: &Signals, ctx: &ScoreContext) -> ScoreBreakdown {
        let mut terms: Vec<(Contribution, i32)> = Vec::with_capacity(8);
        terms.push((Contribution::Base, BASE_MESSAGE_GAIN));

        let gated = [
            (signals.compliment, Contribution::Compliment, COMPLIMENT_GAIN),
            (signals.asks_about_subject, Contribution::AsksAboutSubject, ASKS_ABOUT_SUBJECT_GAIN),
            (signals.references_history, Contribution::RemembersHistory, REMEMBERS_HISTORY_GAIN),
            (signals.vulnerability, Contribution::Vulnerability, VULNERABILITY_GAIN),
            (signals.humor, Contribution::Humor, HUMOR_GAIN),
            (signals.is_thoughtful, Contribution::Thoughtful, THOUGHTFUL_GAIN),
        ];
        terms.extend(
            gated
                .iter()
                .filter(|(on, _, _)| *on)
                .map(|&(_, c, v)| (c, v)),
        );

        let bonus = session_bonus(ctx.session_elapsed_ms);
        if bonus > 0 {
            terms.push((Contribution::SessionDuration, bonus));
        }

        if signals.rude {
            terms.push((Contribution::Rudeness, self.regress(RUDENESS_PENALTY)));
        }

        if signals.sexual && ctx.affection < Behavior::SexualContent.threshold() {
            terms.push((
                Contribution::BoundaryPushing,
                self.regress(BOUNDARY_PUSHING_PENALTY),
            ));
        }

        if signals.is_short && ctx.messages_this_session > DISENGAGEMENT_GRACE_MESSAGES {
            let penalty = if self.regression.include_disengagement {
                self.regress(DISENGAGEMENT_PENALTY)
            } else {
                DISENGAGEMENT_PENALTY
            };
            terms.push((Contribution::Disengagement, penalty));
        }

        let raw: i32 = terms.iter().map(|(_, v)| v).sum();
        let multiplier = ctx.pacing.multiplier() * ctx.archetype.multiplier();
        ScoreBreakdown {
            contributions: terms,
            raw,
            multiplier,
            delta: scale_delta(raw, ctx.archetype, ctx.pacing),
        }
    }

    fn regress(&self, penalty: i32) -> i32 {
        if self.regression.enabled {
            penalty * REGRESSION_MULTIPLIER
        } else {
            penalty
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
