/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The hook surface: load, pre-generation, post-generation and branch restore.
//!
//! ```text
//! user text ──► command? ──yes──► Command::execute ──► COMMAND_DIRECTIVE + reply
//!                  │no
//!                  ▼
//!   MessageAnalyzer ─► ScoreCalculator ─► ProgressionLedger::apply
//!        ─► BoundaryEnforcer ─► UnlockTracker ─► DirectiveComposer
//!
//! generated text ─► MessageAnalyzer(generated) ─► ConsistencyEnforcer
//!        ─► rewrite? + correction? + emotional-moment bonus on a ledger copy
//! ```
//!
//! Hooks take ledgers and chat records by value and hand back the new ones.
//! Every hook returns; nothing here propagates an error or a panic to the host.
//! A fault inside the scoring or consistency pipeline is caught, logged, and
//! turned into a no-op turn carrying [`FALLBACK_DIRECTIVE`] and an
//! [`EngineError`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::analysis::{MessageAnalyzer, Signals};
use crate::boundary::{BoundaryEnforcer, Violation};
use crate::command::{self, Command};
use crate::config::EngineConfig;
use crate::consistency::{ConsistencyEnforcer, ConsistencyIssue, EmotionalMoment};
use crate::diagnostics::Diagnostics;
use crate::directive::{DirectiveComposer, COMMAND_DIRECTIVE, FALLBACK_DIRECTIVE};
use crate::error::{CommandError, EngineError};
use crate::ledger::{ChatRecord, MilestoneFlags, ProgressionLedger};
use crate::score::{RegressionPolicy, ScoreBreakdown, ScoreCalculator, ScoreContext};
use crate::snapshot::LedgerSnapshot;
use crate::unlock::{Behavior, UnlockReport, UnlockTracker};
use crate::validate::StateValidator;

// ─── Clock ──────────────────────────────────────────────────────────────────

/// Source of the current time in Unix milliseconds.
pub trait Clock {
    /// Now, in Unix milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

impl<F: Fn() -> i64> Clock for F {
    fn now_ms(&self) -> i64 {
        self()
    }
}

// ─── Hook outputs ───────────────────────────────────────────────────────────

/// Result of the load hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Ledger for the active branch.
    pub ledger: ProgressionLedger,
    /// Chat-wide record.
    pub record: ChatRecord,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<String>,
}

/// Result of the pre-generation hook.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Ledger after this turn.
    pub ledger: ProgressionLedger,
    /// Chat record after this turn.
    pub record: ChatRecord,
    /// Guidance for the generator.
    pub directive: String,
    /// Message shown to the user, if any.
    pub notice: Option<String>,
    /// Contained fault, if the turn was turned into a no-op.
    pub error: Option<EngineError>,
    /// Scoring detail. `None` for command turns and faults.
    pub breakdown: Option<ScoreBreakdown>,
    /// Boundary violations raised by the user's message.
    pub violations: Vec<Violation>,
    /// Unlock bookkeeping. `None` for command turns and faults.
    pub unlocks: Option<UnlockReport>,
}

impl TurnOutcome {
    /// `true` if this was a configuration command rather than conversation.
    pub fn is_command(&self) -> bool {
        self.directive == COMMAND_DIRECTIVE
    }
}

/// Result of the post-generation hook.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseOutcome {
    /// Copy of the input ledger, plus the emotional-moment bonus if earned.
    pub ledger: ProgressionLedger,
    /// Replacement text for the generated message, if it was rewritten.
    pub rewritten: Option<String>,
    /// Corrective directive for the next generation.
    pub correction: Option<String>,
    /// Message shown to the user, if any.
    pub notice: Option<String>,
    /// Consistency issues found.
    pub issues: Vec<ConsistencyIssue>,
    /// Emotional moments found.
    pub moments: Vec<EmotionalMoment>,
    /// Contained fault, if any.
    pub error: Option<EngineError>,
}

// Pure result of the user-turn pipeline, computed inside the fault boundary.
struct ScoredTurn {
    ledger: ProgressionLedger,
    record: ChatRecord,
    breakdown: ScoreBreakdown,
    stage_changed: bool,
    violations: Vec<Violation>,
    unlocks: UnlockReport,
    directive: String,
    notice: Option<String>,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// The progression and enforcement engine.
///
/// One engine serves any number of chats; all per-chat state lives in the
/// ledgers and records passed through the hooks.
#[derive(Debug)]
pub struct Engine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    analyzer: MessageAnalyzer,
    calculator: ScoreCalculator,
    unlocks: UnlockTracker,
    boundary: BoundaryEnforcer,
    consistency: ConsistencyEnforcer,
    composer: DirectiveComposer,
    validator: StateValidator,
    diagnostics: Diagnostics,
}

impl Engine<SystemClock> {
    /// Engine on wall-clock time.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for Engine<SystemClock> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Clock> Engine<C> {
    /// Engine reading time from `clock`.
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let regression = RegressionPolicy {
            enabled: config.regression_enabled,
            include_disengagement: config.regress_disengagement,
        };
        Self {
            analyzer: MessageAnalyzer::new(config.thoughtful_policy),
            calculator: ScoreCalculator::new(regression),
            unlocks: UnlockTracker::new(),
            boundary: BoundaryEnforcer::new(),
            consistency: ConsistencyEnforcer::new(config.consistency_policy),
            composer: DirectiveComposer::new(),
            validator: StateValidator::new(),
            diagnostics: Diagnostics::new(config.verbose_logging),
            config,
            clock,
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recent diagnostic lines.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access to the diagnostics, e.g. to clear them.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    // ── Load / restore ─────────────────────────────────────────────────────

    /// Initialise state for a chat.
    ///
    /// `character_count == 0` is reported as a warning and loading proceeds.
    /// Missing state starts fresh; present state is repaired.
    pub fn load(
        &mut self,
        character_count: usize,
        snapshot: Option<&LedgerSnapshot>,
        record: Option<ChatRecord>,
    ) -> LoadOutcome {
        let mut warnings = Vec::new();
        if character_count == 0 {
            let msg = "no characters configured, continuing with default state";
            self.diagnostics.warn(msg);
            warnings.push(msg.to_string());
        }

        let ledger = match snapshot {
            Some(snapshot) => self.restore(snapshot),
            None => ProgressionLedger::new(self.clock.now_ms()),
        };

        let mut record = record
            .map(|r| self.validator.repair_chat_record(r))
            .unwrap_or_default();
        record.observe_affection(ledger.affection());

        tracing::info!(
            characters = character_count,
            affection = ledger.affection(),
            stage = %ledger.stage(),
            topics = record.topic_count(),
            "state loaded"
        );

        LoadOutcome { ledger, record, warnings }
    }

    /// Replace the ledger for a branch switch. Never fails.
    pub fn restore(&mut self, snapshot: &LedgerSnapshot) -> ProgressionLedger {
        let repaired = self.validator.repair(snapshot, self.clock.now_ms());
        for repair in &repaired.repairs {
            self.diagnostics.warn(format!("restore: {repair}"));
        }
        self.diagnostics.trace(format!(
            "restored ledger: affection {}, stage {}",
            repaired.ledger.affection(),
            repaired.ledger.stage()
        ));
        repaired.ledger
    }

    // ── Pre-generation ─────────────────────────────────────────────────────

    /// Process one user turn.
    pub fn before_prompt(
        &mut self,
        ledger: ProgressionLedger,
        record: ChatRecord,
        text: &str,
    ) -> TurnOutcome {
        if let Some(parsed) = command::detect(text) {
            return self.handle_command(ledger, record, parsed);
        }

        let now = self.clock.now_ms();
        let scored = catch_unwind(AssertUnwindSafe(|| self.score_turn(&ledger, &record, text, now)));

        match scored {
            Ok(turn) => {
                self.log_turn(&turn);
                TurnOutcome {
                    ledger: turn.ledger,
                    record: turn.record,
                    directive: turn.directive,
                    notice: turn.notice,
                    error: None,
                    breakdown: Some(turn.breakdown),
                    violations: turn.violations,
                    unlocks: Some(turn.unlocks),
                }
            }
            Err(payload) => {
                let error = self.contain("user turn", payload);
                TurnOutcome {
                    ledger,
                    record,
                    directive: FALLBACK_DIRECTIVE.to_string(),
                    notice: None,
                    error: Some(error),
                    breakdown: None,
                    violations: Vec::new(),
                    unlocks: None,
                }
            }
        }
    }

    /// Apply an already-parsed command. Unparseable commands become a notice.
    pub fn handle_command(
        &mut self,
        mut ledger: ProgressionLedger,
        record: ChatRecord,
        parsed: Result<Command, CommandError>,
    ) -> TurnOutcome {
        let notice = match parsed {
            Ok(cmd) => {
                self.diagnostics.trace(format!("command: {cmd:?}"));
                cmd.execute(&mut ledger, &record, self.config.show_progress_ui)
            }
            Err(err) => {
                self.diagnostics.warn(format!("command rejected: {err}"));
                command::error_notice(&err)
            }
        };
        TurnOutcome {
            ledger,
            record,
            directive: COMMAND_DIRECTIVE.to_string(),
            notice: Some(notice),
            error: None,
            breakdown: None,
            violations: Vec::new(),
            unlocks: None,
        }
    }

    fn score_turn(
        &self,
        ledger: &ProgressionLedger,
        record: &ChatRecord,
        text: &str,
        now: i64,
    ) -> ScoredTurn {
        let signals = self.analyzer.analyze_user(text);
        let ctx = ScoreContext {
            affection: ledger.affection(),
            messages_this_session: ledger.messages_this_session(),
            session_elapsed_ms: ledger.session_elapsed_ms(now),
            archetype: ledger.archetype(),
            pacing: ledger.pacing(),
        };
        let breakdown = self.calculator.score(&signals, &ctx);

        let mut ledger = ledger.clone();
        let mut record = record.clone();
        let transition = ledger.apply(breakdown.delta, now, &mut record);
        ledger.record_turn(now);
        ledger.raise_flags(user_milestones(&signals, ledger.affection()));

        let boundary = self.boundary.check(&signals, ledger.affection());
        let unlocks = self.unlocks.update(ledger.affection(), ledger.stage(), &mut record);
        let directive = self.composer.compose(
            ledger.stage(),
            ledger.archetype(),
            boundary.redirect(),
            &unlocks.behaviors,
            &unlocks.topics,
        );

        ScoredTurn {
            ledger,
            record,
            breakdown,
            stage_changed: transition.changed(),
            notice: boundary.notice().map(str::to_string),
            violations: boundary.violations,
            unlocks,
            directive,
        }
    }

    fn log_turn(&mut self, turn: &ScoredTurn) {
        let affection = turn.ledger.affection();
        let stage = turn.ledger.stage();
        if self.diagnostics.is_verbose() {
            tracing::info!(affection, stage = %stage, delta = turn.breakdown.delta, "user turn scored");
        } else {
            tracing::debug!(affection, stage = %stage, delta = turn.breakdown.delta, "user turn scored");
        }
        self.diagnostics.remember(format!(
            "user turn: delta {:+} (raw {:+} x {:.2}), affection {affection}, stage {stage}",
            turn.breakdown.delta, turn.breakdown.raw, turn.breakdown.multiplier
        ));
        if turn.stage_changed {
            self.diagnostics.trace(format!("stage changed to {stage}"));
        }
        for topic in &turn.unlocks.newly_unlocked_topics {
            self.diagnostics.trace(format!("topic unlocked: {}", topic.label()));
        }
        if !turn.violations.is_empty() {
            let tags: Vec<&str> = turn.violations.iter().map(|v| v.as_str()).collect();
            self.diagnostics.trace(format!("boundary: {}", tags.join(", ")));
        }
    }

    // ── Post-generation ────────────────────────────────────────────────────

    /// Check one generated message against `ledger`.
    ///
    /// The input ledger is not modified. The returned copy carries the
    /// emotional-moment bonus, with its stage re-derived; counters are untouched.
    pub fn after_response(&mut self, ledger: &ProgressionLedger, text: &str) -> ResponseOutcome {
        let checked = catch_unwind(AssertUnwindSafe(|| {
            let signals = self.analyzer.analyze_generated(text);
            let report = self.consistency.enforce(text, &signals, ledger.affection());
            let mut copy = ledger.with_bonus(report.bonus());
            copy.raise_flags(generated_milestones(&signals, ledger.affection()));
            (copy, report)
        }));

        match checked {
            Ok((copy, report)) => {
                if !report.is_appropriate() {
                    let tags: Vec<&str> = report.issues.iter().map(|i| i.as_str()).collect();
                    self.diagnostics.warn(format!("generated text too forward: {}", tags.join(", ")));
                }
                if let Some(moment) = report.moments.first() {
                    self.diagnostics.trace(format!("emotional moment: {}", moment.description()));
                }
                ResponseOutcome {
                    ledger: copy,
                    notice: report.notice(),
                    rewritten: report.rewritten,
                    correction: report.correction,
                    issues: report.issues,
                    moments: report.moments,
                    error: None,
                }
            }
            Err(payload) => {
                let error = self.contain("generated turn", payload);
                ResponseOutcome {
                    ledger: ledger.clone(),
                    rewritten: None,
                    correction: None,
                    notice: None,
                    issues: Vec::new(),
                    moments: Vec::new(),
                    error: Some(error),
                }
            }
        }
    }

    fn contain(&mut self, stage: &'static str, payload: Box<dyn std::any::Any + Send>) -> EngineError {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let error = EngineError::Fault { stage, message };
        self.diagnostics.fault(error.to_string());
        error
    }
}

fn user_milestones(signals: &Signals, affection: i32) -> MilestoneFlags {
    MilestoneFlags {
        first_compliment: signals.compliment,
        shared_vulnerability: signals.vulnerability,
        had_argument: signals.rude,
        confessed_feelings: signals.romantic
            && Behavior::RomanticConfession.is_unlocked_at(affection),
        first_physical_contact: false,
    }
}

fn generated_milestones(signals: &Signals, affection: i32) -> MilestoneFlags {
    MilestoneFlags {
        first_physical_contact: signals.touch
            && Behavior::ComfortableTouch.is_unlocked_at(affection),
        ..MilestoneFlags::default()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{DEFLECTION_NOTICE, REDIRECT_DIRECTIVE};
    use crate::stage::{Archetype, Pacing, Stage};

    fn engine() -> Engine<fn() -> i64> {
        fn fixed() -> i64 {
            1_000_000
        }
        Engine::with_clock(EngineConfig::default(), fixed as fn() -> i64)
    }

    fn confident_fast() -> ProgressionLedger {
        ProgressionLedger::new(1_000_000)
            .with_archetype(Archetype::Confident)
            .with_pacing(Pacing::Fast)
    }

    // ── User turns ───────────────────────────────────────────────────────

    #[test]
    fn test_compliment_with_romance_from_zero() {
        let mut e = engine();
        let out = e.before_prompt(
            confident_fast(),
            ChatRecord::new(),
            "You're beautiful and I love talking to you",
        );
        assert_eq!(out.ledger.affection(), 11);
        assert_eq!(out.ledger.stage(), Stage::Strangers);
        assert_eq!(out.violations, vec![Violation::RomanticIntentTooEarly]);
        assert_eq!(out.notice.as_deref(), Some(DEFLECTION_NOTICE));
        assert!(out.directive.contains(REDIRECT_DIRECTIVE));
        assert!(out.ledger.flags().first_compliment);
        assert!(out.error.is_none());
    }

    #[test]
    fn test_counters_advance_once_per_turn() {
        let mut e = engine();
        let out = e.before_prompt(confident_fast(), ChatRecord::new(), "hello");
        assert_eq!(out.ledger.interaction_count(), 1);
        assert_eq!(out.ledger.messages_this_session(), 1);
        assert_eq!(out.ledger.last_interaction_ms(), 1_000_000);
    }

    #[test]
    fn test_clean_turn_has_no_notice() {
        let mut e = engine();
        let out = e.before_prompt(confident_fast(), ChatRecord::new(), "What do you do for fun?");
        assert!(out.notice.is_none());
        assert!(!out.directive.contains(REDIRECT_DIRECTIVE));
        assert!(out.breakdown.is_some());
    }

    // ── Commands ─────────────────────────────────────────────────────────

    #[test]
    fn test_command_turn_is_not_scored() {
        let mut e = engine();
        let out = e.before_prompt(confident_fast(), ChatRecord::new(), "((set pacing glacial))");
        assert!(out.is_command());
        assert_eq!(out.ledger.pacing(), Pacing::Glacial);
        assert_eq!(out.ledger.affection(), 0);
        assert_eq!(out.ledger.interaction_count(), 0);
        assert!(out.notice.is_some());
    }

    #[test]
    fn test_bad_command_is_a_notice() {
        let mut e = engine();
        let out = e.before_prompt(confident_fast(), ChatRecord::new(), "((set archetype robot))");
        assert!(out.is_command());
        assert!(out.error.is_none());
        assert!(out.notice.unwrap_or_default().contains("unknown archetype 'robot'"));
    }

    // ── Generated turns ──────────────────────────────────────────────────

    #[test]
    fn test_after_response_bonus_on_copy_only() {
        let mut e = engine();
        let ledger = confident_fast().with_affection(35);
        let out = e.after_response(&ledger, "I've been scared to say this.");
        assert_eq!(ledger.affection(), 35);
        assert_eq!(out.ledger.affection(), 37);
        assert_eq!(out.ledger.stage(), Stage::Acquaintances);
        assert_eq!(out.ledger.interaction_count(), ledger.interaction_count());
        assert_eq!(out.notice.as_deref(), Some("[Character shared something vulnerable]"));
    }

    #[test]
    fn test_after_response_rewrites_forward_text() {
        let mut e = engine();
        let out = e.after_response(&confident_fast(), "She leans in, talking about sex.");
        assert_eq!(out.issues, vec![ConsistencyIssue::SexualContentTooEarly]);
        assert_eq!(out.rewritten.as_deref(), Some("She leans in, talking about ...."));
        assert!(out.correction.is_some());
    }

    // ── Faults ───────────────────────────────────────────────────────────

    #[test]
    fn test_user_turn_fault_is_a_no_op() {
        let mut e = engine();
        let ledger = confident_fast().with_affection(90);
        let mut record = ChatRecord::new();
        record.unlock_topic(crate::unlock::Topic::FamilyBackground);

        let text = format!("You're lovely {}", crate::analysis::FAULT_TRIGGER);
        let out = e.before_prompt(ledger.clone(), record.clone(), &text);

        assert_eq!(out.ledger, ledger);
        assert_eq!(out.record, record);
        assert_eq!(out.directive, FALLBACK_DIRECTIVE);
        assert!(out.notice.is_none());
        assert!(out.breakdown.is_none());
        match out.error {
            Some(EngineError::Fault { stage, ref message }) => {
                assert_eq!(stage, "user turn");
                assert!(message.contains("analyzer fault"), "got {message}");
            }
            ref other => panic!("expected a fault, got {other:?}"),
        }
        let last = e.diagnostics().last().unwrap_or_default();
        assert!(last.starts_with("fault: "), "got {last}");
    }

    #[test]
    fn test_generated_turn_fault_returns_ledger_unchanged() {
        let mut e = engine();
        let ledger = confident_fast().with_affection(150);
        let out = e.after_response(&ledger, crate::analysis::FAULT_TRIGGER);

        assert_eq!(out.ledger, ledger);
        assert!(out.rewritten.is_none());
        assert!(out.correction.is_none());
        assert!(matches!(out.error, Some(EngineError::Fault { stage: "generated turn", .. })));

        // The engine keeps working after a contained fault.
        let next = e.before_prompt(ledger, ChatRecord::new(), "How was your day?");
        assert!(next.error.is_none());
    }

    // ── Load / restore ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_zero_characters_warns() {
        let mut e = engine();
        let out = e.load(0, None, None);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.ledger, ProgressionLedger::new(1_000_000));
        assert!(e.diagnostics().recent().iter().any(|l| l.starts_with("warning:")));
    }

    #[test]
    fn test_restore_logs_repairs() {
        let mut e = engine();
        let snapshot = LedgerSnapshot { archetype: Some("robot".into()), ..LedgerSnapshot::new() };
        let ledger = e.restore(&snapshot);
        assert_eq!(ledger.archetype(), Archetype::Guarded);
        assert!(e.diagnostics().recent().iter().any(|l| l.contains("archetype")));
    }
}
