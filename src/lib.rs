//! # slow-burn-core
//!
//! Turn-by-turn relationship progression and content enforcement for a
//! conversational character.
//!
//! ---
//!
//! ## Affection is earned, one exchange at a time
//!
//! Every user message is classified by keyword, scored, and folded into a single
//! bounded **affection** value in `[0, 250]`. Affection alone determines the
//! relationship **stage**, from strangers to romance. Nothing sets the stage
//! directly.
//!
//! **Presets change speed, never structure.** A character archetype (tsundere,
//! shy, confident, guarded) and a pacing preset (glacial to fast) multiply every
//! delta. The thresholds stay where they are.
//!
//! **Enforcement redirects, it does not refuse.** A user reaching for content the
//! relationship has not earned gets a gentle deflection notice, and the generator
//! is told to redirect. Generated text that runs ahead is masked and corrected on
//! the next turn.
//!
//! **Some things are permanent.** Topics the character has opened up about stay
//! open for the life of the chat, even if affection later falls. Behaviors do not.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! user text → MessageAnalyzer → ScoreCalculator → ProgressionLedger::apply
//!                                                        ↓
//!             DirectiveComposer ← UnlockTracker ← BoundaryEnforcer
//!
//! generated text → MessageAnalyzer → ConsistencyEnforcer → rewrite / correction / bonus
//!
//! stored snapshot → StateValidator → ProgressionLedger
//! ```
//!
//! [`Engine`] wires these together behind four hooks: [`Engine::load`],
//! [`Engine::before_prompt`], [`Engine::after_response`] and [`Engine::restore`].
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`lexicon`] | [`Category`] | Keyword tables per signal category |
//! | [`analysis`] | [`MessageAnalyzer`], [`Signals`] | Classify one utterance |
//! | [`score`] | [`ScoreCalculator`], [`ScoreBreakdown`] | Signals to signed affection delta |
//! | [`stage`] | [`Stage`], [`Archetype`], [`Pacing`] | Stage thresholds and speed presets |
//! | [`ledger`] | [`ProgressionLedger`], [`ChatRecord`] | Authoritative state and transition rule |
//! | [`unlock`] | [`UnlockTracker`], [`Topic`], [`Behavior`] | Permanent topics, transient behaviors, growth |
//! | [`boundary`] | [`BoundaryEnforcer`] | User content that outruns unlocks |
//! | [`consistency`] | [`ConsistencyEnforcer`] | Generated content that outruns unlocks |
//! | [`directive`] | [`DirectiveComposer`] | Guidance string for the generator |
//! | [`snapshot`] | [`LedgerSnapshot`] | Untrusted persisted ledger |
//! | [`validate`] | [`StateValidator`] | Snapshot repair; never fails |
//! | [`command`] | [`Command`] | `((stage status))`-style configuration commands |
//! | [`report`] | [`ProgressReport`] | Progress summary for the status command |
//! | [`engine`] | [`Engine`], [`Clock`] | Hook surface with fault containment |
//! | [`diagnostics`] | [`Diagnostics`] | `tracing` events plus a bounded recent-line ring |
//! | [`config`] | [`EngineConfig`] | Policy switches, fixed at construction |
//!
//! ## Features
//!
//! - `serde`: serialisation for [`LedgerSnapshot`], [`ChatRecord`] and [`EngineConfig`].
//! - `python-ffi`: PyO3 bindings with JSON in and out (implies `serde`).
//!
//! ## License
//!
//! Business Source License 1.1.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod analysis;
pub mod boundary;
pub mod command;
pub mod config;
pub mod consistency;
pub mod diagnostics;
pub mod directive;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lexicon;
pub mod report;
pub mod score;
pub mod snapshot;
pub mod stage;
pub mod unlock;
pub mod validate;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use analysis::{MessageAnalyzer, Mode, Signals};
pub use boundary::{BoundaryEnforcer, BoundaryReport, Violation};
pub use command::Command;
pub use config::{ConsistencyPolicy, EngineConfig, ThoughtfulPolicy};
pub use consistency::{ConsistencyEnforcer, ConsistencyIssue, ConsistencyReport, EmotionalMoment};
pub use diagnostics::Diagnostics;
pub use directive::DirectiveComposer;
pub use engine::{Clock, Engine, LoadOutcome, ResponseOutcome, SystemClock, TurnOutcome};
pub use error::{CommandError, EngineError, ParseEnumError};
pub use ledger::{ChatRecord, MilestoneFlags, ProgressionLedger, SignificantEvent};
pub use lexicon::Category;
pub use report::ProgressReport;
pub use score::{ScoreBreakdown, ScoreCalculator};
pub use snapshot::LedgerSnapshot;
pub use stage::{Archetype, Pacing, Stage, MAX_AFFECTION};
pub use unlock::{Behavior, Topic, UnlockReport, UnlockTracker};
pub use validate::StateValidator;
