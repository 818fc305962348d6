//! Engine configuration.
//!
//! Everything here is fixed when the [`Engine`](crate::engine::Engine) is built.
//! There is no process-wide mutable state; two engines with different configs can
//! run side by side.

/// How the analyzer decides that a user message is "thoughtful".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThoughtfulPolicy {
    /// Longer than the threshold and free of rude markers.
    #[default]
    CourteousLength,
    /// Longer than the threshold and contains a question mark.
    InquisitiveLength,
}

/// What to do with generated text that outruns the current unlocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConsistencyPolicy {
    /// Leave the text alone; only emit a corrective directive for the next turn.
    DeferToNextTurn,
    /// Also mask explicit keywords in the returned text.
    #[default]
    RewriteExplicit,
}

/// Policy configuration for one engine.
///
/// Defaults: regression on, progress UI on, verbose logging off,
/// [`ThoughtfulPolicy::CourteousLength`], [`ConsistencyPolicy::RewriteExplicit`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Double the rudeness and boundary-pushing penalties.
    pub regression_enabled: bool,
    /// Also double the disengagement penalty when regression is on.
    pub regress_disengagement: bool,
    /// Whether the status command prints the full progress report.
    pub show_progress_ui: bool,
    /// Emit per-turn summaries at `info` instead of `debug`.
    pub verbose_logging: bool,
    /// Rule for the "thoughtful message" signal.
    pub thoughtful_policy: ThoughtfulPolicy,
    /// Handling of out-of-stage generated text.
    pub consistency_policy: ConsistencyPolicy,
}

impl EngineConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable penalty regression.
    pub fn with_regression(mut self, enabled: bool) -> Self {
        self.regression_enabled = enabled;
        self
    }

    /// Include the disengagement penalty in regression doubling.
    pub fn with_regress_disengagement(mut self, enabled: bool) -> Self {
        self.regress_disengagement = enabled;
        self
    }

    /// Show or hide the progress report.
    pub fn with_progress_ui(mut self, show: bool) -> Self {
        self.show_progress_ui = show;
        self
    }

    /// Toggle verbose logging.
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// Select the thoughtful-message rule.
    pub fn with_thoughtful_policy(mut self, policy: ThoughtfulPolicy) -> Self {
        self.thoughtful_policy = policy;
        self
    }

    /// Select the generated-text consistency policy.
    pub fn with_consistency_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.consistency_policy = policy;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regression_enabled: true,
            regress_disengagement: false,
            show_progress_ui: true,
            verbose_logging: false,
            thoughtful_policy: ThoughtfulPolicy::default(),
            consistency_policy: ConsistencyPolicy::default(),
        }
    }
}
