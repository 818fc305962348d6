//! Message analysis: one utterance in, a fixed record of signals out.
//!
//! Pure function of the text, the [`Mode`] and the [`ThoughtfulPolicy`]. The
//! keyword signals are computed in both modes; the structural signals
//! (question, history, length) only describe user turns and stay `false` for
//! generated text.

use crate::config::ThoughtfulPolicy;
use crate::lexicon::Category;

/// Messages shorter than this (in characters) count as short.
pub const SHORT_MESSAGE_CHARS: usize = 20;

/// Messages longer than this (in characters) can count as thoughtful.
pub const THOUGHTFUL_MESSAGE_CHARS: usize = 100;

/// Who produced the text being analyzed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// A message typed by the user.
    User,
    /// A message produced by the dialogue generator.
    Generated,
}

/// Classification of one utterance. Signals are independent; several may be set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// Contains a compliment keyword.
    pub compliment: bool,
    /// Contains romantic language.
    pub romantic: bool,
    /// Shows emotional vulnerability.
    pub vulnerability: bool,
    /// Contains an insult.
    pub rude: bool,
    /// Contains explicit sexual content.
    pub sexual: bool,
    /// Contains laughter or a joke marker.
    pub humor: bool,
    /// Contains a flirtation marker.
    pub flirtation: bool,
    /// Describes physical touch.
    pub touch: bool,
    /// Asks the character something (user mode only).
    pub asks_about_subject: bool,
    /// Refers back to earlier conversation (user mode only).
    pub references_history: bool,
    /// Shorter than [`SHORT_MESSAGE_CHARS`] (user mode only).
    pub is_short: bool,
    /// Long and well-formed per the [`ThoughtfulPolicy`] (user mode only).
    pub is_thoughtful: bool,
    /// Length in characters.
    pub length: usize,
    /// Space-separated word count.
    pub word_count: usize,
}

impl Signals {
    /// Romantic keywords or flirtation markers.
    pub fn romantic_language(&self) -> bool {
        self.romantic || self.flirtation
    }
}

/// Stateless classifier configured with a [`ThoughtfulPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageAnalyzer {
    policy: ThoughtfulPolicy,
}

impl MessageAnalyzer {
    /// Analyzer using `policy` for the thoughtful signal.
    pub fn new(policy: ThoughtfulPolicy) -> Self {
        Self { policy }
    }

    /// The configured thoughtful-message rule.
    pub fn policy(&self) -> ThoughtfulPolicy {
        self.policy
    }

    /// Classify `text`.
    pub fn analyze(&self, text: &str, mode: Mode) -> Signals {
        #[cfg(test)]
        if text.contains(FAULT_TRIGGER) {
            panic!("analyzer fault on {mode:?} text");
        }
        let lowered = text.to_lowercase();
        let length = text.chars().count();
        let mut signals = Signals {
            compliment: Category::Compliment.matches(&lowered),
            romantic: Category::Romantic.matches(&lowered),
            vulnerability: Category::Vulnerability.matches(&lowered),
            rude: Category::Rude.matches(&lowered),
            sexual: Category::Sexual.matches(&lowered),
            humor: Category::Humor.matches(&lowered),
            flirtation: Category::Flirtation.matches(&lowered),
            touch: Category::Touch.matches(&lowered),
            length,
            word_count: text.split(' ').count(),
            ..Signals::default()
        };

        if mode == Mode::User {
            let has_question_mark = text.contains('?');
            signals.asks_about_subject = has_question_mark && Category::Question.matches(&lowered);
            signals.references_history = Category::History.matches(&lowered);
            signals.is_short = length < SHORT_MESSAGE_CHARS;
            signals.is_thoughtful = length > THOUGHTFUL_MESSAGE_CHARS
                && match self.policy {
                    ThoughtfulPolicy::CourteousLength => !signals.rude,
                    ThoughtfulPolicy::InquisitiveLength => has_question_mark,
                };
        }

        signals
    }

    /// Shorthand for [`Mode::User`].
    pub fn analyze_user(&self, text: &str) -> Signals {
        self.analyze(text, Mode::User)
    }

    /// Shorthand for [`Mode::Generated`].
    pub fn analyze_generated(&self, text: &str) -> Signals {
        self.analyze(text, Mode::Generated)
    }
}

/// Text that makes the analyzer panic in unit tests, to exercise fault containment.
#[cfg(test)]
pub(crate) const FAULT_TRIGGER: &str = "\u{1}fault\u{1}";
