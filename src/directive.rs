//! Directive composition.
//!
//! The directive is the only channel from the engine to the generator. It is a
//! single space-joined string of, in order: stage instruction, archetype
//! instruction, redirect instruction (iff a boundary was crossed), unlocked
//! behaviors (iff any), unlocked topics (iff any).

use crate::stage::{Archetype, Stage};
use crate::unlock::{Behavior, Topic};

/// Directive for a turn whose pipeline faulted.
pub const FALLBACK_DIRECTIVE: &str =
    "Continue the conversation naturally, staying consistent with the relationship so far.";

/// Directive for a configuration-command turn.
pub const COMMAND_DIRECTIVE: &str = "User is configuring the stage. Do not respond to this message.";

/// Renders ledger and enforcement results into generator guidance.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectiveComposer;

impl DirectiveComposer {
    /// Construct a composer.
    pub fn new() -> Self {
        Self
    }

    /// Compose the directive for one user turn.
    pub fn compose(
        &self,
        stage: Stage,
        archetype: Archetype,
        redirect: Option<&str>,
        behaviors: &[Behavior],
        topics: &[Topic],
    ) -> String {
        let mut parts: Vec<String> = vec![stage.directive().to_string(), archetype.directive().to_string()];

        if let Some(redirect) = redirect {
            parts.push(redirect.to_string());
        }
        if !behaviors.is_empty() {
            let labels: Vec<&str> = behaviors.iter().map(|b| b.label()).collect();
            parts.push(format!("Unlocked behaviors: {}", labels.join(", ")));
        }
        if !topics.is_empty() {
            let labels: Vec<&str> = topics.iter().map(|t| t.label()).collect();
            parts.push(format!("Unlocked topics: {}", labels.join(", ")));
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::REDIRECT_DIRECTIVE;

    #[test]
    fn test_minimal_directive_is_stage_then_archetype() {
        let d = DirectiveComposer::new().compose(Stage::Strangers, Archetype::Guarded, None, &[], &[]);
        assert_eq!(
            d,
            format!("{} {}", Stage::Strangers.directive(), Archetype::Guarded.directive())
        );
    }

    #[test]
    fn test_full_directive_order() {
        let d = DirectiveComposer::new().compose(
            Stage::CloseFriends,
            Archetype::Shy,
            Some(REDIRECT_DIRECTIVE),
            &[Behavior::FlirtyBanter, Behavior::ComfortableTouch],
            &[Topic::FamilyBackground, Topic::DreamsAndGoals],
        );
        let stage = d.find(Stage::CloseFriends.directive()).unwrap();
        let archetype = d.find(Archetype::Shy.directive()).unwrap();
        let redirect = d.find(REDIRECT_DIRECTIVE).unwrap();
        let behaviors = d.find("Unlocked behaviors: flirty banter, comfortable touch").unwrap();
        let topics = d.find("Unlocked topics: family background, dreams and goals").unwrap();
        assert!(stage < archetype && archetype < redirect);
        assert!(redirect < behaviors && behaviors < topics);
    }

    #[test]
    fn test_topics_without_behaviors() {
        let d = DirectiveComposer::new().compose(
            Stage::Friends,
            Archetype::Confident,
            None,
            &[],
            &[Topic::FamilyBackground],
        );
        assert!(!d.contains("Unlocked behaviors"));
        assert!(d.ends_with("Unlocked topics: family background"));
    }
}
