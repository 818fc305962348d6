//! In-chat configuration commands.
//!
//! A user turn whose whole text is wrapped in double parentheses is a command,
//! not conversation. It is never scored. Recognised forms:
//!
//! ```text
//! ((stage help))
//! ((stage options))
//! ((stage status))
//! ((set archetype <tsundere|shy|confident|guarded>))
//! ((set pacing <glacial|slow|moderate|fast>))
//! ```
//!
//! Anything else inside the brackets is a [`CommandError`], which the engine
//! turns into an explanatory notice.

use core::str::FromStr;

use crate::error::CommandError;
use crate::ledger::{ChatRecord, ProgressionLedger};
use crate::report::ProgressReport;
use crate::stage::{Archetype, Pacing};

const OPEN: &str = "((";
const CLOSE: &str = "))";

/// A parsed configuration command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the commands.
    Help,
    /// List archetypes and pacing presets.
    Options,
    /// Show the progress report.
    Status,
    /// Change the archetype.
    SetArchetype(Archetype),
    /// Change the pacing.
    SetPacing(Pacing),
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse the text between the brackets, e.g. `set pacing fast`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        match words.as_slice() {
            ["stage", "help"] => Ok(Command::Help),
            ["stage", "options"] => Ok(Command::Options),
            ["stage", "status"] => Ok(Command::Status),
            ["set", "archetype"] => Err(CommandError::MissingValue("archetype")),
            ["set", "pacing"] => Err(CommandError::MissingValue("pacing")),
            ["set", "archetype", value] => Ok(Command::SetArchetype(value.parse()?)),
            ["set", "pacing", value] => Ok(Command::SetPacing(value.parse()?)),
            _ => Err(CommandError::Unknown(s.trim().to_string())),
        }
    }
}

/// Detect a command in a user turn.
///
/// `None` if the text is ordinary conversation; `Some(Err(_))` if it is
/// bracketed but not understood.
pub fn detect(text: &str) -> Option<Result<Command, CommandError>> {
    let inner = text.trim().strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    Some(inner.parse())
}

impl Command {
    /// Apply the command to `ledger` and return the reply shown to the user.
    ///
    /// With `show_progress_ui` off, `status` replies with a one-line summary.
    pub fn execute(
        self,
        ledger: &mut ProgressionLedger,
        record: &ChatRecord,
        show_progress_ui: bool,
    ) -> String {
        match self {
            Command::Help => help_text(),
            Command::Options => options_text(),
            Command::Status => {
                let report = ProgressReport::new(ledger, record);
                if show_progress_ui {
                    format!("[{}]", report.to_string().trim_end())
                } else {
                    format!("[{}]", report.short_line())
                }
            }
            Command::SetArchetype(archetype) => {
                ledger.set_archetype(archetype);
                format!("[Character archetype set to {archetype}: {}]", archetype.description())
            }
            Command::SetPacing(pacing) => {
                ledger.set_pacing(pacing);
                format!("[Pacing set to {pacing}: {}]", pacing.description())
            }
        }
    }
}

/// Reply for a command that could not be understood.
pub fn error_notice(err: &CommandError) -> String {
    format!("[Command not understood: {err}. Type ((stage help)) for the list of commands.]")
}

fn help_text() -> String {
    [
        "[Slow Burn commands:",
        "((stage status)) shows relationship progress",
        "((stage options)) lists archetypes and pacing speeds",
        "((set archetype <name>)) changes the character archetype",
        "((set pacing <name>)) changes the progression speed]",
    ]
    .join("\n")
}

fn options_text() -> String {
    let mut lines = vec!["[Archetypes:".to_string()];
    lines.extend(Archetype::ALL.iter().map(|a| format!("  {a}: {}", a.description())));
    lines.push("Pacing:".to_string());
    lines.extend(Pacing::ALL.iter().map(|p| format!("  {p}: {}", p.description())));
    let mut text = lines.join("\n");
    text.push(']');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseEnumError;

    // ── Parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(detect("hello there").is_none());
        assert!(detect("(just an aside)").is_none());
        assert!(detect("((unclosed").is_none());
    }

    #[test]
    fn test_known_commands() {
        assert_eq!(detect("((stage help))"), Some(Ok(Command::Help)));
        assert_eq!(detect("  ((Stage Options))  "), Some(Ok(Command::Options)));
        assert_eq!(detect("((stage status))"), Some(Ok(Command::Status)));
        assert_eq!(
            detect("((set archetype Tsundere))"),
            Some(Ok(Command::SetArchetype(Archetype::Tsundere)))
        );
        assert_eq!(detect("((set pacing fast))"), Some(Ok(Command::SetPacing(Pacing::Fast))));
    }

    #[test]
    fn test_bad_commands_are_errors_not_none() {
        assert_eq!(
            detect("((dance))"),
            Some(Err(CommandError::Unknown("dance".into())))
        );
        assert_eq!(
            detect("((set pacing warp))"),
            Some(Err(CommandError::InvalidValue(ParseEnumError::new("pacing", "warp"))))
        );
        assert_eq!(detect("((set archetype))"), Some(Err(CommandError::MissingValue("archetype"))));
    }

    // ── Effects ──────────────────────────────────────────────────────────

    #[test]
    fn test_set_changes_presets_not_affection() {
        let mut ledger = ProgressionLedger::new(0).with_affection(60);
        let reply = Command::SetArchetype(Archetype::Shy).execute(&mut ledger, &ChatRecord::new(), true);
        assert_eq!(ledger.archetype(), Archetype::Shy);
        assert_eq!(ledger.affection(), 60);
        assert!(reply.contains("shy"));

        Command::SetPacing(Pacing::Glacial).execute(&mut ledger, &ChatRecord::new(), true);
        assert_eq!(ledger.pacing(), Pacing::Glacial);
    }

    #[test]
    fn test_status_respects_progress_ui() {
        let mut ledger = ProgressionLedger::new(0);
        let full = Command::Status.execute(&mut ledger, &ChatRecord::new(), true);
        let short = Command::Status.execute(&mut ledger, &ChatRecord::new(), false);
        assert!(full.contains("Relationship Progress"));
        assert!(!short.contains('\n'));
        assert!(short.starts_with("[Stage:"));
    }

    #[test]
    fn test_options_lists_every_preset() {
        let text = options_text();
        for a in Archetype::ALL {
            assert!(text.contains(a.as_str()));
        }
        for p in Pacing::ALL {
            assert!(text.contains(p.as_str()));
        }
    }

    #[test]
    fn test_error_notice_points_to_help() {
        let n = error_notice(&CommandError::Unknown("dance".into()));
        assert!(n.contains("unknown command 'dance'"));
        assert!(n.contains("((stage help))"));
    }
}
