/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Relationship stages and the two persona presets that modulate progression speed.
//!
//! - [`Stage`]: seven ordered relationship stages, a pure step function of affection.
//! - [`Archetype`]: character personality preset. Speed multiplier and tone directive.
//! - [`Pacing`]: user-selected speed preset. A second, independent multiplier.
//!
//! Every table in this module is an exhaustive `match`, so adding a variant
//! forces each threshold, multiplier and directive to be filled in.
//!
//! # Invariants
//!
//! - Stage thresholds are strictly ascending and the lowest is 0.
//! - `Stage::from_affection` is non-decreasing in affection.
//! - Presets modulate deltas, never the stage structure.

use core::fmt;
use core::str::FromStr;

use crate::error::ParseEnumError;

/// Upper bound of the affection scale. The lower bound is 0.
pub const MAX_AFFECTION: i32 = 250;

/// Clamp a raw affection value into `[0, MAX_AFFECTION]`.
pub fn clamp_affection(value: i64) -> i32 {
    value.clamp(0, MAX_AFFECTION as i64) as i32
}

// ─── Stage ──────────────────────────────────────────────────────────────────

/// Relationship stage derived from affection.
///
/// ```text
///   0 ─ Strangers
///  36 ─ Acquaintances
///  71 ─ Friends
/// 106 ─ GoodFriends
/// 141 ─ CloseFriends
/// 176 ─ RomanticTension
/// 211 ─ Romance        (… 250)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    /// Just met. Polite but distant.
    #[default]
    Strangers,
    /// Warming up; cautious interest.
    Acquaintances,
    /// Comfortable talking; opinions and interests shared.
    Friends,
    /// Trust established; personal thoughts shared.
    GoodFriends,
    /// Very close; vulnerabilities shared.
    CloseFriends,
    /// Clear attraction; flirtation and romantic subtext allowed.
    RomanticTension,
    /// An open romantic relationship.
    Romance,
}

impl Stage {
    /// All stages in ascending order.
    pub const ALL: [Stage; 7] = [
        Stage::Strangers,
        Stage::Acquaintances,
        Stage::Friends,
        Stage::GoodFriends,
        Stage::CloseFriends,
        Stage::RomanticTension,
        Stage::Romance,
    ];

    /// Minimum affection at which this stage begins.
    pub const fn threshold(self) -> i32 {
        match self {
            Stage::Strangers => 0,
            Stage::Acquaintances => 36,
            Stage::Friends => 71,
            Stage::GoodFriends => 106,
            Stage::CloseFriends => 141,
            Stage::RomanticTension => 176,
            Stage::Romance => 211,
        }
    }

    /// The stage for an affection value: the highest threshold not exceeding it.
    ///
    /// Values outside `[0, MAX_AFFECTION]` are clamped first.
    pub fn from_affection(affection: i32) -> Stage {
        let affection = clamp_affection(affection as i64);
        Stage::ALL
            .iter()
            .rev()
            .copied()
            .find(|stage| affection >= stage.threshold())
            .unwrap_or(Stage::Strangers)
    }

    /// The next stage up, or `None` at [`Stage::Romance`].
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Strangers => Some(Stage::Acquaintances),
            Stage::Acquaintances => Some(Stage::Friends),
            Stage::Friends => Some(Stage::GoodFriends),
            Stage::GoodFriends => Some(Stage::CloseFriends),
            Stage::CloseFriends => Some(Stage::RomanticTension),
            Stage::RomanticTension => Some(Stage::Romance),
            Stage::Romance => None,
        }
    }

    /// Affection at which the next stage begins (`MAX_AFFECTION` for the last stage).
    pub fn ceiling(self) -> i32 {
        self.next().map_or(MAX_AFFECTION, Stage::threshold)
    }

    /// Contribution of this stage to the character growth level.
    pub const fn growth_bonus(self) -> u8 {
        match self {
            Stage::Strangers => 0,
            Stage::Acquaintances => 5,
            Stage::Friends => 10,
            Stage::GoodFriends => 15,
            Stage::CloseFriends => 20,
            Stage::RomanticTension => 25,
            Stage::Romance => 30,
        }
    }

    /// Stable snake_case identifier, used in persisted snapshots and event names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Strangers => "strangers",
            Stage::Acquaintances => "acquaintances",
            Stage::Friends => "friends",
            Stage::GoodFriends => "good_friends",
            Stage::CloseFriends => "close_friends",
            Stage::RomanticTension => "romantic_tension",
            Stage::Romance => "romance",
        }
    }

    /// Human-readable name ("good friends").
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Strangers => "strangers",
            Stage::Acquaintances => "acquaintances",
            Stage::Friends => "friends",
            Stage::GoodFriends => "good friends",
            Stage::CloseFriends => "close friends",
            Stage::RomanticTension => "romantic tension",
            Stage::Romance => "romance",
        }
    }

    /// Behavioral instruction for the generator at this stage.
    pub const fn directive(self) -> &'static str {
        match self {
            Stage::Strangers => {
                "You've just met. Be polite but distant. Don't share personal information."
            }
            Stage::Acquaintances => {
                "You're warming up slightly. Show cautious interest. Be friendly but maintain emotional distance."
            }
            Stage::Friends => {
                "You're comfortable talking. Share some opinions and interests. Be more relaxed and open."
            }
            Stage::GoodFriends => {
                "You trust them. Share more personal thoughts and feelings. Be supportive and engaged."
            }
            Stage::CloseFriends => {
                "You're very close. Share vulnerabilities and deep thoughts. Be emotionally available."
            }
            Stage::RomanticTension => {
                "There's clear attraction. Allow flirtation and romantic subtext. Build tension."
            }
            Stage::Romance => {
                "You're in a romantic relationship. Express love and affection openly."
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == needle)
            .ok_or_else(|| ParseEnumError::new("stage", s))
    }
}

// ─── Archetype ──────────────────────────────────────────────────────────────

/// Character personality preset.
///
/// Scales every affection delta and contributes a tone directive.
/// The default is [`Archetype::Guarded`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Archetype {
    /// Deflects compliments, hides feelings behind sharp words.
    Tsundere,
    /// Flustered easily, needs encouragement.
    Shy,
    /// Direct and clear about feelings.
    Confident,
    /// Trust issues; needs consistency and patience.
    #[default]
    Guarded,
}

impl Archetype {
    /// All archetypes.
    pub const ALL: [Archetype; 4] = [
        Archetype::Tsundere,
        Archetype::Shy,
        Archetype::Confident,
        Archetype::Guarded,
    ];

    /// Progression speed multiplier.
    pub const fn multiplier(self) -> f64 {
        match self {
            Archetype::Tsundere => 0.8,
            Archetype::Shy => 0.9,
            Archetype::Confident => 1.0,
            Archetype::Guarded => 0.7,
        }
    }

    /// [`multiplier`](Self::multiplier) in tenths, for exact scaling.
    pub const fn tenths(self) -> i64 {
        match self {
            Archetype::Tsundere => 8,
            Archetype::Shy => 9,
            Archetype::Confident => 10,
            Archetype::Guarded => 7,
        }
    }

    /// Stable lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Archetype::Tsundere => "tsundere",
            Archetype::Shy => "shy",
            Archetype::Confident => "confident",
            Archetype::Guarded => "guarded",
        }
    }

    /// One-line description shown by the options command.
    pub const fn description(self) -> &'static str {
        match self {
            Archetype::Tsundere => {
                "Deflects compliments, hides feelings behind sharp words (0.8× speed)"
            }
            Archetype::Shy => "Gets flustered easily, needs encouragement to open up (0.9× speed)",
            Archetype::Confident => "Direct and clear about feelings, takes initiative (1.0× speed)",
            Archetype::Guarded => "Trust issues, needs consistency and patience (0.7× speed)",
        }
    }

    /// Tone instruction for the generator.
    pub const fn directive(self) -> &'static str {
        match self {
            Archetype::Tsundere => {
                "Deflect compliments with denial or irritation. Mask your growing feelings with sharp words."
            }
            Archetype::Shy => {
                "Get flustered easily. Stammer or blush when complimented. Need encouragement to open up."
            }
            Archetype::Confident => {
                "Be direct and clear about your feelings. Don't play games. Communicate openly."
            }
            Archetype::Guarded => {
                "Show trust issues. Need consistency and patience. Test their intentions. Slowly lower your walls."
            }
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Archetype::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == needle)
            .ok_or_else(|| ParseEnumError::new("archetype", s))
    }
}

// ─── Pacing ─────────────────────────────────────────────────────────────────

/// User-selected progression speed. The default is [`Pacing::Slow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Pacing {
    /// Extremely slow burn.
    Glacial,
    /// Slow burn.
    #[default]
    Slow,
    /// Moderate pace.
    Moderate,
    /// Quick progression.
    Fast,
}

impl Pacing {
    /// All pacing presets, slowest first.
    pub const ALL: [Pacing; 4] = [Pacing::Glacial, Pacing::Slow, Pacing::Moderate, Pacing::Fast];

    /// Progression speed multiplier.
    pub const fn multiplier(self) -> f64 {
        match self {
            Pacing::Glacial => 0.5,
            Pacing::Slow => 0.75,
            Pacing::Moderate => 1.0,
            Pacing::Fast => 1.5,
        }
    }

    /// [`multiplier`](Self::multiplier) in hundredths, for exact scaling.
    pub const fn percent(self) -> i64 {
        match self {
            Pacing::Glacial => 50,
            Pacing::Slow => 75,
            Pacing::Moderate => 100,
            Pacing::Fast => 150,
        }
    }

    /// Stable lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Pacing::Glacial => "glacial",
            Pacing::Slow => "slow",
            Pacing::Moderate => "moderate",
            Pacing::Fast => "fast",
        }
    }

    /// One-line description shown by the options command.
    pub const fn description(self) -> &'static str {
        match self {
            Pacing::Glacial => "Extremely slow burn (~500 messages to max affection)",
            Pacing::Slow => "Slow burn (~330 messages to max affection)",
            Pacing::Moderate => "Moderate pace (~250 messages to max affection)",
            Pacing::Fast => "Quick progression (~165 messages to max affection)",
        }
    }
}

impl fmt::Display for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pacing {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Pacing::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| ParseEnumError::new("pacing", s))
    }
}

/// Combined speed multiplier of an archetype and a pacing preset.
pub fn combined_multiplier(archetype: Archetype, pacing: Pacing) -> f64 {
    archetype.multiplier() * pacing.multiplier()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Stage tests ───────────────────────────────────────────────────────

    #[test]
    fn test_stage_thresholds_ascending() {
        for pair in Stage::ALL.windows(2) {
            assert!(
                pair[0].threshold() < pair[1].threshold(),
                "{:?} should start below {:?}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(Stage::Strangers.threshold(), 0);
    }

    #[test]
    fn test_stage_boundaries_exact() {
        let cases: &[(i32, Stage)] = &[
            (0, Stage::Strangers),
            (35, Stage::Strangers),
            (36, Stage::Acquaintances),
            (70, Stage::Acquaintances),
            (71, Stage::Friends),
            (105, Stage::Friends),
            (106, Stage::GoodFriends),
            (140, Stage::GoodFriends),
            (141, Stage::CloseFriends),
            (175, Stage::CloseFriends),
            (176, Stage::RomanticTension),
            (210, Stage::RomanticTension),
            (211, Stage::Romance),
            (250, Stage::Romance),
        ];
        for &(affection, expected) in cases {
            assert_eq!(
                Stage::from_affection(affection),
                expected,
                "affection={}",
                affection
            );
        }
    }

    #[test]
    fn test_stage_monotone_over_full_range() {
        let mut prev = Stage::from_affection(0);
        for a in 1..=MAX_AFFECTION {
            let s = Stage::from_affection(a);
            assert!(s >= prev, "stage regressed at affection={}", a);
            prev = s;
        }
    }

    #[test]
    fn test_stage_out_of_range_is_clamped() {
        assert_eq!(Stage::from_affection(-40), Stage::Strangers);
        assert_eq!(Stage::from_affection(9_000), Stage::Romance);
    }

    #[test]
    fn test_stage_ceiling_and_next() {
        assert_eq!(Stage::Strangers.ceiling(), 36);
        assert_eq!(Stage::RomanticTension.ceiling(), 211);
        assert_eq!(Stage::Romance.next(), None);
        assert_eq!(Stage::Romance.ceiling(), MAX_AFFECTION);
    }

    #[test]
    fn test_stage_parse_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
        }
        assert!("besties".parse::<Stage>().is_err());
    }

    // ── Preset tests ──────────────────────────────────────────────────────

    #[test]
    fn test_preset_defaults() {
        assert_eq!(Archetype::default(), Archetype::Guarded);
        assert_eq!(Pacing::default(), Pacing::Slow);
        assert_eq!(Stage::default(), Stage::Strangers);
    }

    #[test]
    fn test_exact_factors_match_multipliers() {
        for a in Archetype::ALL {
            assert!((a.tenths() as f64 / 10.0 - a.multiplier()).abs() < 1e-12, "{a}");
        }
        for p in Pacing::ALL {
            assert!((p.percent() as f64 / 100.0 - p.multiplier()).abs() < 1e-12, "{p}");
        }
    }

    #[test]
    fn test_multipliers() {
        assert!((Pacing::Glacial.multiplier() - 0.5).abs() < f64::EPSILON);
        assert!((Pacing::Fast.multiplier() - 1.5).abs() < f64::EPSILON);
        assert!((Archetype::Guarded.multiplier() - 0.7).abs() < f64::EPSILON);
        assert!((Archetype::Confident.multiplier() - 1.0).abs() < f64::EPSILON);
        let c = combined_multiplier(Archetype::Guarded, Pacing::Slow);
        assert!((c - 0.525).abs() < 1e-9, "got {}", c);
    }

    #[test]
    fn test_preset_parse_is_case_insensitive() {
        assert_eq!(" Confident ".parse::<Archetype>(), Ok(Archetype::Confident));
        assert_eq!("FAST".parse::<Pacing>(), Ok(Pacing::Fast));
        assert!("".parse::<Archetype>().is_err());
        assert!("ludicrous".parse::<Pacing>().is_err());
    }
}
