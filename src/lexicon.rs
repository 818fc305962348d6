//! Static keyword tables read by every classifier in the crate.
//!
//! Matching is plain case-insensitive substring search. No tokenisation, no
//! stemming: "hand" matches inside "handsome", "bed" inside "bedroom". Callers
//! lowercase the text once and test it against several categories.
//!
//! # Invariants
//! - Every keyword is lowercase ASCII.
//! - Categories are independent; one text may match any number of them.

/// A keyword category the analyzer can detect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Praise of the character's looks or qualities.
    Compliment,
    /// Romantic intent or language.
    Romantic,
    /// Emotional openness: fear, worry, hurt.
    Vulnerability,
    /// Insults and hostility.
    Rude,
    /// Explicit sexual content.
    Sexual,
    /// Laughter and jokes.
    Humor,
    /// Flirtatious body language in narration.
    Flirtation,
    /// Physical touch in narration.
    Touch,
    /// Words that open a question about the character.
    Question,
    /// References to earlier conversation.
    History,
}

impl Category {
    /// All categories.
    pub const ALL: [Category; 10] = [
        Category::Compliment,
        Category::Romantic,
        Category::Vulnerability,
        Category::Rude,
        Category::Sexual,
        Category::Humor,
        Category::Flirtation,
        Category::Touch,
        Category::Question,
        Category::History,
    ];

    /// The keyword table for this category.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Compliment => COMPLIMENTS,
            Category::Romantic => ROMANTIC,
            Category::Vulnerability => VULNERABILITY,
            Category::Rude => RUDE,
            Category::Sexual => SEXUAL,
            Category::Humor => HUMOR,
            Category::Flirtation => FLIRTATION,
            Category::Touch => TOUCH,
            Category::Question => QUESTION_TEMPLATES,
            Category::History => HISTORY_MARKERS,
        }
    }

    /// `true` if already-lowercased `text` contains any keyword of this category.
    pub fn matches(self, lowered: &str) -> bool {
        contains_any(lowered, self.keywords())
    }
}

const COMPLIMENTS: &[&str] = &[
    "beautiful", "handsome", "cute", "pretty", "gorgeous", "amazing",
    "wonderful", "incredible", "perfect", "stunning", "attractive",
];

const ROMANTIC: &[&str] = &[
    "love", "adore", "cherish", "romance", "romantic", "kiss", "date",
    "relationship", "feelings", "heart", "affection",
];

const VULNERABILITY: &[&str] = &[
    "scared", "afraid", "worried", "insecure", "anxious", "fear",
    "vulnerable", "hurt", "pain", "struggling", "difficult",
];

const RUDE: &[&str] = &[
    "stupid", "idiot", "dumb", "shut up", "hate", "ugly", "loser",
    "worthless", "pathetic", "annoying",
];

const SEXUAL: &[&str] = &[
    "sex", "sexual", "fuck", "cock", "pussy", "dick", "naked", "bed",
    "seduce", "desire", "lust", "aroused", "explicit", "arousal",
];

const HUMOR: &[&str] = &["chuckle", "giggle", "grin", "funny", "laugh", "hilarious"];

const FLIRTATION: &[&str] = &["wink", "smirk", "tease", "playful", "coy", "flirt"];

const TOUCH: &[&str] = &["touch", "hand", "hold", "caress", "stroke", "embrace", "hug"];

const QUESTION_TEMPLATES: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "tell me", "can you",
];

const HISTORY_MARKERS: &[&str] = &[
    "remember", "earlier", "before", "yesterday", "last time", "you said", "we talked",
];

/// `true` if `lowered` contains any of `keywords` as a substring.
pub fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

/// Replace every case-insensitive occurrence of any keyword with `mask`.
///
/// At each position the longest matching keyword wins, so "sexual" is masked
/// whole rather than leaving "...ual" behind. Non-ASCII text passes through
/// untouched.
pub fn mask_keywords(text: &str, keywords: &[&str], mask: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        let hit = keywords
            .iter()
            .filter(|k| {
                !k.is_empty()
                    && bytes.len() - i >= k.len()
                    && bytes[i..i + k.len()].eq_ignore_ascii_case(k.as_bytes())
            })
            .map(|k| k.len())
            .max();
        match hit {
            Some(len) => {
                out.push_str(mask);
                i += len;
            }
            None => match text[i..].chars().next() {
                Some(ch) => {
                    out.push(ch);
                    i += ch.len_utf8();
                }
                None => break,
            },
        }
    }
    out
}
