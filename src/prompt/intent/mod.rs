//! Query intent heuristics that steer the answer framing.


use fancy_regex::Regex;
use std::sync::LazyLock;

static TODAY_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"today|today['’]?s|current|this").expect("valid regex"));
static REFLECTION_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"reflection|reading|message|daily").expect("valid regex"));
static MEANING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(mean|meaning|explain|interpret|understand|significance|about|thoughts on)\b")
        .expect("valid regex")
});
static BIG_BOOK_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(big book|12 steps|twelve steps|aa book|alcoholics anonymous book)\b")
        .expect("valid regex")
});
static TRADITION_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(tradition|traditions)\b").expect("valid regex"));
static STEP_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(step|steps)\s+(\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\b",
    )
    .expect("valid regex")
});

fn matches(regex: &Regex, text: &str) -> bool {
    regex.is_match(text).unwrap_or(false)
}

/// Independent flags inferred from the lowercased query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub todays_reflection: bool,
    pub meaning: bool,
    pub big_book: bool,
    pub tradition: bool,
    pub step: bool,
}

type Rule = (fn(&Intent) -> bool, &'static str);

/// Checked in order; the first matching rule supplies the instruction
const INSTRUCTION_RULES: [Rule; 5] = [
    (
        |intent| intent.todays_reflection && intent.meaning,
        "Your answer should focus on EXPLAINING the meaning and significance of today's reflection shown above. Analyze its themes, message, and how it relates to recovery principles. Break down the reflection's core ideas and what they teach about recovery.",
    ),
    (
        |intent| intent.todays_reflection,
        "Your answer should focus primarily on addressing the question about today's reflection shown above.",
    ),
    (
        |intent| intent.big_book,
        "Your answer should focus on the AA Big Book content, highlighting key passages and principles. Reference specific pages when citing the Big Book.",
    ),
    (
        |intent| intent.tradition,
        "Your answer should explain the requested AA Tradition in detail, its purpose, and how it guides AA groups. If the specific tradition is in the provided excerpts, focus on that information.",
    ),
    (
        |intent| intent.step,
        "Your answer should explain the requested Step in detail, including its purpose in recovery and how it's typically worked. Focus on information from the provided excerpts.",
    ),
];

impl Intent {
    #[inline]
    pub fn detect(query: &str) -> Self {
        let text = query.to_lowercase();
        Self {
            todays_reflection: matches(&TODAY_WORDS, &text) && matches(&REFLECTION_WORDS, &text),
            meaning: asks_for_meaning(&text),
            big_book: matches(&BIG_BOOK_WORDS, &text),
            tradition: matches(&TRADITION_WORDS, &text),
            step: matches(&STEP_REFERENCE, &text),
        }
    }

    /// Instruction for the highest-priority matching intent
    #[inline]
    pub fn special_instruction(&self) -> Option<&'static str> {
        INSTRUCTION_RULES
            .iter()
            .find(|(applies, _)| applies(self))
            .map(|(_, instruction)| *instruction)
    }

    /// Whether the question concerns the literature itself rather than a reflection
    #[inline]
    pub fn is_about_literature(&self) -> bool {
        self.big_book || self.tradition || self.step
    }
}

/// True when the query asks to explain or interpret something
#[inline]
pub fn asks_for_meaning(query: &str) -> bool {
    matches(&MEANING_WORDS, &query.to_lowercase())
}
