//! Calendar keys for the Daily Reflections collection.
//!
//! Each reflection is addressed by month and day only ([`DateKey`], written
//! `MM-DD`). Queries such as "what does today's reflection say" or
//! "the reading for Jan 3rd" are resolved to a key by [`parse_date_from_query`].


use chrono::{Datelike, Local, NaiveDate};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Leap year used to validate keys, so that `02-29` is accepted
const REFERENCE_YEAR: i32 = 2024;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBREVIATIONS: [(&str, u32); 13] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date key format: {0} (expected MM-DD)")]
    InvalidFormat(String),
    #[error("Date out of range: month {month}, day {day}")]
    OutOfRange { month: u32, day: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey {
    month: u32,
    day: u32,
}

impl DateKey {
    #[inline]
    pub fn new(month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or(DateError::OutOfRange { month, day })
    }

    #[inline]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Key for the current local date
    #[inline]
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Human-readable form, e.g. `January 8`
    #[inline]
    pub fn display_name(&self) -> String {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index as usize))
            .copied()
            .unwrap_or("Unknown");
        format!("{name} {}", self.day)
    }
}

impl fmt::Display for DateKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = DateError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, day) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| DateError::InvalidFormat(s.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| DateError::InvalidFormat(s.to_string()))?;
        let day = day
            .parse::<u32>()
            .map_err(|_| DateError::InvalidFormat(s.to_string()))?;
        Self::new(month, day)
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    #[inline]
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

static TODAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(today|today['’]?s|current|this)\b").expect("valid regex")
});
static YESTERDAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(yesterday|yesterday['’]?s|previous)\b").expect("valid regex")
});
static TOMORROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(tomorrow|tomorrow['’]?s|next)\b").expect("valid regex")
});
static REFLECTION_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(reflection|reading|message|daily)\b").expect("valid regex"));
static DASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})-(\d{1,2})").expect("valid regex"));
static SLASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").expect("valid regex"));

/// Month-name patterns, full names before abbreviations
static MONTH_PATTERNS: LazyLock<Vec<(Regex, u32)>> = LazyLock::new(|| {
    let full = MONTH_NAMES
        .iter()
        .zip(1..)
        .map(|(name, month)| (name.to_lowercase(), month));
    let abbreviated = MONTH_ABBREVIATIONS
        .iter()
        .map(|(name, month)| ((*name).to_string(), *month));

    full.chain(abbreviated)
        .map(|(name, month)| {
            let regex = Regex::new(&format!(r"\b{name}\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"))
                .expect("valid regex");
            (regex, month)
        })
        .collect()
});

fn matches(regex: &Regex, text: &str) -> bool {
    regex.is_match(text).unwrap_or(false)
}

fn capture_number(captures: &fancy_regex::Captures<'_>, group: usize) -> Option<u32> {
    captures.get(group)?.as_str().parse().ok()
}

fn numeric_key(regex: &Regex, text: &str) -> Option<DateKey> {
    let captures = regex.captures(text).ok()??;
    let month = capture_number(&captures, 1)?;
    let day = capture_number(&captures, 2)?;
    DateKey::new(month, day).ok()
}

/// Find a reflection date referenced in a free-text query
///
/// Relative words ("today", "yesterday", "tomorrow") only count when the query
/// also mentions a reflection, reading, message or daily. `today` anchors
/// relative references.
#[inline]
pub fn parse_date_from_query(query: &str, today: NaiveDate) -> Option<DateKey> {
    let text = query.trim().to_lowercase();
    let mentions_reflection = matches(&REFLECTION_WORDS, &text);

    if mentions_reflection {
        if matches(&TODAY_PATTERN, &text) {
            return Some(DateKey::from_date(today));
        }
        if matches(&YESTERDAY_PATTERN, &text) {
            return today.pred_opt().map(DateKey::from_date);
        }
        if matches(&TOMORROW_PATTERN, &text) {
            return today.succ_opt().map(DateKey::from_date);
        }
    }

    if let Some(key) = numeric_key(&DASH_PATTERN, &text) {
        return Some(key);
    }
    if let Some(key) = numeric_key(&SLASH_PATTERN, &text) {
        return Some(key);
    }

    MONTH_PATTERNS.iter().find_map(|(regex, month)| {
        let captures = regex.captures(&text).ok()??;
        let day = capture_number(&captures, 1)?;
        DateKey::new(*month, day).ok()
    })
}

/// True when the query asks about today's reflection, reading or message
#[inline]
pub fn refers_to_todays_reflection(query: &str) -> bool {
    let text = query.to_lowercase();
    matches(&TODAY_PATTERN, &text) && matches(&REFLECTION_WORDS, &text)
}
