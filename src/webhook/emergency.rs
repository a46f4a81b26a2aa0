use regex::{Regex, RegexBuilder};
use tracing::error;

/// Keywords used when the configuration does not provide its own list
pub const DEFAULT_EMERGENCY_KEYWORDS: &[&str] = &[
    "fire",
    "smoke",
    "gas leak",
    "smell gas",
    "gas smell",
    "carbon monoxide",
    "flood",
    "flooding",
    "burst pipe",
    "sewage",
    "no heat",
    "no water",
    "sparking",
    "exposed wires",
    "electrical fire",
    "break-in",
    "collapsed",
];

/// Decides whether call text describes an emergency
///
/// Keywords match whole words, case-insensitively, so `fire` flags
/// "there's a fire" but not "fireplace".
#[derive(Debug, Clone)]
pub struct EmergencyClassifier {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl EmergencyClassifier {
    /// Builds a classifier from a keyword list
    ///
    /// Blank keywords are ignored; an empty list never flags anything.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        let pattern = if keywords.is_empty() {
            None
        } else {
            // longest first so "electrical fire" wins over "fire"
            let mut alternatives: Vec<&String> = keywords.iter().collect();
            alternatives.sort_by_key(|k| std::cmp::Reverse(k.len()));
            let body = alternatives.iter().map(|k| keyword_pattern(k)).collect::<Vec<_>>().join("|");
            match RegexBuilder::new(&format!("(?:{})", body)).case_insensitive(true).build() {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    error!("Emergency keyword detection disabled, pattern failed to build: {}", e);
                    None
                }
            }
        };

        Self { keywords, pattern }
    }

    /// The normalized keyword list
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns every distinct keyword found in `text`, in keyword-list order
    pub fn matches(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let found: Vec<String> = pattern
            .find_iter(text)
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .collect();

        self.keywords
            .iter()
            .filter(|k| found.contains(k))
            .cloned()
            .collect()
    }

    /// True when any keyword occurs in `text`
    pub fn is_emergency(&self, text: &str) -> bool {
        !self.matches(text).is_empty()
    }
}

/// A keyword edge only needs `\b` when it is a word character; `\b` beside
/// punctuation would demand a word character on the other side.
fn keyword_pattern(keyword: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(keyword.chars().next()) { r"\b" } else { "" };
    let end = if is_word(keyword.chars().last()) { r"\b" } else { "" };
    format!("{}{}{}", start, regex::escape(keyword).replace(' ', r"\s+"), end)
}

impl Default for EmergencyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EMERGENCY_KEYWORDS)
    }
}
