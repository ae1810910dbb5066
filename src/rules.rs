//! Rules deciding whether a path or link looks sensitive.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings flagged by the built-in rule set (matched case-insensitively).
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "admin", "account", "api", "config", "login", "user", "profile", "private", "secret",
    "dashboard", "settings", "backup", "token", "auth", "password", "internal", "debug", "panel",
];

/// Regexes flagged by the built-in rule set.
pub const DEFAULT_PATTERNS: &[&str] = &[
    r"(?i)\.(env|bak|old|sql|ya?ml|ini|conf|log|git)(/|$)",
    r"(?i)/(me|my)(/|$|-)",
];

static DEFAULT_RULES: Lazy<SensitivityRules> = Lazy::new(|| {
    SensitivityRules::new(DEFAULT_KEYWORDS, DEFAULT_PATTERNS)
        .expect("built-in sensitivity patterns are valid")
});

/// A set of substring and regex rules. A path is sensitive when any rule matches.
#[derive(Debug, Clone)]
pub struct SensitivityRules {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl SensitivityRules {
    pub fn new<K, P>(keywords: &[K], patterns: &[P]) -> Result<Self, regex::Error>
    where
        K: AsRef<str>,
        P: AsRef<str>,
    {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            patterns,
        })
    }

    pub fn is_sensitive(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
            || self.patterns.iter().any(|re| re.is_match(path))
    }
}

impl Default for SensitivityRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}
