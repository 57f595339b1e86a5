//! Summary formatting: turns the service's markdown-like synopsis into display text
//!
//! Formatting is an ordered pipeline of rules, each total over its input:
//! 1. recognized `**Heading**` labels get a blank line before and a newline after
//! 2. remaining `*span*` emphasis becomes a bulleted line
//! 3. remaining `**strong**` spans lose their markers
//!
//! Headings must be separated before bullets are produced and bullets must be
//! produced before strong markers are stripped, otherwise the single-star rule
//! would consume the markers of the other two.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Heading labels recognized when no configuration is given
pub const DEFAULT_HEADINGS: &[&str] = &["Key Points", "Challenges", "Final Challenge"];

/// Bullet glyph used when no configuration is given
pub const DEFAULT_BULLET: &str = "•";

/// One rewriting pass of the pipeline
pub trait FormatRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, input: &str) -> String;
}

/// Puts recognized strong-wrapped headings on their own line, keeping the markers
pub struct HeadingRule {
    pattern: Option<Regex>,
}

impl HeadingRule {
    pub fn new(labels: &[String]) -> Self {
        let alternatives = labels
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();

        // Labels match with or without a trailing colon inside the markers
        let pattern = if alternatives.is_empty() {
            None
        } else {
            match Regex::new(&format!(r"\*\*((?:{}):?)\*\*", alternatives.join("|"))) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(
                        "Heading pattern for {} labels could not be built, headings will not be separated: {}",
                        alternatives.len(),
                        e
                    );
                    None
                }
            }
        };

        Self { pattern }
    }
}

impl FormatRule for HeadingRule {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn apply(&self, input: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(input, "\n\n**${1}**\n").into_owned(),
            None => input.to_string(),
        }
    }
}

/// Rewrites single-star emphasis spans as bulleted lines
pub struct BulletRule {
    bullet: String,
}

impl BulletRule {
    pub fn new(bullet: impl Into<String>) -> Self {
        Self { bullet: bullet.into() }
    }

    /// Index of the star closing a span opened just before `start`.
    /// Spans stay on one line and never contain another star.
    fn find_closer(chars: &[char], start: usize) -> Option<usize> {
        for (offset, c) in chars[start..].iter().enumerate() {
            match c {
                '\n' => return None,
                '*' => {
                    let at = start + offset;
                    if chars.get(at + 1) == Some(&'*') {
                        return None;
                    }
                    return Some(at);
                }
                _ => {}
            }
        }
        None
    }
}

impl FormatRule for BulletRule {
    fn name(&self) -> &'static str {
        "bullet"
    }

    fn apply(&self, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len());
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '*' {
                out.push(chars[i]);
                i += 1;
                continue;
            }

            // Runs of two or more stars are strong markers, left for the next rule
            let run = chars[i..].iter().take_while(|c| **c == '*').count();
            if run > 1 {
                out.extend(&chars[i..i + run]);
                i += run;
                continue;
            }

            match Self::find_closer(&chars, i + 1) {
                Some(end) => {
                    out.push_str(&self.bullet);
                    out.push(' ');
                    out.extend(&chars[i + 1..end]);
                    out.push('\n');
                    i = end + 1;
                }
                None => {
                    out.push('*');
                    i += 1;
                }
            }
        }

        out
    }
}

/// Strips the markers of any remaining `**strong**` span
pub struct StrongRule {
    pattern: Regex,
}

impl StrongRule {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\*\*([^\n]*?)\*\*").expect("strong pattern is valid"),
        }
    }
}

impl Default for StrongRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRule for StrongRule {
    fn name(&self) -> &'static str {
        "strong"
    }

    fn apply(&self, input: &str) -> String {
        self.pattern.replace_all(input, "${1}").into_owned()
    }
}

/// Formatter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Labels rendered as section headings when strong-wrapped
    pub heading_labels: Vec<String>,

    /// Glyph placed before each bulleted line
    pub bullet: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            heading_labels: DEFAULT_HEADINGS.iter().map(|h| h.to_string()).collect(),
            bullet: DEFAULT_BULLET.to_string(),
        }
    }
}

/// Ordered rule pipeline producing display-ready summary text
pub struct SummaryFormatter {
    rules: Vec<Box<dyn FormatRule>>,
}

impl SummaryFormatter {
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            rules: vec![
                Box::new(HeadingRule::new(&config.heading_labels)),
                Box::new(BulletRule::new(config.bullet.clone())),
                Box::new(StrongRule::new()),
            ],
        }
    }

    /// Names of the rules in application order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Run every rule in order. Never fails; unmatched markers stay literal.
    pub fn format(&self, raw: &str) -> String {
        let formatted = self
            .rules
            .iter()
            .fold(raw.to_string(), |text, rule| rule.apply(&text));
        debug!("Formatted summary: {} -> {} bytes", raw.len(), formatted.len());
        formatted
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new(&SummaryConfig::default())
    }
}

/// Format with the default heading set and bullet glyph
pub fn format_summary(raw: &str) -> String {
    SummaryFormatter::default().format(raw)
}

/// A generated summary and its display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synopsis {
    raw_text: String,
    display_text: String,
}

impl Synopsis {
    pub fn new(raw_text: impl Into<String>, formatter: &SummaryFormatter) -> Self {
        let raw_text = raw_text.into();
        let display_text = formatter.format(&raw_text);
        Self { raw_text, display_text }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }
}
