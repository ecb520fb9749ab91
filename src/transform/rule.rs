//! Declarative rewrite rules
//!
//! A rule is a regular expression plus a replacement template. Rules carry no
//! logic of their own; [`super::TransformEngine`] compiles and applies them.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flags applied when a rule does not declare any
pub const DEFAULT_FLAGS: &str = "g";

/// A single named regex substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Rule name, unique within its list
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// Regular expression source
    pub pattern: String,

    /// Replacement template (`$1`, `$&`, `$<name>` and `$$` are understood)
    pub replacement: String,

    /// Pattern flags (`g`, `i`, `m`, `s`, `x`, `u`), defaults to `g`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,

    /// Disabled rules are skipped silently
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Re-apply until the output stops changing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub iterate: bool,
}

fn default_true() -> bool {
    true
}

/// Reasons a rule cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule '{name}' has an invalid pattern: {message}")]
    InvalidPattern { name: String, message: String },

    #[error("rule '{name}' uses unsupported flag '{flag}'")]
    UnsupportedFlag { name: String, flag: char },
}

/// A rule whose pattern compiled successfully
#[derive(Debug)]
pub struct CompiledRule<'a> {
    pub rule: &'a TransformRule,
    regex: Regex,
    replacement: String,
    global: bool,
}

impl TransformRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
            flags: None,
            enabled: true,
            iterate: false,
        }
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn iterated(mut self) -> Self {
        self.iterate = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Effective flag string
    pub fn flags(&self) -> &str {
        self.flags.as_deref().unwrap_or(DEFAULT_FLAGS)
    }

    /// Compile the pattern with this rule's flags
    pub fn compile(&self) -> Result<CompiledRule<'_>, RuleError> {
        let mut builder = RegexBuilder::new(&self.pattern);
        let mut global = false;

        for flag in self.flags().chars() {
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                // patterns are always Unicode aware
                'u' => {}
                other => {
                    return Err(RuleError::UnsupportedFlag {
                        name: self.name.clone(),
                        flag: other,
                    });
                }
            }
        }

        let regex = builder.build().map_err(|e| RuleError::InvalidPattern {
            name: self.name.clone(),
            message: e.to_string(),
        })?;

        let replacement = translate_replacement(&self.replacement, regex.captures_len() - 1);
        Ok(CompiledRule {
            rule: self,
            regex,
            replacement,
            global,
        })
    }
}

impl CompiledRule<'_> {
    /// Substitute once (or everywhere for global rules)
    pub fn apply(&self, text: &str) -> String {
        let limit = if self.global { 0 } else { 1 };
        self.regex
            .replacen(text, limit, self.replacement.as_str())
            .into_owned()
    }
}

/// Convert a JavaScript-style replacement template to the `regex` crate's syntax.
///
/// `groups` is the number of capture groups in the pattern. `$1` becomes `${1}`
/// so that a digit followed by letters is not read as a named group, `$&`
/// becomes `${0}`, `$<name>` becomes `${name}`. `$nn` takes two digits only
/// when that group exists, otherwise one digit and a literal. `$0`, a group
/// past `groups`, and a `$` that starts no reference are kept literally.
pub fn translate_replacement(template: &str, groups: usize) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '$' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some('$') => {
                out.push_str("$$");
                i += 2;
            }
            Some('&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(&d) if d.is_ascii_digit() => {
                let first = digit_value(d);
                let two = chars
                    .get(i + 2)
                    .filter(|c| c.is_ascii_digit())
                    .map(|&c| first * 10 + digit_value(c));

                match two {
                    Some(group) if (1..=groups).contains(&group) => {
                        out.push_str(&format!("${{{}}}", group));
                        i += 3;
                    }
                    _ if (1..=groups).contains(&first) => {
                        out.push_str(&format!("${{{}}}", first));
                        i += 2;
                    }
                    _ => {
                        out.push_str("$$");
                        out.push(d);
                        i += 2;
                    }
                }
            }
            Some('<') => match chars[i + 2..].iter().position(|&ch| ch == '>') {
                Some(end) => {
                    let name: String = chars[i + 2..i + 2 + end].iter().collect();
                    out.push_str(&format!("${{{}}}", name));
                    i += end + 3;
                }
                None => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            Some('{') => match chars[i + 2..].iter().position(|&ch| ch == '}') {
                Some(end) => {
                    let name: String = chars[i + 2..i + 2 + end].iter().collect();
                    out.push_str(&format!("${{{}}}", name));
                    i += end + 3;
                }
                None => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }

    out
}

fn digit_value(c: char) -> usize {
    c.to_digit(10).map_or(0, |d| d as usize)
}

/// Ordered standard rules for both phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub preprocess: Vec<TransformRule>,

    #[serde(default)]
    pub postprocess: Vec<TransformRule>,
}

/// On-disk transform configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub preprocess: Vec<TransformRule>,

    #[serde(default)]
    pub postprocess: Vec<TransformRule>,

    /// Opt-in tier; the built-in experimental rules are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<RuleSet>,
}

/// Which pipeline stage a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preprocess,
    Postprocess,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preprocess => write!(f, "preprocess"),
            Phase::Postprocess => write!(f, "postprocess"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_replacement() {
        assert_eq!(translate_replacement("$1pm", 1), "${1}pm");
        assert_eq!(translate_replacement("$&!", 0), "${0}!");
        assert_eq!(translate_replacement("$<word>", 1), "${word}");
        assert_eq!(translate_replacement("cost: $$5", 0), "cost: $$5");
        assert_eq!(translate_replacement("a $ b", 0), "a $$ b");
        assert_eq!(translate_replacement("${2}x", 2), "${2}x");
    }

    #[test]
    fn test_translate_group_numbers() {
        // two digits only when that group exists
        assert_eq!(translate_replacement("$10", 1), "${1}0");
        assert_eq!(translate_replacement("$10", 10), "${10}");
        assert_eq!(translate_replacement("$12", 0), "$$12");
        assert_eq!(translate_replacement("$0", 2), "$$0");
        assert_eq!(translate_replacement("$3", 2), "$$3");
    }

    #[test]
    fn test_group_references_match_javascript() {
        let ten = TransformRule::new("ten", "", "(a)", "$10");
        assert_eq!(ten.compile().unwrap().apply("a"), "a0");

        let zero = TransformRule::new("zero", "", "a", "$0");
        assert_eq!(zero.compile().unwrap().apply("a"), "$0");

        let missing = TransformRule::new("missing", "", "(a)", "[$2]");
        assert_eq!(missing.compile().unwrap().apply("a"), "[$2]");
    }

    #[test]
    fn test_global_flag_controls_replace_count() {
        let all = TransformRule::new("all", "", "a", "b");
        assert_eq!(all.compile().unwrap().apply("aaa"), "bbb");

        let first = TransformRule::new("first", "", "a", "b").with_flags("");
        assert_eq!(first.compile().unwrap().apply("aaa"), "baa");
    }

    #[test]
    fn test_case_insensitive_flag() {
        let rule = TransformRule::new("ci", "", "hello", "bye").with_flags("gi");
        assert_eq!(rule.compile().unwrap().apply("Hello HELLO"), "bye bye");
    }

    #[test]
    fn test_back_reference_followed_by_text() {
        let rule = TransformRule::new("prefix", "", r"(^|\s)x", "$1pm.x");
        assert_eq!(rule.compile().unwrap().apply("x x"), "pm.x pm.x");
    }

    #[test]
    fn test_invalid_pattern() {
        let rule = TransformRule::new("broken", "", "(unclosed", "");
        let err = rule.compile().unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_unsupported_flag() {
        let rule = TransformRule::new("sticky", "", "a", "b").with_flags("gy");
        assert_eq!(
            rule.compile().unwrap_err(),
            RuleError::UnsupportedFlag {
                name: "sticky".to_string(),
                flag: 'y'
            }
        );
    }

    #[test]
    fn test_rule_deserialize_defaults() {
        let rule: TransformRule =
            serde_json::from_str(r#"{"name":"r","pattern":"a","replacement":"b"}"#).unwrap();
        assert!(rule.enabled);
        assert!(!rule.iterate);
        assert_eq!(rule.flags(), "g");
        assert_eq!(rule.description, "");
    }
}
