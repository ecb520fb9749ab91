use super::defaults::{default_postprocess, default_preprocess, experimental_rules};
use super::rule::{Phase, RuleSet, TransformConfig, TransformRule};
use crate::error::{Pm2InsomniaError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on passes for an iterated rule
pub const MAX_ITERATIONS: usize = 16;

/// Ordered, fault-isolating regex rewrite pipeline
#[derive(Debug, Clone)]
pub struct TransformEngine {
    preprocess: Vec<TransformRule>,
    postprocess: Vec<TransformRule>,
    experimental: RuleSet,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformEngine {
    /// Engine with the built-in rule sets
    pub fn new() -> Self {
        Self {
            preprocess: default_preprocess(),
            postprocess: default_postprocess(),
            experimental: experimental_rules(),
        }
    }

    /// Engine using the given configuration wholesale
    pub fn with_config(config: TransformConfig) -> Self {
        Self {
            preprocess: config.preprocess,
            postprocess: config.postprocess,
            experimental: config.experimental.unwrap_or_else(experimental_rules),
        }
    }

    /// Parse a JSON configuration, falling back to the defaults on error
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<TransformConfig>(content) {
            Ok(config) => Self::with_config(config),
            Err(e) => {
                warn!(error = %e, "Invalid transform configuration, using built-in rules");
                Self::new()
            }
        }
    }

    /// Load a configuration file, falling back to the defaults on error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loading transform configuration");
                Self::from_json(&content)
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read transform configuration, using built-in rules"
                );
                Self::new()
            }
        }
    }

    /// Rewrite raw source text before it is parsed
    pub fn preprocess(&self, text: &str, experimental: bool) -> String {
        self.run(Phase::Preprocess, text, experimental)
    }

    /// Rewrite a generated script
    pub fn postprocess(&self, text: &str, experimental: bool) -> String {
        self.run(Phase::Postprocess, text, experimental)
    }

    /// Standard rules of a phase, in order
    pub fn rules(&self, phase: Phase) -> &[TransformRule] {
        match phase {
            Phase::Preprocess => &self.preprocess,
            Phase::Postprocess => &self.postprocess,
        }
    }

    /// Experimental rules of a phase, in order
    pub fn experimental_rules(&self, phase: Phase) -> &[TransformRule] {
        match phase {
            Phase::Preprocess => &self.experimental.preprocess,
            Phase::Postprocess => &self.experimental.postprocess,
        }
    }

    /// Append a rule to the standard list of a phase
    pub fn add_rule(&mut self, phase: Phase, rule: TransformRule) {
        match phase {
            Phase::Preprocess => self.preprocess.push(rule),
            Phase::Postprocess => self.postprocess.push(rule),
        }
    }

    /// Enable or disable every rule with this name; returns whether one was found
    pub fn toggle_rule(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        let rules = self
            .preprocess
            .iter_mut()
            .chain(self.postprocess.iter_mut())
            .chain(self.experimental.preprocess.iter_mut())
            .chain(self.experimental.postprocess.iter_mut());

        for rule in rules.filter(|r| r.name == name) {
            rule.enabled = enabled;
            found = true;
        }
        found
    }

    /// Snapshot of every rule list, disabled rules included
    pub fn export_config(&self) -> TransformConfig {
        TransformConfig {
            preprocess: self.preprocess.clone(),
            postprocess: self.postprocess.clone(),
            experimental: Some(self.experimental.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_config())?)
    }

    /// Write the configuration back out as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| {
            Pm2InsomniaError::ConfigError(format!(
                "Failed to write configuration {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn run(&self, phase: Phase, text: &str, experimental: bool) -> String {
        let standard = self.rules(phase).iter();
        let extra = if experimental {
            self.experimental_rules(phase)
        } else {
            &[]
        };

        standard
            .chain(extra.iter())
            .fold(text.to_string(), |current, rule| {
                Self::apply_rule(phase, rule, current)
            })
    }

    fn apply_rule(phase: Phase, rule: &TransformRule, text: String) -> String {
        if !rule.enabled {
            return text;
        }

        let compiled = match rule.compile() {
            Ok(compiled) => compiled,
            Err(e) => {
                warn!(phase = %phase, error = %e, "Skipping transform rule");
                return text;
            }
        };

        if !rule.iterate {
            return compiled.apply(&text);
        }

        let mut current = text;
        for _ in 0..MAX_ITERATIONS {
            let next = compiled.apply(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}
