//! Script and source-text rewriting
//!
//! [`TransformEngine`] applies ordered regex rules loaded from configuration;
//! [`PrefixRewriter`] performs the `pm.` -> `insomnia.` rename.

pub mod defaults;
pub mod engine;
pub mod prefix;
pub mod rule;

pub use defaults::default_config;
pub use engine::TransformEngine;
pub use prefix::PrefixRewriter;
pub use rule::{Phase, RuleError, RuleSet, TransformConfig, TransformRule};
