pub mod convert;
pub mod rules;

pub use convert::{BatchReport, ConvertCommandArgs, execute_convert};
pub use rules::{execute_rules_export, execute_rules_list};

use crate::transform::TransformEngine;
use std::path::Path;

/// Engine from a config file, or the built-in rules
pub fn load_engine(config: Option<&Path>) -> TransformEngine {
    match config {
        Some(path) => TransformEngine::from_file(path),
        None => TransformEngine::new(),
    }
}
