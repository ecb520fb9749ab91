use super::load_engine;
use crate::error::Result;
use crate::transform::{Phase, TransformEngine, TransformRule};
use colored::*;
use std::path::Path;

pub fn execute_rules_list(config: Option<&Path>) -> Result<()> {
    let engine = load_engine(config);
    match config {
        Some(path) => println!("{} {}", "Rules from".bright_blue(), path.display()),
        None => println!("{}", "Built-in rules".bright_blue()),
    }

    for phase in [Phase::Preprocess, Phase::Postprocess] {
        print_rules(&format!("{}", phase), engine.rules(phase));
    }
    for phase in [Phase::Preprocess, Phase::Postprocess] {
        print_rules(
            &format!("{} (experimental)", phase),
            engine.experimental_rules(phase),
        );
    }

    Ok(())
}

fn print_rules(title: &str, rules: &[TransformRule]) {
    println!();
    println!("{}", format!("{} ({}):", title, rules.len()).bold());
    if rules.is_empty() {
        println!("  {}", "none".dimmed());
        return;
    }

    for rule in rules {
        let marker = if rule.enabled {
            "✓".green()
        } else {
            "○".dimmed()
        };
        let mut line = format!("  {} {}", marker, rule.name.cyan());
        if rule.iterate {
            line.push_str(&format!(" {}", "[iterate]".bright_magenta()));
        }
        if !rule.description.is_empty() {
            line.push_str(&format!("  {}", rule.description));
        }
        println!("{}", line);
    }
}

/// Print or save the configuration as JSON
pub fn execute_rules_export(output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let engine = load_engine(config);
    export_rules(&engine, output)
}

fn export_rules(engine: &TransformEngine, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            engine.save(path)?;
            println!(
                "{} Wrote rule configuration: {}",
                "✓".green(),
                path.display()
            );
        }
        None => println!("{}", engine.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");

        let mut engine = TransformEngine::new();
        assert!(engine.toggle_rule("response-to-be-ok", false));
        export_rules(&engine, Some(&path)).unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("response-to-be-ok"));

        let reloaded = TransformEngine::from_file(&path);
        let rule = reloaded
            .rules(Phase::Postprocess)
            .iter()
            .find(|r| r.name == "response-to-be-ok")
            .unwrap();
        assert!(!rule.enabled);
    }

    #[test]
    fn test_list_with_missing_config_falls_back() {
        assert!(execute_rules_list(Some(Path::new("/nonexistent/rules.json"))).is_ok());
    }
}
