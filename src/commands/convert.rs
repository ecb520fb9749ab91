//! Convert command implementation
//!
//! Converts every discovered input on the blocking pool, writes one output
//! file per successful conversion and reports each file separately. A
//! failing file is recorded and the rest of the batch carries on.

use super::load_engine;
use crate::cli::OutputFormat;
use crate::converters::{ConvertOptions, ConvertedDocument, convert_source};
use crate::error::{Pm2InsomniaError, Result};
use crate::loader::{discover_inputs, load_source};
use crate::transform::TransformEngine;
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Arguments of `pm2insomnia convert`
#[derive(Debug, Clone)]
pub struct ConvertCommandArgs {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub options: ConvertOptions,
    pub format: OutputFormat,
}

/// Conversion result for one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ConvertedDocument>,
}

#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub name: String,
    pub kind: &'static str,
    pub records: usize,
}

#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: Pm2InsomniaError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Load and convert a single file
pub fn convert_file(path: &Path, options: &ConvertOptions, engine: &TransformEngine) -> FileOutcome {
    let result = load_source(path).and_then(|text| convert_source(&text, options, engine));
    FileOutcome {
        path: path.to_path_buf(),
        result,
    }
}

/// Convert files in parallel; outcomes come back in input order
pub async fn convert_batch(
    files: Vec<PathBuf>,
    options: ConvertOptions,
    engine: Arc<TransformEngine>,
) -> Vec<FileOutcome> {
    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let engine = Arc::clone(&engine);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || {
                convert_file(&task_path, &options, &engine)
            });
            (path, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (path, handle) in tasks {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => FileOutcome {
                path,
                result: Err(Pm2InsomniaError::TaskFailed(e.to_string())),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// `<stem>.insomnia.<ext>` inside the output directory
pub fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.insomnia.{}", output_stem(input), format.extension()))
}

fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string())
}

/// Output names handed out during one batch
///
/// Inputs sharing a file stem get `<stem>-1`, `<stem>-2`, ... in input order
/// so that no converted file overwrites another from the same run.
#[derive(Debug)]
pub struct OutputNames {
    output_dir: PathBuf,
    format: OutputFormat,
    taken: HashSet<PathBuf>,
}

impl OutputNames {
    pub fn new(output_dir: &Path, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            format,
            taken: HashSet::new(),
        }
    }

    /// Reserve the output path for `input`
    pub fn allocate(&mut self, input: &Path) -> PathBuf {
        let mut path = output_path(&self.output_dir, input, self.format);
        let stem = output_stem(input);
        let mut suffix = 0;
        while self.taken.contains(&path) {
            suffix += 1;
            path = self.output_dir.join(format!(
                "{}-{}.insomnia.{}",
                stem,
                suffix,
                self.format.extension()
            ));
        }
        if suffix > 0 {
            debug!(input = %input.display(), output = %path.display(), "Output name taken, using suffix");
        }
        self.taken.insert(path.clone());
        path
    }
}

fn write_document(document: &ConvertedDocument, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Yaml => document.to_yaml()?,
        OutputFormat::Json => document.to_json()?,
    };
    fs::write(path, content)?;
    Ok(())
}

/// Execute the convert command
pub async fn execute_convert(args: &ConvertCommandArgs) -> Result<BatchReport> {
    let files = discover_inputs(&args.inputs)?;
    let mut report = BatchReport::default();

    if files.is_empty() {
        println!("{} No input files found", "!".yellow());
        return Ok(report);
    }

    let engine = Arc::new(load_engine(args.config.as_deref()));
    fs::create_dir_all(&args.output_dir).map_err(|e| {
        Pm2InsomniaError::InvalidPath(format!(
            "Failed to create output directory {}: {}",
            args.output_dir.display(),
            e
        ))
    })?;

    println!(
        "{} Converting {} file(s) into {}",
        "→".blue(),
        files.len(),
        args.output_dir.display()
    );

    let mut names = OutputNames::new(&args.output_dir, args.format);
    for outcome in convert_batch(files, args.options, engine).await {
        let written = outcome.result.and_then(|document| {
            let output = names.allocate(&outcome.path);
            write_document(&document, &output, args.format)?;
            Ok(ConvertedFile {
                input: outcome.path.clone(),
                output,
                name: document.name().to_string(),
                kind: document.kind(),
                records: document.record_count(),
            })
        });

        match written {
            Ok(file) => {
                info!(
                    input = %file.input.display(),
                    output = %file.output.display(),
                    records = file.records,
                    "Converted"
                );
                println!(
                    "{} {} -> {} ({} \"{}\", {} entries)",
                    "✓".green(),
                    file.input.display(),
                    file.output.display(),
                    file.kind,
                    file.name,
                    file.records
                );
                report.converted.push(file);
            }
            Err(error) => {
                warn!(input = %outcome.path.display(), error = %error, "Conversion failed");
                println!(
                    "{} {} [{}] {}",
                    "✗".red(),
                    outcome.path.display(),
                    error.kind(),
                    error
                );
                report.failed.push(FailedFile {
                    input: outcome.path,
                    error,
                });
            }
        }
    }

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &BatchReport) {
    println!();
    let summary = format!(
        "{} of {} converted, {} failed",
        report.converted.len(),
        report.total(),
        report.failed.len()
    );
    if report.is_success() {
        println!("{} {}", "✓".green(), summary.bold());
    } else {
        println!("{} {}", "✗".red(), summary.bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("out"), Path::new("in/My API.postman.json"), OutputFormat::Yaml);
        assert_eq!(path, PathBuf::from("out/My API.postman.insomnia.yaml"));

        let path = output_path(Path::new("out"), Path::new("env.json"), OutputFormat::Json);
        assert_eq!(path, PathBuf::from("out/env.insomnia.json"));
    }

    #[test]
    fn test_output_names_shared_stem() {
        let mut names = OutputNames::new(Path::new("out"), OutputFormat::Yaml);
        assert_eq!(
            names.allocate(Path::new("a/collection.json")),
            PathBuf::from("out/collection.insomnia.yaml")
        );
        assert_eq!(
            names.allocate(Path::new("b/collection.json")),
            PathBuf::from("out/collection-1.insomnia.yaml")
        );
        assert_eq!(
            names.allocate(Path::new("c/collection.yaml")),
            PathBuf::from("out/collection-2.insomnia.yaml")
        );
        assert_eq!(
            names.allocate(Path::new("other.json")),
            PathBuf::from("out/other.insomnia.yaml")
        );
    }

    #[test]
    fn test_convert_file_missing() {
        let outcome = convert_file(
            Path::new("/nonexistent/a.json"),
            &ConvertOptions::default(),
            &TransformEngine::new(),
        );
        assert!(matches!(outcome.result, Err(Pm2InsomniaError::LoadError(_))));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..6 {
            let path = dir.path().join(format!("env{i}.json"));
            fs::write(&path, format!(r#"{{ "name": "env{i}", "values": [] }}"#)).unwrap();
            files.push(path);
        }

        let outcomes = convert_batch(
            files.clone(),
            ConvertOptions::default(),
            Arc::new(TransformEngine::new()),
        )
        .await;

        let paths: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(paths, files);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.result.as_ref().unwrap().name(), format!("env{i}"));
        }
    }
}
