//! CLI: (schema | derive) → description, (validate | coerce) → per-document results
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use json_shape::{FieldFilter, TypeVariant, from_json_schema, from_record};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// declare JSON shapes from JSON Schema or example records, then validate or coerce documents against them
#[derive(Parser, Debug)]
#[command(name = "json-shape", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive from a JSON Schema document and print the normalized schema
    Schema(SchemaOut),
    /// derive from an example record and print its schema
    Derive(DeriveOut),
    /// validate documents and report every failure
    Validate(ValidateRun),
    /// coerce documents and print their typed form
    Coerce(CoerceRun),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterSettings {
    /// keep only these root fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// drop these root fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    except: Vec<String>,
}

#[derive(Args, Debug)]
struct SchemaOut {
    /// JSON Schema document
    #[arg(long)]
    schema: PathBuf,

    #[command(flatten)]
    filter: FilterSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DeriveOut {
    /// example record (a single JSON object)
    #[arg(long, short)]
    input: PathBuf,

    #[command(flatten)]
    filter: FilterSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateRun {
    /// JSON Schema document
    #[arg(long)]
    schema: PathBuf,

    #[command(flatten)]
    filter: FilterSettings,

    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(Args, Debug)]
struct CoerceRun {
    /// JSON Schema document
    #[arg(long)]
    schema: PathBuf,

    #[command(flatten)]
    filter: FilterSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One loaded document and where it came from (`path` or `path:line`).
#[derive(Debug)]
struct Document {
    label: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl FilterSettings {
    fn to_filter(&self) -> FieldFilter {
        let base = if self.only.is_empty() {
            FieldFilter::all()
        } else {
            FieldFilter::only(self.only.iter().cloned())
        };
        base.and_except(self.except.iter().cloned())
    }
}

impl InputSettings {
    fn load_documents(&self) -> anyhow::Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (ix, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", ix + 1);
                    let value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse NDJSON line ({label})"))?;
                    documents.push(self.select(label, value)?);
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                documents.push(self.select(source_path_str, value)?);
            }
        }
        tracing::debug!(documents = documents.len(), "loaded input documents");
        Ok(documents)
    }

    fn select(&self, label: String, value: Value) -> anyhow::Result<Document> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {label}"))?,
        };
        Ok(Document { label, value })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Schema(target) => {
                let ty = load_schema_type(&target.schema, &target.filter)?;
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&ty.to_schema())?)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Derive(target) => {
                let record = read_json(&target.input)?;
                let ty = from_record(&record, &target.filter.to_filter())
                    .with_context(|| format!("failed to derive a type from {}", target.input.display()))?;
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&ty.to_schema())?)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Validate(target) => {
                let ty = load_schema_type(&target.schema, &target.filter)?;
                let documents = target.input_settings.load_documents()?;
                let results = documents
                    .par_iter()
                    .map(|doc| (doc, ty.validate(&doc.value)))
                    .collect::<Vec<_>>();
                let mut failures = 0usize;
                for (doc, result) in &results {
                    if result.valid {
                        println!("{} {}", "✅".green(), doc.label);
                        continue;
                    }
                    failures += 1;
                    println!("{} {}", "❌".red(), doc.label.bold());
                    for error in &result.errors {
                        println!("   {} {error}", "-".red());
                    }
                }
                let summary = format!("{} of {} documents valid", results.len() - failures, results.len());
                if failures == 0 {
                    println!("{}", summary.green().bold());
                    Ok(ExitCode::SUCCESS)
                } else {
                    println!("{}", summary.red().bold());
                    Ok(ExitCode::FAILURE)
                }
            }
            Command::Coerce(target) => {
                let ty = load_schema_type(&target.schema, &target.filter)?;
                let documents = target.input_settings.load_documents()?;
                let mut lines = Vec::with_capacity(documents.len());
                let mut failed = false;
                for doc in &documents {
                    match ty.coerce(&doc.value) {
                        Ok(typed) => {
                            let json = typed.to_json();
                            let line = if target.input_settings.ndjson {
                                serde_json::to_string(&json)?
                            } else {
                                serde_json::to_string_pretty(&json)?
                            };
                            lines.push(line);
                        }
                        Err(error) => {
                            failed = true;
                            eprintln!("{} {}: {error}", "❌".red(), doc.label.bold());
                        }
                    }
                }
                write_output(target.out.as_deref(), &lines.join("\n"))?;
                Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("failed to parse JSON ({})", path.display()))
}

fn load_schema_type(path: &Path, filter: &FilterSettings) -> anyhow::Result<TypeVariant> {
    let doc = read_json(path)?;
    from_json_schema(&doc, &filter.to_filter())
        .with_context(|| format!("failed to derive a type from schema {}", path.display()))
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            // an explicit glob that matched nothing is almost always a typo
            bail!("glob pattern matched no files: {pattern}");
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_split_on_commas() {
        let cli = CommandLineInterface::try_parse_from([
            "json-shape", "schema", "--schema", "s.json", "--only", "a,b", "--except", "b",
        ])
        .unwrap();
        let Command::Schema(target) = cli.cmd else { panic!("expected schema command") };
        assert_eq!(target.filter.only, ["a", "b"]);
        assert_eq!(target.filter.except, ["b"]);
        assert!(!target.filter.to_filter().is_all());
    }

    #[test]
    fn validate_requires_inputs() {
        assert!(CommandLineInterface::try_parse_from(["json-shape", "validate", "--schema", "s.json"]).is_err());
        let cli = CommandLineInterface::try_parse_from([
            "json-shape", "validate", "--schema", "s.json", "--ndjson", "-i", "a.ndjson", "b.ndjson",
        ])
        .unwrap();
        let Command::Validate(target) = cli.cmd else { panic!("expected validate command") };
        assert!(target.input_settings.ndjson);
        assert_eq!(target.input_settings.input, ["a.ndjson", "b.ndjson"]);
    }

    #[test]
    fn literal_paths_pass_through_unglobbed() {
        let paths = resolve_file_path_patterns(["does/not/exist.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("does/not/exist.json")]);
        assert!(resolve_file_path_patterns(["/definitely/missing/*.json"]).is_err());
    }

    #[test]
    fn json_pointer_selects_subnode() {
        let settings = InputSettings { ndjson: false, json_pointer: Some("/data/0".into()), input: vec![] };
        let doc = settings.select("x".into(), serde_json::json!({"data": [{"a": 1}]})).unwrap();
        assert_eq!(doc.value, serde_json::json!({"a": 1}));
        assert!(settings.select("x".into(), serde_json::json!({})).is_err());
    }
}
