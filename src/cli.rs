//! Minimal CLI: introspection JSON → (graph summary | resolver descriptors)
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use schema_scan::ir::{TypeGraph, TypeNode};
use schema_scan::{introspection, ScannableSchema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build a resolved type graph from GraphQL introspection JSON and print either
/// a summary of it or the resolver descriptors used for code emission
#[derive(Parser, Debug)]
#[command(name = "schema-scan")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print a human-readable summary of the type graph
    Graph(GraphOut),
    /// print the ordered resolver descriptors as JSON
    Plan(PlanOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the introspection result inside each document (e.g. /payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document (e.g. '.data.__schema')
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GraphOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

#[derive(clap::Parser, Debug)]
struct PlanOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One input file and the schema built from it.
struct Built {
    source: PathBuf,
    schema: ScannableSchema,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Read every input, apply pointer/jq selection, and build one schema per
    /// resulting document. Builds are independent and run in parallel.
    fn load_schemas(&self) -> Result<Vec<Built>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;

        let mut documents = Vec::<(PathBuf, Value)>::new();
        for source_path in source_paths {
            for document in self.load_documents(&source_path)? {
                documents.push((source_path.clone(), document));
            }
        }

        documents
            .into_par_iter()
            .map(|(source, document)| {
                let types = introspection::types_from_value(document).with_context(|| {
                    format!("failed to read introspection ({})", source.display())
                })?;
                let schema = ScannableSchema::from_types(&types).with_context(|| {
                    format!("failed to build type graph ({})", source.display())
                })?;
                debug!(source = %source.display(), types = types.len(), "schema built");
                Ok::<_, anyhow::Error>(Built { source, schema })
            })
            .collect()
    }

    fn load_documents(&self, source_path: &Path) -> Result<Vec<Value>> {
        let source_path_str = source_path.display();
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file ({source_path_str})"))?;
        let mut document = schema_scan::path_de::from_str_with_path::<Value>(&source)
            .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;

        if let Some(pointer) = self.json_pointer.as_deref() {
            document = match document.pointer_mut(pointer) {
                Some(selected) => selected.take(),
                None => bail!("JSON pointer {pointer} not found in {source_path_str}"),
            };
        }

        match self.jq_expr.as_deref() {
            None => Ok(vec![document]),
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &document).with_context(|| {
                format!("failed to apply jq expression to source file ({source_path_str})")
            }),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Graph(target) => {
                if target.no_color || target.out.is_some() {
                    colored::control::set_override(false);
                }
                let built = target.input_settings.load_schemas()?;
                let mut text = String::new();
                for (label, entry) in source_labels(&built).into_iter().zip(&built) {
                    if built.len() > 1 {
                        let _ = writeln!(text, "# {label}");
                    }
                    text.push_str(&render_summary(&entry.schema.graph));
                }
                write_output(target.out.as_deref(), &text)
            }
            Command::Plan(target) => {
                let built = target.input_settings.load_schemas()?;
                let json = plan_document(&built)?;
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&json)?)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Descriptors of a single schema as-is; several schemas keyed by their label.
fn plan_document(built: &[Built]) -> Result<Value> {
    if let [only] = built {
        return Ok(serde_json::to_value(&only.schema.descriptors)?);
    }
    let by_source = source_labels(built)
        .into_iter()
        .zip(built)
        .map(|(label, entry)| (label, &entry.schema.descriptors))
        .collect::<IndexMap<_, _>>();
    Ok(serde_json::to_value(by_source)?)
}

/// The source path of each schema, suffixed `#1`, `#2`, ... when one source
/// produced several documents.
fn source_labels(built: &[Built]) -> Vec<String> {
    let mut totals = HashMap::<&Path, usize>::new();
    for entry in built {
        *totals.entry(entry.source.as_path()).or_default() += 1;
    }
    let mut seen = HashMap::<&Path, usize>::new();
    built
        .iter()
        .map(|entry| {
            let source = entry.source.as_path();
            if totals[source] > 1 {
                let n = seen.entry(source).or_default();
                *n += 1;
                format!("{}#{n}", source.display())
            } else {
                source.display().to_string()
            }
        })
        .collect()
}

/// One block per root type, fields listed in GraphQL notation.
fn render_summary(graph: &TypeGraph) -> String {
    let mut out = String::new();
    for root in &graph.roots {
        match root.non_null() {
            TypeNode::Object(id) => {
                let object = graph.object(*id);
                let keyword = if object.is_interface {
                    "interface"
                } else if object.is_input {
                    "input"
                } else {
                    "type"
                };
                let _ = write!(out, "{} {}", keyword.cyan(), object.name.bold());
                if !object.implements.is_empty() {
                    let _ = write!(out, " implements {}", object.implements.join(" & "));
                }
                out.push_str(" {\n");
                for (name, field) in &object.fields {
                    let args = field
                        .arguments
                        .iter()
                        .map(|a| format!("{}: {}", a.name, a.ty.display(graph)))
                        .collect::<Vec<_>>();
                    let args = if args.is_empty() {
                        String::new()
                    } else {
                        format!("({})", args.join(", "))
                    };
                    let ty = field.return_type.display(graph);
                    let _ = writeln!(out, "  {name}{args}: {}", ty.yellow());
                }
                out.push_str("}\n");
            }
            TypeNode::Enum { name, values } => {
                let values = values.join(" ");
                let _ = writeln!(out, "{} {} {{ {values} }}", "enum".cyan(), name.bold());
            }
            TypeNode::Scalar(name) => {
                let _ = writeln!(out, "{} {}", "scalar".cyan(), name.bold());
            }
            TypeNode::Nullable(_) | TypeNode::List(_) => {}
        }
    }
    out
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
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

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
