use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oap_core::config::{self, CONFIG_FILE_NAME, PrepConfig};
use oap_core::parse::{self, refs, spec::OpenApiDocument};
use oap_core::transform::{ReachabilityExtractor, split_operation_id};
use oap_core::{PrepReport, prepare};

#[derive(Parser)]
#[command(
    name = "oap",
    about = "Prepare OpenAPI documents for strongly-typed code generators",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, annotate and extract an OpenAPI document
    Prepare(PrepareArgs),

    /// Check that a document loads and its references resolve
    Validate {
        /// Path to the OpenAPI document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the endpoints of a document with their derived groups
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Separator used to derive groups from operationIds
        #[arg(long)]
        separator: Option<String>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new oap configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct PrepareArgs {
    /// Path to the OpenAPI document (JSON or YAML)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the prepared JSON; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file; defaults to ./.oap.yaml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the operationId separator
    #[arg(long)]
    separator: Option<String>,

    /// Select every operation
    #[arg(long)]
    include_all: bool,

    /// Select every operation carrying this tag
    #[arg(long)]
    tag: Option<String>,

    /// Additional operationIds to select
    #[arg(long = "operation", value_name = "OPERATION_ID")]
    operations: Vec<String>,

    /// operationIds to drop from the selection
    #[arg(long = "exclude", value_name = "OPERATION_ID")]
    excludes: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare(args) => cmd_prepare(args),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect {
            input,
            separator,
            format,
        } => cmd_inspect(input, separator, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oap", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config named on the command line, or the project config file
/// from the current directory if there is one.
fn resolve_config(path: Option<&Path>) -> Result<PrepConfig> {
    match path {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            config::load_config(path)?
                .with_context(|| format!("config file {} not found", path.display()))
        }
        None => Ok(config::load_config(Path::new(CONFIG_FILE_NAME))?.unwrap_or_default()),
    }
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(cfg: &mut PrepConfig, args: &PrepareArgs) {
    if let Some(separator) = &args.separator {
        cfg.separator = Some(separator.clone());
    }
    if args.include_all {
        cfg.include_all = true;
    }
    if let Some(tag) = &args.tag {
        cfg.extract_by_tag = true;
        cfg.target_tag = tag.clone();
    }
    cfg.operation_ids.extend(args.operations.iter().cloned());
    cfg.exclude_operation_ids.extend(args.excludes.iter().cloned());
}

fn load_document(path: &Path) -> Result<OpenApiDocument> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let doc = match ext {
        "yaml" | "yml" => {
            let content = String::from_utf8(bytes)
                .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
            parse::from_yaml(&content)
        }
        _ => parse::from_slice(&bytes),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(doc)
}

fn cmd_prepare(args: PrepareArgs) -> Result<()> {
    let mut cfg = resolve_config(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);

    let doc = load_document(&args.input)?;
    log::info!("preparing {}", args.input.display());
    let extractor = ReachabilityExtractor::new(cfg.extract.clone());
    let prepared = prepare(doc, &cfg, &extractor)?;
    let json = parse::to_json_pretty(&prepared.document)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    print_report(&prepared.report);
    Ok(())
}

fn print_report(report: &PrepReport) {
    for (from, to) in &report.renamed {
        eprintln!("  renamed {from} → {to}");
    }
    for shape in &report.unknown_shapes {
        eprintln!("  unknown variant shape at {shape}");
    }
    for id in &report.selection.conflicts {
        eprintln!("  warning: {id} is both selected and excluded; excluded");
    }
    for id in &report.selection.missing {
        eprintln!("  warning: {id} not found in document");
    }
    eprintln!(
        "Selected {} operations ({} cached, {} split into groups)",
        report.selection.operation_ids.len(),
        report.cached_operations,
        report.split_operations,
    );
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let doc = load_document(&input)?;

    eprintln!("Valid OpenAPI {} document: {}", doc.openapi, doc.info.title);
    if let Some(version) = &doc.info.version {
        eprintln!("  Version: {version}");
    }
    eprintln!("  Paths: {}", doc.paths.as_ref().map_or(0, |paths| paths.len()));
    eprintln!("  Operations: {}", doc.operations().count());

    if let Some(components) = &doc.components {
        let schemas = components.schemas.as_ref().map_or(0, |schemas| schemas.len());
        eprintln!("  Schemas: {schemas}");
    }

    refs::check_references(&doc)?;
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, separator: Option<String>, format: InspectFormat) -> Result<()> {
    let doc = load_document(&input)?;
    let summary = build_inspect_summary(&doc, separator.as_deref());

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(doc: &OpenApiDocument, separator: Option<&str>) -> serde_json::Value {
    let endpoints: Vec<serde_json::Value> = doc
        .operations()
        .map(|(path, method, op)| {
            let parts = op
                .operation_id
                .as_deref()
                .map(|id| split_operation_id(id, separator, op.primary_tag()));
            serde_json::json!({
                "path": path,
                "method": method,
                "operationId": op.operation_id,
                "tags": op.tags.as_deref().unwrap_or_default(),
                "group": parts.as_ref().and_then(|p| p.group.clone()),
                "subOperationId": parts.map(|p| p.sub_operation_id),
            })
        })
        .collect();

    let schemas: Vec<&String> = doc
        .components
        .iter()
        .filter_map(|c| c.schemas.as_ref())
        .flat_map(|schemas| schemas.keys())
        .collect();

    serde_json::json!({
        "info": {
            "title": doc.info.title,
            "version": doc.info.version,
        },
        "endpoints": endpoints,
        "schemas": schemas,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn document() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Git", "version": "1.2"},
            "paths": {
                "/commits/{ref}": {"get": {
                    "operationId": "repos/get-commit",
                    "tags": ["repos"],
                    "responses": {"200": {"description": "ok", "content": {"application/json": {
                        "schema": {"$ref": "#/components/schemas/Model"}
                    }}}}
                }},
                "/comments": {"post": {
                    "operationId": "repos/create-commit-comment",
                    "responses": {"201": {"description": "created"}}
                }}
            },
            "components": {"schemas": {"Model": {"type": "object"}}}
        })
    }

    fn prepare_args(dir: &TempDir, input: PathBuf) -> PrepareArgs {
        PrepareArgs {
            input,
            output: Some(dir.path().join("out").join("prepared.json")),
            config: None,
            separator: None,
            include_all: false,
            tag: None,
            operations: Vec::new(),
            excludes: Vec::new(),
        }
    }

    #[test]
    fn prepare_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("api.json");
        fs::write(&input, document().to_string()).unwrap();

        let config = dir.path().join("prep.yaml");
        fs::write(
            &config,
            "operationIds: [repos/get-commit]\nseparator: \"/\"\ncachePolicy:\n  repos/get-commit: 60\n",
        )
        .unwrap();

        let mut args = prepare_args(&dir, input);
        args.config = Some(config);
        let output = args.output.clone().unwrap();
        cmd_prepare(args).unwrap();

        let out: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(out["info"]["version"], "1.2.0");
        let op = &out["paths"]["/commits/{ref}"]["get"];
        assert_eq!(op["x-group"], "repos");
        assert_eq!(op["x-sub-operation-id"], "get_commit");
        assert_eq!(op["x-cache"]["params"]["time"], 60);
        assert!(out["paths"].get("/comments").is_none());
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ApiModel"
        );
    }

    #[test]
    fn flags_override_config() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("api.yaml");
        fs::write(&input, serde_yaml_ng::to_string(&document()).unwrap()).unwrap();

        let mut args = prepare_args(&dir, input);
        args.include_all = true;
        args.excludes = vec!["repos/get-commit".to_string()];
        let output = args.output.clone().unwrap();
        cmd_prepare(args).unwrap();

        let out: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        let paths: Vec<&String> = out["paths"].as_object().unwrap().keys().collect();
        assert_eq!(paths, vec!["/comments"]);
        assert!(out.get("components").is_none());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_config(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_document_reports_the_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, "{\"openapi\": ").unwrap();
        let err = load_document(&input).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn inspect_summary_lists_groups() {
        let doc = parse::from_value(document()).unwrap();
        let summary = build_inspect_summary(&doc, Some("/"));
        assert_eq!(summary["endpoints"][0]["group"], "repos");
        assert_eq!(summary["endpoints"][0]["subOperationId"], "get_commit");
        assert_eq!(summary["endpoints"][1]["method"], "post");
        assert_eq!(summary["schemas"], json!(["Model"]));
    }
}
