//! Flatmeta CLI: convert metadata documents to and from annotated row sheets.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use flatmeta::sheet::{self, SheetRow};
use flatmeta::{
    enrich, flatten, unflatten, CodecConfig, Coverage, MarkerScheme, Row, SchemaGraph,
    SheetConfig, Value,
};

#[derive(Debug, Parser)]
#[command(name = "flatmeta")]
#[command(about = "Flatten metadata documents into annotated row sheets and back", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Flatten a YAML or JSON document into a sheet
    Flatten(FlattenArgs),
    /// Rebuild a document from a CSV sheet
    Unflatten(UnflattenArgs),
    /// Add example and description columns to an existing CSV sheet
    Enrich(EnrichArgs),
    /// Print the description and example of one dotted field path
    Lookup(LookupArgs),
    /// Write one schema with every schema it references inlined
    Bundle(BundleArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Directory of JSON/YAML schema files
    #[arg(long, default_value = "schemas")]
    schema_dir: PathBuf,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory the output file is written to
    #[arg(short, long, default_value = "generated")]
    output_dir: PathBuf,

    /// List item marker scheme
    #[arg(long, value_enum, default_value_t = MarkerScheme::Indexed)]
    markers: MarkerScheme,
}

#[derive(Debug, Parser)]
struct FlattenArgs {
    /// Input document (.yaml, .yml or .json)
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    schema: SchemaArgs,

    /// Write base rows only, without schema annotations
    #[arg(long)]
    no_enrichment: bool,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    format: SheetFormat,

    /// Write one file per top-level field
    #[arg(long)]
    split: bool,
}

#[derive(Debug, Parser)]
struct UnflattenArgs {
    /// Input sheet (.csv)
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Output format
    #[arg(short, long, default_value = "yaml")]
    format: DocumentFormat,
}

#[derive(Debug, Parser)]
struct EnrichArgs {
    /// Input sheet (.csv)
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    schema: SchemaArgs,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    format: SheetFormat,
}

#[derive(Debug, Parser)]
struct LookupArgs {
    /// Dotted field path, e.g. curation.process.role
    path: String,

    #[command(flatten)]
    schema: SchemaArgs,
}

#[derive(Debug, Parser)]
struct BundleArgs {
    /// File stem of the schema to bundle, e.g. system
    name: String,

    #[command(flatten)]
    schema: SchemaArgs,

    /// Directory the bundled schema is written to
    #[arg(short, long, default_value = "generated")]
    output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SheetFormat {
    Csv,
    Markdown,
}

impl SheetFormat {
    fn extension(self) -> &'static str {
        match self {
            SheetFormat::Csv => "csv",
            SheetFormat::Markdown => "md",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DocumentFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Flatten(args) => run_flatten(args),
        Command::Unflatten(args) => run_unflatten(args),
        Command::Enrich(args) => run_enrich(args),
        Command::Lookup(args) => run_lookup(args),
        Command::Bundle(args) => run_bundle(args),
    }
}

fn run_flatten(args: FlattenArgs) -> Result<()> {
    let scheme = args.output.markers;
    let config = CodecConfig::default().with_markers(scheme);

    println!("Loading {}", args.input.display());
    let tree = read_document(&args.input)?;
    let rows = flatten(&tree, &config)
        .with_context(|| format!("Failed to flatten {}", args.input.display()))?;
    println!("Processed {} fields", rows.len());

    let stem = file_stem(&args.input)?;
    if args.no_enrichment {
        write_output(&rows, &stem, &args.output, args.format, args.split)
    } else {
        let graph = load_graph(&args.schema.schema_dir)?;
        let enriched = enrich(&rows, &graph);
        report_coverage(Coverage::of(&enriched));
        write_output(&enriched, &stem, &args.output, args.format, args.split)
    }
}

fn run_unflatten(args: UnflattenArgs) -> Result<()> {
    let config = CodecConfig::default().with_markers(args.output.markers);

    let rows = read_sheet(&args.input, &config)?;
    let tree = unflatten(&rows, &config)
        .with_context(|| format!("Failed to unflatten {}", args.input.display()))?;

    let (extension, text) = match args.format {
        DocumentFormat::Yaml => ("yaml", serde_yaml::to_string(&tree)?),
        DocumentFormat::Json => ("json", serde_json::to_string_pretty(&tree)?),
    };
    let path = output_path(&args.output.output_dir, &file_stem(&args.input)?, extension)?;
    std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✓ {}", path.display());
    Ok(())
}

fn run_enrich(args: EnrichArgs) -> Result<()> {
    let config = CodecConfig::default().with_markers(args.output.markers);

    let rows = read_sheet(&args.input, &config)?;
    println!("Processed {} fields", rows.len());
    let graph = load_graph(&args.schema.schema_dir)?;
    let enriched = enrich(&rows, &graph);
    report_coverage(Coverage::of(&enriched));

    write_output(&enriched, &file_stem(&args.input)?, &args.output, args.format, false)
}

fn run_lookup(args: LookupArgs) -> Result<()> {
    let graph = load_graph(&args.schema.schema_dir)?;
    let info = graph.field_info(&args.path);
    if info.is_empty() {
        bail!("No schema annotations for {}", args.path);
    }
    println!("Path:        {}", args.path);
    println!("Description: {}", info.description.unwrap_or_default());
    println!(
        "Example:     {}",
        info.example.map(|e| e.to_string()).unwrap_or_default()
    );
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<()> {
    let graph = load_graph(&args.schema.schema_dir)?;
    let bundled = graph
        .bundle(&args.name)
        .with_context(|| format!("Failed to bundle {}", args.name))?;
    let path = output_path(&args.output_dir, &args.name, "json")?;
    std::fs::write(&path, serde_json::to_string_pretty(&bundled)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✓ {}", path.display());
    Ok(())
}

fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let value = if is_json {
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("Invalid YAML in {}", path.display()))?
    };
    Ok(value)
}

fn read_sheet(path: &Path, config: &CodecConfig) -> Result<Vec<Row>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = sheet::read_rows(BufReader::new(file), &SheetConfig::csv(), config)
        .with_context(|| format!("Failed to read rows from {}", path.display()))?;
    Ok(rows)
}

fn load_graph(dir: &Path) -> Result<SchemaGraph> {
    let graph = SchemaGraph::load(dir)
        .with_context(|| format!("Failed to load schemas from {}", dir.display()))?;
    eprintln!(
        "Loaded {} schema files ({} lookup keys)",
        graph.documents().len(),
        graph.len()
    );
    Ok(graph)
}

fn report_coverage(coverage: Coverage) {
    println!(
        "Enrichment: {}/{} fields ({:.1}%) have descriptions",
        coverage.described,
        coverage.total,
        coverage.percent()
    );
}

fn write_output<T: SheetRow + Clone>(
    rows: &[T],
    stem: &str,
    output: &OutputArgs,
    format: SheetFormat,
    split: bool,
) -> Result<()> {
    let scheme = output.markers;
    if split {
        for section in sheet::split_sections(rows) {
            let name = format!("{}_{}", stem, section.file_name());
            write_sheet(&section.rows, &name, output, scheme, format)?;
        }
        Ok(())
    } else {
        write_sheet(rows, stem, output, scheme, format)
    }
}

fn write_sheet<T: SheetRow>(
    rows: &[T],
    name: &str,
    output: &OutputArgs,
    scheme: MarkerScheme,
    format: SheetFormat,
) -> Result<()> {
    let path = output_path(&output.output_dir, name, format.extension())?;
    match format {
        SheetFormat::Csv => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            sheet::write_rows(BufWriter::new(file), rows, scheme, &SheetConfig::csv())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        SheetFormat::Markdown => {
            std::fs::write(&path, sheet::render_markdown(rows, scheme))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    println!("✓ {}", path.display());
    Ok(())
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {}", path.display()))
}

fn output_path(dir: &Path, name: &str, extension: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir.join(format!("{}.{}", name, extension)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flatten_defaults() {
        let cli = Cli::parse_from(["flatmeta", "flatten", "meta.yaml"]);
        match cli.command {
            Command::Flatten(args) => {
                assert_eq!(args.input, PathBuf::from("meta.yaml"));
                assert_eq!(args.output.output_dir, PathBuf::from("generated"));
                assert_eq!(args.schema.schema_dir, PathBuf::from("schemas"));
                assert!(!args.no_enrichment);
                assert_eq!(args.output.markers, MarkerScheme::Indexed);
                assert!(matches!(args.format, SheetFormat::Csv));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_unflatten_options() {
        let cli = Cli::parse_from([
            "flatmeta", "unflatten", "meta.csv", "--markers", "letters", "--format", "json",
        ]);
        match cli.command {
            Command::Unflatten(args) => {
                assert_eq!(args.output.markers, MarkerScheme::Letters);
                assert!(matches!(args.format, DocumentFormat::Json));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_bundle() {
        let cli = Cli::parse_from(["flatmeta", "bundle", "system", "--schema-dir", "defs"]);
        match cli.command {
            Command::Bundle(args) => {
                assert_eq!(args.name, "system");
                assert_eq!(args.schema.schema_dir, PathBuf::from("defs"));
                assert_eq!(args.output_dir, PathBuf::from("generated"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("dir/meta.yaml")).unwrap(), "meta");
    }
}
