use clap::{Parser, Subcommand};
use kanji_topics::algo::partition::DEFAULT_MAX_CATEGORY_SIZE;
use kanji_topics::algo::taxonomy;
use kanji_topics::{ops, Result, TopicError};
use serde_json::Value;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kanji-topics",
    version,
    about = "Kanji topic classification and partitioning engine"
)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the topic mapping for a kanji source document
    Classify {
        /// Source JSON file (default: stdin)
        #[arg(short, long)]
        input: Option<String>,
        /// Write the mapping here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Path to taxonomy JSON file (default: $KANJI_TOPICS_TAXONOMY, XDG data dir, then built-in)
        #[arg(short, long)]
        taxonomy: Option<String>,
        /// Maximum kanji per category
        #[arg(short, long, default_value_t = DEFAULT_MAX_CATEGORY_SIZE)]
        max_size: usize,
        /// Override the taxonomy's neutral category key
        #[arg(short, long)]
        neutral: Option<String>,
    },
    /// Show how each kanji is routed without partitioning
    Explain {
        /// Source JSON file (default: stdin)
        #[arg(short, long)]
        input: Option<String>,
        /// Path to taxonomy JSON file
        #[arg(short, long)]
        taxonomy: Option<String>,
        /// Override the taxonomy's neutral category key
        #[arg(short, long)]
        neutral: Option<String>,
    },
    /// Print the built-in taxonomy (or --taxonomy), list its categories, or validate a file
    Taxonomy {
        /// Validate this taxonomy file and report problems
        #[arg(long, conflicts_with = "list")]
        validate: Option<String>,
        /// List the active taxonomy's categories in evaluation order
        #[arg(short, long)]
        list: bool,
        /// Path to taxonomy JSON file to print or list
        #[arg(short, long)]
        taxonomy: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or_else(|| {
        eprintln!("No subcommand provided. Run `kanji-topics --help` for usage.");
        std::process::exit(1);
    });

    let result = match command {
        Commands::Classify {
            input,
            output,
            taxonomy: tax,
            max_size,
            neutral,
        } => cmd_classify(
            input.as_deref(),
            output.as_deref(),
            tax.as_deref(),
            max_size,
            neutral.as_deref(),
        ),
        Commands::Explain {
            input,
            taxonomy: tax,
            neutral,
        } => cmd_explain(input.as_deref(), tax.as_deref(), neutral.as_deref()),
        Commands::Taxonomy {
            validate,
            list,
            taxonomy: tax,
        } => cmd_taxonomy(validate.as_deref(), list, tax.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn read_json(path: Option<&str>) -> Result<Value> {
    let (label, text) = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|source| TopicError::Io {
                path: p.to_string(),
                source,
            })?;
            (p, text)
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| TopicError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            ("<stdin>", buf)
        }
    };
    tracing::debug!(source = label, bytes = text.len(), "read source");
    serde_json::from_str(&text).map_err(|source| TopicError::Json {
        what: "source document",
        source,
    })
}

fn write_output(text: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, format!("{text}\n")).map_err(|source| TopicError::Io {
            path: p.to_string(),
            source,
        }),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn pretty(value: &impl serde::Serialize, what: &'static str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| TopicError::Json { what, source })
}

fn cmd_classify(
    input: Option<&str>,
    output: Option<&str>,
    taxonomy_path: Option<&str>,
    max_size: usize,
    neutral: Option<&str>,
) -> Result<()> {
    let source = read_json(input)?;
    let doc = ops::classify_source(&source, taxonomy_path, max_size, neutral)?;
    write_output(&doc.to_json_pretty()?, output)?;
    if let Some(p) = output {
        eprintln!(
            "Wrote {} categories ({} kanji, {} coverage) to {p}",
            doc.summary.total_categories, doc.summary.total_kanji, doc.summary.coverage
        );
    }
    Ok(())
}

fn cmd_explain(
    input: Option<&str>,
    taxonomy_path: Option<&str>,
    neutral: Option<&str>,
) -> Result<()> {
    let source = read_json(input)?;
    let rows = ops::op_explain(&source, taxonomy_path, neutral)?;
    write_output(&pretty(&rows, "routing table")?, None)
}

fn cmd_taxonomy(validate: Option<&str>, list: bool, taxonomy_path: Option<&str>) -> Result<()> {
    if let Some(path) = validate {
        let text = std::fs::read_to_string(path).map_err(|source| TopicError::Io {
            path: path.to_string(),
            source,
        })?;
        let report = ops::op_validate_taxonomy(&text);
        write_output(&pretty(&report, "validation report")?, None)?;
        if report["valid"] != Value::Bool(true) {
            std::process::exit(2);
        }
        return Ok(());
    }

    if list {
        let rows = ops::op_list_categories(taxonomy_path)?;
        return write_output(&pretty(&rows, "category list")?, None);
    }

    match taxonomy_path {
        Some(p) => {
            let tax = taxonomy::load_taxonomy(p)?;
            write_output(&pretty(&tax, "taxonomy")?, None)
        }
        None => write_output(taxonomy::embedded_default_json().trim_end(), None),
    }
}
