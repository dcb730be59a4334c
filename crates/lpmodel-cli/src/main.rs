mod document;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use document::{DocumentError, ModelDocument};
use lpmodel_core::{LpMatrices, Model, ModelConfig};

#[derive(Parser)]
#[command(name = "lpmodel")]
#[command(about = "Compile JSON linear program descriptions into solver matrices", long_about = None)]
struct Cli {
    /// Log model construction steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the model and print the assembled matrices
    Build {
        /// The model file (JSON)
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
        /// Magnitude used for unset bounds
        #[arg(long)]
        infinity: Option<f64>,
    },
    /// Check a model file for errors
    Check {
        /// The model file (JSON)
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(file: &Path, config: ModelConfig) -> Result<Model, DocumentError> {
    tracing::debug!(
        component = "cli",
        operation = "load",
        file = %file.display(),
        "Loading model"
    );
    let source = std::fs::read_to_string(file)?;
    ModelDocument::from_json(&source)?.build(config)
}

fn print_pretty(model: &Model, lp: &LpMatrices) {
    let (rows, cols) = lp.matrix.shape();
    println!("Rows: {}", rows);
    println!("Columns: {}", cols);
    println!("Non-zeros: {}", lp.matrix.nnz());
    println!();

    println!("Columns by block:");
    let inds = model.index_factory();
    for name in &lp.column_blocks {
        if let Some(ranges) = inds.var_ranges(name) {
            for range in ranges {
                println!("  {:20} {}..{}", name, range.start, range.end);
            }
        }
    }
    println!();

    println!("Rows by constraint:");
    for name in inds.const_names() {
        if let Some(ranges) = inds.const_ranges(name) {
            for range in ranges {
                println!("  {:20} {}..{}", name, range.start, range.end);
            }
        }
    }
    println!();

    println!("Coefficients:");
    for (value, (row, col)) in lp.matrix.iter() {
        println!("  ({:4}, {:4}) {:12.4}", row, col, value);
    }
    println!();

    println!("Row bounds:");
    for (i, (lo, up)) in lp.row_lower.iter().zip(&lp.row_upper).enumerate() {
        println!("  {:4} [{:e}, {:e}]", i, lo, up);
    }
    println!();

    println!("Column bounds:");
    for (i, ((lo, up), is_int)) in lp
        .col_lower
        .iter()
        .zip(&lp.col_upper)
        .zip(&lp.col_is_int)
        .enumerate()
    {
        let kind = if *is_int { "int" } else { "" };
        println!("  {:4} [{:e}, {:e}] {}", i, lo, up, kind);
    }

    if model.objective().is_some() {
        println!();
        println!("Objective:");
        for (i, c) in lp.objective.iter().enumerate() {
            if *c != 0.0 {
                println!("  {:4} {:12.4}", i, c);
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            file,
            format,
            infinity,
        } => {
            let mut config = ModelConfig::default();
            if let Some(infinity) = infinity {
                config = config.with_infinity(infinity);
            }

            let model = match load(&file, config) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let Some(lp) = model.matrices() else {
                eprintln!("Error: model was not assembled");
                std::process::exit(1);
            };

            match format {
                Format::Json => match serde_json::to_string_pretty(lp) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing matrices: {}", e);
                        std::process::exit(1);
                    }
                },
                Format::Pretty => print_pretty(&model, lp),
            }
        }
        Commands::Check { file } => match load(&file, ModelConfig::default()) {
            Ok(model) => {
                println!(
                    "OK: {} variable blocks, {} constraints ({} rows), objective: {}",
                    model.variables().len(),
                    model.constraints().len(),
                    model.n_rows(),
                    if model.objective().is_some() { "yes" } else { "no" }
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
