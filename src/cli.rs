use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gradeval",
    version,
    about = "Graded-relevance evaluation of ranked retrieval runs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Evaluate(EvaluateArgs),
    Measures(MeasuresArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Relevance judgments in TREC qrels format (plain, .gz or .zst).
    #[arg(long)]
    pub qrels: PathBuf,

    /// Ranked results in TREC run format (plain, .gz or .zst).
    #[arg(long)]
    pub run: PathBuf,

    /// Measure selection: `name`, `name.p1,p2,...` or `all`.
    #[arg(short = 'm', long = "measure")]
    pub measures: Vec<String>,

    #[arg(short = 'l', long, default_value_t = 1)]
    pub relevance_level: u32,

    #[arg(short = 'J', long, default_value_t = false)]
    pub judged_only: bool,

    #[arg(short = 'c', long, default_value_t = false)]
    pub complete: bool,

    #[arg(short = 'M', long)]
    pub max_docs: Option<usize>,

    #[arg(short = 'q', long, default_value_t = false)]
    pub per_query: bool,

    #[arg(long)]
    pub report_json: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MeasuresArgs {
    #[arg(long, default_value_t = false)]
    pub names_only: bool,
}
