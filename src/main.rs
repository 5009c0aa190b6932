use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use syntaxmine::corpus::expand_inputs;
use syntaxmine::{
    CommandParser, Corpus, DependencyParser, ExtractConfig, Extractor, PipeParser,
    PreparsedParser, Treebank,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// One sentence per line, parsed by --parser-cmd
    Text,
    /// Already parsed CoNLL-U; each sentence's `# text` is its line
    Conllu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ParserMode {
    /// Start the parser command once per line
    PerLine,
    /// Keep one parser process running; it ends each answer with `# done`
    Persistent,
}

#[derive(Parser, Debug)]
#[command(name = "syntaxmine")]
#[command(about = "Extract preposing, passive, and inversion sentences from a parsed corpus")]
#[command(version)]
struct Args {
    /// Input files or glob patterns (`.gz` is decompressed)
    #[arg(required = true)]
    inputs: Vec<String>,

    #[arg(long, value_enum, default_value_t = InputFormat::Text)]
    format: InputFormat,

    /// Parser command: reads a line on stdin, writes CoNLL-U on stdout
    #[arg(long, required_if_eq("format", "text"))]
    parser_cmd: Option<String>,

    /// How the parser command is run; for large corpora prefer `persistent`,
    /// or parse ahead of time and pass `--format conllu`
    #[arg(long, value_enum, default_value_t = ParserMode::PerLine)]
    parser_mode: ParserMode,

    /// Extra argument for the parser command (repeatable)
    #[arg(long = "parser-arg", allow_hyphen_values = true)]
    parser_args: Vec<String>,

    /// Directory for result files and checkpoints
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Lines between checkpoints (0 disables intermediate checkpoints)
    #[arg(long, default_value_t = syntaxmine::driver::DEFAULT_CHECKPOINT_EVERY)]
    checkpoint_every: usize,

    /// Corpus index to start from
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Maximum number of lines to process
    #[arg(long)]
    limit: Option<usize>,

    /// Resume from the checkpoint in the output directory
    #[arg(long)]
    resume: bool,

    /// Delete any checkpoint in the output directory before starting
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Run the passive detector on every line, not only lines containing "by"
    #[arg(long)]
    no_by_prefilter: bool,

    /// Suppress the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40} {pos}/{len} lines [{elapsed_precise} < {eta}]")
    {
        bar.set_style(style);
    }
    bar
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);
    info!(?args, "starting");

    let paths = expand_inputs(&args.inputs)?;

    let (lines, parser): (Vec<String>, Box<dyn DependencyParser>) = match args.format {
        InputFormat::Text => {
            let Some(program) = args.parser_cmd.clone() else {
                bail!("--parser-cmd is required for text input");
            };
            let corpus = Corpus::from_paths(&paths)?;
            let parser: Box<dyn DependencyParser> = match args.parser_mode {
                ParserMode::PerLine => {
                    Box::new(CommandParser::new(program).with_args(args.parser_args.clone()))
                }
                ParserMode::Persistent => {
                    Box::new(PipeParser::new(program).with_args(args.parser_args.clone()))
                }
            };
            (corpus.lines().to_vec(), parser)
        }
        InputFormat::Conllu => {
            let trees: Vec<_> = Treebank::from_paths(paths).into_iter().collect();
            let lines = trees.iter().map(|t| t.text().into_owned()).collect();
            (lines, Box::new(PreparsedParser::from_trees(trees)))
        }
    };
    info!(lines = lines.len(), "corpus loaded");

    let config = ExtractConfig {
        output_dir: args.output_dir.clone(),
        checkpoint_every: args.checkpoint_every,
        start: args.start,
        limit: args.limit,
        resume: args.resume,
        fresh: args.fresh,
        by_prefilter: !args.no_by_prefilter,
    };

    let mut extractor = Extractor::new(parser, config);
    let progress = progress_bar(args.no_progress);
    let (results, summary) = extractor
        .run_with_progress(&lines, &progress)
        .context("extraction failed")?;

    let written = extractor.write_results(&results)?;
    for ((construction, count), path) in results.counts().iter().zip(&written) {
        info!(%construction, count, path = %path.display(), "results written");
    }
    info!(
        lines = summary.lines_processed,
        sentences = summary.sentences,
        skipped = summary.skipped,
        next_index = summary.next_index,
        "done"
    );

    Ok(())
}
