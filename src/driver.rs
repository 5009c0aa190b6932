//! Batch extraction over a corpus
//!
//! The [`Extractor`] owns the parser and walks corpus lines in order:
//! parse, run every detector on every resulting tree, append hits to the
//! [`ResultSets`] it was handed, and checkpoint every `checkpoint_every`
//! lines. A line the parser fails on is logged and skipped; it produces no
//! row anywhere and is not retried.

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::detector::{Construction, detector_for};
use crate::parser::{DependencyParser, ParseError};
use crate::results::{MatchResult, ResultSets};
use indicatif::ProgressBar;
use memchr::memmem;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_CHECKPOINT_EVERY: usize = 100;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("failed to write results: {0}")]
    Results(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Where checkpoints and result files go
    pub output_dir: PathBuf,
    /// Checkpoint after each line whose index is a multiple of this; 0 disables
    pub checkpoint_every: usize,
    /// First corpus index to process
    pub start: usize,
    /// Stop after this many lines, counted from the resume point
    pub limit: Option<usize>,
    /// Continue from an existing checkpoint in `output_dir`
    pub resume: bool,
    /// Delete any checkpoint in `output_dir` before starting
    pub fresh: bool,
    /// Only run the passive detector on lines containing "by"
    pub by_prefilter: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            start: 0,
            limit: None,
            resume: false,
            fresh: false,
            by_prefilter: true,
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_processed: usize,
    pub sentences: usize,
    pub skipped: usize,
    pub next_index: usize,
}

/// Case-insensitive check for the substring "by"
fn mentions_by(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    memmem::find(lower.as_bytes(), b"by").is_some()
}

pub struct Extractor<P> {
    parser: P,
    config: ExtractConfig,
}

impl<P: DependencyParser> Extractor<P> {
    pub fn new(parser: P, config: ExtractConfig) -> Self {
        Self { parser, config }
    }

    /// Parse one line and record every hit in `results`
    ///
    /// Returns the number of sentences the parser produced.
    pub fn process_line(
        &mut self,
        index: usize,
        line: &str,
        results: &mut ResultSets,
    ) -> Result<usize, ParseError> {
        let trees = self.parser.parse(line)?;
        let run_passive = !self.config.by_prefilter || mentions_by(line);

        for tree in &trees {
            for construction in Construction::ALL {
                if construction == Construction::Passive && !run_passive {
                    continue;
                }
                let detection = detector_for(construction).detect(tree);
                if detection.matched {
                    debug!(index, %construction, phrase = ?detection.phrase, "match");
                    results.push(construction, MatchResult::new(line, detection.phrase));
                }
            }
        }

        Ok(trees.len())
    }

    /// Starting index and results, from the checkpoint when resuming
    fn initial_state(&self) -> Result<(usize, ResultSets), CheckpointError> {
        if self.config.fresh {
            Checkpoint::clear(&self.config.output_dir)?;
            info!(dir = %self.config.output_dir.display(), "discarded old checkpoint");
        }
        if self.config.resume {
            if let Some(checkpoint) = Checkpoint::load(&self.config.output_dir)? {
                info!(
                    next_index = checkpoint.next_index,
                    results = checkpoint.results.total(),
                    "resuming from checkpoint"
                );
                let start = checkpoint.next_index.max(self.config.start);
                return Ok((start, checkpoint.results));
            }
        }
        Ok((self.config.start, ResultSets::new()))
    }

    /// Process `lines` from the configured start, checkpointing as it goes
    pub fn run(&mut self, lines: &[String]) -> Result<(ResultSets, RunSummary), ExtractError> {
        self.run_with_progress(lines, &ProgressBar::hidden())
    }

    pub fn run_with_progress(
        &mut self,
        lines: &[String],
        progress: &ProgressBar,
    ) -> Result<(ResultSets, RunSummary), ExtractError> {
        let (start, mut results) = self.initial_state()?;
        let end = match self.config.limit {
            Some(limit) => start.saturating_add(limit).min(lines.len()),
            None => lines.len(),
        };

        let mut summary = RunSummary {
            next_index: start,
            ..RunSummary::default()
        };
        progress.set_length(lines.len() as u64);
        progress.set_position(start.min(lines.len()) as u64);

        for (index, line) in lines.iter().enumerate().take(end).skip(start) {
            match self.process_line(index, line, &mut results) {
                Ok(sentences) => summary.sentences += sentences,
                Err(e) => {
                    warn!(index, error = %e, "skipping line");
                    summary.skipped += 1;
                }
            }
            summary.lines_processed += 1;
            summary.next_index = index + 1;
            progress.inc(1);

            let every = self.config.checkpoint_every;
            if every > 0 && index % every == 0 {
                self.checkpoint(summary.next_index, &results)?;
            }
        }

        self.checkpoint(summary.next_index, &results)?;
        progress.finish();
        Ok((results, summary))
    }

    fn checkpoint(&self, next_index: usize, results: &ResultSets) -> Result<(), CheckpointError> {
        let checkpoint = Checkpoint::new(next_index, results.clone());
        let path = checkpoint.save(&self.config.output_dir)?;
        info!(next_index, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    /// Write the three result files into the output directory
    pub fn write_results(&self, results: &ResultSets) -> Result<Vec<PathBuf>, ExtractError> {
        Ok(results.write_all(&self.config.output_dir)?)
    }
}
