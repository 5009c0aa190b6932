//! Corpus sources
//!
//! Two kinds of input feed the extractor:
//! - a raw text corpus, one candidate sentence per line ([`Corpus`]);
//! - already parsed CoNLL-U files ([`Treebank`]).
//!
//! Files ending in `.gz` are decompressed transparently. Glob patterns are
//! expanded in sorted order so runs are deterministic, which checkpoint
//! resumption relies on.

use crate::conllu::CoNLLUReader;
use crate::tree::Tree;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("no input files match {0}")]
    NoMatches(String),
}

/// Open a file for buffered reading, decompressing `.gz`
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gz = path.extension().is_some_and(|ext| ext == "gz");
    let reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Expand patterns into sorted file paths; plain paths pass through
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, CorpusError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        if matched.is_empty() {
            return Err(CorpusError::NoMatches(pattern.to_string()));
        }
        matched.sort();
        paths.extend(matched);
    }
    Ok(paths)
}

/// Raw text corpus: trimmed, non-blank lines in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    lines: Vec<String>,
}

impl Corpus {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(lines))
    }

    /// Concatenate several files in the given order
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, CorpusError> {
        let mut lines = Vec::new();
        for path in paths {
            let corpus = open_reader(path)
                .and_then(Self::from_reader)
                .map_err(|source| CorpusError::Io {
                    path: path.clone(),
                    source,
                })?;
            lines.extend(corpus.lines);
        }
        Ok(Self { lines })
    }

    pub fn from_glob(pattern: &str) -> Result<Self, CorpusError> {
        Self::from_paths(&expand_inputs(&[pattern])?)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Source of trees for a treebank
#[derive(Debug, Clone)]
enum TreeSource {
    /// In-memory CoNLL-U text
    String(String),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

/// Collection of parsed trees from CoNLL-U text or files
///
/// Unreadable files and malformed sentences are logged and skipped.
#[derive(Debug, Clone)]
pub struct Treebank {
    source: TreeSource,
}

impl Treebank {
    pub fn from_string(text: &str) -> Self {
        Self {
            source: TreeSource::String(text.to_string()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self::from_paths(vec![path.as_ref().to_path_buf()])
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            source: TreeSource::Files(paths),
        }
    }

    /// Files are processed in sorted order for deterministic results
    pub fn from_glob(pattern: &str) -> Result<Self, CorpusError> {
        Ok(Self::from_paths(expand_inputs(&[pattern])?))
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Tree>> {
        self.clone().into_iter()
    }
}

impl IntoIterator for Treebank {
    type Item = Tree;
    type IntoIter = Box<dyn Iterator<Item = Tree>>;

    fn into_iter(self) -> Self::IntoIter {
        match self.source {
            TreeSource::String(text) => {
                let reader = CoNLLUReader::new(Cursor::new(text));
                Box::new(skip_bad_trees(reader, PathBuf::from("<string>")))
            }
            TreeSource::Files(paths) => Box::new(paths.into_iter().flat_map(open_file_trees)),
        }
    }
}

fn skip_bad_trees<R: BufRead>(
    reader: CoNLLUReader<R>,
    path: PathBuf,
) -> impl Iterator<Item = Tree> {
    reader.filter_map(move |result| match result {
        Ok(tree) => Some(tree),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping malformed sentence");
            None
        }
    })
}

/// Open a file and iterate its trees; an unreadable file yields nothing
fn open_file_trees(path: PathBuf) -> Box<dyn Iterator<Item = Tree>> {
    match open_reader(&path) {
        Ok(reader) => Box::new(skip_bad_trees(CoNLLUReader::new(reader), path)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open treebank file");
            Box::new(std::iter::empty())
        }
    }
}
