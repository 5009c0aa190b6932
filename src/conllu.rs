//! CoNLL-U reading and writing
//!
//! The reader turns parser output into [`Tree`]s; the writer renders a tree
//! back in the same ten-column layout, preceded by its metadata comments and
//! a `# text =` comment.
//! Multiword token ranges (`1-2`) and empty nodes (`2.1`) are skipped since
//! the detectors only operate on syntactic words.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Tree, Word, WordId};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Lines, Write};
use std::path::Path;
use thiserror::Error;

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
#[error("CoNLL-U error at line {line_num}: {message}")]
pub struct ConlluError {
    pub line_num: usize,
    pub message: String,
}

impl ConlluError {
    fn new(line_num: usize, message: impl Into<String>) -> Self {
        Self {
            line_num,
            message: message.into(),
        }
    }
}

/// ID column of a token line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    Single(WordId),
    Range(WordId, WordId),
    Decimal(WordId, WordId),
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl CoNLLUReader<BufReader<File>> {
    /// Create a reader from a file path
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl CoNLLUReader<Cursor<String>> {
    /// Create a reader from a string
    pub fn from_string(text: &str) -> Self {
        Self::new(Cursor::new(text.to_string()))
    }
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Tree, ConlluError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tree_lines = Vec::new();
        let mut metadata = HashMap::new();
        let mut sentence_text = None;

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if tree_lines.is_empty() {
                        return None;
                    }
                    // Last sentence without trailing blank line
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(ConlluError::new(
                        self.line_num,
                        format!("IO error: {}", e),
                    )));
                }
                Some(Ok(line)) => {
                    let line = line.trim_end_matches(['\r', '\n']);

                    if line.trim().is_empty() {
                        if !tree_lines.is_empty() {
                            break;
                        }
                        // A comment block with no tokens still belongs to the next sentence
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        parse_comment(comment, &mut metadata, &mut sentence_text);
                        continue;
                    }

                    tree_lines.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_tree(tree_lines, sentence_text, metadata))
    }
}

/// Parse a comment line (starts with #)
fn parse_comment(
    comment: &str,
    metadata: &mut HashMap<String, String>,
    sentence_text: &mut Option<String>,
) {
    if let Some((key, value)) = comment.split_once('=') {
        let key = key.trim();
        let value = value.trim();

        if key == "text" {
            *sentence_text = Some(value.to_string());
        } else {
            metadata.insert(key.to_string(), value.to_string());
        }
    }
}

/// Parse accumulated lines into a Tree
fn parse_tree(
    lines: Vec<(usize, String)>,
    sentence_text: Option<String>,
    metadata: HashMap<String, String>,
) -> Result<Tree, ConlluError> {
    let mut words = Vec::with_capacity(lines.len());

    for (line_num, line) in lines {
        if let Some(word) = parse_line(&line, line_num)? {
            words.push(word);
        }
    }

    Ok(Tree::with_metadata(words, sentence_text, metadata))
}

/// Parse a single token line; `None` for multiword tokens and empty nodes
fn parse_line(line: &str, line_num: usize) -> Result<Option<Word>, ConlluError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ConlluError::new(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    let id = match parse_id(fields[0]).map_err(|msg| ConlluError::new(line_num, msg))? {
        TokenId::Single(id) => id,
        TokenId::Range(..) | TokenId::Decimal(..) => return Ok(None),
    };

    let form = fields[1];
    // Default to form if lemma not specified
    let lemma = if fields[2] == "_" { form } else { fields[2] };
    let head = parse_head(fields[6]).map_err(|msg| ConlluError::new(line_num, msg))?;

    let mut word = Word::new(id, form, lemma, fields[3], head, fields[7]);
    if fields[4] != "_" {
        word = word.with_xpos(fields[4]);
    }
    if fields[5] != "_" {
        word = word.with_feats(fields[5]);
    }

    Ok(Some(word))
}

/// Parse ID field (can be integer, range, or decimal)
fn parse_id(s: &str) -> Result<TokenId, String> {
    let number = |part: &str| {
        part.parse::<WordId>()
            .map_err(|_| format!("Invalid ID: {}", s))
    };

    if let Some((start, end)) = s.split_once('-') {
        Ok(TokenId::Range(number(start)?, number(end)?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Ok(TokenId::Decimal(number(main)?, number(sub)?))
    } else {
        Ok(TokenId::Single(number(s)?))
    }
}

/// Parse HEAD field; `_` is treated like `0`
fn parse_head(s: &str) -> Result<WordId, String> {
    if s == "_" {
        return Ok(0);
    }
    s.parse().map_err(|_| format!("Invalid HEAD: {}", s))
}

/// Write one tree in CoNLL-U, followed by the blank separator line
pub fn write_tree<W: Write>(out: &mut W, tree: &Tree) -> io::Result<()> {
    write!(out, "{}", Conllu(tree))
}

/// Render one tree as CoNLL-U text
pub fn to_conllu(tree: &Tree) -> String {
    Conllu(tree).to_string()
}

/// CoNLL-U view of a tree: metadata comments in key order, `# text =`,
/// one line per word, then the blank separator line
pub struct Conllu<'a>(pub &'a Tree);

impl fmt::Display for Conllu<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.0;

        let mut keys: Vec<&String> = tree.metadata.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "# {} = {}", key, tree.metadata[key])?;
        }
        writeln!(f, "# text = {}", tree.text())?;

        for w in tree.words() {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t_",
                w.id,
                w.form,
                w.lemma,
                w.upos,
                w.xpos.as_deref().unwrap_or("_"),
                w.feats.as_deref().unwrap_or("_"),
                w.head,
                w.deprel,
            )?;
        }
        writeln!(f)
    }
}
