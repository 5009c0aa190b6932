//! Dependency parser seam
//!
//! Parsing is delegated to an external model. A [`DependencyParser`] takes
//! one raw corpus line and returns zero or more trees; any failure is a
//! [`ParseError`] that the driver logs and skips.
//!
//! [`CommandParser`] starts the parser once per line, which is simple but
//! slow for model-backed parsers. [`PipeParser`] keeps one process alive for
//! the whole run and expects every answer to end with an [`END_OF_PARSE`]
//! line. Already parsed corpora skip both through [`PreparsedParser`].

use crate::conllu::{CoNLLUReader, ConlluError};
use crate::tree::Tree;
use rustc_hash::FxHashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

/// Line a [`PipeParser`] child writes after the CoNLL-U for each input line
pub const END_OF_PARSE: &str = "# done";

/// Failure of the external parser on one input line
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to start parser `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("parser exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("parser I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parser produced malformed output: {0}")]
    Conllu(#[from] ConlluError),

    #[error("no parse available for: {0}")]
    Unparsed(String),

    #[error("parser closed its output before finishing the line")]
    Closed,
}

/// Something that turns a raw line of text into dependency trees
pub trait DependencyParser {
    fn parse(&mut self, text: &str) -> Result<Vec<Tree>, ParseError>;
}

impl<P: DependencyParser + ?Sized> DependencyParser for Box<P> {
    fn parse(&mut self, text: &str) -> Result<Vec<Tree>, ParseError> {
        (**self).parse(text)
    }
}

/// Runs an external command per line: text on stdin, CoNLL-U on stdout
#[derive(Debug, Clone)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl DependencyParser for CommandParser {
    fn parse(&mut self, text: &str) -> Result<Vec<Tree>, ParseError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParseError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is dropped at the end of this block so the child sees EOF.
        // A parser that exits without reading is reported by its exit status.
        if let Some(mut stdin) = child.stdin.take() {
            let written = stdin
                .write_all(text.as_bytes())
                .and_then(|()| stdin.write_all(b"\n"));
            if let Err(e) = written {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ParseError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let trees = CoNLLUReader::from_string(&stdout).collect::<Result<Vec<_>, _>>()?;
        Ok(trees)
    }
}

/// Keeps one parser process running: a line in, CoNLL-U and
/// [`END_OF_PARSE`] out
///
/// The process is started on the first line. If it dies or the exchange
/// breaks, the line fails and the next line starts a new process.
#[derive(Debug)]
pub struct PipeParser {
    program: String,
    args: Vec<String>,
    child: Option<PipeChild>,
}

#[derive(Debug)]
struct PipeChild {
    process: Child,
    stdout: BufReader<ChildStdout>,
}

impl PipeParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            child: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn spawn(&self) -> Result<PipeChild, ParseError> {
        let mut process = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ParseError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(program = %self.program, pid = process.id(), "parser started");

        let stdout = process.stdout.take().ok_or(ParseError::Closed)?;
        Ok(PipeChild {
            process,
            stdout: BufReader::new(stdout),
        })
    }
}

impl PipeChild {
    /// Send one line and collect everything up to the end marker
    fn request(&mut self, text: &str) -> Result<String, ParseError> {
        let stdin = self.process.stdin.as_mut().ok_or(ParseError::Closed)?;
        writeln!(stdin, "{}", text)?;
        stdin.flush()?;

        let mut block = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(ParseError::Closed);
            }
            if line.trim_end() == END_OF_PARSE {
                return Ok(block);
            }
            block.push_str(&line);
        }
    }
}

impl Drop for PipeChild {
    fn drop(&mut self) {
        // Closing stdin is the child's signal to exit
        drop(self.process.stdin.take());
        if let Err(e) = self.process.wait() {
            warn!(error = %e, "parser process did not exit cleanly");
        }
    }
}

impl DependencyParser for PipeParser {
    fn parse(&mut self, text: &str) -> Result<Vec<Tree>, ParseError> {
        let mut child = match self.child.take() {
            Some(child) => child,
            None => self.spawn()?,
        };
        // A failed exchange drops the child, so the next line respawns it
        let block = child.request(text)?;
        self.child = Some(child);

        let trees = CoNLLUReader::from_string(&block).collect::<Result<Vec<_>, _>>()?;
        Ok(trees)
    }
}

/// Serves trees from an already parsed treebank, keyed by sentence text
#[derive(Debug, Clone, Default)]
pub struct PreparsedParser {
    trees: FxHashMap<String, Tree>,
}

impl PreparsedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index trees by their text; the first tree wins for repeated texts
    pub fn from_trees<I: IntoIterator<Item = Tree>>(trees: I) -> Self {
        let mut parser = Self::new();
        for tree in trees {
            parser.insert(tree);
        }
        parser
    }

    pub fn insert(&mut self, tree: Tree) {
        let text = tree.text().into_owned();
        self.trees.entry(text).or_insert(tree);
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl DependencyParser for PreparsedParser {
    fn parse(&mut self, text: &str) -> Result<Vec<Tree>, ParseError> {
        self.trees
            .get(text)
            .map(|tree| vec![tree.clone()])
            .ok_or_else(|| ParseError::Unparsed(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Word;

    #[test]
    fn test_preparsed_lookup() {
        let tree = Tree::with_text(
            vec![Word::new(1, "Go", "go", "VERB", 0, "root")],
            "Go",
        );
        let mut parser = PreparsedParser::from_trees([tree.clone(), tree.clone()]);

        assert_eq!(parser.len(), 1);
        assert_eq!(parser.parse("Go").unwrap(), vec![tree]);
        assert!(matches!(parser.parse("Stop"), Err(ParseError::Unparsed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_parser_reads_conllu() {
        // `cat` echoes a single token line, which is valid CoNLL-U
        let mut parser = CommandParser::new("cat");
        let trees = parser
            .parse("1\tGo\tgo\tVERB\tVB\t_\t0\troot\t_\t_")
            .unwrap();

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].root().unwrap().form, "Go");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_parser_failures() {
        let mut parser = CommandParser::new("false");
        assert!(matches!(parser.parse("x"), Err(ParseError::Exit { .. })));

        let mut parser = CommandParser::new("cat");
        assert!(matches!(parser.parse("not conllu"), Err(ParseError::Conllu(_))));

        let mut parser = CommandParser::new("/nonexistent/parser-binary");
        assert!(matches!(parser.parse("x"), Err(ParseError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_parser_args() {
        let mut parser = CommandParser::new("sh").with_args(["-c", "cat"]);
        let trees = parser
            .parse("1\tRun\trun\tVERB\tVB\t_\t0\troot\t_\t_")
            .unwrap();
        assert_eq!(trees[0].words()[0].lemma, "run");
    }

    /// Numbers each answer so tests can tell one long-lived process from many
    #[cfg(unix)]
    const COUNTING_PARSER: &str = r#"n=0
while IFS= read -r l; do
  n=$((n+1))
  printf '# sent_id = %s\n1\t%s\t%s\tVERB\t_\t_\t0\troot\t_\t_\n\n# done\n' "$n" "$l" "$l"
done"#;

    #[cfg(unix)]
    #[test]
    fn test_pipe_parser_reuses_process() {
        let mut parser = PipeParser::new("sh").with_args(["-c", COUNTING_PARSER]);

        let first = parser.parse("Go").unwrap();
        let second = parser.parse("Run").unwrap();

        assert_eq!(first[0].root().unwrap().form, "Go");
        assert_eq!(second[0].root().unwrap().form, "Run");
        assert_eq!(first[0].metadata["sent_id"], "1");
        assert_eq!(second[0].metadata["sent_id"], "2");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_parser_several_sentences_per_line() {
        let script = r#"while IFS= read -r l; do
  printf '1\ta\ta\tNOUN\t_\t_\t0\troot\t_\t_\n\n1\tb\tb\tNOUN\t_\t_\t0\troot\t_\t_\n\n# done\n'
done"#;
        let mut parser = PipeParser::new("sh").with_args(["-c", script]);

        let trees = parser.parse("a. b.").unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].words()[0].form, "b");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_parser_failures() {
        // Exits after one line without answering
        let mut parser = PipeParser::new("sh").with_args(["-c", "read -r l"]);
        assert!(matches!(parser.parse("x"), Err(ParseError::Closed)));
        assert!(matches!(parser.parse("y"), Err(ParseError::Closed)));

        let mut parser = PipeParser::new("/nonexistent/parser-binary");
        assert!(matches!(parser.parse("x"), Err(ParseError::Spawn { .. })));
    }
}
