//! Result sets and their two-column row format
//!
//! Each construction has its own stream of `(sentence_text, phrase)` rows in
//! corpus order. Rows are comma-separated without a header; a field is
//! quoted only when it contains a comma, a quote, or a line break, with
//! embedded quotes doubled. A missing phrase is an empty field, so an empty
//! phrase and no phrase are the same thing: [`MatchResult::new`] stores an
//! empty phrase as `None`.

use crate::detector::Construction;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("row {row}: unterminated quoted field")]
    Unterminated { row: usize },

    #[error("row {row}: expected 2 fields, found {found}")]
    FieldCount { row: usize, found: usize },

    #[error("row {row}: unexpected character after closing quote")]
    AfterQuote { row: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One detector hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub sentence_text: String,
    pub phrase: Option<String>,
}

impl MatchResult {
    pub fn new(sentence_text: impl Into<String>, phrase: Option<String>) -> Self {
        Self {
            sentence_text: sentence_text.into(),
            phrase: phrase.filter(|p| !p.is_empty()),
        }
    }
}

/// Accumulated hits, one stream per construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSets {
    pub preposing: Vec<MatchResult>,
    pub passive: Vec<MatchResult>,
    pub inversion: Vec<MatchResult>,
}

impl ResultSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, construction: Construction) -> &[MatchResult] {
        match construction {
            Construction::Preposing => &self.preposing,
            Construction::Passive => &self.passive,
            Construction::Inversion => &self.inversion,
        }
    }

    fn get_mut(&mut self, construction: Construction) -> &mut Vec<MatchResult> {
        match construction {
            Construction::Preposing => &mut self.preposing,
            Construction::Passive => &mut self.passive,
            Construction::Inversion => &mut self.inversion,
        }
    }

    pub fn push(&mut self, construction: Construction, result: MatchResult) {
        self.get_mut(construction).push(result);
    }

    pub fn counts(&self) -> [(Construction, usize); 3] {
        Construction::ALL.map(|c| (c, self.get(c).len()))
    }

    pub fn total(&self) -> usize {
        self.preposing.len() + self.passive.len() + self.inversion.len()
    }

    /// Write `<name>.csv` for every construction into `dir`
    pub fn write_all(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(Construction::ALL.len());
        for construction in Construction::ALL {
            let path = dir.join(format!("{}.csv", construction.name()));
            let mut out = BufWriter::new(File::create(&path)?);
            write_rows(&mut out, self.get(construction))?;
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

fn write_field<W: Write>(out: &mut W, field: &str) -> io::Result<()> {
    if needs_quotes(field) {
        write!(out, "\"{}\"", field.replace('"', "\"\""))
    } else {
        out.write_all(field.as_bytes())
    }
}

/// Write results as two-column rows
pub fn write_rows<W: Write>(out: &mut W, results: &[MatchResult]) -> io::Result<()> {
    for result in results {
        write_field(out, &result.sentence_text)?;
        out.write_all(b",")?;
        write_field(out, result.phrase.as_deref().unwrap_or(""))?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Parse rows written by [`write_rows`]; an empty phrase reads back as `None`
pub fn read_rows<R: Read>(mut input: R) -> Result<Vec<MatchResult>, RowError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let mut results = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut row = 1;
    let mut row_started = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if field.is_empty() => {
                row_started = true;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(c) => field.push(c),
                        None => return Err(RowError::Unterminated { row }),
                    }
                }
                if !matches!(chars.peek(), None | Some(',' | '\n' | '\r')) {
                    return Err(RowError::AfterQuote { row });
                }
            }
            ',' => {
                row_started = true;
                fields.push(std::mem::take(&mut field));
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if row_started {
                    fields.push(std::mem::take(&mut field));
                    results.push(finish_row(std::mem::take(&mut fields), row)?);
                }
                row += 1;
                row_started = false;
            }
            c => {
                row_started = true;
                field.push(c);
            }
        }
    }

    if row_started {
        fields.push(field);
        results.push(finish_row(fields, row)?);
    }

    Ok(results)
}

fn finish_row(fields: Vec<String>, row: usize) -> Result<MatchResult, RowError> {
    let found = fields.len();
    let Ok([sentence_text, phrase]) = <[String; 2]>::try_from(fields) else {
        return Err(RowError::FieldCount { row, found });
    };
    let phrase = (!phrase.is_empty()).then_some(phrase);
    Ok(MatchResult {
        sentence_text,
        phrase,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<MatchResult> {
        vec![
            MatchResult::new("Here is the key.", Some("key".to_string())),
            MatchResult::new(
                "In the garden stood a statue, and a bench.",
                Some("garden, statue".to_string()),
            ),
            MatchResult::new("He said \"stop\"\nand left.", Some("He".to_string())),
            MatchResult::new("No phrase", None),
        ]
    }

    #[test]
    fn test_row_layout() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "Here is the key.,key\n\
             \"In the garden stood a statue, and a bench.\",\"garden, statue\"\n\
             \"He said \"\"stop\"\"\nand left.\",He\n\
             No phrase,\n"
        );
    }

    #[test]
    fn test_rows_read_back_in_order() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &sample()).unwrap();
        assert_eq!(read_rows(buf.as_slice()).unwrap(), sample());
    }

    #[test]
    fn test_empty_phrase_is_no_phrase() {
        let row = MatchResult::new("q\"", Some(String::new()));
        assert_eq!(row.phrase, None);

        let mut buf = Vec::new();
        write_rows(&mut buf, std::slice::from_ref(&row)).unwrap();
        assert_eq!(read_rows(buf.as_slice()).unwrap(), vec![row]);
    }

    #[test]
    fn test_read_crlf_and_missing_final_newline() {
        let rows = read_rows("a,b\r\nc,d".as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                MatchResult::new("a", Some("b".to_string())),
                MatchResult::new("c", Some("d".to_string())),
            ]
        );
    }

    #[test]
    fn test_read_errors() {
        assert!(matches!(
            read_rows("only one field\n".as_bytes()),
            Err(RowError::FieldCount { row: 1, found: 1 })
        ));
        assert!(matches!(
            read_rows("ok,row\n\"open,x\n".as_bytes()),
            Err(RowError::Unterminated { row: 2 })
        ));
        assert!(matches!(
            read_rows("\"a\"b,c\n".as_bytes()),
            Err(RowError::AfterQuote { row: 1 })
        ));
    }

    #[test]
    fn test_result_sets_routing() {
        let mut sets = ResultSets::new();
        sets.push(Construction::Passive, MatchResult::new("s1", Some("cake".into())));
        sets.push(Construction::Inversion, MatchResult::new("s2", Some("Kim".into())));
        sets.push(Construction::Passive, MatchResult::new("s3", Some("pie".into())));

        assert_eq!(sets.get(Construction::Preposing).len(), 0);
        assert_eq!(sets.get(Construction::Passive)[1].sentence_text, "s3");
        assert_eq!(sets.total(), 3);
        assert_eq!(
            sets.counts(),
            [
                (Construction::Preposing, 0),
                (Construction::Passive, 2),
                (Construction::Inversion, 1),
            ]
        );
    }

    #[test]
    fn test_write_all_files() {
        let dir = tempdir().unwrap();
        let mut sets = ResultSets::new();
        sets.push(Construction::Preposing, MatchResult::new("s", Some("book".into())));

        let paths = sets.write_all(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["preposing.csv", "passive.csv", "inversion.csv"]);

        let preposing = read_rows(File::open(&paths[0]).unwrap()).unwrap();
        assert_eq!(preposing, sets.preposing);
        assert!(fs::read_to_string(&paths[1]).unwrap().is_empty());
    }
}
