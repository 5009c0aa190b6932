//! Dependency tree data structures
//!
//! A [`Tree`] is one parsed sentence: an ordered list of [`Word`]s plus the
//! sentence text and comment metadata from the parser. Word order is
//! significant and is never changed after construction.

use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::collections::HashMap;

/// 1-based position of a word within its sentence (`0` is the virtual root)
pub type WordId = usize;

pub const ROOT: &str = "root";
pub const VERB: &str = "VERB";

/// UPOS tags that count as nominal for every detector
pub const NOMINAL_UPOS: [&str; 3] = ["NOUN", "PROPN", "PRON"];

/// A single word (syntactic token) in a dependency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub id: WordId,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: Option<String>,
    pub feats: Option<String>,
    pub head: WordId,
    pub deprel: String,
}

impl Word {
    /// Create a word with the fields the detectors look at
    pub fn new(id: WordId, form: &str, lemma: &str, upos: &str, head: WordId, deprel: &str) -> Self {
        Self {
            id,
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: None,
            feats: None,
            head,
            deprel: deprel.to_string(),
        }
    }

    pub fn with_xpos(mut self, xpos: &str) -> Self {
        self.xpos = Some(xpos.to_string());
        self
    }

    pub fn with_feats(mut self, feats: &str) -> Self {
        self.feats = Some(feats.to_string());
        self
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.deprel == ROOT
    }

    #[inline]
    pub fn is_nominal(&self) -> bool {
        NOMINAL_UPOS.contains(&self.upos.as_str())
    }

    #[inline]
    pub fn is_verb(&self) -> bool {
        self.upos == VERB
    }
}

/// A parsed sentence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    words: Vec<Word>,
    pub sentence_text: Option<String>,
    pub metadata: HashMap<String, String>,
    /// word id -> position in `words`
    positions: FxHashMap<WordId, usize>,
}

impl Tree {
    /// Build a tree from words in sentence order
    pub fn new(words: Vec<Word>) -> Self {
        Self::with_metadata(words, None, HashMap::new())
    }

    pub fn with_text(words: Vec<Word>, text: &str) -> Self {
        Self::with_metadata(words, Some(text.to_string()), HashMap::new())
    }

    pub fn with_metadata(
        words: Vec<Word>,
        sentence_text: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        let mut positions = FxHashMap::default();
        positions.reserve(words.len());
        for (pos, word) in words.iter().enumerate() {
            // Duplicate ids keep the first occurrence, like a left-to-right scan
            positions.entry(word.id).or_insert(pos);
        }
        Self {
            words,
            sentence_text,
            metadata,
            positions,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First word of the sentence, `None` when empty
    pub fn first(&self) -> Option<&Word> {
        self.words.first()
    }

    /// Look up a word by its 1-based id
    pub fn word(&self, id: WordId) -> Option<&Word> {
        self.positions.get(&id).map(|&pos| &self.words[pos])
    }

    /// The word `word` depends on; `None` for the root or a dangling head
    pub fn head_of(&self, word: &Word) -> Option<&Word> {
        self.word(word.head)
    }

    /// All words whose head is `id`, in sentence order
    pub fn dependents(&self, id: WordId) -> impl Iterator<Item = &Word> + '_ {
        self.words.iter().filter(move |w| w.head == id)
    }

    /// Sequence position of the first word labelled `root`
    ///
    /// The label decides, not the head value: parsers disagree on whether the
    /// root's head is `0` or the root itself.
    pub fn root_position(&self) -> Option<usize> {
        self.words.iter().position(Word::is_root)
    }

    pub fn root(&self) -> Option<&Word> {
        self.root_position().map(|pos| &self.words[pos])
    }

    /// Sentence text, reconstructed from word forms if the parser gave none
    pub fn text(&self) -> Cow<'_, str> {
        match &self.sentence_text {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(
                self.words
                    .iter()
                    .map(|w| w.form.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}
