//! Syntaxmine: construction extraction over dependency parses
//!
//! Finds sentences showing preposing, agentive passives, and subject-verb
//! inversion in a large corpus, using trees from an external dependency
//! parser. Detectors are pure functions of a tree; everything around them
//! (corpus loading, parsing, checkpoints, result files) lives in its own
//! module.

// Core modules
pub mod detector; // Detector trait, Construction, Detection
pub mod inversion; // Subject-verb inversion (nominal and verbal root)
pub mod passive; // Agentive be-passives
pub mod preposing; // Relative clause on a nominal root
pub mod tree; // Words and trees with id lookup

// Collaborators
pub mod checkpoint; // Resumable progress
pub mod conllu; // CoNLL-U reading and writing
pub mod corpus; // Text corpora and treebanks, plain or gzipped
pub mod driver; // Batch loop: parse, detect, checkpoint
pub mod parser; // External dependency parser seam
pub mod results; // Result sets and two-column rows

// Re-exports for convenience
pub use checkpoint::Checkpoint;
pub use conllu::CoNLLUReader;
pub use corpus::{Corpus, Treebank};
pub use detector::{Construction, Detection, Detector, detect_all};
pub use driver::{ExtractConfig, Extractor, RunSummary};
pub use inversion::{InversionKind, classify_inversion, is_inversion};
pub use parser::{CommandParser, DependencyParser, ParseError, PipeParser, PreparsedParser};
pub use passive::is_passive;
pub use preposing::is_preposing;
pub use results::{MatchResult, ResultSets};
pub use tree::{Tree, Word, WordId};
