//! Common interface for construction detectors
//!
//! Every detector is a pure function of a [`Tree`]: it never mutates the
//! tree, keeps no state between calls, and reports a missing structural
//! element as a plain non-match.

use crate::inversion::is_inversion;
use crate::passive::is_passive;
use crate::preposing::is_preposing;
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The constructions the extractor looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Construction {
    Preposing,
    Passive,
    Inversion,
}

impl Construction {
    pub const ALL: [Construction; 3] = [
        Construction::Preposing,
        Construction::Passive,
        Construction::Inversion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Construction::Preposing => "preposing",
            Construction::Passive => "passive",
            Construction::Inversion => "inversion",
        }
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of running one detector on one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    pub matched: bool,
    /// The diagnostic noun phrase, present exactly when `matched`
    pub phrase: Option<String>,
}

impl Detection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn found(phrase: impl Into<String>) -> Self {
        Self {
            matched: true,
            phrase: Some(phrase.into()),
        }
    }
}

/// A construction detector
pub trait Detector: Send + Sync {
    fn construction(&self) -> Construction;

    fn detect(&self, tree: &Tree) -> Detection;
}

/// Fronted relative clause on a nominal root
#[derive(Debug, Clone, Copy, Default)]
pub struct Preposing;

/// Agentive `be` passive
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

/// Subject-verb inversion (nominal-root variant first, then verbal-root)
#[derive(Debug, Clone, Copy, Default)]
pub struct Inversion;

impl Detector for Preposing {
    fn construction(&self) -> Construction {
        Construction::Preposing
    }

    fn detect(&self, tree: &Tree) -> Detection {
        is_preposing(tree)
    }
}

impl Detector for Passive {
    fn construction(&self) -> Construction {
        Construction::Passive
    }

    fn detect(&self, tree: &Tree) -> Detection {
        is_passive(tree)
    }
}

impl Detector for Inversion {
    fn construction(&self) -> Construction {
        Construction::Inversion
    }

    fn detect(&self, tree: &Tree) -> Detection {
        is_inversion(tree)
    }
}

/// Detector for a construction
pub fn detector_for(construction: Construction) -> &'static dyn Detector {
    match construction {
        Construction::Preposing => &Preposing,
        Construction::Passive => &Passive,
        Construction::Inversion => &Inversion,
    }
}

/// Run every detector on a tree, in [`Construction::ALL`] order
pub fn detect_all(tree: &Tree) -> [(Construction, Detection); 3] {
    Construction::ALL.map(|c| (c, detector_for(c).detect(tree)))
}
