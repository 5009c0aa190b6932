//! Subject-verb inversion
//!
//! Two structurally different patterns share one frame: the sentence opens
//! with a fronted adverbial, prepositional, or clausal element and there is
//! no comma before the root.
//!
//! - Nominal root with a copula: "Here is the key"
//!   (`key` is the root, `is` its `cop`).
//! - Verbal root with a nominal object or oblique: "Into the room walked Kim".
//!
//! [`is_inversion`] tries the nominal pattern first and only falls back to
//! the verbal one when it fails; the two are never merged.

use crate::detector::Detection;
use crate::tree::{Tree, Word};

/// Deprels allowed on the sentence-initial word
pub const FRONTED_DEPRELS: [&str; 3] = ["advmod", "case", "csubj"];

/// Deprels through which a nominal may reach the root indirectly
pub const LINK_DEPRELS: [&str; 2] = ["advmod", "csubj"];

pub const COP: &str = "cop";
pub const OBJECT_DEPRELS: [&str; 2] = ["obj", "obl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionKind {
    /// Nominal root with a copula
    Nominal,
    /// Verbal root with a nominal object or oblique
    Verbal,
}

/// Root of an inversion frame, if the sentence has one
fn inverted_root(tree: &Tree) -> Option<&Word> {
    let first = tree.first()?;
    if !FRONTED_DEPRELS.contains(&first.deprel.as_str()) {
        return None;
    }

    let root_pos = tree.root_position()?;
    if tree.words()[..root_pos].iter().any(|w| w.form == ",") {
        return None;
    }

    Some(&tree.words()[root_pos])
}

/// Nominals attached to the root directly, or through an advmod/csubj word
/// that is itself attached to the root
fn candidates<'t>(tree: &'t Tree, root: &Word) -> Vec<&'t str> {
    tree.words()
        .iter()
        .filter(|w| w.is_nominal())
        .filter(|w| {
            w.head == root.id
                || tree.head_of(w).is_some_and(|mid| {
                    LINK_DEPRELS.contains(&mid.deprel.as_str()) && mid.head == root.id
                })
        })
        .map(|w| w.form.as_str())
        .collect()
}

fn joined(candidates: &[&str]) -> Option<String> {
    (!candidates.is_empty()).then(|| candidates.join(", "))
}

fn nominal_phrase(tree: &Tree) -> Option<String> {
    let root = inverted_root(tree)?;
    if !root.is_nominal() {
        return None;
    }

    let has_cop = tree.dependents(root.id).any(|w| w.deprel == COP);
    if !has_cop {
        return None;
    }
    joined(&candidates(tree, root))
}

fn verbal_phrase(tree: &Tree) -> Option<String> {
    let root = inverted_root(tree)?;
    if !root.is_verb() {
        return None;
    }

    // Not tied to the root: any nominal obj/obl in the sentence qualifies
    let has_obj_or_obl = tree
        .words()
        .iter()
        .any(|w| OBJECT_DEPRELS.contains(&w.deprel.as_str()) && w.is_nominal());
    if !has_obj_or_obl {
        return None;
    }
    joined(&candidates(tree, root))
}

/// Inversion with a nominal root and a copula
pub fn inversion_nominal(tree: &Tree) -> Detection {
    nominal_phrase(tree).map_or_else(Detection::none, Detection::found)
}

/// Inversion with a verbal root and a nominal object or oblique
pub fn inversion_verbal(tree: &Tree) -> Detection {
    verbal_phrase(tree).map_or_else(Detection::none, Detection::found)
}

/// Which inversion pattern matched, with its candidate phrase
pub fn classify_inversion(tree: &Tree) -> Option<(InversionKind, String)> {
    if let Some(phrase) = nominal_phrase(tree) {
        return Some((InversionKind::Nominal, phrase));
    }
    verbal_phrase(tree).map(|phrase| (InversionKind::Verbal, phrase))
}

/// Detect either inversion pattern, nominal first
pub fn is_inversion(tree: &Tree) -> Detection {
    classify_inversion(tree).map_or_else(Detection::none, |(_, phrase)| Detection::found(phrase))
}
