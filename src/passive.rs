//! Agentive passive: `be` passive with a `by` agent and a nominal subject

use crate::detector::Detection;
use crate::tree::Tree;

pub const AUX_PASS: &str = "aux:pass";
pub const NSUBJ_PASS: &str = "nsubj:pass";

/// Detect an agentive passive; the phrase is the passive subject's form
///
/// Requires, all together:
/// - a verbal root,
/// - a `be` passive auxiliary attached to that root,
/// - some `by` anywhere in the sentence whose head is nominal,
/// - a nominal `nsubj:pass` (the last one wins if there are several).
pub fn is_passive(tree: &Tree) -> Detection {
    let Some(root) = tree.words().iter().find(|w| w.is_root() && w.is_verb()) else {
        return Detection::none();
    };

    let has_be_auxpass = tree
        .dependents(root.id)
        .any(|w| w.lemma == "be" && w.deprel == AUX_PASS);
    if !has_be_auxpass {
        return Detection::none();
    }

    // The agent may hang anywhere, not only under the root verb
    let by_agent = tree
        .words()
        .iter()
        .filter(|w| w.form.eq_ignore_ascii_case("by"))
        .filter_map(|by| tree.head_of(by))
        .any(|head| head.is_nominal());

    let subject = tree
        .words()
        .iter()
        .rfind(|w| w.deprel == NSUBJ_PASS && w.is_nominal());

    match subject {
        Some(subject) if by_agent => Detection::found(subject.form.as_str()),
        _ => Detection::none(),
    }
}
