//! Preposing: a verbal relative clause attached to a nominal root
//!
//! Example: "Here is the book that I read" where `book` is the root of an
//! equative clause and `read` heads an `acl:relcl` attached to it.

use crate::detector::Detection;
use crate::tree::Tree;

pub const ACL_RELCL: &str = "acl:relcl";

/// Detect preposing; the phrase is the nominal root's form
pub fn is_preposing(tree: &Tree) -> Detection {
    let nominal_roots = tree.words().iter().filter(|w| w.is_root() && w.is_nominal());

    for root in nominal_roots {
        let relcl = tree
            .dependents(root.id)
            .find(|w| w.deprel == ACL_RELCL && w.is_verb());
        if relcl.is_some() {
            return Detection::found(root.form.as_str());
        }
    }

    Detection::none()
}
