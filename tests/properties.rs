//! Behavioural properties of the detectors on hand-built trees

use syntaxmine::inversion::{inversion_nominal, inversion_verbal};
use syntaxmine::{
    Construction, Detection, InversionKind, Tree, Word, classify_inversion, detect_all,
    is_inversion, is_passive, is_preposing,
};

fn preposing_words() -> Vec<Word> {
    vec![
        Word::new(1, "A", "a", "DET", 2, "det"),
        Word::new(2, "book", "book", "NOUN", 0, "root"),
        Word::new(3, "she", "she", "PRON", 4, "nsubj"),
        Word::new(4, "wrote", "write", "VERB", 2, "acl:relcl"),
    ]
}

#[test]
fn preposing_matches_root_noun_with_relative_clause() {
    assert_eq!(is_preposing(&Tree::new(preposing_words())), Detection::found("book"));

    let mut words = preposing_words();
    words.retain(|w| w.id != 4);
    assert_eq!(is_preposing(&Tree::new(words)), Detection::none());
}

fn passive_words() -> Vec<Word> {
    vec![
        Word::new(1, "cake", "cake", "NOUN", 2, "nsubj:pass"),
        Word::new(2, "eaten", "eat", "VERB", 0, "root"),
        Word::new(3, "was", "be", "AUX", 2, "aux:pass"),
        Word::new(5, "by", "by", "ADP", 6, "case"),
        Word::new(6, "guests", "guest", "NOUN", 5, "obl"),
    ]
}

#[test]
fn passive_needs_a_by_agent() {
    assert_eq!(is_passive(&Tree::new(passive_words())), Detection::found("cake"));

    let mut words = passive_words();
    words.retain(|w| w.form != "by");
    assert_eq!(is_passive(&Tree::new(words)), Detection::none());
}

fn inversion_words() -> Vec<Word> {
    vec![
        Word::new(1, "Nowhere", "nowhere", "ADV", 3, "advmod"),
        Word::new(2, "was", "be", "AUX", 3, "cop"),
        Word::new(3, "trace", "trace", "NOUN", 0, "root"),
        Word::new(4, "it", "it", "PRON", 3, "nmod"),
    ]
}

#[test]
fn inversion_matches_and_comma_before_root_blocks_it() {
    let tree = Tree::new(inversion_words());
    assert_eq!(is_inversion(&tree), Detection::found("it"));
    assert_eq!(
        classify_inversion(&tree),
        Some((InversionKind::Nominal, "it".to_string()))
    );

    let mut words = inversion_words();
    words.insert(2, Word::new(5, ",", ",", "PUNCT", 3, "punct"));
    assert_eq!(is_inversion(&Tree::new(words)), Detection::none());
}

#[test]
fn inversion_joins_candidates_in_sentence_order() {
    let mut words = inversion_words();
    words.push(Word::new(5, "Kim", "Kim", "PROPN", 1, "obl"));
    words.insert(1, Word::new(6, "she", "she", "PRON", 3, "nsubj"));
    assert_eq!(is_inversion(&Tree::new(words)), Detection::found("she, it, Kim"));
}

#[test]
fn inversion_prefers_nominal_variant() {
    let tree = Tree::new(vec![
        Word::new(1, "Here", "here", "ADV", 3, "advmod"),
        Word::new(2, "is", "be", "AUX", 3, "cop"),
        Word::new(3, "key", "key", "NOUN", 0, "root"),
        Word::new(4, "door", "door", "NOUN", 3, "obl"),
    ]);
    assert_eq!(inversion_nominal(&tree), Detection::found("door"));
    assert_eq!(inversion_verbal(&tree), Detection::none());
    assert_eq!(is_inversion(&tree), inversion_nominal(&tree));
}

#[test]
fn inversion_reaches_root_through_clausal_subject() {
    let words = vec![
        Word::new(1, "Here", "here", "ADV", 5, "advmod"),
        Word::new(2, "eating", "eat", "VERB", 5, "csubj"),
        Word::new(3, "cake", "cake", "NOUN", 2, "obj"),
        Word::new(4, "is", "be", "AUX", 5, "cop"),
        Word::new(5, "joy", "joy", "NOUN", 0, "root"),
    ];
    assert_eq!(is_inversion(&Tree::new(words.clone())), Detection::found("cake"));

    let mut unlinked = words;
    unlinked[1].deprel = "advcl".to_string();
    assert_eq!(is_inversion(&Tree::new(unlinked)), Detection::none());
}

#[test]
fn inversion_accepts_clausal_subject_as_first_word() {
    let tree = Tree::new(vec![
        Word::new(1, "Leaving", "leave", "VERB", 5, "csubj"),
        Word::new(2, "it", "it", "PRON", 1, "obj"),
        Word::new(3, "was", "be", "AUX", 5, "cop"),
        Word::new(4, "a", "a", "DET", 5, "det"),
        Word::new(5, "mistake", "mistake", "NOUN", 0, "root"),
    ]);
    assert_eq!(is_inversion(&tree), Detection::found("it"));
    assert_eq!(
        classify_inversion(&tree),
        Some((InversionKind::Nominal, "it".to_string()))
    );
}

#[test]
fn dangling_heads_never_match() {
    let tree = Tree::new(vec![
        Word::new(1, "Here", "here", "ADV", 42, "advmod"),
        Word::new(2, "is", "be", "AUX", 77, "cop"),
        Word::new(3, "key", "key", "NOUN", 0, "root"),
        Word::new(4, "by", "by", "ADP", 99, "case"),
        Word::new(5, "it", "it", "PRON", 99, "nmod"),
    ]);

    for (_, detection) in detect_all(&tree) {
        assert_eq!(detection, Detection::none());
    }
}

#[test]
fn passive_agent_may_be_capitalised_and_self_headed() {
    let tree = Tree::new(vec![
        Word::new(1, "By", "by", "ADP", 2, "case"),
        Word::new(2, "guests", "guest", "NOUN", 2, "obl"),
        Word::new(3, "cake", "cake", "NOUN", 5, "nsubj:pass"),
        Word::new(4, "was", "be", "AUX", 5, "aux:pass"),
        Word::new(5, "eaten", "eat", "VERB", 5, "root"),
    ]);
    assert_eq!(is_passive(&tree), Detection::found("cake"));
}

#[test]
fn rootless_trees_never_match() {
    let mut words = passive_words();
    words[1].deprel = "ccomp".to_string();
    let tree = Tree::new(words);

    for (_, detection) in detect_all(&tree) {
        assert_eq!(detection, Detection::none());
    }
}

#[test]
fn detectors_are_repeatable() {
    for words in [preposing_words(), passive_words(), inversion_words()] {
        let tree = Tree::new(words);
        let first = detect_all(&tree);
        let second = detect_all(&tree);
        assert_eq!(first, second);
        assert_eq!(first.map(|(c, _)| c), Construction::ALL);
    }
}
