use crate::did_you_mean::{did_you_mean, levenshtein};

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("lbue", "blue"), 2);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("witdh", "width"), 2);
}

#[test]
fn test_suggests_closest_candidate() {
    let candidates = ["height", "width", "x", "y"];
    assert_eq!(did_you_mean("witdh", candidates), Some("width".to_string()));
}

#[test]
fn test_rejects_distant_candidates() {
    let candidates = ["width", "height"];
    assert_eq!(did_you_mean("zzz", candidates), None);
}

#[test]
fn test_short_inputs_use_their_length_as_bound() {
    // len 2: bound is min(max(1, 3), 2) = 2
    assert_eq!(did_you_mean("xa", ["x"]), Some("x".to_string()));
    assert_eq!(did_you_mean("ab", ["cd"]), None);
}
