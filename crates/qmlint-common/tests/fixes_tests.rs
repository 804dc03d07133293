use crate::diagnostics::FixSuggestion;
use crate::fixes::apply_fixes;
use crate::span::Span;

#[test]
fn test_applies_only_auto_applicable_fixes() {
    let source = "x: foo";
    let fixes = vec![
        FixSuggestion::insertion("qualify", 3, "root.").auto_applicable(),
        FixSuggestion::new("rename", Span::new(0, 1), "y"),
    ];
    let (text, applied) = apply_fixes(source, &fixes);
    assert_eq!(text, "x: root.foo");
    assert_eq!(applied, 1);
}

#[test]
fn test_overlapping_fixes_keep_the_first() {
    let source = "abcdef";
    let fixes = vec![
        FixSuggestion::new("second", Span::new(2, 5), "XYZ").auto_applicable(),
        FixSuggestion::new("first", Span::new(1, 3), "_").auto_applicable(),
    ];
    let (text, applied) = apply_fixes(source, &fixes);
    assert_eq!(text, "a_def");
    assert_eq!(applied, 1);
}

#[test]
fn test_fixes_apply_back_to_front_consistently() {
    let source = "a b c";
    let fixes = vec![
        FixSuggestion::new("c", Span::new(4, 5), "CCC").auto_applicable(),
        FixSuggestion::new("a", Span::new(0, 1), "AA").auto_applicable(),
    ];
    let (text, _) = apply_fixes(source, &fixes);
    assert_eq!(text, "AA b CCC");
}
