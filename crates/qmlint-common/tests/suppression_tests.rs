use crate::category;
use crate::position::LineMap;
use crate::suppression::Suppressions;

fn suppressions(source: &str) -> Suppressions {
    Suppressions::parse(source, &LineMap::build(source))
}

#[test]
fn test_trailing_directive_covers_its_line_only() {
    let source = "Item {\n    x: foo // qmllint disable unqualified\n    y: foo\n}\n";
    let s = suppressions(source);
    assert!(s.is_suppressed(category::UNQUALIFIED, 1));
    assert!(!s.is_suppressed(category::UNQUALIFIED, 2));
    assert!(!s.is_suppressed(category::DEPRECATED, 1));
}

#[test]
fn test_standalone_directive_opens_interval_until_enable() {
    let source = "\
Item {
    // qmllint disable unqualified deprecated
    x: foo
    y: bar
    // qmllint enable unqualified
    z: baz
}
";
    let s = suppressions(source);
    assert!(s.is_suppressed(category::UNQUALIFIED, 2));
    assert!(s.is_suppressed(category::UNQUALIFIED, 3));
    assert!(!s.is_suppressed(category::UNQUALIFIED, 5));
    // deprecated is never re-enabled
    assert!(s.is_suppressed(category::DEPRECATED, 5));
}

#[test]
fn test_directive_without_categories_covers_all() {
    let source = "// qmllint disable\nItem {}\n";
    let s = suppressions(source);
    assert!(s.is_suppressed(category::IMPORT, 1));
    assert!(s.is_suppressed(category::UNUSED_IMPORTS, 1));
}

#[test]
fn test_interval_runs_to_end_of_file() {
    let source = "Item {\n// qmllint disable color\n\n\n\n}";
    let s = suppressions(source);
    assert!(!s.is_suppressed(category::COLOR, 0));
    assert!(s.is_suppressed(category::COLOR, 5));
}
