use crate::position::{LineMap, Position};
use crate::span::Span;

#[test]
fn test_offset_to_position_counts_characters() {
    let source = "Item {\n  width: \"äö\"; height: 2\n}\n";
    let map = LineMap::build(source);
    let offset = source.find("height").unwrap() as u32;
    let pos = map.offset_to_position(offset, source);
    assert_eq!(pos, Position::new(1, 15));
}

#[test]
fn test_crlf_and_lone_cr_end_lines() {
    let source = "a\r\nb\rc\nd";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 4);
    assert_eq!(map.line_text(0, source), "a");
    assert_eq!(map.line_text(1, source), "b");
    assert_eq!(map.line_text(2, source), "c");
    assert_eq!(map.line_text(3, source), "d");
}

#[test]
fn test_position_to_offset_round_trips() {
    let source = "import QtQuick\nItem {}\n";
    let map = LineMap::build(source);
    let offset = map.position_to_offset(Position::new(1, 5), source);
    assert_eq!(offset, Some(20));
    assert_eq!(map.offset_to_position(20, source), Position::new(1, 5));
}

#[test]
fn test_span_overlap_rules() {
    assert!(Span::new(0, 5).overlaps(Span::new(4, 8)));
    assert!(!Span::new(0, 5).overlaps(Span::new(5, 8)));
    // insertion strictly inside a replacement
    assert!(Span::new(0, 5).overlaps(Span::at(2)));
    // insertion at the edge of a replacement
    assert!(!Span::new(0, 5).overlaps(Span::at(0)));
    assert!(Span::at(3).overlaps(Span::at(3)));
}
