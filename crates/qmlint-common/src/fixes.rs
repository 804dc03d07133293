//! Application of fix-it suggestions.

use crate::diagnostics::FixSuggestion;

/// Apply all auto-applicable fixes to `source`.
///
/// Fixes are taken in order of their start offset; a fix overlapping one
/// that was already accepted is skipped. Returns the new text and the
/// number of fixes applied.
pub fn apply_fixes<'a>(
    source: &str,
    fixes: impl IntoIterator<Item = &'a FixSuggestion>,
) -> (String, usize) {
    let mut candidates: Vec<&FixSuggestion> = fixes
        .into_iter()
        .filter(|fix| fix.auto_applicable)
        .filter(|fix| (fix.span.end as usize) <= source.len())
        .filter(|fix| {
            source.is_char_boundary(fix.span.start as usize)
                && source.is_char_boundary(fix.span.end as usize)
        })
        .collect();
    candidates.sort_by_key(|fix| (fix.span.start, fix.span.end));

    let mut accepted: Vec<&FixSuggestion> = Vec::with_capacity(candidates.len());
    for fix in candidates {
        if accepted.iter().any(|other| other.span.overlaps(fix.span)) {
            continue;
        }
        accepted.push(fix);
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for fix in &accepted {
        let start = fix.span.start as usize;
        out.push_str(&source[cursor..start]);
        out.push_str(&fix.replacement);
        cursor = fix.span.end as usize;
    }
    out.push_str(&source[cursor..]);
    (out, accepted.len())
}
