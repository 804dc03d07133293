//! `// qmllint disable` / `// qmllint enable` directives.
//!
//! A directive trailing code on the same line applies to that line only.
//! A directive on a line of its own opens an interval that lasts until a
//! matching `enable` or the end of the file. Without a category list the
//! directive covers every category.

use crate::category::Category;
use crate::position::LineMap;
use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//\s*qmllint\s+(disable|enable)((?:[ \t]+[A-Za-z0-9_.\-]+)*)[ \t]*$")
        .expect("suppression directive regex")
});

#[derive(Clone, Debug, PartialEq, Eq)]
struct Directive {
    line: u32,
    disable: bool,
    trailing: bool,
    categories: Vec<String>,
}

impl Directive {
    fn covers(&self, category: Category) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category.name())
    }
}

/// All suppression directives of one document, in source order.
#[derive(Clone, Debug, Default)]
pub struct Suppressions {
    directives: Vec<Directive>,
}

impl Suppressions {
    /// Scan `source` for directives.
    pub fn parse(source: &str, line_map: &LineMap) -> Self {
        let mut directives = Vec::new();
        for line in 0..line_map.line_count() as u32 {
            let text = line_map.line_text(line, source);
            if !text.contains("qmllint") {
                continue;
            }
            let Some(captures) = DIRECTIVE.captures(text) else {
                continue;
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let trailing = !text[..whole.start()].trim().is_empty();
            let disable = captures.get(1).is_some_and(|m| m.as_str() == "disable");
            let categories = captures
                .get(2)
                .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            directives.push(Directive {
                line,
                disable,
                trailing,
                categories,
            });
        }
        Suppressions { directives }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Whether diagnostics of `category` on the 0-based `line` are suppressed.
    pub fn is_suppressed(&self, category: Category, line: u32) -> bool {
        let mut suppressed = false;
        for directive in &self.directives {
            if directive.line > line {
                break;
            }
            if !directive.covers(category) {
                continue;
            }
            if directive.trailing {
                if directive.line == line && directive.disable {
                    return true;
                }
                continue;
            }
            suppressed = directive.disable;
        }
        suppressed
    }
}
