//! End-to-end tests of the analysis pipeline: levels, suppressions,
//! ordering and pass isolation.

use qmlint_checker::{AnalysisConfig, LintPlugin, PassEntry, PassRegistry, finalize, lint_document};
use qmlint_common::{Category, CategoryInfo, Diagnostic, Level, LineMap, Severity, Span, category};
use qmlint_resolver::ModuleCache;

fn lint_with(source: &str, passes: &PassRegistry, config: &AnalysisConfig) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, passes, config)
}

fn lint(source: &str) -> Vec<Diagnostic> {
    lint_with(source, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

const UNQUALIFIED_SOURCE: &str = "import QtQuick\nItem {\n    width: undefinedName\n}\n";

// =============================================================================
// Basic runs
// =============================================================================

#[test]
fn test_clean_document_has_no_diagnostics() {
    let source = r#"import QtQuick
Item {
    id: root
    width: 100
    Rectangle {
        anchors.fill: parent
        color: "red"
    }
}
"#;
    let diagnostics = lint(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_parse_failure_yields_one_critical_diagnostic() {
    let diagnostics = lint("import QtQuick\nItem {\n");
    assert_eq!(diagnostics.len(), 1, "{:?}", messages(&diagnostics));
    assert_eq!(diagnostics[0].category, category::SYNTAX);
    assert_eq!(diagnostics[0].severity, Severity::Critical);
}

#[test]
fn test_parse_failure_ignores_disabled_syntax_category() {
    let config = AnalysisConfig::new().with_level("syntax", Level::Disable);
    let diagnostics = lint_with("Item {", &PassRegistry::builtin(), &config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Critical);
}

#[test]
fn test_diagnostics_are_located() {
    let diagnostics = lint(UNQUALIFIED_SOURCE);
    let unqualified = diagnostics
        .iter()
        .find(|d| d.category == category::UNQUALIFIED)
        .expect("unqualified access");
    assert_eq!(unqualified.location.line, 2);
    assert_eq!(unqualified.location.column, 11);
}

// =============================================================================
// Levels
// =============================================================================

#[test]
fn test_default_level_applies() {
    let diagnostics = lint(UNQUALIFIED_SOURCE);
    let unqualified: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == category::UNQUALIFIED)
        .collect();
    assert_eq!(unqualified.len(), 1);
    assert_eq!(unqualified[0].severity, Severity::Warning);
}

#[test]
fn test_configured_level_changes_severity() {
    let config = AnalysisConfig::new().with_level("unqualified", Level::Error);
    let diagnostics = lint_with(UNQUALIFIED_SOURCE, &PassRegistry::builtin(), &config);
    assert!(
        diagnostics
            .iter()
            .filter(|d| d.category == category::UNQUALIFIED)
            .all(|d| d.severity == Severity::Error)
    );
}

#[test]
fn test_disabled_category_is_dropped() {
    let config = AnalysisConfig::new().with_level("unqualified", Level::Disable);
    let diagnostics = lint_with(UNQUALIFIED_SOURCE, &PassRegistry::builtin(), &config);
    assert!(diagnostics.iter().all(|d| d.category != category::UNQUALIFIED));
}

#[test]
fn test_prefix_group_level_covers_subcategories() {
    let source = "import QtQuick\nItem {\n    id: box\n    Item {\n        id: box\n    }\n}\n";
    let diagnostics = lint(source);
    let duplicates: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == category::DUPLICATE_IDS)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].severity, Severity::Error);

    let config = AnalysisConfig::new().with_level("syntax", Level::Disable);
    let diagnostics = lint_with(source, &PassRegistry::builtin(), &config);
    assert!(diagnostics.iter().all(|d| d.category != category::DUPLICATE_IDS));
}

#[test]
fn test_unknown_category_names_are_listed() {
    let config = AnalysisConfig::new()
        .with_level("unqualified", Level::Info)
        .with_level("syntax", Level::Info)
        .with_level("no-such-check", Level::Error);
    assert_eq!(config.unknown_categories(), vec!["no-such-check"]);
    assert!(config.is_known("syntax"));
}

// =============================================================================
// Suppressions
// =============================================================================

#[test]
fn test_trailing_directive_suppresses_its_line() {
    let source =
        "import QtQuick\nItem {\n    width: undefinedName // qmllint disable unqualified\n    height: otherName\n}\n";
    let diagnostics = lint(source);
    let lines: Vec<u32> = diagnostics
        .iter()
        .filter(|d| d.category == category::UNQUALIFIED)
        .map(|d| d.location.line)
        .collect();
    assert_eq!(lines, vec![3]);
}

#[test]
fn test_block_directive_suppresses_until_enable() {
    let source = r#"import QtQuick
Item {
    // qmllint disable
    width: undefinedName
    // qmllint enable
    height: otherName
}
"#;
    let diagnostics = lint(source);
    let lines: Vec<u32> = diagnostics
        .iter()
        .filter(|d| d.category == category::UNQUALIFIED)
        .map(|d| d.location.line)
        .collect();
    assert_eq!(lines, vec![5]);
}

// =============================================================================
// Finalizing
// =============================================================================

#[test]
fn test_finalize_sorts_and_deduplicates() {
    let source = "Item {}\n";
    let line_map = LineMap::build(source);
    let late = Diagnostic::new(category::UNQUALIFIED, Span::new(5, 6), "late");
    let early = Diagnostic::new(category::UNQUALIFIED, Span::new(0, 4), "early");
    let diagnostics = finalize(
        vec![late.clone(), early, late],
        &AnalysisConfig::new(),
        source,
        &line_map,
    );
    assert_eq!(messages(&diagnostics), vec!["early", "late"]);
    assert_eq!(diagnostics[1].location.column, 5);
}

#[test]
fn test_finalize_collapses_diagnostics_at_the_same_position() {
    let source = "Item { width: abc }\n";
    let line_map = LineMap::build(source);
    let short = Diagnostic::new(category::UNQUALIFIED, Span::new(14, 15), "same");
    let long = Diagnostic::new(category::UNQUALIFIED, Span::new(14, 17), "same");
    let other_message = Diagnostic::new(category::UNQUALIFIED, Span::new(14, 17), "different");
    let diagnostics = finalize(
        vec![short, long, other_message],
        &AnalysisConfig::new(),
        source,
        &line_map,
    );
    assert_eq!(messages(&diagnostics), vec!["same", "different"]);
    assert_eq!(diagnostics[0].span, Span::new(14, 15));
}

#[test]
fn test_finalize_keeps_explicit_severity_unless_configured() {
    let source = "Item {}\n";
    let line_map = LineMap::build(source);
    let explicit = Diagnostic::new(category::UNQUALIFIED, Span::new(0, 4), "explicit")
        .with_severity(Severity::Error);

    let kept = finalize(vec![explicit.clone()], &AnalysisConfig::new(), source, &line_map);
    assert_eq!(kept[0].severity, Severity::Error);

    let config = AnalysisConfig::new().with_level("unqualified", Level::Info);
    let overridden = finalize(vec![explicit], &config, source, &line_map);
    assert_eq!(overridden[0].severity, Severity::Info);
}

// =============================================================================
// Plugins and pass isolation
// =============================================================================

const CRASH: Category = Category::new("plugin.crash");

struct CrashingPlugin;

impl LintPlugin for CrashingPlugin {
    fn name(&self) -> &'static str {
        "crashing"
    }

    fn categories(&self) -> Vec<CategoryInfo> {
        vec![CategoryInfo::new(CRASH, "Always crashes", Level::Warning)]
    }

    fn passes(&self) -> Vec<PassEntry> {
        vec![PassEntry::new("crashing", &[CRASH], |_| panic!("boom"))]
    }
}

#[test]
fn test_crashing_pass_is_reported_and_others_still_run() {
    let passes = PassRegistry::builtin().with_plugin(&CrashingPlugin);
    let config = passes.default_config();
    let diagnostics = lint_with(UNQUALIFIED_SOURCE, &passes, &config);

    let crashed: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == category::INTERNAL)
        .collect();
    assert_eq!(crashed.len(), 1);
    assert_eq!(crashed[0].message, "Pass \"crashing\" crashed: boom");
    assert_eq!(crashed[0].severity, Severity::Critical);
    assert!(diagnostics.iter().any(|d| d.category == category::UNQUALIFIED));
}

#[test]
fn test_plugin_pass_reports_its_own_category() {
    struct RootMarker;

    impl LintPlugin for RootMarker {
        fn name(&self) -> &'static str {
            "root-marker"
        }

        fn categories(&self) -> Vec<CategoryInfo> {
            vec![CategoryInfo::new(Category::new("plugin.root"), "Marks the root", Level::Info)]
        }

        fn passes(&self) -> Vec<PassEntry> {
            vec![PassEntry::new("root-marker", &[Category::new("plugin.root")], |ctx| {
                let root = ctx.tree.get(ctx.tree.root);
                vec![Diagnostic::new(Category::new("plugin.root"), root.type_span, "root")]
            })]
        }
    }

    let passes = PassRegistry::builtin().with_plugin(&RootMarker);
    let config = passes.default_config();
    let diagnostics = lint_with("import QtQuick\nItem {}\n", &passes, &config);
    assert_eq!(messages(&diagnostics), vec!["root"]);
    assert_eq!(diagnostics[0].severity, Severity::Info);

    let disabled = config.with_level("plugin", Level::Disable);
    assert!(lint_with("import QtQuick\nItem {}\n", &passes, &disabled).is_empty());
}

#[test]
fn test_empty_registry_reports_only_binder_findings() {
    let diagnostics = lint_with(UNQUALIFIED_SOURCE, &PassRegistry::empty(), &AnalysisConfig::new());
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

// =============================================================================
// Deep and long input
// =============================================================================

/// Lint on a thread with the stack size rayon workers get.
fn lint_on_small_stack(source: String) -> Vec<Diagnostic> {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || lint(&source))
        .expect("spawn lint thread")
        .join()
        .expect("lint thread finished")
}

#[test]
fn test_overlong_operator_chain_is_a_syntax_error() {
    let source = format!("import QtQuick\nItem {{ width: 1{} }}\n", " + 1".repeat(4000));
    let diagnostics = lint_on_small_stack(source);
    assert_eq!(diagnostics.len(), 1, "{:?}", messages(&diagnostics));
    assert_eq!(diagnostics[0].category, category::SYNTAX);
    assert_eq!(diagnostics[0].severity, Severity::Critical);
    assert_eq!(diagnostics[0].message, "Maximum nesting depth exceeded");
}

#[test]
fn test_long_operator_chain_within_limit_lints() {
    let source = format!("import QtQuick\nItem {{ width: 1{} }}\n", " + 1".repeat(80));
    let diagnostics = lint_on_small_stack(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_deep_object_nesting_within_limit_lints() {
    let depth = qmlint_parser::MAX_DEPTH as usize - 4;
    let source = format!(
        "import QtQuick\n{}width: 1\n{}",
        "Item {\n".repeat(depth),
        "}\n".repeat(depth)
    );
    let diagnostics = lint_on_small_stack(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_deep_object_nesting_past_limit_is_a_syntax_error() {
    let depth = 300;
    let source = format!("import QtQuick\n{}{}", "Item {\n".repeat(depth), "}\n".repeat(depth));
    let diagnostics = lint_on_small_stack(source);
    assert_eq!(diagnostics.len(), 1, "{:?}", messages(&diagnostics));
    assert_eq!(diagnostics[0].severity, Severity::Critical);
}
