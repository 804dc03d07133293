//! Live sessions: background analysis with last-write-wins revisions.

use qmlint::{AnalysisConfig, DiagnosticBatch, LiveSession, ResolverOptions, Session};
use qmlint_common::category;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(20);
const QUIET: Duration = Duration::from_millis(300);

const BROKEN: &str = "import QtQuick\nItem {\n    width: undefinedName\n}\n";
const FIXED: &str = "import QtQuick\nItem {\n    width: 10\n}\n";

fn live() -> LiveSession {
    LiveSession::new(Session::new(ResolverOptions::default(), AnalysisConfig::new()))
}

fn next(live: &LiveSession) -> DiagnosticBatch {
    live.next_batch(TIMEOUT).expect("a batch should arrive")
}

#[test]
fn test_batch_carries_all_diagnostics_of_a_revision() {
    let live = live();
    assert!(live.submit("Main.qml", 1, BROKEN));

    let batch = next(&live);
    assert_eq!(batch.document, "Main.qml");
    assert_eq!(batch.revision, 1);
    assert_eq!(batch.diagnostics.len(), 1);
    assert_eq!(batch.diagnostics[0].category, category::UNQUALIFIED);
    assert_eq!(live.latest_delivered("Main.qml"), Some(1));
}

#[test]
fn test_older_revision_is_rejected() {
    let live = live();
    assert!(live.submit("Main.qml", 5, FIXED));
    assert!(!live.submit("Main.qml", 4, BROKEN));
    assert_eq!(live.latest_submitted("Main.qml"), Some(5));

    let batch = next(&live);
    assert_eq!(batch.revision, 5);
    assert!(batch.diagnostics.is_empty());
    assert!(live.next_batch(QUIET).is_none());
}

#[test]
fn test_delivered_revisions_never_go_back() {
    let live = live();
    for revision in 1..=20 {
        let text = if revision % 2 == 0 { FIXED } else { BROKEN };
        assert!(live.submit("Main.qml", revision, text));
    }

    let mut last = 0;
    let mut batches = Vec::new();
    while let Some(batch) = live.next_batch(if last == 20 { QUIET } else { TIMEOUT }) {
        assert!(batch.revision > last, "{} after {}", batch.revision, last);
        last = batch.revision;
        batches.push(batch);
    }
    assert_eq!(last, 20, "the newest revision is always delivered");
    assert!(batches.last().is_some_and(|b| b.diagnostics.is_empty()));
}

#[test]
fn test_documents_are_independent() {
    let live = live();
    assert!(live.submit("A.qml", 3, BROKEN));
    assert!(live.submit("B.qml", 1, FIXED));

    let mut batches = vec![next(&live), next(&live)];
    batches.sort_by(|a, b| a.document.cmp(&b.document));
    assert_eq!(batches[0].document, "A.qml");
    assert_eq!(batches[0].revision, 3);
    assert_eq!(batches[0].diagnostics.len(), 1);
    assert_eq!(batches[1].document, "B.qml");
    assert!(batches[1].diagnostics.is_empty());
}

#[test]
fn test_close_forgets_revisions() {
    let live = live();
    assert!(live.submit("Main.qml", 7, FIXED));
    next(&live);

    live.close("Main.qml");
    assert_eq!(live.latest_submitted("Main.qml"), None);
    assert!(live.submit("Main.qml", 1, BROKEN));
    assert_eq!(next(&live).revision, 1);
}
