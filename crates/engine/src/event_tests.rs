// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    completed = { OperationStatus::Completed, Some("completed") },
    error     = { OperationStatus::Error,     Some("failed") },
    cancelled = { OperationStatus::Cancelled, Some("cancelled") },
    running   = { OperationStatus::Running,   None },
    starting  = { OperationStatus::Starting,  None },
    unknown   = { OperationStatus::Other("paused".into()), None },
)]
fn settled_event_by_status(status: OperationStatus, expected: Option<&str>) {
    let report = ProgressReport::new(100, status);
    let event = TrackerEvent::settled("42", &report);
    assert_eq!(event.as_ref().map(TrackerEvent::name), expected);
    if let Some(event) = event {
        assert!(event.is_terminal());
        assert_eq!(event.id(), "42");
        assert_eq!(event.report(), &report);
    }
}

#[test]
fn progress_is_not_terminal() {
    let event = TrackerEvent::Progress {
        id: "1".into(),
        report: ProgressReport::new(5, OperationStatus::Running),
    };
    assert!(!event.is_terminal());
    assert_eq!(event.report().progress, 5);
}
