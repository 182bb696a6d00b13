// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn force_color() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
}

fn disable_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn styles_returns_styled_when_color_forced() {
    force_color();
    let debug = format!("{:?}", styles());
    assert_ne!(debug, format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn styles_returns_plain_when_no_color() {
    disable_color();
    assert_eq!(format!("{:?}", styles()), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn header_produces_ansi_when_color_forced() {
    force_color();
    let result = header("TYPE");
    assert!(result.contains("\x1b[38;5;74m"), "expected ANSI header color");
    assert!(result.contains("TYPE"));
    assert!(result.ends_with("\x1b[0m"), "expected ANSI reset");
}

#[test]
#[serial]
fn status_colors_follow_outcome() {
    force_color();
    assert!(status(&OperationStatus::Completed, "completed").contains("\x1b[38;5;108m"));
    assert!(status(&OperationStatus::Error, "error").contains("\x1b[38;5;167m"));
    assert!(status(&OperationStatus::Cancelled, "cancelled").contains("\x1b[38;5;179m"));
    assert_eq!(status(&OperationStatus::Running, "running"), "running");
}

#[test]
#[serial]
fn no_color_leaves_text_plain() {
    disable_color();
    assert_eq!(header("TYPE"), "TYPE");
    assert_eq!(muted("-"), "-");
    assert_eq!(status(&OperationStatus::Error, "error"), "error");
}
