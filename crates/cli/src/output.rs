// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use ot_core::{format_elapsed_ms, Operation};
use ot_engine::TrackerEvent;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(epoch_ms: u64) -> String {
    format_elapsed_ms(epoch_ms, now_ms())
}

/// Format an epoch-millisecond stamp in local time.
pub fn format_timestamp(epoch_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|utc| utc.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render operations as an aligned table. The first line is the header.
pub fn format_operation_table(ops: &[Operation], now_ms: u64) -> Vec<String> {
    let type_w = ops.iter().map(|op| op.kind.len()).chain([4]).max().unwrap_or(4);
    let id_w = ops.iter().map(|op| op.id.len()).chain([2]).max().unwrap_or(2);
    let status_w = ops.iter().map(|op| op.status.as_str().len()).chain([6]).max().unwrap_or(6);

    let mut lines = Vec::with_capacity(ops.len() + 1);
    lines.push(
        format!("{:<type_w$}  {:<id_w$}  {:>4}  {:<status_w$}  {:>7}  MESSAGE", "TYPE", "ID", "PCT", "STATUS", "UPDATED")
            .trim_end()
            .to_string(),
    );
    for op in ops {
        let line = format!(
            "{:<type_w$}  {:<id_w$}  {:>3}%  {:<status_w$}  {:>7}  {}",
            op.kind,
            op.id,
            op.progress,
            op.status.as_str(),
            format_elapsed_ms(op.last_update_ms, now_ms),
            op.message
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Render one operation as `key: value` lines, extra fields last.
pub fn format_operation_detail(op: &Operation) -> Vec<String> {
    let mut lines = vec![
        format!("type:     {}", op.kind),
        format!("id:       {}", op.id),
        format!("status:   {}", op.status),
        format!("progress: {}%", op.progress),
        format!("message:  {}", op.message),
        format!("updated:  {}", format_timestamp(op.last_update_ms)),
    ];
    let mut extra: Vec<_> = op.extra.iter().collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in extra {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("{name}: {value}"));
    }
    lines
}

/// One line describing a tracker event.
pub fn format_event(kind: &str, event: &TrackerEvent) -> String {
    let report = event.report();
    let mut line = match event {
        TrackerEvent::Progress { id, .. } => {
            format!("{kind} {id}  {:>3}%  {}", report.progress, report.status)
        }
        TrackerEvent::Completed { id, .. } => format!("{kind} {id} completed"),
        TrackerEvent::Failed { id, .. } => format!("{kind} {id} failed"),
        TrackerEvent::Cancelled { id, .. } => format!("{kind} {id} cancelled"),
    };
    if !report.message.is_empty() {
        line.push_str("  ");
        line.push_str(&report.message);
    }
    line
}

/// JSON object describing a tracker event.
pub fn event_json(kind: &str, event: &TrackerEvent) -> serde_json::Value {
    let report = event.report();
    serde_json::json!({
        "event": event.name(),
        "type": kind,
        "id": event.id(),
        "progress": report.progress,
        "status": report.status,
        "message": report.message,
    })
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
