// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact elapsed-time formatting for listings.

/// Format elapsed seconds as a short relative duration: `5s`, `2m`, `1h`, `3d`.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3_599 => format!("{}m", secs / 60),
        3_600..=86_399 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Format the gap between two epoch-millisecond stamps. Zero stamps print `-`.
pub fn format_elapsed_ms(then_ms: u64, now_ms: u64) -> String {
    if then_ms == 0 {
        return "-".to_string();
    }
    format_elapsed(now_ms.saturating_sub(then_ms) / 1000)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
