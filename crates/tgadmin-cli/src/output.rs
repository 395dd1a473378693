//! Terminal rendering.
//!
//! Data goes to stdout. Notifications go to stderr next to the logs.

use chrono::{DateTime, Utc};
use std::io::IsTerminal;
use tgadmin_core::StatusColor;
use tgadmin_dashboard::Notification;

/// Wrap `text` in the ANSI color for `color` when stdout is a terminal
/// and `NO_COLOR` is unset.
pub fn paint(text: &str, color: StatusColor) -> String {
    if colors_enabled() {
        format!("\x1b[{}m{text}\x1b[0m", color.ansi_code())
    } else {
        text.to_string()
    }
}

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Plain left-aligned table. Cells are padded to the widest entry of each
/// column; color codes must be applied after layout.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = render(headers.to_vec());
    for row in rows {
        out.push('\n');
        out.push_str(&render(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn print_notification(notification: &Notification) {
    let severity = notification.severity;
    let label = format!("[{severity}]");
    eprintln!("{} {}", paint(&label, severity.color()), notification.message);
}
