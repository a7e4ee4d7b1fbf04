//! Plain-text rendering of a dashboard snapshot.

use chrono::{DateTime, Utc};

use crate::models::{DashboardState, EnginePhase, Item, StatusKind};

/// Render `state` as terminal lines: a header, the category tabs, the active
/// filter, then one row (plus indented data) per visible item.
pub fn render(state: &DashboardState, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();

    let title = state.current_category.as_deref().unwrap_or("-");
    lines.push(format!("Dashboard: {title}"));

    if !state.categories.is_empty() {
        let tabs: Vec<String> = state
            .categories
            .iter()
            .map(|category| {
                if state.current_category.as_deref() == Some(category.as_str()) {
                    format!("[{category}]")
                } else {
                    category.clone()
                }
            })
            .collect();
        lines.push(tabs.join("  "));
    }

    if !state.filter.is_empty() {
        let status = state
            .filter
            .status_filter
            .map(|status| status.to_string())
            .unwrap_or_else(|| "any".to_string());
        let node = state.filter.node_substring.as_deref().unwrap_or("*");
        lines.push(format!("filter: status={status} node={node}"));
    }

    match (state.phase, state.last_error) {
        (EnginePhase::Idle, _) => lines.push("waiting for a category...".to_string()),
        (_, Some(kind)) => {
            let synced = state
                .last_synced_at
                .map(|at| format_relative_time(at, now))
                .unwrap_or_else(|| "never".to_string());
            lines.push(format!("connection problem ({kind}), retrying; last sync {synced}"));
        }
        _ => {}
    }

    let visible = state.visible_items();
    if visible.is_empty() && state.last_synced_at.is_some() {
        lines.push("(no items)".to_string());
    }
    for item in &visible {
        lines.push(render_row(item));
        for data_line in item.data.lines() {
            lines.push(format!("    {data_line}"));
        }
    }
    lines
}

fn render_row(item: &Item) -> String {
    format!(
        "{} {:<16} {:<15} {:<20} {}",
        status_marker(item.status),
        item.node,
        item.address,
        item.key,
        item.timestamp
    )
}

fn status_marker(status: StatusKind) -> &'static str {
    match status {
        StatusKind::Success => "[ ok ]",
        StatusKind::Warning => "[warn]",
        StatusKind::Danger => "[FAIL]",
        StatusKind::Info => "[info]",
        StatusKind::Other => "[ ?? ]",
    }
}

pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(at);
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} min ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} h ago", duration.num_hours())
    } else {
        format!("{} d ago", duration.num_days())
    }
}
