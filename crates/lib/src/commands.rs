//! Chat-command text formatting.
//!
//! The diary application exposes a small read-only chat-bot surface. The
//! bot transport itself is an external collaborator; this module only
//! formats the summaries it sends. All formatters are pure functions over
//! already-fetched data.

use chrono::{DateTime, Utc};

use crate::node::ActivityListing;
use crate::sync::PeerHealth;
use crate::types::{DiaryEntry, NodeRole};

/// Greeting for `/start`.
pub fn format_start(username: &str) -> String {
    format!(
        "Hello {username}! Your diary is ready.\n\
         Commands: /entries - recent entries, /activity - login activity, /status - node status."
    )
}

/// Summary of recent diary entries for `/entries`.
pub fn format_entries(entries: &[DiaryEntry]) -> String {
    if entries.is_empty() {
        return "No diary entries yet.".to_string();
    }
    let mut out = format!("Your {} most recent entries:\n", entries.len());
    for entry in entries {
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            format!(
                " [{}]",
                entry.tags.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };
        out.push_str(&format!(
            "- {} - {}{tags}\n",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.title,
        ));
    }
    out
}

/// Summary of login activity for `/activity`.
pub fn format_activity(listing: &ActivityListing) -> String {
    let mut out = format!(
        "{} active session(s), {} recent login(s):\n",
        listing.active.len(),
        listing.recent.len()
    );
    for session in &listing.recent {
        let marker = if session.is_suspicious {
            " (suspicious)"
        } else if session.is_active {
            " (active)"
        } else {
            ""
        };
        out.push_str(&format!(
            "- {} on {} from {}{marker}\n",
            session.login_time.format("%Y-%m-%d %H:%M"),
            session.device_name,
            session.ip,
        ));
    }
    out
}

/// Node and peer status for `/status`.
pub fn format_status(
    role: NodeRole,
    peer: &PeerHealth,
    now: DateTime<Utc>,
) -> String {
    let peer_line = match (peer.reachable, peer.last_success) {
        (true, _) => "peer reachable".to_string(),
        (false, Some(last)) => format!(
            "peer unreachable ({} failed probes, last seen {})",
            peer.consecutive_failures,
            last.format("%Y-%m-%d %H:%M")
        ),
        (false, None) => "peer never reached".to_string(),
    };
    format!(
        "Node role: {role}\nTime: {}\nReplication: {peer_line}",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}
