use std::fmt;

pub const ALERT_HEADING: &str = "Latest Message Received";
pub const DRAFT_LABEL: &str = "Your message";
pub const DRAFT_DESCRIPTION: &str = "Message to publish to your IoT backend.";

/// The "latest message" banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub heading: &'static str,
    pub body: String,
}

/// Snapshot of everything the panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub username: String,
    pub topic: String,
    pub subscribed: bool,
    pub alert: Option<Alert>,
    pub draft: String,
    pub draft_len: usize,
    pub max_len: usize,
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} (signed in as {}) ==", self.topic, self.username)?;
        if let Some(alert) = &self.alert {
            writeln!(f, "[{}] {}", alert.heading, alert.body)?;
        }
        writeln!(
            f,
            "{}: {} ({}/{})",
            DRAFT_LABEL, self.draft, self.draft_len, self.max_len
        )?;
        writeln!(f, "  {DRAFT_DESCRIPTION}")?;
        let status = if self.subscribed {
            "subscribed"
        } else {
            "unsubscribed"
        };
        write!(
            f,
            "{status} | /publish /unsubscribe /resubscribe /show /quit (start a message with // to send a leading /)"
        )
    }
}
