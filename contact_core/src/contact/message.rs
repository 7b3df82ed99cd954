//! Outbound email composed from a submission

use super::submission::Submission;
use crate::config::SmtpSettings;

pub const SENDER_DISPLAY_NAME: &str = "Portfolio Contact";

/// Transport-neutral description of the email the relay sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutboundMessage {
    pub fn compose(submission: &Submission, settings: &SmtpSettings, to: &str) -> Self {
        Self {
            from_name: SENDER_DISPLAY_NAME.to_string(),
            from_address: settings.user.clone(),
            to: to.to_string(),
            reply_to: submission.email.clone(),
            subject: format!("New contact form submission from {}", submission.name),
            text: submission.message.clone(),
            html: render_html(&submission.message),
        }
    }
}

/// Escapes markup and turns line breaks into `<br/>`.
pub fn render_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    html.push_str("<p>");

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => html.push_str("<br/>"),
            other => html.push(other),
        }
    }

    html.push_str("</p>");
    html
}
