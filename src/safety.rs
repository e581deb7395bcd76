//! Message safety filter
//!
//! Every chat message is screened before it is stored. Screening runs in two
//! stages and both must pass:
//! - a local stage (phone-number shape and off-platform keywords), no I/O
//! - a remote stage that asks a text model whether the message tries to move
//!   the deal off-platform or share contact details
//!
//! A local match short-circuits: the remote model is never consulted. The
//! remote stage fails open. Errors, timeouts, cancellation, empty or
//! unparseable output are all treated as safe, and `screen` never returns an
//! error to its caller.

use crate::{
    classifier::{GenerateRequest, TextModel},
    storage::Settings,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Keywords that suggest taking the conversation off-platform
pub const RESTRICTED_KEYWORDS: &[&str] = &[
    "whatsapp",
    "call me",
    "call my",
    "dm me",
    "phone number",
    "telegram",
    "send number",
    "contact me on",
    "outside the app",
    "send money to",
];

/// Reason given when a phone number is detected
pub const PHONE_NUMBER_REASON: &str =
    "Safety Alert: Sharing phone numbers is not allowed. Please chat within the app.";

/// Reason shown when the remote model flags a message without saying why
pub const REMOTE_BLOCK_REASON: &str = "Message blocked by AI Monitor: Attempt to trade off-platform or share contact info detected.";

/// Default bound on the remote classification call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(8);

/// Outcome of screening one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    /// Whether the message may be sent
    pub is_safe: bool,
    /// Why the message was flagged (if it was)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    /// A passing verdict
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            reason: None,
        }
    }

    /// A failing verdict with a user-facing reason
    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
        }
    }

    /// Reason to show the user, with a generic fallback for unexplained blocks
    pub fn reason_or_default(&self) -> String {
        self.reason
            .clone()
            .unwrap_or_else(|| REMOTE_BLOCK_REASON.to_string())
    }
}

/// Which local rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRule {
    /// A telephone-number-shaped substring
    PhoneNumber,
    /// One of [`RESTRICTED_KEYWORDS`]
    Keyword(&'static str),
}

impl LocalRule {
    /// User-facing description of the rule
    pub fn reason(&self) -> String {
        match self {
            LocalRule::PhoneNumber => PHONE_NUMBER_REASON.to_string(),
            LocalRule::Keyword(keyword) => format!(
                "Safety Alert: \"{}\" looks like an attempt to move the conversation off-platform. Please chat and pay within the app.",
                keyword
            ),
        }
    }
}

/// Check a message against the local rules
///
/// Phone numbers are checked first, on the text with all whitespace removed,
/// so `0803 123 4567` is caught. Keywords are matched case-insensitively.
pub fn check_local(text: &str) -> Option<LocalRule> {
    let compact: String = text.chars().filter(|c| !is_separator(*c)).collect();
    if contains_phone_number(&compact) {
        return Some(LocalRule::PhoneNumber);
    }

    let lower = text.to_lowercase();
    RESTRICTED_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lower.contains(*keyword))
        .map(LocalRule::Keyword)
}

/// Whitespace stripped before phone matching
///
/// Unicode whitespace plus the byte order mark, which renders as nothing.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Whether `text` contains a Nigerian phone number
///
/// Matches `(\+?234|0)[789][01]` followed by eight digits anywhere in the
/// input, e.g. `08012345678`, `+2348012345678`, `2349012345678`.
pub fn contains_phone_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).any(|start| {
        let rest = &bytes[start..];
        // `+234` is covered by the `234` match one byte later
        let prefix_len = if rest.starts_with(b"234") {
            3
        } else if rest.starts_with(b"0") {
            1
        } else {
            return false;
        };
        is_subscriber_number(&rest[prefix_len..])
    })
}

/// `[789][01]\d{8}` at the start of `bytes`
fn is_subscriber_number(bytes: &[u8]) -> bool {
    bytes.len() >= 10
        && matches!(bytes[0], b'7' | b'8' | b'9')
        && matches!(bytes[1], b'0' | b'1')
        && bytes[2..10].iter().all(u8::is_ascii_digit)
}

/// Instruction sent to the remote model for one message
fn moderation_prompt(message: &str) -> String {
    format!(
        r#"You are a safety moderator for a student marketplace app.
Analyze the following message sent between a buyer and a seller.

Message: "{message}"

Detect whether the sender is trying to:
1. Take the transaction off-platform (e.g. "let's talk on WhatsApp", "call me", "DM me on Insta").
2. Share personal contact details (phone numbers, email addresses, handles).
3. Arrange a meeting that bypasses the app's secure channels (meeting on campus is allowed).

If any of these apply, return strict JSON: {{"isSafe": false, "reason": "Reason for flagging"}}
Otherwise return strict JSON: {{"isSafe": true}}

Do not include markdown formatting. Return only the JSON string."#
    )
}

/// Parse the remote model's output into a verdict
///
/// Tolerates surrounding whitespace and a markdown code fence. Returns `None`
/// for empty or malformed output.
pub fn parse_remote_verdict(raw: &str) -> Option<SafetyVerdict> {
    let mut body = raw.trim();
    if body.is_empty() {
        return None;
    }

    if let Some(stripped) = body.strip_prefix("```") {
        let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
        body = stripped.strip_suffix("```").unwrap_or(stripped).trim();
    }

    serde_json::from_str(body).ok()
}

/// Two-stage message screener
#[derive(Clone)]
pub struct SafetyFilter {
    /// Remote model for the second stage (`None` = local rules only)
    model: Option<Arc<dyn TextModel>>,
    /// Upper bound on the remote call
    timeout: Duration,
}

impl std::fmt::Debug for SafetyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyFilter")
            .field("remote", &self.model.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SafetyFilter {
    /// Create a filter backed by a remote model
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model: Some(model),
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Create a filter that only applies the local rules
    pub fn local_only() -> Self {
        Self {
            model: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Create a filter configured from settings
    ///
    /// The model is dropped when `remote_screening_enabled` is off.
    pub fn from_settings(settings: &Settings, model: Option<Arc<dyn TextModel>>) -> Self {
        let filter = match model {
            Some(model) if settings.remote_screening_enabled => Self::new(model),
            _ => Self::local_only(),
        };
        filter.with_timeout(settings.classifier_timeout())
    }

    /// Override the remote call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the remote stage is active
    pub fn has_remote(&self) -> bool {
        self.model.is_some()
    }

    /// Screen a message
    pub async fn screen(&self, text: &str) -> SafetyVerdict {
        self.screen_with_cancel(text, &CancellationToken::new()).await
    }

    /// Screen a message, abandoning the remote stage if `cancel` fires
    ///
    /// A cancelled remote stage fails open like any other remote failure.
    pub async fn screen_with_cancel(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> SafetyVerdict {
        if let Some(rule) = check_local(text) {
            info!("Message blocked by local rule {:?}", rule);
            return SafetyVerdict::flagged(rule.reason());
        }
        debug!("Local rules passed");

        let Some(model) = &self.model else {
            return SafetyVerdict::safe();
        };

        let request = GenerateRequest::json(moderation_prompt(text));
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Remote screening cancelled, failing open");
                return SafetyVerdict::safe();
            }
            outcome = tokio::time::timeout(self.timeout, model.generate(request)) => outcome,
        };

        match outcome {
            Err(_) => {
                warn!(
                    "Remote screening timed out after {:?}, failing open",
                    self.timeout
                );
                SafetyVerdict::safe()
            }
            Ok(Err(e)) => {
                warn!("Remote screening failed: {}. Failing open.", e);
                SafetyVerdict::safe()
            }
            Ok(Ok(raw)) => match parse_remote_verdict(&raw) {
                Some(verdict) => {
                    if !verdict.is_safe {
                        info!("Message blocked by remote classifier");
                    }
                    verdict
                }
                None => {
                    warn!("Unparseable classifier output, failing open");
                    SafetyVerdict::safe()
                }
            },
        }
    }
}
