/// Page state definitions for tracking per-page crawl outcomes
///
/// Only `Processed` and `RecordedEmpty` pages reach the report; every other
/// terminal state means the page contributed nothing.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Active States =====
    /// Page is in the frontier waiting to be fetched
    Queued,

    /// Page is currently being fetched
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched and extracted
    Processed,

    /// Page was not HTML and was recorded with no content
    RecordedEmpty,

    // ===== Terminal Error States =====
    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page returned another non-success HTTP status
    HttpError,

    /// Request timed out
    Timeout,

    /// Page could not be reached (connection refused, DNS failure, TLS error)
    Unreachable,

    /// Page Content-Type is not HTML and was skipped
    ContentMismatch,

    /// Page failed for other reasons (body decode error, worker panic)
    Failed,

    // ===== Special States =====
    /// Page redirected out of scope or onto an already-visited URL
    Redirected,

    /// Page was left out because the page cap was reached
    PageLimitHit,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Fetching)
    }

    /// Returns true if the page is part of the report
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::RecordedEmpty)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink
                | Self::HttpError
                | Self::Timeout
                | Self::Unreachable
                | Self::ContentMismatch
                | Self::Failed
        )
    }

    /// Short snake_case label used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Processed => "processed",
            Self::RecordedEmpty => "recorded_empty",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::Timeout => "timeout",
            Self::Unreachable => "unreachable",
            Self::ContentMismatch => "content_mismatch",
            Self::Failed => "failed",
            Self::Redirected => "redirected",
            Self::PageLimitHit => "page_limit_hit",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Fetching,
            Self::Processed,
            Self::RecordedEmpty,
            Self::DeadLink,
            Self::HttpError,
            Self::Timeout,
            Self::Unreachable,
            Self::ContentMismatch,
            Self::Failed,
            Self::Redirected,
            Self::PageLimitHit,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
