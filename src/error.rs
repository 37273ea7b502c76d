use thiserror::Error;

/// Failures raised while driving a live page.
///
/// None of these escalate past the component that raised them: heuristics,
/// probes and pagination steps log the error and treat it as "no signal".
#[derive(Debug, Error)]
pub enum Error {
    /// A script or DOM query failed inside the page
    #[error("DOM evaluation failed: {0}")]
    Evaluation(String),

    /// Navigating to a URL failed (timeout, DNS, bad status)
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A selector matched nothing
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    /// A CSS selector could not be parsed
    #[error("invalid selector {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A JSON-LD block (or other embedded data) could not be parsed
    #[error("malformed structured data: {0}")]
    MalformedStructuredData(String),

    /// The WebDriver session rejected a command
    #[error("webdriver error: {0}")]
    WebDriver(String),

    /// A bounded wait elapsed
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<fantoccini::error::CmdError> for Error {
    fn from(error: fantoccini::error::CmdError) -> Self {
        Error::WebDriver(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Evaluation(error.to_string())
    }
}
