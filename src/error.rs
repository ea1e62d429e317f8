//! Error types for the Time Keeper E2E suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("App failed to start: {0}")]
    AppStartup(String),

    #[error("App readiness check failed after {0} attempts")]
    AppNotReady(usize),

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario spec error: {0}")]
    SpecParse(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Rows out of time order: {0}")]
    OrderViolation(String),

    #[error("Unparseable time cell in row: {0:?}")]
    TimeParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
