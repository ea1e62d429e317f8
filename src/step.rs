//! The step vocabulary scenarios are built from
//!
//! Steps are serde-tagged so declarative YAML scenarios can use the same
//! vocabulary as the code-defined suite.

use serde::{Deserialize, Serialize};

/// Default wait budget for actions and assertions, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// A single browser interaction within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageStep {
    /// Navigate to a URL (relative to the app base)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for_selector: Option<String>,
    },

    /// Click the first element matching a selector
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input field
    Fill {
        selector: String,
        value: String,
    },

    /// Select an option from a dropdown
    Select {
        selector: String,
        value: String,
    },

    /// Wait for an element to reach a state
    Wait {
        selector: String,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        state: WaitState,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep {
        ms: u64,
    },

    /// Assert something about the elements matching a selector
    Assert {
        selector: String,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        disabled: Option<bool>,
        #[serde(default)]
        text_contains: Option<String>,
    },

    /// Assert the page title matches a pattern
    AssertTitle {
        matches: String,
    },

    /// Capture the inner text of every matching element into the run output
    ExtractTexts {
        selector: String,
        into: String,
    },

    /// Take a screenshot
    Screenshot {
        name: String,
        #[serde(default)]
        full_page: bool,
    },

    /// Log a message (for debugging)
    Log {
        message: String,
    },
}

fn default_wait_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl PageStep {
    /// Short label used in logs and failure reports
    pub fn label(&self) -> String {
        match self {
            PageStep::Navigate { url, .. } => format!("navigate:{}", url),
            PageStep::Click { selector, .. } => format!("click:{}", selector),
            PageStep::Fill { selector, .. } => format!("fill:{}", selector),
            PageStep::Select { selector, .. } => format!("select:{}", selector),
            PageStep::Wait { selector, .. } => format!("wait:{}", selector),
            PageStep::Sleep { ms } => format!("sleep:{}ms", ms),
            PageStep::Assert { selector, .. } => format!("assert:{}", selector),
            PageStep::AssertTitle { matches } => format!("assert_title:{}", matches),
            PageStep::ExtractTexts { selector, .. } => format!("extract:{}", selector),
            PageStep::Screenshot { name, .. } => format!("screenshot:{}", name),
            PageStep::Log { message } => {
                format!("log:{}", &message[..message.len().min(30)])
            }
        }
    }
}
