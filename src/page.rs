//! Page object for the Time Keeper board
//!
//! Translates semantic operations into step sequences so scenarios never
//! touch selector details directly. The page object performs no validation
//! of its own: empty labels and zones are passed through to the app, whose
//! form validation is exactly what the rejection scenarios exercise.

use crate::step::{PageStep, WaitState};

/// Selectors for the UI contract the board exposes at its root route
pub mod selectors {
    /// Rows of the timezone table
    pub const TABLE_ROWS: &str = "table tbody tr";
    /// Label text input in the add form
    pub const LABEL_INPUT: &str = r#"input[name="label"]"#;
    /// Timezone dropdown in the add form
    pub const TIMEZONE_SELECT: &str = "select#timezone";
    /// Control that opens the add form
    pub const ADD_BUTTON: &str = r#"button:has-text("Add timezone")"#;
    /// Control that confirms the add form
    pub const SAVE_BUTTON: &str = r#"button:has-text("Save")"#;
    /// Per-row delete control
    pub const DELETE_BUTTON: &str = r#"button:has-text("Delete")"#;
    /// Text marking the auto-detected local row
    pub const LOCAL_ROW_TEXT: &str = "You";
}

/// Records the step sequence for one scenario against the board
#[derive(Debug, Default)]
pub struct TimezonePage {
    steps: Vec<PageStep>,
}

impl TimezonePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector for rows whose text contains `text`
    pub fn row_containing(text: &str) -> String {
        format!(r#"tr:has-text("{}")"#, text)
    }

    /// Selector for the delete controls of rows whose text contains `text`
    fn delete_in_row(text: &str) -> String {
        format!("{} {}", Self::row_containing(text), selectors::DELETE_BUTTON)
    }

    /// Navigate to the application root and wait for the table to render
    pub fn goto(mut self) -> Self {
        self.steps.push(PageStep::Navigate {
            url: "/".to_string(),
            wait_for_selector: Some(selectors::TABLE_ROWS.to_string()),
        });
        self
    }

    /// Add an entry: open the form, fill the label, pick the zone, save
    ///
    /// `name` and `timezone` may both be empty; whether a row appears is the
    /// app's decision.
    pub fn add_timezone(mut self, name: &str, timezone: &str) -> Self {
        self.steps.push(PageStep::Click {
            selector: selectors::ADD_BUTTON.to_string(),
            timeout_ms: None,
        });
        self.steps.push(PageStep::Fill {
            selector: selectors::LABEL_INPUT.to_string(),
            value: name.to_string(),
        });
        self.steps.push(PageStep::Select {
            selector: selectors::TIMEZONE_SELECT.to_string(),
            value: timezone.to_string(),
        });
        self.steps.push(PageStep::Click {
            selector: selectors::SAVE_BUTTON.to_string(),
            timeout_ms: None,
        });
        self
    }

    /// Delete the first row (in document order) whose text contains `name`
    pub fn delete_timezone(mut self, name: &str) -> Self {
        self.steps.push(PageStep::Click {
            selector: Self::delete_in_row(name),
            timeout_ms: None,
        });
        self
    }

    /// Expect at least one visible row containing `text`
    pub fn expect_row_visible(mut self, text: &str) -> Self {
        self.steps.push(PageStep::Assert {
            selector: Self::row_containing(text),
            visible: Some(true),
            count: None,
            disabled: None,
            text_contains: None,
        });
        self
    }

    /// Expect exactly `count` rows containing `text`
    pub fn expect_row_count(mut self, text: &str, count: usize) -> Self {
        self.steps.push(PageStep::Assert {
            selector: Self::row_containing(text),
            visible: None,
            count: Some(count),
            disabled: None,
            text_contains: None,
        });
        self
    }

    /// Expect exactly one auto-detected local row
    pub fn expect_single_local_row(self) -> Self {
        self.expect_row_count(selectors::LOCAL_ROW_TEXT, 1)
    }

    /// Expect the local row's delete control to be disabled
    pub fn expect_local_delete_disabled(mut self) -> Self {
        self.steps.push(PageStep::Assert {
            selector: Self::delete_in_row(selectors::LOCAL_ROW_TEXT),
            visible: None,
            count: None,
            disabled: Some(true),
            text_contains: None,
        });
        self
    }

    /// Expect the page title to match `pattern`
    pub fn expect_title(mut self, pattern: &str) -> Self {
        self.steps.push(PageStep::AssertTitle {
            matches: pattern.to_string(),
        });
        self
    }

    /// Capture every row's inner text into the run output under `into`
    pub fn collect_rows(mut self, into: &str) -> Self {
        self.steps.push(PageStep::ExtractTexts {
            selector: selectors::TABLE_ROWS.to_string(),
            into: into.to_string(),
        });
        self
    }

    /// Wait for the table to settle after a mutation
    pub fn wait_for_table(mut self) -> Self {
        self.steps.push(PageStep::Wait {
            selector: selectors::TABLE_ROWS.to_string(),
            timeout_ms: crate::step::DEFAULT_TIMEOUT_MS,
            state: WaitState::Visible,
        });
        self
    }

    /// The recorded step sequence
    pub fn steps(self) -> Vec<PageStep> {
        self.steps
    }
}
