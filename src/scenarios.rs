//! The built-in scenario suite for the Time Keeper board
//!
//! Each scenario is independent and order-insensitive: it starts with a
//! fresh navigation in a freshly launched browser, performs its semantic
//! operations through [`TimezonePage`], and asserts on the resulting state.
//! The ordering scenario additionally captures the table rows for the
//! Rust-side oracle.

use chrono::Local;

use crate::error::{E2eError, E2eResult};
use crate::oracle;
use crate::page::TimezonePage;
use crate::playwright::RunOutput;
use crate::spec::ScenarioSpec;
use crate::step::PageStep;

/// Key the ordering scenario stores the table rows under
const ROWS_KEY: &str = "rows";

type VerifyFn = fn(&RunOutput) -> E2eResult<()>;

/// One independent scenario: a step sequence plus an optional Rust-side
/// check over the captured output
pub struct Scenario {
    name: String,
    tags: Vec<String>,
    steps: Vec<PageStep>,
    verify: Option<VerifyFn>,
}

impl Scenario {
    pub fn new(name: &str, steps: Vec<PageStep>) -> Self {
        Self {
            name: name.to_string(),
            tags: Vec::new(),
            steps,
            verify: None,
        }
    }

    pub fn with_verify(name: &str, steps: Vec<PageStep>, verify: VerifyFn) -> Self {
        Self {
            name: name.to_string(),
            tags: Vec::new(),
            steps,
            verify: Some(verify),
        }
    }

    /// Wrap a declarative YAML spec (no Rust-side verification)
    pub fn from_spec(spec: &ScenarioSpec) -> Self {
        Self {
            name: spec.name.clone(),
            tags: spec.tags.clone(),
            steps: spec.steps.clone(),
            verify: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn steps(&self) -> &[PageStep] {
        &self.steps
    }

    /// Apply the Rust-side check, if any, to a successful run's output
    pub fn verify(&self, output: &RunOutput) -> E2eResult<()> {
        match self.verify {
            Some(f) => f(output),
            None => Ok(()),
        }
    }

    /// Whether this scenario captures output for Rust-side verification
    pub fn has_verify(&self) -> bool {
        self.verify.is_some()
    }
}

/// Every behavioral claim the suite makes about the board
pub fn builtin() -> Vec<Scenario> {
    vec![
        has_title(),
        displays_local_timezone(),
        sorts_rows_by_current_time(),
        adds_a_timezone(),
        local_row_delete_disabled(),
        rejects_missing_label(),
        rejects_missing_timezone(),
        deletes_one_of_duplicate_labels(),
        deletes_non_local_row(),
    ]
}

fn has_title() -> Scenario {
    Scenario::new(
        "has-title",
        TimezonePage::new().goto().expect_title("Time Keeper").steps(),
    )
}

fn displays_local_timezone() -> Scenario {
    // Without adding any row, the viewer's own timezone is already there
    Scenario::new(
        "displays-local-timezone",
        TimezonePage::new().goto().expect_single_local_row().steps(),
    )
}

fn sorts_rows_by_current_time() -> Scenario {
    let page = TimezonePage::new()
        .goto()
        .add_timezone("Mountain HQ", "America/Denver")
        .add_timezone("Central HQ", "America/Chicago")
        .add_timezone("Eastern HQ", "America/New_York")
        .add_timezone("Pacific HQ", "America/Los_Angeles")
        .add_timezone("Honululu HQ", "Pacific/Honolulu")
        .expect_row_visible("Honululu HQ")
        .collect_rows(ROWS_KEY);

    Scenario::with_verify("sorts-rows-by-current-time", page.steps(), verify_rows_sorted)
}

fn verify_rows_sorted(output: &RunOutput) -> E2eResult<()> {
    let rows = output.extracted.get(ROWS_KEY).ok_or_else(|| {
        E2eError::AssertionFailed(format!("no '{}' captured from the table", ROWS_KEY))
    })?;

    oracle::verify_time_order(rows, Local::now().date_naive())
}

fn adds_a_timezone() -> Scenario {
    Scenario::new(
        "adds-a-timezone",
        TimezonePage::new()
            .goto()
            .add_timezone("Mountain HQ", "America/Denver")
            .expect_row_visible("Mountain HQ")
            .steps(),
    )
}

fn local_row_delete_disabled() -> Scenario {
    Scenario::new(
        "local-row-delete-disabled",
        TimezonePage::new().goto().expect_local_delete_disabled().steps(),
    )
}

fn rejects_missing_label() -> Scenario {
    // An entry without a label never reaches the table
    Scenario::new(
        "rejects-missing-label",
        TimezonePage::new()
            .goto()
            .add_timezone("", "America/Denver")
            .expect_row_count("America/Denver", 0)
            .steps(),
    )
}

fn rejects_missing_timezone() -> Scenario {
    Scenario::new(
        "rejects-missing-timezone",
        TimezonePage::new()
            .goto()
            .add_timezone("Tor HQ", "")
            .expect_row_count("Tor HQ", 0)
            .steps(),
    )
}

fn deletes_one_of_duplicate_labels() -> Scenario {
    // Two rows share a label; deleting by that label removes only the first
    Scenario::new(
        "deletes-one-of-duplicate-labels",
        TimezonePage::new()
            .goto()
            .add_timezone("Pacific HQ", "America/Los_Angeles")
            .expect_row_visible("Pacific HQ")
            .add_timezone("Pacific HQ", "Pacific/Honolulu")
            .expect_row_count("Pacific HQ", 2)
            .delete_timezone("Pacific HQ")
            .expect_row_count("Pacific HQ", 1)
            .steps(),
    )
}

fn deletes_non_local_row() -> Scenario {
    Scenario::new(
        "deletes-non-local-row",
        TimezonePage::new()
            .goto()
            .add_timezone("Pacific HQ", "America/Los_Angeles")
            .expect_row_visible("Pacific HQ")
            .delete_timezone("Pacific HQ")
            .expect_row_count("Pacific HQ", 0)
            .steps(),
    )
}
