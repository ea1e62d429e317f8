//! Scenario runner orchestrating the app under test and the browser driver
//!
//! Scenarios run sequentially because the app instance is shared; each
//! scenario gets an exclusively owned, freshly launched browser. Results are
//! aggregated and written as JSON for whatever reads them afterwards.

use std::path::{Path, PathBuf};
use std::time::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::app::{AppConfig, AppHandle};
use crate::error::E2eResult;
use crate::playwright::{PlaywrightConfig, PlaywrightHandle};
use crate::scenarios::Scenario;
use crate::spec::ScenarioSpec;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running the whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Main scenario runner
pub struct ScenarioRunner {
    /// App under test configuration
    app_config: AppConfig,

    /// Playwright configuration
    playwright_config: PlaywrightConfig,

    /// Running app handle (if any)
    app: Option<AppHandle>,

    /// Output directory for results
    output_dir: PathBuf,
}

impl ScenarioRunner {
    /// Create a runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            app_config: config.app,
            playwright_config: config.playwright,
            app: None,
            output_dir: config.output_dir,
        }
    }

    /// Start (or attach to) the app under test
    pub async fn start_app(&mut self) -> E2eResult<()> {
        if self.app.is_some() {
            return Ok(()); // Already running
        }

        let app = AppHandle::start(self.app_config.clone()).await?;

        // Scenarios navigate relative to wherever the app actually landed
        self.playwright_config.base_url = app.base_url().to_string();

        self.app = Some(app);
        Ok(())
    }

    /// Stop the app under test
    pub fn stop_app(&mut self) -> E2eResult<()> {
        if let Some(mut app) = self.app.take() {
            app.stop()?;
        }
        Ok(())
    }

    /// Run a single scenario
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> E2eResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name());

        self.start_app().await?;

        let playwright = PlaywrightHandle::new(self.playwright_config.clone())?;
        let output = playwright.run(scenario.steps()).await?;

        let mut failure = if output.success {
            None
        } else {
            Some(
                output
                    .error
                    .clone()
                    .unwrap_or_else(|| "step failed without detail".to_string()),
            )
        };

        // Rust-side verification only applies to runs the browser finished
        if failure.is_none() {
            if let Err(e) = scenario.verify(&output) {
                failure = Some(e.to_string());
            }
        }

        Ok(ScenarioResult {
            name: scenario.name().to_string(),
            success: failure.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: failure,
        })
    }

    /// Run a list of scenarios sequentially
    pub async fn run_suite(&mut self, scenarios: &[Scenario]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        self.start_app().await?;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            match self.run_scenario(scenario).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name(), e);
                    results.push(ScenarioResult {
                        name: scenario.name().to_string(),
                        success: false,
                        duration_ms: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Load declarative scenario specs from a directory
    pub fn load_specs(&self, dir: &Path, tag: Option<&str>) -> E2eResult<Vec<Scenario>> {
        let specs = ScenarioSpec::load_all(dir)?;
        let scenarios = specs
            .iter()
            .filter(|s| tag.map_or(true, |t| s.tags.iter().any(|st| st == t)))
            .map(Scenario::from_spec)
            .collect();
        Ok(scenarios)
    }

    /// Write suite results to a JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScenarioRunner {
    fn drop(&mut self) {
        let _ = self.stop_app();
    }
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub app: AppConfig,
    pub playwright: PlaywrightConfig,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            playwright: PlaywrightConfig::default(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}
