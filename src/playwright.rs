//! Playwright browser automation
//!
//! A scenario's steps are compiled into one standalone script and run under
//! Node with a freshly launched browser, so every scenario starts from a
//! clean page. The script reports back over stdout with a single sentinel
//! JSON line carrying the success flag and any texts captured by extract
//! steps.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::step::{PageStep, WaitState, DEFAULT_TIMEOUT_MS};

/// Prefix of the line the generated script prints its result under
const RESULT_SENTINEL: &str = "TIMEKEEPER_RESULT";

/// Playwright browser handle
pub struct PlaywrightHandle {
    /// Base URL of the app under test
    base_url: String,

    /// Directory for screenshots
    screenshot_dir: PathBuf,

    /// Viewport dimensions
    viewport_width: u32,
    viewport_height: u32,

    /// Browser type
    browser: Browser,

    /// Headless unless a debugging run asked otherwise
    headless: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Parse a browser name, falling back to chromium
    pub fn from_name(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// What a scenario run sent back over the sentinel line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunOutput {
    pub success: bool,

    #[serde(default)]
    pub error: Option<String>,

    /// Texts captured by extract steps, keyed by their `into` name
    #[serde(default)]
    pub extracted: HashMap<String, Vec<String>>,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        std::fs::create_dir_all(&config.screenshot_dir)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            screenshot_dir: config.screenshot_dir,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
        })
    }

    /// Check that Node can resolve the playwright package
    fn check_playwright_installed() -> E2eResult<()> {
        let mut cmd = Command::new("node");
        cmd.args(["-e", "require('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        apply_node_path(|k, v| {
            cmd.env(k, v);
        });

        match cmd.status() {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Compile and run the steps for one scenario
    pub async fn run(&self, steps: &[PageStep]) -> E2eResult<RunOutput> {
        let script = self.build_script(steps);
        self.run_script(&script).await
    }

    /// Build the Playwright script for a step sequence
    pub fn build_script(&self, steps: &[PageStep]) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

function fail(message) {{
  throw new Error(message);
}}

async function expectCount(locator, expected, timeoutMs) {{
  const deadline = Date.now() + timeoutMs;
  let count = await locator.count();
  while (count !== expected && Date.now() < deadline) {{
    await new Promise((resolve) => setTimeout(resolve, 100));
    count = await locator.count();
  }}
  if (count !== expected) {{
    fail(`expected ${{expected}} match(es), found ${{count}}`);
  }}
}}

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};
  const extracted = {{}};

  try {{
"#,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
            base_url = js_str(&self.base_url),
        ));

        for (i, step) in steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, step.label()));
            script.push_str(&self.step_to_js(step, i));
            script.push('\n');
        }

        script.push_str(&format!(
            r#"
    console.log('{sentinel} ' + JSON.stringify({{ success: true, extracted }}));
  }} catch (error) {{
    console.log('{sentinel} ' + JSON.stringify({{ success: false, error: error.message, extracted }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            sentinel = RESULT_SENTINEL,
        ));

        script
    }

    /// Convert a step to script code
    fn step_to_js(&self, step: &PageStep, step_index: usize) -> String {
        match step {
            PageStep::Navigate { url, wait_for_selector } => {
                let wait = wait_for_selector
                    .as_ref()
                    .map(|s| format!("\n    await page.waitForSelector({});", js_str(s)))
                    .unwrap_or_default();
                format!("    await page.goto(baseUrl + {});{}", js_str(url), wait)
            }
            PageStep::Click { selector, timeout_ms } => {
                let timeout = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
                format!(
                    "    await page.locator({}).first().click({{ timeout: {} }});",
                    js_str(selector),
                    timeout
                )
            }
            PageStep::Fill { selector, value } => {
                format!(
                    "    await page.locator({}).first().fill({});",
                    js_str(selector),
                    js_str(value)
                )
            }
            PageStep::Select { selector, value } => {
                format!(
                    "    await page.locator({}).first().selectOption({});",
                    js_str(selector),
                    js_str(value)
                )
            }
            PageStep::Wait { selector, timeout_ms, state } => {
                let state_str = match state {
                    WaitState::Visible => "visible",
                    WaitState::Hidden => "hidden",
                    WaitState::Attached => "attached",
                    WaitState::Detached => "detached",
                };
                format!(
                    "    await page.waitForSelector({}, {{ state: '{}', timeout: {} }});",
                    js_str(selector),
                    state_str,
                    timeout_ms
                )
            }
            PageStep::Sleep { ms } => {
                format!("    await page.waitForTimeout({});", ms)
            }
            PageStep::Assert { selector, visible, count, disabled, text_contains } => {
                let mut assertions = Vec::new();
                let sel = js_str(selector);

                if let Some(vis) = visible {
                    let state = if *vis { "visible" } else { "hidden" };
                    assertions.push(format!(
                        "    await page.locator({}).first().waitFor({{ state: '{}', timeout: {} }});",
                        sel, state, DEFAULT_TIMEOUT_MS
                    ));
                }

                if let Some(c) = count {
                    assertions.push(format!(
                        "    await expectCount(page.locator({}), {}, {});",
                        sel, c, DEFAULT_TIMEOUT_MS
                    ));
                }

                if let Some(dis) = disabled {
                    assertions.push(format!(
                        "    await page.locator({sel}).first().waitFor({{ state: 'attached', timeout: {timeout} }});\n    if ((await page.locator({sel}).first().isDisabled()) !== {expected}) {{\n      fail('expected ' + {sel} + ' disabled to be {expected}');\n    }}",
                        sel = sel,
                        timeout = DEFAULT_TIMEOUT_MS,
                        expected = dis
                    ));
                }

                if let Some(needle) = text_contains {
                    assertions.push(format!(
                        "    const text_{idx} = await page.locator({sel}).first().innerText();\n    if (!text_{idx}.includes({needle})) {{\n      fail('expected ' + {sel} + ' to contain ' + {needle});\n    }}",
                        idx = step_index,
                        sel = sel,
                        needle = js_str(needle)
                    ));
                }

                assertions.join("\n")
            }
            PageStep::AssertTitle { matches } => {
                format!(
                    "    const title_{idx} = await page.title();\n    if (!new RegExp({pattern}).test(title_{idx})) {{\n      fail('title ' + JSON.stringify(title_{idx}) + ' does not match ' + {pattern});\n    }}",
                    idx = step_index,
                    pattern = js_str(matches)
                )
            }
            PageStep::ExtractTexts { selector, into } => {
                format!(
                    "    extracted[{}] = await page.locator({}).allInnerTexts();",
                    js_str(into),
                    js_str(selector)
                )
            }
            PageStep::Screenshot { name, full_page } => {
                let path = self.screenshot_dir.join(format!("{}.png", name));
                format!(
                    "    await page.screenshot({{ path: {}, fullPage: {} }});",
                    js_str(&path.to_string_lossy()),
                    full_page
                )
            }
            PageStep::Log { message } => {
                format!("    console.log('[TEST] ' + {});", js_str(message))
            }
        }
    }

    /// Run a compiled script under Node and decode its sentinel result
    pub async fn run_script(&self, script: &str) -> E2eResult<RunOutput> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        // The script lives in a temp dir, so require('playwright') must
        // resolve from the suite's own node_modules.
        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path);
        apply_node_path(|k, v| {
            cmd.env(k, v);
        });

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match result_line(&stdout) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(E2eError::Playwright(format!(
                    "script produced no result line:\nstdout: {}\nstderr: {}",
                    stdout, stderr
                )))
            }
        }
    }
}

/// Point NODE_PATH at ./node_modules unless the caller already set it
fn apply_node_path(mut set_env: impl FnMut(&str, &std::ffi::OsStr)) {
    if std::env::var_os("NODE_PATH").is_none() {
        if let Ok(cwd) = std::env::current_dir() {
            set_env("NODE_PATH", cwd.join("node_modules").as_os_str());
        }
    }
}

/// Find the sentinel result line in script output
fn result_line(stdout: &str) -> Option<&str> {
    let re = Regex::new(&format!(r"(?m)^{} (.*)$", RESULT_SENTINEL))
        .expect("sentinel pattern is a valid regex");
    re.captures_iter(stdout)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
        }
    }
}

/// Escape a value into a single-quoted script string literal
fn js_str(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped.push('\'');
    escaped
}
