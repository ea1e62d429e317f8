//! App-under-test management
//!
//! The suite either spawns the Time Keeper app itself (binding it to a free
//! port through the conventional PORT variable) or attaches to an instance
//! that is already serving. Either way the root route must answer before any
//! scenario runs.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to the application under test
pub struct AppHandle {
    /// Spawned process, None in attach mode
    child: Option<Child>,
    base_url: String,
}

impl AppHandle {
    /// Start the app per `config`: attach when a base URL is given, spawn
    /// otherwise
    pub async fn start(config: AppConfig) -> E2eResult<Self> {
        let handle = match &config.base_url {
            Some(url) => {
                info!("Attaching to app at {}", url);
                AppHandle {
                    child: None,
                    base_url: url.trim_end_matches('/').to_string(),
                }
            }
            None => Self::spawn(&config)?,
        };

        handle.wait_for_ready(config.startup_timeout).await?;
        info!("App is ready at {}", handle.base_url);

        Ok(handle)
    }

    fn spawn(config: &AppConfig) -> E2eResult<Self> {
        let port = config.port.unwrap_or_else(find_free_port);
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning app under test on port {}", port);

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .env("PORT", port.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &config.workdir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::AppStartup(format!("Failed to spawn {}: {}", config.command, e))
        })?;

        Ok(AppHandle {
            child: Some(child),
            base_url,
        })
    }

    /// Poll the root route until the app answers
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&self.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Readiness check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for app to start...");
                    }
                    // Connection refused is expected while the app is starting
                    if !e.is_connect() {
                        warn!("Readiness check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::AppNotReady(attempts))
    }

    /// Base URL scenarios should navigate against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the app if this handle spawned it
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!("Stopping app under test (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        // Force kill if still running
        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for reaching the app under test
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Attach to an already-running instance instead of spawning one
    pub base_url: Option<String>,

    /// Command that starts the app
    pub command: String,

    /// Arguments to the command
    pub args: Vec<String>,

    /// Directory to run the command in
    pub workdir: Option<PathBuf>,

    /// Port to bind the app to (None = find a free port)
    pub port: Option<u16>,

    /// Timeout for the app to answer its root route
    pub startup_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            command: "npm".to_string(),
            args: vec!["start".to_string()],
            workdir: None,
            port: None,
            startup_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Split a full command line ("npm start") into command and args
    pub fn with_command_line(mut self, command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace();
        if let Some(command) = parts.next() {
            self.command = command.to_string();
            self.args = parts.map(String::from).collect();
        }
        self
    }
}

/// Find a free port to use
fn find_free_port() -> u16 {
    use std::net::TcpListener;

    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to find free port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}
