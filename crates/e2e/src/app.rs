//! The application under test: waiting for it, and optionally launching it

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{E2eError, E2eResult};

/// Handle to the application under test. Stops the process on drop when this
/// handle launched it.
pub struct AppHandle {
    child: Option<Child>,
    base_url: String,
}

impl AppHandle {
    /// Launch the configured command if there is one, then wait until the
    /// application answers
    pub async fn start(config: &AppConfig) -> E2eResult<Self> {
        match &config.command {
            Some(command) => Self::spawn(command, config).await,
            None => Self::attach(config).await,
        }
    }

    /// Wait for an application started elsewhere
    pub async fn attach(config: &AppConfig) -> E2eResult<Self> {
        let handle = AppHandle {
            child: None,
            base_url: config.base_url.clone(),
        };
        handle.wait_until_reachable(config.startup_timeout()).await?;
        info!("Application is up at {}", handle.base_url);
        Ok(handle)
    }

    /// Launch `command` and wait for it to answer at `config.base_url`
    pub async fn spawn(command: &str, config: &AppConfig) -> E2eResult<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| E2eError::AppStartup("empty command".to_string()))?;

        info!("Launching application: {}", command);

        let child = Command::new(program)
            .args(parts)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| E2eError::AppStartup(format!("Failed to spawn {}: {}", program, e)))?;

        let handle = AppHandle {
            child: Some(child),
            base_url: config.base_url.clone(),
        };
        handle.wait_until_reachable(config.startup_timeout()).await?;

        info!("Application is up at {}", handle.base_url);
        Ok(handle)
    }

    /// Any HTTP response counts; only connection failures mean "not yet"
    async fn wait_until_reachable(&self, timeout: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&self.base_url).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        warn!("Application answered {}", resp.status());
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application at {}...", self.base_url);
                    }
                    if !e.is_connect() && !e.is_timeout() {
                        warn!("Probe error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(200)).await;
        }

        Err(E2eError::AppUnreachable {
            url: self.base_url.clone(),
            attempts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn launched(&self) -> bool {
        self.child.is_some()
    }

    /// Stop a launched application. A no-op for an attached one.
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping application (pid: {})", child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        if let Ok(None) = child.try_wait() {
            child.kill()?;
        }
        child.wait()?;
        Ok(())
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop application: {}", e);
        }
    }
}
