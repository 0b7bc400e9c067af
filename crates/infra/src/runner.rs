//! Pull-based analytics refresh.
//!
//! The engine itself is stateless; "live" dashboards are served by recomputing
//! on a schedule and whenever the caller signals that inventory changed.

use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Local};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use stocklens_analytics::{AnalyticsEngine, AnalyticsResult, ItemSource, MovementSource, Window};
use stocklens_core::{DomainError, TenantScope};

/// Sink for recomputed analytics (cache, websocket fan-out, ...).
pub trait AnalyticsSink: Send + Sync + 'static {
    fn emit(&self, scope: TenantScope, result: AnalyticsResult);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsSink {
    inner: Mutex<Vec<(TenantScope, AnalyticsResult)>>,
}

impl InMemoryAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(TenantScope, AnalyticsResult)> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<AnalyticsResult> {
        self.inner
            .lock()
            .ok()
            .and_then(|v| v.last().map(|(_, r)| r.clone()))
    }
}

impl AnalyticsSink for InMemoryAnalyticsSink {
    fn emit(&self, scope: TenantScope, result: AnalyticsResult) {
        if let Ok(mut v) = self.inner.lock() {
            v.push((scope, result));
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid runner configuration: {0}")]
    InvalidConfig(#[from] DomainError),

    #[error("failed to spawn runner thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Config for the analytics refresh runner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub interval_secs: u64,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub window_days: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            max_retries: 5,
            base_backoff_ms: 250,
            window_days: 30,
        }
    }
}

impl RunnerConfig {
    /// Load from defaults + `STOCKLENS_RUNNER_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix("STOCKLENS_RUNNER"))
    }

    pub fn load_from(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

/// Handle for a running refresh loop (shutdown + trigger hook).
#[derive(Debug)]
pub struct AnalyticsRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl AnalyticsRunnerHandle {
    /// Request a recomputation (e.g. after a stock movement was recorded).
    ///
    /// Triggers are coalesced: if one is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Gracefully stop the runner thread.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsRunner {
    config: RunnerConfig,
}

impl AnalyticsRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Spawn a scope-pinned refresh thread.
    ///
    /// - Schedule: recomputes every `interval` (and once on startup)
    /// - Event-trigger: `handle.trigger()`
    /// - Failures: logged + retried with bounded exponential backoff; once
    ///   retries are exhausted the empty result is emitted
    pub fn spawn_for_scope<I, M, S>(
        &self,
        name: &'static str,
        scope: TenantScope,
        engine: Arc<AnalyticsEngine<I, M>>,
        sink: Arc<S>,
    ) -> Result<AnalyticsRunnerHandle, RunnerError>
    where
        I: ItemSource + 'static,
        M: MovementSource + 'static,
        S: AnalyticsSink,
    {
        let window = Window::new(self.config.window_days)?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.config.clone();
        let join = thread::Builder::new().name(name.to_string()).spawn(move || {
            runner_loop(name, scope, window, cfg, shutdown_rx, trigger_rx, engine, sink)
        })?;

        Ok(AnalyticsRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn runner_loop<I, M, S>(
    name: &'static str,
    scope: TenantScope,
    window: Window,
    cfg: RunnerConfig,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    engine: Arc<AnalyticsEngine<I, M>>,
    sink: Arc<S>,
) where
    I: ItemSource,
    M: MovementSource,
    S: AnalyticsSink,
{
    info!(runner = name, scope = %scope, window_days = window.days(), "analytics runner started");

    let interval = cfg.interval();
    let mut next_tick = Instant::now() + interval;
    let mut pending = true; // run once on startup
    let mut failures: u32 = 0;
    let mut backoff_until: Option<Instant> = None;

    loop {
        // Shutdown has priority.
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            // Keep a stable cadence even if we were delayed.
            while next_tick <= now {
                next_tick += interval.max(Duration::from_millis(1));
            }
        }

        // Coalesce triggers.
        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if let Some(until) = backoff_until {
            if Instant::now() < until {
                thread::sleep(Duration::from_millis(10));
                continue;
            }
            backoff_until = None;
        }

        if !pending {
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(50));
            thread::sleep(sleep_for);
            continue;
        }

        pending = false;

        let as_of: DateTime<FixedOffset> = Local::now().into();
        match engine.try_compute_at(&scope, window, as_of) {
            Ok(result) => {
                failures = 0;
                sink.emit(scope, result);
            }
            Err(e) => {
                failures += 1;
                warn!(runner = name, scope = %scope, attempt = failures, error = %e, "analytics recomputation failed");
                if failures <= cfg.max_retries {
                    pending = true;
                    backoff_until = Some(Instant::now() + backoff(cfg.base_backoff(), failures));
                } else {
                    failures = 0;
                    sink.emit(scope, AnalyticsResult::empty(window, &as_of));
                }
            }
        }
    }

    info!(runner = name, scope = %scope, "analytics runner stopped");
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped at 10s.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 2), Duration::from_millis(500));
        assert_eq!(backoff(base, 3), Duration::from_millis(1000));
        assert_eq!(backoff(base, 30), Duration::from_millis(10_000));
    }

    #[test]
    fn config_reads_environment_overrides() {
        let vars = [("STOCKLENS_RUNNER_WINDOW_DAYS", "14"), ("STOCKLENS_RUNNER_MAX_RETRIES", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();

        let cfg = RunnerConfig::load_from(Environment::with_prefix("STOCKLENS_RUNNER").source(Some(vars)))
            .unwrap();
        assert_eq!(cfg.window_days, 14);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.interval_secs, 60);
    }
}
