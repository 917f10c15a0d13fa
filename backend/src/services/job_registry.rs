//! Process-wide registry of recurring jobs keyed by task name.
//!
//! Each registered job runs on its own tokio task and fires its action once
//! per period, never overlapping with itself. Registering an existing name
//! aborts the old task first, so a name never has two live timers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::JobSnapshot;
use crate::services::fetcher::JobAction;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no job registered for task '{0}'")]
    NotRegistered(String),

    #[error("job registry has been shut down")]
    ShutDown,
}

#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// 注册任务，同名任务已存在时替换
    async fn register(
        &self,
        task_name: &str,
        period: Duration,
        action: Arc<dyn JobAction>,
    ) -> Result<(), RegistryError>;

    /// 移除任务，任务不存在时返回 [`RegistryError::NotRegistered`]
    async fn unregister(&self, task_name: &str) -> Result<(), RegistryError>;

    async fn is_registered(&self, task_name: &str) -> bool;

    async fn jobs(&self) -> Vec<JobSnapshot>;

    /// 停止所有任务，之后的注册都会失败
    async fn shutdown(&self);
}

#[derive(Debug, Default)]
struct RunStats {
    last_run_at: Option<DateTime<Utc>>,
    run_count: u64,
    last_error: Option<String>,
}

struct RegisteredJob {
    period: Duration,
    registered_at: DateTime<Utc>,
    stats: Arc<Mutex<RunStats>>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Jobs {
    closed: bool,
    entries: HashMap<String, RegisteredJob>,
}

/// 基于 tokio 定时器的任务注册表
#[derive(Default)]
pub struct IntervalJobRegistry {
    jobs: Mutex<Jobs>,
}

impl IntervalJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_job(
        task_name: String,
        period: Duration,
        action: Arc<dyn JobAction>,
        stats: Arc<Mutex<RunStats>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            // 首次触发在注册后一个周期
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                tracing::debug!("Running scheduled job '{}'", task_name);

                let result = action.run().await;

                let mut stats = stats.lock().await;
                stats.last_run_at = Some(Utc::now());
                stats.run_count += 1;
                match result {
                    Ok(count) => {
                        tracing::info!("Job '{}' completed, {} records fetched", task_name, count);
                        stats.last_error = None;
                    }
                    Err(e) => {
                        tracing::error!("Job '{}' failed: {}", task_name, e);
                        stats.last_error = Some(e.to_string());
                    }
                }
            }
        })
    }
}

#[async_trait]
impl JobRegistry for IntervalJobRegistry {
    async fn register(
        &self,
        task_name: &str,
        period: Duration,
        action: Arc<dyn JobAction>,
    ) -> Result<(), RegistryError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.closed {
            return Err(RegistryError::ShutDown);
        }

        if let Some(previous) = jobs.entries.remove(task_name) {
            previous.handle.abort();
            tracing::debug!("Replaced existing job '{}'", task_name);
        }

        let stats = Arc::new(Mutex::new(RunStats::default()));
        let handle = Self::spawn_job(task_name.to_string(), period, action, stats.clone());

        jobs.entries.insert(
            task_name.to_string(),
            RegisteredJob {
                period,
                registered_at: Utc::now(),
                stats,
                handle,
            },
        );

        tracing::info!(
            "Registered job '{}' with period {}s",
            task_name,
            period.as_secs()
        );

        Ok(())
    }

    async fn unregister(&self, task_name: &str) -> Result<(), RegistryError> {
        let mut jobs = self.jobs.lock().await;

        match jobs.entries.remove(task_name) {
            Some(job) => {
                job.handle.abort();
                tracing::info!("Removed job '{}'", task_name);
                Ok(())
            }
            None => Err(RegistryError::NotRegistered(task_name.to_string())),
        }
    }

    async fn is_registered(&self, task_name: &str) -> bool {
        self.jobs.lock().await.entries.contains_key(task_name)
    }

    async fn jobs(&self) -> Vec<JobSnapshot> {
        let jobs = self.jobs.lock().await;

        let mut snapshots = Vec::with_capacity(jobs.entries.len());
        for (task_name, job) in &jobs.entries {
            let stats = job.stats.lock().await;
            snapshots.push(JobSnapshot {
                task_name: task_name.clone(),
                period_secs: job.period.as_secs(),
                registered_at: job.registered_at,
                last_run_at: stats.last_run_at,
                run_count: stats.run_count,
                last_error: stats.last_error.clone(),
            });
        }
        snapshots.sort_by(|a, b| a.task_name.cmp(&b.task_name));

        snapshots
    }

    async fn shutdown(&self) {
        let mut jobs = self.jobs.lock().await;
        jobs.closed = true;

        for (task_name, job) in jobs.entries.drain() {
            job.handle.abort();
            tracing::debug!("Stopped job '{}'", task_name);
        }

        tracing::info!("Job registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{AppError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(60);

    #[derive(Default)]
    struct CountingAction {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl JobAction for CountingAction {
        async fn run(&self) -> Result<usize> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }
    }

    struct FailingAction;

    #[async_trait]
    impl JobAction for FailingAction {
        async fn run(&self) -> Result<usize> {
            Err(AppError::Upstream("upstream returned 500".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let registry = IntervalJobRegistry::new();
        let action = Arc::new(CountingAction::default());

        registry.register("sync", PERIOD, action.clone()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(action.runs.load(Ordering::SeqCst), 2);

        let jobs = registry.jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].run_count, 2);
        assert_eq!(jobs[0].period_secs, 60);
        assert!(jobs[0].last_run_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn re_registering_replaces_the_timer() {
        let registry = IntervalJobRegistry::new();
        let action = Arc::new(CountingAction::default());

        registry.register("sync", PERIOD, action.clone()).await.unwrap();
        registry.register("sync", PERIOD, action.clone()).await.unwrap();

        assert_eq!(registry.jobs().await.len(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(action.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_stops_firing() {
        let registry = IntervalJobRegistry::new();
        let action = Arc::new(CountingAction::default());

        registry.register("sync", PERIOD, action.clone()).await.unwrap();
        registry.unregister("sync").await.unwrap();
        assert!(!registry.is_registered("sync").await);

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unregister_unknown_task_is_an_error() {
        let registry = IntervalJobRegistry::new();

        let result = registry.unregister("missing").await;
        assert_eq!(result, Err(RegistryError::NotRegistered("missing".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_recorded_and_the_job_keeps_running() {
        let registry = IntervalJobRegistry::new();

        registry.register("sync", PERIOD, Arc::new(FailingAction)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(121)).await;

        let jobs = registry.jobs().await;
        assert_eq!(jobs[0].run_count, 2);
        assert!(jobs[0].last_error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn shutdown_clears_jobs_and_rejects_new_ones() {
        let registry = IntervalJobRegistry::new();
        let action = Arc::new(CountingAction::default());

        registry.register("a", PERIOD, action.clone()).await.unwrap();
        registry.register("b", PERIOD, action.clone()).await.unwrap();
        registry.shutdown().await;

        assert!(registry.jobs().await.is_empty());
        assert_eq!(
            registry.register("c", PERIOD, action).await,
            Err(RegistryError::ShutDown)
        );
    }
}
