// src/job/mod.rs
//! Фоновая проверка суши
//!
//! - [`controller`] — конечный автомат запросов старт/пауза/стоп/рестарт
//! - [`classifier`] — разреженная выборка биомов для одной провинции
//! - [`task`] — проход по реестру в рабочем потоке
//!
//! Сигналы кооперативные: рабочий поток смотрит на статус после каждой
//! провинции, а пауза между пробами прерывается стопом и рестартом.

pub mod classifier;
pub mod controller;
pub mod task;

use std::fmt;

pub use classifier::{ControlledDelay, LandClassifier, SampleThrottle};
pub use controller::JobController;
pub use task::{JobReport, LandValidationJob, PassOutcome};

/// Состояние задачи проверки суши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Idle,
    Running,
    PauseRequested,
    Paused,
    StopRequested,
    Stopped,
    RestartRequested,
}

impl JobStatus {
    /// Рабочий поток жив и ещё не отчитался
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            JobStatus::Running
                | JobStatus::PauseRequested
                | JobStatus::StopRequested
                | JobStatus::RestartRequested
        )
    }

    /// Прерывает ли статус паузу между пробами
    #[must_use]
    pub fn interrupts_sampling(self) -> bool {
        matches!(self, JobStatus::StopRequested | JobStatus::RestartRequested)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Idle => "idle",
            JobStatus::Running => "running",
            JobStatus::PauseRequested => "pause requested",
            JobStatus::Paused => "paused",
            JobStatus::StopRequested => "stop requested",
            JobStatus::Stopped => "stopped",
            JobStatus::RestartRequested => "restart requested",
        };
        f.write_str(s)
    }
}

/// Запрос, пришедший извне
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Start,
    Pause,
    Stop,
    Restart,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobAction::Start => "start",
            JobAction::Pause => "pause",
            JobAction::Stop => "stop",
            JobAction::Restart => "restart",
        };
        f.write_str(s)
    }
}

/// Событие жизненного цикла или прогресса
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Starting { pass: u32, total: usize },
    Progress {
        pass: u32,
        processed: usize,
        total: usize,
        percent: u8,
    },
    ProvinceFailed { province_id: u32, reason: String },
    Restarting { pass: u32 },
    Paused { processed: usize, total: usize },
    Stopped { processed: usize, total: usize },
    Completed { pass: u32, total: usize },
}

/// Получатель прогресса и сообщений задачи
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &JobEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&JobEvent) + Send + Sync,
{
    fn report(&self, event: &JobEvent) {
        self(event);
    }
}

/// Пишет события в `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, event: &JobEvent) {
        match event {
            JobEvent::Starting { pass, total } => {
                tracing::info!(pass, total, "Land validation job starting");
            }
            JobEvent::Progress {
                pass,
                processed,
                total,
                percent,
            } => {
                tracing::info!(pass, processed, total, "Land validation job progress: {percent}%");
            }
            JobEvent::ProvinceFailed {
                province_id,
                reason,
            } => {
                tracing::warn!(province_id, %reason, "Province left for the next pass");
            }
            JobEvent::Restarting { pass } => {
                tracing::info!(pass, "Land validation job restarting");
            }
            JobEvent::Paused { processed, total } => {
                tracing::info!(processed, total, "Land validation job paused");
            }
            JobEvent::Stopped { processed, total } => {
                tracing::info!(processed, total, "Land validation job stopped");
            }
            JobEvent::Completed { pass, total } => {
                tracing::info!(pass, total, "Land validation job complete");
            }
        }
    }
}
