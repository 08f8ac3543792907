// src/job/controller.rs
//! Автомат состояний задачи.
//!
//! Внешние потоки только выставляют запросы (`*_REQUESTED`). Рабочий поток
//! замечает их в контрольной точке и сам переводит автомат в итоговое
//! состояние. Любой переход будит ожидающих на `Condvar`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::ControlError;
use crate::job::{JobAction, JobStatus};

/// Что рабочий поток должен сделать после провинции
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    Continue,
    Paused,
    Stopped,
    Restart,
}

#[derive(Debug)]
pub struct JobController {
    status: Mutex<JobStatus>,
    changed: Condvar,
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}

impl JobController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Mutex::new(JobStatus::Idle),
            changed: Condvar::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        *self.lock()
    }

    /// `Idle`/`Stopped` → `Running`. Второй параллельный проход не допускается.
    pub fn request_start(&self) -> Result<(), ControlError> {
        let mut status = self.lock();
        let current = *status;
        match current {
            JobStatus::Idle | JobStatus::Stopped => {
                self.set(&mut status, JobStatus::Running);
                Ok(())
            }
            _ if current.is_active() => Err(ControlError::AlreadyRunning(current)),
            _ => Err(ControlError::InvalidTransition {
                action: JobAction::Start,
                status: current,
            }),
        }
    }

    pub fn request_pause(&self) -> Result<(), ControlError> {
        self.transition(
            JobAction::Pause,
            &[JobStatus::Running],
            JobStatus::PauseRequested,
        )
    }

    /// Из `Paused` рабочего потока уже нет, поэтому стоп применяется сразу.
    pub fn request_stop(&self) -> Result<(), ControlError> {
        let mut status = self.lock();
        let current = *status;
        match current {
            JobStatus::Running | JobStatus::PauseRequested => {
                self.set(&mut status, JobStatus::StopRequested);
                Ok(())
            }
            JobStatus::Paused => {
                self.set(&mut status, JobStatus::Stopped);
                Ok(())
            }
            _ => Err(ControlError::InvalidTransition {
                action: JobAction::Stop,
                status: current,
            }),
        }
    }

    pub fn request_restart(&self) -> Result<(), ControlError> {
        self.transition(
            JobAction::Restart,
            &[JobStatus::Running],
            JobStatus::RestartRequested,
        )
    }

    /// Ждёт, пока рабочий поток не перейдёт в неактивное состояние, не дольше `timeout`.
    pub fn wait_until_settled(&self, timeout: Duration) -> JobStatus {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |status| status.is_active())
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// Пауза между пробами. `true`, если её прервал стоп или рестарт.
    pub(crate) fn wait_for_interrupt(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |status| !status.interrupts_sampling())
            .unwrap_or_else(PoisonError::into_inner);
        guard.interrupts_sampling()
    }

    /// Контрольная точка после провинции: закрепляет пришедший запрос.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        let mut status = self.lock();
        let current = *status;
        match current {
            JobStatus::Running => Checkpoint::Continue,
            JobStatus::PauseRequested => {
                self.set(&mut status, JobStatus::Paused);
                Checkpoint::Paused
            }
            JobStatus::RestartRequested => {
                self.set(&mut status, JobStatus::Running);
                Checkpoint::Restart
            }
            JobStatus::StopRequested
            | JobStatus::Stopped
            | JobStatus::Idle
            | JobStatus::Paused => {
                self.set(&mut status, JobStatus::Stopped);
                Checkpoint::Stopped
            }
        }
    }

    /// Проход дошёл до конца. Рестарт, успевший прийти после последней
    /// контрольной точки, запускает новый проход; всё остальное — `Stopped`.
    pub(crate) fn complete_pass(&self) -> Checkpoint {
        let mut status = self.lock();
        if *status == JobStatus::RestartRequested {
            self.set(&mut status, JobStatus::Running);
            return Checkpoint::Restart;
        }
        self.set(&mut status, JobStatus::Stopped);
        Checkpoint::Stopped
    }

    /// Сброс в `Stopped`, если рабочий поток не запустился или упал
    pub(crate) fn abort_start(&self) {
        let mut status = self.lock();
        self.set(&mut status, JobStatus::Stopped);
    }

    fn transition(
        &self,
        action: JobAction,
        allowed: &[JobStatus],
        to: JobStatus,
    ) -> Result<(), ControlError> {
        let mut status = self.lock();
        if !allowed.contains(&*status) {
            return Err(ControlError::InvalidTransition {
                action,
                status: *status,
            });
        }
        self.set(&mut status, to);
        Ok(())
    }

    fn set(&self, status: &mut MutexGuard<'_, JobStatus>, to: JobStatus) {
        tracing::debug!(from = %**status, to = %to, "land validation status change");
        **status = to;
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, JobStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
