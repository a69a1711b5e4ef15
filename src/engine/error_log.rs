// src/engine/error_log.rs

use std::sync::{Mutex, PoisonError};

use crate::errors::DagrunError;

/// Runtime errors in arrival order.
///
/// The runtime loop appends while [`StatusHandle`]s read from other tasks;
/// the finished run drains the list into its [`RunReport`].
///
/// [`StatusHandle`]: crate::engine::StatusHandle
/// [`RunReport`]: crate::engine::RunReport
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Mutex<Vec<DagrunError>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, err: DagrunError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Message of the first recorded error, if any.
    pub fn first_message(&self) -> Option<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .map(ToString::to_string)
    }

    /// Remove and return every recorded error, leaving the log empty.
    pub fn take(&self) -> Vec<DagrunError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_arrival_order() {
        let log = ErrorLog::new();
        log.record(DagrunError::UnknownTask("x".into()));
        log.record(DagrunError::TaskPanicked("y".into()));

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.first_message().as_deref(),
            Some("task with id 'x' does not exist")
        );

        let errors = log.take();
        assert_eq!(errors[1].task(), Some("y"));
        assert!(log.is_empty());
        assert_eq!(log.first_message(), None);
    }
}
