//! Transport-level errors raised by the scheduler.
//!
//! Per-job failures (timeouts, refused connections, HTTP error statuses) never
//! show up here; they travel inside [`crate::channel::Completion`] to the owning
//! channel.

use thiserror::Error;

/// Errors produced by [`crate::scheduler::Scheduler`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The multi handle could not be created or configured. The scheduler was
    /// never built, so there is nothing to tear down.
    #[error("failed to initialize transport: {source}")]
    Initialization {
        #[source]
        source: curl::MultiError,
    },
    /// libcurl reported a hard error while driving transfers, attaching or
    /// detaching a request handle. The transport is not assumed recoverable.
    #[error("transport error {code}: {name}")]
    TransportExec { code: i32, name: String },
}

impl SchedulerError {
    pub(crate) fn initialization(source: curl::MultiError) -> Self {
        SchedulerError::Initialization { source }
    }

    /// Native error code for `TransportExec`, `None` for initialization failures.
    pub fn code(&self) -> Option<i32> {
        match self {
            SchedulerError::TransportExec { code, .. } => Some(*code),
            SchedulerError::Initialization { .. } => None,
        }
    }
}

impl From<curl::MultiError> for SchedulerError {
    fn from(e: curl::MultiError) -> Self {
        SchedulerError::TransportExec {
            code: e.code() as i32,
            name: e.description().to_string(),
        }
    }
}

impl From<curl::Error> for SchedulerError {
    fn from(e: curl::Error) -> Self {
        SchedulerError::TransportExec {
            code: e.code() as i32,
            name: e.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_error_maps_to_transport_exec_with_name() {
        let err: SchedulerError = curl::MultiError::new(curl_sys::CURLM_BAD_HANDLE).into();
        match &err {
            SchedulerError::TransportExec { code, name } => {
                assert_eq!(*code, curl_sys::CURLM_BAD_HANDLE as i32);
                assert!(!name.is_empty());
            }
            other => panic!("expected TransportExec, got {:?}", other),
        }
        assert_eq!(err.code(), Some(curl_sys::CURLM_BAD_HANDLE as i32));
        assert!(err.to_string().starts_with("transport error"));
    }

    #[test]
    fn initialization_error_has_no_code() {
        let err = SchedulerError::initialization(curl::MultiError::new(
            curl_sys::CURLM_OUT_OF_MEMORY,
        ));
        assert!(err.code().is_none());
        assert!(err.to_string().contains("failed to initialize transport"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
