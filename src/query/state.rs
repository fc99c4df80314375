use std::fmt;

use super::error::FetchError;

/// Snapshot of one asynchronous resource.
///
/// `data` survives failures: a failed fetch only sets `error`, so whatever was
/// last fetched successfully stays readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<T> {
    /// Last successfully fetched payload. `None` until the first success.
    pub data: Option<T>,
    /// True while a fetch started by `query` is in flight.
    pub is_loading: bool,
    /// Set when the most recent fetch failed; cleared when the next one starts.
    pub error: Option<FetchError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

/// A discrete change applied to a [`QueryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<T> {
    /// A fetch was issued.
    Started,
    /// The fetch resolved with a value.
    Succeeded(T),
    /// The fetch failed.
    Failed(FetchError),
}

impl<T> fmt::Display for Transition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Started => write!(f, "STARTED"),
            Transition::Succeeded(_) => write!(f, "SUCCEEDED"),
            Transition::Failed(_) => write!(f, "FAILED"),
        }
    }
}

impl<T> QueryState<T> {
    /// Produce the next state from this one and a transition.
    ///
    /// - `Started` sets `is_loading` and clears `error`; data is untouched.
    /// - `Succeeded` replaces `data` and clears `is_loading` and `error`. An
    ///   overlapping query may have failed since this one started.
    /// - `Failed` records the error and clears `is_loading`; data is kept.
    pub fn apply(self, transition: Transition<T>) -> Self {
        match transition {
            Transition::Started => Self {
                is_loading: true,
                error: None,
                ..self
            },
            Transition::Succeeded(data) => Self {
                data: Some(data),
                is_loading: false,
                error: None,
            },
            Transition::Failed(error) => Self {
                error: Some(error),
                is_loading: false,
                ..self
            },
        }
    }

    /// Neither loading nor failed, with data present.
    pub fn is_success(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.data.is_some()
    }
}
