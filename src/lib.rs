//! Hacker News job board built on a small reactive query layer.
//!
//! [`query::QueryManager`] wraps an async fetcher, tracks
//! `{data, is_loading, error}` and notifies subscribers on every transition.
//! [`board::JobBoard`] drives two managers (job ids, job details) against the
//! Hacker News API and renders through a [`board::BoardView`].

pub mod board;
pub mod config;
pub mod error;
pub mod format;
pub mod hn;
pub mod query;
pub mod ui;
