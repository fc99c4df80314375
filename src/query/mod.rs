mod error;
mod manager;
mod state;

pub use error::FetchError;
pub use manager::{QueryManager, QueryOptions, StateReader, SubscriberId, Subscription};
pub use state::{QueryState, Transition};
