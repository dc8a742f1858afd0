//! Pass execution

pub mod cancel;
pub mod executor;
pub mod observer;
pub mod pass;

pub use cancel::CancelToken;
pub use executor::Executor;
pub use observer::{Observer, OutcomeEvent};
pub use pass::PassResult;
