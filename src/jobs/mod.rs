//! Jobs: submission, state resolution, polling and listing.

pub mod handle;
pub mod job;
pub mod listing;
pub mod resolver;
pub mod state;
pub mod submit;

pub use handle::JobHandle;
pub use job::Job;
pub use resolver::StatusSource;
pub use state::JobState;
pub use submit::{JobCommand, SubmitRequest};
