mod queries;
mod responses;

pub use queries::{BlockingQuery, KeysQuery};
pub use responses::PollResponse;
