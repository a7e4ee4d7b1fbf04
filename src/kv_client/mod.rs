mod api;
mod backend;
mod client;
mod helpers;

pub use api::PollResponse;
pub use backend::KvBackend;
pub use client::KvClient;
pub use helpers::INDEX_HEADER;
