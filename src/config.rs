mod loader;
mod paths;
mod types;

pub use loader::API_URL_ENV;
pub use paths::CONFIG_FILE_NAME;
pub use types::{Config, PollTiming};
