mod system;
mod watcher;

pub use system::invoke_pipe;
pub use watcher::{watch_for_trigger, StatusTracker};
