mod directory;
mod engine;
mod handle;
mod machine;
mod session;

pub use directory::{default_category, CategoryDirectory};
pub use engine::{Command, SyncEngine};
pub use handle::Dashboard;
pub use machine::{Effect, Event, SessionRequest, SyncMachine};
pub use session::{PollSession, SessionOutcome};
