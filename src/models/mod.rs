pub mod filter;
mod item;
mod state;

pub use filter::Filter;
pub use item::{Category, Item, StatusKind};
pub use state::{ConsistencyIndex, DashboardState, EnginePhase};
