pub mod store;
pub mod sweeper;

pub use store::MemoryStore;
pub use sweeper::{MemorySweeper, SweeperHandle};
