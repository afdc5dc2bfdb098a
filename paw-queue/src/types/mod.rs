pub mod events;
pub mod ids;
pub mod options;
pub mod record;

pub use events::JobEvent;
pub use ids::JobId;
pub use options::{EnqueueOptions, ProcessOptions, QueueStats};
pub use record::{JobRecord, JobStatus, CANCELLED_MESSAGE};
