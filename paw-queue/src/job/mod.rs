use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::JobError;

/// A typed unit of deferred work.
///
/// The job value itself is the payload: it is serialized at enqueue time
/// and deserialized again by [`JobQueue::process_jobs`](crate::JobQueue::process_jobs).
///
/// ```rust
/// use paw_queue::{async_trait, Job, JobError};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct BookingConfirmationEmail {
///     booking_id: u64,
///     owner_email: String,
/// }
///
/// #[derive(Clone)]
/// struct Mailer;
///
/// #[async_trait]
/// impl Job for BookingConfirmationEmail {
///     type Context = Mailer;
///     const JOB_TYPE: &'static str = "email.booking_confirmation";
///
///     async fn execute(&self, _mailer: Mailer) -> Result<(), JobError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Shared handles the handler needs (mailer, db pool, ...)
    type Context: Send + Sync + Clone + 'static;

    /// Queue the job is filed under
    const JOB_TYPE: &'static str;

    const MAX_ATTEMPTS: u32 = 3;

    async fn execute(&self, ctx: Self::Context) -> Result<(), JobError>;
}
