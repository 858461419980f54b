//! The offload-and-complete core.
//!
//! A submission is validated synchronously, acquires the map's engagement
//! slot, and is queued onto the blocking pool. The worker phase renders and
//! sends its result through a one-shot channel; the completion phase, back
//! on the runtime, invokes the caller's handle exactly once and releases
//! everything the job held. Ordering within a job is carried by the channel
//! itself; across jobs there is none.

mod boundary;
mod dispatcher;
mod engagement;
mod job;

pub use boundary::{SubmitArg, SubmitError};
pub use dispatcher::Dispatcher;
pub use engagement::{EngagementError, EngagementGuard, EngagementTable};
pub use job::{CompletionHandle, JobId, RenderJob, TileBuffer};
