use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use super::engagement::EngagementGuard;
use crate::{domain::Map, render::RenderError};

/// Identifier assigned to an accepted submission.
pub type JobId = Uuid;

/// Immutable tile bytes handed to the completion callback: exactly the
/// renderer-reported length, never the scratch capacity. Ownership transfers
/// to the caller on invocation.
pub type TileBuffer = Bytes;

/// Caller-supplied completion callback.
///
/// The two-argument `(error_or_null, buffer_or_null)` contract collapses to
/// `Result`: exactly one of the arms, exactly once. Being `FnOnce`, the
/// handle cannot be invoked twice by construction; the dispatcher consumes
/// it on its single completion path.
pub type CompletionHandle = Box<dyn FnOnce(Result<TileBuffer, RenderError>) + Send + 'static>;

/// One in-flight unit of offloaded work, from accepted submission to
/// completion.
///
/// The job owns its completion handle until dispatch and its engagement
/// guard until the callback has returned. Its lifecycle is linear — queued,
/// executed, completed, dropped — realized by moves: the spawn consumes the
/// job, the completion task consumes the handle and the guard.
pub struct RenderJob {
    pub id: JobId,
    pub map: Arc<Map>,
    pub guard: EngagementGuard,
    pub completion: CompletionHandle,
}

impl RenderJob {
    pub(crate) fn new(map: Arc<Map>, guard: EngagementGuard, completion: CompletionHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            map,
            guard,
            completion,
        }
    }
}
