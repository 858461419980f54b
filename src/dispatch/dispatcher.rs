use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    process,
    sync::Arc,
    time::Instant,
};

use bytes::Bytes;
use metrics::{counter, histogram};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::{
    boundary::{SubmitArg, SubmitError, parse_submit_args},
    engagement::{EngagementGuard, EngagementTable},
    job::{CompletionHandle, JobId, RenderJob, TileBuffer},
};
use crate::{
    domain::Map,
    render::{RenderError, TileRenderer},
};

/// Bridges synchronous render work onto the blocking pool and marshals each
/// result back to the runtime as a single completion.
///
/// Cheap to clone; clones share the renderer and the engagement table. Must
/// be used from within a tokio runtime: the runtime is the submitting
/// context, and completions run on it.
#[derive(Clone)]
pub struct Dispatcher {
    renderer: Arc<dyn TileRenderer>,
    engagements: EngagementTable,
}

impl Dispatcher {
    pub fn new(renderer: Arc<dyn TileRenderer>) -> Self {
        Self {
            renderer,
            engagements: EngagementTable::new(),
        }
    }

    pub fn engagements(&self) -> &EngagementTable {
        &self.engagements
    }

    /// Host-boundary entry point: validates untyped arguments, then
    /// dispatches. All failures here are synchronous; no work is queued and
    /// the callback is never invoked.
    pub fn submit(&self, args: Vec<SubmitArg>) -> Result<JobId, SubmitError> {
        let (map, completion) = parse_submit_args(args)?;
        self.submit_render(map, completion)
    }

    /// Typed entry point. Performs the synchronous engagement check and
    /// returns immediately after the job is queued; it never blocks.
    ///
    /// A rejected submission reports its error to the caller directly —
    /// deliberately not through the completion handle, which is returned
    /// unused. Once accepted, the job always runs to completion: there is
    /// no cancellation and no timeout.
    pub fn submit_render(
        &self,
        map: Arc<Map>,
        completion: CompletionHandle,
    ) -> Result<JobId, SubmitError> {
        let guard = match self.engagements.acquire(map.id) {
            Ok(guard) => guard,
            Err(err) => {
                counter!("tilebridge_jobs_rejected_total").increment(1);
                warn!(
                    target = "dispatch::submit",
                    map_id = %map.id,
                    "submission rejected: map already engaged"
                );
                return Err(err.into());
            }
        };

        let job = RenderJob::new(map, guard, completion);
        let job_id = job.id;
        counter!("tilebridge_jobs_submitted_total").increment(1);
        info!(
            target = "dispatch::submit",
            job_id = %job_id,
            map_id = %job.map.id,
            "render job queued"
        );

        self.spawn(job);
        Ok(job_id)
    }

    fn spawn(&self, job: RenderJob) {
        let RenderJob {
            id,
            map,
            guard,
            completion,
        } = job;
        let renderer = Arc::clone(&self.renderer);
        let (result_tx, result_rx) = oneshot::channel::<Result<TileBuffer, RenderError>>();

        // Worker phase, on the blocking pool. Mutates only the job's own
        // result state and never touches the completion handle; the channel
        // send is its last act and the happens-before edge to completion.
        tokio::task::spawn_blocking(move || {
            let started_at = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&map)));
            histogram!("tilebridge_render_ms").record(started_at.elapsed().as_millis() as f64);

            let result = match outcome {
                Ok(Ok(tile)) => {
                    let byte_count = tile.byte_count.min(tile.scratch.len());
                    let mut output = tile.scratch;
                    output.truncate(byte_count);
                    Ok(Bytes::from(output))
                }
                Ok(Err(err)) => Err(err),
                Err(payload) => Err(RenderError::backend(panic_message(payload.as_ref()))),
            };

            // Receiver only disappears at runtime shutdown; nothing left to notify.
            let _ = result_tx.send(result);
        });

        // Completion phase, back on the runtime: the sole consumer of the
        // handle and the guard.
        tokio::spawn(async move {
            let result = match result_rx.await {
                Ok(result) => result,
                Err(_) => Err(RenderError::WorkerLost),
            };
            complete(id, result, completion, guard);
        });
    }
}

/// Invoke the completion handle with the job's outcome, exactly once, then
/// release everything the job held. A panic inside the handle itself is
/// fatal: once the callback contract is broken the host's state is unknown,
/// so it is logged and escalated rather than swallowed or re-delivered.
fn complete(
    job_id: JobId,
    result: Result<TileBuffer, RenderError>,
    completion: CompletionHandle,
    guard: EngagementGuard,
) {
    let map_id = guard.map_id();
    match &result {
        Ok(bytes) => {
            counter!("tilebridge_jobs_completed_total").increment(1);
            info!(
                target = "dispatch::complete",
                job_id = %job_id,
                map_id = %map_id,
                bytes = bytes.len(),
                "render job completed"
            );
        }
        Err(err) => {
            counter!("tilebridge_jobs_failed_total").increment(1);
            warn!(
                target = "dispatch::complete",
                job_id = %job_id,
                map_id = %map_id,
                error = %err,
                "render job failed"
            );
        }
    }

    let invoked = panic::catch_unwind(AssertUnwindSafe(move || completion(result)));
    if let Err(payload) = invoked {
        error!(
            target = "dispatch::complete",
            job_id = %job_id,
            map_id = %map_id,
            panic = %panic_message(payload.as_ref()),
            "completion callback panicked; aborting"
        );
        process::abort();
    }

    // Engagement is released only after the callback has returned, on both
    // branches.
    drop(guard);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("opaque panic payload")
    }
}
