use std::sync::Arc;

use thiserror::Error;

use super::{engagement::EngagementError, job::CompletionHandle};
use crate::domain::{Map, MapId};

/// Dynamically typed submission argument, mirroring a host boundary where
/// arguments arrive untyped and must be checked against the capability
/// contract ("is renderable", "is invokable") before any work is queued.
pub enum SubmitArg {
    /// A renderable map instance.
    Map(Arc<Map>),
    /// An invokable completion callback.
    Callback(CompletionHandle),
    /// Any other host value, tagged with its kind for diagnostics.
    Opaque(&'static str),
}

impl SubmitArg {
    fn kind(&self) -> &'static str {
        match self {
            SubmitArg::Map(_) => "a map",
            SubmitArg::Callback(_) => "a callback",
            SubmitArg::Opaque(kind) => kind,
        }
    }
}

/// Synchronous submission failures. These are reported to the immediate
/// caller; the completion handle is never invoked on any of these paths.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid submission: {message}")]
    InvalidArgument { message: String },
    #[error(
        "map {map_id} is already engaged in a render job; \
         use a map pool to avoid sharing map instances between concurrent renders"
    )]
    MapEngaged { map_id: MapId },
}

impl SubmitError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<EngagementError> for SubmitError {
    fn from(err: EngagementError) -> Self {
        match err {
            EngagementError::AlreadyEngaged { map_id } => Self::MapEngaged { map_id },
        }
    }
}

/// Validate untyped submission arguments: exactly two, a map then a
/// callback. Each violation names the precondition it breaks.
pub(crate) fn parse_submit_args(
    args: Vec<SubmitArg>,
) -> Result<(Arc<Map>, CompletionHandle), SubmitError> {
    if args.len() != 2 {
        return Err(SubmitError::invalid(format!(
            "requires exactly two arguments, a renderable map and a completion callback; got {}",
            args.len()
        )));
    }

    let mut args = args.into_iter();
    let map = match args.next() {
        Some(SubmitArg::Map(map)) => map,
        Some(other) => {
            return Err(SubmitError::invalid(format!(
                "first argument must be a map, got {}",
                other.kind()
            )));
        }
        None => unreachable!("arity checked above"),
    };
    let completion = match args.next() {
        Some(SubmitArg::Callback(completion)) => completion,
        Some(other) => {
            return Err(SubmitError::invalid(format!(
                "second argument must be a callback, got {}",
                other.kind()
            )));
        }
        None => unreachable!("arity checked above"),
    };

    Ok((map, completion))
}
