//! Destination builders.
//!
//! Turn a validated destination configuration into a concrete sink. The
//! only accepted input is a [`ValidatedDestination`], so construction can
//! never run on unvalidated configuration. Construction-time I/O failures
//! surface as [`BuildError`] for the switch controller to convert into a
//! fallback decision; they never propagate to logging callers.

use crate::config::DestinationConfig;
use crate::error::BuildResult;
use crate::sink::{CollectorSink, FileSink, NullSink, Sink, StreamSink};
use crate::validate::ValidatedDestination;
use std::sync::Arc;

/// Build the concrete sink for a validated destination.
///
/// # Errors
///
/// Returns an error only for file destinations whose directory cannot be
/// prepared; console, collector, and disabled destinations are infallible
/// to construct.
pub fn build_destination(validated: ValidatedDestination) -> BuildResult<Arc<dyn Sink>> {
    Ok(match validated.into_config() {
        DestinationConfig::Stdout => Arc::new(StreamSink::stdout()),
        DestinationConfig::Stderr => Arc::new(StreamSink::stderr()),
        DestinationConfig::Disabled => Arc::new(NullSink::new()),
        DestinationConfig::File(config) => Arc::new(FileSink::new(&config)?),
        DestinationConfig::Collector(config) => Arc::new(CollectorSink::new(config)),
    })
}
