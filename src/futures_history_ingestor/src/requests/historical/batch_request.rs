//! Concurrent fan-out of chunk requests with a positional fan-in barrier.
//!
//! All requests run as futures on the calling task over one shared
//! [`ChunkSource`]; nothing is spawned, so no request outlives the call.

use futures::future::try_join_all;

use crate::{
    models::{
        chunk::{ChunkRequest, RawChunk},
        date_range::DateRange,
        timeframe::TimeFrame,
    },
    providers::{ChunkSource, ProviderError},
};

/// One [`ChunkRequest`] per range, in the same order.
pub fn build_requests(ranges: &[DateRange], timeframe: TimeFrame) -> Vec<ChunkRequest> {
    ranges
        .iter()
        .map(|range| ChunkRequest::new(*range, timeframe))
        .collect()
}

/// Fetches every chunk concurrently; `result[i]` answers `requests[i]`.
///
/// All-or-nothing: the first failure is returned and the requests still in
/// flight are dropped, which cancels them.
pub async fn fetch_chunks<S>(
    source: &S,
    requests: &[ChunkRequest],
) -> Result<Vec<RawChunk>, ProviderError>
where
    S: ChunkSource + ?Sized,
{
    try_join_all(requests.iter().map(|request| source.fetch_chunk(request))).await
}
