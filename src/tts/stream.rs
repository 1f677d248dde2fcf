use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

use super::SynthesisError;

/// Upper bound on the size of each chunk written to the client.
pub const AUDIO_CHUNK_SIZE: usize = 4096;

/// Re-cuts a byte stream so no item is longer than `max_chunk` bytes.
/// Empty chunks are dropped; errors pass through untouched.
pub fn bounded_chunks<S, E>(upstream: S, max_chunk: usize) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let max_chunk = max_chunk.max(1);
    upstream.flat_map(move |item| {
        let pieces: Vec<Result<Bytes, E>> = match item {
            Ok(bytes) => split(bytes, max_chunk).into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(pieces)
    })
}

/// Ends the stream with [`SynthesisError::Timeout`] when no item arrives
/// within `idle`.
pub fn idle_bounded<S>(upstream: S, idle: Duration) -> impl Stream<Item = Result<Bytes, SynthesisError>>
where
    S: Stream<Item = Result<Bytes, SynthesisError>> + Unpin,
{
    stream::unfold(Some(upstream), move |state| async move {
        let mut upstream = state?;
        match tokio::time::timeout(idle, upstream.next()).await {
            Ok(Some(item)) => Some((item, Some(upstream))),
            Ok(None) => None,
            Err(_) => Some((Err(SynthesisError::Timeout(idle)), None)),
        }
    })
}

fn split(mut bytes: Bytes, max_chunk: usize) -> Vec<Bytes> {
    let mut pieces = Vec::with_capacity(bytes.len().div_ceil(max_chunk));
    while bytes.len() > max_chunk {
        pieces.push(bytes.split_to(max_chunk));
    }
    if !bytes.is_empty() {
        pieces.push(bytes);
    }
    pieces
}
