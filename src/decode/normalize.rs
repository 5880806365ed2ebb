//! Raw item normalization
//!
//! Mapping a raw JSON item to a domain entity is delegated to a [`Normalizer`].
//! [`map_in_batches`] drives it over a page in fixed-size slices and yields to
//! the scheduler between slices so a large page does not monopolise the
//! executor thread.

use serde_json::Value;

/// Default number of items normalized between yields
pub const DEFAULT_BATCH_SIZE: usize = 40;

/// A domain entity with a stable identity
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identity used for deduplication
    fn id(&self) -> &str;
}

/// Converts one raw item into an entity.
///
/// Implementations must not panic on malformed input; missing fields are
/// coerced to defaults. `index` is the item's absolute position in the feed
/// and can be used to synthesise an id.
pub trait Normalizer: Send + Sync + 'static {
    /// Entity produced by this normalizer
    type Output: Entity;

    /// Normalize one raw item
    fn normalize(&self, raw: &Value, index: usize) -> Self::Output;
}

impl<F, E> Normalizer for F
where
    F: Fn(&Value, usize) -> E + Send + Sync + 'static,
    E: Entity,
{
    type Output = E;

    fn normalize(&self, raw: &Value, index: usize) -> E {
        self(raw, index)
    }
}

/// Normalize `raw_items` in slices of `batch_size`, preserving order.
///
/// Item `i` is passed absolute index `start_index + i`. Control is yielded
/// back to the runtime after every slice except the last. A `batch_size` of
/// zero is treated as one.
pub async fn map_in_batches<N>(
    normalizer: &N,
    raw_items: &[Value],
    start_index: usize,
    batch_size: usize,
) -> Vec<N::Output>
where
    N: Normalizer + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut entities = Vec::with_capacity(raw_items.len());
    let mut chunks = raw_items.chunks(batch_size).peekable();
    let mut offset = start_index;

    while let Some(chunk) = chunks.next() {
        entities.extend(
            chunk
                .iter()
                .enumerate()
                .map(|(i, raw)| normalizer.normalize(raw, offset.saturating_add(i))),
        );
        offset = offset.saturating_add(chunk.len());

        if chunks.peek().is_some() {
            tokio::task::yield_now().await;
        }
    }

    entities
}
