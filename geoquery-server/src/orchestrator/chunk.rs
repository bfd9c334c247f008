//! Splitting query targets into provider-sized chunks.

/// Maximum destinations the distance matrix accepts in one request.
pub const PROVIDER_MAX_DESTINATIONS: usize = 25;

/// A contiguous slice of the input, tagged with where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk<'a, T> {
    /// Index of `items[0]` in the full input.
    pub offset: usize,
    pub items: &'a [T],
}

impl<T> Chunk<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Input indices covered by this chunk.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.items.len()
    }
}

/// Split `targets` into chunks of at most `chunk_size` items, in order.
///
/// `chunk_size` is clamped to `1..=PROVIDER_MAX_DESTINATIONS`.
pub fn plan_chunks<T>(targets: &[T], chunk_size: usize) -> Vec<Chunk<'_, T>> {
    let size = chunk_size.clamp(1, PROVIDER_MAX_DESTINATIONS);
    targets
        .chunks(size)
        .enumerate()
        .map(|(i, items)| Chunk {
            offset: i * size,
            items,
        })
        .collect()
}
