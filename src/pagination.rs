//! Offset pagination for Scratch API listings.
//!
//! Scratch listing endpoints accept `limit` and `offset` query parameters and
//! refuse to return more than [`MAX_BATCH`] items per request. [`fetch_all`]
//! walks such an endpoint in bounded batches and assembles the full result.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Largest `limit` accepted by every Scratch listing endpoint.
pub const MAX_BATCH: u32 = 40;

/// One batch of a listing, with the request that produced it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Offset of the first item.
    pub offset: u32,
    /// Number of items requested.
    pub limit: u32,
}

impl<T> Page<T> {
    /// Create a new page from items and the request that produced them.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, limit: u32) -> Self {
        Self {
            items,
            offset,
            limit,
        }
    }
}

/// Query parameters for a single paginated request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Number of items to return.
    pub limit: u32,
    /// Index of the first item.
    pub offset: u32,
}

impl PaginationParams {
    /// Create pagination params for a batch.
    #[must_use]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { limit, offset }
    }
}

/// How much of a listing to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Listing {
    /// Maximum number of items; `None` (or zero) fetches until exhaustion.
    pub limit: Option<u32>,
    /// Offset of the first item.
    pub offset: u32,
}

impl Listing {
    /// Fetch everything from the start.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Fetch at most `limit` items from the start.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Start at `offset`.
    #[must_use]
    pub fn starting_at(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Fetch a listing in batches of at most `max_batch` items.
///
/// `source` is called with `(offset, batch_size)` and returns the items of
/// that batch. `Ok(None)` and an empty batch both mean the listing is
/// exhausted. A `limit` of `None` or `Some(0)` fetches until exhaustion;
/// otherwise at most `limit` items are returned and no request asks for more
/// than the remaining amount.
///
/// The offset advances by the number of items actually returned, so a short
/// page is followed by one more request that comes back empty.
///
/// # Errors
///
/// Returns the first error produced by `source`. Pagination itself is never
/// retried.
pub async fn fetch_all<T, F, Fut>(
    mut source: F,
    limit: Option<u32>,
    offset: u32,
    max_batch: u32,
) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>>>,
{
    let limit = limit.filter(|&l| l > 0);
    let max_batch = max_batch.max(1);

    let mut items = Vec::new();
    let mut offset = offset;

    loop {
        let batch_size = match limit {
            Some(l) => {
                let remaining = l - items.len() as u32;
                if remaining == 0 {
                    break;
                }
                remaining.min(max_batch)
            }
            None => max_batch,
        };

        tracing::debug!(offset, batch_size, "fetching batch");

        let batch = match source(offset, batch_size).await? {
            Some(batch) if !batch.is_empty() => batch,
            _ => break,
        };

        offset += batch.len() as u32;

        match limit {
            Some(l) => {
                let remaining = (l as usize) - items.len();
                items.extend(batch.into_iter().take(remaining));
            }
            None => items.extend(batch),
        }
    }

    Ok(items)
}
