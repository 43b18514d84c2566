//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::ScratchClient;
use crate::error::Result;
use crate::pagination::{fetch_all, Listing, Page, PaginationParams, MAX_BATCH};

/// List entities with offset pagination.
///
/// Implementors provide a single-page fetch; [`List::list_all`] walks the
/// listing in batches of [`MAX_BATCH`] through [`fetch_all`].
///
/// # Example
///
/// ```ignore
/// use scratchapi::{ScratchClient, Project, ProjectListQuery, List, Listing, PaginationParams};
///
/// let client = ScratchClient::anonymous()?;
/// let query = ProjectListQuery::Explore(Default::default());
///
/// // Fetch a single page
/// let page = Project::list_page(&client, &query, PaginationParams::new(0, 20)).await?;
///
/// // Fetch the first 100 projects
/// let projects = Project::list_all(&client, &query, Listing::first(100)).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters selecting the listing.
    type Query: Send + Sync;

    /// Fetch a single page of the listing.
    ///
    /// An empty page means the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &ScratchClient,
        query: &Self::Query,
        params: PaginationParams,
    ) -> Result<Page<Self>>;

    /// Fetch up to `listing.limit` entities (all of them if unset).
    ///
    /// # Errors
    ///
    /// Returns the first error from any page request.
    async fn list_all(
        client: &ScratchClient,
        query: &Self::Query,
        listing: Listing,
    ) -> Result<Vec<Self>> {
        fetch_all(
            |offset, limit| async move {
                let params = PaginationParams::new(offset, limit);
                let page = Self::list_page(client, query, params).await?;
                Ok(Some(page.items))
            },
            listing.limit,
            listing.offset,
            MAX_BATCH,
        )
        .await
    }
}
