//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::ScratchClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implement this trait for entity types that can be fetched individually
/// by a unique identifier.
///
/// # Example
///
/// ```ignore
/// use scratchapi::{ScratchClient, Project, Get};
///
/// let client = ScratchClient::anonymous()?;
/// let project = Project::get(&client, 104).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The Scratch API client
    /// * `id` - The entity identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not accessible or the request fails.
    async fn get(client: &ScratchClient, id: Self::Id) -> Result<Self>;
}
