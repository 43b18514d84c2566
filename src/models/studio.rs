//! Studios a project belongs to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::ScratchClient;
use crate::error::Result;
use crate::pagination::{Page, PaginationParams};
use crate::traits::List;

/// Summary of a studio as listed for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSummary {
    /// The studio id.
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// User id of the studio host.
    #[serde(default)]
    pub host: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Selects the studios containing a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStudiosQuery {
    pub project_id: u64,
    /// Username of the project author; part of the endpoint path.
    pub author: String,
}

#[async_trait]
impl List for StudioSummary {
    type Query = ProjectStudiosQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &ScratchClient,
        query: &Self::Query,
        params: PaginationParams,
    ) -> Result<Page<Self>> {
        let url = client.api_url(&format!(
            "users/{}/projects/{}/studios",
            urlencoding::encode(&query.author),
            query.project_id
        ))?;
        let response = client.get_with_query(url, &params).await?;
        let data: Option<Vec<StudioSummary>> = ScratchClient::json(response).await?;

        Ok(Page::new(data.unwrap_or_default(), params.offset, params.limit))
    }
}
