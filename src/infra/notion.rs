//! Notion REST adapter implementing [`ContentSource`].

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::application::content::{BlockChildrenPage, ContentError, ContentSource, PostQuery};
use crate::config::NotionSettings;
use crate::domain::posts::{DATE_PROPERTY, PUBLISHED_PROPERTY, PageObject, SLUG_PROPERTY};

pub(crate) const METRIC_NOTION_REQUESTS: &str = "blockpress_notion_requests_total";

const NOTION_VERSION_HEADER: &str = "Notion-Version";

#[derive(Clone, Debug)]
pub struct NotionClient {
    client: Client,
    base: Url,
    token: String,
    database_id: String,
    version: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    results: Vec<PageObject>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl NotionClient {
    /// Build a client from settings. Fails when the token or database id is
    /// missing, since every request needs both.
    pub fn from_settings(settings: &NotionSettings) -> Result<Self, ContentError> {
        let token = settings
            .token
            .clone()
            .ok_or_else(|| ContentError::Configuration("notion.token is required".to_string()))?;
        let database_id = settings.database_id.clone().ok_or_else(|| {
            ContentError::Configuration("notion.database_id is required".to_string())
        })?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(ContentError::from_transport)?;

        Ok(Self {
            client,
            base: settings.api_base_url.clone(),
            token,
            database_id,
            version: settings.version.clone(),
            page_size: settings.page_size.get(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blockpress/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, ContentError> {
        self.base
            .join(path)
            .map_err(|err| ContentError::Configuration(format!("invalid notion url: {err}")))
    }

    fn query_body(&self, query: &PostQuery, cursor: Option<&str>) -> Value {
        let published = json!({
            "property": PUBLISHED_PROPERTY,
            "checkbox": { "equals": true }
        });
        let filter = match query {
            PostQuery::Published => published,
            PostQuery::PublishedBySlug(slug) => json!({
                "and": [
                    { "property": SLUG_PROPERTY, "rich_text": { "equals": slug } },
                    published,
                ]
            }),
        };

        let mut body = json!({
            "filter": filter,
            "sorts": [{ "property": DATE_PROPERTY, "direction": "descending" }],
            "page_size": self.page_size,
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = Value::String(cursor.to_string());
        }
        body
    }

    async fn handle<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, ContentError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ContentError::from_transport)?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| ContentError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PageObject>, ContentError> {
        let url = self.url(&format!("v1/databases/{}/query", self.database_id))?;
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        let mut requests = 0usize;

        loop {
            requests += 1;
            counter!(METRIC_NOTION_REQUESTS).increment(1);
            let resp = self
                .client
                .post(url.clone())
                .bearer_auth(&self.token)
                .header(NOTION_VERSION_HEADER, &self.version)
                .json(&self.query_body(query, cursor.as_deref()))
                .send()
                .await
                .map_err(ContentError::from_transport)?;
            let page: QueryPage = Self::handle(resp).await?;
            pages.extend(page.results);

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    warn!(
                        target = "infra::notion",
                        query = ?query,
                        requests,
                        "database query reported more results without a cursor; stopping"
                    );
                    break;
                }
            }
        }

        debug!(
            target = "infra::notion",
            query = ?query,
            requests,
            results = pages.len(),
            "queried posts database"
        );
        Ok(pages)
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockChildrenPage, ContentError> {
        let mut url = self.url(&format!("v1/blocks/{block_id}/children"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("start_cursor", cursor);
            }
        }

        counter!(METRIC_NOTION_REQUESTS).increment(1);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(NOTION_VERSION_HEADER, &self.version)
            .send()
            .await
            .map_err(ContentError::from_transport)?;
        Self::handle(resp).await
    }
}
