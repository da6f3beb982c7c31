use std::sync::Arc;

use tracing::info;

use crate::application::content::{ContentError, ContentSource, PostQuery, collect_page_blocks};
use crate::application::render::{RenderOutput, RenderRequest, RenderService};
use crate::domain::posts::Post;

/// A post with its rendered body.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub body: RenderOutput,
}

#[derive(Clone)]
pub struct PostService {
    source: Arc<dyn ContentSource>,
    renderer: Arc<dyn RenderService>,
}

impl PostService {
    pub fn new(source: Arc<dyn ContentSource>, renderer: Arc<dyn RenderService>) -> Self {
        Self { source, renderer }
    }

    /// Published posts, newest first. Rows whose `Published` box is not set
    /// are skipped even if the source returns them.
    pub async fn published_posts(&self) -> Result<Vec<Post>, ContentError> {
        let pages = self.source.query_posts(&PostQuery::Published).await?;
        Ok(pages
            .iter()
            .map(Post::from_page)
            .filter(|post| post.published)
            .collect())
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        let pages = self
            .source
            .query_posts(&PostQuery::PublishedBySlug(slug.to_string()))
            .await?;
        Ok(pages.first().map(Post::from_page))
    }

    /// Fetch and render the post with the given slug.
    pub async fn post_view(&self, slug: &str) -> Result<Option<PostView>, ContentError> {
        let Some(post) = self.post_by_slug(slug).await? else {
            return Ok(None);
        };
        self.render_post(post).await.map(Some)
    }

    /// Fetch and render the body of an already-resolved post.
    pub async fn render_post(&self, post: Post) -> Result<PostView, ContentError> {
        let blocks = collect_page_blocks(self.source.as_ref(), &post.id).await?;
        let body = self
            .renderer
            .render(&RenderRequest::new(post.slug.as_str(), blocks));

        info!(
            target = "application::posts",
            slug = post.slug.as_str(),
            blocks = body.blocks.len(),
            dropped = body.content_metrics.blocks_dropped,
            "rendered post"
        );

        Ok(PostView { post, body })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::application::content::BlockChildrenPage;
    use crate::application::render::render_service;
    use crate::domain::blocks::{BlockKind, ContentBlock};
    use crate::domain::posts::PageObject;

    struct StaticSource {
        pages: Vec<PageObject>,
    }

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PageObject>, ContentError> {
            Ok(match query {
                PostQuery::Published => self.pages.clone(),
                PostQuery::PublishedBySlug(slug) => self
                    .pages
                    .iter()
                    .filter(|page| Post::from_page(page).slug == *slug)
                    .cloned()
                    .collect(),
            })
        }

        async fn list_block_children(
            &self,
            block_id: &str,
            _cursor: Option<&str>,
        ) -> Result<BlockChildrenPage, ContentError> {
            Ok(BlockChildrenPage {
                results: vec![
                    ContentBlock::new(format!("{block_id}-rule"), BlockKind::Divider),
                    ContentBlock::new(
                        format!("{block_id}-embed"),
                        BlockKind::Unsupported {
                            kind: "embed".to_string(),
                        },
                    ),
                ],
                has_more: false,
                next_cursor: None,
            })
        }
    }

    fn page(id: &str, slug: &str, published: bool) -> PageObject {
        serde_json::from_value(json!({
            "id": id,
            "properties": {
                "Title": { "type": "title", "title": [{ "plain_text": id }] },
                "Slug": { "type": "rich_text", "rich_text": [{ "plain_text": slug }] },
                "Published": { "type": "checkbox", "checkbox": published }
            }
        }))
        .expect("page decodes")
    }

    fn service() -> PostService {
        let source = StaticSource {
            pages: vec![
                page("one", "first", true),
                page("two", "draft", false),
                page("three", "third", true),
            ],
        };
        PostService::new(Arc::new(source), render_service())
    }

    #[tokio::test]
    async fn unpublished_rows_are_skipped() {
        let posts = service().published_posts().await.expect("posts");

        let slugs: Vec<_> = posts.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(slugs, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn post_view_renders_blocks_of_the_matching_page() {
        let view = service()
            .post_view("third")
            .await
            .expect("fetch")
            .expect("post exists");

        assert_eq!(view.post.id, "three");
        let keys: Vec<_> = view.body.blocks.iter().map(|block| block.key.as_str()).collect();
        assert_eq!(keys, vec!["three-rule"]);
        assert_eq!(view.body.content_metrics.blocks_dropped, 1);
    }

    #[tokio::test]
    async fn unknown_slug_yields_none() {
        let view = service().post_view("missing").await.expect("fetch");
        assert!(view.is_none());
    }
}
