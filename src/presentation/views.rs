use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::application::posts::PostView;
use crate::domain::posts::Post;

#[derive(Debug, Error)]
#[error("failed to render template `{template}`: {error}")]
pub struct TemplateRenderError {
    pub template: &'static str,
    #[source]
    pub error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(template: &'static str, error: AskamaError) -> Self {
        Self { template, error }
    }
}

pub fn render_template<T: Template>(template: &T) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(std::any::type_name::<T>(), err))
}

#[derive(Debug, Clone)]
pub struct TagBadge {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    pub tags: Vec<TagBadge>,
}

impl PostCard {
    pub fn from_post(post: &Post) -> Self {
        Self {
            href: post_href(&post.slug),
            title: post.title.clone(),
            date: post.date.clone(),
            summary: post.summary.clone(),
            tags: tag_badges(&post.tags),
        }
    }
}

/// Relative link from the index to a post page.
pub fn post_href(slug: &str) -> String {
    format!("posts/{slug}.html")
}

fn tag_badges(tags: &[String]) -> Vec<TagBadge> {
    tags.iter()
        .map(|name| TagBadge { name: name.clone() })
        .collect()
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub posts: Vec<PostCard>,
}

impl IndexTemplate {
    pub fn new(title: impl Into<String>, posts: &[Post]) -> Self {
        Self {
            title: title.into(),
            posts: posts.iter().map(PostCard::from_post).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub title: String,
    pub date: String,
    pub summary: String,
    pub cover: String,
    pub tags: Vec<TagBadge>,
    /// Already sanitised by the render service.
    pub body_html: String,
    pub back_href: String,
}

impl PostTemplate {
    pub fn from_view(view: &PostView, back_href: impl Into<String>) -> Self {
        let post = &view.post;
        Self {
            title: post.title.clone(),
            date: post.date.clone(),
            summary: post.summary.clone(),
            cover: post.cover.clone().unwrap_or_default(),
            tags: tag_badges(&post.tags),
            body_html: view.body.html.clone(),
            back_href: back_href.into(),
        }
    }
}
