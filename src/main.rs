use std::{
    path::Path,
    process,
    sync::Arc,
};

use blockpress::{
    application::{
        content::ContentSource,
        error::AppError,
        posts::PostService,
        render::{RenderRequest, RenderService, render_service},
    },
    config::{self, OutputFormat, PostArgs, RenderArgs, Settings},
    domain::{blocks::parse_blocks, posts::Post},
    infra::{error::InfraError, notion::NotionClient, telemetry},
    presentation::views::{IndexTemplate, PostTemplate, render_template},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const INDEX_TITLE: &str = "Blog";
const INDEX_FILE: &str = "index.html";
const POSTS_DIR: &str = "posts";
const POST_BACK_HREF: &str = "../index.html";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Render(args) => run_render(args).await,
        config::Command::Post(args) => run_post(settings, args).await,
        config::Command::Export(_) => run_export(settings).await,
    }
}

async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.file).await?;
    let blocks = parse_blocks(&raw)?;
    let slug = args
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let output = render_service().render(&RenderRequest::new(slug, blocks));
    info!(
        target = "blockpress::render",
        file = %args.file.display(),
        rendered = output.content_metrics.blocks_rendered,
        dropped = output.content_metrics.blocks_dropped,
        "rendered block file"
    );

    let contents = match args.format {
        OutputFormat::Html => output.html,
        OutputFormat::Json => serde_json::to_string_pretty(&output)
            .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?,
    };

    emit(args.output.as_deref(), &contents).await
}

async fn run_post(settings: Settings, args: PostArgs) -> Result<(), AppError> {
    let service = build_post_service(&settings)?;
    let view = service
        .post_view(&args.slug)
        .await?
        .ok_or_else(|| AppError::not_found(args.slug.as_str()))?;

    let page = render_template(&PostTemplate::from_view(&view, POST_BACK_HREF))?;
    emit(args.output.as_deref(), &page).await
}

async fn run_export(settings: Settings) -> Result<(), AppError> {
    let service = build_post_service(&settings)?;
    let root = settings.output.directory.clone();
    let posts_dir = root.join(POSTS_DIR);
    fs::create_dir_all(&posts_dir).await?;

    let mut exported: Vec<Post> = Vec::new();
    for post in service.published_posts().await? {
        if !is_safe_slug(&post.slug) {
            warn!(
                target = "blockpress::export",
                post_id = post.id.as_str(),
                slug = post.slug.as_str(),
                "skipping post without a usable slug"
            );
            continue;
        }

        let view = service.render_post(post).await?;
        let page = render_template(&PostTemplate::from_view(&view, POST_BACK_HREF))?;
        let path = posts_dir.join(format!("{}.html", view.post.slug));
        write_file(&path, &page).await?;
        exported.push(view.post);
    }

    let index = render_template(&IndexTemplate::new(INDEX_TITLE, &exported))?;
    write_file(&root.join(INDEX_FILE), &index).await?;

    info!(
        target = "blockpress::export",
        directory = %root.display(),
        posts = exported.len(),
        "export completed"
    );
    Ok(())
}

fn build_post_service(settings: &Settings) -> Result<PostService, AppError> {
    let client = NotionClient::from_settings(&settings.notion)?;
    let source: Arc<dyn ContentSource> = Arc::new(client);
    let renderer: Arc<dyn RenderService> = render_service();
    Ok(PostService::new(source, renderer))
}

/// Slugs become file names, so they must stay inside the posts directory.
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
}

async fn emit(output: Option<&Path>, contents: &str) -> Result<(), AppError> {
    match output {
        Some(path) => write_file(path, contents).await,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(contents.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    info!(
        target = "blockpress::output",
        path = %path.display(),
        bytes = contents.len(),
        "wrote file"
    );
    Ok(())
}
