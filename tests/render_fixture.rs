use blockpress::application::render::{RenderRequest, RenderService, render_service};
use blockpress::domain::blocks::parse_blocks;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

const EXPECTED_BODY: &str = concat!(
    "<div class=\"prose prose-gray max-w-none\">",
    "<p class=\"mb-4\"><span>Hello </span><span><em><strong>world</strong></em></span><span> and </span>",
    "<span><a href=\"https://example.com/docs\" class=\"text-blue-600 hover:underline\" target=\"_blank\" rel=\"noopener noreferrer\"><strong>docs</strong></a></span></p>",
    "<h2 class=\"text-2xl font-bold mt-6 mb-3\"><span>Section</span></h2>",
    "<li class=\"ml-4 list-disc\"><span>one</span></li>",
    "<li class=\"ml-4 list-decimal\"><span><code class=\"bg-gray-100 px-1 rounded text-sm\">two</code></span></li>",
    "<pre class=\"bg-gray-100 p-4 rounded overflow-x-auto my-4\"><code class=\"text-sm\">let x = 1; // ok</code></pre>",
    "<hr class=\"my-8 border-gray-200\">",
    "<figure class=\"my-6\"><img src=\"https://cdn.example.com/cat.png\" alt=\"A cat\" class=\"rounded-lg w-full\">",
    "<figcaption class=\"text-center text-sm text-gray-500 mt-2\">A cat</figcaption></figure>",
    "<figure class=\"my-6\"><img src=\"https://files.example.com/a.png?sig=1&amp;x=2\" alt=\"\" class=\"rounded-lg w-full\"></figure>",
    "<blockquote class=\"border-l-4 border-gray-300 pl-4 italic my-4\"><span>quoted &lt;text&gt;</span></blockquote>",
    "</div>"
);

fn fixture_request() -> RenderRequest {
    let blocks = parse_blocks(include_str!("fixtures/blocks.json")).expect("fixture decodes");
    RenderRequest::new("fixture", blocks)
}

#[test]
fn fixture_raw_output_matches() {
    let html = render_service().render_unsanitized(&fixture_request());
    assert_eq!(html, EXPECTED_BODY);
}

#[test]
fn fixture_sanitized_output_matches() {
    let output = render_service().render(&fixture_request());
    assert_eq!(output.html, EXPECTED_BODY);
}

#[test]
fn fixture_keys_follow_source_order_without_dropped_blocks() {
    let output = render_service().render(&fixture_request());

    let keys: Vec<&str> = output.blocks.iter().map(|block| block.key.as_str()).collect();
    assert_eq!(
        keys,
        ["b1", "b2", "b4", "b5", "b6", "b7", "b8", "b9", "b10"]
    );

    let metrics = &output.content_metrics;
    assert_eq!(metrics.blocks_rendered, 9);
    assert_eq!(metrics.blocks_dropped, 2);
    assert_eq!(metrics.images_count, 2);
    assert_eq!(metrics.code_blocks_count, 1);
    assert_eq!(metrics.links_count, 1);
}

#[test]
fn rendering_is_deterministic() {
    let first = render_service().render(&fixture_request());
    let second = render_service().render(&fixture_request());
    assert_eq!(first, second);
}

#[test]
fn fixture_json_output_carries_keys_and_metrics() {
    let output = render_service().render(&fixture_request());
    let value = serde_json::to_value(&output).expect("output serializes");

    assert_eq!(value["blocks"][0]["key"], "b1");
    assert_eq!(value["content_metrics"]["blocks_dropped"], 2);
    assert!(value["html"].as_str().is_some_and(|html| html.contains("Section")));
}

#[test]
fn render_emits_block_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        render_service().render(&fixture_request());
    });

    let counters: Vec<(String, u64)> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    assert!(
        counters.contains(&("blockpress_blocks_rendered_total".to_string(), 9)),
        "counters: {counters:?}"
    );
    assert!(
        counters.contains(&("blockpress_blocks_dropped_total".to_string(), 2)),
        "counters: {counters:?}"
    );
}
