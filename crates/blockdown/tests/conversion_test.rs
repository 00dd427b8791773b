//! End-to-end conversion tests for assembled document HTML.

use blockdown::{
    ConversionOptions, MathDelimiters, Node, Tag, cleanup_text, convert_fragment, convert_html, convert_tree,
    parse_document,
};

fn convert(html: &str) -> String {
    convert_html(html, &ConversionOptions::default()).unwrap()
}

fn paginated(separator: &str) -> ConversionOptions {
    ConversionOptions::default()
        .with_pagination(true)
        .with_page_separator(separator)
}

#[test]
fn test_hyphenated_continuation_joins_words() {
    let html = r#"<p class="has-continuation" block-type="Text">inter-</p><p>national</p>"#;
    assert_eq!(convert(html), "international");
}

#[test]
fn test_plain_continuation_joins_with_space() {
    let html = r#"<p class="has-continuation" block-type="TextInlineMath">cats </p>
<p>next-sentence</p>"#;
    assert_eq!(convert(html), "cats next-sentence");
}

#[test]
fn test_continuation_with_uppercase_before_hyphen_keeps_it() {
    let html = r#"<p class="has-continuation" block-type="Text">see ABC-</p><p>style</p>"#;
    assert_eq!(convert(html), "see ABC- style");
}

#[test]
fn test_list_group_continuation_joins_directly() {
    let html = r#"<p class="has-continuation" block-type="ListGroup">first half</p><p>, second half</p>"#;
    assert_eq!(convert(html), "first half, second half");
}

#[test]
fn test_pagination_marker_precedes_page_content() {
    let html = r#"<div class="page" data-page-id="2"><p>Earlier</p></div><div class="page" data-page-id="3"><p>Page three</p></div>"#;
    let markdown = convert_html(html, &paginated("---")).unwrap();

    assert!(markdown.contains("\n\n{3}---\n\nPage three"));
    assert_eq!(markdown, "\n\n{2}---\n\nEarlier\n\n{3}---\n\nPage three");
}

#[test]
fn test_pagination_pads_trailing_separator() {
    let html = r#"<p>Intro</p><div class="page" data-page-id="9"></div>"#;
    assert_eq!(convert_html(html, &paginated("~~~")).unwrap(), "\n\nIntro\n\n{9}~~~\n\n");
}

#[test]
fn test_page_divs_without_pagination() {
    let html = r#"<div class="page" data-page-id="0"><p>One</p></div><div class="page" data-page-id="1"></div>"#;
    assert_eq!(convert(html), "One");
}

#[test]
fn test_math_delimiters() {
    let options = ConversionOptions::default();
    let inline = parse_document("<math>x^2</math>").unwrap();
    let block = parse_document(r#"<math display="block">x^2</math>"#).unwrap();

    assert_eq!(convert_fragment(&inline, &options), " $x^2$ ");
    assert_eq!(convert_fragment(&block, &options), "\n$$x^2$$\n");
}

#[test]
fn test_custom_math_delimiters() {
    let options = ConversionOptions::default()
        .with_inline_math_delimiters(MathDelimiters::parse(r"\(,\)").unwrap())
        .with_block_math_delimiters(MathDelimiters::parse(r"\[,\]").unwrap());
    let html = r#"<p>Let <math>a_1</math> be</p><math display="block">a_1 = 2</math>"#;
    assert_eq!(convert_html(html, &options).unwrap(), "Let  \\(a_1\\)  be\n\n\\[a_1 = 2\\]");
}

#[test]
fn test_math_content_is_not_escaped() {
    assert_eq!(convert("<p><math>a*b $c$</math></p>"), "$a*b $c$$");
}

#[test]
fn test_dollar_escaping_toggle() {
    assert_eq!(convert("<p>Costs $5</p>"), r"Costs \$5");
    let options = ConversionOptions::default().with_escape_dollars(false);
    assert_eq!(convert_html("<p>Costs $5</p>", &options).unwrap(), "Costs $5");
}

#[test]
fn test_link_label_escaping() {
    let html = r#"<p>See <a href="https://example.com/spec">section [2] (draft)</a>.</p>"#;
    assert_eq!(
        convert(html),
        r"See [section \[2\] \(draft\)](https://example.com/spec)."
    );
}

#[test]
fn test_span_id_survives() {
    let html = r#"<h2><span id="page-1-0"></span>Results</h2><p>See <span id="ref-4">table 4</span>.</p>"#;
    assert_eq!(
        convert(html),
        "## <span id=\"page-1-0\"></span>Results\n\nSee <span id=\"ref-4\">table 4</span>."
    );
}

#[test]
fn test_list_ordinals() {
    let html = "<ul><li>1. Introduction</li><li>Scope 2.</li><li>Terms a) 3)</li><li>Background</li></ul>";
    assert_eq!(convert(html), "1. Introduction\n2. Scope\n3. Terms\n- Background");
}

#[test]
fn test_nested_list_text_not_duplicated() {
    let html = "<ol>\n  <li>Parent\n    <ul>\n      <li>Child one</li>\n      <li>Child two</li>\n    </ul>\n  </li>\n  <li>Sibling</li>\n</ol>";
    assert_eq!(convert(html), "- Parent\n  - Child one\n  - Child two\n- Sibling");
}

#[test]
fn test_list_followed_by_paragraph() {
    assert_eq!(convert("<ul><li>a</li></ul><p>after</p>"), "- a\n\nafter");
}

#[test]
fn test_rowspan_table() {
    let html = r#"<table><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#;
    assert_eq!(convert(html), "| A | B |\n|---|---|\n|   | C |");
}

#[test]
fn test_table_with_spacer_row_and_breaks() {
    let html = "<p>Before</p>\n<table>\n  <tr><td></td><td></td></tr>\n  <tr><th>Name</th><th>Notes</th></tr>\n  <tr><td>x</td><td>one<br>two</td></tr>\n</table>\n<p>After</p>";
    assert_eq!(
        convert(html),
        "Before\n\n| Name | Notes      |\n|------|------------|\n| x    | one<br>two |\n\nAfter"
    );
}

#[test]
fn test_malformed_spans_do_not_abort() {
    let html = r#"<table><tr><td colspan="4" rowspan="9">wide</td></tr><tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td></tr></table>"#;
    let markdown = convert(html);
    assert!(markdown.starts_with("| wide |"));
    assert!(markdown.contains("| a "));
}

#[test]
fn test_html_table_passthrough() {
    let options = ConversionOptions::default().with_html_tables(true);
    let html = r#"<p>x</p><table><tr><td colspan="2">A</td></tr></table>"#;
    assert_eq!(
        convert_html(html, &options).unwrap(),
        "x\n\n<table><tr><td colspan=\"2\">A</td></tr></table>"
    );
}

#[test]
fn test_fill_in_blank_normalization() {
    assert_eq!(convert("<p>Name: ____</p>"), "Name: ........");

    let leader = ". ".repeat(140);
    let markdown = convert(&format!("<p>Signature {leader}</p><p>Date</p>"));
    assert_eq!(markdown, format!("Signature \n\n{}\n\nDate", ".".repeat(150)));
    assert_eq!(cleanup_text(&markdown), markdown);
}

#[test]
fn test_output_is_cleanup_fixed_point() {
    let html = r#"<div class="page" data-page-id="0"><h1>Title</h1><p></p><p>Body</p><ul><li>x</li></ul><table><tr><td>a</td></tr></table></div>"#;
    let markdown = convert(html);
    assert_eq!(cleanup_text(&markdown), markdown);
}

#[test]
fn test_whitespace_lines_in_pre_reach_fixed_point() {
    let markdown = convert("<pre>a\n \n \n \nb</pre>");
    assert_eq!(markdown, "```\na\n\nb\n```");
    assert_eq!(cleanup_text(&markdown), markdown);
}

#[test]
fn test_table_math_keeps_dollars_with_custom_delimiters() {
    let options = ConversionOptions::default()
        .with_inline_math_delimiters(MathDelimiters::parse(r"\(,\)").unwrap());
    let html = "<table><tr><th>Term</th></tr><tr><td><math>x^2</math></td></tr></table>";
    assert_eq!(
        convert_html(html, &options).unwrap(),
        "| Term  |\n|-------|\n| $x^2$ |"
    );
}

#[test]
fn test_convert_tree_from_built_nodes() {
    let tree = Node::element(Tag::Div)
        .with_child(Node::element(Tag::P).with_text("Built by hand"))
        .with_child(
            Node::element(Tag::Ul).with_child(Node::element(Tag::Li).with_text("item")),
        );
    assert_eq!(convert_tree(&tree, &ConversionOptions::default()), "Built by hand\n\n- item");
}

#[test]
fn test_unknown_tags_degrade_gracefully() {
    assert_eq!(convert("<figure><custom-tag>Caption</custom-tag></figure><p>Next</p>"), "Caption\n\nNext");
}

#[test]
fn test_full_document_shell() {
    let html = "<html><head><title>Doc</title></head><body><h1>Title</h1><p>Content</p></body></html>";
    assert_eq!(convert(html), "# Title\n\nContent");
}

#[cfg(feature = "serde")]
#[test]
fn test_options_from_json() {
    let options: ConversionOptions =
        serde_json::from_str(r#"{"paginate_output": true, "page_separator": "===", "escape_dollars": false}"#).unwrap();
    assert!(options.paginate_output);
    assert_eq!(options.page_separator, "===");
    assert!(!options.escape_dollars);
    assert_eq!(options.inline_math_delimiters, MathDelimiters::inline());
}
