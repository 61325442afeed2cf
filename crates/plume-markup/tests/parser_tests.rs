//! Integration tests for the parser and tree builder.

use std::cell::RefCell;
use std::rc::Rc;

use plume_common::{CollectingSink, Severity};
use plume_dom::{Attributes, DomTree, NodeId, NodeType, SerializeOptions};
use plume_markup::{
    CloseKind, Handler, MarkupRules, ParseError, ParseOptions, Parser, Span,
    create_incremental_parser, parse_document,
};
use test_case::test_case;

/// Helper to parse HTML with default options
fn parse(html: &str) -> DomTree {
    parse_document(html, &ParseOptions::default())
}

/// Helper to parse strict XML
fn parse_xml(xml: &str) -> DomTree {
    parse_document(xml, &ParseOptions::xml())
}

/// Helper to get the tag names of the element children of `id`
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.child_elements(id)
        .into_iter()
        .filter_map(|c| tree.tag_name(c).map(str::to_string))
        .collect()
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.first_element_by_tag_name(NodeId::ROOT, tag, true)
        .unwrap_or_else(|| panic!("no <{tag}> in tree"))
}

fn html_markup(tree: &DomTree) -> String {
    tree.inner_markup(NodeId::ROOT, &SerializeOptions::HTML)
}

// ========== Basic structure ==========

#[test]
fn test_nested_document_shape() {
    let tree = parse(r#"<a x="1"><b/>text<!--c--></a>"#);
    let a = tree.document_element().unwrap();
    assert_eq!(tree.tag_name(a), Some("a"));
    assert_eq!(tree.attribute(a, "x"), Some("1"));

    let children = tree.children(a);
    assert_eq!(children.len(), 3);
    let b = tree.as_element(children[0]).unwrap();
    assert_eq!(b.tag_name, "b");
    assert!(b.self_closing);
    assert!(tree.children(children[0]).is_empty());
    assert_eq!(tree.as_text(children[1]), Some("text"));
    assert!(matches!(
        &tree.get(children[2]).unwrap().node_type,
        NodeType::Comment(c) if c == "c"
    ));

    assert_eq!(
        tree.outer_markup(a, &SerializeOptions::HTML),
        r#"<a x="1"><b/>text<!--c--></a>"#
    );
}

#[test]
fn test_void_element_has_no_children() {
    let tree = parse("<p>A<br>B</p>");
    let p = first(&tree, "p");
    let children = tree.children(p);
    assert_eq!(children.len(), 3);
    assert_eq!(tree.as_text(children[0]), Some("A"));
    assert_eq!(tree.tag_name(children[1]), Some("br"));
    assert!(tree.children(children[1]).is_empty());
    assert_eq!(tree.as_text(children[2]), Some("B"));
}

#[test]
fn test_close_tag_for_void_element_is_ignored() {
    let tree = parse("<p>a</br>b</p>");
    let p = first(&tree, "p");
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "ab");
}

#[test]
fn test_outer_close_tag_closes_inner_elements() {
    let tree = parse("<p><b>x</p>y");
    let p = first(&tree, "p");
    let b = first(&tree, "b");
    assert_eq!(tree.parent(b), Some(p));
    assert_eq!(tree.text_content(b), "x");

    let root_children = tree.children(NodeId::ROOT);
    assert_eq!(root_children.len(), 2);
    assert_eq!(tree.as_text(root_children[1]), Some("y"));
}

#[test]
fn test_unmatched_close_tag_is_ignored() {
    let tree = parse("<div>a</span>b</div>");
    let div = first(&tree, "div");
    assert_eq!(tree.text_content(div), "ab");
    assert_eq!(tree.children(div).len(), 1);
}

#[test]
fn test_unclosed_elements_are_closed_at_end() {
    let tree = parse("<div><span>x");
    let span = first(&tree, "span");
    assert_eq!(tree.parent(span), Some(first(&tree, "div")));
    assert_eq!(html_markup(&tree), "<div><span>x</span></div>");
}

#[test]
fn test_mismatched_case_closes_in_html() {
    let tree = parse("<DIV>x</div>y");
    let div = tree.document_element().unwrap();
    assert_eq!(tree.tag_name(div), Some("DIV"));
    assert_eq!(tree.children(NodeId::ROOT).len(), 2);
}

// ========== Implicit closes ==========

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b</ul>");
    let ul = first(&tree, "ul");
    assert_eq!(child_tags(&tree, ul), vec!["li", "li"]);
    assert_eq!(tree.inner_text(ul), "ab");
}

#[test]
fn test_table_rows_and_cells() {
    let tree = parse("<table><tr><td>1<td>2<tr><td>3</table>");
    let table = first(&tree, "table");
    assert_eq!(child_tags(&tree, table), vec!["tr", "tr"]);
    let rows = tree.child_elements(table);
    assert_eq!(child_tags(&tree, rows[0]), vec!["td", "td"]);
    assert_eq!(child_tags(&tree, rows[1]), vec!["td"]);
}

#[test_case("<p>a<div>b</div>", &["p", "div"] ; "div closes p")]
#[test_case("<p>a<h1>b</h1>", &["p", "h1"] ; "heading closes p")]
#[test_case("<p>a<span>b</span></p>", &["p"] ; "span stays inside p")]
#[test_case("<dl><dt>a<dd>b</dl>", &["dl"] ; "definition items stay in list")]
fn test_implied_close_rules(html: &str, top_level: &[&str]) {
    let tree = parse(html);
    assert_eq!(child_tags(&tree, NodeId::ROOT), top_level);
}

#[test]
fn test_option_closes_option() {
    let tree = parse("<select><option>a<option>b</select>");
    let select = first(&tree, "select");
    assert_eq!(child_tags(&tree, select), vec!["option", "option"]);
}

#[test]
fn test_custom_rules() {
    let mut rules = MarkupRules::empty();
    rules.add_void("w:br");
    rules.add_implied_close("w:p", "w:p");

    let options = ParseOptions::xml();
    let builder = plume_markup::TreeBuilder::new(&options);
    let mut parser = Parser::new(builder, &options).with_rules(rules);
    parser.parse_complete("<w:doc><w:p>a<w:br>b<w:p>c</w:doc>").unwrap();
    let tree = parser.into_handler().into_tree();

    let doc = first(&tree, "w:doc");
    assert_eq!(child_tags(&tree, doc), vec!["w:p", "w:p"]);
    let br = first(&tree, "w:br");
    assert!(tree.children(br).is_empty());
}

// ========== XML mode ==========

#[test]
fn test_xml_mode_disables_html_tables() {
    let tree = parse_xml("<r><br>x</br><p>a<p>b</p></p></r>");
    let br = first(&tree, "br");
    assert_eq!(tree.text_content(br), "x");
    let outer_p = first(&tree, "p");
    assert_eq!(child_tags(&tree, outer_p), vec!["p"]);
}

#[test]
fn test_xml_mode_matches_case_exactly() {
    let tree = parse_xml("<a><A>x</a></A>");
    let upper = first(&tree, "A");
    let lower = first(&tree, "a");
    assert_eq!(tree.parent(upper), Some(lower));
    // `</a>` closed both, so `</A>` had nothing to match.
    assert_eq!(tree.children(NodeId::ROOT).len(), 1);
}

#[test]
fn test_xml_script_is_parsed_as_markup() {
    let tree = parse_xml("<script><b/></script>");
    let script = first(&tree, "script");
    assert_eq!(child_tags(&tree, script), vec!["b"]);
}

#[test]
fn test_xml_serialization_round_trip() {
    let xml = r#"<?xml version="1.0"?><feed><entry id="1"/><![CDATA[a<b]]></feed>"#;
    let tree = parse_xml(xml);
    assert_eq!(tree.inner_markup(NodeId::ROOT, &SerializeOptions::XML), xml);
}

// ========== CDATA, comments and declarations ==========

#[test]
fn test_cdata_becomes_comment_in_html() {
    let tree = parse("<div><![CDATA[x]]></div>");
    let div = first(&tree, "div");
    let child = tree.children(div)[0];
    assert!(matches!(
        &tree.get(child).unwrap().node_type,
        NodeType::Comment(c) if c == "[CDATA[x]]"
    ));
}

#[test]
fn test_cdata_as_text_builds_cdata_node() {
    let options = ParseOptions::default().with_cdata_as_text(true);
    let tree = parse_document("<div><![CDATA[a<b]]></div>", &options);
    let div = first(&tree, "div");
    let cdata = tree.children(div)[0];
    assert!(matches!(tree.get(cdata).unwrap().node_type, NodeType::CData));
    assert_eq!(tree.children(cdata).len(), 1);
    assert_eq!(tree.text_content(div), "a<b");
}

#[test]
fn test_doctype_is_a_processing_instruction() {
    let tree = parse("<!DOCTYPE html><html></html>");
    let doctype = tree.children(NodeId::ROOT)[0];
    assert!(matches!(
        &tree.get(doctype).unwrap().node_type,
        NodeType::ProcessingInstruction { name, data } if name == "!DOCTYPE" && data == "!DOCTYPE html"
    ));
}

#[test]
fn test_folding_lowercases_declaration_names() {
    let options = ParseOptions::default().with_case_folding(true, false);
    let tree = parse_document(r#"<!DOCTYPE html><?XML version="1.0"?>"#, &options);
    let names: Vec<String> = tree
        .children(NodeId::ROOT)
        .iter()
        .filter_map(|&id| match &tree.get(id)?.node_type {
            NodeType::ProcessingInstruction { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["!doctype", "?xml"]);
}

// ========== Attributes and case folding ==========

#[test]
fn test_first_attribute_wins() {
    let tree = parse(r#"<a href="1" href="2" HREF="3">"#);
    let a = first(&tree, "a");
    assert_eq!(tree.attribute(a, "href"), Some("1"));
    assert_eq!(tree.attribute(a, "HREF"), Some("3"));
}

#[test]
fn test_attribute_folding_merges_duplicates() {
    let options = ParseOptions::default().with_case_folding(false, true);
    let tree = parse_document(r#"<a HREF="1" href="2">"#, &options);
    let a = first(&tree, "a");
    let attrs = &tree.as_element(a).unwrap().attrs;
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs.get("href"), Some("1"));
}

#[test]
fn test_tag_folding() {
    let options = ParseOptions::default().with_case_folding(true, false);
    let tree = parse_document("<DIV><Span>x</SPAN></Div>", &options);
    assert_eq!(html_markup(&tree), "<div><span>x</span></div>");
}

#[test]
fn test_entities_are_decoded() {
    let tree = parse(r#"<p title="a &amp; b">x &lt; y &copy 2</p>"#);
    let p = first(&tree, "p");
    assert_eq!(tree.attribute(p, "title"), Some("a & b"));
    assert_eq!(tree.text_content(p), "x < y \u{a9} 2");
}

#[test]
fn test_entity_decoding_can_be_disabled() {
    let options = ParseOptions::default().with_entity_decoding(false);
    let tree = parse_document("<p>&amp;</p>", &options);
    assert_eq!(tree.text_content(first(&tree, "p")), "&amp;");
}

// ========== Verbatim elements ==========

#[test]
fn test_script_content_is_one_text_node() {
    let tree = parse("<script>a<b>c</b></script><p>d</p>");
    let script = first(&tree, "script");
    assert_eq!(tree.children(script).len(), 1);
    assert_eq!(tree.text_content(script), "a<b>c</b>");
    assert_eq!(tree.inner_text(NodeId::ROOT), "d");
    assert_eq!(
        html_markup(&tree),
        "<script>a<b>c</b></script><p>d</p>"
    );
}

#[test]
fn test_textarea_decodes_but_keeps_markup() {
    let tree = parse("<textarea><b>&amp;</b></textarea>");
    let textarea = first(&tree, "textarea");
    assert_eq!(tree.text_content(textarea), "<b>&</b>");
    assert!(tree.child_elements(textarea).is_empty());
}

// ========== Round trip ==========

#[test_case(r#"<div id="a"><p>x &amp; y</p><br><img src="i.png"></div>"# ; "void and escaped text")]
#[test_case("<!DOCTYPE html><html><head><title>T</title></head><body></body></html>" ; "document skeleton")]
#[test_case(r#"<ul class="menu"><li>one</li><li>two</li></ul><!-- end -->"# ; "lists and comments")]
#[test_case("<svg><path d=\"M0 0\"/></svg>" ; "self closing foreign element")]
fn test_round_trip(html: &str) {
    assert_eq!(html_markup(&parse(html)), html);
}

#[test]
fn test_attribute_quotes_are_normalized() {
    let tree = parse("<a b=c d='e' f>");
    assert_eq!(html_markup(&tree), r#"<a b="c" d="e" f=""></a>"#);
}

// ========== Streaming ==========

const CHUNK_SAMPLE: &str = concat!(
    "<!DOCTYPE html><html><head><title>A &amp; B</title>",
    "<script>if (x </b) {}</script></head><body class=\"x &lt; y\">",
    "<ul><li>caf\u{e9}<li>two &notit;</ul><!-- c --><![CDATA[d]]>",
    "<p>para<br>line<table><tr><td>1<td>2</table></body></html>&am"
);

/// Start and end index of every node, in document order.
fn offsets(tree: &DomTree) -> Vec<(Option<usize>, Option<usize>)> {
    tree.descendants(NodeId::ROOT)
        .filter_map(|id| tree.get(id))
        .map(|node| (node.start_index, node.end_index))
        .collect()
}

#[test]
fn test_every_split_point_builds_the_same_tree() {
    let options = ParseOptions::default().with_indices(true, true);
    let whole = parse_document(CHUNK_SAMPLE, &options);
    for k in (0..=CHUNK_SAMPLE.len()).filter(|&k| CHUNK_SAMPLE.is_char_boundary(k)) {
        let mut parser = create_incremental_parser(&options, |_| {}, |_, _| {});
        parser.write(&CHUNK_SAMPLE[..k]).unwrap();
        parser.write(&CHUNK_SAMPLE[k..]).unwrap();
        parser.end().unwrap();
        let tree = parser.into_tree();
        assert_eq!(tree, whole, "split at {k}");
        assert_eq!(offsets(&tree), offsets(&whole), "offsets at split {k}");
    }
}

#[test]
fn test_small_chunks_build_the_same_tree() {
    let whole = parse(CHUNK_SAMPLE);
    for size in [1, 2, 3, 7, 16] {
        let mut parser = create_incremental_parser(&ParseOptions::default(), |_| {}, |_, _| {});
        let chars: Vec<char> = CHUNK_SAMPLE.chars().collect();
        for chunk in chars.chunks(size) {
            parser.write(&chunk.iter().collect::<String>()).unwrap();
        }
        parser.end().unwrap();
        assert_eq!(parser.into_tree(), whole, "chunk size {size}");
    }
}

#[test]
fn test_pause_and_resume() {
    let mut parser = create_incremental_parser(&ParseOptions::default(), |_| {}, |_, _| {});
    parser.write("<div>").unwrap();
    parser.pause();
    parser.write("<p>x</p>").unwrap();
    parser.end().unwrap();
    assert!(!parser.is_ended());
    assert!(parser.tree().first_element_by_tag_name(NodeId::ROOT, "p", true).is_none());

    parser.resume();
    assert!(parser.is_ended());
    assert_eq!(html_markup(parser.tree()), "<div><p>x</p></div>");
}

#[test]
fn test_partial_tree_is_inspectable() {
    let mut parser = create_incremental_parser(&ParseOptions::default(), |_| {}, |_, _| {});
    parser.write("<ul><li>one</li><li>tw").unwrap();
    let tree = parser.tree();
    let ul = first(tree, "ul");
    assert_eq!(child_tags(tree, ul), vec!["li", "li"]);
    assert_eq!(tree.text_content(ul), "onetw");
}

#[test]
fn test_reset_starts_a_new_document() {
    let mut parser = create_incremental_parser(&ParseOptions::default(), |_| {}, |_, _| {});
    parser.write("<a>").unwrap();
    parser.end().unwrap();
    parser.reset();
    parser.write("<b>").unwrap();
    parser.end().unwrap();
    assert_eq!(html_markup(parser.tree()), "<b></b>");
}

// ========== Callbacks and errors ==========

#[test]
fn test_on_complete_fires_once() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let mut parser = create_incremental_parser(
        &ParseOptions::default(),
        move |result: Result<&DomTree, ParseError>| {
            seen.borrow_mut().push(result.map(DomTree::len));
        },
        |_, _| {},
    );
    parser.write("<p>x</p>").unwrap();
    parser.end().unwrap();

    assert_eq!(parser.write("y"), Err(ParseError::WriteAfterEnd));
    assert_eq!(parser.end(), Err(ParseError::EndAfterEnd));
    assert_eq!(*calls.borrow(), vec![Ok(3)]);
    // The tree survives the misuse.
    assert_eq!(html_markup(parser.tree()), "<p>x</p>");
}

#[test]
fn test_error_messages() {
    assert_eq!(ParseError::WriteAfterEnd.to_string(), ".write() after done");
    assert_eq!(ParseError::EndAfterEnd.to_string(), ".end() after done");
}

#[test]
fn test_on_element_closed_order() {
    let closed = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&closed);
    let mut parser = create_incremental_parser(
        &ParseOptions::default(),
        |_| {},
        move |tree: &DomTree, id: NodeId| {
            seen.borrow_mut()
                .push(tree.tag_name(id).unwrap_or_default().to_string());
        },
    );
    parser.write("<a><b></b><c/><br><d>").unwrap();
    parser.end().unwrap();
    assert_eq!(*closed.borrow(), vec!["b", "c", "br", "d", "a"]);
}

#[test]
fn test_diagnostics_are_reported() {
    let sink = CollectingSink::new();
    let mut parser = create_incremental_parser(&ParseOptions::default(), |_| {}, |_, _| {})
        .with_diagnostics(sink.clone());
    parser.write(r#"<li a=1 a=2>x<li>y</span>"#).unwrap();
    parser.end().unwrap();

    let records = sink.records();
    let warnings: Vec<&str> = records
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        warnings,
        vec![r#"duplicate attribute "a" on <li>"#, "unmatched </span>"]
    );
    assert!(records
        .iter()
        .any(|d| d.severity == Severity::Info && d.message == "implied </li>"));
    assert_eq!(records[0].position, Some(8));
}

// ========== Source offsets ==========

#[test]
fn test_start_and_end_indices() {
    let options = ParseOptions::default().with_indices(true, true);
    let tree = parse_document("<p>hi</p><!--c-->", &options);
    let p = first(&tree, "p");
    let node = tree.get(p).unwrap();
    assert_eq!((node.start_index, node.end_index), (Some(0), Some(8)));

    let text = tree.get(tree.children(p)[0]).unwrap();
    assert_eq!((text.start_index, text.end_index), (Some(3), Some(4)));

    let comment = tree.get(tree.children(NodeId::ROOT)[1]).unwrap();
    assert_eq!((comment.start_index, comment.end_index), (Some(9), Some(16)));
}

#[test]
fn test_implied_close_ends_before_next_tag() {
    let options = ParseOptions::default().with_indices(true, true);
    let tree = parse_document("<li>a<li>b", &options);
    let items = tree.child_elements(NodeId::ROOT);
    let first_item = tree.get(items[0]).unwrap();
    assert_eq!(first_item.end_index, Some(4));
    let last_item = tree.get(items[1]).unwrap();
    assert_eq!(last_item.end_index, Some(9));
}

#[test]
fn test_indices_are_off_by_default() {
    let tree = parse("<p>x</p>");
    let node = tree.get(first(&tree, "p")).unwrap();
    assert_eq!((node.start_index, node.end_index), (None, None));
}

// ========== Custom handlers ==========

#[derive(Default)]
struct Trace(Vec<String>);

impl Handler for Trace {
    fn on_open_tag(&mut self, name: &str, attrs: Attributes, self_closing: bool, _span: Span) {
        self.0
            .push(format!("open {name} {} {self_closing}", attrs.len()));
    }

    fn on_close_tag(&mut self, name: &str, kind: CloseKind, _span: Span) {
        self.0.push(format!("close {name} {kind:?}"));
    }

    fn on_end(&mut self) {
        self.0.push("end".to_string());
    }
}

#[test]
fn test_handler_sees_close_kinds() {
    let mut parser = Parser::new(Trace::default(), &ParseOptions::default());
    parser
        .parse_complete("<p class=x><img><i/></b><li></p><div>")
        .unwrap();
    assert_eq!(
        parser.handler().0,
        vec![
            "open p 1 false",
            "open img 0 false",
            "close img Void",
            "open i 0 true",
            "close i SelfClosing",
            "open li 0 false",
            "close li Implied",
            "close p Explicit",
            "open div 0 false",
            "close div Implied",
            "end",
        ]
    );
}

#[test]
fn test_parser_reports_open_elements() {
    let mut parser = Parser::new(Trace::default(), &ParseOptions::default());
    parser.write("<html><body><p>").unwrap();
    assert_eq!(parser.open_elements(), ["html", "body", "p"]);
    parser.end().unwrap();
    assert!(parser.open_elements().is_empty());
}
