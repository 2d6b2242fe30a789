//! Integration tests for XPath evaluation over parsed documents.

use bramble_dom::{Document, NodeId, NodeKind};
use bramble_html::parse_str;
use bramble_xpath::xpath::XPathValue;
use bramble_xpath::{
    Bindings, DomNavigator, NamespaceScope, NavigatorSettings, QuerySettings, SelectedItem,
    TreeCursor, XPathError, XPathExpression, evaluate, materialize, select_nodes,
    select_nodes_with, select_single_node,
};

/// Helper to get the first element named `name`.
fn first(doc: &Document, name: &str) -> NodeId {
    doc.elements_by_name(name)[0]
}

/// String value of `expr` evaluated at the document root.
fn string_of(doc: &Document, expr: &str) -> String {
    evaluate(doc, doc.root(), expr).unwrap().to_xpath_string()
}

fn nodes(items: &[SelectedItem]) -> Vec<NodeId> {
    items
        .iter()
        .map(|item| match item {
            SelectedItem::Node(id) => *id,
            other => panic!("expected a tree node, got {other:?}"),
        })
        .collect()
}

fn names(doc: &Document, items: &[SelectedItem]) -> Vec<String> {
    nodes(items)
        .into_iter()
        .map(|id| doc.name(id).unwrap().to_string())
        .collect()
}

// =============================================================================
// Scalar results
// =============================================================================

#[test]
fn test_count_becomes_scalar_leaf() {
    let mut doc = parse_str("<ul><li>a</li><li>b</li></ul>");
    let found = select_nodes(&doc, doc.root(), "count(//li)").unwrap();
    assert_eq!(found, vec![SelectedItem::Scalar("2".to_string())]);

    let ids = materialize(&mut doc, &found);
    assert_eq!(ids.len(), 1);
    assert!(matches!(doc.get(ids[0]).unwrap().kind(), NodeKind::QueryResult(v) if v == "2"));
    assert!(doc.parent(ids[0]).is_none());
    assert_eq!(DomNavigator::new(&doc, ids[0]).value(), "2");
}

#[test]
fn test_arithmetic_and_number_formatting() {
    let doc = parse_str("<p/>");
    assert_eq!(string_of(&doc, "1 + 2 * 3"), "7");
    assert_eq!(string_of(&doc, "7 div 2"), "3.5");
    assert_eq!(string_of(&doc, "10 mod 3"), "1");
    assert_eq!(string_of(&doc, "-(2 - 5)"), "3");
    assert_eq!(string_of(&doc, "1 div 0"), "Infinity");
    assert_eq!(string_of(&doc, "0 div 0"), "NaN");
    assert_eq!(string_of(&doc, "-0"), "0");
    assert_eq!(string_of(&doc, "round(2.5)"), "3");
    assert_eq!(string_of(&doc, "round(-2.5)"), "-2");
    assert_eq!(string_of(&doc, "floor(-1.5)"), "-2");
    assert_eq!(string_of(&doc, "ceiling(1.1)"), "2");
}

#[test]
fn test_string_functions() {
    let doc = parse_str("<p/>");
    assert_eq!(string_of(&doc, "concat('a', 'b', 1)"), "ab1");
    assert_eq!(string_of(&doc, "substring('12345', 1.5, 2.6)"), "234");
    assert_eq!(string_of(&doc, "substring('12345', 0, 3)"), "12");
    assert_eq!(string_of(&doc, "substring('12345', 2)"), "2345");
    assert_eq!(string_of(&doc, "substring-before('1999/04/01', '/')"), "1999");
    assert_eq!(string_of(&doc, "substring-after('1999/04/01', '/')"), "04/01");
    assert_eq!(string_of(&doc, "translate('bar', 'abc', 'ABC')"), "BAr");
    assert_eq!(string_of(&doc, "translate('--aaa--', 'abc-', 'ABC')"), "AAA");
    assert_eq!(string_of(&doc, "normalize-space('  a \n b  ')"), "a b");
    assert_eq!(string_of(&doc, "string-length('héllo')"), "5");
    assert_eq!(string_of(&doc, "starts-with('bramble', 'bra')"), "true");
    assert_eq!(string_of(&doc, "contains('bramble', 'mb')"), "true");
    assert_eq!(string_of(&doc, "not(contains('bramble', 'x'))"), "true");
    assert_eq!(string_of(&doc, "number(' 12 ')"), "12");
    assert_eq!(string_of(&doc, "number('1e3')"), "NaN");
}

// =============================================================================
// Location paths
// =============================================================================

#[test]
fn test_positional_predicates() {
    let doc = parse_str("<ul><li>a</li><li>b</li><li>c</li></ul>");
    let items = doc.elements_by_name("li");

    let found = select_nodes(&doc, doc.root(), "//li[2]").unwrap();
    assert_eq!(nodes(&found), vec![items[1]]);

    let found = select_nodes(&doc, doc.root(), "//li[last()]").unwrap();
    assert_eq!(nodes(&found), vec![items[2]]);

    let found = select_nodes(&doc, doc.root(), "//li[position() > 1]").unwrap();
    assert_eq!(nodes(&found), vec![items[1], items[2]]);

    // Reverse axes count from the context node outwards.
    let found = select_nodes(&doc, doc.root(), "//li[3]/preceding-sibling::li[1]").unwrap();
    assert_eq!(nodes(&found), vec![items[1]]);

    let found = select_nodes(&doc, doc.root(), "(//li)[1]").unwrap();
    assert_eq!(nodes(&found), vec![items[0]]);
}

#[test]
fn test_value_predicates_and_attributes() {
    let doc = parse_str(
        r#"<div><a href="/one" class="nav">1</a><a href="/two">2</a><a class="nav">3</a></div>"#,
    );
    let links = doc.elements_by_name("a");

    let found = select_nodes(&doc, doc.root(), "//a[@class='nav']").unwrap();
    assert_eq!(nodes(&found), vec![links[0], links[2]]);

    let found = select_nodes(&doc, doc.root(), "//a[not(@class)]/@href").unwrap();
    assert_eq!(
        found,
        vec![SelectedItem::Attribute {
            element: links[1],
            index: 0
        }]
    );

    assert_eq!(string_of(&doc, "count(//@href)"), "2");
    assert_eq!(string_of(&doc, "string(//a[. = '3']/@class)"), "nav");
    assert_eq!(string_of(&doc, "sum(//a)"), "6");
    assert_eq!(string_of(&doc, "//a > 2"), "true");
    assert_eq!(string_of(&doc, "//a = 4"), "false");
}

#[test]
fn test_union_is_in_document_order() {
    let doc = parse_str("<r><a/><b/><c/></r>");
    let found = select_nodes(&doc, doc.root(), "//c | //a | //a").unwrap();
    assert_eq!(names(&doc, &found), vec!["a", "c"]);
}

#[test]
fn test_wide_union_is_in_document_order() {
    let items: String = (0..20_000).map(|i| format!("<li>{i}</li>")).collect();
    let doc = parse_str(&format!("<ul>{items}</ul>"));
    let found = select_nodes(&doc, doc.root(), "//li[position() mod 2 = 0] | //li").unwrap();
    assert_eq!(found.len(), 20_000);
    let texts: Vec<String> = nodes(&found)
        .into_iter()
        .map(|id| doc.inner_text(id))
        .collect();
    assert_eq!(texts[0], "0");
    assert_eq!(texts[19_999], "19999");
    assert!(texts.iter().zip(texts.iter().skip(1)).all(|(a, b)| {
        a.parse::<u32>().unwrap() + 1 == b.parse::<u32>().unwrap()
    }));
}

#[test]
fn test_order_follows_mutation() {
    let mut doc = parse_str("<r><a/><b/></r>");
    let found = select_nodes(&doc, doc.root(), "//b | //a").unwrap();
    assert_eq!(names(&doc, &found), vec!["a", "b"]);

    let (a, r) = (first(&doc, "a"), first(&doc, "r"));
    doc.remove(a).unwrap();
    doc.append_child(r, a).unwrap();
    let found = select_nodes(&doc, doc.root(), "//b | //a").unwrap();
    assert_eq!(names(&doc, &found), vec!["b", "a"]);
}

#[test]
fn test_following_and_preceding() {
    let doc = parse_str("<r><a><a1/></a><b/><c><c1/></c></r>");
    let found = select_nodes(&doc, doc.root(), "//a1/following::*").unwrap();
    assert_eq!(names(&doc, &found), vec!["b", "c", "c1"]);

    let found = select_nodes(&doc, doc.root(), "//c1/preceding::*").unwrap();
    assert_eq!(names(&doc, &found), vec!["a", "a1", "b"]);

    assert_eq!(string_of(&doc, "name(//c1/preceding::*[1])"), "b");
    assert_eq!(string_of(&doc, "count(//c1/ancestor::*)"), "2");
    assert_eq!(string_of(&doc, "name(//c1/ancestor::*[1])"), "c");
}

#[test]
fn test_node_type_tests() {
    let doc = parse_str("<p>a<b>c</b><!--note-->d</p>");
    assert_eq!(string_of(&doc, "count(//p/text())"), "2");
    assert_eq!(string_of(&doc, "count(//text())"), "3");
    assert_eq!(string_of(&doc, "string(//comment())"), "note");
    assert_eq!(string_of(&doc, "string(//p)"), "acd");
    assert_eq!(string_of(&doc, "count(/node())"), "1");
}

#[test]
fn test_relative_context() {
    let doc = parse_str("<div><p>1</p><section><p>2</p></section></div>");
    let section = first(&doc, "section");

    let found = select_nodes(&doc, section, "p").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(string_of(&doc, "count(//p)"), "2");

    let found = select_nodes(&doc, section, "..").unwrap();
    assert_eq!(nodes(&found), vec![first(&doc, "div")]);

    let found = select_single_node(&doc, section, "/").unwrap();
    assert_eq!(found, Some(SelectedItem::Node(doc.root())));

    assert_eq!(select_single_node(&doc, section, "span").unwrap(), None);
}

#[test]
fn test_id_and_lang() {
    let doc = parse_str(
        r#"<div lang="en-US"><p id="a">x</p><p id="b" lang="fr">y</p></div>"#,
    );
    let ps = doc.elements_by_name("p");
    let found = select_nodes(&doc, doc.root(), "id('b a')").unwrap();
    assert_eq!(nodes(&found), ps);

    assert_eq!(string_of(&doc, "count(//p[lang('en')])"), "1");
    assert_eq!(string_of(&doc, "count(//p[lang('fr')])"), "1");
    assert_eq!(string_of(&doc, "count(//p[lang('de')])"), "0");
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_case_folding_of_names() {
    let doc = parse_str("<DIV><Span>x</Span></DIV>");
    assert_eq!(string_of(&doc, "count(//div/span)"), "1");
    assert_eq!(string_of(&doc, "count(//DIV)"), "0");

    let preserve = QuerySettings::new().with_navigator(NavigatorSettings::preserve_case());
    let found = select_nodes_with(&doc, doc.root(), "//DIV/Span", &preserve).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_depth_first_ordering() {
    let doc = parse_str("<a><b><c/></b><d/></a>");
    let settings = QuerySettings::new().with_depth_first(true);
    let found = select_nodes_with(&doc, doc.root(), "//*", &settings).unwrap();
    assert_eq!(names(&doc, &found), vec!["c", "b", "d", "a"]);

    let found = select_nodes(&doc, doc.root(), "//*").unwrap();
    assert_eq!(names(&doc, &found), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_root_boundary_query() {
    let doc = parse_str("<div><p>1</p><section><p>2</p></section></div>");
    let section = first(&doc, "section");
    let settings = QuerySettings::new().with_root_boundary(true);

    let found = select_nodes_with(&doc, section, "//p", &settings).unwrap();
    assert_eq!(found.len(), 1);

    let found = select_nodes_with(&doc, section, "/", &settings).unwrap();
    assert_eq!(nodes(&found), vec![section]);

    let found = select_nodes_with(&doc, section, "..", &settings).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_prefixed_name_tests() {
    let doc = parse_str(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg><rect/>"#);
    let settings = QuerySettings::new().with_namespace("s", "http://www.w3.org/2000/svg");

    let found = select_nodes_with(&doc, doc.root(), "//s:rect", &settings).unwrap();
    assert_eq!(found.len(), 1);
    let found = select_nodes_with(&doc, doc.root(), "//s:*", &settings).unwrap();
    assert_eq!(names(&doc, &found), vec!["svg", "rect"]);

    // Unprefixed tests ignore namespaces.
    assert_eq!(string_of(&doc, "count(//rect)"), "2");

    assert_eq!(
        select_nodes(&doc, doc.root(), "//s:rect"),
        Err(XPathError::UnboundPrefix("s".to_string()))
    );
}

#[test]
fn test_namespace_axis() {
    let doc = parse_str(r#"<root xmlns:a="urn:a"><child/></root>"#);
    assert_eq!(string_of(&doc, "count(//child/namespace::*)"), "2");
    assert_eq!(string_of(&doc, "string(//child/namespace::a)"), "urn:a");

    let settings = QuerySettings::new().with_namespace_scope(NamespaceScope::ExcludeXml);
    let found = select_nodes_with(&doc, doc.root(), "//child/namespace::*", &settings).unwrap();
    assert_eq!(
        found,
        vec![SelectedItem::Namespace {
            element: first(&doc, "child"),
            prefix: "a".to_string(),
            uri: "urn:a".to_string(),
        }]
    );
}

// =============================================================================
// Compiled expressions and errors
// =============================================================================

#[test]
fn test_compiled_expression_with_variables() {
    let doc = parse_str("<ul><li>a</li><li>b</li><li>c</li></ul>");
    let expression = XPathExpression::compile("//li[$n]").unwrap();
    assert_eq!(expression.to_string(), "//li[$n]");

    let nav = DomNavigator::new(&doc, doc.root());
    let bindings = Bindings::new().with_variable("n", XPathValue::Number(3.0));
    let found = expression.select(&nav, &bindings).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value(), "c");

    let missing = expression.select(&nav, &Bindings::new());
    assert!(matches!(missing, Err(XPathError::UnboundVariable(name)) if name == "n"));
}

#[test]
fn test_evaluation_errors() {
    let doc = parse_str("<p/>");
    let root = doc.root();
    assert_eq!(
        select_nodes(&doc, root, "frobnicate()"),
        Err(XPathError::UnknownFunction("frobnicate".to_string()))
    );
    assert!(matches!(
        select_nodes(&doc, root, "count()"),
        Err(XPathError::WrongArity { found: 0, .. })
    ));
    assert_eq!(select_nodes(&doc, root, "1/p"), Err(XPathError::NotANodeSet));
    assert_eq!(select_nodes(&doc, root, "count('x')"), Err(XPathError::NotANodeSet));
    assert!(matches!(
        select_nodes(&doc, root, "//p["),
        Err(XPathError::Syntax { .. })
    ));
    assert_eq!(
        select_nodes(&doc, NodeId(9999), "."),
        Err(XPathError::NodeNotFound(NodeId(9999)))
    );
}

#[test]
fn test_materialize_mixed_items() {
    let mut doc = parse_str(r#"<a href="/x">t</a>"#);
    let a = first(&doc, "a");
    let found = select_nodes(&doc, doc.root(), "//a | //a/@href").unwrap();
    assert_eq!(found.len(), 2);

    let ids = materialize(&mut doc, &found);
    assert_eq!(ids[0], a);
    assert_eq!(doc.text(ids[1]), Some("/x"));
}
