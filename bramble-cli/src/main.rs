//! Bramble CLI
//!
//! Parse HTML leniently and inspect the result: the re-serialized markup,
//! an indented node tree, the recorded parse errors, or XPath query results.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bramble_common::set_quiet;
use bramble_dom::{Document, NodeId, ParseError};
use bramble_html::{LoadSettings, load_file, load_reader, parse_str_with};
use bramble_xpath::{materialize, select_nodes};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Bramble: a permissive HTML parser with XPath queries
#[derive(Parser, Debug)]
#[command(name = "bramble")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Re-serialize a file
    bramble ./index.html

    # Show the node tree and any parse errors
    bramble --tree --errors ./index.html

    # Query inline HTML
    bramble --html '<ul><li>a</li><li>b</li></ul>' --xpath 'count(//li)'

    # Read a Shift_JIS page from stdin as JSON
    bramble --encoding shift_jis --json - < page.html
"#)]
struct Cli {
    /// Path to an HTML file, or `-` for standard input
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Encoding to start decoding with (WHATWG label)
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Do not reparse when the document declares a different encoding
    #[arg(long)]
    no_restart: bool,

    /// XPath expression to evaluate; may be repeated
    #[arg(short = 'x', long, value_name = "EXPR")]
    xpath: Vec<String>,

    /// Print recorded parse errors
    #[arg(long)]
    errors: bool,

    /// Print everything as one JSON object
    #[arg(long)]
    json: bool,

    /// Print the node tree instead of markup
    #[arg(short, long)]
    tree: bool,

    /// Write markup as XHTML
    #[arg(long)]
    xhtml: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    quiet: bool,
}

/// Results of one `--xpath` expression.
#[derive(Debug, Serialize)]
struct QueryReport {
    expression: String,
    results: Vec<String>,
}

/// Everything `--json` prints.
#[derive(Debug, Serialize)]
struct Report<'a> {
    encoding: Option<&'static str>,
    declared_encoding: Option<&'static str>,
    restarted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<String>,
    errors: &'a [ParseError],
    queries: &'a [QueryReport],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_quiet(cli.quiet);

    let mut doc = load_doc(&cli)?;
    let queries = run_queries(&mut doc, &cli.xpath)?;

    if cli.json {
        let show_markup = queries.is_empty() && !cli.tree;
        let report = Report {
            encoding: doc.stream_encoding(),
            declared_encoding: doc.declared_encoding(),
            restarted: doc.was_restarted(),
            html: show_markup.then(|| doc.outer_html(NodeId::ROOT)),
            tree: cli.tree.then(|| doc.tree_string(doc.root())),
            errors: if cli.errors { doc.errors() } else { &[] },
            queries: &queries,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if cli.tree {
        print!("{}", doc.tree_string(doc.root()));
    } else if queries.is_empty() {
        println!("{}", doc.to_html());
    }

    for query in &queries {
        print_query(query);
    }

    if cli.errors {
        print_errors(&doc);
    }

    Ok(())
}

/// Load the document named on the command line.
fn load_doc(cli: &Cli) -> Result<Document> {
    let mut settings = LoadSettings::new()
        .with_restart_on_encoding_detect(!cli.no_restart)
        .with_xhtml(cli.xhtml);
    if let Some(label) = &cli.encoding {
        settings = settings.with_encoding_label(label)?;
    }

    if let Some(html) = &cli.html {
        return Ok(parse_str_with(html, &settings));
    }
    let Some(path) = &cli.path else {
        bail!("nothing to parse: give a FILE, `-` for stdin, or --html");
    };
    if path.as_os_str() == "-" {
        return load_reader(io::stdin().lock(), &settings).context("failed to read stdin");
    }
    load_file(path, &settings).with_context(|| format!("failed to load {}", path.display()))
}

/// Evaluate each expression at the document root. Attribute values,
/// namespace URIs and scalar results are materialized as text leaves.
fn run_queries(doc: &mut Document, expressions: &[String]) -> Result<Vec<QueryReport>> {
    expressions
        .iter()
        .map(|expression| {
            let found = select_nodes(doc, doc.root(), expression)
                .with_context(|| format!("XPath `{expression}` failed"))?;
            let results = materialize(doc, &found)
                .into_iter()
                .map(|id| doc.outer_html(id).to_string())
                .collect();
            Ok(QueryReport {
                expression: expression.clone(),
                results,
            })
        })
        .collect()
}

fn print_query(query: &QueryReport) {
    println!(
        "{} {}",
        format!("=== {} ===", query.expression).cyan().bold(),
        format!("({} result(s))", query.results.len()).dimmed()
    );
    for result in &query.results {
        println!("{result}");
    }
}

fn print_errors(doc: &Document) {
    let errors = doc.errors();
    if errors.is_empty() {
        println!("{}", "No parse errors".green());
        return;
    }
    println!("{}", format!("=== {} parse error(s) ===", errors.len()).red().bold());
    for error in errors {
        println!(
            "  {}:{} {} {}",
            error.position.line,
            error.position.column,
            error.kind.yellow(),
            error.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bramble_html::parse_str;

    #[test]
    fn test_scalar_query_is_materialized() {
        let mut doc = parse_str("<ul><li>a</li><li>b</li></ul>");
        let reports = run_queries(&mut doc, &["count(//li)".to_string()]).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].results, vec!["2"]);
    }

    #[test]
    fn test_node_and_attribute_queries() {
        let mut doc = parse_str(r#"<p><a href="/x">link</a></p>"#);
        let reports = run_queries(
            &mut doc,
            &["//a".to_string(), "//a/@href".to_string()],
        )
        .unwrap();
        assert_eq!(reports[0].results, vec![r#"<a href="/x">link</a>"#]);
        assert_eq!(reports[1].results, vec!["/x"]);
    }

    #[test]
    fn test_bad_query_is_an_error() {
        let mut doc = parse_str("<p/>");
        assert!(run_queries(&mut doc, &["//p[".to_string()]).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let doc = parse_str("<p>x");
        let report = Report {
            encoding: doc.stream_encoding(),
            declared_encoding: None,
            restarted: false,
            html: Some(doc.outer_html(NodeId::ROOT)),
            tree: None,
            errors: doc.errors(),
            queries: &[],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["html"], "<p>x");
        assert!(json.get("tree").is_none());
        assert_eq!(json["queries"], serde_json::json!([]));
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "bramble", "--html", "<p>", "-x", "//p", "--xpath", "count(//p)", "--errors",
        ])
        .unwrap();
        assert_eq!(cli.xpath.len(), 2);
        assert!(cli.errors);
        assert!(Cli::try_parse_from(["bramble", "file.html", "--html", "<p>"]).is_err());
    }
}
