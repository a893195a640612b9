//! Edge-list file parsing

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::graph::{Graph, GraphBuilder};

/// Loads a whitespace-delimited edge-list file into a graph.
pub fn load(path: &Path) -> Result<Graph<String>> {
    log::info!("reading edge list: {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&contents)
}

/// Parses edge-list text: one `src dst` pair per line, `#` starting a
/// comment, blank lines skipped.
///
/// Nodes are created implicitly in first-seen order. Tokens after the first
/// two are ignored (edge data this crate does not use); a line with fewer
/// than two tokens is an error.
pub fn parse(contents: &str) -> Result<Graph<String>> {
    let mut builder = GraphBuilder::new();

    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let (src, dst) = match (tokens.next(), tokens.next()) {
            (Some(src), Some(dst)) => (src, dst),
            _ => bail!("line {}: expected `src dst`, got `{raw}`", lineno + 1),
        };

        builder.add_edge(src.to_string(), dst.to_string());
    }

    let graph = builder.build();
    log::info!(
        "parsed edge list: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs() {
        let graph = parse("a b\nb c\nc a\n").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn skips_comments_and_blanks() {
        let graph = parse("# header\na b\n\nb c # trailing\n").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn ignores_extra_tokens() {
        let graph = parse("a b 1.5\n").unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn rejects_short_line() {
        assert!(parse("a b\nc\n").is_err());
    }

    #[test]
    fn duplicate_lines_collapse() {
        let graph = parse("a b\na b\nb a\n").unwrap();
        assert_eq!(graph.edge_count(), 1);
    }
}
