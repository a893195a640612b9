//! Minimal GML (Graph Modelling Language) parsing
//!
//! Covers the subset network datasets actually use: `node [ id N
//! label "..." ]` and `edge [ source N target N ]` blocks inside a `graph`
//! block. Other keys are skipped, including nested blocks.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::graph::{Graph, GraphBuilder};

/// Loads a GML file into a graph.
pub fn load(path: &Path) -> Result<Graph<String>> {
    log::info!("reading GML file: {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&contents)
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Open,
    Close,
}

/// Parses GML text. Node keys are labels when present, otherwise the
/// numeric id rendered as a string.
pub fn parse(contents: &str) -> Result<Graph<String>> {
    let tokens = tokenize(contents);

    // First pass over the token stream collects node and edge records.
    let mut nodes: Vec<(i64, Option<String>)> = Vec::new();
    let mut edges: Vec<(i64, i64)> = Vec::new();

    let mut cursor = 0;
    while cursor < tokens.len() {
        match &tokens[cursor] {
            Token::Word(word) if word == "node" => {
                let (fields, next) = block_fields(&tokens, cursor + 1)?;
                let id = match fields.get("id") {
                    Some(Token::Word(id)) => id
                        .parse::<i64>()
                        .with_context(|| format!("bad node id `{id}`"))?,
                    _ => bail!("node block without an id"),
                };
                let label = match fields.get("label") {
                    Some(Token::Str(label)) => Some(label.clone()),
                    Some(Token::Word(label)) => Some(label.clone()),
                    None => None,
                    _ => bail!("node {id}: unreadable label"),
                };
                nodes.push((id, label));
                cursor = next;
            }
            Token::Word(word) if word == "edge" => {
                let (fields, next) = block_fields(&tokens, cursor + 1)?;
                let endpoint = |key: &str| -> Result<i64> {
                    match fields.get(key) {
                        Some(Token::Word(id)) => id
                            .parse::<i64>()
                            .with_context(|| format!("bad edge {key} `{id}`")),
                        _ => bail!("edge block without a {key}"),
                    }
                };
                edges.push((endpoint("source")?, endpoint("target")?));
                cursor = next;
            }
            _ => cursor += 1,
        }
    }

    // Resolve ids to keys, then build.
    let mut keys: HashMap<i64, String> = HashMap::with_capacity(nodes.len());
    let mut builder = GraphBuilder::new();
    for (id, label) in nodes {
        let key = label.unwrap_or_else(|| id.to_string());
        if keys.insert(id, key.clone()).is_some() {
            bail!("duplicate node id {id}");
        }
        builder.get_or_create_node(key);
    }
    for (source, target) in edges {
        let src = keys
            .get(&source)
            .with_context(|| format!("edge references unknown source {source}"))?;
        let dst = keys
            .get(&target)
            .with_context(|| format!("edge references unknown target {target}"))?;
        builder.add_edge(src.clone(), dst.clone());
    }

    let graph = builder.build();
    log::info!(
        "parsed GML: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}

/// Collects the `key value` pairs of one bracketed block, skipping nested
/// blocks, and returns the index just past the closing bracket.
fn block_fields(
    tokens: &[Token],
    mut cursor: usize,
) -> Result<(HashMap<String, Token>, usize)> {
    if tokens.get(cursor) != Some(&Token::Open) {
        bail!("expected `[` to open a block");
    }
    cursor += 1;

    let mut fields = HashMap::new();
    while cursor < tokens.len() {
        match &tokens[cursor] {
            Token::Close => return Ok((fields, cursor + 1)),
            Token::Open => {
                // Nested block under an unknown key: skip to its close.
                let mut depth = 1;
                cursor += 1;
                while cursor < tokens.len() && depth > 0 {
                    match tokens[cursor] {
                        Token::Open => depth += 1,
                        Token::Close => depth -= 1,
                        _ => {}
                    }
                    cursor += 1;
                }
            }
            Token::Word(key) => {
                let value = match tokens.get(cursor + 1) {
                    Some(Token::Word(w)) => Token::Word(w.clone()),
                    Some(Token::Str(s)) => Token::Str(s.clone()),
                    Some(Token::Open) => {
                        // Value is itself a block; record nothing and let
                        // the next loop turn skip it.
                        cursor += 1;
                        continue;
                    }
                    _ => bail!("key `{key}` without a value"),
                };
                fields.insert(key.clone(), value);
                cursor += 2;
            }
            Token::Str(_) => bail!("unexpected string in block position"),
        }
    }

    bail!("unterminated block")
}

fn tokenize(contents: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = contents.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '[' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ']' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    value.push(c);
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                // Comment to end of line.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '[' || c == ']' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
graph [
  comment "made up"
  node [
    id 0
    label "Navy"
  ]
  node [
    id 1
    label "Army"
  ]
  node [
    id 2
  ]
  edge [
    source 0
    target 1
  ]
  edge [
    source 1
    target 2
  ]
]
"#;

    #[test]
    fn parses_nodes_and_edges() {
        let graph = parse(SAMPLE).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains(&"Navy".to_string()));
        assert!(graph.contains(&"Army".to_string()));
        // Unlabeled node falls back to its numeric id.
        assert!(graph.contains(&"2".to_string()));
        assert_eq!(graph.degree(&"Army".to_string()).unwrap(), 2);
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let text = "graph [ node [ id 0 ] edge [ source 0 target 9 ] ]";
        assert!(parse(text).is_err());
    }

    #[test]
    fn rejects_duplicate_id() {
        let text = "graph [ node [ id 0 ] node [ id 0 ] ]";
        assert!(parse(text).is_err());
    }

    #[test]
    fn skips_unknown_keys_and_blocks() {
        let text = r#"
graph [
  directed 0
  node [ id 0 graphics [ x 1.0 y 2.0 ] label "A" ]
  node [ id 1 label "B" ]
  edge [ source 0 target 1 weight 2 ]
]
"#;
        let graph = parse(text).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
