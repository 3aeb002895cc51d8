//! Recovers records from literal tuples in declaration files.
//!
//! This is a best-effort scrape: a match is attempted at every `(` and
//! anything that does not fit the requested shape is skipped.

use crate::error::SourceIssue;
use crate::lexer::{tokenize, Token};
use crate::models::TaxonomyEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// `(category, "tag", Some("desc") | None, parent)`
    Vocabulary,
    /// `("path", Some("parent") | None, icon, "description")`
    TaxonomyPath,
    /// Any string literal that contains `/`.
    TaxonomyHeuristic,
    /// `("tag", "folder", confidence, "description")`
    MappingTuple,
    /// `("tag", &["folder", ...])`
    MappingArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Tag(String),
    Folder(TaxonomyEntry),
    Mapping {
        tag: String,
        folder: String,
        confidence: Option<i64>,
        description: Option<String>,
        /// Index of the declaring tuple within the file.
        entry: usize,
    },
}

/// Reads `path` and extracts records of `shape`.
///
/// A missing or unreadable file is logged and returned as a [`SourceIssue`];
/// callers treat it as zero records.
pub fn extract_file(path: &Path, shape: Shape) -> Result<Vec<Record>, SourceIssue> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} not found", path.display());
            return Err(SourceIssue::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            return Err(SourceIssue::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    let records = extract(&content, shape);
    debug!(
        "extracted {} {:?} records from {}",
        records.len(),
        shape,
        path.display()
    );
    Ok(records)
}

pub fn extract(text: &str, shape: Shape) -> Vec<Record> {
    let tokens = tokenize(text);
    if shape == Shape::TaxonomyHeuristic {
        return heuristic_paths(&tokens);
    }

    let mut records = Vec::new();
    let mut entries = 0;
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_punct('(') {
            let mut cur = Cursor { tokens: &tokens, pos: i + 1 };
            let matched = match shape {
                Shape::Vocabulary => cur.vocabulary(),
                Shape::TaxonomyPath => cur.taxonomy_path(),
                Shape::MappingTuple => cur.mapping_tuple(),
                Shape::MappingArray => cur.mapping_array(),
                Shape::TaxonomyHeuristic => None,
            };
            if let Some(mut found) = matched {
                for record in &mut found {
                    if let Record::Mapping { entry, .. } = record {
                        *entry = entries;
                    }
                }
                entries += 1;
                records.extend(found);
                i = cur.pos;
                continue;
            }
        }
        i += 1;
    }
    records
}

fn heuristic_paths(tokens: &[Token]) -> Vec<Record> {
    tokens
        .iter()
        .filter_map(Token::as_str)
        .filter(|s| s.contains('/') && !s.starts_with("//"))
        .map(|s| {
            Record::Folder(TaxonomyEntry {
                path: s.to_string(),
                parent: None,
            })
        })
        .collect()
}

/// Position inside a token slice; each matcher starts just after `(`.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn punct(&mut self, c: char) -> Option<()> {
        if self.peek()?.is_punct(c) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        self.punct(c).is_some()
    }

    fn string(&mut self) -> Option<String> {
        let s = self.peek()?.as_str()?.to_string();
        self.pos += 1;
        Some(s)
    }

    fn int(&mut self) -> Option<i64> {
        match self.peek()? {
            Token::Int(n) => {
                self.pos += 1;
                Some(*n)
            }
            _ => None,
        }
    }

    /// `Some("x")` or `None`, optionally followed by a turbofish.
    fn optional_string(&mut self) -> Option<Option<String>> {
        let tok = self.peek()?;
        if tok.is_ident("None") {
            self.pos += 1;
            self.skip_turbofish();
            Some(None)
        } else if tok.is_ident("Some") {
            self.pos += 1;
            self.punct('(')?;
            let value = self.string()?;
            self.punct(')')?;
            Some(Some(value))
        } else {
            None
        }
    }

    fn skip_turbofish(&mut self) {
        let save = self.pos;
        if self.eat_punct(':') && self.eat_punct(':') && self.eat_punct('<') {
            let mut depth = 1;
            while let Some(tok) = self.peek() {
                self.pos += 1;
                if tok.is_punct('<') {
                    depth += 1;
                } else if tok.is_punct('>') {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                } else if tok.is_punct(',') || tok.is_punct(')') {
                    break;
                }
            }
        }
        self.pos = save;
    }

    /// Consumes one non-empty field up to the next `,` or `)` at depth zero.
    fn field(&mut self) -> Option<()> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Punct('(') | Token::Punct('[') | Token::Punct('{') => depth += 1,
                Token::Punct(')') | Token::Punct(']') | Token::Punct('}') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Token::Punct(',') if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        if self.pos > start && self.peek().is_some() {
            Some(())
        } else {
            None
        }
    }

    /// Optional trailing comma, then `)`.
    fn close(&mut self) -> Option<()> {
        self.eat_punct(',');
        self.punct(')')
    }

    fn vocabulary(&mut self) -> Option<Vec<Record>> {
        let _category = self.string()?;
        self.punct(',')?;
        let tag = self.string()?;
        self.punct(',')?;
        let _description = self.optional_string()?;
        self.punct(',')?;
        self.field()?;
        self.close()?;
        Some(vec![Record::Tag(tag)])
    }

    fn taxonomy_path(&mut self) -> Option<Vec<Record>> {
        let path = self.string()?;
        self.punct(',')?;
        let parent = self.optional_string()?;
        self.punct(',')?;
        self.field()?;
        self.punct(',')?;
        let _description = self.string()?;
        self.close()?;
        Some(vec![Record::Folder(TaxonomyEntry { path, parent })])
    }

    fn mapping_tuple(&mut self) -> Option<Vec<Record>> {
        let tag = self.string()?;
        self.punct(',')?;
        let folder = self.string()?;
        self.punct(',')?;
        let confidence = self.int()?;
        self.punct(',')?;
        let description = self.string()?;
        self.close()?;
        Some(vec![Record::Mapping {
            tag,
            folder,
            confidence: Some(confidence),
            description: Some(description),
            entry: 0,
        }])
    }

    fn mapping_array(&mut self) -> Option<Vec<Record>> {
        let tag = self.string()?;
        self.punct(',')?;
        self.eat_punct('&');
        self.punct('[')?;
        let mut folders = Vec::new();
        loop {
            if self.eat_punct(']') {
                break;
            }
            folders.push(self.string()?);
            if !self.eat_punct(',') {
                self.punct(']')?;
                break;
            }
        }
        self.close()?;
        if folders.is_empty() {
            return None;
        }
        Some(
            folders
                .into_iter()
                .map(|folder| Record::Mapping {
                    tag: tag.clone(),
                    folder,
                    confidence: None,
                    description: None,
                    entry: 0,
                })
                .collect(),
        )
    }
}
