//! Docblock comment parser.
//!
//! Turns a raw `/** ... */` block into a summary, a long description, and a
//! list of tags (`@param`, `@return`, `@throws`, ...). Parsing never fails:
//! an empty, absent, or malformed block yields an empty [`DocBlock`], so a
//! class with no documentation still produces a valid model.

use regex::Regex;
use std::sync::LazyLock;

static RE_WS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Leading whitespace, an optional `*`, and at most one following space.
static RE_LINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*\*?[ \t]?").unwrap());

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_-]*)[ \t]*(.*)$").unwrap());

/// A parsed docblock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// First paragraph of the text section, untrimmed of inner newlines.
    pub summary: String,
    /// Remaining paragraphs, blank-line separated.
    pub description: String,
    tags: Vec<Tag>,
}

/// One `@tag` entry with its parsed payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// First payload token for typed tags, empty when absent.
    pub type_name: String,
    /// Variable name without the `$` sigil (`@param` only).
    pub variable: Option<String>,
    pub description: String,
}

impl DocBlock {
    /// Parse raw docblock text. Accepts blocks with or without the
    /// `/** ... */` delimiters and tolerates any malformed input.
    pub fn parse(raw: &str) -> DocBlock {
        let body = strip_delimiters(raw);

        let mut text_lines: Vec<String> = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();
        let mut in_tags = false;

        for line in body.lines() {
            let line = RE_LINE_PREFIX.replace(line, "").trim_end().to_string();

            if let Some(caps) = RE_TAG.captures(&line) {
                in_tags = true;
                tags.push(parse_tag(&caps[1], &caps[2]));
                continue;
            }

            if in_tags {
                // Continuation line of the previous tag's description.
                let continuation = line.trim();
                if let Some(tag) = tags.last_mut() {
                    if !continuation.is_empty() {
                        if !tag.description.is_empty() {
                            tag.description.push('\n');
                        }
                        tag.description.push_str(continuation);
                    }
                }
                continue;
            }

            text_lines.push(line);
        }

        let (summary, description) = split_text(&text_lines);

        DocBlock {
            summary,
            description,
            tags,
        }
    }

    /// All tags with the given name, in source order.
    pub fn tags_by_name(&self, name: &str) -> Vec<&Tag> {
        self.tags.iter().filter(|t| t.name == name).collect()
    }

    /// Whether the block carries a usable summary.
    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

/// Collapse every whitespace run (spaces, tabs, newlines) to one space.
/// Idempotent, so derived single-line fields can be re-collapsed safely.
pub fn to_single_line(text: &str) -> String {
    RE_WS_RUN.replace_all(text, " ").to_string()
}

fn strip_delimiters(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("/**").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("/*").unwrap_or(trimmed);
    trimmed.strip_suffix("*/").unwrap_or(trimmed)
}

/// Split the text section into the summary paragraph and the rest.
fn split_text(lines: &[String]) -> (String, String) {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let mut iter = paragraphs.into_iter();
    let summary = iter.next().map(|p| p.join("\n")).unwrap_or_default();
    let description = iter.map(|p| p.join("\n")).collect::<Vec<_>>().join("\n\n");

    (summary, description)
}

fn parse_tag(name: &str, payload: &str) -> Tag {
    let mut tag = Tag {
        name: name.to_string(),
        ..Default::default()
    };

    let mut tokens = payload.split_whitespace().peekable();

    if name == "param" {
        // `@param type $var desc`, `@param $var desc`, or `@param type`.
        if let Some(&first) = tokens.peek() {
            if is_variable_token(first) {
                tag.variable = Some(variable_name(first));
                tokens.next();
            } else {
                tag.type_name = first.to_string();
                tokens.next();
                if let Some(&second) = tokens.peek() {
                    if is_variable_token(second) {
                        tag.variable = Some(variable_name(second));
                        tokens.next();
                    }
                }
            }
        }
    } else if let Some(&first) = tokens.peek() {
        tag.type_name = first.to_string();
        tokens.next();
    }

    tag.description = tokens.collect::<Vec<_>>().join(" ");
    tag
}

fn is_variable_token(token: &str) -> bool {
    token
        .trim_start_matches("...")
        .trim_start_matches('&')
        .starts_with('$')
}

fn variable_name(token: &str) -> String {
    token
        .trim_start_matches("...")
        .trim_start_matches('&')
        .trim_start_matches('$')
        .trim_end_matches(',')
        .to_string()
}
