//! Parsing of document fragments into text and directive segments.
//!
//! A fragment is one source file. Directives look like:
//!
//! ```text
//! .. item:: Title of the Requirement
//!    :id: REQ-001
//!    :satisfies: STK-001, STK-002
//!
//!    Description of the requirement.
//! ```
//!
//! Everything that is not part of an `item`, `graphic` or `listing`
//! directive is kept as plain text. The bodies of items and graphics are
//! parsed again, so directives may nest; listing bodies are literal code.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::domain::{BlockKind, DeclaredOptions};

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)\.\.\s+(item|graphic|listing)::(?:\s+(.*))?$")
        .expect("directive pattern is valid")
});

const BOM: char = '\u{feff}';

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+:([A-Za-z0-9_-]+):(?:\s+(.*))?$").expect("option pattern is valid")
});

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    path: PathBuf,
    segments: Vec<Segment>,
}

/// A piece of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any directive.
    Text(String),
    /// An `item`, `graphic` or `listing` directive.
    Directive(Directive),
}

/// A directive as written in the source, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Which directive this is.
    pub kind: BlockKind,
    /// The argument after `::`, used as the title.
    pub argument: Option<String>,
    /// The `:name: value` options, in declaration order.
    pub options: DeclaredOptions,
    /// The dedented content lines.
    pub content: Vec<String>,
    /// The content parsed as nested segments. Empty for listings.
    pub body: Vec<Segment>,
    /// The 1-based line of the directive header.
    pub line: usize,
}

impl Directive {
    /// A non-empty, trimmed option value.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// The content lines joined with newlines.
    #[must_use]
    pub fn content_text(&self) -> String {
        self.content.join("\n")
    }

    /// Whether the body contains nested directives.
    #[must_use]
    pub fn has_nested_directives(&self) -> bool {
        self.body
            .iter()
            .any(|segment| matches!(segment, Segment::Directive(_)))
    }
}

impl Fragment {
    /// Parses a fragment from its source text.
    ///
    /// `path` is only recorded; nothing is read from disk.
    /// A leading byte order mark is ignored.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let path = path.into();
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let segments = parse_segments(text, 0);
        tracing::trace!(
            path = %path.display(),
            segments = segments.len(),
            "parsed fragment"
        );
        Self { path, segments }
    }

    /// The fragment's path, relative to the corpus root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The fragment's segments, in document order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The directives in this fragment, in document order.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Directive(directive) => Some(directive),
            Segment::Text(_) => None,
        })
    }
}

/// Splits text into segments. `line_offset` is the number of source lines
/// before `text`, so nested directives report their line in the file.
fn parse_segments(text: &str, line_offset: usize) -> Vec<Segment> {
    let lines: Vec<&str> = text.lines().collect();
    let mut segments = Vec::new();
    let mut pending_text: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(header) = DIRECTIVE.captures(lines[i]) else {
            pending_text.push(lines[i]);
            i += 1;
            continue;
        };
        let Some(kind) = BlockKind::from_directive(&header[2]) else {
            pending_text.push(lines[i]);
            i += 1;
            continue;
        };

        flush_text(&mut segments, &mut pending_text);

        let indent = indentation(&header[1]);
        let argument = header
            .get(3)
            .map(|m| m.as_str().trim())
            .filter(|arg| !arg.is_empty())
            .map(String::from);
        let line = line_offset + i + 1;
        i += 1;

        let (options, next) = parse_options(&lines, i, indent);
        i = next;

        let content_start = i;
        while i < lines.len() && (is_blank(lines[i]) || indentation(lines[i]) > indent) {
            i += 1;
        }
        // Trailing blank lines belong to the surrounding text.
        while i > content_start && is_blank(lines[i - 1]) {
            i -= 1;
        }

        let content_lines = &lines[content_start..i];
        let content = dedent(content_lines);
        let body = if kind == BlockKind::Listing {
            Vec::new()
        } else {
            let leading_blank = content_lines
                .iter()
                .take_while(|line| is_blank(line))
                .count();
            parse_segments(&content.join("\n"), line_offset + content_start + leading_blank)
        };

        segments.push(Segment::Directive(Directive {
            kind,
            argument,
            options,
            content,
            body,
            line,
        }));
    }

    flush_text(&mut segments, &mut pending_text);
    segments
}

/// Reads the option block that starts at `start`.
///
/// Returns the options and the index of the first line after them.
fn parse_options(lines: &[&str], start: usize, indent: usize) -> (DeclaredOptions, usize) {
    let mut options = DeclaredOptions::new();
    let mut last_key: Option<String> = None;
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) || indentation(line) <= indent {
            break;
        }

        if let Some(option) = OPTION.captures(line) {
            let key = option[1].to_string();
            let value = option.get(2).map_or("", |m| m.as_str()).trim().to_string();
            options.insert(key.clone(), value);
            last_key = Some(key);
        } else if let Some(key) = &last_key {
            // continuation of a multi-line option value
            if let Some(value) = options.get_mut(key) {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
            }
        } else {
            break;
        }
        i += 1;
    }

    (options, i)
}

fn flush_text(segments: &mut Vec<Segment>, pending: &mut Vec<&str>) {
    if pending.iter().any(|line| !is_blank(line)) {
        segments.push(Segment::Text(pending.join("\n")));
    }
    pending.clear();
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn dedent(lines: &[&str]) -> Vec<String> {
    let first = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let lines = &lines[first..];

    let common = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indentation(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            line.char_indices()
                .nth(common)
                .map_or_else(String::new, |(offset, _)| line[offset..].to_string())
        })
        .collect()
}
