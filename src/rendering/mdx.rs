//! Structural validation of MDX sources.
//!
//! Markdown itself never fails to parse, so this pass is where malformed
//! MDX is caught: JSX component tags (capitalized names) must nest and
//! close, and `{...}` expressions must balance. Code and math, as the
//! Markdown parser sees them, are blanked out before scanning; `\{`,
//! `\}` and `\<` are literal text.

use std::ops::Range;

use pulldown_cmark::{Event, Parser, Tag};

use crate::error::AppError;
use crate::rendering::markdown::parser_options;

/// Check that `source` is structurally valid MDX.
pub fn validate(source: &str) -> Result<(), AppError> {
    let masked = mask_verbatim(source);
    Scanner::new(&masked).run()
}

/// Byte ranges of code blocks, code spans and math, delimiters included.
fn verbatim_ranges(source: &str) -> Vec<Range<usize>> {
    Parser::new_ext(source, parser_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_))
            | Event::Code(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// Replace verbatim ranges with spaces, keeping every newline so line
/// numbers stay accurate.
fn mask_verbatim(source: &str) -> String {
    let mut bytes = source.as_bytes().to_vec();
    for range in verbatim_ranges(source) {
        for b in &mut bytes[range] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    // Ranges fall on char boundaries, so only whole characters were replaced.
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

struct OpenTag {
    name: String,
    line: usize,
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tags: Vec<OpenTag>,
    /// Lines of the currently open `{`.
    braces: Vec<usize>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            tags: Vec::new(),
            braces: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<(), AppError> {
        while let Some(c) = self.peek(0) {
            match c {
                '\\' if matches!(self.peek(1), Some('{' | '}' | '<')) => {
                    self.bump();
                    self.bump();
                }
                '<' if self.peek(1).is_some_and(|n| n.is_ascii_uppercase()) => {
                    self.bump();
                    self.open_tag()?;
                }
                '<' if self.peek(1) == Some('/')
                    && self.peek(2).is_some_and(|n| n.is_ascii_uppercase()) =>
                {
                    self.bump();
                    self.bump();
                    self.close_tag()?;
                }
                '{' => {
                    self.braces.push(self.line);
                    self.bump();
                }
                '}' => {
                    if self.braces.pop().is_none() {
                        return Err(AppError::compile_at(self.line, "Unexpected closing brace '}'"));
                    }
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }

        if let Some(tag) = self.tags.pop() {
            return Err(AppError::compile_at(
                tag.line,
                format!("Expected a closing tag for <{}>", tag.name),
            ));
        }
        if let Some(line) = self.braces.pop() {
            return Err(AppError::compile_at(line, "Unclosed expression, expected '}'"));
        }
        Ok(())
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    /// Consume attributes up to the closing `>`; returns whether the tag
    /// self-closes.
    fn skip_attributes(&mut self, name: &str, line: usize) -> Result<bool, AppError> {
        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        let mut prev = ' ';

        while let Some(c) = self.bump() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') if depth == 0 => quote = Some(c),
                (None, '{') => depth += 1,
                (None, '}') => depth = depth.saturating_sub(1),
                (None, '>') if depth == 0 => return Ok(prev == '/'),
                _ => {}
            }
            if !c.is_whitespace() {
                prev = c;
            }
        }

        Err(AppError::compile_at(line, format!("Unterminated tag <{name}")))
    }

    fn open_tag(&mut self) -> Result<(), AppError> {
        let line = self.line;
        let name = self.read_name();
        let self_closing = self.skip_attributes(&name, line)?;
        if !self_closing {
            self.tags.push(OpenTag { name, line });
        }
        Ok(())
    }

    fn close_tag(&mut self) -> Result<(), AppError> {
        let line = self.line;
        let name = self.read_name();
        while let Some(c) = self.peek(0) {
            if c == '>' {
                break;
            }
            if !c.is_whitespace() {
                return Err(AppError::compile_at(
                    line,
                    format!("Unexpected character '{c}' in closing tag </{name}>"),
                ));
            }
            self.bump();
        }
        if self.bump().is_none() {
            return Err(AppError::compile_at(line, format!("Unterminated tag </{name}")));
        }

        match self.tags.pop() {
            Some(open) if open.name == name => Ok(()),
            Some(open) => Err(AppError::compile_at(
                line,
                format!(
                    "Expected a closing tag for <{}> (line {}) before </{}>",
                    open.name, open.line, name
                ),
            )),
            None => Err(AppError::compile_at(
                line,
                format!("Unexpected closing tag </{name}>"),
            )),
        }
    }
}
