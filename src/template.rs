//! Placeholder templates for destination paths and textual content.
//!
//! Syntax: `{key}` or `{key.subkey}` interpolates a [`Context`] value;
//! `{{` and `}}` escape literal braces. Templates are parsed once at rule
//! compile time so syntax errors surface as [`ConfigError`]s before any
//! entry is processed; rendering against a concrete context happens per
//! action execution.
//!
//! [`ConfigError`]: crate::error::ConfigError

use crate::context::Context;
use crate::error::TemplateError;

/// One parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(String),
}

/// A parsed, renderable template string.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    /// Parse `source` into a template.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for unbalanced braces or empty
    /// placeholders.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        literal.push('{');
                        continue;
                    }
                    let mut key = String::new();
                    let mut closed = false;
                    for (_, kc) in chars.by_ref() {
                        match kc {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::UnclosedBrace(pos)),
                            _ => key.push(kc),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedBrace(pos));
                    }
                    let key = key.trim().to_string();
                    if key.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder(pos));
                    }
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Placeholder(key));
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnmatchedBrace(pos));
                    }
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    /// The original template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template contains any placeholder.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, Part::Placeholder(_)))
    }

    /// Render the template against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownKey`] when a placeholder is absent
    /// from the context and [`TemplateError::NotRenderable`] when it resolves
    /// to a list or table.
    pub fn render(&self, ctx: &Context) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Placeholder(key) => {
                    let value = ctx
                        .get(key)
                        .ok_or_else(|| TemplateError::UnknownKey(key.clone()))?;
                    let rendered = value
                        .render()
                        .ok_or_else(|| TemplateError::NotRenderable(key.clone()))?;
                    out.push_str(&rendered);
                }
            }
        }
        Ok(out)
    }
}
