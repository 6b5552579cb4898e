//
//  bitbucket-scm-client
//  api/template.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # URI Template Expansion
//!
//! A small RFC 6570 style expander used to build every Bitbucket Server request
//! path. Templates are parsed once into literal and expression parts, variables
//! are bound with [`UriTemplate::set`], and [`UriTemplate::expand`] renders the
//! final path.
//!
//! ## Supported Expressions
//!
//! | Form | Meaning | Missing variable |
//! |------|---------|------------------|
//! | `{var}` | Simple string, percent-encoded | Error |
//! | `{+var}` | Reserved characters kept as-is | Error |
//! | `{/var}` `{/var*}` | Path segments, each encoded, joined by `/` | Omitted |
//! | `{?a,b}` | Query parameters (`?a=..&b=..`) | Omitted |
//! | `{&a}` | Query continuation (`&a=..`) | Omitted |
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_scm_client::api::template::{TemplateValue, UriTemplate};
//!
//! let path = UriTemplate::parse("/rest/api/1.0/projects/{owner}/repos/{repo}/browse{/path*}{?at}")?
//!     .set("owner", "test")
//!     .set("repo", "test")
//!     .set("path", TemplateValue::path("folder/Jenkinsfile"))
//!     .set("at", "fix/test")
//!     .expand()?;
//!
//! assert_eq!(path, "/rest/api/1.0/projects/test/repos/test/browse/folder/Jenkinsfile?at=fix%2Ftest");
//! # Ok::<(), bitbucket_scm_client::api::template::TemplateError>(())
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while parsing or expanding a [`UriTemplate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening brace has no matching closing brace.
    #[error("Unterminated template expression at offset {0}")]
    Unterminated(usize),

    /// A closing brace appeared outside an expression.
    #[error("Unexpected '}}' at offset {0}")]
    UnexpectedClose(usize),

    /// An expression contained no variables, e.g. `{}` or `{?}`.
    #[error("Empty template expression at offset {0}")]
    EmptyExpression(usize),

    /// The expression operator is valid RFC 6570 but not used by this client.
    #[error("Unsupported template operator '{0}'")]
    UnsupportedOperator(char),

    /// A variable specification is malformed.
    #[error("Invalid template variable '{0}'")]
    InvalidVariable(String),

    /// A variable required by a simple or reserved expression was not bound.
    #[error("Missing required template variable '{0}'")]
    MissingVariable(String),
}

/// A value bound to a template variable.
///
/// Scalars expand to a single encoded string. Lists expand to one encoded item
/// per element; with the explode modifier (`{/path*}`) the items are joined by
/// the operator's separator, otherwise by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// A single string value.
    Scalar(String),
    /// An ordered list of values, e.g. path segments.
    List(Vec<String>),
}

impl TemplateValue {
    /// Splits a slash separated path into a list of segments.
    ///
    /// Empty segments (leading, trailing or doubled slashes) are dropped, so
    /// `"/folder//Jenkinsfile"` becomes `["folder", "Jenkinsfile"]`.
    pub fn path(path: &str) -> Self {
        Self::List(
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Empty lists count as undefined, per RFC 6570.
    fn is_defined(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&String> for TemplateValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

impl From<u32> for TemplateValue {
    fn from(value: u32) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for TemplateValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for TemplateValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TemplateValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Path,
    Query,
    QueryContinuation,
}

impl Operator {
    fn prefix(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Path => "/",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => ",",
            Self::Path => "/",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn named(self) -> bool {
        matches!(self, Self::Query | Self::QueryContinuation)
    }

    fn required(self) -> bool {
        matches!(self, Self::Simple | Self::Reserved)
    }
}

#[derive(Debug, Clone)]
struct VarSpec {
    name: String,
    explode: bool,
}

#[derive(Debug, Clone)]
enum Part {
    Literal(String),
    Expression {
        operator: Operator,
        variables: Vec<VarSpec>,
    },
}

/// A parsed URI template with its bound variables.
///
/// Build one per request: parse, bind, expand.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    parts: Vec<Part>,
    values: HashMap<String, TemplateValue>,
}

impl UriTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for unbalanced braces, empty expressions,
    /// malformed variable names, or operators this client does not support
    /// (`#`, `.`, `;` and the reserved operator characters).
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut pos = 0;

        while pos < template.len() {
            let rest = &template[pos..];
            let Some(i) = rest.find(|c: char| c == '{' || c == '}') else {
                parts.push(Part::Literal(rest.to_string()));
                break;
            };

            if i > 0 {
                parts.push(Part::Literal(rest[..i].to_string()));
            }

            let at = pos + i;
            if rest[i..].starts_with('}') {
                return Err(TemplateError::UnexpectedClose(at));
            }

            let body_rest = &rest[i + 1..];
            let close = body_rest
                .find('}')
                .ok_or(TemplateError::Unterminated(at))?;
            let body = &body_rest[..close];
            if body.contains('{') {
                return Err(TemplateError::Unterminated(at));
            }

            parts.push(parse_expression(body, at)?);
            pos = at + close + 2;
        }

        Ok(Self {
            parts,
            values: HashMap::new(),
        })
    }

    /// Binds a variable, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Binds a variable only when a value is present.
    pub fn set_opt<V: Into<TemplateValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Renders the template with the bound variables.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] when a `{var}` or `{+var}`
    /// expression references an unbound variable. Unbound variables in path
    /// and query expressions are left out of the output entirely.
    pub fn expand(&self) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression {
                    operator,
                    variables,
                } => self.expand_expression(*operator, variables, &mut out)?,
            }
        }
        Ok(out)
    }

    fn expand_expression(
        &self,
        operator: Operator,
        variables: &[VarSpec],
        out: &mut String,
    ) -> Result<(), TemplateError> {
        let mut first = true;

        for var in variables {
            let value = match self.values.get(&var.name).filter(|v| v.is_defined()) {
                Some(value) => value,
                None if operator.required() => {
                    return Err(TemplateError::MissingVariable(var.name.clone()))
                }
                None => continue,
            };

            out.push_str(if first {
                operator.prefix()
            } else {
                operator.separator()
            });
            first = false;

            match value {
                TemplateValue::Scalar(s) => {
                    push_name(out, operator, &var.name);
                    out.push_str(&encode(s, operator));
                }
                TemplateValue::List(items) if var.explode => {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(operator.separator());
                        }
                        push_name(out, operator, &var.name);
                        out.push_str(&encode(item, operator));
                    }
                }
                TemplateValue::List(items) => {
                    push_name(out, operator, &var.name);
                    let joined = items
                        .iter()
                        .map(|item| encode(item, operator))
                        .collect::<Vec<_>>()
                        .join(",");
                    out.push_str(&joined);
                }
            }
        }

        Ok(())
    }
}

fn parse_expression(body: &str, at: usize) -> Result<Part, TemplateError> {
    let (operator, list) = match body.chars().next() {
        None => return Err(TemplateError::EmptyExpression(at)),
        Some('+') => (Operator::Reserved, &body[1..]),
        Some('/') => (Operator::Path, &body[1..]),
        Some('?') => (Operator::Query, &body[1..]),
        Some('&') => (Operator::QueryContinuation, &body[1..]),
        Some(c @ ('#' | '.' | ';' | '=' | ',' | '!' | '@' | '|')) => {
            return Err(TemplateError::UnsupportedOperator(c))
        }
        Some(_) => (Operator::Simple, body),
    };

    if list.is_empty() {
        return Err(TemplateError::EmptyExpression(at));
    }

    let variables = list
        .split(',')
        .map(|spec| {
            let (name, explode) = match spec.strip_suffix('*') {
                Some(name) => (name, true),
                None => (spec, false),
            };
            if is_valid_name(name) {
                Ok(VarSpec {
                    name: name.to_string(),
                    explode,
                })
            } else {
                Err(TemplateError::InvalidVariable(spec.to_string()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Part::Expression {
        operator,
        variables,
    })
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn push_name(out: &mut String, operator: Operator, name: &str) {
    if operator.named() {
        out.push_str(name);
        out.push('=');
    }
}

fn is_reserved(c: char) -> bool {
    ":/?#[]@!$&'()*+,;=".contains(c)
}

fn encode(value: &str, operator: Operator) -> Cow<'_, str> {
    if operator != Operator::Reserved {
        return urlencoding::encode(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if is_reserved(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSE: &str = "/rest/api/1.0/projects/{owner}/repos/{repo}/browse{/path*}{?at}";

    #[test]
    fn test_browse_folder_with_ref() {
        let expand = UriTemplate::parse(BROWSE)
            .unwrap()
            .set("owner", "test")
            .set("repo", "test")
            .set("path", TemplateValue::path("folder/Jenkinsfile"))
            .set("at", "fix/test")
            .expand()
            .unwrap();
        assert_eq!(
            expand,
            "/rest/api/1.0/projects/test/repos/test/browse/folder/Jenkinsfile?at=fix%2Ftest"
        );
    }

    #[test]
    fn test_browse_file_without_ref() {
        let expand = UriTemplate::parse(BROWSE)
            .unwrap()
            .set("owner", "test")
            .set("repo", "test")
            .set("path", vec!["Jenkinsfile"])
            .expand()
            .unwrap();
        assert_eq!(expand, "/rest/api/1.0/projects/test/repos/test/browse/Jenkinsfile");
    }

    #[test]
    fn test_path_segments_are_encoded_individually() {
        let expand = UriTemplate::parse(BROWSE)
            .unwrap()
            .set("owner", "~jdoe")
            .set("repo", "my repo")
            .set("path", TemplateValue::path("/docs//read me.md"))
            .expand()
            .unwrap();
        assert_eq!(
            expand,
            "/rest/api/1.0/projects/~jdoe/repos/my%20repo/browse/docs/read%20me.md"
        );
    }

    #[test]
    fn test_missing_required_variable() {
        let err = UriTemplate::parse(BROWSE)
            .unwrap()
            .set("owner", "test")
            .expand()
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable("repo".to_string()));
    }

    #[test]
    fn test_empty_path_list_is_omitted() {
        let expand = UriTemplate::parse(BROWSE)
            .unwrap()
            .set("owner", "a")
            .set("repo", "b")
            .set("path", Vec::<String>::new())
            .set_opt("at", None::<&str>)
            .expand()
            .unwrap();
        assert_eq!(expand, "/rest/api/1.0/projects/a/repos/b/browse");
    }

    #[test]
    fn test_query_parameters() {
        let template = UriTemplate::parse("/repos{?start,limit}{&q}").unwrap();
        assert_eq!(template.clone().expand().unwrap(), "/repos");
        assert_eq!(
            template.clone().set("limit", 100u32).expand().unwrap(),
            "/repos?limit=100"
        );
        assert_eq!(
            template
                .set("start", 25u32)
                .set("limit", 100u32)
                .set("q", "a&b")
                .expand()
                .unwrap(),
            "/repos?start=25&limit=100&q=a%26b"
        );
    }

    #[test]
    fn test_list_expansion_modes() {
        let exploded = UriTemplate::parse("/x{?id*}")
            .unwrap()
            .set("id", vec!["1", "2"])
            .expand()
            .unwrap();
        assert_eq!(exploded, "/x?id=1&id=2");

        let joined = UriTemplate::parse("/x{?id}")
            .unwrap()
            .set("id", vec!["1", "2"])
            .expand()
            .unwrap();
        assert_eq!(joined, "/x?id=1,2");
    }

    #[test]
    fn test_reserved_expansion_keeps_slashes() {
        let expand = UriTemplate::parse("{+base}/repos")
            .unwrap()
            .set("base", "http://host/context path")
            .expand()
            .unwrap();
        assert_eq!(expand, "http://host/context%20path/repos");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            UriTemplate::parse("/a/{owner").unwrap_err(),
            TemplateError::Unterminated(3)
        );
        assert_eq!(
            UriTemplate::parse("/a/}").unwrap_err(),
            TemplateError::UnexpectedClose(3)
        );
        assert_eq!(
            UriTemplate::parse("/a{}").unwrap_err(),
            TemplateError::EmptyExpression(2)
        );
        assert_eq!(
            UriTemplate::parse("/a{#frag}").unwrap_err(),
            TemplateError::UnsupportedOperator('#')
        );
        assert_eq!(
            UriTemplate::parse("/a{na-me}").unwrap_err(),
            TemplateError::InvalidVariable("na-me".to_string())
        );
    }
}
