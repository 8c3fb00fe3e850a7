//! Route path patterns.
//!
//! Syntax, per `/`-separated segment:
//! - `users`: literal
//! - `{id}` or `:id`: one segment, captured as `id`
//! - `{*rest}`: the remainder of the path, possibly empty, captured as `rest`
//! - `*`: the remainder of the path, captured as `*`

use regex::Regex;

use crate::error::{EngineError, Result};
use crate::request::PathParams;

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

impl PathSegment {
    fn parse(part: &str, pattern: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidPattern(pattern.to_string());

        if part == "*" {
            return Ok(Self::Wildcard("*".to_string()));
        }
        if let Some(name) = part.strip_prefix(':') {
            return if name.is_empty() {
                Err(invalid())
            } else {
                Ok(Self::Param(name.to_string()))
            };
        }
        let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
            return Ok(Self::Literal(part.to_string()));
        };
        match inner.strip_prefix('*') {
            Some("") => Err(invalid()),
            Some(name) => Ok(Self::Wildcard(name.to_string())),
            None if inner.is_empty() => Err(invalid()),
            None => Ok(Self::Param(inner.to_string())),
        }
    }

    /// The capture name, for segments that capture.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) | Self::Wildcard(name) => Some(name.as_str()),
        }
    }

    fn push_regex(&self, out: &mut String) {
        match self {
            Self::Literal(text) => out.push_str(&regex::escape(text)),
            Self::Param(_) => out.push_str("([^/]+)"),
            Self::Wildcard(_) => out.push_str("(.*)"),
        }
    }
}

/// Knobs that change how a pattern matches, taken from the engine config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// `/Users` and `/users` are different routes.
    pub case_sensitive: bool,
    /// `/users` and `/users/` are different routes.
    pub strict: bool,
}

/// A compiled route path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    segments: Vec<PathSegment>,
    regex: Regex,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// ```
    /// use burrow_http::{MatchOptions, PathPattern};
    ///
    /// let pattern = PathPattern::new("/posts/{id}", MatchOptions::default()).unwrap();
    /// let params = pattern.match_path("/posts/123").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// ```
    pub fn new(pattern: &str, options: MatchOptions) -> Result<Self> {
        let segments = pattern
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| PathSegment::parse(part, pattern))
            .collect::<Result<Vec<_>>>()?;

        let mut source = String::from(if options.case_sensitive { "^" } else { "(?i)^" });
        // Unless strict, a trailing wildcard also matches the bare parent:
        // `/v1/*` covers `/v1` the way `/v1/` does.
        let open_tail = !options.strict && matches!(segments.last(), Some(PathSegment::Wildcard(_)));
        let body = if open_tail { segments.len() - 1 } else { segments.len() };
        for segment in &segments[..body] {
            source.push('/');
            segment.push_regex(&mut source);
        }
        // Root is always `/`. Otherwise a trailing slash is optional unless
        // strict, where it must match the pattern exactly.
        match (segments.is_empty(), options.strict) {
            _ if open_tail => source.push_str("(?:/(.*))?"),
            (true, _) => source.push('/'),
            (false, true) if pattern.ends_with('/') => source.push('/'),
            (false, true) => {}
            (false, false) => source.push_str("/?"),
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| EngineError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            regex,
        })
    }

    /// Matches `path`, returning the captures. An empty path is `/`.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let path = if path.is_empty() { "/" } else { path };
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();
        let names = self.segments.iter().filter_map(PathSegment::name);
        for (name, value) in names.zip(caps.iter().skip(1)) {
            params.insert(name, value.map_or("", |m| m.as_str()));
        }
        Some(params)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Capture names, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(PathSegment::name)
    }
}

/// Returns true if `path` is `prefix` itself or lies below it.
///
/// Matching is per segment: `/api` covers `/api/users` but not `/apiary`.
pub fn has_path_prefix(path: &str, prefix: &str, case_sensitive: bool) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    if path.len() < prefix.len() || !path.is_char_boundary(prefix.len()) {
        return false;
    }

    let (head, rest) = path.split_at(prefix.len());
    let head_matches = if case_sensitive {
        head == prefix
    } else {
        head.eq_ignore_ascii_case(prefix)
    };
    head_matches && (rest.is_empty() || rest.starts_with('/'))
}
