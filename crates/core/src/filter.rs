//! Include/exclude glob filtering
//!
//! Patterns are evaluated against the relative path of an item, never the
//! full source or target, so a filter makes the same decision for uploads,
//! downloads, copies and deletes.
//!
//! # Pattern Syntax
//!
//! - `*` matches any run of characters within one path segment
//! - `**` matches any run of characters across segments
//! - `?` matches one character other than `/`
//! - `[abc]`, `[a-z]` and `[!abc]` match one character from (or not from) a set
//! - `{zip,tar}` matches any of the comma separated alternatives
//! - `\` escapes the following character

use regex::Regex;

use crate::error::{Error, Result};

/// Raw include/exclude patterns as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Only items matching this pattern are accepted
    pub include: Option<String>,

    /// Items matching this pattern are rejected
    pub exclude: Option<String>,
}

impl FilterSpec {
    pub fn new(include: Option<String>, exclude: Option<String>) -> Self {
        Self { include, exclude }
    }

    /// Compile both patterns, failing on the first invalid one
    pub fn compile(&self) -> Result<GlobFilter> {
        GlobFilter::new(self.include.as_deref(), self.exclude.as_deref())
    }
}

/// A single compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern. Surrounding whitespace is ignored.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        let invalid = |reason: String| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let source = glob_to_regex(pattern).map_err(|reason| invalid(reason.to_string()))?;
        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Check whether the whole path matches
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Get the original (trimmed) pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Compiled include/exclude filter
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    include: Option<GlobPattern>,
    exclude: Option<GlobPattern>,
}

impl GlobFilter {
    /// Build a filter. Absent or blank patterns place no constraint.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: compile_optional(include)?,
            exclude: compile_optional(exclude)?,
        })
    }

    /// A filter that accepts everything
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Decide whether a relative path passes the filter.
    ///
    /// The include pattern is checked first; a path it rejects is never
    /// tested against the exclude pattern.
    pub fn accepts(&self, relative: &str) -> bool {
        if let Some(include) = &self.include
            && !include.matches(relative)
        {
            return false;
        }

        if let Some(exclude) = &self.exclude
            && exclude.matches(relative)
        {
            return false;
        }

        true
    }

    /// Whether neither pattern is set
    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn include(&self) -> Option<&str> {
        self.include.as_ref().map(GlobPattern::as_str)
    }

    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_ref().map(GlobPattern::as_str)
    }
}

fn compile_optional(pattern: Option<&str>) -> Result<Option<GlobPattern>> {
    match pattern {
        Some(p) if !p.trim().is_empty() => GlobPattern::new(p).map(Some),
        _ => Ok(None),
    }
}

/// Translate a glob into an anchored regular expression
fn glob_to_regex(glob: &str) -> std::result::Result<String, &'static str> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    let mut in_group = false;
    let mut i = 0;

    out.push('^');

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        match c {
            '\\' => {
                let next = *chars.get(i).ok_or("no character to escape")?;
                i += 1;
                push_literal(&mut out, next);
            }
            '/' => out.push('/'),
            '[' => {
                let mut class = String::from("[");
                match chars.get(i) {
                    Some('!') => {
                        class.push_str("^/");
                        i += 1;
                    }
                    Some('^') => {
                        class.push_str("\\^");
                        i += 1;
                    }
                    _ => {}
                }

                let body_start = class.len();
                let mut closed = false;
                while i < chars.len() {
                    let c = chars[i];
                    i += 1;
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '/' => return Err("explicit path separator in character class"),
                        '\\' | '[' | '&' | '~' | '^' => {
                            class.push('\\');
                            class.push(c);
                        }
                        _ => class.push(c),
                    }
                }

                if !closed {
                    return Err("missing ']'");
                }
                if class.len() == body_start && !class.ends_with("^/") {
                    return Err("empty character class");
                }
                class.push(']');
                out.push_str(&class);
            }
            '{' => {
                if in_group {
                    return Err("cannot nest groups");
                }
                out.push_str("(?:(?:");
                in_group = true;
            }
            '}' if in_group => {
                out.push_str("))");
                in_group = false;
            }
            ',' if in_group => out.push_str(")|(?:"),
            '*' => {
                if chars.get(i) == Some(&'*') {
                    out.push_str(".*");
                    i += 1;
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            _ => push_literal(&mut out, c),
        }
    }

    if in_group {
        return Err("missing '}'");
    }

    out.push('$');
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
