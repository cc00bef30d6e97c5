//! Route pattern module
//!
//! Patterns such as `/user/{user_id}` are parsed once at registration into
//! literal and parameter segments.

use std::borrow::Cow;

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PathPattern {
    /// Parse a pattern; returns a reason string on malformed input
    pub fn parse(raw: &str) -> Result<Self, String> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err("pattern must start with '/'".to_string());
        };
        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err("empty path segment".to_string());
                }
                let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    Some(name) if is_param_name(name) => {
                        if segments
                            .iter()
                            .any(|s| matches!(s, Segment::Param(n) if n == name))
                        {
                            return Err(format!("duplicate parameter '{name}'"));
                        }
                        Segment::Param(name.to_string())
                    }
                    Some(name) => return Err(format!("invalid parameter name '{name}'")),
                    None if part.contains(['{', '}']) => {
                        return Err(format!("unbalanced braces in '{part}'"));
                    }
                    None => Segment::Literal(part.to_string()),
                };
                segments.push(segment);
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the path parameters, in order
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match decoded request segments, capturing parameter values
    pub fn capture(&self, path: &[Cow<'_, str>]) -> Option<Vec<(String, String)>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) if lit == value => {}
                Segment::Param(name) if !value.is_empty() => {
                    params.push((name.clone(), value.to_string()));
                }
                _ => return None,
            }
        }
        Some(params)
    }

    /// Whether every path this pattern matches is already matched by `earlier`
    pub fn is_shadowed_by(&self, earlier: &Self) -> bool {
        self.segments.len() == earlier.segments.len()
            && self
                .segments
                .iter()
                .zip(&earlier.segments)
                .all(|(mine, theirs)| match (mine, theirs) {
                    (_, Segment::Param(_)) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Param(_), Segment::Literal(_)) => false,
                })
    }
}

/// Split a request path into percent-decoded segments
///
/// `/` yields no segments; a trailing slash yields a final empty segment
/// that no pattern matches.
pub fn split_path(path: &str) -> Vec<Cow<'_, str>> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .map(|seg| urlencoding::decode(seg).unwrap_or(Cow::Borrowed(seg)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_and_params() {
        let root = PathPattern::parse("/").unwrap();
        assert!(root.segments().is_empty());

        let p = PathPattern::parse("/items/{item_id}").unwrap();
        assert_eq!(
            p.segments(),
            [
                Segment::Literal("items".to_string()),
                Segment::Param("item_id".to_string())
            ]
        );
        assert_eq!(p.params().collect::<Vec<_>>(), vec!["item_id"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PathPattern::parse("user").is_err());
        assert!(PathPattern::parse("/user//me").is_err());
        assert!(PathPattern::parse("/user/{1d}").is_err());
        assert!(PathPattern::parse("/user/{id").is_err());
        assert!(PathPattern::parse("/a/{id}/{id}").is_err());
    }

    #[test]
    fn test_capture() {
        let p = PathPattern::parse("/friend/{friend_id}").unwrap();
        let params = p.capture(&split_path("/friend/5")).unwrap();
        assert_eq!(params, vec![("friend_id".to_string(), "5".to_string())]);

        assert!(p.capture(&split_path("/friend")).is_none());
        assert!(p.capture(&split_path("/friend/")).is_none());
        assert!(p.capture(&split_path("/friends/5")).is_none());
    }

    #[test]
    fn test_split_path_decodes() {
        let segs = split_path("/user/john%20doe");
        assert_eq!(segs, vec!["user", "john doe"]);
        assert!(split_path("/").is_empty());
    }

    #[test]
    fn test_shadowing() {
        let dynamic = PathPattern::parse("/user/{user_id}").unwrap();
        let fixed = PathPattern::parse("/user/me").unwrap();
        let nested = PathPattern::parse("/user/adult/{age}").unwrap();
        assert!(fixed.is_shadowed_by(&dynamic));
        assert!(!dynamic.is_shadowed_by(&fixed));
        assert!(!nested.is_shadowed_by(&dynamic));
    }
}
