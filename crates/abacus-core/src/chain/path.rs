//! Tokenizer and resolver for `$previous.<path>` placeholders.
//!
//! `"$previous"` alone refers to the whole previous output. Each dotted
//! segment after it is a map key, or an index when the current value is an
//! array. Segments are restricted to `[A-Za-z0-9_-]` and a few
//! prototype-style names are refused outright.

use abacus_types::error::PathError;
use abacus_types::schema::json_type_name;
use serde_json::Value;

pub const PREVIOUS: &str = "$previous";

const DENIED_SEGMENTS: &[&str] = &["__proto__", "prototype", "constructor"];

/// Whether `s` should be treated as a placeholder at all.
///
/// Strings that merely start with `$previous` (e.g. `"$previously"`) are
/// ordinary literals.
pub fn is_placeholder(s: &str) -> bool {
    s == PREVIOUS || s.starts_with("$previous.")
}

/// A parsed placeholder: the path segments after `$previous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    segments: Vec<String>,
}

impl Placeholder {
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s == PREVIOUS {
            return Ok(Self {
                segments: Vec::new(),
            });
        }
        let Some(rest) = s.strip_prefix("$previous.") else {
            return Err(PathError::NotAPlaceholder(s.to_string()));
        };

        let segments = rest
            .split('.')
            .enumerate()
            .map(|(i, seg)| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(i))
                } else if !is_safe_segment(seg) {
                    Err(PathError::UnsafeSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `previous` along the segments and return a copy of the value found.
    pub fn resolve(&self, previous: Option<&Value>) -> Result<Value, PathError> {
        let mut current = previous.ok_or(PathError::NoPrevious)?;
        let mut at = PREVIOUS.to_string();

        for segment in &self.segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i)),
                other => {
                    return Err(PathError::NotAContainer {
                        segment: segment.clone(),
                        at,
                        found: json_type_name(other),
                    });
                }
            };
            current = next.ok_or_else(|| PathError::Missing {
                segment: segment.clone(),
                at: at.clone(),
            })?;
            at.push('.');
            at.push_str(segment);
        }

        Ok(current.clone())
    }
}

fn is_safe_segment(seg: &str) -> bool {
    seg.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !DENIED_SEGMENTS.contains(&seg)
}
