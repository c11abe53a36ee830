//! Best-effort extraction of estimates from upstream payloads of unknown shape.
//!
//! Paths use a small grammar: dot-separated object keys, each optionally
//! followed by `[n]` array indices (`property[0].avm.amount.value`,
//! `results[0].zestimate`). Resolution never fails; a path that does not match
//! the payload simply yields nothing and the next candidate is tried.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_json::{Number, Value};

use crate::{LookupResult, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Parsed path expression into a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyFieldPath);
        }

        let malformed = |index: usize| ValidationError::MalformedFieldPath {
            path: raw.to_owned(),
            index,
        };

        let mut segments = Vec::new();
        let mut offset = 0;
        for part in raw.split('.') {
            let key_end = part.find('[').unwrap_or(part.len());
            let key = &part[..key_end];
            if key.is_empty() {
                return Err(malformed(offset));
            }
            segments.push(Segment::Key(key.to_owned()));

            let mut rest = &part[key_end..];
            let mut position = offset + key_end;
            while !rest.is_empty() {
                let close = match (rest.strip_prefix('['), rest.find(']')) {
                    (Some(_), Some(close)) => close,
                    _ => return Err(malformed(position)),
                };
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| malformed(position + 1))?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
                position += close + 1;
            }

            offset += part.len() + 1;
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Follows the path through `payload`; `None` as soon as a step is missing.
    pub fn resolve<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(payload, |node, segment| match segment {
                Segment::Key(key) => node.as_object()?.get(key),
                Segment::Index(index) => node.as_array()?.get(*index),
            })
    }
}

impl FromStr for FieldPath {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns the first candidate that resolves to a numeric value.
///
/// Numbers are taken as-is, keeping the upstream integer/float representation;
/// strings count when they parse as a number once `$`, `,` and whitespace are
/// removed. Everything else, `null` included, is treated as absent.
pub fn extract(payload: &Value, candidates: &[FieldPath]) -> Option<Number> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(payload))
        .find_map(as_number)
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => {
            let cleaned = text
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, '$' | ','))
                .collect::<String>();
            if let Ok(integer) = cleaned.parse::<i64>() {
                return Some(Number::from(integer));
            }
            cleaned.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

/// Candidate paths per extracted field, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidates {
    pub estimated_value: Vec<FieldPath>,
    pub rent_estimate: Vec<FieldPath>,
}

impl FieldCandidates {
    pub fn new(estimated_value: &[&str], rent_estimate: &[&str]) -> Result<Self, ValidationError> {
        Ok(Self {
            estimated_value: parse_all(estimated_value)?,
            rent_estimate: parse_all(rent_estimate)?,
        })
    }
}

impl Default for FieldCandidates {
    fn default() -> Self {
        Self {
            estimated_value: builtin(&[
                "property[0].avm.amount.value",
                "zestimate",
                "data.zestimate",
                "results[0].zestimate",
                "value",
                "data.value",
                "results[0].value",
            ]),
            rent_estimate: builtin(&[
                "rentZestimate",
                "data.rentZestimate",
                "results[0].rentZestimate",
                "rentEstimate",
                "data.rentEstimate",
            ]),
        }
    }
}

fn parse_all(paths: &[&str]) -> Result<Vec<FieldPath>, ValidationError> {
    paths.iter().map(|path| FieldPath::parse(path)).collect()
}

// Built-in paths are literals covered by tests; a bad one is dropped, not fatal.
fn builtin(paths: &[&str]) -> Vec<FieldPath> {
    paths
        .iter()
        .filter_map(|path| FieldPath::parse(path).ok())
        .collect()
}

/// Turns an upstream payload into a [`LookupResult`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    candidates: FieldCandidates,
}

impl Normalizer {
    pub fn new(candidates: FieldCandidates) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &FieldCandidates {
        &self.candidates
    }

    pub fn normalize(&self, address: impl Into<String>, payload: &Value) -> LookupResult {
        LookupResult {
            address: address.into(),
            estimated_value: extract(payload, &self.candidates.estimated_value),
            rent_estimate: extract(payload, &self.candidates.rent_estimate),
            cached: false,
        }
    }
}
