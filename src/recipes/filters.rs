use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::dto::Recipe;

lazy_static! {
    static ref CONSTRAINT_RE: Regex =
        Regex::new(r"^\s*(<=|>=|<|>|=)?\s*([-+]?\d+(?:\.\d+)?)\s*$").unwrap();
    static ref LEADING_NUMBER_RE: Regex = Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Le,
    Ge,
    Lt,
    Gt,
    Eq,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid {field} filter {input:?}: expected <op><number>, op one of <=, >=, <, >, =")]
pub struct ConstraintError {
    pub field: &'static str,
    pub input: String,
}

/// A numeric threshold such as `<=500` or `>=4.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub op: Op,
    pub value: f64,
}

impl Threshold {
    /// Parses `input`, using `default_op` when no operator is given.
    /// Blank input means no constraint.
    pub fn parse(
        field: &'static str,
        input: &str,
        default_op: Op,
    ) -> Result<Option<Self>, ConstraintError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let caps = CONSTRAINT_RE.captures(input).ok_or_else(|| ConstraintError {
            field,
            input: input.to_string(),
        })?;
        let op = match caps.get(1).map(|m| m.as_str()) {
            Some("<=") => Op::Le,
            Some(">=") => Op::Ge,
            Some("<") => Op::Lt,
            Some(">") => Op::Gt,
            Some("=") => Op::Eq,
            _ => default_op,
        };
        let value = caps[2].parse::<f64>().map_err(|_| ConstraintError {
            field,
            input: input.to_string(),
        })?;
        Ok(Some(Self { op, value }))
    }

    pub fn accepts(&self, n: f64) -> bool {
        match self.op {
            Op::Le => n <= self.value,
            Op::Ge => n >= self.value,
            Op::Lt => n < self.value,
            Op::Gt => n > self.value,
            Op::Eq => n == self.value,
        }
    }
}

/// Post-query filter applied to title matches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchFilter {
    pub calories: Option<Threshold>,
    pub rating: Option<Threshold>,
}

impl SearchFilter {
    pub fn parse(calories: Option<&str>, rating: Option<&str>) -> Result<Self, ConstraintError> {
        Ok(Self {
            calories: match calories {
                Some(c) => Threshold::parse("calories", c, Op::Le)?,
                None => None,
            },
            rating: match rating {
                Some(r) => Threshold::parse("rating", r, Op::Ge)?,
                None => None,
            },
        })
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(t) = &self.calories {
            // recipes without a readable calorie count are kept
            if let Some(kcal) = calories_of(recipe) {
                if !t.accepts(kcal) {
                    return false;
                }
            }
        }
        if let Some(t) = &self.rating {
            match recipe.rating {
                Some(r) if t.accepts(r) => {}
                _ => return false,
            }
        }
        true
    }
}

pub fn calories_of(recipe: &Recipe) -> Option<f64> {
    match recipe.nutrients.as_ref()?.get("calories")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// Leading numeric prefix of `s`, e.g. `389` for `"389 kcal"`.
pub fn leading_number(s: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .captures(s)
        .and_then(|c| c[1].parse::<f64>().ok())
}
