// SLO criteria mini-language embedded in tile and series names
//
//   sli=<name>;pass=<op><num>[,<op><num>]*;warning=<op><num>[,<op><num>]*;key=<bool>
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdParseError {
    #[error("missing 'sli=' clause in '{0}'")]
    MissingIndicatorName(String),
    #[error("clause '{0}' is not a key=value pair")]
    MalformedClause(String),
    #[error("unrecognized operator in criterion '{0}'")]
    UnknownOperator(String),
    #[error("threshold in criterion '{0}' is not a number")]
    InvalidThreshold(String),
    #[error("invalid key flag '{0}', expected true or false")]
    InvalidKeyFlag(String),
    #[error("clause '{0}' repeats a key that may only appear once")]
    ConflictingClause(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    LessOrEqual,
    GreaterOrEqual,
    Less,
    Greater,
    Equal,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Equal => "=",
        }
    }

    /// Two-character operators must be tried before their one-character prefixes.
    fn split_prefix(input: &str) -> Option<(Operator, &str)> {
        const OPERATORS: [Operator; 5] = [
            Operator::LessOrEqual,
            Operator::GreaterOrEqual,
            Operator::Less,
            Operator::Greater,
            Operator::Equal,
        ];
        OPERATORS
            .iter()
            .find_map(|op| input.strip_prefix(op.as_str()).map(|rest| (*op, rest)))
    }
}

/// One comparison such as `<=500`. The numeric literal is kept verbatim so
/// re-serialization never rounds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub operator: Operator,
    pub threshold: f64,
    literal: String,
}

impl Criterion {
    pub fn new(operator: Operator, literal: impl Into<String>) -> Result<Self, ThresholdParseError> {
        let literal = literal.into();
        let threshold = literal
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ThresholdParseError::InvalidThreshold(format!("{}{}", operator.as_str(), literal)))?;
        Ok(Self {
            operator,
            threshold,
            literal,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ThresholdParseError> {
        let input = input.trim();
        let (operator, literal) = Operator::split_prefix(input)
            .ok_or_else(|| ThresholdParseError::UnknownOperator(input.to_string()))?;
        if literal.starts_with(['<', '>', '=']) {
            return Err(ThresholdParseError::UnknownOperator(input.to_string()));
        }
        Self::new(operator, literal.trim())
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.literal)
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSpec {
    pub name: String,
    pub pass: Vec<Criterion>,
    pub warning: Vec<Criterion>,
    pub key: bool,
}

impl ThresholdSpec {
    pub fn parse(spec: &str) -> Result<Self, ThresholdParseError> {
        let mut name: Option<String> = None;
        let mut key: Option<bool> = None;
        let mut pass = Vec::new();
        let mut warning = Vec::new();

        for clause in spec.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let (raw_key, value) = clause
                .split_once('=')
                .ok_or_else(|| ThresholdParseError::MalformedClause(clause.to_string()))?;

            match raw_key.trim().to_ascii_lowercase().as_str() {
                "sli" => {
                    let value = value.trim();
                    if name.is_some() {
                        return Err(ThresholdParseError::ConflictingClause(clause.to_string()));
                    }
                    if value.is_empty() {
                        return Err(ThresholdParseError::MissingIndicatorName(spec.to_string()));
                    }
                    name = Some(value.to_string());
                }
                "pass" => pass.extend(parse_criteria(value)?),
                "warning" => warning.extend(parse_criteria(value)?),
                "key" => {
                    if key.is_some() {
                        return Err(ThresholdParseError::ConflictingClause(clause.to_string()));
                    }
                    let flag = match value.trim().to_ascii_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        other => return Err(ThresholdParseError::InvalidKeyFlag(other.to_string())),
                    };
                    key = Some(flag);
                }
                // weight and other annotations are tolerated but carry no meaning here
                _ => {}
            }
        }

        let name = name.ok_or_else(|| ThresholdParseError::MissingIndicatorName(spec.to_string()))?;
        Ok(Self {
            name,
            pass,
            warning,
            key: key.unwrap_or(false),
        })
    }

    /// Look for an embedded threshold spec in a display name such as
    /// `Response time;sli=rt;pass=<=500`. Free-text segments are ignored.
    /// Returns `None` when the name carries no `sli=` clause at all.
    pub fn extract_from_name(display_name: &str) -> Option<Result<Self, ThresholdParseError>> {
        let clauses: Vec<&str> = display_name
            .split(';')
            .map(str::trim)
            .filter(|c| c.contains('='))
            .collect();

        let has_indicator = clauses.iter().any(|c| {
            c.split_once('=')
                .is_some_and(|(k, _)| k.trim().eq_ignore_ascii_case("sli"))
        });
        if !has_indicator {
            return None;
        }

        Some(Self::parse(&clauses.join(";")))
    }
}

impl fmt::Display for ThresholdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sli={}", self.name)?;
        if !self.pass.is_empty() {
            write!(f, ";pass={}", join_criteria(&self.pass))?;
        }
        if !self.warning.is_empty() {
            write!(f, ";warning={}", join_criteria(&self.warning))?;
        }
        write!(f, ";key={}", self.key)
    }
}

fn parse_criteria(value: &str) -> Result<Vec<Criterion>, ThresholdParseError> {
    value.split(',').map(Criterion::parse).collect()
}

fn join_criteria(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
