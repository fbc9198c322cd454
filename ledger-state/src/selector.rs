//! CouchDB-style selector expressions for rich queries.
//!
//! Supported form:
//!
//! ```text
//! {"selector": {"collection": "KU Ornithology", "taxon": {"$in": ["A", "B"]}}}
//! ```
//!
//! A field condition is either a literal (equality) or an object of
//! operators: `$eq`, `$ne`, `$in`. Dotted field names address nested
//! objects. All conditions must hold.

use serde_json::{Map, Value};

use crate::traits::LedgerError;

/// A single operator applied to a field.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    clauses: Vec<(String, Condition)>,
}

impl Selector {
    /// Parse a query expression.
    pub fn parse(query: &str) -> Result<Self, LedgerError> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::InvalidQuery(format!("not JSON: {e}")))?;

        let selector = root
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| LedgerError::InvalidQuery("missing \"selector\" object".to_string()))?;

        let mut clauses = Vec::new();
        for (field, condition) in selector {
            match condition {
                Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                    for (op, operand) in ops {
                        clauses.push((field.clone(), Self::parse_operator(op, operand)?));
                    }
                }
                literal => clauses.push((field.clone(), Condition::Eq(literal.clone()))),
            }
        }

        Ok(Self { clauses })
    }

    fn parse_operator(op: &str, operand: &Value) -> Result<Condition, LedgerError> {
        match op {
            "$eq" => Ok(Condition::Eq(operand.clone())),
            "$ne" => Ok(Condition::Ne(operand.clone())),
            "$in" => operand
                .as_array()
                .map(|values| Condition::In(values.clone()))
                .ok_or_else(|| LedgerError::InvalidQuery("$in requires an array".to_string())),
            other => Err(LedgerError::InvalidQuery(format!(
                "unsupported operator {other}"
            ))),
        }
    }

    /// Whether a stored value satisfies every clause.
    ///
    /// Values that are not JSON objects never match.
    pub fn matches(&self, value: &[u8]) -> bool {
        let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(value) else {
            return false;
        };

        self.clauses.iter().all(|(field, condition)| {
            let found = lookup(&doc, field);
            match condition {
                Condition::Eq(expected) => found == Some(expected),
                Condition::Ne(expected) => found.is_some_and(|v| v != expected),
                Condition::In(options) => found.is_some_and(|v| options.contains(v)),
            }
        })
    }
}

fn lookup<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
