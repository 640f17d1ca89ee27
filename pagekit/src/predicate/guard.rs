//! Structural limits on composed predicates.

use super::{Operator, Predicate};
use crate::{ValidationError, Value};

/// Maximum number of values (array items and membership ids) in one
/// predicate.
const MAX_VALUE_NODES: usize = 10_000;

/// Checks a composed predicate before it is handed to a repository.
///
/// Enforces four limits:
/// 1. Field whitelist: only listed fields may appear in conditions
/// 2. Operator blacklist
/// 3. Nesting depth
/// 4. Total value count
///
/// Membership leaves are checked by relation name against the whitelist.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PredicateGuard {
    /// Allowed field names. Empty allows all fields.
    pub allowed_fields: Vec<String>,
    /// Denied operators.
    pub denied_operators: Vec<Operator>,
    /// Maximum nesting depth.
    pub max_depth: usize,
}

impl PredicateGuard {
    /// A guard with no field or operator restrictions and depth 5.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allowed_fields: Vec::new(),
            denied_operators: Vec::new(),
            max_depth: 5,
        }
    }

    /// Set allowed fields.
    #[must_use]
    pub fn allow_fields(mut self, fields: &[&str]) -> Self {
        self.allowed_fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Set denied operators.
    #[must_use]
    pub fn deny_operators(mut self, ops: &[Operator]) -> Self {
        self.denied_operators = ops.to_vec();
        self
    }

    /// Set maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Check `predicate` against the configured limits.
    pub fn check(&self, predicate: &Predicate) -> Result<(), ValidationError> {
        let mut nodes = 0;
        self.check_node(predicate, 1, &mut nodes)
    }

    fn check_node(
        &self,
        predicate: &Predicate,
        depth: usize,
        nodes: &mut usize,
    ) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::NestingTooDeep {
                max: self.max_depth,
                actual: depth,
            });
        }

        match predicate {
            Predicate::All => Ok(()),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    self.check_node(child, depth + 1, nodes)?;
                }
                Ok(())
            },
            Predicate::Condition(c) => {
                self.check_field(&c.field)?;
                if self.denied_operators.contains(&c.op) {
                    return Err(ValidationError::OperatorDenied {
                        operator: c.op,
                        field: c.field.clone(),
                    });
                }
                count_values(&c.value, nodes)
            },
            Predicate::Membership(m) => {
                self.check_field(&m.relation)?;
                *nodes += m.ids.len();
                if *nodes > MAX_VALUE_NODES {
                    return Err(ValidationError::TooManyNodes {
                        max: MAX_VALUE_NODES,
                    });
                }
                Ok(())
            },
        }
    }

    fn check_field(&self, field: &str) -> Result<(), ValidationError> {
        if !self.allowed_fields.is_empty() && !self.allowed_fields.iter().any(|f| f == field) {
            return Err(ValidationError::FieldNotAllowed {
                field: field.to_string(),
                allowed: self.allowed_fields.clone(),
            });
        }
        Ok(())
    }
}

impl Default for PredicateGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn count_values(value: &Value, nodes: &mut usize) -> Result<(), ValidationError> {
    *nodes += 1;
    if *nodes > MAX_VALUE_NODES {
        return Err(ValidationError::TooManyNodes {
            max: MAX_VALUE_NODES,
        });
    }
    if let Value::Array(items) = value {
        for item in items {
            count_values(item, nodes)?;
        }
    }
    Ok(())
}
