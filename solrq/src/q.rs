//! Boolean expression nodes
//!
//! A [`Q`] is either a leaf holding a [`Clause`] of `field = value` pairs or
//! an internal node combining operands with a single [`Operator`]. Nodes are
//! only ever combined two at a time: `a | b | c` builds `((a OR b) OR c)`.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Operator joining the operands of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `field = value` pairs rendered as one AND-ed condition.
///
/// Insertion order is kept; inserting an existing field replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Clause {
    fields: Vec<(String, String)>,
}

impl Clause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Clause {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut clause = Clause::new();
        for (field, value) in iter {
            clause.insert(field, value);
        }
        clause
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Clause {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Clause {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

/// One operand of a combined node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A raw leaf clause, unwrapped from a node without operands
    Clause(Clause),
    /// An already combined sub-expression
    Node(Q),
}

/// Boolean expression node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Q {
    params: Clause,
    operator: Operator,
    operands: Vec<Operand>,
    negated: bool,
}

impl Q {
    /// Leaf node from `(field, value)` pairs, in order.
    pub fn new(params: impl Into<Clause>) -> Self {
        Self {
            params: params.into(),
            ..Self::default()
        }
    }

    /// Leaf node with a single `field = value` pair.
    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = Clause::new();
        params.insert(field, value);
        Self::new(params)
    }

    /// Node without any condition; the neutral start of a fold.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &Clause {
        &self.params
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty() && self.params.is_empty()
    }

    /// Combine with OR.
    pub fn or(self, other: Q) -> Q {
        self.combine(other, Operator::Or)
    }

    /// Combine with AND.
    pub fn and(self, other: Q) -> Q {
        self.combine(other, Operator::And)
    }

    /// Wrap this expression in a negated AND node with a single operand.
    pub fn negate(self) -> Q {
        let mut node = Q {
            operator: Operator::And,
            negated: true,
            ..Q::default()
        };
        node.push_operand(self);
        node
    }

    fn combine(self, other: Q, operator: Operator) -> Q {
        let mut node = Q {
            operator,
            ..Q::default()
        };
        node.push_operand(self);
        node.push_operand(other);
        node
    }

    fn push_operand(&mut self, q: Q) {
        if let Some(operand) = q.into_operand() {
            self.operands.push(operand);
        }
    }

    // Leaves are attached as their raw clause, combined nodes as sub-trees.
    // Empty leaves carry no condition and are not attached at all.
    fn into_operand(self) -> Option<Operand> {
        if !self.operands.is_empty() {
            Some(Operand::Node(self))
        } else if self.params.is_empty() {
            None
        } else {
            Some(Operand::Clause(self.params))
        }
    }
}

impl BitOr for Q {
    type Output = Q;

    fn bitor(self, rhs: Q) -> Q {
        self.or(rhs)
    }
}

impl BitAnd for Q {
    type Output = Q;

    fn bitand(self, rhs: Q) -> Q {
        self.and(rhs)
    }
}

impl Not for Q {
    type Output = Q;

    fn not(self) -> Q {
        self.negate()
    }
}

impl BitOrAssign for Q {
    fn bitor_assign(&mut self, rhs: Q) {
        let lhs = std::mem::take(self);
        *self = lhs.or(rhs);
    }
}

impl BitAndAssign for Q {
    fn bitand_assign(&mut self, rhs: Q) {
        let lhs = std::mem::take(self);
        *self = lhs.and(rhs);
    }
}
