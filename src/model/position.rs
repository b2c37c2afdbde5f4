use alloy::primitives::{Address, I256};

/// A token held by an allocation, with the decimals its balances use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionToken {
    pub token: Address,
    pub decimals: u8,
}

/// A valued allocation. Created fresh on every valuation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub name: String,
    /// USD value at `USD_DECIMALS`.
    pub value: I256,
    pub tokens: Vec<PositionToken>,
}

impl Position {
    /// Placeholder for a targeted name that has no registered allocation.
    pub fn empty(name: &str) -> Self {
        Position {
            name: name.to_string(),
            value: I256::ZERO,
            tokens: Vec::new(),
        }
    }

    pub fn token_index(&self, token: Address) -> Option<usize> {
        self.tokens.iter().position(|t| t.token == token)
    }
}

/// Target fraction of NAV for a named position, at `WEIGHT_DECIMALS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWeight {
    pub name: String,
    pub weight: I256,
}

/// `target - current` for one position name, in USD at `USD_DECIMALS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDelta {
    pub name: String,
    pub delta: I256,
}

/// Target USD value per position name, in target-weight order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetValues(Vec<(String, I256)>);

impl TargetValues {
    pub fn new() -> Self {
        TargetValues(Vec::new())
    }

    /// Insert or overwrite; the first insertion fixes the iteration position.
    pub fn insert(&mut self, name: &str, value: I256) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<I256> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, I256)> {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, I256)> for TargetValues {
    fn from_iter<T: IntoIterator<Item = (S, I256)>>(iter: T) -> Self {
        let mut values = TargetValues::new();
        for (name, value) in iter {
            values.insert(&name.into(), value);
        }
        values
    }
}

/// Value for `name`, or zero when the name is absent.
///
/// Absence is meaningful here: a position with no target weight has a target
/// of zero, and a target with no position has a current value of zero.
pub fn lookup_or_zero<'a, I>(entries: I, name: &str) -> I256
where
    I: IntoIterator<Item = (&'a str, I256)>,
{
    entries
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
        .unwrap_or(I256::ZERO)
}
