//! Stable sort over container members, configurable by direction and by
//! caseness: `case`, `caseless`, `number`, `auto`.

use crate::variant::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caseness {
    /// Case-sensitive string comparison.
    Case,
    /// Case-insensitive string comparison.
    Caseless,
    /// Numeric comparison via `numerify`.
    Number,
    /// Numeric if both members parse as numbers, string comparison
    /// otherwise (per-pair decision, not a whole-sequence decision).
    Auto,
}

fn compare_one(a: &Value, b: &Value, caseness: Caseness) -> Ordering {
    match caseness {
        Caseness::Number => a
            .numerify()
            .partial_cmp(&b.numerify())
            .unwrap_or(Ordering::Equal),
        Caseness::Case => a.stringify().cmp(&b.stringify()),
        Caseness::Caseless => a
            .stringify()
            .to_lowercase()
            .cmp(&b.stringify().to_lowercase()),
        Caseness::Auto => {
            let (sa, sb) = (a.stringify(), b.stringify());
            match (sa.trim().parse::<f64>(), sb.trim().parse::<f64>()) {
                (Ok(na), Ok(nb)) => na.partial_cmp(&nb).unwrap_or(Ordering::Equal),
                _ => sa.cmp(&sb),
            }
        }
    }
}

/// Stable in-place sort of `items` by `caseness`, then by `dir`.
pub fn sort(items: &mut [Value], dir: SortDir, caseness: Caseness) {
    items.sort_by(|a, b| {
        let ord = compare_one(a, b, caseness);
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Value;

    #[test]
    fn sort_numbers_ascending() {
        let mut v = vec![Value::number(3.0), Value::number(1.0), Value::number(2.0)];
        sort(&mut v, SortDir::Asc, Caseness::Number);
        let nums: Vec<f64> = v.iter().map(|x| x.numerify()).collect();
        assert_eq!(nums, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut v = vec![
            Value::string("a"),
            Value::string("a"),
            Value::string("b"),
        ];
        sort(&mut v, SortDir::Asc, Caseness::Case);
        assert_eq!(v[0].stringify(), "a");
        assert_eq!(v[1].stringify(), "a");
    }

    #[test]
    fn sort_caseless_ignores_case() {
        let mut v = vec![Value::string("B"), Value::string("a")];
        sort(&mut v, SortDir::Asc, Caseness::Caseless);
        assert_eq!(v[0].stringify(), "a");
    }
}
