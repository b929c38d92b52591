//! Round-based dependency ordering.
//!
//! Each round places every remaining item whose requirements are already
//! supplied, keeping input order within the round. Tokens supplied by a round
//! become visible to the next round only.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// No item could be placed while `remaining` were still unplaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearizeError<T> {
    pub remaining: Vec<T>,
}

impl<T> fmt::Display for LinearizeError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to linearize: {} item(s) have requirements that can never be met",
            self.remaining.len()
        )
    }
}

impl<T: fmt::Debug> std::error::Error for LinearizeError<T> {}

/// Order `items` so that each one only follows items supplying what it requires.
pub fn linearize<T, K, R, S, RI, SI>(
    items: impl IntoIterator<Item = T>,
    requires: R,
    supplies: S,
) -> Result<Vec<T>, LinearizeError<T>>
where
    K: Eq + Hash,
    R: Fn(&T) -> RI,
    S: Fn(&T) -> SI,
    RI: IntoIterator<Item = K>,
    SI: IntoIterator<Item = K>,
{
    let mut pending: Vec<(T, HashSet<K>, Vec<K>)> = items
        .into_iter()
        .map(|item| {
            let needs = requires(&item).into_iter().collect();
            let gives = supplies(&item).into_iter().collect();
            (item, needs, gives)
        })
        .collect();

    let mut found: HashSet<K> = HashSet::new();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let (ready, blocked): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|(_, needs, _)| needs.iter().all(|k| found.contains(k)));

        if ready.is_empty() {
            return Err(LinearizeError {
                remaining: blocked.into_iter().map(|(item, _, _)| item).collect(),
            });
        }

        for (item, _, gives) in ready {
            found.extend(gives);
            ordered.push(item);
        }
        pending = blocked;
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_ordered() {
        // c needs b, b needs a
        let edges = [("a", vec![], vec![1]), ("b", vec![1], vec![2]), ("c", vec![2], vec![])];
        let order = linearize(
            ["c", "b", "a"],
            |n| edges.iter().find(|e| e.0 == *n).map(|e| e.1.clone()).unwrap_or_default(),
            |n| edges.iter().find(|e| e.0 == *n).map(|e| e.2.clone()).unwrap_or_default(),
        )
        .unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn same_round_keeps_input_order() {
        let order = linearize(
            [3, 1, 2],
            |_| Vec::<u8>::new(),
            |_| Vec::<u8>::new(),
        )
        .unwrap();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn cycle_reports_remaining_items() {
        // x needs what y supplies and vice versa; z is free
        let err = linearize(
            ['x', 'y', 'z'],
            |c| match c {
                'x' => vec![2],
                'y' => vec![1],
                _ => vec![],
            },
            |c| match c {
                'x' => vec![1],
                'y' => vec![2],
                _ => vec![],
            },
        )
        .unwrap_err();
        assert_eq!(err.remaining, vec!['x', 'y']);
        assert!(err.to_string().contains("failed to linearize"));
    }
}
