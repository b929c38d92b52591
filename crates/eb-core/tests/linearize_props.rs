//! Property tests for eb-core linearization.

use eb_core::linearize;
use proptest::prelude::*;

/// Random DAG over `n` nodes: edges only go from lower to higher index.
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<usize>)> {
    (2usize..12).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        let count = pairs.len();
        (
            Just(n),
            proptest::collection::vec(any::<bool>(), count).prop_map(move |keep| {
                pairs
                    .iter()
                    .zip(keep)
                    .filter_map(|(p, k)| k.then_some(*p))
                    .collect::<Vec<_>>()
            }),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn acyclic_inputs_yield_topological_order((n, edges, items) in dag()) {
        let order = linearize(
            items,
            |node| edges.iter().filter(|(_, to)| to == node).copied().collect::<Vec<_>>(),
            |node| edges.iter().filter(|(from, _)| from == node).copied().collect::<Vec<_>>(),
        ).unwrap();

        prop_assert_eq!(order.len(), n);
        let position = |node: usize| order.iter().position(|x| *x == node).unwrap();
        for (from, to) in &edges {
            prop_assert!(position(*from) < position(*to));
        }
    }

    #[test]
    fn rings_never_linearize(n in 2usize..10) {
        // node i needs token i and supplies token (i + 1) % n
        let err = linearize(
            0..n,
            |node| vec![*node],
            |node| vec![(*node + 1) % n],
        ).unwrap_err();
        prop_assert_eq!(err.remaining.len(), n);
    }
}
