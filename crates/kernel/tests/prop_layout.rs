use std::collections::HashSet;

use proptest::prelude::*;
use vigil_common::Record;
use vigil_kernel::{AnchorPolicy, Field, GridLayout, place_index};

fn dataset(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("en {i}"), format!("ar {i}"), (i * 7 % 100) as u32))
        .collect()
}

/// Split `n` records into contiguous batches using `cuts` as batch lengths.
fn partition(n: usize, cuts: &[usize]) -> Vec<std::ops::Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    for &len in cuts {
        if start >= n {
            break;
        }
        let end = (start + len).min(n);
        out.push(start..end);
        start = end;
    }
    if start < n {
        out.push(start..n);
    }
    out
}

proptest! {
    #[test]
    fn placement_is_injective(total in 1usize..3000, spacing in 0.5f32..20.0) {
        let layout = GridLayout::new(total, spacing).unwrap();
        let mut seen = HashSet::new();
        for i in 0..total {
            let (x, z) = layout.place(i);
            prop_assert!(seen.insert((x.to_bits(), z.to_bits())), "index {} collides", i);
        }
    }

    #[test]
    fn placement_is_deterministic(total in 1usize..100_000, spacing in 0.5f32..20.0, seed in any::<usize>()) {
        let index = seed % total;
        let a = place_index(index, total, spacing).unwrap();
        let b = place_index(index, total, spacing).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn grid_is_centered(total in 1usize..5000, spacing in 0.5f32..20.0) {
        let layout = GridLayout::new(total, spacing).unwrap();
        let side = layout.grid_side() as usize;
        let (x0, z0) = layout.place(0);
        let (x1, _) = layout.place(side - 1);
        prop_assert!((x0 + x1).abs() < 1e-2);
        prop_assert!((x0 - z0).abs() < 1e-6);
    }

    #[test]
    fn batch_partition_does_not_change_result(
        total in 1usize..400,
        cuts in proptest::collection::vec(0usize..60, 0..20),
    ) {
        let data = dataset(total);

        let mut whole = Field::new(GridLayout::new(total, 5.0).unwrap(), AnchorPolicy::default());
        whole.ingest_batch(data.clone()).unwrap();

        let mut split = Field::new(GridLayout::new(total, 5.0).unwrap(), AnchorPolicy::default());
        for range in partition(total, &cuts) {
            split.ingest_batch(data[range].to_vec()).unwrap();
        }

        prop_assert!(split.is_complete());
        prop_assert_eq!(whole.records(), split.records());
        prop_assert_eq!(whole.layout_hash(), split.layout_hash());
    }
}
