//! Property tests for the packed sparse table (§4.3, §8 property 2: "Sparse-table round-trip").

use proptest::prelude::*;
use std::collections::HashMap;
use superfastmatch::sparse_table::SparseTable;

fn writes_strategy() -> impl Strategy<Value = Vec<(u64, Vec<u8>)>> {
    prop::collection::vec((0u64..64, prop::collection::vec(any::<u8>(), 0..256)), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// For any sequence of `set(i, v_i)` with `|v_i| <= 255`, `get(i) == v_i` afterward, and
    /// `count()` equals the number of slots whose final write was non-empty.
    #[test]
    fn round_trip_holds_for_arbitrary_writes(writes in writes_strategy()) {
        let mut table = SparseTable::init(64, 16);
        let mut expected: HashMap<u64, Vec<u8>> = HashMap::new();
        for (pos, payload) in writes {
            table.set_bytes(pos, &payload).unwrap();
            expected.insert(pos, payload);
        }
        for (&pos, payload) in &expected {
            prop_assert_eq!(&table.get_bytes(pos).unwrap(), payload);
        }
        let non_empty = expected.values().filter(|v| !v.is_empty()).count() as u64;
        prop_assert_eq!(table.count(), non_empty);
    }

    /// Writing to one slot never perturbs the bytes stored at any other slot.
    #[test]
    fn writes_to_one_slot_do_not_perturb_others(
        a in 0u64..32, b in 0u64..32,
        payload_a in prop::collection::vec(any::<u8>(), 1..100),
        payload_b in prop::collection::vec(any::<u8>(), 1..100),
    ) {
        prop_assume!(a != b);
        let mut table = SparseTable::init(32, 8);
        table.set_bytes(a, &payload_a).unwrap();
        let before_b = table.get_bytes(b).unwrap();
        table.set_bytes(b, &payload_b).unwrap();
        prop_assert_eq!(table.get_bytes(a).unwrap(), payload_a);
        prop_assert_eq!(table.get_bytes(b).unwrap(), payload_b);
        prop_assert!(before_b.is_empty());
    }
}
