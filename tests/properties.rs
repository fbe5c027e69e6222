//! Model tests: both trees must behave exactly like `BTreeMap` and keep
//! their invariants after every operation.

use std::collections::BTreeMap;

use ordtree::{Balance, Tree, TreeError};
use proptest::prelude::*;

const N_VALUES: usize = 300;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u32),
    Remove(u8),
    Get(u8),
    Find(u8),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    // A small key domain makes updates and removals of present keys common.
    prop_oneof![
        3 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => any::<u8>().prop_map(Op::Remove),
        1 => any::<u8>().prop_map(Op::Get),
        1 => any::<u8>().prop_map(Op::Find),
    ]
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_model<B: Balance>(ops: &[Op]) -> Result<(), TestCaseError> {
    let mut tree = Tree::<u8, u32, B>::new();
    let mut model = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(key, value) => {
                prop_assert_eq!(tree.insert(key, value), model.insert(key, value));
            }
            Op::Remove(key) => {
                let expected = model.remove(&key).ok_or(TreeError::KeyNotFound);
                prop_assert_eq!(tree.remove(&key), expected);
            }
            Op::Get(key) => {
                prop_assert_eq!(tree.get(&key), model.get(&key));
            }
            Op::Find(key) => {
                let found: Option<Vec<u8>> = tree
                    .find(&key)
                    .ok()
                    .map(|cursor| cursor.iter().map(|(k, _)| *k).collect());
                let expected = model
                    .contains_key(&key)
                    .then(|| model.range(key..).map(|(k, _)| *k).collect());
                prop_assert_eq!(found, expected);
            }
        }
        prop_assert_eq!(tree.validate(), Ok(()));
        prop_assert_eq!(tree.len(), model.len());
    }

    prop_assert!(tree.iter().eq(model.iter()));
    Ok(())
}

fn run_drain<B: Balance>(keys: &[i64], order: &[prop::sample::Index]) -> Result<(), TestCaseError> {
    let mut tree = Tree::<i64, i64, B>::new();
    for key in keys {
        tree.insert(*key, -*key);
    }
    prop_assert_eq!(tree.len(), keys.len());
    prop_assert_eq!(tree.validate(), Ok(()));

    let mut remaining: Vec<i64> = keys.to_vec();
    for index in order {
        if remaining.is_empty() {
            break;
        }
        let key = remaining.swap_remove(index.index(remaining.len()));
        prop_assert_eq!(tree.remove(&key), Ok(-key));
        prop_assert_eq!(tree.validate(), Ok(()));
    }
    for key in remaining {
        prop_assert_eq!(tree.remove(&key), Ok(-key));
    }

    prop_assert!(tree.is_empty());
    prop_assert_eq!(tree.height(), 0);
    prop_assert!(tree.begin().is_end());
    Ok(())
}

proptest! {
    /// Random operation sequences against a `BTreeMap` control model.
    #[test]
    fn prop_avl_matches_btreemap(ops in prop::collection::vec(arbitrary_op(), 0..N_VALUES)) {
        init_logger();
        run_model::<ordtree::Avl>(&ops)?;
    }

    #[test]
    fn prop_rb_matches_btreemap(ops in prop::collection::vec(arbitrary_op(), 0..N_VALUES)) {
        init_logger();
        run_model::<ordtree::RedBlack>(&ops)?;
    }

    /// Inserting a set of keys and removing all of them in any order leaves
    /// an empty tree.
    #[test]
    fn prop_insert_then_remove_all(
        keys in prop::collection::hash_set(any::<i64>(), 0..N_VALUES),
        order in prop::collection::vec(any::<prop::sample::Index>(), 0..N_VALUES),
    ) {
        let keys: Vec<i64> = keys.into_iter().collect();
        run_drain::<ordtree::Avl>(&keys, &order)?;
        run_drain::<ordtree::RedBlack>(&keys, &order)?;
    }

    /// Heights stay within the logarithmic bound of each strategy.
    #[test]
    fn prop_height_bound(keys in prop::collection::btree_set(any::<u32>(), 1..N_VALUES)) {
        let avl: ordtree::AvlTree<u32, ()> = keys.iter().map(|k| (*k, ())).collect();
        let rb: ordtree::RbTree<u32, ()> = keys.iter().map(|k| (*k, ())).collect();
        let log2 = ((keys.len() + 1) as f64).log2();
        prop_assert!(avl.height() as f64 <= 1.45 * log2 + 1.0);
        prop_assert!(rb.height() as f64 <= 2.0 * log2 + 1.0);
        prop_assert!(avl.keys().eq(keys.iter()));
        prop_assert!(rb.keys().eq(keys.iter()));
    }
}
