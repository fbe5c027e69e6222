use super::{Avl, AvlTree, Balance, RbTree, RedBlack, Tree, TreeError};

const N: i32 = 1_000;

fn random_tree<B: Balance>(seed: u64) -> (Tree<i32, i32, B>, Vec<i32>) {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();

    let mut map = Tree::new();
    for value in &values {
        map.insert(*value, value.wrapping_add(42));
    }
    values.sort();
    values.dedup();
    (map, values)
}

fn check_new<B: Balance>() {
    let map_i32 = Tree::<i32, (), B>::new();
    assert!(map_i32.is_empty());
    assert_eq!(map_i32.height(), 0);
    map_i32.check_consistency();

    let map_string = Tree::<String, String, B>::new();
    assert!(map_string.is_empty());
    assert!(map_string.begin() == map_string.end());
    map_string.check_consistency();
}

fn check_get<B: Balance>() {
    let (mut map, values) = random_tree::<B>(0);
    assert!(map.get(&-42).is_none() || values.contains(&-42));

    for value in &values {
        let mapped = value.wrapping_add(42);
        assert_eq!(map.get(value), Some(&mapped));
        assert_eq!(map.get_key_value(value), Some((value, &mapped)));
        assert_eq!(map[value], mapped);
    }

    for value in &values {
        *map.get_mut(value).unwrap() = *value;
    }
    assert!(map.iter().all(|(key, value)| key == value));
}

fn check_find<B: Balance>() {
    let mut map = Tree::<i32, &str, B>::new();
    assert_eq!(map.find(&1).err(), Some(TreeError::KeyNotFound));

    map.insert(1, "one");
    map.insert(3, "three");
    map.insert(5, "five");

    let mut cursor = map.find(&3).unwrap();
    assert_eq!(cursor.key_value(), Some((&3, &"three")));
    cursor.move_next();
    assert_eq!(cursor.key(), Some(&5));
    cursor.move_next();
    assert!(cursor.is_end());
    assert!(cursor == map.end());
    cursor.move_next();
    assert!(cursor.is_end());

    assert_eq!(map.find(&2).err(), Some(TreeError::KeyNotFound));
    let rest: Vec<i32> = map.find(&3).unwrap().into_iter().map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![3, 5]);
}

fn check_cursor_walk<B: Balance>() {
    let (map, values) = random_tree::<B>(1);

    let mut cursor = map.begin();
    for value in &values {
        assert_eq!(cursor.key(), Some(value));
        cursor.move_next();
    }
    assert!(cursor == map.end());

    let first = map.first_key_value().map(|(key, _)| *key);
    let last = map.last_key_value().map(|(key, _)| *key);
    assert_eq!(first, values.first().copied());
    assert_eq!(last, values.last().copied());
}

fn check_iter<B: Balance>() {
    let (mut map, values) = random_tree::<B>(2);

    let mut map_iter = map.iter();
    for value in &values {
        let (&key, &mapped) = map_iter.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(mapped, value.wrapping_add(42));
    }
    assert!(map_iter.next().is_none());
    assert!(map_iter.next().is_none());

    let mut value_iter = values.iter();
    for (&key, &mapped) in &map {
        let value = value_iter.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(mapped, value.wrapping_add(42));
    }
    assert!(value_iter.next().is_none());

    let mut map_iter_mut = map.iter_mut();
    for value in &values {
        let (&key, mapped_mut) = map_iter_mut.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(*mapped_mut, value.wrapping_add(42));
        *mapped_mut = value.wrapping_sub(42);
    }
    assert!(map_iter_mut.next().is_none());

    let mut value_iter = values.iter();
    for (&key, mapped_mut) in &mut map {
        let value = value_iter.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(*mapped_mut, value.wrapping_sub(42));
        *mapped_mut = 42;
    }
    assert!(value_iter.next().is_none());
    assert!(map.values().all(|mapped| *mapped == 42));
    assert!(map.keys().eq(values.iter()));
}

fn check_clear<B: Balance>() {
    let (mut map, values) = random_tree::<B>(3);
    assert!(!map.is_empty());
    assert!(map.len() == values.len());

    map.clear();
    assert!(map.is_empty());
    assert!(map.len() == 0);
    assert!(map.iter().next().is_none());

    for value in &values {
        assert!(map.insert(*value, 0).is_none());
    }
    assert!(map.len() == values.len());
    map.check_consistency();
}

fn check_round_trip<B: Balance>() {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    let mut rng = StdRng::seed_from_u64(4);
    let mut values: Vec<i32> = (0..N).collect();
    values.shuffle(&mut rng);

    let mut map = Tree::<i32, String, B>::new();
    for value in &values {
        map.insert(*value, value.to_string());
    }
    values.shuffle(&mut rng);
    for value in &values {
        assert_eq!(map.remove(value), Ok(value.to_string()));
    }
    assert_eq!(map.len(), 0);
    assert!(map.iter().next().is_none());
    assert!(map.begin().is_end());
    map.check_consistency();
}

fn check_traits<B: Balance>() {
    let map: Tree<String, usize, B> = ["b", "a", "c"]
        .iter()
        .map(|s| (s.to_string(), s.len()))
        .collect();
    // Borrowed lookups
    assert_eq!(map.get("a"), Some(&1));
    assert!(map.contains_key("c"));
    assert!(!map.contains_key("d"));
    assert_eq!(map["b"], 1);

    let mut copy = map.clone();
    assert!(copy == map);
    copy.check_consistency();
    copy.extend(vec![(String::from("d"), 4)]);
    assert!(copy != map);
    assert_eq!(copy.remove("d"), Ok(4));
    assert!(copy == map);

    assert_eq!(format!("{:?}", map), r#"{"a": 1, "b": 1, "c": 1}"#);
    let entries = format!("{:?}", map.iter());
    assert_eq!(entries, r#"[("a", 1), ("b", 1), ("c", 1)]"#);
    assert_eq!(format!("{:?}", map.end()), "Cursor(end)");
    assert_eq!(Tree::<i32, i32, B>::default().len(), 0);
}

fn check_drop<B: Balance>() {
    use std::rc::Rc;

    let tracker = Rc::new(());
    {
        let mut map = Tree::<i32, Rc<()>, B>::new();
        for key in 0..100 {
            map.insert(key, Rc::clone(&tracker));
        }
        assert_eq!(Rc::strong_count(&tracker), 101);
        map.insert(0, Rc::clone(&tracker));
        assert_eq!(Rc::strong_count(&tracker), 101);
        map.remove(&1).unwrap();
        assert_eq!(Rc::strong_count(&tracker), 100);
    }
    assert_eq!(Rc::strong_count(&tracker), 1);
}

#[test]
fn test_new() {
    check_new::<Avl>();
    check_new::<RedBlack>();
}

#[test]
fn test_get() {
    check_get::<Avl>();
    check_get::<RedBlack>();
}

#[test]
fn test_find() {
    check_find::<Avl>();
    check_find::<RedBlack>();
}

#[test]
fn test_cursor_walk() {
    check_cursor_walk::<Avl>();
    check_cursor_walk::<RedBlack>();
}

#[test]
fn test_iter() {
    check_iter::<Avl>();
    check_iter::<RedBlack>();
}

#[test]
fn test_clear() {
    check_clear::<Avl>();
    check_clear::<RedBlack>();
}

#[test]
fn test_round_trip() {
    check_round_trip::<Avl>();
    check_round_trip::<RedBlack>();
}

#[test]
fn test_traits() {
    check_traits::<Avl>();
    check_traits::<RedBlack>();
}

#[test]
fn test_drop() {
    check_drop::<Avl>();
    check_drop::<RedBlack>();
}

#[test]
fn test_same_order() {
    let avl: AvlTree<i32, ()> = (0..N).rev().map(|key| (key, ())).collect();
    let rb: RbTree<i32, ()> = (0..N).rev().map(|key| (key, ())).collect();
    assert!(avl.keys().eq(rb.keys()));
    assert!(avl.keys().copied().eq(0..N));
}

#[test]
fn test_validate_reports_corruption() {
    let mut map: AvlTree<i32, ()> = (0..8).map(|key| (key, ())).collect();
    assert!(map.validate().is_ok());
    map.num_nodes += 1;
    assert!(matches!(
        map.validate(),
        Err(TreeError::InvariantViolation(_))
    ));
    map.num_nodes -= 1;

    let mut map: RbTree<i32, ()> = (0..8).map(|key| (key, ())).collect();
    unsafe { map.root.unwrap().as_mut().meta = crate::Color::Red };
    assert!(matches!(
        map.validate(),
        Err(TreeError::InvariantViolation(_))
    ));
}

#[test]
#[ignore]
fn test_large() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    const LARGE_N: i32 = 1_000_000;

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..LARGE_N).map(|_| rng.gen_range(0..LARGE_N)).collect();

    let mut avl = AvlTree::new();
    let mut rb = RbTree::new();
    for value in &values {
        avl.insert(*value, *value);
        rb.insert(*value, *value);
    }
    avl.check_consistency();
    rb.check_consistency();

    values.shuffle(&mut rng);
    values.resize(values.len() / 2, 0);
    for value in &values {
        let _ = avl.remove(value);
        let _ = rb.remove(value);
    }
    avl.check_consistency();
    rb.check_consistency();
    assert!(avl.iter().eq(rb.iter()));
}
