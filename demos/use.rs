use ordtree::{AvlTree, RbTree, TreeError};

fn main() {
    let mut map = AvlTree::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "two");
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.remove(&1), Ok("one"));
    assert!(map.get(&1).is_none());
    assert_eq!(map.remove(&1), Err(TreeError::KeyNotFound));

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    let mut rb: RbTree<String, usize> = RbTree::new();
    for word in "the quick brown fox jumps over the lazy dog".split(' ') {
        match rb.get_mut(word) {
            Some(count) => *count += 1,
            None => {
                rb.insert(word.to_string(), 1);
            }
        }
    }
    println!("{rb:?} (height {})", rb.height());
}
