//! Walks both trees with cursors. Run with `RUST_LOG=trace` to watch the
//! rotations and color flips each insert performs.

use ordtree::{AvlTree, RbTree};

fn main() {
    env_logger::init();

    let mut avl = AvlTree::new();
    let mut rb = RbTree::new();
    for key in 1..=6 {
        log::info!("inserting {}", key);
        avl.insert(key, key.to_string());
        rb.insert(key, key.to_string());
    }
    println!("avl height {}, rb height {}", avl.height(), rb.height());

    println!("In-order walk from 3:");
    let mut cursor = avl.find(&3).expect("3 was inserted");
    while let Some((k, v)) = cursor.key_value() {
        println!("Key: {}, Value: {}", k, v);
        cursor.move_next();
    }
    assert!(cursor == avl.end());

    let mut cursor = rb.begin();
    while !cursor.is_end() {
        print!("{:?} ", cursor.key());
        cursor.move_next();
    }
    println!();
}
