//! End-to-end scenarios covering create/insert/close/reopen/traverse and
//! the text load/extract round trip.

use indexfile::io::{extract, load};
use indexfile::Engine;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tempfile::tempdir;

#[test]
fn s1_empty_tree_roundtrips_through_close_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t1.db");

    {
        let mut e = Engine::create(&path).unwrap();
        e.close().unwrap();
    }

    let mut e = Engine::open(&path).unwrap();
    assert_eq!(e.search(42).unwrap(), None);
    assert_eq!(e.traverse().unwrap(), Vec::new());
}

#[test]
fn s2_single_insert_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t2.db");

    {
        let mut e = Engine::create(&path).unwrap();
        e.insert(7, 100).unwrap();
        e.close().unwrap();
    }

    let file_len = std::fs::metadata(&path).unwrap().len();
    assert!(file_len >= 1024);

    let mut e = Engine::open(&path).unwrap();
    assert_eq!(e.search(7).unwrap(), Some(100));
    assert_eq!(e.traverse().unwrap(), vec![(7, 100)]);
}

#[test]
fn s3_sequential_inserts_force_one_split() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t3.db");
    let mut e = Engine::create(&path).unwrap();

    for k in 1..=20u64 {
        e.insert(k, k).unwrap();
    }

    let expected: Vec<(u64, u64)> = (1..=20u64).map(|k| (k, k)).collect();
    assert_eq!(e.traverse().unwrap(), expected);
    assert_eq!(e.search(10).unwrap(), Some(10));

    let tree = e.export_tree().unwrap().expect("non-empty tree");
    assert_eq!(tree.keys, vec![10]);
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].keys.len(), 9);
    assert_eq!(tree.children[1].keys.len(), 10);
}

#[test]
fn s4_forces_root_split_and_grandchild_split() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t4.db");
    let mut e = Engine::create(&path).unwrap();

    for k in 1..=39u64 {
        e.insert(k, k).unwrap();
    }

    let expected: Vec<(u64, u64)> = (1..=39u64).map(|k| (k, k)).collect();
    assert_eq!(e.traverse().unwrap(), expected);

    let tree = e.export_tree().unwrap().expect("non-empty tree");
    assert!(!tree.is_leaf);
    assert_eq!(tree.children.len(), 2);
    for child in &tree.children {
        assert!(!child.is_leaf);
    }
}

#[test]
fn s5_cache_eviction_preserves_full_sequence_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t5.db");
    let mut sizes = Vec::new();

    {
        let mut e = Engine::create_with_capacity(&path, 3).unwrap();
        for k in 1..=60u64 {
            e.insert(k, k).unwrap();
            sizes.push(std::fs::metadata(&path).unwrap().len());
        }
        e.close().unwrap();
    }

    for window in sizes.windows(2) {
        assert!(window[1] >= window[0]);
    }

    let mut e = Engine::open_with_capacity(&path, 3).unwrap();
    let expected: Vec<(u64, u64)> = (1..=60u64).map(|k| (k, k)).collect();
    assert_eq!(e.traverse().unwrap(), expected);
}

#[test]
fn s6_load_extract_roundtrip_sorts_by_key() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("t6.db");
    let in_path = dir.path().join("in.txt");
    let out_path = dir.path().join("out.txt");

    std::fs::write(&in_path, "5,50\n1,10\n3,30\n").unwrap();

    let mut e = Engine::create(&db_path).unwrap();
    let mut diagnostics = Vec::new();
    let loaded = load(&mut e, &in_path, &mut diagnostics).unwrap();
    assert_eq!(loaded, 3);

    let written = extract(&mut e, &out_path).unwrap();
    assert_eq!(written, 3);

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["1,10", "3,30", "5,50"]);
}

#[test]
fn random_insertion_order_yields_sorted_traversal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shuffled.db");

    let mut keys: Vec<u64> = (1..=200u64).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(1337);
    keys.shuffle(&mut rng);

    let mut e = Engine::create(&path).unwrap();
    for &k in &keys {
        e.insert(k, k * 2).unwrap();
    }

    for &k in &keys {
        assert_eq!(e.search(k).unwrap(), Some(k * 2));
    }

    let expected: Vec<(u64, u64)> = (1..=200u64).map(|k| (k, k * 2)).collect();
    assert_eq!(e.traverse().unwrap(), expected);
}

#[test]
fn duplicate_insert_is_rejected_and_tree_is_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.db");
    let mut e = Engine::create(&path).unwrap();

    e.insert(1, 10).unwrap();
    let before = e.traverse().unwrap();
    assert!(e.insert(1, 999).is_err());
    let after = e.traverse().unwrap();
    assert_eq!(before, after);
}
