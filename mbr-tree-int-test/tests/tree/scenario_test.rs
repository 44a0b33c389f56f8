//! Split, condense and collapse scenarios on a small fan-out tree.

use mbr_tree::{BoundingBox, MatchType, MbrTree, TreeResult};
use mbr_tree_int_test::test_util::{run_test, small_tree, sorted_values};

/// Three boxes near the origin and two far away, inserted interleaved.
fn two_clusters() -> TreeResult<MbrTree<&'static str>> {
    let mut tree = small_tree()?;
    tree.add_box("west-1", 0.0, 0.0, 1.0, 1.0)?;
    tree.add_box("east-1", 100.0, 100.0, 101.0, 101.0)?;
    tree.add_box("west-2", 1.0, 1.0, 2.0, 2.0)?;
    tree.add_box("east-2", 101.0, 101.0, 102.0, 102.0)?;
    tree.add_box("west-3", 0.5, 0.5, 1.5, 1.5)?;
    Ok(tree)
}

#[test]
fn test_single_split_separates_clusters() {
    run_test("single_split", || {
        let tree = two_clusters()?;
        tree.assert_consistent()?;
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.height(), Some(1));

        let stats = tree.stats();
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.node_count, 3);

        // one dump row per child node, each covering one cluster
        let rows = tree.dump();
        let mut child_boxes: Vec<BoundingBox> = rows
            .iter()
            .filter(|row| row.height == 1)
            .map(|row| row.bbox)
            .collect();
        child_boxes.sort();
        assert_eq!(
            child_boxes,
            vec![
                BoundingBox::new(0.0, 0.0, 2.0, 2.0),
                BoundingBox::new(100.0, 100.0, 102.0, 102.0),
            ]
        );
        Ok(())
    });
}

#[test]
fn test_underflow_reinserts_orphan() {
    run_test("underflow_reinsert", || {
        let mut tree = two_clusters()?;
        let removed = tree.delete_box(100.0, 100.0, 101.0, 101.0, Some(&"east-1"), MatchType::Equal)?;
        assert_eq!(removed, 1);
        assert_eq!(tree.len(), 4);
        tree.assert_consistent()?;

        let all = sorted_values(tree.iter());
        assert_eq!(all, vec!["east-2", "west-1", "west-2", "west-3"]);

        let orphan = sorted_values(tree.get_box(
            101.0,
            101.0,
            102.0,
            102.0,
            None,
            MatchType::Equal,
        ));
        assert_eq!(orphan, vec!["east-2"]);
        Ok(())
    });
}

#[test]
fn test_root_collapses_one_level_per_delete() {
    run_test("root_collapse", || {
        let mut tree = small_tree()?;
        let points: Vec<(usize, f64, f64)> = (0..64)
            .map(|i| (i, (i % 8) as f64 * 3.0, (i / 8) as f64 * 3.0))
            .collect();
        for &(value, x, y) in &points {
            tree.add_point(value, x, y)?;
        }
        tree.assert_consistent()?;
        let start_height = tree.height().unwrap_or(0);
        assert!(start_height >= 2, "height {}", start_height);

        let mut collapses = 0;
        for &(value, x, y) in &points {
            let before = tree.height();
            assert_eq!(tree.delete_point(x, y, Some(&value), MatchType::Equal)?, 1);
            tree.assert_consistent()?;

            match (before, tree.height()) {
                (Some(b), Some(a)) if a < b => {
                    assert_eq!(a + 1, b, "height dropped from {} to {}", b, a);
                    collapses += 1;
                }
                (Some(_), Some(_)) => {}
                (Some(0), None) => {}
                other => panic!("unexpected height change {:?}", other),
            }
        }
        assert!(tree.is_empty());
        assert!(collapses >= start_height);
        Ok(())
    });
}

#[test]
fn test_contains_excludes_partial_overlap() {
    run_test("contains_query", || {
        let mut tree = small_tree()?;
        tree.add_box("inside-1", 1.0, 1.0, 2.0, 2.0)?;
        tree.add_box("inside-2", 5.0, 5.0, 9.0, 9.0)?;
        tree.add_box("on-edge", 0.0, 0.0, 10.0, 1.0)?;
        tree.add_point("inside-point", 3.0, 7.0)?;
        tree.add_box("straddling", 8.0, 8.0, 12.0, 12.0)?;
        tree.add_box("outside", 20.0, 20.0, 21.0, 21.0)?;
        tree.add_box("covering", -5.0, -5.0, 15.0, 15.0)?;

        let inside = sorted_values(tree.get_box(0.0, 0.0, 10.0, 10.0, None, MatchType::Contains));
        assert_eq!(inside, vec!["inside-1", "inside-2", "inside-point", "on-edge"]);

        let overlapping =
            sorted_values(tree.get_box(0.0, 0.0, 10.0, 10.0, None, MatchType::Intersect));
        assert_eq!(
            overlapping,
            vec!["covering", "inside-1", "inside-2", "inside-point", "on-edge", "straddling"]
        );
        Ok(())
    });
}
