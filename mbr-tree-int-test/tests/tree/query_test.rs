use mbr_tree::{BoundingBox, MatchType, MbrTree, TreeConfig, TreeError};
use mbr_tree_int_test::test_util::{random_boxes, run_test, small_tree, sorted_values};

#[test]
fn test_add_then_get_round_trip() {
    run_test("round_trip", || {
        let mut tree = small_tree()?;
        for (value, bbox) in random_boxes(7, 200, 100.0, 5.0) {
            tree.add(value, bbox)?;
        }
        for (value, bbox) in random_boxes(7, 200, 100.0, 5.0) {
            let found = sorted_values(tree.get(&bbox, Some(&value), MatchType::Equal));
            assert_eq!(found, vec![value], "entry {} at {}", value, bbox);
        }
        Ok(())
    });
}

#[test]
fn test_point_is_zero_size_box() {
    run_test("point_semantics", || {
        let mut tree = small_tree()?;
        tree.add_point(1, 4.0, 4.0)?;
        tree.add_box(2, 4.0, 4.0, 4.0, 4.0)?;
        tree.add_box(3, 0.0, 0.0, 8.0, 8.0)?;

        assert_eq!(
            sorted_values(tree.get_point(4.0, 4.0, None, MatchType::Equal)),
            vec![1, 2]
        );
        assert_eq!(
            sorted_values(tree.get_box(4.0, 4.0, 4.0, 4.0, None, MatchType::Equal)),
            vec![1, 2]
        );
        assert_eq!(
            sorted_values(tree.get_point(4.0, 4.0, None, MatchType::Contained)),
            vec![1, 2, 3]
        );
        assert_eq!(
            sorted_values(tree.get_point(4.0, 4.0, None, MatchType::Contains)),
            vec![1, 2]
        );
        // a corner touch counts as intersecting
        assert_eq!(
            sorted_values(tree.get_point(8.0, 8.0, None, MatchType::Intersect)),
            vec![3]
        );
        Ok(())
    });
}

#[test]
fn test_value_filter_narrows_matches() {
    run_test("value_filter", || {
        let mut tree = small_tree()?;
        for i in 0..20 {
            tree.add_box(format!("even-{}", i % 2 == 0), 0.0, 0.0, 1.0 + i as f64, 1.0)?;
        }
        let filter = "even-true".to_string();
        let evens = tree
            .get_box(-1.0, -1.0, 50.0, 50.0, Some(&filter), MatchType::Contains)
            .count();
        assert_eq!(evens, 10);

        let removed = tree.delete_box(-1.0, -1.0, 50.0, 50.0, Some(&filter), MatchType::Contains)?;
        assert_eq!(removed, 10);
        assert_eq!(tree.len(), 10);
        tree.assert_consistent()?;
        assert!(tree.iter().all(|(value, _)| value == "even-false"));
        Ok(())
    });
}

#[test]
fn test_query_can_stop_early() {
    run_test("early_stop", || {
        let mut tree = small_tree()?;
        for (value, bbox) in random_boxes(11, 500, 100.0, 2.0) {
            tree.add(value, bbox)?;
        }
        let mut query = tree.get_box(0.0, 0.0, 100.0, 100.0, None, MatchType::Intersect);
        let first: Vec<usize> = query.by_ref().take(3).map(|(value, _)| *value).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(query.count(), 497);
        Ok(())
    });
}

#[test]
fn test_delete_count_matches_prior_query() {
    run_test("delete_count", || {
        let mut tree = MbrTree::new(TreeConfig::new(6))?;
        for (value, bbox) in random_boxes(3, 400, 200.0, 10.0) {
            tree.add(value, bbox)?;
        }
        let queries = [
            (BoundingBox::new(10.0, 10.0, 60.0, 90.0), MatchType::Intersect),
            (BoundingBox::new(100.0, 0.0, 200.0, 50.0), MatchType::Contains),
            (BoundingBox::point(150.0, 150.0), MatchType::Contained),
        ];
        for (bbox, match_type) in queries {
            let before = tree.len();
            let expected = tree.get(&bbox, None, match_type).count();
            let removed = tree.delete(&bbox, None, match_type)?;
            assert_eq!(removed, expected);
            assert_eq!(tree.len(), before - removed);
            assert_eq!(tree.get(&bbox, None, match_type).count(), 0);
            tree.assert_consistent()?;
        }
        Ok(())
    });
}

#[test]
fn test_delete_count_with_value_filter() {
    run_test("delete_count_value", || {
        let match_types = [
            MatchType::Equal,
            MatchType::Contained,
            MatchType::Contains,
            MatchType::Intersect,
        ];
        for match_type in match_types {
            let mut tree = small_tree()?;
            // every box holds three values, one of them twice
            for (index, bbox) in random_boxes(13, 60, 100.0, 8.0) {
                let label = index % 4;
                tree.add(label, bbox)?;
                tree.add(label, bbox)?;
                tree.add((label + 1) % 4, bbox)?;
                tree.add(10 + label, bbox)?;
            }
            let windows = [
                BoundingBox::new(20.0, 20.0, 70.0, 70.0),
                BoundingBox::new(0.0, 0.0, 108.0, 108.0),
            ];
            let stored: Vec<BoundingBox> =
                tree.iter().map(|(_, bbox)| *bbox).take(2).collect();

            for bbox in windows.iter().chain(stored.iter()) {
                for value in [0, 2, 11] {
                    let before = tree.len();
                    let expected = tree.get(bbox, Some(&value), match_type).count();
                    let others = tree.get(bbox, None, match_type).count() - expected;
                    let removed = tree.delete(bbox, Some(&value), match_type)?;
                    assert_eq!(removed, expected, "{:?} {} value {}", match_type, bbox, value);
                    assert_eq!(tree.len(), before - removed);
                    assert_eq!(tree.get(bbox, Some(&value), match_type).count(), 0);
                    assert_eq!(tree.get(bbox, None, match_type).count(), others);
                    tree.assert_consistent()?;
                }
            }
        }
        Ok(())
    });
}

#[test]
fn test_bulk_load_holds_same_entries() {
    run_test("bulk_load", || {
        let entries = random_boxes(5, 1000, 500.0, 4.0);
        let loaded = MbrTree::bulk_load(TreeConfig::default(), entries.clone())?;
        loaded.assert_consistent()?;
        assert_eq!(loaded.len(), 1000);

        let mut incremental = MbrTree::new(TreeConfig::default())?;
        for (value, bbox) in entries {
            incremental.add(value, bbox)?;
        }
        assert_eq!(loaded.bounds(), incremental.bounds());

        let window = BoundingBox::new(100.0, 100.0, 250.0, 300.0);
        assert_eq!(
            sorted_values(loaded.get(&window, None, MatchType::Intersect)),
            sorted_values(incremental.get(&window, None, MatchType::Intersect))
        );
        Ok(())
    });
}

#[test]
fn test_invalid_configurations() {
    for config in [
        TreeConfig::new(4).with_min_entries(3),
        TreeConfig::new(10).with_min_entries(0),
        TreeConfig::new(1),
    ] {
        let result: Result<MbrTree<u8>, _> = MbrTree::new(config);
        match result {
            Err(TreeError::Config(message)) => assert!(!message.is_empty()),
            other => panic!("expected config error for {:?}, got {:?}", config, other.map(|_| ())),
        }
    }
}

#[test]
fn test_debug_string_lists_every_entry() {
    run_test("debug_string", || {
        let mut tree = small_tree()?;
        for i in 0..10 {
            tree.add_point(i, i as f64, 0.0)?;
        }
        let text = tree.to_debug_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), tree.dump().len());

        let height = tree.height().unwrap_or(0);
        assert!(lines[0].starts_with(&format!("{:2} (", height + 1)));
        assert_eq!(lines.iter().filter(|line| line.starts_with(" 0 ")).count(), 10);
        Ok(())
    });
}
