//! Cross-checks query results against rstar on the same data.

use mbr_tree::{BoundingBox, MatchType, MbrTree, TreeConfig};
use mbr_tree_int_test::test_util::{random_boxes, run_test, sorted_values};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

type Reference = RTree<GeomWithData<Rectangle<[f64; 2]>, usize>>;

fn reference_tree(entries: &[(usize, BoundingBox)]) -> Reference {
    RTree::bulk_load(
        entries
            .iter()
            .map(|(value, bbox)| {
                let rect = Rectangle::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
                GeomWithData::new(rect, *value)
            })
            .collect(),
    )
}

fn envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

fn random_window(rng: &mut StdRng) -> BoundingBox {
    let x = rng.gen_range(-50.0..1000.0);
    let y = rng.gen_range(-50.0..1000.0);
    let w = rng.gen_range(0.0..300.0);
    let h = rng.gen_range(0.0..300.0);
    BoundingBox::new(x, y, x + w, y + h)
}

#[test]
fn test_matches_rstar_after_inserts() {
    run_test("rstar_inserts", || {
        let entries = random_boxes(21, 2000, 1000.0, 25.0);
        let mut tree = MbrTree::new(TreeConfig::new(10))?;
        for (value, bbox) in &entries {
            tree.add(*value, *bbox)?;
        }
        let reference = reference_tree(&entries);
        let mut rng = StdRng::seed_from_u64(22);

        for _ in 0..100 {
            let window = random_window(&mut rng);

            let mut expected: Vec<usize> = reference
                .locate_in_envelope_intersecting(&envelope(&window))
                .map(|item| item.data)
                .collect();
            expected.sort_unstable();
            assert_eq!(
                sorted_values(tree.get(&window, None, MatchType::Intersect)),
                expected
            );

            let mut expected: Vec<usize> = reference
                .locate_in_envelope(&envelope(&window))
                .map(|item| item.data)
                .collect();
            expected.sort_unstable();
            assert_eq!(
                sorted_values(tree.get(&window, None, MatchType::Contains)),
                expected
            );
        }
        Ok(())
    });
}

#[test]
fn test_matches_rstar_after_deletes() {
    run_test("rstar_deletes", || {
        let entries = random_boxes(31, 1500, 1000.0, 25.0);
        let mut tree = MbrTree::bulk_load(TreeConfig::new(6), entries.clone())?;
        let mut rng = StdRng::seed_from_u64(32);

        // drop everything intersecting a few windows
        let mut removed_total = 0;
        for _ in 0..5 {
            let window = random_window(&mut rng);
            removed_total += tree.delete(&window, None, MatchType::Intersect)?;
            tree.assert_consistent()?;
        }
        assert_eq!(tree.len(), entries.len() - removed_total);

        let survivors: Vec<(usize, BoundingBox)> = tree.iter().map(|(v, b)| (*v, *b)).collect();
        let reference = reference_tree(&survivors);
        assert_eq!(reference.size(), tree.len());

        for _ in 0..100 {
            let window = random_window(&mut rng);
            let mut expected: Vec<usize> = reference
                .locate_in_envelope_intersecting(&envelope(&window))
                .map(|item| item.data)
                .collect();
            expected.sort_unstable();
            assert_eq!(
                sorted_values(tree.get(&window, None, MatchType::Intersect)),
                expected
            );
        }
        Ok(())
    });
}
