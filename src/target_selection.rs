//! Picks the single face the mount should follow.

use opencv::core::Rect;

/// Area of a region in square pixels
#[must_use]
pub fn region_area(region: &Rect) -> i64 {
    i64::from(region.width) * i64::from(region.height)
}

/// Select the largest candidate by area.
///
/// The first region with the maximum area wins on ties. Returns `None` when
/// there are no candidates.
#[must_use]
pub fn select_target(candidates: &[Rect]) -> Option<Rect> {
    let mut best: Option<(Rect, i64)> = None;

    for candidate in candidates {
        let area = region_area(candidate);
        match best {
            Some((_, max_area)) if area <= max_area => {}
            _ => best = Some((*candidate, area)),
        }
    }

    best.map(|(region, _)| region)
}

/// Center pixel of a region, halving width and height with integer division
#[must_use]
pub const fn target_center(region: &Rect) -> (i32, i32) {
    (region.x + region.width / 2, region.y + region.height / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_candidates() {
        assert_eq!(select_target(&[]), None);
    }

    #[test]
    fn test_largest_wins() {
        let candidates = vec![
            Rect::new(0, 0, 60, 60),
            Rect::new(100, 100, 120, 90),
            Rect::new(10, 200, 80, 80),
        ];
        assert_eq!(select_target(&candidates), Some(Rect::new(100, 100, 120, 90)));
    }

    #[test]
    fn test_tie_keeps_first() {
        let candidates = vec![
            Rect::new(5, 5, 50, 100),
            Rect::new(200, 200, 100, 50),
            Rect::new(300, 300, 70, 70),
        ];
        assert_eq!(select_target(&candidates), Some(Rect::new(5, 5, 50, 100)));
    }

    #[test]
    fn test_zero_area_single_candidate() {
        let candidates = vec![Rect::new(12, 34, 0, 0)];
        assert_eq!(select_target(&candidates), Some(Rect::new(12, 34, 0, 0)));
    }

    #[test]
    fn test_area_does_not_overflow() {
        let huge = Rect::new(0, 0, i32::MAX, i32::MAX);
        assert_eq!(region_area(&huge), i64::from(i32::MAX) * i64::from(i32::MAX));
        assert_eq!(select_target(&[Rect::new(0, 0, 10, 10), huge]), Some(huge));
    }

    #[test]
    fn test_target_center() {
        assert_eq!(target_center(&Rect::new(0, 0, 100, 100)), (50, 50));
        // Odd sizes round down
        assert_eq!(target_center(&Rect::new(10, 20, 51, 33)), (35, 36));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (0..480i32, 0..480i32, 0..480i32, 0..480i32).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_selected_is_earliest_maximum(candidates in prop::collection::vec(rect_strategy(), 0..16)) {
            match select_target(&candidates) {
                None => prop_assert!(candidates.is_empty()),
                Some(selected) => {
                    let max_area = candidates.iter().map(region_area).max().unwrap_or(0);
                    let first_max = candidates
                        .iter()
                        .position(|c| region_area(c) == max_area)
                        .unwrap();
                    prop_assert_eq!(selected, candidates[first_max]);
                }
            }
        }
    }
}
