//! Decides which question, if any, is due at a playback position

use super::item::{AnsweredSet, QuizItem};

/// Half-width of the window around a question's timestamp in which it is due.
/// Must exceed the tracker's poll interval so a question is never stepped over.
pub const MATCH_WINDOW_SECS: f64 = 1.5;

/// Minimum distance between consecutive question timestamps. Strictly wider
/// than two windows, since the window is inclusive at both ends.
pub const MIN_QUESTION_SPACING_SECS: f64 = 2.0 * MATCH_WINDOW_SECS + 0.5;

/// Index of the unanswered item closest to `current_time` within the
/// matching window. Ties go to the earlier item.
pub fn due_index(current_time: f64, items: &[QuizItem], answered: &AnsweredSet) -> Option<usize> {
    if !current_time.is_finite() {
        return None;
    }

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !answered.contains(&item.id))
        .map(|(i, item)| (i, (item.timestamp - current_time).abs()))
        .filter(|&(_, distance)| distance <= MATCH_WINDOW_SECS)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::quiz::item::tests::item;

    #[test]
    fn due_inside_window_only() {
        let items = vec![item("a", 10.0)];
        let answered = AnsweredSet::default();

        assert_eq!(due_index(5.0, &items, &answered), None);
        assert_eq!(due_index(8.4, &items, &answered), None);
        assert_eq!(due_index(8.5, &items, &answered), Some(0));
        assert_eq!(due_index(10.0, &items, &answered), Some(0));
        assert_eq!(due_index(11.5, &items, &answered), Some(0));
        assert_eq!(due_index(11.6, &items, &answered), None);
    }

    #[test]
    fn answered_items_are_skipped() {
        let items = vec![item("a", 10.0)];
        let mut answered = AnsweredSet::default();
        answered.record("a", false);
        assert_eq!(due_index(10.0, &items, &answered), None);
    }

    #[test]
    fn closest_item_wins() {
        let items = vec![item("a", 10.0), item("b", 11.0)];
        let answered = AnsweredSet::default();
        assert_eq!(due_index(10.2, &items, &answered), Some(0));
        assert_eq!(due_index(10.8, &items, &answered), Some(1));
        // Equidistant goes to the earlier one
        assert_eq!(due_index(10.5, &items, &answered), Some(0));
    }

    #[test]
    fn nan_time_is_never_due() {
        let items = vec![item("a", 0.0)];
        assert_eq!(due_index(f64::NAN, &items, &AnsweredSet::default()), None);
    }

    proptest! {
        #[test]
        fn result_is_unanswered_and_in_window(
            timestamps in prop::collection::vec(0.0f64..600.0, 0..8),
            answered_mask in prop::collection::vec(any::<bool>(), 8),
            t in 0.0f64..600.0,
        ) {
            let items: Vec<_> = timestamps
                .iter()
                .enumerate()
                .map(|(i, &ts)| item(&format!("q{i}"), ts))
                .collect();
            let mut answered = AnsweredSet::default();
            for (i, it) in items.iter().enumerate() {
                if answered_mask[i] {
                    answered.record(it.id.clone(), true);
                }
            }

            match due_index(t, &items, &answered) {
                Some(i) => {
                    prop_assert!(!answered.contains(&items[i].id));
                    let distance = (items[i].timestamp - t).abs();
                    prop_assert!(distance <= MATCH_WINDOW_SECS);
                    for other in items.iter().filter(|o| !answered.contains(&o.id)) {
                        prop_assert!((other.timestamp - t).abs() >= distance);
                    }
                }
                None => {
                    for other in items.iter().filter(|o| !answered.contains(&o.id)) {
                        prop_assert!((other.timestamp - t).abs() > MATCH_WINDOW_SECS);
                    }
                }
            }
        }
    }
}
