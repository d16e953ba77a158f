//! Position-based manual ordering over lists and items.
//!
//! Every entity carries an integer `position`; render order is ascending
//! position with creation time (descending) as the tiebreaker. Items are
//! ordered independently per checked-state partition. A completed move
//! gesture renumbers the whole affected partition to zero-based indices
//! and persists it as one batched write.

use crate::models::{Item, ShoppingList};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of a batched position upsert.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PositionWrite {
    pub id: String,
    pub position: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum MoveDirection {
    Up,
    Down,
}

pub(crate) fn cmp_lists(a: &ShoppingList, b: &ShoppingList) -> Ordering {
    // Rows predating manual ordering have no position and sort as 0.
    let pa = a.position.unwrap_or(0);
    let pb = b.position.unwrap_or(0);
    pa.cmp(&pb).then_with(|| b.created_at.cmp(&a.created_at))
}

pub(crate) fn cmp_items(a: &Item, b: &Item) -> Ordering {
    // Unchecked before checked, then manual order, then newest first.
    // Timestamps are RFC 3339, so the lexicographic compare is chronological.
    a.checked
        .cmp(&b.checked)
        .then_with(|| a.position.cmp(&b.position))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub(crate) fn sort_lists(lists: &mut [ShoppingList]) {
    lists.sort_by(cmp_lists);
}

pub(crate) fn sort_items(items: &mut [Item]) {
    items.sort_by(cmp_items);
}

/// Ids of one checked-state partition, in display order.
pub(crate) fn ordered_item_partition_ids(items: &[Item], checked: bool) -> Vec<String> {
    let mut part: Vec<&Item> = items.iter().filter(|i| i.checked == checked).collect();
    part.sort_by(|a, b| cmp_items(a, b));
    part.into_iter().map(|i| i.id.clone()).collect()
}

/// Ids of the whole list collection, in display order.
pub(crate) fn ordered_list_ids(lists: &[ShoppingList]) -> Vec<String> {
    let mut sorted: Vec<&ShoppingList> = lists.iter().collect();
    sorted.sort_by(|a, b| cmp_lists(a, b));
    sorted.into_iter().map(|l| l.id.clone()).collect()
}

/// Zero-based renumbering of a partition given in display order.
pub(crate) fn renumber(ordered_ids: &[String]) -> Vec<PositionWrite> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| PositionWrite {
            id: id.clone(),
            position: idx as i32,
        })
        .collect()
}

/// Move one entity exactly one slot up or down within its partition.
///
/// Returns the full partition's renumbered positions, or `None` at the
/// partition boundary (first entity cannot move up, last cannot move
/// down) so callers issue no write at all.
pub(crate) fn step_move(
    ordered_ids: &[String],
    id: &str,
    dir: MoveDirection,
) -> Option<Vec<PositionWrite>> {
    let idx = ordered_ids.iter().position(|x| x == id)?;

    let dst = match dir {
        MoveDirection::Up => idx.checked_sub(1)?,
        MoveDirection::Down => {
            if idx + 1 >= ordered_ids.len() {
                return None;
            }
            idx + 1
        }
    };

    let mut next = ordered_ids.to_vec();
    next.swap(idx, dst);
    Some(renumber(&next))
}

/// Continuous-drag splice: remove the dragged entity and re-insert it at
/// the target's index, renumbering the partition.
///
/// Returns `None` (caller ignores the event) when dragged == target or
/// when either id is not part of the partition — the latter is how
/// cross-partition drop targets are rejected.
pub(crate) fn splice(
    ordered_ids: &[String],
    dragged_id: &str,
    target_id: &str,
) -> Option<Vec<PositionWrite>> {
    if dragged_id == target_id {
        return None;
    }

    let from = ordered_ids.iter().position(|x| x == dragged_id)?;
    let to = ordered_ids.iter().position(|x| x == target_id)?;

    let mut next = ordered_ids.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(renumber(&next))
}

/// Apply a batch of position writes to in-memory items (live drag
/// feedback; the same writes later go to the backend in one upsert).
pub(crate) fn apply_item_positions(items: &mut [Item], writes: &[PositionWrite]) {
    for w in writes {
        if let Some(item) = items.iter_mut().find(|i| i.id == w.id) {
            item.position = w.position;
        }
    }
}

pub(crate) fn apply_list_positions(lists: &mut [ShoppingList], writes: &[PositionWrite]) {
    for w in writes {
        if let Some(list) = lists.iter_mut().find(|l| l.id == w.id) {
            list.position = Some(w.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, checked: bool, position: i32, created_at: &str) -> Item {
        Item {
            id: id.to_string(),
            list_id: "l1".to_string(),
            text: id.to_string(),
            url: None,
            checked,
            created_by: Some("a1".to_string()),
            created_at: created_at.to_string(),
            position,
        }
    }

    fn list(id: &str, position: Option<i32>, created_at: &str) -> ShoppingList {
        ShoppingList {
            id: id.to_string(),
            name: id.to_string(),
            icon: String::new(),
            icon_url: None,
            background_url: None,
            created_by: "a1".to_string(),
            created_at: created_at.to_string(),
            position,
        }
    }

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sort_items_unchecked_first_then_position_then_recency() {
        let mut items = vec![
            item("d", true, 0, "2024-05-04T00:00:00Z"),
            item("b", false, 1, "2024-05-02T00:00:00Z"),
            item("a", false, 0, "2024-05-01T00:00:00Z"),
            item("c", false, 1, "2024-05-03T00:00:00Z"),
        ];
        sort_items(&mut items);

        // c before b: same position, newer creation wins.
        let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_items_stable_for_any_input_order() {
        let base = vec![
            item("a", false, 0, "2024-05-01T00:00:00Z"),
            item("b", false, 0, "2024-05-02T00:00:00Z"),
            item("c", true, 0, "2024-05-03T00:00:00Z"),
        ];

        // Every permutation of equal-position items must sort identically.
        let perms: Vec<Vec<usize>> = vec![
            vec![0, 1, 2],
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
            vec![2, 1, 0],
        ];

        for p in perms {
            let mut items: Vec<Item> = p.iter().map(|&i| base[i].clone()).collect();
            sort_items(&mut items);
            let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(order, vec!["b", "a", "c"], "input permutation {:?}", p);
        }
    }

    #[test]
    fn test_sort_lists_missing_position_defaults_to_zero() {
        let mut lists = vec![
            list("old", None, "2024-01-01T00:00:00Z"),
            list("first", Some(0), "2024-03-01T00:00:00Z"),
            list("second", Some(1), "2024-02-01T00:00:00Z"),
        ];
        sort_lists(&mut lists);

        // "first" (pos 0, newer) sorts before "old" (no pos → 0, older).
        let order: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(order, vec!["first", "old", "second"]);
    }

    #[test]
    fn test_step_move_boundary_is_noop() {
        let ordered = ids(&["a", "b", "c"]);
        assert!(step_move(&ordered, "a", MoveDirection::Up).is_none());
        assert!(step_move(&ordered, "c", MoveDirection::Down).is_none());
        assert!(step_move(&ordered, "missing", MoveDirection::Up).is_none());
    }

    #[test]
    fn test_step_move_renumbers_whole_partition() {
        let ordered = ids(&["a", "b", "c"]);
        let writes = step_move(&ordered, "b", MoveDirection::Up).expect("not at boundary");

        assert_eq!(
            writes,
            vec![
                PositionWrite { id: "b".to_string(), position: 0 },
                PositionWrite { id: "a".to_string(), position: 1 },
                PositionWrite { id: "c".to_string(), position: 2 },
            ]
        );
    }

    #[test]
    fn test_splice_moves_dragged_to_target_index() {
        let ordered = ids(&["a", "b", "c"]);

        let writes = splice(&ordered, "c", "a").expect("valid drop target");
        assert_eq!(
            writes,
            vec![
                PositionWrite { id: "c".to_string(), position: 0 },
                PositionWrite { id: "a".to_string(), position: 1 },
                PositionWrite { id: "b".to_string(), position: 2 },
            ]
        );

        assert!(splice(&ordered, "a", "a").is_none());
        // Target outside the partition (e.g. a checked row under an
        // unchecked drag) is ignored.
        assert!(splice(&ordered, "a", "x").is_none());
    }

    #[test]
    fn test_full_reorder_round_trip() {
        // Items (A,B,C) at positions [0,1,2]; moving C to the top must
        // re-fetch as (C,A,B) under the defined sort order.
        let mut items = vec![
            item("A", false, 0, "2024-05-01T00:00:00Z"),
            item("B", false, 1, "2024-05-02T00:00:00Z"),
            item("C", false, 2, "2024-05-03T00:00:00Z"),
        ];

        let ordered = ordered_item_partition_ids(&items, false);
        let writes = splice(&ordered, "C", "A").expect("valid move");
        apply_item_positions(&mut items, &writes);

        sort_items(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_partition_independence() {
        let mut items = vec![
            item("u1", false, 0, "2024-05-01T00:00:00Z"),
            item("u2", false, 1, "2024-05-02T00:00:00Z"),
            item("u3", false, 2, "2024-05-03T00:00:00Z"),
            item("c1", true, 0, "2024-05-04T00:00:00Z"),
            item("c2", true, 1, "2024-05-05T00:00:00Z"),
        ];

        let checked_before: Vec<(String, i32)> = items
            .iter()
            .filter(|i| i.checked)
            .map(|i| (i.id.clone(), i.position))
            .collect();

        // Arbitrary sequence of repositions restricted to unchecked items.
        for (dragged, target) in [("u3", "u1"), ("u1", "u3"), ("u2", "u1")] {
            let ordered = ordered_item_partition_ids(&items, false);
            let writes = splice(&ordered, dragged, target).expect("valid move");
            apply_item_positions(&mut items, &writes);
        }
        let ordered = ordered_item_partition_ids(&items, false);
        if let Some(writes) = step_move(&ordered, "u2", MoveDirection::Down) {
            apply_item_positions(&mut items, &writes);
        }

        let checked_after: Vec<(String, i32)> = items
            .iter()
            .filter(|i| i.checked)
            .map(|i| (i.id.clone(), i.position))
            .collect();

        assert_eq!(checked_before, checked_after);
    }

    #[test]
    fn test_toggle_needs_no_position_rewrite() {
        // Toggling moves an item across partitions; the retained position
        // just slots it into the other partition's order on the next sort.
        let mut items = vec![
            item("u1", false, 0, "2024-05-01T00:00:00Z"),
            item("u2", false, 1, "2024-05-02T00:00:00Z"),
            item("c1", true, 0, "2024-05-03T00:00:00Z"),
        ];

        items[1].checked = true;
        sort_items(&mut items);

        let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["u1", "c1", "u2"]);
        // No write happened: positions are untouched.
        assert_eq!(
            items.iter().map(|i| i.position).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );
    }

    #[test]
    fn test_apply_list_positions_sets_explicit_slots() {
        let mut lists = vec![list("a", None, "2024-01-01T00:00:00Z")];
        apply_list_positions(
            &mut lists,
            &[PositionWrite { id: "a".to_string(), position: 4 }],
        );
        assert_eq!(lists[0].position, Some(4));
    }
}
