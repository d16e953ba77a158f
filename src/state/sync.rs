//! Optimistic mutation engine.
//!
//! Toggle, delete and reposition apply to local state synchronously and
//! settle with the backend afterwards. Every optimistic write follows the
//! same contract: capture the before-state, mutate the signal, issue the
//! remote call, and on failure either restore the captured value or pull
//! the authoritative collection. Creation is deliberately NOT optimistic:
//! the backend assigns the id, and nothing can render or be further
//! mutated without one.

use crate::api::{ApiError, ApiResult};
use crate::models::Item;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Recovery policy for a failed remote write.
pub(crate) enum Recovery {
    /// Put the captured before-state back. Sufficient when the mutation
    /// only changed fields in place (toggle).
    Restore,
    /// Discard optimistic state and re-fetch the authoritative collection.
    /// Needed when the local mutation discarded data (delete) or shifted
    /// siblings (reorder).
    Refetch(Callback<()>),
}

/// Apply `mutate` locally, run `write` remotely, recover on failure.
///
/// The local mutation is synchronous relative to the event loop, so two
/// rapid operations on different entities never interleave incorrectly;
/// only the remote settlement is asynchronous.
pub(crate) fn run_optimistic<T, Fut>(
    collection: RwSignal<Vec<T>>,
    mutate: impl FnOnce(&mut Vec<T>),
    write: Fut,
    recovery: Recovery,
    on_error: impl Fn(ApiError) + 'static,
) where
    T: Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = ApiResult<()>> + 'static,
{
    let prior = collection.get_untracked();
    collection.update(mutate);

    spawn_local(async move {
        if let Err(e) = write.await {
            match recovery {
                Recovery::Restore => collection.set(prior),
                Recovery::Refetch(refetch) => refetch.run(()),
            }
            on_error(e);
        }
    });
}

// Local-apply helpers. Kept as plain functions over the collection so the
// rollback contract is testable without a reactive runtime.

/// Flip an item's checked flag; returns the prior flag for rollback.
pub(crate) fn toggle_checked(items: &mut [Item], item_id: &str) -> Option<bool> {
    let item = items.iter_mut().find(|i| i.id == item_id)?;
    let prior = item.checked;
    item.checked = !prior;
    Some(prior)
}

pub(crate) fn restore_checked(items: &mut [Item], item_id: &str, prior: bool) {
    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
        item.checked = prior;
    }
}

/// Remove a single item, returning the discarded row.
pub(crate) fn remove_item(items: &mut Vec<Item>, item_id: &str) -> Option<Item> {
    let idx = items.iter().position(|i| i.id == item_id)?;
    Some(items.remove(idx))
}

/// Remove every checked item, returning the removed ids (the bulk delete
/// payload).
pub(crate) fn remove_checked(items: &mut Vec<Item>) -> Vec<String> {
    let ids: Vec<String> = items
        .iter()
        .filter(|i| i.checked)
        .map(|i| i.id.clone())
        .collect();
    items.retain(|i| !i.checked);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, checked: bool) -> Item {
        Item {
            id: id.to_string(),
            list_id: "l1".to_string(),
            text: id.to_string(),
            url: None,
            checked,
            created_by: None,
            created_at: "2024-05-01T00:00:00Z".to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_toggle_rollback_restores_exact_before_state() {
        let mut items = vec![item("a", false), item("b", true)];
        let before = items.clone();

        let prior = toggle_checked(&mut items, "a").expect("item exists");
        assert!(items[0].checked);

        // Remote update failed: flip back.
        restore_checked(&mut items, "a", prior);
        assert_eq!(
            items.iter().map(|i| i.checked).collect::<Vec<_>>(),
            before.iter().map(|i| i.checked).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_toggle_missing_item_is_noop() {
        let mut items = vec![item("a", false)];
        assert!(toggle_checked(&mut items, "ghost").is_none());
        assert!(!items[0].checked);
    }

    #[test]
    fn test_delete_rollback_via_refetch_restores_row() {
        let mut items = vec![item("a", false), item("b", false)];
        let authoritative = items.clone();

        let removed = remove_item(&mut items, "a").expect("item exists");
        assert_eq!(removed.id, "a");
        assert_eq!(items.len(), 1);

        // The removed row's data was discarded, so a failed delete recovers
        // by replacing local state with the authoritative collection.
        items = authoritative.clone();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.id == "a"));
    }

    #[test]
    fn test_remove_checked_returns_bulk_payload() {
        let mut items = vec![item("a", true), item("b", false), item("c", true)];
        let ids = remove_checked(&mut items);

        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "b");
    }

    #[test]
    fn test_remove_checked_with_none_checked_is_empty() {
        let mut items = vec![item("a", false)];
        assert!(remove_checked(&mut items).is_empty());
        assert_eq!(items.len(), 1);
    }
}
