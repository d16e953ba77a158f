pub(crate) mod sync;

use crate::api::ApiClient;
use crate::models::{AccountInfo, Item, ListCounts, ShoppingList};
use crate::storage::load_user_from_storage;
use leptos::prelude::*;
use std::collections::HashMap;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,

    /// Lists the current account is a member of.
    pub lists: RwSignal<Vec<ShoppingList>>,
    pub lists_loading: RwSignal<bool>,
    pub lists_error: RwSignal<Option<String>>,

    /// Derived "N of M remaining" aggregates, keyed by list id.
    pub counts: RwSignal<HashMap<String, ListCounts>>,

    /// Items of the currently open list.
    pub items: RwSignal<Vec<Item>>,
    pub items_loading: RwSignal<bool>,
    pub items_error: RwSignal<Option<String>>,

    /// Load guards (avoid duplicate loads + ignore stale responses).
    pub lists_request_id: RwSignal<u64>,
    pub items_request_id: RwSignal<u64>,
    pub items_last_loaded_list_id: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
            lists: RwSignal::new(vec![]),
            lists_loading: RwSignal::new(false),
            lists_error: RwSignal::new(None),
            counts: RwSignal::new(HashMap::new()),
            items: RwSignal::new(vec![]),
            items_loading: RwSignal::new(false),
            items_error: RwSignal::new(None),
            lists_request_id: RwSignal::new(0),
            items_request_id: RwSignal::new(0),
            items_last_loaded_list_id: RwSignal::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
