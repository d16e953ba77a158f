use crate::models::{AccountInfo, Item, ListCounts, ShoppingList};
use crate::ordering::PositionWrite;
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    /// Caller has a valid session but no membership on the target list.
    Forbidden,
    /// Target row does not exist (share: no account with that email).
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn from_status(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        let kind = match status.as_u16() {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Http,
        };

        let message = match kind {
            ApiErrorKind::Unauthorized => "Unauthorized".to_string(),
            _ => format!("{ctx} ({status}): {body}"),
        };

        Self { kind, message }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:6689".to_string();

        // We support BOTH `window.ENV.API_URL` (documented in README) and
        // `window.ENV.api_url` (legacy/implementation detail) for compatibility.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    // 1) Prefer README style: API_URL
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    // 2) Fallback: api_url
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub account: AccountInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateListRequest {
    pub name: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AddItemRequest {
    #[serde(rename = "list-id")]
    pub list_id: String,

    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Patch for a single item. All fields optional; absent fields are
/// left untouched by the backend.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    // Doubly wrapped so `Some(None)` serializes as an explicit null
    // (clear the link) while `None` omits the key entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ShareListRequest {
    #[serde(rename = "list-id")]
    pub list_id: String,
    pub email: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.post(url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, body, "Request failed"))
        }
    }

    // ---------- auth ----------

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.request_api(
            "/auth/sign-in",
            Some(&AuthRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub async fn signup(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.request_api(
            "/auth/sign-up",
            Some(&AuthRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    // ---------- lists ----------

    pub async fn get_lists(&self) -> ApiResult<Vec<ShoppingList>> {
        let data: serde_json::Value = self
            .request_api("/listling/get-lists", Some(&serde_json::json!({})))
            .await?;
        Ok(Self::parse_list_rows(data))
    }

    pub async fn get_list_counts(&self, list_id: &str) -> ApiResult<ListCounts> {
        let data: serde_json::Value = self
            .request_api(
                "/listling/get-list-counts",
                Some(&serde_json::json!({ "list-id": list_id })),
            )
            .await?;

        Ok(ListCounts {
            total: data.get("total").and_then(|v| v.as_i64()).unwrap_or(0),
            unchecked: data.get("unchecked").and_then(|v| v.as_i64()).unwrap_or(0),
        })
    }

    /// Server-side atomic procedure: creates the list AND inserts the
    /// creator's membership row. The row comes back so the new id is
    /// available before anything renders.
    pub async fn create_list(&self, name: &str, icon: &str) -> ApiResult<ShoppingList> {
        let data: serde_json::Value = self
            .request_api(
                "/listling/create-list",
                Some(&CreateListRequest {
                    name: name.to_string(),
                    icon: icon.to_string(),
                }),
            )
            .await?;

        let row = data.get("list").cloned().unwrap_or(data);
        Self::parse_list_row(&row).ok_or_else(|| {
            ApiError::parse(format!(
                "Create list succeeded but response is missing the list row: {}",
                row
            ))
        })
    }

    pub async fn rename_list(&self, list_id: &str, name: &str) -> ApiResult<()> {
        self.request_api(
            "/listling/update-list",
            Some(&serde_json::json!({ "list-id": list_id, "name": name })),
        )
        .await
    }

    pub async fn set_list_icon(&self, list_id: &str, icon: &str) -> ApiResult<()> {
        self.request_api(
            "/listling/update-list",
            Some(&serde_json::json!({ "list-id": list_id, "icon": icon })),
        )
        .await
    }

    /// Persist (or clear, with `None`) one of the media URL fields.
    /// `field` is "icon-url" or "background-url".
    pub async fn update_list_media(
        &self,
        list_id: &str,
        field: &str,
        url: Option<&str>,
    ) -> ApiResult<()> {
        self.request_api(
            "/listling/update-list",
            Some(&serde_json::json!({ "list-id": list_id, field: url })),
        )
        .await
    }

    /// Batched position upsert for the whole list collection.
    pub async fn reorder_lists(&self, writes: &[PositionWrite]) -> ApiResult<()> {
        self.request_api(
            "/listling/reorder-lists",
            Some(&serde_json::json!({ "positions": writes })),
        )
        .await
    }

    /// Cascades server-side: items and memberships go with the list.
    pub async fn delete_list(&self, list_id: &str) -> ApiResult<()> {
        self.request_api(
            "/listling/delete-list",
            Some(&serde_json::json!({ "list-id": list_id })),
        )
        .await
    }

    pub async fn share_list(&self, list_id: &str, email: &str) -> ApiResult<()> {
        self.request_api(
            "/listling/share-list",
            Some(&ShareListRequest {
                list_id: list_id.to_string(),
                email: email.to_string(),
            }),
        )
        .await
    }

    // ---------- items ----------

    pub async fn get_items(&self, list_id: &str) -> ApiResult<Vec<Item>> {
        let data: serde_json::Value = self
            .request_api(
                "/listling/get-items",
                Some(&serde_json::json!({ "list-id": list_id })),
            )
            .await?;
        Ok(Self::parse_item_rows(data))
    }

    pub async fn add_item(
        &self,
        list_id: &str,
        text: &str,
        url: Option<String>,
    ) -> ApiResult<Item> {
        let data: serde_json::Value = self
            .request_api(
                "/listling/add-item",
                Some(&AddItemRequest {
                    list_id: list_id.to_string(),
                    text: text.to_string(),
                    url,
                }),
            )
            .await?;

        let row = data.get("item").cloned().unwrap_or(data);
        Self::parse_item_row(&row).ok_or_else(|| {
            ApiError::parse(format!(
                "Add item succeeded but response is missing the item row: {}",
                row
            ))
        })
    }

    pub async fn update_item(&self, item_id: &str, patch: &ItemPatch) -> ApiResult<()> {
        let mut body = serde_json::to_value(patch).map_err(ApiError::parse)?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert(
                "item-id".to_string(),
                serde_json::Value::String(item_id.to_string()),
            );
        }
        self.request_api("/listling/update-item", Some(&body)).await
    }

    /// Batched position upsert for one checked-state partition of a list.
    pub async fn reorder_items(&self, list_id: &str, writes: &[PositionWrite]) -> ApiResult<()> {
        self.request_api(
            "/listling/reorder-items",
            Some(&serde_json::json!({ "list-id": list_id, "positions": writes })),
        )
        .await
    }

    pub async fn delete_item(&self, item_id: &str) -> ApiResult<()> {
        self.delete_items(&[item_id.to_string()]).await
    }

    pub async fn delete_items(&self, item_ids: &[String]) -> ApiResult<()> {
        self.request_api(
            "/listling/delete-items",
            Some(&serde_json::json!({ "item-ids": item_ids })),
        )
        .await
    }

    // ---------- media ----------

    /// Raw byte upload into object storage. The body is the file content;
    /// bucket and object path are part of the URL.
    pub async fn upload_media(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let url = format!("{}/media/{}/{}", self.base_url, bucket, path);
        let mut req = client.post(url);
        req = Self::with_auth_headers(req, self.get_auth_token());
        req = req.header("Content-Type", content_type.to_string()).body(bytes);

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(())
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, body, "Upload failed"))
        }
    }

    /// Objects are served publicly under the same bucket/path they were
    /// uploaded to, so the URL is derivable without a round-trip.
    pub fn public_media_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/media/{}/{}", self.base_url, bucket, path)
    }

    // ---------- row parsing ----------

    // listling-server is observed to return rows either with canonical
    // kebab-case keys or namespaced `listling-<table>/<col>` keys depending
    // on the endpoint revision. Accept both.

    pub(crate) fn parse_list_row(item: &serde_json::Value) -> Option<ShoppingList> {
        if let Ok(row) = serde_json::from_value::<ShoppingList>(item.clone()) {
            if !row.id.trim().is_empty() {
                return Some(row);
            }
        }

        let get_s = |k: &str| item.get(k).and_then(|v| v.as_str()).map(|s| s.to_string());
        let get_i = |k: &str| item.get(k).and_then(|v| v.as_i64());

        let id = get_s("listling-lists/id")?;
        if id.trim().is_empty() {
            return None;
        }

        Some(ShoppingList {
            id,
            name: get_s("listling-lists/name").unwrap_or_default(),
            icon: get_s("listling-lists/icon").unwrap_or_default(),
            icon_url: get_s("listling-lists/icon-url"),
            background_url: get_s("listling-lists/background-url"),
            created_by: get_s("listling-lists/created-by").unwrap_or_default(),
            created_at: get_s("listling-lists/created-at").unwrap_or_default(),
            position: get_i("listling-lists/position").map(|p| p as i32),
        })
    }

    pub(crate) fn parse_list_rows(data: serde_json::Value) -> Vec<ShoppingList> {
        let rows = data
            .get("list-rows")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        rows.iter().filter_map(Self::parse_list_row).collect()
    }

    pub(crate) fn parse_item_row(item: &serde_json::Value) -> Option<Item> {
        if let Ok(row) = serde_json::from_value::<Item>(item.clone()) {
            if !row.id.trim().is_empty() && !row.list_id.trim().is_empty() {
                return Some(row);
            }
        }

        let get_s = |k: &str| item.get(k).and_then(|v| v.as_str()).map(|s| s.to_string());
        let get_i = |k: &str| item.get(k).and_then(|v| v.as_i64());
        let get_b = |k: &str| item.get(k).and_then(|v| v.as_bool());

        let id = get_s("listling-items/id")?;
        let list_id = get_s("listling-items/list-id")?;
        if id.trim().is_empty() || list_id.trim().is_empty() {
            return None;
        }

        Some(Item {
            id,
            list_id,
            text: get_s("listling-items/text").unwrap_or_default(),
            url: get_s("listling-items/url").filter(|s| !s.trim().is_empty()),
            checked: get_b("listling-items/checked").unwrap_or(false),
            created_by: get_s("listling-items/created-by"),
            created_at: get_s("listling-items/created-at").unwrap_or_default(),
            position: get_i("listling-items/position").unwrap_or(0) as i32,
        })
    }

    pub(crate) fn parse_item_rows(data: serde_json::Value) -> Vec<Item> {
        let rows = data
            .get("item-rows")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        rows.iter().filter_map(Self::parse_item_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_contract_deserialize() {
        // Contract based on listling-server: handlers/auth.rs
        let json = r#"{
            "token": "jwt-token",
            "account": {"id": "a1", "email": "u@example.com"}
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).expect("auth response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.account.email(), Some("u@example.com"));
    }

    #[test]
    fn test_parse_list_rows_canonical_keys() {
        let data = serde_json::json!({
            "list-rows": [
                {
                    "id": "l1",
                    "name": "Groceries",
                    "icon": "🛒",
                    "created-by": "a1",
                    "created-at": "2024-05-01T10:00:00Z",
                    "position": 2
                }
            ]
        });

        let rows = ApiClient::parse_list_rows(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "l1");
        assert_eq!(rows[0].name, "Groceries");
        assert_eq!(rows[0].position, Some(2));
        assert!(rows[0].icon_url.is_none());
    }

    #[test]
    fn test_parse_list_rows_namespaced_keys() {
        let data = serde_json::json!({
            "list-rows": [
                {
                    "listling-lists/id": "l2",
                    "listling-lists/name": "Hardware",
                    "listling-lists/icon": "🔧",
                    "listling-lists/icon-url": "http://cdn/x.png",
                    "listling-lists/created-by": "a1",
                    "listling-lists/created-at": "2024-05-02T10:00:00Z"
                }
            ]
        });

        let rows = ApiClient::parse_list_rows(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "l2");
        assert_eq!(rows[0].icon_url.as_deref(), Some("http://cdn/x.png"));
        // No position column on old rows.
        assert_eq!(rows[0].position, None);
    }

    #[test]
    fn test_parse_list_rows_skips_rows_without_id() {
        let data = serde_json::json!({
            "list-rows": [
                { "name": "no id" },
                { "id": "", "name": "blank id" },
                { "id": "ok", "name": "fine" }
            ]
        });

        let rows = ApiClient::parse_list_rows(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "ok");
    }

    #[test]
    fn test_parse_item_rows_both_key_styles() {
        let data = serde_json::json!({
            "item-rows": [
                {
                    "id": "i1",
                    "list-id": "l1",
                    "text": "Milk",
                    "checked": false,
                    "created-at": "2024-05-01T10:00:00Z",
                    "position": 0
                },
                {
                    "listling-items/id": "i2",
                    "listling-items/list-id": "l1",
                    "listling-items/text": "Bread",
                    "listling-items/checked": true,
                    "listling-items/created-by": null,
                    "listling-items/created-at": "2024-05-01T11:00:00Z",
                    "listling-items/position": 1
                }
            ]
        });

        let rows = ApiClient::parse_item_rows(data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "i1");
        assert!(!rows[0].checked);
        assert_eq!(rows[1].id, "i2");
        assert!(rows[1].checked);
        // Creator is nullable (survives account deletion).
        assert!(rows[1].created_by.is_none());
    }

    #[test]
    fn test_item_patch_url_clear_serializes_explicit_null() {
        let patch = ItemPatch {
            url: Some(None),
            ..Default::default()
        };
        let v = serde_json::to_value(&patch).expect("should serialize");
        assert!(v.get("url").is_some_and(|u| u.is_null()));
        assert!(v.get("checked").is_none());
    }

    #[test]
    fn test_error_kind_classification() {
        let forbidden =
            ApiError::from_status(reqwest::StatusCode::FORBIDDEN, "not a member".into(), "Share");
        assert_eq!(forbidden.kind, ApiErrorKind::Forbidden);

        let not_found =
            ApiError::from_status(reqwest::StatusCode::NOT_FOUND, "no such user".into(), "Share");
        assert_eq!(not_found.kind, ApiErrorKind::NotFound);

        let teapot = ApiError::from_status(
            reqwest::StatusCode::IM_A_TEAPOT,
            "short and stout".into(),
            "Request failed",
        );
        assert_eq!(teapot.kind, ApiErrorKind::Http);
    }

    #[test]
    fn test_api_client_auth_header_state() {
        let mut client = ApiClient::new("http://localhost:6689".to_string());
        assert!(!client.is_authenticated());
        assert!(client.get_auth_token().is_none());

        client.set_token("my-jwt-token".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.get_auth_token().as_deref(), Some("my-jwt-token"));
    }

    #[test]
    fn test_public_media_url_shape() {
        let client = ApiClient::new("http://localhost:6689".to_string());
        assert_eq!(
            client.public_media_url("list-media", "l1/icon-abc.png"),
            "http://localhost:6689/media/list-media/l1/icon-abc.png"
        );
    }
}
