use serde::{Deserialize, Serialize};

/// Backend account info object.
///
/// listling-server returns this under the `account` field.
/// We keep it flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AccountInfo {
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl AccountInfo {
    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(|v| v.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ShoppingList {
    pub id: String,

    pub name: String,

    /// Emoji shown next to the name. A custom icon image overrides it.
    #[serde(default)]
    pub icon: String,

    /// Public URL of an uploaded icon image.
    #[serde(rename = "icon-url", default)]
    pub icon_url: Option<String>,

    /// Public URL of an uploaded background image.
    #[serde(rename = "background-url", default)]
    pub background_url: Option<String>,

    #[serde(rename = "created-by", default)]
    pub created_by: String,

    #[serde(rename = "created-at", default)]
    pub created_at: String,

    /// Manual sort slot. Rows created before manual ordering existed
    /// have no value and sort as 0.
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Item {
    pub id: String,

    #[serde(rename = "list-id")]
    pub list_id: String,

    pub text: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub checked: bool,

    /// Nullable: survives deletion of the creating account.
    #[serde(rename = "created-by", default)]
    pub created_by: Option<String>,

    #[serde(rename = "created-at", default)]
    pub created_at: String,

    /// Manual sort slot, scoped per list per checked-state partition.
    /// Not globally unique.
    #[serde(default)]
    pub position: i32,
}

/// Derived display aggregate ("N of M remaining"), never stored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListCounts {
    pub total: i64,
    pub unchecked: i64,
}
