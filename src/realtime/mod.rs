//! Change-notification relay.
//!
//! Each open view holds one subscription against listling-server's
//! `/realtime` endpoint and treats every matching insert/update/delete
//! event as a refetch trigger; payloads are not diffed (coarse
//! invalidation is the correctness fallback). Subscriptions are closed
//! when the view unmounts so no handlers leak. There is no reconnect
//! logic: a dropped socket stops delivering invalidations until the view
//! remounts, and manual refresh still works.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

/// Handle owning the socket and its JS callbacks. Dropping the closures
/// while the socket is live would detach the handlers, so they ride along
/// until `close()`.
pub(crate) struct ChangeSubscription {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
}

impl ChangeSubscription {
    pub fn close(&self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        let _ = self.socket.close();
    }
}

pub(crate) fn realtime_url(base_url: &str, token: Option<&str>) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base_url.to_string()
    };

    match token {
        Some(t) => format!("{}/realtime?token={}", ws_base, urlencoding::encode(t)),
        None => format!("{}/realtime", ws_base),
    }
}

/// First frame sent after the socket opens. The server scopes pushed
/// events to these tables, optionally narrowed by one column filter
/// (e.g. items of a single list).
pub(crate) fn subscription_message(tables: &[&str], filter: Option<(&str, &str)>) -> String {
    let mut msg = serde_json::json!({ "action": "subscribe", "tables": tables });
    if let Some((column, value)) = filter {
        msg["filter"] = serde_json::json!({ "column": column, "value": value });
    }
    msg.to_string()
}

pub(crate) fn subscribe(
    base_url: &str,
    token: Option<String>,
    tables: &[&str],
    filter: Option<(&str, &str)>,
    on_change: impl Fn() + 'static,
) -> Option<ChangeSubscription> {
    let socket = WebSocket::new(&realtime_url(base_url, token.as_deref())).ok()?;

    let subscribe_frame = subscription_message(tables, filter);
    let socket_for_open = socket.clone();
    let on_open = Closure::wrap(Box::new(move || {
        let _ = socket_for_open.send_with_str(&subscribe_frame);
    }) as Box<dyn FnMut()>);
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

    let on_message = Closure::wrap(Box::new(move |_ev: MessageEvent| {
        on_change();
    }) as Box<dyn FnMut(MessageEvent)>);
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    Some(ChangeSubscription {
        socket,
        _on_open: on_open,
        _on_message: on_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_url_scheme_swap() {
        assert_eq!(
            realtime_url("http://localhost:6689", None),
            "ws://localhost:6689/realtime"
        );
        assert_eq!(
            realtime_url("https://api.example.com", None),
            "wss://api.example.com/realtime"
        );
    }

    #[test]
    fn test_realtime_url_encodes_token() {
        let url = realtime_url("http://localhost:6689", Some("a b+c"));
        assert_eq!(url, "ws://localhost:6689/realtime?token=a%20b%2Bc");
    }

    #[test]
    fn test_subscription_message_shape() {
        let msg = subscription_message(&["items"], Some(("list-id", "l1")));
        let v: serde_json::Value = serde_json::from_str(&msg).expect("valid json");
        assert_eq!(v["action"], "subscribe");
        assert_eq!(v["tables"][0], "items");
        assert_eq!(v["filter"]["column"], "list-id");
        assert_eq!(v["filter"]["value"], "l1");
    }

    #[test]
    fn test_subscription_message_without_filter() {
        let msg = subscription_message(&["lists", "memberships"], None);
        let v: serde_json::Value = serde_json::from_str(&msg).expect("valid json");
        assert!(v.get("filter").is_none());
        assert_eq!(v["tables"].as_array().map(|a| a.len()), Some(2));
    }
}
