// Controller response types
//
// Every network API endpoint wraps its payload in the `Envelope<T>` shape.
// WLAN objects carry dozens of firmware-dependent fields; only `_id` and
// `name` are modelled, the rest is kept verbatim in `extra` so a
// read-modify-write round-trips it unchanged.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi network API response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── WLAN ─────────────────────────────────────────────────────────────

/// WLAN configuration object from `rest/wlanconf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WlanConf {
    #[serde(rename = "_id")]
    pub id: String,
    /// The broadcast SSID.
    pub name: String,
    /// Everything else (security, vlan, radio settings, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wlanconf_keeps_unknown_fields() {
        let raw = json!({
            "_id": "w1",
            "name": "Guest",
            "security": "wpapsk",
            "x_passphrase": "hunter22",
            "vlan_enabled": false
        });
        let wlan: WlanConf = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(wlan.id, "w1");
        assert_eq!(wlan.extra.len(), 3);

        let back = serde_json::to_value(&wlan).expect("encode");
        assert_eq!(back, raw);
    }

    #[test]
    fn envelope_without_data_defaults_empty() {
        let env: Envelope<WlanConf> =
            serde_json::from_value(json!({ "meta": { "rc": "ok" } })).expect("decode");
        assert!(env.data.is_empty());
    }
}
