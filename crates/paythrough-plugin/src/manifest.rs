use paythrough_core::PARAM_NAMES;
use serde_json::{json, Value};

pub const METHOD_NAME: &str = "paythrough";

const DESCRIPTION: &str = "Pay a bolt11 invoice through a specific channel, \
even if better/cheaper routes exist through other channels.";

const LONG_DESCRIPTION: &str = "Pay a bolt11 invoice through the channel {scid} as its first hop, \
even if better/cheaper routes exist through other channels. \
All parameters after scid are identical to pay except exclude, \
which is computed from scid; they are forwarded to pay unchanged.";

/// `bolt11 scid [msatoshi] [label] ...`
pub fn usage() -> String {
    PARAM_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i < 2 {
                name.to_string()
            } else {
                format!("[{name}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reply to the host's `getmanifest`.
pub fn manifest() -> Value {
    json!({
        "options": [],
        "rpcmethods": [{
            "name": METHOD_NAME,
            "usage": usage(),
            "description": DESCRIPTION,
            "long_description": LONG_DESCRIPTION,
        }],
        "subscriptions": ["shutdown"],
        "hooks": [],
        "dynamic": true,
    })
}
