//! Inbound `paythrough` request and the outbound `pay` call built from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::{ExclusionId, ShortChannelId};

/// Positional parameter order accepted by the `paythrough` method.
pub const PARAM_NAMES: [&str; 9] = [
    "bolt11",
    "scid",
    "msatoshi",
    "label",
    "riskfactor",
    "maxfeepercent",
    "retry_for",
    "maxdelay",
    "exemptfee",
];

/// Optional `pay` parameters forwarded untouched.
///
/// `None` means "not supplied": the field is left out of the engine call
/// so the engine applies its own default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayParams {
    /// Amount in millisatoshi, for invoices that carry none.
    #[serde(rename = "msatoshi", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "riskfactor", default, skip_serializing_if = "Option::is_none")]
    pub risk_factor: Option<f64>,
    #[serde(rename = "maxfeepercent", default, skip_serializing_if = "Option::is_none")]
    pub max_fee_percent: Option<f64>,
    /// Seconds the engine may keep retrying.
    #[serde(rename = "retry_for", default, skip_serializing_if = "Option::is_none")]
    pub retry_duration: Option<u64>,
    /// Maximum total CLTV delay in blocks.
    #[serde(rename = "maxdelay", default, skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<u32>,
    /// Fee in millisatoshi below which `max_fee_percent` is not enforced.
    #[serde(rename = "exemptfee", default, skip_serializing_if = "Option::is_none")]
    pub exempt_fee: Option<u64>,
}

/// A request to pay `bolt11` with `scid` as the first hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayThroughRequest {
    pub bolt11: String,
    pub scid: ShortChannelId,
    #[serde(flatten)]
    pub params: PayParams,
}

impl PayThroughRequest {
    pub fn new(bolt11: impl Into<String>, scid: impl Into<ShortChannelId>) -> Self {
        Self {
            bolt11: bolt11.into(),
            scid: scid.into(),
            params: PayParams::default(),
        }
    }

    pub fn with_params(mut self, params: PayParams) -> Self {
        self.params = params;
        self
    }

    /// Parse JSON-RPC params given either by name or by position.
    pub fn from_params(params: Value) -> Result<Self, CoreError> {
        let named = match params {
            Value::Object(map) => map,
            Value::Array(values) => positional_to_named(values)?,
            Value::Null => Map::new(),
            other => {
                return Err(CoreError::InvalidParams(format!(
                    "expected object or array, got {other}"
                )))
            }
        };

        if named.contains_key("exclude") {
            return Err(CoreError::InvalidParams(
                "exclude is derived from scid and cannot be supplied".into(),
            ));
        }
        if let Some(unknown) = named.keys().find(|k| !PARAM_NAMES.contains(&k.as_str())) {
            return Err(CoreError::InvalidParams(format!(
                "unknown parameter: {unknown}"
            )));
        }
        for field in ["bolt11", "scid"] {
            if named.get(field).map_or(true, Value::is_null) {
                return Err(CoreError::MissingField(field.into()));
            }
        }

        serde_json::from_value(Value::Object(named))
            .map_err(|e| CoreError::InvalidParams(e.to_string()))
    }
}

fn positional_to_named(values: Vec<Value>) -> Result<Map<String, Value>, CoreError> {
    if values.len() > PARAM_NAMES.len() {
        return Err(CoreError::InvalidParams(format!(
            "too many parameters: got {}, at most {}",
            values.len(),
            PARAM_NAMES.len()
        )));
    }
    Ok(PARAM_NAMES
        .iter()
        .zip(values)
        .filter(|(_, v)| !v.is_null())
        .map(|(name, v)| (name.to_string(), v))
        .collect())
}

/// The engine's `pay` call: the caller's invoice and parameters plus the
/// computed exclusion list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayCall {
    pub bolt11: String,
    #[serde(flatten)]
    pub params: PayParams,
    pub exclude: Vec<ExclusionId>,
}

/// The engine's success payload, passed back to the caller as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentResult(pub Value);

impl PaymentResult {
    pub fn into_inner(self) -> Value {
        self.0
    }
}
