use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Round half toward positive infinity, matching how the published
/// calculators round currency amounts.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Decode validated skill input into its typed form.
pub(crate) fn decode<T: DeserializeOwned>(skill_id: &str, input: Value) -> anyhow::Result<T> {
    serde_json::from_value(input).with_context(|| format!("decoding {skill_id} input"))
}

pub(crate) fn encode<T: Serialize>(output: &T) -> anyhow::Result<Value> {
    serde_json::to_value(output).context("encoding skill output")
}
