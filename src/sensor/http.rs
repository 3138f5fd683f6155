use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::sensor::{FetchError, SensorSource};
use crate::state::{Config, Sample};

pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        cfg.endpoint_url()?;
        Ok(Self { client: Client::new(), endpoint: cfg.endpoint })
    }
}

/// Accepts JSON numbers and numeric strings; everything else is rejected.
fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| payload.get(*k))
}

fn invalid(reason: &str) -> FetchError {
    FetchError::InvalidPayload { reason: reason.to_string() }
}

/// Normalize a decoded response body into a [`Sample`] stamped with now.
///
/// The endpoint and older sensor firmwares disagree on key names, so
/// `temperature` falls back to `temp` and `smoke` to `ppm`. A reading with no
/// smoke channel defaults to 0; temperature and humidity have no sane default
/// and reject instead.
pub(crate) fn sample_from_payload(payload: &Value) -> Result<Sample, FetchError> {
    if !payload.is_object() {
        return Err(invalid("body is not a JSON object"));
    }

    let temperature = match field(payload, &["temperature", "temp"]) {
        Some(v) => coerce(v).ok_or_else(|| invalid("temperature is not numeric"))?,
        None => return Err(invalid("missing temperature")),
    };
    let humidity = match payload.get("humidity") {
        Some(v) => coerce(v).ok_or_else(|| invalid("humidity is not numeric"))?,
        None => return Err(invalid("missing humidity")),
    };
    let smoke = field(payload, &["smoke", "ppm"]).and_then(coerce).unwrap_or(0.0);

    Ok(Sample { timestamp: Utc::now(), temperature, humidity, smoke })
}

#[async_trait]
impl SensorSource for HttpSource {
    async fn sample(&self) -> Result<Sample, FetchError> {
        // Readings must be fresh; tell intermediaries not to serve a cached body.
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16() });
        }

        let payload: Value = resp.json().await.map_err(|err| {
            if err.is_decode() {
                invalid(&err.to_string())
            } else {
                FetchError::Network(err.to_string())
            }
        })?;

        sample_from_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_numeric_payload() {
        let sample =
            sample_from_payload(&json!({"temperature": 22.5, "humidity": 60, "smoke": 5})).unwrap();
        assert_eq!(sample.temperature, 22.5);
        assert_eq!(sample.humidity, 60.0);
        assert_eq!(sample.smoke, 5.0);
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let sample =
            sample_from_payload(&json!({"temperature": "21.3", "humidity": " 55 ", "smoke": "12"}))
                .unwrap();
        assert_eq!(sample.temperature, 21.3);
        assert_eq!(sample.humidity, 55.0);
        assert_eq!(sample.smoke, 12.0);
    }

    #[test]
    fn test_temp_and_ppm_aliases() {
        let sample = sample_from_payload(&json!({"temp": 19.0, "humidity": 40, "ppm": 7})).unwrap();
        assert_eq!(sample.temperature, 19.0);
        assert_eq!(sample.smoke, 7.0);
    }

    #[test]
    fn test_missing_smoke_defaults_to_zero() {
        let sample = sample_from_payload(&json!({"temperature": 20.0, "humidity": 45})).unwrap();
        assert_eq!(sample.smoke, 0.0);
    }

    #[test]
    fn test_missing_temperature_rejected() {
        let err = sample_from_payload(&json!({"humidity": 45, "smoke": 0})).unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn test_non_numeric_humidity_rejected() {
        let err =
            sample_from_payload(&json!({"temperature": 20.0, "humidity": "damp"})).unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let err = sample_from_payload(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }
}
