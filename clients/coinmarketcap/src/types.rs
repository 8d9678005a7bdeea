use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// One coin entry of the ticker response.
///
/// The API reports numbers as strings and uses `null` for values it does not
/// know yet, so every numeric field is optional and accepts either form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ticker {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub price_usd: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub price_btc: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub total_supply: Option<f64>,
    #[serde(
        rename = "24h_volume_usd",
        default,
        deserialize_with = "number_or_string"
    )]
    pub daily_volume_usd: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawNumber::Number(n)) => Some(n),
        // Unparseable text is treated like null: the reading is not usable yet.
        Some(RawNumber::Text(s)) => s.trim().parse::<f64>().ok(),
        // Any other JSON type only invalidates this coin, not the whole response.
        Some(RawNumber::Other(_)) | None => None,
    })
}
