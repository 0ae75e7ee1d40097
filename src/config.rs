use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::StoreError;

/// Sender identity and numbering defaults. Loaded once at startup and
/// never mutated; flags and JSON fields override per invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub from_name: String,
    pub from_email: String,
    pub payment_method: String,
    pub invoice_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            from_name: "Adam Luck".to_string(),
            from_email: "adamluckydo@gmail.com".to_string(),
            payment_method: "PayPal - adamluckydo@gmail.com".to_string(),
            invoice_prefix: "INV-".to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    from_name: Option<String>,
    from_email: Option<String>,
    payment_method: Option<String>,
    invoice_prefix: Option<String>,
}

impl Config {
    pub fn load(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("config.json");
        if !path.exists() {
            return Ok(Self::default());
        }

        let reader = BufReader::new(File::open(&path)?);
        let overrides: ConfigFile = serde_json::from_reader(reader)
            .map_err(|source| StoreError::Corrupt { path, source })?;

        let mut config = Self::default();
        if let Some(name) = overrides.from_name {
            config.from_name = name;
        }
        if let Some(email) = overrides.from_email {
            config.from_email = email;
        }
        if let Some(payment) = overrides.payment_method {
            config.payment_method = payment;
        }
        if let Some(prefix) = overrides.invoice_prefix {
            config.invoice_prefix = prefix;
        }
        Ok(config)
    }
}
