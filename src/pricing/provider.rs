use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PricingError;

use super::resolver::parse_price_table;
use super::types::PriceTable;

pub(crate) const LITELLM_PRICING_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;

/// Where a price table comes from
pub(crate) trait PriceTableFetcher: Send + Sync {
    fn fetch(&self) -> Result<PriceTable, PricingError>;

    /// Short label for log lines
    fn describe(&self) -> String;
}

/// Downloads the LiteLLM price table
#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    url: String,
}

impl HttpFetcher {
    pub(crate) fn new(url: Option<String>) -> Self {
        HttpFetcher {
            url: url.unwrap_or_else(|| LITELLM_PRICING_URL.to_string()),
        }
    }

    fn fetch_once(&self, agent: &ureq::Agent) -> Result<PriceTable, PricingError> {
        let response = agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::StatusCode(code) => PricingError::Status { code },
            other => PricingError::Http(other),
        })?;

        let code = response.status().as_u16();
        if code != 200 {
            return Err(PricingError::Status { code });
        }

        let mut body = response.into_body();
        let raw: HashMap<String, serde_json::Value> = serde_json::from_reader(body.as_reader())?;
        Ok(parse_price_table(raw))
    }
}

impl PriceTableFetcher for HttpFetcher {
    fn fetch(&self) -> Result<PriceTable, PricingError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build()
            .into();

        let mut last_error = None;
        for attempt in 0..FETCH_RETRIES {
            match self.fetch_once(&agent) {
                Ok(table) => return Ok(table),
                Err(e) => {
                    tracing::debug!(attempt = attempt + 1, error = %e, "pricing fetch attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt + 1 < FETCH_RETRIES {
                std::thread::sleep(Duration::from_millis(
                    RETRY_BACKOFF_MS * (attempt as u64 + 1),
                ));
            }
        }

        Err(last_error.unwrap_or(PricingError::Status { code: 0 }))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a price table in LiteLLM format from disk
#[derive(Debug, Clone)]
pub(crate) struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub(crate) fn new(path: PathBuf) -> Self {
        FileFetcher { path }
    }
}

impl PriceTableFetcher for FileFetcher {
    fn fetch(&self) -> Result<PriceTable, PricingError> {
        let file = File::open(&self.path).map_err(|source| PricingError::Read {
            path: self.path.clone(),
            source,
        })?;
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_reader(BufReader::new(file))?;
        Ok(parse_price_table(raw))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
