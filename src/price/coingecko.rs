use std::collections::HashMap;

use alloy::primitives::Address;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;

use crate::model::amount::{FixedPoint, PRICE_DECIMALS};

use super::PriceSource;
use super::retry::{BASE_DELAY, MAX_ATTEMPTS, is_transient, retry_if};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";
const QUOTE_CURRENCY: &str = "usd";

// ── API response types ───────────────────────────────────────────────

/// `/simple/token_price/ethereum` response: lowercase address → currency → price.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct TokenPriceResponse(HashMap<String, HashMap<String, f64>>);

// ── Client ───────────────────────────────────────────────────────────

/// CoinGecko token price client for Ethereum mainnet tokens.
pub struct CoinGecko {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGecko {
    pub fn new(base_url: impl Into<String>) -> Self {
        CoinGecko {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, tokens: &[Address]) -> Result<TokenPriceResponse> {
        let url = format!("{}/simple/token_price/ethereum", self.base_url);
        let addresses = tokens
            .iter()
            .map(|t| t.to_string().to_lowercase())
            .collect::<Vec<_>>()
            .join(",");

        retry_if(MAX_ATTEMPTS, BASE_DELAY, is_transient, || {
            let client = self.client.clone();
            let url = url.clone();
            let addresses = addresses.clone();
            async move {
                let r = client
                    .get(&url)
                    .query(&[
                        ("contract_addresses", addresses.as_str()),
                        ("vs_currencies", QUOTE_CURRENCY),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<TokenPriceResponse>()
                    .await?;
                Ok(r)
            }
        })
        .await
        .context("fetching CoinGecko token prices")
    }
}

impl Default for CoinGecko {
    fn default() -> Self {
        CoinGecko::new(DEFAULT_API_URL)
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    async fn token_prices(&self, tokens: &[Address]) -> Result<Vec<FixedPoint>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.fetch(tokens).await?;
        tokens
            .iter()
            .map(|token| price_for(&response, *token))
            .collect()
    }
}

fn price_for(response: &TokenPriceResponse, token: Address) -> Result<FixedPoint> {
    let price = response
        .0
        .get(&token.to_string().to_lowercase())
        .and_then(|quotes| quotes.get(QUOTE_CURRENCY))
        .copied()
        .ok_or_else(|| anyhow!("CoinGecko returned no {QUOTE_CURRENCY} price for {token}"))?;
    tracing::debug!(%token, price, "coingecko price");
    FixedPoint::from_f64(price, PRICE_DECIMALS)
        .with_context(|| format!("converting CoinGecko price for {token}"))
}
