use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Result, anyhow};

use crate::price::coingecko::DEFAULT_API_URL;

pub const RPC_URL_VAR: &str = "AUTOTASKS_RPC_URL";
pub const PRIVATE_KEY_VAR: &str = "AUTOTASKS_PRIVATE_KEY";
pub const COINGECKO_URL_VAR: &str = "COINGECKO_API_URL";

/// Credentials and endpoints resolved from the environment.
///
/// A private key, when present, is parsed up front so a malformed key fails
/// before any job work starts.
pub struct RuntimeConfig {
    rpc_url: Option<String>,
    pub coingecko_url: String,
    signer: Option<PrivateKeySigner>,
    pub dry_run: bool,
}

impl RuntimeConfig {
    pub fn from_env(dry_run: bool) -> Result<Self> {
        Self::from_lookup(dry_run, |name| std::env::var(name).ok())
    }

    /// Resolve through `lookup` instead of the process environment.
    pub fn from_lookup(dry_run: bool, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = lookup(RPC_URL_VAR).filter(|v| !v.trim().is_empty());
        let coingecko_url = lookup(COINGECKO_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let signer = lookup(PRIVATE_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(|key| {
                key.trim()
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| anyhow!("Invalid private key: {e}"))
            })
            .transpose()?;

        Ok(RuntimeConfig {
            rpc_url,
            coingecko_url,
            signer,
            dry_run,
        })
    }

    /// RPC endpoint, required by every job that reads the chain.
    pub fn rpc_url(&self) -> Result<&str> {
        self.rpc_url.as_deref().ok_or_else(|| {
            anyhow!("{RPC_URL_VAR} env var not set. Set it to an Ethereum mainnet RPC URL.")
        })
    }

    /// Safe owner key, required unless running dry.
    pub fn signer(&self) -> Result<Option<&PrivateKeySigner>> {
        match (&self.signer, self.dry_run) {
            (Some(signer), _) => Ok(Some(signer)),
            (None, true) => Ok(None),
            (None, false) => Err(anyhow!(
                "{PRIVATE_KEY_VAR} env var not set. \
                 Set it to the hex private key of a Safe owner, or pass --dry-run."
            )),
        }
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }
}
