use std::env;

use ethers::types::Address;
use eyre::{Result, WrapErr};

/// Contract addresses and the provider endpoint, read once from the
/// environment and passed into the components at construction.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub rpc_url: String,
    pub nft_address: Address,
    pub market_address: Address,
}

impl MarketConfig {
    pub fn from_env() -> Result<Self> {
        let rpc_url = env::var("RPC_URL").wrap_err("RPC_URL must be set in a .env file")?;

        let nft_address: Address = env::var("NFT_ADDRESS")
            .wrap_err("NFT_ADDRESS must be set in a .env file")?
            .parse()
            .wrap_err("NFT_ADDRESS is not a valid contract address")?;

        let market_address: Address = env::var("MARKET_ADDRESS")
            .wrap_err("MARKET_ADDRESS must be set in a .env file")?
            .parse()
            .wrap_err("MARKET_ADDRESS is not a valid contract address")?;

        Ok(Self {
            rpc_url,
            nft_address,
            market_address,
        })
    }
}
