use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use eyre::{eyre, Result, WrapErr};

use crate::models::DisplayRecord;
use crate::units;
use crate::Market;

mod logging {
    pub use super::super::logging::logger;
}
use logging::logger::log_new_line;

pub type WalletSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

/// A user-authorized signing capability. Connecting may be refused, in
/// which case no transaction is ever constructed.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<WalletSigner>>;
}

/// Connector backed by the PRIVATE_KEY environment variable, bound to the
/// chain id reported by the endpoint.
pub struct EnvWallet {
    rpc_url: String,
}

impl EnvWallet {
    pub fn new(rpc_url: String) -> Self {
        Self { rpc_url }
    }
}

#[async_trait]
impl WalletConnector for EnvWallet {
    async fn connect(&self) -> Result<Arc<WalletSigner>> {
        let private_key =
            env::var("PRIVATE_KEY").wrap_err("PRIVATE_KEY must be set in a .env file")?;

        let provider =
            Provider::<Http>::try_from(self.rpc_url.as_str()).wrap_err("invalid RPC_URL")?;
        let chain_id = provider.get_chainid().await?;

        let wallet: LocalWallet = private_key
            .parse::<LocalWallet>()
            .wrap_err("PRIVATE_KEY is not a valid signing key")?
            .with_chain_id(chain_id.as_u64());

        Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
    }
}

/// Submits the payable sale call and waits for it to be mined.
#[async_trait]
pub trait SaleGateway: Send + Sync {
    async fn create_market_sale(
        &self,
        nft_contract: Address,
        token_id: U256,
        value: U256,
    ) -> Result<()>;
}

pub struct WalletSaleGateway {
    market_address: Address,
    wallet: Box<dyn WalletConnector>,
}

impl WalletSaleGateway {
    pub fn new(market_address: Address, wallet: Box<dyn WalletConnector>) -> Self {
        Self {
            market_address,
            wallet,
        }
    }
}

#[async_trait]
impl SaleGateway for WalletSaleGateway {
    async fn create_market_sale(
        &self,
        nft_contract: Address,
        token_id: U256,
        value: U256,
    ) -> Result<()> {
        let signer = self.wallet.connect().await?;
        let market = Market::new(self.market_address, signer);

        let call = market
            .create_market_sale(nft_contract, token_id)
            .value(value);
        let pending = call.send().await?;
        let receipt = pending
            .await?
            .ok_or_else(|| eyre!("transaction dropped before confirmation"))?;

        let output = format!(
            "Sale of token {} mined in tx {:?} \n",
            token_id, receipt.transaction_hash
        );
        log_new_line(&output)?;

        Ok(())
    }
}

/// The purchase flow: convert the displayed price back to base units and
/// buy the listing at exactly that value.
pub struct Purchase {
    nft_address: Address,
    gateway: Arc<dyn SaleGateway>,
}

impl Purchase {
    pub fn new(nft_address: Address, gateway: Arc<dyn SaleGateway>) -> Self {
        Self {
            nft_address,
            gateway,
        }
    }

    pub async fn buy(&self, record: &DisplayRecord) -> Result<()> {
        let value = units::to_base_units(&record.price)?;

        self.gateway
            .create_market_sale(self.nft_address, U256::from(record.token_id), value)
            .await
    }
}
