use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Http, Provider};
use ethers::types::U256;
use eyre::{Result, WrapErr};
use tokio::task::JoinHandle;

use crate::config::MarketConfig;
use crate::models::{DisplayRecord, Listing, TokenMetadata};
use crate::try_join_all;
use crate::{Market, MarketToken, NftToken};

mod logging {
    pub use super::super::logging::logger;
}
use logging::logger::log_new_line;

const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only chain queries the catalog needs.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_market_tokens(&self) -> Result<Vec<Listing>>;
    async fn token_uri(&self, token_id: U256) -> Result<String>;
}

/// Resolves a metadata URI to the token's display document.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata>;
}

pub struct ChainListingSource {
    nft: Arc<NftToken<Provider<Http>>>,
    market: Arc<Market<Provider<Http>>>,
}

impl ChainListingSource {
    /// Opens a read-only connection and binds both contracts against it.
    pub fn connect(config: &MarketConfig) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(config.rpc_url.as_str()).wrap_err("invalid RPC_URL")?;
        let client = Arc::new(provider);

        let nft = Arc::new(NftToken::new(config.nft_address, Arc::clone(&client)));
        let market = Arc::new(Market::new(config.market_address, client));

        Ok(Self { nft, market })
    }
}

#[async_trait]
impl ListingSource for ChainListingSource {
    async fn fetch_market_tokens(&self) -> Result<Vec<Listing>> {
        let tokens = self.market.fetch_market_tokens().await?;
        Ok(tokens.into_iter().map(Listing::from).collect())
    }

    async fn token_uri(&self, token_id: U256) -> Result<String> {
        Ok(self.nft.token_uri(token_id).await?)
    }
}

impl From<MarketToken> for Listing {
    fn from(token: MarketToken) -> Self {
        Self {
            token_id: token.token_id,
            seller: token.seller,
            owner: token.owner,
            price: token.price,
            sold: token.sold,
        }
    }
}

pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()
            .wrap_err("build metadata http client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata> {
        let response = self.client.get(uri).send().await?.error_for_status()?;
        Ok(response.json::<TokenMetadata>().await?)
    }
}

type TaskRecord = JoinHandle<Result<DisplayRecord>>;

/// Loads the market catalog: every active listing joined with its resolved
/// metadata, in the order the contract returned them.
pub struct Catalog {
    source: Arc<dyn ListingSource>,
    metadata: Arc<dyn MetadataFetcher>,
}

impl Catalog {
    pub fn new(source: Arc<dyn ListingSource>, metadata: Arc<dyn MetadataFetcher>) -> Self {
        Self { source, metadata }
    }

    /// Fetches the active listings and resolves each one's metadata
    /// concurrently. All resolutions are joined; one failure fails the
    /// whole load and no partial sequence is produced.
    pub async fn load_listings(&self) -> Result<Vec<DisplayRecord>> {
        let listings = self.source.fetch_market_tokens().await?;
        let total = listings.len();

        let mut handles: Vec<TaskRecord> = Vec::new();

        for (position, listing) in listings.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let metadata = Arc::clone(&self.metadata);

            let handle: TaskRecord = tokio::spawn(async move {
                let uri = source.token_uri(listing.token_id).await?;
                let document = metadata.fetch(&uri).await?;
                let record = DisplayRecord::from_listing(&listing, document)?;

                let output = format!("Listing {} of {} resolved \n", position + 1, total);
                log_new_line(&output)?;

                Ok(record)
            });

            handles.push(handle);
        }

        let results = try_join_all(handles).await?;

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::H160;
    use eyre::eyre;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        listings: Vec<Listing>,
        fetch_calls: AtomicUsize,
    }

    #[async_trait]
    impl ListingSource for FakeSource {
        async fn fetch_market_tokens(&self) -> Result<Vec<Listing>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.listings.clone())
        }

        async fn token_uri(&self, token_id: U256) -> Result<String> {
            Ok(format!("http://meta.test/{}", token_id))
        }
    }

    struct FakeFetcher {
        fail_uri: Option<String>,
    }

    #[async_trait]
    impl MetadataFetcher for FakeFetcher {
        async fn fetch(&self, uri: &str) -> Result<TokenMetadata> {
            if self.fail_uri.as_deref() == Some(uri) {
                return Err(eyre!("metadata fetch failed: {}", uri));
            }

            let token_id: u64 = uri.rsplit('/').next().unwrap().parse().unwrap();
            // stagger so completion order differs from input order
            let delay = 30u64.saturating_sub(token_id * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            Ok(TokenMetadata {
                name: format!("Bird#{}", token_id),
                description: "d".to_string(),
                image: format!("ipfs://{}", token_id),
            })
        }
    }

    fn listing(token_id: u64) -> Listing {
        Listing {
            token_id: U256::from(token_id),
            seller: H160::from_low_u64_be(0xaa),
            owner: H160::from_low_u64_be(0xbb),
            price: U256::exp10(18) * U256::from(token_id),
            sold: false,
        }
    }

    fn catalog(listings: Vec<Listing>, fail_uri: Option<String>) -> Catalog {
        Catalog::new(
            Arc::new(FakeSource {
                listings,
                fetch_calls: AtomicUsize::new(0),
            }),
            Arc::new(FakeFetcher { fail_uri }),
        )
    }

    #[tokio::test]
    async fn preserves_listing_order_and_identifiers() {
        let catalog = catalog(vec![listing(1), listing(2), listing(3)], None);

        let records = catalog.load_listings().await.unwrap();

        assert_eq!(records.len(), 3);
        let ids: Vec<u64> = records.iter().map(|r| r.token_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(records[2].name, "Bird#3");
        assert_eq!(records[2].price, "3.0");
    }

    #[tokio::test]
    async fn loading_twice_yields_equal_sequences() {
        let catalog = catalog(vec![listing(1), listing(2)], None);

        let first = catalog.load_listings().await.unwrap();
        let second = catalog.load_listings().await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_market_yields_empty_catalog() {
        let catalog = catalog(Vec::new(), None);

        let records = catalog.load_listings().await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn failed_metadata_fetch_fails_whole_load() {
        let catalog = catalog(
            vec![listing(1), listing(2), listing(3)],
            Some("http://meta.test/2".to_string()),
        );

        assert!(catalog.load_listings().await.is_err());
    }
}
