use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::sync::Arc;

use ethers::prelude::abigen;
use futures::future::try_join_all;

mod services {
    pub mod catalog;
    pub mod logging;
    pub mod purchase;
}

mod config;
mod models;
mod storefront;
mod units;
mod view;

use config::MarketConfig;
use services::catalog::{Catalog, ChainListingSource, HttpMetadataFetcher};
use services::logging::logger::LOG_PATH;
use services::purchase::{EnvWallet, Purchase, WalletSaleGateway};
use storefront::Storefront;

abigen!(NftToken, "src/data/nft.json");
abigen!(Market, "src/data/market.json");

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv::dotenv().ok();

    let config = MarketConfig::from_env()?;

    fs::create_dir_all("logs")?;
    File::create(LOG_PATH)?;

    let source = ChainListingSource::connect(&config)?;
    let catalog = Catalog::new(Arc::new(source), Arc::new(HttpMetadataFetcher::new()?));

    let wallet = EnvWallet::new(config.rpc_url.clone());
    let gateway = WalletSaleGateway::new(config.market_address, Box::new(wallet));
    let purchase = Purchase::new(config.nft_address, Arc::new(gateway));

    let mut storefront = Storefront::new(catalog, purchase);
    storefront.view_mut().subscribe(|records| {
        if records.is_empty() {
            println!("No tokens listed in the market");
            return;
        }
        for record in records {
            println!(
                "Token {}: {} | {} ETH | seller {}",
                record.token_id, record.name, record.price, record.seller
            );
        }
    });

    storefront.reload().await?;

    let args: Vec<String> = env::args().collect();
    if args.len() == 3 && args[1] == "buy" {
        let token_id: u64 = args[2].parse()?;
        let record = storefront
            .view()
            .records()
            .iter()
            .find(|record| record.token_id == token_id)
            .cloned()
            .ok_or("token is not listed in the market")?;

        storefront.buy(&record).await?;
        println!("Purchase of token {} confirmed", token_id);
    }

    Ok(())
}
