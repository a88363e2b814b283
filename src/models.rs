use ethers::types::{H160, U256};
use eyre::Result;
use hex::encode;
use serde::{Deserialize, Serialize};

use crate::units;

/// A token offered for sale, as returned by the market contract's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub token_id: U256,
    pub seller: H160,
    pub owner: H160,
    pub price: U256,
    pub sold: bool,
}

/// The off-chain document a token's metadata URI points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// One catalog entry ready for display: a listing joined with its resolved
/// metadata, addresses and price rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub token_id: u64,
    pub price: String,
    pub seller: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl DisplayRecord {
    pub fn from_listing(listing: &Listing, metadata: TokenMetadata) -> Result<Self> {
        Ok(Self {
            token_id: listing.token_id.as_u64(),
            price: units::to_decimal_string(listing.price)?,
            seller: format_address(&listing.seller),
            owner: format_address(&listing.owner),
            name: metadata.name,
            description: metadata.description,
            image: metadata.image,
        })
    }
}

pub fn format_address(address: &H160) -> String {
    format!("0x{}", encode(address.as_fixed_bytes()))
}
