use eyre::Result;

use crate::models::DisplayRecord;
use crate::services::catalog::Catalog;
use crate::services::purchase::Purchase;
use crate::view::View;

/// Ties the catalog loader, the purchase flow and the view state together:
/// a reload replaces the whole display sequence, a confirmed purchase
/// chains into exactly one reload.
pub struct Storefront {
    catalog: Catalog,
    purchase: Purchase,
    view: View,
}

impl Storefront {
    pub fn new(catalog: Catalog, purchase: Purchase) -> Self {
        Self {
            catalog,
            purchase,
            view: View::new(),
        }
    }

    /// Loads the catalog and publishes it. On failure the view keeps its
    /// previous records and loading state.
    pub async fn reload(&mut self) -> Result<()> {
        let records = self.catalog.load_listings().await?;
        self.view.publish(records);
        Ok(())
    }

    /// Buys a listed token at its displayed price, then refreshes the
    /// catalog. A failed purchase leaves the view untouched.
    pub async fn buy(&mut self, record: &DisplayRecord) -> Result<()> {
        self.purchase.buy(record).await?;
        self.reload().await
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }
}
