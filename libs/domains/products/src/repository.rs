use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// Repository trait for Product persistence
///
/// Implementations store fully-formed products; identity, timestamps and
/// validation are the service's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product
    async fn create(&self, product: Product) -> ProductResult<Product>;

    /// Get a product by ID, `NotFound` if absent
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product>;

    /// Every stored product, in no particular order
    async fn get_all(&self) -> ProductResult<Vec<Product>>;

    /// Replace the mutable fields of a stored product and return the stored result.
    ///
    /// `id` and `created_at` of the stored record are kept.
    async fn update(&self, id: Uuid, product: Product) -> ProductResult<Product>;

    /// Delete a product by ID. Deleting an unknown id succeeds.
    async fn delete(&self, id: Uuid) -> ProductResult<()>;
}

/// Process-local repository backed by a hash map
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(ProductError::AlreadyExists(product.id));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ProductError::NotFound(id))
    }

    async fn get_all(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn update(&self, id: Uuid, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let stored = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;

        stored.name = product.name;
        stored.description = product.description;
        stored.price = product.price;
        stored.quantity = product.quantity;
        stored.updated_at = product.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        self.products.write().await.remove(&id);
        Ok(())
    }
}
