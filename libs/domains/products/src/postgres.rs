use async_trait::async_trait;
use futures::TryStreamExt;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait};
use uuid::Uuid;

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::Product,
    repository::ProductRepository,
};

/// PostgreSQL-backed repository
///
/// Expects the `products` table from `manifests/migrations/inventory`.
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = product.into();
        let model = active_model.insert(&self.db).await?;

        tracing::debug!(product_id = %model.id, "Inserted product row");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product> {
        entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Product::from)
            .ok_or(ProductError::NotFound(id))
    }

    async fn get_all(&self) -> ProductResult<Vec<Product>> {
        let products = entity::Entity::find()
            .stream(&self.db)
            .await?
            .map_ok(Product::from)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(products)
    }

    async fn update(&self, id: Uuid, product: Product) -> ProductResult<Product> {
        let active_model = entity::ActiveModel {
            id: Unchanged(id),
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            quantity: Set(product.quantity),
            created_at: NotSet,
            updated_at: Set(product.updated_at.into()),
        };

        match entity::Entity::update(active_model).exec(&self.db).await {
            Ok(model) => Ok(model.into()),
            Err(DbErr::RecordNotUpdated) => Err(ProductError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        tracing::debug!(product_id = %id, rows = result.rows_affected, "Deleted product row");
        Ok(())
    }
}
