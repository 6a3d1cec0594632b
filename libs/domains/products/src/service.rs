//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Fields in the order their rules are checked; the first failure is reported.
const VALIDATION_ORDER: [&str; 4] = ["name", "price", "quantity", "description"];

/// Product service providing business logic operations
///
/// Owns identity assignment, timestamps and validation. Every write goes
/// through [`validate`] first.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut product = Product::draft(input);
        validate(&product)?;

        product.id = Uuid::new_v4();
        let product = self.repository.create(product).await?;

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        reject_nil(id)?;
        self.repository.get_by_id(id).await
    }

    /// List all products
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.get_all().await
    }

    /// Update an existing product
    ///
    /// Loads the current record, merges the patch, advances `updated_at` and
    /// validates the merged result before anything is written.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        reject_nil(id)?;

        let mut product = self.repository.get_by_id(id).await?;
        product.apply_update(input);
        product.touch();
        validate(&product)?;

        let product = self.repository.update(id, product).await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(product)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        reject_nil(id)?;
        self.repository.delete(id).await?;

        tracing::info!(product_id = %id, "Deleted product");
        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn reject_nil(id: Uuid) -> ProductResult<()> {
    if id.is_nil() {
        return Err(ProductError::invalid("id", "product id is required"));
    }
    Ok(())
}

/// Check a product against the field rules, reporting the first violation.
pub fn validate(product: &Product) -> ProductResult<()> {
    product.validate().map_err(first_violation)
}

fn first_violation(errors: ValidationErrors) -> ProductError {
    let field_errors = errors.field_errors();

    for field in VALIDATION_ORDER {
        if let Some(error) = field_errors.get(field).and_then(|errs| errs.first()) {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid {}", field));
            return ProductError::invalid(field, message);
        }
    }

    ProductError::InvalidInput {
        field: None,
        message: errors.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now_micros;
    use crate::repository::MockProductRepository;
    use chrono::TimeDelta;
    use mockall::predicate::*;

    fn valid_input() -> CreateProduct {
        CreateProduct {
            name: "Keyboard".to_string(),
            description: "Mechanical keyboard".to_string(),
            price: 1500,
            quantity: 10,
        }
    }

    fn stored() -> Product {
        let mut product = Product::draft(valid_input());
        product.id = Uuid::new_v4();
        product.created_at = now_micros() - TimeDelta::minutes(5);
        product.updated_at = product.created_at;
        product
    }

    fn field_of(err: ProductError) -> Option<&'static str> {
        match err {
            ProductError::InvalidInput { field, .. } => field,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_product_assigns_id_and_timestamps() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|product| Ok(product));

        let service = ProductService::new(mock_repo);
        let product = service.create_product(valid_input()).await.unwrap();

        assert!(!product.id.is_nil());
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.name, "Keyboard");
    }

    #[tokio::test]
    async fn test_create_product_rejects_each_rule_without_touching_repository() {
        let cases: Vec<(CreateProduct, &str)> = vec![
            (
                CreateProduct {
                    name: String::new(),
                    ..valid_input()
                },
                "name",
            ),
            (
                CreateProduct {
                    price: -1,
                    ..valid_input()
                },
                "price",
            ),
            (
                CreateProduct {
                    quantity: -1,
                    ..valid_input()
                },
                "quantity",
            ),
            (
                CreateProduct {
                    description: String::new(),
                    ..valid_input()
                },
                "description",
            ),
            (
                CreateProduct {
                    description: "x".repeat(501),
                    ..valid_input()
                },
                "description",
            ),
        ];

        for (input, expected_field) in cases {
            let mut mock_repo = MockProductRepository::new();
            mock_repo.expect_create().times(0);

            let service = ProductService::new(mock_repo);
            let err = service.create_product(input).await.unwrap_err();
            assert_eq!(field_of(err), Some(expected_field));
        }
    }

    #[tokio::test]
    async fn test_validation_reports_first_rule_in_order() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().times(0);

        let service = ProductService::new(mock_repo);
        let err = service
            .create_product(CreateProduct {
                name: String::new(),
                description: String::new(),
                price: -5,
                quantity: -5,
            })
            .await
            .unwrap_err();

        assert_eq!(field_of(err), Some("name"));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let id = Uuid::new_v4();
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(|id| Err(ProductError::NotFound(id)));

        let service = ProductService::new(mock_repo);
        let result = service.get_product(id).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_nil_id_is_rejected_for_every_operation() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().times(0);
        mock_repo.expect_update().times(0);
        mock_repo.expect_delete().times(0);

        let service = ProductService::new(mock_repo);

        let get = service.get_product(Uuid::nil()).await.unwrap_err();
        assert_eq!(field_of(get), Some("id"));

        let update = service
            .update_product(Uuid::nil(), UpdateProduct::default())
            .await
            .unwrap_err();
        assert_eq!(field_of(update), Some("id"));

        let delete = service.delete_product(Uuid::nil()).await.unwrap_err();
        assert_eq!(field_of(delete), Some("id"));
    }

    #[tokio::test]
    async fn test_empty_patch_only_advances_updated_at() {
        let existing = stored();
        let id = existing.id;
        let before = existing.clone();

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(existing.clone()));
        mock_repo
            .expect_update()
            .times(1)
            .returning(|_, product| Ok(product));

        let service = ProductService::new(mock_repo);
        let updated = service
            .update_product(id, UpdateProduct::default())
            .await
            .unwrap();

        assert_eq!(updated.name, before.name);
        assert_eq!(updated.description, before.description);
        assert_eq!(updated.price, before.price);
        assert_eq!(updated.quantity, before.quantity);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_invalid_patch_is_not_persisted() {
        let existing = stored();
        let id = existing.id;

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(existing.clone()));
        mock_repo.expect_update().times(0);

        let service = ProductService::new(mock_repo);
        let err = service
            .update_product(
                id,
                UpdateProduct {
                    quantity: Some(-3),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(field_of(err), Some("quantity"));
    }

    #[tokio::test]
    async fn test_update_returns_repository_result() {
        let existing = stored();
        let id = existing.id;

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(existing.clone()));
        mock_repo
            .expect_update()
            .withf(move |target, product| *target == id && product.price == 1400)
            .times(1)
            .returning(|_, product| Ok(product));

        let service = ProductService::new(mock_repo);
        let updated = service
            .update_product(
                id,
                UpdateProduct {
                    price: Some(1400),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 1400);
        assert_eq!(updated.name, "Keyboard");
    }

    #[tokio::test]
    async fn test_update_unknown_product_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Err(ProductError::NotFound(id)));
        mock_repo.expect_update().times(0);

        let service = ProductService::new(mock_repo);
        let result = service
            .update_product(Uuid::new_v4(), UpdateProduct::default())
            .await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_delegates() {
        let id = Uuid::new_v4();
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(()));

        let service = ProductService::new(mock_repo);
        assert!(service.delete_product(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_products_delegates() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_all()
            .times(1)
            .returning(|| Ok(vec![stored(), stored()]));

        let service = ProductService::new(mock_repo);
        assert_eq!(service.list_products().await.unwrap().len(), 2);
    }
}
