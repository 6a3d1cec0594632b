use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Maximum description length, counted in Unicode scalar values
pub const MAX_DESCRIPTION_LEN: u64 = 500;

/// Product entity - the single record type held in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned by the service on creation
    pub id: Uuid,
    /// Product name
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    /// Product description (1-500 characters)
    #[validate(length(
        min = 1,
        max = MAX_DESCRIPTION_LEN,
        message = "product description must be between 1 and 500 characters"
    ))]
    pub description: String,
    /// Price in minor currency units (cents)
    #[validate(range(min = 0, message = "product price cannot be negative"))]
    pub price: i64,
    /// Units in stock
    #[validate(range(min = 0, message = "product quantity cannot be negative"))]
    pub quantity: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
///
/// Missing keys decode to empty/zero so validation reports the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateProduct {
    #[schema(example = "Keyboard")]
    pub name: String,
    #[schema(example = "Mechanical keyboard")]
    pub description: String,
    /// Price in cents
    #[schema(example = 1500)]
    pub price: i64,
    #[schema(example = 10)]
    pub quantity: i32,
}

/// DTO for updating an existing product
///
/// `None` (absent key or `null`) leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in cents
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// Current time truncated to the microsecond precision PostgreSQL stores.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl Product {
    /// Build an unsaved product from a create request.
    ///
    /// The id stays nil until the draft passes validation; both timestamps
    /// share the same instant.
    pub fn draft(input: CreateProduct) -> Self {
        let now = now_micros();
        Self {
            id: Uuid::nil(),
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from UpdateProduct DTO
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
    }

    /// Advance `updated_at`, always by at least one microsecond.
    pub fn touch(&mut self) {
        let floor = self.updated_at + TimeDelta::microseconds(1);
        self.updated_at = now_micros().max(floor);
    }
}
