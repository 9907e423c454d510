//! Decoration Operations
//!
//! Create, update and delete for service listings. Listings have no
//! cross-document effects, so each operation is a single validated write.

use std::sync::Arc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::decoration::entity::Decoration;
use crate::decoration::repository::DecorationRepository;
use crate::details;
use crate::shared::api_common::{non_blank, parse_object_id};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

/// Listing fields accepted on create and full update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecorationInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
}

impl DecorationInput {
    fn validate(&self) -> Result<Decoration, UseCaseError> {
        let name = non_blank(self.name.as_deref())
            .ok_or_else(|| UseCaseError::validation("NAME_REQUIRED", "Decoration name is required"))?;

        let price = self
            .price
            .ok_or_else(|| UseCaseError::validation("PRICE_REQUIRED", "Decoration price is required"))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(UseCaseError::validation_with_details(
                "INVALID_PRICE",
                "Price must not be negative",
                details! { "price" => price.to_string() },
            ));
        }

        let mut decoration = Decoration::new(
            name,
            non_blank(self.category.as_deref()).unwrap_or_default(),
            price,
        );
        decoration.description = self.description.as_deref().map(str::trim).unwrap_or_default().to_string();
        decoration.image = non_blank(self.image.as_deref()).map(str::to_string);
        Ok(decoration)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecorationSaved {
    pub decoration_id: String,
}

pub struct CreateDecorationUseCase {
    decorations: Arc<dyn DecorationRepository>,
}

impl CreateDecorationUseCase {
    pub fn new(decorations: Arc<dyn DecorationRepository>) -> Self {
        Self { decorations }
    }

    pub async fn execute(&self, input: DecorationInput, ctx: ExecutionContext) -> UseCaseResult<DecorationSaved> {
        let decoration = match input.validate() {
            Ok(decoration) => decoration,
            Err(e) => return UseCaseResult::failure(e),
        };

        match self.decorations.insert(&decoration).await {
            Ok(id) => {
                info!(decoration_id = %id, name = %decoration.name, execution_id = %ctx.execution_id, "Decoration created");
                UseCaseResult::success(DecorationSaved { decoration_id: id.to_hex() })
            }
            Err(e) => UseCaseResult::failure(e.into()),
        }
    }
}

pub struct UpdateDecorationUseCase {
    decorations: Arc<dyn DecorationRepository>,
}

impl UpdateDecorationUseCase {
    pub fn new(decorations: Arc<dyn DecorationRepository>) -> Self {
        Self { decorations }
    }

    pub async fn execute(
        &self,
        id: &str,
        input: DecorationInput,
        ctx: ExecutionContext,
    ) -> UseCaseResult<DecorationSaved> {
        self.run(id, input, ctx).await.into()
    }

    async fn run(&self, id: &str, input: DecorationInput, ctx: ExecutionContext) -> Result<DecorationSaved, UseCaseError> {
        let oid = parse_object_id(id)?;
        let decoration = input.validate()?;

        if !self.decorations.update(&oid, &decoration).await? {
            return Err(not_found(id));
        }

        info!(decoration_id = %oid, execution_id = %ctx.execution_id, "Decoration updated");
        Ok(DecorationSaved { decoration_id: oid.to_hex() })
    }
}

pub struct DeleteDecorationUseCase {
    decorations: Arc<dyn DecorationRepository>,
}

impl DeleteDecorationUseCase {
    pub fn new(decorations: Arc<dyn DecorationRepository>) -> Self {
        Self { decorations }
    }

    pub async fn execute(&self, id: &str, ctx: ExecutionContext) -> UseCaseResult<DecorationSaved> {
        self.run(id, ctx).await.into()
    }

    async fn run(&self, id: &str, ctx: ExecutionContext) -> Result<DecorationSaved, UseCaseError> {
        let oid = parse_object_id(id)?;
        if !self.decorations.delete(&oid).await? {
            return Err(not_found(id));
        }
        info!(decoration_id = %oid, execution_id = %ctx.execution_id, "Decoration deleted");
        Ok(DecorationSaved { decoration_id: oid.to_hex() })
    }
}

fn not_found(id: &str) -> UseCaseError {
    UseCaseError::not_found_with_details(
        "DECORATION_NOT_FOUND",
        format!("Decoration {} not found", id),
        details! { "decorationId" => id },
    )
}
