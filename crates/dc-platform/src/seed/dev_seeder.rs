//! Development Data Seeder
//!
//! Seeds a small catalogue and one user per role so a fresh database can be
//! exercised straight away. Works against either store backend.
//!
//! Seeded accounts (pair them with static tokens in development):
//!   Admin:     admin@decora.local
//!   Decorator: decorator@decora.local (Dhaka / Dhaka)
//!   Customer:  customer@decora.local

use rust_decimal::Decimal;
use tracing::info;

use crate::decoration::entity::{Decoration, DecorationFilter};
use crate::shared::error::Result;
use crate::shared::stores::Repositories;
use crate::user::entity::{ContactDetails, User, UserRole};
use crate::user::repository::LoginOutcome;

pub const ADMIN_EMAIL: &str = "admin@decora.local";
pub const DECORATOR_EMAIL: &str = "decorator@decora.local";
pub const CUSTOMER_EMAIL: &str = "customer@decora.local";

/// Development data seeder
pub struct DevDataSeeder {
    repos: Repositories,
}

impl DevDataSeeder {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Seed all development data. Existing records are left alone.
    pub async fn seed(&self) -> Result<()> {
        info!("=== DEV DATA SEEDER ===");

        self.seed_users().await?;
        self.seed_decorations().await?;

        info!("Development data seeded");
        info!("  Admin:     {}", ADMIN_EMAIL);
        info!("  Decorator: {}", DECORATOR_EMAIL);
        info!("  Customer:  {}", CUSTOMER_EMAIL);
        info!("=======================");

        Ok(())
    }

    async fn seed_users(&self) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let users = &self.repos.users;

        for (email, name) in [
            (ADMIN_EMAIL, "Dev Admin"),
            (DECORATOR_EMAIL, "Dev Decorator"),
            (CUSTOMER_EMAIL, "Dev Customer"),
        ] {
            if let LoginOutcome::Created(id) = users.record_login(&User::new(email).with_name(name), &now).await? {
                info!(email, id = %id, "Created user");
            }
        }

        users.update_role(ADMIN_EMAIL, UserRole::Admin).await?;

        let contact = ContactDetails {
            phone: "01700000000".to_string(),
            division: "Dhaka".to_string(),
            district: "Dhaka".to_string(),
        };
        users.promote_to_decorator(DECORATOR_EMAIL, &contact).await?;

        Ok(())
    }

    async fn seed_decorations(&self) -> Result<()> {
        let decorations = &self.repos.decorations;
        if !decorations.find(&DecorationFilter::default()).await?.is_empty() {
            return Ok(());
        }

        let catalogue = [
            Decoration::new("Classic Wedding Stage", "wedding", Decimal::new(1500, 0))
                .with_description("Floral stage backdrop with lighting"),
            Decoration::new("Birthday Balloon Arch", "birthday", Decimal::new(12050, 2))
                .with_description("Balloon arch and table setup"),
            Decoration::new("Home Festive Lights", "home", Decimal::new(300, 0)),
        ];

        for decoration in &catalogue {
            let id = decorations.insert(decoration).await?;
            info!(name = %decoration.name, id = %id, "Created decoration");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repos = Repositories::in_memory();
        let seeder = DevDataSeeder::new(repos.clone());

        seeder.seed().await.unwrap();
        seeder.seed().await.unwrap();

        assert_eq!(repos.users.find_all().await.unwrap().len(), 3);
        assert_eq!(repos.decorations.find(&DecorationFilter::default()).await.unwrap().len(), 3);

        let admin = repos.users.find_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
        assert!(admin.is_admin());

        let decorators = repos.users.find_decorators(Some("Dhaka"), Some("Dhaka")).await.unwrap();
        assert_eq!(decorators.len(), 1);
        assert_eq!(decorators[0].email, DECORATOR_EMAIL);
    }
}
