//! Initial data loading.
//!
//! Each table is only seeded while it is still empty, so running the seed
//! again is harmless.

use crate::{
    config::seed::SeedConfig,
    core::user::hash_password,
    entities::{Product, QrisSettings, User, product, qris_settings, user},
    errors::Result,
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// Rows inserted per table by one seed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Accounts created
    pub users: usize,
    /// Menu items created
    pub products: usize,
    /// QRIS rows created (0 or 1)
    pub qris: usize,
}

impl SeedReport {
    /// True when nothing was inserted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.users == 0 && self.products == 0 && self.qris == 0
    }
}

/// Inserts the seed catalogue into every table that is still empty.
///
/// # Errors
/// Returns a database error if any insert fails; the whole run is rolled back.
#[instrument(skip_all)]
pub async fn seed_all(db: &DatabaseConnection, seed: &SeedConfig) -> Result<SeedReport> {
    let txn = db.begin().await?;
    let now = chrono::Utc::now();
    let mut report = SeedReport::default();

    if User::find().count(&txn).await? == 0 && !seed.users.is_empty() {
        let mut users = Vec::with_capacity(seed.users.len());
        for u in &seed.users {
            users.push(user::ActiveModel {
                name: Set(u.name.trim().to_string()),
                email: Set(u.email.trim().to_lowercase()),
                password: Set(hash_password(u.password.clone()).await?),
                role: Set(u.role),
                address: Set(u.address.clone()),
                phone: Set(u.phone.clone()),
                created_at: Set(now),
                ..Default::default()
            });
        }
        User::insert_many(users).exec(&txn).await?;
        report.users = seed.users.len();
    }

    if Product::find().count(&txn).await? == 0 && !seed.products.is_empty() {
        let products = seed.products.iter().map(|p| product::ActiveModel {
            name: Set(p.name.clone()),
            price: Set(p.price),
            description: Set(p.description.clone()),
            image: Set(p.image.clone()),
            category: Set(p.category),
            daily_limit: Set(p.daily_limit),
            created_at: Set(now),
            ..Default::default()
        });
        Product::insert_many(products).exec(&txn).await?;
        report.products = seed.products.len();
    }

    if let Some(qris) = &seed.qris {
        if QrisSettings::find().count(&txn).await? == 0 {
            qris_settings::ActiveModel {
                image: Set(qris.image.clone()),
                name: Set(qris.name.clone()),
                number: Set(qris.number.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            report.qris = 1;
        }
    }

    txn.commit().await?;

    if report.is_empty() {
        info!("Seed skipped, all tables already contain data");
    } else {
        info!(
            "Seeded {} user(s), {} product(s), {} QRIS setting(s)",
            report.users, report.products, report.qris
        );
    }
    Ok(report)
}
