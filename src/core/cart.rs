//! Cart pricing and checkout.
//!
//! A cart arrives as `(product_id, quantity)` pairs. It is priced against the
//! catalogue, checked against daily limits, lead time and shipping caps, and
//! then handed to [`create_order`].

use crate::{
    core::{
        order::{NewOrder, NewOrderItem, create_order, line_subtotal},
        shipping::{self, CartLine, CategoryCounts, ShippingMethod},
        user::require_user,
        validation,
    },
    entities::{
        Product, order,
        order::DeliveryMethod,
        product::{self, ProductCategory},
    },
    errors::{Error, Result},
    storage::{PAYMENTS_FOLDER, Storage, Upload},
};
use chrono::{Days, NaiveDate};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{instrument, warn};

/// Minimum days between ordering and delivery.
pub const MIN_LEAD_DAYS: u64 = 2;

/// Daily limit for products that do not set their own.
pub const DEFAULT_DAILY_LIMIT: i32 = 50;

/// A cart entry as sent by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartRequest {
    /// Product to order
    pub product_id: i64,
    /// Units
    pub quantity: i32,
}

/// A cart entry priced from the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    /// Product id
    pub product_id: i64,
    /// Menu name at pricing time
    pub name: String,
    /// Category, for shipping caps
    pub category: ProductCategory,
    /// Units after merging duplicates
    pub quantity: i32,
    /// Current menu price in Rupiah
    pub unit_price: i64,
}

impl PricedLine {
    /// quantity × unit price
    ///
    /// # Errors
    /// Returns `Error::Validation` if the amount overflows.
    pub fn subtotal(&self) -> Result<i64> {
        line_subtotal(self.quantity, self.unit_price)
    }
}

/// A fully priced cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedCart {
    /// One line per distinct product, in first-seen order
    pub lines: Vec<PricedLine>,
    /// Σ line subtotals
    pub total: i64,
    /// Units per category
    pub counts: CategoryCounts,
}

impl PricedCart {
    /// The cart as seen by the shipping calculator.
    #[must_use]
    pub fn shipping_lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .map(|line| CartLine {
                category: line.category,
                quantity: line.quantity.unsigned_abs(),
            })
            .collect()
    }

    /// Shipping methods able to carry this cart.
    #[must_use]
    pub fn eligible_shipping(&self) -> Vec<ShippingMethod> {
        shipping::eligible_methods(&self.shipping_lines())
    }
}

/// Checkout form
#[derive(Debug, Clone, Deserialize)]
pub struct Checkout {
    /// Cart contents
    pub items: Vec<CartRequest>,
    /// Total shown to the customer; the computed total is used when absent
    pub total: Option<i64>,
    /// Requested delivery or pickup day
    pub delivery_date: NaiveDate,
    /// Delivery address; falls back to the profile address
    pub address: Option<String>,
    /// Notes for the bakery
    pub notes: Option<String>,
    /// Pickup or delivery
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    /// Required for delivery
    pub shipping_method: Option<ShippingMethod>,
}

/// Sums the quantities of repeated products, keeping first-seen order.
///
/// # Errors
/// Returns `Error::Validation` if a merged quantity overflows.
pub fn merge_lines(lines: &[CartRequest]) -> Result<Vec<CartRequest>> {
    let mut merged: Vec<CartRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                    Error::validation(format!(
                        "Quantity for product {} is too large",
                        line.product_id
                    ))
                })?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}

/// Σ quantity × unit price.
///
/// # Errors
/// Returns `Error::Validation` if the total overflows.
pub fn cart_total(lines: &[PricedLine]) -> Result<i64> {
    lines.iter().try_fold(0_i64, |total, line| {
        total
            .checked_add(line.subtotal()?)
            .ok_or_else(|| Error::validation("Order amount is too large"))
    })
}

/// Prices a cart against the catalogue.
///
/// # Errors
/// Returns an error if:
/// - The cart is empty or a quantity is below 1
/// - A product does not exist (`Error::NotFound`)
/// - A quantity exceeds the product's daily limit, or [`DEFAULT_DAILY_LIMIT`]
///   when the product sets none
/// - The total overflows
pub async fn price_cart(db: &DatabaseConnection, lines: &[CartRequest]) -> Result<PricedCart> {
    let merged = merge_lines(lines)?;
    if merged.is_empty() {
        return Err(Error::validation("The cart is empty"));
    }
    if let Some(line) = merged.iter().find(|line| line.quantity < 1) {
        return Err(Error::validation(format!(
            "Quantity for product {} must be at least 1",
            line.product_id
        )));
    }

    let products: HashMap<i64, product::Model> = Product::find()
        .filter(product::Column::Id.is_in(merged.iter().map(|line| line.product_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut priced = Vec::with_capacity(merged.len());
    for line in merged {
        let product = products.get(&line.product_id).ok_or(Error::NotFound {
            entity: "Product",
            id: line.product_id,
        })?;
        let limit = product.daily_limit.unwrap_or(DEFAULT_DAILY_LIMIT);
        if line.quantity > limit {
            return Err(Error::validation(format!(
                "Only {limit} of '{}' can be ordered per day",
                product.name
            )));
        }
        priced.push(PricedLine {
            product_id: product.id,
            name: product.name.clone(),
            category: product.category,
            quantity: line.quantity,
            unit_price: product.price,
        });
    }

    let mut cart = PricedCart {
        total: cart_total(&priced)?,
        lines: priced,
        counts: CategoryCounts::default(),
    };
    cart.counts = CategoryCounts::from_lines(&cart.shipping_lines());
    Ok(cart)
}

/// Checks that `date` is at least [`MIN_LEAD_DAYS`] after `today`.
pub fn validate_delivery_date(date: NaiveDate, today: NaiveDate) -> Result<()> {
    let earliest = today
        .checked_add_days(Days::new(MIN_LEAD_DAYS))
        .ok_or_else(|| Error::validation("Delivery date is out of range"))?;
    if date < earliest {
        return Err(Error::validation(format!(
            "Orders need at least {MIN_LEAD_DAYS} days notice; the earliest delivery date is {earliest}"
        )));
    }
    Ok(())
}

/// Places an order for `user_id` from a checkout form.
///
/// The cart is priced from the catalogue, so the stored line prices are the
/// current menu prices. A payment proof uploaded with the form is stored first
/// and removed again if the order cannot be created.
///
/// # Errors
/// Returns an error if:
/// - The cart cannot be priced (see [`price_cart`])
/// - The delivery date is too early
/// - A delivery has no address, no shipping method or an ineligible one
/// - The submitted total differs from the cart total (`Error::TotalMismatch`)
/// - The proof upload or the order insert fails
#[instrument(skip(db, storage, form, proof))]
pub async fn checkout(
    db: &DatabaseConnection,
    storage: &Storage,
    user_id: i64,
    form: Checkout,
    proof: Option<&Upload>,
    today: NaiveDate,
) -> Result<order::Model> {
    let customer = require_user(db, user_id).await?;
    let cart = price_cart(db, &form.items).await?;
    validate_delivery_date(form.delivery_date, today)?;

    let address = validation::non_blank(form.address)
        .or(customer.address)
        .unwrap_or_default();

    let shipping_method = match form.delivery_method {
        DeliveryMethod::Pickup => None,
        DeliveryMethod::Delivery => {
            validation::require("Delivery address", &address)?;
            let method = form.shipping_method.ok_or_else(|| {
                Error::validation("Choose a shipping method for delivery")
            })?;
            shipping::ensure_eligible(method, &cart.shipping_lines())?;
            Some(method)
        }
    };

    let payment_proof_url = match proof {
        Some(upload) => Some(storage.upload_file(upload, PAYMENTS_FOLDER).await?),
        None => None,
    };

    let new_order = NewOrder {
        user_id,
        items: cart
            .lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect(),
        total: form.total.unwrap_or(cart.total),
        delivery_date: form.delivery_date,
        payment_proof_url: payment_proof_url.clone(),
        address,
        notes: form.notes,
        delivery_method: form.delivery_method,
        shipping_method,
    };

    match create_order(db, new_order).await {
        Ok(order) => Ok(order),
        Err(e) => {
            if let Some(url) = payment_proof_url {
                if let Err(cleanup) = storage.delete_file(&url).await {
                    warn!("Could not delete orphaned proof {url}: {cleanup}");
                }
            }
            Err(e)
        }
    }
}
