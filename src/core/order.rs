//! Order business logic - placing, listing and progressing orders.
//!
//! An order and its lines are inserted in one database transaction. The order
//! total must equal Σ quantity × price of its lines when it is created; it is
//! never recomputed afterwards. Status changes go through the lifecycle rules
//! in [`crate::core::lifecycle`].

use crate::{
    core::{
        lifecycle::{ensure_admin_transition, ensure_payment_proof_accepted},
        shipping::ShippingMethod,
        validation,
    },
    entities::{
        Order, OrderItem, Product, User, order,
        order::{DeliveryMethod, OrderStatus},
        order_item, product, user,
    },
    errors::{Error, Result},
    storage::{PAYMENTS_FOLDER, Storage, Upload},
};
use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

/// One line of a new order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewOrderItem {
    /// Ordered product
    pub product_id: i64,
    /// Units
    pub quantity: i32,
    /// Unit price in Rupiah
    pub price: i64,
}

/// Input for creating an order
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Customer placing the order
    pub user_id: i64,
    /// Order lines
    pub items: Vec<NewOrderItem>,
    /// Total shown to the customer; must equal the sum of the lines
    pub total: i64,
    /// Delivery or pickup day
    pub delivery_date: NaiveDate,
    /// Already uploaded payment proof, if any
    pub payment_proof_url: Option<String>,
    /// Delivery address
    pub address: String,
    /// Customer notes
    pub notes: Option<String>,
    /// Pickup or delivery
    pub delivery_method: DeliveryMethod,
    /// Shipping method for deliveries
    pub shipping_method: Option<ShippingMethod>,
}

/// Name and email of the customer behind an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    /// Account id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl From<user::Model> for CustomerSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// An order line joined with the product it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// The stored line
    #[serde(flatten)]
    pub item: order_item::Model,
    /// Product name, if the product still exists
    pub product_name: Option<String>,
    /// Product photo, if the product still exists
    pub product_image: Option<String>,
}

/// An order with its customer, as shown in order lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// The stored order
    #[serde(flatten)]
    pub order: order::Model,
    /// Customer, if the account still exists
    pub customer: Option<CustomerSummary>,
}

/// An order with customer and lines, as shown on detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    /// The stored order
    #[serde(flatten)]
    pub order: order::Model,
    /// Customer, if the account still exists
    pub customer: Option<CustomerSummary>,
    /// Order lines
    pub items: Vec<OrderLine>,
}

fn amount_too_large() -> Error {
    Error::validation("Order amount is too large")
}

/// quantity × price, rejecting amounts that overflow.
pub fn line_subtotal(quantity: i32, price: i64) -> Result<i64> {
    i64::from(quantity)
        .checked_mul(price)
        .ok_or_else(amount_too_large)
}

/// Σ quantity × price over `items`.
///
/// # Errors
/// Returns `Error::Validation` if the total overflows.
pub fn items_total(items: &[NewOrderItem]) -> Result<i64> {
    items.iter().try_fold(0_i64, |total, item| {
        total
            .checked_add(line_subtotal(item.quantity, item.price)?)
            .ok_or_else(amount_too_large)
    })
}

fn validate_new_order(new_order: &NewOrder) -> Result<()> {
    if new_order.items.is_empty() {
        return Err(Error::validation("An order needs at least one item"));
    }
    if let Some(item) = new_order.items.iter().find(|item| item.quantity < 1) {
        return Err(Error::validation(format!(
            "Quantity for product {} must be at least 1",
            item.product_id
        )));
    }
    if new_order.items.iter().any(|item| item.price < 0) {
        return Err(Error::validation("Item prices cannot be negative"));
    }

    let computed = items_total(&new_order.items)?;
    if computed != new_order.total {
        return Err(Error::TotalMismatch {
            submitted: new_order.total,
            computed,
        });
    }

    if new_order.delivery_method == DeliveryMethod::Delivery {
        validation::require("Delivery address", &new_order.address)?;
        if new_order.shipping_method.is_none() {
            return Err(Error::validation(
                "A shipping method is required for delivery",
            ));
        }
    }
    Ok(())
}

/// Creates an order and its lines in one transaction.
///
/// The status starts as `waiting_payment` when a payment proof is attached and
/// `pending` otherwise. Pickup orders never store a shipping method.
///
/// # Errors
/// Returns an error if:
/// - There are no lines, a quantity is below 1 or a price is negative
/// - `total` differs from the sum of the lines (`Error::TotalMismatch`)
/// - A delivery has no address or shipping method
/// - The customer or a product does not exist (`Error::NotFound`)
/// - Any insert fails; nothing is stored in that case
#[instrument(skip(db, new_order), fields(user_id = new_order.user_id))]
pub async fn create_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<order::Model> {
    validate_new_order(&new_order)?;

    let txn = db.begin().await?;

    if User::find_by_id(new_order.user_id).one(&txn).await?.is_none() {
        return Err(Error::NotFound {
            entity: "User",
            id: new_order.user_id,
        });
    }
    ensure_products_exist(&txn, &new_order.items).await?;

    let status = if new_order.payment_proof_url.is_some() {
        OrderStatus::WaitingPayment
    } else {
        OrderStatus::Pending
    };
    let shipping_method = match new_order.delivery_method {
        DeliveryMethod::Pickup => None,
        DeliveryMethod::Delivery => new_order.shipping_method.map(|m| m.id().to_string()),
    };
    let now = chrono::Utc::now();

    let order_model = order::ActiveModel {
        user_id: Set(Some(new_order.user_id)),
        total: Set(new_order.total),
        status: Set(status),
        delivery_date: Set(new_order.delivery_date),
        payment_proof: Set(new_order.payment_proof_url),
        address: Set(new_order.address.trim().to_string()),
        notes: Set(validation::non_blank(new_order.notes)),
        delivery_method: Set(new_order.delivery_method),
        shipping_method: Set(shipping_method),
        created_at: Set(now),
        ..Default::default()
    };
    let order = order_model.insert(&txn).await.inspect_err(|e| {
        error!("Error creating order: {e}");
    })?;

    let items = new_order.items.iter().map(|item| order_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(Some(item.product_id)),
        quantity: Set(item.quantity),
        price: Set(item.price),
        created_at: Set(now),
        ..Default::default()
    });
    OrderItem::insert_many(items)
        .exec(&txn)
        .await
        .inspect_err(|e| error!("Error creating order items: {e}"))?;

    txn.commit().await?;

    info!(
        "Created order {} for user {} with {} item(s), total {}",
        order.id,
        new_order.user_id,
        new_order.items.len(),
        order.total
    );
    Ok(order)
}

async fn ensure_products_exist<C>(db: &C, items: &[NewOrderItem]) -> Result<()>
where
    C: ConnectionTrait,
{
    let wanted: HashSet<i64> = items.iter().map(|item| item.product_id).collect();
    let found: HashSet<i64> = Product::find()
        .filter(product::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    match wanted.difference(&found).min() {
        Some(&missing) => Err(Error::NotFound {
            entity: "Product",
            id: missing,
        }),
        None => Ok(()),
    }
}

/// Retrieves all orders, newest first, with their customers.
pub async fn get_orders(db: &DatabaseConnection) -> Result<Vec<OrderSummary>> {
    let rows = Order::find()
        .find_also_related(User)
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(order, customer)| OrderSummary {
            order,
            customer: customer.map(Into::into),
        })
        .collect())
}

/// Number of orders stored.
pub async fn count_orders(db: &DatabaseConnection) -> Result<u64> {
    Order::find().count(db).await.map_err(Into::into)
}

async fn load_lines(db: &DatabaseConnection, order_id: i64) -> Result<Vec<OrderLine>> {
    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .find_also_related(Product)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| {
            let (product_name, product_image) =
                product.map_or((None, None), |p| (Some(p.name), p.image));
            OrderLine {
                item,
                product_name,
                product_image,
            }
        })
        .collect())
}

async fn details_for(db: &DatabaseConnection, order: order::Model) -> Result<OrderDetails> {
    let customer = match order.user_id {
        Some(user_id) => User::find_by_id(user_id).one(db).await?.map(Into::into),
        None => None,
    };
    let items = load_lines(db, order.id).await?;
    Ok(OrderDetails {
        order,
        customer,
        items,
    })
}

/// Retrieves the bare order row.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

async fn require_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    get_order(db, order_id).await?.ok_or(Error::NotFound {
        entity: "Order",
        id: order_id,
    })
}

/// Retrieves an order with its customer and lines.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<OrderDetails>> {
    match get_order(db, order_id).await? {
        Some(order) => details_for(db, order).await.map(Some),
        None => Ok(None),
    }
}

/// Retrieves a customer's orders with their lines, newest first.
pub async fn get_orders_by_user_id(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<OrderDetails>> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        details.push(details_for(db, order).await?);
    }
    Ok(details)
}

/// Moves an order to `status` on behalf of an administrator.
///
/// # Errors
/// Returns `Error::NotFound` for an unknown order and
/// `Error::InvalidTransition` if `status` is not an admin action for the
/// current status; the order is left unchanged in both cases.
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<order::Model> {
    let current = require_order(db, order_id).await?.status;
    ensure_admin_transition(current, status).inspect_err(|e| warn!("{e}"))?;

    if write_status(db, order_id, current, status).await? == 0 {
        let latest = require_order(db, order_id).await?;
        warn!("Order {order_id} moved to {} before it could become {status}", latest.status);
        return Err(Error::InvalidTransition {
            from: latest.status,
            to: status,
        });
    }

    info!("Order {order_id} moved from {current} to {status}");
    require_order(db, order_id).await
}

/// Writes `to` only while the order is still in `from`; returns rows changed.
async fn write_status(
    db: &DatabaseConnection,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<u64> {
    let result = Order::update_many()
        .set(order::ActiveModel {
            status: Set(to),
            ..Default::default()
        })
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(from))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Attaches a proof only while the order still accepts one; returns rows changed.
async fn write_payment_proof(db: &DatabaseConnection, order_id: i64, url: &str) -> Result<u64> {
    let accepting = OrderStatus::ALL
        .into_iter()
        .filter(|status| status.accepts_payment_proof());
    let result = Order::update_many()
        .set(order::ActiveModel {
            payment_proof: Set(Some(url.to_string())),
            status: Set(OrderStatus::WaitingPayment),
            ..Default::default()
        })
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.is_in(accepting))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Stores a payment proof for an order and moves it to `waiting_payment`.
///
/// A proof uploaded earlier is replaced and its file deleted.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist
/// - Payment is already confirmed, or the order is completed or cancelled
/// - Storage rejects the file
/// - The database update fails (the new file is removed again)
#[instrument(skip(db, storage, proof))]
pub async fn update_order_payment_proof(
    db: &DatabaseConnection,
    storage: &Storage,
    order_id: i64,
    proof: &Upload,
) -> Result<order::Model> {
    let order = require_order(db, order_id).await?;
    ensure_payment_proof_accepted(order.status)?;

    let old_proof = order.payment_proof;
    let url = storage.upload_file(proof, PAYMENTS_FOLDER).await?;

    let written = match write_payment_proof(db, order_id, &url).await {
        Ok(written) => written,
        Err(e) => {
            error!("Error updating payment proof for order {order_id}: {e}");
            discard_proof(storage, &url).await;
            return Err(e);
        }
    };
    if written == 0 {
        discard_proof(storage, &url).await;
        let latest = require_order(db, order_id).await?;
        warn!("Order {order_id} stopped accepting payment proofs ({})", latest.status);
        return Err(Error::InvalidTransition {
            from: latest.status,
            to: OrderStatus::WaitingPayment,
        });
    }
    let updated = require_order(db, order_id).await?;

    if let Some(old) = old_proof {
        discard_proof(storage, &old).await;
    }

    info!("Payment proof uploaded for order {order_id}");
    Ok(updated)
}

/// Deletes an order, its lines and its payment proof file.
///
/// # Errors
/// Returns `Error::NotFound` if the order does not exist, or a database error.
#[instrument(skip(db, storage))]
pub async fn delete_order(db: &DatabaseConnection, storage: &Storage, order_id: i64) -> Result<()> {
    let order = require_order(db, order_id).await?;

    let txn = db.begin().await?;
    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    Order::delete_by_id(order_id).exec(&txn).await?;
    txn.commit().await?;
    info!("Deleted order {order_id}");

    if let Some(url) = order.payment_proof {
        discard_proof(storage, &url).await;
    }
    Ok(())
}

async fn discard_proof(storage: &Storage, url: &str) {
    if let Err(e) = storage.delete_file(url).await {
        warn!("Could not delete payment proof {url}: {e}");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::product::ProductCategory;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn proof() -> Upload {
        Upload {
            file_name: "transfer.png".to_string(),
            bytes: vec![1, 2, 3, 4],
        }
    }

    #[tokio::test]
    async fn test_create_order_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut order = new_order(1, vec![]);
        let result = create_order(&db, order.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        order.items = vec![NewOrderItem {
            product_id: 1,
            quantity: 0,
            price: 1000,
        }];
        order.total = 0;
        let result = create_order(&db, order).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut order = new_order(1, vec![item(1, 2, i64::MAX)]);
        order.total = 0;
        let result = create_order(&db, order).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut order = new_order(1, vec![item(1, 2, 1000)]);
        order.delivery_method = DeliveryMethod::Delivery;
        order.shipping_method = None;
        let result = create_order(&db, order).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_total_must_match_items() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut order = new_order(1, vec![item(1, 2, 115_000), item(2, 5, 3_500)]);
        order.total = 200_000;
        let result = create_order(&db, order).await;
        assert!(matches!(
            result,
            Err(Error::TotalMismatch {
                submitted: 200_000,
                computed: 247_500
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_stores_lines() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;
        let soes = create_test_product(&db, "Soes", 3_500, ProductCategory::Wet).await?;

        let order = create_order(
            &db,
            new_order(customer.id, vec![item(nastar.id, 2, 115_000), item(soes.id, 5, 3_500)]),
        )
        .await?;

        assert_eq!(order.total, 247_500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, Some(customer.id));

        let details = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.items[0].product_name.as_deref(), Some("Nastar"));
        assert_eq!(details.customer.unwrap().email, customer.email);
        let sum: i64 = details.items.iter().map(|line| line.item.subtotal()).sum();
        assert_eq!(sum, details.order.total);
        Ok(())
    }

    #[tokio::test]
    async fn test_order_with_proof_waits_for_payment() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;

        let mut input = new_order(customer.id, vec![item(nastar.id, 1, 115_000)]);
        input.payment_proof_url = Some("http://localhost/storage/bakery/payments/x.png".into());
        let order = create_order(&db, input).await?;
        assert_eq!(order.status, OrderStatus::WaitingPayment);
        Ok(())
    }

    #[tokio::test]
    async fn test_pickup_drops_shipping_method() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;

        let mut input = new_order(customer.id, vec![item(nastar.id, 1, 115_000)]);
        input.shipping_method = Some(ShippingMethod::Parcel);
        let order = create_order(&db, input).await?;
        assert_eq!(order.delivery_method, DeliveryMethod::Pickup);
        assert_eq!(order.shipping_method, None);

        let mut input = new_order(customer.id, vec![item(nastar.id, 1, 115_000)]);
        input.delivery_method = DeliveryMethod::Delivery;
        input.shipping_method = Some(ShippingMethod::Parcel);
        let order = create_order(&db, input).await?;
        assert_eq!(order.shipping_method.as_deref(), Some("parcel"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_stores_nothing() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;

        let input = new_order(customer.id, vec![item(nastar.id, 1, 115_000), item(999, 1, 10)]);
        let result = create_order(&db, input).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Product",
                id: 999
            })
        ));
        assert_eq!(count_orders(&db).await?, 0);
        assert_eq!(OrderItem::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_walk_through_lifecycle() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();

        // Admin cannot confirm an unpaid order
        let result = update_order_status(&db, order.id, OrderStatus::Processing).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert_eq!(
            get_order(&db, order.id).await?.unwrap().status,
            OrderStatus::Pending
        );

        let paid = update_order_payment_proof(&db, &storage, order.id, &proof()).await?;
        assert_eq!(paid.status, OrderStatus::WaitingPayment);
        assert!(paid.payment_proof.is_some());

        let processing = update_order_status(&db, order.id, OrderStatus::Processing).await?;
        assert_eq!(processing.status, OrderStatus::Processing);

        // Confirmed orders cannot be cancelled or receive new proofs
        let result = update_order_status(&db, order.id, OrderStatus::Cancelled).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        let result = update_order_payment_proof(&db, &storage, order.id, &proof()).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        let completed = update_order_status(&db, order.id, OrderStatus::Completed).await?;
        assert_eq!(completed.status, OrderStatus::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_reupload_replaces_previous_proof() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();

        let first = update_order_payment_proof(&db, &storage, order.id, &proof()).await?;
        let first_path = storage
            .path_for_url(first.payment_proof.as_ref().unwrap())
            .unwrap();
        assert!(first_path.exists());

        let second = update_order_payment_proof(&db, &storage, order.id, &proof()).await?;
        assert_ne!(first.payment_proof, second.payment_proof);
        assert_eq!(second.status, OrderStatus::WaitingPayment);
        assert!(!first_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_status_write_is_refused() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();
        update_order_payment_proof(&db, &storage, order.id, &proof()).await?;

        // One admin cancels while another still sees waiting_payment
        update_order_status(&db, order.id, OrderStatus::Cancelled).await?;
        let written = write_status(
            &db,
            order.id,
            OrderStatus::WaitingPayment,
            OrderStatus::Processing,
        )
        .await?;
        assert_eq!(written, 0);
        assert_eq!(
            get_order(&db, order.id).await?.unwrap().status,
            OrderStatus::Cancelled
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_late_proof_cannot_reopen_confirmed_order() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();
        let paid = update_order_payment_proof(&db, &storage, order.id, &proof()).await?;

        // Payment is confirmed between a customer's read and their write
        update_order_status(&db, order.id, OrderStatus::Processing).await?;
        let late = "http://localhost:8080/storage/bakery/payments/late.png";
        assert_eq!(write_payment_proof(&db, order.id, late).await?, 0);

        let stored = get_order(&db, order.id).await?.unwrap();
        assert_eq!(stored.status, OrderStatus::Processing);
        assert_eq!(stored.payment_proof, paid.payment_proof);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_pending_order() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let cancelled = update_order_status(&db, order.id, OrderStatus::Cancelled).await?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let result = update_order_status(&db, order.id, OrderStatus::Processing).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_orders_listing() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let other = create_test_customer(&db, "Budi", "budi@example.com").await?;
        let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;

        let first = create_order(&db, new_order(customer.id, vec![item(nastar.id, 1, 115_000)]))
            .await?;
        let second = create_order(&db, new_order(customer.id, vec![item(nastar.id, 2, 115_000)]))
            .await?;
        create_order(&db, new_order(other.id, vec![item(nastar.id, 3, 115_000)])).await?;

        let all = get_orders(&db).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].customer.as_ref().unwrap().id, customer.id);

        let mine = get_orders_by_user_id(&db, customer.id).await?;
        let ids: Vec<_> = mine.iter().map(|d| d.order.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(mine[0].items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_removes_lines() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();

        delete_order(&db, &storage, order.id).await?;
        assert!(get_order(&db, order.id).await?.is_none());
        assert_eq!(OrderItem::find().count(&db).await?, 0);
        assert!(matches!(
            delete_order(&db, &storage, order.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_lines_survive_product_deletion() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let storage = temp_storage();
        let details = get_order_by_id(&db, order.id).await?.unwrap();
        let product_id = details.items[0].item.product_id.unwrap();

        crate::core::product::delete_product(&db, &storage, product_id).await?;

        let details = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].product_name, None);
        assert_eq!(details.order.total, order.total);
        Ok(())
    }
}
