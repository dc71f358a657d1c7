/// Cart pricing and checkout
pub mod cart;

/// Admin dashboard figures
pub mod dashboard;

/// Order status lifecycle rules
pub mod lifecycle;

/// Order placement, listing and status changes
pub mod order;

/// Menu management
pub mod product;

/// QRIS payment settings
pub mod qris;

/// One-time seeding of empty tables
pub mod seed;

/// Shipping-method eligibility
pub mod shipping;

/// Accounts and login
pub mod user;

/// Form validation
pub mod validation;
