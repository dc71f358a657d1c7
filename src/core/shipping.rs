//! Shipping-method eligibility.
//!
//! Each shipping method can carry a limited number of units per product
//! category. Dry cookies travel in sealed jars and survive a parcel service,
//! wet snacks and whole cakes do not. The calculator is a pure filter over the
//! static [`SHIPPING_METHODS`] table.

use crate::entities::product::ProductCategory;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The fixed set of shipping options offered at checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Instant motorbike courier
    InstantBike,
    /// Same-day motorbike courier
    SameDayBike,
    /// Car courier
    CarCourier,
    /// Parcel expedition
    Parcel,
    /// The bakery's own courier
    StoreCourier,
}

/// Per-category unit caps. `None` means unlimited, `Some(0)` means the
/// category cannot be carried at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCaps {
    /// Kue Kering cap
    pub dry: Option<u32>,
    /// Kue Basah cap
    pub wet: Option<u32>,
    /// Kue Loyang cap
    pub layer: Option<u32>,
}

impl CategoryCaps {
    const fn cap(&self, category: ProductCategory) -> Option<u32> {
        match category {
            ProductCategory::Dry => self.dry,
            ProductCategory::Wet => self.wet,
            ProductCategory::Layer => self.layer,
        }
    }
}

/// Shipping methods in the order they are offered.
pub const SHIPPING_METHODS: [ShippingMethod; 5] = [
    ShippingMethod::InstantBike,
    ShippingMethod::SameDayBike,
    ShippingMethod::CarCourier,
    ShippingMethod::Parcel,
    ShippingMethod::StoreCourier,
];

impl ShippingMethod {
    /// Identifier stored in `orders.shipping_method`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::InstantBike => "instant_bike",
            Self::SameDayBike => "same_day_bike",
            Self::CarCourier => "car_courier",
            Self::Parcel => "parcel",
            Self::StoreCourier => "store_courier",
        }
    }

    /// Name shown at checkout.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InstantBike => "Instant (motorbike)",
            Self::SameDayBike => "Same day (motorbike)",
            Self::CarCourier => "Car courier",
            Self::Parcel => "Parcel expedition",
            Self::StoreCourier => "Bakery courier",
        }
    }

    /// Unit caps per category.
    #[must_use]
    pub const fn caps(self) -> CategoryCaps {
        match self {
            Self::InstantBike => CategoryCaps {
                dry: Some(12),
                wet: Some(250),
                layer: Some(4),
            },
            Self::SameDayBike => CategoryCaps {
                dry: Some(12),
                wet: Some(100),
                layer: Some(2),
            },
            Self::CarCourier => CategoryCaps {
                dry: Some(50),
                wet: Some(500),
                layer: Some(10),
            },
            Self::Parcel => CategoryCaps {
                dry: Some(24),
                wet: Some(0),
                layer: Some(0),
            },
            Self::StoreCourier => CategoryCaps {
                dry: None,
                wet: None,
                layer: None,
            },
        }
    }

    /// Whether this method can carry a cart with the given category totals.
    #[must_use]
    pub fn allows(self, counts: &CategoryCounts) -> bool {
        if counts.is_empty() {
            return false;
        }
        let caps = self.caps();
        ProductCategory::ALL
            .into_iter()
            .all(|category| caps.cap(category).is_none_or(|cap| counts.get(category) <= cap))
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ShippingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SHIPPING_METHODS
            .into_iter()
            .find(|method| method.id() == s.trim())
            .ok_or_else(|| Error::validation(format!("Unknown shipping method '{s}'")))
    }
}

/// One cart entry as seen by the calculator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    /// Category of the product in this line
    pub category: ProductCategory,
    /// Units of the product
    pub quantity: u32,
}

/// Units per category in a cart
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    /// Kue Kering units
    pub dry: u32,
    /// Kue Basah units
    pub wet: u32,
    /// Kue Loyang units
    pub layer: u32,
}

impl CategoryCounts {
    /// Sums the cart lines per category.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        lines.iter().fold(Self::default(), |mut counts, line| {
            let slot = match line.category {
                ProductCategory::Dry => &mut counts.dry,
                ProductCategory::Wet => &mut counts.wet,
                ProductCategory::Layer => &mut counts.layer,
            };
            *slot = slot.saturating_add(line.quantity);
            counts
        })
    }

    /// Units of one category.
    #[must_use]
    pub const fn get(&self, category: ProductCategory) -> u32 {
        match category {
            ProductCategory::Dry => self.dry,
            ProductCategory::Wet => self.wet,
            ProductCategory::Layer => self.layer,
        }
    }

    /// True when the cart holds no units at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dry == 0 && self.wet == 0 && self.layer == 0
    }
}

/// Returns the shipping methods that can carry `lines`, in table order.
///
/// An empty cart has no eligible method.
#[must_use]
pub fn eligible_methods(lines: &[CartLine]) -> Vec<ShippingMethod> {
    let counts = CategoryCounts::from_lines(lines);
    SHIPPING_METHODS
        .into_iter()
        .filter(|method| method.allows(&counts))
        .collect()
}

/// Checks that `method` can carry `lines`.
///
/// # Errors
/// Returns `Error::ShippingUnavailable` if it cannot.
pub fn ensure_eligible(method: ShippingMethod, lines: &[CartLine]) -> Result<()> {
    if method.allows(&CategoryCounts::from_lines(lines)) {
        Ok(())
    } else {
        Err(Error::ShippingUnavailable {
            method: method.id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use ProductCategory::{Dry, Layer, Wet};

    fn line(category: ProductCategory, quantity: u32) -> CartLine {
        CartLine { category, quantity }
    }

    #[test]
    fn test_empty_cart_has_no_methods() {
        assert!(eligible_methods(&[]).is_empty());
        assert!(eligible_methods(&[line(Dry, 0)]).is_empty());
    }

    #[test]
    fn test_small_dry_order_can_use_everything() {
        let methods = eligible_methods(&[line(Dry, 3)]);
        assert_eq!(methods, SHIPPING_METHODS.to_vec());
    }

    #[test]
    fn test_wet_cakes_exclude_parcel() {
        let methods = eligible_methods(&[line(Wet, 20)]);
        assert_eq!(
            methods,
            vec![
                ShippingMethod::InstantBike,
                ShippingMethod::SameDayBike,
                ShippingMethod::CarCourier,
                ShippingMethod::StoreCourier,
            ]
        );
    }

    #[test]
    fn test_instant_bike_boundaries() {
        let at_limit = [line(Dry, 12), line(Wet, 250), line(Layer, 4)];
        assert!(eligible_methods(&at_limit).contains(&ShippingMethod::InstantBike));

        let one_layer_too_many = [line(Dry, 12), line(Wet, 250), line(Layer, 5)];
        assert!(!eligible_methods(&one_layer_too_many).contains(&ShippingMethod::InstantBike));
    }

    #[test]
    fn test_lines_of_same_category_are_summed() {
        let lines = [line(Dry, 7), line(Dry, 6)];
        assert_eq!(CategoryCounts::from_lines(&lines).dry, 13);
        let methods = eligible_methods(&lines);
        assert!(!methods.contains(&ShippingMethod::InstantBike));
        assert!(!methods.contains(&ShippingMethod::SameDayBike));
        assert!(methods.contains(&ShippingMethod::CarCourier));
        assert!(methods.contains(&ShippingMethod::Parcel));
    }

    #[test]
    fn test_large_order_only_store_courier() {
        let methods = eligible_methods(&[line(Wet, 600), line(Layer, 11)]);
        assert_eq!(methods, vec![ShippingMethod::StoreCourier]);
    }

    #[test]
    fn test_same_day_wet_cap() {
        assert!(eligible_methods(&[line(Wet, 100)]).contains(&ShippingMethod::SameDayBike));
        assert!(!eligible_methods(&[line(Wet, 101)]).contains(&ShippingMethod::SameDayBike));
    }

    #[test]
    fn test_ensure_eligible() {
        assert!(ensure_eligible(ShippingMethod::Parcel, &[line(Dry, 2)]).is_ok());
        let err = ensure_eligible(ShippingMethod::Parcel, &[line(Layer, 1)]).unwrap_err();
        assert!(matches!(err, Error::ShippingUnavailable { method } if method == "parcel"));
    }

    #[test]
    fn test_method_ids_parse_back() {
        for method in SHIPPING_METHODS {
            assert_eq!(method.id().parse::<ShippingMethod>().unwrap(), method);
        }
        assert!("drone".parse::<ShippingMethod>().is_err());
    }
}
