use std::collections::HashMap;

use crate::errors::ConfigurationError;
use crate::models::booking::PriceBreakdown;
use crate::services::catalog::Catalog;

/// Dynamic transfer pricing. All arithmetic happens in integer cents, with
/// a single rounding per component at the cent boundary, so the breakdown
/// invariant `total == base + distance + extras` holds exactly.
pub struct PricingService;

impl PricingService {
    /// Price a transfer. Round trips double the base and distance
    /// components only; extras are flat one-off fees. Included extras
    /// contribute zero regardless of selection.
    pub fn calculate(
        catalog: &Catalog,
        distance_km: f64,
        vehicle_id: &str,
        extras: &[String],
        quantities: &HashMap<String, u32>,
        round_trip: bool,
        currency: &str,
    ) -> Result<PriceBreakdown, ConfigurationError> {
        let vehicle = catalog.vehicle(vehicle_id).ok_or(ConfigurationError {
            kind: "vehicle",
            id: vehicle_id.to_string(),
        })?;

        let mut base_cents = to_cents(vehicle.base_price);
        let mut distance_cents = (distance_km * vehicle.per_km_rate * 100.0).round() as i64;

        if round_trip {
            base_cents *= 2;
            distance_cents *= 2;
        }

        let extras_cents = Self::extras_price_cents(catalog, extras, quantities)?;
        let total_cents = base_cents + distance_cents + extras_cents;

        Ok(PriceBreakdown {
            base_price: from_cents(base_cents),
            distance_price: from_cents(distance_cents),
            extras_price: from_cents(extras_cents),
            total: from_cents(total_cents),
            currency: currency.to_string(),
        })
    }

    pub fn extras_price_cents(
        catalog: &Catalog,
        extras: &[String],
        quantities: &HashMap<String, u32>,
    ) -> Result<i64, ConfigurationError> {
        let mut total = 0i64;

        for id in extras {
            let extra = catalog.extra(id).ok_or(ConfigurationError {
                kind: "extra",
                id: id.clone(),
            })?;

            if extra.included {
                continue;
            }

            let unit_cents = to_cents(extra.price);
            if extra.per_unit {
                let quantity = quantities.get(id).copied().unwrap_or(0);
                total += unit_cents * quantity as i64;
            } else {
                total += unit_cents;
            }
        }

        Ok(total)
    }
}

fn to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_quantities() -> HashMap<String, u32> {
        HashMap::new()
    }

    #[test]
    fn test_one_way_is_base_plus_distance() {
        let catalog = Catalog::builtin();
        let breakdown = PricingService::calculate(
            &catalog,
            85.0,
            "sedan",
            &[],
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap();

        assert_eq!(breakdown.base_price, 20.0);
        assert_eq!(breakdown.distance_price, 42.5);
        assert_eq!(breakdown.extras_price, 0.0);
        assert_eq!(breakdown.total, 62.5);
    }

    #[test]
    fn test_round_trip_doubles_base_and_distance_only() {
        let catalog = Catalog::builtin();
        let extras = vec!["onboard-wifi".to_string()];
        let one_way = PricingService::calculate(
            &catalog,
            85.0,
            "sedan",
            &extras,
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap();
        let round_trip = PricingService::calculate(
            &catalog,
            85.0,
            "sedan",
            &extras,
            &no_quantities(),
            true,
            "USD",
        )
        .unwrap();

        assert_eq!(one_way.total, 62.5 + 8.0);
        assert_eq!(round_trip.base_price, 40.0);
        assert_eq!(round_trip.distance_price, 85.0);
        // Extras are not doubled.
        assert_eq!(round_trip.extras_price, 8.0);
        assert_eq!(round_trip.total, 125.0 + 8.0);
    }

    #[test]
    fn test_included_extras_never_change_the_price() {
        let catalog = Catalog::builtin();
        let without = PricingService::calculate(
            &catalog,
            50.0,
            "economy",
            &[],
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap();
        let with_included = PricingService::calculate(
            &catalog,
            50.0,
            "economy",
            &[
                "meet-greet".to_string(),
                "flight-monitoring".to_string(),
                "bottled-water".to_string(),
            ],
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap();

        assert_eq!(without.extras_price, with_included.extras_price);
        assert_eq!(without.total, with_included.total);
    }

    #[test]
    fn test_quantity_extras_multiply() {
        let catalog = Catalog::builtin();
        let extras = vec!["child-seat".to_string()];
        let mut quantities = HashMap::new();
        quantities.insert("child-seat".to_string(), 3u32);

        let breakdown =
            PricingService::calculate(&catalog, 10.0, "van", &extras, &quantities, false, "USD")
                .unwrap();
        assert_eq!(breakdown.extras_price, 15.0);

        // Selected but zero quantity contributes nothing.
        let zero = PricingService::calculate(
            &catalog,
            10.0,
            "van",
            &extras,
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap();
        assert_eq!(zero.extras_price, 0.0);
    }

    #[test]
    fn test_unknown_vehicle_is_a_configuration_error() {
        let catalog = Catalog::builtin();
        let err = PricingService::calculate(
            &catalog,
            10.0,
            "tuk-tuk",
            &[],
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap_err();
        assert_eq!(err.kind, "vehicle");
        assert_eq!(err.id, "tuk-tuk");
    }

    #[test]
    fn test_unknown_extra_is_a_configuration_error() {
        let catalog = Catalog::builtin();
        let err = PricingService::calculate(
            &catalog,
            10.0,
            "sedan",
            &["jacuzzi".to_string()],
            &no_quantities(),
            false,
            "USD",
        )
        .unwrap_err();
        assert_eq!(err.kind, "extra");
    }

    #[test]
    fn test_total_equals_sum_of_components() {
        let catalog = Catalog::builtin();
        let mut quantities = HashMap::new();
        quantities.insert("child-seat".to_string(), 2u32);
        let extras = vec![
            "child-seat".to_string(),
            "sim-card".to_string(),
            "meet-greet".to_string(),
        ];

        // Awkward fractional distances; the invariant must still hold
        // exactly because each component rounds once, in cents.
        for distance in [0.0, 33.333, 85.0, 123.456, 400.0] {
            let b = PricingService::calculate(
                &catalog, distance, "suv", &extras, &quantities, true, "USD",
            )
            .unwrap();
            let sum = (b.base_price * 100.0).round()
                + (b.distance_price * 100.0).round()
                + (b.extras_price * 100.0).round();
            assert_eq!((b.total * 100.0).round(), sum);
        }
    }

    #[test]
    fn test_zero_distance_prices_base_only() {
        let catalog = Catalog::builtin();
        let b =
            PricingService::calculate(&catalog, 0.0, "sedan", &[], &no_quantities(), false, "USD")
                .unwrap();
        assert_eq!(b.total, 20.0);
    }
}
