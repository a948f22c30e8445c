use std::collections::HashMap;
use std::sync::Arc;

use futures::TryStreamExt;
use mongodb::Client;

use crate::models::airport::Airport;
use crate::models::destination::Destination;
use crate::models::extra::TransferExtra;
use crate::models::vehicle::{VehicleOption, VehiclePricingOverride};

/// Normalize a place name to the slug form used by the road-distance table:
/// lowercase, runs of non-alphanumerics collapsed to a single hyphen.
pub fn normalize_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// The static reference tables: airports, destinations, vehicle classes,
/// extras, and pre-measured road distances from CMB. Loaded once at startup
/// (with admin pricing overrides merged in) and shared immutably.
#[derive(Debug, Clone)]
pub struct Catalog {
    airports: Vec<Airport>,
    destinations: Vec<Destination>,
    vehicles: Vec<VehicleOption>,
    extras: Vec<TransferExtra>,
    route_distances: HashMap<String, f64>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            airports: builtin_airports(),
            destinations: builtin_destinations(),
            vehicles: builtin_vehicles(),
            extras: builtin_extras(),
            route_distances: builtin_route_distances(),
        }
    }

    pub fn with_vehicle_overrides(mut self, overrides: Vec<VehiclePricingOverride>) -> Self {
        for over in overrides {
            if let Some(vehicle) = self.vehicles.iter_mut().find(|v| v.id == over.vehicle_id) {
                vehicle.base_price = over.base_price;
                vehicle.per_km_rate = over.per_km_rate;
            } else {
                log::warn!(
                    "Ignoring pricing override for unknown vehicle id: {}",
                    over.vehicle_id
                );
            }
        }
        self
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn vehicles(&self) -> &[VehicleOption] {
        &self.vehicles
    }

    pub fn extras(&self) -> &[TransferExtra] {
        &self.extras
    }

    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.airports
            .iter()
            .find(|a| a.code.eq_ignore_ascii_case(code))
    }

    pub fn destination(&self, name: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn vehicle(&self, id: &str) -> Option<&VehicleOption> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn extra(&self, id: &str) -> Option<&TransferExtra> {
        self.extras.iter().find(|e| e.id == id)
    }

    pub fn included_extra_ids(&self) -> Vec<String> {
        self.extras
            .iter()
            .filter(|e| e.included)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Pre-measured road distance for a named area, keyed by the full
    /// normalized slug.
    pub fn route_distance(&self, area_or_name: &str) -> Option<f64> {
        self.route_distances
            .get(&normalize_slug(area_or_name))
            .copied()
    }

    pub fn search_airports(&self, query: &str) -> Vec<&Airport> {
        if query.is_empty() {
            return self.airports.iter().collect();
        }
        let q = query.to_lowercase();
        self.airports
            .iter()
            .filter(|a| {
                a.code.to_lowercase().contains(&q)
                    || a.name.to_lowercase().contains(&q)
                    || a.city.to_lowercase().contains(&q)
            })
            .collect()
    }

    pub fn search_destinations(&self, query: &str) -> Vec<&Destination> {
        if query.len() < 2 {
            return self.destinations.iter().take(10).collect();
        }
        let q = query.to_lowercase();
        self.destinations
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&q) || d.area.to_lowercase().contains(&q))
            .take(10)
            .collect()
    }
}

/// Builtin tables plus any admin pricing overrides from the `VehiclePricing`
/// collection. A storage failure falls back to the builtin table.
pub async fn load_catalog(client: &Arc<Client>) -> Catalog {
    let catalog = Catalog::builtin();

    let collection: mongodb::Collection<VehiclePricingOverride> =
        client.database("Transfers").collection("VehiclePricing");

    match collection.find(mongodb::bson::doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<VehiclePricingOverride>>().await {
            Ok(overrides) => {
                if !overrides.is_empty() {
                    log::info!("Applying {} vehicle pricing override(s)", overrides.len());
                }
                catalog.with_vehicle_overrides(overrides)
            }
            Err(e) => {
                log::warn!("Failed to read vehicle pricing overrides: {}", e);
                catalog
            }
        },
        Err(e) => {
            log::warn!("Failed to query vehicle pricing overrides: {}", e);
            catalog
        }
    }
}

fn builtin_airports() -> Vec<Airport> {
    let rows: [(&str, &str, &str, &str, (f64, f64)); 6] = [
        (
            "CMB",
            "Bandaranaike International Airport",
            "Colombo",
            "Main international airport serving Colombo",
            (7.1808, 79.8841),
        ),
        (
            "JAF",
            "Jaffna International Airport",
            "Jaffna",
            "International airport in Northern Sri Lanka",
            (9.7924, 80.0700),
        ),
        (
            "HRI",
            "Mattala Rajapaksa International Airport",
            "Hambantota",
            "Second international airport in Southern Sri Lanka",
            (6.2846, 81.1239),
        ),
        (
            "RML",
            "Ratmalana Airport",
            "Colombo",
            "Domestic airport near Colombo",
            (6.8220, 79.8862),
        ),
        (
            "BTC",
            "Batticaloa Airport",
            "Batticaloa",
            "Domestic airport in Eastern Sri Lanka",
            (7.7057, 81.6788),
        ),
        (
            "TRR",
            "China Bay Airport",
            "Trincomalee",
            "Airport serving Trincomalee",
            (8.5385, 81.1819),
        ),
    ];

    rows.into_iter()
        .map(|(code, name, city, description, coordinates)| Airport {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: "Sri Lanka".to_string(),
            description: description.to_string(),
            coordinates,
        })
        .collect()
}

fn builtin_destinations() -> Vec<Destination> {
    let rows: [(&str, &str, &str, Option<(f64, f64)>); 24] = [
        ("Colombo City Center", "Colombo", "city", Some((6.9271, 79.8612))),
        ("Colombo Fort", "Colombo", "city", Some((6.9344, 79.8428))),
        ("Negombo Beach", "Negombo", "beach", Some((7.2147, 79.8358))),
        ("Kandy City", "Kandy", "city", Some((7.2906, 80.6337))),
        ("Temple of the Tooth", "Kandy", "attraction", Some((7.2936, 80.6413))),
        ("Galle Fort", "Galle", "attraction", Some((6.0267, 80.2170))),
        ("Unawatuna Beach", "Galle", "beach", Some((6.0108, 80.2486))),
        ("Bentota Beach", "Bentota", "beach", Some((6.4189, 79.9950))),
        ("Hikkaduwa Beach", "Hikkaduwa", "beach", Some((6.1395, 80.1063))),
        ("Mirissa Beach", "Mirissa", "beach", Some((5.9483, 80.4716))),
        ("Tangalle Beach", "Tangalle", "beach", Some((6.0237, 80.7947))),
        ("Ella Town", "Ella", "hill-country", Some((6.8667, 81.0466))),
        ("Nine Arch Bridge", "Ella", "attraction", Some((6.8782, 81.0607))),
        ("Nuwara Eliya", "Nuwara Eliya", "hill-country", Some((6.9497, 80.7891))),
        ("Sigiriya Rock Fortress", "Sigiriya", "attraction", Some((7.9570, 80.7603))),
        ("Dambulla Cave Temple", "Dambulla", "attraction", Some((7.8567, 80.6492))),
        ("Polonnaruwa Ancient City", "Polonnaruwa", "attraction", Some((7.9403, 81.0188))),
        ("Anuradhapura Ancient City", "Anuradhapura", "attraction", Some((8.3114, 80.4037))),
        ("Yala National Park", "Yala", "wildlife", Some((6.3728, 81.5016))),
        ("Udawalawe National Park", "Udawalawe", "wildlife", Some((6.4389, 80.8983))),
        ("Arugam Bay", "Arugam Bay", "beach", Some((6.8390, 81.8344))),
        ("Trincomalee", "Trincomalee", "beach", Some((8.5874, 81.2152))),
        ("Jaffna City", "Jaffna", "city", Some((9.6615, 80.0255))),
        ("Mount Lavinia", "Mount Lavinia", "beach", Some((6.8389, 79.8653))),
    ];

    rows.into_iter()
        .map(|(name, area, kind, coordinates)| Destination {
            name: name.to_string(),
            area: area.to_string(),
            kind: kind.to_string(),
            coordinates,
        })
        .collect()
}

fn builtin_vehicles() -> Vec<VehicleOption> {
    let rows: [(&str, &str, &str, u32, u32, f64, f64); 7] = [
        ("economy", "Economy Sedan", "Toyota Axio, Honda Fit", 3, 2, 15.0, 0.35),
        ("sedan", "Premium Sedan", "Toyota Premio, Honda Grace", 3, 3, 20.0, 0.50),
        ("suv", "SUV", "Toyota Prado, Mitsubishi Montero", 6, 4, 30.0, 0.65),
        ("van", "Mini Van", "Toyota KDH, Nissan Caravan", 8, 6, 28.0, 0.55),
        ("luxury", "Luxury Vehicle", "Mercedes E-Class, BMW 5 Series", 3, 3, 55.0, 1.00),
        ("luxury-suv", "Luxury SUV", "Land Cruiser V8, Range Rover", 6, 4, 70.0, 1.20),
        ("coach", "Mini Coach", "Toyota Coaster, Rosa Bus", 25, 25, 45.0, 0.80),
    ];

    rows.into_iter()
        .map(
            |(id, name, description, passengers, luggage, base_price, per_km_rate)| VehicleOption {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                passengers,
                luggage,
                base_price,
                per_km_rate,
            },
        )
        .collect()
}

fn builtin_extras() -> Vec<TransferExtra> {
    let rows: [(&str, &str, &str, f64, bool, bool); 7] = [
        (
            "meet-greet",
            "Meet & Greet",
            "Driver waits at arrivals with a name board",
            0.0,
            true,
            false,
        ),
        (
            "flight-monitoring",
            "Flight Monitoring",
            "Pickup time adjusted to the actual arrival",
            0.0,
            true,
            false,
        ),
        (
            "bottled-water",
            "Bottled Water",
            "Chilled water for every passenger",
            0.0,
            true,
            false,
        ),
        (
            "child-seat",
            "Child Seat",
            "Forward or rear facing, fitted before pickup",
            5.0,
            false,
            true,
        ),
        (
            "onboard-wifi",
            "Onboard Wi-Fi",
            "Portable hotspot for the journey",
            8.0,
            false,
            false,
        ),
        (
            "sim-card",
            "Tourist SIM Card",
            "Local SIM with data, handed over at pickup",
            12.0,
            false,
            false,
        ),
        (
            "flower-garland",
            "Welcome Flower Garland",
            "Traditional welcome on arrival",
            6.0,
            false,
            false,
        ),
    ];

    rows.into_iter()
        .map(|(id, name, description, price, included, per_unit)| TransferExtra {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            included,
            per_unit,
        })
        .collect()
}

fn builtin_route_distances() -> HashMap<String, f64> {
    // Measured road distances from CMB airport, in km.
    let rows: [(&str, f64); 24] = [
        ("colombo", 35.0),
        ("negombo", 10.0),
        ("kandy", 120.0),
        ("galle", 150.0),
        ("bentota", 95.0),
        ("hikkaduwa", 120.0),
        ("mirissa", 165.0),
        ("tangalle", 210.0),
        ("ella", 250.0),
        ("nuwara-eliya", 180.0),
        ("sigiriya", 175.0),
        ("dambulla", 155.0),
        ("polonnaruwa", 200.0),
        ("anuradhapura", 195.0),
        ("yala", 280.0),
        ("udawalawe", 195.0),
        ("arugam-bay", 320.0),
        ("trincomalee", 275.0),
        ("jaffna", 400.0),
        ("hambantota", 260.0),
        ("kalpitiya", 130.0),
        ("pasikuda", 310.0),
        ("mount-lavinia", 45.0),
        ("unawatuna", 155.0),
    ];

    rows.into_iter()
        .map(|(slug, km)| (slug.to_string(), km))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Kandy"), "kandy");
        assert_eq!(normalize_slug("Nuwara Eliya"), "nuwara-eliya");
        assert_eq!(normalize_slug("Arugam  Bay "), "arugam-bay");
    }

    #[test]
    fn test_multi_word_areas_resolve() {
        // The full slug must be used for the lookup; truncating to the
        // first token would miss these.
        let catalog = Catalog::builtin();
        assert_eq!(catalog.route_distance("Nuwara Eliya"), Some(180.0));
        assert_eq!(catalog.route_distance("Arugam Bay"), Some(320.0));
    }

    #[test]
    fn test_vehicle_lookup() {
        let catalog = Catalog::builtin();
        let sedan = catalog.vehicle("sedan").unwrap();
        assert_eq!(sedan.base_price, 20.0);
        assert_eq!(sedan.per_km_rate, 0.5);
        assert!(catalog.vehicle("rickshaw").is_none());
    }

    #[test]
    fn test_pricing_overrides_replace_builtin() {
        let catalog = Catalog::builtin().with_vehicle_overrides(vec![VehiclePricingOverride {
            id: None,
            vehicle_id: "sedan".to_string(),
            base_price: 25.0,
            per_km_rate: 0.6,
            updated_at: None,
        }]);
        let sedan = catalog.vehicle("sedan").unwrap();
        assert_eq!(sedan.base_price, 25.0);
        assert_eq!(sedan.per_km_rate, 0.6);
    }

    #[test]
    fn test_search_airports_matches_code_and_city() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.search_airports("cmb").len(), 1);
        // Two airports serve Colombo: CMB and RML.
        assert_eq!(catalog.search_airports("colombo").len(), 2);
        assert_eq!(catalog.search_airports("").len(), 6);
    }

    #[test]
    fn test_search_destinations_caps_results() {
        let catalog = Catalog::builtin();
        assert!(catalog.search_destinations("x").len() <= 10);
        let kandy = catalog.search_destinations("kandy");
        assert!(kandy.iter().all(|d| d.area == "Kandy"));
    }

    #[test]
    fn test_included_extras() {
        let catalog = Catalog::builtin();
        let included = catalog.included_extra_ids();
        assert!(included.contains(&"meet-greet".to_string()));
        assert!(!included.contains(&"child-seat".to_string()));
    }
}
