use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A bookable vehicle class. Prices are USD; immutable at runtime once the
/// catalog is loaded.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VehicleOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub passengers: u32,
    pub luggage: u32,
    pub base_price: f64,
    pub per_km_rate: f64,
}

/// Admin-supplied pricing override, stored in the `VehiclePricing`
/// collection and merged over the built-in table at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VehiclePricingOverride {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vehicle_id: String,
    pub base_price: f64,
    pub per_km_rate: f64,
    pub updated_at: Option<DateTime>,
}
