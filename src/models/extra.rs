use serde::{Deserialize, Serialize};

/// An add-on service attached to a transfer. `included` extras are part of
/// every booking at no charge and cannot be deselected; `per_unit` extras
/// (child seats) are priced by quantity.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransferExtra {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub included: bool,
    pub per_unit: bool,
}
