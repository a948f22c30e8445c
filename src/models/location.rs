use serde::{Deserialize, Serialize};

/// One endpoint of a transfer route. Airports resolve through the airport
/// table, named places through the destination table, and freeform points
/// carry their own coordinates.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoutePoint {
    Airport {
        code: String,
    },
    Named {
        name: String,
        area: Option<String>,
    },
    Coordinates {
        lat: f64,
        lng: f64,
        label: Option<String>,
    },
}

impl RoutePoint {
    pub fn label(&self) -> String {
        match self {
            RoutePoint::Airport { code } => code.clone(),
            RoutePoint::Named { name, .. } => name.clone(),
            RoutePoint::Coordinates { label, lat, lng } => label
                .clone()
                .unwrap_or_else(|| format!("{:.4},{:.4}", lat, lng)),
        }
    }
}
