use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Destination {
    pub name: String,
    pub area: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Option<(f64, f64)>,
}
