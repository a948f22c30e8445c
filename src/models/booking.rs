use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::location::RoutePoint;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BookingType {
    AirportTransfer,
    PrivateTour,
    CustomItinerary,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "assigned" => Some(Self::Assigned),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
}

/// Price components at the moment of submission. Always derived in full
/// from the inputs; the stored copy is a snapshot and is never recomputed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub base_price: f64,
    pub distance_price: f64,
    pub extras_price: f64,
    pub total: f64,
    pub currency: String,
}

/// Route facts as resolved at submission time, including whether the
/// distance came from a degraded fallback.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouteSnapshot {
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub degraded: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlightDetails {
    pub flight_number: String,
    pub airline: Option<String>,
    pub arrival_time: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriverAssignment {
    pub driver_id: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_id: String,
}

/// The immutable record assembled once every wizard step has validated.
/// Owned by the persistence layer after submission.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransferBooking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub booking_reference: String,
    pub booking_type: BookingType,
    pub route: RouteSnapshot,
    pub round_trip: bool,
    pub pickup_date: String,
    pub pickup_time: String,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub flight: Option<FlightDetails>,
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub extras: Vec<String>,
    pub child_seats: u32,
    pub customer: CustomerInfo,
    pub special_requests: Option<String>,
    pub pricing: PriceBreakdown,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub status: BookingStatus,
    pub status_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}
