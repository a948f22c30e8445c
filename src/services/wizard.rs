use std::collections::HashMap;

use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FieldError, ValidationErrors};
use crate::models::booking::BookingType;
use crate::models::location::RoutePoint;
use crate::services::catalog::Catalog;

/// The step sequence is data selected once by booking type, not a pile of
/// `step == N && type == X` conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    Route,
    Flight,
    Itinerary,
    Vehicle,
    Extras,
    Customer,
    Payment,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepDefinition {
    pub key: StepKey,
    pub label: &'static str,
}

const AIRPORT_TRANSFER_STEPS: &[StepDefinition] = &[
    StepDefinition { key: StepKey::Route, label: "Route" },
    StepDefinition { key: StepKey::Flight, label: "Flight" },
    StepDefinition { key: StepKey::Vehicle, label: "Vehicle" },
    StepDefinition { key: StepKey::Extras, label: "Extras" },
    StepDefinition { key: StepKey::Customer, label: "Details" },
    StepDefinition { key: StepKey::Payment, label: "Payment" },
];

const PRIVATE_TOUR_STEPS: &[StepDefinition] = &[
    StepDefinition { key: StepKey::Route, label: "Tour" },
    StepDefinition { key: StepKey::Vehicle, label: "Vehicle" },
    StepDefinition { key: StepKey::Customer, label: "Details" },
    StepDefinition { key: StepKey::Payment, label: "Payment" },
];

const CUSTOM_ITINERARY_STEPS: &[StepDefinition] = &[
    StepDefinition { key: StepKey::Route, label: "Route" },
    StepDefinition { key: StepKey::Itinerary, label: "Itinerary" },
    StepDefinition { key: StepKey::Vehicle, label: "Vehicle" },
    StepDefinition { key: StepKey::Customer, label: "Details" },
    StepDefinition { key: StepKey::Payment, label: "Payment" },
];

pub fn steps_for(booking_type: BookingType) -> &'static [StepDefinition] {
    match booking_type {
        BookingType::AirportTransfer => AIRPORT_TRANSFER_STEPS,
        BookingType::PrivateTour => PRIVATE_TOUR_STEPS,
        BookingType::CustomItinerary => CUSTOM_ITINERARY_STEPS,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteFields {
    pub origin: Option<RoutePoint>,
    pub destination: Option<RoutePoint>,
    pub pickup_date: String,
    pub pickup_time: String,
    #[serde(default)]
    pub round_trip: bool,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

fn default_adults() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightFields {
    pub flight_number: String,
    pub airline: Option<String>,
    pub arrival_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItineraryFields {
    pub stops: Vec<String>,
    #[serde(default)]
    pub days: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtrasFields {
    pub selected: Vec<String>,
    #[serde(default)]
    pub quantities: HashMap<String, u32>,
}

impl ExtrasFields {
    pub fn child_seats(&self) -> u32 {
        self.quantities.get("child-seat").copied().unwrap_or(0)
    }

    /// Included extras are part of every booking; re-assert them after any
    /// client update so they cannot be deselected. Duplicate selections are
    /// dropped so nothing is priced twice.
    fn normalize(&mut self, catalog: &Catalog) {
        for id in catalog.included_extra_ids() {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        let mut seen = std::collections::HashSet::new();
        self.selected.retain(|id| seen.insert(id.clone()));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentMethod {
    Card {
        payment_method_id: String,
        #[serde(default)]
        customer_id: Option<String>,
    },
    Wallet {
        account_id: String,
    },
    Cash,
}

impl PaymentMethod {
    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "card",
            PaymentMethod::Wallet { .. } => "wallet",
            PaymentMethod::Cash => "cash",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentFields {
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WizardFields {
    pub route: RouteFields,
    pub flight: FlightFields,
    pub itinerary: ItineraryFields,
    pub vehicle_id: Option<String>,
    pub extras: ExtrasFields,
    pub customer: CustomerFields,
    pub payment: PaymentFields,
}

/// Partial update applied to the accumulated field set. Sections not
/// present are left untouched, so back navigation never loses data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WizardUpdate {
    pub route: Option<RouteFields>,
    pub flight: Option<FlightFields>,
    pub itinerary: Option<ItineraryFields>,
    pub vehicle_id: Option<String>,
    pub extras: Option<ExtrasFields>,
    pub customer: Option<CustomerFields>,
    pub payment: Option<PaymentFields>,
}

/// Server-side state of one booking wizard session. Steps are 1-based;
/// `completed` is the monotonic watermark of the highest step reached.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    pub booking_type: BookingType,
    pub current_step: usize,
    pub completed: usize,
    pub submitting: bool,
    pub fields: WizardFields,
}

impl WizardState {
    pub fn new(booking_type: BookingType, catalog: &Catalog) -> Self {
        let mut fields = WizardFields::default();
        fields.extras.normalize(catalog);

        Self {
            booking_type,
            current_step: 1,
            completed: 1,
            submitting: false,
            fields,
        }
    }

    pub fn steps(&self) -> &'static [StepDefinition] {
        steps_for(self.booking_type)
    }

    pub fn total_steps(&self) -> usize {
        self.steps().len()
    }

    pub fn step_key(&self, step: usize) -> Option<StepKey> {
        self.steps().get(step.checked_sub(1)?).map(|s| s.key)
    }

    pub fn apply_update(&mut self, update: WizardUpdate, catalog: &Catalog) {
        if let Some(route) = update.route {
            self.fields.route = route;
        }
        if let Some(flight) = update.flight {
            self.fields.flight = flight;
        }
        if let Some(itinerary) = update.itinerary {
            self.fields.itinerary = itinerary;
        }
        if let Some(vehicle_id) = update.vehicle_id {
            self.fields.vehicle_id = Some(vehicle_id);
        }
        if let Some(extras) = update.extras {
            self.fields.extras = extras;
        }
        if let Some(customer) = update.customer {
            self.fields.customer = customer;
        }
        if let Some(payment) = update.payment {
            self.fields.payment = payment;
        }
        self.fields.extras.normalize(catalog);
    }

    pub fn validate_step(&self, key: StepKey, catalog: &Catalog) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match key {
            StepKey::Route => {
                let route = &self.fields.route;
                if route.origin.is_none() {
                    errors.push(FieldError::new("route.origin", "Select a pickup point"));
                }
                if route.destination.is_none() {
                    errors.push(FieldError::new("route.destination", "Select a destination"));
                }
                if route.pickup_date.trim().is_empty() {
                    errors.push(FieldError::new("route.pickup_date", "Pickup date is required"));
                }
                if route.pickup_time.trim().is_empty() {
                    errors.push(FieldError::new("route.pickup_time", "Pickup time is required"));
                }
                if route.round_trip {
                    if route.return_date.as_deref().unwrap_or("").trim().is_empty() {
                        errors.push(FieldError::new(
                            "route.return_date",
                            "Return date is required for round trips",
                        ));
                    }
                    if route.return_time.as_deref().unwrap_or("").trim().is_empty() {
                        errors.push(FieldError::new(
                            "route.return_time",
                            "Return time is required for round trips",
                        ));
                    }
                }
                if route.adults == 0 {
                    errors.push(FieldError::new("route.adults", "At least one adult passenger"));
                }
            }
            StepKey::Flight => {
                // Flight details are optional; the step can always be
                // skipped.
            }
            StepKey::Itinerary => {
                if self.fields.itinerary.stops.is_empty() {
                    errors.push(FieldError::new("itinerary.stops", "Add at least one stop"));
                }
            }
            StepKey::Vehicle => match self.fields.vehicle_id.as_deref() {
                None => errors.push(FieldError::new("vehicle_id", "Select a vehicle")),
                Some(id) => match catalog.vehicle(id) {
                    None => errors.push(FieldError::new("vehicle_id", "Unknown vehicle")),
                    Some(vehicle) => {
                        let seats_needed = self.fields.route.adults + self.fields.route.children;
                        if seats_needed > vehicle.passengers {
                            errors.push(FieldError::new(
                                "vehicle_id",
                                format!(
                                    "{} seats {} passengers; {} requested",
                                    vehicle.name, vehicle.passengers, seats_needed
                                ),
                            ));
                        }
                    }
                },
            },
            StepKey::Extras => {
                for id in &self.fields.extras.selected {
                    match catalog.extra(id) {
                        None => {
                            errors.push(FieldError::new("extras.selected", format!("Unknown extra: {}", id)));
                        }
                        Some(extra) if extra.per_unit => {
                            if self.fields.extras.quantities.get(id).copied().unwrap_or(0) == 0 {
                                errors.push(FieldError::new(
                                    "extras.quantities",
                                    format!("Set a quantity for {}", extra.name),
                                ));
                            }
                        }
                        Some(_) => {}
                    }
                }
            }
            StepKey::Customer => {
                let customer = &self.fields.customer;
                if customer.first_name.trim().is_empty() {
                    errors.push(FieldError::new("customer.first_name", "First name is required"));
                }
                if customer.last_name.trim().is_empty() {
                    errors.push(FieldError::new("customer.last_name", "Last name is required"));
                }
                let email_re =
                    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern");
                if !email_re.is_match(customer.email.trim()) {
                    errors.push(FieldError::new("customer.email", "Valid email is required"));
                }
                if customer.phone.trim().len() < 6 {
                    errors.push(FieldError::new("customer.phone", "Valid phone number is required"));
                }
                if customer.country.trim().is_empty() {
                    errors.push(FieldError::new("customer.country", "Country is required"));
                }
            }
            StepKey::Payment => {
                match &self.fields.payment.method {
                    None => errors.push(FieldError::new("payment.method", "Select a payment method")),
                    Some(PaymentMethod::Card { payment_method_id, .. }) => {
                        if payment_method_id.trim().is_empty() {
                            errors.push(FieldError::new(
                                "payment.payment_method_id",
                                "Card payment method is required",
                            ));
                        }
                    }
                    Some(PaymentMethod::Wallet { account_id }) => {
                        if account_id.trim().is_empty() {
                            errors.push(FieldError::new("payment.account_id", "Wallet account is required"));
                        }
                    }
                    Some(PaymentMethod::Cash) => {}
                }
                if !self.fields.payment.terms_accepted {
                    errors.push(FieldError::new("payment.terms_accepted", "Accept the terms to continue"));
                }
            }
        }
        errors
    }

    /// Advancement gate: every step before `target` must validate.
    pub fn can_proceed(&self, target: usize, catalog: &Catalog) -> bool {
        if target < 1 || target > self.total_steps() {
            return false;
        }
        (1..target).all(|step| {
            self.step_key(step)
                .map(|key| self.validate_step(key, catalog).is_empty())
                .unwrap_or(false)
        })
    }

    /// Move to the next step if the current one validates. On failure the
    /// step is unchanged and the field errors are returned.
    pub fn advance(&mut self, catalog: &Catalog) -> Result<usize, ValidationErrors> {
        if self.current_step >= self.total_steps() {
            return Ok(self.current_step);
        }

        let key = self
            .step_key(self.current_step)
            .expect("current step within bounds");
        let errors = self.validate_step(key, catalog);
        if !errors.is_empty() {
            let mut validation = ValidationErrors::default();
            validation.extend(errors);
            return Err(validation);
        }

        self.current_step += 1;
        self.completed = self.completed.max(self.current_step);
        Ok(self.current_step)
    }

    /// Back navigation is always allowed above step one and never clears
    /// entered data.
    pub fn retreat(&mut self) -> usize {
        if self.current_step > 1 {
            self.current_step -= 1;
        }
        self.current_step
    }

    /// Direct navigation is bounded by the completed watermark, so steps
    /// cannot be skipped ahead of validation.
    pub fn jump_to(&mut self, target: usize) -> Result<usize, ValidationErrors> {
        if target < 1 || target > self.completed {
            let mut validation = ValidationErrors::default();
            validation.push(
                "step",
                format!("Step {} is not reachable yet (completed up to {})", target, self.completed),
            );
            return Err(validation);
        }
        self.current_step = target;
        Ok(self.current_step)
    }

    /// Submission-time double check over every step, since completed steps
    /// can be revisited and edited afterwards.
    pub fn validate_all(&self, catalog: &Catalog) -> ValidationErrors {
        let mut validation = ValidationErrors::default();
        for step in self.steps() {
            validation.extend(self.validate_step(step.key, catalog));
        }
        validation
    }

    /// Terminal state after a successful submission: back to step one with
    /// all fields cleared.
    pub fn reset(&mut self, catalog: &Catalog) {
        *self = WizardState::new(self.booking_type, catalog);
    }
}

/// In-memory wizard sessions, keyed by session id. One wizard per open
/// booking modal; discarded on close or reset after submission.
#[derive(Default)]
pub struct WizardSessions {
    sessions: DashMap<Uuid, WizardState>,
}

impl WizardSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, booking_type: BookingType, catalog: &Catalog) -> (Uuid, WizardState) {
        let id = Uuid::new_v4();
        let state = WizardState::new(booking_type, catalog);
        self.sessions.insert(id, state.clone());
        (id, state)
    }

    pub fn get(&self, id: &Uuid) -> Option<WizardState> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    pub fn with_state<R>(&self, id: &Uuid, f: impl FnOnce(&mut WizardState) -> R) -> Option<R> {
        self.sessions.get_mut(id).map(|mut entry| f(&mut entry))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }
}
