use std::env;

/// Runtime configuration collected once at startup and injected into the
/// components that need it, instead of ambient `env::var` lookups scattered
/// through the handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_maps_api_key: Option<String>,
    pub flight_api_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    /// When set, external lookups (distance matrix, flight status) are
    /// skipped entirely and the offline estimators are used.
    pub demo_mode: bool,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let demo_mode = env::var("DEMO_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok(),
            flight_api_key: env::var("FLIGHT_API_KEY").ok(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").ok(),
            demo_mode,
            currency: env::var("CURRENCY").unwrap_or_else(|_| "USD".to_string()),
        }
    }

    /// A configuration that never reaches out to external services.
    pub fn offline() -> Self {
        Self {
            google_maps_api_key: None,
            flight_api_key: None,
            stripe_webhook_secret: None,
            demo_mode: true,
            currency: "USD".to_string(),
        }
    }

    pub fn maps_enabled(&self) -> bool {
        !self.demo_mode && self.google_maps_api_key.is_some()
    }

    pub fn flight_lookup_enabled(&self) -> bool {
        !self.demo_mode && self.flight_api_key.is_some()
    }
}
