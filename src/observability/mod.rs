//! Observability for geoplan
//!
//! - Structured logging (JSON lines on stderr)
//! - Atomic counters
//! - Begin/complete scopes around requests
//!
//! Observability is read-only: nothing here changes planning results.
//!
//! ```ignore
//! use geoplan::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("PLAN_SYNTHESIZED", &[("layer", "buildings")]);
//! log_event_with_fields(Event::CatalogLoaded, &[("layers", "16")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, PlannerMetrics};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::CatalogLoaded, &[("layers", "3")]);
    }
}
