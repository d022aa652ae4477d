//! Tracing setup helpers.

pub mod middleware;

pub use middleware::generate_request_id;

/// Build filter directives string from LoggingConfig
///
/// Produces `base_level,fleetwatch::component=level,...` from the configured
/// base level and any per-component levels. Components are emitted in sorted
/// order so the result is stable.
///
/// # Examples
///
/// ```
/// use fleetwatch::config::{LogFormat, LoggingConfig};
/// use fleetwatch::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("probe".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,fleetwatch::probe=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",fleetwatch::{}={}", component, level));
        }
    }

    filter_str
}
