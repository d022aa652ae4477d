//! Request ID generation

use uuid::Uuid;

/// Correlation id attached to every HTTP request span.
///
/// # Examples
///
/// ```
/// use fleetwatch::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert_eq!(request_id.len(), 36);
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
