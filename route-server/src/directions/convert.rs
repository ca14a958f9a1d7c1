//! Validation of directions responses.
//!
//! Anything short of a well-formed permutation of the request's waypoints
//! is rejected, so callers can treat every error the same way.

use super::error::DirectionsError;
use super::types::{DirectionsResponse, OptimizedRoute};

/// Extract the optimized waypoint order and route totals from a response.
///
/// `waypoint_count` is the number of intermediate waypoints that were sent.
pub fn optimized_route(
    response: DirectionsResponse,
    waypoint_count: usize,
) -> Result<OptimizedRoute, DirectionsError> {
    if response.status != "OK" {
        return Err(DirectionsError::ProviderStatus {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| DirectionsError::Malformed("no routes in response".to_string()))?;

    let waypoint_order = match route.waypoint_order {
        Some(order) => order,
        None if waypoint_count == 0 => Vec::new(),
        None => {
            return Err(DirectionsError::Malformed(
                "missing waypoint_order".to_string(),
            ));
        }
    };

    validate_permutation(&waypoint_order, waypoint_count)?;

    let total_duration_secs = route
        .legs
        .iter()
        .filter_map(|leg| leg.duration_in_traffic.as_ref().or(leg.duration.as_ref()))
        .map(|v| v.value)
        .sum();
    let total_distance_m = route
        .legs
        .iter()
        .filter_map(|leg| leg.distance.as_ref())
        .map(|v| v.value)
        .sum();

    Ok(OptimizedRoute {
        waypoint_order,
        total_duration_secs,
        total_distance_m,
    })
}

/// Check that `order` lists each of `0..expected_len` exactly once.
pub(crate) fn validate_permutation(order: &[usize], expected_len: usize) -> Result<(), DirectionsError> {
    if order.len() != expected_len {
        return Err(DirectionsError::Malformed(format!(
            "waypoint_order has {} entries, expected {}",
            order.len(),
            expected_len
        )));
    }

    let mut seen = vec![false; expected_len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(DirectionsError::Malformed(format!(
                    "waypoint index {index} repeated"
                )));
            }
            None => {
                return Err(DirectionsError::Malformed(format!(
                    "waypoint index {index} out of range"
                )));
            }
        }
    }

    Ok(())
}
