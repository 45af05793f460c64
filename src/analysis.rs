//! Design-constraint violation reporting
//!
//! A structured, serializable record of a single constraint breach found
//! while evaluating a design (§4.4). Kept as a distinct type from the
//! penalty arithmetic in [`crate::design`] so a violation can be reported
//! even though it was already priced into the cost the optimizer sees.

use serde::{Deserialize, Serialize};

/// A single constraint violation attached to a link in an evaluated design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub severity: Severity,
    /// Link index (1-based, topological order) the violation belongs to.
    #[serde(rename = "link")]
    pub link_index: usize,
    pub message: String,
    /// Actual computed value, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Design limit that was exceeded, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ViolationType {
    /// Diameter was forced upward to satisfy the progressive-diameter rule.
    ProgressiveDiameter,
    /// Velocity fell below the self-cleansing minimum.
    VelocityLow,
    /// Velocity exceeded the erosion-risk maximum.
    VelocityHigh,
    /// Proportional flow depth (d/D) exceeded its cap.
    DepthRatio,
    /// Assumed cover depth fell outside its allowed band.
    Cover,
    /// Manning's equation had no feasible solution at this diameter/slope.
    InfeasibleHydraulics,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Violation {
    pub fn progressive_diameter(link_index: usize, needed_mm: f64) -> Self {
        Self {
            violation_type: ViolationType::ProgressiveDiameter,
            severity: Severity::Warning,
            link_index,
            message: format!("diameter forced up to {needed_mm:.0} mm by progressive-diameter rule"),
            value: Some(needed_mm),
            limit: None,
        }
    }

    pub fn velocity_low(link_index: usize, velocity: f64) -> Self {
        Self {
            violation_type: ViolationType::VelocityLow,
            severity: Severity::Error,
            link_index,
            message: format!("velocity {velocity:.3} m/s below self-cleansing minimum"),
            value: Some(velocity),
            limit: Some(0.6),
        }
    }

    pub fn velocity_high(link_index: usize, velocity: f64) -> Self {
        Self {
            violation_type: ViolationType::VelocityHigh,
            severity: Severity::Error,
            link_index,
            message: format!("velocity {velocity:.3} m/s above erosion-risk maximum"),
            value: Some(velocity),
            limit: Some(3.0),
        }
    }

    pub fn depth_ratio(link_index: usize, d_over_d: f64) -> Self {
        Self {
            violation_type: ViolationType::DepthRatio,
            severity: Severity::Error,
            link_index,
            message: format!("d/D {d_over_d:.3} exceeds 0.8 cap"),
            value: Some(d_over_d),
            limit: Some(0.8),
        }
    }

    pub fn cover(link_index: usize, depth: f64, limit: f64) -> Self {
        Self {
            violation_type: ViolationType::Cover,
            severity: Severity::Error,
            link_index,
            message: format!("assumed cover {depth:.2} m outside allowed band"),
            value: Some(depth),
            limit: Some(limit),
        }
    }

    pub fn infeasible_hydraulics(link_index: usize) -> Self {
        Self {
            violation_type: ViolationType::InfeasibleHydraulics,
            severity: Severity::Error,
            link_index,
            message: "Manning's equation has no feasible solution (K >= 1/pi)".to_string(),
            value: None,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_low_carries_the_fixed_limit() {
        let v = Violation::velocity_low(3, 0.4);
        assert_eq!(v.violation_type, ViolationType::VelocityLow);
        assert_eq!(v.severity, Severity::Error);
        assert_eq!(v.limit, Some(0.6));
    }

    #[test]
    fn infeasible_hydraulics_has_no_numeric_payload() {
        let v = Violation::infeasible_hydraulics(1);
        assert!(v.value.is_none());
        assert!(v.limit.is_none());
    }
}
