//! Partially-full circular-pipe hydraulics
//!
//! Closed-form solution of Manning's equation for a circular pipe flowing
//! partially full, given discharge, diameter, and slope. There is no
//! iteration: the flow depth is recovered directly from a nested-radical
//! approximation of the θ–Q relationship (§4.3 of SPEC_FULL.md). Any domain
//! violation along the way — a non-finite intermediate, a value outside its
//! physical range — collapses the whole calculation to `None` rather than
//! panicking or propagating an error; infeasible hydraulics are a normal,
//! expected outcome during optimization, not a fault.
//!
//! ## Key Concepts
//!
//! - **θ (theta)**: the angle subtended at the pipe centre by the free
//!   surface chord; stands in for flow depth throughout this module.
//! - **d/D**: proportional flow depth, recovered from θ via
//!   `0.5 * (1 - cos(θ/2))`.
//! - **Hydraulic radius**: `r = (D/4) * ((θ - sin θ) / θ)`.
//!
//! ## References
//!
//! Ported from `original_source/sewer_opt/hydraulics.py`
//! (`SewerHydraulics.calculate_flow_parameters`).

use std::f64::consts::PI;

/// Flow parameters recovered for a partially-full circular pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialFlowResult {
    /// Dimensionless flow factor `K = Q*n*D^(-8/3)*S^(-1/2)`.
    pub k: f64,
    /// Subtended angle θ (radians).
    pub theta: f64,
    /// Proportional flow depth d/D.
    pub depth_ratio: f64,
    /// Hydraulic radius (m).
    pub hydraulic_radius: f64,
    /// Flow velocity (m/s).
    pub velocity: f64,
    /// Flow depth (m).
    pub depth: f64,
}

/// A Manning's-equation solver for a fixed roughness coefficient.
pub struct ManningPartialFlow {
    /// Manning's roughness coefficient, n.
    pub n: f64,
}

impl ManningPartialFlow {
    pub fn new(manning_n: f64) -> Self {
        Self { n: manning_n }
    }

    /// Solve for the partially-full flow state at discharge `q` (m3/s),
    /// diameter `d` (m), and slope `s` (dimensionless), or `None` if any
    /// input or intermediate value falls outside its feasible domain.
    pub fn solve(&self, q: f64, d: f64, s: f64) -> Option<PartialFlowResult> {
        if q <= 0.0 || d <= 0.0 || s <= 0.0 || self.n <= 0.0 {
            return None;
        }

        let k = q * self.n * d.powf(-8.0 / 3.0) * s.powf(-0.5);
        if !k.is_finite() || k <= 0.0 || k >= 1.0 / PI {
            return None;
        }

        let inner_sqrt = (PI * k).sqrt();
        if !inner_sqrt.is_finite() || inner_sqrt > 1.0 {
            return None;
        }
        let middle_sqrt = (1.0 - inner_sqrt).sqrt();
        if !middle_sqrt.is_finite() || middle_sqrt > 1.0 {
            return None;
        }
        let outer_sqrt = (1.0 - middle_sqrt).sqrt();
        let theta = (3.0 * PI / 2.0) * outer_sqrt;
        if !theta.is_finite() || theta <= 0.0 || theta > 2.0 * PI {
            return None;
        }

        let depth_ratio = 0.5 * (1.0 - (theta / 2.0).cos());
        if !depth_ratio.is_finite() || depth_ratio < 0.0 || depth_ratio > 1.0 {
            return None;
        }

        let sin_theta = theta.sin();
        if !sin_theta.is_finite() {
            return None;
        }
        let hydraulic_radius = (d / 4.0) * ((theta - sin_theta) / theta);
        if !hydraulic_radius.is_finite() || hydraulic_radius <= 0.0 || hydraulic_radius > d {
            return None;
        }

        let velocity = (1.0 / self.n) * hydraulic_radius.powf(2.0 / 3.0) * s.sqrt();
        if !velocity.is_finite() || velocity <= 0.0 {
            return None;
        }

        let depth = depth_ratio * d;
        if !depth.is_finite() || depth < 0.0 || depth > d {
            return None;
        }

        Some(PartialFlowResult { k, theta, depth_ratio, hydraulic_radius, velocity, depth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solves_a_feasible_design_point() {
        let solver = ManningPartialFlow::new(0.013);
        let result = solver.solve(0.05, 0.3, 0.005).expect("should be feasible");
        assert!(result.depth_ratio > 0.0 && result.depth_ratio < 1.0);
        assert!(result.velocity > 0.0);
        assert_relative_eq!(result.depth, result.depth_ratio * 0.3);
    }

    #[test]
    fn rejects_nonpositive_inputs() {
        let solver = ManningPartialFlow::new(0.013);
        assert!(solver.solve(0.0, 0.3, 0.005).is_none());
        assert!(solver.solve(0.05, 0.0, 0.005).is_none());
        assert!(solver.solve(0.05, 0.3, 0.0).is_none());
        assert!(ManningPartialFlow::new(0.0).solve(0.05, 0.3, 0.005).is_none());
    }

    #[test]
    fn rejects_when_k_exceeds_domain_bound() {
        // Huge discharge through a tiny pipe on a shallow slope blows K past 1/pi.
        let solver = ManningPartialFlow::new(0.013);
        assert!(solver.solve(50.0, 0.2, 0.0001).is_none());
    }

    #[test]
    fn velocity_increases_with_slope() {
        let solver = ManningPartialFlow::new(0.013);
        let shallow = solver.solve(0.05, 0.4, 0.002).unwrap();
        let steep = solver.solve(0.05, 0.4, 0.02).unwrap();
        assert!(steep.velocity > shallow.velocity);
    }
}
