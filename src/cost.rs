//! Component cost tables (§4.5)
//!
//! Three immutable piecewise-constant lookup tables: pipe cost per metre by
//! nominal diameter, manhole cost by depth bracket, and earthwork cost per
//! cubic metre by depth bracket. Ported verbatim from
//! `original_source/sewer_opt/costs.py` (`CostCalculator`).

/// Nominal pipe diameters (m) and their cost per metre of trench, ascending.
pub const PIPE_DIAMETERS: [f64; 13] = [
    0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.5,
];
const PIPE_COST_PER_M: [f64; 13] = [
    518.0, 724.0, 973.0, 1600.0, 1850.0, 2150.0, 2520.0, 2600.0, 2900.0, 3500.0, 4000.0, 5000.0,
    10000.0,
];

/// Manhole depth brackets `(min, max]` (m) and their fixed cost.
const MANHOLE_BRACKETS: [((f64, f64), f64); 6] = [
    ((0.0, 1.0), 11800.0),
    ((1.0, 2.0), 23100.0),
    ((2.0, 3.0), 40000.0),
    ((3.0, 4.0), 54600.0),
    ((4.0, 5.0), 69200.0),
    ((5.0, 6.0), 77500.0),
];

/// Earthwork depth brackets `(min, max]` (m) and their cost per cubic metre.
const EARTHWORK_BRACKETS: [((f64, f64), f64); 4] = [
    ((0.0, 1.5), 203.0),
    ((1.5, 3.0), 233.5),
    ((3.0, 4.5), 299.0),
    ((4.5, 6.0), 405.0),
];

const MAX_MANHOLE_COST: f64 = 77500.0;
const MAX_EARTHWORK_COST_PER_M3: f64 = 405.0;

/// Cost of `length` metres of pipe at `diameter` (m). The diameter is first
/// snapped to the nearest catalogued size; if that snap rounds *down*, it is
/// bumped to the next size up so capacity is never under-quoted.
pub fn pipe_cost(diameter: f64, length: f64) -> f64 {
    let mut nearest_idx = 0;
    let mut nearest_dist = f64::MAX;
    for (i, &d) in PIPE_DIAMETERS.iter().enumerate() {
        let dist = (d - diameter).abs();
        if dist < nearest_dist {
            nearest_dist = dist;
            nearest_idx = i;
        }
    }
    let idx = if PIPE_DIAMETERS[nearest_idx] < diameter && nearest_idx + 1 < PIPE_DIAMETERS.len() {
        nearest_idx + 1
    } else {
        nearest_idx
    };
    PIPE_COST_PER_M[idx] * length
}

/// Fixed manhole cost for a chamber at the given depth (m).
pub fn manhole_cost(depth: f64) -> f64 {
    for &((lo, hi), cost) in &MANHOLE_BRACKETS {
        if depth > lo && depth <= hi {
            return cost;
        }
    }
    MAX_MANHOLE_COST
}

/// Earthwork cost for excavating `volume` cubic metres at the given depth (m).
pub fn earthwork_cost(depth: f64, volume: f64) -> f64 {
    for &((lo, hi), cost_per_m3) in &EARTHWORK_BRACKETS {
        if depth > lo && depth <= hi {
            return cost_per_m3 * volume;
        }
    }
    MAX_EARTHWORK_COST_PER_M3 * volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pipe_cost_snaps_to_catalogue() {
        assert_relative_eq!(pipe_cost(0.2, 10.0), 5180.0);
        assert_relative_eq!(pipe_cost(1.5, 2.0), 20000.0);
    }

    #[test]
    fn pipe_cost_rounds_up_when_below_nearest() {
        // 0.33 is nearest to 0.35 already (rounds neither up nor down by
        // construction of this test); verify one that truly sits below its
        // nearest catalogued size and must bump up.
        assert_relative_eq!(pipe_cost(0.21, 1.0), 518.0); // nearest is 0.2, 0.2 < 0.21 -> bump to 0.25
        assert_relative_eq!(pipe_cost(0.26, 1.0), 973.0); // nearest is 0.25, 0.25 < 0.26 -> bump to 0.3
    }

    #[test]
    fn manhole_cost_brackets() {
        assert_relative_eq!(manhole_cost(0.5), 11800.0);
        assert_relative_eq!(manhole_cost(1.0), 11800.0);
        assert_relative_eq!(manhole_cost(1.01), 23100.0);
        assert_relative_eq!(manhole_cost(10.0), MAX_MANHOLE_COST);
    }

    #[test]
    fn earthwork_cost_brackets() {
        assert_relative_eq!(earthwork_cost(1.0, 20.0), 203.0 * 20.0);
        assert_relative_eq!(earthwork_cost(1.5, 20.0), 203.0 * 20.0);
        assert_relative_eq!(earthwork_cost(1.51, 20.0), 233.5 * 20.0);
        assert_relative_eq!(earthwork_cost(100.0, 5.0), MAX_EARTHWORK_COST_PER_M3 * 5.0);
    }
}
