//! CSV export of evaluated designs
//!
//! # CSV Format
//!
//! One row per link, columns: `link, from_node, to_node, length, diameter,
//! slope, slope_ratio, flow_lps, velocity, d_D, d, status,
//! max_preceding_diameter, input_flow_lps, x, y, z`. Ported from
//! `original_source/sewer_opt/io_helpers.py`
//! (`save_results_with_input_details`).

use crate::design::DesignDetail;
use crate::error::Result;
use ::csv::Writer;
use std::path::Path;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Write `details` to `path` as a header + one row per link.
///
/// Numeric fields are rounded to fixed precision before serialization:
/// length to 2 decimal places, velocity/`d_D`/d and the flow columns to 3.
pub fn write_design_csv<P: AsRef<Path>>(path: P, details: &[DesignDetail]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for detail in details {
        let rounded = DesignDetail {
            length: round_to(detail.length, 2),
            flow_lps: round_to(detail.flow_lps, 3),
            velocity: detail.velocity.map(|v| round_to(v, 3)),
            depth_ratio: detail.depth_ratio.map(|v| round_to(v, 3)),
            d: detail.d.map(|v| round_to(v, 3)),
            input_flow_lps: round_to(detail.input_flow_lps, 3),
            ..detail.clone()
        };
        writer.serialize(&rounded)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_header_and_one_row_per_link() {
        let details = vec![DesignDetail {
            link: 1,
            from_node: 1,
            to_node: 2,
            length: 100.0,
            diameter: 0.3,
            slope: 0.005,
            slope_ratio: "1 in 200".to_string(),
            flow_lps: 15.0,
            velocity: Some(0.9),
            depth_ratio: Some(0.4),
            d: Some(0.12),
            status: "OK".to_string(),
            max_preceding_diameter: None,
            input_flow_lps: 15.0,
            x: 0.0,
            y: 0.0,
            z: 10.0,
        }];

        let path = std::env::temp_dir().join("sewer_opt_csv_export_test.csv");
        write_design_csv(&path, &details).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(contents.contains("link,from_node,to_node"));
        assert!(contents.contains("OK"));
    }
}
