//! Input file parsing
//!
//! # Formats
//!
//! A sewer network text file has two blocks:
//!
//! ```text
//! Manholes <n>
//! [optional header row]
//! <id> <x> <y> <elevation> <flow_lps>
//! ...
//! Sections <m>
//! [optional header row]
//! <u> <v>
//! ...
//! ```
//!
//! A header row is detected by the presence of any alphabetic character —
//! a pure-numeric row is data. Blank lines are skipped throughout. Ported
//! from `original_source/sewer_opt/parsers.py` (`parse_sewer_file_1`).

use crate::error::{Result, SewerError};
use crate::node::Node;

fn is_header_row(line: &str) -> bool {
    line.chars().any(|c| c.is_ascii_alphabetic())
}

fn split_cols(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn malformed(msg: impl Into<String>) -> SewerError {
    SewerError::MalformedInput(msg.into())
}

/// Parsed network input: raw nodes and raw (u, v) section pairs, not yet
/// assembled into a [`crate::graph::Graph`].
pub struct ParsedNetwork {
    pub nodes: Vec<Node>,
    pub sections: Vec<(u32, u32)>,
}

/// Parse the `Manholes <n>` / `Sections <m>` text format from `contents`.
pub fn parse(contents: &str) -> Result<ParsedNetwork> {
    let lines: Vec<&str> = contents.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let manholes_idx = lines
        .iter()
        .position(|l| l.to_lowercase().starts_with("manholes"))
        .ok_or_else(|| malformed("file does not contain a 'Manholes <count>' block"))?;
    let manholes_count: usize = split_cols(lines[manholes_idx])
        .get(1)
        .ok_or_else(|| malformed("'Manholes' line missing a count"))?
        .parse()
        .map_err(|_| malformed("'Manholes' count is not an integer"))?;

    let mut manhole_start = manholes_idx + 1;
    if lines
        .get(manhole_start)
        .map(|l| is_header_row(l))
        .unwrap_or(false)
    {
        manhole_start += 1;
    }
    let manhole_lines = lines
        .get(manhole_start..manhole_start + manholes_count)
        .ok_or_else(|| malformed("fewer manhole rows than the declared count"))?;

    let mut nodes = Vec::with_capacity(manholes_count);
    for line in manhole_lines {
        let parts = split_cols(line);
        if parts.len() < 5 {
            return Err(malformed(format!("expected 5 columns in manhole row: '{line}'")));
        }
        let parse_f64 = |s: &str| s.parse::<f64>().map_err(|_| malformed(format!("bad number in '{line}'")));
        let id: u32 = parts[0].parse().map_err(|_| malformed(format!("bad node id in '{line}'")))?;
        nodes.push(Node {
            id,
            x: parse_f64(parts[1])?,
            y: parse_f64(parts[2])?,
            ground_level: parse_f64(parts[3])?,
            flow_lps: parse_f64(parts[4])?,
        });
    }

    let sections_search_start = manhole_start + manholes_count;
    let sections_idx = lines[sections_search_start..]
        .iter()
        .position(|l| l.to_lowercase().starts_with("sections"))
        .map(|offset| sections_search_start + offset)
        .ok_or_else(|| malformed("file does not contain a 'Sections <count>' block"))?;
    let sec_count: usize = split_cols(lines[sections_idx])
        .get(1)
        .ok_or_else(|| malformed("'Sections' line missing a count"))?
        .parse()
        .map_err(|_| malformed("'Sections' count is not an integer"))?;

    let mut section_start = sections_idx + 1;
    if lines
        .get(section_start)
        .map(|l| is_header_row(l))
        .unwrap_or(false)
    {
        section_start += 1;
    }
    let section_lines = lines
        .get(section_start..section_start + sec_count)
        .ok_or_else(|| malformed("fewer section rows than the declared count"))?;

    let mut sections = Vec::with_capacity(sec_count);
    for line in section_lines {
        let parts = split_cols(line);
        if parts.len() < 2 {
            continue;
        }
        let u: u32 = parts[0].parse().map_err(|_| malformed(format!("bad node id in '{line}'")))?;
        let v: u32 = parts[1].parse().map_err(|_| malformed(format!("bad node id in '{line}'")))?;
        sections.push((u, v));
    }

    let outlet_count = nodes.iter().filter(|n| n.is_outlet()).count();
    if outlet_count != 1 {
        return Err(malformed(format!(
            "expected exactly one outlet node (negative flow), found {outlet_count}"
        )));
    }

    let balance: f64 = nodes.iter().map(|n| n.flow_lps).sum();
    if balance.abs() > 1.0 {
        tracing::warn!(imbalance_lps = balance, "node flows do not sum to zero");
    }

    Ok(ParsedNetwork { nodes, sections })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
Manholes 3
ID X Y Z INFLOW
1 0.0 0.0 10.0 15.0
2 100.0 0.0 9.5 15.0
3 200.0 0.0 9.0 -30.0
Sections 2
U V
1 2
2 3
";

    #[test]
    fn parses_header_and_data_rows() {
        let parsed = parse(SAMPLE).unwrap();
        assert_eq!(parsed.nodes.len(), 3);
        assert_eq!(parsed.sections, vec![(1, 2), (2, 3)]);
        assert_eq!(parsed.nodes[2].flow_lps, -30.0);
    }

    #[test]
    fn rejects_missing_manholes_block() {
        let result = parse("Sections 1\n1 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_more_than_one_outlet() {
        let text = "Manholes 2\n1 0 0 10 -5\n2 10 0 9 -5\nSections 1\n1 2\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn tolerates_header_free_input() {
        let text = "Manholes 2\n1 0 0 10 10\n2 10 0 9 -10\nSections 1\n1 2\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.nodes.len(), 2);
    }
}
