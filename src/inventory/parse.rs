//! Parsing of the text a model executable prints for its introspection flag.
//!
//! The expected shape is `*name*architecture*version*dataset*eval_binary*`.
//! Segments are trimmed and empty ones dropped, so a leading or trailing
//! delimiter is harmless. Anything after the fifth segment is ignored.

use super::types::ModelDetails;

/// Field delimiter used by model executables.
pub const DELIMITER: char = '*';

/// Number of positional fields a well-formed answer carries.
pub const FIELD_COUNT: usize = 5;

/// Non-empty trimmed segments of an introspection answer.
pub fn segments(output: &str) -> Vec<&str> {
    output
        .split(DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Parses an introspection answer.
///
/// Returns `Err(count)` with the number of usable segments when there are
/// fewer than [`FIELD_COUNT`].
pub fn parse_details(output: &str) -> Result<ModelDetails, usize> {
    let segments = segments(output);
    if segments.len() < FIELD_COUNT {
        return Err(segments.len());
    }
    Ok(ModelDetails::from_fields([
        segments[0],
        segments[1],
        segments[2],
        segments[3],
        segments[4],
    ]))
}

/// Loose check used by validation: the answer contains the delimiter at all.
pub fn is_well_formed(output: &str) -> bool {
    output.contains(DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_five_fields() {
        let details = parse_details("*A*B*C*D*E*").unwrap();
        assert_eq!(details, ModelDetails {
            display_name: "A".to_string(),
            architecture_name: "B".to_string(),
            architecture_version: "C".to_string(),
            dataset_name: "D".to_string(),
            evaluation_binary_name: "E".to_string(),
        });
    }

    #[test]
    fn test_trims_whitespace_and_newlines() {
        let details = parse_details("  * Shape classifier * ResNet *50 * IPB-2023 *eval_shape.exe*\r\n").unwrap();
        assert_eq!(details.display_name, "Shape classifier");
        assert_eq!(details.architecture_version, "50");
        assert_eq!(details.evaluation_binary_name, "eval_shape.exe");
    }

    #[test]
    fn test_without_leading_delimiter() {
        let details = parse_details("A*B*C*D*E").unwrap();
        assert_eq!(details.display_name, "A");
        assert_eq!(details.evaluation_binary_name, "E");
    }

    #[test]
    fn test_extra_segments_are_ignored() {
        let details = parse_details("*A*B*C*D*E*F*G*").unwrap();
        assert_eq!(details.evaluation_binary_name, "E");
    }

    #[test]
    fn test_too_few_segments() {
        assert_eq!(parse_details("*A*B*"), Err(2));
        assert_eq!(parse_details("no delimiter here"), Err(1));
        assert_eq!(parse_details(""), Err(0));
    }

    #[test]
    fn test_empty_segments_do_not_count() {
        assert_eq!(parse_details("*A**B* *C*D*"), Err(4));
    }

    #[test]
    fn test_well_formed_only_needs_one_delimiter() {
        assert!(is_well_formed("A*"));
        assert!(is_well_formed("*"));
        assert!(!is_well_formed("usage: model <images>"));
        assert!(!is_well_formed(""));
    }
}
