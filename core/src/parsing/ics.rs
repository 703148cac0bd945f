use crate::error::{DdsmError, Result};
use crate::types::{
    Institution, Scanner, Sequence, SequenceInfo, ALL_SEQUENCES, SCANNER_INSTITUTIONS,
};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::lines::{FieldError, TokenizedLines};

// Sidecar keys
pub const FILENAME_KEY: &str = "filename";
pub const DIGITIZER_KEY: &str = "DIGITIZER";
pub const PATIENT_AGE_KEY: &str = "PATIENT_AGE";
pub const DENSITY_KEY: &str = "DENSITY";

// Token positions on a sequence line:
// LEFT_CC LINES <h> PIXELS_PER_LINE <w> BITS_PER_PIXEL <bpp> RESOLUTION <res> ...
const HEIGHT_TOKEN: usize = 2;
const WIDTH_TOKEN: usize = 4;
const BPP_TOKEN: usize = 6;
const RESOLUTION_TOKEN: usize = 8;

/// Case-level metadata read from a DDSM sidecar (`.ics`) file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CaseMetadata {
    /// Base name of the sidecar file
    pub file_name: String,

    /// Patient identifier (`filename` line)
    pub patient_id: Option<String>,

    /// Patient age in years
    pub age: Option<u32>,

    /// Digitizer used to scan the films
    pub scanner: Scanner,

    /// Institution derived from file prefix and digitizer
    pub institution: Institution,

    /// Breast density (1-4)
    pub density: Option<u8>,

    /// Geometry of every view present in the sidecar
    pub sequences: BTreeMap<Sequence, SequenceInfo>,
}

impl CaseMetadata {
    /// Returns the geometry of a view
    ///
    /// # Errors
    ///
    /// Returns [`DdsmError::MissingSequence`] if the sidecar does not list the view.
    pub fn sequence(&self, sequence: Sequence) -> Result<&SequenceInfo> {
        self.sequences
            .get(&sequence)
            .ok_or_else(|| DdsmError::MissingSequence {
                file: self.file_name.clone(),
                sequence: sequence.key().to_string(),
            })
    }
}

/// Looks up the scan institution for a file prefix letter and digitizer code
///
/// # Errors
///
/// Returns [`DdsmError::UnknownScannerMapping`] for any pair outside the
/// fixed table, including unrecognized digitizer codes.
///
/// # Example
///
/// ```
/// use ddsm_core::parsing::lookup_institution;
/// use ddsm_core::Institution;
///
/// assert_eq!(lookup_institution('A', "DBA").unwrap(), Institution::Mgh);
/// assert!(lookup_institution('Z', "DBA").is_err());
/// ```
pub fn lookup_institution(letter: char, scanner: &str) -> Result<Institution> {
    resolve_scanner(letter, scanner).map(|(_, institution)| institution)
}

fn resolve_scanner(letter: char, code: &str) -> Result<(Scanner, Institution)> {
    let unknown = || DdsmError::UnknownScannerMapping {
        letter,
        scanner: code.to_string(),
    };
    let scanner = Scanner::parse(code).ok_or_else(unknown)?;
    SCANNER_INSTITUTIONS
        .iter()
        .find(|(l, s, _)| *l == letter && *s == scanner)
        .map(|(_, _, institution)| (scanner, *institution))
        .ok_or_else(unknown)
}

/// Parses sidecar content
///
/// `file_name` is the sidecar base name; its first character selects the
/// institution together with the digitizer.
///
/// # Errors
///
/// - [`DdsmError::MalformedMetadata`] if the digitizer line is missing or a
///   view line cannot be parsed
///
/// Unreadable patient id, age or density values are logged and stored as
/// `None`.
/// - [`DdsmError::UnknownScannerMapping`] if the institution lookup fails
pub fn parse_ics(content: &str, file_name: &str) -> Result<CaseMetadata> {
    let lines = TokenizedLines::new(content);
    let malformed = |e: FieldError| DdsmError::MalformedMetadata {
        file: file_name.to_string(),
        detail: e.to_string(),
    };

    let scanner_code = lines
        .token(DIGITIZER_KEY, 1)
        .map_err(malformed)?
        .ok_or_else(|| DdsmError::MalformedMetadata {
            file: file_name.to_string(),
            detail: format!("missing {} line", DIGITIZER_KEY),
        })?;

    let letter = file_name
        .chars()
        .next()
        .ok_or_else(|| DdsmError::MalformedMetadata {
            file: file_name.to_string(),
            detail: "empty file name".to_string(),
        })?;
    let (scanner, institution) = resolve_scanner(letter, scanner_code)?;

    let patient_id = descriptive(file_name, lines.token(FILENAME_KEY, 1)).map(str::to_string);
    let age = descriptive(file_name, lines.parse_token::<u32>(PATIENT_AGE_KEY, 1));
    let density = descriptive(file_name, lines.parse_token::<u8>(DENSITY_KEY, 1)).filter(|d| {
        let valid = (1..=4).contains(d);
        if !valid {
            warn!("{}: ignoring density {} outside 1-4", file_name, d);
        }
        valid
    });

    let mut sequences = BTreeMap::new();
    for sequence in ALL_SEQUENCES {
        if let Some(info) = parse_sequence(&lines, sequence).map_err(malformed)? {
            validate_sequence(&info).map_err(|detail| DdsmError::MalformedMetadata {
                file: file_name.to_string(),
                detail: format!("{}: {}", sequence, detail),
            })?;
            debug!(
                "{}: {} is {}x{} at {} bpp, {} um/px",
                file_name, sequence, info.height, info.width, info.bits_per_pixel, info.resolution
            );
            sequences.insert(sequence, info);
        }
    }

    Ok(CaseMetadata {
        file_name: file_name.to_string(),
        patient_id,
        age,
        scanner,
        institution,
        density,
        sequences,
    })
}

/// Reads and parses a sidecar file
pub fn parse_ics_file<P: AsRef<Path>>(path: P) -> Result<CaseMetadata> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_ics(&content, &file_name)
}

/// Unreadable descriptive fields are logged and left empty
fn descriptive<T>(file_name: &str, field: std::result::Result<Option<T>, FieldError>) -> Option<T> {
    field.unwrap_or_else(|e| {
        warn!("{}: ignoring {}", file_name, e);
        None
    })
}

/// Reads one view line; a view absent from the file yields `None`
fn parse_sequence(
    lines: &TokenizedLines<'_>,
    sequence: Sequence,
) -> std::result::Result<Option<SequenceInfo>, FieldError> {
    let key = sequence.key();
    if !lines.contains(key) {
        return Ok(None);
    }
    Ok(Some(SequenceInfo {
        height: required_token(lines, key, HEIGHT_TOKEN)?,
        width: required_token(lines, key, WIDTH_TOKEN)?,
        bits_per_pixel: required_token(lines, key, BPP_TOKEN)?,
        resolution: required_token(lines, key, RESOLUTION_TOKEN)?,
    }))
}

fn required_token<T: std::str::FromStr>(
    lines: &TokenizedLines<'_>,
    key: &str,
    index: usize,
) -> std::result::Result<T, FieldError> {
    lines
        .parse_token(key, index)?
        .ok_or_else(|| FieldError::MissingToken {
            key: key.to_string(),
            index,
        })
}

fn validate_sequence(info: &SequenceInfo) -> std::result::Result<(), String> {
    if info.height == 0 || info.width == 0 {
        return Err(format!("non-positive size {}x{}", info.height, info.width));
    }
    if info.pixel_count().is_none() {
        return Err(format!("size {}x{} overflows", info.height, info.width));
    }
    if !(info.resolution > 0.0) {
        return Err(format!("non-positive resolution {}", info.resolution));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const ICS: &str = "\
ics_version 1.0
filename A-1234-1
DATE_OF_STUDY 2 7 1995
PATIENT_AGE 64
FILM
FILM_TYPE REGULAR
DENSITY 3
DATE_DIGITIZED 22 7 1997
DIGITIZER DBA 21
SELECTED
LEFT_CC LINES 4096 PIXELS_PER_LINE 3072 BITS_PER_PIXEL 16 RESOLUTION 42 OVERLAY
RIGHT_CC LINES 4120 PIXELS_PER_LINE 3056 BITS_PER_PIXEL 16 RESOLUTION 42 NON_OVERLAY
LEFT_MLO LINES 4160 PIXELS_PER_LINE 3040 BITS_PER_PIXEL 16 RESOLUTION 42 OVERLAY
";

    #[rstest]
    #[case('A', "DBA", Institution::Mgh)]
    #[case('A', "HOWTEK", Institution::Mgh)]
    #[case('B', "LUMISYS", Institution::Wfu)]
    #[case('C', "LUMISYS", Institution::Wfu)]
    #[case('D', "HOWTEK", Institution::Ismd)]
    fn test_lookup_institution(
        #[case] letter: char,
        #[case] scanner: &str,
        #[case] expected: Institution,
    ) {
        assert_eq!(lookup_institution(letter, scanner).unwrap(), expected);
    }

    #[rstest]
    #[case('Z', "DBA")]
    #[case('Z', "HOWTEK")]
    #[case('B', "DBA")]
    #[case('D', "LUMISYS")]
    #[case('A', "KODAK")]
    fn test_lookup_institution_unknown(#[case] letter: char, #[case] scanner: &str) {
        let err = lookup_institution(letter, scanner).unwrap_err();
        assert!(matches!(err, DdsmError::UnknownScannerMapping { letter: l, .. } if l == letter));
    }

    #[test]
    fn test_parse_ics() {
        let meta = parse_ics(ICS, "A-1234-1.ics").unwrap();
        assert_eq!(meta.patient_id.as_deref(), Some("A-1234-1"));
        assert_eq!(meta.age, Some(64));
        assert_eq!(meta.density, Some(3));
        assert_eq!(meta.scanner, Scanner::Dba);
        assert_eq!(meta.institution, Institution::Mgh);
        assert_eq!(meta.sequences.len(), 3);

        let left_cc = meta.sequence(Sequence::LeftCc).unwrap();
        assert_eq!(left_cc.height, 4096);
        assert_eq!(left_cc.width, 3072);
        assert_eq!(left_cc.bits_per_pixel, 16);
        assert_eq!(left_cc.resolution, 42.0);
    }

    #[test]
    fn test_absent_sequence_is_omitted() {
        let meta = parse_ics(ICS, "A-1234-1.ics").unwrap();
        assert!(!meta.sequences.contains_key(&Sequence::RightMlo));
        let err = meta.sequence(Sequence::RightMlo).unwrap_err();
        assert!(matches!(err, DdsmError::MissingSequence { .. }));
    }

    #[test]
    fn test_optional_fields_absent() {
        let content = "DIGITIZER LUMISYS LASER\n";
        let meta = parse_ics(content, "C-0001-1.ics").unwrap();
        assert_eq!(meta.institution, Institution::Wfu);
        assert_eq!(meta.patient_id, None);
        assert_eq!(meta.age, None);
        assert_eq!(meta.density, None);
        assert!(meta.sequences.is_empty());
    }

    #[test]
    fn test_missing_digitizer_is_malformed() {
        let err = parse_ics("filename A-1234-1\n", "A-1234-1.ics").unwrap_err();
        assert!(matches!(err, DdsmError::MalformedMetadata { .. }));
    }

    #[test]
    fn test_unknown_prefix_fails() {
        let err = parse_ics(ICS, "Z-1234-1.ics").unwrap_err();
        assert!(matches!(err, DdsmError::UnknownScannerMapping { letter: 'Z', .. }));
    }

    #[rstest]
    #[case("LEFT_CC LINES abc PIXELS_PER_LINE 3072 BITS_PER_PIXEL 16 RESOLUTION 42")]
    #[case("LEFT_CC LINES 4096 PIXELS_PER_LINE 3072 BITS_PER_PIXEL 16")]
    #[case("LEFT_CC LINES 0 PIXELS_PER_LINE 3072 BITS_PER_PIXEL 16 RESOLUTION 42")]
    #[case("LEFT_CC LINES 4096 PIXELS_PER_LINE 3072 BITS_PER_PIXEL 16 RESOLUTION -1")]
    fn test_malformed_sequence(#[case] line: &str) {
        let content = format!("DIGITIZER HOWTEK\n{}\n", line);
        let err = parse_ics(&content, "D-4000-1.ics").unwrap_err();
        assert!(matches!(err, DdsmError::MalformedMetadata { .. }));
    }

    #[test]
    fn test_size_overflow_is_malformed() {
        let content = "DIGITIZER DBA\n\
LEFT_CC LINES 18446744073709551615 PIXELS_PER_LINE 4 BITS_PER_PIXEL 12 RESOLUTION 50\n";
        let err = parse_ics(content, "A-0001-1.ics").unwrap_err();
        assert!(matches!(
            err,
            DdsmError::MalformedMetadata { ref detail, .. } if detail.contains("overflows")
        ));
    }

    #[rstest]
    #[case("PATIENT_AGE")]
    #[case("PATIENT_AGE sixty")]
    #[case("filename")]
    #[case("DENSITY")]
    #[case("DENSITY 7")]
    #[case("DENSITY x")]
    fn test_unreadable_descriptive_field_is_skipped(#[case] line: &str) {
        let content = format!(
            "DIGITIZER DBA\n{}\n\
LEFT_CC LINES 4096 PIXELS_PER_LINE 3072 BITS_PER_PIXEL 12 RESOLUTION 50\n",
            line
        );
        let meta = parse_ics(&content, "A-0001-1.ics").unwrap();
        assert_eq!(meta.patient_id, None);
        assert_eq!(meta.age, None);
        assert_eq!(meta.density, None);
        assert_eq!(meta.scanner, Scanner::Dba);
        assert_eq!(meta.sequence(Sequence::LeftCc).unwrap().width, 3072);
    }

    #[test]
    fn test_parse_ics_file_uses_base_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("B-3001-1.ics");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"DIGITIZER LUMISYS\nDENSITY 2\n").unwrap();

        let meta = parse_ics_file(&path).unwrap();
        assert_eq!(meta.file_name, "B-3001-1.ics");
        assert_eq!(meta.institution, Institution::Wfu);
        assert_eq!(meta.density, Some(2));
    }
}
