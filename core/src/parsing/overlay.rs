use crate::error::{DdsmError, Result};
use crate::types::{Contour, MismatchPolicy};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use super::chain_code::{decode_chain_code, parse_chain_line};
use super::lines::{FieldError, TokenizedLines};

// Overlay keys
pub const ABNORMALITY_KEY: &str = "ABNORMALITY";
pub const LESION_TYPE_KEY: &str = "LESION_TYPE";
pub const PATHOLOGY_KEY: &str = "PATHOLOGY";
pub const ASSESSMENT_KEY: &str = "ASSESSMENT";
pub const SUBTLETY_KEY: &str = "SUBTLETY";
pub const TOTAL_OUTLINES_KEY: &str = "TOTAL_OUTLINES";
pub const BOUNDARY_KEY: &str = "BOUNDARY";
pub const CORE_KEY: &str = "CORE";

/// One annotated lesion from an overlay file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Abnormality {
    /// 1-based position of the block in the overlay file
    pub index: usize,

    /// Lesion type tags (e.g. `MASS`, `CALCIFICATION`), one per `LESION_TYPE` line
    pub lesion_types: Vec<String>,

    /// Descriptor pairs following the lesion type (e.g. `SHAPE ROUND`)
    pub descriptors: Vec<(String, String)>,

    /// Reported pathologies, in file order
    pub pathologies: Vec<String>,

    /// BI-RADS assessment (0-5)
    pub assessment: Option<u8>,

    /// Subtlety rating
    pub subtlety: Option<u8>,

    /// Declared number of outlines
    pub total_outlines: usize,

    /// Lesion outline
    pub boundary: Contour,

    /// Calcification core outlines
    pub cores: Vec<Contour>,
}

impl Abnormality {
    /// Lesion type tags joined with `_`
    pub fn feature(&self) -> String {
        self.lesion_types.join("_")
    }

    /// First reported pathology
    pub fn pathology(&self) -> Option<&str> {
        self.pathologies.first().map(String::as_str)
    }
}

/// Parsed overlay file
#[derive(Debug)]
pub struct OverlayRecord {
    /// Overlay / image stem name
    pub name: String,

    /// Abnormality count declared on the first line
    pub declared_count: usize,

    /// Abnormalities that passed validation, in file order
    pub abnormalities: Vec<Abnormality>,

    /// Why abnormalities or core outlines were dropped
    pub issues: Vec<DdsmError>,
}

impl OverlayRecord {
    /// Creates a record with no abnormalities
    pub fn empty(name: impl Into<String>, declared_count: usize) -> Self {
        Self {
            name: name.into(),
            declared_count,
            abnormalities: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Number of abnormalities kept
    pub fn retained_count(&self) -> usize {
        self.abnormalities.len()
    }

    /// Reports a difference between declared and retained counts
    pub fn count_mismatch(&self) -> Option<DdsmError> {
        if self.declared_count == self.retained_count() {
            return None;
        }
        Some(DdsmError::AbnormalityCountMismatch {
            name: self.name.clone(),
            declared: self.declared_count,
            retained: self.retained_count(),
        })
    }
}

/// Parses overlay content
///
/// `name` is the overlay stem (e.g. `A_1234_1.LEFT_CC`). Blank lines are
/// ignored. Abnormalities without outlines or without a valid boundary are
/// dropped and recorded in [`OverlayRecord::issues`].
///
/// # Errors
///
/// With [`MismatchPolicy::Strict`], returns
/// [`DdsmError::AbnormalityCountMismatch`] when fewer abnormalities are
/// retained than declared. With [`MismatchPolicy::BestEffort`] parsing
/// never fails; the mismatch is logged and available from
/// [`OverlayRecord::count_mismatch`].
///
/// # Example
///
/// ```
/// use ddsm_core::parsing::parse_overlay;
/// use ddsm_core::MismatchPolicy;
///
/// let content = "\
/// TOTAL_ABNORMALITIES 1
/// ABNORMALITY 1
/// LESION_TYPE MASS SHAPE ROUND MARGINS CIRCUMSCRIBED
/// ASSESSMENT 4
/// PATHOLOGY MALIGNANT
/// TOTAL_OUTLINES 1
/// BOUNDARY
/// 10 20 2 4 6 0 #
/// ";
/// let record = parse_overlay(content, "A_1234_1.LEFT_CC", MismatchPolicy::BestEffort).unwrap();
/// assert_eq!(record.abnormalities.len(), 1);
/// assert_eq!(record.abnormalities[0].assessment, Some(4));
/// assert!(record.count_mismatch().is_none());
/// ```
pub fn parse_overlay(content: &str, name: &str, policy: MismatchPolicy) -> Result<OverlayRecord> {
    let lines = TokenizedLines::new(content);
    let declared_count = declared_count(&lines);
    if declared_count == 0 {
        debug!("{}: no abnormalities declared", name);
        return Ok(OverlayRecord::empty(name, 0));
    }

    let mut record = OverlayRecord::empty(name, declared_count);
    for (i, block) in lines.blocks(ABNORMALITY_KEY).iter().enumerate() {
        let index = i + 1;
        match parse_abnormality(block, name, index, &mut record.issues) {
            Ok(abnormality) => record.abnormalities.push(abnormality),
            Err(e) => {
                warn!("Dropping abnormality {} of {}: {}", index, name, e);
                record.issues.push(e);
            }
        }
    }

    if let Some(mismatch) = record.count_mismatch() {
        match policy {
            MismatchPolicy::Strict => return Err(mismatch),
            MismatchPolicy::BestEffort => warn!("{}", mismatch),
        }
    }
    Ok(record)
}

/// Reads and parses an overlay file; the record name is the file stem
pub fn parse_overlay_file<P: AsRef<Path>>(path: P, policy: MismatchPolicy) -> Result<OverlayRecord> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_overlay(&content, &name, policy)
}

/// Count at token 1 of the first line; absent or unparsable means zero
fn declared_count(lines: &TokenizedLines<'_>) -> usize {
    lines
        .line(0)
        .and_then(|tokens| tokens.get(1))
        .and_then(|count| count.parse().ok())
        .unwrap_or(0)
}

fn parse_abnormality(
    block: &TokenizedLines<'_>,
    name: &str,
    index: usize,
    issues: &mut Vec<DdsmError>,
) -> Result<Abnormality> {
    let malformed = |e: FieldError| DdsmError::MalformedOverlay {
        name: name.to_string(),
        detail: format!("abnormality {}: {}", index, e),
    };
    let degenerate = |reason: &str| DdsmError::DegenerateAnnotation {
        name: name.to_string(),
        abnormality: index,
        reason: reason.to_string(),
    };

    let total_outlines = block
        .parse_token::<usize>(TOTAL_OUTLINES_KEY, 1)
        .map_err(malformed)?
        .unwrap_or(0);
    if total_outlines == 0 {
        return Err(degenerate("no outlines declared"));
    }

    let boundary_tokens = block
        .following(BOUNDARY_KEY)
        .next()
        .ok_or_else(|| degenerate("missing boundary"))?;
    let boundary = decode_outline(boundary_tokens, name, index)?;

    let mut cores = Vec::new();
    for tokens in block.following(CORE_KEY) {
        match decode_outline(tokens, name, index) {
            Ok(core) => cores.push(core),
            Err(e) => {
                warn!("Dropping core outline of {} abnormality {}: {}", name, index, e);
                issues.push(e);
            }
        }
    }

    let mut lesion_types = Vec::new();
    let mut descriptors = Vec::new();
    for tokens in block.all(LESION_TYPE_KEY) {
        let lesion = tokens.get(1).ok_or_else(|| {
            malformed(FieldError::MissingToken {
                key: LESION_TYPE_KEY.to_string(),
                index: 1,
            })
        })?;
        lesion_types.push(lesion.to_string());
        descriptors.extend(
            tokens[2..]
                .chunks_exact(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string())),
        );
    }

    let pathologies = block
        .tokens_of_all(PATHOLOGY_KEY, 1)
        .map_err(malformed)?
        .into_iter()
        .map(str::to_string)
        .collect();

    let assessment = block
        .parse_token::<u8>(ASSESSMENT_KEY, 1)
        .map_err(malformed)?;
    if let Some(birads) = assessment {
        if birads > 5 {
            return Err(DdsmError::MalformedOverlay {
                name: name.to_string(),
                detail: format!("abnormality {}: assessment {} outside 0-5", index, birads),
            });
        }
    }
    let subtlety = block
        .parse_token::<u8>(SUBTLETY_KEY, 1)
        .unwrap_or_else(|e| {
            warn!("{} abnormality {}: ignoring {}", name, index, e);
            None
        });

    debug!(
        "{} abnormality {}: {} boundary points, {} cores",
        name,
        index,
        boundary.len(),
        cores.len()
    );

    Ok(Abnormality {
        index,
        lesion_types,
        descriptors,
        pathologies,
        assessment,
        subtlety,
        total_outlines,
        boundary,
        cores,
    })
}

/// Decodes a chain code line, attaching the overlay context to errors
fn decode_outline(tokens: &[&str], name: &str, index: usize) -> Result<Contour> {
    let chain = parse_chain_line(tokens).map_err(|detail| DdsmError::MalformedOverlay {
        name: name.to_string(),
        detail: format!("abnormality {}: {}", index, detail),
    })?;
    decode_chain_code(&chain).map_err(|e| match e {
        DdsmError::MalformedOverlay { detail, .. } => DdsmError::MalformedOverlay {
            name: name.to_string(),
            detail: format!("abnormality {}: {}", index, detail),
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use rstest::rstest;
    use std::io::Write;

    const SINGLE: &str = "\
TOTAL_ABNORMALITIES 1
ABNORMALITY 1
LESION_TYPE MASS SHAPE ROUND MARGINS CIRCUMSCRIBED
ASSESSMENT 4
SUBTLETY 3
PATHOLOGY MALIGNANT
TOTAL_OUTLINES 1
BOUNDARY
100 200 2 2 4 4 6 6 0 0 #
";

    const CALCIFICATION: &str = "\
TOTAL_ABNORMALITIES 1

ABNORMALITY 1
LESION_TYPE CALCIFICATION TYPE PLEOMORPHIC DISTRIBUTION CLUSTERED
LESION_TYPE MASS SHAPE IRREGULAR
ASSESSMENT 5
PATHOLOGY MALIGNANT
PATHOLOGY BENIGN
TOTAL_OUTLINES 3
BOUNDARY
50 50 2 4 6 0 #
CORE
51 51 2 #
CORE
52 52 4 #
";

    const THREE_WITH_DEGENERATE: &str = "\
TOTAL_ABNORMALITIES 3
ABNORMALITY 1
LESION_TYPE MASS
PATHOLOGY BENIGN
TOTAL_OUTLINES 1
BOUNDARY
10 10 2 2 4 4 #
ABNORMALITY 2
LESION_TYPE MASS
PATHOLOGY MALIGNANT
TOTAL_OUTLINES 1
ABNORMALITY 3
LESION_TYPE CALCIFICATION
PATHOLOGY MALIGNANT
TOTAL_OUTLINES 1
BOUNDARY
30 30 6 6 0 0 #
";

    fn parse(content: &str) -> OverlayRecord {
        parse_overlay(content, "A_1234_1.LEFT_CC", MismatchPolicy::BestEffort).unwrap()
    }

    #[test]
    fn test_zero_declared_yields_empty_record() {
        let record = parse("TOTAL_ABNORMALITIES 0\n");
        assert_eq!(record.declared_count, 0);
        assert!(record.abnormalities.is_empty());
        assert!(record.count_mismatch().is_none());
    }

    #[test]
    fn test_unparsable_count_is_zero() {
        let record = parse("TOTAL_ABNORMALITIES many\nABNORMALITY 1\n");
        assert_eq!(record.declared_count, 0);
        assert!(record.abnormalities.is_empty());

        let record = parse("");
        assert_eq!(record.declared_count, 0);
    }

    #[test]
    fn test_single_abnormality() {
        let record = parse(SINGLE);
        assert_eq!(record.name, "A_1234_1.LEFT_CC");
        assert_eq!(record.abnormalities.len(), 1);

        let abnormality = &record.abnormalities[0];
        assert_eq!(abnormality.feature(), "MASS");
        assert_eq!(abnormality.pathology(), Some("MALIGNANT"));
        assert_eq!(abnormality.assessment, Some(4));
        assert_eq!(abnormality.subtlety, Some(3));
        assert_eq!(abnormality.total_outlines, 1);
        assert_eq!(abnormality.boundary.len(), 8);
        assert_eq!(abnormality.boundary.points()[0], Point::new(101, 200));
        assert!(abnormality.cores.is_empty());
        assert_eq!(
            abnormality.descriptors,
            vec![
                ("SHAPE".to_string(), "ROUND".to_string()),
                ("MARGINS".to_string(), "CIRCUMSCRIBED".to_string()),
            ]
        );
        assert!(record.issues.is_empty());
    }

    #[test]
    fn test_cores_and_joined_lesion_types() {
        let record = parse(CALCIFICATION);
        let abnormality = &record.abnormalities[0];
        assert_eq!(abnormality.feature(), "CALCIFICATION_MASS");
        assert_eq!(abnormality.pathology(), Some("MALIGNANT"));
        assert_eq!(abnormality.pathologies.len(), 2);
        assert_eq!(abnormality.cores.len(), 2);
        assert_eq!(abnormality.cores[0].points(), &[Point::new(52, 51)]);
        assert_eq!(abnormality.cores[1].points(), &[Point::new(52, 53)]);
    }

    #[test]
    fn test_missing_total_outlines_is_excluded() {
        let content = SINGLE.replace("TOTAL_OUTLINES 1\n", "");
        let record = parse(&content);
        assert!(record.abnormalities.is_empty());
        assert_eq!(record.issues.len(), 1);
        assert!(matches!(
            record.issues[0],
            DdsmError::DegenerateAnnotation { abnormality: 1, .. }
        ));
        assert!(matches!(
            record.count_mismatch(),
            Some(DdsmError::AbnormalityCountMismatch {
                declared: 1,
                retained: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_total_outlines_is_excluded() {
        let content = SINGLE.replace("TOTAL_OUTLINES 1", "TOTAL_OUTLINES 0");
        let record = parse(&content);
        assert!(record.abnormalities.is_empty());
        assert!(record.count_mismatch().is_some());
    }

    #[test]
    fn test_missing_boundary_is_reported() {
        let record = parse(THREE_WITH_DEGENERATE);
        assert_eq!(record.declared_count, 3);
        assert_eq!(record.retained_count(), 2);
        assert_eq!(record.abnormalities[0].index, 1);
        assert_eq!(record.abnormalities[1].index, 3);
        assert!(matches!(
            record.issues[0],
            DdsmError::DegenerateAnnotation { abnormality: 2, ref reason, .. } if reason == "missing boundary"
        ));
    }

    #[test]
    fn test_strict_policy_rejects_mismatch() {
        let err = parse_overlay(THREE_WITH_DEGENERATE, "A_1234_1.LEFT_CC", MismatchPolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            DdsmError::AbnormalityCountMismatch {
                declared: 3,
                retained: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_boundary_code_drops_abnormality() {
        let content = SINGLE.replace("100 200 2 2", "100 200 2 9");
        let record = parse(&content);
        assert!(record.abnormalities.is_empty());
        assert!(matches!(
            record.issues[0],
            DdsmError::InvalidChainCode { code: 9, .. }
        ));
    }

    #[test]
    fn test_invalid_core_only_drops_core() {
        let content = CALCIFICATION.replace("51 51 2 #", "51 51 x #");
        let record = parse(&content);
        assert_eq!(record.abnormalities.len(), 1);
        assert_eq!(record.abnormalities[0].cores.len(), 1);
        assert!(matches!(
            record.issues[0],
            DdsmError::MalformedOverlay { ref name, .. } if name == "A_1234_1.LEFT_CC"
        ));
    }

    #[test]
    fn test_out_of_range_assessment() {
        let content = SINGLE.replace("ASSESSMENT 4", "ASSESSMENT 6");
        let record = parse(&content);
        assert!(record.abnormalities.is_empty());
        assert!(record.issues[0].to_string().contains("assessment 6"));
    }

    #[rstest]
    #[case("SUBTLETY 3", "SUBTLETY high")]
    #[case("SUBTLETY 3", "SUBTLETY")]
    fn test_unreadable_subtlety_keeps_abnormality(#[case] from: &str, #[case] to: &str) {
        let content = SINGLE.replace(from, to);
        let record = parse(&content);
        assert_eq!(record.abnormalities.len(), 1);
        assert_eq!(record.abnormalities[0].subtlety, None);
        assert!(record.issues.is_empty());
    }

    #[test]
    fn test_boundary_leaving_coordinate_range_drops_abnormality() {
        let content = SINGLE.replace("100 200 2 2", "2147483647 200 2 2");
        let record = parse(&content);
        assert!(record.abnormalities.is_empty());
        assert!(matches!(
            record.issues[0],
            DdsmError::MalformedOverlay { ref name, ref detail }
                if name == "A_1234_1.LEFT_CC" && detail.contains("coordinate range")
        ));
        assert!(record.count_mismatch().is_some());
    }

    #[test]
    fn test_absent_assessment_is_none() {
        let content = SINGLE.replace("ASSESSMENT 4\n", "");
        let record = parse(&content);
        assert_eq!(record.abnormalities[0].assessment, None);
    }

    #[test]
    fn test_parse_overlay_file_uses_stem() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("B_3001_1.RIGHT_MLO.OVERLAY");
        fs::File::create(&path)
            .unwrap()
            .write_all(SINGLE.as_bytes())
            .unwrap();

        let record = parse_overlay_file(&path, MismatchPolicy::BestEffort).unwrap();
        assert_eq!(record.name, "B_3001_1.RIGHT_MLO");
        assert_eq!(record.abnormalities.len(), 1);
    }
}
