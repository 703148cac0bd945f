use crate::error::DdsmError;
use crate::parsing::OverlayRecord;
use crate::types::BoundingBox;
use log::warn;

/// Column headers of the annotation table
pub const COLUMNS: [&str; 9] = [
    "NAME", "FEATURE", "SEVERITY", "X1", "Y1", "X2", "Y2", "HEIGHT", "WIDTH",
];

/// One output table row per retained abnormality
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct AnnotationRow {
    /// Image file name including extension
    pub name: String,

    /// Lesion type tags joined with `_`
    pub feature: String,

    /// First reported pathology
    pub severity: Option<String>,

    /// Bounding box of the boundary outline
    pub bbox: BoundingBox,

    /// Image height in pixels
    pub height: usize,

    /// Image width in pixels
    pub width: usize,
}

impl AnnotationRow {
    /// Values in [`COLUMNS`] order
    pub fn fields(&self) -> [String; 9] {
        [
            self.name.clone(),
            self.feature.clone(),
            self.severity.clone().unwrap_or_default(),
            self.bbox.x1().to_string(),
            self.bbox.y1().to_string(),
            self.bbox.x2().to_string(),
            self.bbox.y2().to_string(),
            self.height.to_string(),
            self.width.to_string(),
        ]
    }
}

/// Rows produced from one overlay, plus abnormalities that could not be projected
#[derive(Debug, Default)]
pub struct Projection {
    pub rows: Vec<AnnotationRow>,
    pub skipped: Vec<DdsmError>,
}

/// Builds the image file name for an overlay stem and extension
///
/// `extension` may be given with or without the leading dot.
pub fn image_file_name(stem: &str, extension: &str) -> String {
    format!("{}.{}", stem, extension.trim_start_matches('.'))
}

/// Projects every retained abnormality to a bounding-box row
///
/// Only the boundary outline is used for the box. An abnormality with an
/// empty boundary is skipped and reported as
/// [`DdsmError::DegenerateAnnotation`].
///
/// # Example
///
/// ```
/// use ddsm_core::annotation::project_annotations;
/// use ddsm_core::parsing::parse_overlay;
/// use ddsm_core::MismatchPolicy;
///
/// let content = "\
/// TOTAL_ABNORMALITIES 1
/// ABNORMALITY 1
/// LESION_TYPE MASS
/// PATHOLOGY BENIGN
/// TOTAL_OUTLINES 1
/// BOUNDARY
/// 10 20 4 4 2 2 #
/// ";
/// let record = parse_overlay(content, "A_1234_1.LEFT_CC", MismatchPolicy::BestEffort).unwrap();
/// let projection = project_annotations(&record, "A_1234_1.LEFT_CC.png", 4096, 3072);
/// let row = &projection.rows[0];
/// assert_eq!(row.feature, "MASS");
/// assert_eq!((row.bbox.x1(), row.bbox.y1(), row.bbox.x2(), row.bbox.y2()), (10, 21, 12, 22));
/// ```
pub fn project_annotations(
    record: &OverlayRecord,
    image_name: &str,
    height: usize,
    width: usize,
) -> Projection {
    let mut projection = Projection::default();
    for abnormality in &record.abnormalities {
        let bbox = match abnormality.boundary.bounding_box() {
            Some(bbox) => bbox,
            None => {
                let err = DdsmError::DegenerateAnnotation {
                    name: record.name.clone(),
                    abnormality: abnormality.index,
                    reason: "empty boundary outline".to_string(),
                };
                warn!("Skipping row: {}", err);
                projection.skipped.push(err);
                continue;
            }
        };
        let severity = abnormality.pathology().map(str::to_string);
        if severity.is_none() {
            warn!(
                "{} abnormality {} has no pathology",
                record.name, abnormality.index
            );
        }
        projection.rows.push(AnnotationRow {
            name: image_name.to_string(),
            feature: abnormality.feature(),
            severity,
            bbox,
            height,
            width,
        });
    }
    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Abnormality;
    use crate::types::{Contour, Point};

    fn abnormality(index: usize, boundary: Vec<Point>) -> Abnormality {
        Abnormality {
            index,
            lesion_types: vec!["CALCIFICATION".to_string(), "MASS".to_string()],
            descriptors: Vec::new(),
            pathologies: vec!["MALIGNANT".to_string(), "BENIGN".to_string()],
            assessment: Some(4),
            subtlety: None,
            total_outlines: 2,
            boundary: Contour::new(boundary),
            // cores never influence the box
            cores: vec![Contour::new(vec![Point::new(0, 0), Point::new(500, 500)])],
        }
    }

    fn record(abnormalities: Vec<Abnormality>) -> OverlayRecord {
        let mut record = OverlayRecord::empty("A_1234_1.LEFT_CC", abnormalities.len());
        record.abnormalities = abnormalities;
        record
    }

    #[test]
    fn test_rectangle_bounding_box() {
        let rect = vec![
            Point::new(5, 5),
            Point::new(5, 15),
            Point::new(15, 15),
            Point::new(15, 5),
        ];
        let projection = project_annotations(&record(vec![abnormality(1, rect)]), "x.png", 40, 30);
        assert!(projection.skipped.is_empty());

        let row = &projection.rows[0];
        assert_eq!(row.bbox.x1(), 5);
        assert_eq!(row.bbox.y1(), 5);
        assert_eq!(row.bbox.x2(), 15);
        assert_eq!(row.bbox.y2(), 15);
        assert_eq!(row.feature, "CALCIFICATION_MASS");
        assert_eq!(row.severity.as_deref(), Some("MALIGNANT"));
        assert_eq!((row.height, row.width), (40, 30));
    }

    #[test]
    fn test_empty_boundary_is_skipped() {
        let projection = project_annotations(
            &record(vec![
                abnormality(1, vec![]),
                abnormality(2, vec![Point::new(1, 2), Point::new(3, 4)]),
            ]),
            "x.png",
            10,
            10,
        );
        assert_eq!(projection.rows.len(), 1);
        assert!(matches!(
            projection.skipped[0],
            DdsmError::DegenerateAnnotation { abnormality: 1, .. }
        ));
    }

    #[test]
    fn test_rows_follow_abnormality_order() {
        let projection = project_annotations(
            &record(vec![
                abnormality(1, vec![Point::new(9, 9)]),
                abnormality(2, vec![Point::new(1, 1), Point::new(2, 2)]),
            ]),
            "x.png",
            10,
            10,
        );
        assert_eq!(projection.rows[0].bbox.x1(), 9);
        assert_eq!(projection.rows[1].bbox.x1(), 1);
    }

    #[test]
    fn test_fields_order() {
        let projection = project_annotations(
            &record(vec![abnormality(1, vec![Point::new(1, 2), Point::new(3, 5)])]),
            "A_1234_1.LEFT_CC.png",
            4096,
            3072,
        );
        assert_eq!(
            projection.rows[0].fields(),
            [
                "A_1234_1.LEFT_CC.png",
                "CALCIFICATION_MASS",
                "MALIGNANT",
                "1",
                "2",
                "3",
                "5",
                "4096",
                "3072"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name("A_1234_1.LEFT_CC", ".png"), "A_1234_1.LEFT_CC.png");
        assert_eq!(image_file_name("A_1234_1.LEFT_CC", "png"), "A_1234_1.LEFT_CC.png");
    }
}
