use crate::annotation::{image_file_name, project_annotations, AnnotationRow, BatchTables};
use crate::calibration::{display_remap, normalize_raw, optical_density_correction};
use crate::decode::{prepare_raw, Decompressor};
use crate::error::{DdsmError, Result};
use crate::parsing::{parse_ics_file, parse_overlay_file, CaseMetadata};
use crate::types::{ConvertConfig, DisplayImage, OutputMode, RawImage, Sequence};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of compressed DDSM scans
pub const LJPEG_EXTENSION: &str = "LJPEG";

/// Extension of overlay annotation files
pub const OVERLAY_EXTENSION: &str = "OVERLAY";

/// Category used when an image is not nested deep enough to have one
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// One DDSM scan identified by its LJPEG file path
///
/// Scans are named `<case_id>.<SEQUENCE>.LJPEG` and live next to the
/// case sidecar and their overlay:
///
/// ```text
/// cases/benigns/benign_01/case0029/
///     A-0029-1.ics
///     A_0029_1.LEFT_CC.LJPEG
///     A_0029_1.LEFT_CC.OVERLAY
/// ```
///
/// # Example
///
/// ```
/// use ddsm_core::api::ImageCase;
/// use ddsm_core::Sequence;
///
/// let case = ImageCase::from_path("cases/benigns/benign_01/case0029/A_0029_1.LEFT_CC.LJPEG").unwrap();
/// assert_eq!(case.case_id, "A_0029_1");
/// assert_eq!(case.sequence, Sequence::LeftCc);
/// assert_eq!(case.stem(), "A_0029_1.LEFT_CC");
/// assert!(case.ics_path().ends_with("A-0029-1.ics"));
/// assert!(case.overlay_path().ends_with("A_0029_1.LEFT_CC.OVERLAY"));
/// assert_eq!(case.category, "benigns");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ImageCase {
    /// Path to the LJPEG file
    pub ljpeg_path: PathBuf,

    /// Case identifier, e.g. `A_0029_1`
    pub case_id: String,

    /// View the scan shows
    pub sequence: Sequence,

    /// Name of the directory two levels above the case directory
    pub category: String,
}

impl ImageCase {
    /// Decomposes an LJPEG path into case identity and sibling file paths
    ///
    /// # Errors
    ///
    /// Returns [`DdsmError::InvalidImageName`] if the file name does not
    /// have exactly the three dot-separated parts `<case>.<SEQUENCE>.LJPEG`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let invalid = || DdsmError::InvalidImageName(path.display().to_string());

        let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let parts: Vec<&str> = file_name.split('.').collect();
        let [case_id, sequence, extension] = parts.as_slice() else {
            return Err(invalid());
        };
        if *extension != LJPEG_EXTENSION || case_id.is_empty() {
            return Err(invalid());
        }
        let sequence = Sequence::parse(sequence).ok_or_else(invalid)?;

        Ok(ImageCase {
            ljpeg_path: path.to_path_buf(),
            case_id: case_id.to_string(),
            sequence,
            category: case_category(path),
        })
    }

    /// File name without the LJPEG extension
    pub fn stem(&self) -> String {
        format!("{}.{}", self.case_id, self.sequence.key())
    }

    /// Sidecar path: the case id with `_` replaced by `-`, plus `.ics`
    pub fn ics_path(&self) -> PathBuf {
        self.sibling(&format!("{}.ics", self.case_id.replace('_', "-")))
    }

    /// Overlay path: `<stem>.OVERLAY`
    pub fn overlay_path(&self) -> PathBuf {
        self.sibling(&format!("{}.{}", self.stem(), OVERLAY_EXTENSION))
    }

    /// Output image path `<dir>/<category>/<stem>.<format>`
    pub fn output_path(&self, dir: &Path, config: &ConvertConfig) -> PathBuf {
        dir.join(&self.category)
            .join(image_file_name(&self.stem(), &config.format))
    }

    fn sibling(&self, name: &str) -> PathBuf {
        match self.ljpeg_path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Category name of an image: the directory two levels above its case directory
fn case_category(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .ancestors()
        .nth(3)
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Recursively finds LJPEG scans under a directory, sorted by path
///
/// Unreadable entries below `dir` are logged and skipped.
///
/// # Errors
///
/// Returns an I/O error only if `dir` itself cannot be read.
pub fn find_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(LJPEG_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Result of converting one scan
///
/// The annotation and image paths fail independently: a scanner without a
/// calibration formula loses the image but keeps its rows, and a strict
/// count mismatch loses the rows but keeps the image.
#[derive(Debug)]
pub struct ImageOutcome {
    pub case: ImageCase,

    /// Rows for the overlay, empty for scans without one
    pub rows: Vec<AnnotationRow>,

    /// Dropped abnormalities, count mismatches and skipped rows
    pub warnings: Vec<DdsmError>,

    /// Why the overlay could not be used at all
    pub annotation_error: Option<DdsmError>,

    /// Written image, or why none was written
    pub image: Result<PathBuf>,
}

/// Converts DDSM scans and their annotations
///
/// # Example
///
/// ```no_run
/// use ddsm_core::api::ImageConverter;
/// use ddsm_core::decode::LjpegDecompressor;
/// use ddsm_core::ConvertConfig;
///
/// let converter = ImageConverter::new(LjpegDecompressor::new("jpeg"), ConvertConfig::default());
/// let report = converter.convert_dir("cases", "out").unwrap();
/// report.tables.save_all("out").unwrap();
/// ```
pub struct ImageConverter<D> {
    decompressor: D,
    config: ConvertConfig,
}

impl<D: Decompressor> ImageConverter<D> {
    pub fn new(decompressor: D, config: ConvertConfig) -> Self {
        Self {
            decompressor,
            config,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Builds the annotation rows of one scan
    ///
    /// A scan without an overlay file has no rows. Rows carry the sidecar
    /// geometry of the scan's view as HEIGHT and WIDTH.
    ///
    /// # Errors
    ///
    /// Propagates overlay read errors and, under the strict policy,
    /// [`DdsmError::AbnormalityCountMismatch`].
    pub fn annotate(
        &self,
        case: &ImageCase,
        metadata: &CaseMetadata,
    ) -> Result<(Vec<AnnotationRow>, Vec<DdsmError>)> {
        let overlay_path = case.overlay_path();
        if !overlay_path.is_file() {
            debug!("{}: no overlay", case.stem());
            return Ok((Vec::new(), Vec::new()));
        }

        let info = metadata.sequence(case.sequence)?;
        let mut record = parse_overlay_file(&overlay_path, self.config.mismatch_policy)?;
        let mismatch = record.count_mismatch();
        let image_name = image_file_name(&case.stem(), &self.config.format);
        let projection = project_annotations(&record, &image_name, info.height, info.width);

        let mut warnings = std::mem::take(&mut record.issues);
        warnings.extend(mismatch);
        warnings.extend(projection.skipped);
        Ok((projection.rows, warnings))
    }

    /// Decompresses and converts one scan to an 8-bit display image
    pub fn render(&self, case: &ImageCase, metadata: &CaseMetadata) -> Result<DisplayImage> {
        let info = metadata.sequence(case.sequence)?;
        let decoded = self.decompressor.decompress(&case.ljpeg_path)?;
        let raw = prepare_raw(decoded, info)?;
        render_image(&raw, metadata, self.config.mode)
    }

    /// Runs both the annotation and the image path for one scan
    ///
    /// # Errors
    ///
    /// Fails only when the case itself is unusable: the sidecar is missing
    /// or malformed, or does not describe the scan's view.
    pub fn convert(&self, case: &ImageCase, output_dir: &Path) -> Result<ImageOutcome> {
        let metadata = parse_ics_file(case.ics_path())?;
        metadata.sequence(case.sequence)?;
        info!("Converting {}", case.ljpeg_path.display());

        let (rows, warnings, annotation_error) = match self.annotate(case, &metadata) {
            Ok((rows, warnings)) => (rows, warnings, None),
            Err(e) => {
                warn!("{}: annotations dropped: {}", case.stem(), e);
                (Vec::new(), Vec::new(), Some(e))
            }
        };

        let image = self.render(case, &metadata).and_then(|display| {
            let path = case.output_path(output_dir, &self.config);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            save_display_image(&display, &path)?;
            Ok(path)
        });
        if let Err(e) = &image {
            warn!("{}: image not written: {}", case.stem(), e);
        }

        Ok(ImageOutcome {
            case: case.clone(),
            rows,
            warnings,
            annotation_error,
            image,
        })
    }
}

impl<D: Decompressor + Sync> ImageConverter<D> {
    /// Converts scans in parallel and merges their rows by category
    ///
    /// Each scan is processed independently; rows are merged afterwards in
    /// input order, so tables do not depend on scheduling.
    pub fn convert_all(&self, paths: &[PathBuf], output_dir: &Path) -> BatchReport {
        let results: Vec<(&PathBuf, Result<ImageOutcome>)> = paths
            .par_iter()
            .map(|path| {
                let outcome = ImageCase::from_path(path)
                    .and_then(|case| self.convert(&case, output_dir));
                (path, outcome)
            })
            .collect();

        let mut report = BatchReport {
            images_found: paths.len(),
            ..BatchReport::default()
        };
        for (path, result) in results {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report
                        .case_failures
                        .push((path.display().to_string(), e.to_string()));
                }
            }
        }
        report
    }

    /// Finds and converts every scan under `input_dir`
    pub fn convert_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchReport> {
        let paths = find_images(input_dir)?;
        info!("Found {} LJPEG files", paths.len());
        fs::create_dir_all(output_dir.as_ref())?;
        Ok(self.convert_all(&paths, output_dir.as_ref()))
    }
}

/// Summary and merged tables of a batch conversion
#[derive(Debug, Default)]
pub struct BatchReport {
    pub images_found: usize,
    pub images_written: usize,
    pub image_failures: usize,
    pub warnings: usize,

    /// Image path and reason for every scan skipped entirely
    pub case_failures: Vec<(String, String)>,

    pub tables: BatchTables,
}

impl BatchReport {
    fn record(&mut self, outcome: ImageOutcome) {
        match outcome.image {
            Ok(_) => self.images_written += 1,
            Err(_) => self.image_failures += 1,
        }
        self.warnings += outcome.warnings.len() + usize::from(outcome.annotation_error.is_some());
        self.tables.merge(&outcome.case.category, outcome.rows);
    }
}

/// Converts raw samples to a display image in the given mode
///
/// # Errors
///
/// Returns [`DdsmError::UnsupportedCalibration`] in correction mode when
/// the sidecar's scanner combination has no formula.
pub fn render_image(raw: &RawImage, metadata: &CaseMetadata, mode: OutputMode) -> Result<DisplayImage> {
    match mode {
        OutputMode::Correction => {
            let density = optical_density_correction(raw, metadata.institution, metadata.scanner)?;
            Ok(display_remap(&density))
        }
        OutputMode::Normalize => {
            warn!("{}: normalizing raw values, calibration is lost", metadata.file_name);
            Ok(normalize_raw(raw))
        }
    }
}

/// Writes an 8-bit grayscale image; the format follows the file extension
pub fn save_display_image<P: AsRef<Path>>(display: &DisplayImage, path: P) -> Result<()> {
    let (width, height) = (display.width() as u32, display.height() as u32);
    let buffer = image::GrayImage::from_raw(width, height, display.as_slice().to_vec()).ok_or(
        DdsmError::DimensionMismatch {
            expected: display.width() * display.height(),
            actual: display.as_slice().len(),
        },
    )?;
    buffer.save(path.as_ref())?;
    debug!("Wrote {}", path.as_ref().display());
    Ok(())
}
