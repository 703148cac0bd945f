//! Parsers for the DDSM text formats
//!
//! - sidecar (`.ics`) case metadata
//! - overlay (`.OVERLAY`) lesion annotations with chain-coded outlines

pub mod chain_code;
pub mod ics;
pub mod lines;
pub mod overlay;

pub use chain_code::{decode_chain_code, parse_chain_line};
pub use ics::{lookup_institution, parse_ics, parse_ics_file, CaseMetadata};
pub use lines::{FieldError, TokenizedLines};
pub use overlay::{parse_overlay, parse_overlay_file, Abnormality, OverlayRecord};
