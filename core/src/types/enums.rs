use std::fmt;

/// Film digitizer used to scan a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum Scanner {
    Dba,
    Howtek,
    Lumisys,
}

impl Scanner {
    /// Returns the digitizer code as written in sidecar files
    pub fn simple_name(&self) -> &'static str {
        match self {
            Scanner::Dba => "DBA",
            Scanner::Howtek => "HOWTEK",
            Scanner::Lumisys => "LUMISYS",
        }
    }

    /// Parses the digitizer code from a sidecar token
    ///
    /// Matching is exact; sidecar files always carry the upper-case code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "DBA" => Some(Scanner::Dba),
            "HOWTEK" => Some(Scanner::Howtek),
            "LUMISYS" => Some(Scanner::Lumisys),
            _ => None,
        }
    }
}

impl fmt::Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Institution where a case was digitized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum Institution {
    /// Massachusetts General Hospital
    Mgh,
    /// Wake Forest University
    Wfu,
    /// Sacred Heart / Washington University (ISMD)
    Ismd,
}

impl Institution {
    /// Returns the short institution code
    pub fn simple_name(&self) -> &'static str {
        match self {
            Institution::Mgh => "MGH",
            Institution::Wfu => "WFU",
            Institution::Ismd => "ISMD",
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Fixed (file prefix letter, scanner) to institution table
pub const SCANNER_INSTITUTIONS: [(char, Scanner, Institution); 5] = [
    ('A', Scanner::Dba, Institution::Mgh),
    ('A', Scanner::Howtek, Institution::Mgh),
    ('B', Scanner::Lumisys, Institution::Wfu),
    ('C', Scanner::Lumisys, Institution::Wfu),
    ('D', Scanner::Howtek, Institution::Ismd),
];

/// Breast laterality of a scanned view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Laterality {
    Left,
    Right,
}

impl Laterality {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// View position of a scanned film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum ViewPosition {
    Cc,  // Cranio-caudal
    Mlo, // Medio-lateral oblique
}

impl ViewPosition {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ViewPosition::Cc => "cc",
            ViewPosition::Mlo => "mlo",
        }
    }
}

impl fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
