use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Failure to read a field from a keyed line
///
/// Absence of the key itself is not an error; accessors return `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The key line exists but is too short
    #[error("line '{key}' has no token at index {index}")]
    MissingToken { key: String, index: usize },

    /// The token exists but does not parse as the requested type
    #[error("line '{key}' token {index} has invalid value '{value}'")]
    InvalidValue {
        key: String,
        index: usize,
        value: String,
    },
}

/// Whitespace-tokenized lines indexed by their first token
///
/// Content is tokenized once; every lookup afterwards goes through the
/// key index instead of re-scanning the lines.
///
/// # Example
///
/// ```
/// use ddsm_core::parsing::TokenizedLines;
///
/// let lines = TokenizedLines::new("DIGITIZER HOWTEK\nDENSITY 3\n\n");
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines.token("DIGITIZER", 1).unwrap(), Some("HOWTEK"));
/// assert_eq!(lines.parse_token::<u8>("DENSITY", 1).unwrap(), Some(3));
/// assert_eq!(lines.token("PATIENT_AGE", 1).unwrap(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenizedLines<'a> {
    lines: Vec<Vec<&'a str>>,
    index: HashMap<&'a str, Vec<usize>>,
}

impl<'a> TokenizedLines<'a> {
    /// Tokenizes text content, dropping blank lines
    pub fn new(content: &'a str) -> Self {
        Self::from_tokens(
            content
                .lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>())
                .filter(|tokens| !tokens.is_empty())
                .collect(),
        )
    }

    /// Builds the key index over already tokenized lines
    pub fn from_tokens(lines: Vec<Vec<&'a str>>) -> Self {
        let mut index: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, tokens) in lines.iter().enumerate() {
            if let Some(key) = tokens.first() {
                index.entry(*key).or_default().push(i);
            }
        }
        Self { lines, index }
    }

    /// Number of non-blank lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Tokens of the line at `idx`
    pub fn line(&self, idx: usize) -> Option<&[&'a str]> {
        self.lines.get(idx).map(Vec::as_slice)
    }

    /// Whether any line starts with `key`
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Indices of all lines starting with `key`, in file order
    pub fn positions(&self, key: &str) -> &[usize] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tokens of the first line starting with `key`
    pub fn first(&self, key: &str) -> Option<&[&'a str]> {
        self.positions(key)
            .first()
            .and_then(|&idx| self.line(idx))
    }

    /// Tokens of every line starting with `key`
    pub fn all<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s [&'a str]> + 's {
        self.positions(key)
            .iter()
            .filter_map(move |&idx| self.line(idx))
    }

    /// Tokens of the line right after every line starting with `key`
    ///
    /// A marker on the last line has no follower and is skipped.
    pub fn following<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s [&'a str]> + 's {
        self.positions(key)
            .iter()
            .filter_map(move |&idx| self.line(idx + 1))
    }

    /// Token `index` of the first line starting with `key`
    pub fn token(&self, key: &str, index: usize) -> Result<Option<&'a str>, FieldError> {
        match self.first(key) {
            None => Ok(None),
            Some(tokens) => tokens
                .get(index)
                .copied()
                .map(Some)
                .ok_or_else(|| FieldError::MissingToken {
                    key: key.to_string(),
                    index,
                }),
        }
    }

    /// Token `index` of the first line starting with `key`, parsed as `T`
    pub fn parse_token<T: FromStr>(&self, key: &str, index: usize) -> Result<Option<T>, FieldError> {
        match self.token(key, index)? {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| FieldError::InvalidValue {
                key: key.to_string(),
                index,
                value: value.to_string(),
            }),
        }
    }

    /// Token `index` of every line starting with `key`
    pub fn tokens_of_all(&self, key: &str, index: usize) -> Result<Vec<&'a str>, FieldError> {
        self.all(key)
            .map(|tokens| {
                tokens
                    .get(index)
                    .copied()
                    .ok_or_else(|| FieldError::MissingToken {
                        key: key.to_string(),
                        index,
                    })
            })
            .collect()
    }

    /// Splits the content into blocks, each starting at a line whose first
    /// token is `key` and running until the next such line or the end
    ///
    /// Lines before the first marker belong to no block.
    pub fn blocks(&self, key: &str) -> Vec<TokenizedLines<'a>> {
        let starts = self.positions(key);
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(self.lines.len());
                TokenizedLines::from_tokens(self.lines[start..end].to_vec())
            })
            .collect()
    }
}
