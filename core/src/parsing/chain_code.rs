use crate::error::{DdsmError, Result};
use crate::types::{Contour, Point};

/// Token closing every chain code line in an overlay file
pub const CHAIN_TERMINATOR: &str = "#";

/// 8-connected step for each direction code, clockwise from "up"
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Returns the step for a direction code
///
/// # Errors
///
/// Returns [`DdsmError::InvalidChainCode`] for codes outside 0-7.
pub fn direction_delta(code: i64, position: usize) -> Result<(i32, i32)> {
    usize::try_from(code)
        .ok()
        .and_then(|idx| DIRECTIONS.get(idx))
        .copied()
        .ok_or(DdsmError::InvalidChainCode { position, code })
}

/// Walks a chain code from its origin
///
/// `chain` holds the starting `x`, `y` followed by direction codes. The
/// resulting contour holds one point per direction code, each being the
/// previous position plus the step; the origin itself is not emitted.
///
/// Positions reported in errors index into `chain`. A walk that steps
/// outside the `i32` coordinate range is a [`DdsmError::MalformedOverlay`].
///
/// # Example
///
/// ```
/// use ddsm_core::parsing::decode_chain_code;
/// use ddsm_core::Point;
///
/// let contour = decode_chain_code(&[10, 20, 2, 4]).unwrap();
/// assert_eq!(contour.points(), &[Point::new(11, 20), Point::new(11, 21)]);
/// ```
pub fn decode_chain_code(chain: &[i64]) -> Result<Contour> {
    let (origin, codes) = match chain {
        [x, y, codes @ ..] => (to_point(*x, *y)?, codes),
        _ => {
            return Err(DdsmError::MalformedOverlay {
                name: String::new(),
                detail: format!("chain code needs an origin, got {} values", chain.len()),
            })
        }
    };

    let mut current = origin;
    let mut points = Vec::with_capacity(codes.len());
    for (i, &code) in codes.iter().enumerate() {
        let position = i + 2;
        current = current
            .step(direction_delta(code, position)?)
            .ok_or_else(|| DdsmError::MalformedOverlay {
                name: String::new(),
                detail: format!(
                    "chain code leaves the coordinate range at position {}",
                    position
                ),
            })?;
        points.push(current);
    }
    Ok(Contour::new(points))
}

/// Parses a chain code line into integers
///
/// The trailing terminator token is required and stripped.
pub fn parse_chain_line(tokens: &[&str]) -> std::result::Result<Vec<i64>, String> {
    let (last, body) = tokens
        .split_last()
        .ok_or_else(|| "empty chain code line".to_string())?;
    if *last != CHAIN_TERMINATOR {
        return Err(format!(
            "chain code line does not end with '{}'",
            CHAIN_TERMINATOR
        ));
    }
    body.iter()
        .map(|t| {
            t.parse::<i64>()
                .map_err(|_| format!("non-integer chain code token '{}'", t))
        })
        .collect()
}

fn to_point(x: i64, y: i64) -> Result<Point> {
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => Ok(Point::new(x, y)),
        _ => Err(DdsmError::MalformedOverlay {
            name: String::new(),
            detail: format!("chain code origin ({}, {}) out of range", x, y),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_codes_give_empty_contour() {
        let contour = decode_chain_code(&[10, 20]).unwrap();
        assert!(contour.is_empty());
    }

    #[test]
    fn test_first_point_is_one_step_from_origin() {
        let contour = decode_chain_code(&[10, 20, 2, 5, 5]).unwrap();
        assert_eq!(
            contour.points(),
            &[Point::new(11, 20), Point::new(10, 21), Point::new(9, 22)]
        );
    }

    #[test]
    fn test_walk_through_all_directions() {
        let contour = decode_chain_code(&[100, 100, 0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(
            contour.points(),
            &[
                Point::new(100, 99),
                Point::new(101, 98),
                Point::new(102, 98),
                Point::new(103, 99),
                Point::new(103, 100),
                Point::new(102, 101),
                Point::new(101, 101),
                Point::new(100, 100),
            ]
        );
    }

    #[rstest]
    #[case(0, (0, -1))]
    #[case(1, (1, -1))]
    #[case(2, (1, 0))]
    #[case(3, (1, 1))]
    #[case(4, (0, 1))]
    #[case(5, (-1, 1))]
    #[case(6, (-1, 0))]
    #[case(7, (-1, -1))]
    fn test_direction_delta(#[case] code: i64, #[case] expected: (i32, i32)) {
        assert_eq!(direction_delta(code, 0).unwrap(), expected);
    }

    #[rstest]
    #[case(8)]
    #[case(-1)]
    #[case(42)]
    fn test_invalid_direction(#[case] code: i64) {
        let err = decode_chain_code(&[0, 0, 2, code]).unwrap_err();
        assert!(matches!(
            err,
            DdsmError::InvalidChainCode { position: 3, code: c } if c == code
        ));
    }

    #[rstest]
    #[case(&[i64::from(i32::MAX), 0, 2], "position 2")]
    #[case(&[0, i64::from(i32::MIN), 4, 0], "position 3")]
    fn test_walk_out_of_range(#[case] chain: &[i64], #[case] position: &str) {
        let err = decode_chain_code(chain).unwrap_err();
        assert!(matches!(
            err,
            DdsmError::MalformedOverlay { ref detail, .. } if detail.contains(position)
        ));
    }

    #[test]
    fn test_missing_origin() {
        assert!(decode_chain_code(&[5]).is_err());
        assert!(decode_chain_code(&[]).is_err());
    }

    #[test]
    fn test_parse_chain_line() {
        assert_eq!(
            parse_chain_line(&["10", "20", "2", "4", "#"]).unwrap(),
            vec![10, 20, 2, 4]
        );
        assert!(parse_chain_line(&["10", "20", "2", "4"]).is_err());
        assert!(parse_chain_line(&["10", "x", "2", "#"]).is_err());
        assert!(parse_chain_line(&[]).is_err());
    }
}
