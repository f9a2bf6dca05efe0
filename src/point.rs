//! Geographic point handling.
//!
//! Points travel through CSV files and the admin API in their well-known text
//! form, `POINT(<lon> <lat>)`. This module parses that form and renders it back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed point text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointFormatError {
    #[error("Invalid POINT format: expected 2 coordinates, found {0}")]
    WrongTokenCount(usize),

    #[error("Invalid POINT format: '{0}' is not a number")]
    NotANumber(String),
}

/// A 2-D coordinate pair: `x` is the longitude, `y` the latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }
}

/// Parse `POINT(x y)` into a [`Point`].
///
/// The `POINT(` prefix and `)` suffix are removed wherever they occur, the rest is
/// split on whitespace and must yield exactly two floats. A bare `x y` pair is
/// therefore accepted as well.
pub fn parse_point(text: &str) -> Result<Point, PointFormatError> {
    let stripped = text.replace("POINT(", "").replace(')', "");
    let tokens: Vec<&str> = stripped.split_whitespace().collect();

    if tokens.len() != 2 {
        return Err(PointFormatError::WrongTokenCount(tokens.len()));
    }

    let x = parse_coordinate(tokens[0])?;
    let y = parse_coordinate(tokens[1])?;

    Ok(Point { x, y })
}

fn parse_coordinate(token: &str) -> Result<f64, PointFormatError> {
    token
        .parse::<f64>()
        .map_err(|_| PointFormatError::NotANumber(token.to_string()))
}

impl FromStr for Point {
    type Err = PointFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_point(s)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x, self.y)
    }
}
