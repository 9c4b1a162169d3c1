use crate::error::{Error, Result};
use nalgebra as na;
use std::io::{BufRead, Write};

/// Ordered landmark positions in image coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub points: Vec<na::Point2<f64>>,
}

impl Shape {
    #[inline]
    pub fn new(points: Vec<na::Point2<f64>>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &na::Point2<f64>> {
        self.points.iter()
    }

    /// Axis-aligned bounds as `(min, max)` corners.
    pub fn bounds(&self) -> Option<(na::Point2<f64>, na::Point2<f64>)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some((min, max))
    }
}

impl FromIterator<na::Point2<f64>> for Shape {
    fn from_iter<I: IntoIterator<Item = na::Point2<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Writes `shape` in the IBUG `.pts` layout.
pub fn write_pts<W: Write>(mut out: W, shape: &Shape) -> Result<()> {
    writeln!(out, "version: 1")?;
    writeln!(out, "n_points: {}", shape.len())?;
    writeln!(out, "{{")?;
    for p in shape.iter() {
        writeln!(out, "{} {}", p.x, p.y)?;
    }
    writeln!(out, "}}")?;
    out.flush()?;

    Ok(())
}

pub fn read_pts<R: BufRead>(input: R) -> Result<Shape> {
    let mut n_points = None;
    let mut in_body = false;
    let mut points = Vec::new();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if in_body {
            if line == "}" {
                let expected = n_points.unwrap_or(points.len());
                if expected != points.len() {
                    return Err(Error::resource(format!(
                        "pts file declares {} points but contains {}",
                        expected,
                        points.len()
                    )));
                }

                return Ok(Shape::new(points));
            }

            let mut it = line.split_whitespace();
            let x = it.next().and_then(|v| v.parse::<f64>().ok());
            let y = it.next().and_then(|v| v.parse::<f64>().ok());

            match (x, y) {
                (Some(x), Some(y)) => points.push(na::Point2::new(x, y)),
                _ => {
                    return Err(Error::resource(format!(
                        "malformed pts coordinate line '{}'",
                        line
                    )))
                }
            }
        } else if let Some(value) = line.strip_prefix("n_points:") {
            n_points = Some(value.trim().parse::<usize>().map_err(|_| {
                Error::resource(format!("malformed pts point count '{}'", value.trim()))
            })?);
        } else if line == "{" {
            in_body = true;
        }
    }

    Err(Error::resource("pts file ended before the closing brace"))
}
