//! Mesh surface area from a 3MF model part
//!
//! The model XML is streamed with quick-xml; element names are matched on
//! their local part so `<mesh>`, `<m:mesh>` and any other prefix are treated
//! alike. Build item transforms are folded in as an isotropic approximation:
//! the mean of the absolute diagonal scale terms, squared. Shear and
//! non-uniform scale are not modelled.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::config::round_to;
use crate::error::{Error, Result};

/// Number of values in a 3MF affine transform (3×4, row-major)
const TRANSFORM_MATRIX_SIZE: usize = 12;

/// A mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    fn sub(&self, other: &Vertex) -> [f64; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }
}

/// Vertex indices of a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle {
    /// First vertex index
    pub v1: usize,
    /// Second vertex index
    pub v2: usize,
    /// Third vertex index
    pub v3: usize,
}

impl MeshTriangle {
    /// Area of the triangle over `vertices`
    ///
    /// `None` when an index is out of range.
    pub fn area(&self, vertices: &[Vertex]) -> Option<f64> {
        let a = vertices.get(self.v1)?;
        let b = vertices.get(self.v2)?;
        let c = vertices.get(self.v3)?;
        Some(triangle_area(a, b, c))
    }
}

/// Area of triangle `abc`: half the length of `(b - a) × (c - a)`
pub fn triangle_area(a: &Vertex, b: &Vertex, c: &Vertex) -> f64 {
    let [ax, ay, az] = b.sub(a);
    let [bx, by, bz] = c.sub(a);
    let cx = ay * bz - az * by;
    let cy = az * bx - ax * bz;
    let cz = ax * by - ay * bx;
    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}

/// Area scale implied by a build item transform
///
/// Returns `None` unless the attribute holds exactly twelve numbers.
pub fn transform_area_factor(transform: &str) -> Option<f64> {
    let values: Vec<f64> = transform
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if values.len() != TRANSFORM_MATRIX_SIZE {
        return None;
    }
    let mean = (values[0].abs() + values[4].abs() + values[8].abs()) / 3.0;
    Some(mean * mean)
}

/// Strip a namespace prefix from an element or attribute name
pub(crate) fn get_local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Look up an attribute by local name, resolving entity references
fn attribute(e: &BytesStart<'_>, local_name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        if get_local_name(key) == local_name {
            let raw = std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
            let value = unescape(raw).map_err(|e| Error::InvalidXml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Coordinate attribute; missing reads as 0, garbage as NaN
fn coordinate(e: &BytesStart<'_>, name: &str) -> Result<f64> {
    Ok(match attribute(e, name)? {
        Some(value) => value.trim().parse().unwrap_or(f64::NAN),
        None => 0.0,
    })
}

fn index(e: &BytesStart<'_>, name: &str) -> Result<Option<usize>> {
    Ok(attribute(e, name)?.and_then(|v| v.trim().parse().ok()))
}

/// Raw (unscaled) area and the transform factor read from the model
#[derive(Debug, Clone, Copy, PartialEq)]
struct MeshTotals {
    area: f64,
    scale: f64,
    triangles: usize,
}

fn accumulate(xml: &str) -> Result<MeshTotals> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut totals = MeshTotals {
        area: 0.0,
        scale: 1.0,
        triangles: 0,
    };
    let mut in_mesh = false;
    let mut vertices: Vec<Vertex> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?
                    .to_string();
                match get_local_name(&name) {
                    "mesh" => {
                        in_mesh = true;
                        vertices.clear();
                    }
                    "vertex" if in_mesh => {
                        vertices.push(Vertex {
                            x: coordinate(e, "x")?,
                            y: coordinate(e, "y")?,
                            z: coordinate(e, "z")?,
                        });
                    }
                    "triangle" if in_mesh => {
                        // a missing index skips the triangle rather than reading as vertex 0
                        if let (Some(v1), Some(v2), Some(v3)) =
                            (index(e, "v1")?, index(e, "v2")?, index(e, "v3")?)
                            && let Some(area) = (MeshTriangle { v1, v2, v3 }).area(&vertices)
                            && !area.is_nan()
                        {
                            totals.area += area;
                            totals.triangles += 1;
                        }
                    }
                    "item" => {
                        if let Some(factor) = attribute(e, "transform")?
                            .as_deref()
                            .and_then(transform_area_factor)
                        {
                            totals.scale = factor;
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?
                    .to_string();
                if get_local_name(&name) == "mesh" {
                    in_mesh = false;
                    vertices.clear();
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(totals)
}

/// Total surface area of every mesh in the model, in mm²
///
/// The raw area is multiplied by the factor of the last build item with a
/// valid transform and rounded to 2 decimals. `Ok(None)` when the model has
/// no measurable triangles.
pub fn surface_area(xml: &str) -> Result<Option<f64>> {
    let totals = accumulate(xml)?;
    tracing::debug!(
        triangles = totals.triangles,
        raw_area = totals.area,
        scale = totals.scale,
        "mesh surface area"
    );

    let area = round_to(totals.area * totals.scale, 2);
    Ok((area.is_finite() && area > 0.0).then_some(area))
}
