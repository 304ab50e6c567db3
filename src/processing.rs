use crate::error::{Error, Result};
use crate::types::{GeoRecord, GeoTable};
use geo::{BooleanOps, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point};

/// Records whose `column` holds exactly `name`. Matching is case-sensitive
/// and untrimmed; non-text values never match.
pub fn select_by_name<'a>(table: &'a GeoTable, name: &str, column: &str) -> Result<Vec<&'a GeoRecord>> {
    let selected = table.filter(|record| {
        record
            .get(column)
            .and_then(|value| value.as_text())
            .is_some_and(|value| value == name)
    });

    if selected.is_empty() {
        return Err(Error::NameNotFound {
            name: name.to_string(),
            column: column.to_string(),
        });
    }
    Ok(selected)
}

#[derive(Default)]
struct Parts {
    polygons: Vec<MultiPolygon<f64>>,
    lines: Vec<LineString<f64>>,
    points: Vec<Point<f64>>,
}

impl Parts {
    fn push(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.points.push(*p),
            Geometry::MultiPoint(mp) => self.points.extend(mp.iter().copied()),
            Geometry::Line(l) => self.lines.push(LineString::from(vec![l.start, l.end])),
            Geometry::LineString(ls) => self.lines.push(ls.clone()),
            Geometry::MultiLineString(mls) => self.lines.extend(mls.iter().cloned()),
            Geometry::Polygon(p) => self.polygons.push(MultiPolygon::new(vec![p.clone()])),
            Geometry::MultiPolygon(mp) => self.polygons.push(mp.clone()),
            Geometry::Rect(r) => self.polygons.push(MultiPolygon::new(vec![r.to_polygon()])),
            Geometry::Triangle(t) => self.polygons.push(MultiPolygon::new(vec![t.to_polygon()])),
            Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| self.push(g)),
        }
    }
}

/// Merges geometries into one shape. Polygonal input is unioned; lines and
/// points are collected. Mixed kinds come back as a collection, one member
/// per kind. Returns `None` when nothing was given.
pub fn dissolve<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>) -> Option<Geometry<f64>> {
    let mut parts = Parts::default();
    for geometry in geometries {
        parts.push(geometry);
    }

    let mut merged: Vec<Geometry<f64>> = Vec::new();
    if !parts.polygons.is_empty() {
        let union = parts
            .polygons
            .iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, mp| acc.union(mp));
        merged.push(Geometry::MultiPolygon(union));
    }
    if !parts.lines.is_empty() {
        merged.push(Geometry::MultiLineString(MultiLineString::new(parts.lines)));
    }
    if !parts.points.is_empty() {
        merged.push(Geometry::MultiPoint(MultiPoint::new(parts.points)));
    }

    match merged.len() {
        0 => None,
        1 => merged.pop(),
        _ => Some(Geometry::GeometryCollection(GeometryCollection::new_from(merged))),
    }
}

/// Selects `name` in `column` and merges the matches into a single geometry.
/// Also returns how many records were merged.
pub fn dissolve_by_name(table: &GeoTable, name: &str, column: &str) -> Result<(Option<Geometry<f64>>, usize)> {
    let selected = select_by_name(table, name, column)?;
    let merged = dissolve(selected.iter().filter_map(|r| r.geometry.as_ref()));
    Ok((merged, selected.len()))
}
