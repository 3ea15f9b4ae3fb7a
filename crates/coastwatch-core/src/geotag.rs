//! EXIF geotag extraction.
//!
//! Runs independently of classification on the same asset. Every field in
//! the geotag block is treated as optional: absence, a malformed block, or
//! any decode error all produce `GeoCoordinate::absent()`. Nothing in this
//! module returns an error to the caller.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use exif::{Exif, In, Reader, Tag, Value};

use crate::types::{GeoCoordinate, ImageSource};

/// Extract an embedded geotag as signed decimal coordinates.
///
/// Latitude is negated for a southern hemisphere reference, longitude for
/// a western one. Callers treat `present: false` as "no override
/// available", not as an error.
pub fn extract_geo(source: &ImageSource) -> GeoCoordinate {
    let exif = match read_exif(source) {
        Some(exif) => exif,
        None => return GeoCoordinate::absent(),
    };

    let latitude = coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let longitude = coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);

    match (latitude, longitude) {
        (Some(lat), Some(lon)) => GeoCoordinate::at(lat, lon),
        _ => GeoCoordinate::absent(),
    }
}

fn read_exif(source: &ImageSource) -> Option<Exif> {
    match source {
        ImageSource::Bytes(bytes) => {
            let mut cursor = Cursor::new(bytes.as_slice());
            Reader::new().read_from_container(&mut cursor).ok()
        }
        ImageSource::Path(path) => read_exif_from_path(path),
    }
}

fn read_exif_from_path(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    Reader::new().read_from_container(&mut reader).ok()
}

/// Read one axis of the geotag, converting DMS to signed decimal degrees.
fn coordinate(exif: &Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord = exif.get_field(coord_tag, In::PRIMARY)?;
    let reference = exif.get_field(ref_tag, In::PRIMARY)?;

    let degrees = dms_to_decimal(&coord.value)?;
    let ref_str = reference.display_value().to_string();

    // South and west hemispheres carry negative sign
    let sign = if ref_str.contains('S') || ref_str.contains('W') {
        -1.0
    } else {
        1.0
    };

    Some(sign * degrees)
}

/// Convert EXIF GPS rationals (degrees, minutes, seconds) to decimal degrees.
fn dms_to_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(rationals) if rationals.len() >= 3 => {
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            Some(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}
