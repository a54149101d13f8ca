//! Trajectory point files: whitespace-separated `x y z` triples.

use std::{fmt::Write as _, fs, path::Path};

use crate::error::{AssetError, Result};

pub fn load_points(path: impl AsRef<Path>) -> Result<Vec<[f32; 3]>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AssetError::from_open(path, e))?;
    let points = parse_points(&text)?;
    log::info!("Loaded trajectory {:?} with {} points", path, points.len());
    Ok(points)
}

/// Parse a token stream of floats, three per point. Line breaks carry no
/// meaning; a trailing incomplete triple is an error.
pub fn parse_points(text: &str) -> Result<Vec<[f32; 3]>> {
    let mut values = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        for token in line.split_whitespace() {
            let v = token.parse::<f32>().map_err(|_| {
                AssetError::malformed(line_no + 1, format!("invalid coordinate '{token}'"))
            })?;
            values.push(v);
        }
    }

    if values.len() % 3 != 0 {
        return Err(AssetError::malformed(
            text.lines().count().max(1),
            format!("{} coordinates do not form whole points", values.len()),
        ));
    }

    Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

pub fn format_points(points: &[[f32; 3]]) -> String {
    let mut out = String::with_capacity(points.len() * 16);
    for [x, y, z] in points {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{x} {y} {z}");
    }
    out
}

pub fn save_points(path: impl AsRef<Path>, points: &[[f32; 3]]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format_points(points)).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved trajectory {:?} ({} points)", path, points.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_line_layout() {
        let pts = parse_points("0 0 -5\n4 0\n-5\n\n  -4.5 4 -5  ").unwrap();
        assert_eq!(pts, vec![[0.0, 0.0, -5.0], [4.0, 0.0, -5.0], [-4.5, 4.0, -5.0]]);
        assert!(parse_points("").unwrap().is_empty());
    }

    #[test]
    fn partial_point_is_an_error() {
        assert!(matches!(
            parse_points("1 2 3\n4 5\n"),
            Err(AssetError::MalformedLine { .. })
        ));
        assert!(matches!(
            parse_points("1 2 x\n"),
            Err(AssetError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajetoria1.txt");
        let pts = vec![[0.0, 0.5, -5.0], [4.25, 4.0, -1.0]];
        save_points(&path, &pts).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0 0.5 -5\n4.25 4 -1\n"
        );
        assert_eq!(load_points(&path).unwrap(), pts);
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            load_points("/nope/trajectory.txt"),
            Err(AssetError::FileNotFound { .. })
        ));
    }
}
