//! MTL material reader.
//!
//! Only a single material is supported: for each of `map_Kd`, `Ka`, `Kd`,
//! `Ks` and `Ns` the first occurrence in the file wins.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::{AssetError, Result};

/// Phong surface coefficients plus an optional diffuse texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub ka: [f32; 3],
    pub kd: [f32; 3],
    pub ks: [f32; 3],
    pub shininess: f32,
    /// `map_Kd`, already joined onto the MTL file's directory.
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ka: [0.2, 0.2, 0.2],
            kd: [0.8, 0.8, 0.8],
            ks: [1.0, 1.0, 1.0],
            shininess: 32.0,
            diffuse_texture: None,
        }
    }
}

/// Load a material from an `.mtl` file; `map_Kd` is resolved relative to it.
pub fn load_mtl_from_path(path: impl AsRef<Path>) -> Result<Material> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::from_open(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let material = parse_mtl(BufReader::new(file), base).map_err(|e| match e {
        AssetError::Io { source, .. } => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    log::debug!("Material from {:?}: {:?}", path, material);
    Ok(material)
}

/// Parse MTL text; `base_dir` is where `map_Kd` paths are resolved from.
pub fn load_mtl_from_str(contents: &str, base_dir: impl AsRef<Path>) -> Result<Material> {
    parse_mtl(io::Cursor::new(contents), base_dir.as_ref())
}

#[derive(Default)]
struct Seen {
    ka: bool,
    kd: bool,
    ks: bool,
    ns: bool,
    map_kd: bool,
}

fn parse_mtl<R: BufRead>(reader: R, base_dir: &Path) -> Result<Material> {
    let mut material = Material::default();
    let mut seen = Seen::default();
    let mut materials = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| AssetError::Io {
            path: PathBuf::new(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((tag, rest)) => (tag, rest.trim()),
            None => (trimmed, ""),
        };

        match tag {
            "newmtl" => materials += 1,
            "Ka" if !seen.ka => {
                material.ka = parse_rgb(rest, line_no, "Ka")?;
                seen.ka = true;
            }
            "Kd" if !seen.kd => {
                material.kd = parse_rgb(rest, line_no, "Kd")?;
                seen.kd = true;
            }
            "Ks" if !seen.ks => {
                material.ks = parse_rgb(rest, line_no, "Ks")?;
                seen.ks = true;
            }
            "Ns" if !seen.ns => {
                material.shininess = parse_scalar(rest, line_no, "Ns")?;
                seen.ns = true;
            }
            "map_Kd" if !seen.map_kd => {
                let name = texture_file_name(rest);
                if name.is_empty() {
                    return Err(AssetError::malformed(line_no, "map_Kd without a file name"));
                }
                material.diffuse_texture = Some(base_dir.join(name));
                seen.map_kd = true;
            }
            _ => {}
        }
    }

    if materials > 1 {
        log::debug!(
            "MTL defines {} materials; only the first occurrence of each property is used",
            materials
        );
    }

    Ok(material)
}

/// Drop leading `-option value...` pairs from a texture statement and keep the
/// rest, which may contain spaces, as the file name.
fn texture_file_name(rest: &str) -> String {
    let mut tokens = rest.split_whitespace().peekable();
    while let Some(opt) = tokens.peek().and_then(|t| t.strip_prefix('-')) {
        // Numeric options take up to three values; the rest take exactly one.
        let (min, max) = match opt {
            "s" | "o" | "t" => (1, 3),
            "mm" => (2, 2),
            _ => (1, 1),
        };
        tokens.next();
        for i in 0..max {
            let numeric = tokens.peek().is_some_and(|t| t.parse::<f32>().is_ok());
            if i >= min && !numeric {
                break;
            }
            tokens.next();
        }
    }
    tokens.collect::<Vec<_>>().join(" ")
}

fn parse_rgb(rest: &str, line_no: usize, what: &str) -> Result<[f32; 3]> {
    let mut parts = rest.split_whitespace();
    let mut out = [0.0f32; 3];
    for channel in out.iter_mut() {
        *channel = parse_scalar(parts.next().unwrap_or_default(), line_no, what)?;
    }
    Ok(out)
}

fn parse_scalar(token: &str, line_no: usize, what: &str) -> Result<f32> {
    let token = token.split_whitespace().next().unwrap_or_default();
    if token.is_empty() {
        return Err(AssetError::malformed(line_no, format!("missing value for {what}")));
    }
    token
        .parse::<f32>()
        .map_err(|_| AssetError::malformed(line_no, format!("invalid {what} value '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_properties_absent() {
        let m = load_mtl_from_str("newmtl Empty\n", "assets").unwrap();
        assert_eq!(m, Material::default());
        assert_eq!(m.ka, [0.2, 0.2, 0.2]);
        assert_eq!(m.kd, [0.8, 0.8, 0.8]);
        assert_eq!(m.ks, [1.0, 1.0, 1.0]);
        assert_eq!(m.shininess, 32.0);
    }

    #[test]
    fn reads_coefficients_and_texture() {
        let src = "newmtl Moon\nNs 96.0\nKa 0.1 0.1 0.1\nKd 0.6 0.5 0.4\nKs 0.3 0.3 0.3\nmap_Kd moon.png\n";
        let m = load_mtl_from_str(src, Path::new("models/moon")).unwrap();
        assert_eq!(m.shininess, 96.0);
        assert_eq!(m.ka, [0.1, 0.1, 0.1]);
        assert_eq!(m.kd, [0.6, 0.5, 0.4]);
        assert_eq!(m.ks, [0.3, 0.3, 0.3]);
        assert_eq!(
            m.diffuse_texture.as_deref(),
            Some(Path::new("models/moon/moon.png"))
        );
    }

    #[test]
    fn first_occurrence_wins() {
        let src = "newmtl A\nKd 1 0 0\nmap_Kd a.png\nnewmtl B\nKd 0 1 0\nmap_Kd b.png\n";
        let m = load_mtl_from_str(src, "").unwrap();
        assert_eq!(m.kd, [1.0, 0.0, 0.0]);
        assert_eq!(m.diffuse_texture.as_deref(), Some(Path::new("a.png")));
    }

    #[test]
    fn map_kd_options_are_skipped() {
        let m = load_mtl_from_str("map_Kd -s 2 2 1 tex/body.jpg\n", "dir").unwrap();
        assert_eq!(m.diffuse_texture.as_deref(), Some(Path::new("dir/tex/body.jpg")));
    }

    #[test]
    fn map_kd_keeps_spaces_in_file_name() {
        let m = load_mtl_from_str("map_Kd Flamingo Body.png\n", "dir").unwrap();
        assert_eq!(m.diffuse_texture.as_deref(), Some(Path::new("dir/Flamingo Body.png")));

        let m = load_mtl_from_str("map_Kd -clamp on -o 0.5 eye map.png\n", "").unwrap();
        assert_eq!(m.diffuse_texture.as_deref(), Some(Path::new("eye map.png")));

        let err = load_mtl_from_str("map_Kd -s 1 1 1\n", "").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = load_mtl_from_str("Kd 1 0\n", "").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 1, .. }));
        let err = load_mtl_from_str("# c\nNs shiny\n", "").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn texture_resolves_next_to_mtl_file() {
        let dir = tempfile::tempdir().unwrap();
        let mtl = dir.path().join("mars.mtl");
        std::fs::write(&mtl, "map_Kd mars.jpg\n").unwrap();
        let m = load_mtl_from_path(&mtl).unwrap();
        assert_eq!(m.diffuse_texture, Some(dir.path().join("mars.jpg")));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_mtl_from_path("/nope/missing.mtl").unwrap_err();
        assert!(matches!(err, AssetError::FileNotFound { .. }));
    }
}
