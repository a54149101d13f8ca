//! Minimal OBJ parser supporting positions, normals and texture coordinates.
//!
//! Faces are fan-triangulated and expanded into a flat triangle list; there
//! is no vertex deduplication, so the vertex count equals the number of
//! corners after triangulation.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, IndexKind, Result};
use crate::mesh::{MeshData, MeshVertex};

/// Normal used for corners that carry no `vn` reference.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// What to emit for a corner without a normal index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MissingNormals {
    /// Use the given vector as-is.
    Fixed([f32; 3]),
    /// Use the normalised object-space position. Good enough for
    /// origin-centred, roughly spherical meshes.
    Radial,
}

impl Default for MissingNormals {
    fn default() -> Self {
        MissingNormals::Fixed(DEFAULT_NORMAL)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjOptions {
    /// Store `1 - v` for every texture coordinate.
    pub flip_v: bool,
    pub missing_normals: MissingNormals,
}

/// One vertex reference inside a face, 0-based and already bounds-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceCorner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>, options: &ObjOptions) -> Result<MeshData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::from_open(path, e))?;
    log::info!("Loading OBJ from {:?}", path);
    let mesh = parse_obj(BufReader::new(file), options).map_err(|e| match e {
        AssetError::Io { source, .. } => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    log::info!(
        "Loaded {:?}: {} triangles, {} vertices",
        path,
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R, options: &ObjOptions) -> Result<MeshData> {
    parse_obj(reader, options)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str, options: &ObjOptions) -> Result<MeshData> {
    load_obj_from_reader(io::Cursor::new(contents), options)
}

/// Split an N-gon into `N - 2` triangles sharing the first corner.
/// Yields nothing for fewer than three corners.
pub fn fan_triangulate<T: Copy>(corners: &[T]) -> impl Iterator<Item = [T; 3]> + '_ {
    (1..corners.len().saturating_sub(1)).map(move |i| [corners[0], corners[i], corners[i + 1]])
}

#[derive(Default)]
struct Tables {
    positions: Vec<[f32; 3]>,
    colors: Vec<Option<[f32; 3]>>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

impl Tables {
    fn resolve(&self, corner: FaceCorner, options: &ObjOptions) -> MeshVertex {
        // Indices were checked against the table lengths when the corner was parsed.
        let position = self.positions[corner.position];
        let uv = corner.texcoord.map_or([0.0, 0.0], |i| self.texcoords[i]);
        let normal = match corner.normal {
            Some(i) => self.normals[i],
            None => missing_normal(position, options.missing_normals),
        };
        MeshVertex::new(position, normal, uv).with_color(self.colors[corner.position])
    }
}

fn missing_normal(position: [f32; 3], policy: MissingNormals) -> [f32; 3] {
    match policy {
        MissingNormals::Fixed(n) => n,
        MissingNormals::Radial => {
            let [x, y, z] = position;
            let len = (x * x + y * y + z * z).sqrt();
            if len <= f32::EPSILON {
                DEFAULT_NORMAL
            } else {
                [x / len, y / len, z / len]
            }
        }
    }
}

fn parse_obj<R: BufRead>(reader: R, options: &ObjOptions) -> Result<MeshData> {
    let mut tables = Tables::default();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut material_lib: Option<String> = None;
    let mut corners: Vec<FaceCorner> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| AssetError::Io {
            path: Default::default(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                // `v x y z r g b` carries a colour; `v x y z w` is a weight we drop.
                let extra = parts
                    .map(|t| parse_f32(Some(t), line_no, "vertex field"))
                    .collect::<Result<Vec<f32>>>()?;
                let color = match extra.as_slice() {
                    [] | [_] => None,
                    &[r, g, b] => Some([r, g, b]),
                    other => {
                        return Err(AssetError::malformed(
                            line_no,
                            format!("expected w or r g b after x y z, found {} values", other.len()),
                        ));
                    }
                };
                tables.positions.push([x, y, z]);
                tables.colors.push(color);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                let v = if options.flip_v { 1.0 - v } else { v };
                tables.texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                tables.normals.push([nx, ny, nz]);
            }
            "f" => {
                corners.clear();
                for part in parts {
                    corners.push(parse_face_corner(part, &tables, line_no)?);
                }
                if corners.len() < 3 {
                    return Err(AssetError::malformed(
                        line_no,
                        format!("face needs at least 3 corners, found {}", corners.len()),
                    ));
                }
                for tri in fan_triangulate(&corners) {
                    vertices.extend(tri.iter().map(|&c| tables.resolve(c, options)));
                }
            }
            "mtllib" => {
                if material_lib.is_none() {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    if name.is_empty() {
                        return Err(AssetError::malformed(line_no, "mtllib without a file name"));
                    }
                    material_lib = Some(name);
                }
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/etc.)
            }
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::Empty);
    }

    let mut mesh = MeshData::new(vertices);
    mesh.material_lib = material_lib;
    Ok(mesh)
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32> {
    let token = value.ok_or_else(|| AssetError::malformed(line_no, format!("missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|_| AssetError::malformed(line_no, format!("invalid {what} '{token}'")))
}

fn parse_face_corner(token: &str, tables: &Tables, line_no: usize) -> Result<FaceCorner> {
    let mut split = token.split('/');
    let pos = split.next().unwrap_or_default();
    if pos.is_empty() {
        return Err(AssetError::malformed(
            line_no,
            format!("face element '{token}' has no position index"),
        ));
    }
    let position = resolve_index(pos, tables.positions.len(), IndexKind::Position, line_no)?;

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(
            value,
            tables.texcoords.len(),
            IndexKind::TexCoord,
            line_no,
        )?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(
            value,
            tables.normals.len(),
            IndexKind::Normal,
            line_no,
        )?),
        _ => None,
    };

    if split.next().is_some() {
        return Err(AssetError::malformed(
            line_no,
            format!("face element '{token}' has more than three indices"),
        ));
    }

    Ok(FaceCorner {
        position,
        texcoord,
        normal,
    })
}

/// Resolve a 1-based (or negative, end-relative) OBJ index against a table
/// of `len` entries declared so far.
fn resolve_index(token: &str, len: usize, kind: IndexKind, line_no: usize) -> Result<usize> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| AssetError::malformed(line_no, format!("invalid {kind} index '{token}'")))?;

    let out_of_range = || AssetError::IndexOutOfRange {
        line: line_no,
        kind,
        index: raw,
        len,
    };

    let idx = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        len as i64 + raw
    } else {
        return Err(out_of_range());
    };

    if idx < 0 || idx as usize >= len {
        return Err(out_of_range());
    }

    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(src: &str) -> Result<MeshData> {
        load_obj_from_str(src, &ObjOptions::default())
    }

    fn positions(mesh: &MeshData) -> Vec<[f32; 3]> {
        mesh.vertices.iter().map(|v| v.position).collect()
    }

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = parse(src).expect("parse triangle");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices[1].uv, [1.0, 0.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn positions_only_keep_file_order() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(
            positions(&mesh),
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
        for v in &mesh.vertices {
            assert_eq!(v.uv, [0.0, 0.0]);
            assert_eq!(v.normal, DEFAULT_NORMAL);
        }
    }

    #[test]
    fn repeated_index_gives_degenerate_triangle() {
        let mesh = parse("v 1 2 3\nf 1 1 1\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.vertices.iter().all(|v| v.position == [1.0, 2.0, 3.0]));
    }

    #[test]
    fn omitted_texcoord_falls_back_to_zero() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nvn 1 0 0\nvn 0 0 -1\nf 1//1 2//2 3//3\n";
        let mesh = parse(src).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn quad_is_fanned_from_first_corner() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse(src).unwrap();
        assert_eq!(
            positions(&mesh),
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
        );
    }

    #[test]
    fn negative_indices_are_relative_to_current_table() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\nv 5 5 5\nf -1 -2 -3\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[3].position, [5.0, 5.0, 5.0]);
        assert_eq!(mesh.vertices[5].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn index_zero_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange {
                line: 4,
                kind: IndexKind::Position,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn forward_reference_is_out_of_range() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange { index: 3, len: 2, .. }
        ));

        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/4 2/1 3/1\n").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange {
                kind: IndexKind::TexCoord,
                len: 0,
                ..
            }
        ));
    }

    #[test]
    fn normal_and_negative_texcoord_out_of_range() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//5 2//1 3//1\n").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange {
                line: 5,
                kind: IndexKind::Normal,
                index: 5,
                len: 1,
            }
        ));

        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/-2 2/1 3/1\n").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange {
                kind: IndexKind::TexCoord,
                index: -2,
                len: 1,
                ..
            }
        ));
    }

    #[test]
    fn trailing_vertex_fields_are_checked() {
        let tri = "v 1 0 0\nv 0 1 0\nf 1 2 3\n";
        for bad in ["v 0 0 0 abc\n", "v 0 0 0 1 zz\n", "v 0 0 0 1 0\n", "v 0 0 0 1 0 0 1\n"] {
            let err = parse(&format!("{bad}{tri}")).unwrap_err();
            assert!(
                matches!(err, AssetError::MalformedLine { line: 1, .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn malformed_number_reports_line() {
        let err = parse("v 0 0 0\nv 1 oops 0\n").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 2, .. }));

        let err = parse("v 0 0\n").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn short_face_is_malformed() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, AssetError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn no_faces_is_empty() {
        assert!(matches!(parse("v 0 0 0\n"), Err(AssetError::Empty)));
    }

    #[test]
    fn comments_unknown_tags_and_mtllib() {
        let src = "# cube\nmtllib cube.mtl\no Cube\ng side\ns off\nusemtl Mat\n\
                   v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nmtllib other.mtl\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.material_lib.as_deref(), Some("cube.mtl"));
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn vertex_colors_and_weights() {
        let src = "v 0 0 0 1 0 0\nv 1 0 0 1.0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.vertices[0].color, Some([1.0, 0.0, 0.0]));
        assert_eq!(mesh.vertices[1].color, None);
        assert_eq!(mesh.vertices[2].color, None);
    }

    #[test]
    fn flip_v_and_radial_normals() {
        let options = ObjOptions {
            flip_v: true,
            missing_normals: MissingNormals::Radial,
        };
        let src = "v 0 0 0\nv 2 0 0\nv 0 3 0\nvt 0.25 0.25\nf 1/1 2/1 3/1\n";
        let mesh = load_obj_from_str(src, &options).unwrap();
        assert_eq!(mesh.vertices[0].uv, [0.25, 0.75]);
        assert_eq!(mesh.vertices[0].normal, DEFAULT_NORMAL);
        assert_eq!(mesh.vertices[1].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_obj_from_path("/definitely/not/here.obj", &ObjOptions::default())
            .unwrap_err();
        assert!(matches!(err, AssetError::FileNotFound { .. }));
    }

    proptest! {
        #[test]
        fn fan_shares_first_corner(n in 3usize..32) {
            let corners: Vec<usize> = (0..n).collect();
            let tris: Vec<[usize; 3]> = fan_triangulate(&corners).collect();
            prop_assert_eq!(tris.len(), n - 2);
            for (i, tri) in tris.iter().enumerate() {
                prop_assert_eq!(*tri, [0, i + 1, i + 2]);
            }
        }

        #[test]
        fn triangle_faces_give_three_vertices_each(faces in 1usize..40) {
            let mut src = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
            for _ in 0..faces {
                src.push_str("f 1 2 3\n");
            }
            let mesh = parse(&src).unwrap();
            prop_assert_eq!(mesh.vertex_count(), 3 * faces);
        }
    }
}
