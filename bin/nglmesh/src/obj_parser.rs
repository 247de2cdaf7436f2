use std::io::BufReader;

use ngl_mesh::cache::MeshParser;
use ngl_mesh::descriptor::{Component, ElementDescriptor};
use ngl_mesh::mesh::{Material, ParsedMesh, Surface};
use obj::raw::{RawObj, parse_obj};
use obj::{Obj, Position, TexturedVertex, Vertex};

use crate::prelude::*;

/// Builds meshes from Wavefront OBJ files.
///
/// The whole file becomes one material and one surface. Vertices carry
/// whichever of positions, normals and texture coordinates the file has.
pub struct ObjParser;

impl MeshParser for ObjParser {
    type Error = anyhow::Error;

    fn parse(&self, path: &Path) -> AnyResult<ParsedMesh> {
        let infile = std::fs::File::open(path)
            .context("Cannot open input OBJ file")?;
        let rawobj = parse_obj(BufReader::new(infile))
            .context("Cannot parse OBJ file")?;
        let name = rawobj.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let mut mesh = try_ptn(rawobj.clone())
            .or_else(|_| try_pn(rawobj.clone()))
            .or_else(|_| try_p(rawobj))
            .context("OBJ file is not in any valid vertex format, or has more than 65536 vertices")?;
        mesh.stride = mesh.layout_stride();
        mesh.materials.push(Material {
            id: 0,
            name,
            ..Default::default()
        });
        mesh.surfaces.push(Surface {
            id: 0,
            start: 0,
            length: mesh.indices.len() as u32,
        });
        mesh.validate().context("OBJ file produced an inconsistent mesh")?;
        Ok(mesh)
    }
}

fn try_ptn(rawobj: RawObj) -> AnyResult<ParsedMesh> {
    let obj: Obj<TexturedVertex, u16> = Obj::new(rawobj)?;
    let mut mesh = ParsedMesh {
        elements: vec![
            ElementDescriptor::new(Component::Position, 0, 3),
            ElementDescriptor::new(Component::Normal, 3, 3),
            ElementDescriptor::new(Component::Texcoord, 6, 2),
        ],
        indices: obj.indices,
        ..Default::default()
    };
    for v in obj.vertices {
        mesh.structure.extend_from_slice(&v.position);
        mesh.structure.extend_from_slice(&v.normal);
        mesh.structure.extend_from_slice(&v.texture[..2]);
    }
    Ok(mesh)
}

fn try_pn(rawobj: RawObj) -> AnyResult<ParsedMesh> {
    let obj: Obj<Vertex, u16> = Obj::new(rawobj)?;
    let mut mesh = ParsedMesh {
        elements: vec![
            ElementDescriptor::new(Component::Position, 0, 3),
            ElementDescriptor::new(Component::Normal, 3, 3),
        ],
        indices: obj.indices,
        ..Default::default()
    };
    for v in obj.vertices {
        mesh.structure.extend_from_slice(&v.position);
        mesh.structure.extend_from_slice(&v.normal);
    }
    Ok(mesh)
}

fn try_p(rawobj: RawObj) -> AnyResult<ParsedMesh> {
    let obj: Obj<Position, u16> = Obj::new(rawobj)?;
    let mut mesh = ParsedMesh {
        elements: vec![ElementDescriptor::new(Component::Position, 0, 3)],
        indices: obj.indices,
        ..Default::default()
    };
    for v in obj.vertices {
        mesh.structure.extend_from_slice(&v.position);
    }
    Ok(mesh)
}
