use std::io::Write;

use crate::descriptor::RawElementDescriptor;
use crate::mesh::*;
use crate::stream::ByteWriter;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid Mesh Data: {0}")]
    InvalidMesh(#[from] MeshValidationError),
}

/// Bytes taken by a material record, excluding its name and textures.
const MATERIAL_FIXED_LEN: usize = 2 + 2 + 4 + 4 * 16 + 4 * 4 + 4;
/// Bytes taken by a texture record, excluding its name.
const TEXTURE_FIXED_LEN: usize = 2 + 2 + 4;
const SURFACE_LEN: usize = 2 + 4 + 4;

/// Exact number of bytes [`encode`] produces for `mesh`.
pub fn encoded_len(mesh: &ParsedMesh) -> usize {
    let materials: usize = mesh
        .materials
        .iter()
        .map(|m| {
            MATERIAL_FIXED_LEN
                + m.name.len()
                + m.textures
                    .iter()
                    .map(|t| TEXTURE_FIXED_LEN + t.name.len())
                    .sum::<usize>()
        })
        .sum();
    crate::version::encoded_len()
        + 4
        + mesh.elements.len() * RawElementDescriptor::encoded_len()
        + 4 * 3
        + mesh.indices.len() * 2
        + mesh.structure.len() * 4
        + 4
        + materials
        + 4
        + mesh.surfaces.len() * SURFACE_LEN
}

/// Serializes a mesh into a new buffer.
///
/// The output only depends on the mesh, so encoding the same mesh twice
/// gives identical bytes.
pub fn encode(mesh: &ParsedMesh) -> Result<Vec<u8>, WriteError> {
    mesh.validate()?;
    let mut w = ByteWriter::with_capacity(encoded_len(mesh));
    write_mesh(&mut w, mesh);
    debug_assert_eq!(w.position(), encoded_len(mesh));
    Ok(w.into_inner())
}

pub fn encode_to(mesh: &ParsedMesh, write: &mut dyn Write) -> Result<(), WriteError> {
    let bytes = encode(mesh)?;
    write.write_all(&bytes)?;
    write.flush()?;
    Ok(())
}

fn write_mesh(w: &mut ByteWriter, mesh: &ParsedMesh) {
    w.write_f32(crate::FORMAT_VERSION);

    w.write_u32(mesh.elements.len() as u32);
    for e in mesh.elements.iter() {
        w.write_bytes(RawElementDescriptor::from(*e).as_bytes());
    }

    w.write_u32(mesh.indices.len() as u32);
    w.write_u32(mesh.structure.len() as u32);
    w.write_u32(mesh.stride);
    w.write_u16_array(&mesh.indices);
    w.write_f32_array(&mesh.structure);

    w.write_u32(mesh.materials.len() as u32);
    for m in mesh.materials.iter() {
        write_material(w, m);
    }

    w.write_u32(mesh.surfaces.len() as u32);
    for s in mesh.surfaces.iter() {
        w.write_u16(s.id);
        w.write_u32(s.start);
        w.write_u32(s.length);
    }
}

fn write_material(w: &mut ByteWriter, m: &Material) {
    w.write_u16(m.id);
    w.write_str16(&m.name);
    w.write_f32(m.alpha);
    for color in [&m.ambient, &m.diffuse, &m.emissive, &m.specular] {
        w.write_f32_array(color);
    }
    w.write_f32(m.specular_level);
    w.write_f32(m.reflection_level);
    w.write_f32(m.shininess);
    w.write_f32(m.refraction);

    w.write_u32(m.textures.len() as u32);
    for t in m.textures.iter() {
        w.write_u16(t.map_kind.to_raw());
        w.write_str16(&t.name);
        w.write_u8(t.texture_type.to_raw());
        w.write_u8(t.quality.to_raw());
        w.write_u8(t.repeat.to_raw());
        w.write_u8(t.optimize.to_raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::*;

    #[test]
    fn empty_mesh_is_header_and_counts() {
        let bytes = encode(&ParsedMesh::default()).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 12 + 4 + 4);
        assert_eq!(&bytes[..4], &crate::FORMAT_VERSION.to_le_bytes());
        assert!(bytes[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn strings_are_length_prefixed_without_terminator() {
        let mesh = ParsedMesh {
            materials: vec![Material {
                id: 0x0102,
                name: "ab".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = encode(&mesh).unwrap();
        // version, elementCount, three counts, materialCount
        let m = 4 + 4 + 12 + 4;
        assert_eq!(&bytes[m..m + 6], &[0x02, 0x01, 2, 0, b'a', b'b']);
        assert_eq!(bytes.len(), encoded_len(&mesh));
    }

    #[test]
    fn texture_flags_follow_the_name() {
        let mut tex = TextureRef::new(MapKind::Other(0x0A0B), "t");
        tex.texture_type = TextureType::TextureCube;
        tex.quality = TextureQuality::Trilinear;
        tex.repeat = TextureRepeat::Other(9);
        tex.optimize = TextureOptimize::Never;
        let mesh = ParsedMesh {
            materials: vec![Material {
                textures: vec![tex],
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = encode(&mesh).unwrap();
        // the texture record sits right before the surface count
        let tail = &bytes[bytes.len() - 4 - 9..bytes.len() - 4];
        assert_eq!(tail, &[0x0B, 0x0A, 1, 0, b't', 1, 2, 9, 2][..]);
    }

    #[test]
    fn invalid_mesh_is_not_encoded() {
        let mesh = ParsedMesh {
            stride: 3,
            ..Default::default()
        };
        assert!(matches!(encode(&mesh), Err(WriteError::InvalidMesh(_))));
    }

    #[test]
    fn encode_to_writes_everything() {
        let mesh = ParsedMesh {
            elements: vec![ElementDescriptor::new(Component::Position, 0, 3)],
            structure: vec![1.0, 2.0, 3.0],
            stride: 3,
            indices: vec![0, 0, 0],
            ..Default::default()
        };
        let mut out = vec![];
        encode_to(&mesh, &mut out).unwrap();
        assert_eq!(out, encode(&mesh).unwrap());
    }
}
