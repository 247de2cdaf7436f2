use crate::descriptor::*;
use crate::mesh::*;
use crate::stream::{ByteReader, Truncated};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    #[error("Incompatible version of the file format: {0}")]
    UnsupportedVersion(f32),
    #[error(transparent)]
    Truncated(#[from] Truncated),
    #[error("Name is not valid UTF-8")]
    InvalidName,
    #[error("Unexpected extra data ({0} bytes)")]
    TooMuchData(usize),
    #[error("Decoded mesh is inconsistent: {0}")]
    InvalidMesh(#[from] MeshValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderSettings {
    /// Fail if bytes remain after the last surface record.
    pub reject_trailing_data: bool,
    /// Run [`ParsedMesh::validate`] on the decoded mesh.
    pub validate_mesh: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            reject_trailing_data: true,
            validate_mesh: true,
        }
    }
}

/// Smallest possible encoded material: empty name, no textures.
const MIN_MATERIAL_LEN: usize = 2 + 2 + 4 + 4 * 16 + 4 * 4 + 4;
const MIN_TEXTURE_LEN: usize = 2 + 2 + 4;
const SURFACE_LEN: usize = 2 + 4 + 4;

pub fn decode(buf: &[u8]) -> Result<ParsedMesh, ReadError> {
    decode_with_settings(Default::default(), buf)
}

/// Reconstructs a mesh from an encoded buffer.
///
/// Either the whole mesh is decoded or an error is returned; nothing is
/// salvaged from a damaged buffer.
pub fn decode_with_settings(
    settings: ReaderSettings,
    buf: &[u8],
) -> Result<ParsedMesh, ReadError> {
    let mut r = ByteReader::new(buf);
    crate::version::expect_version(&mut r)?;

    let n_elements = r.read_u32()? as usize;
    let len = checked_len(&r, n_elements, RawElementDescriptor::encoded_len())?;
    let raw_elements = r.read_bytes(len)?;
    let elements = raw_elements
        .chunks_exact(RawElementDescriptor::encoded_len())
        .map(|b| ElementDescriptor::from(RawElementDescriptor::from_bytes(b)))
        .collect();

    let n_indices = r.read_u32()? as usize;
    let n_structure = r.read_u32()? as usize;
    let stride = r.read_u32()?;
    let indices = r.read_u16_array(n_indices)?;
    let structure = r.read_f32_array(n_structure)?;

    let n_materials = r.read_u32()? as usize;
    let mut materials = Vec::with_capacity(bounded(&r, n_materials, MIN_MATERIAL_LEN));
    for _ in 0..n_materials {
        materials.push(read_material(&mut r)?);
    }

    let n_surfaces = r.read_u32()? as usize;
    let mut surfaces = Vec::with_capacity(bounded(&r, n_surfaces, SURFACE_LEN));
    for _ in 0..n_surfaces {
        surfaces.push(Surface {
            id: r.read_u16()?,
            start: r.read_u32()?,
            length: r.read_u32()?,
        });
    }

    if settings.reject_trailing_data && !r.is_empty() {
        return Err(ReadError::TooMuchData(r.remaining()));
    }

    let mesh = ParsedMesh {
        elements,
        indices,
        structure,
        stride,
        materials,
        surfaces,
    };
    if settings.validate_mesh {
        mesh.validate()?;
    }
    Ok(mesh)
}

fn read_material(r: &mut ByteReader<'_>) -> Result<Material, ReadError> {
    let id = r.read_u16()?;
    let name = read_str16(r)?;
    let alpha = r.read_f32()?;
    let ambient = read_color(r)?;
    let diffuse = read_color(r)?;
    let emissive = read_color(r)?;
    let specular = read_color(r)?;
    let specular_level = r.read_f32()?;
    let reflection_level = r.read_f32()?;
    let shininess = r.read_f32()?;
    let refraction = r.read_f32()?;

    let n_textures = r.read_u32()? as usize;
    let mut textures = Vec::with_capacity(bounded(r, n_textures, MIN_TEXTURE_LEN));
    for _ in 0..n_textures {
        let map_kind = MapKind::from_raw(r.read_u16()?);
        let name = read_str16(r)?;
        textures.push(TextureRef {
            map_kind,
            name,
            texture_type: TextureType::from_raw(r.read_u8()?),
            quality: TextureQuality::from_raw(r.read_u8()?),
            repeat: TextureRepeat::from_raw(r.read_u8()?),
            optimize: TextureOptimize::from_raw(r.read_u8()?),
        });
    }

    Ok(Material {
        id,
        name,
        alpha,
        ambient,
        diffuse,
        emissive,
        specular,
        specular_level,
        reflection_level,
        shininess,
        refraction,
        textures,
    })
}

fn read_str16(r: &mut ByteReader<'_>) -> Result<String, ReadError> {
    let len = r.read_u16()? as usize;
    let bytes = r.read_bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidName)
}

fn read_color(r: &mut ByteReader<'_>) -> Result<[f32; 4], ReadError> {
    Ok([r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?])
}

fn checked_len(r: &ByteReader<'_>, count: usize, width: usize) -> Result<usize, Truncated> {
    count.checked_mul(width).ok_or(Truncated {
        offset: r.position(),
        needed: usize::MAX,
        remaining: r.remaining(),
    })
}

/// Caps a capacity hint taken from the file by what the remaining bytes
/// could possibly hold.
fn bounded(r: &ByteReader<'_>, count: usize, min_record_len: usize) -> usize {
    count.min(r.remaining() / min_record_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::encode;

    fn sample() -> ParsedMesh {
        let mut tex = TextureRef::new(MapKind::Bump, "bump.png");
        tex.optimize = TextureOptimize::Other(200);
        ParsedMesh {
            elements: vec![
                ElementDescriptor::new(Component::Position, 0, 3),
                ElementDescriptor::new(Component::Custom(42), 3, 1).with_offset_in_face(2),
            ],
            indices: vec![0, 1, 1],
            structure: vec![1.0, 2.0, 3.0, 0.5, -1.0, -2.0, -3.0, f32::MIN_POSITIVE],
            stride: 4,
            materials: vec![Material {
                id: 7,
                name: "stone".into(),
                shininess: 12.5,
                textures: vec![tex],
                ..Default::default()
            }],
            surfaces: vec![Surface { id: 3, start: 1, length: 2 }],
        }
    }

    #[test]
    fn decodes_what_encode_wrote() {
        let mesh = sample();
        let bytes = encode(&mesh).unwrap();
        assert_eq!(decode(&bytes).unwrap(), mesh);
    }

    #[test]
    fn rejects_other_versions() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[..4].copy_from_slice(&2.0f32.to_le_bytes());
        assert_eq!(decode(&bytes), Err(ReadError::UnsupportedVersion(2.0)));
    }

    #[test]
    fn trailing_data_is_configurable() {
        let mesh = sample();
        let mut bytes = encode(&mesh).unwrap();
        bytes.extend_from_slice(&[0xFF; 3]);
        assert_eq!(decode(&bytes), Err(ReadError::TooMuchData(3)));
        let settings = ReaderSettings {
            reject_trailing_data: false,
            ..Default::default()
        };
        assert_eq!(decode_with_settings(settings, &bytes).unwrap(), mesh);
    }

    #[test]
    fn inconsistent_mesh_is_reported() {
        // the encoder refuses such meshes, so patch the index array in place
        let mut bytes = encode(&sample()).unwrap();
        let at = 4 + 4 + 2 * 4 + 12;
        bytes[at..at + 2].copy_from_slice(&9u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(ReadError::InvalidMesh(MeshValidationError::IndexOutOfRange { index: 9, .. }))
        ));
        let lax = ReaderSettings {
            validate_mesh: false,
            ..Default::default()
        };
        assert_eq!(decode_with_settings(lax, &bytes).unwrap().indices[0], 9);
    }

    #[test]
    fn non_utf8_name_is_an_error() {
        let mut bytes = encode(&sample()).unwrap();
        let name_at = bytes
            .windows(5)
            .position(|w| w == b"stone")
            .unwrap();
        bytes[name_at] = 0xFF;
        assert_eq!(decode(&bytes), Err(ReadError::InvalidName));
    }

    #[test]
    fn absurd_counts_do_not_allocate() {
        let mut bytes = crate::FORMAT_VERSION.to_le_bytes().to_vec();
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(ReadError::Truncated(_))));

        let mut bytes = encode(&ParsedMesh::default()).unwrap();
        // materialCount
        bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(ReadError::Truncated(_))));
    }
}
