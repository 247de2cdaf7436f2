use crate::descriptor::*;

/// A fully parsed mesh, as produced by a source-format parser or
/// reconstructed from a cache file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedMesh {
    pub elements: Vec<ElementDescriptor>,
    pub indices: Vec<u16>,
    /// Interleaved vertex data, `stride` floats per vertex.
    pub structure: Vec<f32>,
    pub stride: u32,
    pub materials: Vec<Material>,
    pub surfaces: Vec<Surface>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: u16,
    pub name: String,
    pub alpha: f32,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub emissive: [f32; 4],
    pub specular: [f32; 4],
    pub specular_level: f32,
    pub reflection_level: f32,
    pub shininess: f32,
    pub refraction: f32,
    pub textures: Vec<TextureRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef {
    pub map_kind: MapKind,
    pub name: String,
    pub texture_type: TextureType,
    pub quality: TextureQuality,
    pub repeat: TextureRepeat,
    pub optimize: TextureOptimize,
}

/// A sub-range of the index array, drawn as one unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Surface {
    pub id: u16,
    pub start: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshValidationError {
    #[error("Stride is {stride} but the element descriptors add up to {expected}")]
    StrideMismatch { stride: u32, expected: u32 },
    #[error("Vertex data length {len} is not a multiple of stride {stride}")]
    PartialVertex { len: usize, stride: u32 },
    #[error("Index {index} at position {position} is out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        position: usize,
        index: u16,
        vertex_count: usize,
    },
    #[error("Surface {id} covers indices beyond the end of the index array")]
    SurfaceOutOfRange { id: u16 },
    #[error("Name is {0} bytes long, longer than a 16-bit length allows")]
    NameTooLong(usize),
    #[error("Too many {0} to count in 32 bits")]
    TooMany(&'static str),
}

impl Default for Material {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            alpha: 1.0,
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            specular_level: 1.0,
            reflection_level: 0.0,
            shininess: 0.0,
            refraction: 1.0,
            textures: vec![],
        }
    }
}

impl TextureRef {
    pub fn new(map_kind: MapKind, name: impl Into<String>) -> Self {
        Self {
            map_kind,
            name: name.into(),
            texture_type: TextureType::Texture2D,
            quality: TextureQuality::Bilinear,
            repeat: TextureRepeat::Repeat,
            optimize: TextureOptimize::Always,
        }
    }
}

impl Surface {
    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start.saturating_add(self.length as usize)
    }
}

impl ParsedMesh {
    pub fn n_vertices(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }
        self.structure.len() / self.stride as usize
    }

    /// Stride implied by the element descriptors.
    pub fn layout_stride(&self) -> u32 {
        self.elements.iter().map(|e| e.length as u32).sum()
    }

    pub fn element(&self, component: Component) -> Option<&ElementDescriptor> {
        self.elements.iter().find(|e| e.component == component)
    }

    pub fn material(&self, id: u16) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Indices of one surface, or `None` if its range is out of bounds.
    pub fn surface_indices(&self, surface: &Surface) -> Option<&[u16]> {
        self.indices.get(surface.index_range())
    }

    pub fn validate(&self) -> Result<(), MeshValidationError> {
        let expected = self.layout_stride();
        if self.stride != expected {
            return Err(MeshValidationError::StrideMismatch {
                stride: self.stride,
                expected,
            });
        }
        let partial = match self.stride {
            0 => !self.structure.is_empty(),
            s => self.structure.len() % s as usize != 0,
        };
        if partial {
            return Err(MeshValidationError::PartialVertex {
                len: self.structure.len(),
                stride: self.stride,
            });
        }
        check_count(self.elements.len(), "elements")?;
        check_count(self.indices.len(), "indices")?;
        check_count(self.structure.len(), "vertex floats")?;
        check_count(self.materials.len(), "materials")?;
        check_count(self.surfaces.len(), "surfaces")?;

        let vertex_count = self.n_vertices();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(MeshValidationError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }
        for s in self.surfaces.iter() {
            if self.surface_indices(s).is_none() {
                return Err(MeshValidationError::SurfaceOutOfRange { id: s.id });
            }
        }
        for m in self.materials.iter() {
            check_name(&m.name)?;
            check_count(m.textures.len(), "textures")?;
            for t in m.textures.iter() {
                check_name(&t.name)?;
            }
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), MeshValidationError> {
    if name.len() > u16::MAX as usize {
        return Err(MeshValidationError::NameTooLong(name.len()));
    }
    Ok(())
}

fn check_count(len: usize, what: &'static str) -> Result<(), MeshValidationError> {
    if u32::try_from(len).is_err() {
        return Err(MeshValidationError::TooMany(what));
    }
    Ok(())
}
