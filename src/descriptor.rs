/// Defines a byte-coded enum whose unknown values are preserved in a
/// catch-all variant, so they survive a decode/encode cycle unchanged.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $raw:ty {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)*
        }
        $other:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            /// A raw value outside the known set.
            $other($raw),
        }

        impl $name {
            pub const fn from_raw(raw: $raw) -> Self {
                match raw {
                    $($value => Self::$variant,)*
                    other => Self::$other(other),
                }
            }

            pub const fn to_raw(self) -> $raw {
                match self {
                    $(Self::$variant => $value,)*
                    Self::$other(raw) => raw,
                }
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                Self::from_raw(raw)
            }
        }
    };
}

coded_enum! {
    /// Semantic of one vertex attribute.
    pub enum Component: u8 {
        Position = 0,
        Texcoord = 1,
        Normal = 2,
        Tangent = 3,
        Bitangent = 4,
    }
    Custom
}

coded_enum! {
    /// Material channel a texture is bound to.
    pub enum MapKind: u16 {
        Alpha = 0,
        Ambient = 1,
        Diffuse = 2,
        Emissive = 3,
        Specular = 4,
        Shininess = 5,
        Bump = 6,
        Reflective = 7,
    }
    Other
}

coded_enum! {
    pub enum TextureType: u8 {
        Texture2D = 0,
        TextureCube = 1,
    }
    Other
}

coded_enum! {
    /// Filtering quality requested for a texture.
    pub enum TextureQuality: u8 {
        Nearest = 0,
        Bilinear = 1,
        Trilinear = 2,
    }
    Other
}

coded_enum! {
    pub enum TextureRepeat: u8 {
        Repeat = 0,
        Mirror = 1,
        Clamp = 2,
    }
    Other
}

coded_enum! {
    /// Whether the texture may be resized to suit the GPU.
    pub enum TextureOptimize: u8 {
        Always = 0,
        PowerOfTwo = 1,
        Never = 2,
    }
    Other
}

/// Placement of one vertex attribute inside an interleaved vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementDescriptor {
    pub component: Component,
    /// Offset of the attribute within a vertex record.
    pub start: u8,
    /// Number of floats making up the attribute.
    pub length: u8,
    pub offset_in_face: u8,
}

/// On-disk form of [`ElementDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C, packed)]
pub struct RawElementDescriptor {
    pub component: u8,
    pub start: u8,
    pub length: u8,
    pub offset_in_face: u8,
}

impl RawElementDescriptor {
    pub const fn encoded_len() -> usize {
        std::mem::size_of::<Self>()
    }

    /// `buf` must be exactly [`Self::encoded_len`] bytes long.
    pub fn from_bytes(buf: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl ElementDescriptor {
    pub const fn new(component: Component, start: u8, length: u8) -> Self {
        Self {
            component,
            start,
            length,
            offset_in_face: 0,
        }
    }

    pub fn with_offset_in_face(mut self, offset_in_face: u8) -> Self {
        self.offset_in_face = offset_in_face;
        self
    }
}

impl From<ElementDescriptor> for RawElementDescriptor {
    fn from(e: ElementDescriptor) -> Self {
        Self {
            component: e.component.to_raw(),
            start: e.start,
            length: e.length,
            offset_in_face: e.offset_in_face,
        }
    }
}

impl From<RawElementDescriptor> for ElementDescriptor {
    fn from(raw: RawElementDescriptor) -> Self {
        Self {
            component: Component::from_raw(raw.component),
            start: raw.start,
            length: raw.length,
            offset_in_face: raw.offset_in_face,
        }
    }
}
