use crate::handle::Handle;

wire_enum! {
    /// Expected update frequency of a buffer.
    pub enum UsageHint {
        Static = 0,
        Dynamic = 1,
        Stream = 2,
    }
}

wire_enum! {
    /// Width of one index, in bytes.
    pub enum IndexSize {
        U16 = 2,
        U32 = 4,
    }
}

impl IndexSize {
    #[inline]
    pub const fn bytes(self) -> u32 {
        self as u32
    }
}

wire_enum! {
    /// Component type of a vertex attribute.
    pub enum AttributeType {
        Float16 = 0,
        Float32 = 1,
        Uint8 = 2,
    }
}

/// One vertex attribute: byte offset inside the vertex, component count and component type.
///
/// `dimension == 0` disables the attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub offset: u8,
    pub dimension: u8,
    pub kind: AttributeType,
}

impl VertexAttribute {
    pub const DISABLED: VertexAttribute = VertexAttribute::new(0, 0, AttributeType::Float32);

    #[inline]
    pub const fn new(offset: u8, dimension: u8, kind: AttributeType) -> Self {
        Self { offset, dimension, kind }
    }

    #[inline]
    pub const fn float(offset: u8, dimension: u8) -> Self {
        Self::new(offset, dimension, AttributeType::Float32)
    }

    #[inline]
    pub const fn is_enabled(self) -> bool {
        self.dimension > 0
    }
}

impl Default for VertexAttribute {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Maximum number of texture coordinate sets in a [`VertexLayout`].
pub const MAX_TEX_COORDS: usize = 13;

/// Interpretation of a vertex buffer's bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub position: VertexAttribute,
    pub normal: VertexAttribute,
    pub color: VertexAttribute,
    pub tex_coords: [VertexAttribute; MAX_TEX_COORDS],
}

impl Default for VertexLayout {
    /// Three float position components at offset 0, nothing else.
    fn default() -> Self {
        Self {
            position: VertexAttribute::float(0, 3),
            normal: VertexAttribute::DISABLED,
            color: VertexAttribute::DISABLED,
            tex_coords: [VertexAttribute::DISABLED; MAX_TEX_COORDS],
        }
    }
}

wire_enum! {
    /// Texture coordinate wrapping.
    pub enum Wrap {
        Clamp = 0,
        Repeat = 1,
        RepeatMirror = 2,
    }
}

wire_enum! {
    /// Texel filtering.
    pub enum Filter {
        Nearest = 0,
        Linear = 1,
    }
}

/// Sampler filtering for a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureFilter {
    pub minification: Filter,
    pub magnification: Filter,
    pub mipmap: Filter,
    /// Maximum anisotropy; `0` or `1` disables anisotropic filtering.
    pub anisotropy: u32,
}

impl Default for TextureFilter {
    fn default() -> Self {
        Self {
            minification: Filter::Linear,
            magnification: Filter::Linear,
            mipmap: Filter::Linear,
            anisotropy: 0,
        }
    }
}

/// Sub-rectangle of a texture level, in texels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureRegion {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Maximum number of color attachments a [`TargetDesc`] can carry.
pub const MAX_TARGET_ATTACHMENTS: usize = 16;

/// Color attachment of a render target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetAttachment {
    pub texture: Handle,
    /// Cubemap face index for cubemap attachments, `None` for 2D textures.
    pub cube_face: Option<u8>,
}

impl TargetAttachment {
    #[inline]
    pub const fn texture(texture: Handle) -> Self {
        Self { texture, cube_face: None }
    }

    #[inline]
    pub const fn cube_face(texture: Handle, face: u8) -> Self {
        Self { texture, cube_face: Some(face) }
    }

    /// A cubemap face must be one of the six faces `0..6`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.cube_face.is_none_or(|face| face < 6)
    }
}

/// Render target description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDesc {
    pub width: u32,
    pub height: u32,
    /// MSAA sample count; `0`/`1` means single-sampled.
    pub samples: u32,
    /// At most [`MAX_TARGET_ATTACHMENTS`]; extra entries are ignored when recorded.
    pub attachments: Vec<TargetAttachment>,
    pub depth: Handle,
}

wire_enum! {
    /// Shader uniform types visible to material code.
    pub enum UniformType {
        Float = 0,
        Vec2 = 1,
        Vec3 = 2,
        Vec4 = 3,
        Mat4 = 4,
        Sampler2d = 5,
        SamplerCube = 6,
    }
}

impl UniformType {
    /// Float components per array element (samplers occupy none).
    pub const fn components(self) -> u32 {
        match self {
            UniformType::Float => 1,
            UniformType::Vec2 => 2,
            UniformType::Vec3 => 3,
            UniformType::Vec4 => 4,
            UniformType::Mat4 => 16,
            UniformType::Sampler2d | UniformType::SamplerCube => 0,
        }
    }
}

/// A uniform declared by a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUniform {
    pub name: String,
    pub kind: UniformType,
    /// `1` for scalars, declared length for arrays.
    pub array_size: u32,
}

/// Capability limits reported by a backend.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_texture_dimension: u32,
    pub max_target_attachments: u32,
    pub max_target_msaa: u32,
}
