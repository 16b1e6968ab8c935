use crate::coords::Rect;
use crate::handle::Handle;

wire_enum! {
    /// Primitive topology of a draw.
    pub enum Primitive {
        Triangles = 0,
        TriangleStrip = 1,
        Points = 2,
        Lines = 3,
        LineStrip = 4,
    }
}

wire_enum! {
    /// Blend factor applied to source or destination color.
    pub enum BlendFactor {
        Zero = 0,
        One = 1,
        SrcColor = 2,
        InvSrcColor = 3,
        SrcAlpha = 4,
        InvSrcAlpha = 5,
        DstColor = 6,
        InvDstColor = 7,
        DstAlpha = 8,
        InvDstAlpha = 9,
    }
}

wire_enum! {
    /// Winding order of front faces when culling is enabled.
    pub enum CullOrder {
        Ccw = 0,
        Cw = 1,
    }
}

wire_enum! {
    /// Depth comparison function.
    pub enum DepthFunc {
        Never = 0,
        Less = 1,
        Equal = 2,
        Greater = 3,
        GreaterEqual = 4,
        NotEqual = 5,
        LessEqual = 6,
        Always = 7,
    }
}

/// Source/destination blend factors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Blend {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl Blend {
    #[inline]
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }

    /// Straight alpha blending.
    #[inline]
    pub const fn alpha() -> Self {
        Self::new(BlendFactor::SrcAlpha, BlendFactor::InvSrcAlpha)
    }
}

/// Which buffers a clear touches.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearFlags {
    pub const COLOR_DEPTH: ClearFlags = ClearFlags { color: true, depth: true, stencil: false };
    pub const ALL: ClearFlags = ClearFlags { color: true, depth: true, stencil: true };

    #[inline]
    pub const fn is_empty(self) -> bool {
        !(self.color || self.depth || self.stencil)
    }
}

/// Output-side state shared by clears and draws.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub viewport: Rect,
    /// Scissor rectangle; `None` disables scissoring.
    pub scissor: Option<Rect>,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub clear_stencil: u32,
    /// Render target; [`Handle::NONE`] renders to the default framebuffer.
    pub target: Handle,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            viewport: Rect::default(),
            scissor: None,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            target: Handle::NONE,
        }
    }
}

/// Maximum number of texture layers bound by one draw.
pub const MAX_TEXTURE_LAYERS: usize = 8;

/// Complete state for a draw call (or for an explicit state apply).
///
/// Resource fields hold virtual handles on the recorder side and real handles by the time a
/// backend sees them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    pub viewport: ViewportState,

    pub vertex_buffer: Handle,
    pub index_buffer: Handle,
    pub primitive: Primitive,
    pub index_offset: u32,
    /// Index count for indexed draws, vertex count otherwise; `0` draws everything.
    pub index_count: u32,
    /// `0` or `1` for a non-instanced draw.
    pub instance_count: u32,

    pub shader: Handle,
    pub uniform_buffer: Handle,
    pub textures: [Handle; MAX_TEXTURE_LAYERS],

    /// `None` disables blending.
    pub blend: Option<Blend>,
    /// `None` disables face culling.
    pub cull: Option<CullOrder>,
    /// `None` disables depth testing.
    pub depth_test: Option<DepthFunc>,
    pub depth_write: bool,
    pub color_write: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            viewport: ViewportState::default(),
            vertex_buffer: Handle::NONE,
            index_buffer: Handle::NONE,
            primitive: Primitive::Triangles,
            index_offset: 0,
            index_count: 0,
            instance_count: 0,
            shader: Handle::NONE,
            uniform_buffer: Handle::NONE,
            textures: [Handle::NONE; MAX_TEXTURE_LAYERS],
            blend: None,
            cull: None,
            depth_test: Some(DepthFunc::LessEqual),
            depth_write: true,
            color_write: true,
        }
    }
}

impl DrawState {
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    #[inline]
    pub fn is_instanced(&self) -> bool {
        self.instance_count > 1
    }

    /// Visits every resource handle field, allowing in-place rewriting.
    pub fn for_each_handle_mut(&mut self, mut f: impl FnMut(&mut Handle)) {
        f(&mut self.viewport.target);
        f(&mut self.vertex_buffer);
        f(&mut self.index_buffer);
        f(&mut self.shader);
        f(&mut self.uniform_buffer);
        for texture in &mut self.textures {
            f(texture);
        }
    }
}
