use glam::{Mat4, Vec3};
use lumen_engine::backend::{
    Blend, ClearFlags, DrawState, IndexSize, RenderBackend, TargetAttachment, TargetDesc,
    TextureFilter, UsageHint, VertexAttribute, VertexLayout, ViewportState, Wrap,
};
use lumen_engine::coords::Rect;
use lumen_engine::texture::ColorFormat;
use lumen_engine::Handle;

const VERTEX_SHADER: &str = "
    uniform mat4 lumen_ModelViewProjectionMatrix;
    uniform vec4 tint;
    uniform float time;
    void main() { gl_Position = lumen_ModelViewProjectionMatrix * vec4(0.0); }
";

const FRAGMENT_SHADER: &str = "
    uniform sampler2D albedo;
    void main() {}
";

/// Handles of the demo scene; all virtual, valid as soon as they are returned.
pub struct Scene {
    shader: Handle,
    uniforms: Handle,
    vertices: Handle,
    indices: Handle,
    texture: Handle,
    offscreen: Handle,
    offscreen_color: Handle,
    viewport: Rect,
}

impl Scene {
    /// Records creation of every resource the scene draws with.
    pub fn load(r: &mut dyn RenderBackend, width: i32, height: i32) -> anyhow::Result<Self> {
        let created = |h: Option<Handle>, what: &str| h.ok_or_else(|| anyhow::anyhow!("failed to create {what}"));

        let shader = created(r.create_shader(VERTEX_SHADER, FRAGMENT_SHADER), "shader")?;
        for u in r.uniforms(shader) {
            log::info!("shader uniform {} : {:?}[{}]", u.name, u.kind, u.array_size);
        }
        let uniforms = created(r.create_uniform_buffer(shader), "uniform buffer")?;

        // unit quad, position (xyz) + uv
        let quad: [f32; 20] = [
            -1.0, -1.0, 0.0, 0.0, 0.0, //
            1.0, -1.0, 0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0, 1.0, 1.0, //
            -1.0, 1.0, 0.0, 0.0, 1.0,
        ];
        let vertices = created(
            r.create_vertex_buffer(bytemuck::cast_slice(&quad), 20, 4, UsageHint::Static),
            "vertex buffer",
        )?;
        let mut layout = VertexLayout::default();
        layout.tex_coords[0] = VertexAttribute::float(12, 2);
        r.set_vertex_layout(vertices, &layout);

        let index_data: Vec<u8> = [0u16, 1, 2, 2, 3, 0].iter().flat_map(|i| i.to_le_bytes()).collect();
        let indices = created(
            r.create_index_buffer(&index_data, IndexSize::U16, 6, UsageHint::Static),
            "index buffer",
        )?;

        let checker: Vec<u8> = (0..16u32)
            .flat_map(|i| if (i + i / 4) % 2 == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
            .collect();
        let texture = created(r.create_texture(Some(checker.as_slice()), 4, 4, ColorFormat::Rgba, 1), "texture")?;
        r.set_texture_wrap(texture, Wrap::Repeat, Wrap::Repeat);
        r.set_texture_filter(texture, TextureFilter::default());

        let offscreen_color = created(
            r.create_texture(None, width as u32, height as u32, ColorFormat::Rgba, 0),
            "offscreen color",
        )?;
        let samples = r.limits().max_target_msaa.min(4);
        let offscreen = created(
            r.create_target(&TargetDesc {
                width: width as u32,
                height: height as u32,
                samples,
                attachments: vec![TargetAttachment::texture(offscreen_color)],
                depth: Handle::NONE,
            }),
            "offscreen target",
        )?;

        Ok(Self {
            shader,
            uniforms,
            vertices,
            indices,
            texture,
            offscreen,
            offscreen_color,
            viewport: Rect::from_size(width, height),
        })
    }

    /// Records one frame: offscreen pass, resolve, then the quad on screen.
    pub fn record_frame(&self, r: &mut dyn RenderBackend, frame: u32) {
        let t = frame as f32 / 60.0;
        let aspect = self.viewport.width as f32 / self.viewport.height.max(1) as f32;
        let projection = Mat4::perspective_rh(60f32.to_radians(), aspect, 0.1, 100.0);
        let modelview = Mat4::look_at_rh(Vec3::new(t.sin() * 3.0, 1.0, 3.0), Vec3::ZERO, Vec3::Y);
        r.set_camera(&modelview, &projection);

        let offscreen = ViewportState {
            viewport: self.viewport,
            clear_color: [0.1, 0.1, 0.15, 1.0],
            target: self.offscreen,
            ..ViewportState::default()
        };
        r.clear(&offscreen, ClearFlags::COLOR_DEPTH);

        r.set_uniform(self.uniforms, 0, &[1.0, 0.5 + 0.5 * t.cos(), 1.0, 1.0]);
        r.set_uniform(self.uniforms, 1, &[t]);

        let mut state = DrawState {
            viewport: offscreen,
            vertex_buffer: self.vertices,
            index_buffer: self.indices,
            index_count: 6,
            shader: self.shader,
            uniform_buffer: self.uniforms,
            ..DrawState::default()
        };
        state.textures[0] = self.texture;
        r.draw(&state);
        r.resolve_target(self.offscreen);

        let screen = ViewportState {
            viewport: self.viewport,
            ..ViewportState::default()
        };
        r.clear(&screen, ClearFlags::ALL);
        state.viewport = screen;
        state.textures[0] = self.offscreen_color;
        state.blend = Some(Blend::alpha());
        state.depth_test = None;
        r.draw(&state);
    }

    /// Records removal of every resource.
    pub fn unload(self, r: &mut dyn RenderBackend) {
        r.remove_target(self.offscreen);
        r.remove_texture(self.offscreen_color);
        r.remove_texture(self.texture);
        r.remove_index_buffer(self.indices);
        r.remove_vertex_buffer(self.vertices);
        r.remove_uniform_buffer(self.uniforms);
        r.remove_shader(self.shader);
    }
}
