wire_enum! {
    /// First word of every recorded command.
    ///
    /// Values start far from zero so a zeroed or misaligned read is caught as corruption instead
    /// of being decoded as a plausible command.
    pub enum Opcode {
        Clear = 0x6C75_0001,
        Camera = 0x6C75_0002,
        ApplyState = 0x6C75_0003,
        Draw = 0x6C75_0004,
        SetUniform = 0x6C75_0005,
        ResolveTarget = 0x6C75_0006,

        CreateShader = 0x6C75_0010,
        RemoveShader = 0x6C75_0011,
        CreateUniformBuffer = 0x6C75_0012,
        RemoveUniformBuffer = 0x6C75_0013,

        CreateVertexBuffer = 0x6C75_0020,
        SetVertexLayout = 0x6C75_0021,
        UpdateVertexBuffer = 0x6C75_0022,
        RemoveVertexBuffer = 0x6C75_0023,

        CreateIndexBuffer = 0x6C75_0030,
        UpdateIndexBuffer = 0x6C75_0031,
        RemoveIndexBuffer = 0x6C75_0032,

        CreateTexture = 0x6C75_0040,
        CreateCubemap = 0x6C75_0041,
        UpdateTexture = 0x6C75_0042,
        SetTextureWrap = 0x6C75_0043,
        SetTextureFilter = 0x6C75_0044,
        RemoveTexture = 0x6C75_0045,

        CreateTarget = 0x6C75_0050,
        RemoveTarget = 0x6C75_0051,

        InvalidateState = 0x6C75_0060,
    }
}
