wire_enum! {
    /// Pixel storage formats understood by the backend interface.
    ///
    /// Uncompressed formats come first; everything from [`ColorFormat::Dxt1`] on is block
    /// compressed.
    pub enum ColorFormat {
        Rgb = 0,
        Rgba = 1,
        Bgra = 2,
        Greyscale = 3,

        R32f = 4,
        Rgb32f = 5,
        Rgba32f = 6,

        Depth16 = 7,
        Depth24 = 8,
        Depth32 = 9,

        Dxt1 = 10,
        Dxt3 = 11,
        Dxt5 = 12,

        Etc1 = 13,
        Etc2 = 14,
        Etc2Eac = 15,
        Etc2A1 = 16,

        PvrRgb2b = 17,
        PvrRgb4b = 18,
        PvrRgba2b = 19,
        PvrRgba4b = 20,
    }
}

impl ColorFormat {
    /// Number of formats; sizes per-format lookup tables.
    pub const COUNT: usize = 21;

    /// Storage cost in bits per pixel (average, for block formats).
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            ColorFormat::Rgb => 24,
            ColorFormat::Rgba | ColorFormat::Bgra => 32,
            ColorFormat::Greyscale => 8,
            ColorFormat::R32f => 32,
            ColorFormat::Rgb32f => 32 * 3,
            ColorFormat::Rgba32f => 32 * 4,
            ColorFormat::Depth16 => 16,
            ColorFormat::Depth24 => 24,
            ColorFormat::Depth32 => 32,
            ColorFormat::Dxt1 => 4,
            ColorFormat::Dxt3 | ColorFormat::Dxt5 => 8,
            ColorFormat::Etc1 | ColorFormat::Etc2 | ColorFormat::Etc2A1 => 4,
            ColorFormat::Etc2Eac => 8,
            ColorFormat::PvrRgb2b | ColorFormat::PvrRgba2b => 2,
            ColorFormat::PvrRgb4b | ColorFormat::PvrRgba4b => 4,
        }
    }

    #[inline]
    pub const fn is_compressed(self) -> bool {
        self as u32 >= ColorFormat::Dxt1 as u32
    }

    #[inline]
    pub const fn is_pvrtc(self) -> bool {
        matches!(
            self,
            ColorFormat::PvrRgb2b | ColorFormat::PvrRgb4b | ColorFormat::PvrRgba2b | ColorFormat::PvrRgba4b
        )
    }

    #[inline]
    pub const fn is_depth(self) -> bool {
        matches!(self, ColorFormat::Depth16 | ColorFormat::Depth24 | ColorFormat::Depth32)
    }

    /// Byte size of one mip level.
    pub fn level_size(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        let bpp = self.bits_per_pixel() as usize;

        if !self.is_compressed() {
            return w * h * bpp / 8;
        }

        if self.is_pvrtc() {
            // PVRTC pads small levels up to a full block pair.
            return if bpp == 2 {
                (w.max(16) * h.max(8) * 2 + 7) / 8
            } else {
                (w.max(8) * h.max(8) * 4 + 7) / 8
            };
        }

        // 4x4 blocks; bpp * 2 bytes per block.
        w.max(4).div_ceil(4) * h.max(4).div_ceil(4) * bpp * 2
    }
}

/// Total byte size of the pixel data for a texture upload.
///
/// `mip_count` follows the upload convention:
/// - `0`: no pixel data at all
/// - negative: a single level is supplied and the backend generates the rest
/// - positive: that many levels, each half the size of the previous one (clamped to 1)
pub fn texture_byte_size(width: u32, height: u32, format: ColorFormat, mip_count: i32) -> usize {
    if mip_count == 0 {
        return 0;
    }

    let levels = if mip_count > 0 { mip_count as u32 } else { 1 };
    let (mut w, mut h) = (width, height);
    let mut total = 0;

    for _ in 0..levels {
        total += format.level_size(w, h);
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_matches_variants() {
        assert_eq!(ColorFormat::ALL.len(), ColorFormat::COUNT);
        for (i, f) in ColorFormat::ALL.iter().enumerate() {
            assert_eq!(f.to_word() as usize, i);
        }
    }

    #[test]
    fn uncompressed_single_level() {
        assert_eq!(texture_byte_size(4, 4, ColorFormat::Rgba, 1), 64);
        assert_eq!(texture_byte_size(3, 2, ColorFormat::Rgb, -1), 18);
        assert_eq!(texture_byte_size(2, 2, ColorFormat::Rgba32f, 1), 64);
    }

    #[test]
    fn zero_mips_means_no_data() {
        assert_eq!(texture_byte_size(256, 256, ColorFormat::Rgba, 0), 0);
    }

    #[test]
    fn mip_chain_halves_and_clamps() {
        // 4x2: 4x2 + 2x1 + 1x1 greyscale
        assert_eq!(texture_byte_size(4, 2, ColorFormat::Greyscale, 3), 8 + 2 + 1);
    }

    #[test]
    fn dxt_rounds_up_to_blocks() {
        assert_eq!(ColorFormat::Dxt1.level_size(4, 4), 8);
        assert_eq!(ColorFormat::Dxt5.level_size(8, 4), 32);
        assert_eq!(ColorFormat::Dxt1.level_size(1, 1), 8);
        assert_eq!(ColorFormat::Dxt1.level_size(6, 6), 32);
    }

    #[test]
    fn pvrtc_minimum_sizes() {
        assert_eq!(ColorFormat::PvrRgb2b.level_size(1, 1), 32);
        assert_eq!(ColorFormat::PvrRgba4b.level_size(1, 1), 32);
        assert_eq!(ColorFormat::PvrRgba4b.level_size(16, 16), 128);
    }

    #[test]
    fn classification() {
        assert!(!ColorFormat::Depth32.is_compressed());
        assert!(ColorFormat::Depth24.is_depth());
        assert!(ColorFormat::Etc2.is_compressed());
        assert!(ColorFormat::from_word(99).is_none());
    }
}
