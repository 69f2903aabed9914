pub mod math {
    pub fn degree_to_radian(degree: f32) -> f32 {
        degree * std::f32::consts::PI / 180.0
    }
}

pub mod color {
    use glam::Vec4;

    /// Pack a color with components in `[0, 1]` into a 32-bit pixel.
    ///
    /// Memory layout is R,G,B,A from low byte to high byte, so the alpha
    /// channel ends up in the most significant byte.
    pub fn pack_rgba(color: Vec4) -> u32 {
        let r = (color.x * 255.0) as u32;
        let g = (color.y * 255.0) as u32;
        let b = (color.z * 255.0) as u32;
        let a = (color.w * 255.0) as u32;
        (a << 24) | (b << 16) | (g << 8) | r
    }
}

#[cfg(test)]
mod tests {
    use super::color::pack_rgba;
    use glam::Vec4;

    #[test]
    fn red_lands_in_the_low_byte() {
        let packed = pack_rgba(Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(packed & 0xff, 255);
        assert_eq!((packed >> 8) & 0xff, 0);
        assert_eq!((packed >> 16) & 0xff, 0);
        assert_eq!(packed >> 24, 255);
    }

    #[test]
    fn opaque_white_sets_every_byte() {
        assert_eq!(pack_rgba(Vec4::ONE), u32::MAX);
    }

    #[test]
    fn opaque_black_keeps_only_alpha() {
        assert_eq!(pack_rgba(Vec4::new(0.0, 0.0, 0.0, 1.0)), 0xff00_0000);
    }
}
