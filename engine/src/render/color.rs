use serde::{Deserialize, Serialize};

/// Clear colour packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClearColor(pub u32);

impl ClearColor {
    pub fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.channels();
        wgpu::Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        ClearColor(0x3030_30ff)
    }
}
