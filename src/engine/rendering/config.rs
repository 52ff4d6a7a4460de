//! ### English
//! Pixel/context configuration candidates and their fallback order.
//!
//! ### 中文
//! 像素/上下文配置候选项及其回退顺序。

use std::fmt;

/// ### English
/// One framebuffer configuration the platform may accept.
///
/// A colour channel of `0` means "any": the platform picks whatever it supports.
///
/// ### 中文
/// 平台可能接受的一种帧缓冲配置。
///
/// 颜色通道为 `0` 表示“任意”：由平台选择其支持的值。
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelConfig {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
}

impl PixelConfig {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8, depth: u8, stencil: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            depth,
            stencil,
        }
    }

    const fn rgba8888(depth: u8, stencil: u8) -> Self {
        Self::new(8, 8, 8, 8, depth, stencil)
    }

    const fn rgb565(depth: u8, stencil: u8) -> Self {
        Self::new(5, 6, 5, 0, depth, stencil)
    }

    const fn any_color(depth: u8, stencil: u8) -> Self {
        Self::new(0, 0, 0, 0, depth, stencil)
    }

    /// ### English
    /// The last-resort configuration every GL driver is expected to accept.
    ///
    /// ### 中文
    /// 所有 GL 驱动都应接受的兜底配置。
    pub const MINIMAL: Self = Self::new(4, 4, 4, 0, 0, 0);
}

impl fmt::Display for PixelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{}G{}B{}A{} D{} S{}",
            self.red, self.green, self.blue, self.alpha, self.depth, self.stencil
        )
    }
}

/// ### English
/// Builds the ordered candidate list for the requested depth/stencil, richest first.
///
/// Order: `8888/D/S`, `565/D/S`, any colour with `D/S`; when `D > 16` the same three again
/// with a 16-bit depth buffer; then depth-less `8888` and `565`; finally [`PixelConfig::MINIMAL`].
/// Duplicates are dropped while keeping the first occurrence.
///
/// ### 中文
/// 根据请求的 depth/stencil 构建有序的候选列表（最丰富的排在最前）。
///
/// 顺序：`8888/D/S`、`565/D/S`、任意颜色 `D/S`；当 `D > 16` 时再以 16 位深度重复上述三项；
/// 然后是无深度的 `8888` 与 `565`；最后是 [`PixelConfig::MINIMAL`]。
/// 重复项会被去除，只保留首次出现的位置。
pub fn candidate_configs(depth: u8, stencil: u8) -> Vec<PixelConfig> {
    let mut candidates = Vec::with_capacity(10);

    if depth > 0 || stencil > 0 {
        candidates.push(PixelConfig::rgba8888(depth, stencil));
        candidates.push(PixelConfig::rgb565(depth, stencil));
        candidates.push(PixelConfig::any_color(depth, stencil));
    }
    if depth > 16 {
        candidates.push(PixelConfig::rgba8888(16, stencil));
        candidates.push(PixelConfig::rgb565(16, stencil));
        candidates.push(PixelConfig::any_color(16, stencil));
    }
    candidates.push(PixelConfig::rgba8888(0, 0));
    candidates.push(PixelConfig::rgb565(0, 0));
    candidates.push(PixelConfig::MINIMAL);

    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}
