#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{
    CENTERLINE_OVERSAMPLING, PATCH_HALF_SIZE_MM, PATCH_RESOLUTION_MM, SMOOTHING_FACTOR_MM,
};
use crate::data::Interpolation;
use crate::error::{ShapeError, ShapeResult};

/// 沿中心线计算形态学量时所需的参数.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeSpec {
    /// (单位: 毫米) 平滑窗口的物理长度. 为 0 时不平滑.
    smoothing_factor_mm: f64,

    /// 提取垂直切片时的插值方式.
    interpolation: Interpolation,

    /// (单位: 毫米) 垂直切片的像素间距.
    patch_resolution_mm: f64,

    /// (单位: 毫米) 垂直切片的半边长.
    patch_half_size_mm: f64,

    /// 中心线点数相对于 z 方向切片数的倍率.
    oversampling: usize,
}

impl Default for ShapeSpec {
    fn default() -> Self {
        Self {
            smoothing_factor_mm: SMOOTHING_FACTOR_MM,
            interpolation: Interpolation::default(),
            patch_resolution_mm: PATCH_RESOLUTION_MM,
            patch_half_size_mm: PATCH_HALF_SIZE_MM,
            oversampling: CENTERLINE_OVERSAMPLING,
        }
    }
}

impl ShapeSpec {
    /// 以平滑因子 `smoothing_factor_mm` (单位: 毫米) 与插值方式 `interpolation`
    /// 构建参数, 其余参数取默认值.
    ///
    /// 如果存在非法参数, 则返回 `Err`.
    pub fn new(smoothing_factor_mm: f64, interpolation: Interpolation) -> ShapeResult<Self> {
        Self {
            smoothing_factor_mm,
            interpolation,
            ..Self::default()
        }
        .checked()
    }

    /// 设置垂直切片的像素间距 (单位: 毫米).
    pub fn with_patch_resolution(self, patch_resolution_mm: f64) -> ShapeResult<Self> {
        Self {
            patch_resolution_mm,
            ..self
        }
        .checked()
    }

    /// 设置垂直切片的半边长 (单位: 毫米).
    pub fn with_patch_size(self, patch_half_size_mm: f64) -> ShapeResult<Self> {
        Self {
            patch_half_size_mm,
            ..self
        }
        .checked()
    }

    /// 设置中心线过采样倍率.
    pub fn with_oversampling(self, oversampling: usize) -> ShapeResult<Self> {
        Self {
            oversampling,
            ..self
        }
        .checked()
    }

    /// 检查参数合法性.
    fn checked(self) -> ShapeResult<Self> {
        if !self.smoothing_factor_mm.is_finite() || self.smoothing_factor_mm < 0.0 {
            return Err(ShapeError::invalid_spec(format!(
                "平滑因子必须为非负有限值, 但得到了 {}",
                self.smoothing_factor_mm
            )));
        }
        if !self.patch_resolution_mm.is_finite() || self.patch_resolution_mm <= 0.0 {
            return Err(ShapeError::invalid_spec(format!(
                "切片分辨率必须为正, 但得到了 {}",
                self.patch_resolution_mm
            )));
        }
        if !self.patch_half_size_mm.is_finite() || self.patch_half_size_mm < self.patch_resolution_mm
        {
            return Err(ShapeError::invalid_spec(format!(
                "切片半边长 {} 不能小于分辨率 {}",
                self.patch_half_size_mm, self.patch_resolution_mm
            )));
        }
        if self.oversampling == 0 {
            return Err(ShapeError::invalid_spec("过采样倍率不能为 0"));
        }
        Ok(self)
    }

    /// 平滑因子 (单位: 毫米).
    #[inline]
    pub fn smoothing_factor_mm(&self) -> f64 {
        self.smoothing_factor_mm
    }

    /// 插值方式.
    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// 切片像素间距 (单位: 毫米).
    #[inline]
    pub fn patch_resolution_mm(&self) -> f64 {
        self.patch_resolution_mm
    }

    /// 切片半边长 (单位: 毫米).
    #[inline]
    pub fn patch_half_size_mm(&self) -> f64 {
        self.patch_half_size_mm
    }

    /// 中心线过采样倍率.
    #[inline]
    pub fn oversampling(&self) -> usize {
        self.oversampling
    }
}
