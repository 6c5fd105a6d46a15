//! 通用常量.

/// 单通道像素值.
pub mod gray {
    /// 背景像素值. 同时也是垂直切片在体数据范围外的填充值.
    pub const BACKGROUND: f64 = 0.0;

    /// 前景 (脊髓) 像素值.
    pub const FOREGROUND: f64 = 1.0;

    /// 像素是否是前景? 任何非零值都被视为前景.
    #[inline]
    pub fn is_foreground(p: f64) -> bool {
        p != BACKGROUND
    }

    /// 像素是否是背景?
    #[inline]
    pub fn is_background(p: f64) -> bool {
        p == BACKGROUND
    }
}

/// 垂直切片的默认物理分辨率, 以毫米为单位.
pub const PATCH_RESOLUTION_MM: f64 = 0.5;

/// 垂直切片的默认半边长, 以毫米为单位.
pub const PATCH_HALF_SIZE_MM: f64 = 20.0;

/// 中心线点数相对于 z 方向切片个数的过采样倍率.
pub const CENTERLINE_OVERSAMPLING: usize = 5;

/// 默认平滑因子, 以毫米为单位.
pub const SMOOTHING_FACTOR_MM: f64 = 5.0;

/// 假设的脊髓最大半径, 以毫米为单位. 决定对称性采样网格的大小.
pub const MAX_CORD_RADIUS_MM: f64 = 8.0;

/// 没有分辨率信息时, 对称性采样网格半边长相对于长轴长度的倍率.
pub const SYMMETRY_GRID_MAJOR_RATIO: f64 = 2.4;

/// 对称性采样网格的步长, 以像素为单位.
pub const SYMMETRY_GRID_STEP: f64 = 0.25;

/// 长轴被视为左右 (RL) 方向的朝向上限, 以度为单位 (开区间).
pub const RL_ORIENTATION_LIMIT: f64 = 45.0;

