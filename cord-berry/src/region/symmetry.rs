//! 基于 Dice 系数的左右对称性.

use crate::consts::gray::is_foreground;
use crate::consts::SYMMETRY_GRID_STEP;
use crate::data::Patch;
use crate::Idx2dF;

/// 以 0 为中心、步长 [`SYMMETRY_GRID_STEP`] 的一维网格, 覆盖 `[-size_grid, size_grid]`.
///
/// 第 `k` 个与第 `n - 1 - k` 个偏移量互为相反数.
fn grid_offsets(size_grid: f64) -> Vec<f64> {
    let n = (2.0 * size_grid / SYMMETRY_GRID_STEP).ceil() as usize;
    let mid = (n as f64 - 1.0) / 2.0;
    (0..n).map(|k| (k as f64 - mid) * SYMMETRY_GRID_STEP).collect()
}

/// 计算切片关于区域长轴的对称性.
///
/// 以 `centroid` 为中心, 在半边长为 `size_grid` (像素) 、步长为
/// [`SYMMETRY_GRID_STEP`] 的方形网格上重采样切片. 网格按照 `orientation`
/// (弧度) 旋转: 网格的列沿长轴方向, 行沿短轴方向. 重采样使用最近邻,
/// 切片外视为背景.
///
/// 网格按列对半分为左右两半, 右半镜像后与左半求 Dice 系数
/// `2 |L ∩ R| / (|L| + |R|)`. 两半都为空时返回 0.
pub(super) fn dice_symmetry(patch: &Patch, centroid: Idx2dF, orientation: f64, size_grid: f64) -> f64 {
    if size_grid.is_nan() || size_grid <= 0.0 {
        return 0.0;
    }
    let grid = grid_offsets(size_grid);
    let n = grid.len();
    let half = n / 2;

    let (sin, cos) = orientation.sin_cos();
    let major = (cos, sin);
    let minor = (-sin, cos);
    let (r0, c0) = centroid;

    let mut intersection = 0usize;
    let mut left_sum = 0usize;
    let mut right_sum = 0usize;
    for row in 0..n {
        let v = grid[row];
        let is_fg = |col: usize| {
            let u = grid[col];
            let pos = (r0 + u * major.0 + v * minor.0, c0 + u * major.1 + v * minor.1);
            is_foreground(patch.sample_nearest(pos))
        };
        // 奇数列时中间一列只属于右半, 不参与比较.
        for col in 0..half {
            let left = is_fg(col);
            let right = is_fg(n - 1 - col);
            left_sum += left as usize;
            right_sum += right as usize;
            intersection += (left && right) as usize;
        }
    }

    let denom = left_sum + right_sum;
    if denom == 0 {
        0.0
    } else {
        2.0 * intersection as f64 / denom as f64
    }
}
