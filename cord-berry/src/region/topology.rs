//! 欧拉数与周长.

use std::f64::consts::SQRT_2;

use ndarray::Array2;

use super::Region;
use crate::neighbour::neighbour4;

/// 以 8-连通规则计算区域图像的欧拉数 (连通体个数减去孔洞个数).
///
/// 使用 bit-quad 计数: `E = (Q1 - Q3 - 2 * QD) / 4`, 其中 `Q1`/`Q3` 为恰含 1/3
/// 个前景像素的 2x2 窗口个数, `QD` 为仅含一对对角前景像素的窗口个数.
pub(super) fn euler_number(region: &Region) -> i32 {
    let padded = region.padded_mask();
    let (h, w) = padded.dim();
    let (mut q1, mut q3, mut qd) = (0i32, 0i32, 0i32);
    for r in 0..h - 1 {
        for c in 0..w - 1 {
            let quad = [
                padded[(r, c)],
                padded[(r, c + 1)],
                padded[(r + 1, c)],
                padded[(r + 1, c + 1)],
            ];
            match quad.iter().filter(|&&b| b).count() {
                1 => q1 += 1,
                3 => q3 += 1,
                2 if quad[0] == quad[3] => qd += 1,
                _ => {}
            }
        }
    }
    (q1 - q3 - 2 * qd) / 4
}

/// 像素编码对应的周长权重.
///
/// 编码为 边界像素 与其边界邻居 在核 `[[10, 2, 10], [2, 1, 2], [10, 2, 10]]`
/// 下的卷积值.
#[inline]
fn perimeter_weight(code: u32) -> f64 {
    match code {
        5 | 7 | 15 | 17 | 25 | 27 => 1.0,
        21 | 33 => SQRT_2,
        13 | 23 => (1.0 + SQRT_2) / 2.0,
        _ => 0.0,
    }
}

/// 以 4-相邻规则估计区域周长.
///
/// 边界像素为区域减去其 4-邻域腐蚀的结果. 每个边界像素按照其边界邻居的
/// 构型计权: 直线段为 1, 对角段为 `sqrt(2)`, 拐角为 `(1 + sqrt(2)) / 2`.
pub(super) fn perimeter(region: &Region) -> f64 {
    let padded = region.padded_mask();
    let (h, w) = padded.dim();

    let border = Array2::from_shape_fn((h, w), |pos| {
        padded[pos]
            && neighbour4(pos)
                .into_iter()
                .any(|(nr, nc)| nr >= h || nc >= w || !padded[(nr, nc)])
    });

    const KERNEL: [[u32; 3]; 3] = [[10, 2, 10], [2, 1, 2], [10, 2, 10]];
    let mut total = 0.0;
    // 补边后最外圈一定是背景.
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if !border[(r, c)] {
                continue;
            }
            let mut code = 0u32;
            for (dr, krow) in KERNEL.iter().enumerate() {
                for (dc, k) in krow.iter().enumerate() {
                    if border[(r + dr - 1, c + dc - 1)] {
                        code += k;
                    }
                }
            }
            total += perimeter_weight(code);
        }
    }
    total
}
