//! 脊髓中心线.
//!
//! 中心线拟合本身不在本 crate 的范围内, 它由实现了 [`CenterlineFitter`]
//! 的协作者提供. 本模块负责在已拟合的中心线上计算弧长、
//! 提取垂直切片和椎体分布.

use crate::data::{Border, Interpolation, Patch, SegVolume};
use crate::error::ShapeResult;

mod curve;
mod frame;
mod vertebral;

pub use curve::Centerline;
pub use frame::PlaneBasis;
pub use vertebral::{disc_label_name, disc_landmarks, DiscLandmark, VertebralDistribution};

/// 能在中心线上取点、取弧长并提取垂直切片的对象.
///
/// 点与切向量都位于物理坐标系 (毫米) 中.
pub trait CenterlineSampler {
    /// 中心线点数.
    fn number_of_points(&self) -> usize;

    /// 第 `index` 个点的物理坐标.
    fn point(&self, index: usize) -> [f64; 3];

    /// 第 `index` 个点处的切向量, 不必归一化.
    fn tangent(&self, index: usize) -> [f64; 3];

    /// 从首点到第 `index` 个点的累计弧长.
    fn incremental_length(&self, index: usize) -> f64;

    /// 相邻点间距. 第一个元素恒为 0, 长度与点数相同.
    fn progressive_length(&self) -> &[f64];

    /// 相邻点平均间距 (包含第一个 0 元素). 中心线为空时返回 0.
    fn mean_progressive_length(&self) -> f64 {
        let lengths = self.progressive_length();
        if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<f64>() / lengths.len() as f64
        }
    }

    /// 提取第 `index` 个点处垂直于中心线的方形切片.
    ///
    /// 切片覆盖平面坐标 `[-half_size, half_size)` (毫米), 像素间距为
    /// `resolution` (毫米). 轴 0 沿 [`PlaneBasis::u`], 轴 1 沿 [`PlaneBasis::v`].
    /// 越界时 `index` 会导致 panic.
    fn extract_perpendicular_square(
        &self,
        volume: &SegVolume,
        index: usize,
        half_size: f64,
        resolution: f64,
        interpolation: Interpolation,
        border: Border,
    ) -> Patch {
        frame::perpendicular_square(
            volume,
            self.point(index),
            self.tangent(index),
            half_size,
            resolution,
            interpolation,
            border,
        )
    }

    /// 根据椎间盘标记计算中心线上每个点的椎体分布.
    fn compute_vertebral_distribution(
        &self,
        discs: &[DiscLandmark],
    ) -> ShapeResult<VertebralDistribution> {
        VertebralDistribution::compute(self, discs)
    }

    /// 椎体编号对应的椎间盘名称, 未知编号返回 `None`.
    #[inline]
    fn disc_label_name(&self, level: u32) -> Option<String> {
        disc_label_name(level)
    }
}

/// 中心线拟合器.
///
/// 任何形如 `Fn(&SegVolume, usize) -> ShapeResult<C>` 的闭包都是拟合器.
pub trait CenterlineFitter {
    /// 拟合结果.
    type Centerline: CenterlineSampler;

    /// 在 (已转换为 RPI 方向的) 分割体数据上拟合出含 `number_of_points`
    /// 个点的中心线.
    fn fit(&self, volume: &SegVolume, number_of_points: usize) -> ShapeResult<Self::Centerline>;
}

impl<F, C> CenterlineFitter for F
where
    F: Fn(&SegVolume, usize) -> ShapeResult<C>,
    C: CenterlineSampler,
{
    type Centerline = C;

    #[inline]
    fn fit(&self, volume: &SegVolume, number_of_points: usize) -> ShapeResult<C> {
        self(volume, number_of_points)
    }
}
