use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::CenterlineSampler;
use crate::error::{ShapeError, ShapeResult};

#[inline]
fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// 由拟合点与导数构成的离散中心线.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Centerline {
    points: Vec<[f64; 3]>,
    derivatives: Vec<[f64; 3]>,

    /// 相邻点间距, 首元素为 0.
    progressive_length: Vec<f64>,

    /// 累计弧长, 首元素为 0.
    incremental_length: Vec<f64>,
}

impl Centerline {
    /// 由点与对应的导数构造. 两者长度必须相同, 且不能为空.
    pub fn new(points: Vec<[f64; 3]>, derivatives: Vec<[f64; 3]>) -> ShapeResult<Self> {
        if points.is_empty() {
            return Err(ShapeError::EmptyCenterline);
        }
        if points.len() != derivatives.len() {
            return Err(ShapeError::invalid_spec(format!(
                "中心线点数 ({}) 与导数个数 ({}) 不一致",
                points.len(),
                derivatives.len()
            )));
        }

        let mut progressive_length = Vec::with_capacity(points.len());
        progressive_length.push(0.0);
        progressive_length.extend(points.iter().tuple_windows().map(|(a, b)| distance(a, b)));

        let incremental_length = progressive_length
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect();

        Ok(Self {
            points,
            derivatives,
            progressive_length,
            incremental_length,
        })
    }

    /// 仅由点构造, 导数由有限差分估计 (内部点使用中心差分, 端点使用单侧差分).
    pub fn from_points(points: Vec<[f64; 3]>) -> ShapeResult<Self> {
        let n = points.len();
        let derivatives = (0..n)
            .map(|i| {
                let (lo, hi) = (i.saturating_sub(1), (i + 1).min(n - 1));
                if lo == hi {
                    [0.0, 0.0, 1.0]
                } else {
                    std::array::from_fn(|a| (points[hi][a] - points[lo][a]) / (hi - lo) as f64)
                }
            })
            .collect();
        Self::new(points, derivatives)
    }

    /// 所有点.
    #[inline]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// 所有导数.
    #[inline]
    pub fn derivatives(&self) -> &[[f64; 3]] {
        &self.derivatives
    }

    /// 中心线总长度.
    #[inline]
    pub fn total_length(&self) -> f64 {
        self.incremental_length.last().copied().unwrap_or(0.0)
    }
}

impl CenterlineSampler for Centerline {
    #[inline]
    fn number_of_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    fn point(&self, index: usize) -> [f64; 3] {
        self.points[index]
    }

    #[inline]
    fn tangent(&self, index: usize) -> [f64; 3] {
        self.derivatives[index]
    }

    #[inline]
    fn incremental_length(&self, index: usize) -> f64 {
        self.incremental_length[index]
    }

    #[inline]
    fn progressive_length(&self) -> &[f64] {
        &self.progressive_length
    }
}
