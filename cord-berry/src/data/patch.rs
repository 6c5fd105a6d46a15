//! 垂直于中心线的二维切片.

use std::collections::{HashSet, VecDeque};
use std::ops::Index;

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::gray::*;
use crate::neighbour::neighbour8_within;
use crate::{Area2d, Areas2d, Idx2d, Idx2dF};

/// 拥有所有权的二维切片. 像素值以 `f64` 保存, 非零值为前景.
///
/// 轴 0 (高) 对应中心线局部坐标系的第一个平面方向 (左右方向),
/// 轴 1 (宽) 对应第二个平面方向 (前后方向).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    data: Array2<f64>,
}

impl Index<Idx2d> for Patch {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

// 仅供测试构造切片使用, 不属于公开 API.
#[cfg(test)]
impl std::ops::IndexMut<Idx2d> for Patch {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl From<Array2<f64>> for Patch {
    #[inline]
    fn from(data: Array2<f64>) -> Self {
        Self::new(data)
    }
}

impl Patch {
    /// 直接初始化.
    #[inline]
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// 由逐像素函数生成切片.
    #[inline]
    pub fn from_shape_fn<F: FnMut(Idx2d) -> f64>(shape: Idx2d, f: F) -> Self {
        Self::new(Array2::from_shape_fn(shape, f))
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f64)> {
        self.data.indexed_iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f64> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 该图是否为全背景图?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 将值为 `value` 的像素全部置为背景. 返回总共替换的个数.
    ///
    /// 用于清除采样时填充在体数据范围外的值.
    pub fn zero_out(&mut self, value: f64) -> usize {
        let mut cnt = 0usize;
        self.data
            .iter_mut()
            .filter(|pix| **pix == value)
            .for_each(|p| {
                cnt += 1;
                *p = BACKGROUND;
            });
        cnt
    }

    /// 以最近邻方式在连续坐标 `(h, w)` 处取值, 越界处视为背景.
    #[inline]
    pub fn sample_nearest(&self, (h, w): Idx2dF) -> f64 {
        let (rh, rw) = ((h + 0.5).floor(), (w + 0.5).floor());
        if rh < 0.0 || rw < 0.0 {
            return BACKGROUND;
        }
        self.get((rh as usize, rw as usize))
            .copied()
            .unwrap_or(BACKGROUND)
    }

    /// 按照 8-相邻规则获取所有前景连通区域.
    ///
    /// 区域按照其首个像素的行优先顺序排列, 区域内像素按照 BFS 访问顺序排列.
    pub fn foreground_areas(&self) -> Areas2d {
        let mut ans = Areas2d::with_capacity(1);
        let mut bfs_q = VecDeque::with_capacity(8);
        let mut set = HashSet::with_capacity(64);
        let shape = self.shape();

        for (pos, &pixel) in self.indexed_iter() {
            if set.contains(&pos) || is_background(pixel) {
                continue;
            }
            bfs_q.push_back(pos);
            set.insert(pos);
            let mut this_area = Area2d::with_capacity(1);
            while let Some(cur_pos) = bfs_q.pop_front() {
                this_area.push(cur_pos);
                for next in neighbour8_within(cur_pos, shape) {
                    if is_foreground(self[next]) && set.insert(next) {
                        bfs_q.push_back(next);
                    }
                }
            }
            ans.push(this_area);
        }
        ans
    }
}
