//! 二维连通区域的形态学描述量.
//!
//! 在垂直切片上找到面积最大的前景连通区域 (8-相邻), 并计算其面积、
//! 长短轴、离心率、凸性、对称性等描述量.

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CORD_RADIUS_MM, SYMMETRY_GRID_MAJOR_RATIO};
use crate::data::Patch;
use crate::{Area2d, Idx2dF};

mod axis;
mod convex;
mod moments;
mod symmetry;
mod topology;

pub use axis::{disambiguate, OrientedProps};
pub use moments::Moments;

/// 包围盒 `(min_row, min_col, max_row + 1, max_col + 1)`.
pub type BBox = (usize, usize, usize, usize);

/// 单个连通区域: 像素列表, 包围盒与包围盒内的局部掩膜.
#[derive(Debug, Clone)]
pub(crate) struct Region {
    pixels: Area2d,
    bbox: BBox,
    mask: Array2<bool>,
}

impl Region {
    /// 由非空像素列表构造.
    pub(crate) fn new(pixels: Area2d) -> Self {
        debug_assert!(!pixels.is_empty(), "区域不能为空");
        let (mut r0, mut c0, mut r1, mut c1) = (usize::MAX, usize::MAX, 0, 0);
        for &(r, c) in pixels.iter() {
            r0 = r0.min(r);
            c0 = c0.min(c);
            r1 = r1.max(r + 1);
            c1 = c1.max(c + 1);
        }
        let mut mask = Array2::from_elem((r1 - r0, c1 - c0), false);
        for &(r, c) in pixels.iter() {
            mask[(r - r0, c - c0)] = true;
        }
        Self {
            pixels,
            bbox: (r0, c0, r1, c1),
            mask,
        }
    }

    /// 像素个数.
    #[inline]
    pub(crate) fn area(&self) -> usize {
        self.pixels.len()
    }

    /// 包围盒.
    #[inline]
    pub(crate) fn bbox(&self) -> BBox {
        self.bbox
    }

    /// 包围盒内的局部掩膜.
    #[inline]
    pub(crate) fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// 以包围盒左上角为原点的像素坐标.
    #[inline]
    pub(crate) fn local_pixels(&self) -> impl Iterator<Item = Idx2dF> + '_ {
        let (r0, c0, ..) = self.bbox;
        self.pixels
            .iter()
            .map(move |&(r, c)| ((r - r0) as f64, (c - c0) as f64))
    }

    /// 四周各补一圈背景后的局部掩膜.
    pub(crate) fn padded_mask(&self) -> Array2<bool> {
        let (h, w) = self.mask.dim();
        let mut padded = Array2::from_elem((h + 2, w + 2), false);
        for ((r, c), &m) in self.mask.indexed_iter() {
            padded[(r + 1, c + 1)] = m;
        }
        padded
    }
}

/// 单个区域的全部描述量. 长度以像素为单位, 除非提供了分辨率.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionProps {
    /// 面积. 提供分辨率时以平方毫米为单位.
    pub area: f64,

    /// 包围盒.
    pub bbox: BBox,

    /// 质心 (行, 列).
    pub centroid: Idx2dF,

    /// 与区域具有相同二阶矩的椭圆的离心率, 位于 `[0, 1)`.
    pub eccentricity: f64,

    /// 与区域面积相同的圆的直径.
    pub equivalent_diameter: f64,

    /// 欧拉数 (连通体个数减去孔洞个数).
    pub euler_number: i32,

    /// 惯性张量.
    pub inertia_tensor: [[f64; 2]; 2],

    /// 惯性张量特征值, 降序.
    pub inertia_tensor_eigvals: [f64; 2],

    /// 等效椭圆短轴长度.
    pub minor_axis_length: f64,

    /// 等效椭圆长轴长度.
    pub major_axis_length: f64,

    /// 原始矩, 以包围盒左上角为原点, 至三阶.
    pub moments: Moments,

    /// 中心矩, 至三阶.
    pub moments_central: Moments,

    /// 切片轴 0 与长轴之间的夹角, 以度为单位, 位于 `(-90, 90]`.
    pub orientation: f64,

    /// 周长 (像素单位, 不随分辨率缩放).
    pub perimeter: f64,

    /// 短轴与长轴之比. 长轴为 0 时为 0.
    pub ratio_minor_major: f64,

    /// 面积与凸包面积之比.
    pub solidity: f64,

    /// 左右对称性, 位于 `[0, 1]`.
    pub symmetry: f64,
}

/// 提取切片上最大前景连通区域的描述量.
///
/// 不存在前景时返回 `None`. 多个区域面积相同时, 取按行优先序最后发现的那一个.
///
/// 提供分辨率 `(rx, ry)` (毫米每像素) 时, 面积乘以 `rx * ry`,
/// 等效直径与长短轴乘以 `rx`.
///
/// # 注意
///
/// 目前假设两个方向的分辨率相同, `ry` 只参与面积缩放.
pub fn extract(patch: &Patch, resolution: Option<(f64, f64)>) -> Option<RegionProps> {
    // `max_by_key` 在存在多个最大值时返回最后一个.
    let cord = patch.foreground_areas().into_iter().max_by_key(Vec::len)?;
    let region = Region::new(cord);
    let (r0, c0, ..) = region.bbox();

    let m = moments::raw(&region);
    let area = m[0][0];
    let local_centroid = (m[1][0] / area, m[0][1] / area);
    let mu = moments::central(&region, local_centroid);
    let second = moments::SecondOrder::from_central(&mu);

    let [l1, l2] = second.eigvals();
    let major_axis_length = 4.0 * l1.sqrt();
    let minor_axis_length = 4.0 * l2.sqrt();
    let orientation = second.orientation();
    let centroid = (local_centroid.0 + r0 as f64, local_centroid.1 + c0 as f64);

    let size_grid = match resolution {
        Some((rx, _)) => MAX_CORD_RADIUS_MM / rx,
        None => (SYMMETRY_GRID_MAJOR_RATIO * major_axis_length).trunc(),
    };
    let symmetry = symmetry::dice_symmetry(patch, centroid, orientation, size_grid);

    let mut props = RegionProps {
        area,
        bbox: region.bbox(),
        centroid,
        eccentricity: if l1 == 0.0 {
            0.0
        } else {
            (1.0 - l2 / l1).max(0.0).sqrt()
        },
        equivalent_diameter: (4.0 * area / std::f64::consts::PI).sqrt(),
        euler_number: topology::euler_number(&region),
        inertia_tensor: second.inertia_tensor(),
        inertia_tensor_eigvals: [l1, l2],
        minor_axis_length,
        major_axis_length,
        moments: m,
        moments_central: mu,
        orientation: orientation.to_degrees(),
        perimeter: topology::perimeter(&region),
        ratio_minor_major: if major_axis_length == 0.0 {
            0.0
        } else {
            minor_axis_length / major_axis_length
        },
        solidity: area / convex::convex_area(&region) as f64,
        symmetry,
    };
    if let Some((rx, ry)) = resolution {
        props.area *= rx * ry;
        props.equivalent_diameter *= rx;
        props.major_axis_length *= rx;
        props.minor_axis_length *= rx;
    }
    Some(props)
}
