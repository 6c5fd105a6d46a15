//! 体素坐标与物理 (世界) 坐标之间的仿射变换, 以及图像方向.
//!
//! 体素坐标统一按照 nifti 惯例的 `[i, j, k]` (即 \[w, h, z\]) 顺序组织,
//! 物理坐标按照 nifti 的 RAS+ 世界坐标系组织, 以毫米为单位.

use std::fmt;

use nalgebra::{Matrix4, Vector3, Vector4};
use nifti::NiftiHeader;

/// 4 x 4 齐次仿射矩阵, 最后一行恒为 `[0, 0, 0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    m: Matrix4<f64>,
}

impl From<Matrix4<f64>> for Affine {
    #[inline]
    fn from(m: Matrix4<f64>) -> Self {
        Self { m }
    }
}

impl Affine {
    /// 由前三行构造. 第四列为平移量.
    pub fn new(rows: [[f64; 4]; 3]) -> Self {
        let mut m = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                m[(r, c)] = v;
            }
        }
        Self { m }
    }

    /// 对角仿射矩阵, 无旋转无平移.
    #[inline]
    pub fn diagonal([dx, dy, dz]: [f64; 3]) -> Self {
        Self::from(Matrix4::new_nonuniform_scaling(&Vector3::new(dx, dy, dz)))
    }

    /// 按照 nifti 标准从 header 中读取仿射矩阵.
    ///
    /// 优先使用 sform; 其次是 qform; 两者都不可用时,
    /// 退化为由 `dim` 与 `pixdim` 构成的默认矩阵.
    #[inline]
    pub fn from_header(h: &NiftiHeader) -> Self {
        Self::from(h.affine::<f64>())
    }

    /// 获取底层矩阵.
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// 获取体素轴 `axis` 对应的列向量, 即该轴增长一个体素时物理坐标的变化量.
    /// `axis == 3` 时为平移量.
    #[inline]
    pub fn column(&self, axis: usize) -> Vector3<f64> {
        Vector3::new(self.m[(0, axis)], self.m[(1, axis)], self.m[(2, axis)])
    }

    /// 获取平移量.
    #[inline]
    pub fn translation(&self) -> Vector3<f64> {
        self.column(3)
    }

    /// 将体素坐标 `[i, j, k]` 变换为物理坐标.
    #[inline]
    pub fn apply(&self, [i, j, k]: [f64; 3]) -> [f64; 3] {
        let p = self.m * Vector4::new(i, j, k, 1.0);
        [p.x, p.y, p.z]
    }

    /// 求逆变换. 矩阵奇异时返回 `None`.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.m.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        self.m.try_inverse().map(Self::from)
    }

    /// 获取该仿射矩阵所描述的图像方向.
    pub fn orientation(&self) -> Orientation {
        // 贪心地把每个体素轴分配给与其最接近平行的世界坐标轴.
        let mut pairs = Vec::with_capacity(9);
        for voxel in 0..3 {
            let col = self.column(voxel);
            for (world, v) in col.iter().enumerate() {
                pairs.push((v.abs(), voxel, world, v.is_sign_negative()));
            }
        }
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut codes = [None; 3];
        let mut used = [false; 3];
        for (_, voxel, world, negative) in pairs {
            if codes[voxel].is_some() || used[world] {
                continue;
            }
            used[world] = true;
            codes[voxel] = Some(AxisCode::from_world(world, negative));
        }
        // 每个体素轴都必然被分配到一个世界轴.
        Orientation(codes.map(|c| c.unwrap_or(AxisCode::R)))
    }
}

/// 单个体素轴的方向. 以字母表示该轴 **起始** 的解剖方位,
/// 例如 `R` 代表索引增长时从右 (Right) 走向左.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AxisCode {
    /// 右 -> 左, 世界 -x 方向.
    R,
    /// 左 -> 右, 世界 +x 方向.
    L,
    /// 后 -> 前, 世界 +y 方向.
    P,
    /// 前 -> 后, 世界 -y 方向.
    A,
    /// 下 -> 上, 世界 +z 方向.
    I,
    /// 上 -> 下, 世界 -z 方向.
    S,
}

impl AxisCode {
    #[inline]
    fn from_world(world: usize, negative: bool) -> Self {
        match (world, negative) {
            (0, true) => Self::R,
            (0, false) => Self::L,
            (1, false) => Self::P,
            (1, true) => Self::A,
            (2, false) => Self::I,
            _ => Self::S,
        }
    }

    /// 该方向对应的世界坐标轴, 0/1/2 分别对应 x/y/z.
    #[inline]
    pub fn world_axis(&self) -> usize {
        match self {
            Self::R | Self::L => 0,
            Self::P | Self::A => 1,
            Self::I | Self::S => 2,
        }
    }

    /// 索引增长时是否朝向世界坐标轴负方向.
    #[inline]
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::R | Self::A | Self::S)
    }

    /// 方向字母.
    #[inline]
    pub fn letter(&self) -> char {
        match self {
            Self::R => 'R',
            Self::L => 'L',
            Self::P => 'P',
            Self::A => 'A',
            Self::I => 'I',
            Self::S => 'S',
        }
    }
}

/// 三维图像方向, 依次对应体素轴 `i`, `j`, `k`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Orientation(pub [AxisCode; 3]);

impl Orientation {
    /// 右->左, 后->前, 下->上.
    pub const RPI: Self = Self([AxisCode::R, AxisCode::P, AxisCode::I]);

    /// 获取各轴方向.
    #[inline]
    pub fn codes(&self) -> [AxisCode; 3] {
        self.0
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in self.0.iter() {
            write!(f, "{}", code.letter())?;
        }
        Ok(())
    }
}
