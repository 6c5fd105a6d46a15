use std::ops::Index;
use std::path::Path;

use log::{debug, info};
use nalgebra::Matrix4;
use ndarray::{Array3, ArrayView, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::error::{ShapeError, ShapeResult};
use crate::Idx3d;

pub mod affine;
pub mod patch;
pub mod resample;

pub use affine::{Affine, AxisCode, Orientation};
pub use patch::Patch;
pub use resample::{Border, Interpolation};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高, 宽.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取 header 记录的 体素 -> 物理坐标 仿射变换.
    #[inline]
    fn affine(&self) -> Affine {
        Affine::from_header(self.header())
    }

    /// 获取图像方向, 例如 `RPI`.
    #[inline]
    fn orientation(&self) -> Orientation {
        self.affine().orientation()
    }
}

/// nii 格式 3D 脊髓分割 (或椎间盘标记) 体数据, 包括 header 和体素值.
/// 体素值以 `f32` 保存, 任何非零值都被视为前景.
///
/// 内部数据按照 (z, h, w) 组织, 其中 z/h/w 分别对应 nifti 的 k/j/i 轴.
#[derive(Debug, Clone)]
pub struct SegVolume {
    header: BoxedHeader,
    data: Array3<f32>,

    /// 体素坐标 -> 物理坐标.
    affine: Affine,

    /// 物理坐标 -> 体素坐标.
    inverse: Affine,
}

impl NiftiHeaderAttr for SegVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn affine(&self) -> Affine {
        self.affine
    }
}

impl Index<Idx3d> for SegVolume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

/// 检查 header 是否描述一个三维体数据.
fn check_volume_dim(header: &NiftiHeader) -> ShapeResult<()> {
    let ndim = header.dim[0] as usize;
    // 允许尾部长度为 1 的维度.
    let trailing = header.dim.iter().skip(4).take(ndim.saturating_sub(3));
    if !(3..=7).contains(&ndim) || trailing.copied().any(|d| d > 1) {
        return Err(ShapeError::NotVolume(ndim));
    }
    Ok(())
}

impl SegVolume {
    /// 由 header 与 (z, h, w) 数据组装, 并缓存仿射变换.
    fn assemble(header: BoxedHeader, data: Array3<f32>) -> ShapeResult<Self> {
        let affine = Affine::from_header(&header);
        let inverse = affine.inverse().ok_or(ShapeError::SingularAffine)?;
        Ok(Self {
            header,
            data,
            affine,
            inverse,
        })
    }

    /// 打开 nii 文件格式的 3D 体数据. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> ShapeResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        check_volume_dim(&header)?;

        let mut data = obj.into_volume().into_ndarray::<f32>()?;
        while data.ndim() > 3 {
            let last = Axis(data.ndim() - 1);
            data = data.index_axis_move(last, 0);
        }

        // [W, H, z] -> [z, H, W].
        let data = data.permuted_axes([2, 1, 0].as_slice());

        let data = data
            .as_standard_layout()
            .into_owned()
            .into_shape(get_shape_from_header(&header))
            .map_err(|e| ShapeError::invalid_spec(format!("体数据形状与 header 不符: {e}")))?;

        debug!(
            "opened volume {:?} with shape {:?}",
            path.as_ref(),
            get_shape_from_header(&header)
        );
        Self::assemble(header, data)
    }

    /// 根据裸数据和仿射变换直接创建 `SegVolume` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `affine` 为 体素 `[i, j, k]` -> 物理坐标 的变换, 会写入 header.
    ///   `pixdim` 由仿射矩阵各列的长度给出.
    ///
    /// 仿射矩阵奇异时返回 `Err`.
    pub fn fake(data: Array3<f32>, affine: Affine) -> ShapeResult<Self> {
        if affine.inverse().is_none() {
            return Err(ShapeError::SingularAffine);
        }
        let (w, h, z) = data.dim();
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
        write_affine(&mut header, &affine);
        Self::assemble(header, data)
    }

    /// 获得数据的一份不可变 shallow copy. 数据按照 (z, h, w) 组织.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 将体素坐标 `[i, j, k]` (可以是非整数) 变换为物理坐标.
    #[inline]
    pub fn pix2phys(&self, ijk: [f64; 3]) -> [f64; 3] {
        self.affine.apply(ijk)
    }

    /// 将 (z, h, w) 索引处的体素中心变换为物理坐标.
    #[inline]
    pub fn idx2phys(&self, (z, h, w): Idx3d) -> [f64; 3] {
        self.pix2phys([w as f64, h as f64, z as f64])
    }

    /// 将物理坐标变换为连续的体素坐标 `[i, j, k]`.
    #[inline]
    pub fn phys2pix(&self, xyz: [f64; 3]) -> [f64; 3] {
        self.inverse.apply(xyz)
    }

    /// 将物理坐标变换为四舍五入后的整数体素坐标 `[i, j, k]`. 结果可能越界.
    #[inline]
    pub fn phys2pix_rounded(&self, xyz: [f64; 3]) -> [i64; 3] {
        self.phys2pix(xyz).map(|v| v.round() as i64)
    }

    /// 收集所有非零体素的 (z, h, w) 索引与值, 并按照 z 降序排列.
    /// z 相同时保持行优先序.
    pub fn non_zero_desc_z(&self) -> Vec<(Idx3d, f32)> {
        let mut ans: Vec<(Idx3d, f32)> = self
            .data
            .indexed_iter()
            .filter_map(|(pos, &p)| is_foreground(p as f64).then_some((pos, p)))
            .collect();
        ans.sort_by(|a, b| b.0 .0.cmp(&a.0 .0));
        ans
    }

    /// 将体数据重排为 RPI 方向 (右->左, 后->前, 下->上), 并同步更新 header
    /// 中的维度、分辨率与仿射矩阵. 已经是 RPI 方向时仅做一次拷贝.
    ///
    /// 重排前后, 同一个物理位置上的体素值保持不变.
    pub fn to_rpi(&self) -> ShapeResult<Self> {
        let from = self.orientation();
        if from == Orientation::RPI {
            return Ok(self.clone());
        }
        info!("reorienting volume from {from} to RPI");

        let codes = from.codes();
        // src[n]: 新体素轴 n 取自哪个旧体素轴.
        let mut src = [0usize; 3];
        for (voxel, code) in codes.iter().enumerate() {
            src[code.world_axis()] = voxel;
        }
        let targets = Orientation::RPI.codes();
        let flip: [bool; 3] =
            std::array::from_fn(|n| codes[src[n]].is_negative() != targets[n].is_negative());

        // (z, h, w) -> (i, j, k) -> 新 (i, j, k).
        let mut ijk = self.data.view().permuted_axes([2, 1, 0]);
        ijk = ijk.permuted_axes(src);
        for (n, &f) in flip.iter().enumerate() {
            if f {
                ijk.invert_axis(Axis(n));
            }
        }
        let data = ijk.permuted_axes([2, 1, 0]).as_standard_layout().into_owned();

        // 新的仿射矩阵.
        let (z, h, w) = self.shape();
        let old_dim = [w, h, z];
        let mut m = Matrix4::identity();
        let mut t = self.affine.translation();
        for (n, &s) in src.iter().enumerate() {
            let mut col = self.affine.column(s);
            if flip[n] {
                t += col * (old_dim[s] as f64 - 1.0);
                col = -col;
            }
            for r in 0..3 {
                m[(r, n)] = col[r];
            }
        }
        for r in 0..3 {
            m[(r, 3)] = t[r];
        }
        let affine = Affine::from(m);

        let mut header = self.header.clone();
        let old_dims = header.dim;
        for n in 0..3 {
            header.dim[n + 1] = old_dims[src[n] + 1];
        }
        write_affine(&mut header, &affine);

        debug_assert_eq!(affine.orientation(), Orientation::RPI);
        Self::assemble(header, data)
    }
}

/// 把仿射矩阵写入 header (sform 与 qform), 同时更新 `pixdim`.
fn write_affine(header: &mut NiftiHeader, affine: &Affine) {
    header.set_affine(affine.matrix());
    for axis in 0..3 {
        header.pixdim[axis + 1] = affine.column(axis).norm() as f32;
    }
}
