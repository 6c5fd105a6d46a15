#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 沿脊髓中心线计算脊髓横截面的形态学量 (面积、直径、离心率、凸性、对称性等),
//! 并按原始 z 切片聚合.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 中心线拟合不在本 crate 的范围内. 调用者需提供一个 [`CenterlineFitter`].
//! 2. 在非期望情况下 (例如越界索引), 程序会直接 panic, 而不会导致内存错误.
//!   可预期的错误 (文件读取失败、椎间盘标记非法等) 通过 [`ShapeError`] 返回.
//!
//! # 开发计划
//!
//! ### nii 体数据读取与 RPI 方向转换 ✅
//!
//! 支持 sform / qform / pixdim 三种仿射信息来源.
//!
//! 实现位于 `cord-berry/src/data`.
//!
//! ### 二维区域描述量 ✅
//!
//! 8-相邻连通区域, 矩, 长短轴, 欧拉数, 周长, 凸性, 基于 Dice 的左右对称性.
//!
//! 实现位于 `cord-berry/src/region`.
//!
//! ### 中心线垂直切片与椎体分布 ✅
//!
//! 实现位于 `cord-berry/src/centerline`.
//!
//! ### 过采样序列, Hann 窗平滑, 按切片聚合 ✅
//!
//! 实现位于 `cord-berry/src/shape`.
//!
//! ### 并行计算 ✅
//!
//! `rayon` feature 下逐点并行提取切片.
//!
//! ### x/y 分辨率不同的切片 ⌛️
//!
//! 目前长度类形态学量只按 x 方向分辨率缩放.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引 (z, h, w), 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 高精度通用二维坐标 / 向量.
pub type Idx2dF = (f64, f64);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// nii 体数据与二维切片.
pub mod data;

pub use data::{Affine, Border, Interpolation, NiftiHeaderAttr, Orientation, Patch, SegVolume};

pub mod centerline;
pub mod consts;
pub mod error;
mod neighbour;
pub mod prelude;
pub mod region;
pub mod shape;

pub use centerline::{CenterlineFitter, CenterlineSampler};
pub use error::{ShapeError, ShapeResult};
