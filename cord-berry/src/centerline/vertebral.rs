//! 椎间盘标记与椎体分布.

use log::info;
use num::ToPrimitive;
use ordered_float::NotNan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::CenterlineSampler;
use crate::data::SegVolume;
use crate::error::{ShapeError, ShapeResult};

/// 单个椎间盘标记: 物理位置与椎体编号.
///
/// 编号 `n` 代表第 `n` 节椎体与其下一节之间的椎间盘, 见 [`disc_label_name`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiscLandmark {
    /// 物理坐标.
    pub position: [f64; 3],

    /// 椎体编号, 正整数.
    pub label: u32,
}

impl DiscLandmark {
    /// 由体素值构造. 体素值必须为正整数.
    pub fn from_voxel(position: [f64; 3], value: f64) -> ShapeResult<Self> {
        match value.to_u32() {
            Some(label) if label > 0 && value.fract() == 0.0 => Ok(Self { position, label }),
            _ => Err(ShapeError::InvalidDiscLabel(value)),
        }
    }
}

/// 从椎间盘标记体数据中读取所有标记.
///
/// 体数据会先被转换为 RPI 方向. 结果按照 z 降序 (从头侧到尾侧) 排列.
pub fn disc_landmarks(volume: &SegVolume) -> ShapeResult<Vec<DiscLandmark>> {
    let volume = volume.to_rpi()?;
    let discs = volume
        .non_zero_desc_z()
        .into_iter()
        .map(|((z, h, w), value)| {
            DiscLandmark::from_voxel(volume.pix2phys([w as f64, h as f64, z as f64]), value as f64)
        })
        .collect::<ShapeResult<Vec<_>>>()?;
    if discs.is_empty() {
        return Err(ShapeError::NoDiscLabel);
    }
    info!("found {} disc landmarks", discs.len());
    Ok(discs)
}

/// 椎体名称: 1-7 为颈椎, 8-19 为胸椎, 20-24 为腰椎, 25-29 为骶椎, 30 为尾椎.
fn vertebra_name(level: u32) -> Option<String> {
    match level {
        1..=7 => Some(format!("C{level}")),
        8..=19 => Some(format!("T{}", level - 7)),
        20..=24 => Some(format!("L{}", level - 19)),
        25..=29 => Some(format!("S{}", level - 24)),
        30 => Some("Co".to_string()),
        _ => None,
    }
}

/// 编号 `level` 对应的椎间盘名称, 即该椎体与其下一节椎体之间的椎间盘.
/// 另有两个特殊标记: 50 为脑桥 (`PONS`), 51 为延髓 (`MO`).
///
/// 未知编号返回 `None`.
pub fn disc_label_name(level: u32) -> Option<String> {
    match level {
        50 => Some("PONS".to_string()),
        51 => Some("MO".to_string()),
        _ => Some(format!(
            "{}/{}",
            vertebra_name(level)?,
            vertebra_name(level + 1)?
        )),
    }
}

/// 中心线上每个点的椎体分布.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertebralDistribution {
    /// 每个点到最上方椎间盘 (通常是 C1) 的有符号弧长.
    distance_from_c1: Vec<f64>,

    /// 每个点所属的椎体编号.
    vertebral_level: Vec<u32>,

    /// 每个椎间盘 (按 z 降序) 的编号及其到最上方椎间盘的有符号弧长.
    disc_distance: Vec<(u32, f64)>,
}

impl VertebralDistribution {
    /// 计算椎体分布.
    ///
    /// 椎间盘按照 z 降序排列后, 每个椎间盘被映射到离它最近的中心线点.
    /// 点 `i` 的距离为 `incremental_length[i] - incremental_length[首个椎间盘对应的点]`;
    /// 点 `i` 的椎体编号为位于其上方 (z 不小于该点) 的最近椎间盘的编号,
    /// 位于所有椎间盘上方的点取最上方椎间盘的编号.
    pub fn compute<C: CenterlineSampler + ?Sized>(
        centerline: &C,
        discs: &[DiscLandmark],
    ) -> ShapeResult<Self> {
        let n = centerline.number_of_points();
        if n == 0 {
            return Err(ShapeError::EmptyCenterline);
        }
        if discs.is_empty() {
            return Err(ShapeError::NoDiscLabel);
        }

        let mut sorted = discs.to_vec();
        sorted.sort_by(|a, b| b.position[2].total_cmp(&a.position[2]));

        let nearest = |disc: &DiscLandmark| {
            (0..n)
                .filter_map(|i| {
                    let p = centerline.point(i);
                    let d2: f64 = (0..3).map(|a| (p[a] - disc.position[a]).powi(2)).sum();
                    NotNan::new(d2).ok().map(|d| (d, i))
                })
                .min()
                .map(|(_, i)| i)
                .ok_or_else(|| {
                    ShapeError::invalid_spec(format!("椎间盘位置 {:?} 非法", disc.position))
                })
        };
        let disc_points = sorted
            .iter()
            .map(nearest)
            .collect::<ShapeResult<Vec<usize>>>()?;

        let origin = centerline.incremental_length(disc_points[0]);
        let distance_from_c1 = (0..n)
            .map(|i| centerline.incremental_length(i) - origin)
            .collect();
        let disc_distance = sorted
            .iter()
            .zip(disc_points.iter())
            .map(|(disc, &i)| (disc.label, centerline.incremental_length(i) - origin))
            .collect();
        let vertebral_level = (0..n)
            .map(|i| {
                let z = centerline.point(i)[2];
                sorted
                    .iter()
                    .take_while(|disc| disc.position[2] >= z)
                    .last()
                    .unwrap_or(&sorted[0])
                    .label
            })
            .collect();

        Ok(Self {
            distance_from_c1,
            vertebral_level,
            disc_distance,
        })
    }

    /// 点数.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertebral_level.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertebral_level.is_empty()
    }

    /// 每个点到最上方椎间盘的有符号弧长.
    #[inline]
    pub fn distance_from_c1(&self) -> &[f64] {
        &self.distance_from_c1
    }

    /// 每个点所属的椎体编号.
    #[inline]
    pub fn vertebral_level(&self) -> &[u32] {
        &self.vertebral_level
    }

    /// 每个椎间盘的编号及其到最上方椎间盘的有符号弧长.
    #[inline]
    pub fn disc_distance(&self) -> &[(u32, f64)] {
        &self.disc_distance
    }

    /// 第 `index` 个点的 (距离, 椎体编号).
    #[inline]
    pub fn at(&self, index: usize) -> (f64, u32) {
        (self.distance_from_c1[index], self.vertebral_level[index])
    }
}
