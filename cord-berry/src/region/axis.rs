//! 长短轴到解剖方向 (左右 RL / 前后 AP) 的分配.

use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::RegionProps;
use crate::consts::RL_ORIENTATION_LIMIT;

/// 带有解剖方向直径的区域描述量. 由 [`disambiguate`] 一次性生成.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientedProps {
    props: RegionProps,
    rl_diameter: f64,
    ap_diameter: f64,
}

impl OrientedProps {
    /// 左右方向直径.
    #[inline]
    pub fn rl_diameter(&self) -> f64 {
        self.rl_diameter
    }

    /// 前后方向直径.
    #[inline]
    pub fn ap_diameter(&self) -> f64 {
        self.ap_diameter
    }

    /// 原始区域描述量.
    #[inline]
    pub fn props(&self) -> &RegionProps {
        &self.props
    }

    /// 取回原始区域描述量.
    #[inline]
    pub fn into_props(self) -> RegionProps {
        self.props
    }
}

impl Deref for OrientedProps {
    type Target = RegionProps;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.props
    }
}

/// 根据朝向把长短轴分配到左右与前后方向.
///
/// 切片轴 0 为左右方向. 朝向严格位于 `(-45, 45)` 度时长轴为左右直径,
/// 否则长轴为前后直径.
pub fn disambiguate(props: RegionProps) -> OrientedProps {
    let major = props.major_axis_length;
    let minor = props.minor_axis_length;
    let (rl_diameter, ap_diameter) =
        if -RL_ORIENTATION_LIMIT < props.orientation && props.orientation < RL_ORIENTATION_LIMIT {
            (major, minor)
        } else {
            (minor, major)
        };
    OrientedProps {
        props,
        rl_diameter,
        ap_diameter,
    }
}
