use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::region::OrientedProps;

/// 输出的形态学量. 枚举顺序即输出顺序.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Property {
    /// 面积 (平方毫米).
    Area,
    /// 等效直径 (毫米).
    EquivalentDiameter,
    /// 前后方向直径 (毫米).
    ApDiameter,
    /// 左右方向直径 (毫米).
    RlDiameter,
    /// 短轴与长轴之比.
    RatioMinorMajor,
    /// 离心率.
    Eccentricity,
    /// 凸性.
    Solidity,
    /// 朝向 (度).
    Orientation,
    /// 左右对称性.
    Symmetry,
}

impl Property {
    /// 形态学量个数.
    pub const COUNT: usize = 9;

    /// 按输出顺序排列的全部形态学量.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Area,
        Self::EquivalentDiameter,
        Self::ApDiameter,
        Self::RlDiameter,
        Self::RatioMinorMajor,
        Self::Eccentricity,
        Self::Solidity,
        Self::Orientation,
        Self::Symmetry,
    ];

    /// 在输出顺序中的位置.
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 规范名称.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::EquivalentDiameter => "equivalent_diameter",
            Self::ApDiameter => "AP_diameter",
            Self::RlDiameter => "RL_diameter",
            Self::RatioMinorMajor => "ratio_minor_major",
            Self::Eccentricity => "eccentricity",
            Self::Solidity => "solidity",
            Self::Orientation => "orientation",
            Self::Symmetry => "symmetry",
        }
    }

    /// 从区域描述量中读取该形态学量.
    pub fn of(&self, props: &OrientedProps) -> f64 {
        match self {
            Self::Area => props.area,
            Self::EquivalentDiameter => props.equivalent_diameter,
            Self::ApDiameter => props.ap_diameter(),
            Self::RlDiameter => props.rl_diameter(),
            Self::RatioMinorMajor => props.ratio_minor_major,
            Self::Eccentricity => props.eccentricity,
            Self::Solidity => props.solidity,
            Self::Orientation => props.orientation,
            Self::Symmetry => props.symmetry,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ShapeError::invalid_spec(format!("未知的形态学量 `{s}`")))
    }
}
