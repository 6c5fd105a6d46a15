#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Property;
use crate::region::OrientedProps;

/// 与椎间盘标记相关的逐点信息.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerticalContext {
    /// 到最上方椎间盘的有符号弧长 (毫米).
    pub distance_from_c1: Vec<f64>,

    /// 椎体编号.
    pub vertebral_level: Vec<u32>,
}

/// 沿中心线过采样得到的形态学量序列.
///
/// 每个成功提取的中心线点贡献一项. 所有序列长度相同.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertySeries {
    values: [Vec<f64>; Property::COUNT],
    incremental_length: Vec<f64>,
    z_slice: Vec<i64>,
    vertical: Option<VerticalContext>,
}

impl PropertySeries {
    /// 创建空序列. 是否携带椎体信息在此时一次性决定.
    pub fn new(with_vertical: bool) -> Self {
        Self {
            values: std::array::from_fn(|_| Vec::new()),
            incremental_length: Vec::new(),
            z_slice: Vec::new(),
            vertical: with_vertical.then(VerticalContext::default),
        }
    }

    /// 追加一个点的全部形态学量.
    ///
    /// # Panics
    ///
    /// 同 [`PropertySeries::push_values`].
    #[inline]
    pub fn push(
        &mut self,
        props: &OrientedProps,
        incremental_length: f64,
        z_slice: i64,
        vertical: Option<(f64, u32)>,
    ) {
        self.push_values(
            Property::ALL.map(|p| p.of(props)),
            incremental_length,
            z_slice,
            vertical,
        );
    }

    /// 追加一个点的全部形态学量, 按照 [`Property::ALL`] 的顺序给出.
    ///
    /// # Panics
    ///
    /// 当 `vertical` 是否为 `None` 与创建序列时的 `with_vertical` 不一致时 panic.
    pub fn push_values(
        &mut self,
        values: [f64; Property::COUNT],
        incremental_length: f64,
        z_slice: i64,
        vertical: Option<(f64, u32)>,
    ) {
        match (self.vertical.as_mut(), vertical) {
            (Some(ctx), Some((distance, level))) => {
                ctx.distance_from_c1.push(distance);
                ctx.vertebral_level.push(level);
            }
            (None, None) => {}
            _ => panic!("椎体信息与序列设置不一致"),
        }
        for (seq, v) in self.values.iter_mut().zip(values) {
            seq.push(v);
        }
        self.incremental_length.push(incremental_length);
        self.z_slice.push(z_slice);
        debug_assert!(self.values.iter().all(|s| s.len() == self.z_slice.len()));
    }

    /// 点数.
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.incremental_length.len(), self.z_slice.len());
        self.z_slice.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 某个形态学量的序列.
    #[inline]
    pub fn values(&self, property: Property) -> &[f64] {
        &self.values[property.index()]
    }

    #[inline]
    pub(crate) fn values_mut(&mut self, property: Property) -> &mut Vec<f64> {
        &mut self.values[property.index()]
    }

    /// 累计弧长序列.
    #[inline]
    pub fn incremental_length(&self) -> &[f64] {
        &self.incremental_length
    }

    /// 每个点所在的体素 z 坐标.
    #[inline]
    pub fn z_slice(&self) -> &[i64] {
        &self.z_slice
    }

    /// 椎体信息. 未提供椎间盘标记时为 `None`.
    #[inline]
    pub fn vertical(&self) -> Option<&VerticalContext> {
        self.vertical.as_ref()
    }
}
