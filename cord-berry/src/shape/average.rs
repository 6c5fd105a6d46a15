use std::collections::HashMap;

use itertools::izip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::smooth::smooth_series;
use super::{Property, PropertySeries};

/// 按 z 切片平均后的形态学量. 唯一的最终输出.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AveragedShape {
    properties: Vec<Property>,

    /// 按首次出现顺序排列的 z 切片编号.
    z_slices: Vec<i64>,

    /// 与 `properties` 一一对应, 每个序列与 `z_slices` 一一对应.
    values: Vec<Vec<f64>>,
}

impl AveragedShape {
    /// 输出的形态学量, 按输出顺序排列.
    #[inline]
    pub fn property_list(&self) -> &[Property] {
        &self.properties
    }

    /// z 切片编号, 按其在中心线上首次出现的顺序排列.
    #[inline]
    pub fn z_slices(&self) -> &[i64] {
        &self.z_slices
    }

    /// 切片个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.z_slices.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.z_slices.is_empty()
    }

    /// 某个形态学量的逐切片平均值.
    pub fn get(&self, property: Property) -> Option<&[f64]> {
        self.properties
            .iter()
            .position(|&p| p == property)
            .map(|i| self.values[i].as_slice())
    }

    /// 某个形态学量在切片 `z_slice` 上的平均值.
    pub fn value(&self, property: Property, z_slice: i64) -> Option<f64> {
        let i = self.z_slices.iter().position(|&z| z == z_slice)?;
        self.get(property).map(|v| v[i])
    }

    /// 以 `(形态学量, 逐切片平均值)` 的形式迭代.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &[f64])> {
        izip!(self.properties.iter().copied(), self.values.iter().map(Vec::as_slice))
    }
}

/// 将过采样序列按照 z 切片编号聚合, 每个切片取所有对应点的平均值.
/// 切片按照首次出现的顺序排列.
pub fn average_by_slice(series: &PropertySeries) -> AveragedShape {
    let mut z_slices: Vec<i64> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut counts: Vec<usize> = Vec::new();
    let groups: Vec<usize> = series
        .z_slice()
        .iter()
        .map(|&z| {
            let i = *position.entry(z).or_insert_with(|| {
                z_slices.push(z);
                counts.push(0);
                z_slices.len() - 1
            });
            counts[i] += 1;
            i
        })
        .collect();

    let values = Property::ALL
        .iter()
        .map(|&p| {
            let mut sums = vec![0.0; z_slices.len()];
            for (&g, &v) in izip!(groups.iter(), series.values(p).iter()) {
                sums[g] += v;
            }
            izip!(sums, counts.iter())
                .map(|(s, &c)| s / c as f64)
                .collect()
        })
        .collect();

    AveragedShape {
        properties: Property::ALL.to_vec(),
        z_slices,
        values,
    }
}

/// 平滑 (若 `smoothing_factor_mm` 非零) 后按 z 切片聚合.
///
/// `mean_spacing` 为中心线相邻点的平均间距 (毫米), 用于把平滑因子换算为窗口长度.
pub fn finalize(
    mut series: PropertySeries,
    smoothing_factor_mm: f64,
    mean_spacing: f64,
) -> AveragedShape {
    smooth_series(&mut series, smoothing_factor_mm, mean_spacing);
    average_by_slice(&series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(z: &[i64], area: &[f64]) -> PropertySeries {
        let mut s = PropertySeries::new(false);
        for (&z, &a) in z.iter().zip(area.iter()) {
            let mut values = [1.0; Property::COUNT];
            values[Property::Area.index()] = a;
            s.push_values(values, 0.0, z, None);
        }
        s
    }

    #[test]
    fn test_first_seen_order() {
        let s = series(&[5, 5, 6, 6, 5, 7], &[1.0, 2.0, 3.0, 5.0, 6.0, 7.0]);
        let avg = finalize(s, 0.0, 1.0);
        assert_eq!(avg.z_slices(), &[5, 6, 7]);
        assert_eq!(avg.get(Property::Area).unwrap(), &[3.0, 4.0, 7.0]);
        assert_eq!(avg.value(Property::Area, 6), Some(4.0));
        assert_eq!(avg.value(Property::Area, 8), None);
        assert_eq!(avg.get(Property::Symmetry).unwrap(), &[1.0, 1.0, 1.0]);
        assert_eq!(avg.property_list(), &Property::ALL);
        assert_eq!(avg.iter().count(), Property::COUNT);
    }

    #[test]
    fn test_empty() {
        let avg = finalize(PropertySeries::new(false), 5.0, 1.0);
        assert!(avg.is_empty());
        assert_eq!(avg.property_list().len(), Property::COUNT);
        assert_eq!(avg.get(Property::Area).unwrap().len(), 0);
    }

    #[test]
    fn test_smoothing_keeps_interior_constant() {
        let z: Vec<i64> = (0..40).map(|i| i / 4).collect();
        let s = series(&z, &[3.0; 40]);
        let avg = finalize(s, 1.0, 0.25);
        assert_eq!(avg.len(), 10);
        let area = avg.get(Property::Area).unwrap();
        assert!(area[2..8].iter().all(|v| (v - 3.0).abs() < 1e-12));
    }
}
