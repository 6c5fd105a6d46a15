//! 沿中心线计算脊髓横截面形态学量.
//!
//! 流程:
//!
//! 1. 将分割体数据转换为 RPI 方向, 并由拟合器在其上拟合中心线;
//! 2. 在每个中心线点上提取垂直切片, 计算区域描述量并分配左右/前后直径;
//! 3. 用 Hann 窗平滑过采样序列, 再按 z 切片取平均.

use std::path::Path;

use log::{info, warn};

use crate::centerline::{disc_landmarks, CenterlineFitter, CenterlineSampler, VertebralDistribution};
use crate::consts::gray::BACKGROUND;
use crate::data::{Border, SegVolume};
use crate::error::{ShapeError, ShapeResult};
use crate::region::{self, OrientedProps};
use crate::NiftiHeaderAttr;

mod average;
mod property;
mod series;
pub mod smooth;
mod spec;

pub use average::{average_by_slice, finalize, AveragedShape};
pub use property::Property;
pub use series::{PropertySeries, VerticalContext};
pub use spec::ShapeSpec;

/// 切片在体数据范围外的填充值.
const OUTSIDE_FILL: f64 = BACKGROUND;

/// 计算流程的中间产物: RPI 方向的体数据, 中心线, 以及可选的椎体分布.
type Prepared<C> = (SegVolume, C, Option<VertebralDistribution>);

fn prepare<F: CenterlineFitter>(
    segmentation: &SegVolume,
    discs: Option<&SegVolume>,
    fitter: &F,
    spec: &ShapeSpec,
) -> ShapeResult<Prepared<F::Centerline>> {
    info!("segmentation orientation: {}", segmentation.orientation());
    let image = segmentation.to_rpi()?;

    let number_of_points = spec.oversampling() * image.len_z();
    info!("fitting centerline with {number_of_points} points");
    let centerline = fitter.fit(&image, number_of_points)?;
    if centerline.number_of_points() == 0 {
        return Err(ShapeError::EmptyCenterline);
    }

    let distribution = match discs {
        Some(discs) => {
            let landmarks = disc_landmarks(discs)?;
            Some(centerline.compute_vertebral_distribution(&landmarks)?)
        }
        None => None,
    };
    Ok((image, centerline, distribution))
}

/// 沿中心线计算脊髓形态学量, 并按 z 切片取平均.
///
/// `discs` 为可选的椎间盘标记体数据. 某个中心线点上找不到脊髓时只会记录警告,
/// 体数据不合法、中心线为空或椎间盘标记不合法时返回 `Err`.
pub fn compute_properties_along_centerline<F: CenterlineFitter>(
    segmentation: &SegVolume,
    discs: Option<&SegVolume>,
    fitter: &F,
    spec: &ShapeSpec,
) -> ShapeResult<AveragedShape> {
    let (image, centerline, distribution) = prepare(segmentation, discs, fitter, spec)?;
    let series = build_series(&image, &centerline, distribution.as_ref(), spec);
    Ok(finalize(
        series,
        spec.smoothing_factor_mm(),
        centerline.mean_progressive_length(),
    ))
}

/// 从 nii 文件读取分割 (与可选的椎间盘标记) 后调用
/// [`compute_properties_along_centerline`].
pub fn compute_from_files<F: CenterlineFitter>(
    segmentation: impl AsRef<Path>,
    discs: Option<impl AsRef<Path>>,
    fitter: &F,
    spec: &ShapeSpec,
) -> ShapeResult<AveragedShape> {
    let segmentation = SegVolume::open(segmentation)?;
    let discs = discs.map(SegVolume::open).transpose()?;
    compute_properties_along_centerline(&segmentation, discs.as_ref(), fitter, spec)
}

/// 在第 `index` 个中心线点上提取切片并计算描述量. 找不到脊髓时返回 `None`.
fn measure_point<C: CenterlineSampler + ?Sized>(
    image: &SegVolume,
    centerline: &C,
    index: usize,
    spec: &ShapeSpec,
) -> Option<OrientedProps> {
    let resolution = spec.patch_resolution_mm();
    let mut patch = centerline.extract_perpendicular_square(
        image,
        index,
        spec.patch_half_size_mm(),
        resolution,
        spec.interpolation(),
        Border::Constant(OUTSIDE_FILL),
    );
    patch.zero_out(OUTSIDE_FILL);
    if patch.is_background() {
        return None;
    }
    region::extract(&patch, Some((resolution, resolution))).map(region::disambiguate)
}

/// 把第 `index` 个点的结果追加到序列. `None` 时记录警告并跳过.
fn append_point<C: CenterlineSampler + ?Sized>(
    series: &mut PropertySeries,
    image: &SegVolume,
    centerline: &C,
    distribution: Option<&VertebralDistribution>,
    index: usize,
    props: Option<OrientedProps>,
) {
    let z_slice = image.phys2pix_rounded(centerline.point(index))[2];
    match props {
        Some(props) => series.push(
            &props,
            centerline.incremental_length(index),
            z_slice,
            distribution.map(|d| d.at(index)),
        ),
        None => warn!("no properties for slice {z_slice} (centerline point {index})"),
    }
}

/// 依次在每个中心线点上计算形态学量, 得到过采样序列.
///
/// `image` 应为 RPI 方向. `distribution` 若存在, 其点数必须与中心线一致.
pub fn build_series<C: CenterlineSampler + ?Sized>(
    image: &SegVolume,
    centerline: &C,
    distribution: Option<&VertebralDistribution>,
    spec: &ShapeSpec,
) -> PropertySeries {
    let mut series = PropertySeries::new(distribution.is_some());
    for index in 0..centerline.number_of_points() {
        let props = measure_point(image, centerline, index, spec);
        append_point(&mut series, image, centerline, distribution, index, props);
    }
    series
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地在每个中心线点上计算形态学量.
        /// 结果与 [`build_series`] 完全相同.
        pub fn par_build_series<C: CenterlineSampler + Sync + ?Sized>(
            image: &SegVolume,
            centerline: &C,
            distribution: Option<&VertebralDistribution>,
            spec: &ShapeSpec,
        ) -> PropertySeries {
            let measured: Vec<Option<OrientedProps>> = (0..centerline.number_of_points())
                .into_par_iter()
                .map(|index| measure_point(image, centerline, index, spec))
                .collect();

            let mut series = PropertySeries::new(distribution.is_some());
            for (index, props) in measured.into_iter().enumerate() {
                append_point(&mut series, image, centerline, distribution, index, props);
            }
            series
        }

        /// 借助 `rayon`, 使用多任务模式运行 [`compute_properties_along_centerline`].
        pub fn par_compute_properties_along_centerline<F>(
            segmentation: &SegVolume,
            discs: Option<&SegVolume>,
            fitter: &F,
            spec: &ShapeSpec,
        ) -> ShapeResult<AveragedShape>
        where
            F: CenterlineFitter,
            F::Centerline: Sync,
        {
            let (image, centerline, distribution) = prepare(segmentation, discs, fitter, spec)?;
            let series = par_build_series(&image, &centerline, distribution.as_ref(), spec);
            Ok(finalize(
                series,
                spec.smoothing_factor_mm(),
                centerline.mean_progressive_length(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centerline::Centerline;
    use crate::data::Affine;
    use ndarray::Array3;

    /// [w, h, z] = [21, 21, nz] 的体数据, 在 `slices` 中的切片上放置半径 4 的圆柱.
    fn cylinder(nz: usize, slices: std::ops::Range<usize>) -> SegVolume {
        let data = Array3::from_shape_fn((21, 21, nz), |(i, j, k)| {
            let (di, dj) = (i as f64 - 10.0, j as f64 - 10.0);
            if slices.contains(&k) && di * di + dj * dj <= 16.0 {
                1.0
            } else {
                0.0
            }
        });
        SegVolume::fake(data, Affine::diagonal([-1.0, 1.0, 1.0])).unwrap()
    }

    fn straight(image: &SegVolume, n: usize) -> Centerline {
        let nz = image.len_z() as f64;
        let points = (0..n)
            .map(|t| image.pix2phys([10.0, 10.0, t as f64 * (nz - 1.0) / (n - 1) as f64]))
            .collect();
        Centerline::from_points(points).unwrap()
    }

    #[test]
    fn test_build_series_skips_background() {
        let image = cylinder(6, 0..3);
        let c = straight(&image, 11);
        let series = build_series(&image, &c, None, &ShapeSpec::default());
        // 点 k = 0, 0.5, ..., 5; 只有 z < 3 的切片有脊髓.
        assert!(!series.is_empty());
        assert!(series.z_slice().iter().all(|&z| z < 3));
        assert!(series.vertical().is_none());
        let area = series.values(Property::Area);
        assert!(area.iter().all(|&a| (a - 49.0).abs() < 1e-9), "{area:?}");
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_build_series() {
        let image = cylinder(6, 1..5);
        let c = straight(&image, 16);
        let spec = ShapeSpec::default();
        assert_eq!(
            build_series(&image, &c, None, &spec),
            par_build_series(&image, &c, None, &spec)
        );
    }

    #[test]
    fn test_empty_centerline() {
        let image = cylinder(4, 0..4);
        let fitter = |_: &SegVolume, _: usize| Centerline::new(vec![], vec![]);
        let res = compute_properties_along_centerline(&image, None, &fitter, &ShapeSpec::default());
        assert!(matches!(res, Err(ShapeError::EmptyCenterline)));
    }

    #[test]
    fn test_oversampling_passed_to_fitter() {
        let image = cylinder(4, 0..4);
        let spec = ShapeSpec::default().with_oversampling(3).unwrap();
        let fitter = |v: &SegVolume, n: usize| -> ShapeResult<Centerline> {
            assert_eq!(n, 12);
            Ok(straight(v, n))
        };
        let avg = compute_properties_along_centerline(&image, None, &fitter, &spec).unwrap();
        assert_eq!(avg.z_slices(), &[0, 1, 2, 3]);
    }
}
