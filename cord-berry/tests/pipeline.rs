use std::f64::consts::PI;
use std::sync::Once;

use cord_berry::centerline::disc_landmarks;
use cord_berry::prelude::*;
use cord_berry::shape::build_series;
use ndarray::Array3;

const W: usize = 41;
const H: usize = 41;
const Z: usize = 20;
const RADIUS: f64 = 5.0;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Warn)
            .init();
    });
}

/// 沿 k 轴的直圆柱, 半径 `RADIUS`, 中心位于 (20, 20). 仿射矩阵为单位阵 (LPI 方向).
fn cylinder() -> SegVolume {
    let (ci, cj) = ((W / 2) as f64, (H / 2) as f64);
    let data = Array3::from_shape_fn((W, H, Z), |(i, j, _)| {
        let d2 = (i as f64 - ci).powi(2) + (j as f64 - cj).powi(2);
        if d2 <= RADIUS * RADIUS {
            1.0
        } else {
            0.0
        }
    });
    SegVolume::fake(data, Affine::diagonal([1.0, 1.0, 1.0])).unwrap()
}

/// 在 RPI 体数据中沿 k 轴等间距取点的直线中心线.
fn straight_line(image: &SegVolume, n: usize) -> ShapeResult<Centerline> {
    let (nz, _, _) = image.shape();
    let center = image.phys2pix(image.idx2phys((0, H / 2, W / 2)));
    let step = if n > 1 {
        (nz - 1) as f64 / (n - 1) as f64
    } else {
        0.0
    };
    let points = (0..n)
        .map(|p| image.pix2phys([center[0], center[1], p as f64 * step]))
        .collect();
    Centerline::from_points(points)
}

#[test]
fn test_cylinder_without_smoothing() {
    init_logger();
    let seg = cylinder();
    assert_eq!(seg.orientation().to_string(), "LPI");

    let spec = ShapeSpec::new(0.0, Interpolation::Nearest).unwrap();
    let shape = compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();

    assert_eq!(shape.len(), Z);
    let mut z = shape.z_slices().to_vec();
    z.sort_unstable();
    assert_eq!(z, (0..Z as i64).collect::<Vec<_>>());

    let expected = PI * RADIUS * RADIUS;
    for &area in shape.get(Property::Area).unwrap() {
        assert!((area - expected).abs() / expected < 0.05, "area = {area}");
    }
    for &sym in shape.get(Property::Symmetry).unwrap() {
        assert!(sym > 0.9, "symmetry = {sym}");
    }
    for &ratio in shape.get(Property::RatioMinorMajor).unwrap() {
        assert!(ratio > 0.9 && ratio <= 1.0, "ratio = {ratio}");
    }
    for &solidity in shape.get(Property::Solidity).unwrap() {
        assert!(solidity > 0.9 && solidity <= 1.0, "solidity = {solidity}");
    }
}

#[test]
fn test_cylinder_with_smoothing() {
    init_logger();
    let seg = cylinder();
    let spec = ShapeSpec::new(2.0, Interpolation::Nearest).unwrap();
    let shape = compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();
    assert_eq!(shape.len(), Z);

    let expected = PI * RADIUS * RADIUS;
    let area = shape.get(Property::Area).unwrap();
    // 序列两端会被窗口衰减, 只检查内部切片.
    for (&z, &a) in shape.z_slices().iter().zip(area.iter()) {
        if (3..Z as i64 - 3).contains(&z) {
            assert!((a - expected).abs() / expected < 0.1, "z = {z}, area = {a}");
        }
    }
}

#[cfg(feature = "rayon")]
#[test]
fn test_parallel_matches_sequential() {
    init_logger();
    let seg = cylinder();
    let spec = ShapeSpec::default();
    let seq = compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();
    let par = par_compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn test_cylinder_with_discs() {
    init_logger();
    let seg = cylinder();

    let mut labels = Array3::<f32>::zeros((W, H, Z));
    labels[[W / 2, H / 2, 15]] = 2.0;
    labels[[W / 2, H / 2, 5]] = 3.0;
    let discs = SegVolume::fake(labels, Affine::diagonal([1.0, 1.0, 1.0])).unwrap();

    let landmarks = disc_landmarks(&discs).unwrap();
    assert_eq!(landmarks.len(), 2);
    assert_eq!(landmarks[0].label, 2);
    assert_eq!(landmarks[0].position, [20.0, 20.0, 15.0]);

    let image = seg.to_rpi().unwrap();
    let spec = ShapeSpec::default();
    let centerline = straight_line(&image, spec.oversampling() * Z).unwrap();
    let distribution = centerline.compute_vertebral_distribution(&landmarks).unwrap();
    assert_eq!(distribution.len(), centerline.number_of_points());

    let series = build_series(&image, &centerline, Some(&distribution), &spec);
    assert_eq!(series.len(), centerline.number_of_points());
    let vertical = series.vertical().unwrap();
    assert_eq!(vertical.vertebral_level.len(), series.len());

    // 最上方的点位于所有椎间盘上方, 取最上方椎间盘的编号.
    let top = centerline.number_of_points() - 1;
    assert_eq!(distribution.vertebral_level()[top], 2);
    assert_eq!(distribution.vertebral_level()[0], 3);
    assert!(distribution.distance_from_c1()[0] < 0.0);

    let with_discs =
        compute_properties_along_centerline(&seg, Some(&discs), &straight_line, &spec).unwrap();
    let without = compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();
    assert_eq!(with_discs, without);
}

#[test]
fn test_empty_disc_volume() {
    init_logger();
    let seg = cylinder();
    let discs = SegVolume::fake(Array3::zeros((W, H, Z)), Affine::diagonal([1.0, 1.0, 1.0])).unwrap();
    let spec = ShapeSpec::default();
    let res = compute_properties_along_centerline(&seg, Some(&discs), &straight_line, &spec);
    assert!(matches!(res, Err(ShapeError::NoDiscLabel)));
}

#[test]
fn test_empty_segmentation_is_not_fatal() {
    init_logger();
    let seg = SegVolume::fake(Array3::zeros((W, H, Z)), Affine::diagonal([1.0, 1.0, 1.0])).unwrap();
    let spec = ShapeSpec::new(0.0, Interpolation::Nearest).unwrap();
    let shape = compute_properties_along_centerline(&seg, None, &straight_line, &spec).unwrap();
    assert!(shape.is_empty());
}

const TILT_VOXEL_MM: f64 = 0.5;
const TILT_RADIUS_MM: f64 = 4.0;
const TILT_SHAPE: (usize, usize, usize) = (64, 32, 40);
const TILT_ORIGIN: [f64; 3] = [8.0, 8.0, 0.0];

/// 在 xz 平面内偏离 z 轴 30 度的中心线方向.
fn tilt_direction() -> [f64; 3] {
    let (sin, cos) = (PI / 6.0).sin_cos();
    [sin, 0.0, cos]
}

/// 轴线过 `TILT_ORIGIN`, 方向为 [`tilt_direction`] 的斜圆柱. 体素边长 0.5 毫米.
fn tilted_cylinder() -> SegVolume {
    let d = tilt_direction();
    let data = Array3::from_shape_fn(TILT_SHAPE, |(i, j, k)| {
        let p = [i, j, k].map(|v| v as f64 * TILT_VOXEL_MM);
        let rel: Vec<f64> = p.iter().zip(TILT_ORIGIN).map(|(a, o)| a - o).collect();
        let along: f64 = rel.iter().zip(d).map(|(a, b)| a * b).sum();
        let d2: f64 = rel.iter().zip(d).map(|(a, b)| (a - along * b).powi(2)).sum();
        if d2 <= TILT_RADIUS_MM * TILT_RADIUS_MM {
            1.0
        } else {
            0.0
        }
    });
    let affine = Affine::diagonal([TILT_VOXEL_MM; 3]);
    SegVolume::fake(data, affine).unwrap()
}

/// 沿斜圆柱轴线, 从体数据底部到顶部等间距取点.
fn tilted_line(image: &SegVolume, n: usize) -> ShapeResult<Centerline> {
    let d = tilt_direction();
    let top = (image.len_z() - 1) as f64 * TILT_VOXEL_MM;
    let points = (0..n)
        .map(|p| {
            let z = if n > 1 { top * p as f64 / (n - 1) as f64 } else { 0.0 };
            let t = z / d[2];
            [0usize, 1, 2].map(|a| TILT_ORIGIN[a] + t * d[a])
        })
        .collect();
    Centerline::from_points(points)
}

/// 垂直切片上的面积是圆柱的真实截面积, 而不是水平切片上的椭圆面积.
#[test]
fn test_tilted_cylinder() {
    init_logger();
    let seg = tilted_cylinder();
    let spec = ShapeSpec::new(0.0, Interpolation::Nearest).unwrap();
    let shape = compute_properties_along_centerline(&seg, None, &tilted_line, &spec).unwrap();

    let expected = PI * TILT_RADIUS_MM * TILT_RADIUS_MM;
    let oblique = expected / (PI / 6.0).cos();
    let area = shape.get(Property::Area).unwrap();
    let symmetry = shape.get(Property::Symmetry).unwrap();
    let mut checked = 0;
    // 两端的垂直切片会超出体数据范围, 只检查内部切片.
    for (i, &z) in shape.z_slices().iter().enumerate() {
        if !(8..32).contains(&z) {
            continue;
        }
        checked += 1;
        assert!((area[i] - expected).abs() / expected < 0.05, "z = {z}, area = {}", area[i]);
        assert!((area[i] - oblique).abs() > 0.1 * expected, "z = {z}, area = {}", area[i]);
        assert!(symmetry[i] > 0.9, "z = {z}, symmetry = {}", symmetry[i]);
    }
    assert_eq!(checked, 24);
}

#[test]
fn test_invalid_disc_label() {
    init_logger();
    let seg = cylinder();
    let mut labels = Array3::<f32>::zeros((W, H, Z));
    labels[[W / 2, H / 2, 10]] = 2.5;
    let discs = SegVolume::fake(labels, Affine::diagonal([1.0, 1.0, 1.0])).unwrap();
    let spec = ShapeSpec::default();
    let res = compute_properties_along_centerline(&seg, Some(&discs), &straight_line, &spec);
    assert!(
        matches!(res, Err(ShapeError::InvalidDiscLabel(v)) if v == 2.5),
        "{res:?}"
    );
}
