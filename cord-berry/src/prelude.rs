//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF, Idx3d};

pub use crate::data::{Affine, Border, Interpolation, NiftiHeaderAttr, Orientation, Patch, SegVolume};

pub use crate::centerline::{
    Centerline, CenterlineFitter, CenterlineSampler, DiscLandmark, VertebralDistribution,
};
pub use crate::region::{disambiguate, extract, OrientedProps, RegionProps};
pub use crate::shape::{
    compute_properties_along_centerline, AveragedShape, Property, PropertySeries, ShapeSpec,
};

#[cfg(feature = "rayon")]
pub use crate::shape::par_compute_properties_along_centerline;

pub use crate::consts::gray::{BACKGROUND, FOREGROUND};
pub use crate::error::{ShapeError, ShapeResult};
