//! 平面像素邻域.

use crate::Idx2d;

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
///
/// 越过下界的分量会回绕为 `usize::MAX`, 因此只需检查上界即可过滤越界索引.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

/// 获得 `pos` 在 `(height, width)` 范围内的 8-邻居索引.
#[inline]
pub(crate) fn neighbour8_within(pos: Idx2d, (height, width): Idx2d) -> impl Iterator<Item = Idx2d> {
    neighbour8(pos)
        .into_iter()
        .filter(move |&(h, w)| h < height && w < width)
}
