//! 运行时错误.

use thiserror::Error;

/// 形态学分析过程中的致命错误.
///
/// 注意: 某个中心线点上找不到前景区域 **不是** 错误, 它由 `Option` 表达,
/// 并只会被记录为警告.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// 读取或解析 nifti 文件失败.
    #[error("nifti 读取失败: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 数据不是三维体数据. 参数为 header 中记录的维数.
    #[error("期望三维体数据, 但得到了 {0} 维数据")]
    NotVolume(usize),

    /// 体素坐标到物理坐标的仿射变换不可逆.
    #[error("仿射变换矩阵不可逆")]
    SingularAffine,

    /// 中心线不含任何点.
    #[error("中心线为空")]
    EmptyCenterline,

    /// 椎间盘标记图像中没有任何标记体素.
    #[error("椎间盘标记图像中不存在非零体素")]
    NoDiscLabel,

    /// 椎间盘标记值不是正整数.
    #[error("椎间盘标记值 `{0}` 不是正整数")]
    InvalidDiscLabel(f64),

    /// 非法参数.
    #[error("非法参数: {0}")]
    InvalidSpec(String),
}

impl ShapeError {
    /// 构造非法参数错误.
    #[inline]
    pub fn invalid_spec(details: impl Into<String>) -> Self {
        Self::InvalidSpec(details.into())
    }
}

/// 形态学分析运行时结果.
pub type ShapeResult<T> = Result<T, ShapeError>;
