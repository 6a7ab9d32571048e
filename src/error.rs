//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义插件级统一的 `CropError` 枚举，入参解码失败与回执投递失败
//! 都汇聚到这里，避免各模块分散的 `.map_err(|e| e.to_string())`
//! 式错误处理，调用侧可按分支匹配。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 裁剪 UI 侧的失败不在此列：活动结果本身就是带错误描述的变体，
//!   由结果分类器直接转为终端错误回执。

/// 插件统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// 入参缺失或类型不符
    #[error("参数格式错误：{0}")]
    MalformedArgs(String),

    /// 回执投递失败（桥接通道层）
    #[error("回执投递失败：{0}")]
    Reply(String),
}
