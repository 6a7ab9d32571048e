//! # 宿主桥接层（bridge）
//!
//! ## 设计思路
//!
//! 宿主运行时与 Web 层之间的传输属于外部协作方，插件只消费其中两件事：
//!
//! 1. 一个可延迟的回调句柄（[`ReplyContext`]）：分发阶段先送出
//!    “暂无结果”中间标记，终端回执在裁剪活动返回后恰好补发一次；
//! 2. 回执载荷的固定形状：成功为纯字符串 URI，失败为
//!    `{message, code}` 记录，Web 层按 `code` 分支判断。
//!
//! ## 实现思路
//!
//! 以 trait 描述回调句柄，由宿主侧实现，测试用记录型假实现替代。
//! 错误码取值封闭（[`CODE_USER_CANCELLED`] / [`CODE_CROP_ERROR`]）。

use serde::Serialize;

use crate::error::CropError;

/// 用户取消对应的错误码。
pub const CODE_USER_CANCELLED: &str = "userCancelled";

/// 其余裁剪失败（含入参解码失败）对应的错误码。
pub const CODE_CROP_ERROR: &str = "crop-error";

/// 分发结果。`NotHandled` 表示动作不属于本插件，宿主可继续路由。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    NotHandled,
}

/// 错误回执载荷。
///
/// 经桥接序列化后透传给 Web 层，`code` 是 Web 层分支判断的依据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    pub message: String,
    pub code: &'static str,
}

impl ErrorReply {
    /// 用户主动取消的固定载荷。
    pub fn user_cancelled() -> Self {
        Self {
            message: "User cancelled".to_string(),
            code: CODE_USER_CANCELLED,
        }
    }

    /// 裁剪失败载荷。
    pub fn crop_error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: CODE_CROP_ERROR,
        }
    }
}

/// 可延迟的桥接回调句柄。
///
/// 对应一次 `cropImage` 调用的回执通道：分发阶段发中间标记保持存活，
/// 活动返回后送出恰好一次终端回执（成功或错误）。
pub trait ReplyContext {
    /// 发送“暂无结果”的中间回执并要求宿主保持回调存活。
    ///
    /// 必须在启动裁剪活动之前送达——宿主靠这个标记跨挂起窗口
    /// 保留回调句柄，否则会把同步返回当作静默成功收尾。
    fn keep_callback_alive(&self) -> Result<(), CropError>;

    /// 终端成功回执，载荷为纯字符串（`file://…?…` URI）。
    fn send_success(&self, payload: &str) -> Result<(), CropError>;

    /// 终端错误回执，载荷为 `{message, code}` 记录。
    fn send_error(&self, payload: &ErrorReply) -> Result<(), CropError>;
}
