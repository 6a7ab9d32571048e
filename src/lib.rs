//! # 图片裁剪桥接插件 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Web 层调用方                         │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ 宿主桥接（positional JSON 入参 / 可延迟回调句柄）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕              插件（Rust）                         │
//! │                                                          │
//! │  ┌─ error ──── CropError（统一错误类型）                  │
//! │  │                                                       │
//! │  ├─ bridge ─── ReplyContext / ErrorReply（回执通道席位）  │
//! │  │                                                       │
//! │  └─ crop                                                 │
//! │      ├─ args      入参解码（positional → CropArgs）      │
//! │      ├─ contract  裁剪活动契约（选项·结果·启动器）        │
//! │      ├─ plugin    请求协调（一次性挂起槽 + 分发）         │
//! │      └─ reply     结果分类 + 回执编码 + 防缓存时钟        │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ 活动结果契约（launch / 注册回调）
//! ┌───────┴──────────────────────────────────────────────────┐
//! │            第三方裁剪 UI 活动（外部协作方）               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `CropError`，解码与回执投递失败的汇聚点 |
//! | [`bridge`] | 宿主桥接的回执通道接口与 `{message, code}` 错误载荷 |
//! | [`crop`] | 入参解码、契约启动、一次性结果路由、终端回执编码 |

pub mod error;
pub mod bridge;
pub mod crop;
