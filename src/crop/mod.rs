//! # 图片裁剪模块（crop）
//!
//! ## 设计思路
//!
//! 该模块把“入参解码 → 分发协调 → 活动启动 → 结果分类 → 回执编码”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `args`：入参解码（positional 两元素 → `CropArgs`）
//! - `contract`：裁剪活动契约（启动选项、结果变体、启动器与宿主席位）
//! - `plugin`：请求协调（一次性挂起槽、分发流程、生命周期绑定）
//! - `reply`：结果分类、终端回执编码与防缓存时钟
//!
//! ## 实现思路
//!
//! 宿主桥接与裁剪 UI 都是外部协作方，插件只依赖 `bridge` 与
//! `contract` 中的 trait 席位；核心难点集中在 `plugin` 的一次性
//! 结果路由上，其余子模块保持薄而纯、便于单测。
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! Web 层 cropImage 调用
//!    ↓
//! plugin.rs（动作匹配 → 入参解码 → “暂无结果”标记）
//!    ↓ 装入一次性续延，声明接收下次活动结果，启动裁剪活动
//! （挂起窗口：控制权在外部裁剪 UI，插件不持有线程）
//!    ↓ 活动返回，注册的契约回调触发
//! plugin.rs（取槽即清，续延恰好触发一次）
//!    ↓
//! reply.rs（成功 / 取消 / 失败分类 → 终端回执）
//! ```

pub mod args;
pub mod contract;
pub mod plugin;
pub mod reply;

pub use args::{CropArgs, DEFAULT_QUALITY, SIZE_UNLIMITED};
pub use contract::{
    CropLauncher, CropOptions, CropOutcome, CropResultCallback, CroppedFileResolver, HostActivity,
    OutputFormat, ResizePolicy,
};
pub use plugin::{ACTION_CROP_IMAGE, CropPlugin};
pub use reply::{Clock, SystemClock};
