//! # 入参解码模块
//!
//! ## 设计思路
//!
//! Web 层经桥接送来的请求是动态类型的两元素定位参数：
//! 下标 0 为图片 URI 字符串，下标 1 为可选项记录。
//! 本模块把它解码为类型化的 [`CropArgs`]，解码失败统一归为
//! [`CropError::MalformedArgs`]，由协调层转为终端错误回执。
//!
//! ## 实现思路
//!
//! - 图片路径不做 URI 校验，格式问题留给裁剪 UI 侧报错。
//! - 选项键按“整数即取、否则回退默认值”读取，未知键静默忽略。

use serde_json::Value;

use crate::error::CropError;

/// 压缩质量默认值。
pub const DEFAULT_QUALITY: i32 = 100;

/// 最大输出尺寸的“无上限”哨兵值，原样传给裁剪 UI。
pub const SIZE_UNLIMITED: i32 = -1;

/// 单次裁剪请求的类型化入参。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropArgs {
    /// 输入图片 URI（裁剪 UI 接受的任意 scheme）。
    pub image_path: String,
    pub quality: i32,
    /// [`SIZE_UNLIMITED`] 表示无上限。
    pub target_width: i32,
    pub target_height: i32,
}

impl CropArgs {
    /// 解码两元素定位参数。
    ///
    /// # 返回
    /// - `Ok(CropArgs)` — 解码成功，缺省键已填默认值
    /// - `Err(CropError::MalformedArgs)` — 请求不是数组、下标 0 缺少
    ///   字符串路径，或下标 1 不是键值记录
    pub fn decode(params: &Value) -> Result<Self, CropError> {
        let list = params
            .as_array()
            .ok_or_else(|| CropError::MalformedArgs("请求不是定位参数数组".to_string()))?;

        let image_path = list
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| CropError::MalformedArgs("下标 0 缺少图片路径字符串".to_string()))?
            .to_string();

        let options = list
            .get(1)
            .and_then(Value::as_object)
            .ok_or_else(|| CropError::MalformedArgs("下标 1 不是选项记录".to_string()))?;

        Ok(Self {
            image_path,
            quality: opt_int(options, "quality", DEFAULT_QUALITY),
            target_width: opt_int(options, "targetWidth", SIZE_UNLIMITED),
            target_height: opt_int(options, "targetHeight", SIZE_UNLIMITED),
        })
    }
}

/// 键存在且为整数时取值，否则回退默认值。
fn opt_int(options: &serde_json::Map<String, Value>, key: &str, default: i32) -> i32 {
    options
        .get(key)
        .and_then(Value::as_i64)
        .map_or(default, |v| v as i32)
}
