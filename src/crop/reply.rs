//! # 结果分类与回执编码模块
//!
//! ## 设计思路
//!
//! 活动结果只有三种走向：成功、取消、失败。分类顺序照裁剪库的语义：
//! 先看成功谓词，再看取消变体，剩余一律按失败处理，描述缺失时合成
//! `"crop failed"`。取消不算调用方错误，但同样走错误回执通道，
//! Web 层靠 `code` 字段区分两者。
//!
//! ## 实现思路
//!
//! - 成功回执为 `file://<本地路径>?<毫秒时间戳>`。时间戳是防缓存令牌：
//!   Web 层图片缓存按 URL 键控，没有它会显示上一次的旧裁剪。
//! - 令牌在进程内单调不减：墙钟毫秒经高水位保护，时钟回拨时取水位值。
//! - 时钟经 [`Clock`] 席位注入，测试可用固定时钟复现回执内容。

use std::sync::atomic::{AtomicI64, Ordering};

use crate::bridge::{ErrorReply, ReplyContext};
use crate::crop::contract::{CropOutcome, CroppedFileResolver};
use crate::error::CropError;

/// 失败描述缺失时的合成消息。
const FALLBACK_FAILURE_MESSAGE: &str = "crop failed";

/// 毫秒时钟席位。
pub trait Clock {
    /// 进程内单调不减的毫秒时间戳。
    fn timestamp_millis(&self) -> i64;
}

static HIGH_WATER_MILLIS: AtomicI64 = AtomicI64::new(0);

/// 墙钟毫秒 + 进程级高水位。
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let seen = HIGH_WATER_MILLIS.fetch_max(now, Ordering::Relaxed);
        now.max(seen)
    }
}

/// 分类活动结果并送出恰好一次终端回执。
///
/// 投递失败原样上抛，由协调层记录日志；不重试，也不补发。
pub(crate) fn deliver(
    ctx: &dyn ReplyContext,
    outcome: CropOutcome,
    clock: &dyn Clock,
) -> Result<(), CropError> {
    match outcome {
        CropOutcome::Success {
            output_uri,
            resolver,
        } => deliver_success(ctx, &output_uri, resolver.as_ref(), clock),
        CropOutcome::Cancelled => deliver_cancelled(ctx),
        CropOutcome::Failed { message } => deliver_failed(ctx, message),
    }
}

fn deliver_success(
    ctx: &dyn ReplyContext,
    output_uri: &str,
    resolver: &dyn CroppedFileResolver,
    clock: &dyn Clock,
) -> Result<(), CropError> {
    log::debug!("✂️ 裁剪成功");

    let Some(path) = resolver.local_file_path(output_uri) else {
        log::error!("裁剪产物路径解析失败 - URI: {output_uri}");
        return ctx.send_error(&ErrorReply::crop_error(FALLBACK_FAILURE_MESSAGE));
    };
    log::debug!("临时文件路径: {path}");

    let file_uri = format!("file://{}?{}", path, clock.timestamp_millis());
    ctx.send_success(&file_uri)
}

fn deliver_cancelled(ctx: &dyn ReplyContext) -> Result<(), CropError> {
    log::debug!("用户取消了图片裁剪");

    ctx.send_error(&ErrorReply::user_cancelled())
}

fn deliver_failed(ctx: &dyn ReplyContext, message: Option<String>) -> Result<(), CropError> {
    let message = message.unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
    log::error!("图片裁剪失败: {message}");

    ctx.send_error(&ErrorReply::crop_error(message))
}
