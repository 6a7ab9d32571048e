//! # 请求协调模块
//!
//! ## 设计思路
//!
//! 协调器独占一个“挂起回执槽”：分发时装入一次性续延，随后把控制权
//! 交给外部裁剪活动；活动返回后经契约回调取出续延并触发，保证每次
//! 受理的分发最终恰好送出一次终端回执。
//!
//! 槽的状态机：
//!
//! ```text
//! 空闲 ──分发──▶ 等待结果(句柄)
//! 等待结果 ──结果送达──▶ 空闲（终端回执已发）
//! 等待结果 ──再次分发──▶ 等待结果(新句柄)，旧句柄被放弃
//! ```
//!
//! ## 实现思路
//!
//! - 所有操作都在宿主 UI 线程上协作式运行，槽用 `Rc` + `RefCell`
//!   共享，不引入任何锁：锁可能与宿主的 UI 线程重入互相死锁。
//! - 中间“暂无结果”标记必须先于启动送达，宿主靠它跨挂起窗口保持
//!   回调存活。
//! - 续延为 `FnOnce`，触发即消费；空槽收到结果按伪回调静默丢弃。

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::bridge::{DispatchOutcome, ErrorReply, ReplyContext};
use crate::crop::args::CropArgs;
use crate::crop::contract::{CropLauncher, CropOptions, CropOutcome, HostActivity};
use crate::crop::reply::{self, Clock, SystemClock};

/// 本插件受理的动作名。
pub const ACTION_CROP_IMAGE: &str = "cropImage";

/// 一次性续延：消费活动结果并送出终端回执。
type PendingContinuation = Box<dyn FnOnce(CropOutcome)>;

/// 挂起回执槽。首次分发前为空，每次终端回执送出后回到空。
#[derive(Default)]
struct PendingSlot {
    continuation: RefCell<Option<PendingContinuation>>,
}

impl PendingSlot {
    /// 装入新的续延，返回是否顶替了未触发的旧续延。
    fn install(&self, continuation: PendingContinuation) -> bool {
        self.continuation
            .borrow_mut()
            .replace(continuation)
            .is_some()
    }

    /// 取槽即清，再触发续延；空槽时按伪回调静默丢弃结果。
    fn fire(&self, outcome: CropOutcome) {
        let taken = self.continuation.borrow_mut().take();
        match taken {
            Some(continuation) => continuation(outcome),
            None => log::debug!("收到无人等待的活动结果，已丢弃"),
        }
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.continuation.borrow().is_none()
    }
}

/// 图片裁剪插件。
///
/// 构造即完成生命周期绑定：向宿主活动注册裁剪结果契约，
/// 并在整个生命周期内保留换取的启动句柄。
pub struct CropPlugin {
    host: Rc<dyn HostActivity>,
    launcher: Box<dyn CropLauncher>,
    pending: Rc<PendingSlot>,
    clock: Rc<dyn Clock>,
}

impl CropPlugin {
    /// 以指定时钟构造插件并注册裁剪契约。
    ///
    /// 注册必须落在宿主允许登记结果回调的窗口内，宿主应在任何请求
    /// 到来之前完成插件构造。
    pub fn new(host: Rc<dyn HostActivity>, clock: Rc<dyn Clock>) -> Self {
        let pending = Rc::new(PendingSlot::default());
        let slot = Rc::clone(&pending);
        let launcher = host.register_crop_contract(Box::new(move |outcome| slot.fire(outcome)));

        Self {
            host,
            launcher,
            pending,
            clock,
        }
    }

    /// 以系统墙钟构造插件。
    pub fn with_system_clock(host: Rc<dyn HostActivity>) -> Self {
        Self::new(host, Rc::new(SystemClock))
    }

    /// 受理一次桥接分发。
    ///
    /// 动作名不匹配时返回 [`DispatchOutcome::NotHandled`]，宿主可继续
    /// 路由；受理后同步返回 [`DispatchOutcome::Handled`]，终端回执在
    /// 裁剪活动返回后经续延补发。
    pub fn execute(
        &self,
        action: &str,
        params: &Value,
        ctx: Box<dyn ReplyContext>,
    ) -> DispatchOutcome {
        if action != ACTION_CROP_IMAGE {
            return DispatchOutcome::NotHandled;
        }

        let args = match CropArgs::decode(params) {
            Ok(args) => args,
            Err(err) => {
                log::error!("裁剪请求入参解码失败: {err}");
                if let Err(send_err) = ctx.send_error(&ErrorReply::crop_error(err.to_string())) {
                    log::error!("入参错误回执投递失败，仅记录: {send_err}");
                }
                return DispatchOutcome::Handled;
            }
        };

        // 中间标记必须先于启动送达，宿主靠它把回调保留到活动返回
        if let Err(err) = ctx.keep_callback_alive() {
            log::error!("“暂无结果”中间回执投递失败，放弃本次分发: {err}");
            return DispatchOutcome::Handled;
        }

        let clock = Rc::clone(&self.clock);
        let replaced = self.pending.install(Box::new(move |outcome| {
            if let Err(err) = reply::deliver(ctx.as_ref(), outcome, clock.as_ref()) {
                log::error!("终端回执投递失败，仅记录，不补发: {err}");
            }
        }));
        if replaced {
            log::warn!("挂起回执槽被新分发顶替，前一位调用方收不到终端回执");
        }

        self.host.claim_next_result();
        self.launcher.launch(CropOptions::for_request(&args));

        DispatchOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CODE_CROP_ERROR, CODE_USER_CANCELLED};
    use crate::crop::contract::{CropResultCallback, CroppedFileResolver};
    use crate::error::CropError;
    use serde_json::json;

    /// 记录型回执句柄，事件写入共享日志便于移交后检查。
    struct RecordingCtx {
        kept_alive: Rc<RefCell<u32>>,
        successes: Rc<RefCell<Vec<String>>>,
        errors: Rc<RefCell<Vec<ErrorReply>>>,
        fail_keep_alive: bool,
    }

    impl RecordingCtx {
        fn new() -> (
            Box<Self>,
            Rc<RefCell<u32>>,
            Rc<RefCell<Vec<String>>>,
            Rc<RefCell<Vec<ErrorReply>>>,
        ) {
            let kept_alive = Rc::new(RefCell::new(0));
            let successes = Rc::new(RefCell::new(Vec::new()));
            let errors = Rc::new(RefCell::new(Vec::new()));
            let ctx = Box::new(Self {
                kept_alive: Rc::clone(&kept_alive),
                successes: Rc::clone(&successes),
                errors: Rc::clone(&errors),
                fail_keep_alive: false,
            });
            (ctx, kept_alive, successes, errors)
        }
    }

    impl ReplyContext for RecordingCtx {
        fn keep_callback_alive(&self) -> Result<(), CropError> {
            if self.fail_keep_alive {
                return Err(CropError::Reply("通道已关闭".to_string()));
            }
            *self.kept_alive.borrow_mut() += 1;
            Ok(())
        }

        fn send_success(&self, payload: &str) -> Result<(), CropError> {
            self.successes.borrow_mut().push(payload.to_string());
            Ok(())
        }

        fn send_error(&self, payload: &ErrorReply) -> Result<(), CropError> {
            self.errors.borrow_mut().push(payload.clone());
            Ok(())
        }
    }

    struct MockLauncher {
        launches: Rc<RefCell<Vec<CropOptions>>>,
    }

    impl CropLauncher for MockLauncher {
        fn launch(&self, options: CropOptions) {
            self.launches.borrow_mut().push(options);
        }
    }

    /// 假宿主：保存注册的契约回调，测试用它模拟活动返回。
    struct MockHost {
        on_result: RefCell<Option<CropResultCallback>>,
        launches: Rc<RefCell<Vec<CropOptions>>>,
        claims: RefCell<u32>,
    }

    impl MockHost {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                on_result: RefCell::new(None),
                launches: Rc::new(RefCell::new(Vec::new())),
                claims: RefCell::new(0),
            })
        }

        fn deliver(&self, outcome: CropOutcome) {
            let mut slot = self.on_result.borrow_mut();
            let on_result = slot.as_mut().expect("契约尚未注册");
            on_result(outcome);
        }
    }

    impl HostActivity for MockHost {
        fn register_crop_contract(&self, on_result: CropResultCallback) -> Box<dyn CropLauncher> {
            *self.on_result.borrow_mut() = Some(on_result);
            Box::new(MockLauncher {
                launches: Rc::clone(&self.launches),
            })
        }

        fn claim_next_result(&self) {
            *self.claims.borrow_mut() += 1;
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    struct FixedResolver(&'static str);

    impl CroppedFileResolver for FixedResolver {
        fn local_file_path(&self, _output_uri: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn success_outcome(path: &'static str) -> CropOutcome {
        CropOutcome::Success {
            output_uri: "content://out/cropped".to_string(),
            resolver: Box::new(FixedResolver(path)),
        }
    }

    fn plugin_with_host() -> (CropPlugin, Rc<MockHost>) {
        let host = MockHost::new();
        let plugin = CropPlugin::new(
            Rc::clone(&host) as Rc<dyn HostActivity>,
            Rc::new(FixedClock(1_700_000_000_000)),
        );
        (plugin, host)
    }

    fn valid_params() -> Value {
        json!(["content://in/pic.jpg", { "quality": 80 }])
    }

    #[test]
    fn slot_is_idle_until_first_dispatch() {
        let (plugin, _host) = plugin_with_host();
        assert!(plugin.pending.is_idle());
    }

    #[test]
    fn unknown_action_is_not_handled_and_emits_nothing() {
        let (plugin, host) = plugin_with_host();
        let (ctx, kept_alive, successes, errors) = RecordingCtx::new();

        let outcome = plugin.execute("rotateImage", &valid_params(), ctx);

        assert_eq!(outcome, DispatchOutcome::NotHandled);
        assert!(plugin.pending.is_idle());
        assert_eq!(*kept_alive.borrow(), 0);
        assert!(successes.borrow().is_empty());
        assert!(errors.borrow().is_empty());
        assert!(host.launches.borrow().is_empty());
    }

    #[test]
    fn dispatch_installs_continuation_and_result_clears_it() {
        let (plugin, host) = plugin_with_host();
        let (ctx, kept_alive, successes, _errors) = RecordingCtx::new();

        assert_eq!(
            plugin.execute(ACTION_CROP_IMAGE, &valid_params(), ctx),
            DispatchOutcome::Handled
        );
        assert!(!plugin.pending.is_idle());
        assert_eq!(*kept_alive.borrow(), 1);
        assert_eq!(*host.claims.borrow(), 1);

        host.deliver(success_outcome("/cache/crop_1.jpg"));

        assert!(plugin.pending.is_idle());
        assert_eq!(
            successes.borrow().as_slice(),
            ["file:///cache/crop_1.jpg?1700000000000"]
        );
    }

    #[test]
    fn spurious_result_is_dropped_silently() {
        let (plugin, host) = plugin_with_host();

        host.deliver(success_outcome("/cache/crop_1.jpg"));

        assert!(plugin.pending.is_idle());
    }

    #[test]
    fn second_dispatch_abandons_first_caller() {
        let (plugin, host) = plugin_with_host();
        let (first_ctx, _, first_successes, first_errors) = RecordingCtx::new();
        let (second_ctx, _, second_successes, _) = RecordingCtx::new();

        plugin.execute(ACTION_CROP_IMAGE, &valid_params(), first_ctx);
        plugin.execute(ACTION_CROP_IMAGE, &valid_params(), second_ctx);

        host.deliver(success_outcome("/cache/crop_2.jpg"));

        // 终端回执只到第二位调用方，第一位被放弃
        assert!(first_successes.borrow().is_empty());
        assert!(first_errors.borrow().is_empty());
        assert_eq!(
            second_successes.borrow().as_slice(),
            ["file:///cache/crop_2.jpg?1700000000000"]
        );
        assert!(plugin.pending.is_idle());
    }

    #[test]
    fn malformed_args_reply_with_crop_error_without_keep_alive() {
        let (plugin, host) = plugin_with_host();
        let (ctx, kept_alive, _successes, errors) = RecordingCtx::new();

        let outcome = plugin.execute(ACTION_CROP_IMAGE, &json!(["only-path"]), ctx);

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(*kept_alive.borrow(), 0);
        assert!(plugin.pending.is_idle());
        assert!(host.launches.borrow().is_empty());

        let errors = errors.borrow();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, CODE_CROP_ERROR);
    }

    #[test]
    fn keep_alive_failure_aborts_dispatch() {
        let (plugin, host) = plugin_with_host();
        let (mut ctx, _, successes, errors) = RecordingCtx::new();
        ctx.fail_keep_alive = true;

        let outcome = plugin.execute(ACTION_CROP_IMAGE, &valid_params(), ctx);

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert!(plugin.pending.is_idle());
        assert!(host.launches.borrow().is_empty());
        assert!(successes.borrow().is_empty());
        assert!(errors.borrow().is_empty());
    }

    #[test]
    fn cancellation_routes_to_user_cancelled_reply() {
        let (plugin, host) = plugin_with_host();
        let (ctx, _, successes, errors) = RecordingCtx::new();

        plugin.execute(ACTION_CROP_IMAGE, &valid_params(), ctx);
        host.deliver(CropOutcome::Cancelled);

        assert!(successes.borrow().is_empty());
        let errors = errors.borrow();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, CODE_USER_CANCELLED);
        assert!(plugin.pending.is_idle());
    }
}
