//! 裁剪活动契约：插件消费到的裁剪 UI 接口面——启动选项、结果变体
//! 与三个 trait 席位（启动器、宿主活动、路径解析器）。

use crate::crop::args::CropArgs;

/// 输出压缩格式。本插件固定使用 JPEG。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
}

/// 最大尺寸适配策略。固定“向内缩放”：保持比例收缩、从不放大。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    ResizeInside,
}

/// 裁剪活动启动选项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropOptions {
    /// 输入图片 URI。
    pub source_uri: String,
    /// 裁剪参考线叠层，固定开启。
    pub guidelines: bool,
    pub output_format: OutputFormat,
    pub quality: i32,
    /// 固定 1:1。
    pub aspect_ratio: (i32, i32),
    /// 最大输出宽度，-1 表示无上限。
    pub max_width: i32,
    /// 最大输出高度，-1 表示无上限。
    pub max_height: i32,
    pub resize_policy: ResizePolicy,
}

impl CropOptions {
    /// 由类型化入参构造启动选项。
    ///
    /// 调用方可调的只有质量与最大尺寸，其余均为固定配置。
    pub fn for_request(args: &CropArgs) -> Self {
        Self {
            source_uri: args.image_path.clone(),
            guidelines: true,
            output_format: OutputFormat::Jpeg,
            quality: args.quality,
            aspect_ratio: (1, 1),
            max_width: args.target_width,
            max_height: args.target_height,
            resize_policy: ResizePolicy::ResizeInside,
        }
    }
}

/// 上下文路径解析器：把裁剪产物 URI 解析为本地文件路径。
///
/// 由裁剪 UI 随成功结果一并提供，解析失败时返回 `None`。
pub trait CroppedFileResolver {
    fn local_file_path(&self, output_uri: &str) -> Option<String>;
}

/// 裁剪活动的一次结果。由注册的契约回调送达，恰好被消费一次。
pub enum CropOutcome {
    /// 裁剪成功：输出 URI + 上下文路径解析器。
    Success {
        output_uri: String,
        resolver: Box<dyn CroppedFileResolver>,
    },
    /// 用户取消。
    Cancelled,
    /// 裁剪失败，描述可能缺失。
    Failed { message: Option<String> },
}

/// 契约回调：注册一次，之后每次活动返回都经由它送回结果。
pub type CropResultCallback = Box<dyn FnMut(CropOutcome)>;

/// 启动句柄：注册契约后由宿主活动换取，插件生命周期内复用。
pub trait CropLauncher {
    fn launch(&self, options: CropOptions);
}

/// 宿主活动席位。
///
/// 注册必须发生在插件初始化阶段——宿主活动越过可登记窗口后便不再
/// 接受结果回调，这也是注册与请求处理分离的原因。
pub trait HostActivity {
    /// 注册裁剪活动结果契约，换取启动句柄。
    fn register_crop_contract(&self, on_result: CropResultCallback) -> Box<dyn CropLauncher>;

    /// 声明本插件接收下一次活动结果，宿主据此把结果路由回插件。
    fn claim_next_result(&self);
}
