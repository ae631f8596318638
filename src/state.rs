//! 交互状态机：文件选择 → 预览 → 提交检测 → 成功/失败

use crate::api::detect::{DetectError, DetectionResult};

/// 一次成功检测的完整结果
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// 服务端标注后的图像（Data URL，可直接渲染）
    pub output_image: String,
    pub results: Vec<DetectionResult>,
}

/// 当前提交周期的状态
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DetectionOutcome {
    #[default]
    Idle,
    Loading,
    Success(Detection),
    Failure(String),
}

/// 预览读取的世代令牌：只有仍为最新选择时结果才会被应用
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionToken(u64);

/// 检测请求的世代令牌：过期响应会被丢弃
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequestToken(u64);

/// 单个上传会话的全部 UI 状态
///
/// 对文件句柄类型泛型化：应用中为 `web_sys::File`，
/// 测试中可用任意占位类型在原生环境下驱动状态机。
pub struct Session<F> {
    selected: Option<F>,
    preview: Option<String>,
    outcome: DetectionOutcome,
    selection_gen: u64,
    request_gen: u64,
}

impl<F> Default for Session<F> {
    fn default() -> Self {
        Self {
            selected: None,
            preview: None,
            outcome: DetectionOutcome::Idle,
            selection_gen: 0,
            request_gen: 0,
        }
    }
}

impl<F> Session<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&F> {
        self.selected.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn outcome(&self) -> &DetectionOutcome {
        &self.outcome
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.outcome, DetectionOutcome::Loading)
    }

    /// 选择新文件。立即替换选中项并把结果状态重置为 Idle；
    /// 预览保留旧值，直到对应的异步读取完成。
    /// 两个世代同时推进，在途的预览读取与检测请求一并失效。
    pub fn select(&mut self, file: F) -> SelectionToken {
        self.selected = Some(file);
        self.outcome = DetectionOutcome::Idle;
        self.selection_gen += 1;
        self.request_gen += 1;
        SelectionToken(self.selection_gen)
    }

    /// 清空选择。选中项与预览同时置空，幂等。
    pub fn clear(&mut self) {
        self.selected = None;
        self.preview = None;
        self.outcome = DetectionOutcome::Idle;
        self.selection_gen += 1;
        self.request_gen += 1;
    }

    /// 应用预览读取结果。令牌过期（期间又选了别的文件）则丢弃。
    pub fn apply_preview(&mut self, token: SelectionToken, data_url: String) {
        if token.0 == self.selection_gen && self.selected.is_some() {
            self.preview = Some(data_url);
        }
    }

    /// 本地读取失败：退化为无预览，不阻塞选择。
    pub fn preview_failed(&mut self, token: SelectionToken) {
        if token.0 == self.selection_gen {
            self.preview = None;
        }
    }

    /// 开始一次提交。未选择文件时不发请求，直接进入 Failure；
    /// 否则进入 Loading 并推进请求世代（旧请求的响应随之失效）。
    pub fn begin_submit(&mut self) -> Option<RequestToken> {
        if self.selected.is_none() {
            self.outcome = DetectionOutcome::Failure(DetectError::NoFileSelected.to_string());
            return None;
        }
        self.outcome = DetectionOutcome::Loading;
        self.request_gen += 1;
        Some(RequestToken(self.request_gen))
    }

    /// 应用检测结果。令牌不再是当前请求世代时丢弃，
    /// 保证过期响应不会覆盖更新的状态。
    pub fn complete(&mut self, token: RequestToken, result: Result<Detection, DetectError>) {
        if token.0 != self.request_gen {
            return;
        }
        self.outcome = match result {
            Ok(detection) => DetectionOutcome::Success(detection),
            Err(err) => DetectionOutcome::Failure(err.to_string()),
        };
    }
}
