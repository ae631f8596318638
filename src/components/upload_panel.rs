//! 图片上传面板：文件选择、本地预览、错误提示与提交按钮

use leptos::prelude::*;
use web_sys::HtmlInputElement;

use crate::app::AppSession;
use crate::state::DetectionOutcome;

#[component]
pub fn UploadPanel<FS, FD>(
    session: RwSignal<AppSession, LocalStorage>,
    on_file_change: FS,
    on_detect: FD,
) -> impl IntoView
where
    FS: Fn(Option<web_sys::File>) + 'static + Clone,
    FD: Fn(()) + 'static + Clone,
{
    let preview = move || session.with(|s| s.preview().map(str::to_string));
    let is_loading = move || session.with(|s| s.is_loading());
    let can_submit = move || session.with(|s| s.has_selection() && !s.is_loading());
    let error_message = move || {
        session.with(|s| match s.outcome() {
            DetectionOutcome::Failure(msg) => Some(msg.clone()),
            _ => None,
        })
    };

    let on_change = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let file = input.files().and_then(|files| files.get(0));
        on_file_change(file);
    };

    view! {
        <div class="card mb-4">
            <div class="card-header">"图片上传"</div>
            <div class="card-body">
                <div class="mb-3">
                    <label class="form-label">"选择图片"</label>
                    <input
                        type="file"
                        class="form-control"
                        accept="image/*"
                        on:change=on_change
                    />
                </div>

                {move || preview().map(|data_url| view! {
                    <div class="mb-3 text-center">
                        <h5>"预览"</h5>
                        <img src=data_url alt="预览" class="img-fluid preview-image" />
                    </div>
                })}

                {move || error_message().map(|msg| view! {
                    <div class="alert alert-danger">{msg}</div>
                })}

                <button
                    class="btn btn-primary w-100"
                    disabled=move || !can_submit()
                    on:click={
                        let on_detect = on_detect.clone();
                        move |_| on_detect(())
                    }
                >
                    {move || if is_loading() { "检测中..." } else { "开始检测" }}
                </button>
            </div>
        </div>
    }
}
