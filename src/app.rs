//! 主应用组件：持有会话状态，接线文件选择、预览读取与检测提交

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::detect::{self, DetectError};
use crate::components::{header::Header, result_panel::ResultPanel, upload_panel::UploadPanel};
use crate::state::{Detection, Session};

/// 应用侧的会话状态（文件句柄为浏览器 File）
pub type AppSession = Session<web_sys::File>;

#[component]
pub fn App() -> impl IntoView {
    // web_sys::File 非 Send，会话放在线程本地的信号里
    let session: RwSignal<AppSession, LocalStorage> = RwSignal::new_local(Session::new());

    // 文件选择：选中项立即生效，预览异步读取，世代令牌保证后选者胜出
    let on_file_change = move |file: Option<web_sys::File>| match file {
        Some(file) => {
            let Some(token) = session.try_update(|s| s.select(file.clone())) else {
                return;
            };
            spawn_local(async move {
                match read_as_data_url(&file).await {
                    Ok(data_url) => session.update(|s| s.apply_preview(token, data_url)),
                    Err(_) => session.update(|s| s.preview_failed(token)),
                }
            });
        }
        None => session.update(|s| s.clear()),
    };

    // 提交检测：每次调用恰好一次请求，过期响应在 complete 里被丢弃
    let on_detect = move |_: ()| {
        let Some(token) = session.try_update(|s| s.begin_submit()).flatten() else {
            return;
        };
        let Some(file) = session.with_untracked(|s| s.selected_file().cloned()) else {
            return;
        };
        spawn_local(async move {
            let result = run_detection(&file).await;
            if let Err(err) = &result {
                gloo::console::error!(format!("检测失败: {err}"));
            }
            session.update(|s| s.complete(token, result));
        });
    };

    view! {
        <div class="container my-4">
            <Header />
            <div class="row">
                <div class="col-md-6">
                    <UploadPanel
                        session=session
                        on_file_change=on_file_change
                        on_detect=on_detect
                    />
                </div>
                <div class="col-md-6">
                    <ResultPanel session=session />
                </div>
            </div>
        </div>
    }
}

/// 提交流程：读取文件字节 → 去掉 Data URL 前缀 → 调用检测接口 →
/// 把返回图像重新包装为可渲染的 Data URL
async fn run_detection(file: &web_sys::File) -> Result<Detection, DetectError> {
    let data_url = read_as_data_url(file)
        .await
        .map_err(|e| DetectError::Transport(e.to_string()))?;
    let payload = detect::extract_base64_from_data_url(&data_url)
        .ok_or_else(|| DetectError::Transport("无法读取图片数据".to_string()))?;
    let response = detect::detect_single(payload).await?;
    Ok(Detection {
        output_image: detect::as_data_url(&response.output_image),
        results: response.results,
    })
}

async fn read_as_data_url(file: &web_sys::File) -> Result<String, gloo::file::FileReadError> {
    let file = gloo::file::File::from(file.clone());
    gloo::file::futures::read_as_data_url(&file).await
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use crate::api::detect::extract_base64_from_data_url;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn jpeg_file(contents: &str) -> web_sys::File {
        let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(contents));
        let options = web_sys::FilePropertyBag::new();
        options.set_type("image/jpeg");
        web_sys::File::new_with_str_sequence_and_options(&parts, "meter.jpg", &options)
            .expect("File 构造失败")
    }

    #[wasm_bindgen_test]
    async fn wasm_read_then_strip_prefix_yields_payload() {
        let file = jpeg_file("foo");
        let data_url = read_as_data_url(&file).await.expect("读取失败");
        assert!(data_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(extract_base64_from_data_url(&data_url), Some("Zm9v"));
    }

    #[wasm_bindgen_test]
    fn wasm_app_mounts_with_prompt_state() {
        // 断言期间应用须保持挂载
        std::mem::forget(leptos::mount::mount_to_body(App));

        let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
        let html = body.inner_html();
        assert!(html.contains("仪表读数识别系统"));
        assert!(html.contains("开始检测"));
        assert!(html.contains("等待图片上传和检测..."));
    }
}
