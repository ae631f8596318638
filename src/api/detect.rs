//! 仪表检测接口（POST /v1/det/single）
//!
//! 请求体为 `{"data": <base64>}`，payload 不带 `data:image/...;base64,` 前缀；
//! 成功响应携带标注后的图像（同样不带前缀）与逐表读数列表。

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

const DETECT_ENDPOINT: &str = "/v1/det/single";

/// 检测请求
#[derive(Serialize)]
pub struct DetectRequest {
    /// Base64 编码的图像字节（无 Data URL 前缀）
    pub data: String,
}

/// 检测成功响应
#[derive(Deserialize)]
pub struct DetectResponse {
    /// 标注后的 JPEG 图像，Base64 编码（无前缀）
    pub output_image: String,
    pub results: Vec<DetectionResult>,
}

/// 单个仪表的检测结果
///
/// `bbox` 的坐标约定由服务端定义（当前实现为 [x, y, w, h]）；
/// 客户端只原样展示数值，不做几何解释。
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DetectionResult {
    #[serde(rename = "type")]
    pub kind: String,
    /// 读数（单位 MPa），无法读取时为 null
    pub scale_value: Option<f64>,
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
}

/// 非 2xx 响应的错误体，`error` 字段可缺省
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// 检测失败的分类
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DetectError {
    /// 本地前置条件失败，不发起网络请求
    #[error("请选择一张图片进行检测。")]
    NoFileSelected,
    /// 服务端返回非 2xx；detail 取自错误体，缺省时由状态码合成
    #[error("{detail}")]
    Service { status: u16, detail: String },
    /// 网络失败或响应体不可解析
    #[error("{0}")]
    Transport(String),
}

/// 从 Data URL 中提取 Base64 数据部分
///
/// `"data:image/jpeg;base64,/9j/4AAQ..."` → `"/9j/4AAQ..."`，
/// 格式不符时返回 None。
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// 把服务端返回的 Base64 图像包装为可渲染的 Data URL
pub fn as_data_url(encoded: &str) -> String {
    format!("data:image/jpeg;base64,{encoded}")
}

/// 调用检测接口，一次调用恰好一次请求、一次响应
pub async fn detect_single(payload: &str) -> Result<DetectResponse, DetectError> {
    let body = serde_json::to_string(&DetectRequest {
        data: payload.to_string(),
    })
    .map_err(|e| DetectError::Transport(e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(DETECT_ENDPOINT, &opts).map_err(js_transport)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_transport)?;

    let window = web_sys::window().ok_or_else(|| DetectError::Transport("window 不可用".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_transport)?;
    let resp: Response = resp_value.dyn_into().map_err(js_transport)?;

    if !resp.ok() {
        return Err(service_error(&resp).await);
    }

    let json = JsFuture::from(resp.json().map_err(js_transport)?)
        .await
        .map_err(js_transport)?;
    serde_wasm_bindgen::from_value(json).map_err(|e| DetectError::Transport(e.to_string()))
}

/// 非 2xx：尝试解析 `{"error": ...}`，失败则回退为状态码消息。
/// 错误体按文本读取再宽松解析，空响应体不会变成解析错误。
async fn service_error(resp: &Response) -> DetectError {
    let status = resp.status();
    let text = match resp.text() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    };
    DetectError::Service {
        status,
        detail: error_detail(status, &text),
    }
}

fn error_detail(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("HTTP 错误: {status}"))
}

fn js_transport(value: JsValue) -> DetectError {
    DetectError::Transport(js_error_message(&value))
}

/// JS 异常 → 可展示的错误描述
fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // Data URL 工具
    // =============================================

    #[test]
    fn test_extract_base64_from_data_url_jpeg() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
        assert_eq!(
            extract_base64_from_data_url(data_url),
            Some("/9j/4AAQSkZJRg==")
        );
    }

    #[test]
    fn test_extract_base64_from_data_url_png() {
        let data_url = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(extract_base64_from_data_url(data_url), Some("iVBORw0KGgo="));
    }

    #[test]
    fn test_extract_base64_from_data_url_invalid() {
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
    }

    #[test]
    fn test_extract_base64_from_data_url_empty() {
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_as_data_url() {
        assert_eq!(as_data_url("Zm9v"), "data:image/jpeg;base64,Zm9v");
    }

    // =============================================
    // 请求/响应 序列化
    // =============================================

    #[test]
    fn test_detect_request_serialize() {
        let request = DetectRequest {
            data: "Zm9v".to_string(),
        };
        let json = serde_json::to_string(&request).expect("序列化失败");
        assert_eq!(json, r#"{"data":"Zm9v"}"#);
    }

    #[test]
    fn test_detect_response_deserialize() {
        let json = r#"{
            "output_image": "Zm9v",
            "results": [
                {"type": "meter", "scale_value": 0.512, "box": [10.0, 20.0, 100.0, 120.0]}
            ]
        }"#;

        let response: DetectResponse = serde_json::from_str(json).expect("反序列化失败");
        assert_eq!(response.output_image, "Zm9v");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].kind, "meter");
        assert_eq!(response.results[0].scale_value, Some(0.512));
        assert_eq!(response.results[0].bbox, [10.0, 20.0, 100.0, 120.0]);
    }

    #[test]
    fn test_detect_response_tolerates_extra_fields() {
        // 线上服务会额外返回 angle 字段
        let json = r#"{
            "output_image": "Zm9v",
            "results": [
                {"type": "meter", "scale_value": 1.23456, "box": [1, 2, 3, 4], "angle": -1}
            ]
        }"#;

        let response: DetectResponse = serde_json::from_str(json).expect("反序列化失败");
        assert_eq!(response.results[0].scale_value, Some(1.23456));
    }

    #[test]
    fn test_detect_response_null_scale_value() {
        let json = r#"{
            "output_image": "Zm9v",
            "results": [{"type": "meter", "scale_value": null, "box": [0, 0, 1, 1]}]
        }"#;

        let response: DetectResponse = serde_json::from_str(json).expect("反序列化失败");
        assert_eq!(response.results[0].scale_value, None);
    }

    // =============================================
    // 错误映射
    // =============================================

    #[test]
    fn test_error_detail_from_body() {
        assert_eq!(error_detail(400, r#"{"error":"bad image"}"#), "bad image");
    }

    #[test]
    fn test_error_detail_missing_field_falls_back_to_status() {
        assert_eq!(error_detail(500, r#"{}"#), "HTTP 错误: 500");
    }

    #[test]
    fn test_error_detail_empty_body_falls_back_to_status() {
        assert_eq!(error_detail(502, ""), "HTTP 错误: 502");
    }

    #[test]
    fn test_error_detail_non_json_body_falls_back_to_status() {
        assert_eq!(error_detail(503, "Bad Gateway"), "HTTP 错误: 503");
    }

    #[test]
    fn test_no_file_selected_message() {
        assert_eq!(DetectError::NoFileSelected.to_string(), "请选择一张图片进行检测。");
    }

    #[test]
    fn test_service_error_displays_detail_only() {
        let err = DetectError::Service {
            status: 400,
            detail: "bad image".to_string(),
        };
        assert_eq!(err.to_string(), "bad image");
    }

    #[test]
    fn test_transport_error_displays_cause() {
        let err = DetectError::Transport("Failed to fetch".to_string());
        assert_eq!(err.to_string(), "Failed to fetch");
    }
}
