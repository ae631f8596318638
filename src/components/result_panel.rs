//! 检测结果面板：对当前状态的纯投影，无副作用、不发请求

use leptos::prelude::*;

use crate::app::AppSession;
use crate::state::{Detection, DetectionOutcome};

/// 读数格式化：保留 3 位小数并带单位，空值显示 N/A
pub fn format_scale_value(scale_value: Option<f64>) -> String {
    match scale_value {
        Some(value) => format!("{value:.3} MPa"),
        None => "N/A".to_string(),
    }
}

/// 边界框格式化：各坐标保留 2 位小数，逗号连接
pub fn format_bbox(bbox: &[f64; 4]) -> String {
    let coords: Vec<String> = bbox.iter().map(|c| format!("{c:.2}")).collect();
    format!("[{}]", coords.join(", "))
}

#[component]
pub fn ResultPanel(session: RwSignal<AppSession, LocalStorage>) -> impl IntoView {
    let outcome = move || session.with(|s| s.outcome().clone());

    view! {
        <div class="card mb-4">
            <div class="card-header">"检测结果"</div>
            <div class="card-body">
                {move || match outcome() {
                    DetectionOutcome::Loading => view! {
                        <div class="text-center text-muted">
                            <div class="spinner-border" role="status"></div>
                            <p class="mt-2">"检测中..."</p>
                        </div>
                    }
                    .into_any(),
                    DetectionOutcome::Success(detection) => success_view(detection).into_any(),
                    DetectionOutcome::Idle | DetectionOutcome::Failure(_) => view! {
                        <p class="text-muted text-center">"等待图片上传和检测..."</p>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}

fn success_view(detection: Detection) -> impl IntoView {
    view! {
        <div class="text-center">
            <h5>"输出图像"</h5>
            <img src=detection.output_image.clone() alt="检测结果" class="img-fluid mb-3" />
            {(!detection.results.is_empty()).then(|| view! {
                <div>
                    <h5>"检测详情:"</h5>
                    {detection
                        .results
                        .iter()
                        .map(|result| view! {
                            <div class="mb-2">
                                <p><strong>"类型: "</strong>{result.kind.clone()}</p>
                                <p><strong>"读数: "</strong>{format_scale_value(result.scale_value)}</p>
                                <p><strong>"边界框: "</strong>{format_bbox(&result.bbox)}</p>
                            </div>
                        })
                        .collect_view()}
                </div>
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_scale_value_rounds_to_three_decimals() {
        assert_eq!(format_scale_value(Some(1.23456)), "1.235 MPa");
    }

    #[test]
    fn test_format_scale_value_pads_to_three_decimals() {
        assert_eq!(format_scale_value(Some(0.5)), "0.500 MPa");
    }

    #[test]
    fn test_format_scale_value_missing() {
        assert_eq!(format_scale_value(None), "N/A");
    }

    #[test]
    fn test_format_bbox_two_decimals() {
        assert_eq!(format_bbox(&[1.0, 2.0, 3.0, 4.0]), "[1.00, 2.00, 3.00, 4.00]");
    }

    #[test]
    fn test_format_bbox_rounds() {
        assert_eq!(
            format_bbox(&[10.456, 20.004, 310.119, 240.987]),
            "[10.46, 20.00, 310.12, 240.99]"
        );
    }
}
