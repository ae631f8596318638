//! UI 组件

pub mod header;
pub mod result_panel;
pub mod upload_panel;
