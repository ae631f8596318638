//! 检测服务 API 封装

pub mod detect;
