//! API Module - Operator console surface
//!
//! `app` gắn các thành phần lại với nhau; `commands` parse và thực thi lệnh.

pub mod app;
pub mod commands;
