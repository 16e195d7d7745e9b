// src/types.rs
use std::path::PathBuf;
use crate::signal::{ParsedResult, SessionPlan, SignalError};

// 待解析的数据来源
#[derive(Clone, Debug)]
pub enum ParseSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
    Synthetic(SessionPlan),
}

impl ParseSource {
    pub fn label(&self) -> String {
        match self {
            ParseSource::Path(path) => path.display().to_string(),
            ParseSource::Bytes { name, .. } => name.clone(),
            ParseSource::Synthetic(plan) => format!("demo session ({:.0}s)", plan.duration_sec),
        }
    }
}

// GUI 发给后台的命令
#[derive(Clone, Debug)]
pub enum LoaderCommand {
    Parse { request_id: u64, source: ParseSource },
    Shutdown,
}

// 后台发给 GUI 的消息
#[derive(Debug)]
pub enum LoaderMessage {
    Log(String),
    Parsed {
        request_id: u64,
        result: Result<ParsedResult, SignalError>,
    },
}
