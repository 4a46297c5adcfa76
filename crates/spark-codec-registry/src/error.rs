//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 注册表的核心操作从不失败：未命中以 `None` 或空集合表达；
//! - 传输层在分发路径上往往希望直接 `?` 传播"找不到编解码器"，因此为 `require_*` 适配器提供统一错误域。
//!
//! ## 设计要求（What）
//! - 错误通过 `thiserror::Error` 派生，兼容 `std::error::Error`；
//! - 每个变体都携带模型键等可读上下文，并映射到稳定的错误码，便于日志聚合。

use thiserror::Error;

/// 注册表查询适配器的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把"键不存在"这一唯一失败原因转换为可传播、可观测的错误值；
/// - **契约 (What)**：所有变体均为 `Clone + Send + Sync + 'static`，可跨线程传递；
/// - **风险 (Trade-offs)**：上下文以 `String` 保存，构造时会分配；仅出现在失败路径上，热路径不受影响。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    /// 模型键下没有标识匹配的编解码器（含模型键从未注册或已被清空的情形）。
    #[error("codec `{codec_id}` is not registered for model key `{model_key}`")]
    CodecNotFound { model_key: String, codec_id: String },

    /// 模型键下没有任何类型登记。
    #[error("no codec type recorded for model key `{model_key}`")]
    TypeNotRecorded { model_key: String },
}

impl RegistryError {
    /// 稳定错误码，命名沿用 `<域>.<对象>.<原因>` 约定。
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::CodecNotFound { .. } => "registry.codec.missing",
            RegistryError::TypeNotRecorded { .. } => "registry.type.missing",
        }
    }

    /// 触发错误的模型键。
    pub fn model_key(&self) -> &str {
        match self {
            RegistryError::CodecNotFound { model_key, .. }
            | RegistryError::TypeNotRecorded { model_key } => model_key,
        }
    }
}
