//! # ModelKeyRegistry：模型键 → 编解码器类型登记表
//!
//! ## 核心意图（Why）
//! - 记录每个模型键"最近一次注册的编解码器属于哪种具体实现"，供传输层在收发两端推断模型类型；
//! - 与 `CodecRegistry` 解耦：本表只保存一条 [`CodecKind`]，与该键下有多少个编解码器无关。
//!
//! ## 行为契约（What）
//! - `register_type`：覆盖写（last-write-wins），返回旧值；
//! - `try_get_type`：唯一带显式成功/失败信号的查询，以 `Option` 表达；
//! - 清空 `CodecRegistry` 中的编解码器不会影响本表。
//!
//! ## 风险提示（Trade-offs）
//! - 表项只增不删，模型键数量通常有限；若出现动态生成的模型键，需要上层控制其规模。

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use crate::{codec::CodecKind, error::RegistryError, model_key::ModelKey};

static GLOBAL_MODEL_KEYS: OnceLock<Arc<ModelKeyRegistry>> = OnceLock::new();

/// 模型键到编解码器类型的并发登记表。
///
/// # 教案式注释
/// - **意图 (Why)**：封装 `DashMap`，对外只暴露登记与查询两种语义；
/// - **契约 (What)**：每个模型键至多一条记录；所有操作线程安全且不会阻塞在分片锁之外；
/// - **实例 (Where)**：既可 `new` 出独立实例注入到 [`CodecRegistry`](crate::CodecRegistry)，
///   也可通过 [`ModelKeyRegistry::global`] 取得进程级实例。
#[derive(Debug, Default)]
pub struct ModelKeyRegistry {
    records: DashMap<ModelKey, CodecKind>,
}

impl ModelKeyRegistry {
    /// 创建空登记表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级共享实例，首次访问时惰性创建，生命周期与进程一致。
    pub fn global() -> Arc<ModelKeyRegistry> {
        Arc::clone(GLOBAL_MODEL_KEYS.get_or_init(|| Arc::new(ModelKeyRegistry::new())))
    }

    /// 登记模型键对应的编解码器类型，覆盖已有记录。
    ///
    /// - **调用方**：通常由 [`CodecRegistry::register_codec`](crate::CodecRegistry::register_codec) 间接调用；
    /// - **返回值**：若先前存在记录则返回旧值，便于上层感知实现切换；
    /// - **后置条件**：随后的 `try_get_type(model_key)` 必然返回 `Some(kind)`，直到再次被覆盖。
    pub fn register_type(
        &self,
        model_key: impl Into<ModelKey>,
        kind: CodecKind,
    ) -> Option<CodecKind> {
        let model_key = model_key.into();
        let previous = self.records.insert(model_key.clone(), kind);
        if let Some(previous) = previous.filter(|previous| *previous != kind) {
            debug!(
                model_key = %model_key,
                previous_kind = %previous,
                codec_kind = %kind,
                "codec type record replaced"
            );
        }
        previous
    }

    /// 查询模型键最近登记的编解码器类型；未登记时返回 `None`。
    pub fn try_get_type(&self, model_key: &str) -> Option<CodecKind> {
        self.records.get(model_key).map(|record| *record.value())
    }

    /// 与 [`Self::try_get_type`] 相同，但以 [`RegistryError::TypeNotRecorded`] 表达缺失。
    pub fn require_type(&self, model_key: &str) -> Result<CodecKind, RegistryError> {
        self.try_get_type(model_key)
            .ok_or_else(|| RegistryError::TypeNotRecorded {
                model_key: model_key.to_owned(),
            })
    }

    /// 已登记的模型键数量。
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 登记表是否为空。
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
