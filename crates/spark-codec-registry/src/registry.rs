//! # CodecRegistry：模型键 → 有序编解码器集合
//!
//! ## 核心意图（Why）
//! - 传输层的发送/接收端在启动时登记各模型可用的编解码器，在稳态收发时按线上携带的编解码标识挑选实现；
//! - 注册表只做索引：不构造、不校验、不序列化编解码器，也从不销毁句柄背后的对象。
//!
//! ## 行为契约（What）
//! - `register_codec`：追加到该模型键的有序序列末尾，再把具体类型转交 [`ModelKeyRegistry`]；
//! - `retrieve_codec`：按插入顺序线性扫描，首个 `id` 命中者胜出；
//! - `retrieve_codecs`：返回有序快照，未注册的模型键得到空集合而非错误；
//! - `clear_codecs`：移除整条序列，幂等，不影响类型登记。
//!
//! ## 并发语义（How）
//! - 以 `DashMap` 分片锁保护每个模型键的序列：同一键上的追加与清空在分片锁内原子完成，
//!   并发读取只会看到变更前或变更后的完整序列；
//! - 类型登记在同一把分片锁内写入，同一模型键上的并发注册结束后，类型登记必然对应序列末尾的编解码器；
//! - 读者不持有该锁，查询类型与检索序列是两次独立读取，可能短暂看到"编解码器已可检索、类型仍为旧值"。

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::{
    codec::{Codec, CodecHandle},
    error::RegistryError,
    model_key::ModelKey,
    model_keys::ModelKeyRegistry,
};

static GLOBAL_CODECS: OnceLock<CodecRegistry> = OnceLock::new();

/// 模型键到有序编解码器集合的并发注册表。
///
/// # 教案式注释
/// - **意图 (Why)**：集中管理各模型的编解码器，避免发送端与接收端各自维护列表导致选择结果不一致；
/// - **契约 (What)**：
///   - 插入顺序即检索顺序，重复 `id` 不去重也不拒绝；
///   - 所有操作都不会失败，缺失以 `None`/空集合表达；
///   - 每次注册都会把编解码器的 [`CodecKind`](crate::CodecKind) 写入关联的 [`ModelKeyRegistry`]。
/// - **实例 (Where)**：进程内只需要一个逻辑实例，通过 [`CodecRegistry::global`] 获取；
///   测试或宿主也可以用 [`CodecRegistry::new`]/[`CodecRegistry::with_model_keys`] 构造独立实例并显式注入。
#[derive(Debug)]
pub struct CodecRegistry {
    codecs: DashMap<ModelKey, Vec<CodecHandle>>,
    model_keys: Arc<ModelKeyRegistry>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// 创建空注册表，并配套一张独立的 [`ModelKeyRegistry`]。
    pub fn new() -> Self {
        Self::with_model_keys(Arc::new(ModelKeyRegistry::new()))
    }

    /// 创建空注册表，类型登记写入给定的 [`ModelKeyRegistry`]。
    pub fn with_model_keys(model_keys: Arc<ModelKeyRegistry>) -> Self {
        Self {
            codecs: DashMap::new(),
            model_keys,
        }
    }

    /// 进程级共享实例，首次访问时惰性创建，始终与 [`ModelKeyRegistry::global`] 配对。
    pub fn global() -> &'static CodecRegistry {
        GLOBAL_CODECS.get_or_init(|| CodecRegistry::with_model_keys(ModelKeyRegistry::global()))
    }

    /// 关联的类型登记表。
    pub fn model_key_registry(&self) -> &Arc<ModelKeyRegistry> {
        &self.model_keys
    }

    /// 为模型键注册编解码器。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：
    ///   1. 在分片锁内把句柄追加到序列末尾，序列不存在时先创建；
    ///   2. 仍持有该锁时把 `(model_key, codec.kind())` 写入关联的 [`ModelKeyRegistry`]，
    ///      因此类型登记始终对应最后一次追加的编解码器。
    /// - **契约 (What)**：总是成功；重复 `id` 的句柄同样被保留，但按 `id` 检索时只会命中更早的那个。
    pub fn register_codec(&self, model_key: impl Into<ModelKey>, codec: impl Into<CodecHandle>) {
        let model_key = model_key.into();
        let codec = codec.into();
        let kind = codec.kind();

        // 追加与类型登记同处序列分片锁内；锁顺序固定为 codecs 分片 → records 分片。
        let position = {
            let mut sequence = self.codecs.entry(model_key.clone()).or_default();
            sequence.push(codec.clone());
            self.model_keys.register_type(model_key.clone(), kind);
            sequence.len()
        };

        debug!(
            model_key = %model_key,
            codec_id = codec.id(),
            codec_kind = %kind,
            position,
            "codec registered"
        );
    }

    /// 以共享所有权注册具体编解码器。
    pub fn register_shared<C: Codec>(&self, model_key: impl Into<ModelKey>, codec: Arc<C>) {
        self.register_codec(model_key, CodecHandle::shared(codec));
    }

    /// 注册 `'static` 生命周期的编解码器，适合进程级单例实现。
    pub fn register_static<C: Codec>(&self, model_key: impl Into<ModelKey>, codec: &'static C) {
        self.register_codec(model_key, CodecHandle::from_static(codec));
    }

    /// 按 `id` 检索编解码器。
    ///
    /// 模型键不存在或没有匹配项时返回 `None`；重复 `id` 时返回最早注册的那个。
    pub fn retrieve_codec(&self, model_key: &str, codec_id: &str) -> Option<CodecHandle> {
        let found = self.codecs.get(model_key).and_then(|sequence| {
            sequence
                .iter()
                .find(|codec| codec.id() == codec_id)
                .cloned()
        });
        if found.is_none() {
            trace!(model_key, codec_id, "codec lookup missed");
        }
        found
    }

    /// 与 [`Self::retrieve_codec`] 相同，但以 [`RegistryError::CodecNotFound`] 表达缺失，便于 `?` 传播。
    pub fn require_codec(
        &self,
        model_key: &str,
        codec_id: &str,
    ) -> Result<CodecHandle, RegistryError> {
        self.retrieve_codec(model_key, codec_id)
            .ok_or_else(|| RegistryError::CodecNotFound {
                model_key: model_key.to_owned(),
                codec_id: codec_id.to_owned(),
            })
    }

    /// 返回模型键下全部编解码器的有序快照。
    ///
    /// - **契约 (What)**：顺序与注册顺序一致；未注册或已清空的模型键返回空集合；
    /// - **风险 (Trade-offs)**：快照不会反映之后的注册或清空，修改快照也不会影响注册表。
    pub fn retrieve_codecs(&self, model_key: &str) -> Vec<CodecHandle> {
        self.codecs
            .get(model_key)
            .map(|sequence| sequence.value().clone())
            .unwrap_or_default()
    }

    /// 模型键下全部编解码器的 `id`，按注册顺序排列。
    pub fn codec_ids(&self, model_key: &str) -> Vec<String> {
        self.codecs
            .get(model_key)
            .map(|sequence| sequence.iter().map(|codec| codec.id().to_owned()).collect())
            .unwrap_or_default()
    }

    /// 清空模型键下的全部编解码器，返回被移除的句柄数量。
    ///
    /// 幂等：对未注册的模型键返回 0。类型登记保持不变。
    pub fn clear_codecs(&self, model_key: &str) -> usize {
        let removed = self
            .codecs
            .remove(model_key)
            .map_or(0, |(_, sequence)| sequence.len());
        if removed > 0 {
            debug!(model_key, removed, "codecs cleared");
        }
        removed
    }

    /// 模型键下是否至少有一个编解码器。
    pub fn contains_model(&self, model_key: &str) -> bool {
        self.codecs.contains_key(model_key)
    }

    /// 当前持有编解码器的模型键，顺序不保证。
    pub fn model_keys(&self) -> Vec<ModelKey> {
        self.codecs.iter().map(|entry| entry.key().clone()).collect()
    }

    /// 持有编解码器的模型键数量。
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// 注册表是否为空。
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecKind;
    use tracing_test::traced_test;

    struct MockCodec {
        id: String,
    }

    impl MockCodec {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self { id: id.to_owned() })
        }
    }

    impl Codec for MockCodec {
        fn id(&self) -> &str {
            &self.id
        }
    }

    struct OtherCodec;

    impl Codec for OtherCodec {
        fn id(&self) -> &str {
            "Other"
        }
    }

    static OTHER: OtherCodec = OtherCodec;

    #[test]
    fn register_then_retrieve_returns_same_object() {
        let registry = CodecRegistry::new();
        let codec = MockCodec::new("TestCodec");
        registry.register_shared("Model1", Arc::clone(&codec));

        let retrieved = registry
            .retrieve_codec("Model1", "TestCodec")
            .expect("codec should be registered");
        assert!(retrieved.refers_to(&*codec));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_model_key_is_empty_not_error() {
        let registry = CodecRegistry::new();
        assert!(registry.retrieve_codecs("Missing").is_empty());
        assert!(registry.retrieve_codec("Missing", "Any").is_none());
        assert!(registry.codec_ids("Missing").is_empty());
        assert!(!registry.contains_model("Missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_is_idempotent_and_keeps_type_record() {
        let registry = CodecRegistry::new();
        registry.register_shared("Model1", MockCodec::new("A"));
        registry.register_shared("Model1", MockCodec::new("B"));

        assert_eq!(registry.clear_codecs("Model1"), 2);
        assert_eq!(registry.clear_codecs("Model1"), 0);
        assert_eq!(registry.clear_codecs("NeverSeen"), 0);

        assert!(registry.retrieve_codecs("Model1").is_empty());
        assert!(registry.retrieve_codec("Model1", "A").is_none());
        assert_eq!(
            registry.model_key_registry().try_get_type("Model1"),
            Some(CodecKind::of::<MockCodec>())
        );
    }

    #[test]
    fn register_after_clear_starts_fresh_sequence() {
        let registry = CodecRegistry::new();
        registry.register_shared("Model1", MockCodec::new("A"));
        registry.clear_codecs("Model1");
        registry.register_static("Model1", &OTHER);

        assert_eq!(registry.codec_ids("Model1"), vec!["Other".to_owned()]);
        assert_eq!(
            registry.model_key_registry().try_get_type("Model1"),
            Some(CodecKind::of::<OtherCodec>())
        );
    }

    #[test]
    fn injected_model_key_registry_receives_records() {
        let model_keys = Arc::new(ModelKeyRegistry::new());
        let registry = CodecRegistry::with_model_keys(Arc::clone(&model_keys));
        registry.register_static("Quote", &OTHER);

        assert!(Arc::ptr_eq(registry.model_key_registry(), &model_keys));
        assert_eq!(
            model_keys.try_get_type("Quote"),
            Some(CodecKind::of::<OtherCodec>())
        );
    }

    #[test]
    fn snapshot_is_detached_from_registry() {
        let registry = CodecRegistry::new();
        registry.register_shared("Model1", MockCodec::new("A"));

        let mut snapshot = registry.retrieve_codecs("Model1");
        registry.register_shared("Model1", MockCodec::new("B"));
        snapshot.clear();

        assert_eq!(registry.codec_ids("Model1"), vec!["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn model_keys_lists_populated_keys_only() {
        let registry = CodecRegistry::new();
        registry.register_shared("Order", MockCodec::new("Csv"));
        registry.register_shared("Quote", MockCodec::new("Csv"));
        registry.clear_codecs("Quote");

        let keys = registry.model_keys();
        assert_eq!(keys, vec![ModelKey::from("Order")]);
    }

    #[test]
    #[traced_test]
    fn registration_and_clear_are_logged() {
        let registry = CodecRegistry::new();
        registry.register_shared("Traced", MockCodec::new("Json"));
        registry.clear_codecs("Traced");

        assert!(logs_contain("codec registered"));
        assert!(logs_contain("Json"));
        assert!(logs_contain("codecs cleared"));
    }
}
