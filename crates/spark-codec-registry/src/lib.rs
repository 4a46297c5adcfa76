//! # spark-codec-registry
//!
//! ## 定位与职责（Why）
//! - 为传输层提供进程级的编解码器索引：模型键（数据模型/Schema 标识）→ 按注册顺序排列的编解码器集合；
//! - 同时维护一张副表，记录每个模型键最近一次注册的编解码器属于哪种具体实现，供收发两端推断模型类型。
//!
//! ## 架构嵌入（Where）
//! - [`CodecRegistry`]：注册 / 按 `id` 检索 / 全量检索 / 清空；注册时联动写入 [`ModelKeyRegistry`]；
//! - [`ModelKeyRegistry`]：模型键 → [`CodecKind`] 的后写者胜出登记表；
//! - [`Codec`]、[`CodecHandle`]、[`CodecKind`]：与外部编解码实现之间的最小接缝；
//! - [`RegistryError`]：`require_*` 适配器使用的错误域，核心操作本身从不失败。
//!
//! ## 实例与并发（How）
//! - 两张表都可以直接构造并注入；[`CodecRegistry::global`] 与 [`ModelKeyRegistry::global`] 惰性创建
//!   进程内唯一的逻辑实例，二者始终配对；
//! - 内部以 `DashMap` 保护，单个模型键上的注册与清空原子完成，读者只会看到完整的前态或后态。
//!
//! ## 使用示例
//!
//! ```
//! use std::sync::Arc;
//! use spark_codec_registry::{Codec, CodecKind, CodecRegistry};
//!
//! struct JsonCodec;
//!
//! impl Codec for JsonCodec {
//!     fn id(&self) -> &str {
//!         "Json"
//!     }
//! }
//!
//! let registry = CodecRegistry::new();
//! let codec = Arc::new(JsonCodec);
//! registry.register_shared("Order", Arc::clone(&codec));
//!
//! let found = registry.retrieve_codec("Order", "Json").expect("registered above");
//! assert!(found.refers_to(&*codec));
//! assert_eq!(
//!     registry.model_key_registry().try_get_type("Order"),
//!     Some(CodecKind::of::<JsonCodec>())
//! );
//! ```

pub mod codec;
pub mod error;
pub mod model_key;
pub mod model_keys;
pub mod registry;

pub use crate::codec::{Codec, CodecHandle, CodecKind};
pub use crate::error::RegistryError;
pub use crate::model_key::ModelKey;
pub use crate::model_keys::ModelKeyRegistry;
pub use crate::registry::CodecRegistry;
