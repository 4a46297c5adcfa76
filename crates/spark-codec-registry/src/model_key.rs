use std::{borrow::Borrow, fmt, sync::Arc};

/// `ModelKey` 标识一类数据模型（Schema），作为两张注册表共同的索引键。
///
/// # 教案式说明
/// - **意图 (Why)**：同一个模型键会被 `CodecRegistry` 与 `ModelKeyRegistry` 同时持有，
///   并在每次注册时克隆进日志字段；以 `Arc<str>` 承载可让克隆只增加引用计数。
/// - **契约 (What)**：
///   - 除字符串相等外不附加任何唯一性约束；
///   - 实现 `Borrow<str>`，且 `Hash`/`Eq` 与 `str` 完全一致，查询时可直接传入 `&str`。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey(Arc<str>);

impl ModelKey {
    /// 以任意字符串构造模型键。
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// 以 `&str` 视图访问模型键。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModelKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModelKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelKey {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ModelKey {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for ModelKey {
    fn from(value: &String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}

impl From<Arc<str>> for ModelKey {
    fn from(value: Arc<str>) -> Self {
        Self(value)
    }
}

impl From<&ModelKey> for ModelKey {
    fn from(value: &ModelKey) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        hash::{BuildHasher, RandomState},
    };

    #[test]
    fn hashes_like_borrowed_str() {
        let state = RandomState::new();
        let key = ModelKey::from("Order");
        assert_eq!(state.hash_one(&key), state.hash_one("Order"));
    }

    #[test]
    fn map_lookup_accepts_plain_str() {
        let mut map = HashMap::new();
        map.insert(ModelKey::from(String::from("Order")), 1);
        assert_eq!(map.get("Order"), Some(&1));
        assert_eq!(map.get("order"), None);
    }

    #[test]
    fn clones_share_storage() {
        let key = ModelKey::new("Quote");
        let copy = key.clone();
        assert!(std::ptr::eq(key.as_str(), copy.as_str()));
        assert_eq!(copy.to_string(), "Quote");
    }
}
