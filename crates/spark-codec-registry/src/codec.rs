//! # codec 模块说明
//!
//! ## 角色定位（Why）
//! - 注册表只负责"索引"编解码器，不负责构造、校验或序列化；因此这里只定义注册表与外部实现之间的最小接缝：
//!   [`Codec`] 契约、标识具体实现类型的 [`CodecKind`]，以及注册表内部保存的 [`CodecHandle`]。
//!
//! ## 所有权约定（What）
//! - [`CodecHandle`] 只有两种形态：共享所有权 `Arc<dyn Codec>` 与 `'static` 借用；
//! - 克隆句柄从不克隆编解码器本身，注册表也从不销毁句柄背后的对象；
//! - 两种形态都保证句柄不会悬垂，调用方无需额外维护生命周期。

use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

/// 可被注册到 [`CodecRegistry`](crate::CodecRegistry) 的编解码器契约。
///
/// # 教案式说明
/// - **意图 (Why)**：传输层在收发消息时需要依据线上携带的编解码标识挑选实现，
///   注册表只关心"这个实现叫什么"以及"它是哪一种具体类型"。
/// - **契约 (What)**：
///   - `id` 在同一模型键下应唯一；注册表不强制，重复时按插入顺序首个命中；
///   - `id` 在编解码器生命周期内必须稳定，否则按标识检索会得到不确定结果；
///   - `kind` 默认返回实现类型自身的 [`CodecKind`]，通常无需覆写。
/// - **风险 (Trade-offs)**：注册表在持有分片读锁期间调用 `id`（按标识检索、列举标识时）；
///   `id` 内部不得回调 `register_codec`/`clear_codecs`，否则同分片的写锁会与读锁互相等待而死锁。
/// - **线程安全**：要求 `Send + Sync + 'static`，以便句柄在进程级注册表中跨线程共享。
pub trait Codec: Send + Sync + 'static {
    /// 编解码器标识，例如 `"Json"`、`"Csv"`。
    fn id(&self) -> &str;

    /// 具体实现类型的能力描述符。
    fn kind(&self) -> CodecKind {
        CodecKind::of::<Self>()
    }
}

/// `CodecKind` 是"最近一次注册的编解码器属于哪种具体实现"的不透明描述符。
///
/// # 教案式说明
/// - **意图 (Why)**：`ModelKeyRegistry` 需要记录类型身份，但调用方只需要比较与展示，
///   不应依赖反射细节；因此对外只暴露相等性、哈希与诊断用的类型名。
/// - **契约 (What)**：
///   - 相等性与哈希仅由 [`TypeId`] 决定，类型名只用于日志与 `Display`；
///   - 只能通过 [`CodecKind::of`] 或 [`Codec::kind`] 显式构造。
#[derive(Clone, Copy)]
pub struct CodecKind {
    type_id: TypeId,
    type_name: &'static str,
}

impl CodecKind {
    /// 构造类型 `T` 的描述符。
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 判断描述符是否对应类型 `T`。
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// 诊断用的类型名；格式由编译器决定，不保证跨版本稳定。
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for CodecKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CodecKind {}

impl Hash for CodecKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CodecKind").field(&self.type_name).finish()
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// 注册表持有的编解码器句柄。
///
/// # 教案式说明
/// - **意图 (Why)**：注册表只做索引，不拥有也不构造编解码器；句柄把"共享引用"与"进程级静态实例"
///   统一为一种廉价可克隆的值，替代裸指针。
/// - **契约 (What)**：
///   - 克隆只复制引用（`Arc` 计数或 `'static` 指针）；
///   - [`CodecHandle::ptr_eq`] 比较的是对象地址而非值，对应"引用相等"语义；
///   - 通过 `Deref` 可直接调用 [`Codec`] 方法。
/// - **风险提示 (Trade-offs)**：零大小类型的不同静态实例可能共享同一地址，此时 `ptr_eq` 会认为二者相同；
///   需要区分身份的编解码器不应是零大小类型。
#[derive(Clone)]
pub struct CodecHandle {
    inner: HandleInner,
}

#[derive(Clone)]
enum HandleInner {
    Shared(Arc<dyn Codec>),
    Static(&'static dyn Codec),
}

impl CodecHandle {
    /// 以共享所有权包装具体编解码器。
    pub fn shared<C: Codec>(codec: Arc<C>) -> Self {
        Self {
            inner: HandleInner::Shared(codec),
        }
    }

    /// 包装已擦除类型的共享编解码器。
    pub fn from_dyn(codec: Arc<dyn Codec>) -> Self {
        Self {
            inner: HandleInner::Shared(codec),
        }
    }

    /// 借用 `'static` 生命周期的编解码器，常见于 `static` 或 `OnceLock` 中的进程级实例。
    pub fn from_static(codec: &'static dyn Codec) -> Self {
        Self {
            inner: HandleInner::Static(codec),
        }
    }

    /// 访问句柄背后的编解码器。
    pub fn codec(&self) -> &dyn Codec {
        match &self.inner {
            HandleInner::Shared(codec) => codec.as_ref(),
            HandleInner::Static(codec) => *codec,
        }
    }

    /// 两个句柄是否指向同一个编解码器对象。
    pub fn ptr_eq(&self, other: &CodecHandle) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }

    /// 句柄是否指向给定的编解码器对象。
    pub fn refers_to<C: Codec + ?Sized>(&self, codec: &C) -> bool {
        std::ptr::eq(self.addr(), codec as *const C as *const ())
    }

    /// 若为共享形态，返回底层 `Arc` 的克隆。
    pub fn as_shared(&self) -> Option<Arc<dyn Codec>> {
        match &self.inner {
            HandleInner::Shared(codec) => Some(Arc::clone(codec)),
            HandleInner::Static(_) => None,
        }
    }

    fn addr(&self) -> *const () {
        self.codec() as *const dyn Codec as *const ()
    }
}

impl Deref for CodecHandle {
    type Target = dyn Codec;

    fn deref(&self) -> &Self::Target {
        self.codec()
    }
}

impl fmt::Debug for CodecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flavour = match self.inner {
            HandleInner::Shared(_) => "shared",
            HandleInner::Static(_) => "static",
        };
        f.debug_struct("CodecHandle")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("flavour", &flavour)
            .finish()
    }
}

impl<C: Codec> From<Arc<C>> for CodecHandle {
    fn from(codec: Arc<C>) -> Self {
        Self::shared(codec)
    }
}

impl From<Arc<dyn Codec>> for CodecHandle {
    fn from(codec: Arc<dyn Codec>) -> Self {
        Self::from_dyn(codec)
    }
}

impl<C: Codec> From<&'static C> for CodecHandle {
    fn from(codec: &'static C) -> Self {
        Self::from_static(codec)
    }
}
