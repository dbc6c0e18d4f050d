//! CreateFn - 新しいメッセージインスタンスの作り方（construction strategy）
//!
//! デフォルトは `M::default()`。プールから取り出す、既定値を埋めておく、
//! などの場合は `TypedSubscriptionHandler::set_create_fn` で差し替えます。

use std::sync::Arc;

/// 呼ぶたびに新しい `M` を返す factory
///
/// 前回返したインスタンスを使い回してはいけません（毎回独立した所有権）。
pub type CreateFn<M> = Arc<dyn Fn() -> M + Send + Sync>;

/// `M::default()` で作る factory
pub fn default_create_fn<M: Default + 'static>() -> CreateFn<M> {
    Arc::new(M::default)
}

/// `prototype` の clone を返す factory
///
/// wire に載らないフィールドへ既定値を入れておきたいときに使います。
pub fn prototype_create_fn<M>(prototype: M) -> CreateFn<M>
where
    M: Clone + Send + Sync + 'static,
{
    Arc::new(move || prototype.clone())
}
