//! ConnectionHeader - 送信元コネクションの属性（callerid, md5sum, type など）
//!
//! transport 層が作って共有所有で渡してくる。このクレートは読むだけで、
//! 書き換えることはない。

use std::collections::HashMap;
use std::sync::Arc;

/// key=value のコネクション属性
pub type ConnectionHeader = HashMap<String, String>;

/// 共有・読み取り専用のコネクション属性
///
/// メッセージの header slot に入るのはこの `Arc` の clone（同じ map を指す）。
pub type SharedHeader = Arc<ConnectionHeader>;

/// (key, value) の列から `SharedHeader` を作る
///
/// # 使用例
/// ```
/// use courier_core::domain::header::shared_header;
///
/// let header = shared_header([("callerid", "/talker"), ("type", "std_msgs/String")]);
/// assert_eq!(header.get("callerid").map(String::as_str), Some("/talker"));
/// ```
pub fn shared_header<K, V, I>(pairs: I) -> SharedHeader
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    Arc::new(
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}
