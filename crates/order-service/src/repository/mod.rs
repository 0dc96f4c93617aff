//! 仓储层
//!
//! 所有 SQL 集中在这里；创建/替换/删除等多语句操作在单个事务内完成。

pub mod item_repo;
pub mod order_repo;
pub mod traits;

pub use item_repo::PgItemStore;
pub use order_repo::PgOrderStore;
pub use traits::{ItemStore, OrderPage, OrderStore};
