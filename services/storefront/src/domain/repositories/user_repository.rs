//! 用户 Repository trait

use async_trait::async_trait;
use shop_common::UserId;
use shop_errors::AppResult;

use crate::domain::user::User;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// 保存用户
    async fn save(&self, user: &User) -> AppResult<()>;
}
