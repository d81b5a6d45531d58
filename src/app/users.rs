use anyhow::Result;
use uuid::Uuid;

use crate::domain::user::User;
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.store.find_user(user_id).await
    }
}
