use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use binge_calendar_domain::{UserProfile, ID};

pub struct InMemoryUserRepo {
    users: std::sync::Mutex<Vec<UserProfile>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn save(&self, user: &UserProfile) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(stored) => *stored = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<UserProfile> {
        find(user_id, &self.users)
    }
}
