use super::ISubscriptionRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use binge_calendar_domain::{Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if subscriptions
            .iter()
            .any(|s| s.user_id == subscription.user_id && s.event_id == subscription.event_id)
        {
            return Err(anyhow::Error::msg(format!(
                "User {} already has a subscription for event {}",
                subscription.user_id, subscription.event_id
            )));
        }
        subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()> {
        save(subscription, &self.subscriptions);
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> anyhow::Result<Option<Subscription>> {
        Ok(find(subscription_id, &self.subscriptions))
    }

    async fn find_by_user_and_event(&self, user_id: &ID, event_id: &ID) -> Option<Subscription> {
        find_by(&self.subscriptions, |s| {
            s.user_id == *user_id && s.event_id == *event_id
        })
        .into_iter()
        .next()
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Subscription>> {
        Ok(find_by(&self.subscriptions, |s| s.user_id == *user_id))
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Subscription>> {
        Ok(find_by(&self.subscriptions, |s| s.event_id == *event_id))
    }

    async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
        delete(subscription_id, &self.subscriptions)
    }

    async fn delete_by_event(&self, event_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.subscriptions, |s| s.event_id == *event_id))
    }
}
