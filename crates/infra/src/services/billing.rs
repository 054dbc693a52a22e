use crate::repos::IUserRepo;
use binge_calendar_domain::{UserProfile, ID};
use std::sync::Arc;

#[async_trait::async_trait]
pub trait IBillingService: Send + Sync {
    /// Tier and time zone of the user. Users billing has not told us about
    /// are on the free tier in UTC.
    async fn get_user_profile(&self, user_id: &ID) -> UserProfile;
}

/// Reads the profiles the billing collaborator pushes to the integration
/// endpoint
pub struct BillingService {
    users: Arc<dyn IUserRepo>,
}

impl BillingService {
    pub fn new(users: Arc<dyn IUserRepo>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl IBillingService for BillingService {
    async fn get_user_profile(&self, user_id: &ID) -> UserProfile {
        match self.users.find(user_id).await {
            Some(profile) => profile,
            None => UserProfile::new(user_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_context;
    use binge_calendar_domain::SubscriptionTier;

    #[tokio::test]
    async fn unknown_users_are_on_the_free_tier() {
        let ctx = setup_context().await;
        let user_id = ID::new();
        let profile = ctx.services.billing.get_user_profile(&user_id).await;
        assert_eq!(profile.tier, SubscriptionTier::Free);
        assert_eq!(profile.timezone, chrono_tz::Tz::UTC);

        let mut user = UserProfile::new(user_id.clone());
        user.tier = SubscriptionTier::Pro;
        ctx.repos.users.save(&user).await.unwrap();
        let profile = ctx.services.billing.get_user_profile(&user_id).await;
        assert_eq!(profile.tier, SubscriptionTier::Pro);
    }
}
