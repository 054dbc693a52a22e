use binge_calendar_api::Application;
use binge_calendar_domain::ID;
use binge_calendar_infra::create_inmemory;
use reqwest::{Client, RequestBuilder};

pub const INTEGRATION_SECRET: &str = "integration-secret";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Request on behalf of a user identified by the gateway
    pub fn as_user(&self, method: reqwest::Method, path: &str, user_id: &ID) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("binge-user-id", user_id.to_string())
    }

    /// Request from the catalog ingestion or billing collaborators
    pub fn as_integration(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("binge-integration-key", INTEGRATION_SECRET)
    }

    pub fn anonymous(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.integration_secret_code = INTEGRATION_SECRET.into();
    ctx.config.delivery_gateway_url = None;

    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        address,
        client: Client::new(),
    }
}
