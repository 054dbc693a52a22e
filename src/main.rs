mod telemetry;

use binge_calendar_api::Application;
use binge_calendar_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("binge_calendar_server".into(), "info".into());
    init_subscriber(subscriber);

    run_migration()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let context = setup_context().await;

    let app = Application::new(context).await?;
    app.start().await
}
