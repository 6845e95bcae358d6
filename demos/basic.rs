use resilient_request::{configure_default, header::HeaderMap, request_json, Method, NO_BODY};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Echo {
    url: String,
    #[serde(default)]
    headers: serde_json::Map<String, serde_json::Value>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,resilient_request=debug")),
        )
        .init();

    let url = std::env::var("REQUEST_LIVE_URL")
        .unwrap_or_else(|_| "https://httpbin.org/anything".to_owned());

    configure_default(|profile| {
        *profile = profile.clone().with_user_agent_prefix("basic-demo");
    });

    let echo: Echo = request_json(Method::GET, &url, HeaderMap::new(), NO_BODY).await?;

    println!("echoed {}", echo.url);
    for (name, value) in echo.headers {
        println!("{name}: {value}");
    }

    Ok(())
}
