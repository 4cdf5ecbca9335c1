use axum::routing::get;
use axum::Router;

async fn status() -> &'static str {
    "running"
}

pub fn router() -> Router {
    Router::new().route("/", get(status))
}

/// Serves the health endpoint in the background. A bind failure is logged,
/// the bot keeps running without it.
pub async fn spawn(port: u16) {
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("health endpoint could not bind port {port}: {e}");
            return;
        }
    };
    tracing::info!("health endpoint listening on port {port}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!("health endpoint stopped: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_body() {
        assert_eq!(status().await, "running");
    }

    #[tokio::test]
    async fn test_serves_running() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "running");
    }

    #[tokio::test]
    async fn test_spawn_serves_without_discord() {
        let port = {
            let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            free.local_addr().unwrap().port()
        };
        spawn(port).await;

        let body = reqwest::get(format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "running");
    }
}
