//! Liveness endpoint.

/// `GET /ping` handler; answers `pong` while the server accepts connections.
pub async fn ping_handler() -> &'static str {
    "pong"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_returns_pong() {
        assert_eq!(ping_handler().await, "pong");
    }
}
