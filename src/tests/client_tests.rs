//! Etherscan client against a local mock server.

#[cfg(test)]
mod tests {
    use crate::{
        blockchain::{ChainDataProvider, EtherscanClient, ProviderError},
        config::Config,
    };
    use mockito::{Matcher, Server};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const API_KEY: &str = "KEY123SECRET";

    fn config_for(api_url: &str) -> Config {
        let env: HashMap<&str, String> = HashMap::from([
            ("ETHERSCAN_API_KEY", API_KEY.to_string()),
            ("ETHERSCAN_API_URL", api_url.to_string()),
            ("RPC_TIMEOUT_SECS", "1".to_string()),
        ]);
        Config::from_lookup(|name| env.get(name).cloned(), || None).unwrap()
    }

    fn proxy_query(action: &str, extra: &[(&str, &str)]) -> Matcher {
        let mut params = vec![
            Matcher::UrlEncoded("chainid".into(), "1".into()),
            Matcher::UrlEncoded("module".into(), "proxy".into()),
            Matcher::UrlEncoded("action".into(), action.into()),
            Matcher::UrlEncoded("apikey".into(), API_KEY.into()),
        ];
        params.extend(
            extra
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string())),
        );
        Matcher::AllOf(params)
    }

    #[tokio::test]
    async fn test_block_number_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api")
            .match_query(proxy_query("eth_blockNumber", &[]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":83,"result":"0x1a2b3c"}"#)
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();

        assert_eq!(client.latest_block_number().await, Ok(1_715_004));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_block_request_uses_hex_tag_and_full_objects() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api")
            .match_query(proxy_query(
                "eth_getBlockByNumber",
                &[("tag", "0x65"), ("boolean", "true")],
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"number":"0x65","transactions":[
                    {"hash":"0xa1","from":"0xf1","to":"0xt1","value":"0x56bc75e2d63100000"}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        let block = client.block_transactions(101).await.unwrap();

        assert_eq!(block.number, 101);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].hash, "0xa1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_block_is_not_available() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();

        assert_eq!(
            client.block_transactions(101).await,
            Err(ProviderError::BlockNotAvailable(101))
        );
    }

    #[tokio::test]
    async fn test_notok_body_is_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#)
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();

        assert!(client.latest_block_number().await.unwrap_err().is_rate_limited());
    }

    #[tokio::test]
    async fn test_http_429_is_rate_limited_without_leaking_key() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        let err = client.latest_block_number().await.unwrap_err();

        assert!(err.is_rate_limited());
        assert!(!err.to_string().contains(API_KEY));
        assert!(!format!("{:?}", err).contains(API_KEY));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable_without_leaking_key() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = EtherscanClient::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        let err = client.block_transactions(101).await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(!err.to_string().contains(API_KEY));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable_without_leaking_key() {
        // Accepts connections and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = EtherscanClient::new(&config_for(&format!("http://{}/api", addr))).unwrap();
        let err = tokio::time::timeout(Duration::from_secs(10), client.latest_block_number())
            .await
            .expect("client timeout should fire first")
            .unwrap_err();

        match &err {
            ProviderError::Unavailable(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert!(!err.to_string().contains(API_KEY));
    }
}
