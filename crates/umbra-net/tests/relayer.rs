//! HTTP relayer against a local responder

mod common;

use common::serve;
use umbra_core::Relayer;
use umbra_net::HttpRelayer;

#[tokio::test]
async fn test_fetch_tokens() {
    let url = serve(|req| {
        assert!(req.line.starts_with("GET /tokens"));
        (
            200,
            r#"{"tokens":[{"address":"0x2e055eEe18284513B993dB7568A592679aB13188","name":"Dai","symbol":"DAI","decimals":18}]}"#
                .to_string(),
        )
    })
    .await;

    let tokens = HttpRelayer::new(url, 4).tokens().await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].symbol, "DAI");
    assert_eq!(tokens[0].chain_id, 4);
}

#[tokio::test]
async fn test_http_failure_is_error() {
    let url = serve(|_| (500, "{}".to_string())).await;

    let err = HttpRelayer::new(url, 4).tokens().await.unwrap_err();
    assert!(err.is_retryable());
}
