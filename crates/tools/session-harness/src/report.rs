//! Rendering session state for the terminal

use alloy_primitives::U256;
use serde_json::{json, Value};
use umbra_session::SessionSnapshot;

/// Render `value` in whole units with up to `decimals` fractional digits
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Token balances as `(symbol, formatted amount)` in token list order
pub fn balance_rows(snapshot: &SessionSnapshot) -> Vec<(String, String)> {
    snapshot
        .tokens
        .iter()
        .map(|t| {
            (
                t.symbol.clone(),
                format_units(snapshot.balance_of(&t.address), t.decimals),
            )
        })
        .collect()
}

/// JSON summary of a snapshot; never includes private keys
pub fn snapshot_json(snapshot: &SessionSnapshot) -> Value {
    json!({
        "status": format!("{:?}", snapshot.status),
        "epoch": snapshot.epoch,
        "connected": snapshot.is_connected(),
        "account": snapshot.checksum_address(),
        "display": snapshot.display_identity(),
        "network": snapshot.network.as_ref().map(|n| json!({
            "chainId": n.chain_id,
            "name": n.name,
        })),
        "supported": snapshot.is_supported_network(),
        "names": {
            "ens": snapshot.names.ens,
            "cns": snapshot.names.cns,
        },
        "keysConfigured": {
            "ens": snapshot.keys_configured.ens,
            "cns": snapshot.keys_configured.cns,
        },
        "umbra": snapshot.protocol.map(|p| p.umbra.to_checksum(None)),
        "hasKeys": snapshot.has_keys(),
        "balances": balance_rows(snapshot)
            .into_iter()
            .map(|(symbol, amount)| json!({ "symbol": symbol, "amount": amount }))
            .collect::<Vec<_>>(),
        "configuredAt": snapshot.configured_at.map(|t| t.to_rfc3339()),
    })
}
