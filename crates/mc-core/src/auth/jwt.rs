use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Username claim of an access token, without verifying the signature.
///
/// Checks `cognito:username`, then `username`, then `email`.
pub fn cognito_username_from_jwt(token: &str) -> Option<String> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    ["cognito:username", "username", "email"]
        .into_iter()
        .find_map(|claim| claims.get(claim).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn prefers_cognito_username_claim() {
        let token = token_with(serde_json::json!({
            "cognito:username": "abc-123",
            "username": "other",
        }));
        assert_eq!(cognito_username_from_jwt(&token).as_deref(), Some("abc-123"));
    }

    #[test]
    fn falls_back_to_email() {
        let token = token_with(serde_json::json!({ "email": "owner@example.com" }));
        assert_eq!(
            cognito_username_from_jwt(&token).as_deref(),
            Some("owner@example.com")
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(cognito_username_from_jwt("not-a-jwt"), None);
        assert_eq!(cognito_username_from_jwt("a.!!!.c"), None);
        assert_eq!(cognito_username_from_jwt("a.b.c.d"), None);
    }
}
