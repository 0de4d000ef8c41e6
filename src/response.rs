use serde::Serialize;

/// Body returned by successful deletes: `{"ok": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_shape() {
        let json = serde_json::to_string(&DeleteResponse::ok()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);
    }
}
