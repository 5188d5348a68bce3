use secrecy::SecretString;

#[derive(Clone)]
pub struct GlobalArgs {
    pub email_api_url: Option<String>,
    pub email_api_key: SecretString,
    pub email_from: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(email_from: String) -> Self {
        Self {
            email_api_url: None,
            email_api_key: SecretString::default(),
            email_from,
        }
    }

    pub fn set_api_key(&mut self, key: SecretString) {
        self.email_api_key = key;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("email_api_url", &self.email_api_url)
            .field("email_api_key", &"***")
            .field("email_from", &self.email_from)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("no-reply@atesti.dev".to_string());
        assert_eq!(args.email_from, "no-reply@atesti.dev");
        assert_eq!(args.email_api_url, None);
        assert_eq!(args.email_api_key.expose_secret(), "");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut args = GlobalArgs::new("no-reply@atesti.dev".to_string());
        args.set_api_key(SecretString::from("SG.secret".to_string()));
        let debug = format!("{args:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("SG.secret"));
    }
}
