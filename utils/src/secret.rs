use zeroize::Zeroizing;

/// A secret string that is wiped from memory on drop
/// and never printed by `Debug` or `Display`.
#[derive(Clone)]
pub struct SecretValue(Zeroizing<String>);

macro_rules! impl_secret_value {
    ($($type:ty),*) => {
        $(
            impl From<$type> for SecretValue {
                fn from(value: $type) -> Self {
                    Self(String::from(value.trim()).into())
                }
            }
        )*
    };
}

impl_secret_value!(String, &String, &str);

impl SecretValue {
    /// Get the value of the secret.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod test {
    use super::SecretValue;

    #[test]
    fn secret_is_redacted() {
        let secret = SecretValue::from("  hunter2\n");

        assert_eq!(secret.value(), "hunter2");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
    }

    #[test]
    fn whitespace_only_secret_is_empty() {
        assert!(SecretValue::from("   ").is_empty());
    }
}
