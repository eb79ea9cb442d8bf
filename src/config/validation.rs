use super::{Config, FieldNames, Limits};
use crate::domain::ConfigError;
use crate::security::validate_key;

impl Limits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buffer_size == 0 || self.max_key_length == 0 || self.max_value_length == 0 {
            return Err(ConfigError::InvalidConfig(
                "Size limits must be greater than 0".to_string(),
            ));
        }

        if self.max_key_length > self.max_value_length {
            return Err(ConfigError::InvalidConfig(format!(
                "Key length limit ({}) must not exceed value length limit ({})",
                self.max_key_length, self.max_value_length
            )));
        }

        if self.max_value_length > self.max_buffer_size {
            return Err(ConfigError::InvalidConfig(format!(
                "Value length limit ({}) must not exceed buffer size limit ({})",
                self.max_value_length, self.max_buffer_size
            )));
        }

        Ok(())
    }
}

impl FieldNames {
    pub fn validate(&self, limits: &Limits) -> Result<(), ConfigError> {
        let names = [
            ("time", &self.time),
            ("error", &self.error),
            ("caller", &self.caller),
        ];

        for (role, name) in names {
            validate_key(name, limits).map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid {role} field name '{name}': {e}"))
            })?;
        }

        for (i, (role, name)) in names.iter().enumerate() {
            if let Some((other, _)) = names[i + 1..].iter().find(|(_, n)| n == name) {
                return Err(ConfigError::InvalidConfig(format!(
                    "Field names for {role} and {other} are both '{name}'"
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.field_names.validate(&self.limits)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_rejected() {
        let limits = Limits {
            max_key_length: 0,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_limits_must_nest() {
        let limits = Limits {
            max_buffer_size: 1024,
            max_key_length: 16,
            max_value_length: 4096,
        };
        assert!(limits.validate().is_err());

        let limits = Limits {
            max_buffer_size: 1024,
            max_key_length: 2048,
            max_value_length: 512,
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let config = Config {
            field_names: FieldNames {
                error: "time".to_string(),
                ..FieldNames::default()
            },
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'time'"));
    }

    #[test]
    fn test_invalid_field_name_rejected() {
        let config = Config {
            field_names: FieldNames {
                time: String::new(),
                ..FieldNames::default()
            },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));
    }
}
