use serde::Deserialize;

/// Top-level configuration settings for the panel.
///
/// Includes the broker connection, the panel itself and the sign-in
/// credentials used by the auth gate.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub bus: BusSettings,
    pub panel: PanelSettings,
    pub auth: AuthSettings,
}

/// Configuration settings for the broker connection.
#[derive(Debug, Deserialize, Clone)]
pub struct BusSettings {
    pub region: String,
    pub endpoint: String,
}

/// Configuration settings for the messaging panel.
///
/// `max_message_len` bounds the draft in characters.
#[derive(Debug, Deserialize, Clone)]
pub struct PanelSettings {
    pub topic: String,
    pub max_message_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub username: String,
    pub password: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub bus: Option<PartialBusSettings>,
    pub panel: Option<PartialPanelSettings>,
    pub auth: Option<PartialAuthSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBusSettings {
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPanelSettings {
    pub topic: Option<String>,
    pub max_message_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialAuthSettings {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            bus: BusSettings {
                region: "us-east-1".to_string(),
                endpoint: "ws://127.0.0.1:8080".to_string(),
            },
            panel: PanelSettings {
                topic: "appMessages".to_string(),
                max_message_len: 128,
            },
            auth: AuthSettings {
                username: "admin".to_string(),
                password: "password".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Merges the loaded values over `defaults`, field by field.
    pub fn merge_onto(self, defaults: Settings) -> Settings {
        let bus = self.bus.unwrap_or(PartialBusSettings {
            region: None,
            endpoint: None,
        });
        let panel = self.panel.unwrap_or(PartialPanelSettings {
            topic: None,
            max_message_len: None,
        });
        let auth = self.auth.unwrap_or(PartialAuthSettings {
            username: None,
            password: None,
        });

        Settings {
            bus: BusSettings {
                region: bus.region.unwrap_or(defaults.bus.region),
                endpoint: bus.endpoint.unwrap_or(defaults.bus.endpoint),
            },
            panel: PanelSettings {
                topic: panel.topic.unwrap_or(defaults.panel.topic),
                max_message_len: panel
                    .max_message_len
                    .unwrap_or(defaults.panel.max_message_len),
            },
            auth: AuthSettings {
                username: auth.username.unwrap_or(defaults.auth.username),
                password: auth.password.unwrap_or(defaults.auth.password),
            },
        }
    }
}
