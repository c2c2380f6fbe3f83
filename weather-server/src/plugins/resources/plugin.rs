// weather-server/src/plugins/resources/plugin.rs
use std::collections::HashMap;
use weather_common::{McpResource, PluginError, PluginResult, UriTemplate};

fn param<'a>(
    params: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, PluginError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(PluginError::MissingArgument(name))
}

/// `config://app`: static configuration data.
pub struct AppConfigResource {
    template: UriTemplate,
}

impl AppConfigResource {
    pub fn new() -> Result<Self, PluginError> {
        Ok(AppConfigResource { template: UriTemplate::parse("config://app")? })
    }
}

impl McpResource for AppConfigResource {
    fn name(&self) -> &str {
        "app_config"
    }

    fn description(&self) -> &str {
        "Static configuration data"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn read(&self, _params: &HashMap<String, String>) -> PluginResult {
        Ok("App configuration here".to_string())
    }
}

/// `users://{user_id}/profile`: per-user profile data.
pub struct UserProfileResource {
    template: UriTemplate,
}

impl UserProfileResource {
    pub fn new() -> Result<Self, PluginError> {
        Ok(UserProfileResource { template: UriTemplate::parse("users://{user_id}/profile")? })
    }
}

impl McpResource for UserProfileResource {
    fn name(&self) -> &str {
        "user_profile"
    }

    fn description(&self) -> &str {
        "Dynamic user data"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn read(&self, params: &HashMap<String, String>) -> PluginResult {
        Ok(format!("Profile data for user {}", param(params, "user_id")?))
    }
}

/// `echo://{message}`: echoes the message back.
pub struct EchoResource {
    template: UriTemplate,
}

impl EchoResource {
    pub fn new() -> Result<Self, PluginError> {
        Ok(EchoResource { template: UriTemplate::parse("echo://{message}")? })
    }
}

impl McpResource for EchoResource {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo a message as a resource"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn read(&self, params: &HashMap<String, String>) -> PluginResult {
        Ok(format!("Resource echo: {}", param(params, "message")?))
    }
}
