use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Publish error: {0}")]
    Publish(String),
}

impl From<rumqttc::ClientError> for PanelError {
    fn from(error: rumqttc::ClientError) -> Self {
        PanelError::Publish(error.to_string())
    }
}

impl From<rumqttc::ConnectionError> for PanelError {
    fn from(error: rumqttc::ConnectionError) -> Self {
        PanelError::Broker(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
