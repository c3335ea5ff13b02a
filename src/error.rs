use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChefError>;

#[derive(Error, Debug)]
pub enum ChefError {
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("A message is already being processed for this session")]
    Busy,

    #[error("Session was shut down while the reply was being prepared")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChefError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Message safe to show in the chat window. The conversation keeps going after it.
    pub fn user_message(&self) -> String {
        match self {
            ChefError::Validation { field, .. } if field == "budget" => {
                "⚠️ O orçamento precisa ser um valor positivo. Ajuste o valor e tente de novo."
                    .to_string()
            }
            ChefError::Validation { field, .. } if field == "catalog" => {
                "⚠️ Ainda não tenho receitas cadastradas. Tente novamente mais tarde.".to_string()
            }
            ChefError::Validation { reason, .. } => format!("⚠️ Dados inválidos: {reason}"),
            ChefError::Busy => {
                "⏳ Ainda estou pensando na sua última mensagem. Aguarde um instante.".to_string()
            }
            ChefError::Cancelled => "A conversa foi encerrada.".to_string(),
            _ => "⚠️ Algo deu errado. Pode repetir a mensagem?".to_string(),
        }
    }
}
