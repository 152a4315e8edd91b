pub type StillglowResult<T> = Result<T, StillglowError>;

#[derive(thiserror::Error, Debug)]
pub enum StillglowError {
    #[error("input image error: {0}")]
    InputImage(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StillglowError {
    pub fn input_image(msg: impl Into<String>) -> Self {
        Self::InputImage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
