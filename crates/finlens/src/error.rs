#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} is not set: an API key is required for this provider")]
    MissingApiKey(&'static str),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("Model provider returned no text")]
    EmptyCompletion,
}
