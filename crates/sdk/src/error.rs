#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pool(#[from] pools::Error),
    #[error("data provider error: {0:#}")]
    Provider(#[from] anyhow::Error),
}

impl From<pools::InvalidInput> for Error {
    fn from(err: pools::InvalidInput) -> Self {
        Self::Pool(err.into())
    }
}

impl From<pools::math::Error> for Error {
    fn from(err: pools::math::Error) -> Self {
        Self::Pool(err.into())
    }
}
