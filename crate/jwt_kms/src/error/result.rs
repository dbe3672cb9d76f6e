use crate::error::JwtKmsError;

pub type JwtKmsResult<R> = Result<R, JwtKmsError>;

pub trait JwtKmsResultHelper<T> {
    fn context(self, context: &str) -> JwtKmsResult<T>;
}

impl<T, E> JwtKmsResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> JwtKmsResult<T> {
        self.map_err(|e| JwtKmsError::Default(format!("{context}: {e}")))
    }
}

impl<T> JwtKmsResultHelper<T> for Option<T> {
    fn context(self, context: &str) -> JwtKmsResult<T> {
        self.ok_or_else(|| JwtKmsError::Default(context.to_owned()))
    }
}
