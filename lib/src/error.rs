use std::fmt;
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error: a message, context parameters, and optionally the error that
/// caused it.
#[derive(Debug)]
pub struct Error {
    message: String,
    parameters: Vec<(Option<String>, String)>,
    cause: Option<Box<Error>>,
    location: &'static Location<'static>,
}

impl Error {
    #[track_caller]
    pub fn new<M: fmt::Display>(message: M) -> Self {
        Error {
            message: message.to_string(),
            parameters: vec![],
            cause: None,
            location: Location::caller(),
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn with_parameters<M>(message: M, parameters: Vec<(Option<String>, String)>) -> Self
        where M: fmt::Display
    {
        Error { parameters, ..Error::new(message) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parameters(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_deref(), v.as_str()))
    }

    /// Returns the value of the context parameter named `key`, if any.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters()
            .find(|(k, _)| *k == Some(key))
            .map(|(_, v)| v)
    }

    /// Where the error was created.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Makes `self` the root cause of `other`, returning `other`.
    pub fn chain(self, mut other: Error) -> Self {
        #[inline]
        fn _chain(error: Error, behind: &mut Error) {
            match behind.cause.as_mut() {
                Some(cause) => _chain(error, cause),
                None => behind.cause = Some(Box::new(error)),
            }
        }

        _chain(self, &mut other);
        other
    }

    #[track_caller]
    fn from_std(error: &(dyn StdError + 'static)) -> Self {
        let mut parameters = vec![];
        let mut source = error.source();
        while let Some(e) = source {
            parameters.push((None, e.to_string()));
            source = e.source();
        }

        Error::with_parameters(error, parameters)
    }
}

macro_rules! impl_from_std_error {
    ($($T:ty),* $(,)?) => ($(
        impl From<$T> for Error {
            #[track_caller]
            fn from(error: $T) -> Self {
                Error::from_std(&error)
            }
        }
    )*)
}

impl_from_std_error! {
    std::io::Error,
    std::fmt::Error,
    toml::de::Error,
    serde_json::Error,
    regex::Error,
    chrono::ParseError,
}

impl From<String> for Error {
    #[track_caller]
    fn from(message: String) -> Self {
        Error::new(message)
    }
}

impl From<&str> for Error {
    #[track_caller]
    fn from(message: &str) -> Self {
        Error::new(message)
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        Error {
            message: self.message.clone(),
            parameters: self.parameters.clone(),
            cause: self.cause.clone(),
            location: self.location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_nested(f: &mut fmt::Formatter<'_>, error: &Error, depth: usize) -> fmt::Result {
            let indent = " ".repeat(depth * 4);
            let newline = format!("\n{indent}");

            writeln!(f, "{indent}{}", error.message.replace('\n', &newline))?;
            if let Some(cause) = &error.cause {
                write_nested(f, cause, depth + 1)?;
            }

            for (key, value) in &error.parameters {
                let value = value.replace('\n', &newline);
                match key {
                    Some(key) => writeln!(f, "{indent}{key}: {value}")?,
                    None => writeln!(f, "{indent}{value}")?,
                }
            }

            if std::env::var_os("RUST_BACKTRACE").is_some() {
                writeln!(f, "{indent}[{}]", error.location)?;
            }

            Ok(())
        }

        write_nested(f, self, 0)
    }
}

impl StdError for Error { }

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($msg:expr, $($rest:tt)*) => (
        $crate::error::Error::with_parameters($msg, {
            #[allow(unused_mut)]
            let mut v: Vec<(Option<String>, String)> = Vec::new();
            $crate::error!(@param v $($rest)*);
            v
        })
    );

    ($msg:expr) => ( $crate::error!($msg,) );

    (@param $v:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $key => $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $key:expr => $value:expr) => {
        $v.push((Some($key.to_string()), $value.to_string()));
    };

    (@param $v:ident $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $value:expr) => {
        $v.push((None, $value.to_string()));
    };

    (@param $v:ident $(,)?) => { };
}

pub trait Chainable<T> {
    fn chain(self, other: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, other: impl Into<Error>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.into().chain(other.into())),
        }
    }

    #[track_caller]
    fn chain_with<F, Err>(self, f: F) -> Result<T>
        where F: FnOnce() -> Err, Err: Into<Error>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.into().chain(f().into())),
        }
    }
}
