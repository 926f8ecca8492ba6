//! Route building: filling `{name}` placeholders in a path template and resolving the
//! result against the API base URL.
//!
//! Text parameters are percent-encoded so that they always stay inside a single path
//! segment. Empty and dot-segment values are rejected, since `%2E%2E` still resolves as `..`
//! when joined onto the base URL. Numeric parameters (Discord snowflakes, mostly) are written
//! as plain decimal text.
//!
//! # Example
//!
//! ```
//! use tatsu_client_sdk::route::Route;
//! use reqwest::Method;
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = Url::parse("https://api.tatsu.gg/v1/")?;
//! let route = Route::builder(Method::GET, "users/{user_id}/profile")
//!     .param("user_id", 172_002_275_412_279_296_u64)
//!     .build(&base)?;
//!
//! assert_eq!(
//!     route.url().as_str(),
//!     "https://api.tatsu.gg/v1/users/172002275412279296/profile"
//! );
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;

use reqwest::Method;
use url::Url;

use crate::Result;
use crate::error::Error;

/// A fully resolved `(method, URL)` pair for one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    url: Url,
}

impl Route {
    /// Starts building a route for `method` from a relative path `template`.
    #[must_use]
    pub fn builder<T: Into<String>>(method: Method, template: T) -> RouteBuilder {
        RouteBuilder {
            method,
            template: template.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Collects path parameters for a [`Route`] until it is resolved with [`RouteBuilder::build`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RouteBuilder {
    method: Method,
    template: String,
    params: Vec<(String, PathParam)>,
}

impl RouteBuilder {
    /// Binds `value` to the `{name}` placeholder. Later bindings of the same name win.
    pub fn param<N: Into<String>, V: Into<PathParam>>(mut self, name: N, value: V) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Fills in the template and joins it onto `base`.
    ///
    /// `base` should end in `/` so that the template is appended to its path rather than
    /// replacing the last segment.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Configuration`](crate::error::Kind::Configuration) error when a
    /// placeholder has no bound value, when a brace is left unmatched, when a text value is
    /// empty, `.` or `..`, or when the filled path is not a valid relative URL.
    pub fn build(self, base: &Url) -> Result<Route> {
        let path = self.fill()?;
        let url = base
            .join(&path)
            .map_err(|e| Error::route_template(self.template.as_str(), e.to_string()))?;

        Ok(Route {
            method: self.method,
            url,
        })
    }

    fn fill(&self) -> Result<String> {
        let mut path = String::with_capacity(self.template.len());
        let mut chars = self.template.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }

                    if !closed {
                        return Err(Error::route_template(
                            self.template.as_str(),
                            format!("unterminated placeholder `{{{name}`"),
                        ));
                    }

                    let value = self
                        .params
                        .iter()
                        .find_map(|(key, value)| (*key == name).then_some(value))
                        .ok_or_else(|| {
                            Error::route_template(
                                self.template.as_str(),
                                format!("missing parameter `{name}`"),
                            )
                        })?;

                    if value.is_unsafe_segment() {
                        return Err(Error::route_template(
                            self.template.as_str(),
                            format!("parameter `{name}` cannot be empty, `.` or `..`"),
                        ));
                    }

                    path.push_str(&value.rendered());
                }
                '}' => {
                    return Err(Error::route_template(
                        self.template.as_str(),
                        "unmatched `}`",
                    ));
                }
                _ => path.push(ch),
            }
        }

        Ok(path)
    }
}

/// A value substituted into a route placeholder.
///
/// Built through its `From` implementations: strings become percent-encoded text, integers
/// are rendered as decimal text as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam(Repr);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Text(String),
    Number(String),
}

impl PathParam {
    /// Values that would resolve as an empty or dot segment even when percent-encoded.
    fn is_unsafe_segment(&self) -> bool {
        matches!(&self.0, Repr::Text(text) if matches!(text.as_str(), "" | "." | ".."))
    }

    fn rendered(&self) -> Cow<'_, str> {
        match &self.0 {
            Repr::Text(text) => urlencoding::encode(text),
            Repr::Number(number) => Cow::Borrowed(number),
        }
    }
}

impl From<&str> for PathParam {
    fn from(value: &str) -> Self {
        Self(Repr::Text(value.to_owned()))
    }
}

impl From<String> for PathParam {
    fn from(value: String) -> Self {
        Self(Repr::Text(value))
    }
}

impl From<&String> for PathParam {
    fn from(value: &String) -> Self {
        Self(Repr::Text(value.clone()))
    }
}

macro_rules! number_path_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PathParam {
                fn from(value: $ty) -> Self {
                    Self(Repr::Number(value.to_string()))
                }
            }
        )*
    };
}

number_path_param!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
