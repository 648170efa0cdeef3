use std::fmt::{Display, Formatter};

use crate::protocol::ParseError;

/// The closed set of request verbs this server accepts.
///
/// Any other token in the request line is a parse failure; there is no
/// extension mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a request with this verb may carry a body.
    ///
    /// Only GET is body-less; for every other verb the decoder consults the
    /// `Content-Length` header.
    pub fn need_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl TryFrom<&str> for Method {
    type Error = ParseError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        match token {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ParseError::InvalidMethod),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
