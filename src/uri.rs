//! The `hvml+run:` URI scheme used to address a request target across
//! runners: `hvml+run://<host>/<app>/<runner>/<CRTN|CHAN>/<resource>`. Used
//! by `<call within="...">`, channel posts, and the move-buffer to figure
//! out where a request is actually headed.

use crate::error::{ErrorKind, HvmlError};
use std::fmt;

/// What kind of resource a run-URI's last segment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Crtn,
    Chan,
}

impl ResourceKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "CRTN" => Some(ResourceKind::Crtn),
            "CHAN" => Some(ResourceKind::Chan),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Crtn => "CRTN",
            ResourceKind::Chan => "CHAN",
        }
    }
}

/// A parsed `hvml+run://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunUri {
    pub host: String,
    pub app: String,
    pub runner: String,
    pub kind: ResourceKind,
    pub resource: String,
}

impl RunUri {
    pub const SCHEME: &'static str = "hvml+run";

    /// Parse `hvml+run://host/app/runner/CRTN-or-CHAN/resource`.
    pub fn parse(uri: &str) -> Result<Self, HvmlError> {
        let rest = uri
            .strip_prefix("hvml+run://")
            .ok_or_else(|| HvmlError::with_context(ErrorKind::BadName, "missing hvml+run:// scheme"))?;
        let mut parts = rest.splitn(5, '/');
        let host = parts.next().filter(|s| !s.is_empty());
        let app = parts.next().filter(|s| !s.is_empty());
        let runner = parts.next().filter(|s| !s.is_empty());
        let kind = parts.next().and_then(ResourceKind::parse);
        let resource = parts.next().filter(|s| !s.is_empty());

        match (host, app, runner, kind, resource) {
            (Some(host), Some(app), Some(runner), Some(kind), Some(resource)) => Ok(RunUri {
                host: host.to_string(),
                app: app.to_string(),
                runner: runner.to_string(),
                kind,
                resource: resource.to_string(),
            }),
            _ => Err(HvmlError::with_context(
                ErrorKind::BadName,
                format!("malformed hvml+run uri: {uri}"),
            )),
        }
    }

    /// The move-buffer routing key this URI addresses: stable across
    /// serialize/parse round-trips, used as the `to` field of a
    /// [`crate::movebuffer::MovingMessage`].
    pub fn routing_key(&self) -> String {
        format!("{}/{}/{}/{}/{}", self.host, self.app, self.runner, self.kind.as_str(), self.resource)
    }
}

impl fmt::Display for RunUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}/{}/{}/{}",
            Self::SCHEME,
            self.host,
            self.app,
            self.runner,
            self.kind.as_str(),
            self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_crtn_uri() {
        let uri = RunUri::parse("hvml+run://localhost/app/runner1/CRTN/12345").unwrap();
        assert_eq!(uri.host, "localhost");
        assert_eq!(uri.app, "app");
        assert_eq!(uri.runner, "runner1");
        assert_eq!(uri.kind, ResourceKind::Crtn);
        assert_eq!(uri.resource, "12345");
    }

    #[test]
    fn round_trips_through_display() {
        let uri = RunUri::parse("hvml+run://host/app/runner/CHAN/mychannel").unwrap();
        assert_eq!(uri.to_string(), "hvml+run://host/app/runner/CHAN/mychannel");
    }

    #[test]
    fn rejects_wrong_scheme() {
        assert!(RunUri::parse("https://example.test").is_err());
    }

    #[test]
    fn rejects_missing_segments() {
        assert!(RunUri::parse("hvml+run://host/app").is_err());
    }
}
