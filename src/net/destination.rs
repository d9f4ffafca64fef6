//! Forwarding destination configuration.

use std::fmt;
use std::os::unix::fs::FileTypeExt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::error::DestinationError;

/// Default UDP destination port.
pub const DEFAULT_PORT: u16 = 8600;

/// Address family requested by the destination scheme.
///
/// `udp4:` and `udp6:` pin resolution to one family; plain `udp:` accepts
/// whichever family the host resolves to first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdpFamily {
    #[default]
    Any,
    V4,
    V6,
}

/// A validated forwarding target, constructed once from configuration and
/// immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// UDP endpoint.
    Udp {
        host: String,
        port: u16,
        family: UdpFamily,
    },

    /// Unix datagram socket path.
    Unix { path: PathBuf },
}

impl Destination {
    /// Parse a destination URI such as `udp4://localhost:8600` or
    /// `unix:/tmp/asterix.socket`.
    ///
    /// Any scheme other than `udp`, `udp4`, `udp6` or `unix` is a
    /// configuration error, raised before any socket activity.
    pub fn parse(uri: &str) -> Result<Self, DestinationError> {
        let url = Url::parse(uri).map_err(|source| DestinationError::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;

        match url.scheme() {
            "udp" | "udp4" | "udp6" => {
                let family = match url.scheme() {
                    "udp4" => UdpFamily::V4,
                    "udp6" => UdpFamily::V6,
                    _ => UdpFamily::Any,
                };
                let host = url
                    .host_str()
                    .ok_or_else(|| DestinationError::MissingHost {
                        uri: uri.to_string(),
                    })?
                    .to_string();
                let port = url.port().unwrap_or(DEFAULT_PORT);
                if port == 0 {
                    return Err(DestinationError::InvalidPort);
                }
                Ok(Self::Udp { host, port, family })
            }
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(DestinationError::MissingPath {
                        uri: uri.to_string(),
                    });
                }
                Ok(Self::Unix {
                    path: PathBuf::from(path),
                })
            }
            other => Err(DestinationError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    /// Validate host-side preconditions before any data flows.
    ///
    /// A Unix destination must name an existing datagram socket; a UDP
    /// destination needs nothing beyond a resolvable host, which is
    /// checked at connect time.
    pub fn validate(&self) -> Result<(), DestinationError> {
        if let Self::Unix { path } = self {
            let metadata =
                std::fs::metadata(path).map_err(|source| DestinationError::PathUnreadable {
                    path: path.clone(),
                    source,
                })?;
            if !metadata.file_type().is_socket() {
                return Err(DestinationError::NotASocket { path: path.clone() });
            }
        }
        Ok(())
    }
}

impl FromStr for Destination {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp { host, port, family } => {
                let scheme = match family {
                    UdpFamily::Any => "udp",
                    UdpFamily::V4 => "udp4",
                    UdpFamily::V6 => "udp6",
                };
                write!(f, "{scheme}://{host}:{port}")
            }
            Self::Unix { path } => write!(f, "unix:{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_udp4_destination() {
        let dest = Destination::parse("udp4://localhost:8600").unwrap();
        assert_eq!(
            dest,
            Destination::Udp {
                host: "localhost".to_string(),
                port: 8600,
                family: UdpFamily::V4,
            }
        );
    }

    #[test]
    fn test_parse_udp_default_port() {
        let dest = Destination::parse("udp://receiver.example").unwrap();
        match dest {
            Destination::Udp { port, family, .. } => {
                assert_eq!(port, DEFAULT_PORT);
                assert_eq!(family, UdpFamily::Any);
            }
            other => panic!("expected UDP destination, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unix_destination() {
        let dest = Destination::parse("unix:/tmp/asterix.socket").unwrap();
        assert_eq!(
            dest,
            Destination::Unix {
                path: PathBuf::from("/tmp/asterix.socket"),
            }
        );
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        match Destination::parse("tcp://localhost:8600") {
            Err(DestinationError::UnsupportedScheme { scheme }) => assert_eq!(scheme, "tcp"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_uri_rejected() {
        assert!(matches!(
            Destination::parse("not a uri"),
            Err(DestinationError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(matches!(
            Destination::parse("udp4://localhost:0"),
            Err(DestinationError::InvalidPort)
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for uri in [
            "udp://receiver.example:9000",
            "udp4://localhost:8600",
            "udp6://localhost:8600",
            "unix:/tmp/asterix.socket",
        ] {
            let dest = Destination::parse(uri).unwrap();
            assert_eq!(dest.to_string(), uri);
            assert_eq!(dest.to_string().parse::<Destination>().unwrap(), dest);
        }
    }

    #[test]
    fn test_validate_rejects_missing_path() {
        let dest = Destination::parse("unix:/tmp/definitely-not-here.socket").unwrap();
        assert!(matches!(
            dest.validate(),
            Err(DestinationError::PathUnreadable { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.socket");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not a socket").unwrap();

        let dest = Destination::Unix { path };
        assert!(matches!(
            dest.validate(),
            Err(DestinationError::NotASocket { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_udp_without_io() {
        let dest = Destination::parse("udp4://localhost:8600").unwrap();
        assert!(dest.validate().is_ok());
    }
}
