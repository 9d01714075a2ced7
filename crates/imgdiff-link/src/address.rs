//! Structured addresses of opened image resources.
//!
//! An [`Address`] is what the host hands us for every opened document:
//! a [`Scheme`], a slash-separated path and an optional scheme-specific
//! query. Addresses are immutable once built.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

/// Category of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// A plain file on the local filesystem (`file:`).
    LocalFile,
    /// A version-control object, e.g. a file at a git ref (`git:`).
    VcsObject,
    /// A file materialized by an extension into its temp storage
    /// (`vscode-userdata:`).
    RemoteTempCache,
    /// A file on a virtual filesystem backed by a remote repository
    /// (`vscode-vfs:`).
    VirtualFs,
}

impl Scheme {
    /// All schemes.
    pub const ALL: [Self; 4] = [
        Self::LocalFile,
        Self::VcsObject,
        Self::RemoteTempCache,
        Self::VirtualFs,
    ];

    /// The URI scheme name the host uses for this category.
    #[must_use]
    pub const fn uri_scheme(self) -> &'static str {
        match self {
            Self::LocalFile => "file",
            Self::VcsObject => "git",
            Self::RemoteTempCache => "vscode-userdata",
            Self::VirtualFs => "vscode-vfs",
        }
    }

    /// Look up the category for a URI scheme name.
    #[must_use]
    pub fn from_uri_scheme(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.uri_scheme() == name)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri_scheme())
    }
}

/// Errors produced when parsing an address from URI text.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// The text is not a URI.
    #[error("invalid address: {0}")]
    Parse(#[from] url::ParseError),

    /// The URI scheme is not one of the recognized [`Scheme`]s.
    #[error("unsupported address scheme '{0}'")]
    UnsupportedScheme(String),
}

/// Identifier of an opened resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    scheme: Scheme,
    authority: Option<String>,
    path: String,
    query: Option<String>,
}

impl Address {
    /// Create an address with no authority and no query.
    #[must_use]
    pub fn new(scheme: Scheme, path: impl Into<String>) -> Self {
        Self {
            scheme,
            authority: None,
            path: path.into(),
            query: None,
        }
    }

    /// Shorthand for a [`Scheme::LocalFile`] address.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(Scheme::LocalFile, path)
    }

    /// Return a copy with the given (already decoded) query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Return a copy with the given authority.
    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Parse URI text such as `file:///repo/img.png` or
    /// `git:/repo/img.png?{"path":"/repo/img.png","ref":"HEAD"}`.
    ///
    /// The path and query are percent-decoded.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Parse`] for malformed text and
    /// [`AddressError::UnsupportedScheme`] for schemes outside [`Scheme`].
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let url = Url::parse(text)?;
        let scheme = Scheme::from_uri_scheme(url.scheme())
            .ok_or_else(|| AddressError::UnsupportedScheme(url.scheme().to_string()))?;
        let authority = url
            .host_str()
            .filter(|host| !host.is_empty())
            .map(str::to_string);
        let path = percent_decode_str(url.path())
            .decode_utf8_lossy()
            .into_owned();
        let query = url
            .query()
            .map(|q| percent_decode_str(q).decode_utf8_lossy().into_owned());

        Ok(Self {
            scheme,
            authority,
            path,
            query,
        })
    }

    /// The address category.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The authority component, if any.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// The decoded path, always slash-separated.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The decoded query payload, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// The last path segment (the filename), if the path has one.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = &self.authority {
            write!(f, "//{authority}")?;
        } else if self.scheme == Scheme::LocalFile {
            f.write_str("//")?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_file() {
        let address = Address::parse("file:///home/user/repo/image.png").unwrap();
        assert_eq!(address.scheme(), Scheme::LocalFile);
        assert_eq!(address.path(), "/home/user/repo/image.png");
        assert_eq!(address.query(), None);
        assert_eq!(address.authority(), None);
        assert_eq!(address.file_name(), Some("image.png"));
    }

    #[test]
    fn parses_vcs_object_with_raw_json_query() {
        let address =
            Address::parse(r#"git:/repo/img.png?{"path":"/repo/img.png","ref":""}"#).unwrap();
        assert_eq!(address.scheme(), Scheme::VcsObject);
        assert_eq!(address.path(), "/repo/img.png");
        assert_eq!(address.query(), Some(r#"{"path":"/repo/img.png","ref":""}"#));
    }

    #[test]
    fn parses_vcs_object_with_encoded_query() {
        let address = Address::parse(
            "git:/home/user/repo/image.png?%7B%22path%22%3A%22%2Fhome%2Fuser%2Frepo%2Fimage.png%22%2C%22ref%22%3A%22~%22%7D",
        )
        .unwrap();
        assert_eq!(
            address.query(),
            Some(r#"{"path":"/home/user/repo/image.png","ref":"~"}"#)
        );
    }

    #[test]
    fn parses_virtual_fs_with_authority() {
        let address = Address::parse(
            "vscode-vfs://github%2B7b2276223a312c22726566223a7b2274797065223a332c226964223a2231227d7d/uname/repo/image.png",
        )
        .unwrap();
        assert_eq!(address.scheme(), Scheme::VirtualFs);
        assert!(address.authority().unwrap().starts_with("github"));
        assert_eq!(address.path(), "/uname/repo/image.png");
    }

    #[test]
    fn parses_remote_temp_cache() {
        let address = Address::parse(
            "vscode-userdata:/User/globalStorage/github.vscode-pull-request-github/temp/repo/image.png",
        )
        .unwrap();
        assert_eq!(address.scheme(), Scheme::RemoteTempCache);
        assert_eq!(
            address.segments().collect::<Vec<_>>(),
            [
                "User",
                "globalStorage",
                "github.vscode-pull-request-github",
                "temp",
                "repo",
                "image.png"
            ]
        );
    }

    #[test]
    fn decodes_percent_escapes_in_path() {
        let address = Address::parse("file:///repo/my%20image.png").unwrap();
        assert_eq!(address.file_name(), Some("my image.png"));
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = Address::parse("https://example.com/a.png").unwrap_err();
        assert!(matches!(err, AddressError::UnsupportedScheme(s) if s == "https"));
        assert!(matches!(
            Address::parse("not a uri"),
            Err(AddressError::Parse(_))
        ));
    }

    #[test]
    fn file_name_of_directory_path_is_none() {
        assert_eq!(Address::file("/repo/").file_name(), None);
        assert_eq!(Address::file("").file_name(), None);
    }

    #[test]
    fn display_round_trips_simple_addresses() {
        let text = "file:///repo/img.png";
        assert_eq!(Address::parse(text).unwrap().to_string(), text);
        let vcs = Address::new(Scheme::VcsObject, "/repo/img.png").with_query(r#"{"ref":"HEAD"}"#);
        assert_eq!(vcs.to_string(), r#"git:/repo/img.png?{"ref":"HEAD"}"#);
    }
}
