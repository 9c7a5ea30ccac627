// src/github/address.rs
// =============================================================================
// This module turns identifiers into GitHub repositories.
//
// Two kinds of input show up:
// - the seed address the user typed (validated up front)
// - module paths found in go.mod files (normalized, or skipped)
//
// Supported identifier shapes:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo
//   - github.com/owner/repo/v2        (extra segments are ignored)
//
// Anything else (golang.org/x/net, gopkg.in/yaml.v3, gitlab.com/...) can't be
// looked up through the GitHub API and is skipped. That's expected, not an
// error: most Go modules resolve through a vanity import path.
// =============================================================================

use std::fmt;

use url::Url;

use crate::error::CrawlError;

const GITHUB_HOST: &str = "github.com";

/// An owner/repo pair on GitHub
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// The module path go.mod files use for this repository
    pub fn module_path(&self) -> String {
        format!("{}/{}/{}", GITHUB_HOST, self.owner, self.repo)
    }

    fn from_segments<'a>(mut segments: impl Iterator<Item = &'a str>) -> Option<Self> {
        let owner = segments.next()?;
        let repo = segments.next()?;

        // Remove .git suffix if present
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// Normalizes an identifier into a fetchable repository
//
// Returns: Some(RepoRef) for the supported shapes, None otherwise
//
// Example:
//   "https://github.com/rust-lang/rust" -> Some(rust-lang/rust)
//   "golang.org/x/net"                  -> None
pub fn normalize(identifier: &str) -> Option<RepoRef> {
    let identifier = identifier.trim();

    if identifier.starts_with("http://") || identifier.starts_with("https://") {
        let url = Url::parse(identifier).ok()?;
        if !is_github_host(url.host_str()?) {
            return None;
        }
        return RepoRef::from_segments(url.path_segments()?.filter(|s| !s.is_empty()));
    }

    let (host, path) = identifier.split_once('/')?;
    if !is_github_host(host) {
        return None;
    }
    RepoRef::from_segments(path.split('/').filter(|s| !s.is_empty()))
}

fn is_github_host(host: &str) -> bool {
    host.eq_ignore_ascii_case(GITHUB_HOST) || host.eq_ignore_ascii_case("www.github.com")
}

// Checks the seed address before a crawl starts
//
// Accepts an absolute http(s) URL with a host, or a bare host/owner/repo
// path. The address doesn't have to be on GitHub to be valid; it just won't
// be expanded if it isn't.
//
// Returns: the trimmed address, used as the root's name
pub fn validate_seed(seed: &str) -> Result<String, CrawlError> {
    let seed = seed.trim();

    if seed.is_empty() {
        return Err(CrawlError::invalid_request("empty repository address"));
    }

    if seed.contains("://") {
        let url = Url::parse(seed)
            .map_err(|e| CrawlError::invalid_request(format!("invalid URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CrawlError::invalid_request(format!(
                "unsupported scheme '{}' in '{}'",
                url.scheme(),
                seed
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(CrawlError::invalid_request(format!("URL has no host: {}", seed)));
        }
        return Ok(seed.to_string());
    }

    let parts: Vec<&str> = seed.split('/').collect();
    let well_formed = parts.len() >= 3
        && parts.iter().all(|p| !p.is_empty() && !p.contains(char::is_whitespace))
        && parts[0].contains('.');

    if !well_formed {
        return Err(CrawlError::invalid_request(format!(
            "expected an absolute URL or host/owner/repo, got '{}'",
            seed
        )));
    }

    Ok(seed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, repo: &str) -> Option<RepoRef> {
        Some(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    #[test]
    fn test_normalize_absolute_url() {
        assert_eq!(normalize("https://github.com/rust-lang/rust"), repo("rust-lang", "rust"));
        assert_eq!(normalize("http://www.github.com/user/repo/"), repo("user", "repo"));
    }

    #[test]
    fn test_normalize_with_git_suffix() {
        assert_eq!(normalize("https://github.com/user/repo.git"), repo("user", "repo"));
    }

    #[test]
    fn test_normalize_bare_path() {
        assert_eq!(normalize("github.com/gin-gonic/gin"), repo("gin-gonic", "gin"));
        assert_eq!(normalize("github.com/go-redis/redis/v8"), repo("go-redis", "redis"));
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(normalize("golang.org/x/net"), None);
        assert_eq!(normalize("gopkg.in/yaml.v3"), None);
        assert_eq!(normalize("https://gitlab.com/user/repo"), None);
        assert_eq!(normalize("github.com/only-owner"), None);
        assert_eq!(normalize("just-a-name"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_module_path_matches_go_mod_spelling() {
        let repo = normalize("https://www.github.com/user/repo.git").unwrap();
        assert_eq!(repo.module_path(), "github.com/user/repo");
    }

    #[test]
    fn test_display() {
        let r = normalize("github.com/user/repo").unwrap();
        assert_eq!(r.to_string(), "user/repo");
    }

    #[test]
    fn test_validate_seed_accepts_both_shapes() {
        assert_eq!(
            validate_seed("  https://github.com/user/repo ").unwrap(),
            "https://github.com/user/repo"
        );
        assert_eq!(validate_seed("github.com/user/repo").unwrap(), "github.com/user/repo");
    }

    #[test]
    fn test_validate_seed_rejects_bad_input() {
        assert!(validate_seed("").is_err());
        assert!(validate_seed("   ").is_err());
        assert!(validate_seed("ftp://github.com/user/repo").is_err());
        assert!(validate_seed("https://").is_err());
        assert!(validate_seed("user/repo").is_err());
        assert!(validate_seed("github.com//repo").is_err());
        assert!(matches!(
            validate_seed("not a url"),
            Err(CrawlError::InvalidRequest(_))
        ));
    }
}
