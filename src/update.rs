use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Asset {
    #[serde(default)]
    pub name: String,
    pub browser_download_url: String,
}

/// `major.minor` of a release tag; patch and anything after it are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
}

impl ReleaseVersion {
    /// Accepts `v1.2`, `V1.2.3`, `1`. A missing or unparsable minor is 0.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut parts = tag
            .trim()
            .trim_matches(['v', 'V'])
            .split('.')
            .filter(|part| !part.is_empty());
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Some(Self { major, minor })
    }

    pub fn current() -> Self {
        Self::parse(env!("CARGO_PKG_VERSION")).unwrap_or(Self { major: 0, minor: 0 })
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

pub trait ReleaseFeed {
    fn latest_release(&self) -> Result<Release>;
}

/// Installs the binary found at a download URL in place of the running one.
pub trait UpdateApplier {
    fn apply(&self, download_url: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    UpToDate,
    Available {
        version: ReleaseVersion,
        download_url: String,
    },
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("git-backup/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// JSON release endpoint in the GitHub `releases/latest` shape.
pub struct HttpReleaseFeed {
    client: Client,
    url: String,
}

impl HttpReleaseFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            url: url.into(),
        })
    }
}

impl ReleaseFeed for HttpReleaseFeed {
    fn latest_release(&self) -> Result<Release> {
        self.client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Release>())
            .with_context(|| format!("Failed to fetch release metadata from {}", self.url))
    }
}

/// Downloads next to the current executable, then swaps the files. The old
/// binary is moved aside first since some platforms refuse to overwrite a
/// running image.
pub struct ReplaceExecutable {
    client: Client,
    exe: PathBuf,
}

impl ReplaceExecutable {
    pub fn for_current_exe() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            exe: std::env::current_exe().context("Failed to locate the running executable")?,
        })
    }
}

impl UpdateApplier for ReplaceExecutable {
    fn apply(&self, download_url: &str) -> Result<()> {
        let dir = self
            .exe
            .parent()
            .context("Executable has no parent directory")?;

        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to stage download in {}", dir.display()))?;
        let mut response = self
            .client
            .get(download_url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to download {download_url}"))?;
        response
            .copy_to(staged.as_file_mut())
            .context("Failed to write downloaded binary")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755))?;
        }

        let aside = self.exe.with_extension("old");
        fs::rename(&self.exe, &aside)
            .with_context(|| format!("Failed to move {} aside", self.exe.display()))?;
        if let Err(e) = staged.persist(&self.exe) {
            let _ = fs::rename(&aside, &self.exe);
            return Err(e.error).context("Failed to install downloaded binary");
        }
        if let Err(e) = fs::remove_file(&aside) {
            debug!(error = %e, path = %aside.display(), "old executable left in place");
        }
        Ok(())
    }
}

/// First asset named `asset_name` (or whose URL ends with it), else the last
/// one listed.
pub fn pick_asset<'a>(assets: &'a [Asset], asset_name: &str) -> Option<&'a Asset> {
    assets
        .iter()
        .find(|asset| asset.name == asset_name || asset.browser_download_url.ends_with(asset_name))
        .or_else(|| assets.last())
}

pub fn check_for_update(
    feed: &dyn ReleaseFeed,
    current: ReleaseVersion,
    asset_name: &str,
) -> Result<UpdateCheck> {
    let release = feed.latest_release()?;
    let version = ReleaseVersion::parse(&release.tag_name)
        .with_context(|| format!("Unrecognized release tag '{}'", release.tag_name))?;
    if version <= current {
        return Ok(UpdateCheck::UpToDate);
    }
    let asset = pick_asset(&release.assets, asset_name)
        .with_context(|| format!("Release {} has no assets", release.tag_name))?;
    Ok(UpdateCheck::Available {
        version,
        download_url: asset.browser_download_url.clone(),
    })
}

/// Best-effort self-update, run before the backup pipeline. Returns true only
/// when a newer binary was installed; failures are logged and reported as
/// "not updated".
pub fn self_update(
    feed: &dyn ReleaseFeed,
    applier: &dyn UpdateApplier,
    current: ReleaseVersion,
    asset_name: &str,
) -> bool {
    let (version, download_url) = match check_for_update(feed, current, asset_name) {
        Ok(UpdateCheck::UpToDate) => {
            info!(%current, "already on the latest release");
            return false;
        }
        Ok(UpdateCheck::Available {
            version,
            download_url,
        }) => (version, download_url),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "update check failed");
            return false;
        }
    };

    println!("A newer version {version} is available. Downloading...");
    match applier.apply(&download_url) {
        Ok(()) => {
            println!("Update successful. You can use the updated version now!");
            true
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "update could not be applied");
            false
        }
    }
}
