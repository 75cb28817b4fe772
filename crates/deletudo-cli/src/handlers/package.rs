//! Package command handler
//!
//! For each browser target: read the manifest version, rebuild
//! `<out>/<browser>-v<version>/` from `shared/` overlaid with the browser's own
//! files, then zip it to `<out>/deletudo-<browser>-v<version>.zip`. A release
//! whose manifest names a script or resource that was not copied in is
//! rejected before the archive is written.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::commands::{BrowserTarget, PackageArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;

/// Directory under the extension source shared by every browser
pub const SHARED_DIR: &str = "shared";

/// Directory inside a release that receives the wasm-bindgen output
pub const WASM_PKG_DIR: &str = "pkg";

const ARCHIVE_PREFIX: &str = "deletudo";
const COMPRESSION_LEVEL: i32 = 9;

/// One finished browser release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Browser target
    pub browser: BrowserTarget,
    /// Manifest version
    pub version: String,
    /// Unpacked release directory
    pub release_dir: PathBuf,
    /// Zip archive
    pub archive: PathBuf,
    /// Archive size in bytes
    pub size_bytes: u64,
}

impl PackageReport {
    /// Archive size in MB, two decimals
    #[must_use]
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// Execute the package command
pub fn execute_package(config: &CliConfig, args: &PackageArgs) -> CliResult<Vec<PackageReport>> {
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let mut reports = Vec::with_capacity(args.browsers.len());

    for browser in &args.browsers {
        reporter.heading(&format!("Packaging {browser} extension..."));
        let report = package_browser(&args.source, &args.out, *browser, args.wasm_pkg.as_deref())
            .inspect_err(|e| reporter.failure(&format!("{browser}: {e}")))?;
        reporter.success(&format!("{browser} package created"));
        reporter.detail(
            "Archive:",
            &format!("{} ({} MB)", report.archive.display(), report.size_mb()),
        );
        reporter.detail("Directory:", &report.release_dir.display().to_string());
        reports.push(report);
    }

    Ok(reports)
}

/// Build the release directory and archive for one browser
pub fn package_browser(
    source: &Path,
    out: &Path,
    browser: BrowserTarget,
    wasm_pkg: Option<&Path>,
) -> CliResult<PackageReport> {
    let shared_dir = source.join(SHARED_DIR);
    let browser_dir = source.join(browser.as_str());
    for dir in [&shared_dir, &browser_dir] {
        if !dir.is_dir() {
            return Err(CliError::missing_source(dir));
        }
    }

    let version = read_manifest_version(&browser_dir.join("manifest.json"))?;
    let release_dir = out.join(format!("{browser}-v{version}"));
    info!(%browser, %version, dir = %release_dir.display(), "building release directory");

    if release_dir.exists() {
        fs::remove_dir_all(&release_dir)?;
    }
    fs::create_dir_all(&release_dir)?;

    copy_dir_recursive(&shared_dir, &release_dir)?;
    copy_dir_recursive(&browser_dir, &release_dir)?;
    if let Some(pkg) = wasm_pkg {
        if !pkg.is_dir() {
            return Err(CliError::missing_source(pkg));
        }
        copy_dir_recursive(pkg, &release_dir.join(WASM_PKG_DIR))?;
    }
    verify_manifest_assets(&release_dir)?;

    let archive = out.join(format!("{ARCHIVE_PREFIX}-{browser}-v{version}.zip"));
    write_archive(&release_dir, &archive)?;
    let size_bytes = fs::metadata(&archive)?.len();
    info!(archive = %archive.display(), size_bytes, "archive written");

    Ok(PackageReport {
        browser,
        version,
        release_dir,
        archive,
        size_bytes,
    })
}

fn load_manifest(path: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| CliError::manifest(path, e.to_string()))?;
    let manifest: Value = serde_json::from_str(&text)?;
    if !manifest.is_object() {
        return Err(CliError::manifest(path, "expected a JSON object"));
    }
    Ok(manifest)
}

/// Read the `version` field of an extension manifest
pub fn read_manifest_version(path: &Path) -> CliResult<String> {
    load_manifest(path)?
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| CliError::missing_version(path))
}

/// Files a manifest loads: content script `js`/`css` entries and
/// `web_accessible_resources` (MV3 objects or MV2 strings). Glob patterns are
/// skipped.
#[must_use]
pub fn manifest_assets(manifest: &Value) -> Vec<String> {
    let strings = |value: Option<&Value>| -> Vec<String> {
        value
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect()
    };

    let mut assets = Vec::new();
    for script in manifest
        .get("content_scripts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        assets.extend(strings(script.get("js")));
        assets.extend(strings(script.get("css")));
    }
    for entry in manifest
        .get("web_accessible_resources")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        match entry {
            Value::String(resource) => assets.push(resource.clone()),
            _ => assets.extend(strings(entry.get("resources"))),
        }
    }
    assets.retain(|asset| !asset.contains('*'));
    assets
}

/// Fail when the release manifest references a file the release lacks
pub fn verify_manifest_assets(release_dir: &Path) -> CliResult<()> {
    let manifest = load_manifest(&release_dir.join("manifest.json"))?;
    for asset in manifest_assets(&manifest) {
        let relative = asset.trim_start_matches('/');
        if !release_dir.join(relative).is_file() {
            return Err(CliError::missing_asset(asset));
        }
        debug!(%asset, "manifest asset present");
    }
    Ok(())
}

/// Copy `src` into `dst`, creating `dst` and overwriting existing files
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
            debug!(file = %to.display(), "copied");
        }
    }
    Ok(())
}

/// Files under `dir`, recursively, sorted by path
pub fn collect_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_into(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files_into(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Archive entry name for `path`: relative to `base`, `/`-separated
fn entry_name(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// Zip the contents of `dir` into `archive`, replacing any existing file
pub fn write_archive(dir: &Path, archive: &Path) -> CliResult<()> {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut zip = ZipWriter::new(File::create(archive)?);
    for path in collect_files(dir)? {
        let Some(name) = entry_name(dir, &path) else {
            continue;
        };
        zip.start_file(name, options)?;
        io::copy(&mut File::open(&path)?, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Extension source tree with shared files and both browser manifests
    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("extension");
        write(&src.join("shared/loader.js"), "// loader");
        write(&src.join("shared/icons/icon-48.png"), "png");
        write(&src.join("shared/manifest.json"), r#"{"version": "0.0.0"}"#);
        write(
            &src.join("chrome/manifest.json"),
            r#"{"manifest_version": 3, "name": "Deletudo", "version": "1.1.0"}"#,
        );
        write(
            &src.join("firefox/manifest.json"),
            r#"{"manifest_version": 3, "name": "Deletudo", "version": "1.1.1"}"#,
        );
        temp
    }

    fn archive_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    mod manifest_tests {
        use super::*;

        #[test]
        fn test_reads_version() {
            let temp = fixture();
            let path = temp.path().join("extension/chrome/manifest.json");
            assert_eq!(read_manifest_version(&path).unwrap(), "1.1.0");
        }

        #[test]
        fn test_missing_version() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("manifest.json");
            write(&path, r#"{"name": "x"}"#);
            assert!(matches!(
                read_manifest_version(&path),
                Err(CliError::MissingVersion { .. })
            ));
        }

        #[test]
        fn test_non_string_version() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("manifest.json");
            write(&path, r#"{"version": 3}"#);
            assert!(matches!(
                read_manifest_version(&path),
                Err(CliError::MissingVersion { .. })
            ));
        }

        #[test]
        fn test_malformed_json() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("manifest.json");
            write(&path, "{ not json");
            assert!(matches!(read_manifest_version(&path), Err(CliError::Json(_))));
        }

        #[test]
        fn test_unreadable_manifest() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("absent.json");
            assert!(matches!(
                read_manifest_version(&path),
                Err(CliError::Manifest { .. })
            ));
        }
    }

    mod asset_tests {
        use super::*;

        const CONTENT_SCRIPT_MANIFEST: &str = r#"{
            "manifest_version": 3,
            "version": "1.2.0",
            "content_scripts": [{"matches": ["https://mail.google.com/*"], "js": ["pkg/deletudo.js", "loader.js"]}],
            "web_accessible_resources": [{"resources": ["pkg/deletudo_bg.wasm"], "matches": ["https://mail.google.com/*"]}]
        }"#;

        #[test]
        fn test_manifest_assets_mv3() {
            let manifest: Value = serde_json::from_str(CONTENT_SCRIPT_MANIFEST).unwrap();
            assert_eq!(
                manifest_assets(&manifest),
                vec!["pkg/deletudo.js", "loader.js", "pkg/deletudo_bg.wasm"]
            );
        }

        #[test]
        fn test_manifest_assets_mv2_and_globs() {
            let manifest: Value = serde_json::from_str(
                r#"{"content_scripts": [{"js": ["a.js"], "css": ["a.css"]}],
                    "web_accessible_resources": ["pkg/x.wasm", "icons/*.png"]}"#,
            )
            .unwrap();
            assert_eq!(
                manifest_assets(&manifest),
                vec!["a.js", "a.css", "pkg/x.wasm"]
            );
        }

        #[test]
        fn test_manifest_without_scripts_has_no_assets() {
            let manifest: Value = serde_json::from_str(r#"{"version": "1.0.0"}"#).unwrap();
            assert!(manifest_assets(&manifest).is_empty());
        }

        #[test]
        fn test_release_without_wasm_pkg_is_rejected() {
            let temp = fixture();
            write(
                &temp.path().join("extension/chrome/manifest.json"),
                CONTENT_SCRIPT_MANIFEST,
            );
            let out = temp.path().join("releases");

            let result =
                package_browser(&temp.path().join("extension"), &out, BrowserTarget::Chrome, None);
            match result {
                Err(CliError::MissingAsset { asset }) => assert_eq!(asset, "pkg/deletudo.js"),
                other => panic!("expected MissingAsset, got {other:?}"),
            }
            assert!(!out.join("deletudo-chrome-v1.2.0.zip").exists());
        }

        #[test]
        fn test_release_with_wasm_pkg_is_complete() {
            let temp = fixture();
            write(
                &temp.path().join("extension/chrome/manifest.json"),
                CONTENT_SCRIPT_MANIFEST,
            );
            let pkg = temp.path().join("pkg");
            write(&pkg.join("deletudo_bg.wasm"), "wasm");
            write(&pkg.join("deletudo.js"), "glue");

            let report = package_browser(
                &temp.path().join("extension"),
                &temp.path().join("releases"),
                BrowserTarget::Chrome,
                Some(&pkg),
            )
            .unwrap();
            let names = archive_names(&report.archive);
            for asset in ["loader.js", "pkg/deletudo.js", "pkg/deletudo_bg.wasm"] {
                assert!(names.contains(&asset.to_string()), "{asset} missing");
            }
        }

        #[test]
        fn test_partial_wasm_pkg_is_rejected() {
            let temp = fixture();
            write(
                &temp.path().join("extension/chrome/manifest.json"),
                CONTENT_SCRIPT_MANIFEST,
            );
            let pkg = temp.path().join("pkg");
            write(&pkg.join("deletudo.js"), "glue");

            let result = package_browser(
                &temp.path().join("extension"),
                &temp.path().join("releases"),
                BrowserTarget::Chrome,
                Some(&pkg),
            );
            assert!(matches!(
                result,
                Err(CliError::MissingAsset { asset }) if asset == "pkg/deletudo_bg.wasm"
            ));
        }
    }

    mod copy_tests {
        use super::*;

        #[test]
        fn test_browser_files_overwrite_shared() {
            let temp = fixture();
            let src = temp.path().join("extension");
            let dst = temp.path().join("out");
            copy_dir_recursive(&src.join("shared"), &dst).unwrap();
            copy_dir_recursive(&src.join("chrome"), &dst).unwrap();

            let manifest = fs::read_to_string(dst.join("manifest.json")).unwrap();
            assert!(manifest.contains("1.1.0"));
            assert!(dst.join("icons/icon-48.png").is_file());
            assert!(dst.join("loader.js").is_file());
        }

        #[test]
        fn test_collect_files_sorted() {
            let temp = fixture();
            let files = collect_files(&temp.path().join("extension/shared")).unwrap();
            let names: Vec<_> = files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect();
            assert_eq!(names, vec!["icon-48.png", "loader.js", "manifest.json"]);
        }
    }

    mod package_tests {
        use super::*;

        #[test]
        fn test_package_chrome() {
            let temp = fixture();
            let out = temp.path().join("releases");
            let report =
                package_browser(&temp.path().join("extension"), &out, BrowserTarget::Chrome, None)
                    .unwrap();

            assert_eq!(report.version, "1.1.0");
            assert_eq!(report.release_dir, out.join("chrome-v1.1.0"));
            assert_eq!(report.archive, out.join("deletudo-chrome-v1.1.0.zip"));
            assert!(report.size_bytes > 0);
            assert_eq!(
                archive_names(&report.archive),
                vec!["icons/icon-48.png", "loader.js", "manifest.json"]
            );
        }

        #[test]
        fn test_archive_manifest_is_browser_specific() {
            let temp = fixture();
            let out = temp.path().join("releases");
            let report =
                package_browser(&temp.path().join("extension"), &out, BrowserTarget::Firefox, None)
                    .unwrap();

            let mut zip = zip::ZipArchive::new(File::open(&report.archive).unwrap()).unwrap();
            let mut manifest = String::new();
            zip.by_name("manifest.json")
                .unwrap()
                .read_to_string(&mut manifest)
                .unwrap();
            assert!(manifest.contains("1.1.1"));
        }

        #[test]
        fn test_stale_release_dir_is_cleaned() {
            let temp = fixture();
            let out = temp.path().join("releases");
            write(&out.join("chrome-v1.1.0/stale.js"), "old");

            let report =
                package_browser(&temp.path().join("extension"), &out, BrowserTarget::Chrome, None)
                    .unwrap();

            assert!(!report.release_dir.join("stale.js").exists());
            assert!(!archive_names(&report.archive).contains(&"stale.js".to_string()));
        }

        #[test]
        fn test_wasm_pkg_copied() {
            let temp = fixture();
            let pkg = temp.path().join("pkg");
            write(&pkg.join("deletudo_bg.wasm"), "wasm");
            write(&pkg.join("deletudo.js"), "glue");
            let out = temp.path().join("releases");

            let report = package_browser(
                &temp.path().join("extension"),
                &out,
                BrowserTarget::Chrome,
                Some(&pkg),
            )
            .unwrap();

            let names = archive_names(&report.archive);
            assert!(names.contains(&"pkg/deletudo_bg.wasm".to_string()));
            assert!(names.contains(&"pkg/deletudo.js".to_string()));
        }

        #[test]
        fn test_missing_browser_dir() {
            let temp = fixture();
            fs::remove_dir_all(temp.path().join("extension/firefox")).unwrap();
            let result = package_browser(
                &temp.path().join("extension"),
                &temp.path().join("releases"),
                BrowserTarget::Firefox,
                None,
            );
            assert!(matches!(result, Err(CliError::MissingSource { .. })));
        }

        #[test]
        fn test_size_mb_two_decimals() {
            let report = PackageReport {
                browser: BrowserTarget::Chrome,
                version: "1.0.0".to_string(),
                release_dir: PathBuf::new(),
                archive: PathBuf::new(),
                size_bytes: 1_572_864,
            };
            assert_eq!(report.size_mb(), "1.50");
        }

        #[test]
        fn test_execute_all_browsers() {
            let temp = fixture();
            let args = PackageArgs {
                source: temp.path().join("extension"),
                out: temp.path().join("releases"),
                browsers: vec![BrowserTarget::Chrome, BrowserTarget::Firefox],
                wasm_pkg: None,
            };
            let config = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
            let reports = execute_package(&config, &args).unwrap();
            assert_eq!(reports.len(), 2);
            assert!(temp.path().join("releases/deletudo-firefox-v1.1.1.zip").is_file());
        }
    }
}
