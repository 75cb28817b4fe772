//! Command handlers - extracted from main.rs for testability

pub mod package;

pub use package::{
    collect_files, copy_dir_recursive, execute_package, manifest_assets, package_browser,
    read_manifest_version, verify_manifest_assets, write_archive, PackageReport,
};
