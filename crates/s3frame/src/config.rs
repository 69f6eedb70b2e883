use std::env;

use serde::{Deserialize, Serialize};

/// Region used when neither `S3_SELECT_REGION` nor `AWS_REGION` is set.
const DEFAULT_REGION: &str = "us-east-1";

/// Record events between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

// ── Env helpers ──────────────────────────────────────────────────

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── SelectConfig ─────────────────────────────────────────────────

/// Connection and reporting settings for S3 Select queries.
///
/// Reads from environment variables with optional profile prefix.
/// When `S3FRAME_PROFILE=PROD`, checks `PROD_S3_SELECT_REGION` before `S3_SELECT_REGION`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectConfig {
    /// AWS region the bucket lives in.
    pub region: String,
    /// Endpoint override for S3-compatible stores (MinIO, LocalStack).
    pub endpoint_url: Option<String>,
    /// Use path-style addressing (`host/bucket/key`) instead of virtual hosts.
    pub force_path_style: bool,
    /// Record events between two progress log lines (0 disables them).
    pub progress_interval: u64,
    /// Bucket used by the CLI when `--bucket` is not given.
    pub default_bucket: Option<String>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            force_path_style: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            default_bucket: None,
        }
    }
}

impl SelectConfig {
    /// Build config from environment variables.
    ///
    /// Reads `S3FRAME_PROFILE` to determine the profile prefix.
    /// `S3_SELECT_REGION` falls back to `AWS_REGION` before using the default.
    pub fn from_env() -> Self {
        let profile = env_opt("S3FRAME_PROFILE")
            .map(|s| s.to_uppercase())
            .unwrap_or_default();
        Self::from_env_profiled(&profile)
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "S3_SELECT_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self {
            region,
            endpoint_url: profiled_env_opt(profile, "S3_SELECT_ENDPOINT_URL"),
            force_path_style: profiled_env_bool(profile, "S3_SELECT_FORCE_PATH_STYLE", false),
            progress_interval: profiled_env_u64(
                profile,
                "S3_SELECT_PROGRESS_INTERVAL",
                DEFAULT_PROGRESS_INTERVAL,
            ),
            default_bucket: profiled_env_opt(profile, "S3_SELECT_BUCKET"),
        }
    }

    /// Returns `true` when requests go to a custom endpoint rather than AWS.
    pub fn has_custom_endpoint(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

// ── Tests ────────────────────────────────────────────────────────
