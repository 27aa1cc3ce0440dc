//! Build log postmortem operation

use crate::OpsCtx;
use autospec_config::constants::{BUILD_LOG, RESULTS_DIR};
use autospec_errors::Error;
use autospec_logcheck::{LogReport, MissList, BLACKLIST_FILE, WHITELIST_FILE};
use std::path::Path;

/// Check `<pkg_dir>/results/build.log` against the configure lists in the
/// assets directory, writing reports into `pkg_dir`
///
/// # Errors
///
/// Returns an error if the log is missing, a report cannot be written, or a
/// blacklisted configure-miss is found.
pub async fn logcheck(ctx: &OpsCtx, pkg_dir: &Path) -> Result<LogReport, Error> {
    let assets = ctx.config.assets_dir();
    let whitelist = MissList::load(&assets.join(WHITELIST_FILE)).await;
    let blacklist = MissList::load(&assets.join(BLACKLIST_FILE)).await;
    tracing::debug!(
        whitelist = whitelist.len(),
        blacklist = blacklist.len(),
        "loaded configure lists"
    );

    let log = pkg_dir.join(RESULTS_DIR).join(BUILD_LOG);
    autospec_logcheck::check(&log, pkg_dir, &whitelist, &blacklist, &ctx.tx).await
}
