//! Draft operation: URL in, spec file out

use crate::build::run_build;
use crate::logcheck::logcheck;
use crate::types::{DraftReport, DraftRequest, ExtraArchive};
use crate::OpsCtx;
use autospec_config::constants::{OPTIONS_FILE, TRANSLATE_DIC};
use autospec_drafter::{archive_filename, classify, detect, extract, recipe, scrape, sha256_file};
use autospec_errors::{DraftError, Error, NetworkError};
use autospec_events::{AppEvent, DraftEvent, EventEmitter};
use autospec_net::{fetch, FetchRequest};
use autospec_providers::{PypiProvider, WhatRequires};
use autospec_specfile::{SpecModel, Translations, REGISTRY_SUMMARY_SCORE};
use autospec_types::{BuildPattern, EvidenceTier, Phase, SourceCategory};
use std::path::{Path, PathBuf};

fn offer_pattern(
    ctx: &OpsCtx,
    model: &mut SpecModel,
    pattern: BuildPattern,
    tier: EvidenceTier,
    source: &str,
) {
    let strength = tier.weigh(pattern);
    if model.set_pattern(pattern, strength) {
        ctx.emit(AppEvent::Draft(DraftEvent::PatternSelected {
            pattern,
            strength,
            source: source.to_string(),
        }));
    }
}

/// Download `url` into `pkg_dir`; any failure is fatal
async fn fetch_archive(ctx: &OpsCtx, url: &str, pkg_dir: &Path) -> Result<PathBuf, Error> {
    let dest = pkg_dir.join(archive_filename(url));
    let request = FetchRequest::new(url).destination(&dest).fatal();
    match fetch(&ctx.net, request, &ctx.tx).await? {
        Some(_) => Ok(dest),
        None => Err(NetworkError::Fatal {
            url: url.to_string(),
            reason: "no data received".to_string(),
        }
        .into()),
    }
}

/// Unit, tmpfile and gcov files the packager dropped into the package
/// directory become numbered sources
async fn register_local_sources(model: &mut SpecModel, pkg_dir: &Path) -> Result<(), Error> {
    let mut entries = tokio::fs::read_dir(pkg_dir)
        .await
        .map_err(|e| Error::io_with_path(&e, pkg_dir))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, pkg_dir))?
    {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    for name in names {
        let category = if name.ends_with(".service") {
            SourceCategory::Unit
        } else if name.ends_with(".tmpfiles") {
            SourceCategory::Tmpfile
        } else if name.ends_with(".gcov") {
            SourceCategory::Gcov
        } else {
            continue;
        };
        if let Some(index) = model.add_source(category, &name) {
            tracing::debug!(%name, %category, index, "registered local source");
        }
    }
    Ok(())
}

/// Seed the model with phase snippets left by earlier runs
async fn load_phase_files(model: &mut SpecModel, pkg_dir: &Path) {
    for phase in Phase::ALL {
        if let Ok(text) = tokio::fs::read_to_string(pkg_dir.join(phase.file_name())).await {
            let lines: Vec<String> = text.lines().map(ToString::to_string).collect();
            model.attach_command(phase, &lines);
        }
    }
}

async fn add_extra_archive(
    ctx: &OpsCtx,
    model: &mut SpecModel,
    extra: &ExtraArchive,
    pkg_dir: &Path,
) -> Result<(), Error> {
    let path = fetch_archive(ctx, &extra.url, pkg_dir).await?;
    let sha256 = sha256_file(&path).await?;
    let filename = archive_filename(&extra.url);
    model.add_archive(&filename, &extra.url, &sha256, &extra.destination);
    Ok(())
}

async fn query_package_index(ctx: &OpsCtx, model: &mut SpecModel) {
    let provider = PypiProvider::new(ctx.runner.as_ref(), &ctx.config.metadata);
    let metadata = provider.query(model.name(), ctx).await;
    if metadata.is_empty() {
        return;
    }
    if let Ok(json) = metadata.to_json() {
        tracing::debug!(metadata = %json, "package index metadata");
    }

    model.offer_summary(&metadata.summary, REGISTRY_SUMMARY_SCORE);
    for req in &metadata.requires {
        let dependency = format!("pypi({req})");
        model.add_buildreq(&dependency);
        model.add_requires(&dependency);
    }
}

async fn write_output(ctx: &OpsCtx, path: &Path, text: String) -> Result<(), Error> {
    tokio::fs::write(path, text)
        .await
        .map_err(|e| DraftError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    ctx.emit_file_written(path);
    Ok(())
}

/// Draft a spec for `request.url`.
///
/// Downloads and inspects the archive, merges recipes, consults the
/// metadata providers and writes `<name>.spec` and `options.toml` into the
/// package directory. With `request.build` the spec is then built and the
/// build log checked.
///
/// # Errors
///
/// Returns an error if a download fails, the archive cannot be unpacked, a
/// recipe or phase file cannot be read or written, an output file cannot
/// be written, or the build log shows a blacklisted configure-miss.
pub async fn draft(ctx: &OpsCtx, request: DraftRequest) -> Result<DraftReport, Error> {
    ctx.emit_operation_started("draft");

    let classified = classify(&request.url);
    let name = request.name.clone().unwrap_or(classified.name);
    let version = request.version.clone().unwrap_or(classified.version);
    if name.is_empty() {
        return Err(DraftError::NoPackageName {
            url: request.url.clone(),
        }
        .into());
    }
    ctx.emit(AppEvent::Draft(DraftEvent::Classified {
        name: name.clone(),
        version: version.clone(),
        hint: classified.hint,
    }));

    let pkg_dir = request
        .output
        .clone()
        .unwrap_or_else(|| ctx.config.package_dir(&name));
    tokio::fs::create_dir_all(&pkg_dir)
        .await
        .map_err(|e| Error::io_with_path(&e, &pkg_dir))?;

    let translations = Translations::load(&ctx.config.assets_dir().join(TRANSLATE_DIC));
    let mut model = SpecModel::new(&name, &version, &request.url).with_translations(translations);
    offer_pattern(ctx, &mut model, classified.hint, EvidenceTier::UrlHint, "url");

    let tarball = fetch_archive(ctx, &request.url, &pkg_dir).await?;
    model.set_sha256(sha256_file(&tarball).await?);

    let scratch = tempfile::tempdir()?;
    let source_root = extract(&tarball, scratch.path()).await?;
    for pattern in detect(&source_root) {
        offer_pattern(ctx, &mut model, pattern, EvidenceTier::FileHeuristic, "archive");
    }
    scrape(&source_root).await.apply(&mut model);
    drop(scratch);

    register_local_sources(&mut model, &pkg_dir).await?;
    for extra in &request.archives {
        add_extra_archive(ctx, &mut model, extra, &pkg_dir).await?;
    }

    load_phase_files(&mut model, &pkg_dir).await;
    for path in &request.recipes {
        let dict = recipe::load(path).await?;
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        recipe::merge(&dict, &mut model, &pkg_dir, &label, ctx).await?;
    }

    if model.pattern() == BuildPattern::Distutils3 && request.pypi && ctx.config.metadata.pypi {
        query_package_index(ctx, &mut model).await;
    }
    if request.whatrequires || ctx.config.metadata.whatrequires {
        WhatRequires::new(ctx.runner.as_ref(), &ctx.config.metadata)
            .run(model.name(), &pkg_dir, ctx)
            .await;
    }

    let spec = model.freeze();
    let spec_path = pkg_dir.join(format!("{}.spec", spec.name()));
    let options_path = pkg_dir.join(OPTIONS_FILE);
    write_output(ctx, &spec_path, spec.render_spec()?).await?;
    write_output(ctx, &options_path, spec.render_configure_file()?).await?;

    let mut report = DraftReport {
        name: spec.name().to_string(),
        version: spec.version().to_string(),
        pattern: spec.pattern(),
        package_dir: pkg_dir.clone(),
        spec_path: spec_path.clone(),
        options_path,
        build: None,
        misses: Vec::new(),
    };

    if request.build {
        let outcome = run_build(ctx, &pkg_dir, &spec_path).await?;
        report.build = Some(outcome);
        report.misses = logcheck(ctx, &pkg_dir).await?.misses;
    }

    ctx.emit_operation_completed("draft", true);
    Ok(report)
}
