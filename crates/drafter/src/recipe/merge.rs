//! Merge an evaluated recipe into the spec model

use super::parser::{RecipeDict, TaskBlock};
use autospec_errors::{Error, RecipeError};
use autospec_events::{AppEvent, DraftEvent, EventEmitter};
use autospec_specfile::SpecModel;
use autospec_types::{BuildPattern, EvidenceTier, Phase};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+").ok());

/// Build requirement named by one `DEPENDS` token; tokens that open with a
/// variable reference other than `${PYTHON_PN}` name nothing
fn dependency_name(token: &str) -> Option<String> {
    let token = token.strip_prefix("${PYTHON_PN}-").unwrap_or(token);
    let ident = IDENTIFIER.as_ref()?.find(token)?.as_str();
    let name = ident.strip_suffix("-native").unwrap_or(ident);
    (!name.is_empty()).then(|| name.to_string())
}

/// Pattern implied by an inherited class
fn pattern_for_class(class: &str) -> Option<BuildPattern> {
    match class {
        "cmake" => Some(BuildPattern::Cmake),
        "meson" => Some(BuildPattern::Meson),
        "autotools" | "autotools-brokensep" => Some(BuildPattern::ConfigureAc),
        "setuptools3" | "distutils3" => Some(BuildPattern::Distutils3),
        "cpan" | "cpan_build" => Some(BuildPattern::Cpan),
        "qmake5" => Some(BuildPattern::Qmake),
        "scons" => Some(BuildPattern::Scons),
        _ => None,
    }
}

/// Phase chunks for one task block; unmapped tasks yield nothing
fn task_phases(name: &str, block: &TaskBlock) -> Vec<(Phase, Vec<String>)> {
    if name.starts_with("do_configure") {
        vec![(Phase::Configure, block.lines())]
    } else if name == "do_install" {
        let mut chunks = Vec::new();
        if !block.prepend.is_empty() {
            chunks.push((Phase::InstallPrepend, block.prepend.clone()));
        }
        let rest: Vec<String> = block.base.iter().chain(&block.append).cloned().collect();
        if !rest.is_empty() {
            chunks.push((Phase::InstallAppend, rest));
        }
        chunks
    } else {
        tracing::debug!(task = name, "no phase for recipe task");
        Vec::new()
    }
}

/// Marker comment followed by `#`-prefixed lines
fn commented(what: &str, source: &str, lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 1);
    out.push(format!("## {what} content from {source}"));
    out.extend(lines.iter().map(|line| {
        let line = line.trim_end();
        if line.is_empty() {
            "#".to_string()
        } else {
            format!("# {line}")
        }
    }));
    out
}

async fn append_phase_file(pkg_dir: &Path, phase: Phase, lines: &[String]) -> Result<(), Error> {
    let path = pkg_dir.join(phase.file_name());
    let write_failed = |e: std::io::Error| RecipeError::PhaseFileWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .map_err(write_failed)?;

    let mut text = lines.join("\n");
    text.push('\n');
    file.write_all(text.as_bytes()).await.map_err(write_failed)?;
    file.flush().await.map_err(write_failed)?;
    Ok(())
}

/// Merge `dict` into `model`.
///
/// Scalars replace, sets accumulate, empty values never override. Task
/// snippets are appended to the phase files in `pkg_dir` and attached to
/// the model. `source` names the recipe in marker comments and messages.
///
/// # Errors
///
/// Returns an error only if a phase file cannot be written.
pub async fn merge<E: EventEmitter>(
    dict: &RecipeDict,
    model: &mut SpecModel,
    pkg_dir: &Path,
    source: &str,
    tx: &E,
) -> Result<(), Error> {
    let merged = |field: &str, value: &str| {
        AppEvent::Draft(DraftEvent::RecipeMerged {
            field: field.to_string(),
            value: value.to_string(),
        })
    };

    let summary = dict
        .get("SUMMARY")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| dict.get("DESCRIPTION"));
    if let Some(text) = summary {
        if model.set_summary(text) {
            tx.emit_info(format!("Summary from {source}: {}", model.summary()));
            tx.emit(merged("summary", model.summary()));
        }
    }

    if let Some(license) = dict.get("LICENSE") {
        if model.add_license(license) {
            tx.emit(merged("license", license.trim()));
        }
    }

    if let Some(depends) = dict.get("DEPENDS") {
        for name in depends.split_whitespace().filter_map(dependency_name) {
            if model.add_buildreq(&name) {
                tx.emit(merged("build_requirement", &name));
            }
        }
    }

    let declared = dict
        .get("AUTOSPEC_PATTERN")
        .and_then(|p| p.trim().parse::<BuildPattern>().ok());
    let inherited = dict.inherits().iter().filter_map(|c| pattern_for_class(c));
    for pattern in declared.into_iter().chain(inherited) {
        let strength = EvidenceTier::Recipe.weigh(pattern);
        if model.set_pattern(pattern, strength) {
            tx.emit(AppEvent::Draft(DraftEvent::PatternSelected {
                pattern,
                strength,
                source: source.to_string(),
            }));
        }
    }

    let mut snippets: Vec<(Phase, Vec<String>)> = Vec::new();
    for (name, block) in dict.tasks() {
        for (phase, lines) in task_phases(name, block) {
            snippets.push((phase, commented(name, source, &lines)));
        }
    }
    if let Some(flags) = dict.get("EXTRA_OECONF").filter(|v| !v.trim().is_empty()) {
        let lines: Vec<String> = flags.split_whitespace().map(ToString::to_string).collect();
        snippets.push((Phase::Configure, commented("EXTRA_OECONF", source, &lines)));
    }

    for (phase, lines) in snippets {
        append_phase_file(pkg_dir, phase, &lines).await?;
        model.attach_command(phase, &lines);
        tx.emit(AppEvent::Draft(DraftEvent::PhaseAppended {
            phase,
            lines: lines.len(),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autospec_events::EventSender;
    use proptest::prelude::*;

    const NO_EVENTS: Option<EventSender> = None;

    async fn merge_text(text: &str, model: &mut SpecModel, dir: &Path) {
        merge(&RecipeDict::parse(text), model, dir, "foo_1.0.bb", &NO_EVENTS)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn summary_license_and_depends() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        merge_text(
            "SUMMARY = \"Fast XYZ\"\nLICENSE = \"Apache-2.0\"\nDEPENDS = \"zlib ${PYTHON_PN}-six openssl-native ${PN}-dev virtual/libiconv\"\n",
            &mut model,
            dir.path(),
        )
        .await;

        assert_eq!(model.summary(), "Fast XYZ");
        assert!(model.licenses().contains(&"Apache-2.0".to_string()));
        for req in ["zlib", "six", "openssl", "virtual"] {
            assert!(model.build_requirements().contains(req), "missing {req}");
        }
        assert!(!model.build_requirements().contains("PN"));
        assert_eq!(model.build_requirements().len(), 4);
    }

    #[tokio::test]
    async fn description_backs_up_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        model.set_summary("from archive");

        merge_text("SUMMARY = \"\"\nDESCRIPTION = \"Longer text\"\n", &mut model, dir.path()).await;
        assert_eq!(model.summary(), "Longer text");

        merge_text("DESCRIPTION = \"\"\n", &mut model, dir.path()).await;
        assert_eq!(model.summary(), "Longer text");
    }

    #[tokio::test]
    async fn license_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        model.add_license("mit");
        merge_text("LICENSE = \"MIT\"\n", &mut model, dir.path()).await;
        assert_eq!(model.licenses(), ["mit"]);
    }

    #[tokio::test]
    async fn phase_files_accumulate_across_merges() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        let recipe = "EXTRA_OECONF = \"--disable-docs\"\ndo_install_prepend() {\n    mkdir -p ${D}\n}\ndo_install() {\n    oe_runmake install\n}\n";

        merge_text(recipe, &mut model, dir.path()).await;
        merge_text(recipe, &mut model, dir.path()).await;

        let configure = std::fs::read_to_string(dir.path().join("configure")).unwrap();
        assert_eq!(
            configure,
            "## EXTRA_OECONF content from foo_1.0.bb\n# --disable-docs\n".repeat(2)
        );

        let prepend = std::fs::read_to_string(dir.path().join("install_prepend")).unwrap();
        assert_eq!(
            prepend,
            "## do_install content from foo_1.0.bb\n# mkdir -p ${D}\n".repeat(2)
        );

        let append = std::fs::read_to_string(dir.path().join("install_append")).unwrap();
        assert_eq!(append.matches("# oe_runmake install").count(), 2);

        assert_eq!(model.commands(Phase::Configure).len(), 4);
        assert_eq!(model.commands(Phase::InstallAppend).len(), 4);
    }

    #[tokio::test]
    async fn unmapped_tasks_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        merge_text("do_compile() {\n    make\n}\n", &mut model, dir.path()).await;
        assert!(!dir.path().join("configure").exists());
        assert!(model.commands(Phase::Configure).is_empty());
    }

    #[tokio::test]
    async fn recipes_declare_patterns_at_recipe_tier() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "");
        model.set_pattern(BuildPattern::R, EvidenceTier::FileHeuristic.weigh(BuildPattern::R));

        merge_text("inherit pkgconfig cmake\n", &mut model, dir.path()).await;
        assert_eq!(model.pattern(), BuildPattern::Cmake);

        merge_text("AUTOSPEC_PATTERN = \"meson\"\n", &mut model, dir.path()).await;
        assert_eq!(model.pattern(), BuildPattern::Meson);
    }

    #[tokio::test]
    async fn summary_survives_into_spec() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = SpecModel::new("xyz", "1.0", "https://example.com/xyz-1.0.tar.gz");
        merge_text("SUMMARY=\"X\"\n", &mut model, dir.path()).await;
        let spec = model.freeze().render_spec().unwrap();
        assert!(spec.lines().any(|l| l == "Summary  : X"));
    }

    #[tokio::test]
    async fn merge_reports_events() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = autospec_events::channel();
        let mut model = SpecModel::new("xyz", "1.0", "");
        merge(
            &RecipeDict::parse("SUMMARY = \"Fast XYZ\"\n"),
            &mut model,
            dir.path(),
            "xyz.bb",
            &tx,
        )
        .await
        .unwrap();

        let mut saw_info = false;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::General(autospec_events::GeneralEvent::Info { message }) = event {
                assert_eq!(message, "Summary from xyz.bb: Fast XYZ");
                saw_info = true;
            }
        }
        assert!(saw_info);
    }

    proptest! {
        #[test]
        fn depends_tokens_normalize(
            a in "[a-z][a-z0-9]{0,8}",
            b in "[a-z][a-z0-9]{0,8}",
            c in "[a-z][a-z0-9]{0,8}",
        ) {
            let dict = RecipeDict::parse(&format!("DEPENDS = \"{a} ${{PYTHON_PN}}-{b} {c}-native\"\n"));
            let deps: Vec<String> = dict
                .get("DEPENDS")
                .unwrap()
                .split_whitespace()
                .filter_map(dependency_name)
                .collect();
            prop_assert_eq!(deps, vec![a, b, c]);
        }

        #[test]
        fn variable_led_tokens_are_skipped(var in "[A-Z_]{1,8}", rest in "[a-z]{0,6}") {
            prop_assume!(var != "PYTHON_PN");
            let token = format!("${{{var}}}-{rest}");
            prop_assert_eq!(dependency_name(&token), None);
        }
    }
}
