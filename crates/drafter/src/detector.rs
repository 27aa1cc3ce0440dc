//! Build system detection from files in the unpacked source tree

use autospec_types::BuildPattern;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Every pattern hinted at by the top level of `source_dir`.
///
/// Callers weigh each hint at the file-heuristic tier; the strongest one
/// ends up selected.
#[must_use]
pub fn detect(source_dir: &Path) -> Vec<BuildPattern> {
    let names: BTreeSet<String> = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| entry.file_name().to_str().map(ToString::to_string))
        .collect();

    let has = |name: &str| names.contains(name);
    let has_ext = |ext: &str| names.iter().any(|n| n.len() > ext.len() && n.ends_with(ext));

    let mut hints = Vec::new();
    let mut hint = |found: bool, pattern: BuildPattern| {
        if found {
            hints.push(pattern);
        }
    };

    hint(
        has("Makefile") || has("makefile") || has("GNUmakefile"),
        BuildPattern::Make,
    );
    hint(
        has("configure.ac") || has("configure.in"),
        BuildPattern::ConfigureAc,
    );
    hint(has("autogen.sh"), BuildPattern::Autogen);
    hint(has("CMakeLists.txt"), BuildPattern::Cmake);
    hint(has_ext(".pro"), BuildPattern::Qmake);
    hint(
        has("setup.py") || has("pyproject.toml"),
        BuildPattern::Distutils3,
    );
    hint(has("Makefile.PL") || has("Build.PL"), BuildPattern::Cpan);
    hint(has("config.m4"), BuildPattern::Phpize);
    hint(has("DESCRIPTION") && has("NAMESPACE"), BuildPattern::R);
    hint(has_ext(".gemspec"), BuildPattern::Ruby);
    hint(has("SConstruct"), BuildPattern::Scons);
    hint(has("meson.build"), BuildPattern::Meson);

    tracing::debug!(dir = %source_dir.display(), ?hints, "file heuristics");
    hints
}
