//! Spec and options file emission

use crate::model::SpecModel;
use autospec_errors::{ConfigError, DraftError, Error};
use autospec_types::{BuildPattern, Phase, SourceCategory};
use serde::Serialize;
use std::io::Write;
use std::ops::Deref;
use tera::{Context, Tera};

const SPEC_TEMPLATE: &str = include_str!("../templates/package.spec.tera");

/// A spec model after the mutable phase ended
///
/// Derefs to [`SpecModel`] for read access; there is no way back to a
/// mutable model.
#[derive(Debug, Clone)]
pub struct FrozenSpec {
    model: SpecModel,
}

impl Deref for FrozenSpec {
    type Target = SpecModel;

    fn deref(&self) -> &SpecModel {
        &self.model
    }
}

#[derive(Serialize)]
struct SourceContext<'a> {
    index: u32,
    filename: &'a str,
}

#[derive(Serialize)]
struct ArchiveContext<'a> {
    filename: &'a str,
    destination: &'a str,
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    name: &'a str,
    version: &'a str,
    release: u32,
    url: &'a str,
    summary: &'a str,
    licenses: &'a [String],
    requires: Vec<&'a str>,
    build_requirements: Vec<&'a str>,
    sources: Vec<SourceContext<'a>>,
    archives: Vec<ArchiveContext<'a>>,
    locales: &'a [String],
    flags: Vec<String>,
    configure: &'a [String],
    build: Vec<String>,
    install_prepend: &'a [String],
    install: Vec<String>,
    install_append: &'a [String],
}

/// Contents of `options.toml`
#[derive(Debug, Serialize)]
struct OptionsFile<'a> {
    package: PackageOptions<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    archives: Vec<ArchiveOptions<'a>>,
}

#[derive(Debug, Serialize)]
struct PackageOptions<'a> {
    name: &'a str,
    url: &'a str,
    version: &'a str,
    pattern: BuildPattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ArchiveOptions<'a> {
    filename: &'a str,
    url: &'a str,
    sha256: &'a str,
    destination: &'a str,
}

impl FrozenSpec {
    pub(crate) fn new(model: SpecModel) -> Self {
        Self { model }
    }

    /// Render the spec file text
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded template fails to load or render.
    pub fn render_spec(&self) -> Result<String, Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("package.spec", SPEC_TEMPLATE)
            .map_err(|e| DraftError::TemplateFailed {
                message: format!("Failed to load template: {e}"),
            })?;

        let context = Context::from_serialize(self.template_context()).map_err(|e| {
            DraftError::TemplateFailed {
                message: format!("Failed to serialize template context: {e}"),
            }
        })?;

        tera.render("package.spec", &context).map_err(|e| {
            DraftError::TemplateFailed {
                message: format!("Failed to render template: {e}"),
            }
            .into()
        })
    }

    /// Write the spec file to `writer`
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the writer rejects the output.
    pub fn emit_spec<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        let text = self.render_spec()?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Render `options.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails.
    pub fn render_configure_file(&self) -> Result<String, Error> {
        let model = &self.model;
        let options = OptionsFile {
            package: PackageOptions {
                name: &model.name,
                url: &model.url,
                version: &model.version,
                pattern: model.pattern(),
                sha256: model.sha256.as_deref(),
            },
            archives: model
                .archive_details
                .iter()
                .map(|(filename, detail)| ArchiveOptions {
                    filename,
                    url: &detail.url,
                    sha256: &detail.sha256,
                    destination: &detail.destination,
                })
                .collect(),
        };

        toml::to_string(&options).map_err(|e| {
            ConfigError::SerializeError {
                what: "options".to_string(),
                error: e.to_string(),
            }
            .into()
        })
    }

    /// Write `options.toml` to `writer`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the writer rejects the output.
    pub fn emit_configure_file<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        let text = self.render_configure_file()?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn template_context(&self) -> TemplateContext<'_> {
        let model = &self.model;

        let mut sources: Vec<SourceContext<'_>> = model
            .source_index
            .iter()
            .map(|(filename, index)| SourceContext {
                index: *index,
                filename,
            })
            .collect();
        sources.sort_by_key(|s| s.index);

        let archives = model
            .sources(SourceCategory::Archive)
            .iter()
            .filter_map(|filename| {
                model
                    .archive_details
                    .get(filename)
                    .map(|detail| ArchiveContext {
                        filename,
                        destination: &detail.destination,
                    })
            })
            .collect();

        let mut install = pattern_install(model.pattern());
        install.extend(source_install_lines(model));

        TemplateContext {
            name: &model.name,
            version: &model.version,
            release: 1,
            url: &model.url,
            summary: &model.summary,
            licenses: &model.licenses,
            requires: model.requires.iter().map(String::as_str).collect(),
            build_requirements: model
                .build_requirements
                .iter()
                .map(String::as_str)
                .collect(),
            sources,
            archives,
            locales: &model.locales,
            configure: model.commands(Phase::Configure),
            flags: profile_flag_lines(model),
            build: pattern_build(model.pattern()),
            install_prepend: model.commands(Phase::InstallPrepend),
            install,
            install_append: model.commands(Phase::InstallAppend),
        }
    }
}

fn lines(body: &[&str]) -> Vec<String> {
    body.iter().map(ToString::to_string).collect()
}

/// `%build` body for a pattern
fn pattern_build(pattern: BuildPattern) -> Vec<String> {
    match pattern {
        BuildPattern::Make => lines(&["make %{?_smp_mflags}"]),
        BuildPattern::ConfigureAc => {
            lines(&["%reconfigure --disable-static", "make %{?_smp_mflags}"])
        }
        BuildPattern::Autogen => lines(&["%autogen --disable-static", "make %{?_smp_mflags}"]),
        BuildPattern::Cmake => lines(&[
            "mkdir -p clr-build",
            "pushd clr-build",
            "%cmake ..",
            "make %{?_smp_mflags}",
            "popd",
        ]),
        BuildPattern::Qmake => lines(&["%qmake", "make %{?_smp_mflags}"]),
        BuildPattern::Distutils3 => lines(&["python3 setup.py build"]),
        BuildPattern::Cpan => lines(&[
            "if test -f Makefile.PL; then",
            "%{__perl} Makefile.PL",
            "make %{?_smp_mflags}",
            "else",
            "%{__perl} Build.PL",
            "./Build",
            "fi",
        ]),
        BuildPattern::Phpize => lines(&["phpize", "%configure", "make %{?_smp_mflags}"]),
        BuildPattern::R => lines(&["export LANG=C.UTF-8"]),
        BuildPattern::Ruby => lines(&["gem build *.gemspec"]),
        BuildPattern::Scons => lines(&["scons %{?_smp_mflags}"]),
        BuildPattern::Meson => lines(&[
            "meson --libdir=lib64 --prefix=/usr --buildtype=plain builddir",
            "ninja -v -C builddir",
        ]),
    }
}

/// `%install` body for a pattern
fn pattern_install(pattern: BuildPattern) -> Vec<String> {
    match pattern {
        BuildPattern::Make
        | BuildPattern::ConfigureAc
        | BuildPattern::Autogen
        | BuildPattern::Qmake => lines(&["%make_install"]),
        BuildPattern::Cmake => lines(&["pushd clr-build", "%make_install", "popd"]),
        BuildPattern::Distutils3 => {
            lines(&["python3 -tt setup.py build install --root=%{buildroot}"])
        }
        BuildPattern::Cpan => lines(&[
            "if test -f Makefile.PL; then",
            "make pure_install PERL_INSTALL_ROOT=%{buildroot} INSTALLDIRS=vendor",
            "else",
            "./Build install --installdirs=vendor --destdir=%{buildroot}",
            "fi",
        ]),
        BuildPattern::Phpize => lines(&["make install INSTALL_ROOT=%{buildroot}"]),
        BuildPattern::R => lines(&[
            "export LANG=C.UTF-8",
            "mkdir -p %{buildroot}/usr/lib64/R/library",
            "R CMD INSTALL --library=%{buildroot}/usr/lib64/R/library .",
        ]),
        BuildPattern::Ruby => lines(&[
            "gem install --local --force --install-dir %{buildroot}$(ruby -e'puts Gem.default_dir') *.gem",
        ]),
        BuildPattern::Scons => lines(&["scons install --prefix=%{buildroot}/usr"]),
        BuildPattern::Meson => lines(&["DESTDIR=%{buildroot} ninja -C builddir install"]),
    }
}

/// `%build` exports feeding gcov profile sources to the compiler
fn profile_flag_lines(model: &SpecModel) -> Vec<String> {
    let flags: Vec<String> = model
        .sources(SourceCategory::Gcov)
        .iter()
        .filter_map(|profile| model.source_index(profile))
        .map(|index| format!("-fauto-profile=%{{SOURCE{index}}}"))
        .collect();
    if flags.is_empty() {
        return Vec::new();
    }
    let flags = flags.join(" ");
    vec![
        format!("export CFLAGS=\"$CFLAGS {flags}\""),
        format!("export CXXFLAGS=\"$CXXFLAGS {flags}\""),
    ]
}

/// Install lines for unit and tmpfile sources
fn source_install_lines(model: &SpecModel) -> Vec<String> {
    let mut out = Vec::new();

    let units = model.sources(SourceCategory::Unit);
    if !units.is_empty() {
        out.push("mkdir -p %{buildroot}/usr/lib/systemd/system".to_string());
        for unit in units {
            if let Some(index) = model.source_index(unit) {
                out.push(format!(
                    "install -m0644 %{{SOURCE{index}}} %{{buildroot}}/usr/lib/systemd/system/{unit}"
                ));
            }
        }
    }

    let tmpfiles = model.sources(SourceCategory::Tmpfile);
    if !tmpfiles.is_empty() {
        out.push("mkdir -p %{buildroot}/usr/lib/tmpfiles.d".to_string());
        for tmpfile in tmpfiles {
            if let Some(index) = model.source_index(tmpfile) {
                out.push(format!(
                    "install -m0644 %{{SOURCE{index}}} %{{buildroot}}/usr/lib/tmpfiles.d/{}.conf",
                    model.name
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpecModel {
        let mut model = SpecModel::new(
            "argparse",
            "1.4.0",
            "http://pypi.debian.net/argparse/argparse-1.4.0.tar.gz",
        );
        model.set_pattern(BuildPattern::Distutils3, 16);
        model.set_summary("Python command-line parsing library");
        model.add_license("Python-2.0");
        model.add_license("MIT");
        model.add_buildreq("zlib");
        model.add_buildreq("pypi(setuptools)");
        model.add_requires("pypi(six)");
        model
    }

    fn has_line(text: &str, line: &str) -> bool {
        text.lines().any(|l| l == line)
    }

    #[test]
    fn header_and_pattern_bodies() {
        let spec = sample().freeze().render_spec().unwrap();
        assert!(has_line(&spec, "Name     : argparse"));
        assert!(has_line(&spec, "Version  : 1.4.0"));
        assert!(has_line(
            &spec,
            "Source0  : http://pypi.debian.net/argparse/argparse-1.4.0.tar.gz"
        ));
        assert!(has_line(&spec, "Summary  : Python command-line parsing library"));
        assert!(has_line(&spec, "License  : Python-2.0 MIT"));
        assert!(has_line(&spec, "Requires: pypi(six)"));
        assert!(has_line(&spec, "%setup -q -n argparse-1.4.0"));
        assert!(has_line(&spec, "python3 setup.py build"));
        assert!(has_line(
            &spec,
            "python3 -tt setup.py build install --root=%{buildroot}"
        ));

        let reqs: Vec<_> = spec
            .lines()
            .filter(|l| l.starts_with("BuildRequires"))
            .collect();
        assert_eq!(
            reqs,
            ["BuildRequires : pypi(setuptools)", "BuildRequires : zlib"]
        );
    }

    #[test]
    fn locales_section_lists_every_lang() {
        let mut model = sample();
        model.add_locale("argparse");
        model.add_locale("extra");
        let spec = model.freeze().render_spec().unwrap();
        assert!(has_line(&spec, "%find_lang argparse"));
        assert!(has_line(&spec, "%find_lang extra"));
        assert!(has_line(
            &spec,
            "%files locales -f argparse.lang -f extra.lang"
        ));
    }

    #[test]
    fn no_locales_means_no_locales_section() {
        let spec = sample().freeze().render_spec().unwrap();
        assert!(!spec.contains("%files locales"));
        assert!(!spec.contains("%find_lang"));
        assert!(has_line(&spec, "%files"));
    }

    #[test]
    fn phase_snippets_land_around_pattern_bodies() {
        let mut model = sample();
        model.attach_command(Phase::Configure, &["# EXTRA_OECONF".to_string()]);
        model.attach_command(Phase::InstallPrepend, &["# before".to_string()]);
        model.attach_command(Phase::InstallAppend, &["# after".to_string()]);
        let spec = model.freeze().render_spec().unwrap();

        let pos = |needle: &str| spec.lines().position(|l| l == needle).unwrap();
        assert!(pos("%build") < pos("# EXTRA_OECONF"));
        assert!(pos("# EXTRA_OECONF") < pos("python3 setup.py build"));
        assert!(pos("%install") < pos("# before"));
        assert!(pos("# before") < pos("python3 -tt setup.py build install --root=%{buildroot}"));
        assert!(pos("python3 -tt setup.py build install --root=%{buildroot}") < pos("# after"));
    }

    #[test]
    fn extra_sources_are_numbered_and_unpacked() {
        let mut model = sample();
        model.add_source(SourceCategory::Unit, "argparse.service");
        model.add_archive(
            "helper-0.1.tar.gz",
            "https://example.com/helper-0.1.tar.gz",
            "00ff",
            "helper",
        );
        let spec = model.freeze().render_spec().unwrap();
        assert!(has_line(&spec, "Source1  : argparse.service"));
        assert!(has_line(&spec, "Source2  : helper-0.1.tar.gz"));
        assert!(has_line(&spec, "mkdir -p helper"));
        assert!(has_line(
            &spec,
            "install -m0644 %{SOURCE1} %{buildroot}/usr/lib/systemd/system/argparse.service"
        ));
    }

    #[test]
    fn gcov_profiles_feed_the_build_flags() {
        let mut model = sample();
        model.add_source(SourceCategory::Unit, "argparse.service");
        model.add_source(SourceCategory::Gcov, "argparse.gcov");
        model.attach_command(Phase::Configure, &["# EXTRA_OECONF".to_string()]);
        let spec = model.freeze().render_spec().unwrap();

        assert!(has_line(&spec, "Source2  : argparse.gcov"));
        let pos = |needle: &str| spec.lines().position(|l| l == needle).unwrap();
        let cflags = pos("export CFLAGS=\"$CFLAGS -fauto-profile=%{SOURCE2}\"");
        assert!(pos("%build") < cflags);
        assert!(cflags < pos("python3 setup.py build"));
        assert!(cflags < pos("# EXTRA_OECONF"));
        assert!(has_line(&spec, "export CXXFLAGS=\"$CXXFLAGS -fauto-profile=%{SOURCE2}\""));
    }

    #[test]
    fn no_profile_means_plain_flags() {
        let spec = sample().freeze().render_spec().unwrap();
        assert!(!spec.contains("-fauto-profile"));
    }

    #[test]
    fn options_file_carries_package_and_archives() {
        let mut model = sample();
        model.set_sha256("deadbeef");
        model.add_archive("helper-0.1.tar.gz", "https://example.com/helper-0.1.tar.gz", "00ff", "helper");
        let options = model.freeze().render_configure_file().unwrap();

        let parsed: toml::Value = toml::from_str(&options).unwrap();
        assert_eq!(parsed["package"]["name"].as_str(), Some("argparse"));
        assert_eq!(parsed["package"]["pattern"].as_str(), Some("distutils3"));
        assert_eq!(parsed["package"]["sha256"].as_str(), Some("deadbeef"));
        assert_eq!(parsed["archives"][0]["destination"].as_str(), Some("helper"));
    }

    #[test]
    fn emit_writes_to_any_writer() {
        let frozen = sample().freeze();
        let mut buffer = Vec::new();
        frozen.emit_spec(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), frozen.render_spec().unwrap());
        assert_eq!(frozen.name(), "argparse");
    }
}
