//! Decorations added around the converted body: the build status header,
//! quality badges, and the documentation link and notice at the end.

use xdoc2md_converters_core::{Metric, Options};

/// Maven group of the core platform artifact.
const CORE_GROUP_ID: &str = "fr.paris.lutece";
/// Maven group of every other artifact.
const PLUGINS_GROUP_ID: &str = "fr.paris.lutece.plugins";

/// Notice closing every generated document.
pub(crate) const FOOTER: &str = "\n\n *generated by [xdoc2md](https://github.com/lutece-platform/tools-maven-xdoc2md-plugin) - do not edit directly.*";

/// Name of the CI job that builds `repository`.
///
/// Every `lutece-` and every `.git` is removed, wherever it appears, then
/// `-deploy` is appended: `lutece-foo.git` gives `foo-deploy`. The removal is
/// not anchored, so `my-lutece-tool` also becomes `my-tool-deploy`.
#[must_use]
pub fn job_name(repository: &str) -> String {
    let mut job = repository.replace("lutece-", "").replace(".git", "");
    job.push_str("-deploy");
    job
}

/// The build status image that opens the document.
#[must_use]
pub(crate) fn build_status_header(options: &Options) -> String {
    format!(
        "![]({}{})",
        options.build_status_url(),
        job_name(options.repository())
    )
}

/// A linked badge for one quality metric, preceded by a line break.
#[must_use]
pub(crate) fn badge(options: &Options, metric: &Metric) -> String {
    let group = if options.is_core_artifact() {
        CORE_GROUP_ID
    } else {
        PLUGINS_GROUP_ID
    };
    let server = options.sonar_url();
    let artifact = options.artifact_id();
    format!(
        "\n[![{name}]({server}/api/project_badges/measure?project={group}%3A{artifact}&metric={key})]({server}/dashboard?id={group}%3A{artifact})",
        name = metric.name(),
        key = metric.key(),
    )
}

/// Everything that precedes the converted body.
#[must_use]
pub(crate) fn preamble(options: &Options) -> String {
    let mut preamble = build_status_header(options);
    for metric in options.metrics() {
        preamble.push_str(&badge(options, metric));
    }
    preamble.push('\n');
    preamble
}

/// Link to the published Maven site of the artifact.
#[must_use]
pub(crate) fn documentation_link(options: &Options) -> String {
    format!(
        "\n\n[Maven documentation and reports]({}/{}/)\n\n",
        options.docs_url(),
        options.artifact_id()
    )
}
