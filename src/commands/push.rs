use crate::core::{
    error::Result, print_info, print_item_result, print_section_header, print_success,
    print_warning, CancellationToken, PushOptions, PushReport, RemoteSettings, RemoteTarget,
    Repository,
};
use std::path::{Path, PathBuf};

/// Flags of the `push` subcommand.
#[derive(Debug, Clone, Default)]
pub struct PushArgs {
    pub mirror: Option<PathBuf>,
    pub jobs: usize,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
}

impl PushArgs {
    /// Remote settings given on the command line; these override every other source.
    fn flag_settings(&self) -> RemoteSettings {
        RemoteSettings {
            region: self.region.clone(),
            bucket: self.bucket.clone(),
            endpoint: self.endpoint.clone(),
            ..Default::default()
        }
    }
}

pub fn execute_push(root: &Path, args: PushArgs) -> Result<()> {
    let repo = Repository::open(root)?;

    let mut settings = RemoteSettings::load(repo.layout())?;
    settings.merge(args.flag_settings());

    let mut target = RemoteTarget::with_remote(repo.layout(), settings);
    if let Some(mirror) = &args.mirror {
        target.mirror_dir = mirror.clone();
    }

    let options = PushOptions {
        jobs: args.jobs.max(1),
        cancel: CancellationToken::new(),
    };

    let report = repo.push(&target, &options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    report.into_result().map(|_| ())
}

fn print_report(report: &PushReport) {
    match &report.local_error {
        None => print_success(&format!(
            "Local mirror updated: {}",
            report.mirror_dir.display()
        )),
        Some(error) => print_warning(&format!("Local mirror failed: {error}")),
    }

    if let Some(reason) = &report.remote_skipped {
        print_warning(&format!("Remote upload skipped ({reason})"));
        println!();
        return;
    }

    let remote = report.remote.as_deref().unwrap_or("remote");
    if report.remote_results.is_empty() && report.not_attempted == 0 {
        print_info(&format!("Nothing to upload to {remote}"));
        return;
    }

    print_section_header(&format!("Uploads to {remote}"));
    for result in &report.remote_results {
        print_item_result(result.ok, &result.key, result.error.as_deref());
    }
    if report.not_attempted > 0 {
        println!("  {} upload(s) not attempted", report.not_attempted);
    }

    let failed = report.failed_uploads().count();
    let uploaded = report.remote_results.len() - failed;
    println!("\n  {uploaded} uploaded, {failed} failed\n");
}
