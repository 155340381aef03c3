//! skillradar CLI
//!
//! ```text
//! skillradar --responses responses.xlsx --drive drive charts --rows 2-5,8
//! skillradar --responses responses.xlsx --profile notify submit --row 12
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use skillradar::{
    HttpPdfExporter, LocalDrive, Profile, ResponseWorkbook, RowSelection, RunReport, RunnerBuilder,
    Settings, SkillRadarError, SlackNotifier, DEFAULT_EXPORT_BASE_URL, DEFAULT_MAX_NAME_LEN,
    VARIABLES_SHEET,
};

#[derive(Parser)]
#[command(name = "skillradar", version)]
#[command(about = "Builds radar-chart workbooks from skill-assessment survey responses", long_about = None)]
struct Cli {
    /// Responses workbook (first sheet: header + answers, optional 変数 / 編集者 sheets)
    #[arg(long, value_name = "PATH")]
    responses: PathBuf,

    /// Root directory of the local drive
    #[arg(long, value_name = "DIR", default_value = "drive")]
    drive: PathBuf,

    /// Folder to store chart workbooks in (defaults to the フォルダ ID variable)
    #[arg(long, value_name = "ID")]
    folder: Option<String>,

    /// shared, filed or notify (filed and notify need a drive the export endpoint can read)
    #[arg(long, default_value = "shared")]
    profile: Profile,

    /// Links index workbook (defaults to <drive>/links.xlsx)
    #[arg(long, value_name = "PATH")]
    links: Option<PathBuf>,

    /// Editors to share chart workbooks with (defaults to the 編集者 sheet)
    #[arg(long, value_delimiter = ',')]
    editors: Vec<String>,

    /// Maximum length of an artifact name in characters
    #[arg(long, default_value_t = DEFAULT_MAX_NAME_LEN)]
    max_name_len: usize,

    /// Spreadsheet export endpoint used for PDF export
    #[arg(long, value_name = "URL", default_value = DEFAULT_EXPORT_BASE_URL)]
    export_base_url: String,

    /// Bearer token for the export endpoint
    #[arg(long, env = "SKILLRADAR_EXPORT_TOKEN", hide_env_values = true)]
    export_token: Option<String>,

    /// Slack incoming webhook (defaults to the Slack ウェブフック variable)
    #[arg(long, env = "SKILLRADAR_SLACK_WEBHOOK", hide_env_values = true)]
    slack_webhook: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create chart workbooks for the selected response rows
    Charts {
        /// Sheet rows to process, e.g. "2-5,8" or "all"
        #[arg(long, default_value = "all")]
        rows: String,
    },

    /// Process one submitted response and send the notification
    Submit {
        /// Submitted values in header order
        #[arg(long, num_args = 1.., conflicts_with = "row", required_unless_present = "row")]
        values: Vec<String>,

        /// Sheet row of the submitted response
        #[arg(long)]
        row: Option<u32>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            for artifact in &report.artifacts {
                println!("{}\t{}", artifact.name, artifact.file.url);
            }
            for url in &report.pdf_urls {
                println!("pdf\t{}", url);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<RunReport, SkillRadarError> {
    let mut responses = ResponseWorkbook::open(&cli.responses)?;
    let header = responses.header()?;
    debug!(?header, "header");

    let settings = if responses.has_sheet(VARIABLES_SHEET) {
        responses.settings()?
    } else {
        Settings::default()
    };

    let folder = cli
        .folder
        .clone()
        .or_else(|| settings.folder_id.clone())
        .ok_or_else(|| SkillRadarError::Config("no folder given (--folder or フォルダ ID)".to_string()))?;
    let editors = if cli.editors.is_empty() {
        settings.editors.clone()
    } else {
        cli.editors.clone()
    };
    let links = cli
        .links
        .clone()
        .unwrap_or_else(|| cli.drive.join("links.xlsx"));

    let mut builder = RunnerBuilder::new()
        .with_profile(cli.profile)
        .with_folder(folder)
        .with_editors(editors)
        .with_max_name_len(cli.max_name_len)
        .with_drive(LocalDrive::open(&cli.drive)?)
        .with_links_path(links);

    // ローカルのドライブとの組み合わせはbuild()が拒否する
    if cli.profile.exports_pdf() {
        let mut exporter = HttpPdfExporter::new(cli.export_base_url.clone());
        if let Some(token) = &cli.export_token {
            exporter = exporter.with_token(token.clone());
        }
        builder = builder.with_pdf_exporter(exporter);
    }
    if let Some(webhook) = cli.slack_webhook.clone().or(settings.slack_webhook) {
        builder = builder.with_notifier(SlackNotifier::new(webhook));
    }
    let mut runner = builder.build()?;

    let report = match cli.command {
        Command::Charts { rows } => {
            let selection = RowSelection::parse(&rows).map_err(SkillRadarError::Config)?;
            let records = responses.records(&selection)?;
            debug!(count = records.len(), "records");
            runner.process(&header, &records)?
        }
        Command::Submit { values, row } => {
            let values = match row {
                Some(row) => responses
                    .records(&RowSelection::Rows(vec![row]))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| SkillRadarError::Config(format!("row {} has no response", row)))?,
                None => values,
            };
            debug!(?values, "submitted values");
            runner.submit(&header, &values)?
        }
    };

    info!(
        created = report.artifacts.len(),
        pdfs = report.pdf_urls.len(),
        notified = report.notified,
        "done"
    );
    Ok(report)
}
