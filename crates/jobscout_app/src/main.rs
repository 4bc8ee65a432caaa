use std::env;
use std::fs;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use agent_logging::agent_info;
use anyhow::{Context, Result};
use chrono::Utc;
use jobscout_agent::{AgentConfig, CandidateProfileView};
use jobscout_app::collaborators::{CollaboratorClient, CollaboratorConfig};
use jobscout_app::loader::{DocumentLoader, LoadSettings};
use jobscout_app::registry::{LogBadgeSink, RegistryRunner};
use jobscout_app::surface::ControlSurface;
use jobscout_app::tabs::TabHost;

const TAB_ID: u64 = 1;

fn main() -> Result<()> {
    init_logging();

    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: jobscout_app <url> [profile.json]");
        std::process::exit(2);
    };
    let profile_path = args.next();

    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    let loader = DocumentLoader::new(LoadSettings::default());
    let document = runtime.block_on(loader.load(&url))?;
    agent_info!(
        "loaded {} ({} bytes, {})",
        document.final_url,
        document.byte_len,
        document.encoding
    );

    let (registry_tx, registry_rx) = mpsc::channel();
    let mut agent_config = AgentConfig::default();
    agent_config.now_utc = Arc::new(|| Utc::now().to_rfc3339());
    let clock = Arc::new(|| Utc::now().timestamp_millis() as u64);
    let host = TabHost::new(agent_config, registry_tx, clock);

    // Collaborator services are optional for a local inspection run.
    let collaborators = env::var("JOBSCOUT_API")
        .ok()
        .map(|base| CollaboratorClient::new(CollaboratorConfig::new(base)))
        .transpose()?;
    let mut surface = ControlSurface::new(host, collaborators);

    surface
        .host_mut()
        .open_tab(TAB_ID, document.final_url.clone(), document.html);

    let state = surface.force_detect(TAB_ID)?;
    println!("is_job:   {}", state.is_job);
    if let Some(info) = state.extracted.as_ref() {
        println!("title:    {}", info.title);
        println!("company:  {}", info.company);
        println!("location: {}", info.location);
        println!("apply:    {}", info.apply_url);
        println!("jd_text:  {} chars", info.jd_text.len());
    }
    if let Some(job_id) = surface.job_id_for(&state) {
        println!("job_id:   {job_id}");
    }
    if let Some(error) = state.last_error.as_ref() {
        println!("degraded: {error}");
    }

    if let Some(path) = profile_path {
        let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        let profile: CandidateProfileView =
            serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
        let result = surface.autofill(TAB_ID, profile)?;
        println!("autofill: filled={} skipped={}", result.filled, result.skipped);
    }

    // Let the detection broadcast land, then mirror it into the registry.
    std::thread::sleep(Duration::from_millis(200));
    let mut registry = RegistryRunner::new(Box::new(LogBadgeSink));
    registry.drain(&registry_rx);
    let view = registry.state().view();
    agent_info!(
        "registry: {} tabs tracked, {} job tabs",
        view.tabs.len(),
        view.job_tab_count
    );

    Ok(())
}

fn init_logging() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
